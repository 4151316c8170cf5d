/// Repeating menus, built from scene primitives alone: a looping entry
/// pushes its pages followed by a fresh copy of the menu instruction.
use serde::{Deserialize, Serialize};

use crate::core::resolver::ScriptError;
use crate::core::state::GameState;
use crate::schema::instruction::Instruction;
use crate::schema::value::{Params, Value};

/// Script that pushes its `pages` and advances into them.
pub const PAGES: &str = "pages";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    /// Gate expression, evaluated every time the menu renders.
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub then: Vec<Instruction>,
    /// Show the menu again after `then` has played.
    #[serde(default)]
    pub repeat: bool,
}

impl MenuEntry {
    pub fn new(label: &str, then: Vec<Instruction>) -> Self {
        Self {
            label: label.to_string(),
            when: None,
            then,
            repeat: false,
        }
    }

    pub fn when(mut self, condition: &str) -> Self {
        self.when = Some(condition.to_string());
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Read an entry from a `menu` parameter map.
    pub fn from_params(script: &str, params: &Params) -> Result<Self, ScriptError> {
        Ok(Self {
            label: params.require_str(script, "label")?.to_string(),
            when: params.opt_str(script, "when")?.map(str::to_string),
            then: if params.contains_key("then") {
                params.require_instructions(script, "then")?
            } else {
                Vec::new()
            },
            repeat: params.opt_bool(script, "repeat")?.unwrap_or(false),
        })
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new()
            .with("label", self.label.as_str())
            .with("then", self.then.clone())
            .with("repeat", self.repeat);
        if let Some(when) = &self.when {
            params.insert("when", when.as_str());
        }
        params
    }
}

/// The instruction that renders `entries` as a menu.
pub fn menu_instruction(entries: &[MenuEntry]) -> Instruction {
    let entries = entries
        .iter()
        .map(|entry| Value::Map(entry.to_params()))
        .collect();
    Instruction::new("menu", Params::new().with("entries", Value::List(entries)))
}

/// Parse the `entries` list of a `menu` instruction.
pub fn entries_from_params(script: &str, params: &Params) -> Result<Vec<MenuEntry>, ScriptError> {
    let list = params
        .require(script, "entries")?
        .as_list()
        .ok_or_else(|| ScriptError::InvalidParam {
            script: script.to_string(),
            key: "entries".to_string(),
            expected: "a list",
        })?;
    list.iter()
        .map(|value| {
            let map = value.as_map().ok_or_else(|| ScriptError::InvalidParam {
                script: script.to_string(),
                key: "entries".to_string(),
                expected: "a list of maps",
            })?;
            MenuEntry::from_params(script, map)
        })
        .collect()
}

impl GameState {
    /// Add one option per entry whose gate passes right now. `again` is the
    /// instruction re-pushed after a repeating entry.
    pub fn render_menu(
        &mut self,
        entries: &[MenuEntry],
        again: &Instruction,
    ) -> Result<(), ScriptError> {
        for entry in entries {
            if let Some(condition) = &entry.when {
                if !self.test(condition)? {
                    continue;
                }
            }
            let mut pages = entry.then.clone();
            if entry.repeat {
                pages.push(again.clone());
            }
            self.scene.add_option(
                &entry.label,
                Instruction::new(PAGES, Params::new().with("pages", pages)),
            );
        }
        Ok(())
    }
}
