/// Save games: the mutable half of a [`GameState`] as pretty RON.
///
/// Definitions, scripts and hooks are not saved; a save is loaded back
/// against a runtime and every id it mentions is checked against that
/// runtime's catalog.

use log::info;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

use crate::core::clock::GameClock;
use crate::core::runtime::Runtime;
use crate::core::scene::Scene;
use crate::core::state::GameState;
use crate::schema::entity::{ActorState, EffectInstance, ItemInstance, Player};
use crate::schema::instruction::Instruction;
use crate::schema::value::Value;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("RON deserialization error: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("save refers to unknown {kind} '{id}'")]
    DefinitionNotFound { kind: &'static str, id: String },
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub version: u32,
    pub clock: GameClock,
    pub scene: Scene,
    pub player: Player,
    pub actors: BTreeMap<String, ActorState>,
    #[serde(default)]
    pub inventory: Vec<ItemInstance>,
    #[serde(default)]
    pub equipped: BTreeMap<String, ItemInstance>,
    #[serde(default)]
    pub effects: Vec<EffectInstance>,
    #[serde(default)]
    pub flags: BTreeMap<String, Value>,
}

impl SaveDocument {
    pub fn capture(state: &GameState) -> Self {
        Self {
            version: SAVE_VERSION,
            clock: state.clock,
            scene: state.scene.clone(),
            player: state.player.clone(),
            actors: state.actors.clone(),
            inventory: state.inventory.clone(),
            equipped: state.equipped.clone(),
            effects: state.effects.clone(),
            flags: state.flags.clone(),
        }
    }

    pub fn to_ron(&self) -> Result<String, PersistenceError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn parse_ron(input: &str) -> Result<Self, PersistenceError> {
        let doc: SaveDocument = ron::from_str(input)?;
        if doc.version != SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion(doc.version));
        }
        Ok(doc)
    }

    /// Check every id in the save against `runtime`.
    pub fn validate(&self, runtime: &Runtime) -> Result<(), PersistenceError> {
        let catalog = &runtime.catalog;
        let locations = self
            .player
            .location
            .iter()
            .chain(self.actors.values().filter_map(|a| a.location.as_ref()));
        for location in locations {
            if catalog.location(location).is_none() {
                return Err(not_found("location", location));
            }
        }
        for id in self.actors.keys() {
            if catalog.actor(id).is_none() {
                return Err(not_found("actor", id));
            }
        }
        for item in self.inventory.iter().chain(self.equipped.values()) {
            if catalog.item(&item.id).is_none() {
                return Err(not_found("item", &item.id));
            }
        }
        for effect in &self.effects {
            if catalog.effect(&effect.id).is_none() {
                return Err(not_found("effect", &effect.id));
            }
        }
        let queued = self
            .scene
            .options()
            .iter()
            .map(|option| &option.instruction)
            .chain(self.scene.pending().iter());
        for instruction in queued {
            check_scripts(runtime, instruction)?;
        }
        Ok(())
    }
}

fn not_found(kind: &'static str, id: &str) -> PersistenceError {
    PersistenceError::DefinitionNotFound {
        kind,
        id: id.to_string(),
    }
}

/// An instruction and any instructions nested in its parameters must name
/// registered scripts.
fn check_scripts(runtime: &Runtime, instruction: &Instruction) -> Result<(), PersistenceError> {
    if !runtime.scripts.contains(&instruction.name) {
        return Err(not_found("script", &instruction.name));
    }
    for (_, value) in instruction.params.iter() {
        check_value(runtime, value)?;
    }
    Ok(())
}

fn check_value(runtime: &Runtime, value: &Value) -> Result<(), PersistenceError> {
    match value {
        Value::Instruction(nested) => check_scripts(runtime, nested),
        Value::List(values) => values.iter().try_for_each(|v| check_value(runtime, v)),
        Value::Map(params) => params.iter().try_for_each(|(_, v)| check_value(runtime, v)),
        _ => Ok(()),
    }
}

impl GameState {
    pub fn save(&self) -> Result<String, PersistenceError> {
        let text = SaveDocument::capture(self).to_ron()?;
        info!("saved game at {}", self.clock.time_of_day());
        Ok(text)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), PersistenceError> {
        std::fs::write(path, self.save()?)?;
        Ok(())
    }

    /// Restore a session from [`save`](Self::save) output. The random
    /// source is freshly seeded.
    pub fn load(runtime: impl Into<Rc<Runtime>>, input: &str) -> Result<Self, PersistenceError> {
        let doc = SaveDocument::parse_ron(input)?;
        let mut state = GameState::new(runtime);
        doc.validate(state.runtime())?;
        state.apply(doc);
        info!("loaded game at {}", state.clock.time_of_day());
        Ok(state)
    }

    pub fn load_from_file(
        runtime: impl Into<Rc<Runtime>>,
        path: &Path,
    ) -> Result<Self, PersistenceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::load(runtime, &contents)
    }

    fn apply(&mut self, doc: SaveDocument) {
        self.clock = doc.clock;
        self.scene = doc.scene;
        self.player = doc.player;
        // Actors missing from the save keep their starting state.
        self.actors.extend(doc.actors);
        self.inventory = doc.inventory;
        self.equipped = doc.equipped;
        self.effects = doc.effects;
        self.flags = doc.flags;
        self.refresh_presence();
    }
}
