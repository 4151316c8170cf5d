/// Story books: passages authored in RON, each registered as a script.

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

use crate::core::menu::MenuEntry;
use crate::core::registry::{RegistryError, ScriptRegistry};
use crate::core::resolver::{Output, ScriptError};
use crate::core::state::GameState;
use crate::schema::instruction::Instruction;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("passage '{passage}': {reason}")]
    Invalid { passage: String, reason: String },
}

/// One choice offered at the end of a passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassageOption {
    pub label: String,
    /// Gate expression, checked when the passage renders.
    #[serde(default)]
    pub when: Option<String>,
    /// Passage to play after `then`.
    #[serde(default)]
    pub goto: Option<String>,
    #[serde(default)]
    pub then: Vec<Instruction>,
    /// Play the whole passage again once this choice is done.
    #[serde(default)]
    pub repeat: bool,
}

impl PassageOption {
    fn to_entry(&self) -> MenuEntry {
        let mut then = self.then.clone();
        if let Some(goto) = &self.goto {
            then.push(Instruction::bare(goto));
        }
        MenuEntry {
            label: self.label.clone(),
            when: self.when.clone(),
            then,
            repeat: self.repeat,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Passage")]
pub struct Passage {
    /// When this gate fails the passage is an invisible page.
    #[serde(default)]
    pub when: Option<String>,
    /// Instructions run before any text, e.g. moving the player.
    #[serde(default)]
    pub run: Vec<Instruction>,
    #[serde(default)]
    pub text: Vec<String>,
    /// `(speaker, line)` pairs; the speaker may be an actor id.
    #[serde(default)]
    pub speech: Vec<(String, String)>,
    #[serde(default)]
    pub options: Vec<PassageOption>,
    /// Passages queued after this one.
    #[serde(default)]
    pub next: Vec<String>,
}

impl Passage {
    /// Every interpolated template in the passage, in play order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.text
            .iter()
            .map(String::as_str)
            .chain(self.speech.iter().map(|(_, line)| line.as_str()))
    }

    /// Script names this passage refers to: its `run` instructions, `goto`
    /// targets, the instructions inside its options, and `next` entries.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        let options = self.options.iter().flat_map(|option| {
            option
                .goto
                .iter()
                .map(String::as_str)
                .chain(option.then.iter().map(|i| i.name.as_str()))
        });
        self.run
            .iter()
            .map(|i| i.name.as_str())
            .chain(options)
            .chain(self.next.iter().map(String::as_str))
    }

    pub fn play(&self, id: &str, state: &mut GameState) -> Result<(), ScriptError> {
        if let Some(gate) = &self.when {
            if !state.test(gate)? {
                debug!("passage {} gated off", id);
                return Ok(());
            }
        }
        for instruction in &self.run {
            state.run_instruction(instruction)?;
        }
        for paragraph in &self.text {
            state.narrate(paragraph);
        }
        for (speaker, line) in &self.speech {
            let name = state.speaker_name(speaker);
            state.speak(&name, line);
        }
        if !self.options.is_empty() {
            let entries: Vec<MenuEntry> = self.options.iter().map(PassageOption::to_entry).collect();
            state.render_menu(&entries, &Instruction::bare(id))?;
        }
        if !self.next.is_empty() {
            state.push_pages(self.next.iter().map(|next| Instruction::bare(next)).collect());
        }
        Ok(())
    }
}

/// A set of named passages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryBook {
    pub passages: FxHashMap<String, Passage>,
}

impl StoryBook {
    pub fn load_from_ron(path: &Path) -> Result<StoryBook, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<StoryBook, StoryError> {
        let passages: FxHashMap<String, Passage> = ron::from_str(input)?;
        for (id, passage) in &passages {
            if id.is_empty() || id.contains([':', '(', ')', '{', '}']) {
                return Err(StoryError::Invalid {
                    passage: id.clone(),
                    reason: "ids may not be empty or contain ':', '(', ')' or braces".into(),
                });
            }
            if passage.options.iter().any(|o| o.label.is_empty()) {
                return Err(StoryError::Invalid {
                    passage: id.clone(),
                    reason: "option with an empty label".into(),
                });
            }
        }
        Ok(StoryBook { passages })
    }

    /// Merge another book into this one. Passages from `other` override
    /// passages in `self` with the same id.
    pub fn merge(&mut self, other: StoryBook) {
        for (id, passage) in other.passages {
            self.passages.insert(id, passage);
        }
    }

    pub fn passage(&self, id: &str) -> Option<&Passage> {
        self.passages.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.passages.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Register every passage as a script named by its id.
    pub fn register(&self, scripts: &mut ScriptRegistry) -> Result<(), RegistryError> {
        for id in self.ids() {
            let passage = Rc::new(self.passages[id].clone());
            let name = id.to_string();
            scripts.register(id, move |state, _| {
                passage.play(&name, state)?;
                Ok(Output::Unit)
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runtime::Runtime;

    const BOOK: &str = r#"{
        "gate": Passage(
            text: ["A heavy door."],
            options: [
                (label: "Knock", goto: Some("knock")),
                (label: "Use the key", when: Some("has(key)"), goto: Some("inside")),
                (label: "Look around", then: [(name: "text", params: {"text": String("Nothing.")})], repeat: true),
            ],
        ),
        "knock": Passage(
            speech: [("Guard", "Who goes there?")],
            next: ["secret", "inside"],
        ),
        "secret": Passage(
            when: Some("flag:password"),
            text: ["You whisper the password."],
        ),
        "inside": Passage(text: ["You are in."]),
    }"#;

    fn state() -> GameState {
        let book = StoryBook::parse_ron(BOOK).unwrap();
        GameState::with_seed(Runtime::builder().with_story(book).build().unwrap(), 9)
    }

    fn labels(state: &GameState) -> Vec<&str> {
        state.scene.options().iter().map(|o| o.label.as_str()).collect()
    }

    #[test]
    fn parse_passages() {
        let book = StoryBook::parse_ron(BOOK).unwrap();
        assert_eq!(book.ids(), vec!["gate", "inside", "knock", "secret"]);
        assert_eq!(book.passage("knock").unwrap().next.len(), 2);
        let targets: Vec<&str> = book.passage("gate").unwrap().targets().collect();
        assert_eq!(targets, vec!["knock", "inside", "text"]);
    }

    #[test]
    fn bad_ids_rejected() {
        let result = StoryBook::parse_ron(r#"{ "a:b": Passage(text: ["x"]) }"#);
        assert!(matches!(result, Err(StoryError::Invalid { .. })));
    }

    #[test]
    fn options_gated_at_render_time() {
        let mut s = state();
        s.run("gate", &Default::default()).unwrap();
        assert_eq!(labels(&s), vec!["Knock", "Look around"]);
    }

    #[test]
    fn gated_passage_is_skipped_by_continue() {
        let mut s = state();
        s.run("gate", &Default::default()).unwrap();
        s.choose(0).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "Guard: \"Who goes there?\"");
        assert_eq!(labels(&s), vec!["Continue"]);

        s.choose(0).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "You are in.");
        assert!(s.scene.pending().is_empty());
    }

    #[test]
    fn repeating_option_replays_passage() {
        let mut s = state();
        s.run("gate", &Default::default()).unwrap();
        s.choose(1).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "Nothing.");
        s.choose(0).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "A heavy door.");
        assert_eq!(labels(&s), vec!["Knock", "Look around"]);
    }

    #[test]
    fn merge_overrides() {
        let mut base = StoryBook::parse_ron(BOOK).unwrap();
        let patch = StoryBook::parse_ron(r#"{ "inside": Passage(text: ["Warm in here."]) }"#)
            .unwrap();
        base.merge(patch);
        assert_eq!(base.len(), 4);
        assert_eq!(base.passage("inside").unwrap().text, vec!["Warm in here."]);
    }
}
