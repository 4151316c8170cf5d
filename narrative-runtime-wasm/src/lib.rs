//! WASM bindings for narrative-runtime: powers the playable web demo.

use std::rc::Rc;
use wasm_bindgen::prelude::*;

use narrative_runtime::core::catalog::Catalog;
use narrative_runtime::core::clock::WEEKDAY_NAMES;
use narrative_runtime::core::runtime::Runtime;
use narrative_runtime::core::state::GameState;
use narrative_runtime::core::story::StoryBook;
use narrative_runtime::core::time::WaitOutcome;
use narrative_runtime::schema::content::{Content, Fragment, Inline};
use narrative_runtime::schema::value::Params;

// ---------------------------------------------------------------------------
// Embedded demo data: compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const TAVERN_STORY: &str = include_str!("../../stories/tavern.ron");
    pub const TAVERN_WORLD: &str = include_str!("../../worlds/tavern.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct Span {
    text: String,
    /// Display color, if any; error markers carry the alarm color.
    color: Option<String>,
}

#[derive(serde::Serialize)]
struct Block {
    speaker: Option<String>,
    spans: Vec<Span>,
}

#[derive(serde::Serialize)]
struct Frame {
    time: String,
    weekday: String,
    location: Option<String>,
    present: Vec<String>,
    content: Vec<Block>,
    options: Vec<String>,
}

#[derive(serde::Serialize)]
struct WaitReport {
    completed: bool,
    elapsed_minutes: u64,
}

fn spans(fragments: &[Fragment]) -> Vec<Span> {
    fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Literal(text) | Fragment::Resolved(Inline::Text(text)) => Span {
                text: text.clone(),
                color: None,
            },
            Fragment::Resolved(Inline::Styled { text, color })
            | Fragment::Error { marker: text, color } => Span {
                text: text.clone(),
                color: Some(color.clone()),
            },
        })
        .collect()
}

fn js_err(context: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// StorySession: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StorySession {
    runtime: Rc<Runtime>,
    state: GameState,
}

#[wasm_bindgen]
impl StorySession {
    /// Create a session on the bundled tavern story, opened at `start`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<StorySession, JsError> {
        let story = StoryBook::parse_ron(data::TAVERN_STORY)
            .map_err(|e| js_err("Story parse error", e))?;
        let catalog = Catalog::parse_ron(data::TAVERN_WORLD)
            .map_err(|e| js_err("World parse error", e))?;
        let runtime = Runtime::builder()
            .with_story(story)
            .with_catalog(catalog)
            .build()
            .map_err(|e| js_err("Runtime build error", e))?;
        let runtime = Rc::new(runtime);

        let mut state = GameState::with_seed(Rc::clone(&runtime), seed);
        state
            .run("start", &Params::new())
            .map_err(|e| js_err("Script error", e))?;
        Ok(StorySession { runtime, state })
    }

    /// Return the current frame as JSON.
    ///
    /// ```json
    /// {
    ///   "time": "08:00", "weekday": "Monday", "location": "tavern",
    ///   "present": ["olek"],
    ///   "content": [{ "speaker": null, "spans": [{ "text": "...", "color": null }] }],
    ///   "options": ["Greet Olek", "Leave"]
    /// }
    /// ```
    pub fn frame(&self) -> Result<String, JsError> {
        let content = self
            .state
            .scene
            .content()
            .iter()
            .map(|content| match content {
                Content::Paragraph(fragments) => Block {
                    speaker: None,
                    spans: spans(fragments),
                },
                Content::Speech { speaker, line } => Block {
                    speaker: Some(speaker.clone()),
                    spans: spans(line),
                },
            })
            .collect();
        let frame = Frame {
            time: self.state.clock.time_of_day(),
            weekday: WEEKDAY_NAMES[self.state.weekday() as usize % 7].to_string(),
            location: self.state.player.location.clone(),
            present: self.state.present().to_vec(),
            content,
            options: self
                .state
                .scene
                .options()
                .iter()
                .map(|o| o.label.clone())
                .collect(),
        };
        serde_json::to_string(&frame).map_err(|e| js_err("Serialization error", e))
    }

    /// Choose the option at `index` (zero-based).
    pub fn choose(&mut self, index: usize) -> Result<(), JsError> {
        self.state
            .choose(index)
            .map_err(|e| js_err("Script error", e))
    }

    /// Let `minutes` pass. Returns a JSON report of how the wait ended.
    pub fn wait(&mut self, minutes: i64) -> Result<String, JsError> {
        let outcome = self
            .state
            .wait(minutes, None)
            .map_err(|e| js_err("Script error", e))?;
        let report = match outcome {
            WaitOutcome::Completed => WaitReport {
                completed: true,
                elapsed_minutes: minutes.max(0) as u64,
            },
            WaitOutcome::Interrupted { elapsed_minutes } => WaitReport {
                completed: false,
                elapsed_minutes,
            },
        };
        serde_json::to_string(&report).map_err(|e| js_err("Serialization error", e))
    }

    /// Serialize the session to a RON save string.
    pub fn save(&self) -> Result<String, JsError> {
        self.state.save().map_err(|e| js_err("Save error", e))
    }

    /// Replace the session with one restored from a [`save`](Self::save) string.
    pub fn load(&mut self, save: &str) -> Result<(), JsError> {
        self.state =
            GameState::load(Rc::clone(&self.runtime), save).map_err(|e| js_err("Load error", e))?;
        Ok(())
    }

    /// Return JSON array of passage ids in the bundled story.
    pub fn passages(&self) -> String {
        serde_json::to_string(&self.runtime.story.ids()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Restart from the opening passage with a new seed.
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        let mut state = GameState::with_seed(Rc::clone(&self.runtime), seed);
        state
            .run("start", &Params::new())
            .map_err(|e| js_err("Script error", e))?;
        self.state = state;
        Ok(())
    }
}
