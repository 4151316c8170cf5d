//! Narrative Runtime: scripted scenes, chained expressions and simulated
//! time for text-driven games.
//!
//! Game content is a set of named scripts dispatched through a registry.
//! Scripts append interpolated text and options to the current scene frame,
//! queue pages for later frames, and advance a game clock whose boundaries
//! drive passive stat depletion, timed effects and actor schedules.

pub mod core;
pub mod schema;

pub use crate::core::resolver::{Output, ScriptError};
pub use crate::core::runtime::{Runtime, RuntimeError};
pub use crate::core::state::GameState;
