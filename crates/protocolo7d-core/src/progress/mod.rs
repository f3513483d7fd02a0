//! Client-side cache of the user's progress through the program.
//!
//! The cache is filled from backend reads and touched locally in exactly one
//! way: marking a step complete after the backend accepted it.

pub mod snapshot;
pub mod state;

pub use snapshot::{tool_answers_key, ProgressPatch, ProgressSnapshot, ToolAnswers};
pub use state::ProgressState;
