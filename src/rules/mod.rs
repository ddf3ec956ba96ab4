//! Game rules: the turn state machine, scoring and shared access.
//!
//! - `engine`: `GameEngine` and its `Phase`
//! - `scoring`: majority resolution and the per-action `EngineEvent` stream
//! - `shared`: `SharedEngine`, a mutex-guarded handle

pub mod engine;
pub mod scoring;
pub mod shared;

pub use engine::{GameEngine, Phase};
pub use scoring::{majority, EngineEvent, ScoreCategory, ScoreEvent, ScoreKind};
pub use shared::SharedEngine;
