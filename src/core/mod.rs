//! Core engine types: ids, players, actions, RNG, configuration, errors.
//!
//! Everything here is plain data shared by the map, pawn and rules layers.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod error;

pub use entity::{GraphId, MeepleId, TileId};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use config::{GameConfig, ScoringRules};
pub use action::{Action, ActionRecord, PawnTarget};
pub use error::{EngineError, IllegalMove, Result};
