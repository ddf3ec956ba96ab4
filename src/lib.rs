//! # rust-carcassonne
//!
//! A deterministic game-state engine for Carcassonne-style tile placement.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: a game is fully described by its `Init` action,
//!    its tileset and the actions that followed. Replaying them always
//!    produces the same state, merge order and scores.
//!
//! 2. **Cheap Clones**: the map, graph arena and history are `im`
//!    persistent structures, so forking a game for search or analysis is
//!    O(1) and the fork never aliases the original.
//!
//! 3. **Events, not callbacks**: every action returns the list of
//!    `EngineEvent`s it caused (placements, merges, scores). Observers
//!    consume that list instead of hooking into the engine.
//!
//! ## Modules
//!
//! - `core`: ids, players, actions, RNG, configuration, errors
//! - `tiles`: tile shapes, the `Tileset`/`DataSource` boundaries, stock sets
//! - `map`: geometry, feature graphs and the board
//! - `pawns`: meeples, their containers and the players owning them
//! - `rules`: the turn state machine and scoring
//! - `replay`: rebuilding engines from history, snapshots, statistics
//!
//! ## Example
//!
//! ```
//! use rust_carcassonne::{GameConfig, GameEngine, Phase, StaticSource};
//! use rust_carcassonne::tiles::standard;
//!
//! let source = StaticSource::new(GameConfig::new(2, 42), standard::small_set().unwrap());
//! let mut engine = GameEngine::new(&source).unwrap();
//! assert_eq!(engine.phase(), Phase::PlaceTile);
//!
//! let place_start = engine.legal_actions()[0].clone();
//! let player = engine.current_player();
//! engine.execute_action(player, &place_start).unwrap();
//! assert_eq!(engine.phase(), Phase::PlacePawn);
//!
//! let rebuilt = engine.rebuild().unwrap();
//! assert_eq!(rebuilt.snapshot(), engine.snapshot());
//! ```

pub mod core;
pub mod map;
pub mod pawns;
pub mod replay;
pub mod rules;
pub mod tiles;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, EngineError, GameConfig, GameRng, GraphId, IllegalMove, MeepleId,
    PawnTarget, PlayerId, PlayerMap, Result, ScoringRules, TileId,
};

pub use crate::tiles::{DataSource, FeatureKind, Segment, StaticSource, TileDefinition, TileRegistry, Tileset};

pub use crate::map::{FeatureGraph, GraphStatus, Map, MonasterySlot, PlacedTile, Position, Rotation, Side};

pub use crate::pawns::{ContainerRef, Meeple, OccupierContainer, Player, Role};

pub use crate::rules::{EngineEvent, GameEngine, Phase, ScoreCategory, ScoreEvent, ScoreKind, SharedEngine};

pub use crate::replay::{EngineSnapshot, Statistics, TurnStatistics};
