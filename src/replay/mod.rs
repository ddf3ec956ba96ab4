//! Rebuilding engines from their action log.
//!
//! The history of an engine is a complete description of it: the `Init`
//! action fixes the configuration and seed, and every later record is
//! applied verbatim. Replaying the same history against the same tileset
//! always yields the same snapshot, merge order and scoring included.
//!
//! - `snapshot`: `EngineSnapshot`, a comparable summary of an engine
//! - `statistics`: per-turn game statistics gathered by replaying a history

pub mod snapshot;
pub mod statistics;

pub use snapshot::{EngineSnapshot, TileSnapshot};
pub use statistics::{Averages, PlayerStats, PointsBreakdown, Statistics, TurnStatistics};

use std::sync::Arc;

use crate::core::{ActionRecord, EngineError, Result};
use crate::rules::GameEngine;
use crate::tiles::Tileset;

/// Build a fresh engine and apply `records` to it.
///
/// The first record must be the `Init` action.
///
/// ```
/// use rust_carcassonne::core::EngineError;
/// use rust_carcassonne::replay::from_history;
/// use rust_carcassonne::tiles::standard;
/// use std::sync::Arc;
///
/// let err = from_history(Arc::new(standard::small_set().unwrap()), &[]).unwrap_err();
/// assert_eq!(err, EngineError::EmptyHistory);
/// ```
pub fn from_history(tileset: Arc<dyn Tileset>, records: &[ActionRecord]) -> Result<GameEngine> {
    let (first, rest) = records.split_first().ok_or(EngineError::EmptyHistory)?;
    if !first.action.is_init() {
        return Err(EngineError::MissingInitialAction);
    }
    let mut engine = GameEngine::with_tileset(tileset, &first.action)?;
    engine.replay(rest)?;
    Ok(engine)
}

impl GameEngine {
    /// Apply recorded actions in order, each as its recorded player.
    pub fn replay(&mut self, records: &[ActionRecord]) -> Result<()> {
        for record in records {
            tracing::trace!(
                player = %record.player,
                action = record.action.name(),
                turn = record.turn,
                "replaying"
            );
            self.execute_action(record.player, &record.action)?;
        }
        Ok(())
    }

    /// A fresh engine rebuilt from this engine's whole history.
    pub fn rebuild(&self) -> Result<GameEngine> {
        self.replay_prefix(self.history().len())
    }

    /// A fresh engine with the first `n` history records applied.
    ///
    /// `n = 1` is the engine right after initialization.
    pub fn replay_prefix(&self, n: usize) -> Result<GameEngine> {
        let records: Vec<ActionRecord> = self.history().iter().take(n).cloned().collect();
        from_history(Arc::clone(self.tileset()), &records)
    }
}
