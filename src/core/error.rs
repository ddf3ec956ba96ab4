//! Engine error taxonomy.
//!
//! Three families, in decreasing severity:
//! - `InvariantViolation`: a programming defect (double placement, removing
//!   an absent owner, merging mismatched graphs). Never recovered.
//! - `IllegalMove`: the action breaks a game rule. The engine is unchanged
//!   and the caller may submit a different action.
//! - `InvalidState` / `WrongPlayer`: the action arrived in the wrong phase or
//!   from the wrong seat. Recoverable exactly like an illegal move.

use thiserror::Error;

use super::entity::{MeepleId, TileId};
use super::player::PlayerId;
use crate::map::{Position, Side};
use crate::rules::Phase;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// A rule the submitted action breaks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("{got} is not the drawn tile (expected {expected})")]
    NotDrawnTile { expected: TileId, got: TileId },

    #[error("cell {0} already holds a tile")]
    PositionOccupied(Position),

    #[error("cell {0} does not touch any placed tile")]
    NoNeighbor(Position),

    #[error("edge {side:?} of the tile at {position} does not match its neighbor")]
    EdgeMismatch { position: Position, side: Side },

    #[error("{0} does not belong to the acting player")]
    ForeignMeeple(MeepleId),

    #[error("{0} does not exist")]
    UnknownMeeple(MeepleId),

    #[error("{0} is already on the board")]
    MeepleInPlay(MeepleId),

    #[error("the placed tile has no feature {0}")]
    NoSuchFeature(String),

    #[error("the feature is already occupied")]
    FeatureOccupied,

    #[error("the feature is already complete")]
    FeatureComplete,
}

/// Everything `GameEngine` and its collaborators can fail with.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error("invalid state: action expects {expected:?} but engine is in {actual:?}")]
    InvalidState { expected: Phase, actual: Phase },

    #[error("player assertion failed: expected {expected}, got {actual}")]
    WrongPlayer { expected: PlayerId, actual: PlayerId },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown tile {0}")]
    UnknownTile(TileId),

    #[error("action history is empty")]
    EmptyHistory,

    #[error("first history entry is not the initial configuration")]
    MissingInitialAction,
}

impl EngineError {
    /// Shorthand for an invariant violation.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// True for errors the caller can recover from by submitting a
    /// different action.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IllegalMove(_) | Self::InvalidState { .. } | Self::WrongPlayer { .. }
        )
    }
}
