//! Action representation and the recorded history entry.
//!
//! Actions are plain data: they cross the engine boundary, get stored in
//! the history and are re-applied verbatim during replay. The acting
//! player is not part of the action; it travels alongside in
//! `ActionRecord` (or as the first argument of `execute_action`).

use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::entity::{MeepleId, TileId};
use super::player::PlayerId;
use crate::map::{Position, Rotation};

/// Where on the tile just placed a meeple goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PawnTarget {
    /// A road, city or farm segment, by index in the tile definition.
    Segment(u8),
    /// The tile's monastery.
    Monastery,
}

/// A complete game action.
///
/// ## Example
///
/// ```
/// use rust_carcassonne::core::{Action, TileId};
/// use rust_carcassonne::map::{Position, Rotation};
///
/// let place = Action::PlaceTile {
///     tile: TileId::new(0),
///     position: Position::ORIGIN,
///     rotation: Rotation::R0,
/// };
/// assert_eq!(place.name(), "PlaceTile");
/// assert_eq!(Action::PassPawn.name(), "PassPawn");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Initial configuration. Always the first history entry.
    Init(GameConfig),

    /// Place the drawn tile.
    PlaceTile {
        tile: TileId,
        position: Position,
        rotation: Rotation,
    },

    /// Put a meeple on a feature of the tile just placed.
    PlacePawn { meeple: MeepleId, target: PawnTarget },

    /// Decline to place a meeple this turn.
    PassPawn,
}

impl Action {
    /// Variant name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::Init(_) => "Init",
            Action::PlaceTile { .. } => "PlaceTile",
            Action::PlacePawn { .. } => "PlacePawn",
            Action::PassPawn => "PassPawn",
        }
    }

    /// True for the initial configuration action.
    #[must_use]
    pub fn is_init(&self) -> bool {
        matches!(self, Action::Init(_))
    }
}

/// A recorded action with metadata for history tracking.
///
/// Used for:
/// - Replay onto a fresh engine
/// - Statistics, which group records by `turn`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}
