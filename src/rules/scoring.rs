//! Scoring outcomes and the per-action event stream.
//!
//! Every point awarded, every meeple returned and every merge performed
//! while applying an action is appended to that action's event list.
//! Consumers (statistics, logs, UIs) read the list instead of registering
//! callbacks on the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{GraphId, MeepleId, PlayerId, TileId};
use crate::map::{Position, Rotation};
use crate::pawns::{ContainerRef, Role};
use crate::tiles::FeatureKind;

/// Why points were awarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreKind {
    /// A feature completed during play.
    Completed,
    /// Provisional value of an open feature, recomputed after every action.
    Potential,
    /// Final value of a feature still open when the game ended.
    EndGame,
}

/// Feature category, for breakdowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreCategory {
    Road,
    City,
    Farm,
    Monastery,
}

impl From<FeatureKind> for ScoreCategory {
    fn from(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Road => ScoreCategory::Road,
            FeatureKind::City => ScoreCategory::City,
            FeatureKind::Farm => ScoreCategory::Farm,
        }
    }
}

/// Points awarded to one player from one feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub player: PlayerId,
    pub amount: i32,
    pub source: ContainerRef,
    pub category: ScoreCategory,
    pub kind: ScoreKind,
}

/// Something that happened while an action was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    TilePlaced {
        player: PlayerId,
        tile: TileId,
        position: Position,
        rotation: Rotation,
    },
    /// The drawn tile fit nowhere and was removed from the game.
    TileDiscarded { player: PlayerId, tile: TileId },
    GraphsMerged { survivor: GraphId, absorbed: GraphId },
    /// A feature completed. `owners` counts the meeples that were on it.
    FeatureCompleted {
        source: ContainerRef,
        category: ScoreCategory,
        owners: usize,
    },
    MeeplePlaced {
        meeple: MeepleId,
        container: ContainerRef,
        role: Role,
    },
    MeepleReturned { meeple: MeepleId, container: ContainerRef },
    Score(ScoreEvent),
    GameOver { winners: Vec<PlayerId> },
}

impl EngineEvent {
    /// The score event, if this is one.
    #[must_use]
    pub fn as_score(&self) -> Option<&ScoreEvent> {
        match self {
            EngineEvent::Score(score) => Some(score),
            _ => None,
        }
    }
}

/// Players entitled to a feature's points.
///
/// Every player holding the maximum number of meeples on the feature
/// scores; everyone below the maximum scores nothing. The result is in
/// seat order and empty when nobody owns the feature.
///
/// ```
/// use rust_carcassonne::core::{MeepleId, PlayerId};
/// use rust_carcassonne::rules::majority;
///
/// let p0 = PlayerId::new(0);
/// let p1 = PlayerId::new(1);
/// let owners = [
///     MeepleId::new(p1, 0),
///     MeepleId::new(p0, 0),
///     MeepleId::new(p1, 1),
/// ];
/// assert_eq!(majority(&owners), vec![p1]);
/// ```
#[must_use]
pub fn majority(owners: &[MeepleId]) -> Vec<PlayerId> {
    let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
    for meeple in owners {
        *counts.entry(meeple.owner).or_default() += 1;
    }
    let Some(&max) = counts.values().max() else {
        return Vec::new();
    };
    counts
        .into_iter()
        .filter(|&(_, n)| n == max)
        .map(|(player, _)| player)
        .collect()
}
