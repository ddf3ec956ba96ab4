//! Comparable summaries of engine state.

use serde::{Deserialize, Serialize};

use crate::core::{GraphId, PlayerId, TileId};
use crate::map::{FeatureGraph, MonasterySlot, Position, Rotation};
use crate::pawns::Player;
use crate::rules::{GameEngine, Phase};

/// A placed tile, as recorded in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub tile: TileId,
    pub position: Position,
    pub rotation: Rotation,
    /// Current graph of each segment.
    pub graphs: Vec<GraphId>,
}

/// Everything observable about an engine, in a deterministic order.
///
/// Two engines with equal snapshots are indistinguishable through the
/// public API. Replaying a history yields a snapshot equal to the one of
/// the engine that recorded it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub turn: u32,
    pub current_player: PlayerId,
    pub current_tile: Option<TileId>,
    pub remaining_tiles: usize,
    pub discarded: Vec<TileId>,
    pub players: Vec<Player>,
    /// Tiles in placement order.
    pub tiles: Vec<TileSnapshot>,
    /// The whole arena, retired slots included.
    pub graphs: Vec<FeatureGraph>,
    pub monasteries: Vec<MonasterySlot>,
    pub history_len: usize,
}

impl EngineSnapshot {
    /// Capture the state of `engine`.
    #[must_use]
    pub fn capture(engine: &GameEngine) -> Self {
        let map = engine.map();
        Self {
            phase: engine.phase(),
            turn: engine.turn(),
            current_player: engine.current_player(),
            current_tile: engine.current_tile(),
            remaining_tiles: engine.remaining_tiles(),
            discarded: engine.discarded().collect(),
            players: engine.players().values().cloned().collect(),
            tiles: map
                .placed_tiles()
                .map(|t| TileSnapshot {
                    tile: t.tile(),
                    position: t.position(),
                    rotation: t.rotation(),
                    graphs: (0..t.definition().segments.len())
                        .filter_map(|s| t.graph(s))
                        .collect(),
                })
                .collect(),
            graphs: map.graphs().cloned().collect(),
            monasteries: map.monasteries().cloned().collect(),
            history_len: engine.history().len(),
        }
    }

    /// Scores in seat order.
    #[must_use]
    pub fn scores(&self) -> Vec<i32> {
        self.players.iter().map(Player::score).collect()
    }
}

impl GameEngine {
    /// Capture a comparable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::tiles::{standard, StaticSource};

    #[test]
    fn test_snapshot_serializes() {
        let source = StaticSource::new(GameConfig::new(3, 21), standard::small_set().unwrap());
        let mut engine = GameEngine::new(&source).unwrap();
        let start = engine.legal_actions()[0].clone();
        engine.execute_action(PlayerId::new(0), &start).unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.tiles.len(), 1);
        assert_eq!(snapshot.phase, Phase::PlacePawn);
        assert_eq!(snapshot.scores(), vec![0, 0, 0]);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: EngineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
