//! Identifier types for engine objects.
//!
//! Every object the engine mutates is addressed by a small copyable id
//! rather than by reference:
//! - `TileId`: a physical tile in the tileset (0..n_tiles)
//! - `GraphId`: a slot in the map's feature-graph arena
//! - `MeepleId`: a meeple in a player's fixed pool
//!
//! Ids are never reused. A merged graph keeps its slot as a tombstone, so
//! a `GraphId` observed once always refers to the same arena entry.
//!
//! ```
//! use rust_carcassonne::core::{MeepleId, PlayerId};
//!
//! let meeple = MeepleId::new(PlayerId::new(1), 3);
//! assert_eq!(meeple.owner, PlayerId::new(1));
//! assert_eq!(meeple.index(), 3);
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Identifier of a physical tile in a tileset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u16);

impl TileId {
    /// Create a new tile ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile({})", self.0)
    }
}

/// Stable index into the map's feature-graph arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphId(pub u32);

impl GraphId {
    /// Create a new graph ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Graph({})", self.0)
    }
}

/// A meeple, identified by its owner and its slot in the owner's pool.
///
/// Ordering is by owner first, so sorting a list of owners groups them
/// by player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeepleId {
    /// Player that owns this meeple for the whole game.
    pub owner: PlayerId,
    /// Slot in the owner's pool.
    pub slot: u8,
}

impl MeepleId {
    /// Create a new meeple ID.
    #[must_use]
    pub const fn new(owner: PlayerId, slot: u8) -> Self {
        Self { owner, slot }
    }

    /// Get the pool index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.slot as usize
    }
}

impl std::fmt::Display for MeepleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Meeple({}#{})", self.owner.0, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_id() {
        let id = TileId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(format!("{}", id), "Tile(7)");
    }

    #[test]
    fn test_tile_id_defaults_to_first_tile() {
        assert_eq!(TileId::default(), TileId::new(0));
    }

    #[test]
    fn test_graph_id_ordering() {
        assert!(GraphId::new(1) < GraphId::new(2));
        assert_eq!(GraphId::new(4).index(), 4);
    }

    #[test]
    fn test_meeple_id_orders_by_owner() {
        let a = MeepleId::new(PlayerId::new(0), 5);
        let b = MeepleId::new(PlayerId::new(1), 0);
        assert!(a < b);
        assert_eq!(format!("{}", b), "Meeple(1#0)");
    }

    #[test]
    fn test_serialization() {
        let id = MeepleId::new(PlayerId::new(2), 4);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: MeepleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
