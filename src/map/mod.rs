//! The board and the features that grow on it.
//!
//! - `geometry`: positions, sides, rotations and connection-point maths
//! - `graph`: `FeatureGraph`, one connected road, city or farm
//! - `board`: `Map`, placed tiles plus the graph arena and monasteries

pub mod board;
pub mod geometry;
pub mod graph;

pub use board::{Map, MonasterySlot, PlacedTile, PlacementOutcome};
pub use geometry::{facing_point, Position, Rotation, Side, POINTS_PER_SIDE, POINT_COUNT};
pub use graph::{FeatureGraph, GraphStatus, SegmentRef};
