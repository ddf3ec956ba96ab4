//! Tile shapes and the tileset boundary.
//!
//! - `definition`: immutable tile shapes (segments, shields, monastery)
//! - `registry`: `Tileset` / `DataSource` traits and in-memory versions
//! - `standard`: reference shapes and small tilesets

pub mod definition;
pub mod registry;
pub mod standard;

pub use definition::{FeatureKind, Segment, TileDefinition};
pub use registry::{DataSource, StaticSource, TileRegistry, Tileset};
