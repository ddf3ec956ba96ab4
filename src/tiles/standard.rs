//! Reference tile shapes and small tilesets built from them.
//!
//! These are not a complete base-game catalog. They cover every feature
//! the engine models (roads with ends and junctions, single and
//! multi-side cities, shields, farms bordering cities, monasteries) and
//! are what the tests, benches and doc examples play with.
//!
//! Point numbering is described in `map::geometry`: north 0-2, east 3-5,
//! south 6-8, west 9-11, clockwise.

use crate::core::Result;
use crate::map::Side;

use super::definition::TileDefinition;
use super::registry::TileRegistry;

/// City cap on the north edge, road running west to east.
#[must_use]
pub fn start() -> TileDefinition {
    TileDefinition::new("start")
        .city(&[Side::North], 0)
        .road(&[Side::West, Side::East])
        .farm(&[3, 11], &[0])
        .farm(&[5, 6, 7, 8, 9], &[])
}

/// Road running west to east.
#[must_use]
pub fn straight_road() -> TileDefinition {
    TileDefinition::new("straight road")
        .road(&[Side::West, Side::East])
        .farm(&[0, 1, 2, 3, 11], &[])
        .farm(&[5, 6, 7, 8, 9], &[])
}

/// Road bending from south to west.
#[must_use]
pub fn curve_road() -> TileDefinition {
    TileDefinition::new("curve road")
        .road(&[Side::South, Side::West])
        .farm(&[8, 9], &[])
        .farm(&[0, 1, 2, 3, 4, 5, 6, 11], &[])
}

/// Four road ends meeting at a crossing.
#[must_use]
pub fn crossroads() -> TileDefinition {
    TileDefinition::new("crossroads")
        .road(&[Side::North])
        .road(&[Side::East])
        .road(&[Side::South])
        .road(&[Side::West])
        .farm(&[2, 3], &[])
        .farm(&[5, 6], &[])
        .farm(&[8, 9], &[])
        .farm(&[11, 0], &[])
}

/// Road ends from east, south and west.
#[must_use]
pub fn junction() -> TileDefinition {
    TileDefinition::new("junction")
        .road(&[Side::East])
        .road(&[Side::South])
        .road(&[Side::West])
        .farm(&[11, 0, 1, 2, 3], &[])
        .farm(&[5, 6], &[])
        .farm(&[8, 9], &[])
}

/// Monastery surrounded by farmland.
#[must_use]
pub fn monastery() -> TileDefinition {
    TileDefinition::new("monastery")
        .farm(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &[])
        .with_monastery()
}

/// Monastery with a road leaving south.
#[must_use]
pub fn monastery_road() -> TileDefinition {
    TileDefinition::new("monastery road")
        .road(&[Side::South])
        .farm(&[0, 1, 2, 3, 4, 5, 6, 8, 9, 10, 11], &[])
        .with_monastery()
}

/// City cap on the north edge.
#[must_use]
pub fn city_cap() -> TileDefinition {
    TileDefinition::new("city cap")
        .city(&[Side::North], 0)
        .farm(&[3, 4, 5, 6, 7, 8, 9, 10, 11], &[0])
}

/// City running west to east, optionally with a shield.
#[must_use]
pub fn city_tube(shields: u8) -> TileDefinition {
    TileDefinition::new(if shields > 0 { "city tube shield" } else { "city tube" })
        .city(&[Side::West, Side::East], shields)
        .farm(&[0, 1, 2], &[0])
        .farm(&[6, 7, 8], &[0])
}

/// City covering the north and west edges.
#[must_use]
pub fn city_corner(shields: u8) -> TileDefinition {
    TileDefinition::new(if shields > 0 { "city corner shield" } else { "city corner" })
        .city(&[Side::North, Side::West], shields)
        .farm(&[3, 4, 5, 6, 7, 8], &[0])
}

/// City on every edge with one shield.
#[must_use]
pub fn full_city() -> TileDefinition {
    TileDefinition::new("full city").city(&Side::ALL, 1)
}

/// Ten tiles: the start tile and a spread of the reference shapes.
///
/// Fails with `EngineError::Config` if a shape does not validate.
pub fn small_set() -> Result<TileRegistry> {
    let shapes = [
        start(),
        straight_road(),
        curve_road(),
        monastery(),
        city_cap(),
        city_tube(1),
        city_corner(0),
        junction(),
        monastery_road(),
        curve_road(),
    ];
    build(shapes.into_iter().map(|s| (s, 1)))
}

/// A larger mix for randomized play.
pub fn base_set() -> Result<TileRegistry> {
    let shapes = [
        (start(), 1),
        (straight_road(), 6),
        (curve_road(), 7),
        (crossroads(), 1),
        (junction(), 3),
        (monastery(), 3),
        (monastery_road(), 2),
        (city_cap(), 5),
        (city_tube(0), 1),
        (city_tube(1), 2),
        (city_corner(0), 3),
        (city_corner(1), 2),
        (full_city(), 1),
    ];
    build(shapes.into_iter())
}

fn build(shapes: impl Iterator<Item = (TileDefinition, usize)>) -> Result<TileRegistry> {
    let mut registry = TileRegistry::new();
    for (shape, count) in shapes {
        registry.register_copies(shape, count)?;
    }
    Ok(registry)
}
