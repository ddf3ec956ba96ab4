//! Tile definitions - static tile shape data.
//!
//! A `TileDefinition` describes one tile shape in its unrotated
//! orientation: which connection points belong to which road, city or
//! farm segment, how many shields each city segment carries, which cities
//! each farm borders and whether the tile holds a monastery.
//!
//! Placement-specific data (position, rotation, graph membership) lives in
//! the map's `PlacedTile`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineError, Result};
use crate::map::geometry::{Side, POINTS_PER_SIDE, POINT_COUNT};

/// The kind of a connected map feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Road,
    City,
    Farm,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeatureKind::Road => "road",
            FeatureKind::City => "city",
            FeatureKind::Farm => "farm",
        };
        f.write_str(name)
    }
}

/// One feature fragment on a single tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Road, city or farm.
    pub kind: FeatureKind,

    /// Connection points owned by this segment (unrotated).
    pub points: SmallVec<[u8; 6]>,

    /// Shield ornaments (cities only).
    pub shields: u8,

    /// Indices of city segments on the same tile this farm borders.
    pub adjacent_cities: SmallVec<[u8; 2]>,
}

/// Static tile shape.
///
/// ## Example
///
/// ```
/// use rust_carcassonne::map::Side;
/// use rust_carcassonne::tiles::{FeatureKind, TileDefinition};
///
/// // City cap on the north edge, farm everywhere else.
/// let tile = TileDefinition::new("city cap")
///     .city(&[Side::North], 0)
///     .farm(&[3, 4, 5, 6, 7, 8, 9, 10, 11], &[0]);
///
/// assert!(tile.validate().is_ok());
/// assert_eq!(tile.kind_at(1), Some(FeatureKind::City));
/// assert_eq!(tile.kind_at(7), Some(FeatureKind::Farm));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDefinition {
    /// Shape name (for display/debugging).
    pub name: String,

    /// Segments in definition order; `PawnTarget::Segment` indexes this.
    pub segments: Vec<Segment>,

    /// Whether the tile holds a monastery.
    pub monastery: bool,
}

impl TileDefinition {
    /// Create an empty definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segments: Vec::new(),
            monastery: false,
        }
    }

    /// Add a road segment touching the centre point of each given side.
    #[must_use]
    pub fn road(mut self, sides: &[Side]) -> Self {
        self.segments.push(Segment {
            kind: FeatureKind::Road,
            points: sides.iter().map(|s| s.center()).collect(),
            shields: 0,
            adjacent_cities: SmallVec::new(),
        });
        self
    }

    /// Add a city segment covering the given sides completely.
    #[must_use]
    pub fn city(mut self, sides: &[Side], shields: u8) -> Self {
        self.segments.push(Segment {
            kind: FeatureKind::City,
            points: sides.iter().flat_map(|s| s.points()).collect(),
            shields,
            adjacent_cities: SmallVec::new(),
        });
        self
    }

    /// Add a farm segment over explicit points, bordering the given city
    /// segments.
    #[must_use]
    pub fn farm(mut self, points: &[u8], adjacent_cities: &[u8]) -> Self {
        self.segments.push(Segment {
            kind: FeatureKind::Farm,
            points: SmallVec::from_slice(points),
            shields: 0,
            adjacent_cities: SmallVec::from_slice(adjacent_cities),
        });
        self
    }

    /// Mark the tile as holding a monastery.
    #[must_use]
    pub fn with_monastery(mut self) -> Self {
        self.monastery = true;
        self
    }

    /// Segment owning an unrotated connection point.
    #[must_use]
    pub fn segment_at(&self, point: u8) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| s.points.contains(&point))
    }

    /// Feature kind at an unrotated connection point.
    #[must_use]
    pub fn kind_at(&self, point: u8) -> Option<FeatureKind> {
        self.segment_at(point).map(|i| self.segments[i].kind)
    }

    /// Check the shape is well formed.
    ///
    /// Every connection point belongs to exactly one segment, roads only
    /// use side centres, a side is either entirely city or has no city,
    /// and farms only reference city segments.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::Config(format!("tile '{}': {}", self.name, msg)));

        let mut owners = [0usize; POINT_COUNT];
        for (index, segment) in self.segments.iter().enumerate() {
            if segment.points.is_empty() {
                return invalid(format!("segment {} has no connection points", index));
            }
            for &point in &segment.points {
                let Some(slot) = owners.get_mut(point as usize) else {
                    return invalid(format!("point {} is out of range", point));
                };
                *slot += 1;
                if segment.kind == FeatureKind::Road && point as usize % POINTS_PER_SIDE != 1 {
                    return invalid(format!("road segment {} uses corner point {}", index, point));
                }
            }
            for &city in &segment.adjacent_cities {
                let is_city = self
                    .segments
                    .get(city as usize)
                    .is_some_and(|s| s.kind == FeatureKind::City);
                if segment.kind != FeatureKind::Farm || !is_city {
                    return invalid(format!("segment {} has a bad city adjacency {}", index, city));
                }
            }
        }
        if let Some(point) = owners.iter().position(|&n| n != 1) {
            return invalid(format!("point {} is owned by {} segments", point, owners[point]));
        }
        for side in Side::ALL {
            let cities = side
                .points()
                .iter()
                .filter(|&&p| self.kind_at(p) == Some(FeatureKind::City))
                .count();
            if cities != 0 && cities != POINTS_PER_SIDE {
                return invalid(format!("{:?} side is partially city", side));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_road() -> TileDefinition {
        TileDefinition::new("straight road")
            .road(&[Side::West, Side::East])
            .farm(&[0, 1, 2, 3, 11], &[])
            .farm(&[5, 6, 7, 8, 9], &[])
    }

    #[test]
    fn test_builder_assigns_points() {
        let tile = straight_road();
        assert_eq!(tile.segments.len(), 3);
        assert_eq!(tile.segment_at(Side::West.center()), Some(0));
        assert_eq!(tile.segment_at(Side::East.center()), Some(0));
        assert_eq!(tile.segment_at(0), Some(1));
        assert_eq!(tile.segment_at(7), Some(2));
        assert!(tile.validate().is_ok());
    }

    #[test]
    fn test_missing_point_rejected() {
        let tile = TileDefinition::new("broken")
            .road(&[Side::West, Side::East])
            .farm(&[0, 1, 2, 3, 11], &[]);
        assert!(matches!(tile.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_road_on_corner_rejected() {
        let mut tile = straight_road();
        tile.segments[0].points.push(0);
        tile.segments[1].points.retain(|p| *p != 0);
        assert!(tile.validate().is_err());
    }

    #[test]
    fn test_bad_city_adjacency_rejected() {
        let tile = TileDefinition::new("farm pointing at a road")
            .road(&[Side::West, Side::East])
            .farm(&[0, 1, 2, 3, 11], &[0])
            .farm(&[5, 6, 7, 8, 9], &[]);
        assert!(tile.validate().is_err());
    }

    #[test]
    fn test_monastery_flag() {
        let tile = TileDefinition::new("monastery")
            .farm(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &[])
            .with_monastery();
        assert!(tile.monastery);
        assert!(tile.validate().is_ok());
    }

    #[test]
    fn test_definition_serialization() {
        let tile = straight_road();
        let json = serde_json::to_string(&tile).unwrap();
        let deserialized: TileDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(tile, deserialized);
    }
}
