//! Grid coordinates, tile sides and rotations.
//!
//! ## Connection points
//!
//! Each tile edge carries three connection points, numbered clockwise
//! starting from the north-west corner:
//!
//! ```text
//!          0  1  2
//!       11         3
//!       10         4
//!        9         5
//!          8  7  6
//! ```
//!
//! Point `side * 3 + k` touches point `opposite(side) * 3 + (2 - k)` of the
//! neighboring tile. Rotating a tile clockwise by `r` quarter turns moves
//! point `p` to `(p + 3r) mod 12`.

use serde::{Deserialize, Serialize};

/// Number of connection points on a tile.
pub const POINT_COUNT: usize = 12;

/// Connection points per side.
pub const POINTS_PER_SIDE: usize = 3;

/// A grid cell. `y` grows southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Where the first tile of every game goes.
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell across `side`.
    #[must_use]
    pub fn neighbor(self, side: Side) -> Self {
        let (dx, dy) = side.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The 8 cells around this one, in a fixed order (row by row).
    pub fn surrounding(self) -> impl Iterator<Item = Position> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1)
                .filter(move |&dx| dx != 0 || dy != 0)
                .map(move |dx| Position::new(self.x + dx, self.y + dy))
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A tile edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// All sides in clockwise order.
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Clockwise index, North = 0.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::North => 0,
            Side::East => 1,
            Side::South => 2,
            Side::West => 3,
        }
    }

    /// The side facing this one on the neighboring tile.
    #[must_use]
    pub const fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    /// Grid step toward the neighbor.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }

    /// The three connection points on this side, clockwise.
    #[must_use]
    pub const fn points(self) -> [u8; 3] {
        let base = (self.index() * POINTS_PER_SIDE) as u8;
        [base, base + 1, base + 2]
    }

    /// The centre point of this side (where roads connect).
    #[must_use]
    pub const fn center(self) -> u8 {
        (self.index() * POINTS_PER_SIDE + 1) as u8
    }
}

/// Map a connection point to the point it touches across the edge.
#[must_use]
pub fn facing_point(point: u8) -> u8 {
    let side = point as usize / POINTS_PER_SIDE;
    let k = point as usize % POINTS_PER_SIDE;
    let opposite = (side + 2) % 4;
    (opposite * POINTS_PER_SIDE + (POINTS_PER_SIDE - 1 - k)) as u8
}

/// Clockwise quarter turns applied to a tile definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All rotations in ascending order.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Number of quarter turns.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Where definition point `point` ends up after this rotation.
    #[must_use]
    pub fn apply(self, point: u8) -> u8 {
        ((point as usize + POINTS_PER_SIDE * self.quarter_turns()) % POINT_COUNT) as u8
    }

    /// Which definition point ends up at board point `point`.
    #[must_use]
    pub fn reverse(self, point: u8) -> u8 {
        ((point as usize + POINT_COUNT - POINTS_PER_SIDE * self.quarter_turns()) % POINT_COUNT) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_offsets() {
        let p = Position::new(2, 3);
        assert_eq!(p.neighbor(Side::North), Position::new(2, 2));
        assert_eq!(p.neighbor(Side::East), Position::new(3, 3));
        assert_eq!(p.neighbor(Side::South), Position::new(2, 4));
        assert_eq!(p.neighbor(Side::West), Position::new(1, 3));
    }

    #[test]
    fn test_surrounding_has_eight_distinct_cells() {
        let cells: Vec<_> = Position::ORIGIN.surrounding().collect();
        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&Position::ORIGIN));
        assert_eq!(cells[0], Position::new(-1, -1));
        assert_eq!(cells[7], Position::new(1, 1));
    }

    #[test]
    fn test_facing_point() {
        // North-west corner faces the south-west corner of the tile above.
        assert_eq!(facing_point(0), 8);
        assert_eq!(facing_point(1), 7);
        assert_eq!(facing_point(Side::East.center()), Side::West.center());
        for p in 0..POINT_COUNT as u8 {
            assert_eq!(facing_point(facing_point(p)), p);
        }
    }

    #[test]
    fn test_rotation_moves_sides_clockwise() {
        assert_eq!(Rotation::R90.apply(Side::North.center()), Side::East.center());
        assert_eq!(Rotation::R180.apply(Side::East.center()), Side::West.center());
        assert_eq!(Rotation::R270.apply(0), 9);
        assert_eq!(Rotation::R0.apply(5), 5);
        for rotation in Rotation::ALL {
            for p in 0..POINT_COUNT as u8 {
                assert_eq!(rotation.reverse(rotation.apply(p)), p);
            }
        }
    }

    #[test]
    fn test_position_ordering_is_row_major_by_x_first() {
        assert!(Position::new(-1, 5) < Position::new(0, -5));
        assert!(Position::new(0, 0) < Position::new(0, 1));
    }
}
