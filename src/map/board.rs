//! The board: placed tiles, the feature-graph arena and monasteries.
//!
//! The map only grows. Tiles are never removed, arena slots are never
//! reused and monasteries stay where they were placed. All containers are
//! `im` persistent structures so cloning a map is cheap and the clone
//! shares no mutable state with the original.

use std::collections::BTreeSet;
use std::sync::Arc;

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineError, GraphId, IllegalMove, MeepleId, Result, ScoringRules, TileId};
use crate::pawns::{ContainerRef, OccupierContainer, Role};
use crate::tiles::{FeatureKind, TileDefinition};

use super::geometry::{facing_point, Position, Rotation, Side};
use super::graph::{FeatureGraph, GraphStatus, SegmentRef};

/// A tile on the board.
#[derive(Clone, Debug)]
pub struct PlacedTile {
    tile: TileId,
    position: Position,
    rotation: Rotation,
    definition: Arc<TileDefinition>,
    /// Current graph of each segment, indexed like `definition.segments`.
    graphs: SmallVec<[GraphId; 6]>,
}

impl PlacedTile {
    #[must_use]
    pub fn tile(&self) -> TileId {
        self.tile
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn definition(&self) -> &TileDefinition {
        &self.definition
    }

    /// Graph currently holding a segment.
    #[must_use]
    pub fn graph(&self, segment: usize) -> Option<GraphId> {
        self.graphs.get(segment).copied()
    }

    /// Segment owning a board-oriented connection point.
    #[must_use]
    pub fn segment_at(&self, point: u8) -> Option<usize> {
        self.definition.segment_at(self.rotation.reverse(point))
    }

    /// Feature kind at a board-oriented connection point.
    #[must_use]
    pub fn kind_at(&self, point: u8) -> Option<FeatureKind> {
        self.definition.kind_at(self.rotation.reverse(point))
    }
}

/// The monastery of one tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonasterySlot {
    position: Position,
    occupant: Option<MeepleId>,
    completed: bool,
}

impl MonasterySlot {
    fn new(position: Position) -> Self {
        Self {
            position,
            occupant: None,
            completed: false,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn occupant(&self) -> Option<MeepleId> {
        self.occupant
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn complete(&mut self) -> Result<()> {
        if self.completed {
            return Err(EngineError::invariant(format!(
                "monastery at {} completed twice",
                self.position
            )));
        }
        self.completed = true;
        Ok(())
    }
}

impl OccupierContainer for MonasterySlot {
    fn occupiers(&self) -> &[MeepleId] {
        match &self.occupant {
            Some(meeple) => std::slice::from_ref(meeple),
            None => &[],
        }
    }

    fn role(&self) -> Role {
        Role::Monk
    }

    fn add_occupier(&mut self, meeple: MeepleId) -> Result<()> {
        if let Some(current) = self.occupant {
            return Err(EngineError::invariant(format!(
                "monastery at {} already holds {}",
                self.position, current
            )));
        }
        self.occupant = Some(meeple);
        Ok(())
    }

    fn remove_occupier(&mut self, meeple: MeepleId) -> Result<()> {
        if self.occupant != Some(meeple) {
            return Err(EngineError::invariant(format!(
                "monastery at {} does not hold {}",
                self.position, meeple
            )));
        }
        self.occupant = None;
        Ok(())
    }
}

/// What a successful placement changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// `(absorbed, survivor)` pairs, in merge order.
    pub merges: Vec<(GraphId, GraphId)>,
    /// Graphs that became closed, ascending.
    pub closed: Vec<GraphId>,
    /// Monasteries that reached their neighbor threshold.
    pub completed_monasteries: Vec<Position>,
}

/// Grid of placed tiles plus every feature graph and monastery.
#[derive(Clone, Debug, Default)]
pub struct Map {
    tiles: OrdMap<Position, PlacedTile>,
    order: Vector<Position>,
    graphs: Vector<FeatureGraph>,
    monasteries: OrdMap<Position, MonasterySlot>,
}

impl Map {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Queries ===

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn tile_at(&self, position: Position) -> Option<&PlacedTile> {
        self.tiles.get(&position)
    }

    /// Placed tiles in placement order.
    pub fn placed_tiles(&self) -> impl Iterator<Item = &PlacedTile> + '_ {
        self.order.iter().filter_map(move |p| self.tiles.get(p))
    }

    #[must_use]
    pub fn graph(&self, id: GraphId) -> Option<&FeatureGraph> {
        self.graphs.get(id.index())
    }

    /// Every arena slot, including retired ones.
    pub fn graphs(&self) -> impl Iterator<Item = &FeatureGraph> + '_ {
        self.graphs.iter()
    }

    /// Graphs still growing, ascending by id.
    pub fn open_graphs(&self) -> impl Iterator<Item = &FeatureGraph> + '_ {
        self.graphs.iter().filter(|g| g.is_open())
    }

    #[must_use]
    pub fn monastery(&self, position: Position) -> Option<&MonasterySlot> {
        self.monasteries.get(&position)
    }

    /// All monasteries, by position.
    pub fn monasteries(&self) -> impl Iterator<Item = &MonasterySlot> + '_ {
        self.monasteries.values()
    }

    /// Number of the 8 surrounding cells holding a tile.
    #[must_use]
    pub fn neighbor_count(&self, position: Position) -> usize {
        position
            .surrounding()
            .filter(|cell| self.tiles.contains_key(cell))
            .count()
    }

    /// Read-only view of a container.
    #[must_use]
    pub fn container(&self, at: ContainerRef) -> Option<&dyn OccupierContainer> {
        match at {
            ContainerRef::Graph(id) => self.graph(id).map(|g| g as &dyn OccupierContainer),
            ContainerRef::Monastery(position) => self
                .monastery(position)
                .map(|m| m as &dyn OccupierContainer),
        }
    }

    // === Placement ===

    /// Check a placement without changing anything.
    pub fn check_placement(
        &self,
        definition: &TileDefinition,
        position: Position,
        rotation: Rotation,
    ) -> std::result::Result<(), IllegalMove> {
        if self.tiles.contains_key(&position) {
            return Err(IllegalMove::PositionOccupied(position));
        }
        if self.tiles.is_empty() {
            return Ok(());
        }

        let mut neighbors = 0;
        for side in Side::ALL {
            let Some(neighbor) = self.tiles.get(&position.neighbor(side)) else {
                continue;
            };
            neighbors += 1;
            for point in side.points() {
                let ours = definition.kind_at(rotation.reverse(point));
                let theirs = neighbor.kind_at(facing_point(point));
                if ours != theirs {
                    return Err(IllegalMove::EdgeMismatch { position, side });
                }
            }
        }

        if neighbors == 0 {
            return Err(IllegalMove::NoNeighbor(position));
        }
        Ok(())
    }

    /// Every legal `(position, rotation)` for a tile, in a fixed order.
    #[must_use]
    pub fn legal_placements(&self, definition: &TileDefinition) -> Vec<(Position, Rotation)> {
        self.candidates()
            .into_iter()
            .flat_map(|p| Rotation::ALL.into_iter().map(move |r| (p, r)))
            .filter(|&(p, r)| self.check_placement(definition, p, r).is_ok())
            .collect()
    }

    /// Whether the tile fits anywhere.
    #[must_use]
    pub fn has_legal_placement(&self, definition: &TileDefinition) -> bool {
        self.candidates().into_iter().any(|p| {
            Rotation::ALL
                .into_iter()
                .any(|r| self.check_placement(definition, p, r).is_ok())
        })
    }

    fn candidates(&self) -> BTreeSet<Position> {
        if self.tiles.is_empty() {
            return BTreeSet::from([Position::ORIGIN]);
        }
        self.tiles
            .keys()
            .flat_map(|p| Side::ALL.into_iter().map(move |s| p.neighbor(s)))
            .filter(|p| !self.tiles.contains_key(p))
            .collect()
    }

    /// Place a tile, create its segment graphs and merge them with every
    /// neighbor they touch.
    ///
    /// Fails with `IllegalMove` before touching anything if the placement
    /// is illegal.
    pub fn place_tile(
        &mut self,
        tile: TileId,
        definition: Arc<TileDefinition>,
        position: Position,
        rotation: Rotation,
        rules: &ScoringRules,
    ) -> Result<PlacementOutcome> {
        self.check_placement(&definition, position, rotation)?;

        let mut graphs = SmallVec::new();
        for (index, segment) in definition.segments.iter().enumerate() {
            let id = GraphId::new(self.graphs.len() as u32);
            let member = SegmentRef {
                position,
                segment: index as u8,
            };
            self.graphs.push_back(FeatureGraph::new(
                id,
                segment.kind,
                member,
                segment.points.len() as u32,
                u32::from(segment.shields),
            ));
            graphs.push(id);
        }
        if definition.monastery {
            self.monasteries.insert(position, MonasterySlot::new(position));
        }
        self.tiles.insert(
            position,
            PlacedTile {
                tile,
                position,
                rotation,
                definition,
                graphs,
            },
        );
        self.order.push_back(position);

        let mut outcome = PlacementOutcome::default();
        for side in Side::ALL {
            let neighbor = position.neighbor(side);
            if !self.tiles.contains_key(&neighbor) {
                continue;
            }
            for point in side.points() {
                let ours = self.graph_at(position, point)?;
                let theirs = self.graph_at(neighbor, facing_point(point))?;
                let survivor = if ours == theirs {
                    ours
                } else {
                    let (survivor, absorbed) = (ours.min(theirs), ours.max(theirs));
                    self.merge_graphs(survivor, absorbed)?;
                    outcome.merges.push((absorbed, survivor));
                    survivor
                };
                self.graph_mut(survivor)?.consume_points(2)?;
            }
        }

        let mut touched: Vec<GraphId> = self
            .tiles
            .get(&position)
            .map(|t| t.graphs.to_vec())
            .unwrap_or_default();
        touched.sort_unstable();
        touched.dedup();
        outcome.closed = touched
            .into_iter()
            .filter(|id| self.graph(*id).is_some_and(|g| g.is_open() && g.is_closed()))
            .collect();

        for cell in std::iter::once(position).chain(position.surrounding()) {
            let ready = self.monasteries.get(&cell).is_some_and(|slot| {
                !slot.is_completed() && self.neighbor_count(cell) >= rules.monastery_neighbors as usize
            });
            if ready {
                outcome.completed_monasteries.push(cell);
            }
        }

        tracing::debug!(
            %tile,
            %position,
            ?rotation,
            merges = outcome.merges.len(),
            closed = outcome.closed.len(),
            "tile placed"
        );
        Ok(outcome)
    }

    fn graph_at(&self, position: Position, point: u8) -> Result<GraphId> {
        self.tiles
            .get(&position)
            .and_then(|t| t.segment_at(point).and_then(|s| t.graph(s)))
            .ok_or_else(|| EngineError::invariant(format!("no segment at point {} of {}", point, position)))
    }

    /// Absorb `absorbed` into `survivor` and redirect every tile segment
    /// that referenced it. Meeple references are redirected by the engine.
    fn merge_graphs(&mut self, survivor: GraphId, absorbed: GraphId) -> Result<()> {
        let other = self
            .graph(absorbed)
            .cloned()
            .ok_or_else(|| EngineError::invariant(format!("{} is not in the arena", absorbed)))?;
        self.graph_mut(survivor)?.merge(&other)?;

        for member in other.members() {
            if let Some(slot) = self
                .tiles
                .get_mut(&member.position)
                .and_then(|t| t.graphs.get_mut(member.segment as usize))
            {
                *slot = survivor;
            }
        }
        self.graph_mut(absorbed)?.retire(survivor);

        tracing::debug!(%survivor, %absorbed, "graphs merged");
        Ok(())
    }

    // === Scoring support ===

    /// Value of a graph: completed or end-of-game for roads and cities,
    /// completed cities bordered for farms.
    pub fn feature_value(&self, id: GraphId, rules: &ScoringRules, completed: bool) -> Result<i32> {
        let graph = self
            .graph(id)
            .ok_or_else(|| EngineError::invariant(format!("{} is not in the arena", id)))?;
        match graph.kind() {
            FeatureKind::Farm => self.bordered_cities(graph, rules),
            _ => Ok(graph.value(rules, completed)),
        }
    }

    /// End-of-game value of a farm: a fixed amount per distinct completed
    /// city it borders.
    pub fn farm_value(&self, id: GraphId, rules: &ScoringRules) -> Result<i32> {
        let graph = self
            .graph(id)
            .ok_or_else(|| EngineError::invariant(format!("{} is not in the arena", id)))?;
        if graph.kind() != FeatureKind::Farm {
            return Err(EngineError::invariant(format!("{} is not a farm", id)));
        }
        self.bordered_cities(graph, rules)
    }

    fn bordered_cities(&self, farm: &FeatureGraph, rules: &ScoringRules) -> Result<i32> {
        let mut cities = BTreeSet::new();
        for member in farm.members() {
            let tile = self.tiles.get(&member.position).ok_or_else(|| {
                EngineError::invariant(format!("{} has a member off the map", farm.id()))
            })?;
            let Some(segment) = tile.definition.segments.get(member.segment as usize) else {
                continue;
            };
            for &city in &segment.adjacent_cities {
                let completed = tile
                    .graph(city as usize)
                    .filter(|g| self.graph(*g).is_some_and(|g| g.status() == GraphStatus::Completed));
                if let Some(city_graph) = completed {
                    cities.insert(city_graph);
                }
            }
        }
        Ok(cities.len() as i32 * rules.farm_city_points)
    }

    /// One point for the monastery tile plus one per surrounding tile.
    #[must_use]
    pub fn monastery_value(&self, position: Position) -> i32 {
        1 + self.neighbor_count(position) as i32
    }

    // === Mutation helpers for the engine ===

    pub(crate) fn graph_mut(&mut self, id: GraphId) -> Result<&mut FeatureGraph> {
        self.graphs
            .get_mut(id.index())
            .ok_or_else(|| EngineError::invariant(format!("{} is not in the arena", id)))
    }

    pub(crate) fn monastery_mut(&mut self, position: Position) -> Result<&mut MonasterySlot> {
        self.monasteries
            .get_mut(&position)
            .ok_or_else(|| EngineError::invariant(format!("no monastery at {}", position)))
    }

    pub(crate) fn container_mut(&mut self, at: ContainerRef) -> Result<&mut dyn OccupierContainer> {
        match at {
            ContainerRef::Graph(id) => {
                let graph: &mut dyn OccupierContainer = self.graph_mut(id)?;
                Ok(graph)
            }
            ContainerRef::Monastery(position) => {
                let slot: &mut dyn OccupierContainer = self.monastery_mut(position)?;
                Ok(slot)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::standard;

    fn place(map: &mut Map, definition: TileDefinition, x: i32, y: i32, rotation: Rotation) -> Result<PlacementOutcome> {
        let id = TileId::new(map.tile_count() as u16);
        map.place_tile(id, Arc::new(definition), Position::new(x, y), rotation, &ScoringRules::default())
    }

    #[test]
    fn test_first_tile_anywhere_then_neighbors_required() {
        let mut map = Map::new();
        place(&mut map, standard::straight_road(), 0, 0, Rotation::R0).unwrap();

        let err = map
            .check_placement(&standard::straight_road(), Position::new(5, 5), Rotation::R0)
            .unwrap_err();
        assert_eq!(err, IllegalMove::NoNeighbor(Position::new(5, 5)));

        let err = map
            .check_placement(&standard::straight_road(), Position::ORIGIN, Rotation::R0)
            .unwrap_err();
        assert_eq!(err, IllegalMove::PositionOccupied(Position::ORIGIN));
    }

    #[test]
    fn test_mismatched_edge_rejected_without_mutation() {
        let mut map = Map::new();
        place(&mut map, standard::city_cap(), 0, 0, Rotation::R0).unwrap();
        let graphs_before = map.graphs().count();

        // A monastery is all farm; the cap's north edge is city.
        let err = place(&mut map, standard::monastery(), 0, -1, Rotation::R0).unwrap_err();
        assert_eq!(
            err,
            EngineError::IllegalMove(IllegalMove::EdgeMismatch {
                position: Position::new(0, -1),
                side: Side::South
            })
        );
        assert_eq!(map.tile_count(), 1);
        assert_eq!(map.graphs().count(), graphs_before);
    }

    #[test]
    fn test_road_merges_and_keeps_older_id() {
        let mut map = Map::new();
        place(&mut map, standard::straight_road(), 0, 0, Rotation::R0).unwrap();
        let outcome = place(&mut map, standard::straight_road(), 1, 0, Rotation::R0).unwrap();

        // Road, north farm and south farm each merged once.
        assert_eq!(outcome.merges.len(), 3);
        let road = map.tile_at(Position::ORIGIN).unwrap().graph(0).unwrap();
        assert_eq!(road, GraphId::new(0));
        assert_eq!(map.tile_at(Position::new(1, 0)).unwrap().graph(0), Some(road));

        let graph = map.graph(road).unwrap();
        assert_eq!(graph.tile_count(), 2);
        assert_eq!(graph.open_points(), 2);
        assert_eq!(map.graph(GraphId::new(3)).unwrap().status(), GraphStatus::Merged(road));
        assert!(outcome.closed.is_empty());
    }

    #[test]
    fn test_two_tile_road_closes() {
        let mut map = Map::new();
        place(&mut map, standard::monastery_road(), 0, 0, Rotation::R0).unwrap();
        let outcome = place(&mut map, standard::monastery_road(), 0, 1, Rotation::R180).unwrap();

        assert_eq!(outcome.closed.len(), 1);
        let road = map.graph(outcome.closed[0]).unwrap();
        assert_eq!(road.kind(), FeatureKind::Road);
        assert_eq!(road.tile_count(), 2);
        assert!(road.is_closed());
    }

    #[test]
    fn test_city_ring_closing_through_same_graph() {
        // Four corners closing a 2x2 city loop: the last tile touches the
        // same graph on two sides.
        let mut map = Map::new();
        place(&mut map, standard::city_corner(0), 1, 1, Rotation::R0).unwrap();
        place(&mut map, standard::city_corner(0), 0, 1, Rotation::R90).unwrap();
        place(&mut map, standard::city_corner(0), 0, 0, Rotation::R180).unwrap();
        let outcome = place(&mut map, standard::city_corner(0), 1, 0, Rotation::R270).unwrap();

        assert_eq!(outcome.closed.len(), 1);
        let city = map.graph(outcome.closed[0]).unwrap();
        assert_eq!(city.tile_count(), 4);
        assert_eq!(city.open_points(), 0);
    }

    #[test]
    fn test_monastery_completion() {
        let mut map = Map::new();
        place(&mut map, standard::monastery(), 0, 0, Rotation::R0).unwrap();
        let ring = [(0, -1), (-1, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1)];
        for (x, y) in ring {
            let outcome = place(&mut map, standard::monastery(), x, y, Rotation::R0).unwrap();
            assert!(!outcome.completed_monasteries.contains(&Position::ORIGIN));
        }
        assert_eq!(map.monastery_value(Position::ORIGIN), 8);

        let outcome = place(&mut map, standard::monastery(), -1, 0, Rotation::R0).unwrap();
        assert!(outcome.completed_monasteries.contains(&Position::ORIGIN));
        assert_eq!(map.monastery_value(Position::ORIGIN), 9);
    }

    #[test]
    fn test_farm_value_counts_completed_cities_once() {
        let rules = ScoringRules::default();
        let mut map = Map::new();
        place(&mut map, standard::city_cap(), 0, 0, Rotation::R0).unwrap();
        let farm = map.tile_at(Position::ORIGIN).unwrap().graph(1).unwrap();
        assert_eq!(map.feature_value(farm, &rules, false).unwrap(), 0);

        let outcome = place(&mut map, standard::city_cap(), 0, -1, Rotation::R180).unwrap();
        assert_eq!(outcome.closed.len(), 1);
        map.graph_mut(outcome.closed[0]).unwrap().close(&rules).unwrap();

        // The cap's farm now borders one completed city.
        let farm = map.tile_at(Position::ORIGIN).unwrap().graph(1).unwrap();
        assert_eq!(map.feature_value(farm, &rules, false).unwrap(), 3);
        assert_eq!(map.farm_value(farm, &rules).unwrap(), 3);
        assert!(map.farm_value(outcome.closed[0], &rules).is_err());
    }

    #[test]
    fn test_legal_placements_are_deterministic() {
        let mut map = Map::new();
        assert_eq!(
            map.legal_placements(&standard::monastery()).len(),
            4,
            "empty map offers the origin in every rotation"
        );
        place(&mut map, standard::city_cap(), 0, 0, Rotation::R0).unwrap();

        let a = map.legal_placements(&standard::monastery());
        let b = map.clone().legal_placements(&standard::monastery());
        assert_eq!(a, b);
        // East, south and west of the cap, any rotation.
        assert_eq!(a.len(), 12);
        assert!(a.iter().all(|(p, _)| *p != Position::new(0, -1)));
    }

    #[test]
    fn test_monastery_slot_single_occupant() {
        let mut slot = MonasterySlot::new(Position::ORIGIN);
        let a = MeepleId::new(crate::core::PlayerId::new(0), 0);
        let b = MeepleId::new(crate::core::PlayerId::new(1), 0);
        slot.add_occupier(a).unwrap();
        assert!(slot.add_occupier(b).is_err());
        assert!(slot.remove_occupier(b).is_err());
        slot.remove_occupier(a).unwrap();
        assert_eq!(slot.owner_count(), 0);
    }
}
