//! Feature graphs: roads, cities and farms spanning many tiles.
//!
//! A `FeatureGraph` is one connected feature. Graphs live in the map's
//! arena and are addressed by `GraphId`. When a tile joins two graphs, the
//! younger one is absorbed into the older one and its slot is retired as
//! `GraphStatus::Merged`; the id is never handed out again.
//!
//! Open points count the connection points of member segments that do not
//! yet face another tile. A road or city with no open points is closed.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, GraphId, MeepleId, PlayerId, Result, ScoringRules};
use crate::pawns::{OccupierContainer, Role};
use crate::rules::majority;
use crate::tiles::FeatureKind;

use super::geometry::Position;

/// Lifecycle of an arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphStatus {
    /// Growing; part of the map's open set.
    Open,
    /// Closed and scored. Kept so farms can see completed cities.
    Completed,
    /// Absorbed into another graph.
    Merged(GraphId),
}

/// A segment of a placed tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentRef {
    pub position: Position,
    pub segment: u8,
}

/// One connected road, city or farm.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGraph {
    id: GraphId,
    kind: FeatureKind,
    status: GraphStatus,
    owners: Vec<MeepleId>,
    members: Vec<SegmentRef>,
    open_points: u32,
    shields: u32,
}

impl FeatureGraph {
    /// A single-segment graph.
    #[must_use]
    pub fn new(id: GraphId, kind: FeatureKind, member: SegmentRef, open_points: u32, shields: u32) -> Self {
        Self {
            id,
            kind,
            status: GraphStatus::Open,
            owners: Vec::new(),
            members: vec![member],
            open_points,
            shields,
        }
    }

    #[must_use]
    pub fn id(&self) -> GraphId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    #[must_use]
    pub fn status(&self) -> GraphStatus {
        self.status
    }

    #[must_use]
    pub fn members(&self) -> &[SegmentRef] {
        &self.members
    }

    #[must_use]
    pub fn open_points(&self) -> u32 {
        self.open_points
    }

    #[must_use]
    pub fn shields(&self) -> u32 {
        self.shields
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == GraphStatus::Open
    }

    /// Every connection point faces another tile. Farms never close.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.kind != FeatureKind::Farm && self.open_points == 0
    }

    /// Distinct players with a meeple here.
    #[must_use]
    pub fn owning_players(&self) -> Vec<PlayerId> {
        let mut players: Vec<_> = self.owners.iter().map(|m| m.owner).collect();
        players.sort_unstable();
        players.dedup();
        players
    }

    /// Number of distinct tiles the graph spans.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let mut positions: Vec<_> = self.members.iter().map(|m| m.position).collect();
        positions.sort_unstable();
        positions.dedup();
        positions.len()
    }

    /// Road and city value. Farms are valued by the map, which knows which
    /// cities they border, so this returns 0 for them.
    #[must_use]
    pub fn value(&self, rules: &ScoringRules, completed: bool) -> i32 {
        let tiles = self.tile_count() as i32;
        let shields = self.shields as i32;
        match (self.kind, completed) {
            (FeatureKind::Road, _) => tiles * rules.road_tile_points,
            (FeatureKind::City, true) => tiles * rules.city_tile_points + shields * rules.city_shield_points,
            (FeatureKind::City, false) => {
                tiles * rules.open_city_tile_points + shields * rules.open_city_shield_points
            }
            (FeatureKind::Farm, _) => 0,
        }
    }

    /// Absorb `other` into this graph.
    ///
    /// Owners are appended with multiplicity. The caller retires `other`'s
    /// arena slot and redirects references to it.
    pub fn merge(&mut self, other: &FeatureGraph) -> Result<()> {
        if self.kind != other.kind {
            return Err(EngineError::invariant(format!(
                "cannot merge {} {} into {} {}",
                other.kind, other.id, self.kind, self.id
            )));
        }
        if !self.is_open() || !other.is_open() {
            return Err(EngineError::invariant(format!(
                "cannot merge {} into {}: both must be open",
                other.id, self.id
            )));
        }
        self.owners.extend_from_slice(&other.owners);
        self.members.extend_from_slice(&other.members);
        self.open_points += other.open_points;
        self.shields += other.shields;
        Ok(())
    }

    /// Two facing connection points were joined.
    pub(crate) fn consume_points(&mut self, count: u32) -> Result<()> {
        self.open_points = self.open_points.checked_sub(count).ok_or_else(|| {
            EngineError::invariant(format!("{} has fewer than {} open points", self.id, count))
        })?;
        Ok(())
    }

    /// Tombstone this slot. Its occupiers now live in `into`.
    pub(crate) fn retire(&mut self, into: GraphId) {
        self.status = GraphStatus::Merged(into);
        self.owners.clear();
    }

    /// Mark a closed graph completed and return its value and scorers.
    ///
    /// Must be called exactly once, right after `is_closed` turns true.
    pub fn close(&mut self, rules: &ScoringRules) -> Result<(i32, Vec<PlayerId>)> {
        if !self.is_open() {
            return Err(EngineError::invariant(format!("{} closed twice", self.id)));
        }
        if !self.is_closed() {
            return Err(EngineError::invariant(format!("{} is not closed", self.id)));
        }
        self.status = GraphStatus::Completed;
        Ok((self.value(rules, true), majority(&self.owners)))
    }
}

impl OccupierContainer for FeatureGraph {
    fn occupiers(&self) -> &[MeepleId] {
        &self.owners
    }

    fn role(&self) -> Role {
        Role::for_feature(self.kind)
    }

    fn add_occupier(&mut self, meeple: MeepleId) -> Result<()> {
        if self.owners.contains(&meeple) {
            return Err(EngineError::invariant(format!("{} already owns {}", meeple, self.id)));
        }
        self.owners.push(meeple);
        Ok(())
    }

    fn remove_occupier(&mut self, meeple: MeepleId) -> Result<()> {
        let index = self
            .owners
            .iter()
            .position(|m| *m == meeple)
            .ok_or_else(|| EngineError::invariant(format!("{} does not own {}", meeple, self.id)))?;
        self.owners.remove(index);
        Ok(())
    }
}
