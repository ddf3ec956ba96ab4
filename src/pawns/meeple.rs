//! Meeples and the containers they sit in.
//!
//! A meeple is placed on exactly one container at a time: a feature graph
//! (road, city, farm) or a monastery. The meeple holds a non-owning
//! `ContainerRef` back to it; the container holds the meeple's id in its
//! owner list. `place` and `remove` are the only operations that change
//! either side, and they always change both.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, GraphId, MeepleId, Result};
use crate::map::Position;
use crate::tiles::FeatureKind;

/// What a meeple is doing on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// In the supply.
    #[default]
    None,
    Farmer,
    Knight,
    Highwayman,
    Monk,
}

impl Role {
    /// Fixed role for each graph feature kind.
    #[must_use]
    pub const fn for_feature(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Farm => Role::Farmer,
            FeatureKind::City => Role::Knight,
            FeatureKind::Road => Role::Highwayman,
        }
    }
}

/// Non-owning reference to the container a meeple sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContainerRef {
    /// A road, city or farm graph in the map's arena.
    Graph(GraphId),
    /// The monastery on the tile at this position.
    Monastery(Position),
}

/// Capability shared by everything a meeple can be placed on.
pub trait OccupierContainer {
    /// Meeples currently placed here, in placement order.
    fn occupiers(&self) -> &[MeepleId];

    /// Role a meeple takes when placed here.
    fn role(&self) -> Role;

    /// Record a meeple as placed here.
    fn add_occupier(&mut self, meeple: MeepleId) -> Result<()>;

    /// Forget a meeple. Fails if it is not here.
    fn remove_occupier(&mut self, meeple: MeepleId) -> Result<()>;

    /// Number of meeples placed here.
    fn owner_count(&self) -> usize {
        self.occupiers().len()
    }

    /// Whether a meeple is placed here.
    fn contains(&self, meeple: MeepleId) -> bool {
        self.occupiers().contains(&meeple)
    }
}

/// One meeple of a player's pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeple {
    id: MeepleId,
    role: Role,
    container: Option<ContainerRef>,
    tile: Option<Position>,
}

impl Meeple {
    /// Create a meeple in the supply.
    #[must_use]
    pub fn new(id: MeepleId) -> Self {
        Self {
            id,
            role: Role::None,
            container: None,
            tile: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> MeepleId {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The container this meeple sits in, if placed.
    #[must_use]
    pub fn container(&self) -> Option<ContainerRef> {
        self.container
    }

    /// The tile this meeple stands on, if placed.
    #[must_use]
    pub fn tile(&self) -> Option<Position> {
        self.tile
    }

    /// Placed meeples have a role; meeples in the supply do not.
    #[must_use]
    pub fn is_in_play(&self) -> bool {
        self.role != Role::None
    }

    /// Put this meeple on `container`, standing on the tile at `tile`.
    ///
    /// Placement-rule checks (is the feature free, is it on the tile just
    /// placed) belong to the caller. This only guards the pairing.
    pub fn place(
        &mut self,
        tile: Position,
        at: ContainerRef,
        container: &mut dyn OccupierContainer,
    ) -> Result<()> {
        if self.is_in_play() {
            return Err(EngineError::invariant(format!("{} is already placed", self.id)));
        }
        let role = container.role();
        if role == Role::None {
            return Err(EngineError::invariant("container assigns no role"));
        }
        container.add_occupier(self.id)?;
        self.role = role;
        self.container = Some(at);
        self.tile = Some(tile);
        Ok(())
    }

    /// Take this meeple off `container` and back to the supply.
    ///
    /// Returns the container it left.
    pub fn remove(&mut self, container: &mut dyn OccupierContainer) -> Result<ContainerRef> {
        let Some(at) = self.container.filter(|_| self.is_in_play()) else {
            return Err(EngineError::invariant(format!("{} is not placed", self.id)));
        };
        container.remove_occupier(self.id)?;
        self.role = Role::None;
        self.container = None;
        self.tile = None;
        Ok(at)
    }

    /// Follow a graph merge: `from` was absorbed into `to`.
    pub(crate) fn repoint(&mut self, from: GraphId, to: GraphId) {
        if self.container == Some(ContainerRef::Graph(from)) {
            self.container = Some(ContainerRef::Graph(to));
        }
    }
}
