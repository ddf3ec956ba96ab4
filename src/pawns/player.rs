//! A seat at the table: score and meeple pool.
//!
//! Meeple counts are derived from the pool on every call, never stored.

use serde::{Deserialize, Serialize};

use super::meeple::{Meeple, Role};
use crate::core::{GraphId, MeepleId, PlayerId};

/// Player state for one seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    score: i32,
    potential_score: i32,
    meeples: Vec<Meeple>,
}

impl Player {
    /// Create a player with `pool_size` meeples in supply.
    #[must_use]
    pub fn new(id: PlayerId, pool_size: u8) -> Self {
        Self {
            id,
            score: 0,
            potential_score: 0,
            meeples: (0..pool_size)
                .map(|slot| Meeple::new(MeepleId::new(id, slot)))
                .collect(),
        }
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Points from completed features and end-of-game scoring.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Points the player's open features would be worth right now.
    #[must_use]
    pub fn potential_score(&self) -> i32 {
        self.potential_score
    }

    /// `score + potential_score`.
    #[must_use]
    pub fn end_score(&self) -> i32 {
        self.score + self.potential_score
    }

    pub(crate) fn add_score(&mut self, amount: i32) {
        self.score += amount;
    }

    pub(crate) fn add_potential_score(&mut self, amount: i32) {
        self.potential_score += amount;
    }

    pub(crate) fn reset_potential_score(&mut self) {
        self.potential_score = 0;
    }

    /// The whole pool, in slot order.
    #[must_use]
    pub fn meeples(&self) -> &[Meeple] {
        &self.meeples
    }

    #[must_use]
    pub fn meeple(&self, slot: u8) -> Option<&Meeple> {
        self.meeples.get(slot as usize)
    }

    pub(crate) fn meeple_mut(&mut self, slot: u8) -> Option<&mut Meeple> {
        self.meeples.get_mut(slot as usize)
    }

    /// Lowest-slot meeple in supply.
    #[must_use]
    pub fn first_available(&self) -> Option<MeepleId> {
        self.meeples
            .iter()
            .find(|m| !m.is_in_play())
            .map(Meeple::id)
    }

    #[must_use]
    pub fn total_meeples(&self) -> usize {
        self.meeples.len()
    }

    #[must_use]
    pub fn placed_meeples(&self) -> usize {
        self.meeples.iter().filter(|m| m.is_in_play()).count()
    }

    #[must_use]
    pub fn available_meeples(&self) -> usize {
        self.total_meeples() - self.placed_meeples()
    }

    /// Placed meeples holding `role`.
    #[must_use]
    pub fn count_role(&self, role: Role) -> usize {
        self.meeples.iter().filter(|m| m.role() == role).count()
    }

    #[must_use]
    pub fn farmers(&self) -> usize {
        self.count_role(Role::Farmer)
    }

    #[must_use]
    pub fn knights(&self) -> usize {
        self.count_role(Role::Knight)
    }

    #[must_use]
    pub fn highwaymen(&self) -> usize {
        self.count_role(Role::Highwayman)
    }

    #[must_use]
    pub fn monks(&self) -> usize {
        self.count_role(Role::Monk)
    }

    pub(crate) fn repoint(&mut self, from: GraphId, to: GraphId) {
        for meeple in &mut self.meeples {
            meeple.repoint(from, to);
        }
    }
}
