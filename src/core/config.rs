//! Game configuration types.
//!
//! A game is fully determined by its `GameConfig` and its tileset:
//! - `GameConfig`: player count, seed and the rule constants
//! - `ScoringRules`: point values, meeple pool size, monastery threshold
//!
//! The config travels inside the `Init` action, so a recorded history is
//! self-describing apart from the tileset.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// Point values and pool sizes for the reference rule set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Meeples each player owns for the whole game.
    pub meeples_per_player: u8,

    /// Points per tile of a completed road (also at game end).
    pub road_tile_points: i32,

    /// Points per tile of a completed city.
    pub city_tile_points: i32,

    /// Points per shield of a completed city.
    pub city_shield_points: i32,

    /// Points per tile of a city left open at game end.
    pub open_city_tile_points: i32,

    /// Points per shield of a city left open at game end.
    pub open_city_shield_points: i32,

    /// Points a farm earns per distinct completed city it borders.
    pub farm_city_points: i32,

    /// Surrounding tiles a monastery needs to complete.
    pub monastery_neighbors: u8,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            meeples_per_player: 7,
            road_tile_points: 1,
            city_tile_points: 2,
            city_shield_points: 2,
            open_city_tile_points: 1,
            open_city_shield_points: 1,
            farm_city_points: 3,
            monastery_neighbors: 8,
        }
    }
}

/// Initial configuration of a game.
///
/// ## Example
///
/// ```
/// use rust_carcassonne::core::GameConfig;
///
/// let config = GameConfig::new(3, 99).with_meeples(5);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.rules.meeples_per_player, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of seats.
    pub player_count: usize,

    /// Seed for the draw-pile shuffle.
    pub seed: u64,

    /// Rule constants.
    pub rules: ScoringRules,
}

impl GameConfig {
    /// Smallest supported table.
    pub const MIN_PLAYERS: usize = 2;
    /// Largest supported table.
    pub const MAX_PLAYERS: usize = 6;

    /// Create a configuration with the reference rules.
    #[must_use]
    pub fn new(player_count: usize, seed: u64) -> Self {
        Self {
            player_count,
            seed,
            rules: ScoringRules::default(),
        }
    }

    /// Replace the rule constants.
    #[must_use]
    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the meeple pool size.
    #[must_use]
    pub fn with_meeples(mut self, count: u8) -> Self {
        self.rules.meeples_per_player = count;
        self
    }

    /// Check the configuration before any engine state is built from it.
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_PLAYERS..=Self::MAX_PLAYERS).contains(&self.player_count) {
            return Err(EngineError::Config(format!(
                "player count must be {}-{}, got {}",
                Self::MIN_PLAYERS,
                Self::MAX_PLAYERS,
                self.player_count
            )));
        }
        if self.rules.monastery_neighbors > 8 {
            return Err(EngineError::Config(format!(
                "a monastery has at most 8 neighbors, threshold is {}",
                self.rules.monastery_neighbors
            )));
        }
        Ok(())
    }
}
