//! Tileset and data-source boundaries, plus the in-memory registry.
//!
//! The engine never owns tile data. It asks a `Tileset` for a tile's
//! shape by `TileId` and for the draw order, and it asks a `DataSource`
//! once for the initial configuration. `TileRegistry` and `StaticSource`
//! are the in-memory implementations used by tests and tools.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::TileDefinition;
use crate::core::{EngineError, GameConfig, GameRng, Result, TileId};

/// Provider of tile shapes.
pub trait Tileset: Send + Sync + std::fmt::Debug {
    /// Total number of physical tiles.
    fn n_tiles(&self) -> usize;

    /// Shape of a tile, or `None` for an unknown id.
    fn tile(&self, id: TileId) -> Option<Arc<TileDefinition>>;

    /// The tile placed first in every game.
    fn start_tile(&self) -> TileId;

    /// Deterministic draw order: the start tile first, every other tile
    /// shuffled by `rng`.
    fn draw_order(&self, rng: &mut GameRng) -> Vec<TileId> {
        let start = self.start_tile();
        let mut rest: Vec<TileId> = (0..self.n_tiles() as u16)
            .map(TileId::new)
            .filter(|&t| t != start)
            .collect();
        rng.shuffle(&mut rest);

        std::iter::once(start).chain(rest).collect()
    }
}

/// Supplier of a game's initial configuration and tileset.
pub trait DataSource {
    /// Configuration consumed once when the engine is built.
    fn initial_config(&self) -> GameConfig;

    /// Tileset handle shared by the engine and all of its clones.
    fn tileset(&self) -> Arc<dyn Tileset>;
}

/// In-memory tileset.
///
/// ## Example
///
/// ```
/// use rust_carcassonne::tiles::{standard, TileRegistry, Tileset};
///
/// let mut registry = TileRegistry::new();
/// let start = registry.register(standard::start()).unwrap();
/// registry.register_copies(standard::straight_road(), 3).unwrap();
///
/// assert_eq!(registry.n_tiles(), 4);
/// assert_eq!(registry.start_tile(), start);
/// assert_eq!(registry.find_by_name("straight road").len(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TileRegistry {
    tiles: Vec<Arc<TileDefinition>>,
    by_name: FxHashMap<String, Vec<TileId>>,
    start: TileId,
}

impl TileRegistry {
    /// Create a new empty registry. The first registered tile is the start
    /// tile unless `set_start` says otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one physical tile. Fails if the shape is malformed.
    pub fn register(&mut self, definition: TileDefinition) -> Result<TileId> {
        definition.validate()?;
        self.push(Arc::new(definition))
    }

    /// Register `count` physical tiles sharing one shape.
    pub fn register_copies(&mut self, definition: TileDefinition, count: usize) -> Result<Vec<TileId>> {
        definition.validate()?;
        let shared = Arc::new(definition);
        (0..count).map(|_| self.push(Arc::clone(&shared))).collect()
    }

    fn push(&mut self, definition: Arc<TileDefinition>) -> Result<TileId> {
        let raw = u16::try_from(self.tiles.len())
            .map_err(|_| EngineError::Config("tileset holds more than 65535 tiles".into()))?;
        let id = TileId::new(raw);
        self.by_name
            .entry(definition.name.clone())
            .or_default()
            .push(id);
        self.tiles.push(definition);
        Ok(id)
    }

    /// Choose the start tile.
    pub fn set_start(&mut self, id: TileId) -> Result<()> {
        if id.index() >= self.tiles.len() {
            return Err(EngineError::UnknownTile(id));
        }
        self.start = id;
        Ok(())
    }

    /// All tiles sharing a shape name, in registration order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> &[TileId] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl Tileset for TileRegistry {
    fn n_tiles(&self) -> usize {
        self.tiles.len()
    }

    fn tile(&self, id: TileId) -> Option<Arc<TileDefinition>> {
        self.tiles.get(id.index()).cloned()
    }

    fn start_tile(&self) -> TileId {
        self.start
    }
}

/// A data source holding a fixed configuration and tileset.
#[derive(Clone, Debug)]
pub struct StaticSource {
    config: GameConfig,
    tileset: Arc<dyn Tileset>,
}

impl StaticSource {
    /// Create a new source.
    pub fn new(config: GameConfig, tileset: impl Tileset + 'static) -> Self {
        Self {
            config,
            tileset: Arc::new(tileset),
        }
    }

    /// Create a source sharing an existing tileset handle.
    #[must_use]
    pub fn with_shared(config: GameConfig, tileset: Arc<dyn Tileset>) -> Self {
        Self { config, tileset }
    }
}

impl DataSource for StaticSource {
    fn initial_config(&self) -> GameConfig {
        self.config.clone()
    }

    fn tileset(&self) -> Arc<dyn Tileset> {
        Arc::clone(&self.tileset)
    }
}
