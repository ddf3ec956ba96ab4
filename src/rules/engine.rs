//! The turn state machine.
//!
//! `GameEngine` owns the map, the players, the draw pile and the action
//! history. Actions go through `execute_action`, which checks the acting
//! player and phase, validates the action completely, applies it and
//! returns the events it produced.
//!
//! ## Turn structure
//!
//! ```text
//! None --Init--> PlaceTile --PlaceTile--> PlacePawn --PlacePawn/PassPawn--> PlaceTile (next player)
//!                    |                                                          |
//!                    +----------- draw pile empty at turn start ----------------+--> GameOver
//! ```
//!
//! A drawn tile that fits nowhere is discarded and the turn passes.
//!
//! ## Cloning
//!
//! Every collection is an `im` persistent structure or a small `Vec`, so
//! `clone()` is cheap and the copy shares no mutable state with the
//! original. The tileset handle is shared read-only.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{
    Action, ActionRecord, EngineError, GameConfig, GameRng, GraphId, IllegalMove, MeepleId,
    PawnTarget, PlayerId, PlayerMap, Result, TileId,
};
use crate::map::{Map, Position, Rotation};
use crate::pawns::{ContainerRef, OccupierContainer, Player};
use crate::tiles::{DataSource, TileDefinition, Tileset};

use super::scoring::{majority, EngineEvent, ScoreCategory, ScoreEvent, ScoreKind};

/// Engine phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Not initialized.
    #[default]
    None,
    /// The current player must place the drawn tile.
    PlaceTile,
    /// The current player may put a meeple on the tile just placed.
    PlacePawn,
    /// No tiles left. Terminal.
    GameOver,
}

/// A single game of tile placement.
#[derive(Clone, Debug)]
pub struct GameEngine {
    config: GameConfig,
    tileset: Arc<dyn Tileset>,
    draw_pile: Vector<TileId>,
    current_tile: Option<TileId>,
    discarded: Vector<TileId>,
    map: Map,
    players: PlayerMap<Player>,
    current_player: PlayerId,
    turn: u32,
    sequence: u32,
    phase: Phase,
    history: Vector<ActionRecord>,
    last_placed: Option<Position>,
    last_events: Vec<EngineEvent>,
}

impl GameEngine {
    // === Construction ===

    /// Build an engine from a data source's configuration and tileset.
    pub fn new(source: &dyn DataSource) -> Result<Self> {
        Self::with_tileset(source.tileset(), &Action::Init(source.initial_config()))
    }

    /// Build an engine at turn zero from an `Init` action, taking the
    /// tileset from `source`.
    pub fn create_from_action(source: &dyn DataSource, initial: &Action) -> Result<Self> {
        Self::with_tileset(source.tileset(), initial)
    }

    /// Build an engine at turn zero from an `Init` action.
    ///
    /// Shuffles the draw pile, records `initial` as history entry 0 and
    /// draws the first tile for player 0.
    pub fn with_tileset(tileset: Arc<dyn Tileset>, initial: &Action) -> Result<Self> {
        let Action::Init(config) = initial else {
            return Err(EngineError::MissingInitialAction);
        };
        config.validate()?;
        if tileset.n_tiles() == 0 {
            return Err(EngineError::Config("tileset is empty".into()));
        }
        let start = tileset.start_tile();
        if tileset.tile(start).is_none() {
            return Err(EngineError::UnknownTile(start));
        }

        let draw_pile: Vector<TileId> = tileset
            .draw_order(&mut GameRng::new(config.seed))
            .into_iter()
            .collect();
        let pool = config.rules.meeples_per_player;

        let mut engine = Self {
            players: PlayerMap::new(config.player_count, |id| Player::new(id, pool)),
            config: config.clone(),
            tileset,
            draw_pile,
            current_tile: None,
            discarded: Vector::new(),
            map: Map::new(),
            current_player: PlayerId::new(0),
            turn: 0,
            sequence: 1,
            phase: Phase::None,
            history: Vector::new(),
            last_placed: None,
            last_events: Vec::new(),
        };
        engine
            .history
            .push_back(ActionRecord::new(PlayerId::new(0), initial.clone(), 0, 0));

        let mut events = Vec::new();
        engine.begin_turn(&mut events)?;
        engine.last_events = events;

        tracing::debug!(
            players = engine.config.player_count,
            seed = engine.config.seed,
            tiles = engine.draw_pile.len() + 1,
            "game initialized"
        );
        Ok(engine)
    }

    // === Actions ===

    /// Apply one action for `player`.
    ///
    /// On error the engine is unchanged, except for `InvariantViolation`,
    /// after which the engine must be discarded.
    pub fn execute_action(&mut self, player: PlayerId, action: &Action) -> Result<Vec<EngineEvent>> {
        let (turn, sequence) = (self.turn, self.sequence);
        let mut events = Vec::new();

        match action {
            Action::Init(_) => {
                return Err(EngineError::InvalidState {
                    expected: Phase::None,
                    actual: self.phase,
                })
            }
            Action::PlaceTile {
                tile,
                position,
                rotation,
            } => self.apply_place_tile(player, *tile, *position, *rotation, &mut events)?,
            Action::PlacePawn { meeple, target } => self.apply_place_pawn(player, *meeple, *target, &mut events)?,
            Action::PassPawn => self.apply_pass(player, &mut events)?,
        }

        self.history
            .push_back(ActionRecord::new(player, action.clone(), turn, sequence));
        if self.turn == turn {
            self.sequence += 1;
        }
        self.refresh_potentials(&mut events)?;

        tracing::debug!(%player, action = action.name(), turn, events = events.len(), "action applied");
        self.last_events = events.clone();
        Ok(events)
    }

    fn check_turn(&self, player: PlayerId, phase: Phase) -> Result<()> {
        if player != self.current_player {
            return Err(EngineError::WrongPlayer {
                expected: self.current_player,
                actual: player,
            });
        }
        if phase != self.phase {
            return Err(EngineError::InvalidState {
                expected: phase,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn definition(&self, tile: TileId) -> Result<Arc<TileDefinition>> {
        self.tileset.tile(tile).ok_or(EngineError::UnknownTile(tile))
    }

    fn apply_place_tile(
        &mut self,
        player: PlayerId,
        tile: TileId,
        position: Position,
        rotation: Rotation,
        events: &mut Vec<EngineEvent>,
    ) -> Result<()> {
        self.check_turn(player, Phase::PlaceTile)?;
        let drawn = self
            .current_tile
            .ok_or_else(|| EngineError::invariant("PlaceTile phase without a drawn tile"))?;
        if tile != drawn {
            return Err(IllegalMove::NotDrawnTile {
                expected: drawn,
                got: tile,
            }
            .into());
        }
        let definition = self.definition(tile)?;

        let outcome = self
            .map
            .place_tile(tile, definition, position, rotation, &self.config.rules)?;
        events.push(EngineEvent::TilePlaced {
            player,
            tile,
            position,
            rotation,
        });

        for &(absorbed, survivor) in &outcome.merges {
            for (_, owner) in self.players.iter_mut() {
                owner.repoint(absorbed, survivor);
            }
            events.push(EngineEvent::GraphsMerged { survivor, absorbed });
        }
        for &id in &outcome.closed {
            self.complete_graph(id, events)?;
        }
        for &cell in &outcome.completed_monasteries {
            self.complete_monastery(cell, events)?;
        }

        self.current_tile = None;
        self.last_placed = Some(position);
        self.phase = Phase::PlacePawn;
        Ok(())
    }

    fn apply_place_pawn(
        &mut self,
        player: PlayerId,
        meeple: MeepleId,
        target: PawnTarget,
        events: &mut Vec<EngineEvent>,
    ) -> Result<()> {
        self.check_turn(player, Phase::PlacePawn)?;
        if meeple.owner != player {
            return Err(IllegalMove::ForeignMeeple(meeple).into());
        }
        let pawn = self
            .players
            .get(player)
            .and_then(|p| p.meeple(meeple.slot))
            .ok_or(IllegalMove::UnknownMeeple(meeple))?;
        if pawn.is_in_play() {
            return Err(IllegalMove::MeepleInPlay(meeple).into());
        }
        let position = self
            .last_placed
            .ok_or_else(|| EngineError::invariant("PlacePawn phase without a placed tile"))?;
        let at = self.claimable(position, target)?;

        let container = self.map.container_mut(at)?;
        let role = container.role();
        self.players
            .get_mut(player)
            .and_then(|p| p.meeple_mut(meeple.slot))
            .ok_or_else(|| EngineError::invariant(format!("{} vanished", meeple)))?
            .place(position, at, container)?;
        events.push(EngineEvent::MeeplePlaced {
            meeple,
            container: at,
            role,
        });
        tracing::debug!(%meeple, ?at, ?role, "meeple placed");

        self.end_turn(events)
    }

    /// Resolve a pawn target on the tile at `position` to a free, open
    /// container.
    fn claimable(&self, position: Position, target: PawnTarget) -> Result<ContainerRef> {
        match target {
            PawnTarget::Segment(segment) => {
                let id = self
                    .map
                    .tile_at(position)
                    .and_then(|t| t.graph(segment as usize))
                    .ok_or_else(|| IllegalMove::NoSuchFeature(format!("segment {}", segment)))?;
                let graph = self
                    .map
                    .graph(id)
                    .ok_or_else(|| EngineError::invariant(format!("{} is not in the arena", id)))?;
                if !graph.is_open() {
                    return Err(IllegalMove::FeatureComplete.into());
                }
                if graph.owner_count() > 0 {
                    return Err(IllegalMove::FeatureOccupied.into());
                }
                Ok(ContainerRef::Graph(id))
            }
            PawnTarget::Monastery => {
                let slot = self
                    .map
                    .monastery(position)
                    .ok_or_else(|| IllegalMove::NoSuchFeature("monastery".into()))?;
                if slot.is_completed() {
                    return Err(IllegalMove::FeatureComplete.into());
                }
                if slot.owner_count() > 0 {
                    return Err(IllegalMove::FeatureOccupied.into());
                }
                Ok(ContainerRef::Monastery(position))
            }
        }
    }

    fn apply_pass(&mut self, player: PlayerId, events: &mut Vec<EngineEvent>) -> Result<()> {
        self.check_turn(player, Phase::PlacePawn)?;
        self.end_turn(events)
    }

    // === Turn flow ===

    fn end_turn(&mut self, events: &mut Vec<EngineEvent>) -> Result<()> {
        self.last_placed = None;
        self.next_player();
        self.begin_turn(events)
    }

    fn next_player(&mut self) {
        self.current_player = self.current_player.next(self.config.player_count);
        self.turn += 1;
        self.sequence = 0;
    }

    /// Draw for the current player, discarding tiles that fit nowhere.
    fn begin_turn(&mut self, events: &mut Vec<EngineEvent>) -> Result<()> {
        while let Some(tile) = self.draw_pile.pop_front() {
            let definition = self.definition(tile)?;
            if self.map.has_legal_placement(&definition) {
                self.current_tile = Some(tile);
                self.phase = Phase::PlaceTile;
                return Ok(());
            }

            tracing::debug!(%tile, player = %self.current_player, "tile fits nowhere, discarded");
            self.discarded.push_back(tile);
            events.push(EngineEvent::TileDiscarded {
                player: self.current_player,
                tile,
            });
            self.next_player();
        }
        self.finish_game(events)
    }

    fn finish_game(&mut self, events: &mut Vec<EngineEvent>) -> Result<()> {
        self.current_tile = None;
        self.phase = Phase::GameOver;

        for score in self.open_feature_scores(ScoreKind::EndGame)? {
            self.award(score, events)?;
        }
        for (_, player) in self.players.iter_mut() {
            player.reset_potential_score();
        }

        let winners = self.winners();
        tracing::info!(turn = self.turn, ?winners, "game over");
        events.push(EngineEvent::GameOver { winners });
        Ok(())
    }

    // === Scoring ===

    fn award(&mut self, score: ScoreEvent, events: &mut Vec<EngineEvent>) -> Result<()> {
        let player = self
            .players
            .get_mut(score.player)
            .ok_or_else(|| EngineError::invariant(format!("{} is not seated", score.player)))?;
        match score.kind {
            ScoreKind::Potential => player.add_potential_score(score.amount),
            ScoreKind::Completed | ScoreKind::EndGame => player.add_score(score.amount),
        }
        events.push(EngineEvent::Score(score));
        Ok(())
    }

    fn complete_graph(&mut self, id: GraphId, events: &mut Vec<EngineEvent>) -> Result<()> {
        let rules = self.config.rules;
        let graph = self.map.graph_mut(id)?;
        let (value, scorers) = graph.close(&rules)?;
        let owners = graph.occupiers().to_vec();
        let category = ScoreCategory::from(graph.kind());
        let source = ContainerRef::Graph(id);

        events.push(EngineEvent::FeatureCompleted {
            source,
            category,
            owners: owners.len(),
        });
        tracing::info!(graph = %id, ?category, value, owners = owners.len(), "feature completed");

        for player in scorers {
            self.award(
                ScoreEvent {
                    player,
                    amount: value,
                    source,
                    category,
                    kind: ScoreKind::Completed,
                },
                events,
            )?;
        }
        for meeple in owners {
            self.return_meeple(meeple, source, events)?;
        }
        Ok(())
    }

    fn complete_monastery(&mut self, position: Position, events: &mut Vec<EngineEvent>) -> Result<()> {
        let slot = self.map.monastery_mut(position)?;
        slot.complete()?;
        let occupant = slot.occupant();
        let source = ContainerRef::Monastery(position);
        let value = self.map.monastery_value(position);

        events.push(EngineEvent::FeatureCompleted {
            source,
            category: ScoreCategory::Monastery,
            owners: usize::from(occupant.is_some()),
        });
        tracing::info!(%position, value, "monastery completed");

        if let Some(meeple) = occupant {
            self.award(
                ScoreEvent {
                    player: meeple.owner,
                    amount: value,
                    source,
                    category: ScoreCategory::Monastery,
                    kind: ScoreKind::Completed,
                },
                events,
            )?;
            self.return_meeple(meeple, source, events)?;
        }
        Ok(())
    }

    fn return_meeple(&mut self, meeple: MeepleId, source: ContainerRef, events: &mut Vec<EngineEvent>) -> Result<()> {
        let container = self.map.container_mut(source)?;
        self.players
            .get_mut(meeple.owner)
            .and_then(|p| p.meeple_mut(meeple.slot))
            .ok_or_else(|| EngineError::invariant(format!("{} is not in any pool", meeple)))?
            .remove(container)?;
        events.push(EngineEvent::MeepleReturned {
            meeple,
            container: source,
        });
        Ok(())
    }

    /// Current value of every occupied open feature, per majority owner.
    fn open_feature_scores(&self, kind: ScoreKind) -> Result<Vec<ScoreEvent>> {
        let rules = &self.config.rules;
        let mut scores = Vec::new();

        for graph in self.map.open_graphs().filter(|g| g.owner_count() > 0) {
            let amount = self.map.feature_value(graph.id(), rules, false)?;
            if amount == 0 {
                continue;
            }
            let category = ScoreCategory::from(graph.kind());
            scores.extend(majority(graph.occupiers()).into_iter().map(|player| ScoreEvent {
                player,
                amount,
                source: ContainerRef::Graph(graph.id()),
                category,
                kind,
            }));
        }

        for slot in self.map.monasteries().filter(|m| !m.is_completed()) {
            if let Some(meeple) = slot.occupant() {
                scores.push(ScoreEvent {
                    player: meeple.owner,
                    amount: self.map.monastery_value(slot.position()),
                    source: ContainerRef::Monastery(slot.position()),
                    category: ScoreCategory::Monastery,
                    kind,
                });
            }
        }
        Ok(scores)
    }

    /// Recompute every player's potential score from scratch.
    fn refresh_potentials(&mut self, events: &mut Vec<EngineEvent>) -> Result<()> {
        if self.phase == Phase::GameOver {
            return Ok(());
        }
        let scores = self.open_feature_scores(ScoreKind::Potential)?;
        for (_, player) in self.players.iter_mut() {
            player.reset_potential_score();
        }
        for score in scores {
            self.award(score, events)?;
        }
        Ok(())
    }

    // === Queries ===

    /// Every action the current player may submit, in a fixed order.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        match self.phase {
            Phase::PlaceTile => {
                let Some((tile, definition)) = self
                    .current_tile
                    .and_then(|t| self.tileset.tile(t).map(|d| (t, d)))
                else {
                    return Vec::new();
                };
                self.map
                    .legal_placements(&definition)
                    .into_iter()
                    .map(|(position, rotation)| Action::PlaceTile {
                        tile,
                        position,
                        rotation,
                    })
                    .collect()
            }
            Phase::PlacePawn => {
                let mut actions = vec![Action::PassPawn];
                let meeple = self
                    .players
                    .get(self.current_player)
                    .and_then(Player::first_available);
                let (Some(meeple), Some(position)) = (meeple, self.last_placed) else {
                    return actions;
                };
                let segments = self
                    .map
                    .tile_at(position)
                    .map_or(0, |t| t.definition().segments.len());
                let targets = (0..segments as u8)
                    .map(PawnTarget::Segment)
                    .chain(std::iter::once(PawnTarget::Monastery));
                actions.extend(
                    targets
                        .filter(|&target| self.claimable(position, target).is_ok())
                        .map(|target| Action::PlacePawn { meeple, target }),
                );
                actions
            }
            Phase::None | Phase::GameOver => Vec::new(),
        }
    }

    /// Players with the highest `end_score`, in seat order.
    #[must_use]
    pub fn winners(&self) -> Vec<PlayerId> {
        let Some(best) = self.players.values().map(Player::end_score).max() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|(_, p)| p.end_score() == best)
            .map(|(id, _)| id)
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Shared handle to the tileset.
    #[must_use]
    pub fn tileset(&self) -> &Arc<dyn Tileset> {
        &self.tileset
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Completed turns. Discards count as turns.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    /// The tile the current player must place.
    #[must_use]
    pub fn current_tile(&self) -> Option<TileId> {
        self.current_tile
    }

    /// Tiles still face down.
    #[must_use]
    pub fn remaining_tiles(&self) -> usize {
        self.draw_pile.len()
    }

    /// Tiles removed because they fit nowhere, in discard order.
    pub fn discarded(&self) -> impl Iterator<Item = TileId> + '_ {
        self.discarded.iter().copied()
    }

    /// Position of the tile placed this turn, during `PlacePawn`.
    #[must_use]
    pub fn last_placed(&self) -> Option<Position> {
        self.last_placed
    }

    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<Player> {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Every applied action, `Init` first.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    /// Events of the most recent action (or of initialization).
    #[must_use]
    pub fn last_events(&self) -> &[EngineEvent] {
        &self.last_events
    }
}
