//! Per-turn game statistics.
//!
//! `Statistics::collect` replays an engine's history on a fresh engine and
//! samples it after the last action of every turn. Points are attributed
//! by consuming the `EngineEvent` stream of each action, so the numbers
//! always agree with what the engine actually awarded.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{ActionRecord, EngineError, GraphId, PlayerId, Result};
use crate::pawns::{ContainerRef, OccupierContainer, Player, Role};
use crate::rules::{EngineEvent, GameEngine, Phase, ScoreCategory, ScoreEvent, ScoreKind};
use crate::tiles::{FeatureKind, Tileset};

/// Points split by where they came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBreakdown {
    /// `real + potential`.
    pub total: i32,
    /// Points already awarded.
    pub real: i32,
    /// Current value of open features.
    pub potential: i32,

    pub from_roads: i32,
    pub from_cities: i32,
    pub from_monasteries: i32,
    /// Farms only score at game end.
    pub from_farms: i32,

    pub potential_from_roads: i32,
    pub potential_from_cities: i32,
    pub potential_from_monasteries: i32,
    pub potential_from_farms: i32,
}

impl PointsBreakdown {
    fn record(&mut self, score: &ScoreEvent) {
        let slot = match (score.kind, score.category) {
            (ScoreKind::Potential, ScoreCategory::Road) => &mut self.potential_from_roads,
            (ScoreKind::Potential, ScoreCategory::City) => &mut self.potential_from_cities,
            (ScoreKind::Potential, ScoreCategory::Monastery) => &mut self.potential_from_monasteries,
            (ScoreKind::Potential, ScoreCategory::Farm) => &mut self.potential_from_farms,
            (_, ScoreCategory::Road) => &mut self.from_roads,
            (_, ScoreCategory::City) => &mut self.from_cities,
            (_, ScoreCategory::Monastery) => &mut self.from_monasteries,
            (_, ScoreCategory::Farm) => &mut self.from_farms,
        };
        *slot += score.amount;
    }

    fn clear_potential(&mut self) {
        self.potential_from_roads = 0;
        self.potential_from_cities = 0;
        self.potential_from_monasteries = 0;
        self.potential_from_farms = 0;
    }

    fn add(&mut self, other: &PointsBreakdown) {
        self.total += other.total;
        self.real += other.real;
        self.potential += other.potential;
        self.from_roads += other.from_roads;
        self.from_cities += other.from_cities;
        self.from_monasteries += other.from_monasteries;
        self.from_farms += other.from_farms;
        self.potential_from_roads += other.potential_from_roads;
        self.potential_from_cities += other.potential_from_cities;
        self.potential_from_monasteries += other.potential_from_monasteries;
        self.potential_from_farms += other.potential_from_farms;
    }
}

/// One player at the end of a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub id: PlayerId,
    pub points: PointsBreakdown,

    // Pool right now.
    pub available_meeples: usize,
    pub placed_meeples: usize,
    pub total_meeples: usize,
    pub knights: usize,
    pub highwaymen: usize,
    pub monks: usize,
    pub farmers: usize,

    // Placements since the game started.
    pub total_placed_meeples: usize,
    pub total_placed_knights: usize,
    pub total_placed_highwaymen: usize,
    pub total_placed_monks: usize,
    pub total_placed_farmers: usize,

    /// Completed features this player scored.
    pub finished_projects: usize,
    pub finished_roads: usize,
    pub finished_cities: usize,
    pub finished_monasteries: usize,

    /// Open features holding at least one of this player's meeples.
    pub involved_projects: usize,
    /// Involved features holding more than one meeple.
    pub contested_projects: usize,
    /// Involved farms.
    pub farms: usize,
}

impl PlayerStats {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            points: PointsBreakdown::default(),
            available_meeples: 0,
            placed_meeples: 0,
            total_meeples: 0,
            knights: 0,
            highwaymen: 0,
            monks: 0,
            farmers: 0,
            total_placed_meeples: 0,
            total_placed_knights: 0,
            total_placed_highwaymen: 0,
            total_placed_monks: 0,
            total_placed_farmers: 0,
            finished_projects: 0,
            finished_roads: 0,
            finished_cities: 0,
            finished_monasteries: 0,
            involved_projects: 0,
            contested_projects: 0,
            farms: 0,
        }
    }

    fn record_placement(&mut self, role: Role) {
        self.total_placed_meeples += 1;
        match role {
            Role::Knight => self.total_placed_knights += 1,
            Role::Highwayman => self.total_placed_highwaymen += 1,
            Role::Monk => self.total_placed_monks += 1,
            Role::Farmer => self.total_placed_farmers += 1,
            Role::None => {}
        }
    }

    fn record_score(&mut self, score: &ScoreEvent) {
        self.points.record(score);
        if score.kind != ScoreKind::Completed {
            return;
        }
        self.finished_projects += 1;
        match score.category {
            ScoreCategory::Road => self.finished_roads += 1,
            ScoreCategory::City => self.finished_cities += 1,
            ScoreCategory::Monastery => self.finished_monasteries += 1,
            ScoreCategory::Farm => {}
        }
    }

    /// Refresh the fields read straight off the engine.
    fn sample(&mut self, player: &Player, engine: &GameEngine) {
        self.points.real = player.score();
        self.points.potential = player.potential_score();
        self.points.total = player.end_score();
        self.available_meeples = player.available_meeples();
        self.placed_meeples = player.placed_meeples();
        self.total_meeples = player.total_meeples();
        self.knights = player.knights();
        self.highwaymen = player.highwaymen();
        self.monks = player.monks();
        self.farmers = player.farmers();

        let graphs: FxHashSet<GraphId> = player
            .meeples()
            .iter()
            .filter_map(|m| match m.container() {
                Some(ContainerRef::Graph(id)) => Some(id),
                _ => None,
            })
            .collect();
        let map = engine.map();
        self.involved_projects = graphs.len() + self.monks;
        self.contested_projects = graphs
            .iter()
            .filter_map(|id| map.graph(*id))
            .filter(|g| g.owner_count() > 1)
            .count();
        self.farms = graphs
            .iter()
            .filter_map(|id| map.graph(*id))
            .filter(|g| g.kind() == FeatureKind::Farm)
            .count();
    }
}

/// The whole table at the end of one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStatistics {
    pub turn: u32,
    /// Players leading on `end_score` after this turn.
    pub winners: Vec<PlayerId>,
    /// Sum of every player's breakdown.
    pub combined: PointsBreakdown,
    pub placed_tiles: usize,
    pub discarded_tiles: usize,

    /// Occupied open roads, cities and farms.
    pub open_projects: usize,
    pub contested_projects: usize,
    /// Open features nobody occupies.
    pub orphaned_projects: usize,
    pub open_roads: usize,
    pub open_cities: usize,
    pub open_monasteries: usize,
    pub farms: usize,

    // Cumulative.
    pub finished_projects: usize,
    pub finished_roads: usize,
    pub finished_cities: usize,
    pub finished_monasteries: usize,

    pub meeples_in_play: usize,
    pub knights: usize,
    pub highwaymen: usize,
    pub monks: usize,
    pub farmers: usize,

    pub players: Vec<PlayerStats>,
}

/// Game-wide means over the sampled turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub meeples_in_play_per_turn: f64,
    pub points_per_turn: f64,
    pub open_projects_per_turn: f64,
    pub finished_projects_per_turn: f64,
    pub meeples_in_play_per_player_per_turn: f64,
    pub points_per_player_per_turn: f64,
    pub finished_projects_per_player_per_turn: f64,
}

impl Averages {
    fn compute(turns: &[TurnStatistics], player_count: usize) -> Self {
        let Some(last) = turns.last() else {
            return Self::default();
        };
        let n = turns.len() as f64;
        let players = player_count.max(1) as f64;
        let mean = |f: fn(&TurnStatistics) -> usize| turns.iter().map(f).sum::<usize>() as f64 / n;

        let meeples = mean(|t| t.meeples_in_play);
        let points = f64::from(last.combined.total) / n;
        let finished = last.finished_projects as f64 / n;
        Self {
            meeples_in_play_per_turn: meeples,
            points_per_turn: points,
            open_projects_per_turn: mean(|t| t.open_projects),
            finished_projects_per_turn: finished,
            meeples_in_play_per_player_per_turn: meeples / players,
            points_per_player_per_turn: points / players,
            finished_projects_per_player_per_turn: finished / players,
        }
    }
}

/// Statistics for a whole game.
///
/// ## Example
///
/// ```
/// use rust_carcassonne::core::GameConfig;
/// use rust_carcassonne::replay::Statistics;
/// use rust_carcassonne::rules::GameEngine;
/// use rust_carcassonne::tiles::{standard, StaticSource};
///
/// let source = StaticSource::new(GameConfig::new(2, 4), standard::small_set().unwrap());
/// let mut engine = GameEngine::new(&source).unwrap();
/// while let Some(action) = engine.legal_actions().into_iter().next() {
///     let player = engine.current_player();
///     engine.execute_action(player, &action).unwrap();
/// }
///
/// let stats = Statistics::collect(&engine, false).unwrap();
/// assert!(stats.ended);
/// assert_eq!(stats.placed_tiles, engine.map().tile_count());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub seed: u64,
    pub turns: u32,
    pub player_count: usize,
    pub placed_tiles: usize,
    pub total_tiles: usize,
    pub final_phase: Phase,
    pub ended: bool,
    /// Empty unless the game is over.
    pub winners: Vec<PlayerId>,
    pub turns_data: Vec<TurnStatistics>,
    /// The replayed history, when requested.
    pub actions: Option<Vec<ActionRecord>>,
    pub averages: Averages,
}

impl Statistics {
    /// Gather statistics by replaying `engine`'s history.
    pub fn collect(engine: &GameEngine, record_actions: bool) -> Result<Self> {
        let records: Vec<ActionRecord> = engine.history().iter().cloned().collect();
        Self::from_history(Arc::clone(engine.tileset()), &records, record_actions)
    }

    /// Gather statistics by replaying `records` against `tileset`.
    ///
    /// Fails with `EmptyHistory` when there is nothing to replay and with
    /// `MissingInitialAction` when the first record is not `Init`.
    pub fn from_history(tileset: Arc<dyn Tileset>, records: &[ActionRecord], record_actions: bool) -> Result<Self> {
        let (first, rest) = records.split_first().ok_or(EngineError::EmptyHistory)?;
        if !first.action.is_init() {
            return Err(EngineError::MissingInitialAction);
        }
        let mut state = GameEngine::with_tileset(Arc::clone(&tileset), &first.action)?;
        let player_count = state.config().player_count;

        let mut collector = Collector::new(player_count);
        collector.consume(state.last_events());

        for (index, record) in rest.iter().enumerate() {
            let events = state.execute_action(record.player, &record.action)?;
            collector.consume(&events);

            let turn_ends = rest.get(index + 1).map_or(true, |next| next.turn != record.turn);
            if turn_ends {
                collector.sample(record.turn, &state);
            }
        }

        let ended = state.is_game_over();
        let averages = Averages::compute(&collector.turns, player_count);
        tracing::debug!(turns = collector.turns.len(), ended, "statistics collected");

        Ok(Self {
            seed: state.config().seed,
            turns: state.turn(),
            player_count,
            placed_tiles: state.map().tile_count(),
            total_tiles: tileset.n_tiles(),
            final_phase: state.phase(),
            ended,
            winners: if ended { state.winners() } else { Vec::new() },
            turns_data: collector.turns,
            actions: record_actions.then(|| records.to_vec()),
            averages,
        })
    }

    /// Statistics after the last sampled turn.
    #[must_use]
    pub fn final_turn(&self) -> Option<&TurnStatistics> {
        self.turns_data.last()
    }
}

/// Running counters carried from one turn to the next.
struct Collector {
    players: Vec<PlayerStats>,
    finished_projects: usize,
    finished_roads: usize,
    finished_cities: usize,
    finished_monasteries: usize,
    turns: Vec<TurnStatistics>,
}

impl Collector {
    fn new(player_count: usize) -> Self {
        Self {
            players: PlayerId::all(player_count).map(PlayerStats::new).collect(),
            finished_projects: 0,
            finished_roads: 0,
            finished_cities: 0,
            finished_monasteries: 0,
            turns: Vec::new(),
        }
    }

    fn consume(&mut self, events: &[EngineEvent]) {
        // Potential scores are recomputed from scratch after every action.
        for stats in &mut self.players {
            stats.points.clear_potential();
        }

        for event in events {
            match event {
                EngineEvent::Score(score) => {
                    if let Some(stats) = self.players.get_mut(score.player.index()) {
                        stats.record_score(score);
                    }
                }
                EngineEvent::MeeplePlaced { meeple, role, .. } => {
                    if let Some(stats) = self.players.get_mut(meeple.owner.index()) {
                        stats.record_placement(*role);
                    }
                }
                EngineEvent::FeatureCompleted { category, owners, .. } if *owners > 0 => {
                    self.finished_projects += 1;
                    match category {
                        ScoreCategory::Road => self.finished_roads += 1,
                        ScoreCategory::City => self.finished_cities += 1,
                        ScoreCategory::Monastery => self.finished_monasteries += 1,
                        ScoreCategory::Farm => {}
                    }
                }
                _ => {}
            }
        }
    }

    fn sample(&mut self, turn: u32, engine: &GameEngine) {
        for (id, player) in engine.players().iter() {
            if let Some(stats) = self.players.get_mut(id.index()) {
                stats.sample(player, engine);
            }
        }

        let map = engine.map();
        let mut open_projects = 0;
        let mut contested_projects = 0;
        let mut orphaned_projects = 0;
        let mut open_roads = 0;
        let mut open_cities = 0;
        let mut farms = 0;
        for graph in map.open_graphs() {
            if graph.owner_count() == 0 {
                orphaned_projects += 1;
                continue;
            }
            open_projects += 1;
            if graph.owner_count() > 1 {
                contested_projects += 1;
            }
            match graph.kind() {
                FeatureKind::Road => open_roads += 1,
                FeatureKind::City => open_cities += 1,
                FeatureKind::Farm => farms += 1,
            }
        }

        let mut combined = PointsBreakdown::default();
        for stats in &self.players {
            combined.add(&stats.points);
        }
        let players = engine.players();

        self.turns.push(TurnStatistics {
            turn,
            winners: engine.winners(),
            combined,
            placed_tiles: map.tile_count(),
            discarded_tiles: engine.discarded().count(),
            open_projects,
            contested_projects,
            orphaned_projects,
            open_roads,
            open_cities,
            open_monasteries: map
                .monasteries()
                .filter(|m| !m.is_completed() && m.owner_count() > 0)
                .count(),
            farms,
            finished_projects: self.finished_projects,
            finished_roads: self.finished_roads,
            finished_cities: self.finished_cities,
            finished_monasteries: self.finished_monasteries,
            meeples_in_play: players.values().map(Player::placed_meeples).sum(),
            knights: players.values().map(Player::knights).sum(),
            highwaymen: players.values().map(Player::highwaymen).sum(),
            monks: players.values().map(Player::monks).sum(),
            farmers: players.values().map(Player::farmers).sum(),
            players: self.players.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, MeepleId};
    use crate::map::Position;

    fn score(kind: ScoreKind, category: ScoreCategory, amount: i32) -> ScoreEvent {
        ScoreEvent {
            player: PlayerId::new(0),
            amount,
            source: ContainerRef::Monastery(Position::ORIGIN),
            category,
            kind,
        }
    }

    #[test]
    fn test_breakdown_routes_by_kind_and_category() {
        let mut points = PointsBreakdown::default();
        points.record(&score(ScoreKind::Completed, ScoreCategory::City, 6));
        points.record(&score(ScoreKind::EndGame, ScoreCategory::Farm, 3));
        points.record(&score(ScoreKind::Potential, ScoreCategory::Road, 2));

        assert_eq!(points.from_cities, 6);
        assert_eq!(points.from_farms, 3);
        assert_eq!(points.potential_from_roads, 2);
        points.clear_potential();
        assert_eq!(points.potential_from_roads, 0);
        assert_eq!(points.from_cities, 6);
    }

    #[test]
    fn test_collector_counts_placements_and_completions() {
        let mut collector = Collector::new(2);
        let meeple = MeepleId::new(PlayerId::new(1), 0);
        let source = ContainerRef::Graph(GraphId::new(0));
        collector.consume(&[
            EngineEvent::MeeplePlaced {
                meeple,
                container: source,
                role: Role::Highwayman,
            },
            EngineEvent::FeatureCompleted {
                source,
                category: ScoreCategory::Road,
                owners: 1,
            },
            EngineEvent::FeatureCompleted {
                source: ContainerRef::Graph(GraphId::new(4)),
                category: ScoreCategory::City,
                owners: 0,
            },
        ]);

        assert_eq!(collector.players[1].total_placed_highwaymen, 1);
        assert_eq!(collector.players[1].total_placed_meeples, 1);
        assert_eq!(collector.finished_projects, 1);
        assert_eq!(collector.finished_roads, 1);
        assert_eq!(collector.finished_cities, 0);
    }

    #[test]
    fn test_empty_history_fails_fast() {
        let tileset: Arc<dyn Tileset> = Arc::new(crate::tiles::standard::small_set().unwrap());
        let err = Statistics::from_history(tileset, &[], true).unwrap_err();
        assert_eq!(err, EngineError::EmptyHistory);
    }

    #[test]
    fn test_averages_of_nothing() {
        assert_eq!(Averages::compute(&[], 2), Averages::default());
    }

    #[test]
    fn test_fresh_game_has_no_turns() {
        let source = crate::tiles::StaticSource::new(GameConfig::new(2, 1), crate::tiles::standard::small_set().unwrap());
        let engine = GameEngine::new(&source).unwrap();
        let stats = Statistics::collect(&engine, true).unwrap();
        assert!(stats.turns_data.is_empty());
        assert!(!stats.ended);
        assert!(stats.winners.is_empty());
        assert_eq!(stats.actions.as_ref().map(Vec::len), Some(1));
        assert_eq!(stats.total_tiles, 10);
    }
}
