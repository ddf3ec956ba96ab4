//! Statistics gathered by replaying finished and unfinished games.

use std::sync::Arc;

use rust_carcassonne::core::{Action, EngineError, GameConfig, PawnTarget, PlayerId};
use rust_carcassonne::map::{Position, Rotation};
use rust_carcassonne::replay::Statistics;
use rust_carcassonne::rules::GameEngine;
use rust_carcassonne::tiles::{standard, StaticSource, TileRegistry, Tileset};

fn finished_game(seed: u64, players: usize) -> GameEngine {
    let source = StaticSource::new(GameConfig::new(players, seed), standard::base_set().unwrap());
    let mut engine = GameEngine::new(&source).unwrap();
    // Prefer claiming something whenever possible.
    while let Some(action) = engine.legal_actions().into_iter().last() {
        let player = engine.current_player();
        engine.execute_action(player, &action).unwrap();
    }
    engine
}

#[test]
fn test_empty_history_fails_fast() {
    let tileset: Arc<dyn Tileset> = Arc::new(standard::small_set().unwrap());
    assert_eq!(
        Statistics::from_history(tileset, &[], false).unwrap_err(),
        EngineError::EmptyHistory
    );
}

#[test]
fn test_history_without_init_fails() {
    let engine = finished_game(1, 2);
    let records: Vec<_> = engine.history().iter().skip(1).cloned().collect();
    assert_eq!(
        Statistics::from_history(engine.tileset().clone(), &records, false).unwrap_err(),
        EngineError::MissingInitialAction
    );
}

#[test]
fn test_finished_game_totals_agree_with_engine() {
    let engine = finished_game(31, 3);
    let stats = Statistics::collect(&engine, true).unwrap();

    assert!(stats.ended);
    assert_eq!(stats.player_count, 3);
    assert_eq!(stats.seed, 31);
    assert_eq!(stats.winners, engine.winners());
    assert_eq!(stats.placed_tiles, engine.map().tile_count());
    assert_eq!(stats.total_tiles, engine.tileset().n_tiles());
    assert_eq!(stats.placed_tiles + engine.discarded().count(), stats.total_tiles);
    assert_eq!(stats.actions.as_ref().map(Vec::len), Some(engine.history().len()));

    let last = stats.final_turn().unwrap();
    let total: i32 = engine.players().values().map(|p| p.score()).sum();
    assert_eq!(last.combined.real, total);
    assert_eq!(last.combined.potential, 0);
    assert_eq!(
        last.combined.real,
        last.combined.from_roads + last.combined.from_cities + last.combined.from_monasteries + last.combined.from_farms
    );

    for (id, player) in engine.players().iter() {
        let row = &last.players[id.index()];
        assert_eq!(row.id, id);
        assert_eq!(row.points.real, player.score());
        assert!(row.total_placed_meeples >= row.placed_meeples);
        assert_eq!(
            row.total_placed_meeples,
            row.total_placed_knights + row.total_placed_highwaymen + row.total_placed_monks + row.total_placed_farmers
        );
        assert_eq!(row.available_meeples + row.placed_meeples, row.total_meeples);
    }
}

#[test]
fn test_turns_are_sampled_in_order() {
    let engine = finished_game(8, 2);
    let stats = Statistics::collect(&engine, false).unwrap();

    assert!(stats.actions.is_none());
    let turns: Vec<u32> = stats.turns_data.iter().map(|t| t.turn).collect();
    let mut sorted = turns.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(turns, sorted);

    // Cumulative counters never shrink.
    for pair in stats.turns_data.windows(2) {
        assert!(pair[1].finished_projects >= pair[0].finished_projects);
        assert!(pair[1].placed_tiles >= pair[0].placed_tiles);
        for (a, b) in pair[0].players.iter().zip(&pair[1].players) {
            assert!(b.total_placed_meeples >= a.total_placed_meeples);
            assert!(b.points.real >= a.points.real);
        }
    }

    assert!(stats.averages.points_per_turn >= 0.0);
    assert!(
        (stats.averages.points_per_player_per_turn * 2.0 - stats.averages.points_per_turn).abs() < 1e-9
    );
}

#[test]
fn test_completed_road_is_counted_once() {
    let mut registry = TileRegistry::new();
    registry.register(standard::monastery_road()).unwrap();
    registry.register_copies(standard::monastery_road(), 3).unwrap();
    let source = StaticSource::new(GameConfig::new(2, 2), registry);
    let mut engine = GameEngine::new(&source).unwrap();

    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    let tile = engine.current_tile().unwrap();
    engine
        .execute_action(
            p0,
            &Action::PlaceTile {
                tile,
                position: Position::ORIGIN,
                rotation: Rotation::R0,
            },
        )
        .unwrap();
    let meeple = engine.player(p0).unwrap().first_available().unwrap();
    engine
        .execute_action(
            p0,
            &Action::PlacePawn {
                meeple,
                target: PawnTarget::Segment(0),
            },
        )
        .unwrap();
    let tile = engine.current_tile().unwrap();
    engine
        .execute_action(
            p1,
            &Action::PlaceTile {
                tile,
                position: Position::new(0, 1),
                rotation: Rotation::R180,
            },
        )
        .unwrap();

    let stats = Statistics::collect(&engine, false).unwrap();
    let last = stats.final_turn().unwrap();
    assert_eq!(last.turn, 1);
    assert_eq!(last.finished_projects, 1);
    assert_eq!(last.finished_roads, 1);
    assert_eq!(last.players[0].finished_roads, 1);
    assert_eq!(last.players[0].points.from_roads, 2);
    assert_eq!(last.players[0].total_placed_highwaymen, 1);
    assert_eq!(last.players[0].highwaymen, 0);
    assert_eq!(last.players[1].points.real, 0);
    assert!(!stats.ended);
}
