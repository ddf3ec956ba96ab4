//! Forking a game: persistent clone versus replaying the history.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rust_carcassonne::core::GameConfig;
use rust_carcassonne::rules::GameEngine;
use rust_carcassonne::tiles::{standard, StaticSource};

/// A base-set game played halfway by always taking the last legal action.
fn midgame() -> GameEngine {
    let source = StaticSource::new(GameConfig::new(4, 42), standard::base_set().unwrap());
    let mut engine = GameEngine::new(&source).unwrap();
    while engine.remaining_tiles() > 18 {
        let Some(action) = engine.legal_actions().into_iter().last() else {
            break;
        };
        let player = engine.current_player();
        engine.execute_action(player, &action).unwrap();
    }
    engine
}

fn bench_fork(c: &mut Criterion) {
    let engine = midgame();

    c.bench_function("clone_midgame", |b| b.iter(|| black_box(engine.clone())));

    c.bench_function("rebuild_midgame", |b| {
        b.iter(|| black_box(engine.rebuild().unwrap()))
    });
}

fn bench_legal_actions(c: &mut Criterion) {
    let engine = midgame();

    c.bench_function("legal_actions_midgame", |b| {
        b.iter(|| black_box(engine.legal_actions()))
    });
}

criterion_group!(benches, bench_fork, bench_legal_actions);
criterion_main!(benches);
