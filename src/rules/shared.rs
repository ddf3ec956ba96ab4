//! Shared access to one engine from several threads.
//!
//! The engine itself is single-mutator. `SharedEngine` wraps it in a mutex
//! so concurrent callers are serialized one action at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{Action, EngineError, PlayerId, Result};
use crate::replay::EngineSnapshot;

use super::engine::GameEngine;
use super::scoring::EngineEvent;

/// Cloneable handle to a mutex-guarded engine.
#[derive(Clone, Debug)]
pub struct SharedEngine {
    inner: Arc<Mutex<GameEngine>>,
}

impl SharedEngine {
    #[must_use]
    pub fn new(engine: GameEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GameEngine>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::invariant("engine lock poisoned"))
    }

    /// Apply an action while holding the lock.
    pub fn execute_action(&self, player: PlayerId, action: &Action) -> Result<Vec<EngineEvent>> {
        self.lock()?.execute_action(player, action)
    }

    /// Run a read-only closure against the engine.
    pub fn read<R>(&self, f: impl FnOnce(&GameEngine) -> R) -> Result<R> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    pub fn snapshot(&self) -> Result<EngineSnapshot> {
        self.read(GameEngine::snapshot)
    }

    /// Independent copy of the current state.
    pub fn fork(&self) -> Result<GameEngine> {
        self.read(GameEngine::clone)
    }
}
