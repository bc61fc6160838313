//! Shared running-state registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use fleet_core::SimulationId;

/// Maps simulation ids to their running state, visible to every orchestrator
/// instance holding a clone of the registry.
///
/// Absence of an entry is equivalent to "not running".  The claim operation
/// ([`try_mark_running`](Self::try_mark_running)) is atomic, so two
/// orchestrators racing to start the same simulation cannot both win.
///
/// An in-process map suffices for single-process deployments; a multi-process
/// deployment would put the same interface over a distributed key-value store.
#[derive(Clone, Default)]
pub struct StatusRegistry {
    inner: Arc<Mutex<HashMap<SimulationId, bool>>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SimulationId, bool>> {
        // Nothing in here can panic while holding the lock; recover anyway.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claim `id`: marks it running and returns `true`, unless it
    /// is already running, in which case nothing changes and `false` is
    /// returned.
    pub fn try_mark_running(&self, id: &SimulationId) -> bool {
        let mut map = self.lock();
        match map.get(id) {
            Some(true) => false,
            _ => {
                map.insert(id.clone(), true);
                true
            }
        }
    }

    /// Mark `id` as not running (also used to roll back a failed claim).
    pub fn mark_stopped(&self, id: &SimulationId) {
        self.lock().insert(id.clone(), false);
    }

    /// Current running state; `false` for ids never seen.
    pub fn is_running(&self, id: &SimulationId) -> bool {
        self.lock().get(id).copied().unwrap_or(false)
    }
}
