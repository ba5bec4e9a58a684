//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::db::DbPool;
use crate::pomodoro::PomodoroState;
use crate::srs::Scheduler;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection
    pub pool: DbPool,

    /// Review scheduler with its configured coefficients
    pub scheduler: Scheduler,

    /// In-memory Pomodoro timer per user. Timer state is session-scoped and
    /// deliberately not persisted: a server restart lands everyone in Idle.
    pub timers: Arc<Mutex<HashMap<String, PomodoroState>>>,
}

impl AppState {
    pub fn new(pool: DbPool, scheduler: Scheduler) -> Self {
        Self {
            pool,
            scheduler,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
