//! SQLite access layer.
//!
//! All persistence goes through a single `rusqlite::Connection` behind an
//! `Arc<Mutex<_>>`. Handlers acquire it with [`lock`], which waits for the
//! current holder and recovers a poisoned mutex.

pub mod flashcards;
pub mod schema;
pub mod settings;
pub mod study_logs;
pub mod subjects;

pub use flashcards::*;
pub use schema::run_migrations;
pub use settings::*;
pub use study_logs::*;
pub use subjects::*;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors without interrupting control flow.
pub trait LogOnError<T, E> {
    /// Log the error at warn level and convert to Option.
    fn log_warn(self, context: &str) -> Option<T>;

    /// Log the error at warn level and return a default value.
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T, E> for Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{context}: {e}");
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{context}: {e}");
                T::default()
            }
        }
    }
}

/// Acquire the connection lock, waiting for the current holder. Queries are
/// short and handlers never hold the guard across an await, so contention
/// only ever means a brief wait. A poisoned mutex is recovered rather than
/// propagated; SQLite's own journal keeps the file consistent.
pub fn lock(pool: &DbPool) -> MutexGuard<'_, Connection> {
    match pool.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!("database mutex poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Open (or create) the database at `path`, run migrations, and wrap the
/// connection in a shareable pool.
pub fn init_db(path: &str) -> Result<DbPool, rusqlite::Error> {
    let db_path = Path::new(path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .log_warn("failed to create database directory");
        }
    }

    // Keep a pre-migration copy around so a bad upgrade is recoverable.
    if db_path.exists() {
        let backup = db_path.with_extension("db.backup");
        std::fs::copy(db_path, &backup).log_warn("failed to back up database");
    }

    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    run_migrations(&conn)?;

    tracing::info!("database ready at {path}");
    Ok(Arc::new(Mutex::new(conn)))
}
