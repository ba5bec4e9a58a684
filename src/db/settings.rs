//! Key/value settings storage

use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::db::LogOnError;
use crate::pomodoro::PomodoroSettings;

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn pomodoro_key(user_id: &str) -> String {
    format!("pomodoro:{user_id}")
}

/// Stored timer configuration for one user, falling back to defaults when
/// nothing has been saved or the stored payload no longer parses.
pub fn get_pomodoro_settings(conn: &Connection, user_id: &str) -> Result<PomodoroSettings> {
    let settings = get_setting(conn, &pomodoro_key(user_id))?
        .map(|json| {
            serde_json::from_str(&json).log_warn_default("bad pomodoro settings payload")
        })
        .unwrap_or_default();
    Ok(settings)
}

pub fn set_pomodoro_settings(conn: &Connection, user_id: &str, settings: &PomodoroSettings) -> Result<()> {
    let json = serde_json::to_string(settings)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    set_setting(conn, &pomodoro_key(user_id), &json)
}
