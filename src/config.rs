//! Application configuration constants.
//!
//! This module centralizes all configurable values that were previously
//! hardcoded throughout the codebase.

use serde::Deserialize;
use std::path::PathBuf;

use crate::srs::SchedulerParams;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    scheduler: Option<SchedulerParams>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

fn read_config_file() -> Option<AppConfig> {
    let contents = std::fs::read_to_string("config.toml").ok()?;
    toml::from_str::<AppConfig>(&contents).ok()
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Some(config) = read_config_file() {
        if let Some(db) = config.database {
            if let Some(path) = db.path {
                tracing::info!("Using database from config.toml: {}", path);
                return PathBuf::from(path);
            }
        }
    }

    // Priority 2: .env DATABASE_PATH
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/estudeaqui.db");
    tracing::info!("Using default database path: {}", default.display());
    default
}

/// Scheduler coefficients, overridable through the `[scheduler]` section of
/// config.toml. Missing keys keep their defaults.
pub fn load_scheduler_params() -> SchedulerParams {
    read_config_file()
        .and_then(|config| config.scheduler)
        .unwrap_or_default()
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}
