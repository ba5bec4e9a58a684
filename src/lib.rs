pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod pomodoro;
pub mod revision;
pub mod srs;
pub mod state;
pub mod stats;

#[cfg(test)]
pub mod testing;
