//! Pomodoro endpoints: settings plus the action surface over the reducer.
//!
//! The reducer is pure; this module owns the in-memory per-user timer map
//! and feeds each action through it under the timers lock.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db;
use crate::pomodoro::{reduce, ItemKind, PomodoroAction, PomodoroSettings, PomodoroState};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

pub async fn get_settings(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<PomodoroSettings>> {
  let conn = db::lock(&state.pool);
  Ok(Json(db::get_pomodoro_settings(&conn, &user_id)?))
}

pub async fn put_settings(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(settings): Json<PomodoroSettings>,
) -> ApiResult<Json<PomodoroSettings>> {
  settings.validate().map_err(|message| ApiError::Validation {
    field: "settings",
    message,
  })?;

  let conn = db::lock(&state.pool);
  db::set_pomodoro_settings(&conn, &user_id, &settings)?;
  Ok(Json(settings))
}

/// Run one action through the reducer for this user's timer.
fn apply(state: &AppState, user_id: &str, action: PomodoroAction) -> ApiResult<PomodoroState> {
  let settings = {
    let conn = db::lock(&state.pool);
    db::get_pomodoro_settings(&conn, user_id)?
  };

  let today = Utc::now().date_naive();
  let mut timers = state.timers.lock().map_err(|_| ApiError::Unavailable)?;
  let current = timers
    .get(user_id)
    .cloned()
    .unwrap_or_else(|| PomodoroState::idle(&settings, today));

  let next = reduce(&current, &settings, action, today);
  timers.insert(user_id.to_string(), next.clone());
  Ok(next)
}

#[derive(Debug, Default, Deserialize)]
pub struct StartPayload {
  #[serde(default)]
  pub task_index: Option<usize>,
  #[serde(default)]
  pub custom_duration: Option<i64>,
  #[serde(default)]
  pub associated_item_id: Option<i64>,
  #[serde(default)]
  pub associated_item_kind: Option<ItemKind>,
}

pub async fn start(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  payload: Option<Json<StartPayload>>,
) -> ApiResult<Json<PomodoroState>> {
  let Json(payload) = payload.unwrap_or_default();
  if let Some(duration) = payload.custom_duration {
    if duration <= 0 {
      return Err(ApiError::Validation {
        field: "custom_duration",
        message: "custom duration must be positive".to_string(),
      });
    }
  }

  let next = apply(
    &state,
    &user_id,
    PomodoroAction::Start {
      task_index: payload.task_index,
      custom_duration: payload.custom_duration,
      associated_item_id: payload.associated_item_id,
      associated_item_kind: payload.associated_item_kind,
    },
  )?;
  Ok(Json(next))
}

#[derive(Debug, Deserialize)]
pub struct TickPayload {
  pub generation: u64,
}

pub async fn tick(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(payload): Json<TickPayload>,
) -> ApiResult<Json<PomodoroState>> {
  let next = apply(
    &state,
    &user_id,
    PomodoroAction::Tick {
      generation: payload.generation,
    },
  )?;
  Ok(Json(next))
}

pub async fn pause(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<PomodoroState>> {
  Ok(Json(apply(&state, &user_id, PomodoroAction::Pause)?))
}

pub async fn resume(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<PomodoroState>> {
  Ok(Json(apply(&state, &user_id, PomodoroAction::Resume)?))
}

pub async fn stop(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<PomodoroState>> {
  Ok(Json(apply(&state, &user_id, PomodoroAction::Stop)?))
}

pub async fn skip(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<PomodoroState>> {
  Ok(Json(apply(&state, &user_id, PomodoroAction::Skip)?))
}
