//! Study log endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::db;
use crate::domain::{LogSource, StudyLogEntry};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct StudyLogPayload {
  pub subject_id: i64,
  #[serde(default)]
  pub topic_id: Option<i64>,
  #[serde(default)]
  pub logged_at: Option<DateTime<Utc>>,
  pub duration_min: i64,
  #[serde(default)]
  pub start_page: i64,
  #[serde(default)]
  pub end_page: i64,
  #[serde(default)]
  pub questions_total: i64,
  #[serde(default)]
  pub questions_correct: i64,
}

impl StudyLogPayload {
  fn into_entry(self, user_id: &str) -> StudyLogEntry {
    StudyLogEntry {
      id: 0,
      user_id: user_id.to_string(),
      subject_id: self.subject_id,
      topic_id: self.topic_id,
      logged_at: self.logged_at.unwrap_or_else(Utc::now),
      duration_min: self.duration_min,
      start_page: self.start_page,
      end_page: self.end_page,
      questions_total: self.questions_total,
      questions_correct: self.questions_correct,
      source: LogSource::Manual,
      sequence_item_index: None,
    }
  }
}

pub async fn list(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<StudyLogEntry>>> {
  let conn = db::lock(&state.pool);
  Ok(Json(db::get_study_logs(&conn, &user_id)?))
}

pub async fn create(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(payload): Json<StudyLogPayload>,
) -> ApiResult<(StatusCode, Json<StudyLogEntry>)> {
  let entry = payload.into_entry(&user_id);
  entry.validate()?;

  let conn = db::lock(&state.pool);
  if db::get_subject_by_id(&conn, &user_id, entry.subject_id)?.is_none() {
    return Err(ApiError::NotFound("subject"));
  }

  let id = db::insert_study_log(&conn, &entry)?;
  let created = db::get_study_log_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("study log"))?;
  Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_one(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<Json<StudyLogEntry>> {
  let conn = db::lock(&state.pool);
  let entry = db::get_study_log_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("study log"))?;
  Ok(Json(entry))
}

pub async fn update(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
  Json(payload): Json<StudyLogPayload>,
) -> ApiResult<Json<StudyLogEntry>> {
  let conn = db::lock(&state.pool);
  let existing = db::get_study_log_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("study log"))?;

  // Edits keep the original timestamp and source.
  let mut edited = payload.into_entry(&user_id);
  edited.id = existing.id;
  edited.logged_at = existing.logged_at;
  edited.source = existing.source;
  edited.sequence_item_index = existing.sequence_item_index;
  edited.validate()?;

  if db::get_subject_by_id(&conn, &user_id, edited.subject_id)?.is_none() {
    return Err(ApiError::NotFound("subject"));
  }

  db::update_study_log(&conn, &edited)?;
  let entry = db::get_study_log_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("study log"))?;
  Ok(Json(entry))
}

pub async fn delete(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
  let conn = db::lock(&state.pool);
  if !db::delete_study_log(&conn, &user_id, id)? {
    return Err(ApiError::NotFound("study log"));
  }
  Ok(StatusCode::NO_CONTENT)
}
