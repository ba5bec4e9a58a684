//! Revision cycle endpoints.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::{LogSource, StudyLogEntry, Subject};
use crate::revision::{self, RevisionBox, RevisionError};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

impl From<RevisionError> for ApiError {
  fn from(e: RevisionError) -> Self {
    let field = match e {
      RevisionError::CycleComplete => "progress",
      RevisionError::UndoNotAllowed { .. } => "index",
    };
    ApiError::Validation {
      field,
      message: e.to_string(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct RevisionView {
  pub subject_id: i64,
  pub progress: i64,
  pub cycle_complete: bool,
  pub boxes: Vec<RevisionBox>,
}

fn view_of(subject: &Subject) -> RevisionView {
  RevisionView {
    subject_id: subject.id,
    progress: subject.revision_progress,
    cycle_complete: revision::cycle_complete(&subject.topics, subject.revision_progress),
    boxes: revision::boxes(&subject.topics, subject.revision_progress),
  }
}

pub async fn boxes(
  State(state): State<AppState>,
  Path((user_id, subject_id)): Path<(String, i64)>,
) -> ApiResult<Json<RevisionView>> {
  let conn = db::lock(&state.pool);
  let subject =
    db::get_subject_by_id(&conn, &user_id, subject_id)?.ok_or(ApiError::NotFound("subject"))?;
  Ok(Json(view_of(&subject)))
}

#[derive(Debug, Default, Deserialize)]
pub struct AdvancePayload {
  /// When present, the completed box is also registered as a study log.
  #[serde(default)]
  pub duration_min: Option<i64>,
}

pub async fn advance(
  State(state): State<AppState>,
  Path((user_id, subject_id)): Path<(String, i64)>,
  payload: Option<Json<AdvancePayload>>,
) -> ApiResult<Json<RevisionView>> {
  let Json(payload) = payload.unwrap_or_default();

  let conn = db::lock(&state.pool);
  let subject =
    db::get_subject_by_id(&conn, &user_id, subject_id)?.ok_or(ApiError::NotFound("subject"))?;

  let progress = subject.revision_progress;
  let new_progress = revision::advance(&subject.topics, progress)?;

  // The box being completed is the one at the old cursor.
  let sequence = revision::build_sequence(&subject.topics);
  let revised_topic = sequence
    .get(progress as usize)
    .map(|(_, topic)| (*topic).clone());

  if let Some(duration_min) = payload.duration_min {
    let entry = StudyLogEntry {
      id: 0,
      user_id: user_id.clone(),
      subject_id,
      topic_id: revised_topic.as_ref().map(|t| t.id),
      logged_at: Utc::now(),
      duration_min,
      start_page: 0,
      end_page: 0,
      questions_total: 0,
      questions_correct: 0,
      source: LogSource::Revision,
      sequence_item_index: Some(progress),
    };
    entry.validate()?;
    db::insert_study_log(&conn, &entry)?;
  }

  db::set_revision_progress(&conn, &user_id, subject_id, new_progress)?;
  let subject =
    db::get_subject_by_id(&conn, &user_id, subject_id)?.ok_or(ApiError::NotFound("subject"))?;
  Ok(Json(view_of(&subject)))
}

#[derive(Debug, Deserialize)]
pub struct UndoPayload {
  pub index: i64,
}

pub async fn undo(
  State(state): State<AppState>,
  Path((user_id, subject_id)): Path<(String, i64)>,
  Json(payload): Json<UndoPayload>,
) -> ApiResult<Json<RevisionView>> {
  let conn = db::lock(&state.pool);
  let subject =
    db::get_subject_by_id(&conn, &user_id, subject_id)?.ok_or(ApiError::NotFound("subject"))?;

  let new_progress = revision::undo(subject.revision_progress, payload.index)?;
  db::set_revision_progress(&conn, &user_id, subject_id, new_progress)?;

  let subject =
    db::get_subject_by_id(&conn, &user_id, subject_id)?.ok_or(ApiError::NotFound("subject"))?;
  Ok(Json(view_of(&subject)))
}
