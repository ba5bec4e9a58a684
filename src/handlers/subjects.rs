//! Subject and topic endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db;
use crate::domain::{Subject, Topic};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SubjectPayload {
  pub name: String,
  #[serde(default = "default_color")]
  pub color: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default = "default_study_duration")]
  pub study_duration: i64,
}

fn default_color() -> String {
  "#6366f1".to_string()
}

fn default_study_duration() -> i64 {
  1500
}

impl SubjectPayload {
  fn validate(&self) -> Result<(), ApiError> {
    if self.name.trim().is_empty() {
      return Err(ApiError::Validation {
        field: "name",
        message: "name cannot be empty".to_string(),
      });
    }
    if self.study_duration <= 0 {
      return Err(ApiError::Validation {
        field: "study_duration",
        message: "study duration must be positive".to_string(),
      });
    }
    Ok(())
  }
}

pub async fn list(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Subject>>> {
  let conn = db::lock(&state.pool);
  Ok(Json(db::get_subjects(&conn, &user_id)?))
}

pub async fn create(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(payload): Json<SubjectPayload>,
) -> ApiResult<(StatusCode, Json<Subject>)> {
  payload.validate()?;

  let mut subject = Subject::new(user_id.clone(), payload.name.trim().to_string(), payload.color);
  subject.description = payload.description;
  subject.study_duration = payload.study_duration;

  let conn = db::lock(&state.pool);
  let id = db::insert_subject(&conn, &subject)?;
  let created = db::get_subject_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("subject"))?;
  Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_one(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<Json<Subject>> {
  let conn = db::lock(&state.pool);
  let subject = db::get_subject_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("subject"))?;
  Ok(Json(subject))
}

pub async fn update(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
  Json(payload): Json<SubjectPayload>,
) -> ApiResult<Json<Subject>> {
  payload.validate()?;

  let conn = db::lock(&state.pool);
  let changed = db::update_subject(
    &conn,
    &user_id,
    id,
    payload.name.trim(),
    &payload.color,
    payload.description.as_deref(),
    payload.study_duration,
  )?;
  if !changed {
    return Err(ApiError::NotFound("subject"));
  }
  let subject = db::get_subject_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("subject"))?;
  Ok(Json(subject))
}

pub async fn delete(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
  let conn = db::lock(&state.pool);
  if !db::delete_subject(&conn, &user_id, id)? {
    return Err(ApiError::NotFound("subject"));
  }
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct TopicPayload {
  pub name: String,
}

impl TopicPayload {
  fn validate(&self) -> Result<(), ApiError> {
    if self.name.trim().is_empty() {
      return Err(ApiError::Validation {
        field: "name",
        message: "name cannot be empty".to_string(),
      });
    }
    Ok(())
  }
}

pub async fn create_topic(
  State(state): State<AppState>,
  Path((user_id, subject_id)): Path<(String, i64)>,
  Json(payload): Json<TopicPayload>,
) -> ApiResult<(StatusCode, Json<Topic>)> {
  payload.validate()?;

  let conn = db::lock(&state.pool);
  // Ownership check before touching topics.
  if db::get_subject_by_id(&conn, &user_id, subject_id)?.is_none() {
    return Err(ApiError::NotFound("subject"));
  }

  let topic_id = db::insert_topic_at_end(&conn, subject_id, payload.name.trim())?;
  let topics = db::get_topics(&conn, subject_id)?;
  let topic = topics
    .into_iter()
    .find(|t| t.id == topic_id)
    .ok_or(ApiError::NotFound("topic"))?;
  Ok((StatusCode::CREATED, Json(topic)))
}

fn find_owned_topic(
  conn: &rusqlite::Connection,
  user_id: &str,
  topic_id: i64,
) -> ApiResult<Topic> {
  db::get_topic_for_user(conn, user_id, topic_id)?.ok_or(ApiError::NotFound("topic"))
}

pub async fn update_topic(
  State(state): State<AppState>,
  Path((user_id, topic_id)): Path<(String, i64)>,
  Json(payload): Json<TopicPayload>,
) -> ApiResult<Json<Topic>> {
  payload.validate()?;

  let conn = db::lock(&state.pool);
  let topic = find_owned_topic(&conn, &user_id, topic_id)?;
  db::update_topic(&conn, topic.id, payload.name.trim())?;
  let topic = find_owned_topic(&conn, &user_id, topic_id)?;
  Ok(Json(topic))
}

#[derive(Debug, Deserialize)]
pub struct CompletionPayload {
  pub is_completed: bool,
}

pub async fn set_topic_completion(
  State(state): State<AppState>,
  Path((user_id, topic_id)): Path<(String, i64)>,
  Json(payload): Json<CompletionPayload>,
) -> ApiResult<Json<Topic>> {
  let conn = db::lock(&state.pool);
  let topic = find_owned_topic(&conn, &user_id, topic_id)?;

  let completion_date = payload.is_completed.then(Utc::now);
  db::set_topic_completed(&conn, topic.id, payload.is_completed, completion_date)?;

  let topic = find_owned_topic(&conn, &user_id, topic_id)?;
  Ok(Json(topic))
}

pub async fn delete_topic(
  State(state): State<AppState>,
  Path((user_id, topic_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
  let conn = db::lock(&state.pool);
  let topic = find_owned_topic(&conn, &user_id, topic_id)?;
  db::delete_topic(&conn, topic.id)?;
  Ok(StatusCode::NO_CONTENT)
}
