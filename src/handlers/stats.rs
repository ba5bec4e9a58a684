//! Statistics endpoints: load, aggregate, serialize.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db;
use crate::state::AppState;
use crate::stats::{self, CompletionRatio, DailyTotal, SubjectAccuracy, SubjectTime};

use super::error::ApiResult;

pub async fn time_by_subject(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<SubjectTime>>> {
  let conn = db::lock(&state.pool);
  let subjects = db::get_subjects(&conn, &user_id)?;
  let logs = db::get_study_logs(&conn, &user_id)?;
  Ok(Json(stats::time_by_subject(&subjects, &logs)))
}

pub async fn accuracy(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<SubjectAccuracy>>> {
  let conn = db::lock(&state.pool);
  let subjects = db::get_subjects(&conn, &user_id)?;
  let logs = db::get_study_logs(&conn, &user_id)?;
  Ok(Json(stats::accuracy_by_subject(&subjects, &logs)))
}

pub async fn completion(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<CompletionRatio>> {
  let conn = db::lock(&state.pool);
  let subjects = db::get_subjects(&conn, &user_id)?;
  Ok(Json(stats::completion_ratio(&subjects)))
}

#[derive(Debug, Serialize)]
pub struct DailyResponse {
  pub days: Vec<DailyTotal>,
}

pub async fn daily(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<DailyResponse>> {
  let conn = db::lock(&state.pool);
  let logs = db::get_study_logs(&conn, &user_id)?;
  let days = stats::daily_totals(&logs, Utc::now().date_naive());
  Ok(Json(DailyResponse { days }))
}
