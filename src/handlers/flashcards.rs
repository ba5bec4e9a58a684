//! Flashcard and review session endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::{Flashcard, Rating, ReviewSession};
use crate::state::AppState;

use super::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct FlashcardPayload {
  pub question: String,
  pub answer: String,
}

impl FlashcardPayload {
  fn validate(&self) -> Result<(), ApiError> {
    if self.question.trim().is_empty() {
      return Err(ApiError::Validation {
        field: "question",
        message: "question cannot be empty".to_string(),
      });
    }
    if self.answer.trim().is_empty() {
      return Err(ApiError::Validation {
        field: "answer",
        message: "answer cannot be empty".to_string(),
      });
    }
    Ok(())
  }
}

pub async fn list(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Flashcard>>> {
  let conn = db::lock(&state.pool);
  Ok(Json(db::get_flashcards(&conn, &user_id)?))
}

pub async fn due(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Flashcard>>> {
  let conn = db::lock(&state.pool);
  Ok(Json(db::get_due_flashcards(&conn, &user_id, Utc::now())?))
}

pub async fn create(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(payload): Json<FlashcardPayload>,
) -> ApiResult<(StatusCode, Json<Flashcard>)> {
  payload.validate()?;

  let card = state.scheduler.initial_card(
    user_id.clone(),
    payload.question.trim().to_string(),
    payload.answer.trim().to_string(),
  );

  let conn = db::lock(&state.pool);
  let id = db::insert_flashcard(&conn, &card)?;
  let created =
    db::get_flashcard_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("flashcard"))?;
  Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_one(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<Json<Flashcard>> {
  let conn = db::lock(&state.pool);
  let card = db::get_flashcard_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("flashcard"))?;
  Ok(Json(card))
}

pub async fn update(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
  Json(payload): Json<FlashcardPayload>,
) -> ApiResult<Json<Flashcard>> {
  payload.validate()?;

  let conn = db::lock(&state.pool);
  let changed =
    db::update_flashcard_content(&conn, &user_id, id, payload.question.trim(), payload.answer.trim())?;
  if !changed {
    return Err(ApiError::NotFound("flashcard"));
  }
  let card = db::get_flashcard_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("flashcard"))?;
  Ok(Json(card))
}

pub async fn delete(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
  let conn = db::lock(&state.pool);
  if !db::delete_flashcard(&conn, &user_id, id)? {
    return Err(ApiError::NotFound("flashcard"));
  }
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
  pub rating: u8,
}

fn parse_rating(raw: u8) -> Result<Rating, ApiError> {
  Rating::from_u8(raw).ok_or(ApiError::Validation {
    field: "rating",
    message: format!("rating must be between 1 and 4, got {raw}"),
  })
}

/// Apply one rating to a card and persist the rescheduled result.
pub async fn review(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
  Json(payload): Json<ReviewPayload>,
) -> ApiResult<Json<Flashcard>> {
  let rating = parse_rating(payload.rating)?;

  let conn = db::lock(&state.pool);
  let mut card =
    db::get_flashcard_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("flashcard"))?;

  let outcome = state.scheduler.review(&card, rating, Utc::now());
  card.difficulty = outcome.difficulty;
  card.stability = outcome.stability;
  card.retrievability = outcome.retrievability;
  card.last_review = Some(outcome.last_review);
  card.next_review = outcome.next_review;

  db::update_flashcard_schedule(&conn, &card)?;
  Ok(Json(card))
}

/// Snapshot the current due queue into a fixed review session.
pub async fn create_session(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> ApiResult<(StatusCode, Json<ReviewSession>)> {
  let conn = db::lock(&state.pool);
  let due = db::get_due_flashcards(&conn, &user_id, Utc::now())?;
  let card_ids = due.iter().map(|c| c.id).collect();

  let mut session = ReviewSession::new(user_id.clone(), card_ids);
  session.id = db::insert_review_session(&conn, &session)?;
  Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<Json<ReviewSession>> {
  let conn = db::lock(&state.pool);
  let session =
    db::get_review_session_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("review session"))?;
  Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct AnswerPayload {
  pub rating: u8,
  #[serde(default)]
  pub time_spent_sec: i64,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
  pub session: ReviewSession,
  pub card: Flashcard,
}

/// Rate the card at the session cursor: reschedules the card and advances
/// the session in one step.
pub async fn answer_session(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
  Json(payload): Json<AnswerPayload>,
) -> ApiResult<Json<AnswerResponse>> {
  let rating = parse_rating(payload.rating)?;

  let conn = db::lock(&state.pool);
  let mut session =
    db::get_review_session_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("review session"))?;

  // Cards deleted since the snapshot are skipped, not dead ends.
  let mut card = loop {
    let card_id = session.current_card_id().ok_or_else(|| ApiError::Validation {
      field: "session",
      message: "session is already complete".to_string(),
    });
    let card_id = match card_id {
      Ok(id) => id,
      Err(e) => {
        db::update_review_session(&conn, &session)?;
        return Err(e);
      }
    };
    match db::get_flashcard_by_id(&conn, &user_id, card_id)? {
      Some(card) => break card,
      None => session.skip_current(),
    }
  };

  let outcome = state.scheduler.review(&card, rating, Utc::now());
  card.difficulty = outcome.difficulty;
  card.stability = outcome.stability;
  card.retrievability = outcome.retrievability;
  card.last_review = Some(outcome.last_review);
  card.next_review = outcome.next_review;
  db::update_flashcard_schedule(&conn, &card)?;

  session.record_answer(rating.is_correct(), payload.time_spent_sec);
  db::update_review_session(&conn, &session)?;

  Ok(Json(AnswerResponse { session, card }))
}

pub async fn close_session(
  State(state): State<AppState>,
  Path((user_id, id)): Path<(String, i64)>,
) -> ApiResult<Json<ReviewSession>> {
  let conn = db::lock(&state.pool);
  let mut session =
    db::get_review_session_by_id(&conn, &user_id, id)?.ok_or(ApiError::NotFound("review session"))?;

  session.completed = true;
  db::update_review_session(&conn, &session)?;
  Ok(Json(session))
}
