//! HTTP handlers: thin JSON CRUD over the core modules.
//!
//! Handlers validate, call into the pure logic, persist through `crate::db`,
//! and serialize the result. No business rules live here.

pub mod error;
pub mod flashcards;
pub mod pomodoro;
pub mod revision;
pub mod stats;
pub mod study_logs;
pub mod subjects;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::{ApiError, ApiResult};

pub async fn health() -> &'static str {
  "ok"
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route(
      "/api/users/{user_id}/subjects",
      get(subjects::list).post(subjects::create),
    )
    .route(
      "/api/users/{user_id}/subjects/{id}",
      get(subjects::get_one)
        .put(subjects::update)
        .delete(subjects::delete),
    )
    .route(
      "/api/users/{user_id}/subjects/{id}/topics",
      post(subjects::create_topic),
    )
    .route(
      "/api/users/{user_id}/topics/{topic_id}",
      put(subjects::update_topic).delete(subjects::delete_topic),
    )
    .route(
      "/api/users/{user_id}/topics/{topic_id}/completion",
      put(subjects::set_topic_completion),
    )
    .route(
      "/api/users/{user_id}/study-logs",
      get(study_logs::list).post(study_logs::create),
    )
    .route(
      "/api/users/{user_id}/study-logs/{id}",
      get(study_logs::get_one)
        .put(study_logs::update)
        .delete(study_logs::delete),
    )
    .route(
      "/api/users/{user_id}/subjects/{id}/revision",
      get(revision::boxes),
    )
    .route(
      "/api/users/{user_id}/subjects/{id}/revision/advance",
      post(revision::advance),
    )
    .route(
      "/api/users/{user_id}/subjects/{id}/revision/undo",
      post(revision::undo),
    )
    .route(
      "/api/users/{user_id}/flashcards",
      get(flashcards::list).post(flashcards::create),
    )
    .route("/api/users/{user_id}/flashcards/due", get(flashcards::due))
    .route(
      "/api/users/{user_id}/flashcards/{id}",
      get(flashcards::get_one)
        .put(flashcards::update)
        .delete(flashcards::delete),
    )
    .route(
      "/api/users/{user_id}/flashcards/{id}/review",
      post(flashcards::review),
    )
    .route(
      "/api/users/{user_id}/review-sessions",
      post(flashcards::create_session),
    )
    .route(
      "/api/users/{user_id}/review-sessions/{id}",
      get(flashcards::get_session),
    )
    .route(
      "/api/users/{user_id}/review-sessions/{id}/answer",
      post(flashcards::answer_session),
    )
    .route(
      "/api/users/{user_id}/review-sessions/{id}/close",
      post(flashcards::close_session),
    )
    .route(
      "/api/users/{user_id}/pomodoro/settings",
      get(pomodoro::get_settings).put(pomodoro::put_settings),
    )
    .route("/api/users/{user_id}/pomodoro/start", post(pomodoro::start))
    .route("/api/users/{user_id}/pomodoro/tick", post(pomodoro::tick))
    .route("/api/users/{user_id}/pomodoro/pause", post(pomodoro::pause))
    .route("/api/users/{user_id}/pomodoro/resume", post(pomodoro::resume))
    .route("/api/users/{user_id}/pomodoro/stop", post(pomodoro::stop))
    .route("/api/users/{user_id}/pomodoro/skip", post(pomodoro::skip))
    .route(
      "/api/users/{user_id}/stats/time-by-subject",
      get(stats::time_by_subject),
    )
    .route("/api/users/{user_id}/stats/accuracy", get(stats::accuracy))
    .route("/api/users/{user_id}/stats/completion", get(stats::completion))
    .route("/api/users/{user_id}/stats/daily", get(stats::daily))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
