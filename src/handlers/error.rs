//! API error taxonomy shared by every handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::study_log::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// Payload failed a domain invariant. Carries the offending field so the
  /// client can attach the message to the right input.
  #[error("{field}: {message}")]
  Validation { field: &'static str, message: String },

  #[error("{0} not found")]
  NotFound(&'static str),

  /// Shared in-memory state could not be acquired. Clients retry.
  #[error("service temporarily unavailable")]
  Unavailable,

  #[error("database error: {0}")]
  Db(#[from] rusqlite::Error),
}

impl From<FieldError> for ApiError {
  fn from(e: FieldError) -> Self {
    Self::Validation {
      field: e.field,
      message: e.message,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
      Self::Db(e) => {
        tracing::error!("database error: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let body = match &self {
      Self::Validation { field, message } => json!({
        "error": message,
        "field": field,
      }),
      _ => json!({ "error": self.to_string() }),
    };

    (status, Json(body)).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;
