use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a study log entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
  /// Entered by hand through the log form.
  Manual,
  /// Written when a Pomodoro focus segment completed.
  Pomodoro,
  /// Written when a revision box was marked done.
  Revision,
}

impl LogSource {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Manual => "manual",
      Self::Pomodoro => "pomodoro",
      Self::Revision => "revision",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "manual" => Some(Self::Manual),
      "pomodoro" => Some(Self::Pomodoro),
      "revision" => Some(Self::Revision),
      _ => None,
    }
  }
}

/// One logged study session. Immutable once created except through the
/// explicit edit/delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyLogEntry {
  pub id: i64,
  pub user_id: String,
  pub subject_id: i64,
  pub topic_id: Option<i64>,
  pub logged_at: DateTime<Utc>,
  /// Session length in minutes.
  pub duration_min: i64,
  pub start_page: i64,
  pub end_page: i64,
  pub questions_total: i64,
  pub questions_correct: i64,
  pub source: LogSource,
  /// Index into the revision sequence when `source` is `Revision`.
  pub sequence_item_index: Option<i64>,
}

/// Why a study log payload was rejected. The field name is surfaced so the
/// client can attach the message to the right input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field: &'static str,
  pub message: String,
}

impl StudyLogEntry {
  /// Check the entry's arithmetic invariants. Runs before any mutation so a
  /// bad payload never reaches the store.
  pub fn validate(&self) -> Result<(), FieldError> {
    if self.duration_min <= 0 {
      return Err(FieldError {
        field: "duration_min",
        message: "duration must be positive".to_string(),
      });
    }
    if self.start_page < 0 || self.end_page < 0 {
      return Err(FieldError {
        field: "start_page",
        message: "pages cannot be negative".to_string(),
      });
    }
    if self.end_page < self.start_page {
      return Err(FieldError {
        field: "end_page",
        message: format!("end page {} is before start page {}", self.end_page, self.start_page),
      });
    }
    if self.questions_total < 0 || self.questions_correct < 0 {
      return Err(FieldError {
        field: "questions_total",
        message: "question counts cannot be negative".to_string(),
      });
    }
    if self.questions_correct > self.questions_total {
      return Err(FieldError {
        field: "questions_correct",
        message: format!(
          "{} correct answers out of {} questions",
          self.questions_correct, self.questions_total
        ),
      });
    }
    Ok(())
  }
}
