use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User rating for a flashcard review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
  Again = 1,
  Hard = 2,
  Good = 3,
  Easy = 4,
}

impl Rating {
  pub fn from_u8(value: u8) -> Option<Self> {
    match value {
      1 => Some(Self::Again),
      2 => Some(Self::Hard),
      3 => Some(Self::Good),
      4 => Some(Self::Easy),
      _ => None,
    }
  }

  /// Ratings 3 and 4 count as successful recall.
  pub fn is_correct(&self) -> bool {
    matches!(self, Self::Good | Self::Easy)
  }
}

/// A flashcard with its memory-model parameters. Mutated only by the review
/// pipeline (`crate::srs`) or a direct content edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
  pub id: i64,
  pub user_id: String,
  pub question: String,
  pub answer: String,
  pub difficulty: f64,
  pub stability: f64,
  /// Estimated recall probability at the moment of the last review.
  pub retrievability: f64,
  pub last_review: Option<DateTime<Utc>>,
  pub next_review: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

/// A batch review over a fixed set of cards. Terminal once
/// `current_index >= total_cards` or explicitly closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
  pub id: i64,
  pub user_id: String,
  pub card_ids: Vec<i64>,
  pub current_index: i64,
  pub started_at: DateTime<Utc>,
  pub completed: bool,
  pub total_cards: i64,
  pub correct_count: i64,
  pub time_spent_sec: i64,
}

impl ReviewSession {
  pub fn new(user_id: String, card_ids: Vec<i64>) -> Self {
    let total_cards = card_ids.len() as i64;
    Self {
      id: 0,
      user_id,
      card_ids,
      current_index: 0,
      started_at: Utc::now(),
      completed: total_cards == 0,
      total_cards,
      correct_count: 0,
      time_spent_sec: 0,
    }
  }

  /// Card the cursor currently points at, if the session is still open.
  pub fn current_card_id(&self) -> Option<i64> {
    if self.completed {
      return None;
    }
    self.card_ids.get(self.current_index as usize).copied()
  }

  /// Drop the current card without rating it, e.g. when it was deleted
  /// after the session snapshot was taken.
  pub fn skip_current(&mut self) {
    self.current_index += 1;
    if self.current_index >= self.total_cards {
      self.completed = true;
    }
  }

  /// Record one answered card and move the cursor forward.
  pub fn record_answer(&mut self, correct: bool, time_spent_sec: i64) {
    if correct {
      self.correct_count += 1;
    }
    self.time_spent_sec += time_spent_sec.max(0);
    self.current_index += 1;
    if self.current_index >= self.total_cards {
      self.completed = true;
    }
  }
}
