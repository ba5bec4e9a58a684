//! FSRS-lite flashcard scheduler.
//!
//! Single-pass update over the card's DSR triple:
//! - Difficulty (D): how hard the card is, clamped to `[d_min, d_max]`
//! - Stability (S): days for recall probability to decay to 90%
//! - Retrievability (R): recall probability at the moment of review
//!
//! The forgetting curve is exponential, `R(t) = 0.9^(t / S)`, so a card
//! reviewed exactly `S` days after its last review sits at 90%. Every
//! coefficient lives in [`SchedulerParams`] and can be overridden from
//! `config.toml`; none of them is load-bearing beyond its default.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::domain::{Flashcard, Rating};

/// All scheduler coefficients, overridable from configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
  pub initial_difficulty: f64,
  pub initial_stability: f64,
  pub min_difficulty: f64,
  pub max_difficulty: f64,
  pub min_stability: f64,
  pub max_stability: f64,
  /// Difficulty shift per rating step away from Good.
  pub difficulty_step: f64,
  /// Weight pulling difficulty back toward `initial_difficulty`.
  pub mean_reversion: f64,
  /// Base stability growth on successful recall.
  pub stability_growth: f64,
  /// Floor on the recall-gain term so an early review still grows stability.
  pub min_gain: f64,
  /// Damping applied to stability growth on Hard.
  pub hard_damp: f64,
  /// Extra stability multiplier on Easy.
  pub easy_bonus: f64,
  /// Fraction of stability kept after a lapse (Again).
  pub lapse_factor: f64,
  /// Interval scheduled after a lapse, in days (0.5 = same day).
  pub lapse_interval_days: f64,
  /// Shortest interval after successful recall, in days.
  pub min_interval_days: f64,
  pub max_interval_days: f64,
  /// Target recall probability when converting stability to an interval.
  pub desired_retention: f64,
}

impl Default for SchedulerParams {
  fn default() -> Self {
    Self {
      initial_difficulty: 5.0,
      initial_stability: 1.0,
      min_difficulty: 1.0,
      max_difficulty: 10.0,
      min_stability: 0.1,
      max_stability: 365.0,
      difficulty_step: 0.7,
      mean_reversion: 0.05,
      stability_growth: 1.0,
      min_gain: 0.1,
      hard_damp: 0.5,
      easy_bonus: 1.3,
      lapse_factor: 0.3,
      lapse_interval_days: 0.5,
      min_interval_days: 1.0,
      max_interval_days: 365.0,
      desired_retention: 0.9,
    }
  }
}

/// Updated card parameters from one review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
  pub difficulty: f64,
  pub stability: f64,
  /// Recall probability at the moment the review happened.
  pub retrievability: f64,
  pub last_review: DateTime<Utc>,
  pub next_review: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
  pub params: SchedulerParams,
}

impl Scheduler {
  pub fn new(params: SchedulerParams) -> Self {
    Self { params }
  }

  /// Seed a brand new card: default DSR values, due immediately.
  pub fn initial_card(&self, user_id: String, question: String, answer: String) -> Flashcard {
    let now = Utc::now();
    Flashcard {
      id: 0,
      user_id,
      question,
      answer,
      difficulty: self.params.initial_difficulty,
      stability: self.params.initial_stability,
      retrievability: 1.0,
      last_review: None,
      next_review: now,
      created_at: now,
    }
  }

  /// `R(t) = 0.9^(t / S)`.
  pub fn retrievability(&self, elapsed_days: f64, stability: f64) -> f64 {
    let s = stability.max(self.params.min_stability);
    (0.9_f64).powf(elapsed_days.max(0.0) / s)
  }

  /// Apply one rating. Pure: the caller persists the outcome.
  pub fn review(&self, card: &Flashcard, rating: Rating, now: DateTime<Utc>) -> ReviewOutcome {
    let p = &self.params;
    let stability = card.stability.clamp(p.min_stability, p.max_stability);
    let difficulty = card.difficulty.clamp(p.min_difficulty, p.max_difficulty);

    let elapsed_days = card
      .last_review
      .map(|lr| now.signed_duration_since(lr).num_seconds() as f64 / 86_400.0)
      .unwrap_or(0.0)
      .max(0.0);
    let retrievability = self.retrievability(elapsed_days, stability);

    // Difficulty moves up for low ratings and down for high ones, then
    // mean-reverts toward the initial value so it cannot drift forever.
    let shifted = difficulty + p.difficulty_step * (3.0 - rating as i64 as f64);
    let new_difficulty = (p.mean_reversion * p.initial_difficulty
      + (1.0 - p.mean_reversion) * shifted)
      .clamp(p.min_difficulty, p.max_difficulty);

    let (new_stability, interval_days) = match rating {
      Rating::Again => {
        // Lapse: cut stability toward the floor, come back same/next day.
        let s = (stability * p.lapse_factor).clamp(p.min_stability, p.max_stability);
        (s, p.lapse_interval_days)
      }
      _ => {
        // Successful recall strengthens more when the card was harder to
        // retrieve (low R) and when the card is easy (low D).
        let difficulty_damp = (p.max_difficulty + 1.0 - difficulty) / p.max_difficulty;
        let gain = (1.0 - retrievability).max(p.min_gain);
        let mut factor = 1.0 + p.stability_growth * difficulty_damp * gain;
        if rating == Rating::Hard {
          factor = 1.0 + (factor - 1.0) * p.hard_damp;
        }
        let mut s = stability * factor;
        if rating == Rating::Easy {
          s *= p.easy_bonus;
        }
        let s = s.clamp(p.min_stability, p.max_stability);
        let interval = (s * self.interval_factor())
          .clamp(p.min_interval_days, p.max_interval_days);
        (s, interval)
      }
    };

    ReviewOutcome {
      difficulty: new_difficulty,
      stability: new_stability,
      retrievability,
      last_review: now,
      next_review: now + Duration::seconds((interval_days * 86_400.0) as i64),
    }
  }

  /// Solve `R(t) = desired_retention` for `t / S`. Equals 1.0 at the
  /// default 90% target.
  fn interval_factor(&self) -> f64 {
    let r = self.params.desired_retention.clamp(0.5, 0.99);
    r.ln() / (0.9_f64).ln()
  }
}
