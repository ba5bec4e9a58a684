//! Chart-facing statistics derived from subjects and study logs.
//!
//! Every function here is a pure transform over the input slices: same
//! arrays in, same numbers out, nothing read or written elsewhere. Callers
//! can safely recompute on every render or memoize on input identity.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{StudyLogEntry, Subject};

/// Total logged minutes for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectTime {
  pub subject_id: i64,
  pub name: String,
  pub color: String,
  pub total_minutes: i64,
}

/// Question accuracy for one subject, percentage rounded to the nearest
/// integer. Subjects with no answered questions are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAccuracy {
  pub subject_id: i64,
  pub name: String,
  pub color: String,
  pub accuracy: i64,
  pub total_questions: i64,
  pub correct_questions: i64,
}

/// Topic completion across all subjects. The two ratios always sum to 1;
/// with no topics at all the split degenerates to (0 done, 1 remaining)
/// instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRatio {
  pub completed_topics: i64,
  pub total_topics: i64,
  pub done: f64,
  pub remaining: f64,
}

/// Minutes studied on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
  pub date: NaiveDate,
  pub total_minutes: i64,
}

/// Sum `duration_min` per subject, resolved to display name and color.
/// Subjects that never appear in the logs are left out.
pub fn time_by_subject(subjects: &[Subject], logs: &[StudyLogEntry]) -> Vec<SubjectTime> {
  let mut minutes: HashMap<i64, i64> = HashMap::new();
  for log in logs {
    *minutes.entry(log.subject_id).or_insert(0) += log.duration_min;
  }

  subjects
    .iter()
    .filter_map(|subject| {
      minutes.get(&subject.id).map(|total| SubjectTime {
        subject_id: subject.id,
        name: subject.name.clone(),
        color: subject.color.clone(),
        total_minutes: *total,
      })
    })
    .collect()
}

/// Per-subject accuracy. Subjects whose logs carry zero answered questions
/// are excluded so the division never degenerates.
pub fn accuracy_by_subject(subjects: &[Subject], logs: &[StudyLogEntry]) -> Vec<SubjectAccuracy> {
  let mut totals: HashMap<i64, (i64, i64)> = HashMap::new();
  for log in logs {
    let entry = totals.entry(log.subject_id).or_insert((0, 0));
    entry.0 += log.questions_total;
    entry.1 += log.questions_correct;
  }

  subjects
    .iter()
    .filter_map(|subject| {
      let (total, correct) = totals.get(&subject.id).copied()?;
      if total <= 0 {
        return None;
      }
      Some(SubjectAccuracy {
        subject_id: subject.id,
        name: subject.name.clone(),
        color: subject.color.clone(),
        accuracy: ((correct as f64 / total as f64) * 100.0).round() as i64,
        total_questions: total,
        correct_questions: correct,
      })
    })
    .collect()
}

/// Completed vs. total topics across all subjects.
pub fn completion_ratio(subjects: &[Subject]) -> CompletionRatio {
  let total: i64 = subjects.iter().map(|s| s.topics.len() as i64).sum();
  let completed: i64 = subjects.iter().map(|s| s.completed_topics() as i64).sum();

  if total == 0 {
    return CompletionRatio {
      completed_topics: 0,
      total_topics: 0,
      done: 0.0,
      remaining: 1.0,
    };
  }

  let done = completed as f64 / total as f64;
  CompletionRatio {
    completed_topics: completed,
    total_topics: total,
    done,
    remaining: 1.0 - done,
  }
}

/// Minutes per calendar day over the rolling 7-day window ending at
/// `today`, oldest day first. Days without entries appear with zero.
pub fn daily_totals(logs: &[StudyLogEntry], today: NaiveDate) -> Vec<DailyTotal> {
  let mut by_day: HashMap<NaiveDate, i64> = HashMap::new();
  for log in logs {
    *by_day.entry(log.logged_at.date_naive()).or_insert(0) += log.duration_min;
  }

  (0..7)
    .rev()
    .map(|back| {
      let date = today - chrono::Duration::days(back);
      DailyTotal {
        date,
        total_minutes: by_day.get(&date).copied().unwrap_or(0),
      }
    })
    .collect()
}
