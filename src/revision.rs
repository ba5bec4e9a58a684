//! Revision cycle sequencer.
//!
//! A subject's revision cycle is a fixed walk over its completed topics,
//! driven by [`REVISION_SEQUENCE`]: a hand-maintained table of topic orders
//! in which earlier topics recur more often, approximating a decreasing-
//! interval (Leitner-style) schedule. The table is versioned data, not
//! something derived at runtime; its exact interleaving is a product
//! decision and is kept verbatim.

use serde::{Deserialize, Serialize};

use crate::domain::Topic;

/// Interleaving table, version 1. Each entry names a topic by its
/// `topic_order` within the subject. Entries whose topic is not yet
/// completed are skipped when the per-subject sequence is built.
pub const REVISION_SEQUENCE: [i64; 100] = [
  0,
  1, 0,
  2, 1, 0,
  3, 2, 0,
  4, 3, 1, 0,
  5, 4, 2, 0,
  6, 5, 3, 1, 0,
  7, 6, 4, 0,
  8, 7, 5, 2, 0,
  9, 8, 6, 1, 0,
  10, 9, 7, 3, 0,
  11, 10, 8, 0,
  12, 11, 9, 4, 2, 0,
  13, 12, 10, 1, 0,
  14, 13, 11, 5, 0,
  15, 14, 12, 3, 0,
  16, 15, 13, 6, 2, 1, 0,
  17, 16, 14, 0,
  18, 17, 15, 7, 4, 0,
  19, 18, 16, 2, 1, 0,
  20, 19, 17, 8, 5, 3, 0,
  21, 20, 18, 0,
];

/// State of one box relative to the subject's progress cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxState {
  /// Already revised; only the most recent one can be undone.
  Completed,
  /// The actionable box at the cursor.
  Current,
  /// Not reachable until everything before it is done.
  Waiting,
}

/// One step of a subject's revision cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionBox {
  /// Position within the built sequence.
  pub index: i64,
  pub topic_id: i64,
  pub topic_name: String,
  pub topic_order: i64,
  pub state: BoxState,
}

/// Build the subject's revision sequence: completed topics only, in table
/// order, with entries for unfinished topics dropped.
pub fn build_sequence(topics: &[Topic]) -> Vec<(i64, &Topic)> {
  REVISION_SEQUENCE
    .iter()
    .filter_map(|order| {
      topics
        .iter()
        .find(|t| t.is_completed && t.topic_order == *order)
    })
    .enumerate()
    .map(|(i, t)| (i as i64, t))
    .collect()
}

/// Annotate the sequence with box states for the given progress cursor.
pub fn boxes(topics: &[Topic], progress: i64) -> Vec<RevisionBox> {
  build_sequence(topics)
    .into_iter()
    .map(|(index, topic)| RevisionBox {
      index,
      topic_id: topic.id,
      topic_name: topic.name.clone(),
      topic_order: topic.topic_order,
      state: if index < progress {
        BoxState::Completed
      } else if index == progress {
        BoxState::Current
      } else {
        BoxState::Waiting
      },
    })
    .collect()
}

/// Whether the cycle has been walked to the end.
pub fn cycle_complete(topics: &[Topic], progress: i64) -> bool {
  progress >= build_sequence(topics).len() as i64
}

/// Why a cursor move was refused. Surfaced as a field-level message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionError {
  CycleComplete,
  /// Undo is only allowed for the box immediately before the cursor.
  UndoNotAllowed { index: i64, progress: i64 },
}

impl std::fmt::Display for RevisionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::CycleComplete => write!(f, "revision cycle already complete"),
      Self::UndoNotAllowed { index, progress } => write!(
        f,
        "only box {} can be undone, not box {}",
        progress - 1,
        index
      ),
    }
  }
}

/// Mark the current box complete, returning the new progress cursor.
pub fn advance(topics: &[Topic], progress: i64) -> Result<i64, RevisionError> {
  if cycle_complete(topics, progress) {
    return Err(RevisionError::CycleComplete);
  }
  Ok(progress + 1)
}

/// Un-mark a completed box. Only the box at `progress - 1` is undoable,
/// keeping history edits strictly last-in-first-out.
pub fn undo(progress: i64, index: i64) -> Result<i64, RevisionError> {
  if progress <= 0 || index != progress - 1 {
    return Err(RevisionError::UndoNotAllowed { index, progress });
  }
  Ok(progress - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn topic(order: i64, completed: bool) -> Topic {
    Topic {
      id: 100 + order,
      subject_id: 1,
      name: format!("Topic {}", order),
      topic_order: order,
      is_completed: completed,
      completion_date: None,
    }
  }

  #[test]
  fn test_sequence_matches_completed_orders() {
    // Orders 0, 1, 2 all completed: sequence length equals the number of
    // table entries naming one of those orders.
    let topics = vec![topic(0, true), topic(1, true), topic(2, true)];
    let expected = REVISION_SEQUENCE.iter().filter(|o| **o <= 2).count();
    assert_eq!(build_sequence(&topics).len(), expected);
  }

  #[test]
  fn test_incomplete_topics_dropped() {
    let topics = vec![topic(0, true), topic(1, false), topic(2, true)];
    let sequence = build_sequence(&topics);
    assert!(sequence.iter().all(|(_, t)| t.topic_order != 1));
    let expected = REVISION_SEQUENCE
      .iter()
      .filter(|o| **o == 0 || **o == 2)
      .count();
    assert_eq!(sequence.len(), expected);
  }

  #[test]
  fn test_no_completed_topics_empty_sequence() {
    let topics = vec![topic(0, false), topic(5, false)];
    assert!(build_sequence(&topics).is_empty());
    assert!(cycle_complete(&topics, 0));
  }

  #[test]
  fn test_earlier_topics_recur_more_often() {
    let count = |order: i64| REVISION_SEQUENCE.iter().filter(|o| **o == order).count();
    assert!(count(0) > count(1));
    assert!(count(1) > count(5));
    assert!(count(5) >= count(15));
  }

  #[test]
  fn test_box_states_around_cursor() {
    let topics = vec![topic(0, true), topic(1, true)];
    let boxes = boxes(&topics, 2);
    assert_eq!(boxes[0].state, BoxState::Completed);
    assert_eq!(boxes[1].state, BoxState::Completed);
    assert_eq!(boxes[2].state, BoxState::Current);
    assert!(boxes[3..].iter().all(|b| b.state == BoxState::Waiting));
  }

  #[test]
  fn test_advance_until_complete() {
    let topics = vec![topic(0, true)];
    let len = build_sequence(&topics).len() as i64;
    let mut progress = 0;
    for _ in 0..len {
      progress = advance(&topics, progress).unwrap();
    }
    assert!(cycle_complete(&topics, progress));
    assert_eq!(advance(&topics, progress), Err(RevisionError::CycleComplete));
  }

  #[test]
  fn test_undo_only_previous_box() {
    assert_eq!(undo(3, 2), Ok(2));
    assert_eq!(
      undo(3, 1),
      Err(RevisionError::UndoNotAllowed { index: 1, progress: 3 })
    );
    assert_eq!(
      undo(3, 3),
      Err(RevisionError::UndoNotAllowed { index: 3, progress: 3 })
    );
    assert_eq!(
      undo(0, 0),
      Err(RevisionError::UndoNotAllowed { index: 0, progress: 0 })
    );
  }

  #[test]
  fn test_sequence_table_is_stable() {
    // The table is versioned data: guard its shape so an accidental edit
    // shows up in review.
    assert_eq!(REVISION_SEQUENCE.len(), 100);
    assert_eq!(REVISION_SEQUENCE[0], 0);
    assert!(REVISION_SEQUENCE.iter().all(|o| *o >= 0));
  }
}
