use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subject under study, owning an ordered list of topics.
///
/// `revision_progress` is the cursor into the subject's revision sequence
/// (see `crate::revision`): the count of revision boxes already completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub id: i64,
  pub user_id: String,
  pub name: String,
  /// Display color used by the charts (hex string, e.g. "#e07a5f").
  pub color: String,
  pub description: Option<String>,
  /// Default focus duration in seconds when a Pomodoro session is started
  /// against one of this subject's topics.
  pub study_duration: i64,
  pub revision_progress: i64,
  pub created_at: DateTime<Utc>,
  /// Topics ordered by `topic_order`. Populated on load, not stored inline.
  #[serde(default)]
  pub topics: Vec<Topic>,
}

impl Subject {
  pub fn new(user_id: String, name: String, color: String) -> Self {
    Self {
      id: 0,
      user_id,
      name,
      color,
      description: None,
      study_duration: 1500,
      revision_progress: 0,
      created_at: Utc::now(),
      topics: Vec::new(),
    }
  }

  pub fn completed_topics(&self) -> usize {
    self.topics.iter().filter(|t| t.is_completed).count()
  }
}

/// A topic within a subject. `topic_order` is the stable rank the revision
/// sequencer keys on: unique per subject, not required to be contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
  pub id: i64,
  pub subject_id: i64,
  pub name: String,
  pub topic_order: i64,
  pub is_completed: bool,
  pub completion_date: Option<DateTime<Utc>>,
}

impl Topic {
  pub fn new(subject_id: i64, name: String, topic_order: i64) -> Self {
    Self {
      id: 0,
      subject_id,
      name,
      topic_order,
      is_completed: false,
      completion_date: None,
    }
  }
}
