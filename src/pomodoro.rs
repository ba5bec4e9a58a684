//! Pomodoro timer state machine.
//!
//! Pure reducer: `reduce(state, settings, action, today)` returns the next
//! state and never touches the clock, the store, or the UI. The caller (the
//! pomodoro handlers) owns persistence of the returned state and drives the
//! one-second display tick. Every `Tick` carries the generation it was
//! scheduled under; `Stop` bumps the generation, so a tick that fires after
//! a stop is a no-op instead of resurrecting the session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One configurable focus task (e.g. "Deep work", 25 minutes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroTask {
  pub id: i64,
  pub name: String,
  /// Focus length in seconds.
  pub duration_sec: i64,
}

/// User-configurable timer settings, persisted per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroSettings {
  pub tasks: Vec<PomodoroTask>,
  pub short_break_sec: i64,
  pub long_break_sec: i64,
  pub cycles_until_long_break: i64,
}

impl Default for PomodoroSettings {
  fn default() -> Self {
    Self {
      tasks: vec![PomodoroTask {
        id: 1,
        name: "Foco".to_string(),
        duration_sec: 1500,
      }],
      short_break_sec: 300,
      long_break_sec: 900,
      cycles_until_long_break: 4,
    }
  }
}

impl PomodoroSettings {
  /// Settings are rejected before persisting, never silently fixed up.
  pub fn validate(&self) -> Result<(), String> {
    if self.tasks.is_empty() {
      return Err("at least one task is required".to_string());
    }
    if self.tasks.iter().any(|t| t.duration_sec <= 0) {
      return Err("task durations must be positive".to_string());
    }
    if self.short_break_sec <= 0 || self.long_break_sec <= 0 {
      return Err("break durations must be positive".to_string());
    }
    if self.cycles_until_long_break < 1 {
      return Err("cycles until long break must be at least 1".to_string());
    }
    Ok(())
  }

  fn task_duration(&self, index: usize) -> i64 {
    self
      .tasks
      .get(index % self.tasks.len().max(1))
      .map(|t| t.duration_sec)
      .unwrap_or(1500)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroStatus {
  Idle,
  Focus,
  ShortBreak,
  LongBreak,
  Paused,
}

impl PomodoroStatus {
  /// States in which the countdown is running.
  pub fn is_active(&self) -> bool {
    matches!(self, Self::Focus | Self::ShortBreak | Self::LongBreak)
  }
}

/// What the running session is attached to, for the post-focus log prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
  Topic,
  Revision,
}

/// Session-scoped timer state. Never persisted; reset on explicit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroState {
  pub status: PomodoroStatus,
  pub time_remaining: i64,
  pub current_cycle: i64,
  pub pomodoros_completed_today: i64,
  /// Calendar day the daily counter belongs to.
  pub counter_date: NaiveDate,
  pub associated_item_id: Option<i64>,
  pub associated_item_kind: Option<ItemKind>,
  pub current_task_index: usize,
  pub previous_status: Option<PomodoroStatus>,
  pub is_custom_duration: bool,
  /// Explicit focus length for a custom session, restored after each break.
  pub custom_duration_sec: Option<i64>,
  /// Length of the current segment when it started, for progress-ring math.
  pub original_duration: i64,
  /// Bumped on stop so stale ticks can be recognized and dropped.
  pub generation: u64,
  /// Set for exactly one transition when a focus segment completes; the
  /// handler turns it into a "register this session?" prompt.
  pub session_finished: bool,
}

impl PomodoroState {
  pub fn idle(settings: &PomodoroSettings, today: NaiveDate) -> Self {
    let duration = settings.tasks.first().map(|t| t.duration_sec).unwrap_or(0);
    Self {
      status: PomodoroStatus::Idle,
      time_remaining: duration,
      current_cycle: 0,
      pomodoros_completed_today: 0,
      counter_date: today,
      associated_item_id: None,
      associated_item_kind: None,
      current_task_index: 0,
      previous_status: None,
      is_custom_duration: false,
      custom_duration_sec: None,
      original_duration: duration,
      generation: 0,
      session_finished: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PomodoroAction {
  Start {
    task_index: Option<usize>,
    /// Explicit duration in seconds, not drawn from the task list.
    custom_duration: Option<i64>,
    associated_item_id: Option<i64>,
    associated_item_kind: Option<ItemKind>,
  },
  Tick { generation: u64 },
  Pause,
  Resume,
  Stop,
  /// Jump to the next segment without counting a completed pomodoro.
  Skip,
}

/// Apply one action. Unknown or out-of-place actions leave the state
/// unchanged apart from clearing the one-shot `session_finished` flag.
pub fn reduce(
  state: &PomodoroState,
  settings: &PomodoroSettings,
  action: PomodoroAction,
  today: NaiveDate,
) -> PomodoroState {
  let mut next = state.clone();
  next.session_finished = false;
  if next.counter_date != today {
    next.counter_date = today;
    next.pomodoros_completed_today = 0;
  }

  match action {
    PomodoroAction::Start {
      task_index,
      custom_duration,
      associated_item_id,
      associated_item_kind,
    } => {
      if next.status != PomodoroStatus::Idle {
        return next;
      }
      let index = task_index.unwrap_or(0) % settings.tasks.len().max(1);
      let duration = custom_duration
        .filter(|d| *d > 0)
        .unwrap_or_else(|| settings.task_duration(index));
      next.status = PomodoroStatus::Focus;
      next.current_task_index = index;
      next.time_remaining = duration;
      next.original_duration = duration;
      next.custom_duration_sec = custom_duration.filter(|d| *d > 0);
      next.is_custom_duration = next.custom_duration_sec.is_some();
      next.associated_item_id = associated_item_id;
      next.associated_item_kind = associated_item_kind;
      next.previous_status = None;
      next
    }
    PomodoroAction::Tick { generation } => {
      // Stale tick from a stopped or restarted session.
      if generation != next.generation || !next.status.is_active() {
        return next;
      }
      next.time_remaining -= 1;
      if next.time_remaining > 0 {
        return next;
      }
      advance_segment(&mut next, settings, true);
      next
    }
    PomodoroAction::Pause => {
      if !next.status.is_active() {
        return next;
      }
      next.previous_status = Some(next.status);
      next.status = PomodoroStatus::Paused;
      next
    }
    PomodoroAction::Resume => {
      if next.status != PomodoroStatus::Paused {
        return next;
      }
      next.status = next.previous_status.take().unwrap_or(PomodoroStatus::Focus);
      next
    }
    PomodoroAction::Stop => {
      let generation = next.generation + 1;
      let mut stopped = PomodoroState::idle(settings, today);
      stopped.generation = generation;
      stopped.pomodoros_completed_today = next.pomodoros_completed_today;
      stopped.counter_date = next.counter_date;
      stopped
    }
    PomodoroAction::Skip => {
      if !next.status.is_active() {
        return next;
      }
      advance_segment(&mut next, settings, false);
      next
    }
  }
}

/// Move from the current segment to the next one. `completed` is false when
/// the segment was skipped, so focus counters stay untouched.
fn advance_segment(state: &mut PomodoroState, settings: &PomodoroSettings, completed: bool) {
  match state.status {
    PomodoroStatus::Focus => {
      if completed {
        state.current_cycle += 1;
        state.pomodoros_completed_today += 1;
        state.session_finished = true;
      }
      let long_due =
        completed && state.current_cycle % settings.cycles_until_long_break == 0;
      let (status, duration) = if long_due {
        (PomodoroStatus::LongBreak, settings.long_break_sec)
      } else {
        (PomodoroStatus::ShortBreak, settings.short_break_sec)
      };
      state.status = status;
      state.time_remaining = duration;
      state.original_duration = duration;
    }
    PomodoroStatus::ShortBreak | PomodoroStatus::LongBreak => {
      state.status = PomodoroStatus::Focus;
      let duration = if let Some(custom) = state.custom_duration_sec {
        // A custom session keeps its explicit duration across cycles.
        custom
      } else {
        state.current_task_index = (state.current_task_index + 1) % settings.tasks.len().max(1);
        settings.task_duration(state.current_task_index)
      };
      state.original_duration = duration;
      state.time_remaining = duration;
    }
    PomodoroStatus::Idle | PomodoroStatus::Paused => {}
  }
}
