use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS subjects (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id TEXT NOT NULL,
      name TEXT NOT NULL,
      color TEXT NOT NULL DEFAULT '#6366f1',
      description TEXT,
      study_duration INTEGER NOT NULL DEFAULT 1500,
      revision_progress INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS topics (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      subject_id INTEGER NOT NULL,
      name TEXT NOT NULL,
      topic_order INTEGER NOT NULL,
      is_completed INTEGER NOT NULL DEFAULT 0,
      completion_date TEXT,
      FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE,
      UNIQUE (subject_id, topic_order)
    );

    CREATE TABLE IF NOT EXISTS study_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id TEXT NOT NULL,
      subject_id INTEGER NOT NULL,
      topic_id INTEGER,
      logged_at TEXT NOT NULL,
      duration_min INTEGER NOT NULL,
      start_page INTEGER NOT NULL DEFAULT 0,
      end_page INTEGER NOT NULL DEFAULT 0,
      questions_total INTEGER NOT NULL DEFAULT 0,
      questions_correct INTEGER NOT NULL DEFAULT 0,
      source TEXT NOT NULL DEFAULT 'manual',
      sequence_item_index INTEGER,
      FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS flashcards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id TEXT NOT NULL,
      question TEXT NOT NULL,
      answer TEXT NOT NULL,
      difficulty REAL NOT NULL,
      stability REAL NOT NULL,
      retrievability REAL NOT NULL DEFAULT 1.0,
      last_review TEXT,
      next_review TEXT NOT NULL,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS review_sessions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id TEXT NOT NULL,
      card_ids TEXT NOT NULL,
      current_index INTEGER NOT NULL DEFAULT 0,
      started_at TEXT NOT NULL,
      completed INTEGER NOT NULL DEFAULT 0,
      total_cards INTEGER NOT NULL,
      correct_count INTEGER NOT NULL DEFAULT 0,
      time_spent_sec INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS settings (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_subjects_user_id ON subjects(user_id);
    CREATE INDEX IF NOT EXISTS idx_topics_subject_id ON topics(subject_id);
    CREATE INDEX IF NOT EXISTS idx_study_logs_user_id ON study_logs(user_id);
    CREATE INDEX IF NOT EXISTS idx_study_logs_subject_id ON study_logs(subject_id);
    CREATE INDEX IF NOT EXISTS idx_study_logs_logged_at ON study_logs(logged_at);
    CREATE INDEX IF NOT EXISTS idx_flashcards_user_id ON flashcards(user_id);
    CREATE INDEX IF NOT EXISTS idx_flashcards_next_review ON flashcards(next_review);
    CREATE INDEX IF NOT EXISTS idx_review_sessions_user_id ON review_sessions(user_id);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: tag study logs with their origin
  add_column_if_missing(conn, "study_logs", "source", "TEXT NOT NULL DEFAULT 'manual'")?;
  add_column_if_missing(conn, "study_logs", "sequence_item_index", "INTEGER")?;

  // Migration: store retrievability computed at review time
  add_column_if_missing(conn, "flashcards", "retrievability", "REAL NOT NULL DEFAULT 1.0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();

    let count: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('subjects', 'topics', 'study_logs', 'flashcards', 'review_sessions', 'settings')",
        [],
        |row| row.get(0),
      )
      .unwrap();
    assert_eq!(count, 6);
  }

  #[test]
  fn topic_order_is_unique_per_subject() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();

    conn
      .execute(
        "INSERT INTO subjects (user_id, name, created_at) VALUES ('u1', 'Math', '2026-01-01T00:00:00Z')",
        [],
      )
      .unwrap();
    conn
      .execute(
        "INSERT INTO topics (subject_id, name, topic_order) VALUES (1, 'Algebra', 0)",
        [],
      )
      .unwrap();
    let dup = conn.execute(
      "INSERT INTO topics (subject_id, name, topic_order) VALUES (1, 'Geometry', 0)",
      [],
    );
    assert!(dup.is_err());
  }
}
