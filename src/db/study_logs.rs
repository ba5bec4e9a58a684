//! Study log CRUD and query operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{LogSource, StudyLogEntry};

pub fn insert_study_log(conn: &Connection, entry: &StudyLogEntry) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO study_logs (user_id, subject_id, topic_id, logged_at, duration_min, start_page,
                            end_page, questions_total, questions_correct, source, sequence_item_index)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    "#,
        params![
            entry.user_id,
            entry.subject_id,
            entry.topic_id,
            entry.logged_at.to_rfc3339(),
            entry.duration_min,
            entry.start_page,
            entry.end_page,
            entry.questions_total,
            entry.questions_correct,
            entry.source.as_str(),
            entry.sequence_item_index,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_study_log_by_id(conn: &Connection, user_id: &str, id: i64) -> Result<Option<StudyLogEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, subject_id, topic_id, logged_at, duration_min, start_page,
           end_page, questions_total, questions_correct, source, sequence_item_index
    FROM study_logs WHERE id = ?1 AND user_id = ?2
    "#,
    )?;

    stmt.query_row(params![id, user_id], |row| row_to_study_log(row))
        .optional()
}

/// Newest first.
pub fn get_study_logs(conn: &Connection, user_id: &str) -> Result<Vec<StudyLogEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, subject_id, topic_id, logged_at, duration_min, start_page,
           end_page, questions_total, questions_correct, source, sequence_item_index
    FROM study_logs WHERE user_id = ?1
    ORDER BY logged_at DESC, id DESC
    "#,
    )?;

    stmt.query_map(params![user_id], |row| row_to_study_log(row))?
        .collect::<Result<Vec<_>>>()
}

pub fn update_study_log(conn: &Connection, entry: &StudyLogEntry) -> Result<bool> {
    let changed = conn.execute(
        r#"
    UPDATE study_logs SET subject_id = ?1, topic_id = ?2, duration_min = ?3, start_page = ?4,
                          end_page = ?5, questions_total = ?6, questions_correct = ?7
    WHERE id = ?8 AND user_id = ?9
    "#,
        params![
            entry.subject_id,
            entry.topic_id,
            entry.duration_min,
            entry.start_page,
            entry.end_page,
            entry.questions_total,
            entry.questions_correct,
            entry.id,
            entry.user_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_study_log(conn: &Connection, user_id: &str, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM study_logs WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

pub(crate) fn row_to_study_log(row: &rusqlite::Row) -> Result<StudyLogEntry> {
    let logged_at_str: String = row.get(4)?;
    let source_str: String = row.get(10)?;

    Ok(StudyLogEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject_id: row.get(2)?,
        topic_id: row.get(3)?,
        logged_at: DateTime::parse_from_rfc3339(&logged_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        duration_min: row.get(5)?,
        start_page: row.get(6)?,
        end_page: row.get(7)?,
        questions_total: row.get(8)?,
        questions_correct: row.get(9)?,
        source: LogSource::from_str(&source_str).unwrap_or(LogSource::Manual),
        sequence_item_index: row.get(11)?,
    })
}
