//! Subject and topic CRUD operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{Subject, Topic};

pub fn insert_subject(conn: &Connection, subject: &Subject) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO subjects (user_id, name, color, description, study_duration, revision_progress, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            subject.user_id,
            subject.name,
            subject.color,
            subject.description,
            subject.study_duration,
            subject.revision_progress,
            subject.created_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Load one subject with its topics ordered by `topic_order`.
pub fn get_subject_by_id(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Subject>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, name, color, description, study_duration, revision_progress, created_at
    FROM subjects WHERE id = ?1 AND user_id = ?2
    "#,
    )?;

    let subject = stmt
        .query_row(params![id, user_id], |row| row_to_subject(row))
        .optional()?;

    match subject {
        Some(mut subject) => {
            subject.topics = get_topics(conn, subject.id)?;
            Ok(Some(subject))
        }
        None => Ok(None),
    }
}

pub fn get_subjects(conn: &Connection, user_id: &str) -> Result<Vec<Subject>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, name, color, description, study_duration, revision_progress, created_at
    FROM subjects WHERE user_id = ?1
    ORDER BY created_at ASC, id ASC
    "#,
    )?;

    let mut subjects = stmt
        .query_map(params![user_id], |row| row_to_subject(row))?
        .collect::<Result<Vec<_>>>()?;

    for subject in &mut subjects {
        subject.topics = get_topics(conn, subject.id)?;
    }
    Ok(subjects)
}

pub fn update_subject(
    conn: &Connection,
    user_id: &str,
    id: i64,
    name: &str,
    color: &str,
    description: Option<&str>,
    study_duration: i64,
) -> Result<bool> {
    let changed = conn.execute(
        r#"
    UPDATE subjects SET name = ?1, color = ?2, description = ?3, study_duration = ?4
    WHERE id = ?5 AND user_id = ?6
    "#,
        params![name, color, description, study_duration, id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn set_revision_progress(conn: &Connection, user_id: &str, id: i64, progress: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE subjects SET revision_progress = ?1 WHERE id = ?2 AND user_id = ?3",
        params![progress, id, user_id],
    )?;
    Ok(changed > 0)
}

/// Topics cascade via the foreign key.
pub fn delete_subject(conn: &Connection, user_id: &str, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM subjects WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn get_topics(conn: &Connection, subject_id: i64) -> Result<Vec<Topic>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, subject_id, name, topic_order, is_completed, completion_date
    FROM topics WHERE subject_id = ?1
    ORDER BY topic_order ASC
    "#,
    )?;

    stmt.query_map(params![subject_id], |row| row_to_topic(row))?
        .collect::<Result<Vec<_>>>()
}

/// Look up one topic, joined through its subject so ownership is checked in
/// the same query.
pub fn get_topic_for_user(conn: &Connection, user_id: &str, topic_id: i64) -> Result<Option<Topic>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT t.id, t.subject_id, t.name, t.topic_order, t.is_completed, t.completion_date
    FROM topics t
    JOIN subjects s ON s.id = t.subject_id
    WHERE t.id = ?1 AND s.user_id = ?2
    "#,
    )?;

    stmt.query_row(params![topic_id, user_id], |row| row_to_topic(row))
        .optional()
}

pub fn insert_topic(conn: &Connection, topic: &Topic) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO topics (subject_id, name, topic_order, is_completed, completion_date)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            topic.subject_id,
            topic.name,
            topic.topic_order,
            topic.is_completed,
            topic.completion_date.map(|d| d.to_rfc3339()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Append a topic at the next free order slot.
pub fn insert_topic_at_end(conn: &Connection, subject_id: i64, name: &str) -> Result<i64> {
    let next_order: i64 = conn.query_row(
        "SELECT COALESCE(MAX(topic_order) + 1, 0) FROM topics WHERE subject_id = ?1",
        params![subject_id],
        |row| row.get(0),
    )?;
    insert_topic(conn, &Topic::new(subject_id, name.to_string(), next_order))
}

pub fn update_topic(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute("UPDATE topics SET name = ?1 WHERE id = ?2", params![name, id])?;
    Ok(changed > 0)
}

pub fn set_topic_completed(
    conn: &Connection,
    id: i64,
    is_completed: bool,
    completion_date: Option<DateTime<Utc>>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE topics SET is_completed = ?1, completion_date = ?2 WHERE id = ?3",
        params![is_completed, completion_date.map(|d| d.to_rfc3339()), id],
    )?;
    Ok(changed > 0)
}

pub fn delete_topic(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM topics WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

pub(crate) fn row_to_subject(row: &rusqlite::Row) -> Result<Subject> {
    let created_at_str: String = row.get(7)?;

    Ok(Subject {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        description: row.get(4)?,
        study_duration: row.get(5)?,
        revision_progress: row.get(6)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        topics: Vec::new(),
    })
}

pub(crate) fn row_to_topic(row: &rusqlite::Row) -> Result<Topic> {
    let is_completed_int: i64 = row.get(4)?;
    let completion_date_str: Option<String> = row.get(5)?;

    Ok(Topic {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        name: row.get(2)?,
        topic_order: row.get(3)?,
        is_completed: is_completed_int != 0,
        completion_date: completion_date_str.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }),
    })
}
