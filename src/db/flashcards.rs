//! Flashcard and review session CRUD operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::db::LogOnError;
use crate::domain::{Flashcard, ReviewSession};

pub fn insert_flashcard(conn: &Connection, card: &Flashcard) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO flashcards (user_id, question, answer, difficulty, stability, retrievability,
                            last_review, next_review, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
        params![
            card.user_id,
            card.question,
            card.answer,
            card.difficulty,
            card.stability,
            card.retrievability,
            card.last_review.map(|d| d.to_rfc3339()),
            card.next_review.to_rfc3339(),
            card.created_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_flashcard_by_id(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Flashcard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, question, answer, difficulty, stability, retrievability,
           last_review, next_review, created_at
    FROM flashcards WHERE id = ?1 AND user_id = ?2
    "#,
    )?;

    stmt.query_row(params![id, user_id], |row| row_to_flashcard(row))
        .optional()
}

pub fn get_flashcards(conn: &Connection, user_id: &str) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, question, answer, difficulty, stability, retrievability,
           last_review, next_review, created_at
    FROM flashcards WHERE user_id = ?1
    ORDER BY created_at ASC, id ASC
    "#,
    )?;

    stmt.query_map(params![user_id], |row| row_to_flashcard(row))?
        .collect::<Result<Vec<_>>>()
}

/// Cards whose `next_review` is at or before `now`, most overdue first.
pub fn get_due_flashcards(conn: &Connection, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, question, answer, difficulty, stability, retrievability,
           last_review, next_review, created_at
    FROM flashcards WHERE user_id = ?1 AND next_review <= ?2
    ORDER BY next_review ASC, id ASC
    "#,
    )?;

    stmt.query_map(params![user_id, now.to_rfc3339()], |row| row_to_flashcard(row))?
        .collect::<Result<Vec<_>>>()
}

pub fn update_flashcard_content(
    conn: &Connection,
    user_id: &str,
    id: i64,
    question: &str,
    answer: &str,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE flashcards SET question = ?1, answer = ?2 WHERE id = ?3 AND user_id = ?4",
        params![question, answer, id, user_id],
    )?;
    Ok(changed > 0)
}

/// Persist the memory-model fields after a review.
pub fn update_flashcard_schedule(conn: &Connection, card: &Flashcard) -> Result<bool> {
    let changed = conn.execute(
        r#"
    UPDATE flashcards SET difficulty = ?1, stability = ?2, retrievability = ?3,
                          last_review = ?4, next_review = ?5
    WHERE id = ?6 AND user_id = ?7
    "#,
        params![
            card.difficulty,
            card.stability,
            card.retrievability,
            card.last_review.map(|d| d.to_rfc3339()),
            card.next_review.to_rfc3339(),
            card.id,
            card.user_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_flashcard(conn: &Connection, user_id: &str, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM flashcards WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn insert_review_session(conn: &Connection, session: &ReviewSession) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO review_sessions (user_id, card_ids, current_index, started_at, completed,
                                 total_cards, correct_count, time_spent_sec)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
        params![
            session.user_id,
            serde_json::to_string(&session.card_ids).unwrap_or_else(|_| "[]".to_string()),
            session.current_index,
            session.started_at.to_rfc3339(),
            session.completed,
            session.total_cards,
            session.correct_count,
            session.time_spent_sec,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_review_session_by_id(conn: &Connection, user_id: &str, id: i64) -> Result<Option<ReviewSession>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, card_ids, current_index, started_at, completed,
           total_cards, correct_count, time_spent_sec
    FROM review_sessions WHERE id = ?1 AND user_id = ?2
    "#,
    )?;

    stmt.query_row(params![id, user_id], |row| row_to_review_session(row))
        .optional()
}

pub fn update_review_session(conn: &Connection, session: &ReviewSession) -> Result<bool> {
    let changed = conn.execute(
        r#"
    UPDATE review_sessions SET current_index = ?1, completed = ?2, correct_count = ?3,
                               time_spent_sec = ?4
    WHERE id = ?5 AND user_id = ?6
    "#,
        params![
            session.current_index,
            session.completed,
            session.correct_count,
            session.time_spent_sec,
            session.id,
            session.user_id,
        ],
    )?;
    Ok(changed > 0)
}

pub(crate) fn row_to_flashcard(row: &rusqlite::Row) -> Result<Flashcard> {
    let last_review_str: Option<String> = row.get(7)?;
    let next_review_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;

    Ok(Flashcard {
        id: row.get(0)?,
        user_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        difficulty: row.get(4)?,
        stability: row.get(5)?,
        retrievability: row.get(6)?,
        last_review: last_review_str.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }),
        next_review: DateTime::parse_from_rfc3339(&next_review_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

pub(crate) fn row_to_review_session(row: &rusqlite::Row) -> Result<ReviewSession> {
    let card_ids_json: String = row.get(2)?;
    let started_at_str: String = row.get(4)?;
    let completed_int: i64 = row.get(5)?;

    Ok(ReviewSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        card_ids: serde_json::from_str(&card_ids_json)
            .log_warn_default("bad card_ids payload in review session row"),
        current_index: row.get(3)?,
        started_at: DateTime::parse_from_rfc3339(&started_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        completed: completed_int != 0,
        total_cards: row.get(6)?,
        correct_count: row.get(7)?,
        time_spent_sec: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::Scheduler;
    use crate::testing::TestEnv;

    fn new_card(user_id: &str, question: &str) -> Flashcard {
        let scheduler = Scheduler::default();
        scheduler.initial_card(user_id.to_string(), question.to_string(), "a".to_string())
    }

    #[test]
    fn test_flashcard_roundtrip() {
        let env = TestEnv::new().unwrap();
        let id = insert_flashcard(&env.conn, &new_card("u1", "q1")).unwrap();

        let loaded = get_flashcard_by_id(&env.conn, "u1", id).unwrap().unwrap();
        assert_eq!(loaded.question, "q1");
        assert!(loaded.last_review.is_none());
        assert_eq!(loaded.retrievability, 1.0);
    }

    #[test]
    fn test_due_query_excludes_future_cards() {
        let env = TestEnv::new().unwrap();
        let now = Utc::now();

        let mut due = new_card("u1", "due");
        due.next_review = now - chrono::Duration::hours(1);
        insert_flashcard(&env.conn, &due).unwrap();

        let mut future = new_card("u1", "future");
        future.next_review = now + chrono::Duration::days(3);
        insert_flashcard(&env.conn, &future).unwrap();

        let cards = get_due_flashcards(&env.conn, "u1", now).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "due");
    }

    #[test]
    fn test_due_query_orders_most_overdue_first() {
        let env = TestEnv::new().unwrap();
        let now = Utc::now();

        let mut recent = new_card("u1", "recent");
        recent.next_review = now - chrono::Duration::hours(1);
        insert_flashcard(&env.conn, &recent).unwrap();

        let mut stale = new_card("u1", "stale");
        stale.next_review = now - chrono::Duration::days(5);
        insert_flashcard(&env.conn, &stale).unwrap();

        let cards = get_due_flashcards(&env.conn, "u1", now).unwrap();
        assert_eq!(cards[0].question, "stale");
        assert_eq!(cards[1].question, "recent");
    }

    #[test]
    fn test_schedule_update_persists() {
        let env = TestEnv::new().unwrap();
        let now = Utc::now();
        let id = insert_flashcard(&env.conn, &new_card("u1", "q")).unwrap();

        let mut card = get_flashcard_by_id(&env.conn, "u1", id).unwrap().unwrap();
        card.difficulty = 6.2;
        card.stability = 4.5;
        card.retrievability = 0.82;
        card.last_review = Some(now);
        card.next_review = now + chrono::Duration::days(4);
        assert!(update_flashcard_schedule(&env.conn, &card).unwrap());

        let loaded = get_flashcard_by_id(&env.conn, "u1", id).unwrap().unwrap();
        assert!((loaded.difficulty - 6.2).abs() < 1e-9);
        assert!((loaded.stability - 4.5).abs() < 1e-9);
        assert!(loaded.last_review.is_some());
    }

    #[test]
    fn test_review_session_roundtrip() {
        let env = TestEnv::new().unwrap();
        let mut session = ReviewSession::new("u1".to_string(), vec![3, 1, 2]);
        let id = insert_review_session(&env.conn, &session).unwrap();
        session.id = id;

        let loaded = get_review_session_by_id(&env.conn, "u1", id).unwrap().unwrap();
        assert_eq!(loaded.card_ids, vec![3, 1, 2]);
        assert_eq!(loaded.total_cards, 3);
        assert!(!loaded.completed);

        session.record_answer(true, 9);
        assert!(update_review_session(&env.conn, &session).unwrap());
        let loaded = get_review_session_by_id(&env.conn, "u1", id).unwrap().unwrap();
        assert_eq!(loaded.current_index, 1);
        assert_eq!(loaded.correct_count, 1);
        assert_eq!(loaded.time_spent_sec, 9);
    }

    #[test]
    fn test_cards_scoped_by_user() {
        let env = TestEnv::new().unwrap();
        let id = insert_flashcard(&env.conn, &new_card("u1", "q")).unwrap();

        assert!(get_flashcard_by_id(&env.conn, "u2", id).unwrap().is_none());
        assert!(!delete_flashcard(&env.conn, "u2", id).unwrap());
        assert!(delete_flashcard(&env.conn, "u1", id).unwrap());
    }
}
