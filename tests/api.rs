//! End-to-end JSON API tests against a real database file.

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use estudeaqui::db;
use estudeaqui::handlers;
use estudeaqui::srs::Scheduler;
use estudeaqui::state::AppState;

fn server_with_pool() -> (TempDir, TestServer, db::DbPool) {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("estudeaqui.db");
    let pool = db::init_db(&db_path.to_string_lossy()).unwrap();
    let state = AppState::new(pool.clone(), Scheduler::default());
    let server = TestServer::new(handlers::router(state)).unwrap();
    (temp, server, pool)
}

fn server() -> (TempDir, TestServer) {
    let (temp, server, _pool) = server_with_pool();
    (temp, server)
}

async fn create_subject(server: &TestServer, name: &str) -> Value {
    let response = server
        .post("/api/users/u1/subjects")
        .json(&json!({ "name": name, "color": "#e07a5f" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

async fn add_topic(server: &TestServer, subject_id: i64, name: &str) -> Value {
    let response = server
        .post(&format!("/api/users/u1/subjects/{subject_id}/topics"))
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

async fn complete_topic(server: &TestServer, topic_id: i64) {
    server
        .put(&format!("/api/users/u1/topics/{topic_id}/completion"))
        .json(&json!({ "is_completed": true }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (_temp, server) = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn requests_wait_for_a_busy_connection() {
    let (_temp, server, pool) = server_with_pool();

    // Hold the connection from another thread for a moment, the way an
    // overlapping request would.
    let (held_tx, held_rx) = std::sync::mpsc::channel();
    let holder = std::thread::spawn(move || {
        let _guard = db::lock(&pool);
        held_tx.send(()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(150));
    });
    held_rx.recv().unwrap();

    // The overlapping request waits for the lock instead of failing.
    server.get("/api/users/u1/subjects").await.assert_status_ok();
    holder.join().unwrap();
}

#[tokio::test]
async fn subject_crud_flow() {
    let (_temp, server) = server();

    let subject = create_subject(&server, "Direito Constitucional").await;
    let id = subject["id"].as_i64().unwrap();
    assert_eq!(subject["study_duration"], 1500);
    assert_eq!(subject["revision_progress"], 0);

    let updated = server
        .put(&format!("/api/users/u1/subjects/{id}"))
        .json(&json!({
            "name": "Direito Administrativo",
            "color": "#3d405b",
            "study_duration": 3000
        }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["name"], "Direito Administrativo");

    // Another user cannot see it.
    server
        .get(&format!("/api/users/u2/subjects/{id}"))
        .await
        .assert_status_not_found();

    server
        .delete(&format!("/api/users/u1/subjects/{id}"))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/users/u1/subjects/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn empty_subject_name_rejected() {
    let (_temp, server) = server();
    let response = server
        .post("/api/users/u1/subjects")
        .json(&json!({ "name": "   " }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "name");
}

#[tokio::test]
async fn topics_are_ordered_and_cascade() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let subject_id = subject["id"].as_i64().unwrap();

    add_topic(&server, subject_id, "Limits").await;
    add_topic(&server, subject_id, "Derivatives").await;

    let loaded = server
        .get(&format!("/api/users/u1/subjects/{subject_id}"))
        .await
        .json::<Value>();
    let topics = loaded["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0]["topic_order"], 0);
    assert_eq!(topics[1]["topic_order"], 1);

    server
        .delete(&format!("/api/users/u1/subjects/{subject_id}"))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn study_log_validation_is_field_level() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let subject_id = subject["id"].as_i64().unwrap();

    let response = server
        .post("/api/users/u1/study-logs")
        .json(&json!({
            "subject_id": subject_id,
            "duration_min": 30,
            "start_page": 20,
            "end_page": 10
        }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "end_page");

    let response = server
        .post("/api/users/u1/study-logs")
        .json(&json!({
            "subject_id": subject_id,
            "duration_min": 30,
            "questions_total": 5,
            "questions_correct": 7
        }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["field"], "questions_correct");
}

#[tokio::test]
async fn study_log_crud_flow() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let subject_id = subject["id"].as_i64().unwrap();

    let created = server
        .post("/api/users/u1/study-logs")
        .json(&json!({
            "subject_id": subject_id,
            "duration_min": 45,
            "start_page": 10,
            "end_page": 25,
            "questions_total": 10,
            "questions_correct": 8
        }))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let log = created.json::<Value>();
    let log_id = log["id"].as_i64().unwrap();
    assert_eq!(log["source"], "manual");

    let updated = server
        .put(&format!("/api/users/u1/study-logs/{log_id}"))
        .json(&json!({ "subject_id": subject_id, "duration_min": 50 }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["duration_min"], 50);

    server
        .delete(&format!("/api/users/u1/study-logs/{log_id}"))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn revision_advance_writes_tagged_log() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let subject_id = subject["id"].as_i64().unwrap();

    let topic = add_topic(&server, subject_id, "Limits").await;
    complete_topic(&server, topic["id"].as_i64().unwrap()).await;

    let view = server
        .get(&format!("/api/users/u1/subjects/{subject_id}/revision"))
        .await
        .json::<Value>();
    let boxes = view["boxes"].as_array().unwrap();
    assert!(!boxes.is_empty());
    assert_eq!(boxes[0]["state"], "current");

    let advanced = server
        .post(&format!("/api/users/u1/subjects/{subject_id}/revision/advance"))
        .json(&json!({ "duration_min": 15 }))
        .await;
    advanced.assert_status_ok();
    assert_eq!(advanced.json::<Value>()["progress"], 1);

    let logs = server.get("/api/users/u1/study-logs").await.json::<Value>();
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["source"], "revision");
    assert_eq!(logs[0]["sequence_item_index"], 0);
}

#[tokio::test]
async fn revision_undo_only_at_cursor() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let subject_id = subject["id"].as_i64().unwrap();

    let topic = add_topic(&server, subject_id, "Limits").await;
    complete_topic(&server, topic["id"].as_i64().unwrap()).await;

    server
        .post(&format!("/api/users/u1/subjects/{subject_id}/revision/advance"))
        .await
        .assert_status_ok();

    // Wrong index is rejected without moving the cursor.
    let rejected = server
        .post(&format!("/api/users/u1/subjects/{subject_id}/revision/undo"))
        .json(&json!({ "index": 5 }))
        .await;
    rejected.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    let undone = server
        .post(&format!("/api/users/u1/subjects/{subject_id}/revision/undo"))
        .json(&json!({ "index": 0 }))
        .await;
    undone.assert_status_ok();
    assert_eq!(undone.json::<Value>()["progress"], 0);
}

#[tokio::test]
async fn flashcard_review_reschedules() {
    let (_temp, server) = server();

    let created = server
        .post("/api/users/u1/flashcards")
        .json(&json!({ "question": "Capital do Brasil?", "answer": "Brasília" }))
        .await;
    created.assert_status(axum::http::StatusCode::CREATED);
    let card = created.json::<Value>();
    let card_id = card["id"].as_i64().unwrap();

    // New card is due immediately.
    let due = server.get("/api/users/u1/flashcards/due").await.json::<Value>();
    assert_eq!(due.as_array().unwrap().len(), 1);

    let invalid = server
        .post(&format!("/api/users/u1/flashcards/{card_id}/review"))
        .json(&json!({ "rating": 5 }))
        .await;
    invalid.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(invalid.json::<Value>()["field"], "rating");

    let reviewed = server
        .post(&format!("/api/users/u1/flashcards/{card_id}/review"))
        .json(&json!({ "rating": 3 }))
        .await;
    reviewed.assert_status_ok();
    let reviewed = reviewed.json::<Value>();
    assert!(reviewed["last_review"].is_string());

    // Scheduled into the future, so no longer due.
    let due = server.get("/api/users/u1/flashcards/due").await.json::<Value>();
    assert!(due.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn review_session_walks_the_due_queue() {
    let (_temp, server) = server();

    for question in ["q1", "q2"] {
        server
            .post("/api/users/u1/flashcards")
            .json(&json!({ "question": question, "answer": "a" }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    let session = server
        .post("/api/users/u1/review-sessions")
        .await
        .json::<Value>();
    let session_id = session["id"].as_i64().unwrap();
    assert_eq!(session["total_cards"], 2);
    assert_eq!(session["completed"], false);

    let first = server
        .post(&format!("/api/users/u1/review-sessions/{session_id}/answer"))
        .json(&json!({ "rating": 3, "time_spent_sec": 7 }))
        .await
        .json::<Value>();
    assert_eq!(first["session"]["current_index"], 1);
    assert_eq!(first["session"]["correct_count"], 1);

    let second = server
        .post(&format!("/api/users/u1/review-sessions/{session_id}/answer"))
        .json(&json!({ "rating": 1, "time_spent_sec": 11 }))
        .await
        .json::<Value>();
    assert_eq!(second["session"]["completed"], true);
    assert_eq!(second["session"]["correct_count"], 1);
    assert_eq!(second["session"]["time_spent_sec"], 18);

    // Answering a finished session is a validation error.
    server
        .post(&format!("/api/users/u1/review-sessions/{session_id}/answer"))
        .json(&json!({ "rating": 3 }))
        .await
        .assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn session_skips_cards_deleted_after_snapshot() {
    let (_temp, server) = server();

    let mut card_ids = Vec::new();
    for question in ["q1", "q2"] {
        let created = server
            .post("/api/users/u1/flashcards")
            .json(&json!({ "question": question, "answer": "a" }))
            .await;
        created.assert_status(axum::http::StatusCode::CREATED);
        card_ids.push(created.json::<Value>()["id"].as_i64().unwrap());
    }

    let session = server
        .post("/api/users/u1/review-sessions")
        .await
        .json::<Value>();
    let session_id = session["id"].as_i64().unwrap();
    assert_eq!(session["total_cards"], 2);

    // The card at the cursor disappears before it is answered.
    server
        .delete(&format!("/api/users/u1/flashcards/{}", card_ids[0]))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    // The answer lands on the next surviving card instead of erroring.
    let answered = server
        .post(&format!("/api/users/u1/review-sessions/{session_id}/answer"))
        .json(&json!({ "rating": 3 }))
        .await;
    answered.assert_status_ok();
    let answered = answered.json::<Value>();
    assert_eq!(answered["card"]["id"], card_ids[1]);
    assert_eq!(answered["session"]["completed"], true);
    assert_eq!(answered["session"]["correct_count"], 1);
    assert_eq!(answered["session"]["current_index"], 2);
}

#[tokio::test]
async fn topic_edits_require_ownership() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let topic = add_topic(&server, subject["id"].as_i64().unwrap(), "Limits").await;
    let topic_id = topic["id"].as_i64().unwrap();

    server
        .put(&format!("/api/users/u2/topics/{topic_id}"))
        .json(&json!({ "name": "hijacked" }))
        .await
        .assert_status_not_found();

    let renamed = server
        .put(&format!("/api/users/u1/topics/{topic_id}"))
        .json(&json!({ "name": "Continuity" }))
        .await;
    renamed.assert_status_ok();
    assert_eq!(renamed.json::<Value>()["name"], "Continuity");
}

#[tokio::test]
async fn pomodoro_settings_and_timer_flow() {
    let (_temp, server) = server();

    let defaults = server
        .get("/api/users/u1/pomodoro/settings")
        .await
        .json::<Value>();
    assert_eq!(defaults["short_break_sec"], 300);

    let rejected = server
        .put("/api/users/u1/pomodoro/settings")
        .json(&json!({
            "tasks": [],
            "short_break_sec": 300,
            "long_break_sec": 900,
            "cycles_until_long_break": 4
        }))
        .await;
    rejected.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    let started = server
        .post("/api/users/u1/pomodoro/start")
        .json(&json!({ "custom_duration": 3 }))
        .await
        .json::<Value>();
    assert_eq!(started["status"], "focus");
    assert_eq!(started["time_remaining"], 3);
    let generation = started["generation"].as_u64().unwrap();

    // A stale generation tick changes nothing.
    let stale = server
        .post("/api/users/u1/pomodoro/tick")
        .json(&json!({ "generation": generation + 1 }))
        .await
        .json::<Value>();
    assert_eq!(stale["time_remaining"], 3);

    for _ in 0..2 {
        server
            .post("/api/users/u1/pomodoro/tick")
            .json(&json!({ "generation": generation }))
            .await
            .assert_status_ok();
    }
    let finished = server
        .post("/api/users/u1/pomodoro/tick")
        .json(&json!({ "generation": generation }))
        .await
        .json::<Value>();
    assert_eq!(finished["session_finished"], true);
    assert_eq!(finished["status"], "short_break");
    assert_eq!(finished["pomodoros_completed_today"], 1);

    let stopped = server
        .post("/api/users/u1/pomodoro/stop")
        .await
        .json::<Value>();
    assert_eq!(stopped["status"], "idle");
    assert_eq!(stopped["pomodoros_completed_today"], 1);
}

#[tokio::test]
async fn stats_reflect_logged_study() {
    let (_temp, server) = server();
    let subject = create_subject(&server, "Math").await;
    let subject_id = subject["id"].as_i64().unwrap();

    let topic = add_topic(&server, subject_id, "Limits").await;
    add_topic(&server, subject_id, "Series").await;
    complete_topic(&server, topic["id"].as_i64().unwrap()).await;

    server
        .post("/api/users/u1/study-logs")
        .json(&json!({
            "subject_id": subject_id,
            "duration_min": 40,
            "questions_total": 20,
            "questions_correct": 14
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let time = server
        .get("/api/users/u1/stats/time-by-subject")
        .await
        .json::<Value>();
    assert_eq!(time[0]["total_minutes"], 40);

    let accuracy = server
        .get("/api/users/u1/stats/accuracy")
        .await
        .json::<Value>();
    assert_eq!(accuracy[0]["accuracy"], 70);

    let completion = server
        .get("/api/users/u1/stats/completion")
        .await
        .json::<Value>();
    assert_eq!(completion["completed_topics"], 1);
    assert_eq!(completion["total_topics"], 2);

    let daily = server.get("/api/users/u1/stats/daily").await.json::<Value>();
    let days = daily["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[6]["total_minutes"], 40);
}
