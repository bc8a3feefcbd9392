// tests/result_tests.rs

mod common;

use std::collections::HashMap;

use common::{TestApp, ai_quiz_json, sample_quiz, spawn_app};
use quizify::{
    clients::{mock::ScriptedGenerator, store::QuizStore},
    models::{
        quiz::Quiz,
        result::{HistoryResponse, QuizResult},
    },
};
use serde_json::{Value, json};

/// Answers the first `right` questions correctly and the rest wrong.
fn answers_with(quiz: &Quiz, right: usize) -> HashMap<String, i32> {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let correct = q.correct_answer_index as i32;
            let chosen = if i < right { correct } else { (correct + 1) % 4 };
            (q.id.clone(), chosen)
        })
        .collect()
}

async fn submit(
    app: &TestApp,
    user: &str,
    quiz_id: &str,
    answers: &HashMap<String, i32>,
) -> reqwest::Response {
    app.client
        .post(app.url(&format!("/api/quizzes/{}/results", quiz_id)))
        .header("Authorization", app.bearer(user))
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn submit_scores_the_attempt() {
    // Arrange
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;
    let quiz = sample_quiz("alice", 4);
    app.store.insert_quiz(&quiz).await.unwrap();

    // Act
    let response = submit(&app, "bob", &quiz.id, &answers_with(&quiz, 3)).await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let result: QuizResult = response.json().await.unwrap();
    assert_eq!(result.correct, 3);
    assert_eq!(result.total, 4);
    assert_eq!(result.score, 75);
    assert_eq!(result.user_id, "bob");
    assert_eq!(result.quiz_id, quiz.id);
    assert_eq!(result.quiz_title.as_deref(), Some("Sample Quiz"));
    assert_eq!(result.questions_snapshot, quiz.questions);
}

#[tokio::test]
async fn score_rounds_half_up() {
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;
    let quiz = sample_quiz("alice", 7);
    app.store.insert_quiz(&quiz).await.unwrap();

    let response = submit(&app, "alice", &quiz.id, &answers_with(&quiz, 3)).await;

    let result: QuizResult = response.json().await.unwrap();
    // 3/7 = 42.86%
    assert_eq!(result.score, 43);
}

#[tokio::test]
async fn unanswered_questions_count_as_wrong() {
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;
    let quiz = sample_quiz("alice", 4);
    app.store.insert_quiz(&quiz).await.unwrap();

    let mut answers = answers_with(&quiz, 4);
    answers.remove(&quiz.questions[0].id);
    answers.insert("not-a-question".to_string(), 0);

    let result: QuizResult = submit(&app, "alice", &quiz.id, &answers)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(result.correct, 3);
    assert_eq!(result.score, 75);
}

#[tokio::test]
async fn submitting_to_a_missing_quiz_is_not_found() {
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;

    let response = submit(&app, "alice", "missing", &HashMap::new()).await;

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(app.store.result_count().await, 0);
}

#[tokio::test]
async fn snapshot_survives_a_rename() {
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;
    let quiz = sample_quiz("alice", 4);
    app.store.insert_quiz(&quiz).await.unwrap();

    let submitted: QuizResult = submit(&app, "alice", &quiz.id, &answers_with(&quiz, 2))
        .await
        .json()
        .await
        .unwrap();
    app.store.update_title(&quiz.id, "Renamed").await.unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/results/{}", submitted.id)))
        .header("Authorization", app.bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let stored: QuizResult = response.json().await.unwrap();
    assert_eq!(stored.quiz_title.as_deref(), Some("Sample Quiz"));
    assert_eq!(stored.questions_snapshot, quiz.questions);
}

#[tokio::test]
async fn results_are_private_to_their_owner() {
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;
    let quiz = sample_quiz("alice", 4);
    app.store.insert_quiz(&quiz).await.unwrap();
    let submitted: QuizResult = submit(&app, "alice", &quiz.id, &answers_with(&quiz, 1))
        .await
        .json()
        .await
        .unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/results/{}", submitted.id)))
        .header("Authorization", app.bearer("bob"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "You do not have permission to view this result.");

    let response = app
        .client
        .get(app.url("/api/results/unknown"))
        .header("Authorization", app.bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn history_lists_results_with_stats() {
    // Arrange
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;
    let short = sample_quiz("alice", 4);
    let long = sample_quiz("alice", 6);
    app.store.insert_quiz(&short).await.unwrap();
    app.store.insert_quiz(&long).await.unwrap();

    // 3/4 = 75, then 3/6 = 50; a third user's attempt must not leak in.
    submit(&app, "carol", &short.id, &answers_with(&short, 3)).await;
    submit(&app, "carol", &long.id, &answers_with(&long, 3)).await;
    submit(&app, "dave", &short.id, &answers_with(&short, 4)).await;

    // Act
    let response = app
        .client
        .get(app.url("/api/results"))
        .header("Authorization", app.bearer("carol"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let history: HistoryResponse = response.json().await.unwrap();
    assert_eq!(history.results.len(), 2);
    assert!(history.results.iter().all(|r| r.user_id == "carol"));
    assert!(history.results[0].submitted_at >= history.results[1].submitted_at);

    let stats = history.stats;
    assert_eq!(stats.total_quizzes_taken, 2);
    assert_eq!(stats.average_score, 63);
    assert_eq!(stats.total_questions_answered, 10);
    assert_eq!(stats.total_correct_answers, 6);
    assert_eq!(stats.overall_accuracy, 60);
}

#[tokio::test]
async fn empty_history_has_zero_stats() {
    let app = spawn_app(ScriptedGenerator::responding(ai_quiz_json(5))).await;

    let history: HistoryResponse = app
        .client
        .get(app.url("/api/results"))
        .header("Authorization", app.bearer("newcomer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(history.results.is_empty());
    assert_eq!(history.stats.total_quizzes_taken, 0);
    assert_eq!(history.stats.average_score, 0);
    assert_eq!(history.stats.overall_accuracy, 0);
}
