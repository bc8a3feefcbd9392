// src/handlers/result.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    clients::store::QuizStore,
    error::AppError,
    models::result::{HistoryResponse, QuizResult, SubmitResultRequest},
    services::scoring::{history_stats, score_attempt},
    utils::jwt::Claims,
};

/// Submits an attempt and stores the scored result.
///
/// * Compares the submitted indices with the stored correct indices.
/// * Snapshots the questions so the result stays reviewable.
#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/results",
    tag = "results",
    params(("id" = String, Path, description = "Quiz id")),
    request_body = SubmitResultRequest,
    responses(
        (status = 201, description = "Result stored", body = QuizResult),
        (status = 404, description = "Quiz not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_result(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
    Json(req): Json<SubmitResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store
        .get_quiz(&quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found.".to_string()))?;

    let score = score_attempt(&quiz.questions, &req.answers);

    let result = QuizResult {
        id: uuid::Uuid::new_v4().to_string(),
        quiz_id: quiz.id,
        user_id: claims.user_id().to_string(),
        answers: req.answers,
        score: score.score,
        correct: score.correct,
        total: score.total,
        questions_snapshot: quiz.questions,
        quiz_title: Some(quiz.title),
        submitted_at: chrono::Utc::now(),
    };

    store.insert_result(&result).await?;
    tracing::info!(
        result_id = %result.id,
        quiz_id = %result.quiz_id,
        score = result.score,
        "Quiz result submitted"
    );

    Ok((StatusCode::CREATED, Json(result)))
}

/// The caller's attempts, newest first, with aggregate stats.
#[utoipa::path(
    get,
    path = "/api/results",
    tag = "results",
    responses((status = 200, description = "Result history", body = HistoryResponse)),
    security(("bearer_auth" = []))
)]
pub async fn list_history(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.list_results_by_owner(claims.user_id()).await?;
    let stats = history_stats(&results);

    Ok(Json(HistoryResponse { results, stats }))
}

/// Reads one of the caller's results.
#[utoipa::path(
    get,
    path = "/api/results/{id}",
    tag = "results",
    params(("id" = String, Path, description = "Result id")),
    responses(
        (status = 200, description = "The result", body = QuizResult),
        (status = 403, description = "Result belongs to another user"),
        (status = 404, description = "Result not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_result(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = store
        .get_result(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found.".to_string()))?;

    if result.user_id != claims.user_id() {
        return Err(AppError::Forbidden(
            "You do not have permission to view this result.".to_string(),
        ));
    }

    Ok(Json(result))
}
