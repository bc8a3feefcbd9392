// src/handlers/quiz.rs

use std::{sync::Arc, time::Instant};

use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    clients::{ai::{AiError, QuizGenerator}, storage::ObjectStore, store::QuizStore},
    config::{Config, UploadLimits},
    error::AppError,
    models::quiz::{
        ActionResponse, CloneResponse, CreateQuizForm, Quiz, RenameQuizRequest, TogglePinRequest,
    },
    services::{
        generation::{assemble_quiz, build_request, check_question_count, parse_generated},
        upload::{UploadBuffer, UploadError, UploadedFile, check_content_type, validate_upload},
    },
    utils::jwt::Claims,
};

/// Raw fields of the create form.
struct CreateForm {
    file: Option<UploadedFile>,
    question_count: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body is too large.".to_string())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Reads the multipart form, streaming the file part chunk by chunk.
/// The declared type is checked before any of the file body is buffered.
async fn read_create_form(
    mut multipart: Multipart,
    limits: &UploadLimits,
) -> Result<CreateForm, AppError> {
    let mut form = CreateForm {
        file: None,
        question_count: None,
    };

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdfFile" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().unwrap_or_default().to_string();
                check_content_type(&content_type)?;

                let mut buffer = UploadBuffer::new(limits);
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    buffer.push(&chunk)?;
                }
                tracing::debug!(?file_name, size = buffer.len(), "Received file part");

                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: buffer.into_bytes(),
                });
            }
            "questionCount" => {
                form.question_count = Some(field.text().await.map_err(multipart_error)?);
            }
            other => tracing::debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(form)
}

/// Loads a quiz and checks that `user_id` owns it.
async fn load_owned_quiz(
    store: &dyn QuizStore,
    quiz_id: &str,
    user_id: &str,
    action: &str,
    missing: &str,
) -> Result<Quiz, AppError> {
    let quiz = store
        .get_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(missing.to_string()))?;

    if quiz.user_id != user_id {
        tracing::warn!(
            "Permission denied. User '{}' does not own quiz '{}'",
            user_id,
            quiz_id
        );
        return Err(AppError::Forbidden(format!(
            "You do not have permission to {} this quiz.",
            action
        )));
    }

    Ok(quiz)
}

/// Creates a quiz from an uploaded PDF.
///
/// * Validates the question count and the upload (type, size, pages).
/// * Calls the generator and validates its answer against the quiz schema.
/// * Stores the source PDF (failure is non-fatal) and persists the quiz.
#[utoipa::path(
    post,
    path = "/api/quizzes",
    tag = "quizzes",
    request_body(content = CreateQuizForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Quiz generated and stored", body = Quiz),
        (status = 400, description = "Invalid upload or question count"),
        (status = 413, description = "File or request body too large"),
        (status = 502, description = "AI service failed or returned an invalid quiz"),
        (status = 504, description = "AI service timed out"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_quiz(
    State(config): State<Config>,
    State(store): State<Arc<dyn QuizStore>>,
    State(generator): State<Arc<dyn QuizGenerator>>,
    State(storage): State<Arc<dyn ObjectStore>>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Expected a multipart/form-data upload: {}", e))
    })?;
    let limits = config.upload;

    let form = read_create_form(multipart, &limits).await?;
    let upload = form.file.ok_or(UploadError::Missing)?;

    let raw_count = form
        .question_count
        .ok_or_else(|| AppError::BadRequest("Number of questions not specified.".to_string()))?;
    let question_count = raw_count.trim().parse::<u32>().map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid number of questions. Must be between {} and {}.",
            limits.min_questions, limits.max_questions
        ))
    })?;
    check_question_count(question_count, &limits)?;

    let pdf = validate_upload(upload, &limits)?;
    tracing::info!(
        user_id = claims.user_id(),
        file_name = ?pdf.file_name,
        pages = pdf.page_count,
        question_count,
        "Upload accepted, generating quiz"
    );

    let request = build_request(&pdf, question_count, &limits)?;

    let started = Instant::now();
    let raw = generator.generate(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Quiz generation call failed");
        AppError::from(e)
    })?;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generation call completed"
    );

    let generated = parse_generated(&raw, question_count)?;
    if generated.questions.is_empty() {
        return Err(AiError::EmptyResponse.into());
    }

    let mut quiz = assemble_quiz(generated, claims.user_id(), pdf.file_name.as_deref());

    match storage.put_pdf(pdf.file_name.as_deref(), &pdf.bytes).await {
        Ok(url) => quiz.pdf_storage_url = Some(url),
        Err(e) => tracing::warn!(
            "PDF upload to object storage failed (non-fatal): {}",
            e
        ),
    }

    store.insert_quiz(&quiz).await?;
    tracing::info!(
        quiz_id = %quiz.id,
        questions = quiz.question_count,
        "Quiz created"
    );

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Lists the caller's quizzes, pinned first, newest first.
#[utoipa::path(
    get,
    path = "/api/quizzes",
    tag = "quizzes",
    responses((status = 200, description = "The caller's quizzes", body = [Quiz])),
    security(("bearer_auth" = []))
)]
pub async fn list_quizzes(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.list_quizzes_by_owner(claims.user_id()).await?;
    Ok(Json(quizzes))
}

/// Reads a quiz by id. Any signed-in user may open a shared quiz.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "The quiz", body = Quiz),
        (status = 404, description = "Quiz not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store
        .get_quiz(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found.".to_string()))?;

    Ok(Json(quiz))
}

/// Deletes a quiz and the caller's results for it in one atomic batch.
#[utoipa::path(
    delete,
    path = "/api/quizzes/{id}",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Deleted", body = ActionResponse),
        (status = 403, description = "Caller does not own the quiz"),
        (status = 404, description = "Quiz not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();
    load_owned_quiz(
        store.as_ref(),
        &id,
        user_id,
        "delete",
        "Quiz not found or already deleted.",
    )
    .await?;

    let removed = store.delete_quiz_cascade(&id, user_id).await.map_err(|e| {
        tracing::error!("Failed to delete quiz '{}': {}", id, e);
        AppError::from(e)
    })?;
    tracing::info!(quiz_id = %id, results_removed = removed, "Quiz deleted");

    Ok(Json(ActionResponse::ok(
        "Quiz and associated results deleted successfully.",
    )))
}

/// Renames a quiz. Only the title field changes.
#[utoipa::path(
    put,
    path = "/api/quizzes/{id}/title",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    request_body = RenameQuizRequest,
    responses(
        (status = 200, description = "Renamed", body = ActionResponse),
        (status = 400, description = "Empty or too long title"),
        (status = 403, description = "Caller does not own the quiz"),
        (status = 404, description = "Quiz not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rename_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<RenameQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    load_owned_quiz(store.as_ref(), &id, claims.user_id(), "rename", "Quiz not found.").await?;

    let title = payload.title.trim();
    store.update_title(&id, title).await?;
    tracing::info!(quiz_id = %id, "Quiz title updated to '{}'", title);

    Ok(Json(ActionResponse::ok("Quiz title updated successfully.")))
}

/// Pins or unpins a quiz. Only the pin field changes.
#[utoipa::path(
    put,
    path = "/api/quizzes/{id}/pin",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    request_body = TogglePinRequest,
    responses(
        (status = 200, description = "Pin status updated", body = ActionResponse),
        (status = 403, description = "Caller does not own the quiz"),
        (status = 404, description = "Quiz not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_pin(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<TogglePinRequest>,
) -> Result<impl IntoResponse, AppError> {
    load_owned_quiz(store.as_ref(), &id, claims.user_id(), "modify", "Quiz not found.").await?;

    store.update_pin(&id, payload.is_pinned).await?;

    let verb = if payload.is_pinned { "pinned" } else { "unpinned" };
    Ok(Json(ActionResponse::ok(format!("Quiz {} successfully.", verb))))
}

/// Copies another user's quiz into the caller's collection.
///
/// Cloning a quiz the caller already owns returns its id and writes nothing.
#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/clone",
    tag = "quizzes",
    params(("id" = String, Path, description = "Source quiz id")),
    responses(
        (status = 200, description = "Caller already owns the quiz", body = CloneResponse),
        (status = 201, description = "Quiz cloned", body = CloneResponse),
        (status = 404, description = "Original quiz not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clone_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();
    let original = store
        .get_quiz(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Original quiz not found.".to_string()))?;

    if original.user_id == user_id {
        tracing::info!("User '{}' already owns quiz '{}', nothing to clone", user_id, id);
        return Ok((
            StatusCode::OK,
            Json(CloneResponse {
                success: true,
                new_quiz_id: original.id,
                message: "You already own this quiz.".to_string(),
            }),
        ));
    }

    let cloned = original.clone_for_owner(user_id);
    store.insert_quiz(&cloned).await?;
    tracing::info!(
        "Quiz '{}' cloned as '{}' for user '{}'",
        id,
        cloned.id,
        user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(CloneResponse {
            success: true,
            new_quiz_id: cloned.id,
            message: "Quiz added to your collection and ready to start!".to_string(),
        }),
    ))
}
