// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{quiz, result},
    models::{
        question::Question,
        quiz::{ActionResponse, CloneResponse, CreateQuizForm, Quiz, RenameQuizRequest, TogglePinRequest},
        result::{HistoryResponse, HistoryStats, QuizResult, SubmitResultRequest},
    },
};

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        quiz::create_quiz,
        quiz::list_quizzes,
        quiz::get_quiz,
        quiz::delete_quiz,
        quiz::rename_quiz,
        quiz::toggle_pin,
        quiz::clone_quiz,
        result::submit_result,
        result::list_history,
        result::get_result,
    ),
    components(schemas(
        Question,
        Quiz,
        CreateQuizForm,
        RenameQuizRequest,
        TogglePinRequest,
        ActionResponse,
        CloneResponse,
        QuizResult,
        SubmitResultRequest,
        HistoryStats,
        HistoryResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "quizzes", description = "Quiz generation and management"),
        (name = "results", description = "Quiz attempts and history"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
