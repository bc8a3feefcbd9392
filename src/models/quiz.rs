// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{config::MAX_TITLE_LENGTH, models::question::Question};

/// A quiz document, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub question_count: u32,
    pub questions: Vec<Question>,

    /// Owner's user id (token subject).
    pub user_id: String,

    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_storage_url: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn default_public() -> bool {
    true
}

/// DTO for renaming a quiz.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameQuizRequest {
    #[validate(custom(function = validate_title))]
    pub title: String,
}

fn validate_title(title: &str) -> Result<(), validator::ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(validator::ValidationError::new("title_empty")
            .with_message("New title cannot be empty.".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(validator::ValidationError::new("title_too_long")
            .with_message(format!("New title is too long (max {} characters).", MAX_TITLE_LENGTH).into()));
    }
    Ok(())
}

/// DTO for pinning or unpinning a quiz.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePinRequest {
    pub is_pinned: bool,
}

/// Generic success body for mutation endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneResponse {
    pub success: bool,
    pub new_quiz_id: String,
    pub message: String,
}

/// Multipart form accepted by the create endpoint (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct CreateQuizForm {
    /// The PDF document.
    pub pdf_file: String,
    pub question_count: u32,
}

impl Quiz {
    pub fn pinned(&self) -> bool {
        self.is_pinned.unwrap_or(false)
    }

    /// Copy of this quiz owned by `new_owner`, with fresh quiz and question ids.
    pub fn clone_for_owner(&self, new_owner: &str) -> Quiz {
        let questions = self
            .questions
            .iter()
            .map(|q| Question {
                id: uuid::Uuid::new_v4().to_string(),
                ..q.clone()
            })
            .collect();

        Quiz {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title.clone(),
            description: Some(
                self.description
                    .clone()
                    .unwrap_or_else(|| format!("Cloned from \"{}\"", self.title)),
            ),
            question_count: self.question_count,
            questions,
            user_id: new_owner.to_string(),
            is_public: self.is_public,
            is_pinned: None,
            pdf_storage_url: self.pdf_storage_url.clone(),
            created_at: chrono::Utc::now(),
        }
    }
}
