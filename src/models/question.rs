// src/models/question.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A stored quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    /// The text of the question.
    pub question_text: String,

    /// Exactly four options; position is meaningful.
    pub options: Vec<String>,

    /// 0-based index into `options`.
    pub correct_answer_index: u8,
}

/// A question as the model returns it (no id yet).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question_text: String,
    #[validate(length(
        equal = 4,
        message = "each question must have exactly 4 options"
    ))]
    pub options: Vec<String>,
    #[validate(range(
        min = 0,
        max = 3,
        message = "correctAnswerIndex must be between 0 and 3"
    ))]
    pub correct_answer_index: i64,
}

/// Top-level object the model is instructed to return.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GeneratedQuiz {
    pub title: String,
    #[validate(nested)]
    pub questions: Vec<GeneratedQuestion>,
}
