// src/models/result.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::question::Question;

/// One attempt at a quiz. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,

    /// Question id -> selected option index.
    pub answers: HashMap<String, i32>,

    pub score: u32,
    pub correct: u32,
    pub total: u32,

    /// Questions as they were at submission time.
    pub questions_snapshot: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_title: Option<String>,

    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitResultRequest {
    /// Unanswered questions are simply absent.
    #[serde(default)]
    pub answers: HashMap<String, i32>,
}

/// Aggregates shown on the history page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_quizzes_taken: u32,
    pub average_score: u32,
    pub total_questions_answered: u32,
    pub total_correct_answers: u32,
    pub overall_accuracy: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub results: Vec<QuizResult>,
    pub stats: HistoryStats,
}
