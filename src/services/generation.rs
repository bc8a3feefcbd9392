// src/services/generation.rs

use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use serde::Serialize;
use validator::Validate;

use crate::{
    clients::ai::AiError,
    config::{GENERATION_QUESTION_BOUNDS, UploadLimits},
    error::AppError,
    models::{
        question::{GeneratedQuiz, Question},
        quiz::Quiz,
    },
    services::upload::{PDF_MIME, ValidatedPdf},
};

/// Input bytes per base64 chunk. A multiple of 3, so the encoded
/// chunks concatenate without padding in between.
const ENCODE_CHUNK: usize = 3 * 256 * 1024;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:json|JSON)?\s*(.*?)\s*```$").expect("valid regex")
});

/// Self-contained payload for the generation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// `data:application/pdf;base64,<...>`
    pub pdf_data_uri: String,
    pub question_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl GenerationRequest {
    /// Splits the data URI into its mime type and base64 payload.
    pub fn inline_data(&self) -> Option<(&str, &str)> {
        self.pdf_data_uri
            .strip_prefix("data:")?
            .split_once(";base64,")
    }
}

/// Encodes the file as a base64 `data:` URI, one fixed-size chunk at a time.
pub fn encode_data_uri(bytes: &[u8]) -> String {
    let prefix = format!("data:{};base64,", PDF_MIME);
    let mut uri = String::with_capacity(prefix.len() + bytes.len().div_ceil(3) * 4);
    uri.push_str(&prefix);
    for chunk in bytes.chunks(ENCODE_CHUNK) {
        STANDARD.encode_string(chunk, &mut uri);
    }
    uri
}

/// Checks the requested count against the configured range.
pub fn check_question_count(count: u32, limits: &UploadLimits) -> Result<(), AppError> {
    let (lo, hi) = GENERATION_QUESTION_BOUNDS;
    let min = limits.min_questions.max(lo);
    let max = limits.max_questions.min(hi);
    if count < min || count > max {
        return Err(AppError::BadRequest(format!(
            "Invalid number of questions. Must be between {} and {}.",
            min, max
        )));
    }
    Ok(())
}

/// Builds the generation request for a validated upload.
pub fn build_request(
    pdf: &ValidatedPdf,
    question_count: u32,
    limits: &UploadLimits,
) -> Result<GenerationRequest, AppError> {
    check_question_count(question_count, limits)?;

    let pdf_data_uri = encode_data_uri(&pdf.bytes);
    tracing::debug!(
        question_count,
        data_uri_len = pdf_data_uri.len(),
        "Built generation request"
    );

    Ok(GenerationRequest {
        pdf_data_uri,
        question_count,
        file_name: pdf.file_name.clone(),
    })
}

/// The instruction sent alongside the document.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let file_hint = match &request.file_name {
        Some(name) => format!(
            "The file name is \"{}\"; use it as a hint but prefer a title based on the content.",
            name
        ),
        None => "Derive the title from the content.".to_string(),
    };

    format!(
        r#"You are an expert quiz creator. Create a multiple-choice quiz based SOLELY on the content of the attached PDF document.

1. Content focus: cover the main themes, key events and important concepts. Skip trivial details such as publication dates or minor characters unless they are central. For long documents, spread the questions across different sections.
2. Document adherence: every question must come directly from the document. Do NOT introduce outside knowledge.
3. Language: write the title, every question and every option in the primary language of the document.
4. Count: generate exactly {count} questions. If the document is too short for that many good questions, generate as many as quality allows.
5. Options: give 4 distinct, plausible options per question with exactly one correct according to the document.
6. Title: a concise title reflecting the main theme. {file_hint}
7. Output: return STRICTLY a JSON object with this structure and nothing else. Do not include "id" fields, explanations or any text outside the JSON.

{{
  "title": "Quiz title",
  "questions": [
    {{
      "questionText": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswerIndex": 0
    }}
  ]
}}"#,
        count = request.question_count,
        file_hint = file_hint,
    )
}

/// Validates the model's raw text against the expected quiz shape.
///
/// * Text that is not JSON is an AI service failure.
/// * JSON of the wrong shape is `GenerationInvalid`; nothing is salvaged.
/// * More questions than requested are truncated.
pub fn parse_generated(raw: &str, requested: u32) -> Result<GeneratedQuiz, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AiError::EmptyResponse.into());
    }

    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| AiError::MalformedJson(e.to_string()))?;

    let mut quiz: GeneratedQuiz = serde_json::from_value(value).map_err(|e| {
        tracing::error!(error = %e, "AI output does not match the quiz schema");
        AppError::GenerationInvalid(e.to_string())
    })?;

    quiz.validate().map_err(|e| {
        tracing::error!(error = %e, "AI output failed validation");
        AppError::GenerationInvalid(e.to_string())
    })?;

    if quiz.questions.is_empty() && requested > 0 {
        tracing::warn!(title = %quiz.title, requested, "AI returned 0 questions");
    }

    if quiz.questions.len() > requested as usize {
        tracing::warn!(
            returned = quiz.questions.len(),
            requested,
            "AI returned more questions than requested, truncating"
        );
        quiz.questions.truncate(requested as usize);
    }

    Ok(quiz)
}

/// Attaches ids, owner and timestamps to a validated generation result.
pub fn assemble_quiz(generated: GeneratedQuiz, owner_id: &str, file_name: Option<&str>) -> Quiz {
    let questions: Vec<Question> = generated
        .questions
        .into_iter()
        .map(|q| Question {
            id: uuid::Uuid::new_v4().to_string(),
            question_text: q.question_text,
            options: q.options,
            // validated to 0..=3 above
            correct_answer_index: q.correct_answer_index as u8,
        })
        .collect();

    let count = questions.len();
    Quiz {
        id: uuid::Uuid::new_v4().to_string(),
        title: generated.title,
        description: Some(format!(
            "Quiz generated from {} using AI. Contains {} questions.",
            file_name.unwrap_or("uploaded PDF"),
            count
        )),
        question_count: count as u32,
        questions,
        user_id: owner_id.to_string(),
        is_public: true,
        is_pinned: Some(false),
        pdf_storage_url: None,
        created_at: chrono::Utc::now(),
    }
}
