// src/services/scoring.rs

use std::collections::HashMap;

use crate::models::{question::Question, result::HistoryStats, result::QuizResult};

/// Outcome of scoring one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    /// 0..=100
    pub score: u32,
}

/// `round(100 * numerator / denominator)` with halves rounded up, in integers.
/// Returns 0 when the denominator is 0.
pub fn percentage(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((200 * numerator + denominator) / (2 * denominator)) as u32
}

/// Compares submitted answers to the correct indices.
/// Questions absent from `answers` never count as correct.
pub fn score_attempt(questions: &[Question], answers: &HashMap<String, i32>) -> Score {
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&(q.correct_answer_index as i32)))
        .count() as u32;
    let total = questions.len() as u32;

    Score {
        correct,
        total,
        score: percentage(correct as u64, total as u64),
    }
}

/// Aggregates a user's result history.
pub fn history_stats(results: &[QuizResult]) -> HistoryStats {
    if results.is_empty() {
        return HistoryStats::default();
    }

    let taken = results.len() as u64;
    let score_sum: u64 = results.iter().map(|r| r.score as u64).sum();
    let total: u64 = results.iter().map(|r| r.total as u64).sum();
    let correct: u64 = results.iter().map(|r| r.correct as u64).sum();

    HistoryStats {
        total_quizzes_taken: taken as u32,
        // mean of percentages, rounded the same way
        average_score: percentage(score_sum, taken * 100),
        total_questions_answered: total as u32,
        total_correct_answers: correct as u32,
        overall_accuracy: percentage(correct, total),
    }
}
