// src/clients/store/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{quiz::Quiz, result::QuizResult};

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document store holding quizzes and quiz results.
///
/// Field updates are last-write-wins; the cascade delete is the only
/// multi-document operation and must be atomic.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), StoreError>;

    async fn get_quiz(&self, id: &str) -> Result<Option<Quiz>, StoreError>;

    /// Quizzes owned by `user_id`, pinned first, newest first.
    async fn list_quizzes_by_owner(&self, user_id: &str) -> Result<Vec<Quiz>, StoreError>;

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError>;

    async fn update_pin(&self, id: &str, pinned: bool) -> Result<(), StoreError>;

    /// Deletes the quiz and every result of `user_id` for it, all or nothing.
    /// Returns how many results were removed.
    async fn delete_quiz_cascade(&self, quiz_id: &str, user_id: &str) -> Result<usize, StoreError>;

    async fn insert_result(&self, result: &QuizResult) -> Result<(), StoreError>;

    async fn get_result(&self, id: &str) -> Result<Option<QuizResult>, StoreError>;

    /// Results of `user_id`, newest first.
    async fn list_results_by_owner(&self, user_id: &str) -> Result<Vec<QuizResult>, StoreError>;
}
