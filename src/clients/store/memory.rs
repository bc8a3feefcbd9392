// src/clients/store/memory.rs

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::{
    clients::store::{QuizStore, StoreError},
    models::{quiz::Quiz, result::QuizResult},
};

#[derive(Debug, Default, Clone)]
struct Documents {
    quizzes: HashMap<String, Quiz>,
    results: HashMap<String, QuizResult>,
}

/// In-process document store.
///
/// Batches are applied to a staged copy and swapped in only when every
/// step succeeded. `fail_batch_after` makes the next cascade delete fail
/// after the given number of deletes, for exercising atomicity.
#[derive(Debug, Default)]
pub struct MemoryQuizStore {
    docs: RwLock<Documents>,
    fail_after: Mutex<Option<usize>>,
    writes: AtomicUsize,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes (inserts, updates, committed batches).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn fail_batch_after(&self, deletes: usize) {
        *self.fail_after.lock().await = Some(deletes);
    }

    pub async fn quiz_count(&self) -> usize {
        self.docs.read().await.quizzes.len()
    }

    pub async fn result_count(&self) -> usize {
        self.docs.read().await.results.len()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), StoreError> {
        self.docs
            .write()
            .await
            .quizzes
            .insert(quiz.id.clone(), quiz.clone());
        self.record_write();
        Ok(())
    }

    async fn get_quiz(&self, id: &str) -> Result<Option<Quiz>, StoreError> {
        Ok(self.docs.read().await.quizzes.get(id).cloned())
    }

    async fn list_quizzes_by_owner(&self, user_id: &str) -> Result<Vec<Quiz>, StoreError> {
        let mut quizzes: Vec<Quiz> = self
            .docs
            .read()
            .await
            .quizzes
            .values()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| {
            b.pinned()
                .cmp(&a.pinned())
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(quizzes)
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if let Some(quiz) = docs.quizzes.get_mut(id) {
            quiz.title = title.to_string();
            self.record_write();
        }
        Ok(())
    }

    async fn update_pin(&self, id: &str, pinned: bool) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if let Some(quiz) = docs.quizzes.get_mut(id) {
            quiz.is_pinned = Some(pinned);
            self.record_write();
        }
        Ok(())
    }

    async fn delete_quiz_cascade(&self, quiz_id: &str, user_id: &str) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().await;
        let fail_after = self.fail_after.lock().await.take();

        let mut staged = docs.clone();
        let mut applied = 0usize;
        let check = |applied: usize| -> Result<(), StoreError> {
            match fail_after {
                Some(limit) if applied >= limit => Err(StoreError::Unavailable(format!(
                    "batch aborted after {} deletes",
                    applied
                ))),
                _ => Ok(()),
            }
        };

        check(applied)?;
        staged.quizzes.remove(quiz_id);
        applied += 1;

        let result_ids: Vec<String> = staged
            .results
            .values()
            .filter(|r| r.quiz_id == quiz_id && r.user_id == user_id)
            .map(|r| r.id.clone())
            .collect();

        for id in &result_ids {
            check(applied)?;
            staged.results.remove(id);
            applied += 1;
        }

        *docs = staged;
        self.record_write();
        Ok(result_ids.len())
    }

    async fn insert_result(&self, result: &QuizResult) -> Result<(), StoreError> {
        self.docs
            .write()
            .await
            .results
            .insert(result.id.clone(), result.clone());
        self.record_write();
        Ok(())
    }

    async fn get_result(&self, id: &str) -> Result<Option<QuizResult>, StoreError> {
        Ok(self.docs.read().await.results.get(id).cloned())
    }

    async fn list_results_by_owner(&self, user_id: &str) -> Result<Vec<QuizResult>, StoreError> {
        let mut results: Vec<QuizResult> = self
            .docs
            .read()
            .await
            .results
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }
}
