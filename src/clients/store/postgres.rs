// src/clients/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    clients::store::{QuizStore, StoreError},
    models::{quiz::Quiz, result::QuizResult},
};

/// Postgres-backed document store.
///
/// Each quiz and result is one `JSONB` document; the key columns next to it
/// exist only for lookups and ordering.
#[derive(Debug, Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, user_id, created_at, doc)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&quiz.id)
        .bind(&quiz.user_id)
        .bind(quiz.created_at)
        .bind(Json(quiz))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert quiz: {:?}", e);
            StoreError::from(e)
        })?;

        Ok(())
    }

    async fn get_quiz(&self, id: &str) -> Result<Option<Quiz>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Quiz>>("SELECT doc FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(doc.map(|Json(quiz)| quiz))
    }

    async fn list_quizzes_by_owner(&self, user_id: &str) -> Result<Vec<Quiz>, StoreError> {
        let docs = sqlx::query_scalar::<_, Json<Quiz>>(
            r#"
            SELECT doc
            FROM quizzes
            WHERE user_id = $1
            ORDER BY COALESCE((doc->>'isPinned')::BOOLEAN, FALSE) DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs.into_iter().map(|Json(quiz)| quiz).collect())
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE quizzes SET doc = jsonb_set(doc, '{title}', to_jsonb($2::TEXT)) WHERE id = $1")
            .bind(id)
            .bind(title)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_pin(&self, id: &str, pinned: bool) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE quizzes SET doc = jsonb_set(doc, '{isPinned}', to_jsonb($2::BOOLEAN)) WHERE id = $1",
        )
        .bind(id)
        .bind(pinned)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_quiz_cascade(&self, quiz_id: &str, user_id: &str) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM quiz_results WHERE quiz_id = $1 AND user_id = $2")
            .bind(quiz_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        // Dropping `tx` on any error above rolls the whole batch back.
        tx.commit().await?;

        Ok(removed as usize)
    }

    async fn insert_result(&self, result: &QuizResult) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO quiz_results (id, quiz_id, user_id, submitted_at, doc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&result.id)
        .bind(&result.quiz_id)
        .bind(&result.user_id)
        .bind(result.submitted_at)
        .bind(Json(result))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert quiz result: {:?}", e);
            StoreError::from(e)
        })?;

        Ok(())
    }

    async fn get_result(&self, id: &str) -> Result<Option<QuizResult>, StoreError> {
        let doc =
            sqlx::query_scalar::<_, Json<QuizResult>>("SELECT doc FROM quiz_results WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(doc.map(|Json(result)| result))
    }

    async fn list_results_by_owner(&self, user_id: &str) -> Result<Vec<QuizResult>, StoreError> {
        let docs = sqlx::query_scalar::<_, Json<QuizResult>>(
            r#"
            SELECT doc
            FROM quiz_results
            WHERE user_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs.into_iter().map(|Json(result)| result).collect())
    }
}
