// src/db/insight_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::insight::{GeneratedBy, Insight},
};

// Interface de persistência de insights consumida pelo gerador.
// Insights são imutáveis: só existe criação, leitura e remoção
// administrativa.
#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn create(
        &self,
        content: &str,
        job_id: Option<Uuid>,
        generated_by: GeneratedBy,
    ) -> Result<Insight, AppError>;

    async fn get_latest(&self) -> Result<Option<Insight>, AppError>;

    async fn get_recent(&self, limit: i64) -> Result<Vec<Insight>, AppError>;
}

#[derive(Clone)]
pub struct InsightRepository {
    pool: PgPool,
}

impl InsightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Remoção explícita via ação administrativa (fora do trait: o gerador
    // nunca apaga insights).
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM insights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Insight"));
        }
        Ok(())
    }
}

#[async_trait]
impl InsightStore for InsightRepository {
    async fn create(
        &self,
        content: &str,
        job_id: Option<Uuid>,
        generated_by: GeneratedBy,
    ) -> Result<Insight, AppError> {
        let insight = sqlx::query_as::<_, Insight>(
            r#"
            INSERT INTO insights (content, job_id, generated_by)
            VALUES ($1, $2, $3)
            RETURNING id, content, job_id, generated_by, created_at
            "#,
        )
        .bind(content)
        .bind(job_id)
        .bind(generated_by.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(insight)
    }

    async fn get_latest(&self) -> Result<Option<Insight>, AppError> {
        let insight = sqlx::query_as::<_, Insight>(
            r#"
            SELECT id, content, job_id, generated_by, created_at
            FROM insights
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(insight)
    }

    async fn get_recent(&self, limit: i64) -> Result<Vec<Insight>, AppError> {
        let insights = sqlx::query_as::<_, Insight>(
            r#"
            SELECT id, content, job_id, generated_by, created_at
            FROM insights
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(insights)
    }
}
