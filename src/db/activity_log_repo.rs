// src/db/activity_log_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::activity_log::ActivityLog};

// Parâmetros de criação de um registro de atividade
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub extra_data: Option<String>,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
}

// Interface append-only do log de atividades. O núcleo só anexa e lê
// (janela limitada, mais recente primeiro) — nunca muta nem apaga.
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    async fn create(&self, entry: NewActivityLog) -> Result<ActivityLog, AppError>;

    async fn get_recent(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError>;
}

#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogStore for ActivityLogRepository {
    async fn create(&self, entry: NewActivityLog) -> Result<ActivityLog, AppError> {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs
                (action_type, entity_type, entity_id, description, extra_data,
                 user_id, user_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, action_type, entity_type, entity_id, description,
                      extra_data, user_id, user_email, created_at
            "#,
        )
        .bind(&entry.action_type)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.description)
        .bind(&entry.extra_data)
        .bind(entry.user_id)
        .bind(&entry.user_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    async fn get_recent(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, action_type, entity_type, entity_id, description,
                   extra_data, user_id, user_email, created_at
            FROM activity_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
