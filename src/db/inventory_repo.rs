// src/db/inventory_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{InventoryItem, InventorySummary},
};

// Resumo do inventário consumido pelo gerador de insights como contexto.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn summary(&self) -> Result<InventorySummary, AppError>;
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self, limit: i64) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, spool_id, weight, is_in_use, custom_properties,
                   created_at, updated_at
            FROM inventory
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InventoryItem>, AppError> {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, spool_id, weight, is_in_use, custom_properties,
                   created_at, updated_at
            FROM inventory
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn create(
        &self,
        spool_id: Uuid,
        weight: f64,
        is_in_use: bool,
        custom_properties: Option<&str>,
    ) -> Result<InventoryItem, AppError> {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory (spool_id, weight, is_in_use, custom_properties)
            VALUES ($1, $2, $3, $4)
            RETURNING id, spool_id, weight, is_in_use, custom_properties,
                      created_at, updated_at
            "#,
        )
        .bind(spool_id)
        .bind(weight)
        .bind(is_in_use)
        .bind(custom_properties)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn update_weight(&self, id: Uuid, weight: f64) -> Result<InventoryItem, AppError> {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory
            SET weight = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, spool_id, weight, is_in_use, custom_properties,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(weight)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Item de inventário"))?;
        Ok(item)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item de inventário"));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn summary(&self) -> Result<InventorySummary, AppError> {
        let summary = sqlx::query_as::<_, InventorySummary>(
            r#"
            SELECT COUNT(*)                                   AS total_spools,
                   COALESCE(SUM(weight), 0.0)                 AS total_weight,
                   COUNT(*) FILTER (WHERE is_in_use)          AS spools_in_use
            FROM inventory
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}
