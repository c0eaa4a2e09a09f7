// src/services/inventory.rs
//
// CRUD do estoque de carretéis. Toda mutação gera um registro no log de
// atividades, que por sua vez alimenta a geração de insights.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::{
        activity_log::{action_type, entity_type},
        auth::User,
        inventory::{CreateInventoryItemPayload, InventoryItem, InventorySummary},
    },
    services::activity_log::ActivityLogService,
};

use crate::db::InventoryStore;

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
    activity_logs: ActivityLogService,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository, activity_logs: ActivityLogService) -> Self {
        Self { repo, activity_logs }
    }

    async fn log_activity(
        &self,
        action: &str,
        description: String,
        entity_id: Uuid,
        metadata: Option<serde_json::Value>,
        user: &User,
    ) {
        // Falha no log não derruba a mutação já persistida
        if let Err(e) = self
            .activity_logs
            .log(
                action,
                entity_type::INVENTORY,
                description,
                Some(entity_id),
                metadata,
                Some(user),
            )
            .await
        {
            tracing::warn!("Falha ao registrar atividade do inventário: {e}");
        }
    }

    pub async fn get_all(&self, limit: i64) -> Result<Vec<InventoryItem>, AppError> {
        self.repo.get_all(limit).await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<InventoryItem, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Item de inventário"))
    }

    pub async fn add_item(
        &self,
        payload: CreateInventoryItemPayload,
        user: &User,
    ) -> Result<InventoryItem, AppError> {
        let item = self
            .repo
            .create(
                payload.spool_id,
                payload.weight,
                payload.is_in_use,
                payload.custom_properties.as_deref(),
            )
            .await?;

        self.log_activity(
            action_type::INVENTORY_ADDED,
            format!("Carretel de {:.0}g adicionado ao estoque", item.weight),
            item.id,
            Some(serde_json::json!({
                "spool_id": item.spool_id,
                "weight": item.weight,
            })),
            user,
        )
        .await;

        Ok(item)
    }

    pub async fn update_weight(
        &self,
        id: Uuid,
        weight: f64,
        user: &User,
    ) -> Result<InventoryItem, AppError> {
        let before = self.get_item(id).await?;
        let item = self.repo.update_weight(id, weight).await?;

        self.log_activity(
            action_type::WEIGHT_UPDATED,
            format!(
                "Peso do carretel atualizado de {:.0}g para {:.0}g",
                before.weight, item.weight
            ),
            item.id,
            Some(serde_json::json!({
                "old_weight": before.weight,
                "new_weight": item.weight,
            })),
            user,
        )
        .await;

        Ok(item)
    }

    pub async fn delete_item(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        let item = self.get_item(id).await?;
        self.repo.delete(id).await?;

        self.log_activity(
            action_type::INVENTORY_DELETED,
            format!("Carretel de {:.0}g removido do estoque", item.weight),
            item.id,
            Some(serde_json::json!({ "spool_id": item.spool_id })),
            user,
        )
        .await;

        Ok(())
    }

    pub async fn summary(&self) -> Result<InventorySummary, AppError> {
        self.repo.summary().await
    }
}
