// src/services/activity_log.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::activity_log_repo::{ActivityLogStore, NewActivityLog},
    models::{activity_log::ActivityLog, auth::User},
};

// Serviço append-only do log de atividades. Os serviços de domínio
// registram eventos aqui; o gerador de insights consome a janela recente.
#[derive(Clone)]
pub struct ActivityLogService {
    store: Arc<dyn ActivityLogStore>,
}

impl ActivityLogService {
    pub fn new(store: Arc<dyn ActivityLogStore>) -> Self {
        Self { store }
    }

    pub async fn log(
        &self,
        action_type: &str,
        entity_type: &str,
        description: String,
        entity_id: Option<uuid::Uuid>,
        metadata: Option<serde_json::Value>,
        user: Option<&User>,
    ) -> Result<ActivityLog, AppError> {
        self.store
            .create(NewActivityLog {
                action_type: action_type.to_string(),
                entity_type: entity_type.to_string(),
                entity_id,
                description,
                extra_data: metadata.map(|m| m.to_string()),
                user_id: user.map(|u| u.id),
                user_email: user.map(|u| u.email.clone()),
            })
            .await
    }

    pub async fn get_recent(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        self.store.get_recent(limit).await
    }

    // Formata a janela recente em um bloco JSON legível para o prompt da IA.
    pub fn format_logs_for_ai(&self, logs: &[ActivityLog]) -> String {
        let entries: Vec<serde_json::Value> = logs
            .iter()
            .map(|log| {
                let mut entry = serde_json::json!({
                    "timestamp": log.created_at.to_rfc3339(),
                    "action": log.action_type,
                    "entity": log.entity_type,
                    "description": log.description,
                });
                if let Some(extra) = &log.extra_data {
                    // Metadados podem não ser JSON válido; nesse caso vão como texto.
                    entry["details"] = serde_json::from_str(extra)
                        .unwrap_or_else(|_| serde_json::Value::String(extra.clone()));
                }
                entry
            })
            .collect();

        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }
}
