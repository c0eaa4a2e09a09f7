// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Um carretel físico no estoque (instância de um item do catálogo).
// O peso diminui conforme o filamento é usado.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,

    // Referência ao catálogo de carretéis
    pub spool_id: Uuid,

    // Peso atual em gramas
    #[schema(example = 750.0)]
    pub weight: f64,

    // Está carregado em uma impressora?
    pub is_in_use: bool,

    // Anotações livres por item
    pub custom_properties: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resumo agregado usado pelo dashboard e como contexto dos insights
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_spools: i64,
    pub total_weight: f64,
    pub spools_in_use: i64,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItemPayload {
    pub spool_id: Uuid,

    #[validate(range(min = 0.0, message = "O peso não pode ser negativo."))]
    pub weight: f64,

    #[serde(default)]
    pub is_in_use: bool,

    pub custom_properties: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWeightPayload {
    #[validate(range(min = 0.0, message = "O peso não pode ser negativo."))]
    pub weight: f64,
}
