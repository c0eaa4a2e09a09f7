// src/models/activity_log.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// Registro append-only de um evento de domínio. Serve de trilha de
// auditoria e de insumo para a geração de insights — nunca é mutado
// nem apagado pelo núcleo.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,

    #[schema(example = "inventory_added")]
    pub action_type: String,

    #[schema(example = "inventory")]
    pub entity_type: String,

    pub entity_id: Option<Uuid>,

    // Descrição legível, ex: "admin adicionou carretel PLA Azul de 1000g"
    pub description: String,

    // Contexto extra como JSON serializado (valores antigos/novos, etc.)
    pub extra_data: Option<String>,

    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Constantes para os tipos de ação registrados pelos serviços de domínio
pub mod action_type {
    pub const INVENTORY_ADDED: &str = "inventory_added";
    pub const INVENTORY_DELETED: &str = "inventory_deleted";
    pub const WEIGHT_UPDATED: &str = "weight_updated";

    pub const COLOR_CREATED: &str = "color_created";
    pub const BRAND_CREATED: &str = "brand_created";
    pub const MATERIAL_CREATED: &str = "material_created";
}

// Constantes para os tipos de entidade
pub mod entity_type {
    pub const INVENTORY: &str = "inventory";
    pub const COLOR: &str = "color";
    pub const BRAND: &str = "brand";
    pub const MATERIAL: &str = "material";
}
