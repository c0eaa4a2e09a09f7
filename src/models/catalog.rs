// src/models/catalog.rs
//
// Tabelas de consulta do catálogo (cores, marcas, materiais).
// CRUD simples com semântica de "buscar ou criar pelo nome".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id: Uuid,
    #[schema(example = "Azul Galáxia")]
    pub name: String,
    #[schema(example = "#1A2B3C")]
    pub hex_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    #[schema(example = "PLA")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateColorPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 4, max = 7, message = "Código hexadecimal inválido."))]
    pub hex_code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNamedPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
}
