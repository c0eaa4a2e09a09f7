// src/models/insight.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// Como o insight foi disparado (conjunto fechado)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedBy {
    // Disparado por um usuário via endpoint de geração
    Manual,
    // Criado pelo job diário do scheduler
    Scheduled,
    // Chamada direta (modo streaming do dashboard)
    Direct,
}

impl GeneratedBy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GeneratedBy::Manual => "manual",
            GeneratedBy::Scheduled => "scheduled",
            GeneratedBy::Direct => "direct",
        }
    }

    pub fn parse(value: &str) -> Option<GeneratedBy> {
        match value {
            "manual" => Some(GeneratedBy::Manual),
            "scheduled" => Some(GeneratedBy::Scheduled),
            "direct" => Some(GeneratedBy::Direct),
            _ => None,
        }
    }
}

impl fmt::Display for GeneratedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Artefato gerado pela IA, imutável depois de criado.
// Só é apagado por ação administrativa explícita, nunca atualizado.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: Uuid,

    pub content: String,

    // Job de origem, para rastreabilidade
    pub job_id: Option<Uuid>,

    #[schema(example = "scheduled")]
    pub generated_by: String,

    pub created_at: DateTime<Utc>,
}
