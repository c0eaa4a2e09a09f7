// src/models/job.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Status do job (conjunto fechado)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Ready => "ready",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// Tipo do job (hoje só um membro; o dispatch do worker é por tipo)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    GenerateInsights,
}

impl JobType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobType::GenerateInsights => "generate_insights",
        }
    }

    // Tipo desconhecido => None; o worker trata como falha permanente
    // (não adianta reprocessar um tipo que ninguém sabe executar).
    pub fn parse(value: &str) -> Option<JobType> {
        match value {
            "generate_insights" => Some(JobType::GenerateInsights),
            _ => None,
        }
    }
}

// ---
// O job em si (fila persistida)
// ---

// Entrada da fila de trabalho assíncrono, processada pelo JobWorker.
// Ciclo de vida: ready -> processing -> {completed | ready(retry) | failed}.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,

    #[schema(example = "generate_insights")]
    pub job_type: String,

    #[schema(example = "ready")]
    pub status: String,

    // Payload/resultado/erro são texto livre (JSON serializado);
    // o tipo do job determina como interpretá-los.
    pub payload: Option<String>,
    pub result: Option<String>,
    pub error_message: Option<String>,

    pub retry_count: i32,
    pub max_retries: i32,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn parsed_type(&self) -> Option<JobType> {
        JobType::parse(&self.job_type)
    }

    // Invariante: retry_count <= max_retries enquanto o job não for `failed`.
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}
