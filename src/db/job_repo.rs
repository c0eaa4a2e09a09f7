// src/db/job_repo.rs
//
// A fila de jobs persistida. O núcleo (worker + scheduler) só conhece o
// trait `JobStore`; o Postgres é um detalhe de implementação, e os testes
// do worker usam uma versão em memória.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::job::{Job, JobStatus, JobType},
};

// Interface da fila consumida pelo worker e pelo scheduler.
#[async_trait]
pub trait JobStore: Send + Sync {
    // Cria um job novo em estado `ready`.
    async fn create(&self, job_type: JobType, payload: Option<String>) -> Result<Job, AppError>;

    // Jobs prontos para processar, do mais antigo para o mais novo
    // (justiça FIFO — o worker reivindica o mais antigo primeiro).
    async fn get_ready(&self, limit: i64) -> Result<Vec<Job>, AppError>;

    // Persiste status/retry/resultados de um job já existente.
    async fn update(&self, job: &Job) -> Result<(), AppError>;

    // Jobs mais recentes independente de status (visão administrativa).
    async fn get_recent(&self, limit: i64) -> Result<Vec<Job>, AppError>;
}

#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn create(&self, job_type: JobType, payload: Option<String>) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (job_type, status, payload)
            VALUES ($1, $2, $3)
            RETURNING id, job_type, status, payload, result, error_message,
                      retry_count, max_retries, created_at, started_at, completed_at
            "#,
        )
        .bind(job_type.as_str())
        .bind(JobStatus::Ready.as_str())
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn get_ready(&self, limit: i64) -> Result<Vec<Job>, AppError> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, job_type, status, payload, result, error_message,
                   retry_count, max_retries, created_at, started_at, completed_at
            FROM jobs
            WHERE status = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(JobStatus::Ready.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn update(&self, job: &Job) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2, result = $3, error_message = $4,
                retry_count = $5, started_at = $6, completed_at = $7
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.status)
        .bind(&job.result)
        .bind(&job.error_message)
        .bind(job.retry_count)
        .bind(job.started_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_recent(&self, limit: i64) -> Result<Vec<Job>, AppError> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, job_type, status, payload, result, error_message,
                   retry_count, max_retries, created_at, started_at, completed_at
            FROM jobs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }
}

// ---
// Implementação em memória usada nos testes do worker e do scheduler
// ---

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    // Fila em memória com a mesma semântica de ordenação do Postgres.
    #[derive(Default)]
    pub(crate) struct InMemoryJobStore {
        jobs: Mutex<Vec<Job>>,
        // Quando true, toda operação falha (simula banco indisponível).
        pub(crate) fail: Mutex<bool>,
    }

    impl InMemoryJobStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn all(&self) -> Vec<Job> {
            self.jobs.lock().unwrap().clone()
        }

        // Insere um job arbitrário, inclusive de tipo desconhecido
        pub(crate) fn push(&self, job: Job) {
            self.jobs.lock().unwrap().push(job);
        }

        pub(crate) fn find(&self, id: Uuid) -> Option<Job> {
            self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned()
        }

        fn check_fail(&self) -> Result<(), AppError> {
            if *self.fail.lock().unwrap() {
                return Err(AppError::ExternalService("store indisponível".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn create(
            &self,
            job_type: JobType,
            payload: Option<String>,
        ) -> Result<Job, AppError> {
            self.check_fail()?;
            let job = Job {
                id: Uuid::new_v4(),
                job_type: job_type.as_str().to_string(),
                status: JobStatus::Ready.as_str().to_string(),
                payload,
                result: None,
                error_message: None,
                retry_count: 0,
                max_retries: 2,
                created_at: Utc::now(),
                started_at: None,
                completed_at: None,
            };
            self.jobs.lock().unwrap().push(job.clone());
            Ok(job)
        }

        async fn get_ready(&self, limit: i64) -> Result<Vec<Job>, AppError> {
            self.check_fail()?;
            let mut ready: Vec<Job> = self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.status == JobStatus::Ready.as_str())
                .cloned()
                .collect();
            ready.sort_by_key(|j| j.created_at);
            ready.truncate(limit as usize);
            Ok(ready)
        }

        async fn update(&self, job: &Job) -> Result<(), AppError> {
            self.check_fail()?;
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(existing) = jobs.iter_mut().find(|j| j.id == job.id) {
                *existing = job.clone();
            }
            Ok(())
        }

        async fn get_recent(&self, limit: i64) -> Result<Vec<Job>, AppError> {
            self.check_fail()?;
            let mut jobs = self.jobs.lock().unwrap().clone();
            jobs.sort_by_key(|j| std::cmp::Reverse(j.created_at));
            jobs.truncate(limit as usize);
            Ok(jobs)
        }
    }
}
