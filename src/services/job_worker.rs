// src/services/job_worker.rs
//
// Worker de jobs em background. Faz polling da fila, reivindica o job
// `ready` mais antigo e o executa pelo handler registrado para o tipo.
// Um job por ciclo: ciclos curtos mantêm o shutdown responsivo e evitam
// monopolizar a fila.
//
// Ciclo de vida de um job:
//   ready -> processing -> completed
//                       -> ready   (falha com retry_count < max_retries)
//                       -> failed  (tentativas esgotadas ou falha permanente)

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    common::error::AppError,
    db::JobStore,
    models::job::{Job, JobStatus, JobType},
};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const ERROR_BACKOFF: Duration = Duration::from_secs(10);

// Executor de um tipo de job. Retorna o resultado serializado (vai para
// `job.result`) ou erro, que conta como uma tentativa consumida.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> Result<Option<String>, AppError>;
}

// Desfecho interno de uma execução
enum JobFailure {
    // Não adianta tentar de novo (tipo desconhecido, sem handler)
    Permanent(String),
    // Erro transitório: consome uma tentativa
    Retryable(String),
}

pub struct JobWorker {
    store: Arc<dyn JobStore>,
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
    poll_interval: Duration,
    error_backoff: Duration,
}

// Worker em execução: dono da task e do canal de shutdown.
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    // Sinaliza o shutdown e espera o ciclo corrente terminar. O job em
    // andamento é concluído antes da task encerrar.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Task do worker terminou com erro: {e}");
        }
    }
}

impl JobWorker {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
            poll_interval: POLL_INTERVAL,
            error_backoff: ERROR_BACKOFF,
        }
    }

    pub fn register(mut self, job_type: JobType, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(job_type, handler);
        self
    }

    pub fn with_intervals(mut self, poll: Duration, backoff: Duration) -> Self {
        self.poll_interval = poll;
        self.error_backoff = backoff;
        self
    }

    // Inicia o loop de polling em uma task dedicada
    pub fn start(self) -> WorkerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!("Worker de jobs iniciado");
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }

                // Erro de ciclo (fila inacessível) => backoff maior; o
                // worker nunca morre por causa de um ciclo ruim.
                let sleep_for = match self.run_cycle().await {
                    Ok(_) => self.poll_interval,
                    Err(e) => {
                        tracing::error!("Ciclo do worker falhou: {e}");
                        self.error_backoff
                    }
                };

                tokio::select! {
                    _ = tokio::time::sleep(sleep_for) => {}
                    _ = shutdown_rx.changed() => {}
                }
            }
            tracing::info!("Worker de jobs encerrado");
        });

        WorkerHandle { shutdown, task }
    }

    // Um ciclo: reivindica no máximo um job (o `ready` mais antigo) e o
    // processa até o fim. Retorna se algum job foi processado.
    async fn run_cycle(&self) -> Result<bool, AppError> {
        let mut ready = self.store.get_ready(1).await?;
        let Some(job) = ready.pop() else {
            return Ok(false);
        };

        self.process_job(job).await?;
        Ok(true)
    }

    async fn process_job(&self, mut job: Job) -> Result<(), AppError> {
        tracing::info!(job_id = %job.id, job_type = %job.job_type, "Processando job");

        job.status = JobStatus::Processing.as_str().to_string();
        job.started_at = Some(Utc::now());
        self.store.update(&job).await?;

        let outcome = match job.parsed_type() {
            None => Err(JobFailure::Permanent(format!(
                "Tipo de job desconhecido: {}",
                job.job_type
            ))),
            Some(job_type) => match self.handlers.get(&job_type) {
                None => Err(JobFailure::Permanent(format!(
                    "Nenhum handler registrado para: {}",
                    job.job_type
                ))),
                Some(handler) => handler
                    .handle(&job)
                    .await
                    .map_err(|e| JobFailure::Retryable(e.to_string())),
            },
        };

        match outcome {
            Ok(result) => {
                job.status = JobStatus::Completed.as_str().to_string();
                job.result = result;
                job.error_message = None;
                job.completed_at = Some(Utc::now());
                tracing::info!(job_id = %job.id, "Job concluído");
            }
            Err(JobFailure::Permanent(message)) => {
                job.status = JobStatus::Failed.as_str().to_string();
                job.error_message = Some(message.clone());
                job.completed_at = Some(Utc::now());
                tracing::error!(job_id = %job.id, "Job falhou em definitivo: {message}");
            }
            Err(JobFailure::Retryable(message)) => {
                if job.can_retry() {
                    // Volta para a fila e consome uma tentativa
                    job.retry_count += 1;
                    job.status = JobStatus::Ready.as_str().to_string();
                    job.error_message = Some(message.clone());
                    tracing::warn!(
                        job_id = %job.id,
                        retry_count = job.retry_count,
                        max_retries = job.max_retries,
                        "Job falhou, reenfileirado: {message}"
                    );
                } else {
                    job.status = JobStatus::Failed.as_str().to_string();
                    job.error_message = Some(message.clone());
                    job.completed_at = Some(Utc::now());
                    tracing::error!(
                        job_id = %job.id,
                        "Job falhou após esgotar as tentativas: {message}"
                    );
                }
            }
        }

        self.store.update(&job).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::db::job_repo::testing::InMemoryJobStore;

    struct OkHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for OkHandler {
        async fn handle(&self, _job: &Job) -> Result<Option<String>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(r#"{"insights": 1}"#.to_string()))
        }
    }

    struct FailingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for FailingHandler {
        async fn handle(&self, _job: &Job) -> Result<Option<String>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::ExternalService("serviço fora do ar".into()))
        }
    }

    fn worker_with(
        store: Arc<InMemoryJobStore>,
        handler: Arc<dyn JobHandler>,
    ) -> JobWorker {
        JobWorker::new(store).register(JobType::GenerateInsights, handler)
    }

    #[tokio::test]
    async fn successful_job_ends_completed_with_result() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = Arc::new(OkHandler { calls: AtomicUsize::new(0) });
        let worker = worker_with(store.clone(), handler.clone());

        let job = store
            .create(JobType::GenerateInsights, None)
            .await
            .unwrap();

        assert!(worker.run_cycle().await.unwrap());

        let stored = store.find(job.id).unwrap();
        assert_eq!(stored.status, "completed");
        assert_eq!(stored.result.as_deref(), Some(r#"{"insights": 1}"#));
        assert!(stored.started_at.is_some());
        assert!(stored.completed_at.is_some());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_job_is_requeued_until_retries_run_out() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = Arc::new(FailingHandler { calls: AtomicUsize::new(0) });
        let worker = worker_with(store.clone(), handler.clone());

        // max_retries = 2 => três tentativas no total
        let job = store
            .create(JobType::GenerateInsights, None)
            .await
            .unwrap();
        assert_eq!(job.max_retries, 2);

        worker.run_cycle().await.unwrap();
        let after_first = store.find(job.id).unwrap();
        assert_eq!(after_first.status, "ready");
        assert_eq!(after_first.retry_count, 1);
        assert!(after_first.error_message.is_some());

        worker.run_cycle().await.unwrap();
        let after_second = store.find(job.id).unwrap();
        assert_eq!(after_second.status, "ready");
        assert_eq!(after_second.retry_count, 2);

        worker.run_cycle().await.unwrap();
        let after_third = store.find(job.id).unwrap();
        assert_eq!(after_third.status, "failed");
        assert_eq!(after_third.retry_count, 2);
        assert!(after_third.completed_at.is_some());
        assert_eq!(
            after_third.error_message.as_deref(),
            Some("Erro no serviço externo: serviço fora do ar")
        );

        // O job falhado sai da fila: o próximo ciclo não encontra nada
        assert!(!worker.run_cycle().await.unwrap());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn oldest_ready_job_is_claimed_first() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = Arc::new(OkHandler { calls: AtomicUsize::new(0) });
        let worker = worker_with(store.clone(), handler);

        let first = store
            .create(JobType::GenerateInsights, Some("1".into()))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let second = store
            .create(JobType::GenerateInsights, Some("2".into()))
            .await
            .unwrap();

        worker.run_cycle().await.unwrap();

        assert_eq!(store.find(first.id).unwrap().status, "completed");
        assert_eq!(store.find(second.id).unwrap().status, "ready");
    }

    #[tokio::test]
    async fn unknown_job_type_fails_permanently() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = Arc::new(OkHandler { calls: AtomicUsize::new(0) });
        let worker = worker_with(store.clone(), handler.clone());

        let bogus = Job {
            id: Uuid::new_v4(),
            job_type: "resize_images".to_string(),
            status: "ready".to_string(),
            payload: None,
            result: None,
            error_message: None,
            retry_count: 0,
            max_retries: 2,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };
        store.push(bogus.clone());

        worker.run_cycle().await.unwrap();

        // Falha imediata, sem nenhuma tentativa consumida em retries
        let stored = store.find(bogus.id).unwrap();
        assert_eq!(stored.status, "failed");
        assert_eq!(stored.retry_count, 0);
        assert_eq!(
            stored.error_message.as_deref(),
            Some("Tipo de job desconhecido: resize_images")
        );
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_a_cycle_error() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = Arc::new(OkHandler { calls: AtomicUsize::new(0) });
        let worker = worker_with(store.clone(), handler);

        *store.fail.lock().unwrap() = true;
        assert!(worker.run_cycle().await.is_err());

        // A fila volta e o worker retoma o processamento
        *store.fail.lock().unwrap() = false;
        assert!(!worker.run_cycle().await.unwrap());
    }

    #[tokio::test]
    async fn started_worker_processes_jobs_and_stops_on_command() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = Arc::new(OkHandler { calls: AtomicUsize::new(0) });
        let worker = worker_with(store.clone(), handler)
            .with_intervals(Duration::from_millis(5), Duration::from_millis(5));

        let job = store
            .create(JobType::GenerateInsights, None)
            .await
            .unwrap();

        let handle = worker.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop().await;

        assert_eq!(store.find(job.id).unwrap().status, "completed");
    }
}
