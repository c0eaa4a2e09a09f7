// src/services/scheduler.rs
//
// Agendador diário: no horário configurado (UTC), enfileira um job de
// geração de insights e volta a dormir até o dia seguinte. Ele NUNCA
// executa trabalho pesado — só enfileira; quem processa é o worker.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use tokio::{sync::watch, task::JoinHandle};

use crate::{db::JobStore, models::job::JobType};

pub const DEFAULT_HOUR: u32 = 6;
pub const DEFAULT_MINUTE: u32 = 0;

// Tempo até a próxima ocorrência de `hour:minute` em UTC. Se o horário
// de hoje já passou (ou é exatamente agora), agenda para amanhã.
fn duration_until_next(now: DateTime<Utc>, hour: u32, minute: u32) -> Duration {
    let Some(at) = now.date_naive().and_hms_opt(hour.min(23), minute.min(59), 0) else {
        return Duration::from_secs(24 * 60 * 60);
    };

    let mut next = Utc.from_utc_datetime(&at);
    if next <= now {
        next += chrono::Duration::days(1);
    }

    (next - now).to_std().unwrap_or_default()
}

pub struct InsightScheduler {
    store: Arc<dyn JobStore>,
    hour: u32,
    minute: u32,
}

// Scheduler em execução: dono da task e do canal de shutdown.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    // Encerra imediatamente, mesmo no meio da espera até o próximo disparo.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Task do scheduler terminou com erro: {e}");
        }
    }
}

impl InsightScheduler {
    pub fn new(store: Arc<dyn JobStore>, hour: u32, minute: u32) -> Self {
        Self { store, hour, minute }
    }

    // Enfileira o job diário. Falha é logada e engolida: o scheduler
    // continua vivo para o disparo seguinte.
    async fn enqueue_daily_job(&self) {
        let payload = r#"{"generated_by": "scheduled"}"#.to_string();
        match self.store.create(JobType::GenerateInsights, Some(payload)).await {
            Ok(job) => {
                tracing::info!(job_id = %job.id, "Job diário de insights enfileirado");
            }
            Err(e) => {
                tracing::error!("Falha ao enfileirar job diário de insights: {e}");
            }
        }
    }

    pub fn setup(self) -> SchedulerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!(
                "Scheduler de insights iniciado (disparo diário às {:02}:{:02} UTC)",
                self.hour,
                self.minute
            );
            loop {
                let wait = duration_until_next(Utc::now(), self.hour, self.minute);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        self.enqueue_daily_job().await;
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("Scheduler de insights encerrado");
        });

        SchedulerHandle { shutdown, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::job_repo::testing::InMemoryJobStore;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn fires_later_today_when_the_time_has_not_passed() {
        let wait = duration_until_next(at(4, 30, 0), 6, 0);
        assert_eq!(wait, Duration::from_secs(90 * 60));
    }

    #[test]
    fn fires_tomorrow_when_the_time_already_passed() {
        let wait = duration_until_next(at(7, 0, 0), 6, 0);
        assert_eq!(wait, Duration::from_secs(23 * 60 * 60));
    }

    #[test]
    fn fires_tomorrow_when_now_is_exactly_the_scheduled_time() {
        let wait = duration_until_next(at(6, 0, 0), 6, 0);
        assert_eq!(wait, Duration::from_secs(24 * 60 * 60));
    }

    #[tokio::test]
    async fn daily_job_carries_the_scheduled_origin() {
        let store = Arc::new(InMemoryJobStore::new());
        let scheduler = InsightScheduler::new(store.clone(), 6, 0);

        scheduler.enqueue_daily_job().await;

        let jobs = store.all();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_type, "generate_insights");
        assert_eq!(jobs[0].status, "ready");
        assert_eq!(
            jobs[0].payload.as_deref(),
            Some(r#"{"generated_by": "scheduled"}"#)
        );
    }

    #[tokio::test]
    async fn enqueue_failure_is_swallowed() {
        let store = Arc::new(InMemoryJobStore::new());
        *store.fail.lock().unwrap() = true;
        let scheduler = InsightScheduler::new(store.clone(), 6, 0);

        // Não entra em pânico nem propaga; apenas não enfileira nada
        scheduler.enqueue_daily_job().await;

        *store.fail.lock().unwrap() = false;
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn stop_interrupts_the_wait_immediately() {
        let store = Arc::new(InMemoryJobStore::new());
        let scheduler = InsightScheduler::new(store, 6, 0);

        let handle = scheduler.setup();
        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("o scheduler deve encerrar sem esperar o próximo disparo");
    }
}
