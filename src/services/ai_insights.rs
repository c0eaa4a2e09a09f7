// src/services/ai_insights.rs
//
// Orquestração da geração de insights: junta a janela recente do log de
// atividades com o resumo do inventário, monta o prompt, chama o serviço
// externo e persiste o resultado. Falha do serviço externo NUNCA propaga:
// vira um conteúdo placeholder visível no dashboard.

use std::sync::Arc;

use serde::Serialize;
use tokio_stream::wrappers::ReceiverStream;
use futures_util::StreamExt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InsightStore, InventoryStore},
    models::insight::{GeneratedBy, Insight},
    services::{activity_log::ActivityLogService, openai::ChatCompletionClient},
};

// Janela de atividade enviada como contexto (mais recente primeiro)
const ACTIVITY_WINDOW: i64 = 200;

// Instrução fixa de sistema: o papel do assistente
const SYSTEM_PROMPT: &str = "\
Você é um assistente de gestão de estoque de um sistema de inventário de \
filamentos para impressão 3D.

Seu papel é analisar logs de atividade e fornecer insights acionáveis sobre:
1. Carretéis que podem precisar de reposição em breve, com base nos padrões de uso
2. Tendências e padrões de uso (quais cores/materiais são mais usados)
3. Recomendações de otimização do inventário
4. Quaisquer anomalias ou pontos de atenção nos dados de uso

Seja conciso e acionável. Formate a resposta em tópicos claros.
Foque em recomendações práticas que o usuário possa aplicar imediatamente.";

// Mensagem claramente sinalizada usada quando não há credencial configurada.
// O insight é criado mesmo assim: a falha fica visível, nunca silenciosa.
const MISSING_KEY_PLACEHOLDER: &str = "\
⚠️ Chave da API da OpenAI não configurada. Defina OPENAI_API_KEY nas \
variáveis de ambiente para habilitar os insights de IA.";

// Eventos do modo streaming (conjunto fechado)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InsightStreamEvent {
    Content { content: String },
    Complete { insight: Insight },
    Error { error: String },
}

#[derive(Clone)]
pub struct AiInsightsService {
    activity_logs: ActivityLogService,
    insights: Arc<dyn InsightStore>,
    inventory: Arc<dyn InventoryStore>,
    client: Arc<dyn ChatCompletionClient>,
}

impl AiInsightsService {
    pub fn new(
        activity_logs: ActivityLogService,
        insights: Arc<dyn InsightStore>,
        inventory: Arc<dyn InventoryStore>,
        client: Arc<dyn ChatCompletionClient>,
    ) -> Self {
        Self { activity_logs, insights, inventory, client }
    }

    // Monta o prompt de usuário com o contexto atual
    async fn build_prompt(&self) -> Result<String, AppError> {
        let logs = self.activity_logs.get_recent(ACTIVITY_WINDOW).await?;
        let formatted_logs = self.activity_logs.format_logs_for_ai(&logs);

        let summary = self.inventory.summary().await?;

        Ok(format!(
            "Com base nos logs de atividade a seguir do nosso sistema de inventário \
             de filamentos 3D, forneça insights e recomendações.\n\n\
             Resumo atual do inventário:\n\
             - Total de carretéis: {}\n\
             - Peso total disponível: {:.2}g\n\
             - Carretéis em uso: {}\n\n\
             Logs de atividade recentes (mais recentes primeiro):\n{}\n\n\
             Analise esses dados e aponte:\n\
             1. Carretéis que podem precisar de reposição em breve\n\
             2. Padrões ou tendências de uso\n\
             3. Recomendações de gestão do inventário\n\
             4. Pontos de atenção ou anomalias",
            summary.total_spools, summary.total_weight, summary.spools_in_use, formatted_logs
        ))
    }

    // Gera um insight completo (modo síncrono-no-resultado).
    //
    // Sem credencial ou com erro do serviço externo, o conteúdo vira uma
    // mensagem placeholder e o Insight é criado mesmo assim, carimbado com
    // `generated_by` e o job de origem.
    pub async fn generate_insight(
        &self,
        job_id: Option<Uuid>,
        generated_by: GeneratedBy,
    ) -> Result<Insight, AppError> {
        let prompt = self.build_prompt().await?;

        let content = if !self.client.is_configured() {
            MISSING_KEY_PLACEHOLDER.to_string()
        } else {
            match self.client.complete(SYSTEM_PROMPT, &prompt).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::error!("Falha ao gerar insight: {e}");
                    format!("❌ Falha ao gerar insight: {e}")
                }
            }
        };

        self.insights.create(&content, job_id, generated_by).await
    }

    // Gera um insight em streaming: emite os pedaços conforme chegam e, só
    // depois da sequência terminar, persiste UM insight com a concatenação.
    //
    // Erro no meio do caminho => o último evento é `error` e nada é
    // persistido. Consumidor cancelado (receiver dropado) também não
    // persiste insight parcial.
    pub fn generate_insight_stream(
        &self,
        generated_by: GeneratedBy,
    ) -> ReceiverStream<InsightStreamEvent> {
        let (tx, rx) = tokio::sync::mpsc::channel::<InsightStreamEvent>(32);
        let service = self.clone();

        tokio::spawn(async move {
            let prompt = match service.build_prompt().await {
                Ok(prompt) => prompt,
                Err(e) => {
                    let _ = tx
                        .send(InsightStreamEvent::Error { error: e.to_string() })
                        .await;
                    return;
                }
            };

            // Sem credencial: um único pedaço placeholder, persistido como
            // qualquer outro conteúdo (mesma semântica do modo completo).
            if !service.client.is_configured() {
                if tx
                    .send(InsightStreamEvent::Content {
                        content: MISSING_KEY_PLACEHOLDER.to_string(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }
                service
                    .persist_and_complete(MISSING_KEY_PLACEHOLDER, generated_by, &tx)
                    .await;
                return;
            }

            let mut chunks = match service.client.stream(SYSTEM_PROMPT, &prompt).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    let _ = tx
                        .send(InsightStreamEvent::Error {
                            error: format!("❌ Falha ao gerar insight: {e}"),
                        })
                        .await;
                    return;
                }
            };

            let mut accumulated = String::new();
            while let Some(item) = chunks.next().await {
                match item {
                    Ok(content) => {
                        accumulated.push_str(&content);
                        if tx
                            .send(InsightStreamEvent::Content { content })
                            .await
                            .is_err()
                        {
                            // Consumidor desistiu: não persiste parcial.
                            return;
                        }
                    }
                    Err(e) => {
                        // Insight parcial não é persistido.
                        let _ = tx
                            .send(InsightStreamEvent::Error {
                                error: format!("❌ Falha ao gerar insight: {e}"),
                            })
                            .await;
                        return;
                    }
                }
            }

            // Stream que acabou sem nenhum conteúdo: o último evento ainda
            // precisa ser terminal, e não há nada para persistir.
            if accumulated.is_empty() {
                let _ = tx
                    .send(InsightStreamEvent::Error {
                        error: "❌ O serviço externo não devolveu conteúdo.".to_string(),
                    })
                    .await;
                return;
            }
            service
                .persist_and_complete(&accumulated, generated_by, &tx)
                .await;
        });

        ReceiverStream::new(rx)
    }

    async fn persist_and_complete(
        &self,
        content: &str,
        generated_by: GeneratedBy,
        tx: &tokio::sync::mpsc::Sender<InsightStreamEvent>,
    ) {
        match self.insights.create(content, None, generated_by).await {
            Ok(insight) => {
                let _ = tx.send(InsightStreamEvent::Complete { insight }).await;
            }
            Err(e) => {
                let _ = tx
                    .send(InsightStreamEvent::Error { error: e.to_string() })
                    .await;
            }
        }
    }

    pub async fn get_latest(&self) -> Result<Option<Insight>, AppError> {
        self.insights.get_latest().await
    }

    pub async fn get_recent(&self, limit: i64) -> Result<Vec<Insight>, AppError> {
        self.insights.get_recent(limit).await
    }
}

// Handler do job `generate_insights`: delega ao serviço e devolve o id do
// insight criado como resultado do job. A origem vem do payload do job
// (o scheduler grava "scheduled", o endpoint manual grava "manual").
pub struct GenerateInsightsHandler {
    insights: AiInsightsService,
}

impl GenerateInsightsHandler {
    pub fn new(insights: AiInsightsService) -> Self {
        Self { insights }
    }

    fn generated_by_from_payload(payload: Option<&str>) -> GeneratedBy {
        payload
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .and_then(|value| {
                value
                    .get("generated_by")
                    .and_then(|g| g.as_str())
                    .and_then(GeneratedBy::parse)
            })
            .unwrap_or(GeneratedBy::Manual)
    }
}

#[async_trait::async_trait]
impl crate::services::job_worker::JobHandler for GenerateInsightsHandler {
    async fn handle(&self, job: &crate::models::job::Job) -> Result<Option<String>, AppError> {
        let generated_by = Self::generated_by_from_payload(job.payload.as_deref());
        let insight = self.insights.generate_insight(Some(job.id), generated_by).await?;
        Ok(Some(
            serde_json::json!({ "insight_id": insight.id }).to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::{
        db::activity_log_repo::{ActivityLogStore, NewActivityLog},
        models::{activity_log::ActivityLog, inventory::InventorySummary},
        services::openai::ChatStream,
    };

    // --- Colaboradores em memória ---

    #[derive(Default)]
    struct InMemoryInsightStore {
        insights: Mutex<Vec<Insight>>,
    }

    impl InMemoryInsightStore {
        fn count(&self) -> usize {
            self.insights.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InsightStore for InMemoryInsightStore {
        async fn create(
            &self,
            content: &str,
            job_id: Option<Uuid>,
            generated_by: GeneratedBy,
        ) -> Result<Insight, AppError> {
            let insight = Insight {
                id: Uuid::new_v4(),
                content: content.to_string(),
                job_id,
                generated_by: generated_by.as_str().to_string(),
                created_at: Utc::now(),
            };
            self.insights.lock().unwrap().push(insight.clone());
            Ok(insight)
        }

        async fn get_latest(&self) -> Result<Option<Insight>, AppError> {
            Ok(self.insights.lock().unwrap().last().cloned())
        }

        async fn get_recent(&self, limit: i64) -> Result<Vec<Insight>, AppError> {
            let insights = self.insights.lock().unwrap();
            Ok(insights.iter().rev().take(limit as usize).cloned().collect())
        }
    }

    #[derive(Default)]
    struct InMemoryActivityLogStore {
        logs: Mutex<Vec<ActivityLog>>,
    }

    #[async_trait]
    impl ActivityLogStore for InMemoryActivityLogStore {
        async fn create(&self, entry: NewActivityLog) -> Result<ActivityLog, AppError> {
            let log = ActivityLog {
                id: Uuid::new_v4(),
                action_type: entry.action_type,
                entity_type: entry.entity_type,
                entity_id: entry.entity_id,
                description: entry.description,
                extra_data: entry.extra_data,
                user_id: entry.user_id,
                user_email: entry.user_email,
                created_at: Utc::now(),
            };
            self.logs.lock().unwrap().push(log.clone());
            Ok(log)
        }

        async fn get_recent(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
            let logs = self.logs.lock().unwrap();
            Ok(logs.iter().rev().take(limit as usize).cloned().collect())
        }
    }

    struct FixedInventoryStore;

    #[async_trait]
    impl InventoryStore for FixedInventoryStore {
        async fn summary(&self) -> Result<InventorySummary, AppError> {
            Ok(InventorySummary {
                total_spools: 12,
                total_weight: 8400.0,
                spools_in_use: 3,
            })
        }
    }

    // Cliente falso: devolve respostas pré-programadas.
    struct StubChatClient {
        configured: bool,
        complete_response: Result<String, String>,
        stream_chunks: Vec<Result<String, String>>,
    }

    impl StubChatClient {
        fn unconfigured() -> Self {
            Self {
                configured: false,
                complete_response: Ok(String::new()),
                stream_chunks: vec![],
            }
        }
    }

    #[async_trait]
    impl ChatCompletionClient for StubChatClient {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
            self.complete_response
                .clone()
                .map_err(AppError::ExternalService)
        }

        async fn stream(&self, _system: &str, _user: &str) -> Result<ChatStream, AppError> {
            let items: Vec<Result<String, AppError>> = self
                .stream_chunks
                .clone()
                .into_iter()
                .map(|c| c.map_err(AppError::ExternalService))
                .collect();
            Ok(Box::pin(futures_util::stream::iter(items)))
        }
    }

    fn service_with(
        client: StubChatClient,
    ) -> (AiInsightsService, Arc<InMemoryInsightStore>) {
        let insights = Arc::new(InMemoryInsightStore::default());
        let activity_logs =
            ActivityLogService::new(Arc::new(InMemoryActivityLogStore::default()));
        let service = AiInsightsService::new(
            activity_logs,
            insights.clone(),
            Arc::new(FixedInventoryStore),
            Arc::new(client),
        );
        (service, insights)
    }

    #[tokio::test]
    async fn missing_credential_persists_placeholder_insight() {
        let (service, insights) = service_with(StubChatClient::unconfigured());

        let insight = service
            .generate_insight(None, GeneratedBy::Manual)
            .await
            .unwrap();

        assert_eq!(insight.content, MISSING_KEY_PLACEHOLDER);
        assert_eq!(insight.generated_by, "manual");
        assert_eq!(insights.count(), 1);
    }

    #[tokio::test]
    async fn external_failure_persists_marked_error_content() {
        let (service, insights) = service_with(StubChatClient {
            configured: true,
            complete_response: Err("timeout".to_string()),
            stream_chunks: vec![],
        });

        let job_id = Uuid::new_v4();
        let insight = service
            .generate_insight(Some(job_id), GeneratedBy::Scheduled)
            .await
            .unwrap();

        assert!(insight.content.starts_with("❌"));
        assert_eq!(insight.job_id, Some(job_id));
        assert_eq!(insight.generated_by, "scheduled");
        assert_eq!(insights.count(), 1);
    }

    #[tokio::test]
    async fn successful_generation_persists_the_model_output() {
        let (service, insights) = service_with(StubChatClient {
            configured: true,
            complete_response: Ok("- Reponha o PLA azul".to_string()),
            stream_chunks: vec![],
        });

        let insight = service
            .generate_insight(None, GeneratedBy::Direct)
            .await
            .unwrap();

        assert_eq!(insight.content, "- Reponha o PLA azul");
        assert_eq!(insights.count(), 1);
    }

    #[tokio::test]
    async fn stream_concatenates_chunks_and_persists_once() {
        let (service, insights) = service_with(StubChatClient {
            configured: true,
            complete_response: Ok(String::new()),
            stream_chunks: vec![Ok("Reponha ".to_string()), Ok("o PETG".to_string())],
        });

        let events: Vec<InsightStreamEvent> = service
            .generate_insight_stream(GeneratedBy::Direct)
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], InsightStreamEvent::Content { content } if content == "Reponha "));
        assert!(matches!(&events[1], InsightStreamEvent::Content { content } if content == "o PETG"));
        match &events[2] {
            InsightStreamEvent::Complete { insight } => {
                assert_eq!(insight.content, "Reponha o PETG");
                assert_eq!(insight.generated_by, "direct");
            }
            other => panic!("evento inesperado: {other:?}"),
        }
        assert_eq!(insights.count(), 1);
    }

    #[tokio::test]
    async fn stream_error_midflight_yields_error_and_persists_nothing() {
        let (service, insights) = service_with(StubChatClient {
            configured: true,
            complete_response: Ok(String::new()),
            stream_chunks: vec![
                Ok("Parcial".to_string()),
                Err("conexão perdida".to_string()),
            ],
        });

        let events: Vec<InsightStreamEvent> = service
            .generate_insight_stream(GeneratedBy::Direct)
            .collect()
            .await;

        // O último evento é o erro e o parcial não foi persistido.
        assert!(matches!(events.last(), Some(InsightStreamEvent::Error { .. })));
        assert_eq!(insights.count(), 0);
    }

    #[tokio::test]
    async fn empty_stream_ends_with_error_and_persists_nothing() {
        let (service, insights) = service_with(StubChatClient {
            configured: true,
            complete_response: Ok(String::new()),
            stream_chunks: vec![],
        });

        let events: Vec<InsightStreamEvent> = service
            .generate_insight_stream(GeneratedBy::Direct)
            .collect()
            .await;

        // O conjunto de eventos é fechado e o último é sempre terminal
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], InsightStreamEvent::Error { .. }));
        assert_eq!(insights.count(), 0);
    }

    #[tokio::test]
    async fn job_handler_stamps_origin_and_source_job() {
        use crate::{models::job::{Job, JobType}, services::job_worker::JobHandler};

        let (service, insights) = service_with(StubChatClient {
            configured: true,
            complete_response: Ok("ok".to_string()),
            stream_chunks: vec![],
        });
        let handler = GenerateInsightsHandler::new(service);

        let job = Job {
            id: Uuid::new_v4(),
            job_type: JobType::GenerateInsights.as_str().to_string(),
            status: "processing".to_string(),
            payload: Some(r#"{"generated_by": "scheduled"}"#.to_string()),
            result: None,
            error_message: None,
            retry_count: 0,
            max_retries: 2,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: None,
        };

        let result = handler.handle(&job).await.unwrap();
        assert!(result.unwrap().contains("insight_id"));

        let stored = insights.insights.lock().unwrap()[0].clone();
        assert_eq!(stored.job_id, Some(job.id));
        assert_eq!(stored.generated_by, "scheduled");
    }

    #[tokio::test]
    async fn stream_without_credential_persists_the_placeholder() {
        let (service, insights) = service_with(StubChatClient::unconfigured());

        let events: Vec<InsightStreamEvent> = service
            .generate_insight_stream(GeneratedBy::Direct)
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], InsightStreamEvent::Content { content } if content == MISSING_KEY_PLACEHOLDER));
        assert!(matches!(&events[1], InsightStreamEvent::Complete { .. }));
        assert_eq!(insights.count(), 1);
    }
}
