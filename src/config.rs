// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        ActivityLogRepository, CatalogRepository, InsightRepository, InventoryRepository,
        JobRepository, JobStore, UserRepository,
    },
    services::{
        ActivityLogService, AiInsightsService, AuthService, AuthorizationService, CatalogService,
        DashboardService, InventoryService, OpenAiClient,
        authorization::TracingAuditSink,
        openai,
    },
};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

// Configurações lidas do ambiente na subida do processo
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    // Horário (UTC) do disparo diário do job de insights
    pub insights_hour: u32,
    pub insights_minute: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;

        // A chave é opcional: sem ela os insights viram placeholder
        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());

        let insights_hour = env::var("INSIGHTS_HOUR")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|h| *h < 24)
            .unwrap_or(crate::services::scheduler::DEFAULT_HOUR);
        let insights_minute = env::var("INSIGHTS_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|m| *m < 60)
            .unwrap_or(crate::services::scheduler::DEFAULT_MINUTE);

        Ok(Self {
            database_url,
            jwt_secret,
            openai_api_key,
            openai_model,
            insights_hour,
            insights_minute,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,

    pub auth_service: AuthService,
    pub authorization: AuthorizationService,
    pub user_repo: UserRepository,

    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub activity_log_service: ActivityLogService,

    pub job_store: Arc<dyn JobStore>,
    pub insight_repo: InsightRepository,
    pub insights_service: AiInsightsService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo.clone(), settings.jwt_secret.clone());
        let authorization = AuthorizationService::new(Arc::new(TracingAuditSink));

        let activity_log_service =
            ActivityLogService::new(Arc::new(ActivityLogRepository::new(db_pool.clone())));

        let catalog_service = CatalogService::new(
            CatalogRepository::new(db_pool.clone()),
            activity_log_service.clone(),
        );

        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let inventory_service =
            InventoryService::new(inventory_repo.clone(), activity_log_service.clone());

        let job_store: Arc<dyn JobStore> = Arc::new(JobRepository::new(db_pool.clone()));
        let insight_repo = InsightRepository::new(db_pool.clone());

        let chat_client: Arc<dyn openai::ChatCompletionClient> = Arc::new(OpenAiClient::new(
            settings.openai_api_key.clone(),
            settings.openai_model.clone(),
        ));
        let insights_service = AiInsightsService::new(
            activity_log_service.clone(),
            Arc::new(insight_repo.clone()),
            Arc::new(inventory_repo.clone()),
            chat_client,
        );

        let dashboard_service = DashboardService::new(
            Arc::new(inventory_repo),
            activity_log_service.clone(),
            insights_service.clone(),
        );

        Ok(Self {
            db_pool,
            settings,
            auth_service,
            authorization,
            user_repo,
            catalog_service,
            inventory_service,
            activity_log_service,
            job_store,
            insight_repo,
            insights_service,
            dashboard_service,
        })
    }
}
