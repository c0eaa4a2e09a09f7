//src/main.rs

use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::middleware::auth::auth_middleware;
use crate::models::job::JobType;
use crate::services::{GenerateInsightsHandler, InsightScheduler, JobWorker};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().expect("Falha ao carregar a configuração do ambiente.");
    let app_state = AppState::new(settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // --- Worker e scheduler em background ---
    let worker = JobWorker::new(app_state.job_store.clone()).register(
        JobType::GenerateInsights,
        Arc::new(GenerateInsightsHandler::new(app_state.insights_service.clone())),
    );
    let worker_handle = worker.start();

    let scheduler = InsightScheduler::new(
        app_state.job_store.clone(),
        app_state.settings.insights_hour,
        app_state.settings.insights_minute,
    );
    let scheduler_handle = scheduler.setup();

    // Rotas públicas de autenticação
    let auth_public_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let auth_protected_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/{id}/role", put(handlers::users::update_role))
        .route("/{id}/status", put(handlers::users::update_status));

    let catalog_routes = Router::new()
        .route(
            "/colors",
            post(handlers::catalog::create_color).get(handlers::catalog::list_colors),
        )
        .route(
            "/brands",
            post(handlers::catalog::create_brand).get(handlers::catalog::list_brands),
        )
        .route(
            "/materials",
            post(handlers::catalog::create_material).get(handlers::catalog::list_materials),
        );

    let inventory_routes = Router::new()
        .route(
            "/",
            post(handlers::inventory::create_item).get(handlers::inventory::get_all_items),
        )
        .route(
            "/{id}",
            get(handlers::inventory::get_item).delete(handlers::inventory::delete_item),
        )
        .route("/{id}/weight", put(handlers::inventory::update_weight));

    let dashboard_routes = Router::new()
        .route("/", get(handlers::dashboard::get_dashboard))
        .route("/stats", get(handlers::dashboard::get_stats))
        .route("/activity", get(handlers::dashboard::get_activity))
        .route("/insights", get(handlers::dashboard::get_insights_history))
        .route("/insights/latest", get(handlers::dashboard::get_latest_insight))
        .route("/insights/generate", post(handlers::dashboard::generate_insight))
        .route("/insights/stream", get(handlers::dashboard::stream_insight))
        .route("/insights/{id}", axum::routing::delete(handlers::dashboard::delete_insight));

    let job_routes = Router::new()
        .route("/", get(handlers::jobs::list_recent_jobs))
        .route("/insights", post(handlers::jobs::enqueue_insight_job));

    // Tudo abaixo do guard de autenticação; a autorização fina acontece
    // handler a handler.
    let protected_routes = Router::new()
        .nest("/api/auth", auth_protected_routes)
        .nest("/api/users", user_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/jobs", job_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Sinal de encerramento recebido");
        })
        .await
        .expect("Erro no servidor Axum");

    // Encerra as tasks de background: o worker termina o job corrente,
    // o scheduler para na hora.
    worker_handle.stop().await;
    scheduler_handle.shutdown().await;
    tracing::info!("Encerrado com sucesso");
}
