// src/handlers/dashboard.rs
//
// Dashboard e insights. A geração via streaming usa SSE: eventos de
// conteúdo conforme o texto chega, um evento final de conclusão com o
// insight persistido, ou um evento de erro (e nada persistido).

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        activity_log::ActivityLog,
        authorization::{Action, UserRole},
        dashboard::{DashboardResponse, GenerateInsightResponse, InsightsHistoryResponse},
        insight::{GeneratedBy, Insight},
        inventory::InventorySummary,
    },
};

const INSIGHTS_HISTORY_LIMIT: i64 = 30;
const ACTIVITY_FEED_LIMIT: i64 = 50;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Visão agregada do dashboard", body = DashboardResponse),
        (status = 403, description = "Sem permissão de leitura do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<DashboardResponse>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadInventory, None)?;
    Ok(Json(app_state.dashboard_service.overview().await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo do estoque", body = InventorySummary),
        (status = 403, description = "Sem permissão de leitura do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<InventorySummary>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadInventory, None)?;
    Ok(Json(app_state.inventory_service.summary().await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/activity",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Atividade recente", body = Vec<ActivityLog>),
        (status = 403, description = "Sem permissão de leitura do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_activity(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadInventory, None)?;
    Ok(Json(
        app_state
            .activity_log_service
            .get_recent(ACTIVITY_FEED_LIMIT)
            .await?,
    ))
}

// --- Insights ---

#[utoipa::path(
    get,
    path = "/api/dashboard/insights",
    tag = "Insights",
    responses(
        (status = 200, description = "Histórico de insights", body = InsightsHistoryResponse),
        (status = 403, description = "Sem permissão de leitura do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_insights_history(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<InsightsHistoryResponse>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadInventory, None)?;
    let insights = app_state
        .insights_service
        .get_recent(INSIGHTS_HISTORY_LIMIT)
        .await?;
    Ok(Json(InsightsHistoryResponse { insights }))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/insights/latest",
    tag = "Insights",
    responses(
        (status = 200, description = "Insight mais recente (ou nenhum)", body = Option<Insight>),
        (status = 403, description = "Sem permissão de leitura do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_latest_insight(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Option<Insight>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadInventory, None)?;
    Ok(Json(app_state.insights_service.get_latest().await?))
}

#[utoipa::path(
    post,
    path = "/api/dashboard/insights/generate",
    tag = "Insights",
    responses(
        (status = 200, description = "Insight gerado e persistido", body = GenerateInsightResponse),
        (status = 403, description = "Sem permissão de escrita no inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_insight(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<GenerateInsightResponse>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteInventory, None)?;

    let insight = app_state
        .insights_service
        .generate_insight(None, GeneratedBy::Manual)
        .await?;

    Ok(Json(GenerateInsightResponse {
        insight,
        message: "Insight gerado com sucesso.".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/insights/stream",
    tag = "Insights",
    responses(
        (status = 200, description = "Stream SSE de eventos de geração"),
        (status = 403, description = "Sem permissão de escrita no inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_insight(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteInventory, None)?;

    let stream = app_state
        .insights_service
        .generate_insight_stream(GeneratedBy::Direct)
        .map(|event| {
            let sse_event = match Event::default().json_data(&event) {
                Ok(ev) => ev,
                // Serialização desses eventos não falha; o fallback só
                // mantém o stream vivo se um dia falhar.
                Err(e) => Event::default().data(format!(r#"{{"type":"error","error":"{e}"}}"#)),
            };
            Ok(sse_event)
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[utoipa::path(
    delete,
    path = "/api/dashboard/insights/{id}",
    tag = "Insights",
    params(("id" = Uuid, Path, description = "ID do insight")),
    responses(
        (status = 204, description = "Insight removido"),
        (status = 403, description = "Requer papel ADMIN"),
        (status = 404, description = "Insight não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_insight(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.authorization.require_role(&user, UserRole::Admin)?;

    app_state.insight_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
