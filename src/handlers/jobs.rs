// src/handlers/jobs.rs
//
// Visão administrativa da fila de jobs e disparo manual do job de
// insights. O disparo só enfileira: quem executa é o worker.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        authorization::Action,
        job::{Job, JobType},
    },
};

const RECENT_JOBS_LIMIT: i64 = 50;

#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    responses(
        (status = 200, description = "Jobs mais recentes, qualquer status", body = Vec<Job>),
        (status = 403, description = "Requer permissão administrativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_recent_jobs(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Job>>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::ManageSettings, None)?;

    let jobs = app_state.job_store.get_recent(RECENT_JOBS_LIMIT).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    post,
    path = "/api/jobs/insights",
    tag = "Jobs",
    responses(
        (status = 202, description = "Job de insights enfileirado", body = Job),
        (status = 403, description = "Sem permissão de escrita no inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn enqueue_insight_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<(StatusCode, Json<Job>), AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteInventory, None)?;

    let payload = r#"{"generated_by": "manual"}"#.to_string();
    let job = app_state
        .job_store
        .create(JobType::GenerateInsights, Some(payload))
        .await?;

    Ok((StatusCode::ACCEPTED, Json(job)))
}
