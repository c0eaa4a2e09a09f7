// src/handlers/catalog.rs

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        authorization::Action,
        catalog::{Brand, Color, CreateColorPayload, CreateNamedPayload, Material},
    },
};

// --- Cores ---

#[utoipa::path(
    get,
    path = "/api/catalog/colors",
    tag = "Catalog",
    responses(
        (status = 200, description = "Cores cadastradas", body = Vec<Color>),
        (status = 403, description = "Sem permissão de leitura do catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_colors(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Color>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadCatalog, None)?;
    Ok(Json(app_state.catalog_service.list_colors().await?))
}

#[utoipa::path(
    post,
    path = "/api/catalog/colors",
    tag = "Catalog",
    request_body = CreateColorPayload,
    responses(
        (status = 200, description = "Cor criada ou já existente", body = Color),
        (status = 403, description = "Sem permissão de escrita no catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_color(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateColorPayload>,
) -> Result<Json<Color>, AppError> {
    app_state.authorization.authorize(&user, Action::WriteCatalog, None)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let color = app_state
        .catalog_service
        .get_or_create_color(&payload.name, &payload.hex_code, &user)
        .await?;
    Ok(Json(color))
}

// --- Marcas ---

#[utoipa::path(
    get,
    path = "/api/catalog/brands",
    tag = "Catalog",
    responses(
        (status = 200, description = "Marcas cadastradas", body = Vec<Brand>),
        (status = 403, description = "Sem permissão de leitura do catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_brands(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Brand>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadCatalog, None)?;
    Ok(Json(app_state.catalog_service.list_brands().await?))
}

#[utoipa::path(
    post,
    path = "/api/catalog/brands",
    tag = "Catalog",
    request_body = CreateNamedPayload,
    responses(
        (status = 200, description = "Marca criada ou já existente", body = Brand),
        (status = 403, description = "Sem permissão de escrita no catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateNamedPayload>,
) -> Result<Json<Brand>, AppError> {
    app_state.authorization.authorize(&user, Action::WriteCatalog, None)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let brand = app_state
        .catalog_service
        .get_or_create_brand(&payload.name, &user)
        .await?;
    Ok(Json(brand))
}

// --- Materiais ---

#[utoipa::path(
    get,
    path = "/api/catalog/materials",
    tag = "Catalog",
    responses(
        (status = 200, description = "Materiais cadastrados", body = Vec<Material>),
        (status = 403, description = "Sem permissão de leitura do catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Material>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadCatalog, None)?;
    Ok(Json(app_state.catalog_service.list_materials().await?))
}

#[utoipa::path(
    post,
    path = "/api/catalog/materials",
    tag = "Catalog",
    request_body = CreateNamedPayload,
    responses(
        (status = 200, description = "Material criado ou já existente", body = Material),
        (status = 403, description = "Sem permissão de escrita no catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateNamedPayload>,
) -> Result<Json<Material>, AppError> {
    app_state.authorization.authorize(&user, Action::WriteCatalog, None)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let material = app_state
        .catalog_service
        .get_or_create_material(&payload.name, &user)
        .await?;
    Ok(Json(material))
}
