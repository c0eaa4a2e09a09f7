// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        authorization::Action,
        inventory::{CreateInventoryItemPayload, InventoryItem, UpdateWeightPayload},
    },
};

const DEFAULT_LIST_LIMIT: i64 = 100;

#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventory",
    responses(
        (status = 200, description = "Itens do estoque", body = Vec<InventoryItem>),
        (status = 403, description = "Sem permissão de leitura do inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_all_items(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadInventory, None)?;
    Ok(Json(app_state.inventory_service.get_all(DEFAULT_LIST_LIMIT).await?))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item do estoque", body = InventoryItem),
        (status = 403, description = "Sem permissão de leitura do inventário"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::ReadInventory, Some(id))?;
    Ok(Json(app_state.inventory_service.get_item(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = CreateInventoryItemPayload,
    responses(
        (status = 201, description = "Item adicionado ao estoque", body = InventoryItem),
        (status = 400, description = "Payload inválido"),
        (status = 403, description = "Sem permissão de escrita no inventário")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateInventoryItemPayload>,
) -> Result<(StatusCode, Json<InventoryItem>), AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteInventory, None)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state.inventory_service.add_item(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}/weight",
    tag = "Inventory",
    request_body = UpdateWeightPayload,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Peso atualizado", body = InventoryItem),
        (status = 400, description = "Payload inválido"),
        (status = 403, description = "Sem permissão de escrita no inventário"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_weight(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWeightPayload>,
) -> Result<Json<InventoryItem>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteInventory, Some(id))?;
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state
        .inventory_service
        .update_weight(id, payload.weight, &user)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item removido"),
        (status = 403, description = "Sem permissão de remoção no inventário"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::DeleteInventory, Some(id))?;

    app_state.inventory_service.delete_item(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
