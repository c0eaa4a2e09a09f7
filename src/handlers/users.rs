// src/handlers/users.rs
//
// Administração de usuários. Cada endpoint passa pelo `authorize` (que
// audita a decisão) antes de tocar o banco. Um admin não pode mexer no
// próprio papel nem se desativar: isso evita o lockout acidental do
// último administrador.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{UpdateRolePayload, UpdateStatusPayload, User},
        authorization::Action,
    },
};

// Guarda de auto-mutação: chamada antes de qualquer escrita no banco.
// Vale para qualquer papel, inclusive ADMIN.
fn ensure_not_self(actor: &User, target: Uuid) -> Result<(), AppError> {
    if actor.id == target {
        return Err(AppError::SelfMutation);
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Lista de usuários", body = Vec<User>),
        (status = 403, description = "Sem permissão para ler usuários")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<User>>, AppError> {
    app_state.authorization.authorize(&user, Action::ReadUsers, None)?;

    let users = app_state.user_repo.find_all().await?;
    Ok(Json(users))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    request_body = UpdateRolePayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papel atualizado", body = User),
        (status = 400, description = "Tentativa de alterar o próprio papel"),
        (status = 403, description = "Sem permissão para gerir usuários"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<User>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteUsers, Some(id))?;

    ensure_not_self(&user, id)?;

    let updated = app_state.user_repo.update_role(id, payload.role).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "Users",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Status atualizado", body = User),
        (status = 400, description = "Tentativa de alterar o próprio status"),
        (status = 403, description = "Sem permissão para gerir usuários"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<User>, AppError> {
    app_state
        .authorization
        .authorize(&user, Action::WriteUsers, Some(id))?;

    ensure_not_self(&user, id)?;

    let updated = app_state
        .user_repo
        .update_status(id, payload.is_active)
        .await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn admin_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "admin@exemplo.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            role: "ADMIN".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_targeting_own_id_is_rejected() {
        let admin = admin_user();

        // A guarda roda antes de qualquer escrita: rejeitar aqui significa
        // que o repositório nunca é tocado, mesmo para um ADMIN.
        assert!(matches!(
            ensure_not_self(&admin, admin.id),
            Err(AppError::SelfMutation)
        ));
    }

    #[test]
    fn mutating_another_user_passes_the_guard() {
        let admin = admin_user();
        assert!(ensure_not_self(&admin, Uuid::new_v4()).is_ok());
    }
}
