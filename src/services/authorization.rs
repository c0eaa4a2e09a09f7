// src/services/authorization.rs
//
// O motor de autorização centralizado. Duas camadas:
//  - `is_allowed`: predicado puro, nunca falha (bom para lógica condicional);
//  - `authorize`: o ponto único de ENFORCEMENT chamado pelos handlers antes
//    de qualquer trabalho — sempre emite um registro de auditoria (sucesso e
//    negação) e devolve `PermissionDenied` quando a checagem falha.
//
// O motor nunca suspende: é computação pura mais uma escrita síncrona no sink.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        authorization::{Action, AuthzDecision, UserRole, permissions_for},
    },
};

// ---
// Sink de auditoria
// ---

// Destino dos registros de decisão. Fica atrás de um trait para que a
// política não precise saber se o destino é o tracing, um arquivo ou um
// serviço de auditoria externo.
pub trait AuditSink: Send + Sync {
    fn record(&self, decision: &AuthzDecision);
}

// Sink padrão: eventos estruturados no tracing. Negações saem em `warn` —
// tentativas negadas são o sinal de segurança mais relevante.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, decision: &AuthzDecision) {
        if decision.allowed {
            tracing::info!(
                event = "authz_decision",
                user_id = %decision.user_id,
                user_email = %decision.user_email,
                user_role = %decision.user_role,
                action = decision.action,
                resource_id = decision.resource_id.as_deref(),
                allowed = true,
                "Autorização concedida"
            );
        } else {
            tracing::warn!(
                event = "authz_decision",
                user_id = %decision.user_id,
                user_email = %decision.user_email,
                user_role = %decision.user_role,
                action = decision.action,
                resource_id = decision.resource_id.as_deref(),
                allowed = false,
                "Autorização negada"
            );
        }
    }
}

// ---
// O motor
// ---

#[derive(Clone)]
pub struct AuthorizationService {
    sink: Arc<dyn AuditSink>,
}

impl AuthorizationService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    // Checagem central: o usuário pode executar a ação?
    //
    // Nunca falha. Usuário inativo é veto absoluto, checado ANTES do mapa
    // de permissões (papel nenhum salva um usuário desativado). Papel fora
    // do conjunto fechado resolve para o conjunto vazio: negar por padrão.
    pub fn is_allowed(&self, user: &User, action: Action) -> bool {
        if !user.is_active {
            return false;
        }

        match user.parsed_role() {
            Some(role) => permissions_for(role).contains(&action),
            None => false,
        }
    }

    // Enforcement: avalia, AUDITA incondicionalmente e falha com 403 se
    // negado. Todo endpoint mutante ou de leitura sensível chama isto
    // antes de fazer qualquer trabalho.
    pub fn authorize(
        &self,
        user: &User,
        action: Action,
        resource_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let allowed = self.is_allowed(user, action);

        self.sink.record(&AuthzDecision {
            user_id: user.id,
            user_email: user.email.clone(),
            user_role: user.role.clone(),
            action: action.as_str(),
            resource_id: resource_id.map(|id| id.to_string()),
            allowed,
            decided_at: Utc::now(),
        });

        if !allowed {
            return Err(AppError::PermissionDenied {
                action: action.as_str().to_string(),
            });
        }
        Ok(())
    }

    // Checagem simples por hierarquia (VIEWER < USER < ADMIN), para os
    // poucos casos naturalmente baseados em patente e não em capacidade.
    // Aplica o mesmo veto de inatividade; papel fora da hierarquia nega.
    pub fn require_role(&self, user: &User, minimum: UserRole) -> Result<(), AppError> {
        if !user.is_active {
            return Err(AppError::InsufficientRole {
                required: minimum.as_str().to_string(),
            });
        }

        let Some(role) = user.parsed_role() else {
            tracing::warn!(
                user_id = %user.id,
                user_role = %user.role,
                "Checagem de papel falhou: papel desconhecido"
            );
            return Err(AppError::InsufficientRole {
                required: minimum.as_str().to_string(),
            });
        };

        if role.rank() < minimum.rank() {
            tracing::warn!(
                user_id = %user.id,
                user_role = %user.role,
                required_role = minimum.as_str(),
                "Checagem de papel falhou"
            );
            return Err(AppError::InsufficientRole {
                required: minimum.as_str().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    // Sink que grava as decisões em memória para os testes inspecionarem.
    #[derive(Default)]
    struct RecordingSink {
        decisions: Mutex<Vec<AuthzDecision>>,
    }

    impl AuditSink for RecordingSink {
        fn record(&self, decision: &AuthzDecision) {
            self.decisions.lock().unwrap().push(decision.clone());
        }
    }

    fn user_with_role(role: &str, is_active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "teste@exemplo.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            role: role.to_string(),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> (AuthorizationService, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (AuthorizationService::new(sink.clone()), sink)
    }

    const ALL_ACTIONS: &[Action] = &[
        Action::ReadInventory,
        Action::WriteInventory,
        Action::DeleteInventory,
        Action::ReadCatalog,
        Action::WriteCatalog,
        Action::DeleteCatalog,
        Action::ReadUsers,
        Action::WriteUsers,
        Action::DeleteUsers,
        Action::ManageSettings,
    ];

    #[test]
    fn is_allowed_equals_static_permission_set_membership() {
        let (authz, _) = service();

        for role in [UserRole::Admin, UserRole::User, UserRole::Viewer] {
            let user = user_with_role(role.as_str(), true);
            for &action in ALL_ACTIONS {
                let expected = permissions_for(role).contains(&action);
                assert_eq!(
                    authz.is_allowed(&user, action),
                    expected,
                    "papel {role} / ação {action}"
                );
            }
        }
    }

    #[test]
    fn inactive_user_is_denied_every_action_regardless_of_role() {
        let (authz, _) = service();

        for role in ["ADMIN", "USER", "VIEWER"] {
            let user = user_with_role(role, false);
            for &action in ALL_ACTIONS {
                assert!(!authz.is_allowed(&user, action));
            }
        }
    }

    #[test]
    fn unknown_role_is_denied_every_action() {
        let (authz, _) = service();

        // Um valor corrompido ou forjado nunca pode conceder acesso.
        for role in ["", "SUPERADMIN", "admin", "root'; --"] {
            let user = user_with_role(role, true);
            for &action in ALL_ACTIONS {
                assert!(!authz.is_allowed(&user, action), "papel '{role}'");
            }
        }
    }

    #[test]
    fn authorize_emits_one_audit_record_per_call() {
        let (authz, sink) = service();
        let user = user_with_role("ADMIN", true);

        // Sucesso e negação são auditados igualmente; duas chamadas,
        // dois registros, na ordem das avaliações.
        authz.authorize(&user, Action::ReadInventory, None).unwrap();
        authz.authorize(&user, Action::ReadInventory, None).unwrap();

        let decisions = sink.decisions.lock().unwrap();
        assert_eq!(decisions.len(), 2);
        assert!(decisions.iter().all(|d| d.allowed));
        assert!(decisions.iter().all(|d| d.action == "read:inventory"));
    }

    #[test]
    fn denied_authorize_audits_and_names_the_action() {
        let (authz, sink) = service();
        let viewer = user_with_role("VIEWER", true);

        let err = authz
            .authorize(&viewer, Action::DeleteInventory, None)
            .unwrap_err();

        match err {
            AppError::PermissionDenied { action } => {
                assert_eq!(action, "delete:inventory");
            }
            other => panic!("erro inesperado: {other:?}"),
        }

        let decisions = sink.decisions.lock().unwrap();
        assert_eq!(decisions.len(), 1);
        assert!(!decisions[0].allowed);
    }

    #[test]
    fn admin_can_delete_inventory_but_viewer_cannot() {
        let (authz, _) = service();

        let admin = user_with_role("ADMIN", true);
        let viewer = user_with_role("VIEWER", true);

        assert!(authz.is_allowed(&admin, Action::DeleteInventory));
        assert!(!authz.is_allowed(&viewer, Action::DeleteInventory));
    }

    #[test]
    fn require_role_follows_the_hierarchy() {
        let (authz, _) = service();

        let admin = user_with_role("ADMIN", true);
        let user = user_with_role("USER", true);
        let viewer = user_with_role("VIEWER", true);

        assert!(authz.require_role(&admin, UserRole::User).is_ok());
        assert!(authz.require_role(&user, UserRole::User).is_ok());
        assert!(authz.require_role(&viewer, UserRole::User).is_err());
        assert!(authz.require_role(&user, UserRole::Admin).is_err());
    }

    #[test]
    fn require_role_denies_inactive_and_unknown_roles() {
        let (authz, _) = service();

        let inactive_admin = user_with_role("ADMIN", false);
        assert!(authz.require_role(&inactive_admin, UserRole::Viewer).is_err());

        // Papel fora da tabela de hierarquia nega, nunca permite em silêncio.
        let stranger = user_with_role("MANAGER", true);
        assert!(authz.require_role(&stranger, UserRole::Viewer).is_err());
    }
}
