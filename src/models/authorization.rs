// src/models/authorization.rs
//
// Dados estáticos da política de autorização: papéis, ações e o mapa
// papel -> permissões. Este arquivo é a única fonte de verdade da política;
// mudar a política significa mudar estas tabelas, nunca dados em runtime.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Papéis (conjunto fechado, capacidades estritamente aninhadas)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "VIEWER")]
    Viewer,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
            UserRole::Viewer => "VIEWER",
        }
    }

    // Tradução da forma armazenada (texto) para o enum.
    // Valor desconhecido => None, que o motor trata como "sem permissões".
    pub fn parse(value: &str) -> Option<UserRole> {
        match value {
            "ADMIN" => Some(UserRole::Admin),
            "USER" => Some(UserRole::User),
            "VIEWER" => Some(UserRole::Viewer),
            _ => None,
        }
    }

    // Hierarquia ordinal usada por `require_role`: VIEWER < USER < ADMIN.
    pub const fn rank(&self) -> u8 {
        match self {
            UserRole::Viewer => 0,
            UserRole::User => 1,
            UserRole::Admin => 2,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// Ações (formato "verbo:recurso")
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Inventário
    ReadInventory,
    WriteInventory,
    DeleteInventory,

    // Catálogo (cores, marcas, materiais, carretéis...)
    ReadCatalog,
    WriteCatalog,
    DeleteCatalog,

    // Gestão de usuários
    ReadUsers,
    WriteUsers,
    DeleteUsers,

    // Administração
    ManageSettings,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::ReadInventory => "read:inventory",
            Action::WriteInventory => "write:inventory",
            Action::DeleteInventory => "delete:inventory",
            Action::ReadCatalog => "read:catalog",
            Action::WriteCatalog => "write:catalog",
            Action::DeleteCatalog => "delete:catalog",
            Action::ReadUsers => "read:users",
            Action::WriteUsers => "write:users",
            Action::DeleteUsers => "delete:users",
            Action::ManageSettings => "manage:settings",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// Mapa papel -> permissões (fonte única da política)
// ---

const ADMIN_PERMISSIONS: &[Action] = &[
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

// Usuários comuns leem/escrevem inventário e catálogo, mas não deletam
// nem gerenciam outros usuários.
const USER_PERMISSIONS: &[Action] = &[
    Action::ReadInventory,
    Action::WriteInventory,
    Action::ReadCatalog,
    Action::WriteCatalog,
];

// Visualizadores têm acesso somente leitura.
const VIEWER_PERMISSIONS: &[Action] = &[Action::ReadInventory, Action::ReadCatalog];

// Função pura sobre dados estáticos. Nunca falha: papel fora do conjunto
// fechado já foi filtrado para `None` na borda, e `None` vira fatia vazia
// em quem chama.
pub const fn permissions_for(role: UserRole) -> &'static [Action] {
    match role {
        UserRole::Admin => ADMIN_PERMISSIONS,
        UserRole::User => USER_PERMISSIONS,
        UserRole::Viewer => VIEWER_PERMISSIONS,
    }
}

// ---
// Decisão de autorização (registro de auditoria)
// ---

// Saída efêmera de uma avaliação. Criada em TODA chamada de `authorize`
// (sucesso e negação) e nunca mutada depois.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzDecision {
    pub user_id: Uuid,
    pub user_email: String,
    pub user_role: String,
    pub action: &'static str,
    pub resource_id: Option<String>,
    pub allowed: bool,
    pub decided_at: DateTime<Utc>,
}
