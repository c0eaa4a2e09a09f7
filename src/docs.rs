// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::update_role,
        handlers::users::update_status,

        // --- Catalog ---
        handlers::catalog::list_colors,
        handlers::catalog::create_color,
        handlers::catalog::list_brands,
        handlers::catalog::create_brand,
        handlers::catalog::list_materials,
        handlers::catalog::create_material,

        // --- Inventory ---
        handlers::inventory::get_all_items,
        handlers::inventory::get_item,
        handlers::inventory::create_item,
        handlers::inventory::update_weight,
        handlers::inventory::delete_item,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_stats,
        handlers::dashboard::get_activity,

        // --- Insights ---
        handlers::dashboard::get_insights_history,
        handlers::dashboard::get_latest_insight,
        handlers::dashboard::generate_insight,
        handlers::dashboard::stream_insight,
        handlers::dashboard::delete_insight,

        // --- Jobs ---
        handlers::jobs::list_recent_jobs,
        handlers::jobs::enqueue_insight_job,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::UpdateRolePayload,
            models::auth::UpdateStatusPayload,
            models::authorization::UserRole,

            // --- Catalog ---
            models::catalog::Color,
            models::catalog::Brand,
            models::catalog::Material,
            models::catalog::CreateColorPayload,
            models::catalog::CreateNamedPayload,

            // --- Inventory ---
            models::inventory::InventoryItem,
            models::inventory::InventorySummary,
            models::inventory::CreateInventoryItemPayload,
            models::inventory::UpdateWeightPayload,

            // --- Activity / Insights / Jobs ---
            models::activity_log::ActivityLog,
            models::insight::Insight,
            models::job::Job,
            models::dashboard::DashboardResponse,
            models::dashboard::InsightsHistoryResponse,
            models::dashboard::GenerateInsightResponse,
            services::ai_insights::InsightStreamEvent,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Administração de Usuários e Papéis"),
        (name = "Catalog", description = "Catálogo de Cores, Marcas e Materiais"),
        (name = "Inventory", description = "Estoque de Carretéis"),
        (name = "Dashboard", description = "Visão Agregada do Estoque"),
        (name = "Insights", description = "Insights Gerados por IA"),
        (name = "Jobs", description = "Fila de Jobs em Background")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
