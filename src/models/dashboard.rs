// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{activity_log::ActivityLog, insight::Insight, inventory::InventorySummary};

// Resposta agregada do dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: InventorySummary,
    pub recent_activity: Vec<ActivityLog>,
    pub latest_insight: Option<Insight>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsightsHistoryResponse {
    pub insights: Vec<Insight>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateInsightResponse {
    pub insight: Insight,
    pub message: String,
}
