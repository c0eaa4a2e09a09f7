// src/services/dashboard.rs
//
// Agregação do dashboard: resumo do estoque, atividade recente e o
// insight mais novo, em uma única resposta.

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::InventoryStore,
    models::dashboard::DashboardResponse,
    services::{activity_log::ActivityLogService, ai_insights::AiInsightsService},
};

const RECENT_ACTIVITY_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct DashboardService {
    inventory: Arc<dyn InventoryStore>,
    activity_logs: ActivityLogService,
    insights: AiInsightsService,
}

impl DashboardService {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        activity_logs: ActivityLogService,
        insights: AiInsightsService,
    ) -> Self {
        Self { inventory, activity_logs, insights }
    }

    pub async fn overview(&self) -> Result<DashboardResponse, AppError> {
        let stats = self.inventory.summary().await?;
        let recent_activity = self.activity_logs.get_recent(RECENT_ACTIVITY_LIMIT).await?;
        let latest_insight = self.insights.get_latest().await?;

        Ok(DashboardResponse { stats, recent_activity, latest_insight })
    }
}
