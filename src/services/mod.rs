pub mod activity_log;
pub mod ai_insights;
pub mod auth;
pub mod authorization;
pub mod catalog;
pub mod dashboard;
pub mod inventory;
pub mod job_worker;
pub mod openai;
pub mod scheduler;

pub use activity_log::ActivityLogService;
pub use ai_insights::{AiInsightsService, GenerateInsightsHandler};
pub use auth::AuthService;
pub use authorization::AuthorizationService;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use job_worker::JobWorker;
pub use openai::OpenAiClient;
pub use scheduler::InsightScheduler;
