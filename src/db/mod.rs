pub mod user_repo;
pub use user_repo::UserRepository;
pub mod job_repo;
pub use job_repo::{JobRepository, JobStore};
pub mod insight_repo;
pub use insight_repo::{InsightRepository, InsightStore};
pub mod activity_log_repo;
pub use activity_log_repo::ActivityLogRepository;
pub mod inventory_repo;
pub use inventory_repo::{InventoryRepository, InventoryStore};
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
