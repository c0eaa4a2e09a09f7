pub mod activity_log;
pub mod auth;
pub mod authorization;
pub mod catalog;
pub mod dashboard;
pub mod insight;
pub mod inventory;
pub mod job;
