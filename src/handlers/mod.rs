pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod inventory;
pub mod jobs;
pub mod users;
