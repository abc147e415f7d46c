//! API 핸들러

pub mod analytics;
pub mod auth;
pub mod health;
pub mod journals;
pub mod moods;
pub mod self_care;
pub mod stress;
pub mod users;
