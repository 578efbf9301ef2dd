pub mod constants;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use db::connection::get_db_pool;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
pub use utils::config::Config;

// Re-export common types
pub use anyhow::Result;
pub use chrono::{DateTime, Utc};
pub use sqlx::PgPool;
