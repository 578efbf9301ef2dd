use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct GlobalStats {
    pub active_users: i64,
    pub total_arcades: i64,
    pub total_games: i64,
    pub active_promo_codes: i64,
    pub total_tickets_in_circulation: i64,
    pub generated_at: DateTime<Utc>,
}

pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, ApiError> {
        Ok(GlobalStats {
            active_users: db::users::count_active_users(&self.pool).await?,
            total_arcades: db::arcades::count_active_arcades(&self.pool).await?,
            total_games: db::games::count_active_games(&self.pool).await?,
            active_promo_codes: db::promos::count_active_codes(&self.pool).await?,
            total_tickets_in_circulation: db::users::total_tickets_in_circulation(&self.pool)
                .await?,
            generated_at: Utc::now(),
        })
    }
}
