use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use crate::error::ApiResult;
use crate::extractors::AdminClaims;
use crate::services::admin::stats::{GlobalStats, StatsService};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(global_stats))
}

async fn global_stats(
    State(state): State<AppState>,
    _admin: AdminClaims,
) -> ApiResult<Json<GlobalStats>> {
    let service = StatsService::new(state.pool.clone());
    Ok(Json(service.global_stats().await?))
}
