use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AdminClaims;
use crate::models::{NewPromoCode, PromoCodePatch};
use crate::services::admin::promos::{
    ExpiringReport, PromoAdminService, PromoCodeSummary, PromoCreated, PromoToggled, PromoUpdated,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_code).get(list_codes))
        .route("/expiring-soon", get(expiring_soon))
        .route("/{promo_id}", put(update_code))
        .route("/{promo_id}/toggle-active", post(toggle_active))
}

async fn create_code(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(body): Json<NewPromoCode>,
) -> ApiResult<Json<PromoCreated>> {
    let service = PromoAdminService::new(state.pool.clone());
    Ok(Json(service.create_code(body).await?))
}

#[derive(Debug, Deserialize)]
struct ListCodesParams {
    #[serde(default)]
    include_expired: bool,
}

async fn list_codes(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Query(params): Query<ListCodesParams>,
) -> ApiResult<Json<Vec<PromoCodeSummary>>> {
    let service = PromoAdminService::new(state.pool.clone());
    Ok(Json(service.list_codes(params.include_expired).await?))
}

async fn update_code(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(promo_id): Path<i32>,
    Json(patch): Json<PromoCodePatch>,
) -> ApiResult<Json<PromoUpdated>> {
    let service = PromoAdminService::new(state.pool.clone());
    Ok(Json(service.update_code(promo_id, patch).await?))
}

async fn toggle_active(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(promo_id): Path<i32>,
) -> ApiResult<Json<PromoToggled>> {
    let service = PromoAdminService::new(state.pool.clone());
    Ok(Json(service.toggle_active(promo_id).await?))
}

#[derive(Debug, Deserialize)]
struct ExpiringParams {
    days_ahead: Option<i64>,
}

async fn expiring_soon(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Query(params): Query<ExpiringParams>,
) -> ApiResult<Json<ExpiringReport>> {
    let service = PromoAdminService::new(state.pool.clone());
    Ok(Json(service.expiring_soon(params.days_ahead).await?))
}
