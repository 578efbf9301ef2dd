use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{delete, get, put};
use axum::Router;

use crate::error::ApiResult;
use crate::extractors::AdminClaims;
use crate::models::User;
use crate::services::admin::users::{
    AdjustTicketsRequest, DeletionImpactReport, ReservationsForceCancelled, TicketsAdjusted,
    UserAdminService, UserDeletionReport, UserRestored,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tickets", put(adjust_tickets))
        .route("/deleted", get(list_deleted))
        .route("/{user_id}", delete(delete_user))
        .route("/{user_id}/restore", put(restore_user))
        .route("/{user_id}/deletion-impact", get(deletion_impact))
        .route(
            "/{user_id}/force-cancel-reservations",
            put(force_cancel_reservations),
        )
}

async fn adjust_tickets(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(body): Json<AdjustTicketsRequest>,
) -> ApiResult<Json<TicketsAdjusted>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.adjust_tickets(body).await?))
}

async fn list_deleted(
    State(state): State<AppState>,
    _admin: AdminClaims,
) -> ApiResult<Json<Vec<User>>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.list_deleted().await?))
}

async fn restore_user(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<UserRestored>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.restore(user_id).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<UserDeletionReport>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.soft_delete_user(user_id).await?))
}

async fn deletion_impact(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<DeletionImpactReport>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.deletion_impact(user_id).await?))
}

async fn force_cancel_reservations(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ReservationsForceCancelled>> {
    let service = UserAdminService::new(state.pool.clone());
    Ok(Json(service.force_cancel_reservations(user_id).await?))
}
