use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AdminClaims;
use crate::models::{Arcade, NewArcade};
use crate::services::admin::arcades::{
    ApiKeyRotated, ArcadeAdminService, ArcadeCreated, ArcadeDeleted, ArcadeRestored, GameAssigned,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_arcade))
        .route("/deleted", get(list_deleted))
        .route("/{arcade_id}", delete(delete_arcade))
        .route("/{arcade_id}/games", put(assign_game))
        .route("/{arcade_id}/restore", put(restore_arcade))
        .route("/{arcade_id}/regenerate-api-key", put(regenerate_api_key))
}

async fn create_arcade(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(body): Json<NewArcade>,
) -> ApiResult<Json<ArcadeCreated>> {
    let service = ArcadeAdminService::new(state.pool.clone());
    Ok(Json(service.create_arcade(body).await?))
}

#[derive(Debug, Deserialize)]
struct AssignGameRequest {
    game_id: i32,
    slot_number: i32,
}

async fn assign_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(arcade_id): Path<i32>,
    Json(body): Json<AssignGameRequest>,
) -> ApiResult<Json<GameAssigned>> {
    let service = ArcadeAdminService::new(state.pool.clone());
    Ok(Json(
        service
            .assign_game(arcade_id, body.game_id, body.slot_number)
            .await?,
    ))
}

async fn delete_arcade(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(arcade_id): Path<i32>,
) -> ApiResult<Json<ArcadeDeleted>> {
    let service = ArcadeAdminService::new(state.pool.clone());
    Ok(Json(service.soft_delete(arcade_id).await?))
}

async fn list_deleted(
    State(state): State<AppState>,
    _admin: AdminClaims,
) -> ApiResult<Json<Vec<Arcade>>> {
    let service = ArcadeAdminService::new(state.pool.clone());
    Ok(Json(service.list_deleted().await?))
}

async fn restore_arcade(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(arcade_id): Path<i32>,
) -> ApiResult<Json<ArcadeRestored>> {
    let service = ArcadeAdminService::new(state.pool.clone());
    Ok(Json(service.restore(arcade_id).await?))
}

async fn regenerate_api_key(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(arcade_id): Path<i32>,
) -> ApiResult<Json<ApiKeyRotated>> {
    let service = ArcadeAdminService::new(state.pool.clone());
    Ok(Json(service.regenerate_api_key(arcade_id).await?))
}
