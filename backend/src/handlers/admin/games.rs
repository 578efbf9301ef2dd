use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AdminClaims;
use crate::models::{ArcadePlacement, Game, GamePatch, NewGame};
use crate::services::admin::games::{
    GameAdminService, GameCreated, GameDeleted, GameRestored, GameStatsReport, GameUpdated,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_game).get(list_games))
        .route("/deleted", get(list_deleted))
        .route(
            "/{game_id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/{game_id}/restore", put(restore_game))
        .route("/{game_id}/stats", get(game_stats))
        .route("/{game_id}/arcades", get(game_arcades))
}

async fn create_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(body): Json<NewGame>,
) -> ApiResult<Json<GameCreated>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.create_game(body).await?))
}

#[derive(Debug, Deserialize)]
struct ListGamesParams {
    #[serde(default)]
    include_deleted: bool,
}

async fn list_games(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Query(params): Query<ListGamesParams>,
) -> ApiResult<Json<Vec<Game>>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.list_games(params.include_deleted).await?))
}

async fn get_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(game_id): Path<i32>,
) -> ApiResult<Json<Game>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.get_game(game_id).await?))
}

async fn update_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(game_id): Path<i32>,
    Json(patch): Json<GamePatch>,
) -> ApiResult<Json<GameUpdated>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.update_game(game_id, patch).await?))
}

async fn delete_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(game_id): Path<i32>,
) -> ApiResult<Json<GameDeleted>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.soft_delete(game_id).await?))
}

async fn list_deleted(
    State(state): State<AppState>,
    _admin: AdminClaims,
) -> ApiResult<Json<Vec<Game>>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.list_deleted().await?))
}

async fn restore_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(game_id): Path<i32>,
) -> ApiResult<Json<GameRestored>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.restore(game_id).await?))
}

#[derive(Debug, Deserialize)]
struct GameStatsParams {
    days: Option<i64>,
}

async fn game_stats(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(game_id): Path<i32>,
    Query(params): Query<GameStatsParams>,
) -> ApiResult<Json<GameStatsReport>> {
    let days = params.days.unwrap_or(30).clamp(1, 365);
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.stats(game_id, days).await?))
}

async fn game_arcades(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(game_id): Path<i32>,
) -> ApiResult<Json<Vec<ArcadePlacement>>> {
    let service = GameAdminService::new(state.pool.clone());
    Ok(Json(service.arcades_for_game(game_id).await?))
}
