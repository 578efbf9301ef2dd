use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::ArcadeKey;
use crate::models::{Arcade, GameOnArcade};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_arcades))
        .route("/{arcade_id}", get(get_arcade))
        .route("/{arcade_id}/queue", get(arcade_queue))
        .route("/{arcade_id}/config", get(arcade_config))
}

#[derive(Debug, Serialize)]
struct ArcadeResponse {
    id: i32,
    name: String,
    description: String,
    location: String,
    latitude: f64,
    longitude: f64,
    games: Vec<GameOnArcade>,
}

impl ArcadeResponse {
    fn new(arcade: Arcade, games: Vec<GameOnArcade>) -> Self {
        Self {
            id: arcade.id,
            name: arcade.name,
            description: arcade.description,
            location: arcade.location,
            latitude: arcade.latitude,
            longitude: arcade.longitude,
            games,
        }
    }
}

async fn list_arcades(State(state): State<AppState>) -> ApiResult<Json<Vec<ArcadeResponse>>> {
    let arcades = db::arcades::list_arcades(&state.pool).await?;

    let mut result = Vec::with_capacity(arcades.len());
    for arcade in arcades {
        let games = db::arcades::games_on_arcade(&state.pool, arcade.id).await?;
        result.push(ArcadeResponse::new(arcade, games));
    }

    Ok(Json(result))
}

async fn get_arcade(
    State(state): State<AppState>,
    Path(arcade_id): Path<i32>,
) -> ApiResult<Json<ArcadeResponse>> {
    let arcade = db::arcades::get_arcade_by_id(&state.pool, arcade_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Arcade"))?;

    let games = db::arcades::games_on_arcade(&state.pool, arcade.id).await?;
    Ok(Json(ArcadeResponse::new(arcade, games)))
}

#[derive(Debug, Serialize)]
struct QueueItemResponse {
    id: i32,
    player_id: i32,
    player_username: String,
    player2_id: Option<i32>,
    player2_username: Option<String>,
    game_id: i32,
    game_name: String,
    unlock_code: String,
    position: i64,
}

/// FIFO waiting list for the terminal itself; positions are the 1-based
/// index in creation order, recomputed on every poll.
async fn arcade_queue(
    State(state): State<AppState>,
    _key: ArcadeKey,
    Path(arcade_id): Path<i32>,
) -> ApiResult<Json<Vec<QueueItemResponse>>> {
    db::arcades::get_arcade_by_id(&state.pool, arcade_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Arcade"))?;

    let entries = db::reservations::waiting_queue(&state.pool, arcade_id).await?;

    Ok(Json(
        entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| QueueItemResponse {
                id: entry.id,
                player_id: entry.player_id,
                player_username: entry.player_username,
                player2_id: entry.player2_id,
                player2_username: entry.player2_username,
                game_id: entry.game_id,
                game_name: entry.game_name,
                unlock_code: entry.unlock_code,
                position: idx as i64 + 1,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
struct SlotConfig {
    slot: i32,
    game_id: i32,
    game_name: String,
    min_players: i32,
    max_players: i32,
}

#[derive(Debug, Serialize)]
struct ArcadeConfigResponse {
    arcade_id: i32,
    arcade_name: String,
    games: Vec<SlotConfig>,
}

async fn arcade_config(
    State(state): State<AppState>,
    _key: ArcadeKey,
    Path(arcade_id): Path<i32>,
) -> ApiResult<Json<ArcadeConfigResponse>> {
    let arcade = db::arcades::get_arcade_by_id(&state.pool, arcade_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Arcade"))?;

    let games = db::arcades::games_on_arcade(&state.pool, arcade.id).await?;

    Ok(Json(ArcadeConfigResponse {
        arcade_id: arcade.id,
        arcade_name: arcade.name,
        games: games
            .into_iter()
            .map(|g| SlotConfig {
                slot: g.slot_number,
                game_id: g.id,
                game_name: g.name,
                min_players: g.min_players,
                max_players: g.max_players,
            })
            .collect(),
    }))
}
