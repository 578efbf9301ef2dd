use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::Game;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_games))
        .route("/{game_id}", get(get_game))
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub min_players: i32,
    pub max_players: i32,
    pub ticket_cost: i32,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            name: game.name,
            description: game.description,
            min_players: game.min_players,
            max_players: game.max_players,
            ticket_cost: game.ticket_cost,
        }
    }
}

async fn list_games(State(state): State<AppState>) -> ApiResult<Json<Vec<GameResponse>>> {
    let games = db::games::list_games(&state.pool, false).await?;
    Ok(Json(games.into_iter().map(Into::into).collect()))
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<i32>,
) -> ApiResult<Json<GameResponse>> {
    let game = db::games::get_game_by_id(&state.pool, game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game"))?;

    Ok(Json(game.into()))
}
