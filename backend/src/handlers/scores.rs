use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::constants::{SCORES_DEFAULT_LIMIT, SCORES_MAX_LIMIT};
use crate::db;
use crate::db::scores::ScoreFilter;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ArcadeKey, CurrentUser};
use crate::models::ScoreDetail;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_score).get(list_scores))
        .route("/my-stats", get(my_stats))
}

#[derive(Debug, Deserialize)]
struct CreateScoreRequest {
    player1_id: i32,
    player2_id: Option<i32>,
    game_id: i32,
    arcade_id: i32,
    score1: i32,
    score2: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ScoreResponse {
    id: i32,
    player1_username: String,
    player2_username: Option<String>,
    game_name: String,
    arcade_name: String,
    score1: i32,
    score2: Option<i32>,
    /// Absent for solo sessions and draws.
    winner_username: Option<String>,
    is_single_player: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ScoreDetail> for ScoreResponse {
    fn from(detail: ScoreDetail) -> Self {
        let winner_username = detail.winner_username().map(str::to_owned);
        Self {
            id: detail.id,
            is_single_player: detail.is_single_player(),
            winner_username,
            player1_username: detail.player1_username,
            player2_username: detail.player2_username,
            game_name: detail.game_name,
            arcade_name: detail.arcade_name,
            score1: detail.score1,
            score2: detail.score2,
            created_at: detail.created_at,
        }
    }
}

/// Records a finished session, reported by the terminal itself.
async fn create_score(
    State(state): State<AppState>,
    _key: ArcadeKey,
    Json(body): Json<CreateScoreRequest>,
) -> ApiResult<Json<ScoreResponse>> {
    db::users::get_user_by_id(&state.pool, body.player1_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Player 1"))?;

    if let Some(player2_id) = body.player2_id {
        if player2_id == body.player1_id {
            return Err(ApiError::BadRequest(
                "The two players cannot be the same".into(),
            ));
        }
        db::users::get_user_by_id(&state.pool, player2_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Player 2"))?;
    }

    let game = db::games::get_game_by_id(&state.pool, body.game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game"))?;

    db::arcades::get_arcade_by_id(&state.pool, body.arcade_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Arcade"))?;

    match body.player2_id {
        None if game.min_players > 1 => {
            return Err(ApiError::BadRequest(format!(
                "This game requires at least {} players",
                game.min_players
            )));
        }
        Some(_) if game.max_players < 2 => {
            return Err(ApiError::BadRequest(
                "This game does not support 2 players".into(),
            ));
        }
        Some(_) if body.score2.is_none() => {
            return Err(ApiError::BadRequest(
                "A versus session needs a score for each player".into(),
            ));
        }
        _ => {}
    }

    let score = db::scores::insert_score(
        &state.pool,
        body.player1_id,
        body.player2_id,
        body.game_id,
        body.arcade_id,
        body.score1,
        body.score2,
    )
    .await?;

    let detail = db::scores::get_score_detail(&state.pool, score.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Score"))?;

    tracing::info!(score_id = score.id, game_id = body.game_id, "score recorded");
    Ok(Json(detail.into()))
}

#[derive(Debug, Deserialize)]
struct ScoreListParams {
    game_id: Option<i32>,
    arcade_id: Option<i32>,
    #[serde(default)]
    friends_only: bool,
    #[serde(default)]
    single_player_only: bool,
    limit: Option<i64>,
}

async fn list_scores(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ScoreListParams>,
) -> ApiResult<Json<Vec<ScoreResponse>>> {
    let friend_ids = if params.friends_only {
        let ids = db::friends::accepted_friend_ids(&state.pool, user.id).await?;
        if ids.is_empty() {
            return Ok(Json(Vec::new()));
        }
        ids
    } else {
        Vec::new()
    };

    let filter = ScoreFilter {
        game_id: params.game_id,
        arcade_id: params.arcade_id,
        single_player_only: params.single_player_only,
        friends_only: params.friends_only,
        limit: params
            .limit
            .unwrap_or(SCORES_DEFAULT_LIMIT)
            .clamp(1, SCORES_MAX_LIMIT),
    };

    let scores = db::scores::list_scores(&state.pool, user.id, &filter, &friend_ids).await?;
    Ok(Json(scores.into_iter().map(Into::into).collect()))
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PlayerStats {
    pub total_games: i64,
    pub solo_games: i64,
    pub multiplayer_games: i64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub win_rate: f64,
}

/// Win rate is over multiplayer games only; solo sessions have no outcome.
pub(crate) fn compute_stats(total: i64, solo: i64, wins: i64, losses: i64) -> PlayerStats {
    let multiplayer = total - solo;
    let draws = multiplayer - wins - losses;
    let win_rate = if multiplayer > 0 {
        let rate = wins as f64 / multiplayer as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    };

    PlayerStats {
        total_games: total,
        solo_games: solo,
        multiplayer_games: multiplayer,
        wins,
        losses,
        draws,
        win_rate,
    }
}

async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PlayerStats>> {
    let total = db::scores::count_total_for_user(&state.pool, user.id).await?;
    let solo = db::scores::count_solo_for_user(&state.pool, user.id).await?;
    let wins = db::scores::count_wins_for_user(&state.pool, user.id).await?;
    let losses = db::scores::count_losses_for_user(&state.pool, user.id).await?;

    Ok(Json(compute_stats(total, solo, wins, losses)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_split_solo_and_multiplayer() {
        let stats = compute_stats(10, 4, 3, 2);
        assert_eq!(stats.multiplayer_games, 6);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.win_rate, 50.0);
    }

    #[test]
    fn stats_with_no_multiplayer_games_have_zero_win_rate() {
        let stats = compute_stats(5, 5, 0, 0);
        assert_eq!(stats.multiplayer_games, 0);
        assert_eq!(stats.draws, 0);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn win_rate_is_rounded_to_two_decimals() {
        let stats = compute_stats(3, 0, 1, 1);
        assert_eq!(stats.win_rate, 33.33);
    }
}
