use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{UNLOCK_CODE_MAX, UNLOCK_CODE_MIN};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::handlers::Message;
use crate::models::{ReservationDetail, ReservationStatus};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_reservation).get(my_reservations))
        .route(
            "/{reservation_id}",
            get(get_reservation).delete(cancel_reservation),
        )
}

#[derive(Debug, Deserialize)]
struct CreateReservationRequest {
    arcade_id: i32,
    game_id: i32,
    player2_id: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ReservationResponse {
    id: i32,
    unlock_code: String,
    status: ReservationStatus,
    arcade_name: String,
    game_name: String,
    player_username: String,
    player2_username: Option<String>,
    tickets_used: i32,
    position_in_queue: Option<i64>,
    created_at: DateTime<Utc>,
}

impl ReservationResponse {
    fn from_detail(detail: ReservationDetail, position_in_queue: Option<i64>) -> Self {
        Self {
            id: detail.id,
            unlock_code: detail.unlock_code,
            status: detail.status,
            arcade_name: detail.arcade_name,
            game_name: detail.game_name,
            player_username: detail.player_username,
            player2_username: detail.player2_username,
            tickets_used: detail.tickets_used,
            position_in_queue,
            created_at: detail.created_at,
        }
    }
}

/// Uniform random keypad digit. Collisions between concurrent reservations
/// on the same terminal are acceptable.
fn generate_unlock_code() -> String {
    rand::rng()
        .random_range(UNLOCK_CODE_MIN..=UNLOCK_CODE_MAX)
        .to_string()
}

/// Books a session: validates arcade, slot assignment and player counts,
/// then debits the primary player and persists the reservation in one
/// transaction. The primary player alone pays; player 2 is never charged.
async fn create_reservation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateReservationRequest>,
) -> ApiResult<Json<ReservationResponse>> {
    let arcade = db::arcades::get_arcade_by_id(&state.pool, body.arcade_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Arcade"))?;

    db::arcades::live_assignment(&state.pool, body.arcade_id, body.game_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Game not available on this arcade".into()))?;

    let game = db::games::get_game_by_id(&state.pool, body.game_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game"))?;

    let player_count = if body.player2_id.is_some() { 2 } else { 1 };
    if !game.allows_player_count(player_count) {
        return Err(ApiError::BadRequest(format!(
            "This game requires between {} and {} players",
            game.min_players, game.max_players
        )));
    }

    let player2 = match body.player2_id {
        Some(player2_id) => {
            if player2_id == user.id {
                return Err(ApiError::BadRequest(
                    "You cannot play against yourself".into(),
                ));
            }
            Some(
                db::users::get_user_by_id(&state.pool, player2_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Player 2"))?,
            )
        }
        None => None,
    };

    let unlock_code = generate_unlock_code();

    let mut tx = state.pool.begin().await?;

    // Balance is re-read under a row lock; the extractor's snapshot may be
    // stale by the time we charge.
    let locked = db::users::lock_user(&mut tx, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if locked.tickets_balance < game.ticket_cost {
        return Err(ApiError::BadRequest("Insufficient tickets".into()));
    }

    let reservation = db::reservations::insert_reservation(
        &mut tx,
        user.id,
        body.player2_id,
        body.arcade_id,
        body.game_id,
        &unlock_code,
        game.ticket_cost,
    )
    .await?;

    db::users::debit_tickets(&mut tx, user.id, game.ticket_cost).await?;
    tx.commit().await?;

    let position =
        db::reservations::queue_position(&state.pool, body.arcade_id, reservation.created_at)
            .await?;

    tracing::info!(
        reservation_id = reservation.id,
        user_id = user.id,
        arcade_id = body.arcade_id,
        game_id = body.game_id,
        "reservation created"
    );

    Ok(Json(ReservationResponse {
        id: reservation.id,
        unlock_code: reservation.unlock_code,
        status: reservation.status,
        arcade_name: arcade.name,
        game_name: game.name,
        player_username: user.username,
        player2_username: player2.map(|p| p.username),
        tickets_used: reservation.tickets_used,
        position_in_queue: Some(position),
        created_at: reservation.created_at,
    }))
}

async fn my_reservations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ReservationResponse>>> {
    let details = db::reservations::list_for_user(&state.pool, user.id).await?;

    let mut result = Vec::with_capacity(details.len());
    for detail in details {
        let position = waiting_position(&state, &detail).await?;
        result.push(ReservationResponse::from_detail(detail, position));
    }

    Ok(Json(result))
}

async fn get_reservation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(reservation_id): Path<i32>,
) -> ApiResult<Json<ReservationResponse>> {
    let detail = db::reservations::detail_for_user(&state.pool, reservation_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation"))?;

    let position = waiting_position(&state, &detail).await?;
    Ok(Json(ReservationResponse::from_detail(detail, position)))
}

async fn waiting_position(
    state: &AppState,
    detail: &ReservationDetail,
) -> ApiResult<Option<i64>> {
    if detail.status != ReservationStatus::Waiting {
        return Ok(None);
    }
    let position =
        db::reservations::queue_position(&state.pool, detail.arcade_id, detail.created_at).await?;
    Ok(Some(position))
}

/// Cancels a waiting reservation and refunds the full charge to the primary
/// player. Only the primary player may cancel.
async fn cancel_reservation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(reservation_id): Path<i32>,
) -> ApiResult<Json<Message>> {
    let mut tx = state.pool.begin().await?;

    db::users::lock_user(&mut tx, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let reservation = db::reservations::lock_owned_reservation(&mut tx, reservation_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation"))?;

    if !reservation.status.is_cancellable() {
        return Err(ApiError::BadRequest(
            "Only waiting reservations can be cancelled".into(),
        ));
    }

    db::reservations::set_status(&mut *tx, reservation.id, ReservationStatus::Cancelled).await?;
    db::users::credit_tickets(&mut tx, user.id, reservation.tickets_used).await?;
    tx.commit().await?;

    tracing::info!(
        reservation_id,
        user_id = user.id,
        refunded = reservation.tickets_used,
        "reservation cancelled"
    );

    Ok(Json(Message::new("Reservation cancelled, tickets refunded")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::is_valid_unlock_code;

    #[test]
    fn unlock_codes_stay_on_the_keypad() {
        for _ in 0..200 {
            let code = generate_unlock_code();
            assert!(is_valid_unlock_code(&code), "bad unlock code {code}");
        }
    }
}
