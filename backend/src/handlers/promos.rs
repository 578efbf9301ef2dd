use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::models::{PromoDenial, normalize_code};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/use", post(use_promo_code))
        .route("/history", get(history))
        .route("/available", get(available))
}

#[derive(Debug, Deserialize)]
struct UsePromoCodeRequest {
    code: String,
}

#[derive(Debug, Serialize)]
struct UsePromoCodeResponse {
    tickets_received: i32,
    new_balance: i32,
    message: String,
}

/// Guarded redemption. The whole guard chain runs under a row lock on the
/// code (and on the user) so concurrent attempts cannot oversubscribe a
/// limited code or double-credit a balance.
async fn use_promo_code(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UsePromoCodeRequest>,
) -> ApiResult<Json<UsePromoCodeResponse>> {
    let code = normalize_code(&body.code);

    let mut tx = state.pool.begin().await?;

    let promo = db::promos::lock_code_by_value(&mut tx, &code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid promo code".into()))?;

    let now = Utc::now();
    if let Some(denial) = promo.validity_denial(now) {
        return Err(ApiError::BadRequest(denial.message().into()));
    }

    if promo.is_single_use_per_user
        && db::promos::user_has_used(&mut *tx, user.id, promo.id).await?
    {
        return Err(ApiError::BadRequest(
            PromoDenial::AlreadyUsedByUser.message().into(),
        ));
    }

    if let Some(denial) = promo.usage_denial() {
        return Err(ApiError::BadRequest(denial.message().into()));
    }

    db::users::lock_user(&mut tx, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    db::promos::insert_use(&mut tx, user.id, promo.id, promo.tickets_reward).await?;
    db::promos::increment_uses(&mut tx, promo.id).await?;
    let new_balance = db::users::credit_tickets(&mut tx, user.id, promo.tickets_reward).await?;

    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        promo_id = promo.id,
        reward = promo.tickets_reward,
        "promo code redeemed"
    );

    Ok(Json(UsePromoCodeResponse {
        tickets_received: promo.tickets_reward,
        new_balance,
        message: format!(
            "Promo code redeemed! You received {} tickets.",
            promo.tickets_reward
        ),
    }))
}

#[derive(Debug, Serialize)]
struct PromoHistoryItem {
    id: i32,
    code: String,
    tickets_received: i32,
    used_at: DateTime<Utc>,
}

async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<PromoHistoryItem>>> {
    let uses = db::promos::history_for_user(&state.pool, user.id).await?;
    Ok(Json(
        uses.into_iter()
            .map(|u| PromoHistoryItem {
                id: u.id,
                code: u.code,
                tickets_received: u.tickets_received,
                used_at: u.created_at,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
struct AvailablePromoResponse {
    code: String,
    tickets_reward: i32,
    valid_until: Option<DateTime<Utc>>,
}

/// Codes the caller could redeem right now.
async fn available(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<AvailablePromoResponse>>> {
    let promos = db::promos::available_for_user(&state.pool, user.id, Utc::now()).await?;
    Ok(Json(
        promos
            .into_iter()
            .map(|p| AvailablePromoResponse {
                code: p.code,
                tickets_reward: p.tickets_reward,
                valid_until: p.valid_until,
            })
            .collect(),
    ))
}
