use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::models::TicketOffer;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers))
        .route("/purchase", post(purchase))
        .route("/balance", get(balance))
        .route("/history", get(history))
}

#[derive(Debug, Serialize)]
struct TicketOfferResponse {
    id: i32,
    name: String,
    tickets_amount: i32,
    price_euros: f64,
}

impl From<TicketOffer> for TicketOfferResponse {
    fn from(offer: TicketOffer) -> Self {
        Self {
            id: offer.id,
            name: offer.name,
            tickets_amount: offer.tickets_amount,
            price_euros: offer.price_euros,
        }
    }
}

async fn list_offers(State(state): State<AppState>) -> ApiResult<Json<Vec<TicketOfferResponse>>> {
    let offers = db::tickets::list_offers(&state.pool).await?;
    Ok(Json(offers.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct PurchaseRequest {
    offer_id: i32,
}

#[derive(Debug, Serialize)]
struct PurchaseResponse {
    tickets_received: i32,
    amount_paid: f64,
    new_balance: i32,
}

/// Mock checkout: payment always succeeds and the bundle is credited in the
/// same transaction that records the purchase.
async fn purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<PurchaseRequest>,
) -> ApiResult<Json<PurchaseResponse>> {
    let offer = db::tickets::get_offer_by_id(&state.pool, body.offer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket offer"))?;

    let mut tx = state.pool.begin().await?;

    db::users::lock_user(&mut tx, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let payment_reference = format!("mock_payment_{}", Uuid::new_v4());
    db::tickets::insert_purchase(
        &mut tx,
        user.id,
        offer.id,
        offer.tickets_amount,
        offer.price_euros,
        &payment_reference,
    )
    .await?;

    let new_balance = db::users::credit_tickets(&mut tx, user.id, offer.tickets_amount).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        offer_id = offer.id,
        tickets = offer.tickets_amount,
        "ticket bundle purchased"
    );

    Ok(Json(PurchaseResponse {
        tickets_received: offer.tickets_amount,
        amount_paid: offer.price_euros,
        new_balance,
    }))
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    balance: i32,
}

async fn balance(CurrentUser(user): CurrentUser) -> Json<BalanceResponse> {
    Json(BalanceResponse {
        balance: user.tickets_balance,
    })
}

#[derive(Debug, Serialize)]
struct PurchaseHistoryItem {
    id: i32,
    offer_name: String,
    tickets_received: i32,
    amount_paid: f64,
    purchased_at: DateTime<Utc>,
}

async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<PurchaseHistoryItem>>> {
    let purchases = db::tickets::history_for_user(&state.pool, user.id).await?;
    Ok(Json(
        purchases
            .into_iter()
            .map(|p| PurchaseHistoryItem {
                id: p.id,
                offer_name: p.offer_name,
                tickets_received: p.tickets_received,
                amount_paid: p.amount_paid,
                purchased_at: p.created_at,
            })
            .collect(),
    ))
}
