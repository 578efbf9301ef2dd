use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A priced bundle of tickets users can buy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketOffer {
    pub id: i32,
    pub name: String,
    pub tickets_amount: i32,
    pub price_euros: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketPurchase {
    pub id: i32,
    pub user_id: i32,
    pub offer_id: i32,
    pub tickets_received: i32,
    pub amount_paid: f64,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Purchase joined with its offer name for history listings.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseDetail {
    pub id: i32,
    pub offer_name: String,
    pub tickets_received: i32,
    pub amount_paid: f64,
    pub created_at: DateTime<Utc>,
}
