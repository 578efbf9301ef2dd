use crate::models::{PurchaseDetail, TicketOffer, TicketPurchase};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

pub async fn list_offers(ex: impl PgExecutor<'_>) -> Result<Vec<TicketOffer>> {
    let offers = sqlx::query_as::<_, TicketOffer>(
        "SELECT * FROM ticket_offers WHERE is_deleted = FALSE ORDER BY tickets_amount",
    )
    .fetch_all(ex)
    .await?;

    Ok(offers)
}

pub async fn get_offer_by_id(ex: impl PgExecutor<'_>, offer_id: i32) -> Result<Option<TicketOffer>> {
    let offer = sqlx::query_as::<_, TicketOffer>(
        "SELECT * FROM ticket_offers WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(offer_id)
    .fetch_optional(ex)
    .await?;

    Ok(offer)
}

pub async fn insert_purchase(
    conn: &mut PgConnection,
    user_id: i32,
    offer_id: i32,
    tickets_received: i32,
    amount_paid: f64,
    payment_reference: &str,
) -> Result<TicketPurchase> {
    let purchase = sqlx::query_as::<_, TicketPurchase>(
        r#"
        INSERT INTO ticket_purchases (user_id, offer_id, tickets_received, amount_paid, payment_reference)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(offer_id)
    .bind(tickets_received)
    .bind(amount_paid)
    .bind(payment_reference)
    .fetch_one(conn)
    .await?;

    Ok(purchase)
}

pub async fn history_for_user(
    ex: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Vec<PurchaseDetail>> {
    let purchases = sqlx::query_as::<_, PurchaseDetail>(
        r#"
        SELECT tp.id, o.name AS offer_name, tp.tickets_received, tp.amount_paid, tp.created_at
        FROM ticket_purchases tp
        JOIN ticket_offers o ON o.id = tp.offer_id
        WHERE tp.user_id = $1 AND tp.is_deleted = FALSE
        ORDER BY tp.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(ex)
    .await?;

    Ok(purchases)
}

pub async fn soft_delete_purchases_for_user(
    conn: &mut PgConnection,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE ticket_purchases
        SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW()
        WHERE user_id = $1 AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_purchases_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM ticket_purchases WHERE user_id = $1 AND is_deleted = FALSE",
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}
