use crate::models::{QueueEntry, Reservation, ReservationDetail, ReservationStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

const DETAIL_SELECT: &str = r#"
    SELECT r.id, r.player_id, r.player2_id, r.arcade_id, a.name AS arcade_name,
           g.name AS game_name, p1.username AS player_username,
           p2.username AS player2_username, r.unlock_code, r.status,
           r.tickets_used, r.created_at
    FROM reservations r
    JOIN arcades a ON a.id = r.arcade_id
    JOIN games g ON g.id = r.game_id
    JOIN users p1 ON p1.id = r.player_id
    LEFT JOIN users p2 ON p2.id = r.player2_id
"#;

pub async fn insert_reservation(
    conn: &mut PgConnection,
    player_id: i32,
    player2_id: Option<i32>,
    arcade_id: i32,
    game_id: i32,
    unlock_code: &str,
    tickets_used: i32,
) -> Result<Reservation> {
    let reservation = sqlx::query_as::<_, Reservation>(
        r#"
        INSERT INTO reservations (player_id, player2_id, arcade_id, game_id, unlock_code, tickets_used)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(player_id)
    .bind(player2_id)
    .bind(arcade_id)
    .bind(game_id)
    .bind(unlock_code)
    .bind(tickets_used)
    .fetch_one(conn)
    .await?;

    Ok(reservation)
}

/// 1-based FIFO rank: how many non-deleted waiting reservations on the
/// terminal were created at or before the given instant. Recomputed on
/// every read, never stored.
pub async fn queue_position(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let position = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE arcade_id = $1 AND status = 'waiting'
          AND created_at <= $2 AND is_deleted = FALSE
        "#,
    )
    .bind(arcade_id)
    .bind(created_at)
    .fetch_one(ex)
    .await?;

    Ok(position)
}

/// Reservation visible to `user_id` as either player.
pub async fn detail_for_user(
    ex: impl PgExecutor<'_>,
    reservation_id: i32,
    user_id: i32,
) -> Result<Option<ReservationDetail>> {
    let sql = format!(
        "{DETAIL_SELECT}
         WHERE r.id = $1 AND (r.player_id = $2 OR r.player2_id = $2) AND r.is_deleted = FALSE"
    );
    let detail = sqlx::query_as::<_, ReservationDetail>(&sql)
        .bind(reservation_id)
        .bind(user_id)
        .fetch_optional(ex)
        .await?;

    Ok(detail)
}

pub async fn list_for_user(
    ex: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Vec<ReservationDetail>> {
    let sql = format!(
        "{DETAIL_SELECT}
         WHERE (r.player_id = $1 OR r.player2_id = $1) AND r.is_deleted = FALSE
         ORDER BY r.created_at DESC"
    );
    let details = sqlx::query_as::<_, ReservationDetail>(&sql)
        .bind(user_id)
        .fetch_all(ex)
        .await?;

    Ok(details)
}

/// Row-locked fetch restricted to the primary player, for cancellation.
pub async fn lock_owned_reservation(
    conn: &mut PgConnection,
    reservation_id: i32,
    player_id: i32,
) -> Result<Option<Reservation>> {
    let reservation = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT * FROM reservations
        WHERE id = $1 AND player_id = $2 AND is_deleted = FALSE
        FOR UPDATE
        "#,
    )
    .bind(reservation_id)
    .bind(player_id)
    .fetch_optional(conn)
    .await?;

    Ok(reservation)
}

pub async fn set_status(
    ex: impl PgExecutor<'_>,
    reservation_id: i32,
    status: ReservationStatus,
) -> Result<()> {
    sqlx::query("UPDATE reservations SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(reservation_id)
        .bind(status)
        .execute(ex)
        .await?;

    Ok(())
}

/// FIFO waiting list of a terminal, oldest first.
pub async fn waiting_queue(ex: impl PgExecutor<'_>, arcade_id: i32) -> Result<Vec<QueueEntry>> {
    let entries = sqlx::query_as::<_, QueueEntry>(
        r#"
        SELECT r.id, r.player_id, p1.username AS player_username,
               r.player2_id, p2.username AS player2_username,
               r.game_id, g.name AS game_name, r.unlock_code
        FROM reservations r
        JOIN users p1 ON p1.id = r.player_id
        LEFT JOIN users p2 ON p2.id = r.player2_id
        JOIN games g ON g.id = r.game_id
        WHERE r.arcade_id = $1 AND r.status = 'waiting' AND r.is_deleted = FALSE
        ORDER BY r.created_at ASC
        "#,
    )
    .bind(arcade_id)
    .fetch_all(ex)
    .await?;

    Ok(entries)
}

pub async fn count_active_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE (player_id = $1 OR player2_id = $1)
          AND status IN ('waiting', 'playing')
          AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_active_for_arcade(ex: impl PgExecutor<'_>, arcade_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE arcade_id = $1 AND status IN ('waiting', 'playing') AND is_deleted = FALSE
        "#,
    )
    .bind(arcade_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_active_for_game(ex: impl PgExecutor<'_>, game_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE game_id = $1 AND status IN ('waiting', 'playing') AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

/// Completed or cancelled sessions kept for history after a user deletion.
pub async fn count_settled_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE (player_id = $1 OR player2_id = $1)
          AND status IN ('completed', 'cancelled')
          AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

/// Row-locked active reservations of a user, for admin force-cancel.
pub async fn lock_active_for_user(
    conn: &mut PgConnection,
    user_id: i32,
) -> Result<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT * FROM reservations
        WHERE (player_id = $1 OR player2_id = $1)
          AND status IN ('waiting', 'playing')
          AND is_deleted = FALSE
        ORDER BY created_at
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    Ok(reservations)
}
