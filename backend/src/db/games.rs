use crate::models::reservations::ReservationStatus;
use crate::models::{ArcadePlacement, ArcadePopularity, Game, GamePatch, NewGame};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

pub async fn create_game(ex: impl PgExecutor<'_>, new: &NewGame) -> Result<Game> {
    let game = sqlx::query_as::<_, Game>(
        r#"
        INSERT INTO games (name, description, min_players, max_players, ticket_cost)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.min_players)
    .bind(new.max_players)
    .bind(new.ticket_cost)
    .fetch_one(ex)
    .await?;

    Ok(game)
}

pub async fn get_game_by_id(ex: impl PgExecutor<'_>, game_id: i32) -> Result<Option<Game>> {
    let game =
        sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1 AND is_deleted = FALSE")
            .bind(game_id)
            .fetch_optional(ex)
            .await?;

    Ok(game)
}

pub async fn get_game_by_id_any(ex: impl PgExecutor<'_>, game_id: i32) -> Result<Option<Game>> {
    let game = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1")
        .bind(game_id)
        .fetch_optional(ex)
        .await?;

    Ok(game)
}

pub async fn list_games(ex: impl PgExecutor<'_>, include_deleted: bool) -> Result<Vec<Game>> {
    let games = sqlx::query_as::<_, Game>(
        r#"
        SELECT * FROM games
        WHERE $1::boolean OR is_deleted = FALSE
        ORDER BY created_at DESC
        "#,
    )
    .bind(include_deleted)
    .fetch_all(ex)
    .await?;

    Ok(games)
}

pub async fn list_deleted_games(ex: impl PgExecutor<'_>) -> Result<Vec<Game>> {
    let games = sqlx::query_as::<_, Game>(
        "SELECT * FROM games WHERE is_deleted = TRUE ORDER BY deleted_at DESC",
    )
    .fetch_all(ex)
    .await?;

    Ok(games)
}

pub async fn name_taken(
    ex: impl PgExecutor<'_>,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM games
            WHERE name ILIKE $1 AND is_deleted = FALSE AND ($2::int4 IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name.trim())
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;

    Ok(taken)
}

pub async fn apply_patch(ex: impl PgExecutor<'_>, game_id: i32, patch: &GamePatch) -> Result<Game> {
    let game = sqlx::query_as::<_, Game>(
        r#"
        UPDATE games
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            min_players = COALESCE($4, min_players),
            max_players = COALESCE($5, max_players),
            ticket_cost = COALESCE($6, ticket_cost),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(game_id)
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(patch.min_players)
    .bind(patch.max_players)
    .bind(patch.ticket_cost)
    .fetch_one(ex)
    .await?;

    Ok(game)
}

pub async fn soft_delete_game(
    conn: &mut PgConnection,
    game_id: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE games SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(game_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn restore_game(ex: impl PgExecutor<'_>, game_id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE games SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(game_id)
    .execute(ex)
    .await?;

    Ok(())
}

pub async fn soft_delete_assignments_for_game(
    conn: &mut PgConnection,
    game_id: i32,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE arcade_games
        SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW()
        WHERE game_id = $1 AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn arcades_for_game(
    ex: impl PgExecutor<'_>,
    game_id: i32,
) -> Result<Vec<ArcadePlacement>> {
    let placements = sqlx::query_as::<_, ArcadePlacement>(
        r#"
        SELECT a.id AS arcade_id, a.name AS arcade_name, a.location AS arcade_location,
               ag.slot_number, ag.created_at AS assigned_at
        FROM arcade_games ag
        JOIN arcades a ON a.id = ag.arcade_id
        WHERE ag.game_id = $1 AND ag.is_deleted = FALSE AND a.is_deleted = FALSE
        ORDER BY a.name, ag.slot_number
        "#,
    )
    .bind(game_id)
    .fetch_all(ex)
    .await?;

    Ok(placements)
}

pub async fn count_active_games(ex: impl PgExecutor<'_>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM games WHERE is_deleted = FALSE")
        .fetch_one(ex)
        .await?;

    Ok(count)
}

// Stats-window queries below feed the admin game report.

pub async fn count_reservations_since(
    ex: impl PgExecutor<'_>,
    game_id: i32,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE game_id = $1 AND created_at >= $2 AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .bind(since)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_reservations_with_status_since(
    ex: impl PgExecutor<'_>,
    game_id: i32,
    status: ReservationStatus,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE game_id = $1 AND status = $2 AND created_at >= $3 AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .bind(status)
    .bind(since)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_scores_since(
    ex: impl PgExecutor<'_>,
    game_id: i32,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM scores
        WHERE game_id = $1 AND created_at >= $2 AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .bind(since)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn average_scores_since(
    ex: impl PgExecutor<'_>,
    game_id: i32,
    since: DateTime<Utc>,
) -> Result<(f64, f64)> {
    let row = sqlx::query_as::<_, (Option<f64>, Option<f64>)>(
        r#"
        SELECT AVG(score1)::float8, AVG(score2)::float8
        FROM scores
        WHERE game_id = $1 AND created_at >= $2 AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .bind(since)
    .fetch_one(ex)
    .await?;

    Ok((row.0.unwrap_or(0.0), row.1.unwrap_or(0.0)))
}

pub async fn tickets_spent_since(
    ex: impl PgExecutor<'_>,
    game_id: i32,
    since: DateTime<Utc>,
) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(tickets_used), 0) FROM reservations
        WHERE game_id = $1 AND created_at >= $2 AND is_deleted = FALSE
        "#,
    )
    .bind(game_id)
    .bind(since)
    .fetch_one(ex)
    .await?;

    Ok(total)
}

pub async fn arcade_popularity_since(
    ex: impl PgExecutor<'_>,
    game_id: i32,
    since: DateTime<Utc>,
) -> Result<Vec<ArcadePopularity>> {
    let rows = sqlx::query_as::<_, ArcadePopularity>(
        r#"
        SELECT a.id AS arcade_id, a.name AS arcade_name, COUNT(r.id) AS reservations
        FROM reservations r
        JOIN arcades a ON a.id = r.arcade_id
        WHERE r.game_id = $1 AND r.created_at >= $2 AND r.is_deleted = FALSE
        GROUP BY a.id, a.name
        ORDER BY reservations DESC
        "#,
    )
    .bind(game_id)
    .bind(since)
    .fetch_all(ex)
    .await?;

    Ok(rows)
}
