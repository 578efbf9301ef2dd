use crate::models::{Arcade, ArcadeGame, GameOnArcade, NewArcade};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

pub async fn create_arcade(
    ex: impl PgExecutor<'_>,
    new: &NewArcade,
    api_key: &str,
) -> Result<Arcade> {
    let arcade = sqlx::query_as::<_, Arcade>(
        r#"
        INSERT INTO arcades (name, description, api_key, location, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(api_key)
    .bind(&new.location)
    .bind(new.latitude)
    .bind(new.longitude)
    .fetch_one(ex)
    .await?;

    Ok(arcade)
}

pub async fn get_arcade_by_id(ex: impl PgExecutor<'_>, arcade_id: i32) -> Result<Option<Arcade>> {
    let arcade = sqlx::query_as::<_, Arcade>(
        "SELECT * FROM arcades WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(arcade_id)
    .fetch_optional(ex)
    .await?;

    Ok(arcade)
}

pub async fn get_arcade_by_id_any(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
) -> Result<Option<Arcade>> {
    let arcade = sqlx::query_as::<_, Arcade>("SELECT * FROM arcades WHERE id = $1")
        .bind(arcade_id)
        .fetch_optional(ex)
        .await?;

    Ok(arcade)
}

pub async fn list_arcades(ex: impl PgExecutor<'_>) -> Result<Vec<Arcade>> {
    let arcades = sqlx::query_as::<_, Arcade>(
        "SELECT * FROM arcades WHERE is_deleted = FALSE ORDER BY name",
    )
    .fetch_all(ex)
    .await?;

    Ok(arcades)
}

pub async fn list_deleted_arcades(ex: impl PgExecutor<'_>) -> Result<Vec<Arcade>> {
    let arcades = sqlx::query_as::<_, Arcade>(
        "SELECT * FROM arcades WHERE is_deleted = TRUE ORDER BY deleted_at DESC",
    )
    .fetch_all(ex)
    .await?;

    Ok(arcades)
}

/// Key uniqueness is checked across deleted rows too, since a restored
/// terminal comes back with its old key.
pub async fn api_key_exists(ex: impl PgExecutor<'_>, api_key: &str) -> Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM arcades WHERE api_key = $1)")
            .bind(api_key)
            .fetch_one(ex)
            .await?;

    Ok(exists)
}

pub async fn api_key_taken_by_other(
    ex: impl PgExecutor<'_>,
    api_key: &str,
    arcade_id: i32,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM arcades
            WHERE api_key = $1 AND is_deleted = FALSE AND id <> $2
        )
        "#,
    )
    .bind(api_key)
    .bind(arcade_id)
    .fetch_one(ex)
    .await?;

    Ok(taken)
}

pub async fn set_api_key(ex: impl PgExecutor<'_>, arcade_id: i32, api_key: &str) -> Result<()> {
    sqlx::query("UPDATE arcades SET api_key = $2, updated_at = NOW() WHERE id = $1")
        .bind(arcade_id)
        .bind(api_key)
        .execute(ex)
        .await?;

    Ok(())
}

pub async fn games_on_arcade(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
) -> Result<Vec<GameOnArcade>> {
    let games = sqlx::query_as::<_, GameOnArcade>(
        r#"
        SELECT g.id, g.name, g.description, g.min_players, g.max_players,
               g.ticket_cost, ag.slot_number
        FROM arcade_games ag
        JOIN games g ON g.id = ag.game_id
        WHERE ag.arcade_id = $1 AND ag.is_deleted = FALSE AND g.is_deleted = FALSE
        ORDER BY ag.slot_number
        "#,
    )
    .bind(arcade_id)
    .fetch_all(ex)
    .await?;

    Ok(games)
}

/// Live slot assignment of a live game on a terminal, used to check a game
/// is actually playable there.
pub async fn live_assignment(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
    game_id: i32,
) -> Result<Option<ArcadeGame>> {
    let assignment = sqlx::query_as::<_, ArcadeGame>(
        r#"
        SELECT ag.*
        FROM arcade_games ag
        JOIN games g ON g.id = ag.game_id
        WHERE ag.arcade_id = $1 AND ag.game_id = $2
          AND ag.is_deleted = FALSE AND g.is_deleted = FALSE
        "#,
    )
    .bind(arcade_id)
    .bind(game_id)
    .fetch_optional(ex)
    .await?;

    Ok(assignment)
}

/// Hard-deletes the live assignment on a slot before a replacement is
/// inserted. Soft-deleted history rows are left alone for restoration.
pub async fn clear_slot(ex: impl PgExecutor<'_>, arcade_id: i32, slot_number: i32) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM arcade_games WHERE arcade_id = $1 AND slot_number = $2 AND is_deleted = FALSE",
    )
    .bind(arcade_id)
    .bind(slot_number)
    .execute(ex)
    .await?;

    Ok(result.rows_affected())
}

pub async fn assign_slot(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
    game_id: i32,
    slot_number: i32,
) -> Result<ArcadeGame> {
    let assignment = sqlx::query_as::<_, ArcadeGame>(
        r#"
        INSERT INTO arcade_games (arcade_id, game_id, slot_number)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(arcade_id)
    .bind(game_id)
    .bind(slot_number)
    .fetch_one(ex)
    .await?;

    Ok(assignment)
}

pub async fn soft_delete_arcade(
    conn: &mut PgConnection,
    arcade_id: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE arcades SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(arcade_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn restore_arcade(ex: impl PgExecutor<'_>, arcade_id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE arcades SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(arcade_id)
    .execute(ex)
    .await?;

    Ok(())
}

pub async fn soft_delete_assignments(
    conn: &mut PgConnection,
    arcade_id: i32,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE arcade_games
        SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW()
        WHERE arcade_id = $1 AND is_deleted = FALSE
        "#,
    )
    .bind(arcade_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn deleted_assignments(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
) -> Result<Vec<ArcadeGame>> {
    let assignments = sqlx::query_as::<_, ArcadeGame>(
        "SELECT * FROM arcade_games WHERE arcade_id = $1 AND is_deleted = TRUE",
    )
    .bind(arcade_id)
    .fetch_all(ex)
    .await?;

    Ok(assignments)
}

pub async fn slot_conflict(
    ex: impl PgExecutor<'_>,
    arcade_id: i32,
    slot_number: i32,
    exclude_id: i32,
) -> Result<bool> {
    let conflict = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM arcade_games
            WHERE arcade_id = $1 AND slot_number = $2 AND is_deleted = FALSE AND id <> $3
        )
        "#,
    )
    .bind(arcade_id)
    .bind(slot_number)
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;

    Ok(conflict)
}

pub async fn restore_assignment(ex: impl PgExecutor<'_>, assignment_id: i32) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE arcade_games
        SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(assignment_id)
    .execute(ex)
    .await?;

    Ok(())
}

pub async fn count_active_arcades(ex: impl PgExecutor<'_>) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM arcades WHERE is_deleted = FALSE")
            .fetch_one(ex)
            .await?;

    Ok(count)
}
