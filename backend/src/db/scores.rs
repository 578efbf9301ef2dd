use crate::models::{Score, ScoreDetail};
use anyhow::Result;
use sqlx::PgExecutor;

/// Listing filters; `friend_ids` is only consulted when `friends_only`.
#[derive(Debug, Clone, Default)]
pub struct ScoreFilter {
    pub game_id: Option<i32>,
    pub arcade_id: Option<i32>,
    pub single_player_only: bool,
    pub friends_only: bool,
    pub limit: i64,
}

pub async fn insert_score(
    ex: impl PgExecutor<'_>,
    player1_id: i32,
    player2_id: Option<i32>,
    game_id: i32,
    arcade_id: i32,
    score1: i32,
    score2: Option<i32>,
) -> Result<Score> {
    let score = sqlx::query_as::<_, Score>(
        r#"
        INSERT INTO scores (player1_id, player2_id, game_id, arcade_id, score1, score2)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(player1_id)
    .bind(player2_id)
    .bind(game_id)
    .bind(arcade_id)
    .bind(score1)
    .bind(score2)
    .fetch_one(ex)
    .await?;

    Ok(score)
}

pub async fn get_score_detail(
    ex: impl PgExecutor<'_>,
    score_id: i32,
) -> Result<Option<ScoreDetail>> {
    let detail = sqlx::query_as::<_, ScoreDetail>(
        r#"
        SELECT s.id, s.player1_id, p1.username AS player1_username,
               s.player2_id, p2.username AS player2_username,
               g.name AS game_name, a.name AS arcade_name,
               s.score1, s.score2, s.created_at
        FROM scores s
        JOIN users p1 ON p1.id = s.player1_id
        LEFT JOIN users p2 ON p2.id = s.player2_id
        JOIN games g ON g.id = s.game_id
        JOIN arcades a ON a.id = s.arcade_id
        WHERE s.id = $1
        "#,
    )
    .bind(score_id)
    .fetch_optional(ex)
    .await?;

    Ok(detail)
}

/// Filtered listing. Deliberately joins deleted users too: score history
/// stays readable after an account is removed.
pub async fn list_scores(
    ex: impl PgExecutor<'_>,
    viewer_id: i32,
    filter: &ScoreFilter,
    friend_ids: &[i32],
) -> Result<Vec<ScoreDetail>> {
    let scores = sqlx::query_as::<_, ScoreDetail>(
        r#"
        SELECT s.id, s.player1_id, p1.username AS player1_username,
               s.player2_id, p2.username AS player2_username,
               g.name AS game_name, a.name AS arcade_name,
               s.score1, s.score2, s.created_at
        FROM scores s
        JOIN users p1 ON p1.id = s.player1_id
        LEFT JOIN users p2 ON p2.id = s.player2_id
        JOIN games g ON g.id = s.game_id
        JOIN arcades a ON a.id = s.arcade_id
        WHERE s.is_deleted = FALSE
          AND ($2::int4 IS NULL OR s.game_id = $2)
          AND ($3::int4 IS NULL OR s.arcade_id = $3)
          AND (NOT $4::boolean OR s.player2_id IS NULL)
          AND (NOT $5::boolean
               OR (s.player1_id = $1 AND s.player2_id IS NULL)
               OR (s.player1_id = $1 AND s.player2_id = ANY($6))
               OR (s.player2_id = $1 AND s.player1_id = ANY($6)))
        ORDER BY s.created_at DESC
        LIMIT $7
        "#,
    )
    .bind(viewer_id)
    .bind(filter.game_id)
    .bind(filter.arcade_id)
    .bind(filter.single_player_only)
    .bind(filter.friends_only)
    .bind(friend_ids)
    .bind(filter.limit)
    .fetch_all(ex)
    .await?;

    Ok(scores)
}

pub async fn count_total_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM scores
        WHERE (player1_id = $1 OR player2_id = $1) AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_solo_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM scores
        WHERE player1_id = $1 AND player2_id IS NULL AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_wins_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM scores
        WHERE ((player1_id = $1 AND score1 > score2)
            OR (player2_id = $1 AND score2 > score1))
          AND player2_id IS NOT NULL
          AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}

pub async fn count_losses_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM scores
        WHERE ((player1_id = $1 AND score1 < score2)
            OR (player2_id = $1 AND score2 < score1))
          AND player2_id IS NOT NULL
          AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}
