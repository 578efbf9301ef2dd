use crate::models::{FriendRequestDetail, Friendship, FriendshipStatus, User};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

/// Any live relation between two users, in either direction.
pub async fn between(ex: impl PgExecutor<'_>, a: i32, b: i32) -> Result<Option<Friendship>> {
    let friendship = sqlx::query_as::<_, Friendship>(
        r#"
        SELECT * FROM friendships
        WHERE ((requester_id = $1 AND requested_id = $2)
            OR (requester_id = $2 AND requested_id = $1))
          AND is_deleted = FALSE
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_optional(ex)
    .await?;

    Ok(friendship)
}

pub async fn accepted_between(
    ex: impl PgExecutor<'_>,
    a: i32,
    b: i32,
) -> Result<Option<Friendship>> {
    let friendship = sqlx::query_as::<_, Friendship>(
        r#"
        SELECT * FROM friendships
        WHERE ((requester_id = $1 AND requested_id = $2)
            OR (requester_id = $2 AND requested_id = $1))
          AND status = 'accepted'
          AND is_deleted = FALSE
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_optional(ex)
    .await?;

    Ok(friendship)
}

pub async fn insert_request(
    ex: impl PgExecutor<'_>,
    requester_id: i32,
    requested_id: i32,
) -> Result<Friendship> {
    let friendship = sqlx::query_as::<_, Friendship>(
        r#"
        INSERT INTO friendships (requester_id, requested_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(requester_id)
    .bind(requested_id)
    .fetch_one(ex)
    .await?;

    Ok(friendship)
}

/// A pending request addressed to `requested_id`; only its recipient may
/// accept or reject it.
pub async fn pending_request_for(
    ex: impl PgExecutor<'_>,
    friendship_id: i32,
    requested_id: i32,
) -> Result<Option<Friendship>> {
    let friendship = sqlx::query_as::<_, Friendship>(
        r#"
        SELECT * FROM friendships
        WHERE id = $1 AND requested_id = $2 AND status = 'pending' AND is_deleted = FALSE
        "#,
    )
    .bind(friendship_id)
    .bind(requested_id)
    .fetch_optional(ex)
    .await?;

    Ok(friendship)
}

pub async fn set_status(
    ex: impl PgExecutor<'_>,
    friendship_id: i32,
    status: FriendshipStatus,
) -> Result<()> {
    sqlx::query("UPDATE friendships SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(friendship_id)
        .bind(status)
        .execute(ex)
        .await?;

    Ok(())
}

pub async fn soft_delete(
    ex: impl PgExecutor<'_>,
    friendship_id: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE friendships
        SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(friendship_id)
    .bind(now)
    .execute(ex)
    .await?;

    Ok(())
}

/// Accepted friends of a user; the friend is whichever side of the pair is
/// not the user.
pub async fn friends_of(ex: impl PgExecutor<'_>, user_id: i32) -> Result<Vec<User>> {
    let friends = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM friendships f
        JOIN users u ON u.id = CASE
            WHEN f.requester_id = $1 THEN f.requested_id
            ELSE f.requester_id
        END
        WHERE (f.requester_id = $1 OR f.requested_id = $1)
          AND f.status = 'accepted'
          AND f.is_deleted = FALSE
          AND u.is_deleted = FALSE
        ORDER BY u.username
        "#,
    )
    .bind(user_id)
    .fetch_all(ex)
    .await?;

    Ok(friends)
}

pub async fn pending_requests_for_user(
    ex: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Vec<FriendRequestDetail>> {
    let requests = sqlx::query_as::<_, FriendRequestDetail>(
        r#"
        SELECT f.id, f.status, f.requester_id, u.username AS requester_username,
               u.first_name AS requester_first_name, u.last_name AS requester_last_name,
               f.created_at
        FROM friendships f
        JOIN users u ON u.id = f.requester_id
        WHERE f.requested_id = $1 AND f.status = 'pending' AND f.is_deleted = FALSE
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(ex)
    .await?;

    Ok(requests)
}

pub async fn accepted_friend_ids(ex: impl PgExecutor<'_>, user_id: i32) -> Result<Vec<i32>> {
    let ids = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT CASE WHEN requester_id = $1 THEN requested_id ELSE requester_id END
        FROM friendships
        WHERE (requester_id = $1 OR requested_id = $1)
          AND status = 'accepted'
          AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_all(ex)
    .await?;

    Ok(ids)
}

pub async fn soft_delete_all_for_user(
    conn: &mut PgConnection,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE friendships
        SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW()
        WHERE (requester_id = $1 OR requested_id = $1) AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_live_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM friendships
        WHERE (requester_id = $1 OR requested_id = $1) AND is_deleted = FALSE
        "#,
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}
