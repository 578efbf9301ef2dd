use crate::models::{NewUser, User, UserPatch};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

pub async fn create_user(ex: impl PgExecutor<'_>, firebase_uid: &str, new: &NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (firebase_uid, email, first_name, last_name, username, birth_date, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(firebase_uid)
    .bind(&new.email)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.username)
    .bind(new.birth_date)
    .bind(&new.phone)
    .fetch_one(ex)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(ex: impl PgExecutor<'_>, user_id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(user_id)
    .fetch_optional(ex)
    .await?;

    Ok(user)
}

/// Lookup that also resolves soft-deleted rows (admin restore paths).
pub async fn get_user_by_id_any(ex: impl PgExecutor<'_>, user_id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(ex)
        .await?;

    Ok(user)
}

pub async fn get_user_by_firebase_uid(
    ex: impl PgExecutor<'_>,
    firebase_uid: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE firebase_uid = $1 AND is_deleted = FALSE",
    )
    .bind(firebase_uid)
    .fetch_optional(ex)
    .await?;

    Ok(user)
}

pub async fn get_user_by_firebase_uid_any(
    ex: impl PgExecutor<'_>,
    firebase_uid: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE firebase_uid = $1")
        .bind(firebase_uid)
        .fetch_optional(ex)
        .await?;

    Ok(user)
}

pub async fn email_taken(
    ex: impl PgExecutor<'_>,
    email: &str,
    exclude_id: Option<i32>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE email = $1 AND is_deleted = FALSE AND ($2::int4 IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(email)
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;

    Ok(taken)
}

pub async fn username_taken(
    ex: impl PgExecutor<'_>,
    username: &str,
    exclude_id: Option<i32>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE username = $1 AND is_deleted = FALSE AND ($2::int4 IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(username)
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;

    Ok(taken)
}

pub async fn phone_taken(
    ex: impl PgExecutor<'_>,
    phone: &str,
    exclude_id: Option<i32>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE phone = $1 AND is_deleted = FALSE AND ($2::int4 IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(phone)
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;

    Ok(taken)
}

/// Re-activates a soft-deleted account for a returning identity subject,
/// replacing the stored profile with the freshly submitted one.
pub async fn reactivate_user(ex: impl PgExecutor<'_>, user_id: i32, new: &NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET is_deleted = FALSE, deleted_at = NULL,
            email = $2, first_name = $3, last_name = $4,
            username = $5, birth_date = $6, phone = $7,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&new.email)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.username)
    .bind(new.birth_date)
    .bind(&new.phone)
    .fetch_one(ex)
    .await?;

    Ok(user)
}

/// Merges an optional-field patch onto the row; absent fields keep their
/// current value.
pub async fn apply_patch(ex: impl PgExecutor<'_>, user_id: i32, patch: &UserPatch) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            username = COALESCE($5, username),
            birth_date = COALESCE($6, birth_date),
            phone = COALESCE($7, phone),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&patch.email)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.username)
    .bind(patch.birth_date)
    .bind(&patch.phone)
    .fetch_one(ex)
    .await?;

    Ok(user)
}

pub async fn search_users(
    ex: impl PgExecutor<'_>,
    viewer_id: i32,
    term: &str,
    limit: i64,
) -> Result<Vec<User>> {
    let pattern = format!("%{term}%");
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE is_deleted = FALSE
          AND id <> $1
          AND (username ILIKE $2 OR first_name ILIKE $2 OR last_name ILIKE $2)
        ORDER BY username
        LIMIT $3
        "#,
    )
    .bind(viewer_id)
    .bind(pattern)
    .bind(limit)
    .fetch_all(ex)
    .await?;

    Ok(users)
}

/// Row-locked fetch for balance mutations; hold the lock for the whole
/// read-check-write sequence.
pub async fn lock_user(conn: &mut PgConnection, user_id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

/// User-initiated spend; the caller must have verified the balance under a
/// row lock, so this never drives the balance negative.
pub async fn debit_tickets(conn: &mut PgConnection, user_id: i32, amount: i32) -> Result<i32> {
    let balance = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
        SET tickets_balance = tickets_balance - $2, updated_at = NOW()
        WHERE id = $1
        RETURNING tickets_balance
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(conn)
    .await?;

    Ok(balance)
}

pub async fn credit_tickets(conn: &mut PgConnection, user_id: i32, amount: i32) -> Result<i32> {
    let balance = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
        SET tickets_balance = tickets_balance + $2, updated_at = NOW()
        WHERE id = $1
        RETURNING tickets_balance
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(conn)
    .await?;

    Ok(balance)
}

/// Admin-side delta adjustment: a negative delta silently clamps at zero
/// instead of rejecting the request.
pub async fn adjust_tickets_clamped(
    conn: &mut PgConnection,
    user_id: i32,
    delta: i32,
) -> Result<i32> {
    let balance = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users
        SET tickets_balance = GREATEST(0, tickets_balance + $2), updated_at = NOW()
        WHERE id = $1
        RETURNING tickets_balance
        "#,
    )
    .bind(user_id)
    .bind(delta)
    .fetch_one(conn)
    .await?;

    Ok(balance)
}

pub async fn soft_delete_user(
    conn: &mut PgConnection,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE users SET is_deleted = TRUE, deleted_at = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(user_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn restore_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE users SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(user_id)
    .execute(ex)
    .await?;

    Ok(())
}

pub async fn list_deleted_users(ex: impl PgExecutor<'_>) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_deleted = TRUE ORDER BY deleted_at DESC",
    )
    .fetch_all(ex)
    .await?;

    Ok(users)
}

pub async fn count_active_users(ex: impl PgExecutor<'_>) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_deleted = FALSE")
            .fetch_one(ex)
            .await?;

    Ok(count)
}

pub async fn total_tickets_in_circulation(ex: impl PgExecutor<'_>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(tickets_balance), 0) FROM users WHERE is_deleted = FALSE",
    )
    .fetch_one(ex)
    .await?;

    Ok(total)
}
