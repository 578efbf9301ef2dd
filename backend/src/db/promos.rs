use crate::models::{NewPromoCode, PromoCode, PromoCodePatch, PromoUse, PromoUseDetail};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

/// Row-locked lookup for redemption; serializes concurrent attempts on the
/// same code so the usage counters stay exact.
pub async fn lock_code_by_value(
    conn: &mut PgConnection,
    code: &str,
) -> Result<Option<PromoCode>> {
    let promo = sqlx::query_as::<_, PromoCode>(
        "SELECT * FROM promo_codes WHERE code = $1 AND is_deleted = FALSE FOR UPDATE",
    )
    .bind(code)
    .fetch_optional(conn)
    .await?;

    Ok(promo)
}

pub async fn get_code_by_id(ex: impl PgExecutor<'_>, promo_id: i32) -> Result<Option<PromoCode>> {
    let promo = sqlx::query_as::<_, PromoCode>(
        "SELECT * FROM promo_codes WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(promo_id)
    .fetch_optional(ex)
    .await?;

    Ok(promo)
}

/// Uniqueness spans deleted codes too; a retired code value is never reissued.
pub async fn code_exists(ex: impl PgExecutor<'_>, code: &str) -> Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM promo_codes WHERE code = $1)")
            .bind(code)
            .fetch_one(ex)
            .await?;

    Ok(exists)
}

pub async fn insert_code(ex: impl PgExecutor<'_>, new: &NewPromoCode, code: &str) -> Result<PromoCode> {
    let promo = sqlx::query_as::<_, PromoCode>(
        r#"
        INSERT INTO promo_codes
            (code, tickets_reward, is_single_use_global, is_single_use_per_user,
             usage_limit, valid_from, valid_until, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(code)
    .bind(new.tickets_reward)
    .bind(new.is_single_use_global)
    .bind(new.is_single_use_per_user)
    .bind(new.usage_limit)
    .bind(new.valid_from)
    .bind(new.valid_until)
    .bind(new.is_active)
    .fetch_one(ex)
    .await?;

    Ok(promo)
}

pub async fn apply_patch(
    ex: impl PgExecutor<'_>,
    promo_id: i32,
    patch: &PromoCodePatch,
) -> Result<PromoCode> {
    let promo = sqlx::query_as::<_, PromoCode>(
        r#"
        UPDATE promo_codes
        SET tickets_reward = COALESCE($2, tickets_reward),
            is_single_use_global = COALESCE($3, is_single_use_global),
            is_single_use_per_user = COALESCE($4, is_single_use_per_user),
            usage_limit = COALESCE($5, usage_limit),
            valid_from = COALESCE($6, valid_from),
            valid_until = COALESCE($7, valid_until),
            is_active = COALESCE($8, is_active),
            updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(promo_id)
    .bind(patch.tickets_reward)
    .bind(patch.is_single_use_global)
    .bind(patch.is_single_use_per_user)
    .bind(patch.usage_limit)
    .bind(patch.valid_from)
    .bind(patch.valid_until)
    .bind(patch.is_active)
    .fetch_one(ex)
    .await?;

    Ok(promo)
}

pub async fn toggle_active(ex: impl PgExecutor<'_>, promo_id: i32) -> Result<PromoCode> {
    let promo = sqlx::query_as::<_, PromoCode>(
        r#"
        UPDATE promo_codes
        SET is_active = NOT is_active, updated_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        RETURNING *
        "#,
    )
    .bind(promo_id)
    .fetch_one(ex)
    .await?;

    Ok(promo)
}

pub async fn list_codes(
    ex: impl PgExecutor<'_>,
    include_expired: bool,
    now: DateTime<Utc>,
) -> Result<Vec<PromoCode>> {
    let promos = sqlx::query_as::<_, PromoCode>(
        r#"
        SELECT * FROM promo_codes
        WHERE is_deleted = FALSE
          AND ($1::boolean OR valid_until IS NULL OR valid_until > $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(include_expired)
    .bind(now)
    .fetch_all(ex)
    .await?;

    Ok(promos)
}

/// Active codes whose expiry falls inside (now, until].
pub async fn expiring_between(
    ex: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<PromoCode>> {
    let promos = sqlx::query_as::<_, PromoCode>(
        r#"
        SELECT * FROM promo_codes
        WHERE is_deleted = FALSE
          AND is_active = TRUE
          AND valid_until IS NOT NULL
          AND valid_until > $1
          AND valid_until <= $2
        ORDER BY valid_until
        "#,
    )
    .bind(now)
    .bind(until)
    .fetch_all(ex)
    .await?;

    Ok(promos)
}

pub async fn user_has_used(
    ex: impl PgExecutor<'_>,
    user_id: i32,
    promo_id: i32,
) -> Result<bool> {
    let used = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM promo_uses
            WHERE user_id = $1 AND promo_code_id = $2 AND is_deleted = FALSE
        )
        "#,
    )
    .bind(user_id)
    .bind(promo_id)
    .fetch_one(ex)
    .await?;

    Ok(used)
}

pub async fn insert_use(
    conn: &mut PgConnection,
    user_id: i32,
    promo_id: i32,
    tickets_received: i32,
) -> Result<PromoUse> {
    let promo_use = sqlx::query_as::<_, PromoUse>(
        r#"
        INSERT INTO promo_uses (user_id, promo_code_id, tickets_received)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(promo_id)
    .bind(tickets_received)
    .fetch_one(conn)
    .await?;

    Ok(promo_use)
}

pub async fn increment_uses(conn: &mut PgConnection, promo_id: i32) -> Result<i32> {
    let uses = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE promo_codes
        SET current_uses = current_uses + 1, updated_at = NOW()
        WHERE id = $1
        RETURNING current_uses
        "#,
    )
    .bind(promo_id)
    .fetch_one(conn)
    .await?;

    Ok(uses)
}

pub async fn history_for_user(
    ex: impl PgExecutor<'_>,
    user_id: i32,
) -> Result<Vec<PromoUseDetail>> {
    let uses = sqlx::query_as::<_, PromoUseDetail>(
        r#"
        SELECT pu.id, pc.code, pu.tickets_received, pu.created_at
        FROM promo_uses pu
        JOIN promo_codes pc ON pc.id = pu.promo_code_id
        WHERE pu.user_id = $1 AND pu.is_deleted = FALSE
        ORDER BY pu.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(ex)
    .await?;

    Ok(uses)
}

/// Codes the caller could redeem right now: active, inside their window,
/// not exhausted, and not already burned by this user when per-user
/// single-use.
pub async fn available_for_user(
    ex: impl PgExecutor<'_>,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<Vec<PromoCode>> {
    let promos = sqlx::query_as::<_, PromoCode>(
        r#"
        SELECT * FROM promo_codes pc
        WHERE pc.is_deleted = FALSE
          AND pc.is_active = TRUE
          AND (pc.valid_from IS NULL OR pc.valid_from <= $2)
          AND (pc.valid_until IS NULL OR pc.valid_until >= $2)
          AND (pc.usage_limit IS NULL OR pc.current_uses < pc.usage_limit)
          AND NOT (pc.is_single_use_global AND pc.current_uses > 0)
          AND NOT (pc.is_single_use_per_user AND EXISTS(
              SELECT 1 FROM promo_uses pu
              WHERE pu.promo_code_id = pc.id AND pu.user_id = $1 AND pu.is_deleted = FALSE
          ))
        ORDER BY pc.valid_until NULLS LAST, pc.code
        "#,
    )
    .bind(user_id)
    .bind(now)
    .fetch_all(ex)
    .await?;

    Ok(promos)
}

pub async fn count_active_codes(ex: impl PgExecutor<'_>) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM promo_codes WHERE is_deleted = FALSE")
            .fetch_one(ex)
            .await?;

    Ok(count)
}

pub async fn soft_delete_uses_for_user(
    conn: &mut PgConnection,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE promo_uses
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

pub async fn count_uses_for_user(ex: impl PgExecutor<'_>, user_id: i32) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM promo_uses WHERE user_id = $1 AND is_deleted = FALSE",
    )
    .bind(user_id)
    .fetch_one(ex)
    .await?;

    Ok(count)
}
