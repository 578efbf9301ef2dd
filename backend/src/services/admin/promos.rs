use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::constants::{PROMO_EXPIRY_DEFAULT_DAYS, PROMO_EXPIRY_MAX_DAYS};
use crate::db;
use crate::error::ApiError;
use crate::models::{NewPromoCode, PromoCode, PromoCodePatch, normalize_code};

#[derive(Debug, Serialize)]
pub struct PromoCreated {
    pub message: String,
    pub promo_code_id: i32,
    pub is_valid_now: bool,
    pub days_until_expiry: i64,
}

#[derive(Debug, Serialize)]
pub struct PromoUpdated {
    pub message: String,
    pub promo_code_id: i32,
    pub is_valid_now: bool,
    pub days_until_expiry: i64,
}

#[derive(Debug, Serialize)]
pub struct PromoToggled {
    pub message: String,
    pub promo_code_id: i32,
    pub is_active: bool,
    pub is_valid_now: bool,
}

/// Admin-facing view of a code with its derived validity state.
#[derive(Debug, Serialize)]
pub struct PromoCodeSummary {
    pub id: i32,
    pub code: String,
    pub tickets_reward: i32,
    pub is_single_use_global: bool,
    pub is_single_use_per_user: bool,
    pub usage_limit: Option<i32>,
    pub current_uses: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_valid_now: bool,
    pub is_expired: bool,
    pub days_until_expiry: i64,
    pub created_at: DateTime<Utc>,
}

impl PromoCodeSummary {
    fn from_code(promo: PromoCode, now: DateTime<Utc>) -> Self {
        Self {
            id: promo.id,
            is_valid_now: promo.is_valid_now(now),
            is_expired: promo.is_expired(now),
            days_until_expiry: promo.days_until_expiry(now),
            code: promo.code,
            tickets_reward: promo.tickets_reward,
            is_single_use_global: promo.is_single_use_global,
            is_single_use_per_user: promo.is_single_use_per_user,
            usage_limit: promo.usage_limit,
            current_uses: promo.current_uses,
            valid_from: promo.valid_from,
            valid_until: promo.valid_until,
            is_active: promo.is_active,
            created_at: promo.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpiringCode {
    pub id: i32,
    pub code: String,
    pub tickets_reward: i32,
    pub valid_until: Option<DateTime<Utc>>,
    pub days_until_expiry: i64,
    pub current_uses: i32,
    pub usage_limit: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ExpiringReport {
    pub expiring_codes: Vec<ExpiringCode>,
    pub total_count: usize,
    pub days_ahead: i64,
}

/// Rejects a window whose end is not after its start.
pub(crate) fn validate_window(
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> Result<(), ApiError> {
    if let (Some(from), Some(until)) = (valid_from, valid_until)
        && until <= from
    {
        return Err(ApiError::BadRequest(
            "valid_until must be after valid_from".into(),
        ));
    }
    Ok(())
}

pub struct PromoAdminService {
    pool: PgPool,
}

impl PromoAdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_code(&self, new: NewPromoCode) -> Result<PromoCreated, ApiError> {
        if new.tickets_reward <= 0 {
            return Err(ApiError::BadRequest(
                "Ticket reward must be positive".into(),
            ));
        }
        if new.usage_limit.is_some_and(|limit| limit <= 0) {
            return Err(ApiError::BadRequest("Usage limit must be positive".into()));
        }
        validate_window(new.valid_from, new.valid_until)?;

        let code = normalize_code(&new.code);
        if code.is_empty() {
            return Err(ApiError::BadRequest("Promo code must not be empty".into()));
        }

        if db::promos::code_exists(&self.pool, &code).await? {
            return Err(ApiError::BadRequest(
                "This promo code already exists".into(),
            ));
        }

        let promo = db::promos::insert_code(&self.pool, &new, &code).await?;
        let now = Utc::now();

        tracing::info!(promo_id = promo.id, code = %promo.code, "promo code created");
        Ok(PromoCreated {
            message: format!("Promo code '{}' created", promo.code),
            promo_code_id: promo.id,
            is_valid_now: promo.is_valid_now(now),
            days_until_expiry: promo.days_until_expiry(now),
        })
    }

    pub async fn list_codes(&self, include_expired: bool) -> Result<Vec<PromoCodeSummary>, ApiError> {
        let now = Utc::now();
        let promos = db::promos::list_codes(&self.pool, include_expired, now).await?;
        Ok(promos
            .into_iter()
            .map(|p| PromoCodeSummary::from_code(p, now))
            .collect())
    }

    pub async fn update_code(
        &self,
        promo_id: i32,
        patch: PromoCodePatch,
    ) -> Result<PromoUpdated, ApiError> {
        let promo = db::promos::get_code_by_id(&self.pool, promo_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Promo code"))?;

        // The window is validated as it will stand after the merge.
        let valid_from = patch.valid_from.or(promo.valid_from);
        let valid_until = patch.valid_until.or(promo.valid_until);
        validate_window(valid_from, valid_until)?;

        if patch.tickets_reward.is_some_and(|reward| reward <= 0) {
            return Err(ApiError::BadRequest(
                "Ticket reward must be positive".into(),
            ));
        }

        let promo = db::promos::apply_patch(&self.pool, promo_id, &patch).await?;
        let now = Utc::now();

        Ok(PromoUpdated {
            message: format!("Promo code '{}' updated", promo.code),
            promo_code_id: promo.id,
            is_valid_now: promo.is_valid_now(now),
            days_until_expiry: promo.days_until_expiry(now),
        })
    }

    pub async fn toggle_active(&self, promo_id: i32) -> Result<PromoToggled, ApiError> {
        db::promos::get_code_by_id(&self.pool, promo_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Promo code"))?;

        let promo = db::promos::toggle_active(&self.pool, promo_id).await?;
        let state = if promo.is_active {
            "activated"
        } else {
            "deactivated"
        };

        Ok(PromoToggled {
            message: format!("Promo code '{}' {state}", promo.code),
            promo_code_id: promo.id,
            is_active: promo.is_active,
            is_valid_now: promo.is_valid_now(Utc::now()),
        })
    }

    pub async fn expiring_soon(&self, days_ahead: Option<i64>) -> Result<ExpiringReport, ApiError> {
        let days_ahead = days_ahead
            .unwrap_or(PROMO_EXPIRY_DEFAULT_DAYS)
            .clamp(1, PROMO_EXPIRY_MAX_DAYS);

        let now = Utc::now();
        let until = now + Duration::days(days_ahead);
        let promos = db::promos::expiring_between(&self.pool, now, until).await?;

        let expiring_codes: Vec<ExpiringCode> = promos
            .into_iter()
            .map(|p| ExpiringCode {
                id: p.id,
                days_until_expiry: p.days_until_expiry(now),
                code: p.code,
                tickets_reward: p.tickets_reward,
                valid_until: p.valid_until,
                current_uses: p.current_uses,
                usage_limit: p.usage_limit,
            })
            .collect();

        Ok(ExpiringReport {
            total_count: expiring_codes.len(),
            expiring_codes,
            days_ahead,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_end_must_follow_start() {
        let from = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();

        assert!(validate_window(Some(from), Some(until)).is_ok());
        assert!(validate_window(Some(until), Some(from)).is_err());
        assert!(validate_window(Some(from), Some(from)).is_err());
        assert!(validate_window(None, Some(until)).is_ok());
        assert!(validate_window(Some(from), None).is_ok());
        assert!(validate_window(None, None).is_ok());
    }
}
