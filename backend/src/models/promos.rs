use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromoUse {
    pub id: i32,
    pub user_id: i32,
    pub promo_code_id: i32,
    pub tickets_received: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromoCode {
    pub code: String,
    pub tickets_reward: i32,
    #[serde(default)]
    pub is_single_use_global: bool,
    #[serde(default = "default_true")]
    pub is_single_use_per_user: bool,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Optional-field patch for a promo code; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoCodePatch {
    pub tickets_reward: Option<i32>,
    pub is_single_use_global: Option<bool>,
    pub is_single_use_per_user: Option<bool>,
    pub usage_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Redemption joined with its code for history listings.
#[derive(Debug, Clone, FromRow)]
pub struct PromoUseDetail {
    pub id: i32,
    pub code: String,
    pub tickets_received: i32,
    pub created_at: DateTime<Utc>,
}

/// Why a redemption attempt was turned down. Each cause maps to a distinct
/// client-facing message so they stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoDenial {
    Expired,
    Inactive,
    NotYetValid,
    AlreadyUsedByUser,
    LimitReached,
    GloballyConsumed,
}

impl PromoDenial {
    pub fn message(self) -> &'static str {
        match self {
            Self::Expired => "This promo code has expired",
            Self::Inactive => "This promo code is no longer active",
            Self::NotYetValid => "This promo code is not valid yet",
            Self::AlreadyUsedByUser => "You have already used this promo code",
            Self::LimitReached => "This promo code has reached its usage limit",
            Self::GloballyConsumed => "This promo code has already been used",
        }
    }
}

impl PromoCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| now > until)
    }

    pub fn is_not_yet_valid(&self, now: DateTime<Utc>) -> bool {
        self.valid_from.is_some_and(|from| now < from)
    }

    pub fn is_valid_now(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && !self.is_not_yet_valid(now)
    }

    /// Days left before `valid_until`; 0 once expired, -1 without an expiry.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        match self.valid_until {
            Some(until) if now > until => 0,
            Some(until) => (until - now).num_days(),
            None => -1,
        }
    }

    /// Time-window and activation guard, checked first on redemption.
    /// Expiry wins over deactivation, which wins over a future start date.
    pub fn validity_denial(&self, now: DateTime<Utc>) -> Option<PromoDenial> {
        if self.is_expired(now) {
            Some(PromoDenial::Expired)
        } else if !self.is_active {
            Some(PromoDenial::Inactive)
        } else if self.is_not_yet_valid(now) {
            Some(PromoDenial::NotYetValid)
        } else {
            None
        }
    }

    /// Counter-based guard, checked after the per-user lookup.
    pub fn usage_denial(&self) -> Option<PromoDenial> {
        if self
            .usage_limit
            .is_some_and(|limit| self.current_uses >= limit)
        {
            Some(PromoDenial::LimitReached)
        } else if self.is_single_use_global && self.current_uses > 0 {
            Some(PromoDenial::GloballyConsumed)
        } else {
            None
        }
    }

    /// Whether the code could still be redeemed by some user right now.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.validity_denial(now).is_none() && self.usage_denial().is_none()
    }
}

/// Normalizes a user-supplied code the way codes are stored.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_code() -> PromoCode {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        PromoCode {
            id: 1,
            code: "WELCOME".into(),
            tickets_reward: 5,
            is_single_use_global: false,
            is_single_use_per_user: true,
            usage_limit: None,
            current_uses: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
            is_deleted: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn open_ended_code_is_valid() {
        assert!(base_code().validity_denial(now()).is_none());
        assert!(base_code().is_redeemable(now()));
    }

    #[test]
    fn expired_code_is_denied_as_expired() {
        let mut code = base_code();
        code.valid_until = Some(now() - Duration::days(1));
        assert_eq!(code.validity_denial(now()), Some(PromoDenial::Expired));
        assert_eq!(code.days_until_expiry(now()), 0);
    }

    #[test]
    fn inactive_code_is_denied_as_inactive() {
        let mut code = base_code();
        code.is_active = false;
        assert_eq!(code.validity_denial(now()), Some(PromoDenial::Inactive));
    }

    #[test]
    fn future_code_is_denied_as_not_yet_valid() {
        let mut code = base_code();
        code.valid_from = Some(now() + Duration::days(1));
        assert_eq!(code.validity_denial(now()), Some(PromoDenial::NotYetValid));
    }

    #[test]
    fn expiry_outranks_deactivation_and_start_date() {
        // A code that is simultaneously expired, inactive and not-yet-valid
        // must report expiry first so the causes stay distinguishable.
        let mut code = base_code();
        code.is_active = false;
        code.valid_from = Some(now() + Duration::days(2));
        code.valid_until = Some(now() - Duration::days(2));
        assert_eq!(code.validity_denial(now()), Some(PromoDenial::Expired));

        code.valid_until = None;
        assert_eq!(code.validity_denial(now()), Some(PromoDenial::Inactive));

        code.is_active = true;
        assert_eq!(code.validity_denial(now()), Some(PromoDenial::NotYetValid));
    }

    #[test]
    fn usage_limit_outranks_global_single_use() {
        let mut code = base_code();
        code.is_single_use_global = true;
        code.usage_limit = Some(1);
        code.current_uses = 1;
        assert_eq!(code.usage_denial(), Some(PromoDenial::LimitReached));

        code.usage_limit = None;
        assert_eq!(code.usage_denial(), Some(PromoDenial::GloballyConsumed));
    }

    #[test]
    fn usage_limit_only_blocks_once_reached() {
        let mut code = base_code();
        code.usage_limit = Some(3);
        code.current_uses = 2;
        assert!(code.usage_denial().is_none());
        code.current_uses = 3;
        assert_eq!(code.usage_denial(), Some(PromoDenial::LimitReached));
    }

    #[test]
    fn codes_normalize_to_uppercase_trimmed() {
        assert_eq!(normalize_code("  welcome10 "), "WELCOME10");
    }

    #[test]
    fn days_until_expiry_counts_whole_days() {
        let mut code = base_code();
        code.valid_until = Some(now() + Duration::days(30));
        assert_eq!(code.days_until_expiry(now()), 30);
        code.valid_until = None;
        assert_eq!(code.days_until_expiry(now()), -1);
    }
}
