use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db;
use crate::error::ApiError;
use crate::models::{ReservationStatus, User};

#[derive(Debug, Deserialize)]
pub struct AdjustTicketsRequest {
    pub user_id: i32,
    /// Delta, may be negative; the resulting balance clamps at zero.
    pub tickets_to_add: i32,
}

#[derive(Debug, Serialize)]
pub struct TicketsAdjusted {
    pub message: String,
    pub old_balance: i32,
    pub new_balance: i32,
    pub tickets_added: i32,
}

#[derive(Debug, Serialize)]
pub struct UserDeletionReport {
    pub message: String,
    pub user_id: i32,
    pub deleted_friendships: u64,
    pub deleted_promo_uses: u64,
    pub deleted_purchases: u64,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserRestored {
    pub message: String,
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct UserBrief {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub tickets_balance: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BlockingFactors {
    pub active_reservations: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletionImpact {
    pub friendships_to_delete: i64,
    pub promo_uses_to_delete: i64,
    pub purchases_to_delete: i64,
    pub settled_reservations_preserved: i64,
    pub scores_retained: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletionImpactReport {
    pub user: UserBrief,
    pub can_delete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_factors: Option<BlockingFactors>,
    pub deletion_impact: DeletionImpact,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ReservationsForceCancelled {
    pub message: String,
    pub user_id: i32,
    pub cancelled_reservations: u64,
    pub refunded_tickets: i32,
    pub new_tickets_balance: i32,
}

const SCORE_RETENTION_NOTE: &str =
    "Scores are retained with their player references for game-history integrity";

pub struct UserAdminService {
    pool: PgPool,
}

impl UserAdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admin balance adjustment; unlike user spending this clamps at zero
    /// rather than rejecting an overdraft.
    pub async fn adjust_tickets(
        &self,
        request: AdjustTicketsRequest,
    ) -> Result<TicketsAdjusted, ApiError> {
        let mut tx = self.pool.begin().await?;

        let user = db::users::lock_user(&mut tx, request.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        let old_balance = user.tickets_balance;
        let new_balance =
            db::users::adjust_tickets_clamped(&mut tx, request.user_id, request.tickets_to_add)
                .await?;
        tx.commit().await?;

        tracing::info!(
            user_id = request.user_id,
            delta = request.tickets_to_add,
            old_balance,
            new_balance,
            "ticket balance adjusted"
        );

        Ok(TicketsAdjusted {
            message: format!("Ticket balance of '{}' updated", user.username),
            old_balance,
            new_balance,
            tickets_added: request.tickets_to_add,
        })
    }

    pub async fn list_deleted(&self) -> Result<Vec<User>, ApiError> {
        Ok(db::users::list_deleted_users(&self.pool).await?)
    }

    pub async fn restore(&self, user_id: i32) -> Result<UserRestored, ApiError> {
        let user = db::users::get_user_by_id_any(&self.pool, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        if !user.is_deleted {
            return Err(ApiError::BadRequest("This user is not deleted".into()));
        }

        db::users::restore_user(&self.pool, user_id).await?;
        tracing::info!(user_id, "user restored");

        Ok(UserRestored {
            message: format!("User '{}' restored", user.username),
            user_id,
        })
    }

    /// Soft-deletes the account and cascades to friendships, promo uses and
    /// purchases in one transaction. Refused outright while the user is on
    /// any waiting or playing reservation. Scores are left untouched.
    pub async fn soft_delete_user(&self, user_id: i32) -> Result<UserDeletionReport, ApiError> {
        let mut tx = self.pool.begin().await?;

        let user = db::users::lock_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        let active = db::reservations::count_active_for_user(&mut *tx, user_id).await?;
        if active > 0 {
            return Err(ApiError::BadRequest(format!(
                "Cannot delete user: {active} active reservation(s). Handle active reservations first."
            )));
        }

        let now = Utc::now();
        db::users::soft_delete_user(&mut tx, user_id, now).await?;
        let deleted_friendships =
            db::friends::soft_delete_all_for_user(&mut tx, user_id, now).await?;
        let deleted_promo_uses =
            db::promos::soft_delete_uses_for_user(&mut tx, user_id, now).await?;
        let deleted_purchases =
            db::tickets::soft_delete_purchases_for_user(&mut tx, user_id, now).await?;
        tx.commit().await?;

        tracing::info!(
            user_id,
            deleted_friendships,
            deleted_promo_uses,
            deleted_purchases,
            "user soft-deleted"
        );

        Ok(UserDeletionReport {
            message: format!("User '{}' deleted", user.username),
            user_id,
            deleted_friendships,
            deleted_promo_uses,
            deleted_purchases,
            note: SCORE_RETENTION_NOTE,
        })
    }

    pub async fn deletion_impact(&self, user_id: i32) -> Result<DeletionImpactReport, ApiError> {
        let user = db::users::get_user_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        let active_reservations =
            db::reservations::count_active_for_user(&self.pool, user_id).await?;
        let can_delete = active_reservations == 0;

        let deletion_impact = DeletionImpact {
            friendships_to_delete: db::friends::count_live_for_user(&self.pool, user_id).await?,
            promo_uses_to_delete: db::promos::count_uses_for_user(&self.pool, user_id).await?,
            purchases_to_delete: db::tickets::count_purchases_for_user(&self.pool, user_id).await?,
            settled_reservations_preserved:
                db::reservations::count_settled_for_user(&self.pool, user_id).await?,
            scores_retained: db::scores::count_total_for_user(&self.pool, user_id).await?,
        };

        let mut recommendations = vec![
            SCORE_RETENTION_NOTE,
            "Settled reservations are preserved for history",
            "Personal data is flagged as deleted in line with GDPR",
        ];
        if !can_delete {
            recommendations.push("Cancel the user's active reservations before deletion");
        }

        Ok(DeletionImpactReport {
            user: UserBrief {
                id: user.id,
                username: user.username,
                email: user.email,
                tickets_balance: user.tickets_balance,
                created_at: user.created_at,
            },
            can_delete,
            blocking_factors: (!can_delete).then_some(BlockingFactors {
                active_reservations,
            }),
            deletion_impact,
            recommendations,
        })
    }

    /// Cancels every active reservation of the user. The charge is refunded
    /// only for reservations where the user is the primary player; a seat as
    /// player 2 was never paid for by them.
    pub async fn force_cancel_reservations(
        &self,
        user_id: i32,
    ) -> Result<ReservationsForceCancelled, ApiError> {
        let mut tx = self.pool.begin().await?;

        let user = db::users::lock_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        let reservations = db::reservations::lock_active_for_user(&mut tx, user_id).await?;

        let mut cancelled = 0u64;
        let mut refunded_tickets = 0i32;
        let mut new_balance = user.tickets_balance;

        for reservation in &reservations {
            if reservation.player_id == user_id {
                new_balance =
                    db::users::credit_tickets(&mut tx, user_id, reservation.tickets_used).await?;
                refunded_tickets += reservation.tickets_used;
            }
            db::reservations::set_status(&mut *tx, reservation.id, ReservationStatus::Cancelled)
                .await?;
            cancelled += 1;
        }

        tx.commit().await?;

        tracing::info!(
            user_id,
            cancelled,
            refunded_tickets,
            "active reservations force-cancelled"
        );

        Ok(ReservationsForceCancelled {
            message: format!("Reservations of user '{}' cancelled", user.username),
            user_id,
            cancelled_reservations: cancelled,
            refunded_tickets,
            new_tickets_balance: new_balance,
        })
    }
}
