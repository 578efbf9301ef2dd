use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::constants::{GAME_NAME_MIN_LEN, PLAYER_COUNT_MAX, PLAYER_COUNT_MIN, TICKET_COST_MAX};
use crate::db;
use crate::error::ApiError;
use crate::models::{ArcadePlacement, ArcadePopularity, Game, GamePatch, NewGame, ReservationStatus};

#[derive(Debug, Serialize)]
pub struct GameCreated {
    pub message: String,
    pub game_id: i32,
    pub game: Game,
}

#[derive(Debug, Serialize)]
pub struct GameUpdated {
    pub message: String,
    pub game_id: i32,
    pub updated_fields: Vec<&'static str>,
    pub game: Game,
}

#[derive(Debug, Serialize)]
pub struct GameDeleted {
    pub message: String,
    pub game_id: i32,
    pub deleted_arcade_associations: u64,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GameRestored {
    pub message: String,
    pub game_id: i32,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReservationStats {
    pub total_reservations: i64,
    pub completed_reservations: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct ScoreStats {
    pub total_games_played: i64,
    pub average_score_player1: f64,
    pub average_score_player2: f64,
}

#[derive(Debug, Serialize)]
pub struct RevenueStats {
    pub total_tickets_spent: i64,
}

#[derive(Debug, Serialize)]
pub struct GameStatsReport {
    pub game_id: i32,
    pub game_name: String,
    pub period_days: i64,
    pub reservation_stats: ReservationStats,
    pub score_stats: ScoreStats,
    pub revenue_stats: RevenueStats,
    pub arcade_popularity: Vec<ArcadePopularity>,
    pub generated_at: DateTime<Utc>,
}

/// Percentage of reservations that reached `completed`, rounded to two
/// decimals; 0 when there were none.
pub(crate) fn completion_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = completed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

pub struct GameAdminService {
    pool: PgPool,
}

impl GameAdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_game(&self, new: NewGame) -> Result<GameCreated, ApiError> {
        validate_player_counts(new.min_players, new.max_players)?;
        validate_ticket_cost(new.ticket_cost)?;

        if new.name.trim().chars().count() < GAME_NAME_MIN_LEN {
            return Err(ApiError::BadRequest(format!(
                "Game name must be at least {GAME_NAME_MIN_LEN} characters"
            )));
        }

        if db::games::name_taken(&self.pool, &new.name, None).await? {
            return Err(ApiError::BadRequest(format!(
                "A game named '{}' already exists",
                new.name
            )));
        }

        let game = db::games::create_game(&self.pool, &new).await?;
        tracing::info!(game_id = game.id, "game created");

        Ok(GameCreated {
            message: format!("Game '{}' created", game.name),
            game_id: game.id,
            game,
        })
    }

    pub async fn list_games(&self, include_deleted: bool) -> Result<Vec<Game>, ApiError> {
        Ok(db::games::list_games(&self.pool, include_deleted).await?)
    }

    pub async fn get_game(&self, game_id: i32) -> Result<Game, ApiError> {
        db::games::get_game_by_id(&self.pool, game_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Game"))
    }

    pub async fn update_game(&self, game_id: i32, patch: GamePatch) -> Result<GameUpdated, ApiError> {
        let game = self.get_game(game_id).await?;

        // Bounds are checked against the values the row will carry after
        // the merge, not just the supplied ones.
        let min_players = patch.min_players.unwrap_or(game.min_players);
        let max_players = patch.max_players.unwrap_or(game.max_players);
        validate_player_counts(min_players, max_players)?;

        if let Some(cost) = patch.ticket_cost {
            validate_ticket_cost(cost)?;
        }

        if let Some(name) = &patch.name
            && name != &game.name
            && db::games::name_taken(&self.pool, name, Some(game_id)).await?
        {
            return Err(ApiError::BadRequest(format!(
                "A game named '{name}' already exists"
            )));
        }

        let updated_fields = patch.updated_fields();
        let game = db::games::apply_patch(&self.pool, game_id, &patch).await?;

        Ok(GameUpdated {
            message: format!("Game '{}' updated", game.name),
            game_id: game.id,
            updated_fields,
            game,
        })
    }

    pub async fn soft_delete(&self, game_id: i32) -> Result<GameDeleted, ApiError> {
        let game = self.get_game(game_id).await?;

        let mut tx = self.pool.begin().await?;

        let active = db::reservations::count_active_for_game(&mut *tx, game_id).await?;
        if active > 0 {
            return Err(ApiError::BadRequest(format!(
                "Cannot delete game: {active} active reservation(s)"
            )));
        }

        let now = Utc::now();
        db::games::soft_delete_game(&mut tx, game_id, now).await?;
        let deleted_arcade_associations =
            db::games::soft_delete_assignments_for_game(&mut tx, game_id, now).await?;
        tx.commit().await?;

        tracing::info!(game_id, "game soft-deleted");
        Ok(GameDeleted {
            message: format!("Game '{}' deleted", game.name),
            game_id,
            deleted_arcade_associations,
            note: "Historical scores and reservations are retained",
        })
    }

    pub async fn list_deleted(&self) -> Result<Vec<Game>, ApiError> {
        Ok(db::games::list_deleted_games(&self.pool).await?)
    }

    /// Restores the game itself; slot assignments are left deleted to avoid
    /// silently evicting whatever now occupies those slots.
    pub async fn restore(&self, game_id: i32) -> Result<GameRestored, ApiError> {
        let game = db::games::get_game_by_id_any(&self.pool, game_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Game"))?;

        if !game.is_deleted {
            return Err(ApiError::BadRequest("This game is not deleted".into()));
        }

        db::games::restore_game(&self.pool, game_id).await?;

        Ok(GameRestored {
            message: format!("Game '{}' restored", game.name),
            game_id,
            note: "Arcade slot assignments must be reconfigured manually",
        })
    }

    pub async fn stats(&self, game_id: i32, days: i64) -> Result<GameStatsReport, ApiError> {
        let game = self.get_game(game_id).await?;
        let since = Utc::now() - Duration::days(days);

        let total_reservations =
            db::games::count_reservations_since(&self.pool, game_id, since).await?;
        let completed_reservations = db::games::count_reservations_with_status_since(
            &self.pool,
            game_id,
            ReservationStatus::Completed,
            since,
        )
        .await?;

        let total_games_played = db::games::count_scores_since(&self.pool, game_id, since).await?;
        let (average_score_player1, average_score_player2) =
            db::games::average_scores_since(&self.pool, game_id, since).await?;

        let total_tickets_spent = db::games::tickets_spent_since(&self.pool, game_id, since).await?;
        let arcade_popularity =
            db::games::arcade_popularity_since(&self.pool, game_id, since).await?;

        Ok(GameStatsReport {
            game_id: game.id,
            game_name: game.name,
            period_days: days,
            reservation_stats: ReservationStats {
                total_reservations,
                completed_reservations,
                completion_rate: completion_rate(completed_reservations, total_reservations),
            },
            score_stats: ScoreStats {
                total_games_played,
                average_score_player1,
                average_score_player2,
            },
            revenue_stats: RevenueStats { total_tickets_spent },
            arcade_popularity,
            generated_at: Utc::now(),
        })
    }

    pub async fn arcades_for_game(&self, game_id: i32) -> Result<Vec<ArcadePlacement>, ApiError> {
        self.get_game(game_id).await?;
        Ok(db::games::arcades_for_game(&self.pool, game_id).await?)
    }
}

fn validate_player_counts(min_players: i32, max_players: i32) -> Result<(), ApiError> {
    if !(PLAYER_COUNT_MIN..=PLAYER_COUNT_MAX).contains(&min_players) {
        return Err(ApiError::BadRequest(format!(
            "Minimum player count must be between {PLAYER_COUNT_MIN} and {PLAYER_COUNT_MAX}"
        )));
    }
    if !(PLAYER_COUNT_MIN..=PLAYER_COUNT_MAX).contains(&max_players) {
        return Err(ApiError::BadRequest(format!(
            "Maximum player count must be between {PLAYER_COUNT_MIN} and {PLAYER_COUNT_MAX}"
        )));
    }
    if max_players < min_players {
        return Err(ApiError::BadRequest(
            "Maximum player count must be >= the minimum".into(),
        ));
    }
    Ok(())
}

fn validate_ticket_cost(cost: i32) -> Result<(), ApiError> {
    if cost < 0 {
        return Err(ApiError::BadRequest(
            "Ticket cost cannot be negative".into(),
        ));
    }
    if cost > TICKET_COST_MAX {
        return Err(ApiError::BadRequest(format!(
            "Ticket cost cannot exceed {TICKET_COST_MAX}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_counts_must_stay_in_cabinet_range() {
        assert!(validate_player_counts(1, 2).is_ok());
        assert!(validate_player_counts(1, 8).is_ok());
        assert!(validate_player_counts(0, 2).is_err());
        assert!(validate_player_counts(1, 9).is_err());
        assert!(validate_player_counts(4, 2).is_err());
    }

    #[test]
    fn ticket_cost_is_bounded() {
        assert!(validate_ticket_cost(0).is_ok());
        assert!(validate_ticket_cost(100).is_ok());
        assert!(validate_ticket_cost(-1).is_err());
        assert!(validate_ticket_cost(101).is_err());
    }

    #[test]
    fn completion_rate_handles_empty_windows() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(1, 3), 33.33);
        assert_eq!(completion_rate(3, 3), 100.0);
    }
}
