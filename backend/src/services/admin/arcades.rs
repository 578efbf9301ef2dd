use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use sqlx::PgPool;

use crate::constants::{
    ARCADE_API_KEY_PREFIX, ARCADE_API_KEY_SUFFIX_LEN, is_valid_slot_number,
};
use crate::db;
use crate::error::ApiError;
use crate::models::{Arcade, NewArcade};

#[derive(Debug, Serialize)]
pub struct ArcadeCreated {
    pub message: String,
    pub arcade_id: i32,
    /// Shown once at creation; the terminal is provisioned with it.
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct GameAssigned {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ArcadeDeleted {
    pub message: String,
    pub arcade_id: i32,
    pub deleted_associations: u64,
}

#[derive(Debug, Serialize)]
pub struct ArcadeRestored {
    pub message: String,
    pub arcade_id: i32,
    /// Slot restoration is partial: an association only comes back when its
    /// game still exists and the slot is free.
    pub restored_associations: u64,
    pub total_associations: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyRotated {
    pub message: String,
    pub arcade_id: i32,
    pub api_key: String,
}

pub struct ArcadeAdminService {
    pool: PgPool,
}

impl ArcadeAdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_arcade(&self, new: NewArcade) -> Result<ArcadeCreated, ApiError> {
        if new.name.trim().is_empty() {
            return Err(ApiError::BadRequest("Arcade name must not be empty".into()));
        }

        let api_key = self.unique_api_key().await?;
        let arcade = db::arcades::create_arcade(&self.pool, &new, &api_key).await?;

        tracing::info!(arcade_id = arcade.id, "arcade created");
        Ok(ArcadeCreated {
            message: format!("Arcade '{}' created", arcade.name),
            arcade_id: arcade.id,
            api_key,
        })
    }

    /// Installs a game on a cabinet slot, replacing whatever live assignment
    /// occupied it (delete-then-insert keeps at most one live row per slot).
    pub async fn assign_game(
        &self,
        arcade_id: i32,
        game_id: i32,
        slot_number: i32,
    ) -> Result<GameAssigned, ApiError> {
        let arcade = db::arcades::get_arcade_by_id(&self.pool, arcade_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Arcade"))?;

        let game = db::games::get_game_by_id(&self.pool, game_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Game"))?;

        if !is_valid_slot_number(slot_number) {
            return Err(ApiError::BadRequest("Slot number must be 1 or 2".into()));
        }

        let mut tx = self.pool.begin().await?;
        db::arcades::clear_slot(&mut *tx, arcade_id, slot_number).await?;
        db::arcades::assign_slot(&mut *tx, arcade_id, game_id, slot_number).await?;
        tx.commit().await?;

        Ok(GameAssigned {
            message: format!(
                "Game '{}' assigned to slot {} of arcade '{}'",
                game.name, slot_number, arcade.name
            ),
        })
    }

    /// Soft-deletes a terminal; refused while any reservation on it is
    /// active. Slot assignments are cascaded.
    pub async fn soft_delete(&self, arcade_id: i32) -> Result<ArcadeDeleted, ApiError> {
        let arcade = db::arcades::get_arcade_by_id(&self.pool, arcade_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Arcade"))?;

        let mut tx = self.pool.begin().await?;

        let active = db::reservations::count_active_for_arcade(&mut *tx, arcade_id).await?;
        if active > 0 {
            return Err(ApiError::BadRequest(format!(
                "Cannot delete arcade: {active} active reservation(s)"
            )));
        }

        let now = Utc::now();
        db::arcades::soft_delete_arcade(&mut tx, arcade_id, now).await?;
        let deleted_associations = db::arcades::soft_delete_assignments(&mut tx, arcade_id, now).await?;
        tx.commit().await?;

        tracing::info!(arcade_id, deleted_associations, "arcade soft-deleted");
        Ok(ArcadeDeleted {
            message: format!("Arcade '{}' deleted", arcade.name),
            arcade_id,
            deleted_associations,
        })
    }

    pub async fn list_deleted(&self) -> Result<Vec<Arcade>, ApiError> {
        Ok(db::arcades::list_deleted_arcades(&self.pool).await?)
    }

    pub async fn restore(&self, arcade_id: i32) -> Result<ArcadeRestored, ApiError> {
        let arcade = db::arcades::get_arcade_by_id_any(&self.pool, arcade_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Arcade"))?;

        if !arcade.is_deleted {
            return Err(ApiError::BadRequest("This arcade is not deleted".into()));
        }

        if db::arcades::api_key_taken_by_other(&self.pool, &arcade.api_key, arcade.id).await? {
            return Err(ApiError::BadRequest(
                "This arcade's API key is now used by another arcade. Generate a new API key first."
                    .into(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        db::arcades::restore_arcade(&mut *tx, arcade_id).await?;

        let assignments = db::arcades::deleted_assignments(&mut *tx, arcade_id).await?;
        let total_associations = assignments.len() as u64;
        let mut restored_associations = 0;

        for assignment in assignments {
            let game_alive = db::games::get_game_by_id(&mut *tx, assignment.game_id)
                .await?
                .is_some();
            let conflict = db::arcades::slot_conflict(
                &mut *tx,
                arcade_id,
                assignment.slot_number,
                assignment.id,
            )
            .await?;

            if game_alive && !conflict {
                db::arcades::restore_assignment(&mut *tx, assignment.id).await?;
                restored_associations += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            arcade_id,
            restored_associations,
            total_associations,
            "arcade restored"
        );
        Ok(ArcadeRestored {
            message: format!("Arcade '{}' restored", arcade.name),
            arcade_id,
            restored_associations,
            total_associations,
        })
    }

    pub async fn regenerate_api_key(&self, arcade_id: i32) -> Result<ApiKeyRotated, ApiError> {
        let arcade = db::arcades::get_arcade_by_id_any(&self.pool, arcade_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Arcade"))?;

        let api_key = self.unique_api_key().await?;
        db::arcades::set_api_key(&self.pool, arcade.id, &api_key).await?;

        tracing::info!(arcade_id, "arcade API key rotated");
        Ok(ApiKeyRotated {
            message: format!("API key for arcade '{}' regenerated", arcade.name),
            arcade_id: arcade.id,
            api_key,
        })
    }

    async fn unique_api_key(&self) -> Result<String, ApiError> {
        loop {
            let candidate = generate_api_key();
            if !db::arcades::api_key_exists(&self.pool, &candidate).await? {
                return Ok(candidate);
            }
        }
    }
}

fn generate_api_key() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ARCADE_API_KEY_SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("{ARCADE_API_KEY_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_carry_the_terminal_prefix() {
        let key = generate_api_key();
        assert!(key.starts_with(ARCADE_API_KEY_PREFIX));
        assert_eq!(
            key.len(),
            ARCADE_API_KEY_PREFIX.len() + ARCADE_API_KEY_SUFFIX_LEN
        );
        assert!(
            key[ARCADE_API_KEY_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        );
    }

    #[test]
    fn generated_keys_are_not_repeated() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a, b);
    }
}
