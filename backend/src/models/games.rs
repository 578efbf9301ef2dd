use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub min_players: i32,
    pub max_players: i32,
    pub ticket_cost: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Game {
    /// Whether a session with `player_count` participants is allowed.
    pub fn allows_player_count(&self, player_count: i32) -> bool {
        (self.min_players..=self.max_players).contains(&player_count)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGame {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub min_players: i32,
    pub max_players: i32,
    pub ticket_cost: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GamePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub ticket_cost: Option<i32>,
}

impl GamePatch {
    pub fn updated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.min_players.is_some() {
            fields.push("min_players");
        }
        if self.max_players.is_some() {
            fields.push("max_players");
        }
        if self.ticket_cost.is_some() {
            fields.push("ticket_cost");
        }
        fields
    }
}

/// Terminal placement of a game, for admin listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArcadePlacement {
    pub arcade_id: i32,
    pub arcade_name: String,
    pub arcade_location: String,
    pub slot_number: i32,
    pub assigned_at: DateTime<Utc>,
}

/// Per-terminal reservation volume for a game over a stats window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArcadePopularity {
    pub arcade_id: i32,
    pub arcade_name: String,
    pub reservations: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn game(min: i32, max: i32) -> Game {
        Game {
            id: 1,
            name: "Pixel Brawl".into(),
            description: String::new(),
            min_players: min,
            max_players: max,
            ticket_cost: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            is_deleted: false,
        }
    }

    #[test]
    fn player_count_bounds_are_inclusive() {
        let g = game(1, 2);
        assert!(g.allows_player_count(1));
        assert!(g.allows_player_count(2));
        assert!(!g.allows_player_count(0));
        assert!(!g.allows_player_count(3));
    }

    #[test]
    fn patch_reports_touched_fields() {
        let patch = GamePatch {
            ticket_cost: Some(3),
            name: Some("Pixel Brawl II".into()),
            ..Default::default()
        };
        assert_eq!(patch.updated_fields(), vec!["name", "ticket_cost"]);
    }
}
