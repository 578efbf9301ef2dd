use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Arcade {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub api_key: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Association of one game to one cabinet slot on a terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArcadeGame {
    pub id: i32,
    pub arcade_id: i32,
    pub game_id: i32,
    pub slot_number: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Joined view of a game installed on a terminal slot.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GameOnArcade {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub min_players: i32,
    pub max_players: i32,
    pub ticket_cost: i32,
    pub slot_number: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewArcade {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}
