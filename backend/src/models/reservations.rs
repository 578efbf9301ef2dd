use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Waiting,
    Playing,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Active states block user/arcade/game deletion.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::Playing)
    }

    /// Only a waiting reservation can be cancelled by its player.
    pub fn is_cancellable(self) -> bool {
        self == Self::Waiting
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: i32,
    pub player_id: i32,
    pub player2_id: Option<i32>,
    pub arcade_id: i32,
    pub game_id: i32,
    pub unlock_code: String,
    pub status: ReservationStatus,
    pub tickets_used: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Reservation joined with the names a client needs to render it.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDetail {
    pub id: i32,
    pub player_id: i32,
    pub player2_id: Option<i32>,
    pub arcade_id: i32,
    pub arcade_name: String,
    pub game_name: String,
    pub player_username: String,
    pub player2_username: Option<String>,
    pub unlock_code: String,
    pub status: ReservationStatus,
    pub tickets_used: i32,
    pub created_at: DateTime<Utc>,
}

/// One entry of a terminal's FIFO waiting list.
#[derive(Debug, Clone, FromRow)]
pub struct QueueEntry {
    pub id: i32,
    pub player_id: i32,
    pub player_username: String,
    pub player2_id: Option<i32>,
    pub player2_username: Option<String>,
    pub game_id: i32,
    pub game_name: String,
    pub unlock_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_waiting_and_playing_are_active() {
        assert!(ReservationStatus::Waiting.is_active());
        assert!(ReservationStatus::Playing.is_active());
        assert!(!ReservationStatus::Completed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::from_str::<ReservationStatus>("\"cancelled\"").unwrap(),
            ReservationStatus::Cancelled
        );
    }

    #[test]
    fn only_waiting_is_cancellable() {
        assert!(ReservationStatus::Waiting.is_cancellable());
        assert!(!ReservationStatus::Playing.is_cancellable());
        assert!(!ReservationStatus::Completed.is_cancellable());
        assert!(!ReservationStatus::Cancelled.is_cancellable());
    }
}
