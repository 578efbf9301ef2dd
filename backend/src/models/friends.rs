use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "friendship_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Directed friend request; once accepted the pair is symmetric and either
/// party counts as the friend of the other.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub id: i32,
    pub requester_id: i32,
    pub requested_id: i32,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Incoming request joined with the requester's public profile.
#[derive(Debug, Clone, FromRow)]
pub struct FriendRequestDetail {
    pub id: i32,
    pub status: FriendshipStatus,
    pub requester_id: i32,
    pub requester_username: String,
    pub requester_first_name: String,
    pub requester_last_name: String,
    pub created_at: DateTime<Utc>,
}
