use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub firebase_uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub tickets_balance: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Profile fields supplied at registration. The identity subject comes from
/// the verified bearer token, never from the request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub birth_date: NaiveDate,
    pub phone: String,
}

/// Optional-field patch merged onto the persisted row; absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.birth_date.is_none()
            && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());

        let patch = UserPatch {
            username: Some("player_one".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
