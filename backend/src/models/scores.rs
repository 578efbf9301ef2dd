use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Result of a completed session. `player2_id`/`score2` are null for solo
/// games. Score rows survive user deletion to keep game history intact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Score {
    pub id: i32,
    pub player1_id: i32,
    pub player2_id: Option<i32>,
    pub game_id: i32,
    pub arcade_id: i32,
    pub score1: i32,
    pub score2: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

/// Score joined with player/game/arcade names for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ScoreDetail {
    pub id: i32,
    pub player1_id: i32,
    pub player1_username: String,
    pub player2_id: Option<i32>,
    pub player2_username: Option<String>,
    pub game_name: String,
    pub arcade_name: String,
    pub score1: i32,
    pub score2: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl ScoreDetail {
    pub fn is_single_player(&self) -> bool {
        self.player2_id.is_none()
    }

    /// Winner of a versus session; `None` for solo sessions and draws.
    pub fn winner_username(&self) -> Option<&str> {
        let score2 = self.score2?;
        self.player2_username.as_deref()?;
        if self.score1 > score2 {
            Some(self.player1_username.as_str())
        } else if score2 > self.score1 {
            self.player2_username.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn detail(score1: i32, score2: Option<i32>, p2: Option<&str>) -> ScoreDetail {
        ScoreDetail {
            id: 1,
            player1_id: 10,
            player1_username: "alice".into(),
            player2_id: p2.map(|_| 11),
            player2_username: p2.map(str::to_owned),
            game_name: "Pixel Brawl".into(),
            arcade_name: "Downtown".into(),
            score1,
            score2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn solo_sessions_have_no_winner() {
        let d = detail(1200, None, None);
        assert!(d.is_single_player());
        assert_eq!(d.winner_username(), None);
    }

    #[test]
    fn higher_score_wins() {
        assert_eq!(
            detail(10, Some(7), Some("bob")).winner_username(),
            Some("alice")
        );
        assert_eq!(
            detail(3, Some(7), Some("bob")).winner_username(),
            Some("bob")
        );
    }

    #[test]
    fn equal_scores_are_a_draw() {
        assert_eq!(detail(5, Some(5), Some("bob")).winner_username(), None);
    }
}
