use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One seated participant in a room.
///
/// `predicted_rounds`, `won_rounds` and `has_bid` are per-set fields and are
/// reset when a new set starts; `total_score` accumulates across sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub seat_number: i32,
    pub predicted_rounds: Option<i32>,
    pub has_bid: bool,
    pub won_rounds: i32,
    pub total_score: i32,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Partial update for a player row. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct PlayerPatch {
    pub predicted_rounds: Option<Option<i32>>,
    pub has_bid: Option<bool>,
    pub won_rounds: Option<i32>,
    pub total_score: Option<i32>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl PlayerPatch {
    /// The per-set reset applied to every player before a new deal.
    pub fn set_reset() -> Self {
        PlayerPatch {
            predicted_rounds: Some(None),
            has_bid: Some(false),
            won_rounds: Some(0),
            ..Default::default()
        }
    }

    pub fn apply(&self, player: &mut Player) {
        if let Some(predicted) = self.predicted_rounds {
            player.predicted_rounds = predicted;
        }
        if let Some(has_bid) = self.has_bid {
            player.has_bid = has_bid;
        }
        if let Some(won) = self.won_rounds {
            player.won_rounds = won;
        }
        if let Some(total) = self.total_score {
            player.total_score = total;
        }
        if let Some(seen) = self.last_seen {
            player.last_seen = Some(seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> Player {
        Player {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            seat_number: 1,
            predicted_rounds: Some(4),
            has_bid: true,
            won_rounds: 3,
            total_score: 12,
            last_seen: None,
        }
    }

    #[test]
    fn test_set_reset_clears_per_set_fields_only() {
        let mut player = sample_player();
        PlayerPatch::set_reset().apply(&mut player);

        assert_eq!(player.predicted_rounds, None);
        assert!(!player.has_bid);
        assert_eq!(player.won_rounds, 0);
        // Total score persists across sets.
        assert_eq!(player.total_score, 12);
    }

    #[test]
    fn test_empty_patch_is_a_no_op() {
        let mut player = sample_player();
        let before = player.clone();
        PlayerPatch::default().apply(&mut player);
        assert_eq!(player, before);
    }
}
