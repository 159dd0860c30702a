use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cards::Card;

/// One dealt card in a player's hand. `played` flips to true exactly once,
/// when the card is played; rows are only deleted by the next set's cleanup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandCard {
    pub id: Uuid,
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub card_id: Uuid,
    pub played: bool,
}

impl HandCard {
    pub fn new(room_id: Uuid, player_id: Uuid, card_id: Uuid) -> Self {
        HandCard {
            id: Uuid::new_v4(),
            room_id,
            player_id,
            card_id,
            played: false,
        }
    }
}

/// A hand row joined with its catalog card, as hand fetches return it.
#[derive(Clone, Debug, PartialEq)]
pub struct HandRow {
    pub hand: HandCard,
    pub card: Card,
}
