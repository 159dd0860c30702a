use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cards::Attribute;

/// One card played into the current round. Rows live only for the duration
/// of a round and are deleted in bulk when it resolves.
///
/// `value` is the card's effective comparison value (the triumph sentinel
/// when the triumph card is played); `tiebreak_total` is the card's summed
/// attribute total, recorded at play time so resolution never needs the
/// catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundPlay {
    pub id: Uuid,
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub card_id: Uuid,
    pub attribute: Attribute,
    pub value: i32,
    pub tiebreak_total: i32,
    pub played_at: DateTime<Utc>,
}
