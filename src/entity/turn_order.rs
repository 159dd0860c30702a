use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maps a player to a fixed position in `[0, player_count)` for one set.
///
/// Entries are regenerated from scratch each set; positions form a
/// permutation with no gaps or duplicates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnOrderEntry {
    pub id: Uuid,
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub position: i32,
}
