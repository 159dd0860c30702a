//! Game rules module
//!
//! Pure game rules, constants and validation helpers that depend only on
//! in-memory domain types and std.

use std::time::Duration;

/// Number of cards in the catalog deck.
pub const DECK_SIZE: usize = 40;

/// Minimum players needed to start a set.
pub const MIN_PLAYERS: usize = 2;

/// Maximum players a room seats.
pub const MAX_PLAYERS: usize = 5;

/// Total score at which the game ends.
pub const WINNING_SCORE: i32 = 50;

/// Effective comparison value of the triumph card, above any printed
/// attribute value.
pub const TRIUNFO_VALUE: i32 = 99;

/// How long the triumph card stays revealed before bidding opens.
pub const TRIUNFO_REVEAL_DELAY: Duration = Duration::from_millis(2000);

/// Pause between the last play of a round landing and resolution, so the
/// play can visually settle on every client.
pub const RESOLVE_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Interval between "has everyone bid?" re-polls.
pub const BID_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound on bid re-polls before the coordinator gives up.
pub const BID_POLL_ATTEMPTS: usize = 20;

/// Cards dealt to each player, by player count. Fixed game rule.
pub fn cards_per_player(player_count: usize) -> Option<usize> {
    match player_count {
        2 => Some(20),
        3 => Some(13),
        4 => Some(10),
        5 => Some(8),
        _ => None,
    }
}

/// Validate a bid against the hand size for this set.
pub fn is_valid_bid(bid: i32, cards_per_player: usize) -> bool {
    bid >= 0 && bid <= cards_per_player as i32
}

/// Whether every seated player has committed a bid.
pub fn all_bids_submitted(bid_count: usize, player_count: usize) -> bool {
    bid_count >= player_count
}

/// The turn-order position expected to act next, given how many plays have
/// already been recorded this round.
pub fn acting_position(round_starter: usize, play_count: usize, player_count: usize) -> usize {
    (round_starter + play_count) % player_count
}
