//! Bidding coordinator
//!
//! Collects each player's predicted round-win count for the set and moves
//! the room into play once everyone has committed. Bids arrive from
//! independent clients in no particular order, so completion is a
//! commutative "count of has_bid" re-poll rather than an ordered sequence;
//! the poll is the deliberate fallback for notification delivery gaps.

use tracing::{debug, info, warn};

use crate::entity::{PlayerPatch, RoomPatch, RoomPhase};
use crate::error::GameError;
use crate::game::rules;
use crate::game::session::GameSession;

impl GameSession {
    /// Commit this player's bid for the current set.
    ///
    /// The local "I have bid" flag is set optimistically and rolled back if
    /// the write fails, so the UI re-offers the choice on error.
    pub async fn submit_bid(&mut self, bid: i32) -> Result<(), GameError> {
        if self.mirror.room.phase != RoomPhase::Bidding {
            return Err(GameError::PhaseMismatch {
                expected: RoomPhase::Bidding,
                found: self.mirror.room.phase,
            });
        }
        if self.mirror.has_bid {
            return Err(GameError::AlreadyBid);
        }
        let max = self.mirror.cards_per_player as i32;
        if !rules::is_valid_bid(bid, self.mirror.cards_per_player) {
            return Err(GameError::BidOutOfRange { bid, max });
        }

        self.mirror.has_bid = true;
        let write = self
            .store
            .update_player(
                self.player_id,
                PlayerPatch {
                    predicted_rounds: Some(Some(bid)),
                    has_bid: Some(true),
                    ..Default::default()
                },
            )
            .await;

        if let Err(err) = write {
            self.mirror.has_bid = false;
            return Err(err.into());
        }
        info!(bid, "bid submitted");

        // One immediate completion check; a failure here never unwinds the
        // bid, it just leaves completion to a later poll.
        if let Err(err) = self.check_all_players_bid().await {
            warn!(error = %err, "bid completion check failed, will re-poll");
        }
        Ok(())
    }

    /// Re-fetch the player list and move to the playing phase when every
    /// seat has bid. Returns true once bidding is over (whether this call
    /// performed the transition or another client already had).
    pub async fn check_all_players_bid(&mut self) -> Result<bool, GameError> {
        let room = self.store.fetch_room(self.room_id).await?;
        match room.phase {
            RoomPhase::Bidding => {}
            // Someone else's check won the race; bidding is done.
            RoomPhase::Playing => return Ok(true),
            _ => return Ok(false),
        }

        let players = self.store.fetch_players(self.room_id).await?;
        let bid_count = players.iter().filter(|p| p.has_bid).count();
        debug!(bid_count, total = players.len(), "bidding progress");

        if rules::all_bids_submitted(bid_count, players.len()) {
            self.transition_to_playing().await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Bounded re-check loop covering eventual-consistency lag in the
    /// change stream. Gives up after `BID_POLL_ATTEMPTS`; a later bidder's
    /// own check (or a fresh poll) picks completion up from there.
    pub async fn poll_for_bidding_complete(&mut self) -> Result<bool, GameError> {
        for attempt in 0..rules::BID_POLL_ATTEMPTS {
            match self.check_all_players_bid().await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) => warn!(attempt, error = %err, "bid poll failed"),
            }
            tokio::time::sleep(rules::BID_POLL_INTERVAL).await;
        }
        Ok(false)
    }

    async fn transition_to_playing(&mut self) -> Result<(), GameError> {
        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    phase: Some(RoomPhase::Playing),
                    current_round: Some(1),
                    current_attribute: Some(None),
                    round_starter_position: Some(0),
                    ..Default::default()
                },
            )
            .await?;
        self.mirror.room.phase = RoomPhase::Playing;
        self.mirror.room.current_round = 1;
        self.mirror.room.current_attribute = None;
        self.mirror.room.round_starter_position = 0;
        info!("all bids in, round 1 begins");
        Ok(())
    }
}
