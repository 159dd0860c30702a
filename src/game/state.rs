//! Phase state machine
//!
//! Orchestrates the room-level phase transitions the host drives: starting
//! a set (`waiting → triunfo`), opening bidding after the reveal delay
//! (`triunfo → bidding`), and resetting for the next set
//! (`scoring → waiting`). The in-round transitions live in `rounds`.
//!
//! None of the multi-step sequences are atomic across the store; every
//! step is a separate write and other clients may observe any intermediate
//! state. Triggers are therefore guarded and re-validated against a fresh
//! room row, and each step stays idempotent rather than compensating.

use tracing::{info, warn};

use crate::entity::{PlayerPatch, RoomPatch, RoomPhase, RoomStatus};
use crate::error::GameError;
use crate::game::session::GameSession;
use crate::game::{dealing, rules};

impl GameSession {
    /// Host trigger for `waiting → triunfo`: clean up the previous set,
    /// reset per-set player fields, assign fresh turn order, deal, pick the
    /// triumph card, and flip the room into the reveal phase.
    ///
    /// Guarded against re-entry (double clicks raced this in the wild);
    /// a failure part-way resets the guard and aborts, leaving already
    /// committed steps for the next attempt to redo harmlessly.
    pub async fn start_set(&mut self) -> Result<(), GameError> {
        if !self.is_host() {
            return Err(GameError::NotHost);
        }
        if self.mirror.starting_set {
            return Err(GameError::StartInProgress);
        }
        if self.player_count() < rules::MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                found: self.player_count(),
            });
        }

        // Re-verify against the authoritative row, not the mirror.
        let room = self.store.fetch_room(self.room_id).await?;
        if !room.phase.can_transition(RoomPhase::Triunfo) {
            return Err(GameError::PhaseMismatch {
                expected: RoomPhase::Waiting,
                found: room.phase,
            });
        }

        self.mirror.starting_set = true;
        let next_set = room.current_set + 1;
        match self.run_start_sequence(next_set).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "set start aborted");
                self.mirror.starting_set = false;
                Err(err)
            }
        }
    }

    async fn run_start_sequence(&mut self, next_set: i32) -> Result<(), GameError> {
        // Previous set's rows must be gone before anything new is written.
        self.store.clear_hands(self.room_id).await?;
        self.store.clear_plays(self.room_id).await?;

        for player in self.store.fetch_players(self.room_id).await? {
            self.store
                .update_player(player.id, PlayerPatch::set_reset())
                .await?;
        }
        self.mirror.has_bid = false;

        let players = self.store.fetch_players(self.room_id).await?;
        let entries = dealing::shuffled_positions(self.room_id, &players);
        self.mirror.my_position = entries
            .iter()
            .find(|e| e.player_id == self.player_id)
            .map(|e| e.position as usize)
            .unwrap_or(0);
        dealing::persist_turn_order(self.store.as_ref(), self.room_id, entries).await?;

        let deck = self.store.fetch_cards().await?;
        let outcome = dealing::partition_deck(&deck, &players)?;
        dealing::persist_deal(self.store.as_ref(), self.room_id, &outcome).await?;

        info!(
            set = next_set,
            triunfo = %outcome.triunfo.name,
            players = players.len(),
            "set started"
        );

        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    status: Some(RoomStatus::Playing),
                    phase: Some(RoomPhase::Triunfo),
                    current_set: Some(next_set),
                    current_round: Some(0),
                    triunfo_card_id: Some(Some(outcome.triunfo.id)),
                    current_attribute: Some(None),
                    round_starter_position: Some(0),
                    ..Default::default()
                },
            )
            .await?;

        self.mirror.room.status = RoomStatus::Playing;
        self.mirror.room.phase = RoomPhase::Triunfo;
        self.mirror.triunfo = Some(outcome.triunfo);
        self.reload_hand().await?;
        Ok(())
    }

    /// The `triunfo → bidding` write. Host-only and fired exactly once per
    /// set: a duplicate or stale trigger fails the phase re-check instead
    /// of double-writing.
    pub async fn begin_bidding(&mut self) -> Result<(), GameError> {
        if !self.is_host() {
            return Err(GameError::NotHost);
        }
        let room = self.store.fetch_room(self.room_id).await?;
        if !room.phase.can_transition(RoomPhase::Bidding) {
            return Err(GameError::PhaseMismatch {
                expected: RoomPhase::Triunfo,
                found: room.phase,
            });
        }

        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    phase: Some(RoomPhase::Bidding),
                    ..Default::default()
                },
            )
            .await?;
        self.mirror.room.phase = RoomPhase::Bidding;
        self.mirror.starting_set = false;
        info!("bidding open");
        Ok(())
    }

    /// Hold the triumph reveal on screen for its fixed delay, then open
    /// bidding. Host convenience wrapper around `begin_bidding`.
    pub async fn run_triunfo_timer(&mut self) -> Result<(), GameError> {
        tokio::time::sleep(rules::TRIUNFO_REVEAL_DELAY).await;
        self.begin_bidding().await
    }

    /// `scoring → waiting`: park the room until the host starts the next
    /// set. Hands, turn order and per-set player fields are re-initialized
    /// by the next start, not here.
    pub(crate) async fn prepare_next_set(&mut self) -> Result<(), GameError> {
        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    phase: Some(RoomPhase::Waiting),
                    status: Some(RoomStatus::Waiting),
                    ..Default::default()
                },
            )
            .await?;

        self.mirror.room.phase = RoomPhase::Waiting;
        self.mirror.room.status = RoomStatus::Waiting;
        self.mirror.my_hand.clear();
        self.mirror.triunfo = None;
        self.mirror.has_bid = false;
        self.mirror.starting_set = false;
        info!("set complete, waiting for host to start the next one");
        Ok(())
    }
}
