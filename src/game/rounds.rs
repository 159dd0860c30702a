//! Round resolver
//!
//! One round: the starter picks an attribute and plays first, everyone else
//! follows in turn-order rotation, and the highest effective value takes
//! the round. Whose turn it is is never stored per player — it is derived
//! from the count of plays already on the table, so a stale mirror cannot
//! put two players "on turn" at once.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity::{Attribute, PlayerPatch, RoomPatch, RoomPhase, RoundPlay};
use crate::error::GameError;
use crate::game::rules;
use crate::game::scoring::SetOutcome;
use crate::game::session::GameSession;

/// What a successful `play_card` tells the caller to do next.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayOutcome {
    /// This play was the round's last; the caller should invoke
    /// `resolve_round` after the settle delay. Exactly one client — the
    /// one that played last — schedules resolution.
    pub round_complete: bool,
}

/// Result of a `resolve_round` invocation.
#[derive(Debug)]
pub enum RoundResolution {
    /// Not every play had arrived yet; nothing was changed.
    Pending,
    /// Round won; the winner starts the next one.
    NextRound { winner_id: Uuid, round: i32 },
    /// All hands are empty; the set was scored.
    SetComplete(SetOutcome),
}

/// Pick the winning play: maximum `value`, ties broken by maximum
/// `tiebreak_total`, still-tied falls to the first-recorded play.
///
/// Strict `>` comparisons keep the reduction deterministic over the fixed
/// insertion order.
pub fn decide_winner(plays: &[RoundPlay]) -> Option<&RoundPlay> {
    let mut winner: Option<&RoundPlay> = None;
    for play in plays {
        match winner {
            None => winner = Some(play),
            Some(current) => {
                let beats_value = play.value > current.value;
                let beats_tie =
                    play.value == current.value && play.tiebreak_total > current.tiebreak_total;
                if beats_value || beats_tie {
                    winner = Some(play);
                }
            }
        }
    }
    winner
}

impl GameSession {
    /// The round starter picks the attribute every card in this round is
    /// compared on. Legal only for the starter, once per round, before any
    /// card is played.
    pub async fn select_attribute(&mut self, attribute: Attribute) -> Result<(), GameError> {
        let room = self.store.fetch_room(self.room_id).await?;
        if room.phase != RoomPhase::Playing {
            return Err(GameError::PhaseMismatch {
                expected: RoomPhase::Playing,
                found: room.phase,
            });
        }
        if self.mirror.my_position != room.round_starter_position as usize {
            return Err(GameError::NotYourTurn {
                expected: room.round_starter_position as usize,
                position: self.mirror.my_position,
            });
        }
        if room.current_attribute.is_some() {
            return Err(GameError::AttributeAlreadySet);
        }

        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    current_attribute: Some(Some(attribute)),
                    ..Default::default()
                },
            )
            .await?;
        self.mirror.room.current_attribute = Some(attribute);
        info!(attribute = %attribute, "attribute selected");
        Ok(())
    }

    /// Play one card from the own hand into the current round.
    ///
    /// The acting position is re-derived from the fresh play count on every
    /// call — previously read state is never trusted. The triumph card's
    /// effective value is the sentinel, whatever its printed attributes.
    pub async fn play_card(&mut self, card_id: Uuid) -> Result<PlayOutcome, GameError> {
        let room = self.store.fetch_room(self.room_id).await?;
        if room.phase != RoomPhase::Playing {
            return Err(GameError::PhaseMismatch {
                expected: RoomPhase::Playing,
                found: room.phase,
            });
        }

        let row = self
            .mirror
            .my_hand
            .iter()
            .find(|r| r.card.id == card_id)
            .cloned()
            .ok_or(GameError::CardNotInHand(card_id))?;

        let plays = self.store.fetch_plays(self.room_id).await?;
        let player_count = self.player_count();
        let starter = room.round_starter_position as usize;
        let expected = rules::acting_position(starter, plays.len(), player_count);
        if self.mirror.my_position != expected {
            return Err(GameError::NotYourTurn {
                expected,
                position: self.mirror.my_position,
            });
        }

        // The opener must have picked the attribute before playing.
        let attribute = room
            .current_attribute
            .ok_or(GameError::AttributeNotSelected)?;

        let is_triunfo = room.triunfo_card_id == Some(card_id);
        let value = if is_triunfo {
            rules::TRIUNFO_VALUE
        } else {
            row.card.value(attribute)
        };

        self.store
            .insert_play(RoundPlay {
                id: Uuid::new_v4(),
                room_id: self.room_id,
                player_id: self.player_id,
                card_id,
                attribute,
                value,
                tiebreak_total: row.card.total_stats(),
                played_at: Utc::now(),
            })
            .await?;
        self.store.mark_card_played(row.hand.id).await?;

        // Optimistic: the card leaves the local hand immediately.
        self.mirror.my_hand.retain(|r| r.card.id != card_id);

        info!(
            card = %row.card.name,
            value,
            triunfo = is_triunfo,
            "card played"
        );

        Ok(PlayOutcome {
            round_complete: plays.len() + 1 >= player_count,
        })
    }

    /// Resolve the current round once every player's play is on the table.
    ///
    /// Invoked by the client whose play completed the round, after the
    /// settle delay. Re-validates the play count first: invoked early (the
    /// notification stream can lag) it backs out without side effects.
    pub async fn resolve_round(&mut self) -> Result<RoundResolution, GameError> {
        let room = self.store.fetch_room(self.room_id).await?;
        let players = self.store.fetch_players(self.room_id).await?;
        let plays = self.store.fetch_plays(self.room_id).await?;
        if plays.len() < players.len() {
            debug!(
                plays = plays.len(),
                players = players.len(),
                "round not complete yet, skipping resolution"
            );
            return Ok(RoundResolution::Pending);
        }

        let winner = match decide_winner(&plays) {
            Some(winner) => winner.clone(),
            None => return Ok(RoundResolution::Pending),
        };
        let winner_player = players
            .iter()
            .find(|p| p.id == winner.player_id)
            .ok_or(crate::error::StoreError::NotFound { table: "players" })?;

        self.store
            .update_player(
                winner.player_id,
                PlayerPatch {
                    won_rounds: Some(winner_player.won_rounds + 1),
                    ..Default::default()
                },
            )
            .await?;
        info!(
            winner = self.player_name(winner.player_id),
            value = winner.value,
            "round won"
        );

        self.store.clear_plays(self.room_id).await?;

        // The unplayed count across all players is the set-over signal; it
        // holds for any player count, unlike a round counter.
        let remaining = self.store.count_unplayed(self.room_id).await?;
        if remaining == 0 {
            let outcome = self.end_set().await?;
            return Ok(RoundResolution::SetComplete(outcome));
        }

        let turn_order = self.store.fetch_turn_order(self.room_id).await?;
        let next_starter = turn_order
            .iter()
            .find(|t| t.player_id == winner.player_id)
            .map(|t| t.position)
            .unwrap_or(0);
        let next_round = room.current_round + 1;

        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    current_round: Some(next_round),
                    current_attribute: Some(None),
                    round_starter_position: Some(next_starter),
                    ..Default::default()
                },
            )
            .await?;
        self.mirror.room.current_round = next_round;
        self.mirror.room.current_attribute = None;
        self.mirror.room.round_starter_position = next_starter;

        info!(round = next_round, starter = next_starter, "next round begins");
        Ok(RoundResolution::NextRound {
            winner_id: winner.player_id,
            round: next_round,
        })
    }

    /// Let the last play settle on screen, then resolve. Convenience for
    /// the client that received `round_complete`.
    pub async fn run_resolve_timer(&mut self) -> Result<RoundResolution, GameError> {
        tokio::time::sleep(rules::RESOLVE_SETTLE_DELAY).await;
        self.resolve_round().await
    }
}
