//! Scoring engine
//!
//! At set end, turns every player's (predicted, won) pair into a score
//! delta, accumulates running totals, and decides whether the game is over
//! or the room resets for another set.

use tracing::info;
use uuid::Uuid;

use crate::entity::{PlayerPatch, RoomPatch, RoomPhase, RoomStatus};
use crate::error::GameError;
use crate::game::rules;
use crate::game::session::GameSession;

/// Points for one set: two per round won, plus three for an exact
/// prediction or minus two for a miss.
pub fn set_points(predicted: i32, won: i32) -> i32 {
    let base = won * 2;
    if predicted == won {
        base + 3
    } else {
        base - 2
    }
}

/// One player's line in the set result table.
#[derive(Clone, Debug, PartialEq)]
pub struct SetResult {
    pub player_id: Uuid,
    pub name: String,
    pub predicted: i32,
    pub won: i32,
    pub points: i32,
    pub total: i32,
}

/// The scored set, ordered by running total, plus whether the game ended.
#[derive(Debug)]
pub struct SetOutcome {
    pub results: Vec<SetResult>,
    pub game_over: bool,
}

impl GameSession {
    /// Score the finished set: every player in the same pass, no early
    /// exit. A running total at or above the winning score ends the whole
    /// game; otherwise the room parks in waiting for the next set.
    pub(crate) async fn end_set(&mut self) -> Result<SetOutcome, GameError> {
        self.store
            .update_room(
                self.room_id,
                RoomPatch {
                    phase: Some(RoomPhase::Scoring),
                    ..Default::default()
                },
            )
            .await?;
        self.mirror.room.phase = RoomPhase::Scoring;
        self.mirror.my_hand.clear();

        let players = self.store.fetch_players(self.room_id).await?;
        let mut results = Vec::with_capacity(players.len());
        for player in &players {
            let predicted = player.predicted_rounds.unwrap_or(0);
            let won = player.won_rounds;
            let points = set_points(predicted, won);
            let total = player.total_score + points;

            self.store
                .update_player(
                    player.id,
                    PlayerPatch {
                        total_score: Some(total),
                        ..Default::default()
                    },
                )
                .await?;

            results.push(SetResult {
                player_id: player.id,
                name: player.name.clone(),
                predicted,
                won,
                points,
                total,
            });
        }

        results.sort_by(|a, b| b.total.cmp(&a.total));
        for r in &results {
            info!(
                player = %r.name,
                predicted = r.predicted,
                won = r.won,
                points = r.points,
                total = r.total,
                "set scored"
            );
        }

        let winner = results.iter().find(|r| r.total >= rules::WINNING_SCORE);
        if let Some(winner) = winner {
            info!(winner = %winner.name, total = winner.total, "game over");
            self.store
                .update_room(
                    self.room_id,
                    RoomPatch {
                        status: Some(RoomStatus::Ended),
                        ended_reason: Some(Some("completed".to_string())),
                        ..Default::default()
                    },
                )
                .await?;
            self.mirror.room.status = RoomStatus::Ended;
            self.mirror.room.ended_reason = Some("completed".to_string());
            return Ok(SetOutcome {
                results,
                game_over: true,
            });
        }

        self.prepare_next_set().await?;
        Ok(SetOutcome {
            results,
            game_over: false,
        })
    }
}
