//! Client state mirror
//!
//! Each browser tab (or simulated client) owns one `GameSession`: a local
//! cache of the shared room, player list, own hand and turn-order position,
//! kept consistent with the data store by reconciling every incoming change
//! event. The room record is authoritative; the mirror never argues with it.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entity::{Card, HandRow, Player, Room, RoomPhase, RoomStatus};
use crate::error::GameError;
use crate::game::rules;
use crate::store::{Change, DataStore, StoreEvent};

/// The per-tab cache of shared state.
#[derive(Debug)]
pub struct Mirror {
    pub room: Room,
    pub players: Vec<Player>,
    /// Unplayed cards only; played cards are dropped optimistically.
    pub my_hand: Vec<HandRow>,
    pub my_position: usize,
    pub triunfo: Option<Card>,
    pub has_bid: bool,
    /// Re-entrancy guard for the host's start-set trigger.
    pub starting_set: bool,
    pub cards_per_player: usize,
}

/// What a reconciled change event means for the caller (UI, simulator).
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    None,
    PlayersChanged,
    PhaseChanged { from: RoomPhase, to: RoomPhase },
    RoomChanged,
    PlayRecorded,
    GameEnded { reason: Option<String> },
}

pub struct GameSession {
    pub(crate) store: Arc<dyn DataStore>,
    pub(crate) player_id: Uuid,
    pub(crate) room_id: Uuid,
    pub(crate) mirror: Mirror,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("player_id", &self.player_id)
            .field("room_id", &self.room_id)
            .field("mirror", &self.mirror)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Join an existing room by code and build the initial mirror.
    ///
    /// The room must not have ended; a room already mid-set is picked up
    /// where it stands (reconnect into a running game).
    pub async fn join(
        store: Arc<dyn DataStore>,
        code: &str,
        player_id: Uuid,
    ) -> Result<GameSession, GameError> {
        let room = store.fetch_room_by_code(code).await?;
        if room.status == RoomStatus::Ended {
            return Err(GameError::RoomEnded {
                reason: room.ended_reason,
            });
        }

        let players = store.fetch_players(room.id).await?;
        let cards_per_player = rules::cards_per_player(players.len()).unwrap_or(0);
        let room_id = room.id;
        let resume = room.status == RoomStatus::Playing;

        let mut session = GameSession {
            store,
            player_id,
            room_id,
            mirror: Mirror {
                room,
                players,
                my_hand: Vec::new(),
                my_position: 0,
                triunfo: None,
                has_bid: false,
                starting_set: false,
                cards_per_player,
            },
        };

        if resume {
            session.reload_game_state().await?;
        }

        info!(room = %code, player = %player_id, "joined room");
        Ok(session)
    }

    pub fn room(&self) -> &Room {
        &self.mirror.room
    }

    pub fn players(&self) -> &[Player] {
        &self.mirror.players
    }

    pub fn player_count(&self) -> usize {
        self.mirror.players.len()
    }

    pub fn my_hand(&self) -> &[HandRow] {
        &self.mirror.my_hand
    }

    pub fn my_position(&self) -> usize {
        self.mirror.my_position
    }

    pub fn triunfo(&self) -> Option<&Card> {
        self.mirror.triunfo.as_ref()
    }

    pub fn has_bid(&self) -> bool {
        self.mirror.has_bid
    }

    pub fn is_host(&self) -> bool {
        self.mirror.room.host_id == self.player_id
    }

    pub(crate) fn player_name(&self, player_id: Uuid) -> &str {
        self.mirror
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.as_str())
            .unwrap_or("another player")
    }

    /// Re-fetch the own hand, keeping only unplayed cards.
    ///
    /// The acting client must call this after dealing: its own writes do
    /// not come back through the change stream as new data.
    pub async fn reload_hand(&mut self) -> Result<(), GameError> {
        let rows = self.store.fetch_hand(self.room_id, self.player_id).await?;
        self.mirror.my_hand = rows.into_iter().filter(|r| !r.hand.played).collect();
        debug!(cards = self.mirror.my_hand.len(), "hand reloaded");
        Ok(())
    }

    /// Rebuild the whole mirror from the store: room, players, turn-order
    /// position, own bid flag, triumph card and hand.
    pub async fn reload_game_state(&mut self) -> Result<(), GameError> {
        let room = self.store.fetch_room(self.room_id).await?;
        self.mirror.players = self.store.fetch_players(self.room_id).await?;
        self.mirror.cards_per_player =
            rules::cards_per_player(self.mirror.players.len()).unwrap_or(0);

        let turn_order = self.store.fetch_turn_order(self.room_id).await?;
        self.mirror.my_position = turn_order
            .iter()
            .find(|t| t.player_id == self.player_id)
            .map(|t| t.position as usize)
            .unwrap_or(0);

        self.mirror.has_bid = self
            .mirror
            .players
            .iter()
            .find(|p| p.id == self.player_id)
            .map(|p| p.has_bid)
            .unwrap_or(false);

        self.mirror.triunfo = match room.triunfo_card_id {
            Some(card_id) => Some(self.store.fetch_card(card_id).await?),
            None => None,
        };
        self.mirror.room = room;
        self.reload_hand().await?;
        Ok(())
    }

    /// Reconcile one change event from the subscription stream into the
    /// mirror. Events may arrive late, duplicated or out of order; the
    /// incoming row always wins over the cached copy.
    pub async fn apply_event(&mut self, event: StoreEvent) -> Result<SessionUpdate, GameError> {
        match event {
            StoreEvent::Room(Change::Update { old, new }) => self.apply_room_update(old, new).await,
            // Room rows are created by the lobby and deleted by cleanup;
            // neither reaches a live session.
            StoreEvent::Room(_) => Ok(SessionUpdate::None),
            StoreEvent::Player(change) => Ok(self.apply_player_change(change)),
            StoreEvent::Play(Change::Insert { .. }) => Ok(SessionUpdate::PlayRecorded),
            StoreEvent::Play(_) => Ok(SessionUpdate::None),
        }
    }

    async fn apply_room_update(
        &mut self,
        old: Room,
        new: Room,
    ) -> Result<SessionUpdate, GameError> {
        let phase_changed = old.phase != new.phase;
        debug!(from = %old.phase, to = %new.phase, "room update");

        // The start we triggered has been committed; drop the guard.
        if old.status == RoomStatus::Waiting && new.status == RoomStatus::Playing {
            self.mirror.starting_set = false;
        }

        if new.triunfo_card_id != self.mirror.triunfo.as_ref().map(|c| c.id) {
            self.mirror.triunfo = match new.triunfo_card_id {
                Some(card_id) => Some(self.store.fetch_card(card_id).await?),
                None => None,
            };
        }

        self.mirror.room = new.clone();

        if new.status == RoomStatus::Ended {
            warn!(reason = ?new.ended_reason, "game ended");
            return Ok(SessionUpdate::GameEnded {
                reason: new.ended_reason,
            });
        }

        // Hands exist once the triumph reveal ends; positions and bid flags
        // matter once play begins.
        if old.phase == RoomPhase::Triunfo && new.phase == RoomPhase::Bidding {
            self.reload_hand().await?;
        }
        if old.phase == RoomPhase::Bidding && new.phase == RoomPhase::Playing {
            self.reload_game_state().await?;
        }

        if phase_changed {
            Ok(SessionUpdate::PhaseChanged {
                from: old.phase,
                to: new.phase,
            })
        } else {
            Ok(SessionUpdate::RoomChanged)
        }
    }

    fn apply_player_change(&mut self, change: Change<Player>) -> SessionUpdate {
        match change {
            Change::Insert { new } => {
                if !self.mirror.players.iter().any(|p| p.id == new.id) {
                    info!(player = %new.name, "player joined");
                    self.mirror.players.push(new);
                    self.mirror.players.sort_by_key(|p| p.seat_number);
                }
            }
            Change::Update { new, .. } => {
                if new.id == self.player_id {
                    self.mirror.has_bid = new.has_bid;
                }
                match self.mirror.players.iter_mut().find(|p| p.id == new.id) {
                    Some(player) => *player = new,
                    None => {
                        self.mirror.players.push(new);
                        self.mirror.players.sort_by_key(|p| p.seat_number);
                    }
                }
            }
            Change::Delete { old } => {
                info!(player = %old.name, "player left");
                self.mirror.players.retain(|p| p.id != old.id);
            }
        }
        self.mirror.cards_per_player =
            rules::cards_per_player(self.mirror.players.len()).unwrap_or(0);
        SessionUpdate::PlayersChanged
    }

    /// Heartbeat body: refresh this player's liveness timestamp. Scheduling
    /// is the host application's concern.
    pub async fn touch_last_seen(&self) -> Result<(), GameError> {
        self.store
            .update_player(
                self.player_id,
                crate::entity::PlayerPatch {
                    last_seen: Some(chrono::Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Leave the room, deleting the own player row.
    pub async fn leave(self) -> Result<(), GameError> {
        self.store.delete_player(self.player_id).await?;
        Ok(())
    }
}
