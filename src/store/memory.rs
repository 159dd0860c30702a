//! In-process `DataStore` used by the test suite and the simulator.
//!
//! Tables are plain collections behind a mutex; change notification fans out
//! through a broadcast channel, filtered per room on subscribe. Lagged
//! receivers silently drop events, which matches the at-least-once,
//! no-ordering contract of the real service closely enough for the core's
//! reconcile-and-repoll discipline to be exercised honestly.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::entity::{
    Card, HandCard, HandRow, Player, PlayerPatch, Room, RoomPatch, RoundPlay, TurnOrderEntry,
};
use crate::error::StoreError;
use crate::store::{Change, DataStore, EventStream, StoreEvent};

const EVENT_BUFFER: usize = 256;

#[derive(Default)]
struct Tables {
    rooms: HashMap<Uuid, Room>,
    players: HashMap<Uuid, Player>,
    cards: Vec<Card>,
    hands: Vec<HandCard>,
    turn_order: Vec<TurnOrderEntry>,
    plays: Vec<RoundPlay>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        MemoryStore {
            tables: Mutex::new(Tables::default()),
            events,
        }
    }

    /// Seed the read-only card catalog.
    pub fn seed_catalog(&self, cards: Vec<Card>) {
        self.lock().cards = cards;
    }

    /// Create a room row (lobby concern, done before a session joins).
    pub fn insert_room(&self, room: Room) {
        self.lock().rooms.insert(room.id, room);
    }

    /// Seat a player in a room (lobby concern).
    pub fn insert_player(&self, player: Player) {
        self.lock().players.insert(player.id, player.clone());
        self.emit(StoreEvent::Player(Change::Insert { new: player }));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn event_room_id(event: &StoreEvent) -> Uuid {
    match event {
        StoreEvent::Room(Change::Insert { new })
        | StoreEvent::Room(Change::Update { new, .. }) => new.id,
        StoreEvent::Room(Change::Delete { old }) => old.id,
        StoreEvent::Player(Change::Insert { new })
        | StoreEvent::Player(Change::Update { new, .. }) => new.room_id,
        StoreEvent::Player(Change::Delete { old }) => old.room_id,
        StoreEvent::Play(Change::Insert { new })
        | StoreEvent::Play(Change::Update { new, .. }) => new.room_id,
        StoreEvent::Play(Change::Delete { old }) => old.room_id,
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn fetch_room(&self, room_id: Uuid) -> Result<Room, StoreError> {
        self.lock()
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or(StoreError::NotFound { table: "rooms" })
    }

    async fn fetch_room_by_code(&self, code: &str) -> Result<Room, StoreError> {
        self.lock()
            .rooms
            .values()
            .find(|r| r.code == code)
            .cloned()
            .ok_or(StoreError::NotFound { table: "rooms" })
    }

    async fn update_room(&self, room_id: Uuid, patch: RoomPatch) -> Result<(), StoreError> {
        let (old, new) = {
            let mut tables = self.lock();
            let room = tables
                .rooms
                .get_mut(&room_id)
                .ok_or(StoreError::NotFound { table: "rooms" })?;
            let old = room.clone();
            patch.apply(room);
            (old, room.clone())
        };
        self.emit(StoreEvent::Room(Change::Update { old, new }));
        Ok(())
    }

    async fn fetch_players(&self, room_id: Uuid) -> Result<Vec<Player>, StoreError> {
        let mut players: Vec<Player> = self
            .lock()
            .players
            .values()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect();
        players.sort_by_key(|p| p.seat_number);
        Ok(players)
    }

    async fn update_player(&self, player_id: Uuid, patch: PlayerPatch) -> Result<(), StoreError> {
        let (old, new) = {
            let mut tables = self.lock();
            let player = tables
                .players
                .get_mut(&player_id)
                .ok_or(StoreError::NotFound { table: "players" })?;
            let old = player.clone();
            patch.apply(player);
            (old, player.clone())
        };
        self.emit(StoreEvent::Player(Change::Update { old, new }));
        Ok(())
    }

    async fn delete_player(&self, player_id: Uuid) -> Result<(), StoreError> {
        let removed = self.lock().players.remove(&player_id);
        if let Some(old) = removed {
            self.emit(StoreEvent::Player(Change::Delete { old }));
        }
        Ok(())
    }

    async fn fetch_cards(&self) -> Result<Vec<Card>, StoreError> {
        Ok(self.lock().cards.clone())
    }

    async fn fetch_card(&self, card_id: Uuid) -> Result<Card, StoreError> {
        self.lock()
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
            .ok_or(StoreError::NotFound { table: "cards" })
    }

    async fn insert_hand_cards(&self, rows: Vec<HandCard>) -> Result<(), StoreError> {
        self.lock().hands.extend(rows);
        Ok(())
    }

    async fn fetch_hand(&self, room_id: Uuid, player_id: Uuid) -> Result<Vec<HandRow>, StoreError> {
        let tables = self.lock();
        let mut rows = Vec::new();
        for hand in tables
            .hands
            .iter()
            .filter(|h| h.room_id == room_id && h.player_id == player_id)
        {
            let card = tables
                .cards
                .iter()
                .find(|c| c.id == hand.card_id)
                .cloned()
                .ok_or(StoreError::NotFound { table: "cards" })?;
            rows.push(HandRow {
                hand: hand.clone(),
                card,
            });
        }
        Ok(rows)
    }

    async fn mark_card_played(&self, hand_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let hand = tables
            .hands
            .iter_mut()
            .find(|h| h.id == hand_id)
            .ok_or(StoreError::NotFound {
                table: "player_hands",
            })?;
        hand.played = true;
        Ok(())
    }

    async fn count_unplayed(&self, room_id: Uuid) -> Result<usize, StoreError> {
        Ok(self
            .lock()
            .hands
            .iter()
            .filter(|h| h.room_id == room_id && !h.played)
            .count())
    }

    async fn clear_hands(&self, room_id: Uuid) -> Result<(), StoreError> {
        self.lock().hands.retain(|h| h.room_id != room_id);
        Ok(())
    }

    async fn insert_turn_order(&self, rows: Vec<TurnOrderEntry>) -> Result<(), StoreError> {
        self.lock().turn_order.extend(rows);
        Ok(())
    }

    async fn fetch_turn_order(&self, room_id: Uuid) -> Result<Vec<TurnOrderEntry>, StoreError> {
        let mut entries: Vec<TurnOrderEntry> = self
            .lock()
            .turn_order
            .iter()
            .filter(|t| t.room_id == room_id)
            .cloned()
            .collect();
        entries.sort_by_key(|t| t.position);
        Ok(entries)
    }

    async fn clear_turn_order(&self, room_id: Uuid) -> Result<(), StoreError> {
        self.lock().turn_order.retain(|t| t.room_id != room_id);
        Ok(())
    }

    async fn insert_play(&self, play: RoundPlay) -> Result<(), StoreError> {
        self.lock().plays.push(play.clone());
        self.emit(StoreEvent::Play(Change::Insert { new: play }));
        Ok(())
    }

    async fn fetch_plays(&self, room_id: Uuid) -> Result<Vec<RoundPlay>, StoreError> {
        // Insertion order doubles as played_at order here.
        Ok(self
            .lock()
            .plays
            .iter()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn clear_plays(&self, room_id: Uuid) -> Result<(), StoreError> {
        let removed: Vec<RoundPlay> = {
            let mut tables = self.lock();
            let removed = tables
                .plays
                .iter()
                .filter(|p| p.room_id == room_id)
                .cloned()
                .collect();
            tables.plays.retain(|p| p.room_id != room_id);
            removed
        };
        for old in removed {
            self.emit(StoreEvent::Play(Change::Delete { old }));
        }
        Ok(())
    }

    fn subscribe(&self, room_id: Uuid) -> EventStream {
        let stream = BroadcastStream::new(self.events.subscribe()).filter_map(move |result| {
            let event = match result {
                Ok(event) if event_room_id(&event) == room_id => Some(event),
                // Other rooms' events and lag drops are both skipped.
                _ => None,
            };
            async move { event }
        });
        Box::pin(stream)
    }
}
