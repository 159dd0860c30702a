//! Data-access layer: the interface the game core requires from the hosted
//! realtime data service.
//!
//! Every call is a remote CRUD operation; updates are partial field patches.
//! `subscribe` delivers row-level change events filtered to one room, with
//! at-least-once, unordered delivery — consumers reconcile on every event
//! and the time-sensitive paths re-poll instead of trusting the stream.

pub mod memory;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use uuid::Uuid;

use crate::entity::{
    Card, HandCard, HandRow, Player, PlayerPatch, Room, RoomPatch, RoundPlay, TurnOrderEntry,
};
use crate::error::StoreError;

pub use memory::MemoryStore;

/// A single row-level change notification.
#[derive(Clone, Debug)]
pub enum Change<T> {
    Insert { new: T },
    Update { old: T, new: T },
    Delete { old: T },
}

/// Change notifications for the tables a game session watches.
#[derive(Clone, Debug)]
pub enum StoreEvent {
    Room(Change<Room>),
    Player(Change<Player>),
    Play(Change<RoundPlay>),
}

pub type EventStream = Pin<Box<dyn Stream<Item = StoreEvent> + Send>>;

#[async_trait]
pub trait DataStore: Send + Sync {
    // Rooms
    async fn fetch_room(&self, room_id: Uuid) -> Result<Room, StoreError>;
    async fn fetch_room_by_code(&self, code: &str) -> Result<Room, StoreError>;
    async fn update_room(&self, room_id: Uuid, patch: RoomPatch) -> Result<(), StoreError>;

    // Players, ordered by seat number
    async fn fetch_players(&self, room_id: Uuid) -> Result<Vec<Player>, StoreError>;
    async fn update_player(&self, player_id: Uuid, patch: PlayerPatch) -> Result<(), StoreError>;
    async fn delete_player(&self, player_id: Uuid) -> Result<(), StoreError>;

    // Card catalog (read-only)
    async fn fetch_cards(&self) -> Result<Vec<Card>, StoreError>;
    async fn fetch_card(&self, card_id: Uuid) -> Result<Card, StoreError>;

    // Hands
    async fn insert_hand_cards(&self, rows: Vec<HandCard>) -> Result<(), StoreError>;
    async fn fetch_hand(&self, room_id: Uuid, player_id: Uuid) -> Result<Vec<HandRow>, StoreError>;
    async fn mark_card_played(&self, hand_id: Uuid) -> Result<(), StoreError>;
    async fn count_unplayed(&self, room_id: Uuid) -> Result<usize, StoreError>;
    async fn clear_hands(&self, room_id: Uuid) -> Result<(), StoreError>;

    // Turn order, ordered by position
    async fn insert_turn_order(&self, rows: Vec<TurnOrderEntry>) -> Result<(), StoreError>;
    async fn fetch_turn_order(&self, room_id: Uuid) -> Result<Vec<TurnOrderEntry>, StoreError>;
    async fn clear_turn_order(&self, room_id: Uuid) -> Result<(), StoreError>;

    // Current-round plays, in insertion order
    async fn insert_play(&self, play: RoundPlay) -> Result<(), StoreError>;
    async fn fetch_plays(&self, room_id: Uuid) -> Result<Vec<RoundPlay>, StoreError>;
    async fn clear_plays(&self, room_id: Uuid) -> Result<(), StoreError>;

    /// Subscribe to change events for one room.
    fn subscribe(&self, room_id: Uuid) -> EventStream;
}
