//! Shared fixtures for the integration suite: a deterministic catalog, a
//! seeded room with seated players, and an event pump that keeps every
//! session's mirror reconciled the way a live subscription would.

use std::sync::Arc;

use futures_util::{FutureExt, StreamExt};
use uuid::Uuid;

use el_triunfo::entity::{Card, Player, Room, RoomPhase, RoomStatus};
use el_triunfo::game::{rules, GameSession};
use el_triunfo::store::{DataStore, EventStream, MemoryStore};

pub const ROOM_CODE: &str = "TEST";

pub fn init() {
    el_triunfo::init_tracing();
}

/// A full 40-card catalog with deterministic attribute values.
pub fn catalog() -> Vec<Card> {
    (0..rules::DECK_SIZE as i32)
        .map(|i| Card {
            id: Uuid::new_v4(),
            name: format!("Carta {:02}", i + 1),
            car: (i * 7) % 20 + 1,
            cul: (i * 11) % 20 + 1,
            tet: (i * 13) % 20 + 1,
            fis: (i * 17) % 20 + 1,
            per: (i * 19) % 20 + 1,
        })
        .collect()
}

/// Seed catalog, room and `player_count` seated players; the first seat is
/// the host. Returns the store and the players in seat order.
pub fn seed_room(player_count: usize) -> (Arc<MemoryStore>, Uuid, Vec<Player>) {
    let store = Arc::new(MemoryStore::new());
    store.seed_catalog(catalog());

    let room_id = Uuid::new_v4();
    let players: Vec<Player> = (0..player_count)
        .map(|i| Player {
            id: Uuid::new_v4(),
            room_id,
            name: format!("Player {}", i + 1),
            seat_number: i as i32 + 1,
            predicted_rounds: None,
            has_bid: false,
            won_rounds: 0,
            total_score: 0,
            last_seen: None,
        })
        .collect();

    store.insert_room(Room {
        id: room_id,
        code: ROOM_CODE.to_string(),
        host_id: players[0].id,
        status: RoomStatus::Waiting,
        phase: RoomPhase::Waiting,
        current_set: 0,
        current_round: 0,
        triunfo_card_id: None,
        current_attribute: None,
        round_starter_position: 0,
        ended_reason: None,
    });
    for player in &players {
        store.insert_player(player.clone());
    }

    (store, room_id, players)
}

/// One joined session (plus its event stream) per seated player, in seat
/// order. The host is index 0.
pub async fn join_all(
    store: &Arc<MemoryStore>,
    room_id: Uuid,
    players: &[Player],
) -> anyhow::Result<(Vec<GameSession>, Vec<EventStream>)> {
    let mut sessions = Vec::new();
    let mut streams = Vec::new();
    for player in players {
        let session =
            GameSession::join(store.clone() as Arc<dyn DataStore>, ROOM_CODE, player.id).await?;
        streams.push(store.subscribe(room_id));
        sessions.push(session);
    }
    Ok((sessions, streams))
}

/// Deliver every pending change event to every session.
pub async fn drain(
    sessions: &mut [GameSession],
    streams: &mut [EventStream],
) -> anyhow::Result<()> {
    for (session, stream) in sessions.iter_mut().zip(streams.iter_mut()) {
        while let Some(Some(event)) = stream.next().now_or_never() {
            session.apply_event(event).await?;
        }
    }
    Ok(())
}

/// Index of the session currently holding `position` in the turn order.
pub fn session_at_position(sessions: &[GameSession], position: usize) -> usize {
    sessions
        .iter()
        .position(|s| s.my_position() == position)
        .unwrap_or_else(|| panic!("no session holds position {position}"))
}
