//! Match simulator: seeds a catalog and a seated room on the in-memory
//! store, then drives four independent sessions through whole sets with
//! random bids and plays until someone crosses the winning score.

use std::sync::Arc;

use anyhow::{bail, Context};
use futures_util::{FutureExt, StreamExt};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use el_triunfo::entity::{Attribute, Card, Player, Room, RoomPhase, RoomStatus};
use el_triunfo::game::{rules, GameSession, RoundResolution};
use el_triunfo::store::{DataStore, EventStream, MemoryStore};

const ROOM_CODE: &str = "SIM1";
const PLAYER_NAMES: [&str; 4] = ["Ana", "Beto", "Carmen", "Diego"];
const MAX_SETS: i32 = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    el_triunfo::load_dotenv();
    el_triunfo::init_tracing();

    let store = Arc::new(MemoryStore::new());
    let room_id = seed_room(&store);

    let mut sessions = Vec::new();
    let mut streams: Vec<EventStream> = Vec::new();
    for player in store.fetch_players(room_id).await? {
        let session = GameSession::join(store.clone(), ROOM_CODE, player.id).await?;
        streams.push(store.subscribe(room_id));
        sessions.push(session);
    }

    loop {
        if sessions[0].room().current_set >= MAX_SETS {
            bail!("game did not finish within {MAX_SETS} sets");
        }

        sessions[0].start_set().await?;
        drain_events(&mut sessions, &mut streams).await?;
        sessions[0].begin_bidding().await?;
        drain_events(&mut sessions, &mut streams).await?;

        let cards_each = sessions[0].my_hand().len() as i32;
        for session in sessions.iter_mut() {
            let bid = rand::thread_rng().gen_range(0..=cards_each);
            session.submit_bid(bid).await?;
        }
        drain_events(&mut sessions, &mut streams).await?;

        if let Some(standings) = play_set(&mut sessions, &mut streams).await? {
            info!("final standings:");
            for result in &standings {
                info!(player = %result.name, total = result.total, "finished");
            }
            return Ok(());
        }
    }
}

/// Play rounds until the set ends. Returns the final standings when the
/// set pushed someone over the winning score, `None` otherwise.
async fn play_set(
    sessions: &mut [GameSession],
    streams: &mut [EventStream],
) -> anyhow::Result<Option<Vec<el_triunfo::game::SetResult>>> {
    let count = sessions.len();
    loop {
        let starter = sessions[0].room().round_starter_position as usize;

        let opener = session_at_position(sessions, starter)?;
        let attribute = *Attribute::ALL
            .choose(&mut rand::thread_rng())
            .context("attribute list is never empty")?;
        sessions[opener].select_attribute(attribute).await?;
        drain_events(sessions, streams).await?;

        let mut round_over = false;
        for k in 0..count {
            let position = rules::acting_position(starter, k, count);
            let actor = session_at_position(sessions, position)?;
            let card_id = {
                let hand = sessions[actor].my_hand();
                let pick = rand::thread_rng().gen_range(0..hand.len());
                hand[pick].card.id
            };
            let outcome = sessions[actor].play_card(card_id).await?;
            drain_events(sessions, streams).await?;

            if outcome.round_complete {
                round_over = true;
                match sessions[actor].resolve_round().await? {
                    RoundResolution::SetComplete(set) => {
                        drain_events(sessions, streams).await?;
                        if set.game_over {
                            return Ok(Some(set.results));
                        }
                        return Ok(None);
                    }
                    RoundResolution::NextRound { .. } => {
                        drain_events(sessions, streams).await?;
                    }
                    RoundResolution::Pending => bail!("complete round resolved as pending"),
                }
            }
        }
        if !round_over {
            bail!("round finished without a completing play");
        }
    }
}

fn session_at_position(sessions: &[GameSession], position: usize) -> anyhow::Result<usize> {
    sessions
        .iter()
        .position(|s| s.my_position() == position)
        .with_context(|| format!("no session holds position {position}"))
}

/// Deliver every pending change event to every session.
async fn drain_events(
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

/// Lobby stand-in: a seeded catalog, one room and four seated players.
fn seed_room(store: &MemoryStore) -> Uuid {
    let mut rng = rand::thread_rng();
    let catalog: Vec<Card> = (1..=rules::DECK_SIZE)
        .map(|i| Card {
            id: Uuid::new_v4(),
            name: format!("Carta {i:02}"),
            car: rng.gen_range(1..=20),
            cul: rng.gen_range(1..=20),
            tet: rng.gen_range(1..=20),
            fis: rng.gen_range(1..=20),
            per: rng.gen_range(1..=20),
        })
        .collect();
    store.seed_catalog(catalog);

    let room_id = Uuid::new_v4();
    let players: Vec<Player> = PLAYER_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Player {
            id: Uuid::new_v4(),
            room_id,
            name: name.to_string(),
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
    for player in players {
        store.insert_player(player);
    }
    room_id
}
