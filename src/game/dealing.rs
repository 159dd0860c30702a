//! Deal engine and turn order table
//!
//! Shuffles the catalog deck into per-player hands, designates the set's
//! triumph card, and assigns each player a random fixed position for the
//! set. The pure decisions are separated from the row writes so they can be
//! tested without a store.

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::entity::{Card, HandCard, Player, TurnOrderEntry};
use crate::error::GameError;
use crate::game::rules;
use crate::store::DataStore;

/// A completed deal decision: who holds what, and which card is the triumph.
#[derive(Debug)]
pub struct DealOutcome {
    /// Hands in stable player-list order (unrelated to turn order).
    pub hands_by_player: Vec<(Uuid, Vec<Card>)>,
    pub triunfo: Card,
}

/// Shuffle the full deck and slice contiguous chunks to each player.
///
/// The deck must hold exactly `DECK_SIZE` cards; any mismatch is fatal for
/// the start attempt, never a partial deal. The triumph card is drawn
/// uniformly from the full original deck and may well sit in someone's
/// hand — the designation applies wherever the card is.
pub fn partition_deck(deck: &[Card], players: &[Player]) -> Result<DealOutcome, GameError> {
    if deck.len() != rules::DECK_SIZE {
        return Err(GameError::InvalidDeck {
            expected: rules::DECK_SIZE,
            found: deck.len(),
        });
    }
    let each = rules::cards_per_player(players.len())
        .ok_or(GameError::UnsupportedPlayerCount(players.len()))?;

    let mut rng = rand::thread_rng();
    let mut shuffled = deck.to_vec();
    shuffled.shuffle(&mut rng);

    let hands_by_player = players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let chunk = shuffled[i * each..(i + 1) * each].to_vec();
            (player.id, chunk)
        })
        .collect();

    let triunfo = deck[rng.gen_range(0..deck.len())].clone();

    Ok(DealOutcome {
        hands_by_player,
        triunfo,
    })
}

/// Shuffle the player list and assign position = index.
pub fn shuffled_positions(room_id: Uuid, players: &[Player]) -> Vec<TurnOrderEntry> {
    let mut ids: Vec<Uuid> = players.iter().map(|p| p.id).collect();
    ids.shuffle(&mut rand::thread_rng());
    ids.into_iter()
        .enumerate()
        .map(|(position, player_id)| TurnOrderEntry {
            id: Uuid::new_v4(),
            room_id,
            player_id,
            position: position as i32,
        })
        .collect()
}

/// Clear any previous turn order for the room, then write the new one.
///
/// The clear must complete before the first insert: stale entries mixed
/// with fresh ones would corrupt every position lookup.
pub(crate) async fn persist_turn_order(
    store: &dyn DataStore,
    room_id: Uuid,
    entries: Vec<TurnOrderEntry>,
) -> Result<(), GameError> {
    store.clear_turn_order(room_id).await?;
    store.insert_turn_order(entries).await?;
    Ok(())
}

/// Write one unplayed HandCard row per dealt card.
pub(crate) async fn persist_deal(
    store: &dyn DataStore,
    room_id: Uuid,
    outcome: &DealOutcome,
) -> Result<(), GameError> {
    let rows: Vec<HandCard> = outcome
        .hands_by_player
        .iter()
        .flat_map(|(player_id, cards)| {
            cards
                .iter()
                .map(|card| HandCard::new(room_id, *player_id, card.id))
        })
        .collect();
    store.insert_hand_cards(rows).await?;
    Ok(())
}
