mod common;

use common::{drain, join_all, seed_room, session_at_position};
use el_triunfo::entity::{Attribute, RoomPhase};
use el_triunfo::game::GameSession;
use el_triunfo::store::{DataStore, EventStream};
use el_triunfo::GameError;

/// Drive a freshly seeded room to the playing phase with every bid at 0.
async fn advance_to_playing(
    sessions: &mut [GameSession],
    streams: &mut [EventStream],
) -> anyhow::Result<()> {
    sessions[0].start_set().await?;
    drain(sessions, streams).await?;
    sessions[0].begin_bidding().await?;
    drain(sessions, streams).await?;
    for i in 0..sessions.len() {
        sessions[i].submit_bid(0).await?;
    }
    drain(sessions, streams).await?;
    Ok(())
}

#[tokio::test]
async fn start_requires_host_and_enough_players() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(2);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;

    let err = sessions[1].start_set().await.unwrap_err();
    assert!(matches!(err, GameError::NotHost));

    // Drop the second player below the minimum.
    store.delete_player(players[1].id).await?;
    drain(&mut sessions, &mut streams).await?;
    let err = sessions[0].start_set().await.unwrap_err();
    assert!(matches!(err, GameError::NotEnoughPlayers { found: 1 }));
    Ok(())
}

#[tokio::test]
async fn double_start_is_rejected_while_in_flight() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(2);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;

    sessions[0].start_set().await?;

    // The guard holds until the start is observed committed; a second
    // click must bounce off it, not rerun the sequence.
    let err = sessions[0].start_set().await.unwrap_err();
    assert!(matches!(err, GameError::StartInProgress));

    // Once the committed start comes back through the stream the guard
    // drops, and the re-fetched phase rejects the stale trigger instead.
    drain(&mut sessions, &mut streams).await?;
    let err = sessions[0].start_set().await.unwrap_err();
    assert!(matches!(err, GameError::PhaseMismatch { .. }));
    Ok(())
}

#[tokio::test]
async fn bids_are_validated_and_idempotent() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(3);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;

    // Bidding before the phase opens is a precondition notice.
    let err = sessions[1].submit_bid(3).await.unwrap_err();
    assert!(matches!(err, GameError::PhaseMismatch { .. }));
    assert!(err.is_precondition());

    sessions[0].start_set().await?;
    drain(&mut sessions, &mut streams).await?;
    // The reveal timer holds the triumph card on screen, then opens bidding.
    sessions[0].run_triunfo_timer().await?;
    drain(&mut sessions, &mut streams).await?;

    // 3 players get 13 cards each; 14 is out of range.
    let err = sessions[1].submit_bid(14).await.unwrap_err();
    assert!(matches!(err, GameError::BidOutOfRange { bid: 14, max: 13 }));

    sessions[1].submit_bid(4).await?;
    let err = sessions[1].submit_bid(4).await.unwrap_err();
    assert!(matches!(err, GameError::AlreadyBid));

    // Two of three bids in: still bidding.
    sessions[0].submit_bid(2).await?;
    drain(&mut sessions, &mut streams).await?;
    assert_eq!(store.fetch_room(room_id).await?.phase, RoomPhase::Bidding);

    sessions[2].submit_bid(0).await?;
    drain(&mut sessions, &mut streams).await?;
    assert_eq!(store.fetch_room(room_id).await?.phase, RoomPhase::Playing);

    // The poll sees completion immediately, whoever asks.
    assert!(sessions[1].poll_for_bidding_complete().await?);
    Ok(())
}

#[tokio::test]
async fn failed_bid_write_rolls_back_the_local_flag() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(2);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;

    sessions[0].start_set().await?;
    drain(&mut sessions, &mut streams).await?;
    sessions[0].begin_bidding().await?;
    drain(&mut sessions, &mut streams).await?;

    // Yank the guest's row out from under it so the bid write fails.
    store.delete_player(players[1].id).await?;
    let err = sessions[1].submit_bid(5).await.unwrap_err();
    assert!(matches!(err, GameError::Store(_)));

    // The optimistic flag was rolled back; the UI re-offers the choice.
    assert!(!sessions[1].has_bid());
    Ok(())
}

#[tokio::test]
async fn turn_and_attribute_preconditions_are_enforced() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(3);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;
    advance_to_playing(&mut sessions, &mut streams).await?;

    let starter = store.fetch_room(room_id).await?.round_starter_position as usize;
    let opener = session_at_position(&sessions, starter);
    let second = session_at_position(&sessions, (starter + 1) % 3);

    // Only the round starter selects the attribute.
    let err = sessions[second]
        .select_attribute(Attribute::Fis)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::NotYourTurn { .. }));

    // The opener cannot play before selecting.
    let card = sessions[opener].my_hand()[0].card.id;
    let err = sessions[opener].play_card(card).await.unwrap_err();
    assert!(matches!(err, GameError::AttributeNotSelected));

    sessions[opener].select_attribute(Attribute::Fis).await?;
    let err = sessions[opener]
        .select_attribute(Attribute::Car)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::AttributeAlreadySet));
    drain(&mut sessions, &mut streams).await?;

    // Out-of-turn play is rejected; the played card stays in hand.
    let off_turn_card = sessions[second].my_hand()[0].card.id;
    let err = sessions[second].play_card(off_turn_card).await.unwrap_err();
    assert!(matches!(err, GameError::NotYourTurn { .. }));
    assert_eq!(sessions[second].my_hand().len(), 13);

    // A card from someone else's hand does not exist locally.
    let foreign = sessions[opener].my_hand()[1].card.id;
    let err = sessions[second].play_card(foreign).await.unwrap_err();
    assert!(matches!(err, GameError::CardNotInHand(_)));
    Ok(())
}

#[tokio::test]
async fn premature_resolution_is_a_silent_noop() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(2);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;
    advance_to_playing(&mut sessions, &mut streams).await?;

    let starter = store.fetch_room(room_id).await?.round_starter_position as usize;
    let opener = session_at_position(&sessions, starter);
    sessions[opener].select_attribute(Attribute::Cul).await?;
    drain(&mut sessions, &mut streams).await?;

    let card = sessions[opener].my_hand()[0].card.id;
    let outcome = sessions[opener].play_card(card).await?;
    assert!(!outcome.round_complete);
    drain(&mut sessions, &mut streams).await?;

    // One of two plays on the table: resolution must back out untouched,
    // even after the settle delay has genuinely elapsed.
    let resolution = sessions[opener].run_resolve_timer().await?;
    assert!(matches!(
        resolution,
        el_triunfo::RoundResolution::Pending
    ));
    assert_eq!(store.fetch_plays(room_id).await?.len(), 1);
    for player in store.fetch_players(room_id).await? {
        assert_eq!(player.won_rounds, 0);
    }
    Ok(())
}

#[tokio::test]
async fn external_room_end_aborts_the_session() -> anyhow::Result<()> {
    use el_triunfo::entity::{RoomPatch, RoomStatus};
    use el_triunfo::SessionUpdate;
    use futures_util::StreamExt;

    common::init();
    let (store, room_id, players) = seed_room(2);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;

    // Room-lifecycle cleanup (host vanished, say) ends the room from
    // outside the core; the session treats it as an immediate abort.
    store
        .update_room(
            room_id,
            RoomPatch {
                status: Some(RoomStatus::Ended),
                ended_reason: Some(Some("host_left".to_string())),
                ..Default::default()
            },
        )
        .await?;

    let event = streams[1].next().await.expect("stream delivers the end");
    let update = sessions[1].apply_event(event).await?;
    assert_eq!(
        update,
        SessionUpdate::GameEnded {
            reason: Some("host_left".to_string())
        }
    );
    Ok(())
}

#[tokio::test]
async fn heartbeat_and_leave_touch_the_player_rows() -> anyhow::Result<()> {
    common::init();
    let (store, room_id, players) = seed_room(2);
    let (mut sessions, mut streams) = join_all(&store, room_id, &players).await?;

    sessions[1].touch_last_seen().await?;
    let seen = store
        .fetch_players(room_id)
        .await?
        .into_iter()
        .find(|p| p.id == players[1].id)
        .and_then(|p| p.last_seen);
    assert!(seen.is_some());

    let guest = sessions.pop().expect("two sessions were joined");
    guest.leave().await?;
    drain(&mut sessions, &mut streams).await?;
    assert_eq!(store.fetch_players(room_id).await?.len(), 1);
    assert_eq!(sessions[0].player_count(), 1);
    Ok(())
}
