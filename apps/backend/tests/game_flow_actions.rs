//! Dispatch-level behavior: actions arrive tagged with a connection and a
//! room id, get resolved to a seat, applied to the engine, and answered
//! with per-player projections for every connected seat.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use durak_backend::domain::state::Phase;
use durak_backend::errors::domain::{DomainError, NotFoundKind};
use durak_backend::services::game_flow::{rematch_first_attacker, GameFlow};
use durak_backend::services::rooms::{ConnId, RoomRegistry};

fn flow() -> GameFlow {
    GameFlow::new(Arc::new(RoomRegistry::with_grace(Duration::from_secs(30))))
}

fn conn() -> ConnId {
    Uuid::new_v4()
}

/// Join two connections; the game must be dealt on the second join.
fn seated_room(flow: &GameFlow) -> (String, ConnId, ConnId) {
    let room_id = flow.create_room();
    let a = conn();
    let b = conn();

    let (reply_a, pushes_a) = flow.join_room(&room_id, None, a).unwrap();
    assert_eq!(reply_a.player_index, 0);
    assert!(!reply_a.reconnected);
    assert!(pushes_a.is_empty(), "no game to project before both seats fill");

    let (reply_b, pushes_b) = flow.join_room(&room_id, None, b).unwrap();
    assert_eq!(reply_b.player_index, 1);
    assert_eq!(pushes_b.len(), 2, "deal is pushed to both seats");

    (room_id, a, b)
}

/// Connection of the current attacker plus one of their legal card ids.
fn attacker_move(flow: &GameFlow, room_id: &str, a: ConnId, b: ConnId) -> (ConnId, u8) {
    let room = flow.rooms().room(room_id).unwrap();
    let guard = room.lock();
    let game = guard.game.as_ref().unwrap();
    let attacker_conn = if game.attacker == 0 { a } else { b };
    let card_id = game.hands[game.attacker as usize][0].id;
    (attacker_conn, card_id)
}

#[test]
fn views_are_projected_per_seat() {
    let flow = flow();
    let room_id = flow.create_room();
    let a = conn();
    let b = conn();
    flow.join_room(&room_id, None, a).unwrap();
    let (_, pushes) = flow.join_room(&room_id, None, b).unwrap();

    assert_eq!(pushes.len(), 2);
    for (push_conn, view) in &pushes {
        let expected_index = if *push_conn == a { 0 } else { 1 };
        assert_eq!(view.player_index, expected_index);
        assert_eq!(view.hand.len(), 6);
        assert_eq!(view.opponent_count, 6);
        assert_eq!(view.deck_count, 24);
        assert!(view.trump_card.is_some());
        assert_eq!(view.is_attacker, view.player_index == view.attacker);
        assert_eq!(view.is_defender, view.player_index == view.defender);
    }
}

#[test]
fn play_card_broadcasts_to_both_seats() {
    let flow = flow();
    let (room_id, a, b) = seated_room(&flow);
    let (attacker_conn, card_id) = attacker_move(&flow, &room_id, a, b);

    let pushes = flow.play_card(attacker_conn, &room_id, card_id, None).unwrap();
    assert_eq!(pushes.len(), 2);

    for (push_conn, view) in &pushes {
        let expected_index = if *push_conn == a { 0 } else { 1 };
        assert_eq!(view.player_index, expected_index);
        assert_eq!(view.phase, Phase::Defending);
        assert_eq!(view.table.len(), 1);
        assert_eq!(view.opponent_count + view.hand.len(), 11);
    }
}

#[test]
fn defender_cannot_open_the_attack() {
    let flow = flow();
    let (room_id, a, b) = seated_room(&flow);

    let room = flow.rooms().room(&room_id).unwrap();
    let guard = room.lock();
    let game = guard.game.as_ref().unwrap();
    let defender_conn = if game.defender == 0 { a } else { b };
    let card_id = game.hands[game.defender as usize][0].id;
    drop(guard);

    let err = flow.play_card(defender_conn, &room_id, card_id, None).unwrap_err();
    assert!(matches!(err, DomainError::Validation(..)));
}

#[test]
fn actions_require_room_seat_and_game() {
    let flow = flow();
    let stranger = conn();

    // Unknown room.
    let err = flow.play_card(stranger, "NOSUCHRM", 0, None).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Room, _)));

    // Known room, connection not seated.
    let (room_id, _a, _b) = seated_room(&flow);
    let err = flow.declare_take(stranger, &room_id).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Player, _)));

    // Seated room without a game yet.
    let lonely_room = flow.create_room();
    let lonely = conn();
    flow.join_room(&lonely_room, None, lonely).unwrap();
    let err = flow.declare_beaten(lonely, &lonely_room).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Game, _)));
}

#[test]
fn unknown_token_falls_back_to_a_fresh_join() {
    let flow = flow();
    let room_id = flow.create_room();

    let (reply, _) = flow
        .join_room(&room_id, Some("expired-token"), conn())
        .unwrap();
    assert!(!reply.reconnected);
    assert_eq!(reply.player_index, 0);
    assert_ne!(reply.token, "expired-token");
}

#[tokio::test]
async fn reconnect_receives_a_full_state_push() {
    let flow = flow();
    let room_id = flow.create_room();
    let a = conn();
    let b = conn();
    let (reply_a, _) = flow.join_room(&room_id, None, a).unwrap();
    flow.join_room(&room_id, None, b).unwrap();

    flow.handle_disconnect(a);

    let fresh = conn();
    let (reply, pushes) = flow
        .join_room(&room_id, Some(&reply_a.token), fresh)
        .unwrap();
    assert!(reply.reconnected);
    assert_eq!(reply.player_index, 0);
    assert_eq!(reply.token, reply_a.token);

    // The rejoined connection gets an immediate full-state push.
    assert!(pushes
        .iter()
        .any(|(c, view)| *c == fresh && view.player_index == 0));
    assert_eq!(pushes.len(), 2);
}

#[test]
fn rematch_reuses_the_room_and_seats_the_loser_first() {
    let flow = flow();
    let (room_id, a, _b) = seated_room(&flow);

    // Force a decided game so the policy has a loser to pick.
    {
        let room = flow.rooms().room(&room_id).unwrap();
        let mut guard = room.lock();
        let game = guard.game.as_mut().unwrap();
        game.phase = Phase::GameOver;
        game.winner = Some(durak_backend::domain::Winner::Player(0));
        assert_eq!(rematch_first_attacker(Some(game)), Some(1));
    }

    let pushes = flow.rematch(a, &room_id).unwrap();
    assert_eq!(pushes.len(), 2);

    let room = flow.rooms().room(&room_id).unwrap();
    let guard = room.lock();
    let game = guard.game.as_ref().unwrap();
    assert_eq!(game.attacker, 1, "loser opens the rematch");
    assert_eq!(game.phase, Phase::Attacking);
    assert!(game.winner.is_none());
    drop(guard);

    // Unseated connections cannot trigger a rematch.
    let err = flow.rematch(conn(), &room_id).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Player, _)));
}

#[test]
fn rematch_without_a_decided_game_uses_the_trump_rule() {
    assert_eq!(rematch_first_attacker(None), None);

    let game = durak_backend::domain::dealing::deal(5, None);
    assert_eq!(rematch_first_attacker(Some(&game)), None);
}
