//! Action dispatch: resolve a connection to its room and seat, apply the
//! engine call under the room lock, and hand back refreshed projections
//! for every connected seat.
//!
//! Every mutating call either fully succeeds (and yields the views to
//! push) or fails with a `DomainError` and leaves the room untouched.

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::domain::attacks;
use crate::domain::cards_types::CardId;
use crate::domain::dealing::deal;
use crate::domain::player_view::{view_for, PlayerView};
use crate::domain::settlement;
use crate::domain::state::{opponent, GameState, PlayerId, Winner};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::services::rooms::{ConnId, Room, RoomRegistry};

/// A projection destined for one live connection.
pub type StatePush = (ConnId, PlayerView);

pub struct JoinReply {
    pub room_id: String,
    pub token: String,
    pub player_index: PlayerId,
    pub reconnected: bool,
}

/// Dealer policy layered above `deal`: the loser of the previous hand
/// opens the next one. A draw (or an unfinished hand) falls back to the
/// lowest-trump rule.
pub fn rematch_first_attacker(prev: Option<&GameState>) -> Option<PlayerId> {
    match prev.and_then(|g| g.winner) {
        Some(Winner::Player(winner)) => Some(opponent(winner)),
        _ => None,
    }
}

pub struct GameFlow {
    rooms: Arc<RoomRegistry>,
}

impl GameFlow {
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self { rooms }
    }

    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    pub fn create_room(&self) -> String {
        self.rooms.create_room()
    }

    /// Join (or rejoin) a room. A presented token is tried as a
    /// reconnection first; an unknown token is not fatal and falls back to
    /// a normal join. The game is dealt the moment the second seat fills.
    pub fn join_room(
        &self,
        room_id: &str,
        token: Option<&str>,
        conn: ConnId,
    ) -> Result<(JoinReply, Vec<StatePush>), DomainError> {
        if let Some(token) = token {
            if let Some(player_index) = self.rooms.reconnect(room_id, token, conn) {
                let room = self.require_room(room_id)?;
                let guard = room.lock();
                let reply = JoinReply {
                    room_id: guard.id.clone(),
                    token: token.to_string(),
                    player_index,
                    reconnected: true,
                };
                return Ok((reply, Self::pushes(&guard)));
            }
        }

        let outcome = self.rooms.join_room(room_id, conn)?;
        let room = self.require_room(room_id)?;
        let mut guard = room.lock();
        if guard.slots.len() == 2 && guard.game.is_none() {
            let seed = rand::rng().random();
            guard.game = Some(deal(seed, None));
            info!(room_id = %guard.id, "both seats filled, game dealt");
        }
        let reply = JoinReply {
            room_id: guard.id.clone(),
            token: outcome.token,
            player_index: outcome.player_index,
            reconnected: false,
        };
        Ok((reply, Self::pushes(&guard)))
    }

    pub fn play_card(
        &self,
        conn: ConnId,
        room_id: &str,
        card_id: CardId,
        target_pair: Option<usize>,
    ) -> Result<Vec<StatePush>, DomainError> {
        self.with_game(room_id, conn, |game, who| {
            attacks::play_card(game, who, card_id, target_pair)
        })
    }

    pub fn declare_beaten(&self, conn: ConnId, room_id: &str) -> Result<Vec<StatePush>, DomainError> {
        self.with_game(room_id, conn, settlement::declare_beaten)
    }

    pub fn declare_take(&self, conn: ConnId, room_id: &str) -> Result<Vec<StatePush>, DomainError> {
        self.with_game(room_id, conn, settlement::declare_take)
    }

    pub fn finish_throwing_in(
        &self,
        conn: ConnId,
        room_id: &str,
    ) -> Result<Vec<StatePush>, DomainError> {
        self.with_game(room_id, conn, settlement::finish_throwing_in)
    }

    /// Start a fresh hand in the same room, seeding the previous loser as
    /// the first attacker.
    pub fn rematch(&self, conn: ConnId, room_id: &str) -> Result<Vec<StatePush>, DomainError> {
        let room = self.require_room(room_id)?;
        let mut guard = room.lock();
        guard
            .slot_by_conn(conn)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, "Not seated in this room"))?;
        let first_attacker = rematch_first_attacker(guard.game.as_ref());
        let seed = rand::rng().random();
        guard.game = Some(deal(seed, first_attacker));
        info!(room_id = %guard.id, "rematch dealt");
        Ok(Self::pushes(&guard))
    }

    pub fn handle_disconnect(&self, conn: ConnId) {
        self.rooms.on_disconnect(conn);
    }

    fn require_room(&self, room_id: &str) -> Result<Arc<parking_lot::Mutex<Room>>, DomainError> {
        self.rooms
            .room(room_id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Room, "Room not found"))
    }

    /// Apply one engine operation for the seat owning `conn`, then project
    /// the result for every connected seat.
    fn with_game(
        &self,
        room_id: &str,
        conn: ConnId,
        op: impl FnOnce(&mut GameState, PlayerId) -> Result<(), DomainError>,
    ) -> Result<Vec<StatePush>, DomainError> {
        let room = self.require_room(room_id)?;
        let mut guard = room.lock();
        let who = guard
            .slot_by_conn(conn)
            .map(|s| s.index)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, "Not seated in this room"))?;
        let game = guard
            .game
            .as_mut()
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Game, "Game not started"))?;
        op(game, who)?;
        Ok(Self::pushes(&guard))
    }

    fn pushes(room: &Room) -> Vec<StatePush> {
        let Some(game) = room.game.as_ref() else {
            return Vec::new();
        };
        room.slots
            .iter()
            .filter_map(|slot| slot.conn.map(|conn| (conn, view_for(game, slot.index))))
            .collect()
    }
}
