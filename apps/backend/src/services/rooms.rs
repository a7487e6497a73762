//! Room lifecycle and player sessions: slot assignment, reconnection
//! tokens, disconnect grace timers, and room garbage collection.
//!
//! Every room is a single logical resource: all joins, moves, disconnect
//! bookkeeping, and timer expiry for one room run under its mutex, in
//! arrival order. Cross-room operations are independent; the registry map
//! itself only guards insert/delete.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::state::PlayerId;
use crate::domain::GameState;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::utils::room_code::generate_room_code;

/// Identifier of one live transport connection.
pub type ConnId = Uuid;

pub const DEFAULT_DISCONNECT_GRACE: Duration = Duration::from_secs(30);

/// One of the two seats in a room.
///
/// Slot state machine: absent -> connected -> disconnected (grace timer
/// running) -> connected again, or removed. The `generation` counter makes
/// a stale timer expiry a no-op after any reconnect or seat takeover.
pub struct PlayerSlot {
    pub index: PlayerId,
    pub token: String,
    pub conn: Option<ConnId>,
    removal: Option<CancellationToken>,
    generation: u64,
}

impl PlayerSlot {
    fn claim(index: PlayerId, conn: ConnId) -> Self {
        Self {
            index,
            token: Uuid::new_v4().to_string(),
            conn: Some(conn),
            removal: None,
            generation: 0,
        }
    }

    pub fn connected(&self) -> bool {
        self.conn.is_some()
    }

    fn cancel_removal(&mut self) {
        if let Some(token) = self.removal.take() {
            token.cancel();
        }
    }
}

pub struct Room {
    pub id: String,
    pub slots: Vec<PlayerSlot>,
    pub game: Option<GameState>,
}

impl Room {
    pub fn slot_by_conn(&self, conn: ConnId) -> Option<&PlayerSlot> {
        self.slots.iter().find(|s| s.conn == Some(conn))
    }

    /// The unclaimed seat index. Only meaningful while fewer than two slots
    /// exist.
    fn free_index(&self) -> PlayerId {
        if self.slots.iter().any(|s| s.index == 0) {
            1
        } else {
            0
        }
    }
}

#[derive(Debug)]
pub struct JoinOutcome {
    pub token: String,
    pub player_index: PlayerId,
}

/// Registry of all live rooms, owned by the session manager.
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Mutex<Room>>>,
    /// Reverse index: which room a connection currently sits in.
    conn_rooms: DashMap<ConnId, String>,
    grace: Duration,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_grace(DEFAULT_DISCONNECT_GRACE)
    }

    pub fn with_grace(grace: Duration) -> Self {
        Self {
            rooms: DashMap::new(),
            conn_rooms: DashMap::new(),
            grace,
        }
    }

    /// Allocate a fresh, empty room and return its id.
    pub fn create_room(&self) -> String {
        loop {
            let id = generate_room_code();
            if self.rooms.contains_key(&id) {
                continue;
            }
            let room = Room {
                id: id.clone(),
                slots: Vec::new(),
                game: None,
            };
            self.rooms.insert(id.clone(), Arc::new(Mutex::new(room)));
            info!(room_id = %id, "room created");
            return id;
        }
    }

    pub fn room(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Claim a seat in `room_id` for `conn`.
    ///
    /// A joiner takes the next free index, or replaces a disconnected slot
    /// (same index, fresh token — the previous occupant's credential dies).
    /// Rejected only when both seats are occupied and connected.
    pub fn join_room(&self, room_id: &str, conn: ConnId) -> Result<JoinOutcome, DomainError> {
        let room = self
            .room(room_id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Room, "Room not found"))?;
        let mut room = room.lock();

        let outcome = if room.slots.len() < 2 {
            let index = room.free_index();
            let slot = PlayerSlot::claim(index, conn);
            let token = slot.token.clone();
            room.slots.push(slot);
            room.slots.sort_by_key(|s| s.index);
            info!(room_id = %room.id, player_index = index, "player joined");
            JoinOutcome {
                token,
                player_index: index,
            }
        } else if let Some(slot) = room.slots.iter_mut().find(|s| !s.connected()) {
            // Seat takeover: a third party may claim an abandoned slot.
            slot.cancel_removal();
            slot.generation += 1;
            slot.token = Uuid::new_v4().to_string();
            slot.conn = Some(conn);
            let outcome = JoinOutcome {
                token: slot.token.clone(),
                player_index: slot.index,
            };
            info!(room_id = %room.id, player_index = outcome.player_index, "abandoned seat taken over");
            outcome
        } else {
            return Err(DomainError::conflict(ConflictKind::RoomFull, "Room is full"));
        };

        self.conn_rooms.insert(conn, room.id.clone());
        Ok(outcome)
    }

    /// Rebind a previously issued token to a new connection.
    ///
    /// Returns the slot's stable player index, or `None` when the token or
    /// room is unknown — callers fall back to a normal join.
    pub fn reconnect(&self, room_id: &str, token: &str, conn: ConnId) -> Option<PlayerId> {
        let room = self.room(room_id)?;
        let mut guard = room.lock();
        let room_id = guard.id.clone();
        let slot = guard.slots.iter_mut().find(|s| s.token == token)?;
        slot.cancel_removal();
        slot.generation += 1;
        slot.conn = Some(conn);
        let index = slot.index;
        drop(guard);
        self.conn_rooms.insert(conn, room_id.clone());
        info!(room_id = %room_id, player_index = index, "player reconnected");
        Some(index)
    }

    /// Mark the slot owning `conn` disconnected and start its grace timer.
    ///
    /// When the timer expires: before the game has started the slot is
    /// deleted (and an emptied room with it); once play has begun the seat
    /// stays reserved and its token remains valid indefinitely.
    pub fn on_disconnect(self: &Arc<Self>, conn: ConnId) {
        let Some((_, room_id)) = self.conn_rooms.remove(&conn) else {
            return;
        };
        let Some(room) = self.room(&room_id) else {
            return;
        };

        let (index, generation, cancel) = {
            let mut guard = room.lock();
            let log_room_id = guard.id.clone();
            let Some(slot) = guard.slots.iter_mut().find(|s| s.conn == Some(conn)) else {
                return;
            };
            slot.conn = None;
            slot.generation += 1;
            let cancel = CancellationToken::new();
            slot.removal = Some(cancel.clone());
            info!(room_id = %log_room_id, player_index = slot.index, "player disconnected, grace timer started");
            (slot.index, slot.generation, cancel)
        };

        let registry = Arc::clone(self);
        let grace = self.grace;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(grace) => registry.reap_slot(&room_id, index, generation),
            }
        });
    }

    /// Grace timer expiry. Runs under the room lock so it cannot interleave
    /// with a reconnect for the same token; the generation check makes any
    /// lost race a no-op.
    fn reap_slot(&self, room_id: &str, index: PlayerId, generation: u64) {
        let Some(room) = self.room(room_id) else {
            return;
        };
        let mut guard = room.lock();
        let Some(pos) = guard
            .slots
            .iter()
            .position(|s| s.index == index && s.generation == generation && !s.connected())
        else {
            return;
        };

        if guard.game.is_some() {
            // Play has begun: the seat stays reserved, the token stays
            // valid, and no further automatic cleanup happens.
            debug!(room_id = %guard.id, player_index = index, "grace expired mid-game, keeping seat reserved");
            return;
        }

        guard.slots.remove(pos);
        info!(room_id = %guard.id, player_index = index, "slot removed after grace period");
        let empty = guard.slots.is_empty();
        drop(guard);
        if empty {
            self.rooms.remove(room_id);
            info!(room_id = %room_id, "empty room deleted");
        }
    }

    /// Explicit, immediate teardown.
    pub fn remove_room(&self, room_id: &str) {
        let Some((_, room)) = self.rooms.remove(room_id) else {
            return;
        };
        let guard = room.lock();
        for slot in &guard.slots {
            if let Some(conn) = slot.conn {
                self.conn_rooms.remove(&conn);
            }
        }
        info!(room_id = %guard.id, "room removed");
    }
}
