use actix::prelude::*;
use dashmap::DashMap;

use crate::domain::player_view::PlayerView;
use crate::services::rooms::ConnId;

/// A refreshed projection on its way to one connection's mailbox.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct StateBroadcast {
    pub view: PlayerView,
}

/// Live WebSocket connections, keyed by connection id.
///
/// Delivery is fire-and-forget: a dead or slow mailbox never blocks
/// game-state progress, and a disconnected slot simply has no entry here.
#[derive(Default)]
pub struct WsRegistry {
    connections: DashMap<ConnId, Recipient<StateBroadcast>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn register(&self, conn: ConnId, recipient: Recipient<StateBroadcast>) {
        self.connections.insert(conn, recipient);
    }

    pub fn unregister(&self, conn: ConnId) {
        self.connections.remove(&conn);
    }

    pub fn push(&self, conn: ConnId, view: PlayerView) {
        if let Some(recipient) = self.connections.get(&conn) {
            recipient.value().do_send(StateBroadcast { view });
        }
    }
}
