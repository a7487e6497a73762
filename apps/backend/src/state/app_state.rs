use std::sync::Arc;
use std::time::Duration;

use crate::services::game_flow::GameFlow;
use crate::services::rooms::RoomRegistry;
use crate::ws::hub::WsRegistry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    game_flow: Arc<GameFlow>,
    ws_registry: Arc<WsRegistry>,
}

impl AppState {
    /// Build the state with a given disconnect grace period.
    pub fn new(disconnect_grace: Duration) -> Self {
        let rooms = Arc::new(RoomRegistry::with_grace(disconnect_grace));
        Self {
            game_flow: Arc::new(GameFlow::new(rooms)),
            ws_registry: Arc::new(WsRegistry::new()),
        }
    }

    pub fn game_flow(&self) -> &Arc<GameFlow> {
        &self.game_flow
    }

    pub fn ws_registry(&self) -> &Arc<WsRegistry> {
        &self.ws_registry
    }
}
