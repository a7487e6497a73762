//! Service layer: session management and action dispatch.

pub mod game_flow;
pub mod rooms;
