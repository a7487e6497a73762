//! Realtime layer: WebSocket sessions, the connection hub, and the wire
//! protocol.

pub mod hub;
pub mod protocol;
pub mod session;
