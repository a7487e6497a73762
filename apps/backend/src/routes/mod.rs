//! HTTP and WebSocket route configuration.

pub mod rooms;

use actix_web::web;

use crate::health;
use crate::ws;

pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure(cfg);
    rooms::configure_routes(cfg);
    cfg.route("/ws", web::get().to(ws::session::upgrade));
}
