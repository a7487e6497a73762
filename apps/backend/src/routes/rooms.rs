//! Room provisioning routes.
//!
//! `POST /api/create-room` is the surface consumed by the external invite
//! bot: it pre-provisions an empty room and returns its id so the bot can
//! manufacture an invite link before either player connects.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Serialize)]
struct CreateRoomResponse {
    #[serde(rename = "roomId")]
    room_id: String,
}

async fn create_room(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let room_id = app_state.game_flow().create_room();
    Ok(HttpResponse::Ok().json(CreateRoomResponse { room_id }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/create-room").route(web::post().to(create_room)));
}
