use serde::{Deserialize, Serialize};

use crate::domain::cards_types::CardId;
use crate::domain::player_view::PlayerView;
use crate::domain::state::PlayerId;
use crate::errors::domain::{DomainError, NotFoundKind};

/// Inbound actions. Every request is answered by exactly one
/// `room_created` / `room_joined` / `ack` / `error` reply on the same
/// connection; `game_state` pushes follow successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    CreateRoom,
    JoinRoom {
        room_id: String,
        #[serde(default)]
        token: Option<String>,
    },
    PlayCard {
        room_id: String,
        card_id: CardId,
        #[serde(default)]
        target_pair_index: Option<usize>,
    },
    DeclareBeaten {
        room_id: String,
    },
    DeclareTake {
        room_id: String,
    },
    FinishThrowingIn {
        room_id: String,
    },
    Rematch {
        room_id: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    RoomCreated {
        room_id: String,
    },

    RoomJoined {
        room_id: String,
        token: String,
        player_index: PlayerId,
        reconnected: bool,
    },

    Ack {
        message: &'static str,
    },

    GameState {
        view: PlayerView,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    IllegalMove,
    RoomNotFound,
    GameNotFound,
    PlayerNotFound,
    RoomFull,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::IllegalMove => "illegal_move",
            ErrorCode::RoomNotFound => "room_not_found",
            ErrorCode::GameNotFound => "game_not_found",
            ErrorCode::PlayerNotFound => "player_not_found",
            ErrorCode::RoomFull => "room_full",
        }
    }
}

/// Wire code for a domain rejection.
pub fn error_code(err: &DomainError) -> ErrorCode {
    match err {
        DomainError::Validation(..) => ErrorCode::IllegalMove,
        DomainError::Conflict(..) => ErrorCode::RoomFull,
        DomainError::NotFound(kind, _) => match kind {
            NotFoundKind::Room => ErrorCode::RoomNotFound,
            NotFoundKind::Game => ErrorCode::GameNotFound,
            _ => ErrorCode::PlayerNotFound,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_msg_wire_format() {
        let json = r#"{"type":"play_card","room_id":"ABCD2345","card_id":12}"#;
        let msg: ClientMsg = serde_json::from_str(json).unwrap();
        match msg {
            ClientMsg::PlayCard {
                room_id,
                card_id,
                target_pair_index,
            } => {
                assert_eq!(room_id, "ABCD2345");
                assert_eq!(card_id, 12);
                assert_eq!(target_pair_index, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn server_error_wire_format() {
        let msg = ServerMsg::Error {
            code: ErrorCode::RoomFull,
            message: "Room is full".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"error","code":"room_full","message":"Room is full"}"#
        );
    }

    #[test]
    fn domain_errors_map_to_wire_codes() {
        use crate::errors::domain::{ConflictKind, ValidationKind};

        let validation = DomainError::validation(ValidationKind::CannotBeat, "no");
        assert!(matches!(error_code(&validation), ErrorCode::IllegalMove));

        let full = DomainError::conflict(ConflictKind::RoomFull, "full");
        assert!(matches!(error_code(&full), ErrorCode::RoomFull));

        let room = DomainError::not_found(NotFoundKind::Room, "gone");
        assert!(matches!(error_code(&room), ErrorCode::RoomNotFound));
    }
}
