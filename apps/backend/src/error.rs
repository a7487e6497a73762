use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{DomainError, NotFoundKind};

/// RFC-7807 style error body returned by every failing HTTP handler.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {detail}")]
    BadRequest { code: &'static str, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: &'static str, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: &'static str, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    fn code(&self) -> String {
        match self {
            AppError::BadRequest { code, .. } => code.to_string(),
            AppError::NotFound { code, .. } => code.to_string(),
            AppError::Conflict { code, .. } => code.to_string(),
            AppError::Internal { .. } => "INTERNAL".to_string(),
            AppError::Config { .. } => "CONFIG_ERROR".to_string(),
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Conflict { detail, .. } => detail.clone(),
            AppError::Internal { detail } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(code: &'static str, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: &'static str, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_, detail) => AppError::BadRequest {
                code: "ILLEGAL_MOVE",
                detail,
            },
            DomainError::Conflict(_, detail) => AppError::Conflict {
                code: "ROOM_FULL",
                detail,
            },
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Room => "ROOM_NOT_FOUND",
                    NotFoundKind::Game => "GAME_NOT_FOUND",
                    NotFoundKind::Player => "PLAYER_NOT_FOUND",
                    NotFoundKind::Token => "TOKEN_NOT_FOUND",
                    _ => "NOT_FOUND",
                };
                AppError::NotFound { code, detail }
            }
        }
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let body = ProblemDetails {
            type_: "about:blank".to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            status: status.as_u16(),
            detail: self.detail(),
            code: self.code(),
        };
        HttpResponse::build(status).json(body)
    }
}
