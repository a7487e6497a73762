//! Server configuration from environment variables.
//!
//! Environment variables must be set by the runtime environment:
//! - Docker: via docker-compose env_file or docker run --env-file
//! - Local dev: source env files manually (e.g., set -a; . ./.env; set +a)

use std::time::Duration;

use crate::error::AppError;
use crate::services::rooms::DEFAULT_DISCONNECT_GRACE;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub disconnect_grace: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_port(std::env::var("BACKEND_PORT").ok())?;
        let disconnect_grace =
            parse_grace(std::env::var("BACKEND_DISCONNECT_GRACE_SECS").ok())?;
        Ok(Self {
            host,
            port,
            disconnect_grace,
        })
    }
}

fn parse_port(raw: Option<String>) -> Result<u16, AppError> {
    match raw {
        None => Ok(3001),
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| AppError::config("BACKEND_PORT must be a valid port number")),
    }
}

fn parse_grace(raw: Option<String>) -> Result<Duration, AppError> {
    match raw {
        None => Ok(DEFAULT_DISCONNECT_GRACE),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::config("BACKEND_DISCONNECT_GRACE_SECS must be whole seconds")),
    }
}
