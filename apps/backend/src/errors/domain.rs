//! Domain-level error type used across the engine and the session manager.
//!
//! This error type is HTTP- and transport-agnostic. Handlers should return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Rule violations the engine can reject a move with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    CardNotInHand,
    IllegalCard,
    PhaseMismatch,
    WrongRole,
    NoUncoveredPair,
    PairAlreadyCovered,
    CannotBeat,
    TableEmpty,
    UncoveredPairs,
    TargetOutOfRange,
    Other(String),
}

/// Domain-level not found entities (minimal set; extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Game,
    Player,
    Token,
    Other(String),
}

/// Domain-level conflict kinds (extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    RoomFull,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or game rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict (capacity)
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    /// Human-readable detail, without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::NotFound(_, d) => d,
        }
    }

    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
}
