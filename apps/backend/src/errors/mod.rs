//! Error handling for the Durak backend.

pub mod domain;

pub use domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
