//! Domain Layer - Errors
//!
//! The error enum crosses the command boundary, so it is a serializable
//! wire type rather than an opaque error chain.

use serde::{Deserialize, Serialize};

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// - `Unavailable`: a collaborator (database, transport) could not be reached
/// - `NotFound`: the referenced selection does not exist (never created,
///   already applied, or expired)
/// - `Rejected`: business-level refusal of an apply action
/// - `Internal`: unexpected failure inside the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    Unavailable(String),
    NotFound(String),
    Rejected(String),
    Internal(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
