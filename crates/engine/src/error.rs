//! The module contains the errors the ledger engine can return.
//!
//! The errors are:
//!
//! - [`InvalidArgument`] thrown when a request fails validation (malformed date,
//!   non-positive amount, unknown kind).
//! - [`NotFound`] thrown when a transaction or category does not exist.
//! - [`OwnershipMismatch`] thrown when a transaction owned by someone else is
//!   updated or deleted.
//! - [`Persistence`] thrown when the backing store fails.
//! - [`Notification`] thrown when the change channel is unavailable.
//! - [`DeadlineExceeded`] thrown when an operation outlives the engine deadline.
//!
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`NotFound`]: EngineError::NotFound
//!  [`OwnershipMismatch`]: EngineError::OwnershipMismatch
//!  [`Persistence`]: EngineError::Persistence
//!  [`Notification`]: EngineError::Notification
//!  [`DeadlineExceeded`]: EngineError::DeadlineExceeded
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Ownership mismatch: {0}")]
    OwnershipMismatch(String),
    #[error("Notification failed: {0}")]
    Notification(String),
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
    #[error(transparent)]
    Persistence(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::OwnershipMismatch(a), Self::OwnershipMismatch(b)) => a == b,
            (Self::Notification(a), Self::Notification(b)) => a == b,
            (Self::DeadlineExceeded(a), Self::DeadlineExceeded(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
