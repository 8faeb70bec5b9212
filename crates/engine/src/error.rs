//! The module contains the errors the engine can throw.
//!
//! Two tiers are exposed:
//!
//! - [`EngineError`] is the detailed error every operation produces.
//! - [`RecordError`] is what [`record_transaction`] hands back to callers: it
//!   only tells whether the request was rejected up front or whether the unit
//!   of work failed, while the detailed error stays reachable as its source.
//!
//!  [`record_transaction`]: crate::Engine::record_transaction
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Missing exchange rate: {0}")]
    MissingRate(String),
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid transaction kind: {0}")]
    InvalidKind(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::MissingRate(a), Self::MissingRate(b)) => a == b,
            (Self::InvalidRate(a), Self::InvalidRate(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Outcome of a failed transaction recording, as seen by callers.
#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    /// The request was rejected before any unit of work was opened.
    #[error("invalid transfer request: {0}")]
    Invalid(#[source] EngineError),
    /// The unit of work was rolled back. The cause is kept as `source()`.
    #[error("unable to create transaction")]
    Failed(#[source] EngineError),
}

impl RecordError {
    /// The detailed engine error behind this failure.
    pub fn cause(&self) -> &EngineError {
        match self {
            Self::Invalid(err) | Self::Failed(err) => err,
        }
    }
}
