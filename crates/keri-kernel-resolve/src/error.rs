//! Error types for the resolve module.

use thiserror::Error;

use keri_kernel_core::{KelError, Prefix};
use keri_kernel_tel::TelError;

use crate::messages::ErrorCode;

/// Errors that can occur while resolving a remote identifier.
///
/// None of these say anything about whether a credential is valid; they mean
/// the check could not be made.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The address book has no location for this prefix.
    #[error("no address registered for {0}")]
    NotFound(Prefix),

    /// Timeout waiting for the remote entity.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Peer sent an error response.
    #[error("peer error ({code:?}): {message}")]
    Peer { code: ErrorCode, message: String },

    /// Peer answered with the wrong kind of response.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The fetched KEL does not validate.
    #[error("invalid key event log: {0}")]
    InvalidKel(#[from] KelError),

    /// The fetched TEL does not validate against the KEL.
    #[error("invalid transaction event log: {0}")]
    InvalidTel(#[from] TelError),
}

/// Result type for resolve operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
