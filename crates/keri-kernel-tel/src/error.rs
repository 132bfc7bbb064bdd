//! Error types for the transaction event log.

use keri_kernel_core::Blake3Hash;
use thiserror::Error;

/// Errors that can occur while recording or validating TEL events.
#[derive(Debug, Error)]
pub enum TelError {
    /// The credential already has an issuance event.
    #[error("credential {0} already issued")]
    DuplicateIssuance(Blake3Hash),

    /// Revocation requested for a credential that was never issued.
    #[error("unknown credential {0}")]
    UnknownCredential(Blake3Hash),

    /// The credential is already revoked.
    #[error("credential {0} already revoked")]
    AlreadyRevoked(Blake3Hash),

    /// A received log breaks ordering or linkage rules.
    #[error("invalid transaction event log: {0}")]
    InvalidLog(String),

    /// A TEL event's seal does not resolve to the expected KEL event.
    #[error("event {seq} is not anchored in the issuer's key event log")]
    Unanchored { seq: u64 },

    /// A TEL event's signature does not verify under the anchoring key state.
    #[error("signature verification failed for event {seq}")]
    SignatureInvalid { seq: u64 },
}

/// Result type for TEL operations.
pub type Result<T> = std::result::Result<T, TelError>;
