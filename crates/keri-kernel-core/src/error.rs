//! Error types for the KERI Kernel Core.

use thiserror::Error;

use crate::crypto::Blake3Hash;
use crate::types::Prefix;

/// Low-level errors from keys, signatures and encodings.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("unsupported event version: {0}")]
    UnsupportedVersion(u8),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Errors raised while deriving prefixes or appending to a key event log.
///
/// Every variant leaves the log it was raised against unchanged.
#[derive(Debug, Error)]
pub enum KelError {
    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("revealed key does not match next-key commitment {expected}")]
    CommitmentMismatch { expected: Blake3Hash, got: Blake3Hash },

    #[error("sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("prior digest mismatch: expected {expected}, got {got:?}")]
    PriorDigestMismatch {
        expected: Blake3Hash,
        got: Option<Blake3Hash>,
    },

    #[error("event belongs to {got:?}, not {expected}")]
    PrefixMismatch {
        expected: Prefix,
        got: Option<Prefix>,
    },

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("key event log is empty")]
    EmptyLog,
}

impl From<CoreError> for KelError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => KelError::SignatureInvalid,
            CoreError::UnsupportedVersion(v) => KelError::UnsupportedVersion(v),
            CoreError::MalformedEvent(msg)
            | CoreError::EncodingError(msg)
            | CoreError::DecodingError(msg) => KelError::MalformedEvent(msg),
        }
    }
}
