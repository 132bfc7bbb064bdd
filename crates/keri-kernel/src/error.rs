//! Error types for the Kernel.

use keri_kernel_core::{CoreError, KelError, Prefix};
use keri_kernel_resolve::ResolveError;
use keri_kernel_tel::TelError;
use thiserror::Error;

/// Errors that can occur during Kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Key event rejected.
    #[error("key event error: {0}")]
    Kel(#[from] KelError),

    /// Transaction event rejected.
    #[error("transaction event error: {0}")]
    Tel(#[from] TelError),

    /// Remote resolution failed.
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Key material or encoding problem.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// An entity's lock was poisoned by a panicking writer.
    #[error("entity state lock poisoned")]
    LockPoisoned,

    /// No local entity controls this identifier.
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(Prefix),

    /// A credential could not be parsed or rebuilt.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

impl<T> From<std::sync::PoisonError<T>> for KernelError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        KernelError::LockPoisoned
    }
}

/// Result type for Kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
