//! # KERI Kernel TEL
//!
//! Transaction event logs: per-credential issuance and revocation status.
//!
//! ## Overview
//!
//! Instead of a mutable status flag, a credential's status is the tail of a
//! small hash-linked log keyed by the credential digest. Every event carries
//! a seal of the issuer KEL event it was anchored to, so a verifier holding
//! the issuer's KEL can check who signed it and when.
//!
//! ## Lifecycle
//!
//! ```text
//! Unknown --record_issuance--> Issued --record_revocation--> Revoked
//! ```
//!
//! `Revoked` is terminal. Misuse is reported as
//! [`TelError::DuplicateIssuance`], [`TelError::UnknownCredential`] or
//! [`TelError::AlreadyRevoked`], and never changes a log.

pub mod anchor;
pub mod error;
pub mod event;
pub mod log;
pub mod registry;

pub use anchor::verify_anchoring;
pub use error::{Result, TelError};
pub use event::{SignedTelEvent, TelEvent, TelEventKind, TEL_VERSION};
pub use log::{TelLog, TelStatus};
pub use registry::TelRegistry;
