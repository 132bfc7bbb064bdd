//! # KERI Kernel
//!
//! Self-certifying identifiers with pre-rotated keys, verifiable credentials
//! whose status is tracked in transaction event logs, and DID documents
//! derived from key state.
//!
//! ## Key Concepts
//!
//! - **Prefix**: The digest of an identifier's inception event. Never changes.
//! - **KEL**: Append-only, hash-chained key events for one prefix.
//! - **Pre-rotation**: Each establishment event commits to the digest of the
//!   next key; a rotation must reveal exactly that key.
//! - **TEL**: Per-credential issuance and revocation, each sealed to a KEL event.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keri_kernel::{Entity, EntityConfig, Verification};
//! use serde_json::json;
//!
//! async fn example() -> keri_kernel::Result<()> {
//!     let issuer = Entity::new(EntityConfig::default())?;
//!
//!     let credential = issuer.issue("test", json!({"msg": "hi"}))?;
//!     assert_eq!(issuer.verify(&issuer.prefix(), &credential).await, Verification::Valid);
//!
//!     issuer.rotate()?;
//!     issuer.revoke(&credential)?;
//!     assert_eq!(issuer.verify(&issuer.prefix(), &credential).await, Verification::Revoked);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `keri_kernel::core` - Key events, KEL engine, pre-rotation
//! - `keri_kernel::tel` - Transaction event logs
//! - `keri_kernel::resolve` - Remote resolution and transports

pub mod config;
pub mod controller;
pub mod credential;
pub mod did;
pub mod entity;
pub mod error;

// Re-export component crates
pub use keri_kernel_core as core;
pub use keri_kernel_resolve as resolve;
pub use keri_kernel_tel as tel;

pub use config::EntityConfig;
pub use controller::Controller;
pub use credential::{
    verify_credential, verify_remote, AttestationDatum, SignedAttestationDatum, Verification,
};
pub use did::{DidDocument, ServiceEndpoint, VerificationMethod};
pub use entity::Entity;
pub use error::{KernelError, Result};

pub use keri_kernel_core::{
    Blake3Hash, Ed25519PublicKey, Ed25519Signature, KelError, KeyRing, KeyState, Keypair, Prefix,
};
pub use keri_kernel_tel::{TelError, TelStatus};
