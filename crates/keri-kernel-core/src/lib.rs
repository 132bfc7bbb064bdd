//! # KERI Kernel Core
//!
//! Pure primitives for self-certifying identifiers: key events, prefix
//! derivation, pre-rotation and the key event log engine.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Prefix`] - Self-certifying identifier (digest of the inception event)
//! - [`KeyEvent`] - Inception, rotation or interaction
//! - [`Kel`] - Append-only, hash-chained log for one identifier
//! - [`KeyState`] - Snapshot of an identifier's keys
//! - [`KeyRing`] - Current keypair plus the pre-committed next keypair
//!
//! ## Canonicalization
//!
//! Events are encoded using deterministic CBOR before hashing or signing.
//! See [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod event;
pub mod kel;
pub mod prefix;
pub mod rotation;
pub mod state;
pub mod types;
pub mod validation;

pub use canonical::{canonical_event_bytes, canonical_json_bytes, decode_event};
pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use envelope::{EnvelopeType, EventEnvelope};
pub use error::{CoreError, KelError};
pub use event::{EventKind, EventPayload, KeyEvent, SignedKeyEvent, EVENT_VERSION};
pub use kel::Kel;
pub use prefix::derive_prefix;
pub use rotation::{verify_commitment, KeyCommitment, KeyRing, PendingRotation};
pub use state::KeyState;
pub use types::{EventSeal, Prefix, DID_METHOD};
pub use validation::{validate_event, validate_inception};
