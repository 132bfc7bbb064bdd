//! # KERI Kernel Resolve
//!
//! Remote resolution of key state and credential status.
//!
//! ## Overview
//!
//! A verifier that does not hold an issuer's logs asks for them. The
//! [`AddressResolver`] maps a prefix to a [`NetworkLocation`], a
//! [`Transport`] carries the request there, and a [`Responder`] on the other
//! side answers from its own logs. [`RemoteResolver`] replays whatever comes
//! back before anyone relies on it.
//!
//! ## Message Flow
//!
//! ```text
//! Verifier                              Issuer
//!   |-------- Kel { prefix } ----------->|
//!   |<------- Kel { events } ------------|
//!   |-------- Tel { prefix, d } -------->|
//!   |<------- Tel { events } ------------|
//! ```
//!
//! Every round trip is bounded by [`ResolverConfig::request_timeout`].

pub mod address;
pub mod error;
pub mod messages;
pub mod resolver;
pub mod transport;

pub use address::{AddressResolver, MemoryAddressBook};
pub use error::{ResolveError, Result};
pub use messages::{
    limits, ErrorCode, NetworkLocation, ResolveRequest, ResolveResponse, PROTOCOL_VERSION,
};
pub use resolver::{RemoteResolver, ResolverConfig};
pub use transport::{memory::MemoryNetwork, memory::MemoryTransport, Responder, Transport};
