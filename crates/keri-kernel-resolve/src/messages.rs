//! Resolution request/response messages.
//!
//! A verifier asks the entity that controls an identifier for its KEL, or for
//! the TEL of one credential, and validates whatever comes back itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use keri_kernel_core::{Blake3Hash, Prefix, SignedKeyEvent};
use keri_kernel_tel::SignedTelEvent;

/// Where an entity can be reached. Opaque to the kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkLocation(pub String);

impl NetworkLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 0;

/// Message size limits.
///
/// A KEL grows with every issuance, so its length is not capped.
pub mod limits {
    /// A TEL never holds more than issuance and revocation.
    pub const MAX_TEL_EVENTS: usize = 2;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveRequest {
    /// Full KEL of `prefix`.
    Kel { prefix: Prefix },

    /// TEL of `credential` issued by `prefix`.
    Tel {
        prefix: Prefix,
        credential: Blake3Hash,
    },
}

impl ResolveRequest {
    pub fn prefix(&self) -> &Prefix {
        match self {
            ResolveRequest::Kel { prefix } | ResolveRequest::Tel { prefix, .. } => prefix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveResponse {
    Kel { events: Vec<SignedKeyEvent> },

    /// Empty when the issuer has no log for the credential.
    Tel { events: Vec<SignedTelEvent> },

    Error { code: ErrorCode, message: String },
}

impl ResolveResponse {
    /// Check if this response respects size limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        match self {
            ResolveResponse::Tel { events } => {
                if events.len() > limits::MAX_TEL_EVENTS {
                    return Err("too many transaction events");
                }
            }
            ResolveResponse::Kel { .. } | ResolveResponse::Error { .. } => {}
        }
        Ok(())
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ResolveResponse::Error {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The responder does not control the requested prefix.
    UnknownIdentifier,
    /// Responder failed internally.
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use keri_kernel_core::{EventSeal, KeyCommitment, KeyEvent, Keypair};
    use keri_kernel_tel::TelRegistry;

    #[test]
    fn test_limits() {
        let ok = ResolveResponse::Tel { events: vec![] };
        assert!(ok.validate_limits().is_ok());

        let err = ResolveResponse::error(ErrorCode::Internal, "boom");
        assert!(err.validate_limits().is_ok());
    }

    #[test]
    fn test_long_kel_within_limits() {
        let keys = Keypair::from_seed(&[1; 32]);
        let icp = KeyEvent::inception(
            keys.public_key(),
            KeyCommitment::of(&Keypair::from_seed(&[2; 32]).public_key()),
        )
        .sign(&keys);
        let long = ResolveResponse::Kel {
            events: vec![icp; 20_000],
        };
        assert!(long.validate_limits().is_ok());
    }

    #[test]
    fn test_tel_limit() {
        let keys = Keypair::from_seed(&[1; 32]);
        let prefix = Prefix::from_digest(Blake3Hash::hash(b"p"));
        let seal = EventSeal::new(prefix, 1, Blake3Hash::hash(b"ixn"));
        let mut registry = TelRegistry::new();
        let d = Blake3Hash::hash(b"vc");
        registry.record_issuance(d, seal, &keys).unwrap();
        let issued = registry.log(&d).unwrap().events()[0].clone();

        let long = ResolveResponse::Tel {
            events: vec![issued; 3],
        };
        assert!(long.validate_limits().is_err());
    }

    #[test]
    fn test_request_prefix() {
        let prefix = Prefix::from_digest(Blake3Hash::hash(b"p"));
        let req = ResolveRequest::Tel {
            prefix,
            credential: Blake3Hash::hash(b"vc"),
        };
        assert_eq!(req.prefix(), &prefix);
    }
}
