//! Key events: the entries of a key event log.
//!
//! An event is immutable once signed. Its digest (Blake3 of the canonical
//! bytes) is what the next event's `prior` points at; the signature is
//! detached and never part of the digest.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_event_bytes;
use crate::crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::error::CoreError;
use crate::rotation::KeyCommitment;
use crate::types::{EventSeal, Prefix};

/// The current key event schema version.
pub const EVENT_VERSION: u8 = 0;

/// Discriminator for the three key event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    Inception = 0,
    Rotation = 1,
    Interaction = 2,
}

impl EventKind {
    /// Convert to u8 for serialization.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Inception),
            1 => Some(Self::Rotation),
            2 => Some(Self::Interaction),
            _ => None,
        }
    }

    /// Name used in event envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inception => "Inception",
            Self::Rotation => "Rotation",
            Self::Interaction => "Interaction",
        }
    }
}

/// Kind-specific event content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    /// Declares the first signing key and commits to the next one.
    Inception {
        signing_key: Ed25519PublicKey,
        next_commitment: KeyCommitment,
    },
    /// Reveals the pre-committed key and commits to a new next key.
    Rotation {
        signing_key: Ed25519PublicKey,
        next_commitment: KeyCommitment,
    },
    /// Anchors an external digest without touching keys.
    Interaction { anchor: Blake3Hash },
}

/// An unsigned key event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Schema version (currently 0).
    pub version: u8,

    /// Owning identifier. Absent for inception, whose digest *is* the prefix.
    pub prefix: Option<Prefix>,

    /// Position in the log (inception is 0).
    pub seq: u64,

    /// Digest of the previous event (absent only for inception).
    pub prior: Option<Blake3Hash>,

    pub payload: EventPayload,
}

impl KeyEvent {
    /// Draft an inception event.
    pub fn inception(signing_key: Ed25519PublicKey, next_commitment: KeyCommitment) -> Self {
        Self {
            version: EVENT_VERSION,
            prefix: None,
            seq: 0,
            prior: None,
            payload: EventPayload::Inception {
                signing_key,
                next_commitment,
            },
        }
    }

    /// Draft a rotation event.
    pub fn rotation(
        prefix: Prefix,
        seq: u64,
        prior: Blake3Hash,
        signing_key: Ed25519PublicKey,
        next_commitment: KeyCommitment,
    ) -> Self {
        Self {
            version: EVENT_VERSION,
            prefix: Some(prefix),
            seq,
            prior: Some(prior),
            payload: EventPayload::Rotation {
                signing_key,
                next_commitment,
            },
        }
    }

    /// Draft an interaction event anchoring `anchor`.
    pub fn interaction(prefix: Prefix, seq: u64, prior: Blake3Hash, anchor: Blake3Hash) -> Self {
        Self {
            version: EVENT_VERSION,
            prefix: Some(prefix),
            seq,
            prior: Some(prior),
            payload: EventPayload::Interaction { anchor },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Inception { .. } => EventKind::Inception,
            EventPayload::Rotation { .. } => EventKind::Rotation,
            EventPayload::Interaction { .. } => EventKind::Interaction,
        }
    }

    /// Canonical bytes: the message that gets signed and hashed.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_event_bytes(self)
    }

    /// Blake3 digest of the canonical bytes.
    pub fn digest(&self) -> Blake3Hash {
        Blake3Hash::hash(&self.canonical_bytes())
    }

    /// Key established by this event, if any.
    pub fn signing_key(&self) -> Option<&Ed25519PublicKey> {
        match &self.payload {
            EventPayload::Inception { signing_key, .. }
            | EventPayload::Rotation { signing_key, .. } => Some(signing_key),
            EventPayload::Interaction { .. } => None,
        }
    }

    /// Next-key commitment published by this event, if any.
    pub fn next_commitment(&self) -> Option<&KeyCommitment> {
        match &self.payload {
            EventPayload::Inception {
                next_commitment, ..
            }
            | EventPayload::Rotation {
                next_commitment, ..
            } => Some(next_commitment),
            EventPayload::Interaction { .. } => None,
        }
    }

    /// Digest anchored by an interaction event.
    pub fn anchor(&self) -> Option<&Blake3Hash> {
        match &self.payload {
            EventPayload::Interaction { anchor } => Some(anchor),
            _ => None,
        }
    }

    /// Sign the canonical bytes.
    pub fn sign(self, keypair: &Keypair) -> SignedKeyEvent {
        let signature = keypair.sign(&self.canonical_bytes());
        SignedKeyEvent {
            event: self,
            signature,
        }
    }
}

/// A key event with its detached signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedKeyEvent {
    pub event: KeyEvent,

    /// Ed25519 signature over the canonical event bytes, made with the key
    /// valid at signing time.
    pub signature: Ed25519Signature,
}

impl SignedKeyEvent {
    pub fn new(event: KeyEvent, signature: Ed25519Signature) -> Self {
        Self { event, signature }
    }

    pub fn digest(&self) -> Blake3Hash {
        self.event.digest()
    }

    pub fn seq(&self) -> u64 {
        self.event.seq
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    /// Check the signature against `key`.
    pub fn verify_with(&self, key: &Ed25519PublicKey) -> Result<(), CoreError> {
        key.verify(&self.event.canonical_bytes(), &self.signature)
    }

    /// Seal pointing at this event within `prefix`'s log.
    pub fn seal(&self, prefix: Prefix) -> EventSeal {
        EventSeal::new(prefix, self.seq(), self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_roundtrip() {
        for kind in [
            EventKind::Inception,
            EventKind::Rotation,
            EventKind::Interaction,
        ] {
            assert_eq!(EventKind::from_u8(kind.to_u8()), Some(kind));
        }
        assert_eq!(EventKind::from_u8(3), None);
    }

    #[test]
    fn test_inception_shape() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let next = Keypair::from_seed(&[0x43; 32]);
        let event = KeyEvent::inception(keypair.public_key(), KeyCommitment::of(&next.public_key()));

        assert_eq!(event.kind(), EventKind::Inception);
        assert_eq!(event.seq, 0);
        assert!(event.prior.is_none());
        assert!(event.prefix.is_none());
        assert_eq!(event.signing_key(), Some(&keypair.public_key()));
        assert!(event.anchor().is_none());
    }

    #[test]
    fn test_signature_excluded_from_digest() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let other = Keypair::from_seed(&[0x44; 32]);
        let next = Keypair::from_seed(&[0x43; 32]);
        let event = KeyEvent::inception(keypair.public_key(), KeyCommitment::of(&next.public_key()));

        let a = event.clone().sign(&keypair);
        let b = event.sign(&other);
        assert_ne!(a.signature, b.signature);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_signed_event_verify() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let next = Keypair::from_seed(&[0x43; 32]);
        let signed = KeyEvent::inception(keypair.public_key(), KeyCommitment::of(&next.public_key()))
            .sign(&keypair);

        assert!(signed.verify_with(&keypair.public_key()).is_ok());
        assert!(signed.verify_with(&next.public_key()).is_err());
    }
}
