//! TEL events: issuance and revocation records for one credential.

use serde::{Deserialize, Serialize};
use serde_json::json;

use keri_kernel_core::canonical::{int_map_bytes, Field};
use keri_kernel_core::{
    Blake3Hash, CoreError, Ed25519PublicKey, Ed25519Signature, EnvelopeType, EventEnvelope,
    EventSeal, Keypair,
};

/// The current TEL event schema version.
pub const TEL_VERSION: u8 = 0;

/// TEL event field keys.
mod keys {
    pub const VERSION: u64 = 0;
    pub const KIND: u64 = 1;
    pub const CREDENTIAL: u64 = 2;
    pub const SEQ: u64 = 3;
    pub const PRIOR: u64 = 4;
    pub const SEAL_PREFIX: u64 = 5;
    pub const SEAL_SEQ: u64 = 6;
    pub const SEAL_DIGEST: u64 = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TelEventKind {
    Issued = 0,
    /// Terminal.
    Revoked = 1,
}

impl TelEventKind {
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// An unsigned TEL event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelEvent {
    pub version: u8,
    pub kind: TelEventKind,

    /// Digest of the credential this log tracks.
    pub credential: Blake3Hash,

    /// Position in this credential's log (issuance is 0).
    pub seq: u64,

    /// Digest of the previous TEL event (absent only for issuance).
    pub prior: Option<Blake3Hash>,

    /// The issuer KEL event this record is anchored to.
    pub seal: EventSeal,
}

impl TelEvent {
    pub fn issued(credential: Blake3Hash, seal: EventSeal) -> Self {
        Self {
            version: TEL_VERSION,
            kind: TelEventKind::Issued,
            credential,
            seq: 0,
            prior: None,
            seal,
        }
    }

    pub fn revoked(credential: Blake3Hash, seq: u64, prior: Blake3Hash, seal: EventSeal) -> Self {
        Self {
            version: TEL_VERSION,
            kind: TelEventKind::Revoked,
            credential,
            seq,
            prior: Some(prior),
            seal,
        }
    }

    /// Canonical CBOR bytes (signature excluded).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        int_map_bytes(&[
            (keys::VERSION, Field::Uint(self.version.into())),
            (keys::KIND, Field::Uint(self.kind.to_u8().into())),
            (keys::CREDENTIAL, Field::Bytes(&self.credential.0)),
            (keys::SEQ, Field::Uint(self.seq)),
            (keys::PRIOR, Field::opt_bytes(self.prior.as_ref().map(|d| &d.0[..]))),
            (keys::SEAL_PREFIX, Field::Bytes(&self.seal.prefix.digest().0)),
            (keys::SEAL_SEQ, Field::Uint(self.seal.seq)),
            (keys::SEAL_DIGEST, Field::Bytes(&self.seal.digest.0)),
        ])
    }

    pub fn digest(&self) -> Blake3Hash {
        Blake3Hash::hash(&self.canonical_bytes())
    }

    pub fn sign(self, keypair: &Keypair) -> SignedTelEvent {
        let signature = keypair.sign(&self.canonical_bytes());
        SignedTelEvent {
            event: self,
            signature,
        }
    }
}

/// A TEL event signed by the issuer's key current at its seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTelEvent {
    pub event: TelEvent,
    pub signature: Ed25519Signature,
}

impl SignedTelEvent {
    pub fn digest(&self) -> Blake3Hash {
        self.event.digest()
    }

    pub fn kind(&self) -> TelEventKind {
        self.event.kind
    }

    pub fn verify_with(&self, key: &Ed25519PublicKey) -> Result<(), CoreError> {
        key.verify(&self.event.canonical_bytes(), &self.signature)
    }
}

impl From<&SignedTelEvent> for EventEnvelope {
    fn from(signed: &SignedTelEvent) -> Self {
        let event = &signed.event;
        let kind = match event.kind {
            TelEventKind::Issued => EnvelopeType::Issued,
            TelEventKind::Revoked => EnvelopeType::Revoked,
        };
        let payload = json!({
            "credential": event.credential.to_text(),
            "seal": {
                "prefix": event.seal.prefix.to_text(),
                "seq": event.seal.seq,
                "digest": event.seal.digest.to_text(),
            },
        });
        EventEnvelope::new(kind, event.seq, event.prior.as_ref(), payload, signed.signature)
    }
}
