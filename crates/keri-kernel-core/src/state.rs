//! Key state: the result of replaying a key event log.

use serde::{Deserialize, Serialize};

use crate::crypto::{Blake3Hash, Ed25519PublicKey};
use crate::event::{EventPayload, KeyEvent};
use crate::rotation::KeyCommitment;
use crate::types::{EventSeal, Prefix};

/// Snapshot of an identifier's keys at one point in its log.
///
/// Values are only produced by the KEL engine after validation; callers get
/// clones, never a handle into the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyState {
    pub prefix: Prefix,

    /// Sequence number of the last applied event.
    pub seq: u64,

    /// Key that must sign the next event.
    pub signing_key: Ed25519PublicKey,

    /// Commitment the next rotation must satisfy.
    pub next_commitment: KeyCommitment,

    /// Digest of the last applied event.
    pub last_digest: Blake3Hash,

    /// Sequence number of the last inception or rotation.
    pub last_establishment_seq: u64,
}

impl KeyState {
    /// State right after an inception event. Returns `None` for other kinds.
    pub fn from_inception(prefix: Prefix, event: &KeyEvent) -> Option<Self> {
        match &event.payload {
            EventPayload::Inception {
                signing_key,
                next_commitment,
            } => Some(Self {
                prefix,
                seq: event.seq,
                signing_key: *signing_key,
                next_commitment: *next_commitment,
                last_digest: event.digest(),
                last_establishment_seq: event.seq,
            }),
            _ => None,
        }
    }

    /// Transition by an already validated event.
    pub fn apply(&self, event: &KeyEvent) -> Self {
        let mut next = self.clone();
        next.seq = event.seq;
        next.last_digest = event.digest();
        match &event.payload {
            EventPayload::Inception {
                signing_key,
                next_commitment,
            }
            | EventPayload::Rotation {
                signing_key,
                next_commitment,
            } => {
                next.signing_key = *signing_key;
                next.next_commitment = *next_commitment;
                next.last_establishment_seq = event.seq;
            }
            EventPayload::Interaction { .. } => {}
        }
        next
    }

    /// Seal of the last applied event.
    pub fn seal(&self) -> EventSeal {
        EventSeal::new(self.prefix, self.seq, self.last_digest)
    }
}
