//! Pre-rotation: commit to the next key now, reveal it at the next rotation.
//!
//! Only `hash(next_public_key)` is ever published ahead of time. A rotation is
//! accepted only if the key it reveals hashes to the commitment carried by the
//! previous establishment event, so whoever holds the current private key
//! alone cannot rotate to a key of their choosing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::error::KelError;
use crate::event::{KeyEvent, SignedKeyEvent};
use crate::kel::Kel;
use crate::state::KeyState;

/// Digest of a not-yet-revealed public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCommitment(pub Blake3Hash);

impl KeyCommitment {
    /// Commit to `key`.
    pub fn of(key: &Ed25519PublicKey) -> Self {
        Self(Blake3Hash::hash(key.as_bytes()))
    }

    pub fn digest(&self) -> &Blake3Hash {
        &self.0
    }

    pub fn matches(&self, key: &Ed25519PublicKey) -> bool {
        Self::of(key) == *self
    }
}

impl fmt::Debug for KeyCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyCommitment({})", &self.0.to_hex()[..16])
    }
}

impl fmt::Display for KeyCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Check a revealed key against a published commitment.
pub fn verify_commitment(
    revealed: &Ed25519PublicKey,
    commitment: &KeyCommitment,
) -> Result<(), KelError> {
    if commitment.matches(revealed) {
        Ok(())
    } else {
        Err(KelError::CommitmentMismatch {
            expected: commitment.0,
            got: KeyCommitment::of(revealed).0,
        })
    }
}

/// The controller's secret side: the current keypair and the pre-committed
/// next keypair.
#[derive(Debug, Clone)]
pub struct KeyRing {
    current: Keypair,
    next: Keypair,
}

impl KeyRing {
    pub fn new(current: Keypair, next: Keypair) -> Self {
        Self { current, next }
    }

    /// Fresh random current and next keys.
    pub fn generate() -> Self {
        Self::new(Keypair::generate(), Keypair::generate())
    }

    /// Keypair that signs events right now.
    pub fn current(&self) -> &Keypair {
        &self.current
    }

    pub fn current_key(&self) -> Ed25519PublicKey {
        self.current.public_key()
    }

    /// Commitment to the next key; the key itself stays private.
    pub fn next_commitment(&self) -> KeyCommitment {
        KeyCommitment::of(&self.next.public_key())
    }

    /// Signed inception event for this ring.
    pub fn inception_event(&self) -> SignedKeyEvent {
        KeyEvent::inception(self.current_key(), self.next_commitment()).sign(&self.current)
    }

    /// Stage a rotation that reveals the committed next key and commits to
    /// `new_next`. Neither the ring nor the log changes.
    pub fn stage_rotation(&self, kel: &Kel, new_next: Keypair) -> PendingRotation {
        self.stage_rotation_with(kel, self.next.clone(), new_next)
    }

    /// Stage a rotation revealing an arbitrary key. Confirming it fails with
    /// [`KelError::CommitmentMismatch`] unless `revealed` is the committed key.
    pub fn stage_rotation_with(
        &self,
        kel: &Kel,
        revealed: Keypair,
        new_next: Keypair,
    ) -> PendingRotation {
        let event = kel.rotate(revealed.public_key(), KeyCommitment::of(&new_next.public_key()));
        // Rotations are signed by the key being retired.
        let signature = self.current.sign(&event.canonical_bytes());
        PendingRotation {
            event,
            signature,
            revealed,
            next: new_next,
        }
    }

    /// Confirm `pending` against `kel` and, only if that succeeds, advance the
    /// ring to the revealed key.
    pub fn apply<'k>(
        &mut self,
        kel: &'k mut Kel,
        pending: PendingRotation,
    ) -> Result<&'k KeyState, KelError> {
        kel.confirm(pending.event, pending.signature)?;
        self.current = pending.revealed;
        self.next = pending.next;
        Ok(kel.current_state_ref())
    }
}

/// A drafted, signed rotation that has not touched any state yet.
///
/// Dropping it discards the rotation.
#[derive(Debug, Clone)]
pub struct PendingRotation {
    event: KeyEvent,
    signature: Ed25519Signature,
    revealed: Keypair,
    next: Keypair,
}

impl PendingRotation {
    pub fn event(&self) -> &KeyEvent {
        &self.event
    }

    pub fn signature(&self) -> &Ed25519Signature {
        &self.signature
    }

    pub fn seq(&self) -> u64 {
        self.event.seq
    }

    pub fn revealed_key(&self) -> Ed25519PublicKey {
        self.revealed.public_key()
    }

    pub fn next_commitment(&self) -> KeyCommitment {
        KeyCommitment::of(&self.next.public_key())
    }
}
