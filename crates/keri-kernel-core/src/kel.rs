//! Key Event Log engine.
//!
//! A [`Kel`] only exists once an inception has been validated, so the
//! "uninitialized" state is simply the absence of a value. From there every
//! mutation goes through [`Kel::confirm`], which either appends one event and
//! advances the key state or leaves both untouched.
//!
//! Drafting ([`Kel::rotate`], [`Kel::interact`]) is separate from confirming:
//! a draft that is never confirmed has no effect.

use crate::crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature};
use crate::error::KelError;
use crate::event::{KeyEvent, SignedKeyEvent};
use crate::rotation::KeyCommitment;
use crate::state::KeyState;
use crate::types::{EventSeal, Prefix};
use crate::validation::{validate_event, validate_inception};

/// An append-only, hash-chained log for one identifier.
///
/// Events are stored by sequence number: `events[n].seq() == n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kel {
    events: Vec<SignedKeyEvent>,
    state: KeyState,
}

impl Kel {
    /// Start a log from a signed inception event.
    pub fn incept(event: KeyEvent, signature: Ed25519Signature) -> Result<Self, KelError> {
        let state = validate_inception(&event, &signature)?;
        tracing::debug!(prefix = %state.prefix, "incepted key event log");
        Ok(Self {
            events: vec![SignedKeyEvent::new(event, signature)],
            state,
        })
    }

    /// Rebuild and fully validate a log received from elsewhere.
    pub fn replay(events: impl IntoIterator<Item = SignedKeyEvent>) -> Result<Self, KelError> {
        let mut iter = events.into_iter();
        let first = iter.next().ok_or(KelError::EmptyLog)?;
        let mut kel = Self::incept(first.event, first.signature)?;
        for signed in iter {
            kel.confirm(signed.event, signed.signature)?;
        }
        Ok(kel)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drafting
    // ─────────────────────────────────────────────────────────────────────────

    /// Draft a rotation revealing `new_key` and committing to the next key.
    pub fn rotate(&self, new_key: Ed25519PublicKey, next_commitment: KeyCommitment) -> KeyEvent {
        KeyEvent::rotation(
            self.state.prefix,
            self.state.seq + 1,
            self.state.last_digest,
            new_key,
            next_commitment,
        )
    }

    /// Draft an interaction anchoring `anchor`.
    pub fn interact(&self, anchor: Blake3Hash) -> KeyEvent {
        KeyEvent::interaction(
            self.state.prefix,
            self.state.seq + 1,
            self.state.last_digest,
            anchor,
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Appending
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and append a signed rotation or interaction.
    pub fn confirm(
        &mut self,
        event: KeyEvent,
        signature: Ed25519Signature,
    ) -> Result<&SignedKeyEvent, KelError> {
        let next = validate_event(&self.state, &event, &signature)?;
        tracing::debug!(
            prefix = %next.prefix,
            seq = next.seq,
            kind = event.kind().as_str(),
            "appended key event"
        );
        self.events.push(SignedKeyEvent::new(event, signature));
        self.state = next;
        Ok(&self.events[self.events.len() - 1])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn prefix(&self) -> Prefix {
        self.state.prefix
    }

    /// Snapshot of the current key state.
    pub fn current_state(&self) -> KeyState {
        self.state.clone()
    }

    pub fn current_state_ref(&self) -> &KeyState {
        &self.state
    }

    /// Key state as it was right after event `seq`.
    pub fn state_at(&self, seq: u64) -> Option<KeyState> {
        let upto = usize::try_from(seq).ok()?;
        let (first, rest) = self.events.get(..=upto)?.split_first()?;
        let mut state = KeyState::from_inception(self.state.prefix, &first.event)?;
        for signed in rest {
            state = state.apply(&signed.event);
        }
        Some(state)
    }

    pub fn event_at(&self, seq: u64) -> Option<&SignedKeyEvent> {
        self.events.get(usize::try_from(seq).ok()?)
    }

    pub fn events(&self) -> &[SignedKeyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false: a log holds at least its inception.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether `seal` names an event in this log.
    pub fn contains_seal(&self, seal: &EventSeal) -> bool {
        seal.prefix == self.state.prefix
            && self
                .event_at(seal.seq)
                .is_some_and(|e| e.digest() == seal.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn k(seed: u8) -> Keypair {
        Keypair::from_seed(&[seed; 32])
    }

    fn new_kel() -> Kel {
        let event = KeyEvent::inception(k(1).public_key(), KeyCommitment::of(&k(2).public_key()));
        let signature = k(1).sign(&event.canonical_bytes());
        Kel::incept(event, signature).unwrap()
    }

    fn append_interaction(kel: &mut Kel, anchor: &[u8], signer: &Keypair) {
        let event = kel.interact(Blake3Hash::hash(anchor));
        let sig = signer.sign(&event.canonical_bytes());
        kel.confirm(event, sig).unwrap();
    }

    #[test]
    fn test_incept() {
        let kel = new_kel();
        let state = kel.current_state();
        assert_eq!(kel.len(), 1);
        assert_eq!(state.seq, 0);
        assert_eq!(*kel.prefix().digest(), kel.events()[0].digest());
    }

    #[test]
    fn test_drafts_do_not_mutate() {
        let kel = new_kel();
        let before = kel.clone();
        let _ = kel.interact(Blake3Hash::hash(b"a"));
        let _ = kel.rotate(k(2).public_key(), KeyCommitment::of(&k(3).public_key()));
        assert_eq!(kel, before);
    }

    #[test]
    fn test_chain_linkage() {
        let mut kel = new_kel();
        append_interaction(&mut kel, b"a", &k(1));
        append_interaction(&mut kel, b"b", &k(1));

        for pair in kel.events().windows(2) {
            assert_eq!(pair[1].event.prior, Some(pair[0].digest()));
            assert_eq!(pair[1].seq(), pair[0].seq() + 1);
        }
    }

    #[test]
    fn test_rotation_then_interaction_uses_new_key() {
        let mut kel = new_kel();
        let rot = kel.rotate(k(2).public_key(), KeyCommitment::of(&k(3).public_key()));
        let sig = k(1).sign(&rot.canonical_bytes());
        kel.confirm(rot, sig).unwrap();

        // Old key can no longer sign.
        let ixn = kel.interact(Blake3Hash::hash(b"x"));
        let stale = k(1).sign(&ixn.canonical_bytes());
        assert!(matches!(
            kel.confirm(ixn.clone(), stale),
            Err(KelError::SignatureInvalid)
        ));

        let fresh = k(2).sign(&ixn.canonical_bytes());
        kel.confirm(ixn, fresh).unwrap();
        assert_eq!(kel.current_state().last_establishment_seq, 1);
    }

    #[test]
    fn test_failed_confirm_leaves_log_unchanged() {
        let mut kel = new_kel();
        append_interaction(&mut kel, b"a", &k(1));
        let before = kel.clone();

        let ixn = kel.interact(Blake3Hash::hash(b"b"));
        let bad = k(7).sign(&ixn.canonical_bytes());
        assert!(kel.confirm(ixn, bad).is_err());
        assert_eq!(kel, before);

        let rot = kel.rotate(k(9).public_key(), KeyCommitment::of(&k(10).public_key()));
        let sig = k(1).sign(&rot.canonical_bytes());
        assert!(matches!(
            kel.confirm(rot, sig),
            Err(KelError::CommitmentMismatch { .. })
        ));
        assert_eq!(kel, before);
    }

    #[test]
    fn test_stale_draft_is_a_sequence_gap() {
        let mut kel = new_kel();
        let stale = kel.interact(Blake3Hash::hash(b"first"));
        append_interaction(&mut kel, b"second", &k(1));

        let sig = k(1).sign(&stale.canonical_bytes());
        assert!(matches!(
            kel.confirm(stale, sig),
            Err(KelError::SequenceGap { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_state_at_history() {
        let mut kel = new_kel();
        append_interaction(&mut kel, b"a", &k(1));
        let rot = kel.rotate(k(2).public_key(), KeyCommitment::of(&k(3).public_key()));
        let sig = k(1).sign(&rot.canonical_bytes());
        kel.confirm(rot, sig).unwrap();

        assert_eq!(kel.state_at(1).unwrap().signing_key, k(1).public_key());
        assert_eq!(kel.state_at(2).unwrap(), kel.current_state());
        assert!(kel.state_at(3).is_none());
    }

    #[test]
    fn test_replay_accepts_valid_and_rejects_tampered() {
        let mut kel = new_kel();
        append_interaction(&mut kel, b"a", &k(1));
        append_interaction(&mut kel, b"b", &k(1));

        let replayed = Kel::replay(kel.events().to_vec()).unwrap();
        assert_eq!(replayed, kel);

        let mut tampered = kel.events().to_vec();
        tampered[1].event.payload = crate::event::EventPayload::Interaction {
            anchor: Blake3Hash::hash(b"forged"),
        };
        assert!(Kel::replay(tampered).is_err());

        assert!(matches!(Kel::replay(Vec::new()), Err(KelError::EmptyLog)));
    }

    #[test]
    fn test_contains_seal() {
        let mut kel = new_kel();
        append_interaction(&mut kel, b"a", &k(1));
        let seal = kel.events()[1].seal(kel.prefix());
        assert!(kel.contains_seal(&seal));

        let wrong = EventSeal::new(kel.prefix(), 1, Blake3Hash::ZERO);
        assert!(!kel.contains_seal(&wrong));
    }
}
