//! Key event validation: chain linkage, pre-rotation and signatures.
//!
//! Validation is a pure function from (state, event, signature) to the next
//! state. Nothing is appended here; the KEL engine commits the returned state
//! only when validation succeeds.

use crate::crypto::Ed25519Signature;
use crate::error::KelError;
use crate::event::{EventPayload, KeyEvent, EVENT_VERSION};
use crate::prefix::derive_prefix;
use crate::rotation::verify_commitment;
use crate::state::KeyState;

/// Validate an inception event and its self-signature.
pub fn validate_inception(
    event: &KeyEvent,
    signature: &Ed25519Signature,
) -> Result<KeyState, KelError> {
    let prefix = derive_prefix(event)?;

    let key = event
        .signing_key()
        .ok_or_else(|| KelError::MalformedEvent("inception without signing key".into()))?;
    key.verify(&event.canonical_bytes(), signature)
        .map_err(|_| KelError::SignatureInvalid)?;

    KeyState::from_inception(prefix, event)
        .ok_or_else(|| KelError::MalformedEvent("expected inception".into()))
}

/// Validate a rotation or interaction against the current state.
///
/// Checks run in this order:
/// 1. Version and kind (inception is never valid here)
/// 2. Prefix
/// 3. `seq == state.seq + 1`
/// 4. `prior == state.last_digest`
/// 5. Rotation only: revealed key matches the stored commitment
/// 6. Signature against the *current* signing key
pub fn validate_event(
    state: &KeyState,
    event: &KeyEvent,
    signature: &Ed25519Signature,
) -> Result<KeyState, KelError> {
    // 1. Version and kind
    if event.version != EVENT_VERSION {
        return Err(KelError::UnsupportedVersion(event.version));
    }
    if matches!(event.payload, EventPayload::Inception { .. }) {
        return Err(KelError::MalformedEvent(
            "inception is only valid as the first event".into(),
        ));
    }

    // 2. Prefix
    if event.prefix != Some(state.prefix) {
        return Err(KelError::PrefixMismatch {
            expected: state.prefix,
            got: event.prefix,
        });
    }

    // 3. Sequence
    let expected = state.seq + 1;
    if event.seq != expected {
        return Err(KelError::SequenceGap {
            expected,
            got: event.seq,
        });
    }

    // 4. Chain linkage
    if event.prior != Some(state.last_digest) {
        return Err(KelError::PriorDigestMismatch {
            expected: state.last_digest,
            got: event.prior,
        });
    }

    // 5. Pre-rotation
    if let EventPayload::Rotation { signing_key, .. } = &event.payload {
        if !signing_key.is_valid() {
            return Err(KelError::MalformedEvent(
                "rotation is missing usable key material".into(),
            ));
        }
        verify_commitment(signing_key, &state.next_commitment)?;
    }

    // 6. Signature
    state
        .signing_key
        .verify(&event.canonical_bytes(), signature)
        .map_err(|_| KelError::SignatureInvalid)?;

    Ok(state.apply(event))
}
