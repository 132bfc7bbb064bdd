//! Self-certifying prefix derivation.

use crate::event::{EventKind, KeyEvent, EVENT_VERSION};
use crate::error::KelError;
use crate::types::Prefix;

/// Derive the identifier prefix of an inception event.
///
/// The prefix is the digest of the canonical inception bytes, so it binds
/// the initial key and the first next-key commitment. Pure and deterministic.
pub fn derive_prefix(event: &KeyEvent) -> Result<Prefix, KelError> {
    if event.version != EVENT_VERSION {
        return Err(KelError::UnsupportedVersion(event.version));
    }
    if event.kind() != EventKind::Inception {
        return Err(KelError::MalformedEvent(format!(
            "cannot derive a prefix from a {} event",
            event.kind().as_str()
        )));
    }
    if event.seq != 0 || event.prior.is_some() || event.prefix.is_some() {
        return Err(KelError::MalformedEvent(
            "inception must have seq 0 and no prior or prefix".into(),
        ));
    }
    match event.signing_key() {
        Some(key) if key.is_valid() => {}
        _ => {
            return Err(KelError::MalformedEvent(
                "inception is missing usable key material".into(),
            ))
        }
    }

    Ok(Prefix::from_digest(event.digest()))
}
