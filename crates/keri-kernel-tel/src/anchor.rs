//! Cross-checks between a TEL and the issuer's KEL.

use keri_kernel_core::Kel;

use crate::error::{Result, TelError};
use crate::event::TelEventKind;
use crate::log::TelLog;

/// Verify every event of `log` against the issuer's `kel`.
///
/// Each event's seal must name an event in `kel`; an issuance must be sealed
/// to an interaction that anchors the credential digest; each signature must
/// verify under the key state at the sealed sequence number. Seals never move
/// backwards.
pub fn verify_anchoring(log: &TelLog, kel: &Kel) -> Result<()> {
    let mut last_seal_seq = 0u64;
    for signed in log.events() {
        let event = &signed.event;
        let seq = event.seq;

        if !kel.contains_seal(&event.seal) || event.seal.seq < last_seal_seq {
            return Err(TelError::Unanchored { seq });
        }
        last_seal_seq = event.seal.seq;

        if event.kind == TelEventKind::Issued {
            let anchors_credential = kel
                .event_at(event.seal.seq)
                .and_then(|e| e.event.anchor())
                .is_some_and(|a| a == log.credential());
            if !anchors_credential {
                return Err(TelError::Unanchored { seq });
            }
        }

        let state = kel
            .state_at(event.seal.seq)
            .ok_or(TelError::Unanchored { seq })?;
        signed
            .verify_with(&state.signing_key)
            .map_err(|_| TelError::SignatureInvalid { seq })?;
    }
    Ok(())
}
