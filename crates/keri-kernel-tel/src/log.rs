//! A single credential's transaction event log.
//!
//! Lifecycle: empty -> Issued -> Revoked. Events are hash-linked the same way
//! key events are.

use serde::{Deserialize, Serialize};

use keri_kernel_core::{Blake3Hash, EventSeal, Keypair};

use crate::error::{Result, TelError};
use crate::event::{SignedTelEvent, TelEvent, TelEventKind, TEL_VERSION};

/// Credential status as recorded in a TEL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelStatus {
    /// No issuance recorded.
    Unknown,
    Issued,
    Revoked,
}

/// Ordered TEL events for one credential digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelLog {
    credential: Blake3Hash,
    events: Vec<SignedTelEvent>,
}

impl TelLog {
    /// Start a log with a signed issuance.
    pub(crate) fn issue(credential: Blake3Hash, seal: EventSeal, keypair: &Keypair) -> Self {
        let signed = TelEvent::issued(credential, seal).sign(keypair);
        Self {
            credential,
            events: vec![signed],
        }
    }

    /// Append a signed revocation.
    pub(crate) fn revoke(&mut self, seal: EventSeal, keypair: &Keypair) -> Result<&SignedTelEvent> {
        self.check_revocable()?;
        let prior = self.head_digest()?;
        let event = TelEvent::revoked(self.credential, self.events.len() as u64, prior, seal);
        self.events.push(event.sign(keypair));
        Ok(&self.events[self.events.len() - 1])
    }

    /// Rebuild a log received from elsewhere, checking order and linkage.
    ///
    /// Signatures and seals are checked separately against the issuer's KEL
    /// (see [`crate::anchor::verify_anchoring`]).
    pub fn replay(
        credential: Blake3Hash,
        events: impl IntoIterator<Item = SignedTelEvent>,
    ) -> Result<Self> {
        let mut log = Self {
            credential,
            events: Vec::new(),
        };
        for signed in events {
            log.validate_next(&signed.event)?;
            log.events.push(signed);
        }
        if log.events.is_empty() {
            return Err(TelError::InvalidLog("empty log".into()));
        }
        Ok(log)
    }

    fn validate_next(&self, event: &TelEvent) -> Result<()> {
        if event.version != TEL_VERSION {
            return Err(TelError::InvalidLog(format!(
                "unsupported version {}",
                event.version
            )));
        }
        if event.credential != self.credential {
            return Err(TelError::InvalidLog("event for another credential".into()));
        }
        let expected_seq = self.events.len() as u64;
        if event.seq != expected_seq {
            return Err(TelError::InvalidLog(format!(
                "expected seq {expected_seq}, got {}",
                event.seq
            )));
        }
        let expected_prior = self.events.last().map(SignedTelEvent::digest);
        if event.prior != expected_prior {
            return Err(TelError::InvalidLog("prior digest mismatch".into()));
        }
        match (self.status(), event.kind) {
            (TelStatus::Unknown, TelEventKind::Issued) => Ok(()),
            (TelStatus::Issued, TelEventKind::Revoked) => Ok(()),
            (status, kind) => Err(TelError::InvalidLog(format!(
                "{kind:?} not allowed in status {status:?}"
            ))),
        }
    }

    fn check_revocable(&self) -> Result<()> {
        match self.status() {
            TelStatus::Unknown => Err(TelError::UnknownCredential(self.credential)),
            TelStatus::Issued => Ok(()),
            TelStatus::Revoked => Err(TelError::AlreadyRevoked(self.credential)),
        }
    }

    fn head_digest(&self) -> Result<Blake3Hash> {
        self.events
            .last()
            .map(SignedTelEvent::digest)
            .ok_or(TelError::UnknownCredential(self.credential))
    }

    pub fn credential(&self) -> &Blake3Hash {
        &self.credential
    }

    pub fn status(&self) -> TelStatus {
        match self.events.last().map(SignedTelEvent::kind) {
            None => TelStatus::Unknown,
            Some(TelEventKind::Issued) => TelStatus::Issued,
            Some(TelEventKind::Revoked) => TelStatus::Revoked,
        }
    }

    pub fn issuance(&self) -> Option<&SignedTelEvent> {
        self.events
            .first()
            .filter(|e| e.kind() == TelEventKind::Issued)
    }

    pub fn revocation(&self) -> Option<&SignedTelEvent> {
        self.events
            .iter()
            .find(|e| e.kind() == TelEventKind::Revoked)
    }

    pub fn events(&self) -> &[SignedTelEvent] {
        &self.events
    }
}
