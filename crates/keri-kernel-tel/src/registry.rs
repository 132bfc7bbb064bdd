//! The issuer-side TEL engine: one log per credential digest.
//!
//! Mirrors the replay-into-state approach used for key events, but the
//! registry only ever appends its own events, so checks happen up front.

use std::collections::HashMap;

use keri_kernel_core::{Blake3Hash, EventSeal, Keypair};

use crate::error::{Result, TelError};
use crate::event::SignedTelEvent;
use crate::log::{TelLog, TelStatus};

/// All TEL logs owned by one issuer.
#[derive(Debug, Clone, Default)]
pub struct TelRegistry {
    logs: HashMap<Blake3Hash, TelLog>,
}

impl TelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `record_issuance(credential, ..)` would succeed.
    pub fn check_issuance(&self, credential: &Blake3Hash) -> Result<()> {
        if self.logs.contains_key(credential) {
            return Err(TelError::DuplicateIssuance(*credential));
        }
        Ok(())
    }

    /// Whether `record_revocation(credential, ..)` would succeed.
    pub fn check_revocation(&self, credential: &Blake3Hash) -> Result<()> {
        match self.status_of(credential) {
            TelStatus::Unknown => Err(TelError::UnknownCredential(*credential)),
            TelStatus::Issued => Ok(()),
            TelStatus::Revoked => Err(TelError::AlreadyRevoked(*credential)),
        }
    }

    /// Record the first event for `credential`.
    pub fn record_issuance(
        &mut self,
        credential: Blake3Hash,
        seal: EventSeal,
        keypair: &Keypair,
    ) -> Result<SignedTelEvent> {
        self.check_issuance(&credential)?;
        let log = TelLog::issue(credential, seal, keypair);
        let event = log.events()[0].clone();
        self.logs.insert(credential, log);
        tracing::debug!(credential = %credential, "recorded issuance");
        Ok(event)
    }

    /// Record the terminal revocation for `credential`.
    pub fn record_revocation(
        &mut self,
        credential: Blake3Hash,
        seal: EventSeal,
        keypair: &Keypair,
    ) -> Result<SignedTelEvent> {
        let log = self
            .logs
            .get_mut(&credential)
            .ok_or(TelError::UnknownCredential(credential))?;
        let event = log.revoke(seal, keypair)?.clone();
        tracing::debug!(credential = %credential, "recorded revocation");
        Ok(event)
    }

    pub fn status_of(&self, credential: &Blake3Hash) -> TelStatus {
        self.logs
            .get(credential)
            .map_or(TelStatus::Unknown, TelLog::status)
    }

    pub fn log(&self, credential: &Blake3Hash) -> Option<&TelLog> {
        self.logs.get(credential)
    }

    /// Seal of the KEL event that anchored the issuance.
    pub fn issuance_seal(&self, credential: &Blake3Hash) -> Option<EventSeal> {
        self.logs
            .get(credential)
            .and_then(TelLog::issuance)
            .map(|e| e.event.seal)
    }

    /// Digests of every credential with a log.
    pub fn credentials(&self) -> impl Iterator<Item = &Blake3Hash> {
        self.logs.keys()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}
