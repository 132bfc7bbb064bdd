//! An entity: one identifier with its keys, KEL and TEL registry.
//!
//! All mutations take the write lock for their whole duration and either
//! complete or leave everything as it was. Reads clone a snapshot.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use keri_kernel_core::{
    Blake3Hash, Ed25519Signature, EventEnvelope, Kel, KeyRing, KeyState, Keypair,
    PendingRotation, Prefix, SignedKeyEvent,
};
use keri_kernel_resolve::{ErrorCode, RemoteResolver, ResolveRequest, ResolveResponse, Responder};
use keri_kernel_tel::{SignedTelEvent, TelRegistry, TelStatus};

use crate::config::EntityConfig;
use crate::credential::{
    verify_credential, verify_remote, AttestationDatum, SignedAttestationDatum, Verification,
};
use crate::did::{self, DidDocument};
use crate::error::{KernelError, Result};

struct EntityState {
    kel: Kel,
    tel: TelRegistry,
    keys: KeyRing,
}

pub struct Entity {
    prefix: Prefix,
    state: RwLock<EntityState>,
    config: EntityConfig,
    resolver: Option<Arc<RemoteResolver>>,
}

impl Entity {
    /// Incept a new identifier controlled by `keys`.
    pub fn incept(keys: KeyRing, config: EntityConfig) -> Result<Self> {
        let inception = keys.inception_event();
        let kel = Kel::incept(inception.event, inception.signature)?;
        let prefix = kel.prefix();
        tracing::info!(prefix = %prefix, "incepted identifier");

        Ok(Self {
            prefix,
            state: RwLock::new(EntityState {
                kel,
                tel: TelRegistry::new(),
                keys,
            }),
            config,
            resolver: None,
        })
    }

    /// Incept with freshly generated keys.
    pub fn new(config: EntityConfig) -> Result<Self> {
        Self::incept(KeyRing::generate(), config)
    }

    /// Use `resolver` for credentials issued by other identifiers.
    pub fn with_resolver(mut self, resolver: Arc<RemoteResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key State
    // ─────────────────────────────────────────────────────────────────────────

    pub fn current_state(&self) -> Result<KeyState> {
        Ok(self.state.read()?.kel.current_state())
    }

    pub fn did_document(&self) -> Result<DidDocument> {
        let state = self.current_state()?;
        Ok(did::resolve_with_services(
            &state,
            &self.config.service_endpoints,
        ))
    }

    /// The signed inception event.
    pub fn inception_event(&self) -> Result<SignedKeyEvent> {
        let state = self.state.read()?;
        state
            .kel
            .event_at(0)
            .cloned()
            .ok_or(KernelError::UnknownIdentifier(self.prefix))
    }

    pub fn kel_events(&self) -> Result<Vec<SignedKeyEvent>> {
        Ok(self.state.read()?.kel.events().to_vec())
    }

    /// The KEL followed by every TEL event, as JSON envelopes.
    pub fn envelopes(&self) -> Result<Vec<EventEnvelope>> {
        let state = self.state.read()?;
        let mut envelopes: Vec<EventEnvelope> =
            state.kel.events().iter().map(EventEnvelope::from).collect();
        let mut credentials: Vec<&Blake3Hash> = state.tel.credentials().collect();
        credentials.sort();
        for d in credentials {
            if let Some(log) = state.tel.log(d) {
                envelopes.extend(log.events().iter().map(EventEnvelope::from));
            }
        }
        Ok(envelopes)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rotation
    // ─────────────────────────────────────────────────────────────────────────

    /// Rotate to the committed next key, committing to a fresh one.
    pub fn rotate(&self) -> Result<KeyState> {
        self.rotate_to(Keypair::generate())
    }

    /// Rotate to the committed next key, committing to `new_next`.
    pub fn rotate_to(&self, new_next: Keypair) -> Result<KeyState> {
        let mut guard = self.state.write()?;
        let EntityState { kel, keys, .. } = &mut *guard;
        let pending = keys.stage_rotation(kel, new_next);
        let state = keys.apply(kel, pending)?.clone();
        tracing::info!(prefix = %self.prefix, seq = state.seq, "rotated keys");
        Ok(state)
    }

    /// Rotate revealing `revealed` instead of the committed key.
    ///
    /// Fails with `CommitmentMismatch` unless `revealed` is the committed key.
    pub fn rotate_with(&self, revealed: Keypair, new_next: Keypair) -> Result<KeyState> {
        let mut guard = self.state.write()?;
        let EntityState { kel, keys, .. } = &mut *guard;
        let pending = keys.stage_rotation_with(kel, revealed, new_next);
        let state = keys.apply(kel, pending)?.clone();
        tracing::info!(prefix = %self.prefix, seq = state.seq, "rotated keys");
        Ok(state)
    }

    /// Stage a rotation without changing anything.
    pub fn begin_rotation(&self, new_next: Keypair) -> Result<PendingRotation> {
        let state = self.state.read()?;
        Ok(state.keys.stage_rotation(&state.kel, new_next))
    }

    /// Apply a staged rotation. Fails with `SequenceGap` if the log moved on
    /// since it was staged.
    pub fn confirm_rotation(&self, pending: PendingRotation) -> Result<KeyState> {
        let mut guard = self.state.write()?;
        let EntityState { kel, keys, .. } = &mut *guard;
        let state = keys.apply(kel, pending)?.clone();
        tracing::info!(prefix = %self.prefix, seq = state.seq, "rotated keys");
        Ok(state)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Interaction & Signing
    // ─────────────────────────────────────────────────────────────────────────

    /// Anchor `anchor` in a new interaction event.
    pub fn interact(&self, anchor: Blake3Hash) -> Result<SignedKeyEvent> {
        let mut guard = self.state.write()?;
        let EntityState { kel, keys, .. } = &mut *guard;
        let event = kel.interact(anchor);
        let signature = keys.current().sign(&event.canonical_bytes());
        Ok(kel.confirm(event, signature)?.clone())
    }

    /// Sign `message` with the current key.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature> {
        Ok(self.state.read()?.keys.current().sign(message))
    }

    /// Check `signature` over `message` against the current key.
    pub fn verify_message(&self, message: &[u8], signature: &Ed25519Signature) -> Result<bool> {
        let state = self.state.read()?;
        Ok(state
            .kel
            .current_state_ref()
            .signing_key
            .verify(message, signature)
            .is_ok())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credentials
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a credential: sign it, anchor its digest and record the issuance.
    pub fn issue(&self, schema: &str, payload: Value) -> Result<SignedAttestationDatum> {
        let mut guard = self.state.write()?;
        let EntityState { kel, tel, keys } = &mut *guard;

        let signed = AttestationDatum::new(self.prefix, schema, payload).sign(keys.current());
        let d = signed.digest();
        tel.check_issuance(&d)?;

        let event = kel.interact(d);
        let signature = keys.current().sign(&event.canonical_bytes());
        let seal = kel.confirm(event, signature)?.seal(self.prefix);
        tel.record_issuance(d, seal, keys.current())?;

        tracing::debug!(prefix = %self.prefix, credential = %d, "issued credential");
        Ok(signed)
    }

    /// Revoke a credential this entity issued.
    pub fn revoke(&self, signed: &SignedAttestationDatum) -> Result<SignedTelEvent> {
        let mut guard = self.state.write()?;
        let EntityState { kel, tel, keys } = &mut *guard;

        let d = signed.digest();
        tel.check_revocation(&d)?;

        let seal = if self.config.anchor_revocations {
            let event = kel.interact(d);
            let signature = keys.current().sign(&event.canonical_bytes());
            kel.confirm(event, signature)?.seal(self.prefix)
        } else {
            kel.current_state_ref().seal()
        };
        let event = tel.record_revocation(d, seal, keys.current())?;

        tracing::debug!(prefix = %self.prefix, credential = %d, "revoked credential");
        Ok(event)
    }

    pub fn status_of(&self, credential: &Blake3Hash) -> Result<TelStatus> {
        Ok(self.state.read()?.tel.status_of(credential))
    }

    pub fn tel_events(&self, credential: &Blake3Hash) -> Result<Vec<SignedTelEvent>> {
        let state = self.state.read()?;
        Ok(state
            .tel
            .log(credential)
            .map(|log| log.events().to_vec())
            .unwrap_or_default())
    }

    /// Verify a credential issued by this entity against its own logs.
    pub fn verify_local(&self, signed: &SignedAttestationDatum) -> Result<Verification> {
        let state = self.state.read()?;
        let log = state.tel.log(&signed.digest());
        Ok(verify_credential(&self.prefix, &state.kel, log, signed))
    }

    /// Verify a credential from `issuer`, resolving remote issuers.
    pub async fn verify(&self, issuer: &Prefix, signed: &SignedAttestationDatum) -> Verification {
        if *issuer == self.prefix {
            return self
                .verify_local(signed)
                .unwrap_or_else(|e| Verification::ResolutionError(e.to_string()));
        }
        match &self.resolver {
            Some(resolver) => verify_remote(resolver, issuer, signed).await,
            None => Verification::ResolutionError(format!("no resolver for {issuer}")),
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("prefix", &self.prefix)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Responder for Entity {
    async fn respond(&self, request: ResolveRequest) -> ResolveResponse {
        if *request.prefix() != self.prefix {
            return ResolveResponse::error(
                ErrorCode::UnknownIdentifier,
                format!("{} is not controlled here", request.prefix()),
            );
        }
        let result = match request {
            ResolveRequest::Kel { .. } => self
                .kel_events()
                .map(|events| ResolveResponse::Kel { events }),
            ResolveRequest::Tel { credential, .. } => self
                .tel_events(&credential)
                .map(|events| ResolveResponse::Tel { events }),
        };
        result.unwrap_or_else(|e| ResolveResponse::error(ErrorCode::Internal, e.to_string()))
    }
}
