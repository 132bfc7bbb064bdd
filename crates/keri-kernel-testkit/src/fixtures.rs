//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an issuer with deterministic
//! keys and the raw logs, without the locking of an `Entity`.

use serde_json::Value;

use keri_kernel::{AttestationDatum, Entity, EntityConfig, SignedAttestationDatum};
use keri_kernel_core::{Blake3Hash, EventSeal, Kel, KeyRing, KeyState, Keypair, Prefix};
use keri_kernel_tel::TelRegistry;

/// An incepted identifier with its keys and logs.
pub struct TestFixture {
    pub keys: KeyRing,
    pub kel: Kel,
    pub tel: TelRegistry,
    /// Seed byte for the next key this fixture will commit to.
    next_seed: u8,
}

impl TestFixture {
    /// Create a new test fixture with random keys.
    pub fn new() -> Self {
        Self::from_keys(KeyRing::generate(), 0)
    }

    /// Deterministic keys: current from `[seed; 32]`, next from `[seed + 1; 32]`.
    pub fn with_seed(seed: u8) -> Self {
        let keys = KeyRing::new(
            Keypair::from_seed(&[seed; 32]),
            Keypair::from_seed(&[seed.wrapping_add(1); 32]),
        );
        Self::from_keys(keys, seed.wrapping_add(2))
    }

    fn from_keys(keys: KeyRing, next_seed: u8) -> Self {
        let inception = keys.inception_event();
        let kel = Kel::incept(inception.event, inception.signature)
            .expect("fixture inception is valid");
        Self {
            keys,
            kel,
            tel: TelRegistry::new(),
            next_seed,
        }
    }

    pub fn prefix(&self) -> Prefix {
        self.kel.prefix()
    }

    pub fn state(&self) -> KeyState {
        self.kel.current_state()
    }

    /// Anchor `anchor` and return the seal of the new interaction.
    pub fn interact(&mut self, anchor: Blake3Hash) -> EventSeal {
        let event = self.kel.interact(anchor);
        let signature = self.keys.current().sign(&event.canonical_bytes());
        let prefix = self.prefix();
        self.kel
            .confirm(event, signature)
            .expect("fixture interaction is valid")
            .seal(prefix)
    }

    /// Rotate to the committed key, committing to the next seeded one.
    pub fn rotate(&mut self) -> KeyState {
        let new_next = if self.next_seed == 0 {
            Keypair::generate()
        } else {
            let k = Keypair::from_seed(&[self.next_seed; 32]);
            self.next_seed = self.next_seed.wrapping_add(1);
            k
        };
        let pending = self.keys.stage_rotation(&self.kel, new_next);
        self.keys
            .apply(&mut self.kel, pending)
            .expect("fixture rotation is valid")
            .clone()
    }

    /// Issue a credential the same way an entity does.
    pub fn issue(&mut self, schema: &str, payload: Value) -> SignedAttestationDatum {
        let signed = AttestationDatum::new(self.prefix(), schema, payload).sign(self.keys.current());
        let d = signed.digest();
        let seal = self.interact(d);
        self.tel
            .record_issuance(d, seal, self.keys.current())
            .expect("fixture issuance is new");
        signed
    }

    /// Revoke a credential, anchoring the revocation.
    pub fn revoke(&mut self, signed: &SignedAttestationDatum) {
        let d = signed.digest();
        let seal = self.interact(d);
        self.tel
            .record_revocation(d, seal, self.keys.current())
            .expect("fixture revocation follows issuance");
    }

    /// An entity with the same keys, starting from inception.
    pub fn entity(&self) -> Entity {
        Entity::incept(self.keys.clone(), EntityConfig::default())
            .expect("fixture inception is valid")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_seed((i as u8).wrapping_mul(16).wrapping_add(1)))
        .collect()
}
