//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use keri_kernel_core::{Blake3Hash, Ed25519PublicKey, Kel, KeyRing, Keypair, Prefix};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Blake3Hash.
pub fn blake3_hash() -> impl Strategy<Value = Blake3Hash> {
    any::<[u8; 32]>().prop_map(Blake3Hash)
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// A prefix that need not belong to any real inception.
pub fn prefix() -> impl Strategy<Value = Prefix> {
    blake3_hash().prop_map(Prefix::from_digest)
}

/// Generate a credential schema name.
pub fn schema() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Arbitrary JSON payloads, nested up to a few levels.
pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<u64>().prop_map(|n| json!(n)),
        // Quarters survive a text round trip exactly.
        (-1_000_000i32..1_000_000).prop_map(|n| json!(f64::from(n) / 4.0)),
        "[ -~]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// One step applied to a KEL after inception.
#[derive(Debug, Clone)]
pub enum KelOp {
    Interact(Blake3Hash),
    /// Rotate to the committed key, committing to a key from this seed.
    Rotate([u8; 32]),
}

/// Parameters for generating a KEL.
#[derive(Debug, Clone)]
pub struct KelParams {
    pub current_seed: [u8; 32],
    pub next_seed: [u8; 32],
    pub ops: Vec<KelOp>,
}

impl Arbitrary for KelParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let op = prop_oneof![
            3 => blake3_hash().prop_map(KelOp::Interact),
            1 => any::<[u8; 32]>().prop_map(KelOp::Rotate),
        ];
        (
            any::<[u8; 32]>(),
            any::<[u8; 32]>(),
            prop::collection::vec(op, 0..12),
        )
            .prop_map(|(current_seed, next_seed, ops)| KelParams {
                current_seed,
                next_seed,
                ops,
            })
            .boxed()
    }
}

/// Build the KEL described by `params`, returning the final key ring with it.
pub fn kel_from_params(params: &KelParams) -> (KeyRing, Kel) {
    let mut keys = KeyRing::new(
        Keypair::from_seed(&params.current_seed),
        Keypair::from_seed(&params.next_seed),
    );
    let inception = keys.inception_event();
    let mut kel =
        Kel::incept(inception.event, inception.signature).expect("generated inception is valid");

    for op in &params.ops {
        match op {
            KelOp::Interact(anchor) => {
                let event = kel.interact(*anchor);
                let signature = keys.current().sign(&event.canonical_bytes());
                kel.confirm(event, signature)
                    .expect("generated interaction is valid");
            }
            KelOp::Rotate(seed) => {
                let pending = keys.stage_rotation(&kel, Keypair::from_seed(seed));
                keys.apply(&mut kel, pending)
                    .expect("generated rotation is valid");
            }
        }
    }
    (keys, kel)
}
