//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Floats (JSON payloads only) are always encoded as 64-bit
//!
//! Event digests, prefixes and signatures are all computed over these bytes,
//! so the same event must encode identically everywhere.

use ciborium::value::Value;

use crate::crypto::{Blake3Hash, Ed25519PublicKey};
use crate::error::CoreError;
use crate::event::{EventKind, EventPayload, KeyEvent};
use crate::rotation::KeyCommitment;
use crate::types::Prefix;

/// Key event field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VERSION: u64 = 0;
    pub const KIND: u64 = 1;
    pub const PREFIX: u64 = 2;
    pub const SEQ: u64 = 3;
    pub const PRIOR: u64 = 4;
    pub const SIGNING_KEY: u64 = 5;
    pub const NEXT_COMMITMENT: u64 = 6;
    pub const ANCHOR: u64 = 7;
}

/// A value in an integer-keyed canonical map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Uint(u64),
    Bytes(&'a [u8]),
    Null,
}

impl<'a> Field<'a> {
    /// Bytes, or null when absent.
    pub fn opt_bytes(bytes: Option<&'a [u8]>) -> Self {
        bytes.map_or(Field::Null, Field::Bytes)
    }
}

/// Encode an integer-keyed map canonically.
///
/// For unsigned keys, encoded byte order equals numeric order, so sorting by
/// key is sufficient.
pub fn int_map_bytes(entries: &[(u64, Field<'_>)]) -> Vec<u8> {
    let mut sorted: Vec<&(u64, Field<'_>)> = entries.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let mut buf = Vec::with_capacity(16 + entries.len() * 34);
    encode_uint(&mut buf, 5, sorted.len() as u64);
    for (key, field) in sorted {
        encode_uint(&mut buf, 0, *key);
        match field {
            Field::Uint(n) => encode_uint(&mut buf, 0, *n),
            Field::Bytes(b) => encode_bytes(&mut buf, b),
            Field::Null => buf.push(0xf6),
        }
    }
    buf
}

/// Encode a key event to canonical CBOR bytes (signature excluded).
pub fn canonical_event_bytes(event: &KeyEvent) -> Vec<u8> {
    let prefix = event.prefix.as_ref().map(|p| &p.digest().0[..]);
    let prior = event.prior.as_ref().map(|d| &d.0[..]);

    let mut entries = vec![
        (keys::VERSION, Field::Uint(event.version.into())),
        (keys::KIND, Field::Uint(event.kind().to_u8().into())),
        (keys::PREFIX, Field::opt_bytes(prefix)),
        (keys::SEQ, Field::Uint(event.seq)),
        (keys::PRIOR, Field::opt_bytes(prior)),
    ];

    match &event.payload {
        EventPayload::Inception {
            signing_key,
            next_commitment,
        }
        | EventPayload::Rotation {
            signing_key,
            next_commitment,
        } => {
            entries.push((keys::SIGNING_KEY, Field::Bytes(&signing_key.0)));
            entries.push((keys::NEXT_COMMITMENT, Field::Bytes(&next_commitment.0 .0)));
        }
        EventPayload::Interaction { anchor } => {
            entries.push((keys::ANCHOR, Field::Bytes(&anchor.0)));
        }
    }

    int_map_bytes(&entries)
}

/// Encode a JSON value to canonical CBOR bytes.
///
/// Objects become text-keyed maps sorted by encoded key bytes.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_json_to(&mut buf, value);
    buf
}

fn encode_json_to(buf: &mut Vec<u8>, value: &serde_json::Value) {
    match value {
        serde_json::Value::Null => buf.push(0xf6),
        serde_json::Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                encode_uint(buf, 0, u);
            } else if let Some(i) = n.as_i64() {
                // CBOR encodes -1 as 0, -2 as 1, etc.
                encode_uint(buf, 1, (-1 - i) as u64);
            } else {
                encode_float(buf, n.as_f64().unwrap_or(f64::NAN));
            }
        }
        serde_json::Value::String(s) => encode_text(buf, s),
        serde_json::Value::Array(items) => {
            encode_uint(buf, 4, items.len() as u64);
            for item in items {
                encode_json_to(buf, item);
            }
        }
        serde_json::Value::Object(map) => {
            let entries: Vec<(Vec<u8>, &serde_json::Value)> = map
                .iter()
                .map(|(k, v)| {
                    let mut key_buf = Vec::with_capacity(k.len() + 1);
                    encode_text(&mut key_buf, k);
                    (key_buf, v)
                })
                .collect();
            encode_map_canonical(buf, entries, encode_json_to);
        }
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a double-precision float (major type 7, additional info 27).
fn encode_float(buf: &mut Vec<u8>, f: f64) {
    buf.push(0xfb);
    buf.extend_from_slice(&f.to_bits().to_be_bytes());
}

/// Encode a map canonically (major type 5) from pre-encoded keys.
fn encode_map_canonical<V>(
    buf: &mut Vec<u8>,
    mut entries: Vec<(Vec<u8>, V)>,
    mut encode_value: impl FnMut(&mut Vec<u8>, V),
) {
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, entries.len() as u64);
    for (key_bytes, value) in entries {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, value);
    }
}

/// Decode a key event from canonical bytes.
pub fn decode_event(bytes: &[u8]) -> Result<KeyEvent, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedEvent("expected map".into())),
    };

    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == i128::from(key)))
            .map(|(_, v)| v)
    };

    let version = u8::try_from(uint_field(get(keys::VERSION), "version")?)
        .map_err(|_| CoreError::MalformedEvent("version out of range".into()))?;

    let kind_code = u8::try_from(uint_field(get(keys::KIND), "kind")?)
        .map_err(|_| CoreError::MalformedEvent("kind out of range".into()))?;
    let kind = EventKind::from_u8(kind_code)
        .ok_or_else(|| CoreError::MalformedEvent(format!("invalid kind: {kind_code}")))?;

    let prefix = opt_digest_field(get(keys::PREFIX), "prefix")?.map(Prefix::from_digest);
    let seq = uint_field(get(keys::SEQ), "seq")?;
    let prior = opt_digest_field(get(keys::PRIOR), "prior")?;

    let payload = match kind {
        EventKind::Inception | EventKind::Rotation => {
            let signing_key =
                Ed25519PublicKey(bytes32_field(get(keys::SIGNING_KEY), "signing_key")?);
            let next_commitment = KeyCommitment(Blake3Hash(bytes32_field(
                get(keys::NEXT_COMMITMENT),
                "next_commitment",
            )?));
            if kind == EventKind::Inception {
                EventPayload::Inception {
                    signing_key,
                    next_commitment,
                }
            } else {
                EventPayload::Rotation {
                    signing_key,
                    next_commitment,
                }
            }
        }
        EventKind::Interaction => EventPayload::Interaction {
            anchor: Blake3Hash(bytes32_field(get(keys::ANCHOR), "anchor")?),
        },
    };

    Ok(KeyEvent {
        version,
        prefix,
        seq,
        prior,
        payload,
    })
}

fn uint_field(value: Option<&Value>, name: &str) -> Result<u64, CoreError> {
    match value {
        Some(Value::Integer(i)) => u64::try_from(i128::from(*i))
            .map_err(|_| CoreError::MalformedEvent(format!("{name} out of range"))),
        _ => Err(CoreError::MalformedEvent(format!("missing {name}"))),
    }
}

fn bytes32_field(value: Option<&Value>, name: &str) -> Result<[u8; 32], CoreError> {
    match value {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            Ok(arr)
        }
        _ => Err(CoreError::MalformedEvent(format!("invalid {name}"))),
    }
}

fn opt_digest_field(value: Option<&Value>, name: &str) -> Result<Option<Blake3Hash>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        other => bytes32_field(other, name).map(|b| Some(Blake3Hash(b))),
    }
}
