//! JSON event envelope for exchanging KEL and TEL events.
//!
//! Shape: `{type, seq, prior, payload, signature}`. Digests use their text
//! form and the signature is unpadded base64url.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::crypto::{Blake3Hash, Ed25519Signature};
use crate::event::{EventPayload, SignedKeyEvent};

/// Every event type that can travel in an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeType {
    Inception,
    Rotation,
    Interaction,
    Issued,
    Revoked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeType,
    pub seq: u64,
    pub prior: Option<String>,
    pub payload: serde_json::Value,
    pub signature: Ed25519Signature,
}

impl EventEnvelope {
    pub fn new(
        kind: EnvelopeType,
        seq: u64,
        prior: Option<&Blake3Hash>,
        payload: serde_json::Value,
        signature: Ed25519Signature,
    ) -> Self {
        Self {
            kind,
            seq,
            prior: prior.map(Blake3Hash::to_text),
            payload,
            signature,
        }
    }

    /// Pretty JSON with keys in a stable order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_value(self).and_then(|v| serde_json::to_string_pretty(&v))
    }
}

impl From<&SignedKeyEvent> for EventEnvelope {
    fn from(signed: &SignedKeyEvent) -> Self {
        let event = &signed.event;
        let prefix = event.prefix.map(|p| p.to_text());
        let (kind, payload) = match &event.payload {
            EventPayload::Inception {
                signing_key,
                next_commitment,
            } => (
                EnvelopeType::Inception,
                json!({
                    "signingKey": signing_key.to_base64url(),
                    "nextKeyCommitment": next_commitment.to_string(),
                }),
            ),
            EventPayload::Rotation {
                signing_key,
                next_commitment,
            } => (
                EnvelopeType::Rotation,
                json!({
                    "prefix": prefix,
                    "signingKey": signing_key.to_base64url(),
                    "nextKeyCommitment": next_commitment.to_string(),
                }),
            ),
            EventPayload::Interaction { anchor } => (
                EnvelopeType::Interaction,
                json!({
                    "prefix": prefix,
                    "anchor": anchor.to_text(),
                }),
            ),
        };
        Self::new(kind, event.seq, event.prior.as_ref(), payload, signed.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::event::KeyEvent;
    use crate::rotation::KeyCommitment;
    use crate::types::Prefix;

    #[test]
    fn test_envelope_shape() {
        let kp = Keypair::from_seed(&[1; 32]);
        let next = Keypair::from_seed(&[2; 32]);
        let icp = KeyEvent::inception(kp.public_key(), KeyCommitment::of(&next.public_key()));
        let prefix = Prefix::from_digest(icp.digest());
        let prior = icp.digest();
        let signed = icp.sign(&kp);

        let envelope = EventEnvelope::from(&signed);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "Inception");
        assert_eq!(value["seq"], 0);
        assert!(value["prior"].is_null());
        assert_eq!(value["signature"], signed.signature.to_base64url());

        let ixn = KeyEvent::interaction(prefix, 1, prior, Blake3Hash::hash(b"vc")).sign(&kp);
        let value = serde_json::to_value(EventEnvelope::from(&ixn)).unwrap();
        assert_eq!(value["type"], "Interaction");
        assert_eq!(value["prior"], prior.to_text());
        assert_eq!(value["payload"]["prefix"], prefix.to_text());
    }

    #[test]
    fn test_envelope_json_roundtrip() {
        let kp = Keypair::from_seed(&[1; 32]);
        let next = Keypair::from_seed(&[2; 32]);
        let signed = KeyEvent::inception(kp.public_key(), KeyCommitment::of(&next.public_key()))
            .sign(&kp);

        let envelope = EventEnvelope::from(&signed);
        let back: EventEnvelope = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(back, envelope);
    }
}
