//! Attestation data: issuer-signed credentials whose status lives in a TEL.
//!
//! The credential digest `d` covers the canonical `{issuer, schema, payload}`
//! object only. The signature is over the same bytes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use keri_kernel_core::{
    canonical_json_bytes, Blake3Hash, CoreError, Ed25519Signature, Kel, Keypair, Prefix,
};
use keri_kernel_resolve::RemoteResolver;
use keri_kernel_tel::{TelLog, TelStatus};

/// An unsigned claim made by `issuer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationDatum {
    pub issuer: Prefix,
    pub schema: String,
    pub payload: Value,
}

impl AttestationDatum {
    pub fn new(issuer: Prefix, schema: impl Into<String>, payload: Value) -> Self {
        Self {
            issuer,
            schema: schema.into(),
            payload,
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "issuer": self.issuer.to_did(),
            "schema": self.schema,
            "payload": self.payload,
        })
    }

    /// Bytes that are signed and hashed.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_json_bytes(&self.to_value())
    }

    /// The credential digest `d`.
    pub fn digest(&self) -> Blake3Hash {
        Blake3Hash::hash(&self.canonical_bytes())
    }

    pub fn sign(self, keypair: &Keypair) -> SignedAttestationDatum {
        let signature = keypair.sign(&self.canonical_bytes());
        SignedAttestationDatum {
            datum: self,
            signature,
        }
    }
}

/// A datum plus the issuer's signature.
///
/// Serialized as `{issuer, schema, payload, proof: {signature}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireDatum", into = "WireDatum")]
pub struct SignedAttestationDatum {
    pub datum: AttestationDatum,
    pub signature: Ed25519Signature,
}

impl SignedAttestationDatum {
    pub fn digest(&self) -> Blake3Hash {
        self.datum.digest()
    }

    pub fn issuer(&self) -> &Prefix {
        &self.datum.issuer
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[derive(Serialize, Deserialize)]
struct WireDatum {
    issuer: String,
    schema: String,
    payload: Value,
    proof: Proof,
}

#[derive(Serialize, Deserialize)]
struct Proof {
    signature: String,
}

impl From<SignedAttestationDatum> for WireDatum {
    fn from(signed: SignedAttestationDatum) -> Self {
        Self {
            issuer: signed.datum.issuer.to_did(),
            schema: signed.datum.schema,
            payload: signed.datum.payload,
            proof: Proof {
                signature: signed.signature.to_base64url(),
            },
        }
    }
}

impl TryFrom<WireDatum> for SignedAttestationDatum {
    type Error = CoreError;

    fn try_from(wire: WireDatum) -> Result<Self, Self::Error> {
        Ok(Self {
            datum: AttestationDatum {
                issuer: Prefix::from_did(&wire.issuer)?,
                schema: wire.schema,
                payload: wire.payload,
            },
            signature: Ed25519Signature::from_base64url(&wire.proof.signature)?,
        })
    }
}

/// Outcome of verifying a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verification {
    Valid,
    Revoked,
    /// Correctly signed, but the issuer never recorded an issuance.
    NotIssued,
    InvalidSignature,
    /// The issuer's logs could not be obtained or did not validate.
    ResolutionError(String),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }
}

/// Verify `signed` against logs already known to belong to `issuer`.
///
/// The signing key is the one in force at the interaction that anchored the
/// issuance, so rotations after issuance do not invalidate the credential.
/// Without an issuance the current key is used.
pub fn verify_credential(
    issuer: &Prefix,
    kel: &Kel,
    tel: Option<&TelLog>,
    signed: &SignedAttestationDatum,
) -> Verification {
    if signed.issuer() != issuer || kel.prefix() != *issuer {
        return Verification::InvalidSignature;
    }
    let d = signed.digest();
    let tel = tel.filter(|log| log.credential() == &d);

    let key = match tel.and_then(TelLog::issuance) {
        Some(issued) => {
            let seal = issued.event.seal;
            let anchored = kel
                .event_at(seal.seq)
                .and_then(|e| e.event.anchor())
                .is_some_and(|a| a == &d);
            match kel.state_at(seal.seq) {
                Some(state) if anchored => state.signing_key,
                _ => {
                    return Verification::ResolutionError(format!(
                        "issuance seal at seq {} does not anchor {d}",
                        seal.seq
                    ))
                }
            }
        }
        None => kel.current_state_ref().signing_key,
    };

    if key
        .verify(&signed.datum.canonical_bytes(), &signed.signature)
        .is_err()
    {
        return Verification::InvalidSignature;
    }

    match tel.map_or(TelStatus::Unknown, TelLog::status) {
        TelStatus::Issued => Verification::Valid,
        TelStatus::Revoked => Verification::Revoked,
        TelStatus::Unknown => Verification::NotIssued,
    }
}

/// Fetch the issuer's logs through `resolver` and verify against them.
pub async fn verify_remote(
    resolver: &RemoteResolver,
    issuer: &Prefix,
    signed: &SignedAttestationDatum,
) -> Verification {
    if signed.issuer() != issuer {
        return Verification::InvalidSignature;
    }
    let kel = match resolver.fetch_kel(issuer).await {
        Ok(kel) => kel,
        Err(e) => return Verification::ResolutionError(e.to_string()),
    };
    let tel = match resolver.fetch_tel(&kel, &signed.digest()).await {
        Ok(tel) => tel,
        Err(e) => return Verification::ResolutionError(e.to_string()),
    };
    verify_credential(issuer, &kel, tel.as_ref(), signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keri_kernel_core::KeyRing;
    use keri_kernel_tel::TelRegistry;

    fn issuer() -> (KeyRing, Kel) {
        let keys = KeyRing::new(Keypair::from_seed(&[1; 32]), Keypair::from_seed(&[2; 32]));
        let icp = keys.inception_event();
        let kel = Kel::incept(icp.event, icp.signature).unwrap();
        (keys, kel)
    }

    fn issue(keys: &KeyRing, kel: &mut Kel, tel: &mut TelRegistry) -> SignedAttestationDatum {
        let datum = AttestationDatum::new(kel.prefix(), "test", json!({"msg": "hi"}));
        let signed = datum.sign(keys.current());
        let d = signed.digest();

        let ixn = kel.interact(d);
        let sig = keys.current().sign(&ixn.canonical_bytes());
        let prefix = kel.prefix();
        let seal = kel.confirm(ixn, sig).unwrap().seal(prefix);
        tel.record_issuance(d, seal, keys.current()).unwrap();
        signed
    }

    #[test]
    fn test_digest_ignores_key_order() {
        let prefix = Prefix::from_digest(Blake3Hash::hash(b"p"));
        let a = AttestationDatum::new(prefix, "s", json!({"a": 1, "b": [true, null]}));
        let b = AttestationDatum::new(prefix, "s", json!({"b": [true, null], "a": 1}));
        assert_eq!(a.digest(), b.digest());

        let c = AttestationDatum::new(prefix, "s", json!({"a": 2, "b": [true, null]}));
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn test_wire_format() {
        let (keys, kel) = issuer();
        let signed = AttestationDatum::new(kel.prefix(), "test", json!({"msg": "hi"}))
            .sign(keys.current());

        let json = signed.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["issuer"], kel.prefix().to_did());
        assert_eq!(value["schema"], "test");
        assert_eq!(value["payload"]["msg"], "hi");
        assert_eq!(value["proof"]["signature"], signed.signature.to_base64url());

        let parsed = SignedAttestationDatum::from_json(&json).unwrap();
        assert_eq!(parsed, signed);
        assert_eq!(parsed.digest(), signed.digest());
    }

    #[test]
    fn test_wire_rejects_bad_issuer() {
        let json = r#"{"issuer":"did:keri:nope","schema":"s","payload":{},"proof":{"signature":""}}"#;
        assert!(SignedAttestationDatum::from_json(json).is_err());
    }

    #[test]
    fn test_verify_lifecycle() {
        let (keys, mut kel) = issuer();
        let mut tel = TelRegistry::new();
        let prefix = kel.prefix();

        let unissued = AttestationDatum::new(prefix, "other", json!(1)).sign(keys.current());
        assert_eq!(
            verify_credential(&prefix, &kel, None, &unissued),
            Verification::NotIssued
        );

        let signed = issue(&keys, &mut kel, &mut tel);
        let d = signed.digest();
        assert_eq!(
            verify_credential(&prefix, &kel, tel.log(&d), &signed),
            Verification::Valid
        );

        tel.record_revocation(d, kel.current_state().seal(), keys.current())
            .unwrap();
        assert_eq!(
            verify_credential(&prefix, &kel, tel.log(&d), &signed),
            Verification::Revoked
        );
    }

    #[test]
    fn test_tampered_payload() {
        let (keys, mut kel) = issuer();
        let mut tel = TelRegistry::new();
        let prefix = kel.prefix();
        let mut signed = issue(&keys, &mut kel, &mut tel);

        signed.datum.payload = json!({"msg": "hj"});
        let log = tel.log(&signed.digest());
        assert_eq!(
            verify_credential(&prefix, &kel, log, &signed),
            Verification::InvalidSignature
        );
    }

    #[test]
    fn test_foreign_issuer() {
        let (keys, mut kel) = issuer();
        let mut tel = TelRegistry::new();
        let signed = issue(&keys, &mut kel, &mut tel);

        let other = Prefix::from_digest(Blake3Hash::hash(b"someone else"));
        assert_eq!(
            verify_credential(&other, &kel, tel.log(&signed.digest()), &signed),
            Verification::InvalidSignature
        );
    }
}
