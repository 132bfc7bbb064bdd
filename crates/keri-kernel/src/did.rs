//! DID documents derived from key state.
//!
//! A document is a pure function of a [`KeyState`]; nothing here is stored.

use serde::{Deserialize, Serialize};

use keri_kernel_core::{KeyState, Prefix};

/// JSON-LD context of every document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Verification method type for Ed25519 signing keys.
pub const ED25519_KEY_TYPE: &str = "Ed25519VerificationKey2018";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: String,
    pub id: String,
    pub verification_method: Vec<VerificationMethod>,
    /// Text form of the pre-rotation commitment.
    pub next_key_commitment: String,
    pub service: Vec<ServiceEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub controller: String,
    pub public_key_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: String,
}

impl ServiceEndpoint {
    pub fn new(
        id: impl Into<String>,
        service_type: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_type: service_type.into(),
            service_endpoint: endpoint.into(),
        }
    }
}

/// Document for `state` with no service entries.
pub fn resolve(state: &KeyState) -> DidDocument {
    resolve_with_services(state, &[])
}

pub fn resolve_with_services(state: &KeyState, services: &[ServiceEndpoint]) -> DidDocument {
    let did = state.prefix.to_did();
    let key = state.signing_key.to_base64url();

    DidDocument {
        context: DID_CONTEXT.to_string(),
        verification_method: vec![VerificationMethod {
            id: format!("#{key}"),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: did.clone(),
            public_key_base64: key,
        }],
        id: did,
        next_key_commitment: state.next_commitment.to_string(),
        service: services.to_vec(),
    }
}

impl DidDocument {
    /// Identifier the document describes.
    pub fn prefix(&self) -> Option<Prefix> {
        Prefix::from_did(&self.id).ok()
    }

    /// Pretty JSON with object keys sorted.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        // Value's map is ordered, so going through it sorts every level.
        let value = serde_json::to_value(self)?;
        serde_json::to_string_pretty(&value)
    }
}
