//! Strong type definitions for the KERI Kernel.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::Blake3Hash;
use crate::error::CoreError;

/// DID method prefix for identifiers rendered as DIDs.
pub const DID_METHOD: &str = "did:keri:";

/// A self-certifying identifier: the digest of an inception event.
///
/// Rendered as the digest's text form (`E` + base64url). Once derived it is
/// never recomputed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefix(Blake3Hash);

impl Prefix {
    /// Wrap an inception digest.
    pub const fn from_digest(digest: Blake3Hash) -> Self {
        Self(digest)
    }

    /// The underlying inception digest.
    pub const fn digest(&self) -> &Blake3Hash {
        &self.0
    }

    /// Text form of the identifier.
    pub fn to_text(&self) -> String {
        self.0.to_text()
    }

    /// `did:keri:<prefix>`.
    pub fn to_did(&self) -> String {
        format!("{DID_METHOD}{}", self.0.to_text())
    }

    /// Parse either a bare prefix or a `did:keri:` DID.
    pub fn from_did(s: &str) -> Result<Self, CoreError> {
        let bare = s.strip_prefix(DID_METHOD).unwrap_or(s);
        bare.parse()
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prefix({})", &self.to_text()[..13])
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Prefix {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Blake3Hash::from_text(s).map(Self)
    }
}

impl TryFrom<String> for Prefix {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Prefix> for String {
    fn from(p: Prefix) -> Self {
        p.to_text()
    }
}

/// Points at one event in an identifier's KEL.
///
/// TEL events carry a seal of the KEL event that anchors them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventSeal {
    /// Identifier whose KEL holds the event.
    pub prefix: Prefix,
    /// Sequence number of the event.
    pub seq: u64,
    /// Digest of the event.
    pub digest: Blake3Hash,
}

impl EventSeal {
    pub fn new(prefix: Prefix, seq: u64, digest: Blake3Hash) -> Self {
        Self { prefix, seq, digest }
    }
}
