//! Fingerprint generation for memoized calls
//!
//! A fingerprint is the cache key of one call: the SHA-256 of the canonical
//! JSON encoding of
//!
//! ```text
//! [name, shape, [positional...], {keyword...}]            source unavailable
//! [name, shape, [positional...], {keyword...}, source]    source available
//! ```
//!
//! Canonical JSON (RFC 8785) sorts object keys, so keyword order never
//! matters, and the two layouts have different lengths, so a call with
//! source never collides with the same call without it. `shape` records how
//! the arguments were supplied (see [`ArgsShape`]).

pub mod args;
mod finite;
pub mod identity;

pub(crate) use finite::ensure_finite;

pub use args::{Args, ArgsShape};
pub use identity::FnIdentity;

use crate::error::{MemoError, MemoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = 64;

/// Hex-encoded SHA-256 cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for display
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Fingerprint {
    type Err = MemoError;

    fn from_str(s: &str) -> MemoResult<Self> {
        let valid = s.len() == FINGERPRINT_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(MemoError::InvalidFingerprint(s.to_string()))
        }
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = MemoError;

    fn try_from(s: String) -> MemoResult<Self> {
        s.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

/// Compute the fingerprint of calling `identity` with `args`
pub fn fingerprint(identity: &FnIdentity, args: &Args) -> MemoResult<Fingerprint> {
    let bytes = key_material(identity, args)?;
    let digest = Sha256::digest(&bytes);
    Ok(Fingerprint(hex::encode(digest)))
}

/// Canonical bytes hashed into a fingerprint
fn key_material(identity: &FnIdentity, args: &Args) -> MemoResult<Vec<u8>> {
    let keyword: serde_json::Map<String, Value> = args
        .keyword()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let shape = serde_json::to_value(args.shape())?;
    let mut key = vec![
        Value::String(identity.name().to_string()),
        shape,
        Value::Array(args.positional().to_vec()),
        Value::Object(keyword),
    ];
    if let Some(source) = identity.source() {
        key.push(Value::String(source.to_string()));
    }

    serde_jcs::to_vec(&Value::Array(key)).map_err(|e| MemoError::Canonicalize(e.to_string()))
}
