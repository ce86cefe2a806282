//! Deterministic hashing for inputs and artifacts.
//!
//! - Canonical JSON hashing: UTF-8, **sorted object keys**, array order preserved.
//! - Hex digests are **lowercase**.
//!
//! Use `sha256_canonical(..)` for values/structs (goes through canonical_json);
//! `sha256_hex(..)` for raw bytes.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_json_bytes;
use crate::IoError;

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    let v = serde_json::to_value(value)?;
    sha256_canonical_value(&v)
}

/// SHA-256 over an already parsed JSON value, canonicalized first.
pub fn sha256_canonical_value(v: &Value) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_json_bytes(v)?))
}
