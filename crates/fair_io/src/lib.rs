//! fair_io — local JSON in, canonical JSON out.
//!
//! - `loader`: store sets and parameter files (size-limited, order-preserving)
//! - `canonical_json`: sorted-key compact bytes and atomic file writes
//! - `hasher`: lowercase SHA-256 over raw or canonical bytes
//! - `artifacts`: wire shapes for allocations and store sets
//!
//! No network I/O.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for fair_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Opening or reading an input.
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    /// Creating, writing, syncing or renaming an output.
    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    /// JSON syntax or type errors, with a JSON Pointer to the offending node.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Well-formed JSON that does not describe a valid store set.
    #[error("invalid input at {pointer}: {msg}")]
    Shape { pointer: String, msg: String },

    /// Size limits.
    #[error("limit exceeded: {0}")]
    Limit(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod artifacts;
pub mod canonical_json;
pub mod hasher;
pub mod loader;
