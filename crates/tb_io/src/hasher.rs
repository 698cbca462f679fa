//! crates/tb_io/src/hasher.rs
//!
//! Deterministic hashing and id builders for generated test records.
//!
//! - Canonical JSON hashing: UTF-8, **sorted object keys**, array order preserved.
//! - `TST:<hex>` ids derive from the canonical bytes of the record's identity
//!   payload (selection + request echo + pool digest).
//! - Hex digests are **lowercase**.
//!
//! Use `sha256_canonical(..)` for JSON values/structs and `sha256_hex(..)` for
//! raw bytes.

#![forbid(unsafe_code)]

use serde::Serialize;
use sha2::{Digest, Sha256};
use tb_core::ids::TestId;

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}


/// `TST:<hex>` from canonical bytes.
pub fn test_id_from_canonical<T: Serialize>(value: &T) -> Result<TestId, IoError> {
    let hex = sha256_canonical(value)?;
    TestId::from_digest(&hex).map_err(|e| IoError::Hash(e.to_string()))
}
