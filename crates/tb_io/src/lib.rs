//! crates/tb_io/src/lib.rs
//! Local file I/O for the test-bank engine.
//!
//! - Bounded JSON reads for the question bank and the request document (`loader`).
//! - Canonical JSON bytes and atomic writes (`canonical_json`).
//! - SHA-256 digests and `TST:` record ids (`hasher`).
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for tb_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON syntax or shape errors, with the offending file when known.
    #[error("json error in {origin}: {msg}")]
    Json { origin: String, msg: String },

    /// Input larger than the loader accepts.
    #[error("{origin} exceeds {limit} bytes")]
    TooLarge { origin: String, limit: u64 },

    /// Hashing / id construction errors.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json { origin: "<memory>".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub mod prelude {
    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{sha256_canonical, sha256_hex, test_id_from_canonical};
    pub use crate::loader::{load_bank, load_pool, read_params};
    pub use crate::{IoError, IoResult};
}
