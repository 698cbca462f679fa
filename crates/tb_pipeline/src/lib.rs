//! tb_pipeline: test generation (source, pool, validate, select, record, sink).
//! JSON, hashing and file writes go through `tb_io`; the math lives in `tb_algo`.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod record;
pub mod run;
pub mod sink;
pub mod source;
pub mod validate;

pub use record::{build_record, GeneratedTest, RecordMeta, RequestEcho, SelectionMode};
pub use run::{run_manual, run_random, RunOutcome, RunStatus};
pub use sink::{JsonFileSink, MemorySink, TestSink};
pub use source::{BankPoolSource, FixedPoolSource, PoolSource};
pub use validate::{validate_request, Severity, ValidationIssue, ValidationReport};

/// Engine identifiers echoed into every test record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        name: "tb_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(String),
    #[error("schema: {0}")]
    Schema(String),
    #[error("validate: {0}")]
    Validate(String),
    #[error("select: {0}")]
    Select(String),
    #[error("build: {0}")]
    Build(String),
    #[error("sink: {0}")]
    Sink(String),
}

impl From<tb_io::IoError> for PipelineError {
    fn from(e: tb_io::IoError) -> Self {
        use tb_io::IoError;
        match e {
            IoError::Path(m) => PipelineError::Io(format!("path: {m}")),
            IoError::TooLarge { origin, limit } => {
                PipelineError::Io(format!("limit: {origin} exceeds {limit} bytes"))
            }
            IoError::Json { origin, msg } => PipelineError::Schema(format!("{origin}: {msg}")),
            IoError::Hash(m) => PipelineError::Build(format!("hash: {m}")),
        }
    }
}

impl From<tb_core::variables::VarsError> for PipelineError {
    fn from(e: tb_core::variables::VarsError) -> Self {
        PipelineError::Validate(e.to_string())
    }
}

impl From<tb_core::PoolError> for PipelineError {
    fn from(e: tb_core::PoolError) -> Self {
        PipelineError::Schema(e.to_string())
    }
}

impl From<tb_core::RequestError> for PipelineError {
    fn from(e: tb_core::RequestError) -> Self {
        PipelineError::Validate(e.to_string())
    }
}
