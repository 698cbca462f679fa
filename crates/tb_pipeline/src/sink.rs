//! Test sinks: where a finalized test record goes.

use std::path::PathBuf;

use tb_io::canonical_json;

use crate::record::GeneratedTest;
use crate::PipelineError;

pub const TEST_FILE_NAME: &str = "test.json";

/// Durably records a finalized test.
pub trait TestSink {
    fn record(&mut self, test: &GeneratedTest) -> Result<(), PipelineError>;
}

/// Writes `<dir>/test.json` as canonical JSON.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TEST_FILE_NAME)
    }
}

impl TestSink for JsonFileSink {
    fn record(&mut self, test: &GeneratedTest) -> Result<(), PipelineError> {
        let path = self.path();
        canonical_json::write_canonical_file(&path, test)
            .map_err(|e| PipelineError::Sink(format!("{}: {e}", path.display())))?;
        tracing::info!(test_id = %test.test_id, path = %path.display(), "test recorded");
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<GeneratedTest>,
}

impl TestSink for MemorySink {
    fn record(&mut self, test: &GeneratedTest) -> Result<(), PipelineError> {
        self.records.push(test.clone());
        Ok(())
    }
}
