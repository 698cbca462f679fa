//! record.rs
//! The persisted test record and its id.
//!
//! `test_id = "TST:" + sha256(canonical bytes of the record without its id)`.
//! Questions are stored in presentation order.

use serde::{Deserialize, Serialize};
use tb_core::ids::TestId;
use tb_core::pool::{QuestionOrder, Selection};
use tb_io::hasher;

use crate::{EngineMeta, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Random,
    Manual,
}

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEcho {
    pub num_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_max_points: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub test_id: TestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub mode: SelectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_questions_in_pool: Option<usize>,
    pub request: RequestEcho,
    pub question_order: Vec<QuestionOrder>,
    pub total_score: u64,
    pub engine: EngineMeta,
}

/// Idless shape hashed into `test_id`; serializes like `GeneratedTest` minus the id.
#[derive(Serialize)]
struct TestNoId<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    mode: SelectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pool_sha256: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_questions_in_pool: Option<usize>,
    request: &'a RequestEcho,
    question_order: &'a [QuestionOrder],
    total_score: u64,
    engine: &'a EngineMeta,
}

/// Inputs to a record beyond the selection itself.
#[derive(Debug, Clone)]
pub struct RecordMeta {
    pub title: Option<String>,
    pub mode: SelectionMode,
    pub seed: Option<u64>,
    pub pool_sha256: Option<String>,
    pub total_questions_in_pool: Option<usize>,
    pub request: RequestEcho,
    pub engine: EngineMeta,
}

pub fn build_record(selection: &Selection, meta: RecordMeta) -> Result<GeneratedTest, PipelineError> {
    let question_order = selection.in_presentation_order();
    let idless = TestNoId {
        title: meta.title.as_deref(),
        mode: meta.mode,
        seed: meta.seed,
        pool_sha256: meta.pool_sha256.as_deref(),
        total_questions_in_pool: meta.total_questions_in_pool,
        request: &meta.request,
        question_order: &question_order,
        total_score: selection.total_score,
        engine: &meta.engine,
    };
    let test_id = hasher::test_id_from_canonical(&idless)?;

    Ok(GeneratedTest {
        test_id,
        title: meta.title,
        mode: meta.mode,
        seed: meta.seed,
        pool_sha256: meta.pool_sha256,
        total_questions_in_pool: meta.total_questions_in_pool,
        request: meta.request,
        question_order,
        total_score: selection.total_score,
        engine: meta.engine,
    })
}
