//! End-to-end generation: one request in, one response (and maybe one record) out.

use tb_algo::{assemble_manual, generate, GenerationOutcome, Response, SelectionError, SelectorConfig};
use tb_core::bank::QuestionBank;
use tb_core::rng::SelectRng;
use tb_core::variables::Params;
use tb_io::hasher;
use tracing::{info, warn};

use crate::record::{build_record, GeneratedTest, RecordMeta, RequestEcho, SelectionMode};
use crate::sink::TestSink;
use crate::source::PoolSource;
use crate::{engine_identifiers, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// A test was generated and handed to the sink.
    Recorded,
    /// The validator rejected the pool.
    Infeasible,
    /// The selector ran out of attempts; retrying may succeed.
    Exhausted,
    /// A manual selection was refused.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub response: Response,
    pub record: Option<GeneratedTest>,
}

/// Random mode: fetch the pool, validate, select, record.
pub fn run_random<S, K>(
    source: &S,
    sink: &mut K,
    params: &Params,
    rng: &mut SelectRng,
) -> Result<RunOutcome, PipelineError>
where
    S: PoolSource + ?Sized,
    K: TestSink + ?Sized,
{
    params.validate_domains()?;
    if params.is_manual() {
        return Err(PipelineError::Validate(
            "request lists manual questions; random generation needs none".into(),
        ));
    }
    let request = params.request()?;

    let pool = source.fetch_pool(&params.filter)?;
    info!(
        questions = pool.len(),
        buckets = pool.bucket_count(),
        requested = request.num_questions(),
        budget = request.test_max_points(),
        "pool ready"
    );
    if pool.is_empty() {
        warn!("no questions match the selection criteria");
    }
    let pool_sha256 = hasher::sha256_canonical(&pool)?;

    let config = SelectorConfig::from_params(params);
    let outcome = generate(&pool, &request, &config, rng);
    let response = outcome.to_response();

    match outcome {
        GenerationOutcome::Generated { feasible, selection } => {
            let record = build_record(
                &selection,
                RecordMeta {
                    title: params.title.clone(),
                    mode: SelectionMode::Random,
                    seed: Some(rng.seed()),
                    pool_sha256: Some(pool_sha256),
                    total_questions_in_pool: Some(feasible.total_questions_in_pool),
                    request: RequestEcho {
                        num_questions: request.num_questions(),
                        test_max_points: Some(request.test_max_points()),
                    },
                    engine: engine_identifiers(),
                },
            )?;
            sink.record(&record)?;
            info!(test_id = %record.test_id, total_score = record.total_score, "test generated");
            Ok(RunOutcome { status: RunStatus::Recorded, response, record: Some(record) })
        }
        GenerationOutcome::Infeasible(d) => {
            warn!(code = d.code(), "{d}");
            Ok(RunOutcome { status: RunStatus::Infeasible, response, record: None })
        }
        GenerationOutcome::Failed(SelectionError::Exhausted { attempts }) => {
            warn!(attempts, seed = rng.seed(), "selection exhausted");
            Ok(RunOutcome { status: RunStatus::Exhausted, response, record: None })
        }
        GenerationOutcome::Failed(e) => {
            Err(PipelineError::Select(e.to_string()))
        }
    }
}

/// Manual mode: the request lists question ids in presentation order.
pub fn run_manual<K>(
    bank: &QuestionBank,
    sink: &mut K,
    params: &Params,
) -> Result<RunOutcome, PipelineError>
where
    K: TestSink + ?Sized,
{
    params.validate_domains()?;
    if !params.is_manual() {
        return Err(PipelineError::Validate("manual mode needs at least one question id".into()));
    }

    let selection = match assemble_manual(bank, &params.manual, params.test_max_points) {
        Ok(s) => s,
        Err(e) => {
            warn!(code = e.code(), "{e}");
            return Ok(RunOutcome {
                status: RunStatus::Rejected,
                response: Response::from_manual_error(&e),
                record: None,
            });
        }
    };

    let record = build_record(
        &selection,
        RecordMeta {
            title: params.title.clone(),
            mode: SelectionMode::Manual,
            seed: None,
            pool_sha256: None,
            total_questions_in_pool: None,
            request: RequestEcho {
                num_questions: selection.len(),
                test_max_points: params.test_max_points,
            },
            engine: engine_identifiers(),
        },
    )?;
    sink.record(&record)?;
    info!(test_id = %record.test_id, total_score = record.total_score, "manual test recorded");

    Ok(RunOutcome {
        status: RunStatus::Recorded,
        response: Response::success(&selection, None),
        record: Some(record),
    })
}
