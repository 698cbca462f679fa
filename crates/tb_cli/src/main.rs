// crates/tb_cli/src/main.rs
//
// Exit codes, typed error mapping, logging init, and the three run paths
// (list-options, validate-only, generate). The JSON response goes to stdout;
// logs go to stderr.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const INFEASIBLE: i32 = 3;
    pub const IO: i32 = 4;
    pub const EXHAUSTED: i32 = 5;
}

use std::process::ExitCode;

use args::{apply_overrides, parse_and_validate as parse_cli, Args};
use tb_algo::{assemble_manual, Response};
use tb_core::bank::QuestionBank;
use tb_core::pool::QuestionPool;
use tb_core::rng::SelectRng;
use tb_core::variables::Params;
use tb_io::loader;
use tb_pipeline::{
    run_manual, run_random, validate_request, BankPoolSource, FixedPoolSource, JsonFileSink,
    PipelineError, PoolSource, RunStatus,
};
use tracing_subscriber::EnvFilter;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// JSON shape / request domain / flag combination failures
    Validation(String),
    /// Read/write/path/limit failures
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

/// The loaded pool input.
enum Input {
    Bank(QuestionBank),
    Pool(QuestionPool),
}

impl Input {
    fn source(&self) -> Box<dyn PoolSource + '_> {
        match self {
            Input::Bank(b) => Box::new(BankPoolSource::new(b)),
            Input::Pool(p) => Box::new(FixedPoolSource::new(p.clone())),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("tb: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise info for our crates, warn under --quiet.
fn init_tracing(quiet: bool) {
    let default = if quiet {
        "warn"
    } else {
        "tb_cli=info,tb_pipeline=info,tb_algo=warn,tb_io=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<i32, MainError> {
    let input = load_input(args)?;

    if args.list_options {
        let Input::Bank(bank) = &input else {
            return Err(MainError::Validation("--list-options needs --bank".into()));
        };
        print_json(&bank.creation_options())?;
        return Ok(exitcodes::OK);
    }

    let params = load_params(args)?;

    if args.validate_only {
        validate_only(&input, &params)
    } else {
        run_once(args, &input, &params)
    }
}

fn load_input(args: &Args) -> Result<Input, MainError> {
    match (&args.bank, &args.pool) {
        (Some(b), _) => Ok(Input::Bank(loader::load_bank(b).map_err(map_tbio_err)?)),
        (None, Some(p)) => Ok(Input::Pool(loader::load_pool(p).map_err(map_tbio_err)?)),
        (None, None) => Err(MainError::Validation("missing --bank or --pool".into())),
    }
}

/// Request file (if any) + flag overrides, then domain checks.
fn load_params(args: &Args) -> Result<Params, MainError> {
    let mut params = match &args.request {
        Some(path) => loader::read_params(path).map_err(map_tbio_err)?,
        None => Params::default(),
    };
    apply_overrides(&mut params, args);
    params
        .validate_domains()
        .map_err(|e| MainError::Validation(e.to_string()))?;
    Ok(params)
}

/// Validate-only path: no selection, no artifacts.
/// Exit codes: 0 feasible, 2 malformed request, 3 infeasible pool.
fn validate_only(input: &Input, params: &Params) -> Result<i32, MainError> {
    if params.is_manual() {
        let Input::Bank(bank) = input else {
            return Err(MainError::Validation("manual selection needs --bank".into()));
        };
        return match assemble_manual(bank, &params.manual, params.test_max_points) {
            Ok(sel) => {
                print_json(&Response::success(&sel, None))?;
                Ok(exitcodes::OK)
            }
            Err(e) => {
                print_json(&Response::from_manual_error(&e))?;
                Ok(exitcodes::VALIDATION)
            }
        };
    }

    let pool = input
        .source()
        .fetch_pool(&params.filter)
        .map_err(map_pipeline_err)?;
    let report = validate_request(params, Some(&pool));
    for issue in &report.issues {
        tracing::warn!(code = issue.code, "{}", issue.message);
    }

    if report.has_param_errors() {
        let msg = report.errors().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; ");
        return Err(MainError::Validation(msg));
    }
    match (&report.feasible, &report.diagnostic) {
        (Some(f), _) => {
            print_json(&Response::feasible(f))?;
            Ok(exitcodes::OK)
        }
        (None, Some(d)) => {
            print_json(&Response::from_diagnostic(d))?;
            Ok(exitcodes::INFEASIBLE)
        }
        (None, None) => Err(MainError::Validation("request could not be checked".into())),
    }
}

fn run_once(args: &Args, input: &Input, params: &Params) -> Result<i32, MainError> {
    let mut sink = JsonFileSink::new(&args.out);

    let outcome = if params.is_manual() {
        let Input::Bank(bank) = input else {
            return Err(MainError::Validation("manual selection needs --bank".into()));
        };
        run_manual(bank, &mut sink, params).map_err(map_pipeline_err)?
    } else {
        let mut rng = match params.seed {
            Some(seed) => SelectRng::from_seed_u64(seed),
            None => SelectRng::from_entropy(),
        };
        tracing::info!(seed = rng.seed(), "selector seeded");
        let source = input.source();
        run_random(source.as_ref(), &mut sink, params, &mut rng).map_err(map_pipeline_err)?
    };

    print_json(&outcome.response)?;
    if let Some(rec) = &outcome.record {
        tracing::info!(test_id = %rec.test_id, path = %sink.path().display(), "test written");
    }
    Ok(match outcome.status {
        RunStatus::Recorded => exitcodes::OK,
        RunStatus::Infeasible => exitcodes::INFEASIBLE,
        RunStatus::Exhausted => exitcodes::EXHAUSTED,
        RunStatus::Rejected => exitcodes::VALIDATION,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), MainError> {
    let s = serde_json::to_string(value).map_err(|e| MainError::Io(format!("stdout json: {e}")))?;
    println!("{s}");
    Ok(())
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

fn map_tbio_err(e: tb_io::IoError) -> MainError {
    use tb_io::IoError::*;
    match e {
        Json { origin, msg } => MainError::Validation(format!("json {origin}: {msg}")),
        Hash(m) => MainError::Io(format!("hash: {m}")),
        Path(m) => MainError::Io(format!("path: {m}")),
        TooLarge { origin, limit } => MainError::Io(format!("limit: {origin} exceeds {limit} bytes")),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    use PipelineError::*;
    match e {
        Schema(m) | Validate(m) | Select(m) => MainError::Validation(m),
        Io(m) | Build(m) | Sink(m) => MainError::Io(m),
    }
}
