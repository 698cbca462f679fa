// crates/tb_cli/src/args.rs
//
// Offline CLI argument surface.
//
// - Exactly one pool input: --bank (question records, filterable) XOR --pool
//   (already bucketed by points)
// - --request supplies the request document; flags override its fields
// - --manual needs --bank; --list-options needs --bank
// - Seeds accept decimal u64 or 0x-hex up to 16 nybbles
// - No networked paths (reject any scheme:// like http/https/file)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tb_core::ids::QuestionId;
use tb_core::variables::Params;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "tb",
    disable_help_subcommand = true,
    about = "Validate a question-selection request and generate a test"
)]
pub struct Args {
    /// Question bank JSON (array of question records).
    #[arg(long, conflicts_with = "pool")]
    pub bank: Option<PathBuf>,
    /// Pre-bucketed pool JSON ({"<points>": [question_id, ...]}).
    #[arg(long)]
    pub pool: Option<PathBuf>,
    /// Request document JSON.
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Number of questions to select.
    #[arg(long)]
    pub num_questions: Option<u32>,
    /// Test maximum points (budget).
    #[arg(long)]
    pub max_points: Option<u32>,
    /// Selector attempt bound.
    #[arg(long)]
    pub max_attempts: Option<u32>,
    /// Selector RNG seed. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    /// Test title.
    #[arg(long)]
    pub title: Option<String>,
    /// Manual selection: comma-separated question ids in presentation order.
    #[arg(long, value_delimiter = ',', value_parser = parse_question_id)]
    pub manual: Vec<QuestionId>,

    /// Output directory for test.json.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Check the request against the pool; select nothing, write nothing.
    #[arg(long)]
    pub validate_only: bool,
    /// Print the bank's creation options and exit.
    #[arg(long, requires = "bank")]
    pub list_options: bool,
    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    BadCombo(&'static str),
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            Missing(s) => write!(f, "missing required flag: {s}"),
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

pub fn parse_question_id(s: &str) -> Result<QuestionId, String> {
    s.trim().parse::<QuestionId>().map_err(|e| format!("{s:?}: {e}"))
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    check(args)
}

fn check(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    match (&args.bank, &args.pool) {
        (None, None) => return Err(CliError::Missing("--bank or --pool")),
        (Some(_), Some(_)) => return Err(CliError::BadCombo("--bank and --pool are exclusive")),
        _ => {}
    }
    if !args.manual.is_empty() && args.bank.is_none() {
        return Err(CliError::BadCombo("--manual needs --bank"));
    }
    if !args.manual.is_empty() && args.seed.is_some() {
        return Err(CliError::BadCombo("--seed has no effect with --manual"));
    }

    if let Some(b) = &args.bank {
        ensure_local_exists(b, "--bank")?;
    }
    if let Some(p) = &args.pool {
        ensure_local_exists(p, "--pool")?;
    }
    if let Some(r) = &args.request {
        ensure_local_exists(r, "--request")?;
    }

    args.bank = args.bank.take().map(|p| normalize_path(&p));
    args.pool = args.pool.take().map(|p| normalize_path(&p));
    args.request = args.request.take().map(|p| normalize_path(&p));
    args.out = normalize_path(&args.out);
    Ok(args)
}

/// Flags win over request-file values.
pub fn apply_overrides(params: &mut Params, args: &Args) {
    if let Some(n) = args.num_questions {
        params.num_questions = Some(n);
    }
    if let Some(p) = args.max_points {
        params.test_max_points = Some(p);
    }
    if let Some(a) = args.max_attempts {
        params.max_attempts = a;
    }
    if let Some(s) = args.seed {
        params.seed = Some(s);
    }
    if let Some(t) = &args.title {
        params.title = Some(t.clone());
    }
    if !args.manual.is_empty() {
        params.manual = args.manual.clone();
    }
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        args.bank.as_deref(),
        args.pool.as_deref(),
        args.request.as_deref(),
        Some(args.out.as_path()),
    ]
    .into_iter()
    .flatten()
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Absolute path; falls back to CWD-relative when the path does not exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tb").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn seed_parser_decimal_and_hex() {
        assert_eq!(parse_seed("42").unwrap(), 42u64);
        assert_eq!(parse_seed("0x2A").unwrap(), 42u64);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0xFFFFFFFFFFFFFFFFF").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn manual_ids_split_on_commas() {
        let a = parse(&["--bank", "b.json", "--manual", "3,Q7, 12"]);
        assert_eq!(a.manual, vec![QuestionId::new(3), QuestionId::new(7), QuestionId::new(12)]);
    }

    #[test]
    fn bank_and_pool_conflict_at_parse_time() {
        let r = Args::try_parse_from(["tb", "--bank", "a", "--pool", "b"]);
        assert!(r.is_err());
    }

    #[test]
    fn check_requires_an_input() {
        let a = parse(&["--num-questions", "2"]);
        assert!(matches!(check(a), Err(CliError::Missing(_))));
    }

    #[test]
    fn check_rejects_remote_and_missing_paths() {
        let a = parse(&["--bank", "https://x/bank.json"]);
        assert!(matches!(check(a), Err(CliError::NonLocalPath(_))));
        let a = parse(&["--bank", "/definitely/not/here.json"]);
        assert!(matches!(check(a), Err(CliError::NotFound(_))));
    }

    #[test]
    fn manual_with_pool_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let pool = dir.path().join("pool.json");
        fs::write(&pool, "{}").unwrap();
        let a = parse(&["--pool", pool.to_str().unwrap(), "--manual", "1"]);
        assert!(matches!(check(a), Err(CliError::BadCombo(_))));
    }

    #[test]
    fn flags_override_request_values() {
        let mut p = Params { num_questions: Some(5), test_max_points: Some(50), ..Default::default() };
        let a = parse(&["--bank", "b.json", "--max-points", "20", "--seed", "0x10"]);
        apply_overrides(&mut p, &a);
        assert_eq!(p.num_questions, Some(5));
        assert_eq!(p.test_max_points, Some(20));
        assert_eq!(p.seed, Some(16));
    }
}
