//! crates/tb_pipeline/src/validate.rs
//! Request and pool checks before any sampling. Deterministic; no RNG.
//!
//! Errors block generation; warnings are reported and generation proceeds.

use tb_algo::{validate_questions_pool, Feasible, PoolDiagnostic};
use tb_core::pool::QuestionPool;
use tb_core::variables::{Params, VarsError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

/// pass = no Error issues.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
    pub feasible: Option<Feasible>,
    pub diagnostic: Option<PoolDiagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// True when the request itself is malformed (as opposed to an infeasible pool).
    pub fn has_param_errors(&self) -> bool {
        self.errors().any(|i| i.code.starts_with("PARAM_"))
    }
}

/// Check `params`; in random mode also check feasibility against `pool`.
pub fn validate_request(params: &Params, pool: Option<&QuestionPool>) -> ValidationReport {
    let mut issues = Vec::new();
    let mut feasible = None;
    let mut diagnostic = None;

    if let Err(e) = params.validate_domains() {
        let code = match e {
            VarsError::Domain(_) => "PARAM_DOMAIN",
            VarsError::Consistency(_) => "PARAM_CONSISTENCY",
        };
        issues.push(ValidationIssue { severity: Severity::Error, code, message: e.to_string() });
    } else if !params.is_manual() {
        if let (Some(pool), Ok(req)) = (pool, params.request()) {
            issues.extend(check_pool_shape(pool, req.num_questions()));
            match validate_questions_pool(pool, req.num_questions(), req.test_max_points()) {
                Ok(f) => feasible = Some(f),
                Err(d) => {
                    issues.push(ValidationIssue {
                        severity: Severity::Error,
                        code: d.code(),
                        message: d.to_string(),
                    });
                    diagnostic = Some(d);
                }
            }
        }
    }

    let pass = !issues.iter().any(|i| i.severity == Severity::Error);
    ValidationReport { pass, issues, feasible, diagnostic }
}

fn check_pool_shape(pool: &QuestionPool, n: usize) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    if pool.min_points() == Some(0) {
        out.push(ValidationIssue {
            severity: Severity::Warning,
            code: "ZERO_POINT_QUESTIONS",
            message: "pool contains questions worth 0 points".into(),
        });
    }
    if !pool.is_empty() && pool.len() == n {
        out.push(ValidationIssue {
            severity: Severity::Warning,
            code: "WHOLE_POOL",
            message: format!("every one of the {n} pool questions will be used"),
        });
    }
    out
}
