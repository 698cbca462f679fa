//! crates/tb_core/src/errors.rs
//! Small error sets for core-domain parsing and construction.

use thiserror::Error;

use crate::ids::QuestionId;

/// Parsing / shape errors for ids and tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid question id")]
    InvalidQuestionId,
    #[error("invalid test id")]
    InvalidTestId,
    #[error("invalid hex")]
    InvalidHex,
}

/// Violations of the pool/bank invariant (an id is listed at most once).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PoolError {
    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),
}

/// Rejected selection targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum RequestError {
    #[error("num_questions must be at least 1")]
    ZeroQuestions,
    #[error("test_max_points must be at least 1")]
    ZeroBudget,
}
