//! Pool sources: where a bucketed pool comes from.

use tb_core::bank::{QuestionBank, QuestionFilter};
use tb_core::pool::QuestionPool;

use crate::PipelineError;

/// Builds the bucketed pool for a set of filter criteria.
pub trait PoolSource {
    fn fetch_pool(&self, filter: &QuestionFilter) -> Result<QuestionPool, PipelineError>;
}

/// Filters an in-memory bank.
#[derive(Debug, Clone, Copy)]
pub struct BankPoolSource<'a> {
    bank: &'a QuestionBank,
}

impl<'a> BankPoolSource<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }
}

impl PoolSource for BankPoolSource<'_> {
    fn fetch_pool(&self, filter: &QuestionFilter) -> Result<QuestionPool, PipelineError> {
        let pool = self.bank.pool(filter)?;
        tracing::debug!(
            bank = self.bank.len(),
            matched = pool.len(),
            buckets = pool.bucket_count(),
            "pool fetched from bank"
        );
        Ok(pool)
    }
}

/// A pool bucketed upstream. Filter criteria cannot apply and are rejected.
#[derive(Debug, Clone)]
pub struct FixedPoolSource {
    pool: QuestionPool,
}

impl FixedPoolSource {
    pub fn new(pool: QuestionPool) -> Self {
        Self { pool }
    }
}

impl PoolSource for FixedPoolSource {
    fn fetch_pool(&self, filter: &QuestionFilter) -> Result<QuestionPool, PipelineError> {
        if !filter.is_unconstrained() {
            return Err(PipelineError::Validate(
                "filter criteria need a question bank; a pre-bucketed pool was given".into(),
            ));
        }
        Ok(self.pool.clone())
    }
}
