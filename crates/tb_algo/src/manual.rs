//! Manual assembly: an administrator's hand-picked list becomes a selection.
//!
//! Presentation order follows the given list (first id is question 1). The
//! optional cap rejects a list whose total exceeds it.

use std::collections::BTreeSet;

use tb_core::bank::QuestionBank;
use tb_core::ids::QuestionId;
use tb_core::pool::{QuestionOrder, Selection};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManualError {
    #[error("no questions were selected")]
    Empty,
    #[error("question {0} is not in the bank")]
    UnknownQuestion(QuestionId),
    #[error("question {0} was selected more than once")]
    DuplicateQuestion(QuestionId),
    #[error("selected questions total {total} points, above the test maximum of {cap}")]
    OverBudget { total: u64, cap: u32 },
}

impl ManualError {
    pub fn code(&self) -> &'static str {
        match self {
            ManualError::Empty => "EMPTY_SELECTION",
            ManualError::UnknownQuestion(_) => "UNKNOWN_QUESTION",
            ManualError::DuplicateQuestion(_) => "DUPLICATE_QUESTION",
            ManualError::OverBudget { .. } => "OVER_BUDGET",
        }
    }
}

pub fn assemble_manual(
    bank: &QuestionBank,
    ids: &[QuestionId],
    cap: Option<u32>,
) -> Result<Selection, ManualError> {
    if ids.is_empty() {
        return Err(ManualError::Empty);
    }

    let mut seen = BTreeSet::new();
    let mut question_order = Vec::with_capacity(ids.len());
    let mut total = 0u64;

    for (pos, &id) in ids.iter().enumerate() {
        let q = bank.get(id).ok_or(ManualError::UnknownQuestion(id))?;
        if !seen.insert(id) {
            return Err(ManualError::DuplicateQuestion(id));
        }
        total += u64::from(q.max_points);
        question_order.push(QuestionOrder {
            question_id: id,
            question_order: pos as u32 + 1,
        });
    }

    if let Some(cap) = cap {
        if total > u64::from(cap) {
            return Err(ManualError::OverBudget { total, cap });
        }
    }

    Ok(Selection { question_order, total_score: total })
}
