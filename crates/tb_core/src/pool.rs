//! crates/tb_core/src/pool.rs
//! Bucketed question pool and the selection request/result shapes.
//!
//! A pool maps a point value to the ids of every candidate question worth that
//! many points. Buckets iterate in ascending point order; within a bucket the
//! caller's order is preserved. An id is listed at most once across all buckets.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{PoolError, RequestError};
use crate::ids::QuestionId;

/// Immutable snapshot of candidate questions, bucketed by point value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<u32, Vec<QuestionId>>",
    into = "BTreeMap<u32, Vec<QuestionId>>"
)]
pub struct QuestionPool {
    buckets: BTreeMap<u32, Vec<QuestionId>>,
    seen: BTreeSet<QuestionId>,
}

impl QuestionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(points, ids)` groups. Groups with the same point value are
    /// concatenated in encounter order.
    pub fn from_buckets<I, V>(groups: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (u32, V)>,
        V: IntoIterator<Item = QuestionId>,
    {
        let mut pool = Self::new();
        for (points, ids) in groups {
            for id in ids {
                pool.insert(id, points)?;
            }
        }
        Ok(pool)
    }

    /// Append one question to its bucket.
    pub fn insert(&mut self, id: QuestionId, points: u32) -> Result<(), PoolError> {
        if !self.seen.insert(id) {
            return Err(PoolError::DuplicateQuestion(id));
        }
        self.buckets.entry(points).or_default().push(id);
        Ok(())
    }

    /// `(points, ids)` in ascending point order. Never yields an empty bucket.
    pub fn buckets(&self) -> impl Iterator<Item = (u32, &[QuestionId])> + '_ {
        self.buckets.iter().map(|(&p, ids)| (p, ids.as_slice()))
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of candidate questions.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.seen.contains(&id)
    }

    /// Point value of a listed question.
    pub fn points_of(&self, id: QuestionId) -> Option<u32> {
        if !self.contains(id) {
            return None;
        }
        self.buckets
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(&p, _)| p)
    }

    /// Σ (point value × bucket size).
    pub fn total_max_points(&self) -> u64 {
        self.buckets
            .iter()
            .map(|(&p, ids)| u64::from(p) * ids.len() as u64)
            .sum()
    }

    /// Smallest point value present, `None` for an empty pool.
    pub fn min_points(&self) -> Option<u32> {
        self.buckets.keys().next().copied()
    }

    /// Sum of the `n` cheapest questions (`None` if the pool holds fewer than `n`).
    pub fn cheapest_sum(&self, n: usize) -> Option<u64> {
        if n > self.len() {
            return None;
        }
        let mut left = n;
        let mut sum = 0u64;
        for (&p, ids) in &self.buckets {
            if left == 0 {
                break;
            }
            let take = left.min(ids.len());
            sum += u64::from(p) * take as u64;
            left -= take;
        }
        Some(sum)
    }

    /// One addressable sequence: buckets ascending, bucket order preserved.
    pub fn flatten(&self) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(self.len());
        for (&points, ids) in &self.buckets {
            out.extend(ids.iter().map(|&question_id| Candidate { question_id, points }));
        }
        out
    }
}

impl TryFrom<BTreeMap<u32, Vec<QuestionId>>> for QuestionPool {
    type Error = PoolError;
    fn try_from(map: BTreeMap<u32, Vec<QuestionId>>) -> Result<Self, Self::Error> {
        Self::from_buckets(map)
    }
}

impl From<QuestionPool> for BTreeMap<u32, Vec<QuestionId>> {
    fn from(pool: QuestionPool) -> Self {
        pool.buckets
    }
}

/// A flattened pool entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub question_id: QuestionId,
    pub points: u32,
}

/// Target cardinality and point budget. Both strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SelectionRequest {
    num_questions: usize,
    test_max_points: u32,
}

impl SelectionRequest {
    pub fn new(num_questions: usize, test_max_points: u32) -> Result<Self, RequestError> {
        if num_questions == 0 {
            return Err(RequestError::ZeroQuestions);
        }
        if test_max_points == 0 {
            return Err(RequestError::ZeroBudget);
        }
        Ok(Self { num_questions, test_max_points })
    }

    pub fn num_questions(&self) -> usize {
        self.num_questions
    }

    pub fn test_max_points(&self) -> u32 {
        self.test_max_points
    }
}

/// One selected question and its display position (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOrder {
    pub question_id: QuestionId,
    pub question_order: u32,
}

/// A concrete selection: pairs in selection order, plus the achieved total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub question_order: Vec<QuestionOrder>,
    pub total_score: u64,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.question_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_order.is_empty()
    }

    pub fn question_ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.question_order.iter().map(|q| q.question_id)
    }

    /// Pairs sorted by presentation order (the layout of the finished test).
    pub fn in_presentation_order(&self) -> Vec<QuestionOrder> {
        let mut v = self.question_order.clone();
        v.sort_by_key(|q| q.question_order);
        v
    }
}
