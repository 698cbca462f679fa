//! Constructive selector: randomized sampling without replacement, bounded retries.
//!
//! Contract:
//! - Flatten the pool (ascending points, bucket order kept) and draw uniform
//!   indices. An index already taken in this attempt is skipped; a candidate is
//!   taken only if it keeps the running total within budget.
//! - Outer loop: at most `max_attempts`. Inner loop: at most
//!   `draw_factor × pool size` draws (never fewer than `num_questions`), and it
//!   stops early once the remaining budget is below the cheapest point value.
//! - On success, presentation orders are a uniform permutation of `1..=n`,
//!   independent of the selection order.
//!
//! The search is not complete: it can miss a narrow feasible region, in which
//! case it reports `SelectionError::Exhausted`. A fresh run may succeed.

use tb_core::errors::RequestError;
use tb_core::pool::{QuestionOrder, QuestionPool, Selection, SelectionRequest};
use tb_core::rng::SelectRng;
use tb_core::variables::{Params, DEFAULT_DRAW_FACTOR, DEFAULT_MAX_ATTEMPTS};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Loop bounds for the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorConfig {
    pub max_attempts: u32,
    pub draw_factor: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            draw_factor: DEFAULT_DRAW_FACTOR,
        }
    }
}

impl SelectorConfig {
    pub fn from_params(params: &Params) -> Self {
        Self {
            max_attempts: params.max_attempts,
            draw_factor: params.draw_factor,
        }
    }

    fn check(&self) -> Result<(), SelectionError> {
        if self.max_attempts == 0 {
            return Err(SelectionError::InvalidConfig("max_attempts must be at least 1"));
        }
        if self.draw_factor == 0 {
            return Err(SelectionError::InvalidConfig("draw_factor must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Every attempt ended short of `num_questions`.
    #[error("Unable to select questions within constraints.")]
    Exhausted { attempts: u32 },
    #[error("invalid selector configuration: {0}")]
    InvalidConfig(&'static str),
    /// Zero targets; retrying cannot help.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
}

impl SelectionError {
    pub fn code(&self) -> &'static str {
        match self {
            SelectionError::Exhausted { .. } => "SELECTION_EXHAUSTED",
            SelectionError::InvalidConfig(_) => "INVALID_CONFIG",
            SelectionError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

/// Select with the default loop bounds.
pub fn select_questions(
    pool: &QuestionPool,
    num_questions: usize,
    test_max_points: u32,
    rng: &mut SelectRng,
) -> Result<Selection, SelectionError> {
    let request = SelectionRequest::new(num_questions, test_max_points)?;
    select_with_config(pool, &request, &SelectorConfig::default(), rng)
}

/// Build one selection of exactly `request.num_questions()` distinct pool
/// entries whose total stays within `request.test_max_points()`.
pub fn select_with_config(
    pool: &QuestionPool,
    request: &SelectionRequest,
    config: &SelectorConfig,
    rng: &mut SelectRng,
) -> Result<Selection, SelectionError> {
    config.check()?;

    let n = request.num_questions();
    let budget = u64::from(request.test_max_points());
    let candidates = pool.flatten();

    if candidates.len() < n {
        debug!(available = candidates.len(), requested = n, "pool smaller than request");
        return Err(SelectionError::Exhausted { attempts: 0 });
    }

    let min_points = u64::from(pool.min_points().unwrap_or(0));
    let max_draws = (candidates.len() as u64)
        .saturating_mul(u64::from(config.draw_factor))
        .max(n as u64);

    let mut used = vec![false; candidates.len()];
    let mut picked: Vec<usize> = Vec::with_capacity(n);

    for attempt in 1..=config.max_attempts {
        used.iter_mut().for_each(|u| *u = false);
        picked.clear();
        let mut total = 0u64;
        let mut draws = 0u64;

        while picked.len() < n && draws < max_draws {
            // total <= budget holds throughout
            if budget - total < min_points {
                break;
            }
            draws += 1;
            let Some(i) = rng.choose_index(candidates.len()) else {
                break;
            };
            if used[i] {
                continue;
            }
            let points = u64::from(candidates[i].points);
            if total + points <= budget {
                used[i] = true;
                picked.push(i);
                total += points;
            }
        }

        if picked.len() == n {
            let orders = rng.permutation_1_based(n);
            let question_order = picked
                .iter()
                .zip(orders)
                .map(|(&i, question_order)| QuestionOrder {
                    question_id: candidates[i].question_id,
                    question_order,
                })
                .collect();
            debug!(attempt, draws, total, "selection found");
            return Ok(Selection { question_order, total_score: total });
        }
        trace!(attempt, draws, accepted = picked.len(), total, "attempt abandoned");
    }

    warn!(
        attempts = config.max_attempts,
        requested = n,
        budget,
        "unable to select questions within constraints"
    );
    Err(SelectionError::Exhausted { attempts: config.max_attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tb_core::ids::QuestionId;

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<QuestionId> {
        range.map(QuestionId::new).collect()
    }

    fn assert_valid(sel: &Selection, pool: &QuestionPool, n: usize, budget: u32) {
        assert_eq!(sel.len(), n);
        let distinct: BTreeSet<_> = sel.question_ids().collect();
        assert_eq!(distinct.len(), n);
        let mut total = 0u64;
        for id in sel.question_ids() {
            total += u64::from(pool.points_of(id).expect("selected id must come from the pool"));
        }
        assert_eq!(total, sel.total_score);
        assert!(sel.total_score <= u64::from(budget));
        let mut orders: Vec<u32> = sel.question_order.iter().map(|q| q.question_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, (1..=n as u32).collect::<Vec<_>>());
    }

    #[test]
    fn scenario_a_picks_two_of_three() {
        let pool = QuestionPool::from_buckets([(5, ids(1..=3))]).unwrap();
        let mut rng = SelectRng::from_seed_u64(1);
        let sel = select_questions(&pool, 2, 10, &mut rng).unwrap();
        assert_valid(&sel, &pool, 2, 10);
        assert_eq!(sel.total_score, 10);
    }

    #[test]
    fn scenario_d_finds_the_narrow_combination() {
        let pool = QuestionPool::from_buckets([(3, ids(1..=2)), (8, ids(3..=4))]).unwrap();
        for seed in 0..20 {
            let mut rng = SelectRng::from_seed_u64(seed);
            let sel = select_questions(&pool, 2, 10, &mut rng).unwrap();
            assert_valid(&sel, &pool, 2, 10);
            let chosen: BTreeSet<u64> = sel.question_ids().map(QuestionId::get).collect();
            assert_eq!(chosen, BTreeSet::from([1, 2]));
        }
    }

    #[test]
    fn same_seed_same_selection() {
        let pool = QuestionPool::from_buckets([(2, ids(1..=10)), (5, ids(11..=20))]).unwrap();
        let a = select_questions(&pool, 6, 20, &mut SelectRng::from_seed_u64(99)).unwrap();
        let b = select_questions(&pool, 6, 20, &mut SelectRng::from_seed_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn whole_pool_request_takes_everything() {
        let pool = QuestionPool::from_buckets([(1, ids(1..=4)), (2, ids(5..=6))]).unwrap();
        let sel = select_questions(&pool, 6, 8, &mut SelectRng::from_seed_u64(3)).unwrap();
        assert_valid(&sel, &pool, 6, 8);
        assert_eq!(sel.total_score, 8);
    }

    #[test]
    fn exhausts_when_almost_every_path_fails() {
        // Only {1, 2} (1 + 1) fits a budget of 2; taking any 2-pointer first
        // spends the whole budget. Success odds per attempt ≈ 2 / 100_002.
        let mut groups = vec![(1u32, ids(1..=2))];
        groups.push((2, ids(3..=100_002)));
        let pool = QuestionPool::from_buckets(groups).unwrap();
        assert!(crate::feasibility::validate_questions_pool(&pool, 2, 2).is_ok());

        let request = SelectionRequest::new(2, 2).unwrap();
        let config = SelectorConfig { max_attempts: 5, draw_factor: 8 };
        let err = select_with_config(&pool, &request, &config, &mut SelectRng::from_seed_u64(11))
            .unwrap_err();
        assert_eq!(err, SelectionError::Exhausted { attempts: 5 });
        assert_eq!(err.code(), "SELECTION_EXHAUSTED");
        assert_eq!(err.to_string(), "Unable to select questions within constraints.");
    }

    #[test]
    fn undersized_pool_fails_without_drawing() {
        let pool = QuestionPool::from_buckets([(5, ids(1..=1))]).unwrap();
        let mut rng = SelectRng::from_seed_u64(5);
        let err = select_questions(&pool, 2, 10, &mut rng).unwrap_err();
        assert_eq!(err, SelectionError::Exhausted { attempts: 0 });
        assert_eq!(rng.words_consumed(), 0);
    }

    #[test]
    fn rejects_zero_bounds() {
        let pool = QuestionPool::from_buckets([(5, ids(1..=3))]).unwrap();
        let request = SelectionRequest::new(1, 5).unwrap();
        let config = SelectorConfig { max_attempts: 0, draw_factor: 8 };
        let err = select_with_config(&pool, &request, &config, &mut SelectRng::from_seed_u64(0));
        assert!(matches!(err, Err(SelectionError::InvalidConfig(_))));
    }

    #[test]
    fn zero_targets_are_invalid_not_exhausted() {
        let pool = QuestionPool::from_buckets([(5, ids(1..=3))]).unwrap();
        let mut rng = SelectRng::from_seed_u64(1);

        let err = select_questions(&pool, 0, 10, &mut rng).unwrap_err();
        assert_eq!(err, SelectionError::InvalidRequest(RequestError::ZeroQuestions));
        assert_eq!(err.code(), "INVALID_REQUEST");

        let err = select_questions(&pool, 1, 0, &mut rng).unwrap_err();
        assert_eq!(err, SelectionError::InvalidRequest(RequestError::ZeroBudget));
        assert_eq!(rng.words_consumed(), 0);
    }
}
