//! Pool feasibility: can *any* `num_questions` pool entries fit `test_max_points`?
//!
//! Contract:
//! - Step 1 (gross checks): raw count, then a budget floor
//!   (`min point value × num_questions`). A pool whose whole point mass fits the
//!   budget is accepted without building a table.
//! - Step 2 (reachability): boolean table over (questions drawn, points spent).
//!   Each bucket `(p, c)` folds in `q ∈ 1..=min(c, n)` questions at cost `p·q`,
//!   reading only the table settled by earlier buckets, so no bucket is drawn
//!   from twice.
//! - Pure integers; the table is scaled down by the gcd of point values.
//! - A table over the cell cap, or a fold over the work cap, is replaced by the
//!   cheapest-sum rule, which gives the same answer for non-negative points.
//!
//! Determinism:
//! - Buckets fold in ascending point order; the result does not depend on it.

use tb_core::pool::QuestionPool;
use thiserror::Error;
use tracing::{debug, trace};

/// Above this many cells the exact cheapest-sum rule decides instead of the table.
const MAX_TABLE_CELLS: usize = 1 << 26;
/// Same fallback when the fold would touch more than this many cells.
const MAX_TABLE_WORK: u64 = 1 << 30;

/// Why a pool cannot satisfy a request. Messages are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolDiagnostic {
    /// Fewer questions than requested. `total_max_points` is set only when the
    /// whole pool additionally exceeds the budget.
    #[error("{}", insufficient_pool_message(*total_questions_in_pool, total_max_points.is_some()))]
    InsufficientPool {
        total_questions_in_pool: usize,
        requested: usize,
        total_max_points: Option<u64>,
    },

    /// Even the cheapest point value, taken `requested` times, exceeds the budget.
    #[error("The questions in the pool cannot fit within the test maximum points.")]
    InsufficientBudget {
        total_questions_in_pool: usize,
        total_max_points: u64,
        requested: usize,
        test_max_points: u32,
    },

    /// Enough questions exist, but no subset of the requested size fits.
    #[error("No valid combination of questions meets the requested count and point budget.")]
    NoValidCombination {
        total_questions_in_pool: usize,
        requested: usize,
        test_max_points: u32,
    },
}

fn insufficient_pool_message(available: usize, over_budget: bool) -> &'static str {
    match (available, over_budget) {
        (0, _) => "No questions found that meet the selection criteria.",
        (_, false) => "Not enough questions in the pool to meet the requested number of questions.",
        (_, true) => {
            "Not enough questions in the pool, and their combined points exceed the test maximum."
        }
    }
}

impl PoolDiagnostic {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PoolDiagnostic::InsufficientPool { .. } => "INSUFFICIENT_POOL",
            PoolDiagnostic::InsufficientBudget { .. } => "INSUFFICIENT_BUDGET",
            PoolDiagnostic::NoValidCombination { .. } => "NO_VALID_COMBINATION",
        }
    }

    /// Step 1 failures carry the pool count.
    pub fn total_questions_in_pool(&self) -> Option<usize> {
        match self {
            PoolDiagnostic::InsufficientPool { total_questions_in_pool, .. }
            | PoolDiagnostic::InsufficientBudget { total_questions_in_pool, .. } => {
                Some(*total_questions_in_pool)
            }
            PoolDiagnostic::NoValidCombination { .. } => None,
        }
    }

    pub fn total_max_points(&self) -> Option<u64> {
        match self {
            PoolDiagnostic::InsufficientPool { total_max_points, .. } => *total_max_points,
            PoolDiagnostic::InsufficientBudget { total_max_points, .. } => Some(*total_max_points),
            PoolDiagnostic::NoValidCombination { .. } => None,
        }
    }
}

/// Green light from the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feasible {
    pub total_questions_in_pool: usize,
    pub total_max_points: u64,
    /// Smallest total any `num_questions` pool entries can reach.
    pub min_total: u64,
}

/// Decide whether `pool` holds `num_questions` entries summing to at most
/// `test_max_points`. Pure: same inputs, same answer.
pub fn validate_questions_pool(
    pool: &QuestionPool,
    num_questions: usize,
    test_max_points: u32,
) -> Result<Feasible, PoolDiagnostic> {
    let total_available = pool.len();
    let total_max_points = pool.total_max_points();
    let budget = u64::from(test_max_points);

    // 1a) Raw count.
    if total_available < num_questions {
        return Err(PoolDiagnostic::InsufficientPool {
            total_questions_in_pool: total_available,
            requested: num_questions,
            total_max_points: (total_max_points > budget).then_some(total_max_points),
        });
    }

    // 1b) Budget floor: every entry costs at least `min_points`.
    let min_points = u64::from(pool.min_points().unwrap_or(0));
    if min_points.saturating_mul(num_questions as u64) > budget {
        return Err(PoolDiagnostic::InsufficientBudget {
            total_questions_in_pool: total_available,
            total_max_points,
            requested: num_questions,
            test_max_points,
        });
    }

    // 1c) Whole pool fits: any subset does.
    if total_max_points <= budget {
        return Ok(Feasible {
            total_questions_in_pool: total_available,
            total_max_points,
            min_total: pool.cheapest_sum(num_questions).unwrap_or(0),
        });
    }

    // 2) Reachability over (count, points).
    match min_reachable_total(pool, num_questions, test_max_points) {
        Some(min_total) => Ok(Feasible {
            total_questions_in_pool: total_available,
            total_max_points,
            min_total,
        }),
        None => Err(PoolDiagnostic::NoValidCombination {
            total_questions_in_pool: total_available,
            requested: num_questions,
            test_max_points,
        }),
    }
}

/// Smallest reachable total for exactly `n` entries within `budget`, or `None`.
fn min_reachable_total(pool: &QuestionPool, n: usize, budget: u32) -> Option<u64> {
    let g = pool.buckets().fold(0u32, |acc, (p, _)| gcd(acc, p));
    let scale = if g == 0 { 1 } else { g };
    let width = (budget / scale) as usize;

    if !table_fits(pool, n, width, scale) {
        debug!(n, width, "reachability table too large; deciding by cheapest sum");
        return pool.cheapest_sum(n).filter(|&s| s <= u64::from(budget));
    }

    let reachable = reachability_table(pool, n, width, scale);
    let row = n * (width + 1);
    (0..=width)
        .find(|&k| reachable[row + k])
        .map(|k| k as u64 * u64::from(scale))
}

/// Both the table and the fold over it stay within their caps.
fn table_fits(pool: &QuestionPool, n: usize, width: usize, scale: u32) -> bool {
    match (n + 1).checked_mul(width + 1) {
        Some(c) if c <= MAX_TABLE_CELLS => {}
        _ => return false,
    }
    table_work(pool, n, width, scale) <= MAX_TABLE_WORK
}

/// Upper bound on cells the fold visits: per bucket, one table pass for each
/// take count that still fits the budget.
fn table_work(pool: &QuestionPool, n: usize, width: usize, scale: u32) -> u64 {
    let pass = (n as u64 + 1).saturating_mul(width as u64 + 1);
    pool.buckets().fold(0u64, |acc, (points, ids)| {
        let p = (points / scale) as usize;
        let by_budget = if p == 0 { n } else { width / p };
        let takes = ids.len().min(n).min(by_budget) as u64;
        acc.saturating_add(pass.saturating_mul(takes))
    })
}

/// Row-major `(n + 1) × (width + 1)` table; cell `[cnt][k]` is true when some
/// choice of `cnt` entries costs exactly `k` scaled points.
fn reachability_table(pool: &QuestionPool, n: usize, width: usize, scale: u32) -> Vec<bool> {
    let cols = width + 1;
    let mut prev = vec![false; (n + 1) * cols];
    prev[0] = true;

    for (points, ids) in pool.buckets() {
        let p = (points / scale) as usize;
        let max_take = ids.len().min(n);
        // q = 0: everything settled so far stays reachable.
        let mut next = prev.clone();
        for q in 1..=max_take {
            let cost = match p.checked_mul(q) {
                Some(c) if c <= width => c,
                _ => break,
            };
            for cnt in q..=n {
                let src = (cnt - q) * cols;
                let dst = cnt * cols;
                for k in cost..=width {
                    if prev[src + k - cost] {
                        next[dst + k] = true;
                    }
                }
            }
        }
        trace!(points, bucket = ids.len(), max_take, "bucket folded");
        prev = next;
    }
    prev
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_core::ids::QuestionId;

    fn pool(groups: &[(u32, &[u64])]) -> QuestionPool {
        QuestionPool::from_buckets(
            groups
                .iter()
                .map(|(p, ids)| (*p, ids.iter().map(|&i| QuestionId::new(i)).collect::<Vec<_>>())),
        )
        .unwrap()
    }

    #[test]
    fn scenario_a_single_bucket_feasible() {
        let p = pool(&[(5, &[1, 2, 3])]);
        let ok = validate_questions_pool(&p, 2, 10).unwrap();
        assert_eq!(ok.total_questions_in_pool, 3);
        assert_eq!(ok.total_max_points, 15);
        assert_eq!(ok.min_total, 10);
    }

    #[test]
    fn scenario_b_too_few_questions() {
        let p = pool(&[(5, &[1])]);
        let err = validate_questions_pool(&p, 2, 10).unwrap_err();
        assert_eq!(
            err,
            PoolDiagnostic::InsufficientPool {
                total_questions_in_pool: 1,
                requested: 2,
                total_max_points: None
            }
        );
        assert_eq!(err.code(), "INSUFFICIENT_POOL");
        assert_eq!(err.total_questions_in_pool(), Some(1));
        assert_eq!(err.total_max_points(), None);
    }

    #[test]
    fn too_few_and_over_budget_reports_both() {
        let p = pool(&[(20, &[1])]);
        let err = validate_questions_pool(&p, 2, 10).unwrap_err();
        assert_eq!(err.total_questions_in_pool(), Some(1));
        assert_eq!(err.total_max_points(), Some(20));
        assert!(err.to_string().contains("combined points exceed"));
    }

    #[test]
    fn scenario_c_budget_floor_reports_both_totals() {
        let p = pool(&[(20, &[1, 2])]);
        let err = validate_questions_pool(&p, 2, 10).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_BUDGET");
        assert_eq!(err.total_questions_in_pool(), Some(2));
        assert_eq!(err.total_max_points(), Some(40));
    }

    #[test]
    fn scenario_d_decided_by_reachability() {
        // Step 1 passes (4 ≥ 2, 3·2 ≤ 10, 22 > 10); only 3+3 fits.
        let p = pool(&[(3, &[1, 2]), (8, &[3, 4])]);
        let ok = validate_questions_pool(&p, 2, 10).unwrap();
        assert_eq!(ok.min_total, 6);
        assert_eq!(ok.total_max_points, 22);
    }

    #[test]
    fn reachability_rejects_when_bucket_supply_is_short() {
        // One 3-pointer only: 3+8 = 11 and 8+8 = 16 both exceed 10.
        let p = pool(&[(3, &[1]), (8, &[2, 3])]);
        let err = validate_questions_pool(&p, 2, 10).unwrap_err();
        assert_eq!(
            err,
            PoolDiagnostic::NoValidCombination {
                total_questions_in_pool: 3,
                requested: 2,
                test_max_points: 10
            }
        );
        assert_eq!(err.code(), "NO_VALID_COMBINATION");
    }

    #[test]
    fn empty_pool_message() {
        let err = validate_questions_pool(&QuestionPool::new(), 1, 10).unwrap_err();
        assert_eq!(err.to_string(), "No questions found that meet the selection criteria.");
    }

    #[test]
    fn zero_point_questions_are_free() {
        let p = pool(&[(0, &[1, 2]), (7, &[3])]);
        let ok = validate_questions_pool(&p, 3, 7).unwrap();
        assert_eq!(ok.min_total, 7);
        assert!(validate_questions_pool(&p, 3, 6).is_err());
    }

    #[test]
    fn gcd_scaling_keeps_exact_budget_edge() {
        let p = pool(&[(10, &[1, 2]), (30, &[3, 4])]);
        assert_eq!(validate_questions_pool(&p, 3, 50).unwrap().min_total, 50);
        assert!(validate_questions_pool(&p, 3, 49).is_err());
    }

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<QuestionId> {
        range.map(QuestionId::new).collect()
    }

    #[test]
    fn wide_budget_decides_by_cheapest_sum() {
        // gcd 1 and a budget near ten million: far more cells than the table allows.
        let p = QuestionPool::from_buckets([(1, ids(1..=5)), (9_000_000, ids(6..=12))]).unwrap();
        let budget = 10_000_000;
        assert!(!table_fits(&p, 6, budget as usize, 1));

        let ok = validate_questions_pool(&p, 6, budget).unwrap();
        assert_eq!(ok.min_total, 9_000_005);
        assert_eq!(Some(ok.min_total), p.cheapest_sum(6));

        // cheapest ten = 5 + 5 x 9_000_000, over budget; the floor 1 x 10 passes.
        assert!(p.cheapest_sum(10).unwrap() > u64::from(budget));
        let err = validate_questions_pool(&p, 10, budget).unwrap_err();
        assert_eq!(err.code(), "NO_VALID_COMBINATION");
    }

    #[test]
    fn heavy_fold_decides_by_cheapest_sum() {
        // The table is under the cell cap but the fold is not under the work cap.
        let p = QuestionPool::from_buckets([(5, ids(1..=2000)), (7, ids(2001..=4000))]).unwrap();
        let (n, budget) = (3000, 20_000u32);
        assert!((n + 1) * (budget as usize + 1) <= MAX_TABLE_CELLS);
        assert!(table_work(&p, n, budget as usize, 1) > MAX_TABLE_WORK);

        // 2000 x 5 + 1000 x 7
        let ok = validate_questions_pool(&p, n, budget).unwrap();
        assert_eq!(ok.min_total, 17_000);
        assert!(validate_questions_pool(&p, n, 16_999).is_err());
    }

    #[test]
    fn small_tables_are_folded() {
        let p = pool(&[(3, &[1, 2]), (8, &[3, 4])]);
        assert!(table_fits(&p, 2, 10, 1));
        assert_eq!(table_work(&p, 2, 10, 1), 3 * 11 * 2 + 3 * 11);
    }

    #[test]
    fn repeated_calls_agree() {
        let p = pool(&[(3, &[1, 2]), (8, &[3, 4]), (2, &[5])]);
        let a = validate_questions_pool(&p, 3, 9);
        let b = validate_questions_pool(&p, 3, 9);
        assert_eq!(a, b);
    }
}
