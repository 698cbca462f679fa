// crates/tb_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pool feasibility and question selection. Pure functions of their inputs;
//! the selector's randomness is an explicit `SelectRng` parameter.

use serde::{Serialize, Serializer};
use tb_core::pool::{QuestionPool, Selection, SelectionRequest};
use tb_core::rng::SelectRng;

pub mod feasibility;
pub mod manual;
pub mod response;
pub mod selector;

pub use feasibility::{validate_questions_pool, Feasible, PoolDiagnostic};
pub use manual::{assemble_manual, ManualError};
pub use response::{Response, Status};
pub use selector::{select_questions, select_with_config, SelectionError, SelectorConfig};

/// Result of validating then selecting from one pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated { feasible: Feasible, selection: Selection },
    Infeasible(PoolDiagnostic),
    Failed(SelectionError),
}

impl GenerationOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, GenerationOutcome::Generated { .. })
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            GenerationOutcome::Generated { selection, .. } => Some(selection),
            _ => None,
        }
    }

    pub fn to_response(&self) -> Response {
        match self {
            GenerationOutcome::Generated { feasible, selection } => {
                Response::success(selection, Some(feasible.total_questions_in_pool))
            }
            GenerationOutcome::Infeasible(d) => Response::from_diagnostic(d),
            GenerationOutcome::Failed(e) => Response::from_selection_error(e),
        }
    }
}

impl Serialize for GenerationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_response().serialize(serializer)
    }
}

/// Validator first; the selector only runs on a feasible pool.
pub fn generate(
    pool: &QuestionPool,
    request: &SelectionRequest,
    config: &SelectorConfig,
    rng: &mut SelectRng,
) -> GenerationOutcome {
    let feasible = match validate_questions_pool(
        pool,
        request.num_questions(),
        request.test_max_points(),
    ) {
        Ok(f) => f,
        Err(d) => {
            tracing::debug!(code = d.code(), "pool infeasible");
            return GenerationOutcome::Infeasible(d);
        }
    };
    match select_with_config(pool, request, config, rng) {
        Ok(selection) => GenerationOutcome::Generated { feasible, selection },
        Err(e) => GenerationOutcome::Failed(e),
    }
}
