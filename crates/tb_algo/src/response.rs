//! JSON response shapes returned to the caller of a generation request.

use serde::{Deserialize, Serialize};
use tb_core::pool::{QuestionOrder, Selection};

use crate::feasibility::{Feasible, PoolDiagnostic};
use crate::manual::ManualError;
use crate::selector::SelectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions_in_pool: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_max_points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_order: Option<Vec<QuestionOrder>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u64>,
}

impl Response {
    fn error(code: &str, message: String) -> Self {
        Self {
            status: Status::Error,
            error_code: Some(code.to_string()),
            message: Some(message),
            total_questions_in_pool: None,
            total_max_points: None,
            question_order: None,
            total_score: None,
        }
    }

    pub fn success(selection: &Selection, total_questions_in_pool: Option<usize>) -> Self {
        Self {
            status: Status::Success,
            error_code: None,
            message: None,
            total_questions_in_pool,
            total_max_points: None,
            question_order: Some(selection.question_order.clone()),
            total_score: Some(selection.total_score),
        }
    }

    /// Validator green light without a selection.
    pub fn feasible(f: &Feasible) -> Self {
        Self {
            status: Status::Success,
            error_code: None,
            message: None,
            total_questions_in_pool: Some(f.total_questions_in_pool),
            total_max_points: Some(f.total_max_points),
            question_order: None,
            total_score: None,
        }
    }

    pub fn from_diagnostic(d: &PoolDiagnostic) -> Self {
        Self {
            total_questions_in_pool: d.total_questions_in_pool(),
            total_max_points: d.total_max_points(),
            ..Self::error(d.code(), d.to_string())
        }
    }

    pub fn from_selection_error(e: &SelectionError) -> Self {
        Self::error(e.code(), e.to_string())
    }

    pub fn from_manual_error(e: &ManualError) -> Self {
        Self::error(e.code(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tb_core::ids::QuestionId;

    #[test]
    fn success_shape() {
        let sel = Selection {
            question_order: vec![
                QuestionOrder { question_id: QuestionId::new(1), question_order: 2 },
                QuestionOrder { question_id: QuestionId::new(3), question_order: 1 },
            ],
            total_score: 10,
        };
        let v = serde_json::to_value(Response::success(&sel, None)).unwrap();
        assert_eq!(
            v,
            json!({
                "status": "success",
                "question_order": [
                    {"question_id": 1, "question_order": 2},
                    {"question_id": 3, "question_order": 1}
                ],
                "total_score": 10
            })
        );
    }

    #[test]
    fn pool_failure_carries_counts() {
        let d = PoolDiagnostic::InsufficientBudget {
            total_questions_in_pool: 2,
            total_max_points: 40,
            requested: 2,
            test_max_points: 10,
        };
        let v = serde_json::to_value(Response::from_diagnostic(&d)).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["error_code"], "INSUFFICIENT_BUDGET");
        assert_eq!(v["total_questions_in_pool"], 2);
        assert_eq!(v["total_max_points"], 40);
        assert!(v.get("question_order").is_none());
    }

    #[test]
    fn no_valid_combination_has_no_counts() {
        let d = PoolDiagnostic::NoValidCombination {
            total_questions_in_pool: 3,
            requested: 2,
            test_max_points: 10,
        };
        let v = serde_json::to_value(Response::from_diagnostic(&d)).unwrap();
        assert_eq!(v["error_code"], "NO_VALID_COMBINATION");
        assert!(v.get("total_questions_in_pool").is_none());
        assert!(v.get("total_max_points").is_none());
    }

    #[test]
    fn exhaustion_message() {
        let r = Response::from_selection_error(&SelectionError::Exhausted { attempts: 1000 });
        assert_eq!(r.status, Status::Error);
        assert_eq!(r.error_code.as_deref(), Some("SELECTION_EXHAUSTED"));
        assert_eq!(r.message.as_deref(), Some("Unable to select questions within constraints."));
    }
}
