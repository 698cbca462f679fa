//! variables.rs
//! Request parameters (the request document) with safe defaults and domain checks.
//!
//! Two modes share one shape:
//! - random: `num_questions` + `test_max_points` (+ `filter`), sampled by the selector;
//! - manual: `manual` lists question ids in presentation order; `test_max_points`
//!   is then an optional cap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bank::QuestionFilter;
use crate::errors::RequestError;
use crate::ids::QuestionId;
use crate::pool::SelectionRequest;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;
pub const DEFAULT_DRAW_FACTOR: u32 = 8;
const MAX_ATTEMPTS_CEILING: u32 = 1_000_000;
const DRAW_FACTOR_CEILING: u32 = 1024;
const TITLE_MAX_LEN: usize = 200;

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_draw_factor() -> u32 {
    DEFAULT_DRAW_FACTOR
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_questions: Option<u32>,
    #[serde(default, alias = "max_points", skip_serializing_if = "Option::is_none")]
    pub test_max_points: Option<u32>,
    /// Selector RNG seed; absent means "draw one" (recorded with the test).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Inner draw cap per attempt = `draw_factor` × pool size.
    #[serde(default = "default_draw_factor")]
    pub draw_factor: u32,
    #[serde(default)]
    pub filter: QuestionFilter,
    /// Manual selection, in presentation order. Empty means random mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual: Vec<QuestionId>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            title: None,
            num_questions: None,
            test_max_points: None,
            seed: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            draw_factor: DEFAULT_DRAW_FACTOR,
            filter: QuestionFilter::default(),
            manual: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarsError {
    #[error("domain: {0}")]
    Domain(String),
    #[error("consistency: {0}")]
    Consistency(String),
}

pub type VarsResult<T> = Result<T, VarsError>;

impl Params {
    pub fn is_manual(&self) -> bool {
        !self.manual.is_empty()
    }

    /// Validate numeric/string domains and cross-field consistency.
    pub fn validate_domains(&self) -> VarsResult<()> {
        if !(1..=MAX_ATTEMPTS_CEILING).contains(&self.max_attempts) {
            return Err(VarsError::Domain(format!(
                "max_attempts must be in 1..={MAX_ATTEMPTS_CEILING}, got {}",
                self.max_attempts
            )));
        }
        if !(1..=DRAW_FACTOR_CEILING).contains(&self.draw_factor) {
            return Err(VarsError::Domain(format!(
                "draw_factor must be in 1..={DRAW_FACTOR_CEILING}, got {}",
                self.draw_factor
            )));
        }
        if let Some(t) = &self.title {
            if t.trim().is_empty() || t.len() > TITLE_MAX_LEN {
                return Err(VarsError::Domain(format!(
                    "title must be non-blank and at most {TITLE_MAX_LEN} bytes"
                )));
            }
        }
        if self.test_max_points == Some(0) {
            return Err(VarsError::Domain("test_max_points must be at least 1".into()));
        }

        // --- Cross-field consistency ---

        if self.is_manual() {
            if let Some(n) = self.num_questions {
                if n as usize != self.manual.len() {
                    return Err(VarsError::Consistency(format!(
                        "num_questions={n} but {} manual ids given",
                        self.manual.len()
                    )));
                }
            }
            if self.seed.is_some() {
                return Err(VarsError::Consistency(
                    "seed provided for a manual selection".into(),
                ));
            }
        } else {
            match self.num_questions {
                None => return Err(VarsError::Domain("num_questions is required".into())),
                Some(0) => return Err(VarsError::Domain("num_questions must be at least 1".into())),
                Some(_) => {}
            }
            if self.test_max_points.is_none() {
                return Err(VarsError::Domain("test_max_points is required".into()));
            }
        }
        Ok(())
    }

    /// Selection targets for random mode.
    pub fn request(&self) -> Result<SelectionRequest, RequestError> {
        let n = self.num_questions.unwrap_or(0) as usize;
        let max = self.test_max_points.unwrap_or(0);
        SelectionRequest::new(n, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_from_minimal_json() {
        let p: Params = serde_json::from_str(r#"{"num_questions":2,"max_points":10}"#).unwrap();
        assert_eq!(p.num_questions, Some(2));
        assert_eq!(p.test_max_points, Some(10));
        assert_eq!(p.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(p.draw_factor, DEFAULT_DRAW_FACTOR);
        assert!(p.filter.is_unconstrained());
        assert!(p.validate_domains().is_ok());
        assert_eq!(p.request().unwrap().num_questions(), 2);
    }

    #[test]
    fn random_mode_requires_targets() {
        let p = Params { num_questions: Some(3), ..Default::default() };
        assert!(matches!(p.validate_domains(), Err(VarsError::Domain(_))));
        let p = Params { test_max_points: Some(3), ..Default::default() };
        assert!(matches!(p.validate_domains(), Err(VarsError::Domain(_))));
    }

    #[test]
    fn attempt_and_draw_bounds() {
        let base = Params { num_questions: Some(1), test_max_points: Some(1), ..Default::default() };
        assert!(Params { max_attempts: 0, ..base.clone() }.validate_domains().is_err());
        assert!(Params { draw_factor: 0, ..base.clone() }.validate_domains().is_err());
        assert!(Params { draw_factor: 2048, ..base.clone() }.validate_domains().is_err());
        assert!(base.validate_domains().is_ok());
    }

    #[test]
    fn manual_mode_consistency() {
        let ids = vec![QuestionId::new(1), QuestionId::new(2)];
        let ok = Params { manual: ids.clone(), ..Default::default() };
        assert!(ok.validate_domains().is_ok());

        let bad_count = Params { manual: ids.clone(), num_questions: Some(3), ..Default::default() };
        assert!(matches!(bad_count.validate_domains(), Err(VarsError::Consistency(_))));

        let seeded = Params { manual: ids, seed: Some(1), ..Default::default() };
        assert!(matches!(seeded.validate_domains(), Err(VarsError::Consistency(_))));
    }
}
