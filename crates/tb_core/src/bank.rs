//! crates/tb_core/src/bank.rs
//! Question bank records, creation options, and the pool filter.
//!
//! String criteria compare after trimming surrounding whitespace. Within one
//! criterion the listed values are alternatives; how criteria combine is set by
//! `MatchMode`. An empty criterion never constrains.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::PoolError;
use crate::ids::QuestionId;
use crate::pool::QuestionPool;

/// One question row as seen by the selection engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub max_points: u32,
    pub blooms_level: String,
    pub subject: String,
    pub topic: String,
    pub question_type: String,
    pub difficulty: u8,
    #[serde(default)]
    pub training_level: bool,
    #[serde(default)]
    pub text: String,
}

/// All questions, unique by id, in catalogue order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct QuestionBank {
    questions: Vec<Question>,
    index: BTreeMap<QuestionId, usize>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, PoolError> {
        let mut index = BTreeMap::new();
        for (i, q) in questions.iter().enumerate() {
            if index.insert(q.question_id, i).is_some() {
                return Err(PoolError::DuplicateQuestion(q.question_id));
            }
        }
        Ok(Self { questions, index })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.index.get(&id).map(|&i| &self.questions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> + '_ {
        self.questions.iter()
    }

    /// Bucket every question that passes `filter`, in catalogue order.
    pub fn pool(&self, filter: &QuestionFilter) -> Result<QuestionPool, PoolError> {
        let mut pool = QuestionPool::new();
        for q in self.questions.iter().filter(|q| filter.matches(q)) {
            pool.insert(q.question_id, q.max_points)?;
        }
        Ok(pool)
    }

    /// Distinct values offered on the test-creation form.
    pub fn creation_options(&self) -> CreationOptions {
        let mut blooms = BTreeSet::new();
        let mut subjects = BTreeSet::new();
        let mut topics = BTreeSet::new();
        let mut types = BTreeSet::new();
        let mut difficulties = BTreeSet::new();
        for q in &self.questions {
            blooms.insert(q.blooms_level.trim().to_string());
            subjects.insert(q.subject.trim().to_string());
            topics.insert(q.topic.trim().to_string());
            types.insert(q.question_type.trim().to_string());
            difficulties.insert(q.difficulty);
        }
        CreationOptions {
            blooms_levels: blooms.into_iter().collect(),
            subjects: subjects.into_iter().collect(),
            topics: topics.into_iter().collect(),
            question_types: types.into_iter().collect(),
            question_difficulty: difficulties.into_iter().collect(),
        }
    }
}

impl TryFrom<Vec<Question>> for QuestionBank {
    type Error = PoolError;
    fn try_from(v: Vec<Question>) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl From<QuestionBank> for Vec<Question> {
    fn from(b: QuestionBank) -> Self {
        b.questions
    }
}

/// Sorted, de-duplicated option lists for the creation form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationOptions {
    pub blooms_levels: Vec<String>,
    pub subjects: Vec<String>,
    pub topics: Vec<String>,
    pub question_types: Vec<String>,
    pub question_difficulty: Vec<u8>,
}

/// How supplied criteria combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every supplied criterion must match.
    #[default]
    All,
    /// At least one supplied criterion must match.
    Any,
}

/// Filter criteria for building a pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionFilter {
    pub blooms_levels: Vec<String>,
    pub subjects: Vec<String>,
    pub topics: Vec<String>,
    pub question_types: Vec<String>,
    pub question_difficulties: Vec<u8>,
    pub training_level: Option<bool>,
    pub keyword: Option<String>,
    pub match_mode: MatchMode,
}

fn in_list(list: &[String], value: &str) -> bool {
    let v = value.trim();
    list.iter().any(|x| x.trim() == v)
}

impl QuestionFilter {
    /// True when no criterion is supplied.
    pub fn is_unconstrained(&self) -> bool {
        self.blooms_levels.is_empty()
            && self.subjects.is_empty()
            && self.topics.is_empty()
            && self.question_types.is_empty()
            && self.question_difficulties.is_empty()
            && self.training_level.is_none()
            && self.keyword().is_none()
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Outcome of each supplied criterion, in a fixed order.
    fn criteria_for(&self, q: &Question) -> Vec<bool> {
        let mut out = Vec::with_capacity(7);
        if !self.blooms_levels.is_empty() {
            out.push(in_list(&self.blooms_levels, &q.blooms_level));
        }
        if !self.subjects.is_empty() {
            out.push(in_list(&self.subjects, &q.subject));
        }
        if !self.topics.is_empty() {
            out.push(in_list(&self.topics, &q.topic));
        }
        if !self.question_types.is_empty() {
            out.push(in_list(&self.question_types, &q.question_type));
        }
        if !self.question_difficulties.is_empty() {
            out.push(self.question_difficulties.contains(&q.difficulty));
        }
        if let Some(flag) = self.training_level {
            out.push(q.training_level == flag);
        }
        if let Some(kw) = self.keyword() {
            out.push(q.text.to_lowercase().contains(&kw.to_lowercase()));
        }
        out
    }

    pub fn matches(&self, q: &Question) -> bool {
        let c = self.criteria_for(q);
        if c.is_empty() {
            return true;
        }
        match self.match_mode {
            MatchMode::All => c.iter().all(|&b| b),
            MatchMode::Any => c.iter().any(|&b| b),
        }
    }
}
