//! crates/tb_core/src/ids.rs
//! Question ids (database keys) and generated-test ids (`TST:` + 64-hex).
//! Deterministic, ASCII-only, strict shapes; no I/O.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

const HEX64_LEN: usize = 64;

/// Lowercase hex (length must be exactly 64).
#[inline]
pub fn is_valid_sha256(s: &str) -> bool {
    s.len() == HEX64_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Primary key of a question row. Serialized as a bare integer.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for QuestionId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts `42` or the display form `Q42`.
impl FromStr for QuestionId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('Q').or_else(|| s.strip_prefix('q')).unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidQuestionId);
        }
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidQuestionId)
    }
}

/// "TST:" + 64-hex (lowercase); derived from the canonical bytes of a selection.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestId(String);

impl TestId {
    /// Build from a digest; fails unless `hex64` is lowercase 64-hex.
    pub fn from_digest(hex64: &str) -> Result<Self, CoreError> {
        if is_valid_sha256(hex64) {
            Ok(Self(format!("TST:{hex64}")))
        } else {
            Err(CoreError::InvalidHex)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digest part (without the `TST:` prefix).
    pub fn digest(&self) -> &str {
        &self.0[4..]
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TestId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("TST:").ok_or(CoreError::InvalidTestId)?;
        if is_valid_sha256(rest) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::InvalidTestId)
        }
    }
}

impl TryFrom<String> for TestId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TestId> for String {
    fn from(id: TestId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_parses_plain_and_prefixed() {
        assert_eq!("42".parse::<QuestionId>().unwrap(), QuestionId::new(42));
        assert_eq!("Q7".parse::<QuestionId>().unwrap(), QuestionId::new(7));
        assert!("".parse::<QuestionId>().is_err());
        assert!("Q".parse::<QuestionId>().is_err());
        assert!("-3".parse::<QuestionId>().is_err());
        assert!("12a".parse::<QuestionId>().is_err());
    }

    #[test]
    fn test_id_shape_is_strict() {
        let hex = "a".repeat(64);
        let id = TestId::from_digest(&hex).unwrap();
        assert_eq!(id.as_str(), format!("TST:{hex}"));
        assert_eq!(id.digest(), hex);
        assert_eq!(id.as_str().parse::<TestId>().unwrap(), id);

        assert!(TestId::from_digest(&"A".repeat(64)).is_err());
        assert!("TST:abc".parse::<TestId>().is_err());
        assert!(format!("RES:{hex}").parse::<TestId>().is_err());
    }

    #[test]
    fn question_id_serializes_as_integer() {
        let s = serde_json::to_string(&QuestionId::new(9)).unwrap();
        assert_eq!(s, "9");
    }
}
