//! Loader: read local JSON inputs (question bank, pre-bucketed pool, request
//! document) with a size cap and decode into `tb_core` types. No network I/O.
//! The request's domain checks run after flag overrides are merged.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use tb_core::bank::QuestionBank;
use tb_core::pool::QuestionPool;
use tb_core::variables::Params;

use crate::IoError;

pub const MAX_BANK_BYTES: u64 = 64 * 1024 * 1024;
pub const MAX_REQUEST_BYTES: u64 = 1024 * 1024;

/// Read at most `limit` bytes of `path`; a longer file is an error.
pub fn read_with_limit(path: &Path, limit: u64) -> Result<Vec<u8>, IoError> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    let mut buf = Vec::new();
    f.take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    if buf.len() as u64 > limit {
        return Err(IoError::TooLarge { origin: path.display().to_string(), limit });
    }
    Ok(buf)
}

fn decode<T: DeserializeOwned>(bytes: &[u8], origin: &str) -> Result<T, IoError> {
    serde_json::from_slice(bytes).map_err(|e| IoError::Json {
        origin: origin.to_string(),
        msg: e.to_string(),
    })
}

/// Question bank: a JSON array of question records with unique ids.
pub fn load_bank(path: &Path) -> Result<QuestionBank, IoError> {
    let bytes = read_with_limit(path, MAX_BANK_BYTES)?;
    let bank: QuestionBank = decode(&bytes, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), questions = bank.len(), "bank loaded");
    Ok(bank)
}

/// Pre-bucketed pool: `{"<points>": [question_id, ...], ...}`.
pub fn load_pool(path: &Path) -> Result<QuestionPool, IoError> {
    let bytes = read_with_limit(path, MAX_BANK_BYTES)?;
    let pool: QuestionPool = decode(&bytes, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), questions = pool.len(), buckets = pool.bucket_count(), "pool loaded");
    Ok(pool)
}

/// Request document as written; callers validate after merging overrides.
pub fn read_params(path: &Path) -> Result<Params, IoError> {
    let bytes = read_with_limit(path, MAX_REQUEST_BYTES)?;
    decode(&bytes, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tb_core::ids::QuestionId;

    const BANK: &str = r#"[
        {"question_id": 1, "max_points": 5, "blooms_level": "Remember", "subject": "Math",
         "topic": "Algebra", "question_type": "mcq", "difficulty": 1},
        {"question_id": 2, "max_points": 3, "blooms_level": "Apply", "subject": "Math",
         "topic": "Geometry", "question_type": "essay", "difficulty": 3, "training_level": true,
         "text": "Prove the triangle inequality."}
    ]"#;

    #[test]
    fn loads_bank_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bank.json");
        fs::write(&p, BANK).unwrap();
        let bank = load_bank(&p).unwrap();
        assert_eq!(bank.len(), 2);
        assert!(bank.get(QuestionId::new(2)).unwrap().training_level);
    }

    #[test]
    fn duplicate_ids_are_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bank.json");
        let dup = BANK.replace("\"question_id\": 2", "\"question_id\": 1");
        fs::write(&p, dup).unwrap();
        assert!(matches!(load_bank(&p), Err(IoError::Json { .. })));
    }

    #[test]
    fn loads_pool_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pool.json");
        fs::write(&p, r#"{"3": [1, 2], "8": [3, 4]}"#).unwrap();
        let pool = load_pool(&p).unwrap();
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.total_max_points(), 22);
    }

    #[test]
    fn request_is_read_as_written() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("req.json");
        fs::write(&p, r#"{"num_questions": 2, "max_points": 10, "seed": 7}"#).unwrap();
        let params = read_params(&p).unwrap();
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.test_max_points, Some(10));

        fs::write(&p, r#"{"num_questions": "two"}"#).unwrap();
        assert!(matches!(read_params(&p), Err(IoError::Json { .. })));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("big.json");
        fs::write(&p, vec![b' '; 32]).unwrap();
        assert!(matches!(read_with_limit(&p, 16), Err(IoError::TooLarge { limit: 16, .. })));
        assert_eq!(read_with_limit(&p, 32).unwrap().len(), 32);
    }

    #[test]
    fn missing_file_is_a_path_error() {
        let err = load_bank(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, IoError::Path(_)));
    }
}
