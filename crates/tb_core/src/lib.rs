//! tb_core: core types, domains, and seeded RNG for the test-bank engine.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! workspace (`tb_algo`, `tb_io`, `tb_pipeline`, `tb_cli`):
//!
//! - Question ids (`QuestionId`) and test record ids (`TestId`, `TST:`)
//! - The bucketed `QuestionPool` (point value → question ids)
//! - Selection request/result shapes (`SelectionRequest`, `Selection`, `QuestionOrder`)
//! - The question bank and its filter (`bank`)
//! - Request parameters with defaults and domain checks (`variables`)
//! - ChaCha20-backed `SelectRng` (explicit seed; optional OS entropy)

#![forbid(unsafe_code)]

pub mod bank;
pub mod errors;
pub mod ids;
pub mod pool;
pub mod rng;
pub mod variables;

pub use errors::{CoreError, PoolError, RequestError};
pub use ids::{QuestionId, TestId};
pub use pool::{Candidate, QuestionOrder, QuestionPool, Selection, SelectionRequest};
pub use rng::SelectRng;
