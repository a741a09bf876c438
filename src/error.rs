//! Error taxonomy (§7).
//!
//! Malformed input and precondition violations are recoverable and surfaced
//! through these types. Internal invariant violations (a merge across
//! differing `num_scheduled`, mismatched `core_avail` lengths, an inverted
//! interval) are bugs, not recoverable conditions — those paths
//! `assert!`/`debug_assert!` and panic rather than returning an `Err`.

use crate::jobs::JobId;
use thiserror::Error;

/// Malformed workload, precedence, or abort-action input. Surfaced
/// synchronously to the caller; the engine is never started.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("row {row}: expected at least {expected} fields, found {found}")]
    MissingField { row: usize, expected: usize, found: usize },

    #[error("row {row}: field '{field}' could not be parsed as a number: {source}")]
    NotANumber {
        row: usize,
        field: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("row {row}: negative or inverted interval for field '{field}'")]
    InvertedInterval { row: usize, field: &'static str },

    #[error("row {row}: field '{field}' must not be negative")]
    NegativeValue { row: usize, field: &'static str },

    #[error("row {row}: s_max ({s_max}) must be >= s_min ({s_min})")]
    GangParallelismInverted { row: usize, s_min: u32, s_max: u32 },

    #[error("row {row}: expected {expected} cost interval(s) for s_min={s_min}, s_max={s_max}, found {found}")]
    CostListLengthMismatch {
        row: usize,
        s_min: u32,
        s_max: u32,
        expected: u32,
        found: usize,
    },

    #[error("row {row}: duplicate job id {job}")]
    DuplicateJobId { row: usize, job: JobId },

    #[error("precedence constraint references unknown job {job}")]
    UnresolvedPrecedenceReference { job: JobId },
}

/// Errors an engine run can produce. Distinct from [`InputError`]: by the
/// time an `EngineError` is possible, parsing has already succeeded.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("graph emission was requested together with a multi-threaded run; serialize the run or disable the graph")]
    GraphEmissionRequiresSerialRun,
}
