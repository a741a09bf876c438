//! Abort-action CSV parsing (§6): `task, job, trigger_min, trigger_max,
//! cleanup_min, cleanup_max` per row. §6 names this "out of core but
//! referenced for completeness" — this module implements the parser and
//! data record only; nothing in `engine` consumes it.
//!
//! Ported from `original_source/include/io.hpp`'s `parse_abort_action`.

use crate::error::InputError;
use crate::interval::Interval;
use crate::jobs::JobId;

/// A job's abort/cleanup behavior: if still running when `trigger` elapses,
/// the job is aborted and a cleanup of duration `cleanup` runs in its place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbortAction {
    pub job: JobId,
    pub trigger: Interval<i64>,
    pub cleanup: Interval<i64>,
}

fn parse_row(row: usize, line: &str) -> Result<AbortAction, InputError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(InputError::MissingField { row, expected: 6, found: fields.len() });
    }

    let parse_u64 = |idx: usize, name: &'static str| -> Result<u64, InputError> {
        fields[idx]
            .parse()
            .map_err(|source| InputError::NotANumber { row, field: name, source })
    };
    let parse_i64 = |idx: usize, name: &'static str| -> Result<i64, InputError> {
        fields[idx]
            .parse()
            .map_err(|source| InputError::NotANumber { row, field: name, source })
    };

    let job = JobId::new(parse_u64(0, "task")?, parse_u64(1, "job")?);
    let trigger_min = parse_i64(2, "trigger_min")?;
    let trigger_max = parse_i64(3, "trigger_max")?;
    if trigger_min > trigger_max {
        return Err(InputError::InvertedInterval { row, field: "trigger" });
    }
    let cleanup_min = parse_i64(4, "cleanup_min")?;
    let cleanup_max = parse_i64(5, "cleanup_max")?;
    if cleanup_min > cleanup_max {
        return Err(InputError::InvertedInterval { row, field: "cleanup" });
    }

    Ok(AbortAction {
        job,
        trigger: Interval::new(trigger_min, trigger_max),
        cleanup: Interval::new(cleanup_min, cleanup_max),
    })
}

/// Parses a full abort-action file: header row skipped.
pub fn parse_abort_file(input: &str) -> Result<Vec<AbortAction>, InputError> {
    let mut actions = Vec::new();
    for (row, line) in input.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        actions.push(parse_row(row, line)?);
    }
    Ok(actions)
}
