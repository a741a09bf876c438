//! Workload CSV parsing (§6):
//!
//! `task_id, job_id, arr_min, arr_max, cost_min[:cost_min...], cost_max[:cost_max...], deadline, priority [, s_min [, s_max]]`
//!
//! Ported from `original_source/include/io.hpp`'s `parse_job` (iostream
//! extraction) into line/field splitting over a `&str`.

use crate::error::InputError;
use crate::interval::Interval;
use crate::jobs::{Job, JobId};
use std::collections::HashSet;

fn field<'a>(fields: &[&'a str], row: usize, idx: usize, expected: usize) -> Result<&'a str, InputError> {
    fields
        .get(idx)
        .map(|s| s.trim())
        .ok_or(InputError::MissingField { row, expected, found: fields.len() })
}

fn parse_num<N: std::str::FromStr<Err = std::num::ParseIntError>>(
    text: &str,
    row: usize,
    name: &'static str,
) -> Result<N, InputError> {
    text.parse().map_err(|source| InputError::NotANumber { row, field: name, source })
}

fn parse_cost_list(text: &str, row: usize, name: &'static str) -> Result<Vec<i64>, InputError> {
    text.split(':').map(|part| parse_num::<i64>(part, row, name)).collect()
}

fn parse_row(row: usize, line: &str) -> Result<Job<i64>, InputError> {
    let fields: Vec<&str> = line.split(',').collect();

    let task_id = parse_num::<u64>(field(&fields, row, 0, 8)?, row, "task_id")?;
    let job_id = parse_num::<u64>(field(&fields, row, 1, 8)?, row, "job_id")?;
    let arr_min = parse_num::<i64>(field(&fields, row, 2, 8)?, row, "arr_min")?;
    let arr_max = parse_num::<i64>(field(&fields, row, 3, 8)?, row, "arr_max")?;
    if arr_min > arr_max {
        return Err(InputError::InvertedInterval { row, field: "arrival" });
    }
    if arr_min < 0 {
        return Err(InputError::NegativeValue { row, field: "arrival" });
    }

    let costs_min = parse_cost_list(field(&fields, row, 4, 8)?, row, "cost_min")?;
    let costs_max = parse_cost_list(field(&fields, row, 5, 8)?, row, "cost_max")?;
    if costs_min.len() != costs_max.len() {
        return Err(InputError::CostListLengthMismatch {
            row,
            s_min: 0,
            s_max: 0,
            expected: costs_min.len() as u32,
            found: costs_max.len(),
        });
    }

    let deadline = parse_num::<i64>(field(&fields, row, 6, 8)?, row, "deadline")?;
    if deadline < 0 {
        return Err(InputError::NegativeValue { row, field: "deadline" });
    }
    let priority = parse_num::<i64>(field(&fields, row, 7, 8)?, row, "priority")?;

    let s_min: u32 = match fields.get(8).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(text) => parse_num(text, row, "s_min")?,
        None => 1,
    };
    let s_max: u32 = match fields.get(9).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(text) => parse_num(text, row, "s_max")?,
        None => s_min,
    };
    if s_max < s_min {
        return Err(InputError::GangParallelismInverted { row, s_min, s_max });
    }

    let expected_levels = s_max - s_min + 1;
    if costs_min.len() as u32 != expected_levels {
        return Err(InputError::CostListLengthMismatch {
            row,
            s_min,
            s_max,
            expected: expected_levels,
            found: costs_min.len(),
        });
    }

    let mut costs = Vec::with_capacity(costs_min.len());
    for (min, max) in costs_min.into_iter().zip(costs_max) {
        if min > max {
            return Err(InputError::InvertedInterval { row, field: "cost" });
        }
        if min < 0 {
            return Err(InputError::NegativeValue { row, field: "cost" });
        }
        costs.push(Interval::new(min, max));
    }
    for pair in costs.windows(2) {
        if pair[0].min() < pair[1].min() || pair[0].max() < pair[1].max() {
            tracing::warn!(row, "cost does not weakly decrease as parallelism grows");
            break;
        }
    }

    Ok(Job::new(
        JobId::new(task_id, job_id),
        Interval::new(arr_min, arr_max),
        costs,
        deadline,
        priority,
        s_min,
        s_max,
    ))
}

/// Parses a full workload file: header row skipped, one job per subsequent
/// non-empty line.
pub fn parse_workload(input: &str) -> Result<Vec<Job<i64>>, InputError> {
    let mut jobs = Vec::new();
    let mut seen = HashSet::new();

    for (row, line) in input.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let job = parse_row(row, line)?;
        if !seen.insert(job.id()) {
            return Err(InputError::DuplicateJobId { row, job: job.id() });
        }
        jobs.push(job);
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_non_gang_rows() {
        let csv = "task_id, job_id, arr_min, arr_max, cost_min, cost_max, deadline, priority\n\
                   1, 1, 0, 0, 1, 2, 10, 1\n\
                   1, 2, 3, 5, 2, 2, 10, 2\n";
        let jobs = parse_workload(csv).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id(), JobId::new(1, 1));
        assert_eq!(jobs[0].cost(1), Interval::new(1, 2));
        assert_eq!(jobs[1].arrival_window(), Interval::new(3, 5));
    }

    #[test]
    fn parses_gang_rows_with_colon_lists() {
        let csv = "header\n1, 1, 0, 0, 4:3, 6:5, 10, 1, 2, 3\n";
        let jobs = parse_workload(csv).unwrap();
        assert_eq!(jobs[0].s_min(), 2);
        assert_eq!(jobs[0].s_max(), 3);
        assert_eq!(jobs[0].cost(2), Interval::new(4, 6));
        assert_eq!(jobs[0].cost(3), Interval::new(3, 5));
    }

    #[test]
    fn rejects_duplicate_job_id() {
        let csv = "header\n1, 1, 0, 0, 1, 1, 10, 1\n1, 1, 0, 0, 1, 1, 10, 1\n";
        let err = parse_workload(csv).unwrap_err();
        assert!(matches!(err, InputError::DuplicateJobId { .. }));
    }

    #[test]
    fn rejects_mismatched_cost_list_length() {
        let csv = "header\n1, 1, 0, 0, 4:3, 6, 10, 1, 2, 3\n";
        let err = parse_workload(csv).unwrap_err();
        assert!(matches!(err, InputError::CostListLengthMismatch { .. }));
    }

    #[test]
    fn rejects_inverted_arrival() {
        let csv = "header\n1, 1, 5, 0, 1, 1, 10, 1\n";
        let err = parse_workload(csv).unwrap_err();
        assert!(matches!(err, InputError::InvertedInterval { .. }));
    }

    #[test]
    fn rejects_negative_cost() {
        let csv = "header\n1, 1, 0, 0, -3, 1, 10, 1\n";
        let err = parse_workload(csv).unwrap_err();
        assert!(matches!(err, InputError::NegativeValue { field: "cost", .. }));
    }

    #[test]
    fn rejects_negative_arrival() {
        let csv = "header\n1, 1, -2, 0, 1, 1, 10, 1\n";
        let err = parse_workload(csv).unwrap_err();
        assert!(matches!(err, InputError::NegativeValue { field: "arrival", .. }));
    }

    #[test]
    fn rejects_negative_deadline() {
        let csv = "header\n1, 1, 0, 0, 1, 1, -10, 1\n";
        let err = parse_workload(csv).unwrap_err();
        assert!(matches!(err, InputError::NegativeValue { field: "deadline", .. }));
    }
}
