//! Precedence-edge CSV parsing (§6): `from_task, from_job, to_task, to_job`
//! per row, header skipped. Ported from `io.hpp`'s `parse_dag_file`.

use crate::error::InputError;
use crate::jobs::JobId;
use crate::precedence::PrecedenceConstraint;

fn parse_row(row: usize, line: &str) -> Result<PrecedenceConstraint, InputError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(InputError::MissingField { row, expected: 4, found: fields.len() });
    }

    let parse = |idx: usize, name: &'static str| -> Result<u64, InputError> {
        fields[idx]
            .parse()
            .map_err(|source| InputError::NotANumber { row, field: name, source })
    };

    let from = JobId::new(parse(0, "from_task")?, parse(1, "from_job")?);
    let to = JobId::new(parse(2, "to_task")?, parse(3, "to_job")?);
    Ok(PrecedenceConstraint { from, to })
}

/// Parses a full precedence-edge file: header row skipped.
pub fn parse_precedence_file(input: &str) -> Result<Vec<PrecedenceConstraint>, InputError> {
    let mut edges = Vec::new();
    for (row, line) in input.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        edges.push(parse_row(row, line)?);
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edges() {
        let csv = "from_task, from_job, to_task, to_job\n1, 1, 1, 2\n1, 2, 1, 3\n";
        let edges = parse_precedence_file(csv).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].from, JobId::new(1, 1));
        assert_eq!(edges[0].to, JobId::new(1, 2));
    }

    #[test]
    fn rejects_short_row() {
        let csv = "header\n1, 1, 1\n";
        let err = parse_precedence_file(csv).unwrap_err();
        assert!(matches!(err, InputError::MissingField { .. }));
    }
}
