//! Precedence constraints between jobs, and the topological order the POR
//! reducer needs to propagate effective priorities across them.

use crate::error::InputError;
use crate::index_set::IndexSet;
use crate::jobs::{index_of_id, Job, JobId, JobIndex};
use crate::time::TimeBound;

/// One `from -> to` precedence edge, referring to jobs by identity (not
/// position), as the workload file does (§6).
#[derive(Clone, Copy, Debug)]
pub struct PrecedenceConstraint {
    pub from: JobId,
    pub to: JobId,
}

pub type PrecedenceConstraints = Vec<PrecedenceConstraint>;

/// Per-job predecessor index sets, indexed by [`JobIndex`]. Job `j` is
/// ready in a state iff all indices in `predecessors[j]` are scheduled.
#[derive(Clone, Debug)]
pub struct Precedence {
    predecessors: Vec<IndexSet>,
    /// Jobs that are a predecessor of at least one other job — precomputed
    /// so the engine knows which jobs need their finish times remembered
    /// past the point `certain_jobs` would otherwise have evicted them.
    has_successors: IndexSet,
}

impl Precedence {
    pub fn empty(num_jobs: usize) -> Self {
        Precedence {
            predecessors: vec![IndexSet::new(); num_jobs],
            has_successors: IndexSet::new(),
        }
    }

    pub fn build<T: TimeBound>(
        jobs: &[Job<T>],
        constraints: &PrecedenceConstraints,
    ) -> Result<Self, InputError> {
        let mut predecessors = vec![IndexSet::new(); jobs.len()];
        let mut has_successors = IndexSet::new();

        for edge in constraints {
            let from = index_of_id(jobs, edge.from)
                .ok_or(InputError::UnresolvedPrecedenceReference { job: edge.from })?;
            let to = index_of_id(jobs, edge.to)
                .ok_or(InputError::UnresolvedPrecedenceReference { job: edge.to })?;
            predecessors[to].insert(from);
            has_successors.insert(from);
        }

        Ok(Precedence { predecessors, has_successors })
    }

    pub fn predecessors_of(&self, job: JobIndex) -> &IndexSet {
        &self.predecessors[job]
    }

    pub fn has_successors(&self, job: JobIndex) -> bool {
        self.has_successors.contains(job)
    }

    pub fn is_ready(&self, job: JobIndex, scheduled: &IndexSet) -> bool {
        scheduled.includes(&self.predecessors[job])
    }
}

/// Topologically sorts `jobs` (by their own index) according to
/// `predecessors`. Used only by the POR reducer (§4.5) to propagate
/// effective priorities across precedence edges within a reduction set.
pub fn topological_order(predecessors: &[IndexSet]) -> Vec<JobIndex> {
    let n = predecessors.len();
    let mut processed = IndexSet::new();
    let mut order = Vec::with_capacity(n);
    let mut remaining: Vec<JobIndex> = (0..n).collect();

    while !remaining.is_empty() {
        let mut made_progress = false;
        remaining.retain(|&idx| {
            if processed.includes(&predecessors[idx]) {
                order.push(idx);
                processed.insert(idx);
                made_progress = true;
                false
            } else {
                true
            }
        });
        if !made_progress {
            // A cycle in "predecessors" would mean malformed input that
            // should have been rejected at load time; never reachable for
            // a validated workload.
            debug_assert!(false, "precedence graph contains a cycle");
            order.extend(remaining.drain(..));
            break;
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_topological_order_respects_edges() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let predecessors = vec![
            IndexSet::new(),
            IndexSet::from_indices([0]),
            IndexSet::from_indices([0]),
            IndexSet::from_indices([1, 2]),
        ];
        let order = topological_order(&predecessors);
        let pos = |i: JobIndex| order.iter().position(|&x| x == i).unwrap();
        assert!(pos(0) < pos(1));
        assert!(pos(0) < pos(2));
        assert!(pos(1) < pos(3));
        assert!(pos(2) < pos(3));
    }

    #[test]
    fn is_ready_requires_all_predecessors_scheduled() {
        let mut prec = Precedence::empty(2);
        prec.predecessors[1] = IndexSet::singleton(0);
        let mut scheduled = IndexSet::new();
        assert!(!prec.is_ready(1, &scheduled));
        scheduled.insert(0);
        assert!(prec.is_ready(1, &scheduled));
    }
}
