//! Response-time collection (§4.6): the `[BCRT, WCRT]` interval observed for
//! each job across every state reached, updated via interval union as
//! search proceeds.

use crate::interval::Interval;
use crate::jobs::JobIndex;
use crate::time::TimeBound;
use parking_lot::Mutex;

/// Per-job response-time bounds, safe to update concurrently from many
/// expansion workers. One [`Mutex`] per job rather than one over the whole
/// table, so unrelated jobs' updates never contend (§5).
pub struct ResponseTimes<T: TimeBound> {
    bounds: Vec<Mutex<Option<Interval<T>>>>,
}

impl<T: TimeBound> ResponseTimes<T> {
    pub fn new(num_jobs: usize) -> Self {
        ResponseTimes {
            bounds: (0..num_jobs).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Folds `observed` into job `job`'s running `[BCRT, WCRT]` bound.
    pub fn record(&self, job: JobIndex, observed: Interval<T>) {
        let mut slot = self.bounds[job].lock();
        *slot = Some(match *slot {
            Some(existing) => existing.union(&observed),
            None => observed,
        });
    }

    pub fn get(&self, job: JobIndex) -> Option<Interval<T>> {
        *self.bounds[job].lock()
    }

    /// Snapshot of every job's bound, in workload order. `None` entries mean
    /// the job was never dispatched in any reached state (unreachable or the
    /// search was cancelled first).
    pub fn snapshot(&self) -> Vec<Option<Interval<T>>> {
        self.bounds.iter().map(|m| *m.lock()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_unions_across_observations() {
        let rt = ResponseTimes::<i64>::new(2);
        rt.record(0, Interval::new(3, 5));
        rt.record(0, Interval::new(4, 9));
        assert_eq!(rt.get(0), Some(Interval::new(3, 9)));
        assert_eq!(rt.get(1), None);
    }

    #[test]
    fn snapshot_preserves_job_order() {
        let rt = ResponseTimes::<i64>::new(3);
        rt.record(2, Interval::new(1, 1));
        let snap = rt.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[2], Some(Interval::new(1, 1)));
        assert_eq!(snap[0], None);
    }
}
