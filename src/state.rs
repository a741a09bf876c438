//! The immutable schedule state (§3) and the dispatch transition (§4.1).

use crate::index_set::IndexSet;
use crate::interval::Interval;
use crate::jobs::JobIndex;
use crate::time::TimeBound;
use std::cmp::Ordering;
use tracing::trace;

/// A job recorded as "certainly still running" at a state's latest dispatch
/// point, together with the parallelism it was given.
#[derive(Clone, Copy, Debug)]
pub struct CertainJob<T: TimeBound> {
    pub finish: Interval<T>,
    pub parallelism: u32,
}

/// An immutable over-approximation of the multiprocessor timeline after
/// some prefix of jobs has been dispatched.
///
/// Two states are considered for the same graph vertex iff they share
/// `(scheduled, lookup_key)`; see [`Self::can_merge_with`] for when they can
/// actually be fused into one.
#[derive(Clone, Debug)]
pub struct ScheduleState<T: TimeBound> {
    scheduled: IndexSet,
    num_scheduled: usize,
    core_avail: Vec<Interval<T>>,
    /// Sorted by [`JobIndex`] — keeps the per-merge walk linear (§9).
    certain_jobs: Vec<(JobIndex, CertainJob<T>)>,
    /// Finish-time bounds for jobs that are a predecessor of some not-yet
    /// -scheduled job. Unlike `certain_jobs`, entries here are never
    /// evicted once written — precedence lookups must remain exact for the
    /// lifetime of the search, whereas `certain_jobs` only needs to be
    /// precise long enough to bound `core_avail`.
    precedence_finish: Vec<(JobIndex, Interval<T>)>,
    lookup_key: u64,
}

impl<T: TimeBound> ScheduleState<T> {
    /// The initial state: nothing dispatched, every processor idle from `0`.
    pub fn initial(num_processors: usize) -> Self {
        assert!(num_processors > 0, "a schedule needs at least one processor");
        ScheduleState {
            scheduled: IndexSet::new(),
            num_scheduled: 0,
            core_avail: vec![Interval::degenerate(T::zero()); num_processors],
            certain_jobs: Vec::new(),
            precedence_finish: Vec::new(),
            lookup_key: 0,
        }
    }

    pub fn scheduled(&self) -> &IndexSet {
        &self.scheduled
    }

    pub fn num_scheduled(&self) -> usize {
        self.num_scheduled
    }

    pub fn num_processors(&self) -> usize {
        self.core_avail.len()
    }

    pub fn lookup_key(&self) -> u64 {
        self.lookup_key
    }

    /// Availability interval for the `p`-th earliest-available processor
    /// (1-indexed, matching "the k-th earliest available processor" in §3).
    pub fn core_availability(&self, p: u32) -> Interval<T> {
        let idx = (p - 1) as usize;
        self.core_avail
            .get(idx)
            .copied()
            .unwrap_or_else(|| Interval::degenerate(T::infinity()))
    }

    pub fn job_incomplete(&self, job: JobIndex) -> bool {
        !self.scheduled.contains(job)
    }

    pub fn certain_finish(&self, job: JobIndex) -> Option<Interval<T>> {
        self.certain_jobs
            .binary_search_by_key(&job, |&(idx, _)| idx)
            .ok()
            .map(|pos| self.certain_jobs[pos].1.finish)
    }

    /// Finish-time bound for a job that other, not-yet-scheduled jobs
    /// depend on via precedence. `None` means the job has not been
    /// dispatched yet.
    pub fn precedence_finish(&self, job: JobIndex) -> Option<Interval<T>> {
        self.precedence_finish
            .binary_search_by_key(&job, |&(idx, _)| idx)
            .ok()
            .map(|pos| self.precedence_finish[pos].1)
    }

    /// Constructs the successor state produced by dispatching `job` (at
    /// workload index `job_index`, with hash key `job_hash_key` and
    /// predecessor set `predecessors`) with `p` processors, observed start
    /// window `start` and finish window `finish`. Implements §4.1.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch(
        &self,
        job_index: JobIndex,
        job_hash_key: u64,
        predecessors: &IndexSet,
        has_successors: bool,
        p: u32,
        start: Interval<T>,
        finish: Interval<T>,
    ) -> ScheduleState<T> {
        let est = start.min();
        let lst = start.max();
        let eft = finish.min();
        let lft = finish.max();

        // Partition `certain_jobs`: predecessors of `job` contribute their
        // parallelism toward `sum_px` and are dropped (they are subsumed by
        // `job` now being the thing that blocks its successors); survivors
        // are jobs whose finish interval could still extend past `lst`
        // (strict variant per the design note in spec §9).
        let mut sum_px: u32 = 0;
        let mut survivors = Vec::with_capacity(self.certain_jobs.len() + 1);
        for &(idx, cj) in &self.certain_jobs {
            if predecessors.contains(idx) {
                sum_px += cj.parallelism;
            } else if lst < cj.finish.min() {
                survivors.push((idx, cj));
            }
        }
        survivors.push((job_index, CertainJob { finish, parallelism: p }));
        survivors.sort_by_key(|&(idx, _)| idx);

        let m_pred = sum_px.max(p);
        let blocked_count = (m_pred - p) as usize;

        let m = self.core_avail.len();
        let mut new_avail = Vec::with_capacity(m);
        for _ in 0..p {
            new_avail.push(Interval::new(eft, lft));
        }
        for (i, old) in self.core_avail[p as usize..].iter().enumerate() {
            let from = est.max(old.min());
            let until = if i < blocked_count {
                lst.min(est.max(old.max()))
            } else {
                est.max(old.max())
            };
            new_avail.push(Interval::new(from, until));
        }
        // Sort `from` and `until` independently and re-pair them index-wise,
        // rather than sorting the pairs as units: the two endpoint sequences
        // can cross when a short slot lands next to a long one, and sorting
        // pairs would not keep both sequences individually non-decreasing.
        let mut froms: Vec<T> = new_avail.iter().map(Interval::min).collect();
        let mut untils: Vec<T> = new_avail.iter().map(Interval::max).collect();
        froms.sort();
        untils.sort();
        let new_avail: Vec<Interval<T>> = froms.into_iter().zip(untils).map(|(f, u)| Interval::new(f, u)).collect();
        debug_assert_eq!(new_avail.len(), m, "dispatch must preserve processor count");

        let mut precedence_finish = self.precedence_finish.clone();
        if has_successors {
            match precedence_finish.binary_search_by_key(&job_index, |&(idx, _)| idx) {
                Ok(pos) => precedence_finish[pos].1 = finish,
                Err(pos) => precedence_finish.insert(pos, (job_index, finish)),
            }
        }

        let next = ScheduleState {
            scheduled: self.scheduled.inserted(job_index),
            num_scheduled: self.num_scheduled + 1,
            core_avail: new_avail,
            certain_jobs: survivors,
            precedence_finish,
            lookup_key: self.lookup_key ^ job_hash_key,
        };
        trace!(job = job_index, p, ?start, ?finish, "dispatched job, new state constructed");
        next
    }

    /// Two states are mergeable iff they carry the same `(scheduled,
    /// lookup_key)` identity and every processor's availability intervals
    /// intersect (§3).
    pub fn can_merge_with(&self, other: &ScheduleState<T>) -> bool {
        if self.lookup_key != other.lookup_key || self.scheduled != other.scheduled {
            return false;
        }
        assert_eq!(
            self.core_avail.len(),
            other.core_avail.len(),
            "core_avail length mismatch between states claiming the same identity"
        );
        self.core_avail
            .iter()
            .zip(&other.core_avail)
            .all(|(a, b)| a.intersects(b))
    }

    /// Fuses `other` into `self`: interval-wise union on `core_avail`, and a
    /// keyed outer-intersection on `certain_jobs` (§3). Panics if the two
    /// states are not mergeable — callers must check [`Self::can_merge_with`]
    /// first.
    pub fn merge_with(&mut self, other: &ScheduleState<T>) {
        assert!(self.can_merge_with(other), "merge_with called on incompatible states");

        for (a, b) in self.core_avail.iter_mut().zip(&other.core_avail) {
            *a = a.union(b);
        }

        let mut merged = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.certain_jobs.len() && j < other.certain_jobs.len() {
            match self.certain_jobs[i].0.cmp(&other.certain_jobs[j].0) {
                Ordering::Equal => {
                    let a = self.certain_jobs[i].1;
                    let b = other.certain_jobs[j].1;
                    merged.push((
                        self.certain_jobs[i].0,
                        CertainJob {
                            finish: a.finish.union(&b.finish),
                            parallelism: a.parallelism.min(b.parallelism),
                        },
                    ));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        self.certain_jobs = merged;

        // Precedence-finish bounds are exact and permanent: union rather
        // than intersect so a merged state still over-approximates both
        // paths' futures.
        let mut merged_pf = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.precedence_finish.len() && j < other.precedence_finish.len() {
            match self.precedence_finish[i].0.cmp(&other.precedence_finish[j].0) {
                Ordering::Equal => {
                    merged_pf.push((
                        self.precedence_finish[i].0,
                        self.precedence_finish[i].1.union(&other.precedence_finish[j].1),
                    ));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    merged_pf.push(self.precedence_finish[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged_pf.push(other.precedence_finish[j]);
                    j += 1;
                }
            }
        }
        merged_pf.extend(self.precedence_finish[i..].iter().copied());
        merged_pf.extend(other.precedence_finish[j..].iter().copied());
        self.precedence_finish = merged_pf;
    }

    /// Snapshot of `core_avail`, for graph-vertex labeling.
    pub fn core_avail_snapshot(&self) -> Vec<Interval<T>> {
        self.core_avail.clone()
    }

    /// Indices of jobs certainly still running, for graph-vertex labeling.
    pub fn certain_job_indices(&self) -> Vec<JobIndex> {
        self.certain_jobs.iter().map(|&(idx, _)| idx).collect()
    }

    /// Constructs the successor state produced by atomically dispatching a
    /// closed POR reduction set (§4.5): `scheduled' = scheduled ∪ members`,
    /// every processor collapses to `[busy_time, busy_time]`, and
    /// `certain_jobs'` is empty (nothing is left certainly running — the
    /// whole group is subsumed by the busy interval).
    ///
    /// `members_with_successors` get a `precedence_finish` entry so jobs
    /// outside the reduction set that depend on one of them still have a
    /// bound to read; this is an extension beyond the literal transition
    /// §4.5 describes, which only tracks `core_avail` and
    /// `certain_jobs` (see DESIGN.md).
    pub fn dispatch_reduction(
        &self,
        members: &[JobIndex],
        members_hash_key: u64,
        members_with_successors: &[JobIndex],
        busy_time: T,
    ) -> ScheduleState<T> {
        let scheduled = members.iter().fold(self.scheduled.clone(), |s, &j| s.inserted(j));
        let num_processors = self.core_avail.len();
        let seed_min = self.core_avail.first().map(|iv| iv.min()).unwrap_or_else(T::zero);

        let mut precedence_finish = self.precedence_finish.clone();
        for &j in members_with_successors {
            let finish = Interval::new(seed_min, busy_time);
            match precedence_finish.binary_search_by_key(&j, |&(idx, _)| idx) {
                Ok(pos) => precedence_finish[pos].1 = finish,
                Err(pos) => precedence_finish.insert(pos, (j, finish)),
            }
        }

        ScheduleState {
            scheduled,
            num_scheduled: self.num_scheduled + members.len(),
            core_avail: vec![Interval::degenerate(busy_time); num_processors],
            certain_jobs: Vec::new(),
            precedence_finish,
            lookup_key: self.lookup_key ^ members_hash_key,
        }
    }

    /// Invariant check used by tests and by the engine in debug builds:
    /// `core_avail` sorted non-decreasing on both endpoints (testable
    /// property 1).
    pub fn core_avail_is_sorted(&self) -> bool {
        self.core_avail.windows(2).all(|w| w[0].min() <= w[1].min() && w[0].max() <= w[1].max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_has_idle_processors() {
        let s = ScheduleState::<i64>::initial(2);
        assert_eq!(s.num_scheduled(), 0);
        assert_eq!(s.core_availability(1), Interval::degenerate(0));
        assert_eq!(s.core_availability(2), Interval::degenerate(0));
        assert!(s.core_avail_is_sorted());
    }

    #[test]
    fn gang_dispatch_assigns_both_processors() {
        // §8 scenario 5.
        let s = ScheduleState::<i64>::initial(2);
        let predecessors = IndexSet::new();
        let s2 = s.dispatch(0, 0xABCD, &predecessors, false, 2, Interval::new(0, 0), Interval::new(4, 6));
        assert_eq!(s2.num_scheduled(), 1);
        assert_eq!(s2.core_availability(1), Interval::new(4, 6));
        assert_eq!(s2.core_availability(2), Interval::new(4, 6));
        assert_eq!(s2.certain_finish(0), Some(Interval::new(4, 6)));
        assert!(s2.core_avail_is_sorted());
    }

    #[test]
    fn merge_commutativity_on_core_avail() {
        // §8 scenario 6.
        let base = |avail: Interval<i64>| {
            let mut s = ScheduleState::<i64>::initial(1);
            s.core_avail[0] = avail;
            s.lookup_key = 42;
            s
        };
        let mut a = base(Interval::new(3, 5));
        let b = base(Interval::new(4, 6));
        let c = base(Interval::new(5, 7));

        let mut ab = a.clone();
        ab.merge_with(&b);
        ab.merge_with(&c);

        a.merge_with(&c);
        a.merge_with(&b);

        assert_eq!(ab.core_availability(1), Interval::new(3, 7));
        assert_eq!(a.core_availability(1), Interval::new(3, 7));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut s = ScheduleState::<i64>::initial(1);
        s.core_avail[0] = Interval::new(1, 2);
        let clone = s.clone();
        s.merge_with(&clone);
        assert_eq!(s.core_availability(1), Interval::new(1, 2));
    }

    #[test]
    fn dispatch_reduction_collapses_all_processors_to_busy_time() {
        let s = ScheduleState::<i64>::initial(2);
        let s2 = s.dispatch_reduction(&[0, 1, 2], 0x1234, &[], 22);
        assert_eq!(s2.num_scheduled(), 3);
        assert_eq!(s2.core_availability(1), Interval::degenerate(22));
        assert_eq!(s2.core_availability(2), Interval::degenerate(22));
        assert_eq!(s2.certain_finish(0), None);
        assert_eq!(s2.lookup_key(), 0x1234);
    }

    #[test]
    fn lookup_key_xors_job_hash_keys() {
        let s = ScheduleState::<i64>::initial(1);
        let predecessors = IndexSet::new();
        let s2 = s.dispatch(0, 7, &predecessors, false, 1, Interval::new(0, 0), Interval::new(1, 1));
        assert_eq!(s2.lookup_key(), 7);
        let s3 = s2.dispatch(1, 9, &predecessors, false, 1, Interval::new(1, 1), Interval::new(2, 2));
        assert_eq!(s3.lookup_key(), 7 ^ 9);
    }
}
