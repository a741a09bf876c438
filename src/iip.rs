//! Idle-Insertion Policies (§4.3): pluggable filters over the oracle's
//! output, parameterized by the history encoded in a state.
//!
//! Modeled as a strategy trait object per the "Polymorphic IIP" note in
//! §9 (the C++ source templatizes this; here it is a `dyn Trait`
//! selected once at engine construction, so the CLI's `--iip` flag can pick
//! a variant at runtime).

use crate::eligibility::Candidate;
use crate::jobs::{Job, JobIndex};
use crate::state::ScheduleState;
use crate::time::TimeBound;

pub trait Iip<T: TimeBound>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filters `candidates` down to the subset this policy still permits to
    /// dispatch next from `state`.
    fn filter(&self, jobs: &[Job<T>], state: &ScheduleState<T>, candidates: Vec<Candidate<T>>) -> Vec<Candidate<T>>;
}

/// Identity filter — ordinary work-conserving dispatch.
pub struct NullIip;

impl<T: TimeBound> Iip<T> for NullIip {
    fn name(&self) -> &'static str {
        "Null-IIP"
    }

    fn filter(&self, _jobs: &[Job<T>], _state: &ScheduleState<T>, candidates: Vec<Candidate<T>>) -> Vec<Candidate<T>> {
        candidates
    }
}

/// Precautious Rate-Monotonic: reserve idle time in front of not-yet
/// -released higher-priority jobs so a low-priority job dispatched now
/// cannot make a future high-priority release miss its deadline.
pub struct PrecautiousRm;

impl PrecautiousRm {
    /// For every not-yet-released job `h`, the latest point a currently
    /// considered dispatch may finish without risking `h`'s schedulability:
    /// `h`'s own deadline minus its worst-case cost, i.e. the latest instant
    /// idle time must be reserved from.
    fn latest_safe_finish<T: TimeBound>(jobs: &[Job<T>], state: &ScheduleState<T>, candidate_job: JobIndex) -> T {
        let mut bound = T::infinity();
        for (idx, job) in jobs.iter().enumerate() {
            if idx != candidate_job && !state.scheduled().contains(idx) && job.earliest_arrival() > T::zero() {
                let min_cost = job.cost(job.s_min()).min();
                bound = bound.min(job.deadline() - min_cost);
            }
        }
        bound
    }
}

impl<T: TimeBound> Iip<T> for PrecautiousRm {
    fn name(&self) -> &'static str {
        "Precautious-RM"
    }

    fn filter(&self, jobs: &[Job<T>], state: &ScheduleState<T>, candidates: Vec<Candidate<T>>) -> Vec<Candidate<T>> {
        if candidates.is_empty() {
            return candidates;
        }

        // A candidate is "safe" if it does not push any not-yet-released
        // higher-priority job's worst case past its own deadline bound.
        let safe: Vec<Candidate<T>> = candidates
            .iter()
            .copied()
            .filter(|c| c.lft <= Self::latest_safe_finish(jobs, state, c.job_index))
            .collect();

        if safe.is_empty() {
            // No candidate is provably safe: fall back to the unfiltered
            // set rather than deadlocking the search (a pure idle-insertion
            // policy may legitimately choose to idle, but the engine must
            // still make *some* progress when no safer option exists).
            candidates
        } else {
            safe
        }
    }
}

/// Critical-Window EDF: within `[release_max(h), deadline(h))` of any
/// not-yet-released job `h`, prefer candidates that finish before `h`'s
/// latest release; if none qualify, break ties by nearest deadline.
pub struct CriticalWindowEdf;

impl<T: TimeBound> Iip<T> for CriticalWindowEdf {
    fn name(&self) -> &'static str {
        "Critical-Window-EDF"
    }

    fn filter(&self, jobs: &[Job<T>], state: &ScheduleState<T>, candidates: Vec<Candidate<T>>) -> Vec<Candidate<T>> {
        if candidates.is_empty() {
            return candidates;
        }

        let mut nearest_release_max = T::infinity();
        for (idx, job) in jobs.iter().enumerate() {
            if !state.scheduled().contains(idx) {
                nearest_release_max = nearest_release_max.min(job.latest_arrival());
            }
        }

        let within_window: Vec<Candidate<T>> = candidates
            .iter()
            .copied()
            .filter(|c| c.lft <= nearest_release_max)
            .collect();

        if !within_window.is_empty() {
            return within_window;
        }

        // No candidate respects the critical window: fall back to nearest
        // deadline among the original candidates.
        let min_deadline = candidates.iter().map(|c| jobs[c.job_index].deadline()).min().unwrap();
        candidates.into_iter().filter(|c| jobs[c.job_index].deadline() == min_deadline).collect()
    }
}
