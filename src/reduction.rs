//! Partial-order reduction (§4.5): fuse a run of jobs known to form a
//! closed, non-interfering busy interval into a single super-transition.
//!
//! Grounded on `original_source/include/uni/reduction_set.hpp`, which
//! scopes this construction to non-gang (`s_min == s_max == 1`) jobs on one
//! processor; this crate keeps that scope (see DESIGN.md) and the engine
//! only attempts POR when every candidate member satisfies it.

use crate::index_set::IndexSet;
use crate::interval::Interval;
use crate::jobs::{Job, JobIndex};
use crate::precedence::Precedence;
use crate::time::TimeBound;
use std::collections::HashMap;

/// A closed, non-interfering group of jobs, ready to be dispatched
/// atomically. [`Self::latest_busy_time`] becomes every processor's
/// `core_avail` endpoint in the collapsed successor state.
pub struct ClosedReduction<T: TimeBound> {
    pub members: Vec<JobIndex>,
    pub latest_busy_time: T,
    pub key: u64,
    /// Per-member latest-start-time bound, exposed so callers can derive
    /// an (approximate) per-job response-time contribution without
    /// re-deriving the reduction set.
    pub latest_start_times: HashMap<JobIndex, T>,
}

struct ReductionSet<T: TimeBound> {
    members: Vec<JobIndex>,
    cpu_availability: Interval<T>,
    latest_busy_time: T,
    latest_idle_time: Option<T>,
    latest_start_times: HashMap<JobIndex, T>,
    max_priority: T,
}

impl<T: TimeBound> ReductionSet<T> {
    fn build(jobs: &[Job<T>], precedence: &Precedence, cpu_availability: Interval<T>, members: Vec<JobIndex>) -> Self {
        let mut set = ReductionSet {
            members,
            cpu_availability,
            latest_busy_time: T::zero(),
            latest_idle_time: None,
            latest_start_times: HashMap::new(),
            max_priority: T::zero(),
        };
        set.recompute(jobs, precedence);
        set
    }

    fn by_earliest_arrival(&self, jobs: &[Job<T>]) -> Vec<JobIndex> {
        let mut v = self.members.clone();
        v.sort_by_key(|&j| jobs[j].earliest_arrival());
        v
    }

    fn by_latest_arrival(&self, jobs: &[Job<T>]) -> Vec<JobIndex> {
        let mut v = self.members.clone();
        v.sort_by_key(|&j| jobs[j].latest_arrival());
        v
    }

    fn recompute(&mut self, jobs: &[Job<T>], precedence: &Precedence) {
        self.latest_busy_time = self.compute_latest_busy_time(jobs);
        self.latest_idle_time = self.compute_latest_idle_time(jobs);
        self.latest_start_times = self.compute_latest_start_times(jobs, precedence);
        self.max_priority = self
            .members
            .iter()
            .map(|&j| jobs[j].priority())
            .max()
            .unwrap_or_else(T::zero);
    }

    fn compute_latest_busy_time(&self, jobs: &[Job<T>]) -> T {
        let mut t = self.cpu_availability.max();
        for &j in &self.by_latest_arrival(jobs) {
            t = t.max(jobs[j].latest_arrival()) + jobs[j].maximal_cost(1);
        }
        t
    }

    fn compute_latest_idle_time(&self, jobs: &[Job<T>]) -> Option<T> {
        let by_latest = self.by_latest_arrival(jobs);
        let by_earliest = self.by_earliest_arrival(jobs);

        if !by_latest.iter().any(|&j| jobs[j].latest_arrival() > self.cpu_availability.min()) {
            return None;
        }

        let mut idle_job: Option<JobIndex> = None;
        for &i in &by_latest {
            let mut t = self.cpu_availability.min();
            for &j in &by_earliest {
                if jobs[j].latest_arrival() < jobs[i].latest_arrival() {
                    t = t.max(jobs[j].earliest_arrival()) + jobs[j].least_cost(1);
                }
                if t >= jobs[i].latest_arrival() {
                    break;
                }
            }
            if t < jobs[i].latest_arrival()
                && (idle_job.is_none() || jobs[i].latest_arrival() > jobs[idle_job.unwrap()].latest_arrival())
            {
                idle_job = Some(i);
            }
        }

        let idle_job = idle_job?;
        if jobs[idle_job].latest_arrival() == jobs[by_latest[0]].latest_arrival() {
            None
        } else {
            Some(jobs[idle_job].latest_arrival() - T::epsilon())
        }
    }

    fn effective_priorities(&self, jobs: &[Job<T>], precedence: &Precedence) -> HashMap<JobIndex, T> {
        let member_set: IndexSet = self.members.iter().copied().collect();
        let mut memo: HashMap<JobIndex, T> = HashMap::new();

        fn go<T: TimeBound>(
            idx: JobIndex,
            jobs: &[Job<T>],
            precedence: &Precedence,
            member_set: &IndexSet,
            memo: &mut HashMap<JobIndex, T>,
        ) -> T {
            if let Some(&p) = memo.get(&idx) {
                return p;
            }
            let mut p = jobs[idx].priority();
            for pred in precedence.predecessors_of(idx).iter() {
                if member_set.contains(pred) {
                    let pp = go(pred, jobs, precedence, member_set, memo);
                    p = p.max(pp);
                }
            }
            memo.insert(idx, p);
            p
        }

        for &j in &self.members {
            go(j, jobs, precedence, &member_set, &mut memo);
        }
        memo
    }

    fn descendants(&self, of: JobIndex, precedence: &Precedence) -> Vec<JobIndex> {
        let mut out = Vec::new();
        let mut queue = vec![of];
        let mut seen = IndexSet::singleton(of);
        while let Some(cur) = queue.pop() {
            for &k in &self.members {
                if precedence.predecessors_of(k).contains(cur) && !seen.contains(k) {
                    seen.insert(k);
                    out.push(k);
                    queue.push(k);
                }
            }
        }
        out
    }

    fn compute_latest_start_times(&self, jobs: &[Job<T>], precedence: &Precedence) -> HashMap<JobIndex, T> {
        let prio_map = self.effective_priorities(jobs, precedence);
        let by_earliest = self.by_earliest_arrival(jobs);

        let mut out = HashMap::new();
        for &i in &self.members {
            let s_i = self.compute_si(i, jobs, &prio_map, &by_earliest);
            let descendants = self.descendants(i, precedence);
            let sum_desc: T = descendants.iter().fold(T::zero(), |acc, &d| acc + jobs[d].maximal_cost(1));
            let second_bound = self.latest_busy_time - jobs[i].maximal_cost(1) - sum_desc;
            out.insert(i, s_i.min(second_bound));
        }
        out
    }

    fn compute_si(&self, i: JobIndex, jobs: &[Job<T>], prio_map: &HashMap<JobIndex, T>, by_earliest: &[JobIndex]) -> T {
        let i_prio = jobs[i].priority();
        let mut blocking_job: Option<JobIndex> = None;
        for &j in by_earliest {
            if j == i {
                continue;
            }
            if i_prio < prio_map[&j]
                && (blocking_job.is_none() || jobs[blocking_job.unwrap()].maximal_cost(1) < jobs[j].maximal_cost(1))
            {
                blocking_job = Some(j);
            }
        }
        let blocking_time = blocking_job
            .map(|b| {
                let c = jobs[b].maximal_cost(1);
                if c > T::epsilon() { c - T::epsilon() } else { T::zero() }
            })
            .unwrap_or_else(T::zero);

        let mut latest_start = self.cpu_availability.max().max(jobs[i].latest_arrival() + blocking_time);
        for &j in by_earliest {
            if j == i {
                continue;
            }
            if jobs[j].earliest_arrival() <= latest_start && !(i_prio < prio_map[&j]) {
                latest_start = latest_start + jobs[j].maximal_cost(1);
            } else if jobs[j].earliest_arrival() > latest_start {
                break;
            }
        }
        latest_start
    }

    fn has_potential_deadline_misses(&self, jobs: &[Job<T>]) -> bool {
        self.members
            .iter()
            .any(|&j| jobs[j].exceeds_deadline(self.latest_start_times[&j] + jobs[j].maximal_cost(1)))
    }

    fn satisfies_precedence(&self, jx_predecessors: &IndexSet, scheduled: &IndexSet) -> bool {
        let member_set: IndexSet = self.members.iter().copied().collect();
        let scheduled_union_r = scheduled.union(&member_set);
        scheduled_union_r.includes(jx_predecessors) && !jx_predecessors.includes(&member_set)
    }

    fn can_interfere(&self, jx: JobIndex, jobs: &[Job<T>]) -> bool {
        if self.members.contains(&jx) {
            return false;
        }
        let jx_job = &jobs[jx];

        if let Some(idle) = self.latest_idle_time {
            if jx_job.earliest_arrival() <= idle {
                return true;
            }
        }

        let max_arrival = self.members.iter().map(|&j| jobs[j].latest_arrival()).max().unwrap();
        if !jx_job.priority_exceeds(self.max_priority) && jx_job.earliest_arrival() >= max_arrival {
            return false;
        }

        for &j in &self.members {
            if jx_job.earliest_arrival() <= self.latest_start_times[&j] && jx_job.higher_priority_than(&jobs[j]) {
                return true;
            }
        }
        false
    }

    fn add(&mut self, jx: JobIndex, jobs: &[Job<T>], precedence: &Precedence) {
        self.members.push(jx);
        self.recompute(jobs, precedence);
    }

    fn key(&self, jobs: &[Job<T>]) -> u64 {
        self.members.iter().fold(0u64, |acc, &j| acc ^ jobs[j].hash_key())
    }
}

/// Attempts to build a closed reduction set seeded from `eligible`, the
/// state's eligible-successor job indices (§4.5). Returns `None` when
/// closure cannot be reached (interference never stabilizes, or a deadline
/// miss inside the growing group is unavoidable) — the caller should fall
/// back to single-step dispatch.
///
/// Restricted to non-gang jobs (`s_min == s_max == 1`): a gang job among the
/// candidates takes this function out of scope for the whole group, so the
/// caller should only invoke it when every eligible successor is
/// non-gang.
pub fn try_close<T: TimeBound>(
    jobs: &[Job<T>],
    precedence: &Precedence,
    scheduled: &IndexSet,
    cpu_availability: Interval<T>,
    eligible: Vec<JobIndex>,
) -> Option<ClosedReduction<T>> {
    if eligible.is_empty() || eligible.iter().any(|&j| jobs[j].s_min() != 1 || jobs[j].s_max() != 1) {
        return None;
    }

    let mut set = ReductionSet::build(jobs, precedence, cpu_availability, eligible);
    let total_jobs = jobs.len();

    loop {
        let member_set: IndexSet = set.members.iter().copied().collect();
        let interferers: Vec<JobIndex> = (0..total_jobs)
            .filter(|&j| !scheduled.contains(j) && !member_set.contains(j))
            .filter(|&j| set.satisfies_precedence(precedence.predecessors_of(j), scheduled) && set.can_interfere(j, jobs))
            .collect();

        if interferers.is_empty() {
            return if set.has_potential_deadline_misses(jobs) {
                None
            } else {
                Some(ClosedReduction {
                    latest_busy_time: set.latest_busy_time,
                    key: set.key(jobs),
                    latest_start_times: set.latest_start_times.clone(),
                    members: set.members,
                })
            };
        }

        // Closure should converge in at most `total_jobs` rounds; guard
        // against an interference cycle the model did not anticipate.
        if set.members.len() + interferers.len() > total_jobs {
            return None;
        }
        for jx in interferers {
            set.add(jx, jobs, precedence);
        }
    }
}
