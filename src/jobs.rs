//! The immutable job model: identity, release/cost/deadline/priority, and
//! the order-insensitive hash key used to fingerprint a scheduled set.

use crate::interval::Interval;
use crate::time::TimeBound;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A job's identity, distinct from its position in the workload vector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct JobId {
    pub task_id: u64,
    pub job_id: u64,
}

impl JobId {
    pub fn new(task_id: u64, job_id: u64) -> Self {
        JobId { task_id, job_id }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}J{}", self.task_id, self.job_id)
    }
}

/// A job's position in the workload vector — distinct from [`JobId`].
pub type JobIndex = usize;

/// An immutable job record.
///
/// `costs[k]` is the execution-time bound when `k + s_min` processors are
/// assigned. For non-gang workloads `s_min == s_max == 1` and `costs` has a
/// single entry.
#[derive(Clone, Debug)]
pub struct Job<T: TimeBound> {
    id: JobId,
    arrival: Interval<T>,
    costs: Vec<Interval<T>>,
    s_min: u32,
    s_max: u32,
    deadline: T,
    priority: T,
    hash_key: u64,
}

impl<T: TimeBound> Job<T> {
    /// Builds a (possibly gang) job. `costs.len()` must equal
    /// `s_max - s_min + 1`; cost intervals should be weakly non-increasing
    /// as parallelism grows (a warning is the implementation's business, not
    /// this constructor's — see [`crate::io::workload`]).
    pub fn new(
        id: JobId,
        arrival: Interval<T>,
        costs: Vec<Interval<T>>,
        deadline: T,
        priority: T,
        s_min: u32,
        s_max: u32,
    ) -> Self {
        debug_assert!(s_max >= s_min && s_min >= 1);
        debug_assert_eq!(costs.len() as u32, s_max - s_min + 1);
        let mut job = Job {
            id,
            arrival,
            costs,
            s_min,
            s_max,
            deadline,
            priority,
            hash_key: 0,
        };
        job.hash_key = job.compute_hash();
        job
    }

    /// Convenience constructor for a non-gang job (`s_min == s_max == 1`).
    pub fn sequential(id: JobId, arrival: Interval<T>, cost: Interval<T>, deadline: T, priority: T) -> Self {
        Self::new(id, arrival, vec![cost], deadline, priority, 1, 1)
    }

    fn compute_hash(&self) -> u64 {
        // Order-insensitive fingerprint: a single job's key XOR-combines
        // cleanly with other jobs' keys into a state's `lookup_key`.
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.arrival.min().hash(&mut hasher);
        let mut key = hasher.finish();

        key = key.rotate_left(13) ^ hash_one(&self.id.task_id);
        key = key.rotate_left(13) ^ hash_one(&self.arrival.max());
        key = key.rotate_left(13) ^ hash_one(&self.total_cost_min());
        key = key.rotate_left(13) ^ hash_one(&self.deadline);
        key = key.rotate_left(13) ^ hash_one(&self.total_cost_max());
        key = key.rotate_left(13) ^ hash_one(&self.id.job_id);
        key = key.rotate_left(13) ^ hash_one(&self.priority);
        key = key.rotate_left(13) ^ hash_one(&self.s_min);
        key = key.rotate_left(13) ^ hash_one(&self.s_max);
        key
    }

    fn total_cost_min(&self) -> T {
        self.costs.iter().fold(T::zero(), |acc, c| acc + c.min())
    }

    fn total_cost_max(&self) -> T {
        self.costs.iter().fold(T::zero(), |acc, c| acc + c.max())
    }

    pub fn hash_key(&self) -> u64 {
        self.hash_key
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn arrival_window(&self) -> Interval<T> {
        self.arrival
    }

    pub fn earliest_arrival(&self) -> T {
        self.arrival.min()
    }

    pub fn latest_arrival(&self) -> T {
        self.arrival.max()
    }

    pub fn deadline(&self) -> T {
        self.deadline
    }

    pub fn priority(&self) -> T {
        self.priority
    }

    pub fn s_min(&self) -> u32 {
        self.s_min
    }

    pub fn s_max(&self) -> u32 {
        self.s_max
    }

    /// The cost interval for `p` processors assigned (`s_min <= p <= s_max`).
    pub fn cost(&self, p: u32) -> Interval<T> {
        debug_assert!(p >= self.s_min && p <= self.s_max);
        self.costs[(p - self.s_min) as usize]
    }

    pub fn least_cost(&self, p: u32) -> T {
        self.cost(p).min()
    }

    pub fn maximal_cost(&self, p: u32) -> T {
        self.cost(p).max()
    }

    /// `true` when `t` is far enough past the deadline to count as a miss,
    /// beyond `deadline_miss_tolerance`.
    pub fn exceeds_deadline(&self, t: T) -> bool {
        t > self.deadline && (t - self.deadline) > T::deadline_miss_tolerance()
    }

    /// Lower numeric `priority` wins; ties break first by task id, then job id.
    pub fn higher_priority_than(&self, other: &Job<T>) -> bool {
        self.priority < other.priority
            || (self.priority == other.priority && self.id.task_id < other.id.task_id)
            || (self.priority == other.priority
                && self.id.task_id == other.id.task_id
                && self.id.job_id < other.id.job_id)
    }

    pub fn priority_at_least(&self, level: T) -> bool {
        self.priority <= level
    }

    pub fn priority_exceeds(&self, level: T) -> bool {
        self.priority < level
    }
}

fn hash_one<H: Hash>(value: &H) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

pub type JobSet<T> = Vec<Job<T>>;

pub fn index_of_id<T: TimeBound>(jobs: &[Job<T>], id: JobId) -> Option<JobIndex> {
    jobs.iter().position(|j| j.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(task: u64, job_id: u64, prio: i64) -> Job<i64> {
        Job::sequential(
            JobId::new(task, job_id),
            Interval::new(0, 0),
            Interval::new(1, 1),
            10,
            prio,
        )
    }

    #[test]
    fn priority_ties_break_by_task_then_job() {
        let a = job(1, 5, 3);
        let b = job(2, 1, 3);
        assert!(a.higher_priority_than(&b));
        assert!(!b.higher_priority_than(&a));

        let c = job(1, 1, 3);
        let d = job(1, 2, 3);
        assert!(c.higher_priority_than(&d));
    }

    #[test]
    fn hash_key_is_order_insensitive_combinator() {
        let a = job(1, 1, 1);
        let b = job(2, 1, 1);
        assert_ne!(a.hash_key(), 0);
        // XOR-combining in either order yields the same fingerprint.
        assert_eq!(a.hash_key() ^ b.hash_key(), b.hash_key() ^ a.hash_key());
    }

    #[test]
    fn exceeds_deadline_respects_tolerance() {
        let j = job(1, 1, 1);
        assert!(!j.exceeds_deadline(10));
        assert!(j.exceeds_deadline(11));
    }

    #[test]
    fn gang_job_cost_indexing() {
        let j = Job::new(
            JobId::new(1, 1),
            Interval::new(0, 0),
            vec![Interval::new(4, 6), Interval::new(3, 5)],
            20,
            1,
            2,
            3,
        );
        assert_eq!(j.cost(2), Interval::new(4, 6));
        assert_eq!(j.cost(3), Interval::new(3, 5));
    }
}
