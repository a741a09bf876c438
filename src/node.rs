//! Graph vertices: a node groups every state reachable with a given
//! `(scheduled, lookup_key)` identity, after merging.

use crate::index_set::IndexSet;
use crate::state::ScheduleState;
use crate::time::TimeBound;
use parking_lot::Mutex;
use tracing::debug;

/// A graph vertex: all mutually mergeable states produced for one
/// `(scheduled, lookup_key)` pair. After merges terminate the node holds
/// one or more maximally-merged states.
pub struct Node<T: TimeBound> {
    scheduled: IndexSet,
    lookup_key: u64,
    states: Mutex<Vec<ScheduleState<T>>>,
}

/// Which branch [`Node::insert_or_merge`] took, and at which index within
/// the node's state vector — callers tracking auxiliary per-state data
/// (e.g. a witness path) mirror the same operation at that index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    MergedInto(usize),
    Appended(usize),
}

impl<T: TimeBound> Node<T> {
    pub fn new(first: ScheduleState<T>) -> Self {
        Node {
            scheduled: first.scheduled().clone(),
            lookup_key: first.lookup_key(),
            states: Mutex::new(vec![first]),
        }
    }

    pub fn identity(&self) -> (&IndexSet, u64) {
        (&self.scheduled, self.lookup_key)
    }

    /// Tries to merge `candidate` into an existing state; appends it as a
    /// new state only on merge failure (§5 "prefer the existing state;
    /// append only on merge failure").
    pub fn insert_or_merge(&self, candidate: ScheduleState<T>) -> MergeOutcome {
        let mut states = self.states.lock();
        for (i, existing) in states.iter_mut().enumerate() {
            if existing.can_merge_with(&candidate) {
                existing.merge_with(&candidate);
                debug!(key = self.lookup_key, "merged successor state into existing node state");
                return MergeOutcome::MergedInto(i);
            }
        }
        states.push(candidate);
        MergeOutcome::Appended(states.len() - 1)
    }

    /// Appends `candidate` without attempting a merge — used by the engine's
    /// naive (non-merging) exploration mode (`Config::merging = false`).
    pub fn append(&self, candidate: ScheduleState<T>) -> usize {
        let mut states = self.states.lock();
        states.push(candidate);
        states.len() - 1
    }

    pub fn states(&self) -> Vec<ScheduleState<T>> {
        self.states.lock().clone()
    }

    pub fn state_count(&self) -> usize {
        self.states.lock().len()
    }
}
