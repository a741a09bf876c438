//! The `(scheduled, lookup_key)`-keyed hash index that groups states into
//! nodes (§3 "Node / state bucket"), paired with the witness path that
//! reached each state — tracked outside [`Node`] itself since witnesses are
//! an engine-level concern, not part of the state-bucket contract.

use crate::index_set::IndexSet;
use crate::node::{MergeOutcome, Node};
use crate::state::ScheduleState;
use crate::time::TimeBound;
use crate::verdict::WitnessStep;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

struct Entry<T: TimeBound> {
    node: Arc<Node<T>>,
    /// Indexed in lockstep with `node.states()`: `witnesses[i]` is a path
    /// that reaches `node.states()[i]`. Append-only grows on
    /// `MergeOutcome::Appended`; left untouched on `MergedInto` (any valid
    /// path to the surviving state remains valid).
    witnesses: Mutex<Vec<Vec<WitnessStep>>>,
}

/// The next-depth work-in-progress frontier: a concurrent map from node
/// identity to the node itself. Coarse-grained (whole-map) locking on
/// lookup/insert; per-node locking (inside [`Node`]) on merge/append — a
/// simplification of §5's "hash index's per-bucket lock" wording, since
/// no sharded concurrent map type is in the dependency stack.
pub struct Frontier<T: TimeBound> {
    index: Mutex<HashMap<(IndexSet, u64), Arc<Entry<T>>>>,
}

impl<T: TimeBound> Frontier<T> {
    pub fn new() -> Self {
        Frontier { index: Mutex::new(HashMap::new()) }
    }

    /// Inserts `state`, reached via `witness`, into its target node. When
    /// `merging` is `false` (the naive exploration mode), the state is
    /// always appended rather than merge-attempted, reproducing the state
    /// counts `original_source` reports without merging.
    pub fn locate(&self, state: ScheduleState<T>, witness: Vec<WitnessStep>, merging: bool) -> Arc<Node<T>> {
        let key = (state.scheduled().clone(), state.lookup_key());
        let mut index = self.index.lock();
        if let Some(entry) = index.get(&key) {
            let entry = entry.clone();
            drop(index);
            let i = if merging {
                match entry.node.insert_or_merge(state) {
                    MergeOutcome::MergedInto(_) => None,
                    MergeOutcome::Appended(i) => Some(i),
                }
            } else {
                Some(entry.node.append(state))
            };
            if let Some(i) = i {
                let mut witnesses = entry.witnesses.lock();
                if witnesses.len() <= i {
                    witnesses.resize(i + 1, Vec::new());
                }
                witnesses[i] = witness;
            }
            return entry.node.clone();
        }
        let node = Arc::new(Node::new(state));
        let entry = Arc::new(Entry { node: node.clone(), witnesses: Mutex::new(vec![witness]) });
        index.insert(key, entry);
        node
    }

    /// Every `(node, witnesses)` pair currently in the frontier, for
    /// advancing to the next depth.
    pub fn entries(&self) -> Vec<(Arc<Node<T>>, Vec<Vec<WitnessStep>>)> {
        self.index
            .lock()
            .values()
            .map(|e| (e.node.clone(), e.witnesses.lock().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.lock().is_empty()
    }
}

impl<T: TimeBound> Default for Frontier<T> {
    fn default() -> Self {
        Self::new()
    }
}
