//! Frontier/state merging behavior (§8 scenario 6 and invariants 4-5), at
//! the granularity the engine actually exercises it: through
//! [`schedex::engine::frontier::Frontier`].

use schedex::engine::frontier::Frontier;
use schedex::prelude::*;
use schedex::state::ScheduleState;

fn make(avail: Interval<i64>) -> ScheduleState<i64> {
    let predecessors = IndexSet::new();
    ScheduleState::<i64>::initial(1).dispatch(0, 0x99, &predecessors, false, 1, Interval::new(0, 0), avail)
}

#[test]
fn frontier_merges_same_identity_states_in_either_order() {
    let frontier = Frontier::<i64>::new();
    let a = make(Interval::new(3, 5));
    let b = make(Interval::new(4, 6));
    let c = make(Interval::new(5, 7));

    let node_ab = frontier.locate(a.clone(), Vec::new(), true);
    let node_abc = frontier.locate(b, Vec::new(), true);
    assert!(std::ptr::eq(node_ab.as_ref() as *const _, node_abc.as_ref() as *const _));

    let node = frontier.locate(c, Vec::new(), true);
    assert_eq!(node.state_count(), 1, "merging should keep a single fused state");
    let merged = &node.states()[0];
    assert_eq!(merged.core_availability(1), Interval::new(3, 7));

    // Re-running in the opposite order lands on the same union.
    let other = Frontier::<i64>::new();
    let c2 = make(Interval::new(5, 7));
    let b2 = make(Interval::new(4, 6));
    let a2 = make(Interval::new(3, 5));
    other.locate(c2, Vec::new(), true);
    other.locate(b2, Vec::new(), true);
    let reordered = other.locate(a2, Vec::new(), true);
    assert_eq!(reordered.states()[0].core_availability(1), Interval::new(3, 7));
}

#[test]
fn frontier_keeps_states_separate_without_merging() {
    let frontier = Frontier::<i64>::new();
    frontier.locate(make(Interval::new(3, 5)), Vec::new(), false);
    frontier.locate(make(Interval::new(4, 6)), Vec::new(), false);
    let node = frontier.locate(make(Interval::new(5, 7)), Vec::new(), false);
    assert_eq!(node.state_count(), 3, "without merging every dispatch keeps its own state");
}

#[test]
fn merging_does_not_change_the_verdict() {
    // Two equal-priority, non-interfering jobs: whichever order the engine
    // explores them in, both orders reach the same (scheduled, lookup_key)
    // identity, so merging collapses what naive exploration keeps apart.
    let jobs = vec![
        Job::sequential(JobId::new(1, 1), Interval::new(0, 0), Interval::new(1, 3), 20, 1),
        Job::sequential(JobId::new(2, 1), Interval::new(0, 0), Interval::new(1, 3), 20, 1),
    ];
    let precedence = Precedence::empty(jobs.len());

    let merged = Config { merging: true, ..Config::default() };
    let naive = Config { merging: false, ..Config::default() };

    let merged_result = explore(&jobs, &precedence, 1, &NullIip, &merged).unwrap();
    let naive_result = explore(&jobs, &precedence, 1, &NullIip, &naive).unwrap();
    assert_eq!(merged_result.is_schedulable(), naive_result.is_schedulable());
}
