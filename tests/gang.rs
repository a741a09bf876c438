//! End-to-end coverage for gang scheduling (§8 scenario 5) with added
//! breadth: a mixed gang/non-gang workload and a flexible-parallelism job.

use schedex::prelude::*;

#[test]
fn two_processor_gang_job_is_schedulable() {
    // §8 scenario 5, reproduced at the engine's public entry point.
    let jobs = vec![Job::new(JobId::new(1, 1), Interval::new(0, 0), vec![Interval::new(4, 6)], 10, 1, 2, 2)];
    let precedence = Precedence::empty(1);
    let result = explore(&jobs, &precedence, 2, &NullIip, &Config::default()).unwrap();
    assert!(result.is_schedulable());
    assert_eq!(result.response_times[0], Some(Interval::new(4, 6)));
}

#[test]
fn gang_job_blocks_a_trailing_non_gang_job_but_both_meet_deadlines() {
    // A gang job occupies both processors until its guaranteed worst-case
    // finish (6); the trailer is released exactly then, so it cannot start
    // any earlier and the schedule is fully deterministic.
    let gang = Job::new(JobId::new(1, 1), Interval::new(0, 0), vec![Interval::new(4, 6)], 10, 1, 2, 2);
    let trailer = Job::sequential(JobId::new(2, 1), Interval::new(6, 6), Interval::new(1, 2), 15, 2);
    let jobs = vec![gang, trailer];
    let precedence = Precedence::empty(2);

    // POR only ever closes non-gang runs; disabled here so the trailer's
    // response time comes from a single ordinary dispatch, not an
    // approximated reduction bound.
    let config = Config { use_por: false, ..Config::default() };
    let result = explore(&jobs, &precedence, 2, &NullIip, &config).unwrap();
    assert!(result.is_schedulable());
    assert_eq!(result.response_times[0], Some(Interval::new(4, 6)));
    assert_eq!(result.response_times[1], Some(Interval::new(1, 2)));
}

#[test]
fn flexible_parallelism_job_explores_every_level_in_its_range() {
    // s_min=1, s_max=2, both candidate parallelism levels meet the deadline:
    // the engine explores both as separate dispatch choices, and the
    // recorded response time is the union across them.
    let jobs = vec![Job::new(
        JobId::new(1, 1),
        Interval::new(0, 0),
        vec![Interval::new(3, 3), Interval::new(2, 2)],
        5,
        1,
        1,
        2,
    )];
    let precedence = Precedence::empty(1);
    let result = explore(&jobs, &precedence, 2, &NullIip, &Config::default()).unwrap();
    assert!(result.is_schedulable());
    assert_eq!(result.response_times[0], Some(Interval::new(2, 3)));
}
