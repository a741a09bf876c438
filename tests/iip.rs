//! End-to-end coverage for the idle-insertion policies (§8 scenarios 1-2):
//! workloads where a priority-ceiling IIP turns an UNSCHEDULABLE plain
//! exploration into a SCHEDULABLE one.

use schedex::prelude::*;

fn explore_with(jobs: &[Job<i64>], iip: &dyn Iip<i64>, use_por: bool) -> AnalysisResult<i64> {
    let precedence = Precedence::empty(jobs.len());
    let config = Config { use_por, ..Config::default() };
    explore(jobs, &precedence, 1, iip, &config).unwrap()
}

fn high_frequency_task(cost: i64) -> Vec<Job<i64>> {
    (1..=6)
        .map(|k| {
            let release = (k - 1) * 10;
            Job::sequential(JobId::new(k as u64, 1), Interval::new(release, release), Interval::new(cost, cost), release + 10, 1)
        })
        .collect()
}

/// Figure 1 of Nasri & Fohler (ECRTS 2016): Precautious-RM rescues a
/// workload that plain rate-monotonic scheduling cannot.
#[test]
fn precautious_rm_saves_a_workload_plain_rm_loses() {
    let mut jobs = high_frequency_task(1);
    jobs.push(Job::sequential(JobId::new(1, 2), Interval::new(0, 0), Interval::new(8, 8), 30, 2));
    jobs.push(Job::sequential(JobId::new(2, 2), Interval::new(30, 30), Interval::new(8, 8), 60, 2));
    jobs.push(Job::sequential(JobId::new(1, 3), Interval::new(0, 0), Interval::new(17, 17), 60, 3));

    let rm = explore_with(&jobs, &NullIip, true);
    assert!(!rm.is_schedulable(), "plain RM should miss a deadline on this workload");

    let p_rm = explore_with(&jobs, &PrecautiousRm, true);
    assert!(p_rm.is_schedulable(), "Precautious-RM should avoid the deadline miss");
}

/// Figure 2b of the same paper: Critical-Window-EDF rescues a workload that
/// plain EDF (priority == deadline) cannot.
#[test]
fn critical_window_edf_saves_a_workload_plain_edf_loses() {
    let mut jobs = high_frequency_task(3);
    for j in &mut jobs {
        // EDF: priority equals deadline for this scenario.
        *j = Job::sequential(j.id(), j.arrival_window(), Interval::new(3, 3), j.deadline(), j.deadline());
    }
    let middle_releases = [0, 12, 24, 36, 48];
    for (k, &release) in middle_releases.iter().enumerate() {
        let deadline = release + 12;
        jobs.push(Job::sequential(JobId::new((k + 1) as u64, 2), Interval::new(release, release), Interval::new(6, 6), deadline, deadline));
    }
    jobs.push(Job::sequential(JobId::new(1, 3), Interval::new(0, 0), Interval::new(8, 8), 60, 60));

    let edf = explore_with(&jobs, &NullIip, true);
    assert!(!edf.is_schedulable(), "plain EDF should miss a deadline on this workload");

    let cw_edf = explore_with(&jobs, &CriticalWindowEdf, true);
    assert!(cw_edf.is_schedulable(), "Critical-Window-EDF should avoid the deadline miss");
}
