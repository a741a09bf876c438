//! The state-space exploration engine (§4.4): depth-stratified BFS over
//! the reachable `ScheduleState`s, with optional POR and observability
//! graph collection.

pub mod config;
pub mod frontier;

pub use config::Config;

use crate::eligibility::eligible_candidates;
use crate::error::EngineError;
use crate::graph::{ExplorationGraph, VertexId};
use crate::iip::Iip;
use crate::index_set::IndexSet;
use crate::interval::Interval;
use crate::jobs::{Job, JobIndex};
use crate::node::Node;
use crate::precedence::Precedence;
use crate::reduction;
use crate::response_time::ResponseTimes;
use crate::state::ScheduleState;
use crate::time::TimeBound;
use crate::verdict::{AnalysisResult, Verdict, WitnessStep};
use frontier::Frontier;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, trace, warn};

/// Tracks one observability-graph vertex per distinct `(scheduled,
/// lookup_key)` identity, creating it lazily on first reference. Only ever
/// touched from the single serial worker when `Config::collect_graph` is
/// set, so the locks here are never contended.
struct GraphBuilder<T: TimeBound> {
    graph: Mutex<ExplorationGraph<T>>,
    vertex_of: Mutex<HashMap<(IndexSet, u64), VertexId>>,
}

impl<T: TimeBound> GraphBuilder<T> {
    fn new() -> Self {
        GraphBuilder { graph: Mutex::new(ExplorationGraph::new()), vertex_of: Mutex::new(HashMap::new()) }
    }

    fn vertex_for(&self, state: &ScheduleState<T>) -> VertexId {
        let key = (state.scheduled().clone(), state.lookup_key());
        if let Some(&id) = self.vertex_of.lock().get(&key) {
            return id;
        }
        let id = self.graph.lock().push_vertex(state.core_avail_snapshot(), state.certain_job_indices());
        self.vertex_of.lock().insert(key, id);
        id
    }

    fn record_edge(&self, from: &ScheduleState<T>, job: JobIndex, parallelism: u32, to: &ScheduleState<T>) {
        let from_id = self.vertex_for(from);
        let to_id = self.vertex_for(to);
        self.graph.lock().push_edge(from_id, job, parallelism, to_id);
    }

    fn into_inner(self) -> ExplorationGraph<T> {
        self.graph.into_inner()
    }
}

/// Depth-keyed bank of in-progress frontiers. A plain dispatch always
/// targets `depth + 1`; a closed POR reduction set targets `depth + |R|`,
/// so the engine cannot assume a single "next" bucket — any later depth's
/// bucket may need to be created on demand while the current depth is
/// still being expanded in parallel.
struct FrontierBank<T: TimeBound> {
    buckets: Mutex<BTreeMap<usize, Arc<Frontier<T>>>>,
}

impl<T: TimeBound> FrontierBank<T> {
    fn new() -> Self {
        FrontierBank { buckets: Mutex::new(BTreeMap::new()) }
    }

    fn bucket(&self, depth: usize) -> Arc<Frontier<T>> {
        self.buckets.lock().entry(depth).or_insert_with(|| Arc::new(Frontier::new())).clone()
    }

    fn take_lowest(&self) -> Option<(usize, Arc<Frontier<T>>)> {
        let mut buckets = self.buckets.lock();
        let depth = *buckets.keys().next()?;
        let frontier = buckets.remove(&depth).unwrap();
        Some((depth, frontier))
    }
}

/// Runs the exploration to completion and returns the final verdict,
/// response-time table, and (if requested) observability graph.
pub fn explore<T: TimeBound>(
    jobs: &[Job<T>],
    precedence: &Precedence,
    num_processors: usize,
    iip: &dyn Iip<T>,
    config: &Config,
) -> Result<AnalysisResult<T>, EngineError> {
    if config.collect_graph && config.threads != 1 {
        return Err(EngineError::GraphEmissionRequiresSerialRun);
    }

    // Structural infeasibility precheck (§7): a job whose best case alone
    // cannot meet its deadline dooms the workload before exploration starts.
    for (idx, job) in jobs.iter().enumerate() {
        if job.exceeds_deadline(job.earliest_arrival() + job.least_cost(job.s_min())) {
            warn!(job = idx, "structurally infeasible: best case already misses deadline");
            return Ok(AnalysisResult {
                verdict: Verdict::Unschedulable { witness: vec![(idx, job.s_min())] },
                response_times: vec![None; jobs.len()],
                graph: None,
            });
        }
    }

    let response_times = ResponseTimes::new(jobs.len());
    let cancelled = Arc::new(AtomicBool::new(false));
    let graph_builder = config.collect_graph.then(GraphBuilder::new);
    let start = Instant::now();

    let bank: FrontierBank<T> = FrontierBank::new();
    bank.bucket(0).locate(ScheduleState::initial(num_processors), Vec::new(), config.merging);

    let miss_witness: Mutex<Option<Vec<WitnessStep>>> = Mutex::new(None);

    let pool = if config.threads > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()
                .expect("thread pool construction should not fail for a positive thread count"),
        )
    } else {
        None
    };

    while let Some((depth, frontier)) = bank.take_lowest() {
        if let Some(budget) = config.wall_clock_budget {
            if start.elapsed() > budget {
                info!(depth, "wall-clock budget exceeded");
                return Ok(timeout_result(&response_times, graph_builder));
            }
        }

        let entries = frontier.entries();
        let state_count: usize = entries.iter().map(|(node, _)| node.state_count()).sum();
        if let Some(budget) = config.state_budget_per_depth {
            if state_count > budget {
                info!(depth, state_count, "per-depth state budget exceeded");
                return Ok(timeout_result(&response_times, graph_builder));
            }
        }
        trace!(depth, state_count, "expanding depth");

        let expand_entry = |node: &Arc<Node<T>>, witnesses: &[Vec<WitnessStep>]| {
            for (state, path) in node.states().iter().zip(witnesses.iter()) {
                if cancelled.load(Ordering::Relaxed) {
                    return;
                }
                expand_state(
                    jobs,
                    precedence,
                    num_processors,
                    iip,
                    config,
                    state,
                    path,
                    &bank,
                    &response_times,
                    &cancelled,
                    &miss_witness,
                    graph_builder.as_ref(),
                );
            }
        };

        match &pool {
            Some(pool) => pool.install(|| {
                use rayon::prelude::*;
                entries.par_iter().for_each(|(node, witnesses)| expand_entry(node, witnesses));
            }),
            None => {
                for (node, witnesses) in &entries {
                    expand_entry(node, witnesses);
                }
            }
        }

        if cancelled.load(Ordering::Relaxed) {
            break;
        }
    }

    let verdict = match miss_witness.into_inner() {
        Some(witness) => Verdict::Unschedulable { witness },
        None => Verdict::Schedulable,
    };
    Ok(AnalysisResult {
        verdict,
        response_times: response_times.snapshot(),
        graph: graph_builder.map(GraphBuilder::into_inner),
    })
}

fn timeout_result<T: TimeBound>(response_times: &ResponseTimes<T>, graph_builder: Option<GraphBuilder<T>>) -> AnalysisResult<T> {
    AnalysisResult {
        verdict: Verdict::Timeout,
        response_times: response_times.snapshot(),
        graph: graph_builder.map(GraphBuilder::into_inner),
    }
}

#[allow(clippy::too_many_arguments)]
fn expand_state<T: TimeBound>(
    jobs: &[Job<T>],
    precedence: &Precedence,
    num_processors: usize,
    iip: &dyn Iip<T>,
    config: &Config,
    state: &ScheduleState<T>,
    path: &[WitnessStep],
    bank: &FrontierBank<T>,
    response_times: &ResponseTimes<T>,
    cancelled: &Arc<AtomicBool>,
    miss_witness: &Mutex<Option<Vec<WitnessStep>>>,
    graph_builder: Option<&GraphBuilder<T>>,
) {
    let candidates = iip.filter(jobs, state, eligible_candidates(jobs, precedence, state));
    if candidates.is_empty() {
        return;
    }

    if config.use_por {
        let seed: Vec<JobIndex> = candidates
            .iter()
            .map(|c| c.job_index)
            .filter(|&j| jobs[j].s_min() == 1 && jobs[j].s_max() == 1)
            .collect();
        if !seed.is_empty() {
            if let Some(closed) = reduction::try_close(jobs, precedence, state.scheduled(), state.core_availability(1), seed) {
                dispatch_reduction(jobs, precedence, num_processors, state, path, &closed, bank, response_times, config.merging, graph_builder);
                return;
            }
        }
    }

    let depth_next = bank.bucket(state.num_scheduled() + 1);
    for candidate in candidates {
        let job = &jobs[candidate.job_index];
        let start = Interval::new(candidate.est, candidate.lst);
        let finish = Interval::new(candidate.eft, candidate.lft);

        if candidate.potential_deadline_miss {
            let mut witness = miss_witness.lock();
            if witness.is_none() {
                let mut full_path = path.to_vec();
                full_path.push((candidate.job_index, candidate.parallelism));
                *witness = Some(full_path);
            }
            drop(witness);
            if config.stop_at_first_miss {
                cancelled.store(true, Ordering::Relaxed);
            }
        }

        response_times.record(candidate.job_index, Interval::new(candidate.eft - job.earliest_arrival(), candidate.lft - job.earliest_arrival()));

        let successor = state.dispatch(
            candidate.job_index,
            job.hash_key(),
            precedence.predecessors_of(candidate.job_index),
            precedence.has_successors(candidate.job_index),
            candidate.parallelism,
            start,
            finish,
        );

        if let Some(gb) = graph_builder {
            gb.record_edge(state, candidate.job_index, candidate.parallelism, &successor);
        }

        let mut witness_path = path.to_vec();
        witness_path.push((candidate.job_index, candidate.parallelism));
        depth_next.locate(successor, witness_path, config.merging);
    }
}

#[allow(clippy::too_many_arguments)]
fn dispatch_reduction<T: TimeBound>(
    jobs: &[Job<T>],
    precedence: &Precedence,
    num_processors: usize,
    state: &ScheduleState<T>,
    path: &[WitnessStep],
    closed: &reduction::ClosedReduction<T>,
    bank: &FrontierBank<T>,
    response_times: &ResponseTimes<T>,
    merging: bool,
    graph_builder: Option<&GraphBuilder<T>>,
) {
    let members_with_successors: Vec<JobIndex> = closed.members.iter().copied().filter(|&j| precedence.has_successors(j)).collect();
    let members_key = closed.members.iter().fold(0u64, |acc, &j| acc ^ jobs[j].hash_key());

    for &j in &closed.members {
        let job = &jobs[j];
        let lst = closed.latest_start_times[&j];
        let best_case = job.earliest_arrival().max(state.core_availability(1).min());
        response_times.record(
            j,
            Interval::new(
                (best_case + job.least_cost(1)) - job.earliest_arrival(),
                (lst + job.maximal_cost(1)) - job.earliest_arrival(),
            ),
        );
    }

    let successor = state.dispatch_reduction(&closed.members, members_key, &members_with_successors, closed.latest_busy_time);
    debug_assert_eq!(successor.core_avail_snapshot().len(), num_processors);

    if let Some(gb) = graph_builder {
        let representative = *closed.members.iter().min().unwrap();
        gb.record_edge(state, representative, 1, &successor);
    }

    let mut witness_path = path.to_vec();
    witness_path.extend(closed.members.iter().map(|&j| (j, 1)));
    bank.bucket(successor.num_scheduled()).locate(successor, witness_path, merging);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iip::NullIip;
    use crate::jobs::JobId;

    fn seq(task: u64, id: u64, arr: (i64, i64), cost: (i64, i64), dl: i64, prio: i64) -> Job<i64> {
        Job::sequential(JobId::new(task, id), Interval::new(arr.0, arr.1), Interval::new(cost.0, cost.1), dl, prio)
    }

    #[test]
    fn single_job_single_processor_is_schedulable() {
        let jobs = vec![seq(1, 1, (0, 0), (1, 1), 10, 1)];
        let precedence = Precedence::empty(1);
        let config = Config { use_por: false, ..Config::default() };
        let result = explore(&jobs, &precedence, 1, &NullIip, &config).unwrap();
        assert!(result.is_schedulable());
        assert_eq!(result.response_times[0], Some(Interval::new(1, 1)));
    }

    #[test]
    fn structurally_infeasible_job_is_unschedulable_without_exploring() {
        let jobs = vec![seq(1, 1, (5, 5), (10, 10), 8, 1)];
        let precedence = Precedence::empty(1);
        let config = Config::default();
        let result = explore(&jobs, &precedence, 1, &NullIip, &config).unwrap();
        assert!(!result.is_schedulable());
    }

    #[test]
    fn deadline_miss_witness_scenario() {
        // §8 scenario 4.
        let jobs = vec![
            seq(1, 1, (1, 1), (1, 1), 3, 1),
            seq(1, 2, (4, 4), (1, 1), 6, 2),
            seq(1, 3, (0, 0), (1, 2), 3, 3),
            seq(1, 4, (2, 2), (3, 3), 6, 4),
        ];
        let precedence = Precedence::empty(4);
        let config = Config { use_por: false, ..Config::default() };
        let result = explore(&jobs, &precedence, 1, &NullIip, &config).unwrap();
        assert!(!result.is_schedulable());
        assert!(matches!(result.verdict, Verdict::Unschedulable { .. }));
    }

    #[test]
    fn gang_job_dispatches_with_requested_parallelism() {
        // §8 scenario 5.
        let jobs = vec![Job::new(JobId::new(1, 1), Interval::new(0, 0), vec![Interval::new(4, 6)], 10, 1, 2, 2)];
        let precedence = Precedence::empty(1);
        let config = Config { use_por: false, ..Config::default() };
        let result = explore(&jobs, &precedence, 2, &NullIip, &config).unwrap();
        assert!(result.is_schedulable());
        assert_eq!(result.response_times[0], Some(Interval::new(4, 6)));
    }

    #[test]
    fn graph_collection_requires_single_thread() {
        let jobs = vec![seq(1, 1, (0, 0), (1, 1), 10, 1)];
        let precedence = Precedence::empty(1);
        let config = Config { threads: 4, collect_graph: true, ..Config::default() };
        let err = explore(&jobs, &precedence, 1, &NullIip, &config).unwrap_err();
        assert!(matches!(err, EngineError::GraphEmissionRequiresSerialRun));
    }
}
