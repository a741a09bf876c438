//! The engine's final output (§6): a verdict, optional witness path, and
//! the per-job response-time intervals accumulated along the way.

use crate::graph::ExplorationGraph;
use crate::interval::Interval;
use crate::jobs::JobIndex;
use crate::time::TimeBound;

/// One step of a witness path: the job dispatched and the parallelism it
/// was given.
pub type WitnessStep = (JobIndex, u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Schedulable,
    Unschedulable { witness: Vec<WitnessStep> },
    Timeout,
}

pub struct AnalysisResult<T: TimeBound> {
    pub verdict: Verdict,
    pub response_times: Vec<Option<Interval<T>>>,
    pub graph: Option<ExplorationGraph<T>>,
}

impl<T: TimeBound> AnalysisResult<T> {
    pub fn is_schedulable(&self) -> bool {
        matches!(self.verdict, Verdict::Schedulable)
    }
}
