//! `schedex`: an abstract schedule-state exploration engine for
//! non-preemptive, uncertain-release/cost, optionally gang and
//! precedence-constrained real-time workloads.
//!
//! The core is the module graph under [`engine`], built from [`jobs`],
//! [`state`], [`node`], [`eligibility`], [`iip`] and [`reduction`]. Textual
//! I/O (`io`) and the CLI binary are external collaborators that only ever
//! talk to the core through [`jobs::Job`], [`verdict::AnalysisResult`] and
//! [`graph::ExplorationGraph`].

pub mod eligibility;
pub mod engine;
pub mod error;
pub mod graph;
pub mod iip;
pub mod index_set;
pub mod interval;
pub mod io;
pub mod jobs;
pub mod node;
pub mod precedence;
pub mod reduction;
pub mod response_time;
pub mod state;
pub mod time;
pub mod verdict;

pub mod prelude {
    pub use crate::eligibility::{eligible_candidates, Candidate};
    pub use crate::engine::{explore, Config};
    pub use crate::error::{EngineError, InputError};
    pub use crate::graph::ExplorationGraph;
    pub use crate::iip::{CriticalWindowEdf, Iip, NullIip, PrecautiousRm};
    pub use crate::index_set::IndexSet;
    pub use crate::interval::Interval;
    pub use crate::jobs::{Job, JobId, JobIndex, JobSet};
    pub use crate::precedence::{Precedence, PrecedenceConstraint};
    pub use crate::response_time::ResponseTimes;
    pub use crate::time::{Fixed, TimeBound};
    pub use crate::verdict::{AnalysisResult, Verdict, WitnessStep};
}
