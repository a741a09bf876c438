const DEFAULT_AFTER_HELP: &str = "Refer to the crate's documentation for further help";

#[derive(clap::Parser, Debug)]
#[command(after_help = DEFAULT_AFTER_HELP)]
pub struct Args {
    /// Quiet mode / Exit code as analysis result
    ///
    /// When enabled, a zero exit code means SCHEDULABLE, a one means
    /// UNSCHEDULABLE, any other code means an error or TIMEOUT happened.
    #[arg(short = 'q', default_value = "false", action = clap::ArgAction::SetTrue)]
    pub quiet: bool,

    #[command(flatten, next_help_heading = "Taskset Specification")]
    pub taskset: TasksetArgs,

    #[command(flatten, next_help_heading = "Engine Configuration")]
    pub engine: EngineArgs,
}

#[derive(clap::Args, Debug)]
pub struct TasksetArgs {
    /// Workload CSV file (§6 grammar)
    #[arg(short = 'i', value_name = "WORKLOAD FILE")]
    pub workload_file: String,

    /// Precedence-edge CSV file
    #[arg(short = 'p', long = "precedence", value_name = "DAG FILE")]
    pub precedence_file: Option<String>,

    /// Abort-action CSV file (parsed, not wired into the engine)
    #[arg(long = "abort", value_name = "ABORT FILE")]
    pub abort_file: Option<String>,

    /// Number of processors
    #[arg(short = 'm', value_name = "# CPUs", default_value = "1")]
    pub num_processors: usize,
}

#[derive(clap::Args, Debug)]
pub struct EngineArgs {
    /// Idle-insertion policy
    #[arg(long = "iip", value_name = "POLICY", default_value = "null")]
    pub iip: IipChoice,

    /// Apply partial-order reduction where its precondition holds
    #[arg(long = "por", default_value = "true", action = clap::ArgAction::Set)]
    pub use_por: bool,

    /// Disable state merging (cross-check / reproducibility mode)
    #[arg(long = "no-merge", action = clap::ArgAction::SetTrue)]
    pub no_merge: bool,

    /// Worker thread count; 1 selects the deterministic single-threaded mode
    #[arg(long = "threads", value_name = "N", default_value = "1")]
    pub threads: usize,

    /// Wall-clock budget in seconds; unset means unbounded
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Per-depth state-count budget; unset means unbounded
    #[arg(long = "state-budget", value_name = "N")]
    pub state_budget_per_depth: Option<usize>,

    /// Stop as soon as the first potential deadline miss is found
    #[arg(long = "stop-at-first-miss", action = clap::ArgAction::SetTrue)]
    pub stop_at_first_miss: bool,

    /// Write the observability graph (as vertex/edge labels) to this file;
    /// requires --threads 1
    #[arg(long = "graph-out", value_name = "FILE")]
    pub graph_out: Option<String>,

    /// Load every engine knob above from a JSON config file instead, as an
    /// alternative to individual flags
    #[arg(long = "config", value_name = "FILE", conflicts_with_all = ["iip", "use_por", "no_merge", "threads", "timeout_secs", "state_budget_per_depth", "stop_at_first_miss"])]
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IipChoice {
    #[value(name = "null")]
    Null,
    #[value(name = "precautious-rm", alias("p-rm"))]
    PrecautiousRm,
    #[value(name = "critical-window-edf", alias("cw-edf"))]
    CriticalWindowEdf,
}
