//! Exploration configuration: budgets, POR/IIP toggles, and the
//! thread/graph-collection switches that pick which of §5's two execution
//! modes the engine runs in.

use serde::Deserialize;
use std::time::Duration;

/// Tunables for one analysis run. Deserializable so a CLI `--config` file
/// can supply it wholesale, mirroring how the taskset file itself is read.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wall-clock budget for the whole exploration; `None` means unbounded.
    pub wall_clock_budget: Option<Duration>,
    /// Per-depth state-count budget; `None` means unbounded.
    pub state_budget_per_depth: Option<usize>,
    /// Stop as soon as any dispatch flags a potential deadline miss, rather
    /// than continuing to explore and recording every miss found.
    pub stop_at_first_miss: bool,
    /// Apply partial-order reduction (§4.5) where the closure precondition
    /// holds.
    pub use_por: bool,
    /// Merge mergeable states within a node (§3). Disabling this switches to
    /// the naive, non-merging exploration mode (exists for reproducing the
    /// state counts `original_source` reports under "no merging").
    pub merging: bool,
    /// Worker thread count for the `rayon` thread-pool mode. `1` selects the
    /// deterministic single-threaded mode.
    pub threads: usize,
    /// Collect the observability graph. Requires `threads == 1` (§9).
    pub collect_graph: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            wall_clock_budget: None,
            state_budget_per_depth: None,
            stop_at_first_miss: false,
            use_por: true,
            merging: true,
            threads: 1,
            collect_graph: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_single_threaded_without_graph() {
        let cfg = Config::default();
        assert_eq!(cfg.threads, 1);
        assert!(!cfg.collect_graph);
        assert!(cfg.merging);
    }
}
