use crate::args::{Args, IipChoice};
use anyhow::Context;
use schedex::prelude::*;
use std::time::Duration;

/// Runs one analysis end to end. Returns whether the verdict was
/// SCHEDULABLE (the `quiet`-mode exit code in `main.rs` depends on this).
pub fn run(args: &Args) -> anyhow::Result<bool> {
    let workload_text = std::fs::read_to_string(&args.taskset.workload_file)
        .with_context(|| format!("reading workload file '{}'", args.taskset.workload_file))?;
    let jobs = schedex::io::parse_workload(&workload_text)?;

    let precedence = match &args.taskset.precedence_file {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading precedence file '{path}'"))?;
            let constraints = schedex::io::parse_precedence_file(&text)?;
            Precedence::build(&jobs, &constraints)?
        }
        None => Precedence::empty(jobs.len()),
    };

    if let Some(path) = &args.taskset.abort_file {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading abort file '{path}'"))?;
        let actions = schedex::io::parse_abort_file(&text)?;
        tracing::info!(count = actions.len(), "parsed abort actions (not applied to the engine)");
    }

    let collect_graph = args.engine.graph_out.is_some();

    let config = match &args.engine.config_file {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading config file '{path}'"))?;
            let mut config: Config = serde_json::from_str(&text).with_context(|| format!("parsing config file '{path}'"))?;
            config.collect_graph = collect_graph;
            config
        }
        None => Config {
            wall_clock_budget: args.engine.timeout_secs.map(Duration::from_secs),
            state_budget_per_depth: args.engine.state_budget_per_depth,
            stop_at_first_miss: args.engine.stop_at_first_miss,
            use_por: args.engine.use_por,
            merging: !args.engine.no_merge,
            threads: args.engine.threads,
            collect_graph,
        },
    };
    if config.collect_graph && config.threads != 1 {
        anyhow::bail!("--graph-out requires --threads 1");
    }

    let iip: Box<dyn Iip<i64>> = match args.engine.iip {
        IipChoice::Null => Box::new(NullIip),
        IipChoice::PrecautiousRm => Box::new(PrecautiousRm),
        IipChoice::CriticalWindowEdf => Box::new(CriticalWindowEdf),
    };

    let result = schedex::engine::explore(&jobs, &precedence, args.taskset.num_processors, iip.as_ref(), &config)?;

    print_verdict(&jobs, &result);

    if let Some(path) = &args.engine.graph_out {
        if let Some(graph) = &result.graph {
            write_graph(path, graph)?;
        }
    }

    Ok(result.is_schedulable())
}

fn print_verdict(jobs: &[Job<i64>], result: &AnalysisResult<i64>) {
    match &result.verdict {
        Verdict::Schedulable => println!("verdict: SCHEDULABLE"),
        Verdict::Unschedulable { witness } => {
            println!("verdict: UNSCHEDULABLE");
            for (job_index, parallelism) in witness {
                println!("  dispatch {} with p={parallelism}", jobs[*job_index].id());
            }
        }
        Verdict::Timeout => println!("verdict: TIMEOUT"),
    }

    for (idx, rt) in result.response_times.iter().enumerate() {
        match rt {
            Some(interval) => println!("  {}: response time {interval}", jobs[idx].id()),
            None => println!("  {}: never dispatched", jobs[idx].id()),
        }
    }
}

fn write_graph(path: &str, graph: &ExplorationGraph<i64>) -> anyhow::Result<()> {
    use std::fmt::Write as _;
    let mut out = String::new();
    for id in 0..graph.vertices().len() {
        let _ = writeln!(out, "v{id} [label=\"{}\"]", graph.vertex_label(id));
    }
    for (id, edge) in graph.edges().iter().enumerate() {
        let _ = writeln!(out, "v{} -> v{} [label=\"{}\"]", edge.from, edge.to, graph.edge_label(id));
    }
    std::fs::write(path, out).with_context(|| format!("writing graph output to '{path}'"))?;
    Ok(())
}
