use std::fs;
use std::io::Write;

use clap::Parser;
use env_logger::Builder;
use log::warn;

use fogplace::composition_graph::CompositionGraph;
use fogplace::global_state::GlobalState;
use fogplace::pipeline::{self, PipelineConfig};
use fogplace::selection::{KneenessSelector, Selector};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Runs the global composition stage on a JSON global state
struct Args {
    /// Path to the global state in JSON format
    #[arg(short, long)]
    state: String,

    /// Engine population size
    #[arg(long, default_value_t = 100)]
    population_size: usize,

    /// Objective evaluation budget
    #[arg(long, default_value_t = 10000)]
    max_evaluations: usize,

    /// Engine RNG seed
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Lp-norm exponent of the local fairness objective
    #[arg(long, default_value_t = 2.0)]
    fairness_exponent: f64,

    /// Position on cost-sorted local fronts
    #[arg(long, default_value_t = 0.5)]
    preference: f64,

    /// Write the selected composition graph to this GraphML file
    #[arg(long)]
    graphml: Option<String>,

    /// Write the replica count matrix to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.state)
        .unwrap_or_else(|_| panic!("Can't read file {}", args.state));
    let state: GlobalState = serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Can't parse JSON from file {}: {}", args.state, e));

    let config = PipelineConfig {
        population_size: args.population_size,
        max_evaluations: args.max_evaluations,
        seed: args.seed,
        fairness_exponent: args.fairness_exponent,
        preference: args.preference,
    };

    let (problem, front) = pipeline::solve_global(&state, &config);
    if !problem.is_complete() {
        warn!("composition is incomplete: some service has no assigned candidate");
    }

    println!("front of {}:", front.len());
    for solution in &front {
        println!(
            "cost = {:.3} latency = {:.3} feasible = {}",
            solution.objective(0),
            solution.objective(1),
            solution.is_feasible()
        );
    }

    let Some(selected) = KneenessSelector.select(&front) else {
        eprintln!("no feasible composition");
        std::process::exit(1);
    };
    println!(
        "selected: cost = {:.3} latency = {:.3}",
        selected.objective(0),
        selected.objective(1)
    );

    let graph = CompositionGraph::build(selected, &problem);
    let mut utilization: Vec<(String, f64)> = graph.utilization_per_resource().into_iter().collect();
    utilization.sort_by(|a, b| a.0.cmp(&b.0));
    for (resource, value) in utilization {
        println!("utilization {} = {:.3}", resource, value);
    }

    if let Some(path) = args.graphml {
        fs::write(&path, graph.to_graphml()).unwrap_or_else(|_| panic!("Can't write file {}", path));
    }
    if let Some(path) = args.csv {
        fs::write(&path, graph.to_csv()).unwrap_or_else(|_| panic!("Can't write file {}", path));
    }
}
