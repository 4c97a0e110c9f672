//! Console driver for the logic graph.
//!
//! Builds `out = x0 AND NOT x1` and prints the output status for each input pattern.
//!
//! Usage: `tester [--pattern BITS]...`
//!
//! Set RUST_LOG=logic_graph=trace to watch evaluation and invalidation.

use std::error::Error;

use clap::Parser;
use logic_graph::{GateFunction, Graph, StatusCode};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Print the truth table of a small demonstration circuit.
#[derive(Parser, Debug)]
#[command(name = "tester")]
struct Args {
    /// Input pattern, one character per input slot ('1' is high). May be repeated; defaults to every pattern.
    #[arg(long = "pattern", value_name = "BITS")]
    patterns: Vec<String>,
}

fn build() -> Result<Graph, Box<dyn Error>> {
    let mut graph = Graph::new(2, 1);
    let and = graph.add_gate(GateFunction::And);
    let not = graph.add_inverter();

    graph.connect_slot(and, 0)?;
    graph.connect_slot(not, 1)?;
    graph.connect(and, not)?;
    graph.bind_output_slot(0, and)?;

    info!(circuit = %graph.describe(), "built circuit");
    Ok(graph)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let patterns = if args.patterns.is_empty() {
        ["00", "01", "10", "11"].iter().map(ToString::to_string).collect()
    } else {
        args.patterns
    };

    let mut graph = build()?;

    for pattern in &patterns {
        graph.feed_inputs(pattern)?;
        let status = graph.read_output_slot(0).code();
        println!("{pattern} -> {status}");
    }

    let stats = graph.stats();
    info!(cache_hits = stats.cache_hits, recomputations = stats.recomputations, "done");
    Ok(())
}
