//! Textual front-end: reads one goal formula, runs the solver, and prints
//! the proof chain or the failure message. The reasoning engine lives in
//! the `sl_prover` library; this binary is just stdin/stdout plumbing.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sl_prover::solver::HeuristicBounds;
use sl_prover::{Expression, Outcome, Solver, SolverConfig};

/// Prove a goal formula in Hilbert-style propositional logic.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// The goal formula to prove. Read from stdin if omitted.
    goal: Option<String>,

    /// Milliseconds the saturation loop is allowed to run before giving up.
    #[arg(long, default_value_t = SolverConfig::default().time_limit_ms)]
    time_limit_ms: u64,

    /// Reject any candidate theorem longer than this many nodes.
    #[arg(long, default_value_t = HeuristicBounds::default().max_len)]
    length_bound: usize,

    /// Dump the derivation log to this path for human inspection.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let goal_text = match cli.goal {
        Some(g) => g,
        None => {
            let mut buf = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut buf) {
                eprintln!("failed to read goal from stdin: {err}");
                return ExitCode::FAILURE;
            }
            buf.trim().to_string()
        }
    };

    let goal = match Expression::new(&goal_text) {
        Ok(goal) => goal,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let config = SolverConfig {
        time_limit_ms: cli.time_limit_ms,
        heuristic: HeuristicBounds { max_len: cli.length_bound, ..HeuristicBounds::default() },
    };

    let mut solver = match Solver::new(goal, config) {
        Ok(solver) => solver,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let report = solver.solve();
    print!("{}", report.render());

    if let Some(path) = &cli.log_file {
        if let Err(err) = solver.derivation_log().write_to(path) {
            eprintln!("failed to write derivation log to {}: {err}", path.display());
        }
    }

    match report.outcome {
        Outcome::Proved { .. } | Outcome::Timeout => ExitCode::SUCCESS,
    }
}
