//! quad-run: integrate a catalog function with one of the three schedulers.
//!
//! Settings come from a TOML file (`--config`) or from `.env` plus
//! `QUAD_*` environment variables; command-line flags override either.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use subdivide_compute::{catalog, QuadratureEngine};
use subdivide_core::config::load_dotenv;
use subdivide_core::{Config, Strategy};

// ── CLI ─────────────────────────────────────────────────────────────

/// Adaptive Simpson quadrature over a parallel subdivision scheduler.
#[derive(Parser, Debug)]
#[command(name = "quad-run", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "QUAD_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog integrand name (see --list).
    #[arg(long)]
    integrand: Option<String>,

    /// Lower integration bound.
    #[arg(long, allow_hyphen_values = true)]
    left: Option<f64>,

    /// Upper integration bound.
    #[arg(long, allow_hyphen_values = true)]
    right: Option<f64>,

    /// Per-interval absolute tolerance.
    #[arg(long)]
    tol: Option<f64>,

    /// fork-join, work-stealing or shared-queue.
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Worker threads (0 = available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Capacity of each task queue.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Print the full run report as JSON.
    #[arg(long)]
    json: bool,

    /// List catalog integrands and exit.
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(integrand) = &self.integrand {
            config.problem.integrand = integrand.clone();
        }
        if let Some(left) = self.left {
            config.problem.left = left;
        }
        if let Some(right) = self.right {
            config.problem.right = right;
        }
        if let Some(tol) = self.tol {
            config.problem.tol = tol;
        }
        if let Some(strategy) = self.strategy {
            config.scheduler.strategy = strategy;
        }
        if let Some(workers) = self.workers {
            config.scheduler.worker_threads = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.scheduler.queue_capacity = capacity;
        }
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        for entry in catalog::entries() {
            println!("{:<12} {}", entry.name, entry.description);
        }
        return Ok(());
    }

    load_dotenv();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env(),
    };
    cli.apply(&mut config);
    config.validate()?;
    config.log_summary();

    let Some(integrand) = catalog::lookup(&config.problem.integrand) else {
        bail!(
            "unknown integrand '{}' (available: {})",
            config.problem.integrand,
            catalog::names().join(", ")
        );
    };

    let engine = QuadratureEngine::new(&config.scheduler);
    let problem = &config.problem;
    let report = engine
        .integrate(&integrand.function(), problem.left, problem.right, problem.tol)
        .context("integration aborted")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Threads: {}", report.workers);
    println!("Result = {:e}", report.value);
    if let Some(exact) = integrand.exact(problem.left, problem.right) {
        println!("Error = {:e}", (report.value - exact).abs());
    }
    println!("Time(s) = {:.6}", report.elapsed.as_secs_f64());
    info!(
        evaluations = report.stats.evaluations,
        max_queue_depth = report.stats.max_queue_depth,
        steals = report.stats.steals,
        "run complete"
    );
    Ok(())
}
