//! Runs a sensorimotor agent over a random depth world.
//!
//! # Usage
//!
//! ```text
//! sensorimotor [--config agent.toml] [--steps N] [--seed S]
//! ```
//!
//! Set `RUST_LOG=sensor_agent=debug` to see every patch and sparse code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sensor_agent::{Agent, AgentConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sensorimotor agent driving the surface feature extractor
#[derive(Parser, Debug)]
#[command(name = "sensorimotor")]
#[command(about = "Explore a random depth world and learn an object model", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of sensing steps
    #[arg(long)]
    steps: Option<u32>,

    /// Override the environment seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sensorimotor=info,sensor_agent=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AgentConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config = config.with_num_steps(steps);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    info!(
        rows = config.environment.rows,
        cols = config.environment.cols,
        side_len = config.patch.side_len,
        steps = config.run.num_steps,
        seed = config.environment.seed,
        "starting sensorimotor run"
    );

    let mut agent = Agent::new(config).context("invalid agent configuration")?;
    let summary = agent.run().context("sensorimotor run failed")?;

    info!(
        steps = summary.steps,
        fully_defined = summary.fully_defined_steps,
        final_location = %summary.final_location,
        committed = ?summary.committed_model,
        "run complete"
    );
    match summary.last_match {
        Some(m) => info!(model = m.model, distance = m.distance, "last observation recognised"),
        None => info!("no learnt model covers the last observation"),
    }

    Ok(())
}
