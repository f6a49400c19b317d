#![deny(clippy::all, clippy::pedantic)]
//! # Inverted pendulum trainer
//!
//! Trains the tabular Q-learning controller from the `rl` crate against the
//! simulated cart-pole in [`sim`], and optionally stores the learned table.
//!
//! ```text
//! invpend_train --config invpend.json --seed 7 --save-q q_table.json
//! ```

mod sim;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rl::{Agent, AgentConfig, QTable};
use tracing_subscriber::EnvFilter;

use crate::sim::{SimCartPole, SimConfig};

#[derive(Parser, Debug)]
#[command(about = "Learn to balance a simulated inverted pendulum with tabular Q-learning")]
struct Args {
    /// JSON agent configuration. Missing fields use the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for both the agent and the simulator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Override the configured episode budget.
    #[arg(long)]
    episodes: Option<usize>,
    /// Write the learned Q-table here when training ends or stops.
    #[arg(long)]
    save_q: Option<PathBuf>,
    /// Resume from a previously saved Q-table.
    #[arg(long)]
    load_q: Option<PathBuf>,
    /// Stop training after this many wall-clock seconds.
    #[arg(long)]
    time_limit: Option<f64>,
    /// Run the simulator in wall-clock time.
    #[arg(long)]
    realtime: bool,
    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AgentConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if let Some(episodes) = args.episodes {
        config.max_episodes = episodes;
    }
    config.validate()?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let deadline = args.time_limit.map(deadline_after).transpose()?;

    let sim = SimCartPole::new(
        SimConfig {
            realtime: args.realtime,
            ..SimConfig::default()
        },
        args.seed,
    );
    let rng = fastrand::Rng::with_seed(args.seed);
    let mut agent = match &args.load_q {
        Some(path) => {
            let table = QTable::load_json(path)
                .with_context(|| format!("loading q-table {}", path.display()))?;
            tracing::info!("Resuming from {}", path.display());
            Agent::with_q_table(sim, config, table, rng)?
        }
        None => Agent::new(sim, config, rng)?,
    };

    let outcome = agent.run(|| deadline.is_some_and(|d| Instant::now() >= d));

    // The table stays consistent even if the run failed part-way.
    if let Some(path) = &args.save_q {
        agent
            .q_table()
            .save_json(path)
            .with_context(|| format!("saving q-table {}", path.display()))?;
        tracing::info!("Q-table written to {}", path.display());
    }

    let summary = outcome?;
    tracing::info!(
        "Run complete: {} episodes, longest {} steps, streak {}, solved: {}, stopped: {}",
        summary.episodes,
        summary.longest_episode,
        summary.streak,
        summary.solved,
        summary.stopped
    );
    Ok(())
}

fn deadline_after(secs: f64) -> Result<Instant> {
    let limit = Duration::try_from_secs_f64(secs)
        .with_context(|| format!("invalid time limit {secs} s"))?;
    Instant::now()
        .checked_add(limit)
        .ok_or_else(|| anyhow!("time limit {secs} s is out of range"))
}
