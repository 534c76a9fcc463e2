//! Headless runner: advance one simulator and print its final metrics as JSON

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

use vizsim::prelude::*;

#[derive(Parser)]
#[command(name = "vizsim")]
#[command(about = "Run a visualization simulator headless", long_about = None)]
struct Cli {
    /// Settings file (JSON, one section per simulator)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ticks to advance before reporting
    #[arg(short, long, global = true, default_value_t = 1000)]
    ticks: usize,

    /// Seed overriding the configured one
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Double-pendulum ensemble
    Pendulum,

    /// Optimizer race from a start point
    Optimizer {
        /// Start x
        #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
        x: f64,

        /// Start y
        #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
        y: f64,
    },

    /// Lattice random walk
    Walk,

    /// Cognitive maps on an agent grid
    Cognitive,

    /// Compute-optimal scaling frontier (ignores --ticks)
    Scaling {
        #[arg(long, default_value_t = 1e7)]
        n_min: f64,

        #[arg(long, default_value_t = 1e13)]
        n_max: f64,

        #[arg(long, default_value_t = 100)]
        points: usize,
    },

    /// Goal-directed agents
    Goals,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<VizConfig> {
    let Some(path) = path else {
        return Ok(VizConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    VizConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
}

/// Advance `sim` and report why it stopped
fn run<S: Simulator>(sim: &mut S, ticks: usize) -> StepOutcome {
    let outcome = sim.advance(ticks);
    info!(ticks, ?outcome, "Run finished");
    outcome
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        config.pendulum.seed = Some(seed);
        config.optimizer.seed = Some(seed);
        config.walk.seed = Some(seed);
        config.cognitive.seed = Some(seed);
        config.goals.seed = Some(seed);
    }

    match cli.command {
        Commands::Pendulum => {
            let mut ensemble = PendulumEnsemble::new(config.pendulum)?;
            run(&mut ensemble, cli.ticks);
            print_json(&ensemble.metrics())
        }
        Commands::Optimizer { x, y } => {
            let mut bank = OptimizerBank::new(config.optimizer)?;
            bank.launch(Vector2::new(x, y));
            run(&mut bank, cli.ticks);
            print_json(&bank.metrics())
        }
        Commands::Walk => {
            let mut walk = RandomWalk::new(config.walk)?;
            run(&mut walk, cli.ticks);
            print_json(&walk.metrics())
        }
        Commands::Cognitive => {
            let mut model = CognitiveModel::new(config.cognitive)?;
            run(&mut model, cli.ticks);
            print_json(&model.metrics())
        }
        Commands::Scaling {
            n_min,
            n_max,
            points,
        } => {
            let law = ScalingLaw::new(config.scaling)?;
            print_json(&law.frontier(n_min, n_max, points)?)
        }
        Commands::Goals => {
            let mut arena = GoalArena::new(config.goals)?;
            run(&mut arena, cli.ticks);
            print_json(&arena.metrics())
        }
    }
}
