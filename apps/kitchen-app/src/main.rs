//! Kitchen manipulation environment CLI.
//!
//! Provides three modes of operation:
//! - `headless`: Run N episodes over the kinematic kitchen and print statistics
//! - `evaluate`: Score a JSON file of recorded rollouts
//! - `info`: Print crate versions and the effective configuration

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kitchen_core::config::KitchenConfig;
use kitchen_core::error::{EvaluationError, KitchenError};
use kitchen_core::traits::Policy;
use kitchen_env::prelude::*;
use kitchen_physics::presets::franka_kitchen;
use kitchen_policy::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Goal-conditioned kitchen manipulation environment.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run episodes locally and print statistics.
    Headless {
        /// Number of episodes to run.
        #[arg(short = 'n', long, default_value_t = 1)]
        episodes: u32,

        /// Steps per episode (at least 1).
        #[arg(
            short = 'm',
            long,
            default_value_t = 100,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        steps: u32,

        /// Random seed. Episode `i` is reset with `seed + i`.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Policy driving the arm.
        #[arg(short, long, value_enum, default_value_t = PolicyKind::Zero)]
        policy: PolicyKind,

        /// Write the recorded rollouts as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a JSON array of recorded rollouts.
    Evaluate {
        /// Rollout file, as written by `headless --output`.
        paths: PathBuf,
    },

    /// Print crate information.
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyKind {
    Zero,
    Random,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Kitchen(#[from] KitchenError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<KitchenConfig, AppError> {
    let config = match path {
        Some(path) => KitchenConfig::from_file(path).map_err(KitchenError::from)?,
        None => KitchenConfig::default(),
    };
    Ok(config)
}

/// Seed for episode `ep` of a run seeded with `base`. Wraps at `u64::MAX`.
fn episode_seed(base: u64, ep: u32) -> u64 {
    base.wrapping_add(u64::from(ep))
}

fn run_headless(
    config: KitchenConfig,
    episodes: u32,
    steps: u32,
    seed: Option<u64>,
    policy: PolicyKind,
    output: Option<&Path>,
) -> Result<(), AppError> {
    let mut env = KitchenEnv::builder(config, franka_kitchen())
        .scoring(RelaxScoring)
        .build()?;

    let policy: Box<dyn Policy> = match policy {
        PolicyKind::Zero => Box::new(ZeroPolicy::new(env.action_space().dim())),
        PolicyKind::Random => Box::new(RandomPolicy::new(
            env.action_space().clone(),
            seed.unwrap_or(env.config().seed),
        )),
    };
    let mut runner = PolicyRunner::new(policy, env.action_space().dim());

    let mut paths = Vec::new();
    for ep in 0..episodes {
        let path = runner.run_episode(&mut env, steps, seed.map(|s| episode_seed(s, ep)))?;
        let episode = env.episode();
        println!(
            "episode {}: steps={}, reward={:.3}, score={:.3}",
            ep + 1,
            episode.step_count,
            episode.total_reward,
            episode.mean_score().unwrap_or(0.0)
        );
        paths.push(path);
    }

    if !paths.is_empty() {
        println!("\nevaluation: {:.3}", env.evaluate_success(&paths)?);
    }

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&paths).map_err(|source| AppError::Json {
            path: output.to_path_buf(),
            source,
        })?;
        std::fs::write(output, json).map_err(|source| AppError::Io {
            path: output.to_path_buf(),
            source,
        })?;
        info!(path = %output.display(), rollouts = paths.len(), "rollouts written");
    }

    env.close();
    Ok(())
}

fn run_evaluate(file: &Path) -> Result<(), AppError> {
    let content = std::fs::read_to_string(file).map_err(|source| AppError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let paths: Vec<RolloutPath> =
        serde_json::from_str(&content).map_err(|source| AppError::Json {
            path: file.to_path_buf(),
            source,
        })?;
    let succeeded = paths
        .iter()
        .filter(|p| p.succeeded().unwrap_or(false))
        .count();
    println!("rollouts: {} ({succeeded} succeeded)", paths.len());
    println!("evaluation: {:.3}", evaluate_rollouts(&paths)?);
    Ok(())
}

fn run_info(config: &KitchenConfig) {
    println!("kitchen v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  kitchen-core     {}", env!("CARGO_PKG_VERSION"));
    println!("  kitchen-physics  {}", env!("CARGO_PKG_VERSION"));
    println!("  kitchen-actuator {}", env!("CARGO_PKG_VERSION"));
    println!("  kitchen-env      {}", env!("CARGO_PKG_VERSION"));
    println!("  kitchen-policy   {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("model:       {}", config.model_path.display());
    println!("calibration: {}", config.calibration_path.display());
    println!(
        "dofs:        {} robot + {} object",
        config.robot.n_dof_robot, config.robot.n_dof_object
    );
    println!("observation: {}", config.observation_dim());
    println!("frame_skip:  {}", config.frame_skip);
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Some(Commands::Headless {
            episodes,
            steps,
            seed,
            policy,
            output,
        }) => run_headless(config, episodes, steps, seed, policy, output.as_deref()),
        Some(Commands::Evaluate { paths }) => run_evaluate(&paths),
        Some(Commands::Info) => {
            run_info(&config);
            Ok(())
        }
        // Default: run headless with defaults
        None => run_headless(config, 1, 100, None, PolicyKind::Zero, None),
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
