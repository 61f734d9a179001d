use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dronesim::agent::Agent;
use dronesim::algorithms::random::RandomAgent;
use dronesim::config::{AppConfig, RenderMode};
use dronesim::environment::Environment;
use dronesim::environments::DroneSim;
use dronesim::wrappers::{FlattenObservation, TimeLimit};

/// Drive the drone navigation environment with the random baseline agent.
#[derive(Debug, Parser)]
#[command(name = "dronesim", version)]
struct Args {
    /// TOML file with [env] and [train] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    games: Option<usize>,

    #[arg(long)]
    max_episode_steps: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// human or rgb_array
    #[arg(long)]
    render: Option<RenderMode>,

    /// Skip learning and checkpointing
    #[arg(long)]
    evaluate: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(games) = args.games {
        config.train.n_games = games;
    }
    if let Some(steps) = args.max_episode_steps {
        config.train.max_episode_steps = steps;
    }
    if let Some(seed) = args.seed {
        config.env.seed = Some(seed);
        config.train.seed = Some(seed);
    }
    if args.render.is_some() {
        config.env.render_mode = args.render;
    }
    config.train.evaluate |= args.evaluate;

    tracing::info!(
        window_size = config.env.window_size,
        n_games = config.train.n_games,
        max_episode_steps = config.train.max_episode_steps,
        "starting dronesim"
    );

    let sim = DroneSim::new(config.env.clone()).context("failed to build environment")?;
    let mut env = TimeLimit::new(FlattenObservation::new(sim), config.train.max_episode_steps);
    let mut agent = RandomAgent::new(env.action_space(), config.train.seed);

    let summary = agent.train(&mut env, &config.train)?;
    env.close()?;

    tracing::info!(
        episodes = summary.score_history.len(),
        best_score = summary.best_score,
        "training finished"
    );
    Ok(())
}
