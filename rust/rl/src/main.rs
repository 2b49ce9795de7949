use clap::{ArgAction, Parser, ValueEnum};
use gridworld::{GridWorld, PRISON_MAP};
use std::error::Error;
use std::path::PathBuf;
use tabular_dp::*;
use tracing::Level;

/// Solve a deterministic MDP with value iteration and Q-value iteration,
/// then walk the greedy policy through it.
#[derive(Parser, Debug)]
#[command(name = "tabular-dp")]
struct Cli {
    /// Grid world map file. The built-in prison map when neither this nor --mdp is given.
    #[arg(long, conflicts_with = "mdp")]
    map: Option<PathBuf>,

    /// JSON file with an explicit tabular MDP.
    #[arg(long)]
    mdp: Option<PathBuf>,

    /// JSON config file, see `DpConfig`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discount factor, in (0, 1].
    #[arg(long)]
    gamma: Option<f64>,

    /// Convergence threshold on the per-sweep delta.
    #[arg(long)]
    theta: Option<f64>,

    /// Fail instead of sweeping forever.
    #[arg(long)]
    max_sweeps: Option<usize>,

    /// Double-buffered sweeps instead of in-place updates.
    #[arg(long)]
    synchronous: bool,

    /// Which tables to compute and execute. `none` runs manually.
    #[arg(long, value_enum, default_value_t = Run::Both)]
    table: Run,

    /// Accept every greedy action instead of prompting.
    #[arg(long)]
    auto: bool,

    /// Abort an episode after this many actions.
    #[arg(long)]
    max_steps: Option<usize>,

    /// Print the computed tables as JSON.
    #[arg(long)]
    dump: bool,

    /// More logging, repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Run {
    V,
    Q,
    Both,
    None,
}

impl Run {
    fn tables(&self) -> Vec<Option<TableKind>> {
        match self {
            Run::V => vec![Some(TableKind::V)],
            Run::Q => vec![Some(TableKind::Q)],
            Run::Both => vec![Some(TableKind::V), Some(TableKind::Q)],
            Run::None => vec![None],
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;
    match (&cli.mdp, &cli.map) {
        (Some(path), _) => run(TabularMdp::load(path)?, &cli, &config),
        (None, Some(path)) => run(GridWorld::load(path)?, &cli, &config),
        (None, None) => run(PRISON_MAP.parse::<GridWorld>()?, &cli, &config),
    }
}

/// Config file first, then command line overrides.
fn build_config(cli: &Cli) -> Result<DpConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => DpConfig::load(path)?,
        None => DpConfig::default(),
    };

    if let Some(gamma) = cli.gamma {
        config.iteration.gamma = gamma;
    }
    if let Some(theta) = cli.theta {
        config.iteration.theta = theta;
    }
    if cli.max_sweeps.is_some() {
        config.iteration.max_sweeps = cli.max_sweeps;
    }
    if cli.synchronous {
        config.iteration.update = UpdateMode::Synchronous;
    }
    if cli.max_steps.is_some() {
        config.execution.max_steps = cli.max_steps;
    }

    config.validate()?;
    Ok(config)
}

fn run<E: Episodic>(mut env: E, cli: &Cli, config: &DpConfig) -> Result<(), Box<dyn Error>> {
    let mut solutions = Solutions::default();

    for kind in cli.table.tables() {
        if let Some(kind) = kind {
            solutions.solve(&env, kind, &config.iteration)?;
        }
        let table = kind.and_then(|k| solutions.table(k));

        let episode = if cli.auto {
            execute_policy(&mut env, table, &mut GreedySource, &config.execution)?
        } else {
            execute_policy(&mut env, table, &mut LineSource::stdio(), &config.execution)?
        };

        if cli.auto {
            println!("{}", env.render());
        }
        println!(
            "{} steps, return {}, {} rejected inputs",
            episode.steps.len(),
            episode.total_reward(),
            episode.rejections.len()
        );
    }

    if cli.dump {
        println!("{}", serde_json::to_string_pretty(&solutions)?);
    }

    Ok(())
}
