use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hyperlife::runtime::HeadlessSession;
use hyperlife::{PhysicsWorker, SandboxConfig, Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON config file; defaults are used for anything it leaves out
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the molecule count
    #[arg(long)]
    molecules: Option<usize>,

    /// How long to run the session
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Physics step threads (0 steps on the physics worker itself)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for every random draw
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> anyhow::Result<SandboxConfig> {
    let mut config = match &args.config {
        Some(path) => SandboxConfig::from_file(path)?,
        None => SandboxConfig::default(),
    };

    if let Some(count) = args.molecules {
        config.molecules.count = count;
    }
    if let Some(threads) = args.threads {
        config.physics.threads = threads;
    }
    if args.seed.is_some() {
        config.physics.seed = args.seed;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    let duration = Duration::try_from_secs_f32(args.seconds)
        .with_context(|| format!("Invalid session length: {}", args.seconds))?;

    log::info!(
        "Starting HyperLife: {} molecules in {}x{}, {:.0}s session",
        config.molecules.count,
        config.world.width,
        config.world.height,
        duration.as_secs_f32()
    );

    let simulation = Arc::new(Simulation::new(config).context("Failed to create world")?);
    let worker = PhysicsWorker::spawn(Arc::clone(&simulation))?;

    let summary = HeadlessSession::new(Arc::clone(&simulation)).run(duration);

    worker.stop().context("Physics worker failed")?;

    log::info!(
        "Session done: {} frames in {:.1}s, final speed {}x, {} molecules",
        summary.frames,
        summary.elapsed.as_secs_f32(),
        summary.stats.game_speed,
        summary.stats.molecule_count
    );
    Ok(())
}
