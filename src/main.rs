use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use engine::prelude::*;
use util::Logos;

#[derive(Parser, Debug)]
#[command(about = "Run a colony simulation level without a display")]
struct Args {
    #[arg(long, value_parser = |e: &str| Ok::<Logos, &str>(Logos::new(e)), help = "World seed, overrides the level's seed")]
    seed: Option<Logos>,

    #[arg(long, help = "IDM file with simulation tuning values")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1000, help = "Number of frames to run")]
    frames: u64,

    #[arg(long, default_value_t = 0.05, help = "Seconds per frame")]
    dt: f32,

    #[arg(
        long,
        default_value_t = 200,
        help = "Frames between progress reports, 0 for none"
    )]
    report: u64,

    #[arg(help = "IDM level file")]
    level: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = Args::parse();

    let mut spec = WorldSpec::load(&args.level)?;
    if let Some(seed) = args.seed {
        spec.seed = seed;
    } else if spec.seed.is_empty() {
        spec.seed = Logos::sample(&mut rand::thread_rng(), 10);
    }
    log::info!("seed: {}", spec.seed);

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let clock = ManualClock::default();
    let mut world = World::build(&spec, config, clock.clone())?;
    let controls = Controls::default();

    for _ in 0..args.frames {
        clock.advance(args.dt as f64);
        world.step(args.dt, &controls);
        if args.report > 0 && world.frame() % args.report == 0 {
            report(&world);
        }
    }
    report(&world);

    Ok(())
}

fn report(world: &World) {
    log::info!(
        "frame {} ({:.1}s): {} entities, {} blocks, {} effects",
        world.frame(),
        world.now().as_secs(),
        world.entities().len(),
        world.blocks().len(),
        world.effects().len()
    );
    for colony in world.colonies() {
        let members = world
            .entities()
            .iter()
            .filter(|e| e.body.owner == Some(colony.id))
            .count();
        log::info!(
            "  {} ({}): budget {:.1}, {members} members",
            colony.name,
            colony.focus,
            colony.budget
        );
    }
}
