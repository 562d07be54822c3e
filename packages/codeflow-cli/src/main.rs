use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codeflow_scheduler::{FlowConfig, FlowScheduler, Owners, WorldKind};
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scenes;

use scenes::Scene;

#[derive(Parser)]
#[command(name = "codeflow-sim")]
#[command(about = "Drives a codeflow scheduler from a fixed-step clock", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted scene
    Run {
        #[arg(value_enum)]
        scene: Scene,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 240)]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        #[arg(long, default_value_t = 1.0)]
        time_dilation: f32,
        #[arg(long, value_enum, default_value_t = WorldArg::Game)]
        world: WorldArg,
    },
    /// List the available scenes
    Scenes,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorldArg {
    Game,
    GamePreview,
    GameRpc,
    Pie,
    Editor,
    Inactive,
}

impl From<WorldArg> for WorldKind {
    fn from(world: WorldArg) -> Self {
        match world {
            WorldArg::Game => WorldKind::Game,
            WorldArg::GamePreview => WorldKind::GamePreview,
            WorldArg::GameRpc => WorldKind::GameRpc,
            WorldArg::Pie => WorldKind::Pie,
            WorldArg::Editor => WorldKind::Editor,
            WorldArg::Inactive => WorldKind::Inactive,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .init();

    match cli.command {
        Commands::Run {
            scene,
            frames,
            dt,
            time_dilation,
            world,
        } => run(scene, frames, dt, time_dilation, world.into()),
        Commands::Scenes => {
            for value in Scene::value_variants()
                .iter()
                .filter_map(ValueEnum::to_possible_value)
            {
                let help = value.get_help().map(ToString::to_string);
                println!("{:<10} {}", value.get_name(), help.unwrap_or_default());
            }
            Ok(())
        }
    }
}

fn run(scene: Scene, frames: u32, dt: f32, time_dilation: f32, world: WorldKind) -> Result<()> {
    if !time_dilation.is_finite() || time_dilation < 0.0 {
        anyhow::bail!("time dilation must be a finite, non-negative number");
    }

    let owners = Rc::new(Owners::new());
    let config = FlowConfig::for_world(world).with_time_dilation(time_dilation);
    let flow = FlowScheduler::with_config(owners.clone(), config);

    scenes::setup(scene, &flow, &owners);
    info!(?scene, frames, dt, pending = flow.pending_count(), "scene ready");

    for frame in 0..frames {
        flow.tick(dt)
            .with_context(|| format!("tick failed on frame {frame}"))?;
        if flow.action_count() == 0 && flow.pending_count() == 0 {
            info!(frame, "no actions left");
            break;
        }
    }

    info!(
        live = flow.action_count(),
        issued = flow.issued_handles(),
        "simulation finished"
    );
    flow.shutdown();
    Ok(())
}
