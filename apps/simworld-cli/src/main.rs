use anyhow::Context;
use clap::{Parser, Subcommand};
use simworld_input::{Key, KeyEvent};
use simworld_render::{DebugTextRenderer, Renderer};
use simworld_sandbox::scenario::{ActorTraceHooks, mouse_world};
use simworld_sandbox::{Sandbox, SandboxConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simworld-cli", about = "Headless runner for the simworld sandbox")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML sandbox config (window, models dir, speeds, keys)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info,
    /// List the hotkeys of the MouseWorld scenario
    Keys,
    /// Run the MouseWorld scenario without a window
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666")]
        dt: f64,
        /// Keys held down for the whole run, e.g. arrow_up
        #[arg(long = "hold", value_name = "KEY")]
        hold: Vec<Key>,
        /// Write a per-frame trace of the actor to this file
        #[arg(short, long)]
        trace: Option<PathBuf>,
        /// Print what each display region shows after the last frame
        #[arg(long)]
        render: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = SandboxConfig::load_or_default(cli.config.as_deref())
        .context("loading sandbox config")?;

    match cli.command {
        Commands::Info => {
            println!("simworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "window: {} {}x{} fullscreen={}",
                config.window.title, config.window.width, config.window.height, config.window.fullscreen
            );
            println!("models: {}", config.models_dir.display());
            println!("notify user: {}", config.notify_user);
        }
        Commands::Keys => {
            let mut sandbox = Sandbox::new(config)?;
            mouse_world(&mut sandbox, None).context("building MouseWorld")?;
            for line in sandbox.keymap().help_lines() {
                println!("{line}");
            }
        }
        Commands::Run {
            frames,
            dt,
            hold,
            trace,
            render,
        } => {
            let mut sandbox = Sandbox::new(config)?.with_hooks(ActorTraceHooks);
            mouse_world(&mut sandbox, trace.as_deref()).context("building MouseWorld")?;
            for key in hold {
                sandbox.push_key(KeyEvent::pressed(key));
            }

            let mut ran = 0;
            while ran < frames && sandbox.frame(dt) {
                ran += 1;
            }
            if let Some(snapshot) = sandbox.snapshot() {
                println!(
                    "{} after {ran} frames ({:.3}s): pos=({:.3}, {:.3}, {:.3}) h={:.2} speed={:.3}",
                    snapshot.name,
                    snapshot.frame_time,
                    snapshot.position.x,
                    snapshot.position.y,
                    snapshot.position.z,
                    snapshot.heading,
                    snapshot.speed()
                );
            }
            if render {
                print!("{}", DebugTextRenderer::new().render(sandbox.world(), sandbox.stage()));
            }
            sandbox.shutdown();
        }
    }

    Ok(())
}
