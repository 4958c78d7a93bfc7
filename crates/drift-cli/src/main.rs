//! Drift CLI - hosts for the ambient particle field

mod commands;
mod config;
mod window_app;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{render, run};
use config::ConfigOverrides;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drift")]
#[command(about = "Ambient particle field, windowed or rendered to PNG", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to ./drift.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window and play the field full-bleed
    Run {
        /// Initial window width in logical pixels
        #[arg(long)]
        width: Option<u32>,

        /// Initial window height in logical pixels
        #[arg(long)]
        height: Option<u32>,

        /// Launch in fullscreen mode
        #[arg(long)]
        fullscreen: bool,

        /// Seed for a reproducible particle layout
        #[arg(long)]
        seed: Option<u64>,

        /// Layer opacity over the backdrop (0-1)
        #[arg(long)]
        opacity: Option<f32>,

        /// Use the light-page backdrop
        #[arg(long)]
        light: bool,

        /// Scale each step by measured frame time (60 Hz reference)
        #[arg(long)]
        normalize_timestep: bool,
    },

    /// Simulate offscreen and write the final frame to a PNG image
    Render {
        /// Output image path
        #[arg(short, long, default_value = "drift.png")]
        output: PathBuf,

        /// Surface width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Surface height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Number of frames to simulate
        #[arg(long, default_value = "120", value_parser = clap::value_parser!(u32).range(1..))]
        frames: u32,

        /// Seed for a reproducible particle layout
        #[arg(long)]
        seed: Option<u64>,

        /// Pointer position held for the whole run (comma-separated x,y)
        #[arg(long, value_parser = parse_point)]
        pointer: Option<[f32; 2]>,

        /// Flatten the layer over the page backdrop instead of writing raw RGBA
        #[arg(long)]
        composite: bool,

        /// Layer opacity used by --composite (0-1)
        #[arg(long)]
        opacity: Option<f32>,

        /// Composite over the light-page backdrop
        #[arg(long)]
        light: bool,
    },
}

fn parse_point(s: &str) -> Result<[f32; 2], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("expected 2 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    Ok([x, y])
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            width,
            height,
            fullscreen,
            seed,
            opacity,
            light,
            normalize_timestep,
        } => run::run(run::RunArgs {
            config: cli.config,
            overrides: ConfigOverrides {
                width,
                height,
                fullscreen,
                seed,
                opacity,
                light,
                normalize_timestep,
            },
        }),
        Commands::Render {
            output,
            width,
            height,
            frames,
            seed,
            pointer,
            composite,
            opacity,
            light,
        } => render::run(render::RenderArgs {
            config: cli.config,
            output,
            width,
            height,
            frames,
            seed,
            opacity,
            light,
            pointer,
            composite,
        }),
    }
}
