//! Run command: plays the particle field in a desktop window

use crate::config::{ConfigOverrides, DriftConfig};
use crate::window_app::FieldApp;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use winit::event_loop::{ControlFlow, EventLoop};

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = DriftConfig::load(args.config.as_deref(), &args.overrides)
        .context("Failed to load configuration")?;

    info!(
        width = config.window.width,
        height = config.window.height,
        fullscreen = config.window.fullscreen,
        seed = ?config.simulation.seed,
        "starting windowed host"
    );
    println!("Controls:");
    println!("  Mouse    - Push particles away");
    println!("  Escape   - Exit");

    // Frames are driven by redraw requests from the field's scheduler
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = FieldApp::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.take_error() {
        return Err(err).context("Window host failed");
    }
    Ok(())
}
