//! Headless field-to-PNG render command

use crate::config::{ConfigOverrides, DriftConfig};
use anyhow::{bail, Context, Result};
use drift_core::DriftError;
use drift_field::{Canvas, OffscreenHost, ParticleField, PixelCanvas};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct RenderArgs {
    pub config: Option<PathBuf>,
    pub output: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frames: u32,
    pub seed: Option<u64>,
    pub opacity: Option<f32>,
    pub light: bool,
    pub pointer: Option<[f32; 2]>,
    pub composite: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        width: args.width,
        height: args.height,
        seed: args.seed,
        opacity: args.opacity,
        light: args.light,
        ..Default::default()
    };
    let config = DriftConfig::load(args.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    let image = render_frames(&config, args.frames, args.pointer, args.composite)?;
    save_png(&image, &args.output)
        .with_context(|| format!("Failed to save image to {}", args.output.display()))?;

    println!(
        "Rendered {}x{} image ({} frames) to {}",
        image.width(),
        image.height(),
        args.frames,
        args.output.display()
    );
    Ok(())
}

/// Mount a field offscreen, run `frames` ticks, and return the last frame
pub fn render_frames(
    config: &DriftConfig,
    frames: u32,
    pointer: Option<[f32; 2]>,
    composite: bool,
) -> Result<RgbaImage> {
    let (width, height) = (config.window.width, config.window.height);
    let mut host = OffscreenHost::new(width, height, PixelCanvas::new(width, height));
    let mut field = match config.simulation.seed {
        Some(seed) => ParticleField::seeded(seed),
        None => ParticleField::new(),
    };

    if !field.mount(&mut host) {
        bail!("Particle field did not start");
    }
    if let Some([x, y]) = pointer {
        host.move_pointer(x, y);
    }
    info!(width, height, particles = field.store().len(), frames, "rendering offscreen");

    // Mount scheduled the first frame; each delivered frame is one tick
    while field.ticks() < u64::from(frames) {
        field.dispatch_signals(&mut host);
        let due = host.take_frames();
        if due.is_empty() {
            break;
        }
        for frame in due {
            field.on_frame(&mut host, frame);
        }
    }
    debug!(ticks = field.ticks(), "offscreen run finished");
    field.unmount(&mut host);

    let canvas = host
        .into_canvas()
        .context("Offscreen host lost its canvas")?;
    if composite {
        Ok(flatten(&canvas, config))
    } else {
        Ok(canvas.to_image())
    }
}

/// Encode `image` as PNG at `path`
pub fn save_png(image: &RgbaImage, path: &Path) -> drift_core::Result<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| DriftError::ImageError(e.to_string()))
}

/// Composite the layer over the page backdrop at full configured opacity
fn flatten(canvas: &PixelCanvas, config: &DriftConfig) -> RgbaImage {
    let (width, height) = canvas.size();
    let mut words = vec![0u32; width as usize * height as usize];
    canvas.present_into(&mut words, config.layer.opacity, config.layer.backdrop());
    RgbaImage::from_fn(width, height, |x, y| {
        let word = words[(y * width + x) as usize];
        Rgba([(word >> 16) as u8, (word >> 8) as u8, word as u8, 255])
    })
}
