//! Window host implementing winit ApplicationHandler
//!
//! Plays the field full-bleed, presenting the software-rasterized frame
//! through a softbuffer surface.

use crate::config::DriftConfig;
use drift_core::DriftError;
use drift_field::{Canvas, FieldHost, ParticleField, PixelCanvas};
use drift_runtime::{FrameClock, FrameHandle, FrameScheduler, Signal, SignalBus, SignalSource};
use std::num::NonZeroU32;
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

/// Step scale reference rate: one step per frame at this refresh rate
const REFERENCE_HZ: f64 = 60.0;

type Surface = softbuffer::Surface<Rc<Window>, Rc<Window>>;

/// Frame scheduler backed by window redraw requests
#[derive(Default)]
struct RedrawScheduler {
    window: Option<Rc<Window>>,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl RedrawScheduler {
    /// The frame to deliver on this redraw, if one was requested
    fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Viewport, canvas, scheduler and signals for a field living in a window
#[derive(Default)]
struct WindowHost {
    viewport: (u32, u32),
    canvas: Option<PixelCanvas>,
    scheduler: RedrawScheduler,
    bus: SignalBus,
}

impl FieldHost for WindowHost {
    type Canvas = PixelCanvas;

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn canvas(&mut self) -> Option<&mut PixelCanvas> {
        self.canvas.as_mut()
    }

    fn scheduler(&mut self) -> &mut dyn FrameScheduler {
        &mut self.scheduler
    }

    fn signals(&mut self) -> &mut dyn SignalSource {
        &mut self.bus
    }
}

pub struct FieldApp {
    config: DriftConfig,
    field: ParticleField,
    host: WindowHost,
    clock: FrameClock,

    // Rendering
    window: Option<Rc<Window>>,
    surface: Option<Surface>,
    /// Composited logical-size frame, 0RGB
    frame: Vec<u32>,

    error: Option<DriftError>,
}

impl FieldApp {
    pub fn new(config: DriftConfig) -> Self {
        let field = match config.simulation.seed {
            Some(seed) => ParticleField::seeded(seed),
            None => ParticleField::new(),
        };
        Self {
            config,
            field,
            host: WindowHost::default(),
            clock: FrameClock::new(),
            window: None,
            surface: None,
            frame: Vec::new(),
            error: None,
        }
    }

    /// The failure that ended the event loop, if any
    pub fn take_error(&mut self) -> Option<DriftError> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> drift_core::Result<()> {
        let window_config = &self.config.window;
        let mut window_attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        if window_config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Rc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| DriftError::WindowError(e.to_string()))?,
        );
        let context = softbuffer::Context::new(Rc::clone(&window))
            .map_err(|e| DriftError::SurfaceError(e.to_string()))?;
        let surface = softbuffer::Surface::new(&context, Rc::clone(&window))
            .map_err(|e| DriftError::SurfaceError(e.to_string()))?;

        self.surface = Some(surface);
        self.window = Some(Rc::clone(&window));
        self.resize_surface(window.inner_size())?;

        let viewport = logical_size(&window, window.inner_size());
        info!(
            width = viewport.0,
            height = viewport.1,
            scale = window.scale_factor(),
            "window created"
        );

        self.host.viewport = viewport;
        self.host.canvas = Some(PixelCanvas::new(viewport.0, viewport.1));
        self.host.scheduler.window = Some(window);
        if !self.field.mount(&mut self.host) {
            warn!("particle field did not start");
        }
        Ok(())
    }

    fn resize_surface(&mut self, size: PhysicalSize<u32>) -> drift_core::Result<()> {
        let Some(surface) = &mut self.surface else {
            return Ok(());
        };
        // softbuffer cannot hold a zero-sized surface; keep the old one
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };
        surface
            .resize(width, height)
            .map_err(|e| DriftError::SurfaceError(e.to_string()))
    }

    /// Publish a signal and apply it right away
    fn signal(&mut self, signal: Signal) {
        if self.host.bus.publish(signal) {
            self.field.dispatch_signals(&mut self.host);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.field.unmount(&mut self.host);
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: DriftError) {
        error!("{err}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn redraw(&mut self) {
        // Redraws the system asks for (expose, restore) only re-present
        if let Some(handle) = self.host.scheduler.take_due() {
            if let Some(fps) = self.clock.tick() {
                debug!(fps, particles = self.field.store().len(), "frame rate");
            }
            if self.config.simulation.normalize_timestep {
                self.field.set_step_scale(self.clock.step_scale(REFERENCE_HZ));
            }
            self.field.on_frame(&mut self.host, handle);
        }

        if let Err(e) = self.present() {
            warn!("dropping frame: {e}");
        }
    }

    /// Composite the canvas over the backdrop and scale it onto the surface
    fn present(&mut self) -> drift_core::Result<()> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };
        let Some(canvas) = &self.host.canvas else {
            return Ok(());
        };
        let (width, height) = canvas.size();
        let physical = window.inner_size();
        if width == 0 || height == 0 || physical.width == 0 || physical.height == 0 {
            return Ok(());
        }

        let opacity = self.config.layer.opacity_at(self.clock.total_time as f32);
        self.frame.resize(width as usize * height as usize, 0);
        canvas.present_into(&mut self.frame, opacity, self.config.layer.backdrop());

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| DriftError::SurfaceError(e.to_string()))?;

        // Nearest-neighbor from logical to physical pixels
        let (lw, lh) = (width as usize, height as usize);
        let (pw, ph) = (physical.width as usize, physical.height as usize);
        for py in 0..ph {
            let ly = py * lh / ph;
            for px in 0..pw {
                let lx = px * lw / pw;
                if let Some(dst) = buffer.get_mut(py * pw + px) {
                    *dst = self.frame[ly * lw + lx];
                }
            }
        }

        buffer
            .present()
            .map_err(|e| DriftError::SurfaceError(e.to_string()))
    }
}

fn logical_size(window: &Window, physical: PhysicalSize<u32>) -> (u32, u32) {
    let logical: LogicalSize<f64> = physical.to_logical(window.scale_factor());
    (logical.width.round() as u32, logical.height.round() as u32)
}

impl ApplicationHandler for FieldApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Err(e) = self.resize_surface(new_size) {
                    self.fail(event_loop, e);
                    return;
                }
                let Some(window) = &self.window else {
                    return;
                };
                let (width, height) = logical_size(window, new_size);
                self.host.viewport = (width, height);
                self.signal(Signal::Resize { width, height });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let Some(window) = &self.window else {
                    return;
                };
                let logical = position.to_logical::<f32>(window.scale_factor());
                self.signal(Signal::PointerMove {
                    x: logical.x,
                    y: logical.y,
                });
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windowless_host(width: u32, height: u32) -> WindowHost {
        WindowHost {
            viewport: (width, height),
            canvas: Some(PixelCanvas::new(0, 0)),
            ..WindowHost::default()
        }
    }

    #[test]
    fn test_redraw_scheduler_keeps_latest_request() {
        let mut scheduler = RedrawScheduler::default();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        assert_ne!(first, second);

        scheduler.cancel_frame(first);
        assert_eq!(scheduler.take_due(), Some(second));
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn test_cancel_clears_pending() {
        let mut scheduler = RedrawScheduler::default();
        let handle = scheduler.request_frame();
        scheduler.cancel_frame(handle);
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn test_field_runs_on_redraws() {
        let mut host = windowless_host(400, 300);
        let mut field = ParticleField::seeded(1);
        assert!(field.mount(&mut host));
        assert_eq!(host.canvas.as_ref().map(|c| c.size()), Some((400, 300)));
        assert_eq!(field.ticks(), 0);

        for _ in 0..5 {
            let handle = host.scheduler.take_due().unwrap();
            field.on_frame(&mut host, handle);
        }
        assert_eq!(field.ticks(), 5);

        host.bus.publish(Signal::Resize {
            width: 800,
            height: 600,
        });
        field.dispatch_signals(&mut host);
        assert_eq!(field.store().len(), 24);

        field.unmount(&mut host);
        assert_eq!(host.scheduler.take_due(), None);
        assert_eq!(host.bus.subscription_count(), 0);
    }
}
