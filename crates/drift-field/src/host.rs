//! The environment a particle field is mounted into

use crate::canvas::Canvas;
use drift_runtime::{
    FrameHandle, FrameScheduler, ManualScheduler, Signal, SignalBus, SignalSource,
};

/// Everything a field needs from its embedding environment.
///
/// The host owns the drawing surface, the frame scheduler and the signal
/// source; the field borrows them for the duration of each call.
pub trait FieldHost {
    type Canvas: Canvas;

    /// Current viewport size (width, height)
    fn viewport_size(&self) -> (u32, u32);

    /// The drawing surface, if one is attached
    fn canvas(&mut self) -> Option<&mut Self::Canvas>;

    /// Resize the drawing surface to match the viewport
    fn resize_canvas(&mut self, width: u32, height: u32) {
        if let Some(canvas) = self.canvas() {
            canvas.resize(width, height);
        }
    }

    fn scheduler(&mut self) -> &mut dyn FrameScheduler;

    fn signals(&mut self) -> &mut dyn SignalSource;
}

/// Host without a window: frames are delivered when the owner asks for them.
#[derive(Debug)]
pub struct OffscreenHost<C: Canvas> {
    viewport: (u32, u32),
    canvas: Option<C>,
    scheduler: ManualScheduler,
    bus: SignalBus,
}

impl<C: Canvas> OffscreenHost<C> {
    pub fn new(width: u32, height: u32, canvas: C) -> Self {
        Self {
            viewport: (width, height),
            canvas: Some(canvas),
            scheduler: ManualScheduler::new(),
            bus: SignalBus::new(),
        }
    }

    /// A host with no drawing surface attached
    pub fn without_canvas(width: u32, height: u32) -> Self {
        Self {
            viewport: (width, height),
            canvas: None,
            scheduler: ManualScheduler::new(),
            bus: SignalBus::new(),
        }
    }

    pub fn canvas_ref(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn into_canvas(self) -> Option<C> {
        self.canvas
    }

    pub fn manual_scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Change the viewport and announce it. Returns false if nobody listens.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        self.viewport = (width, height);
        self.bus.publish(Signal::Resize { width, height })
    }

    /// Announce pointer movement. Returns false if nobody listens.
    pub fn move_pointer(&mut self, x: f32, y: f32) -> bool {
        self.bus.publish(Signal::PointerMove { x, y })
    }

    /// Frames due for delivery, oldest first
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        self.scheduler.take_pending()
    }
}

impl<C: Canvas> FieldHost for OffscreenHost<C> {
    type Canvas = C;

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn canvas(&mut self) -> Option<&mut C> {
        self.canvas.as_mut()
    }

    fn scheduler(&mut self) -> &mut dyn FrameScheduler {
        &mut self.scheduler
    }

    fn signals(&mut self) -> &mut dyn SignalSource {
        &mut self.bus
    }
}
