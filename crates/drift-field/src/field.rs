//! Lifecycle controller: mount, frame loop, signals, teardown

use crate::host::FieldHost;
use crate::integrator::{Bounds, Integrator};
use crate::particle::ParticleStore;
use crate::render::FieldRenderer;
use drift_runtime::{FrameHandle, Signal, SignalKind, SubscriptionId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

/// Where a field is in its life. Teardown is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    Running,
    Stopped,
}

/// An animated particle field bound to a host.
///
/// The field owns its simulation state and borrows the host on every call,
/// so a host drives it like this:
///
/// ```ignore
/// let mut field = ParticleField::seeded(7);
/// field.mount(&mut host);
/// loop {
///     field.dispatch_signals(&mut host);
///     for frame in host.take_frames() {
///         field.on_frame(&mut host, frame);
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ParticleField<R = SmallRng> {
    store: ParticleStore,
    integrator: Integrator,
    renderer: FieldRenderer,
    rng: R,
    phase: Phase,
    width: u32,
    height: u32,
    pending_frame: Option<FrameHandle>,
    subscriptions: Vec<SubscriptionId>,
    ticks: u64,
}

impl ParticleField<SmallRng> {
    /// Field seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Field with a reproducible particle layout
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for ParticleField<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ParticleField<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            store: ParticleStore::new(),
            integrator: Integrator::new(),
            renderer: FieldRenderer::new(),
            rng,
            phase: Phase::Unmounted,
            width: 0,
            height: 0,
            pending_frame: None,
            subscriptions: Vec::new(),
            ticks: 0,
        }
    }

    /// Attach to `host` and start the frame loop.
    ///
    /// Sizes the canvas to the viewport, seeds the store, requests the first
    /// frame, then subscribes to resize and pointer-move. Nothing moves or
    /// paints until that frame arrives. Returns false and
    /// does nothing when the host has no canvas, when already running, or
    /// after teardown.
    pub fn mount<H: FieldHost>(&mut self, host: &mut H) -> bool {
        if self.phase != Phase::Unmounted {
            debug!(phase = ?self.phase, "mount refused");
            return false;
        }
        if host.canvas().is_none() {
            debug!("no canvas attached, field stays idle");
            return false;
        }

        let (width, height) = host.viewport_size();
        self.apply_size(host, width, height);
        self.phase = Phase::Running;
        self.pending_frame = Some(host.scheduler().request_frame());

        let signals = host.signals();
        self.subscriptions = vec![
            signals.subscribe(SignalKind::Resize),
            signals.subscribe(SignalKind::PointerMove),
        ];
        info!(width, height, particles = self.store.len(), "particle field mounted");
        true
    }

    /// Frame callback from the host scheduler.
    ///
    /// Only the currently pending frame is honored; anything else, and
    /// anything after teardown, is ignored.
    pub fn on_frame<H: FieldHost>(&mut self, host: &mut H, handle: FrameHandle) {
        if self.phase != Phase::Running || self.pending_frame != Some(handle) {
            trace!(%handle, phase = ?self.phase, "ignoring frame");
            return;
        }
        self.pending_frame = None;
        self.tick(host);
    }

    /// Apply every queued resize and pointer signal, oldest first
    pub fn dispatch_signals<H: FieldHost>(&mut self, host: &mut H) {
        if self.phase != Phase::Running {
            return;
        }
        let signals = host.signals().drain();
        for signal in signals {
            match signal {
                Signal::Resize { width, height } => self.resize(host, width, height),
                Signal::PointerMove { x, y } => self.pointer_moved(x, y),
            }
        }
    }

    /// Adopt new surface dimensions and reseed the whole store
    pub fn resize<H: FieldHost>(&mut self, host: &mut H, width: u32, height: u32) {
        if self.phase != Phase::Running {
            return;
        }
        self.apply_size(host, width, height);
        debug!(width, height, particles = self.store.len(), "field resized");
    }

    /// Record the pointer position; particles are left alone
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if self.phase != Phase::Running {
            return;
        }
        self.store.set_pointer(x, y);
    }

    /// Stop for good: cancel the pending frame, then drop both subscriptions.
    pub fn unmount<H: FieldHost>(&mut self, host: &mut H) {
        match self.phase {
            Phase::Stopped => return,
            Phase::Unmounted => {
                self.phase = Phase::Stopped;
                return;
            }
            Phase::Running => {}
        }
        self.phase = Phase::Stopped;

        if let Some(handle) = self.pending_frame.take() {
            host.scheduler().cancel_frame(handle);
        }
        let signals = host.signals();
        for id in self.subscriptions.drain(..) {
            signals.unsubscribe(id);
        }
        info!(ticks = self.ticks, "particle field unmounted");
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn has_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Surface dimensions the simulation currently uses
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Ticks run since mount
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Simulated time per tick; 1.0 unless the host normalizes to frame time
    pub fn set_step_scale(&mut self, scale: f32) {
        self.integrator.set_step_scale(scale);
    }

    pub fn step_scale(&self) -> f32 {
        self.integrator.step_scale()
    }

    fn apply_size<H: FieldHost>(&mut self, host: &mut H, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        host.resize_canvas(width, height);
        self.store.reseed(width, height, &mut self.rng);
    }

    /// Integrate, paint, schedule the next frame
    fn tick<H: FieldHost>(&mut self, host: &mut H) {
        let bounds = Bounds::new(self.width, self.height);
        self.integrator.advance(&mut self.store, bounds);
        if let Some(canvas) = host.canvas() {
            self.renderer.paint(self.store.particles(), canvas);
        }
        self.ticks += 1;

        if self.phase == Phase::Running {
            self.pending_frame = Some(host.scheduler().request_frame());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, RecordingCanvas};
    use crate::host::OffscreenHost;
    use drift_core::Vec2;
    use drift_runtime::{FrameScheduler, ManualScheduler, SignalBus, SignalSource};

    fn host(width: u32, height: u32) -> OffscreenHost<RecordingCanvas> {
        OffscreenHost::new(width, height, RecordingCanvas::new(0, 0))
    }

    fn run_frames(field: &mut ParticleField, host: &mut OffscreenHost<RecordingCanvas>, n: usize) {
        for _ in 0..n {
            field.dispatch_signals(host);
            for frame in host.take_frames() {
                field.on_frame(host, frame);
            }
        }
    }

    #[test]
    fn mount_seeds_and_starts() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(1);
        assert!(field.mount(&mut host));

        assert!(field.is_running());
        assert_eq!(field.store().len(), 24);
        assert_eq!(field.dimensions(), (800, 600));
        assert_eq!(host.canvas_ref().map(|c| c.size()), Some((800, 600)));
        // Mount only schedules; the first tick waits for the frame
        assert_eq!(field.ticks(), 0);
        assert!(field.pending_frame().is_some());
        assert_eq!(host.manual_scheduler().pending_count(), 1);
        assert_eq!(host.bus().subscription_count(), 2);
    }

    #[test]
    fn mount_leaves_particles_and_canvas_alone() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(1);
        let mut seeded = ParticleStore::new();
        seeded.reseed(800, 600, &mut SmallRng::seed_from_u64(1));

        assert!(field.mount(&mut host));
        assert_eq!(field.store().particles(), seeded.particles());
        assert!(host.canvas_ref().is_some_and(|c| c.commands().is_empty()));

        run_frames(&mut field, &mut host, 1);
        assert_eq!(field.ticks(), 1);
        assert_ne!(field.store().particles(), seeded.particles());
        assert!(host.canvas_ref().is_some_and(|c| !c.commands().is_empty()));
    }

    #[test]
    fn mount_without_canvas_is_noop() {
        let mut host = OffscreenHost::<RecordingCanvas>::without_canvas(800, 600);
        let mut field = ParticleField::seeded(1);
        assert!(!field.mount(&mut host));

        assert_eq!(field.phase(), Phase::Unmounted);
        assert!(field.store().is_empty());
        assert_eq!(host.manual_scheduler().requested_total(), 0);
        assert_eq!(host.bus().subscription_count(), 0);
    }

    #[test]
    fn second_mount_refused() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(1);
        assert!(field.mount(&mut host));
        assert!(!field.mount(&mut host));
        assert_eq!(host.bus().subscription_count(), 2);

        field.unmount(&mut host);
        assert!(!field.mount(&mut host));
        assert!(field.has_stopped());
    }

    #[test]
    fn frames_tick_and_reschedule() {
        let mut host = host(400, 400);
        let mut field = ParticleField::seeded(2);
        field.mount(&mut host);
        run_frames(&mut field, &mut host, 10);
        assert_eq!(field.ticks(), 10);
        assert_eq!(host.manual_scheduler().pending_count(), 1);
    }

    #[test]
    fn stale_frame_is_ignored() {
        let mut host = host(400, 400);
        let mut field = ParticleField::seeded(2);
        field.mount(&mut host);
        let stale = FrameHandle(999);
        let before = field.store().particles().to_vec();
        field.on_frame(&mut host, stale);
        assert_eq!(field.ticks(), 0);
        assert_eq!(field.store().particles(), &before[..]);
    }

    #[test]
    fn resize_reseeds_and_keeps_pointer() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(3);
        field.mount(&mut host);
        host.move_pointer(10.0, 20.0);
        host.set_viewport(400, 300);
        field.dispatch_signals(&mut host);

        assert_eq!(field.dimensions(), (400, 300));
        assert_eq!(field.store().len(), 6);
        assert_eq!(field.store().pointer(), Vec2::new(10.0, 20.0));
        assert_eq!(host.canvas_ref().map(|c| c.size()), Some((400, 300)));
    }

    #[test]
    fn pointer_move_never_reseeds() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(4);
        field.mount(&mut host);
        let before = field.store().particles().to_vec();
        for i in 0..50 {
            host.move_pointer(i as f32 * 10.0, 300.0);
        }
        field.dispatch_signals(&mut host);

        assert_eq!(field.store().particles(), &before[..]);
        assert_eq!(field.store().pointer(), Vec2::new(490.0, 300.0));
    }

    #[test]
    fn zero_size_keeps_running_without_painting() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(5);
        field.mount(&mut host);
        host.set_viewport(0, 600);
        field.dispatch_signals(&mut host);
        if let Some(canvas) = host.canvas() {
            canvas.clear();
        }

        run_frames(&mut field, &mut host, 3);
        assert!(field.is_running());
        assert!(field.store().is_empty());
        assert!(host.canvas_ref().is_some_and(|c| c.commands().is_empty()));

        host.set_viewport(200, 200);
        run_frames(&mut field, &mut host, 1);
        assert_eq!(field.store().len(), 2);
        assert!(host.canvas_ref().is_some_and(|c| !c.commands().is_empty()));
    }

    #[test]
    fn teardown_then_callbacks_change_nothing() {
        let mut host = host(800, 600);
        let mut field = ParticleField::seeded(6);
        field.mount(&mut host);
        run_frames(&mut field, &mut host, 5);
        let pending = field.pending_frame();
        field.unmount(&mut host);

        assert!(field.has_stopped());
        assert_eq!(host.manual_scheduler().pending_count(), 0);
        assert_eq!(host.manual_scheduler().cancelled_total(), 1);
        assert_eq!(host.bus().subscription_count(), 0);

        let particles = field.store().particles().to_vec();
        let ticks = field.ticks();
        let commands = host.canvas_ref().map(|c| c.commands().len());
        for _ in 0..100 {
            if let Some(handle) = pending {
                field.on_frame(&mut host, handle);
            }
            field.on_frame(&mut host, FrameHandle(ticks + 1));
        }
        // Signals are dropped at the source once nobody subscribes
        assert!(!host.move_pointer(1.0, 1.0));
        assert!(!host.set_viewport(10, 10));
        field.pointer_moved(5.0, 5.0);
        field.resize(&mut host, 10, 10);
        field.dispatch_signals(&mut host);

        assert_eq!(field.ticks(), ticks);
        assert_eq!(field.store().particles(), &particles[..]);
        assert_eq!(field.dimensions(), (800, 600));
        assert!(!field.store().pointer_known());
        assert_eq!(host.canvas_ref().map(|c| c.commands().len()), commands);
        assert_eq!(host.manual_scheduler().pending_count(), 0);
    }

    #[test]
    fn unmount_twice_is_harmless() {
        let mut host = host(100, 100);
        let mut field = ParticleField::seeded(7);
        field.mount(&mut host);
        field.unmount(&mut host);
        field.unmount(&mut host);
        assert_eq!(host.manual_scheduler().cancelled_total(), 1);
    }

    #[test]
    fn unmount_before_mount_is_terminal() {
        let mut host = host(100, 100);
        let mut field = ParticleField::seeded(7);
        field.unmount(&mut host);
        assert!(field.has_stopped());
        assert!(!field.mount(&mut host));
        assert_eq!(host.manual_scheduler().requested_total(), 0);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a_host = host(640, 480);
        let mut b_host = host(640, 480);
        let mut a = ParticleField::seeded(11);
        let mut b = ParticleField::seeded(11);
        a.mount(&mut a_host);
        b.mount(&mut b_host);
        a_host.move_pointer(320.0, 240.0);
        b_host.move_pointer(320.0, 240.0);
        run_frames(&mut a, &mut a_host, 30);
        run_frames(&mut b, &mut b_host, 30);
        assert_eq!(a.store().particles(), b.store().particles());
    }

    /// Host whose scheduler and signal source share one operation log
    #[derive(Default)]
    struct Recorder {
        scheduler: ManualScheduler,
        bus: SignalBus,
        log: Vec<&'static str>,
    }

    impl FrameScheduler for Recorder {
        fn request_frame(&mut self) -> FrameHandle {
            self.log.push("request");
            self.scheduler.request_frame()
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.log.push("cancel");
            self.scheduler.cancel_frame(handle);
        }
    }

    impl SignalSource for Recorder {
        fn subscribe(&mut self, kind: SignalKind) -> SubscriptionId {
            self.log.push("subscribe");
            self.bus.subscribe(kind)
        }

        fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
            self.log.push("unsubscribe");
            self.bus.unsubscribe(id)
        }

        fn drain(&mut self) -> Vec<Signal> {
            self.bus.drain()
        }
    }

    struct RecordingHost {
        canvas: RecordingCanvas,
        recorder: Recorder,
    }

    impl FieldHost for RecordingHost {
        type Canvas = RecordingCanvas;

        fn viewport_size(&self) -> (u32, u32) {
            (300, 200)
        }

        fn canvas(&mut self) -> Option<&mut RecordingCanvas> {
            Some(&mut self.canvas)
        }

        fn scheduler(&mut self) -> &mut dyn FrameScheduler {
            &mut self.recorder
        }

        fn signals(&mut self) -> &mut dyn SignalSource {
            &mut self.recorder
        }
    }

    #[test]
    fn unmount_cancels_before_unsubscribing() {
        let mut host = RecordingHost {
            canvas: RecordingCanvas::new(0, 0),
            recorder: Recorder::default(),
        };
        let mut field = ParticleField::seeded(8);
        field.mount(&mut host);
        assert_eq!(
            host.recorder.log,
            vec!["request", "subscribe", "subscribe"]
        );

        host.recorder.log.clear();
        field.unmount(&mut host);
        assert_eq!(
            host.recorder.log,
            vec!["cancel", "unsubscribe", "unsubscribe"]
        );
        assert_eq!(host.recorder.scheduler.pending_count(), 0);
        assert_eq!(host.recorder.bus.subscription_count(), 0);
    }
}
