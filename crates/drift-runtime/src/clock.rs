//! Frame clock with delta-time and FPS tracking

use std::time::Instant;

/// Longest frame delta the clock will report, in seconds
const MAX_DELTA: f64 = 0.25;

/// Tracks wall-clock time between host frames.
///
/// The particle field steps once per frame regardless of elapsed time; the
/// clock exists so hosts can opt into delta-time scaling and report FPS.
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Frames ticked since creation
    pub frame_count: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
    /// Frames and seconds accumulated in the current FPS window
    window_frames: u32,
    window_time: f64,
    fps: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            first_tick: true,
            window_frames: 0,
            window_time: 0.0,
            fps: 0.0,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock. Call once per frame.
    ///
    /// Returns the FPS measured over the last second whenever a one-second
    /// window completes.
    pub fn tick(&mut self) -> Option<f64> {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame_count += 1;
            return None;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit elapsed time (seconds)
    pub fn advance(&mut self, elapsed: f64) -> Option<f64> {
        // Clamp so a stalled window doesn't launch particles across the screen
        self.delta_time = elapsed.clamp(0.0, MAX_DELTA);
        self.total_time += self.delta_time;
        self.frame_count += 1;

        self.window_frames += 1;
        self.window_time += self.delta_time;
        if self.window_time >= 1.0 {
            self.fps = self.window_frames as f64 / self.window_time;
            self.window_frames = 0;
            self.window_time = 0.0;
            return Some(self.fps);
        }
        None
    }

    /// Most recent completed FPS measurement (0 until the first window completes)
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Multiplier that converts "one step per frame" into "units per
    /// `reference_hz`-th of a second". Frames without a measured delta step 1.0.
    pub fn step_scale(&self, reference_hz: f64) -> f32 {
        if self.delta_time <= 0.0 {
            1.0
        } else {
            (self.delta_time * reference_hz) as f32
        }
    }
}
