//! One-shot frame scheduling

use std::fmt;

/// Identifies one requested frame callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Host-provided frame primitive: one callback per display refresh.
///
/// A request schedules exactly one callback. Delivery is opportunistic; a
/// host may drop frames under load, but must never deliver a cancelled one.
pub trait FrameScheduler {
    /// Schedule the next frame callback
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a previously requested frame. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler that only delivers frames when the owner asks for them.
///
/// Used by offscreen hosts, where "the display refreshed" is a loop
/// iteration, and by tests that need exact control over delivery.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending frame, in request order, for delivery
    pub fn take_pending(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    /// Frames requested but not yet delivered or cancelled
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Total frames ever requested
    pub fn requested_total(&self) -> u64 {
        self.requested
    }

    /// Total frames cancelled while still pending
    pub fn cancelled_total(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() < before {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_ordered() {
        let mut sched = ManualScheduler::new();
        let a = sched.request_frame();
        let b = sched.request_frame();
        assert_ne!(a, b);
        assert_eq!(sched.take_pending(), vec![a, b]);
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(sched.requested_total(), 2);
    }

    #[test]
    fn cancel_removes_pending() {
        let mut sched = ManualScheduler::new();
        let a = sched.request_frame();
        let b = sched.request_frame();
        sched.cancel_frame(a);
        assert!(!sched.is_pending(a));
        assert!(sched.is_pending(b));
        assert_eq!(sched.cancelled_total(), 1);
    }

    #[test]
    fn cancel_unknown_handle_is_ignored() {
        let mut sched = ManualScheduler::new();
        sched.request_frame();
        sched.cancel_frame(FrameHandle(99));
        assert_eq!(sched.pending_count(), 1);
        assert_eq!(sched.cancelled_total(), 0);
    }

    #[test]
    fn handle_display() {
        assert_eq!(FrameHandle(7).to_string(), "frame#7");
    }
}
