//! Drift Runtime - Host loop infrastructure
//!
//! Provides the building blocks a host uses to drive a particle field:
//! - `FrameScheduler` / `FrameHandle` - one-shot frame requests and cancellation
//! - `ManualScheduler` - scheduler for offscreen hosts and tests
//! - `Signal` / `SignalBus` - resize and pointer-move subscriptions with a queue
//!   consumed between frames
//! - `FrameClock` - per-frame delta time and FPS measurement
//! - `PointerState` - last known pointer position

mod clock;
mod pointer;
mod scheduler;
mod signal;

pub use clock::FrameClock;
pub use pointer::PointerState;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use signal::{Signal, SignalBus, SignalKind, SignalSource, SubscriptionId};
