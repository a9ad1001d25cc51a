//! # Time
//!
//! Display clock abstraction and per-frame delta measurement.

mod clock;

pub use clock::{DisplayClock, FrameTime, FrameTimer, FrameTimerStats, ManualClock, MonotonicClock};
