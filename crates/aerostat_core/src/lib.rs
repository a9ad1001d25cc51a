//! # Aerostat Core
//!
//! Small, allocation-free building blocks shared by the rendering and
//! preloader crates:
//! - Fixed-capacity slot storage whose indices never move, so a GPU instance
//!   buffer can address particles by slot
//! - A display clock abstraction and a frame timer that turns it into
//!   clamped per-frame deltas
//! - One-way session latches for the preloader timeline
//!
//! ## Example
//!
//! ```rust
//! use aerostat_core::{FixedSlots, FrameTimer, ManualClock};
//! use std::time::Duration;
//!
//! let mut slots: FixedSlots<f32> = FixedSlots::new(4, |_| 0.0);
//! *slots.revive(2) = 1.5;
//! assert_eq!(slots.live_count(), 1);
//!
//! let clock = ManualClock::new();
//! let mut timer = FrameTimer::new(clock.clone(), Duration::from_millis(100));
//! clock.advance(Duration::from_millis(16));
//! assert!(timer.tick().delta_seconds > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod memory;
pub mod session;
pub mod time;

pub use memory::FixedSlots;
pub use session::{AnimationSessionState, Latch};
pub use time::{DisplayClock, FrameTime, FrameTimer, FrameTimerStats, ManualClock, MonotonicClock};
