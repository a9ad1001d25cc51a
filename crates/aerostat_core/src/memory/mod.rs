//! # Memory
//!
//! Pre-allocated storage for particle systems.

mod slots;

pub use slots::FixedSlots;
