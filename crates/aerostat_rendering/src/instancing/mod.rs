//! GPU instancing data for particle effects.
//!
//! ## Key Concepts
//!
//! - **Instance Buffer**: fixed-length array of per-instance data, one slot
//!   per particle, uploaded as raw bytes
//! - **Dirty Version**: bumped once per frame by whoever rewrote the buffer,
//!   so the renderer uploads at most once per frame
//! - **Zero Scale**: dead particles are hidden by a zero-scale matrix, never
//!   by removing their slot

mod buffer;
mod instance_data;
mod transform_builder;

pub use buffer::InstanceBuffer;
pub use instance_data::{InstanceColor, InstanceTransform};
pub use transform_builder::InstanceTransformBuilder;
