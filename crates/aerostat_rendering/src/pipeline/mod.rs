//! Render submission.
//!
//! The simulation never talks to a GPU API directly. Each frame it builds
//! [`RenderPass`]es (camera, object placements, instance batches as raw
//! bytes) and hands them to a [`Renderer`].

mod frame;
mod renderer;
mod stats;

pub use frame::{InstanceBatch, ObjectKind, ObjectPlacement, RenderPass};
pub use renderer::{HeadlessRenderer, PassRecord, Renderer};
pub use stats::RenderStats;
