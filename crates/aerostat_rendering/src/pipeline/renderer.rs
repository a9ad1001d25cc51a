//! The renderer seam and a recording implementation.

use super::frame::RenderPass;
use super::stats::RenderStats;

/// Consumes render passes. Implemented by a GPU backend, or by
/// [`HeadlessRenderer`] for tests and simulation.
pub trait Renderer {
    /// Draws one pass. Dirty batches must be uploaded before drawing.
    fn submit_frame(&mut self, pass: &RenderPass<'_>);

    /// Ends the frame after all passes were submitted.
    fn present(&mut self) {}
}

/// Summary of one submitted pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassRecord {
    /// Pass label.
    pub name: String,
    /// Layer opacity.
    pub opacity: f32,
    /// Visible scene objects.
    pub visible_objects: usize,
    /// Instances across batches.
    pub instances: usize,
    /// Bytes uploaded for this pass.
    pub bytes_uploaded: usize,
}

/// Records submissions without drawing.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    stats: RenderStats,
    current: Vec<PassRecord>,
    last_frame: Vec<PassRecord>,
}

impl HeadlessRenderer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Running totals.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Passes of the last presented frame.
    #[must_use]
    pub fn last_frame(&self) -> &[PassRecord] {
        &self.last_frame
    }

    /// Pass of the last presented frame with the given name.
    #[must_use]
    pub fn last_pass(&self, name: &str) -> Option<&PassRecord> {
        self.last_frame.iter().find(|p| p.name == name)
    }
}

impl Renderer for HeadlessRenderer {
    fn submit_frame(&mut self, pass: &RenderPass<'_>) {
        let bytes_uploaded: usize = pass.batches.iter().map(|b| b.upload_size()).sum();
        let clean = pass.batches.iter().filter(|b| !b.dirty).count();
        let record = PassRecord {
            name: pass.name.to_string(),
            opacity: pass.opacity,
            visible_objects: pass.visible_objects(),
            instances: pass.instance_count(),
            bytes_uploaded,
        };

        self.stats.passes += 1;
        self.stats.instances += record.instances as u64;
        self.stats.visible_objects += record.visible_objects as u64;
        self.stats.bytes_uploaded += bytes_uploaded as u64;
        self.stats.clean_batches += clean as u64;

        tracing::trace!(
            pass = pass.name,
            objects = record.visible_objects,
            instances = record.instances,
            bytes = bytes_uploaded,
            "Pass submitted"
        );
        self.current.push(record);
    }

    fn present(&mut self) {
        self.stats.frames += 1;
        self.last_frame = std::mem::take(&mut self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::instancing::{InstanceBuffer, InstanceTransform};
    use crate::pipeline::InstanceBatch;
    use glam::Mat4;

    #[test]
    fn test_records_passes_per_frame() {
        let camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0);
        let mut buffer = InstanceBuffer::<InstanceTransform>::new(4);
        buffer.mark_dirty();
        let batches = [InstanceBatch::from_buffer("text", Mat4::IDENTITY, 1.0, &buffer)];

        let mut renderer = HeadlessRenderer::new();
        renderer.submit_frame(&RenderPass {
            name: "text",
            camera: &camera,
            opacity: 0.3,
            objects: &[],
            batches: &batches,
        });
        renderer.present();

        let stats = renderer.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.instances, 4);
        assert_eq!(stats.bytes_uploaded, 4 * 64);

        let pass = renderer.last_pass("text").unwrap();
        assert_eq!(pass.opacity, 0.3);
        assert!(renderer.last_pass("scene").is_none());
    }
}
