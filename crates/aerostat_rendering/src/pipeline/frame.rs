//! Render pass data structures.
//!
//! Everything here borrows from the simulation for the duration of one
//! submission; nothing is copied except what the renderer chooses to upload.

use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::effects::FlameEmitter;
use crate::instancing::{InstanceBuffer, InstanceTransform};

/// What a scene object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A loaded balloon model.
    Balloon,
    /// A procedural placeholder balloon.
    Placeholder,
    /// The burner engine model.
    Engine,
}

/// A model instance in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPlacement {
    /// Model-to-world matrix.
    pub transform: Mat4,
    /// Hidden objects are submitted but not drawn.
    pub visible: bool,
    /// Object kind.
    pub kind: ObjectKind,
}

/// One instanced draw: a quad mesh with per-instance matrices and colours.
#[derive(Debug, Clone, Copy)]
pub struct InstanceBatch<'a> {
    /// Label for logs.
    pub name: &'a str,
    /// Mesh-to-world matrix applied to every instance.
    pub origin: Mat4,
    /// Instance count.
    pub count: usize,
    /// Side length of the instanced quad.
    pub quad_size: f32,
    /// Per-instance matrices, tightly packed.
    pub transforms: &'a [u8],
    /// Per-instance colours, if the batch has them.
    pub colors: Option<&'a [u8]>,
    /// True if the bytes changed since the last acknowledged upload.
    pub dirty: bool,
}

impl<'a> InstanceBatch<'a> {
    /// A batch over a matrix buffer.
    #[must_use]
    pub fn from_buffer(
        name: &'a str,
        origin: Mat4,
        quad_size: f32,
        buffer: &'a InstanceBuffer<InstanceTransform>,
    ) -> Self {
        Self {
            name,
            origin,
            count: buffer.len(),
            quad_size,
            transforms: buffer.as_bytes(),
            colors: None,
            dirty: buffer.needs_upload(),
        }
    }

    /// A batch over a flame emitter's matrices and colours.
    #[must_use]
    pub fn from_flame(name: &'a str, origin: Mat4, flame: &'a FlameEmitter) -> Self {
        Self {
            name,
            origin,
            count: flame.capacity(),
            quad_size: flame.config().quad_size,
            transforms: flame.transforms().as_bytes(),
            colors: Some(flame.colors().as_bytes()),
            dirty: flame.needs_upload(),
        }
    }

    /// Bytes to upload if dirty.
    #[must_use]
    pub fn upload_size(&self) -> usize {
        if self.dirty {
            self.transforms.len() + self.colors.map_or(0, <[u8]>::len)
        } else {
            0
        }
    }
}

/// Everything one camera draws.
#[derive(Debug, Clone, Copy)]
pub struct RenderPass<'a> {
    /// Label for logs.
    pub name: &'a str,
    /// Camera for this pass.
    pub camera: &'a PerspectiveCamera,
    /// Layer opacity, 1.0 fully visible.
    pub opacity: f32,
    /// Scene objects.
    pub objects: &'a [ObjectPlacement],
    /// Instanced batches.
    pub batches: &'a [InstanceBatch<'a>],
}

impl RenderPass<'_> {
    /// Visible objects.
    #[must_use]
    pub fn visible_objects(&self) -> usize {
        self.objects.iter().filter(|o| o.visible).count()
    }

    /// Instances across all batches.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(|b| b.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::FlameConfig;
    use glam::Vec3;

    #[test]
    fn test_flame_batch_sizes() {
        let mut flame = FlameEmitter::with_seed(FlameConfig::default(), Vec3::ZERO, 1);
        flame.update(0.016);
        let batch = InstanceBatch::from_flame("flame", Mat4::IDENTITY, &flame);
        assert_eq!(batch.count, 250);
        assert!(batch.dirty);
        assert_eq!(batch.upload_size(), 250 * (64 + 12));
    }

    #[test]
    fn test_clean_buffer_uploads_nothing() {
        let buffer = InstanceBuffer::<InstanceTransform>::new(10);
        let batch = InstanceBatch::from_buffer("text", Mat4::IDENTITY, 1.0, &buffer);
        assert!(!batch.dirty);
        assert_eq!(batch.upload_size(), 0);
    }

    #[test]
    fn test_pass_counts() {
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        let objects = [
            ObjectPlacement {
                transform: Mat4::IDENTITY,
                visible: true,
                kind: ObjectKind::Balloon,
            },
            ObjectPlacement {
                transform: Mat4::IDENTITY,
                visible: false,
                kind: ObjectKind::Engine,
            },
        ];
        let pass = RenderPass {
            name: "scene",
            camera: &camera,
            opacity: 1.0,
            objects: &objects,
            batches: &[],
        };
        assert_eq!(pass.visible_objects(), 1);
        assert_eq!(pass.instance_count(), 0);
    }
}
