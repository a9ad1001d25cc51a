//! Billboarded instance matrices for the cloud text.
//!
//! Particle `y` grows downwards (raster rows); the builder flips it against
//! the scene-space height of the text box so the text reads upright.

use glam::{Quat, Vec3};

use super::{InstanceBuffer, InstanceTransform};
use crate::effects::TextParticle;

/// Writes one matrix per text particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransformBuilder {
    /// Scene-space height of the text box.
    pub vertical_extent: f32,
}

impl InstanceTransformBuilder {
    /// Creates a builder for a text box `vertical_extent` scene units tall.
    #[must_use]
    pub const fn new(vertical_extent: f32) -> Self {
        Self { vertical_extent }
    }

    /// Matrix for a single particle.
    #[inline]
    #[must_use]
    pub fn transform_for(&self, particle: &TextParticle, camera_rotation: Quat) -> InstanceTransform {
        let rotation = camera_rotation * Quat::from_rotation_z(particle.rotation_z);
        let translation = Vec3::new(particle.x, self.vertical_extent - particle.y, particle.z);
        InstanceTransform::from_parts(particle.scale, rotation, translation)
    }

    /// Rewrites `buffer` from `particles`, index for index.
    ///
    /// The buffer is recreated when the particle count changed, and its dirty
    /// version is bumped exactly once.
    pub fn build(
        &self,
        particles: &[TextParticle],
        camera_rotation: Quat,
        buffer: &mut InstanceBuffer<InstanceTransform>,
    ) {
        if buffer.len() != particles.len() {
            tracing::trace!(
                from = buffer.len(),
                to = particles.len(),
                "Recreating text instance buffer"
            );
            buffer.resize(particles.len());
        }
        for (index, particle) in particles.iter().enumerate() {
            buffer.set(index, self.transform_for(particle, camera_rotation));
        }
        buffer.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{ParticlePool, TextParticleConfig};
    use crate::text::GridCoordinate;

    fn pool_with(coords: &[(i32, i32)]) -> ParticlePool {
        let mut pool = ParticlePool::with_seed(TextParticleConfig::default(), 7);
        let points: Vec<_> = coords
            .iter()
            .map(|&(x, y)| crate::text::TrackedPoint::new(GridCoordinate::new(x, y)))
            .collect();
        pool.sync(&points);
        pool
    }

    #[test]
    fn test_build_marks_dirty_once() {
        let mut pool = pool_with(&[(0, 0), (1, 0), (2, 3)]);
        pool.advance(1.0 / 60.0);

        let builder = InstanceTransformBuilder::new(10.0);
        let mut buffer = InstanceBuffer::new(3);
        let before = buffer.version();
        builder.build(pool.particles(), Quat::IDENTITY, &mut buffer);

        assert_eq!(buffer.version(), before + 1);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_build_flips_vertical_axis() {
        let pool = pool_with(&[(5, 20)]);
        let particle = pool.particles()[0];

        let builder = InstanceTransformBuilder::new(4.0);
        let transform = builder.transform_for(&particle, Quat::IDENTITY);
        let translation = transform.translation();

        assert_eq!(translation.x, particle.x);
        assert!((translation.y - (4.0 - particle.y)).abs() < 1e-6);
    }

    #[test]
    fn test_build_resizes_to_particle_count() {
        let pool = pool_with(&[(0, 0), (1, 1)]);
        let mut buffer = InstanceBuffer::new(0);
        InstanceTransformBuilder::new(1.0).build(pool.particles(), Quat::IDENTITY, &mut buffer);
        assert_eq!(buffer.len(), 2);
        // New particles start at zero scale.
        assert_eq!(buffer.get(0).map(InstanceTransform::uniform_scale), Some(0.0));
    }

    #[test]
    fn test_build_marks_dirty_once_when_count_changes() {
        let builder = InstanceTransformBuilder::new(1.0);
        let mut buffer = InstanceBuffer::new(0);

        let before = buffer.version();
        builder.build(pool_with(&[(0, 0), (1, 1)]).particles(), Quat::IDENTITY, &mut buffer);
        assert_eq!(buffer.version(), before + 1);

        let before = buffer.version();
        builder.build(pool_with(&[(3, 4)]).particles(), Quat::IDENTITY, &mut buffer);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.version(), before + 1);
    }
}
