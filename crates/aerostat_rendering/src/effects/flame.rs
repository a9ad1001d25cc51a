//! # Burner Flames
//!
//! Fixed-capacity flame emitter, CPU simulated, GPU instanced.
//!
//! ```text
//! update(dt)
//!   for slot in 0..capacity
//!     expired? ── respawn budget left? ── yes ─► respawn, then simulate
//!                          └──────────── no ──► zero-scale matrix
//!     alive  ─────────────────────────────────► integrate, colour, scale
//!   transforms.mark_dirty(); colors.mark_dirty()
//! ```
//!
//! The respawn budget is per call, so the emission rate follows the frame
//! rate.

use std::f32::consts::PI;

use aerostat_core::FixedSlots;
use glam::{Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::color::hsl_to_rgb;
use crate::instancing::{InstanceBuffer, InstanceColor, InstanceTransform};

/// Flame emitter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameConfig {
    /// Particle slots.
    pub capacity: usize,
    /// Maximum respawns per update call.
    pub respawn_per_update: usize,
    /// Shortest lifespan in seconds.
    pub lifespan_min: f32,
    /// Random extra lifespan in seconds.
    pub lifespan_range: f32,
    /// Width of the square spawn footprint on the XZ plane.
    pub base_spread: f32,
    /// Width of the launch angle range, centred on zero.
    pub angle_range: f32,
    /// Horizontal velocity factor.
    pub lateral_speed: f32,
    /// Slowest upward launch speed.
    pub speed_min: f32,
    /// Random extra upward launch speed.
    pub speed_range: f32,
    /// Smallest base scale.
    pub scale_min: f32,
    /// Random extra base scale.
    pub scale_range: f32,
    /// Vertical velocity lost per second.
    pub vertical_decay: f32,
    /// Hue at birth.
    pub hue_start: f32,
    /// Hue drop over a lifetime.
    pub hue_span: f32,
    /// HSL saturation.
    pub saturation: f32,
    /// HSL lightness.
    pub lightness: f32,
    /// Side length of the instanced quad.
    pub quad_size: f32,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            capacity: 250,
            respawn_per_update: 5,
            lifespan_min: 0.4,
            lifespan_range: 0.8,
            base_spread: 0.3,
            angle_range: 0.5,
            lateral_speed: 0.5,
            speed_min: 1.5,
            speed_range: 2.0,
            scale_min: 0.5,
            scale_range: 1.0,
            vertical_decay: 2.0,
            hue_start: 0.15,
            hue_span: 0.2,
            saturation: 1.0,
            lightness: 0.6,
            quad_size: 0.8,
        }
    }
}

/// A single flame particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameParticle {
    /// Position relative to the emitter.
    pub position: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Seconds since spawn. Infinite before the first spawn.
    pub age: f32,
    /// Seconds to live.
    pub lifespan: f32,
    /// Base scale before the life envelope.
    pub scale: f32,
    /// Last computed colour.
    pub color: [f32; 3],
}

impl FlameParticle {
    /// A slot that has never been spawned.
    #[must_use]
    pub const fn dormant() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            age: f32::INFINITY,
            lifespan: 1.0,
            scale: 1.0,
            color: [0.0; 3],
        }
    }

    /// True once `age >= lifespan`.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifespan
    }

    /// Normalized age in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn life(&self) -> f32 {
        (self.age / self.lifespan).min(1.0)
    }

    fn respawn(&mut self, config: &FlameConfig, rng: &mut ChaCha8Rng) {
        self.age = 0.0;
        self.lifespan = config.lifespan_min + config.lifespan_range * rng.gen::<f32>();
        self.position = Vec3::new(
            (rng.gen::<f32>() - 0.5) * config.base_spread,
            0.0,
            (rng.gen::<f32>() - 0.5) * config.base_spread,
        );
        let angle = (rng.gen::<f32>() - 0.5) * config.angle_range;
        let speed = config.speed_min + config.speed_range * rng.gen::<f32>();
        self.velocity = Vec3::new(
            angle.sin() * config.lateral_speed,
            speed,
            angle.cos() * config.lateral_speed,
        );
        self.scale = config.scale_min + config.scale_range * rng.gen::<f32>();
    }
}

/// Emitter counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlameStats {
    /// Update calls that advanced particles.
    pub updates: u64,
    /// Respawns over the emitter's lifetime.
    pub total_respawned: u64,
    /// Respawns in the last update.
    pub last_respawned: usize,
    /// Particles alive after the last update.
    pub live: usize,
}

/// Fixed-capacity flame emitter with a transform and a colour buffer.
pub struct FlameEmitter {
    slots: FixedSlots<FlameParticle>,
    transforms: InstanceBuffer<InstanceTransform>,
    colors: InstanceBuffer<InstanceColor>,
    config: FlameConfig,
    rng: ChaCha8Rng,
    offset: Vec3,
    parent_scale: f32,
    stats: FlameStats,
}

impl std::fmt::Debug for FlameEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlameEmitter")
            .field("capacity", &self.slots.capacity())
            .field("offset", &self.offset)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl FlameEmitter {
    /// Creates an entropy-seeded emitter at `offset` from its parent.
    #[must_use]
    pub fn new(config: FlameConfig, offset: Vec3) -> Self {
        Self::from_rng(config, offset, ChaCha8Rng::from_entropy())
    }

    /// Creates a deterministic emitter.
    #[must_use]
    pub fn with_seed(config: FlameConfig, offset: Vec3, seed: u64) -> Self {
        Self::from_rng(config, offset, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(config: FlameConfig, offset: Vec3, rng: ChaCha8Rng) -> Self {
        let capacity = config.capacity;
        tracing::debug!(capacity, ?offset, "Creating flame emitter");
        Self {
            slots: FixedSlots::new(capacity, |_| FlameParticle::dormant()),
            transforms: InstanceBuffer::new(capacity),
            colors: InstanceBuffer::new(capacity),
            config,
            rng,
            offset,
            parent_scale: 1.0,
            stats: FlameStats::default(),
        }
    }

    /// Tells the emitter its parent's uniform scale so the emitter can
    /// cancel it out.
    pub fn set_parent_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.parent_scale = scale;
        }
    }

    /// Emitter-to-parent matrix: the fixed offset with the parent's scale
    /// cancelled.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(1.0 / self.parent_scale),
            Quat::IDENTITY,
            self.offset,
        )
    }

    /// Offset from the parent.
    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Slot count.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Currently alive particles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.live_count()
    }

    /// All slots in instance order.
    #[must_use]
    pub fn particles(&self) -> &[FlameParticle] {
        self.slots.as_slice()
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &FlameConfig {
        &self.config
    }

    /// Counters.
    #[must_use]
    pub const fn stats(&self) -> FlameStats {
        self.stats
    }

    /// Per-instance matrices.
    #[must_use]
    pub const fn transforms(&self) -> &InstanceBuffer<InstanceTransform> {
        &self.transforms
    }

    /// Per-instance colours.
    #[must_use]
    pub const fn colors(&self) -> &InstanceBuffer<InstanceColor> {
        &self.colors
    }

    /// True if either buffer changed since the last acknowledged upload.
    #[must_use]
    pub const fn needs_upload(&self) -> bool {
        self.transforms.needs_upload() || self.colors.needs_upload()
    }

    /// Called by the renderer after consuming both buffers.
    pub fn acknowledge_upload(&mut self) {
        self.transforms.acknowledge_upload();
        self.colors.acknowledge_upload();
    }

    /// Advances the emitter by `dt` seconds. Returns the respawn count.
    ///
    /// A non-positive `dt` leaves particle state untouched but still flags
    /// the buffers.
    pub fn update(&mut self, dt: f32) -> usize {
        if dt <= 0.0 {
            self.transforms.mark_dirty();
            self.colors.mark_dirty();
            return 0;
        }

        let budget = self.config.respawn_per_update;
        let mut respawned = 0;

        for index in 0..self.slots.capacity() {
            let expired = self.slots.get(index).is_some_and(FlameParticle::is_expired);
            if expired {
                if respawned < budget {
                    self.slots.revive(index).respawn(&self.config, &mut self.rng);
                    respawned += 1;
                } else {
                    self.slots.retire(index);
                    self.transforms.set(index, InstanceTransform::hidden());
                    continue;
                }
            }

            let roll = self.rng.gen::<f32>() * PI;
            let Some(particle) = self.slots.get_mut(index) else {
                continue;
            };
            particle.age += dt;
            particle.position += particle.velocity * dt;
            particle.velocity.y -= self.config.vertical_decay * dt;

            let life = particle.life();
            particle.color = hsl_to_rgb(
                self.config.hue_start - life * self.config.hue_span,
                self.config.saturation,
                self.config.lightness,
            );
            let scale = particle.scale * (PI * life).sin();
            let position = particle.position;
            let color = particle.color;

            self.colors.set(index, InstanceColor::new(color));
            self.transforms.set(
                index,
                InstanceTransform::from_parts(scale, Quat::from_rotation_z(roll), position),
            );
        }

        self.transforms.mark_dirty();
        self.colors.mark_dirty();

        self.stats.updates += 1;
        self.stats.total_respawned += respawned as u64;
        self.stats.last_respawned = respawned;
        self.stats.live = self.slots.live_count();

        tracing::trace!(respawned, live = self.stats.live, "Flame update");
        respawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> FlameEmitter {
        FlameEmitter::with_seed(FlameConfig::default(), Vec3::new(0.7, -0.35, 0.0), 9)
    }

    #[test]
    fn test_respawn_cap_per_update() {
        let mut flame = emitter();
        assert_eq!(flame.update(1.0 / 60.0), 5);
        assert_eq!(flame.live_count(), 5);
        assert_eq!(flame.update(1.0 / 60.0), 5);
        assert_eq!(flame.live_count(), 10);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut flame = emitter();
        for _ in 0..2000 {
            let respawned = flame.update(1.0 / 120.0);
            assert!(respawned <= 5);
            assert!(flame.live_count() <= flame.capacity());
        }
        assert_eq!(flame.transforms().len(), 250);
        assert_eq!(flame.colors().len(), 250);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut flame = emitter();
        flame.update(0.05);
        let before: Vec<_> = flame.particles().to_vec();
        let version = flame.transforms().version();

        assert_eq!(flame.update(0.0), 0);
        assert_eq!(flame.particles(), &before[..]);
        assert_eq!(flame.transforms().version(), version + 1);
    }

    #[test]
    fn test_spawn_ranges() {
        let mut flame = emitter();
        flame.update(1e-4);
        for particle in flame.particles().iter().filter(|p| p.age.is_finite()) {
            assert!(particle.lifespan >= 0.4 && particle.lifespan < 1.2);
            assert!(particle.position.x.abs() <= 0.15 + 1e-3);
            assert!(particle.position.z.abs() <= 0.15 + 1e-3);
            assert!(particle.velocity.y >= 1.5 - 1e-3 && particle.velocity.y < 3.5);
            assert!(particle.scale >= 0.5 && particle.scale < 1.5);
        }
    }

    #[test]
    fn test_particle_expires_and_respawns() {
        let mut flame = FlameEmitter::with_seed(
            FlameConfig {
                capacity: 1,
                ..FlameConfig::default()
            },
            Vec3::ZERO,
            3,
        );
        assert_eq!(flame.update(0.001), 1);
        let lifespan = flame.particles()[0].lifespan;

        let step = 0.01;
        let mut elapsed = 0.001;
        while elapsed < lifespan {
            assert_eq!(flame.update(step), 0);
            elapsed += step;
        }
        assert!(flame.particles()[0].is_expired());

        assert_eq!(flame.update(step), 1);
        assert!(flame.particles()[0].age < 0.02);
    }

    #[test]
    fn test_overflow_slots_render_hidden() {
        let mut flame = FlameEmitter::with_seed(
            FlameConfig {
                capacity: 8,
                ..FlameConfig::default()
            },
            Vec3::ZERO,
            1,
        );
        flame.update(0.01);
        for index in 5..8 {
            assert_eq!(flame.transforms().get(index).map(InstanceTransform::uniform_scale), Some(0.0));
        }
    }

    #[test]
    fn test_colour_starts_warm() {
        let mut flame = emitter();
        flame.update(0.001);
        let [r, g, b] = flame.particles()[0].color;
        assert!(r >= g && g > b);
    }

    #[test]
    fn test_local_matrix_counter_scales_parent() {
        let mut flame = emitter();
        flame.set_parent_scale(7.0);
        let (scale, _, translation) = flame.local_matrix().to_scale_rotation_translation();
        assert!((scale.x - 1.0 / 7.0).abs() < 1e-6);
        assert_eq!(translation, Vec3::new(0.7, -0.35, 0.0));
    }
}
