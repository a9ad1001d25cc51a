//! # Cloud Text Particles
//!
//! One particle per tracked point. A particle grows from zero, idles with a
//! slow wobble, and shrinks back to zero once its point is gone.
//!
//! ```text
//!   scale
//!   max ┤      ╭──~~~──~~~──╮
//!       │     ╱              ╲
//!     0 ┼────╯                ╲──── retired
//!         Growing   Idle    Shrinking
//! ```
//!
//! Per-tick increments are defined for a 60 Hz frame and scaled by
//! `dt * 60`, so a zero `dt` changes nothing.

use std::collections::HashMap;
use std::f32::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::text::{GridCoordinate, TrackedPoint};

/// Frame length the per-tick increments are tuned for.
pub const NOMINAL_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Spawn parameters for text particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextParticleConfig {
    /// Scene units per raster pixel.
    pub scale_factor: f32,
    /// Total width of the random position jitter, in scene units.
    pub jitter: f32,
    /// Smallest idle scale.
    pub max_scale_base: f32,
    /// Extra idle scale for the rare big puffs.
    pub max_scale_range: f32,
    /// Exponent on the random draw for the extra scale; large values keep
    /// big puffs rare.
    pub max_scale_exponent: i32,
    /// Minimum scale change per tick.
    pub delta_scale_min: f32,
    /// Random extra scale change per tick.
    pub delta_scale_range: f32,
    /// Minimum wobble phase advance per tick.
    pub age_delta_min: f32,
    /// Random extra wobble phase advance per tick.
    pub age_delta_range: f32,
    /// Width of the per-tick roll range, centred on zero.
    pub delta_rotation_range: f32,
    /// Idle wobble amplitude.
    pub wobble: f32,
}

impl Default for TextParticleConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.08,
            jitter: 0.15,
            max_scale_base: 0.1,
            max_scale_range: 1.5,
            max_scale_exponent: 10,
            delta_scale_min: 0.03,
            delta_scale_range: 0.03,
            age_delta_min: 0.01,
            age_delta_range: 0.02,
            delta_rotation_range: 0.01,
            wobble: 0.2,
        }
    }
}

/// Which part of its lifecycle a text particle is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticlePhase {
    /// Scaling up towards `max_scale`.
    Growing,
    /// Wobbling at or below `max_scale`.
    Idle,
    /// Scaling down towards zero.
    Shrinking,
    /// Finished shrinking; waiting for the next sync to be compacted.
    Retired,
}

/// A single cloud puff bound to a grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextParticle {
    /// Bound point.
    pub coord: GridCoordinate,
    /// Scene X before the mesh origin offset.
    pub x: f32,
    /// Scene Y, growing downwards like raster rows.
    pub y: f32,
    /// Scene Z.
    pub z: f32,
    /// Current scale.
    pub scale: f32,
    /// Idle scale ceiling.
    pub max_scale: f32,
    /// Scale change per tick while growing or shrinking.
    pub delta_scale: f32,
    /// Still growing.
    pub is_growing: bool,
    /// Shrinking towards retirement.
    pub to_delete: bool,
    /// Wobble phase.
    pub age: f32,
    /// Wobble phase change per tick.
    pub age_delta: f32,
    /// Roll around the view axis.
    pub rotation_z: f32,
    /// Roll change per tick.
    pub delta_rotation: f32,
    /// Scale reached zero while deleting.
    pub retired: bool,
}

impl TextParticle {
    fn spawn(coord: GridCoordinate, config: &TextParticleConfig, rng: &mut ChaCha8Rng) -> Self {
        let jitter_x = config.jitter * (rng.gen::<f32>() - 0.5);
        let jitter_y = config.jitter * (rng.gen::<f32>() - 0.5);
        Self {
            coord,
            x: coord.x as f32 * config.scale_factor + jitter_x,
            y: coord.y as f32 * config.scale_factor + jitter_y,
            z: 0.0,
            scale: 0.0,
            max_scale: config.max_scale_base
                + config.max_scale_range * rng.gen::<f32>().powi(config.max_scale_exponent),
            delta_scale: config.delta_scale_min + config.delta_scale_range * rng.gen::<f32>(),
            is_growing: true,
            to_delete: false,
            age: PI * rng.gen::<f32>(),
            age_delta: config.age_delta_min + config.age_delta_range * rng.gen::<f32>(),
            rotation_z: 0.5 * PI * rng.gen::<f32>(),
            delta_rotation: config.delta_rotation_range * (rng.gen::<f32>() - 0.5),
            retired: false,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> ParticlePhase {
        if self.retired {
            ParticlePhase::Retired
        } else if self.is_growing {
            ParticlePhase::Growing
        } else if self.to_delete {
            ParticlePhase::Shrinking
        } else {
            ParticlePhase::Idle
        }
    }

    /// Starts shrinking from the current scale.
    pub fn mark_for_deletion(&mut self) {
        if self.retired {
            return;
        }
        self.is_growing = false;
        self.to_delete = true;
    }

    /// Cancels a pending deletion; the particle grows back to `max_scale`.
    pub fn revive(&mut self) {
        if self.retired || !self.to_delete {
            return;
        }
        self.to_delete = false;
        self.is_growing = true;
    }

    /// Advances by `ticks` nominal frames. Returns true if the particle
    /// retired during this call.
    fn tick(&mut self, ticks: f32, wobble: f32) -> bool {
        if self.retired {
            return false;
        }
        self.age += self.age_delta * ticks;
        self.rotation_z += self.delta_rotation * ticks;

        match self.phase() {
            ParticlePhase::Growing => {
                self.scale += self.delta_scale * ticks;
                if self.scale >= self.max_scale {
                    self.scale = self.max_scale;
                    self.is_growing = false;
                }
                false
            }
            ParticlePhase::Shrinking => {
                self.scale -= self.delta_scale * ticks;
                if self.scale <= 0.0 {
                    self.scale = 0.0;
                    self.retired = true;
                    return true;
                }
                false
            }
            ParticlePhase::Idle => {
                self.scale = (self.max_scale + wobble * self.age.sin()).clamp(0.0, self.max_scale);
                false
            }
            ParticlePhase::Retired => false,
        }
    }
}

/// Particles for the cloud text, kept in step with a tracked point set.
///
/// Index `i` of [`particles`](Self::particles) is instance `i` of the text
/// mesh until the next [`sync`](Self::sync).
#[derive(Debug)]
pub struct ParticlePool {
    particles: Vec<TextParticle>,
    by_coord: HashMap<GridCoordinate, usize>,
    config: TextParticleConfig,
    rng: ChaCha8Rng,
    retired: Vec<GridCoordinate>,
}

impl ParticlePool {
    /// Creates an entropy-seeded pool.
    #[must_use]
    pub fn new(config: TextParticleConfig) -> Self {
        Self::from_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Creates a deterministic pool.
    #[must_use]
    pub fn with_seed(config: TextParticleConfig, seed: u64) -> Self {
        Self::from_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(config: TextParticleConfig, rng: ChaCha8Rng) -> Self {
        Self {
            particles: Vec::new(),
            by_coord: HashMap::new(),
            config,
            rng,
            retired: Vec::new(),
        }
    }

    /// Spawn parameters.
    #[must_use]
    pub const fn config(&self) -> &TextParticleConfig {
        &self.config
    }

    /// Every particle, retired ones included (they render at zero scale).
    #[must_use]
    pub fn particles(&self) -> &[TextParticle] {
        &self.particles
    }

    /// Particles that have not retired.
    pub fn live(&self) -> impl Iterator<Item = &TextParticle> {
        self.particles.iter().filter(|p| !p.retired)
    }

    /// Particle bound to `coord`.
    #[must_use]
    pub fn get(&self, coord: GridCoordinate) -> Option<&TextParticle> {
        self.by_coord.get(&coord).map(|&i| &self.particles[i])
    }

    /// Number of particles, retired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if there are no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Brings the pool in line with `points`.
    ///
    /// Retired particles are compacted away first. Carried-over points keep
    /// their particle, removal-marked points start shrinking, and new points
    /// spawn a particle at scale zero. A coordinate never has two particles.
    pub fn sync(&mut self, points: &[TrackedPoint]) -> &[TextParticle] {
        let compacted = self.compact();
        let mut spawned = 0_usize;
        let mut marked = 0_usize;

        for point in points {
            if let Some(&index) = self.by_coord.get(&point.coord) {
                let particle = &mut self.particles[index];
                if point.marked_for_removal {
                    if !particle.to_delete {
                        particle.mark_for_deletion();
                        marked += 1;
                    }
                } else {
                    particle.revive();
                }
            } else if !point.marked_for_removal {
                let particle = TextParticle::spawn(point.coord, &self.config, &mut self.rng);
                self.by_coord.insert(point.coord, self.particles.len());
                self.particles.push(particle);
                spawned += 1;
            }
        }

        tracing::debug!(
            particles = self.particles.len(),
            spawned,
            marked,
            compacted,
            "Synced text particles"
        );
        &self.particles
    }

    /// Advances every particle by `dt` seconds. Returns how many retired.
    pub fn advance(&mut self, dt: f32) -> usize {
        if dt <= 0.0 {
            return 0;
        }
        let ticks = dt / NOMINAL_FRAME_SECONDS;
        let wobble = self.config.wobble;
        let mut retired_now = 0;
        for particle in &mut self.particles {
            if particle.tick(ticks, wobble) {
                self.retired.push(particle.coord);
                retired_now += 1;
            }
        }
        retired_now
    }

    /// Coordinates of particles retired since the last call.
    pub fn drain_retired(&mut self) -> Vec<GridCoordinate> {
        std::mem::take(&mut self.retired)
    }

    /// Starts shrinking every particle. Returns how many were newly marked.
    pub fn dissipate(&mut self) -> usize {
        let mut marked = 0;
        for particle in &mut self.particles {
            if !particle.to_delete && !particle.retired {
                particle.mark_for_deletion();
                marked += 1;
            }
        }
        tracing::debug!(marked, "Dissipating text particles");
        marked
    }

    fn compact(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !p.retired);
        let removed = before - self.particles.len();
        if removed > 0 {
            self.by_coord.clear();
            for (i, particle) in self.particles.iter().enumerate() {
                self.by_coord.insert(particle.coord, i);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn points(coords: &[(i32, i32)]) -> Vec<TrackedPoint> {
        coords
            .iter()
            .map(|&(x, y)| TrackedPoint::new(GridCoordinate::new(x, y)))
            .collect()
    }

    fn pool() -> ParticlePool {
        ParticlePool::with_seed(TextParticleConfig::default(), 42)
    }

    #[test]
    fn test_spawn_ranges() {
        let mut pool = pool();
        let coords: Vec<_> = (0..200).map(|i| (i % 20, i / 20)).collect();
        pool.sync(&points(&coords));

        for p in pool.particles() {
            assert_eq!(p.scale, 0.0);
            assert!(p.max_scale >= 0.1 && p.max_scale < 1.6);
            assert!(p.delta_scale >= 0.03 && p.delta_scale < 0.06);
            assert!(p.age >= 0.0 && p.age < PI);
            assert!(p.age_delta >= 0.01 && p.age_delta < 0.03);
            assert!(p.rotation_z >= 0.0 && p.rotation_z < 0.5 * PI);
            assert!(p.delta_rotation >= -0.005 && p.delta_rotation < 0.005);
            assert!((p.x - p.coord.x as f32 * 0.08).abs() <= 0.0751);
            assert!((p.y - p.coord.y as f32 * 0.08).abs() <= 0.0751);
            assert_eq!(p.phase(), ParticlePhase::Growing);
        }
    }

    #[test]
    fn test_scale_stays_within_bounds() {
        let mut pool = pool();
        pool.sync(&points(&[(0, 0), (1, 0), (2, 0), (3, 0)]));
        for step in 0..600 {
            if step == 300 {
                pool.dissipate();
            }
            pool.advance(DT);
            for p in pool.particles() {
                assert!(p.scale >= 0.0 && p.scale <= p.max_scale);
            }
        }
    }

    #[test]
    fn test_shrink_is_monotonic_until_zero() {
        let mut pool = pool();
        pool.sync(&points(&[(0, 0)]));
        for _ in 0..30 {
            pool.advance(DT);
        }
        pool.dissipate();

        let mut last = pool.particles()[0].scale;
        let mut retired = 0;
        for _ in 0..200 {
            retired += pool.advance(DT);
            let scale = pool.particles()[0].scale;
            assert!(scale <= last);
            last = scale;
        }
        assert_eq!(last, 0.0);
        assert_eq!(retired, 1);
        assert_eq!(pool.live().count(), 0);
        assert_eq!(pool.drain_retired(), vec![GridCoordinate::new(0, 0)]);
        assert!(pool.drain_retired().is_empty());
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut pool = pool();
        pool.sync(&points(&[(3, 4)]));
        pool.advance(DT);
        let before = pool.particles()[0];
        assert_eq!(pool.advance(0.0), 0);
        assert_eq!(pool.particles()[0], before);
    }

    #[test]
    fn test_sync_keeps_identity_and_never_duplicates() {
        let mut pool = pool();
        let pts = points(&[(0, 0), (1, 1)]);
        pool.sync(&pts);
        pool.advance(DT);
        let first = pool.particles()[0];

        let mut carried = pts.clone();
        for p in &mut carried {
            p.is_carried_over = true;
        }
        pool.sync(&carried);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.particles()[0], first);
    }

    #[test]
    fn test_removed_point_shrinks_then_compacts() {
        let mut pool = pool();
        pool.sync(&points(&[(0, 0), (1, 1)]));
        for _ in 0..10 {
            pool.advance(DT);
        }

        let mut next = points(&[(0, 0), (1, 1)]);
        next[1].marked_for_removal = true;
        pool.sync(&next);
        assert!(pool.get(GridCoordinate::new(1, 1)).unwrap().to_delete);

        while pool.live().count() == 2 {
            pool.advance(DT);
        }
        // Retired slot stays until the next sync.
        assert_eq!(pool.len(), 2);
        pool.sync(&points(&[(0, 0)]));
        assert_eq!(pool.len(), 1);
        assert!(pool.get(GridCoordinate::new(1, 1)).is_none());
    }

    #[test]
    fn test_revive_grows_back() {
        let mut pool = pool();
        pool.sync(&points(&[(0, 0)]));
        for _ in 0..5 {
            pool.advance(DT);
        }
        let mut gone = points(&[(0, 0)]);
        gone[0].marked_for_removal = true;
        pool.sync(&gone);
        assert_eq!(pool.particles()[0].phase(), ParticlePhase::Shrinking);

        pool.sync(&points(&[(0, 0)]));
        assert_eq!(pool.particles()[0].phase(), ParticlePhase::Growing);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_advance_scales_with_dt() {
        let mut a = pool();
        let mut b = pool();
        a.sync(&points(&[(0, 0)]));
        b.sync(&points(&[(0, 0)]));
        a.advance(DT);
        a.advance(DT);
        b.advance(2.0 * DT);
        assert!((a.particles()[0].scale - b.particles()[0].scale).abs() < 1e-5);
    }
}
