//! Text change from "Hi" to "Bye" through the full particle pipeline:
//! glyph mask, point set, particle pool and instance matrices.

use std::collections::HashSet;

use aerostat_rendering::{
    AlphaSurface, FontDescriptor, GlyphMaskSampler, GridCoordinate, InstanceBuffer, InstanceTransform,
    InstanceTransformBuilder, ParticlePool, PointSetDiffer, TextParticleConfig, TextRasterizer,
};
use glam::{Quat, Vec3};

const DT: f32 = 1.0 / 60.0;

/// Draws one thin bar per character at a character-dependent offset, over
/// an underline spanning the whole line. Different words share the
/// underline and little else.
struct BarRasterizer;

impl TextRasterizer for BarRasterizer {
    fn name(&self) -> &'static str {
        "bars"
    }

    fn line_advance(&self, line: &str, font: &FontDescriptor) -> f32 {
        line.chars().count() as f32 * 0.6 * font.size_px
    }

    fn draw_line(
        &self,
        surface: &mut AlphaSurface,
        line: &str,
        x: f32,
        baseline: f32,
        font: &FontDescriptor,
    ) {
        let em = font.size_px;
        let width = self.line_advance(line, font);
        surface.fill_rect(x, baseline - 0.1 * em, x + width, baseline);
        for (i, ch) in line.chars().enumerate() {
            let left = x + i as f32 * 0.6 * em + (ch as u32 % 5) as f32 * 0.1 * em;
            surface.fill_rect(left, baseline - 0.7 * em, left + 0.1 * em, baseline);
        }
    }
}

struct Pipeline {
    sampler: GlyphMaskSampler,
    differ: PointSetDiffer,
    pool: ParticlePool,
    font: FontDescriptor,
}

impl Pipeline {
    fn new() -> Self {
        Self {
            sampler: GlyphMaskSampler::new(),
            differ: PointSetDiffer::new(),
            pool: ParticlePool::with_seed(TextParticleConfig::default(), 5),
            font: FontDescriptor::new("Test", 800, 20.0),
        }
    }

    fn show(&mut self, text: &str) -> aerostat_rendering::DiffSummary {
        let text_box = BarRasterizer.measure(text, &self.font);
        let grid = self
            .sampler
            .sample(&BarRasterizer, text, text_box, &self.font)
            .unwrap();
        let summary = self.differ.reconcile(&grid);
        self.pool.sync(self.differ.points());
        summary
    }

    fn step(&mut self) {
        self.pool.advance(DT);
        let retired = self.pool.drain_retired();
        self.differ.forget(&retired);
    }
}

#[test]
fn test_hi_spawns_one_particle_per_point_at_zero_scale() {
    let mut pipeline = Pipeline::new();
    let summary = pipeline.show("Hi");

    assert!(summary.spawned > 0);
    assert_eq!(summary.carried, 0);
    assert_eq!(summary.removed, 0);
    assert_eq!(pipeline.pool.len(), pipeline.differ.len());
    assert!(pipeline.pool.particles().iter().all(|p| p.scale == 0.0 && p.is_growing));
}

#[test]
fn test_same_text_twice_changes_nothing() {
    let mut pipeline = Pipeline::new();
    pipeline.show("Hi");
    let count = pipeline.pool.len();

    let summary = pipeline.show("Hi");
    assert_eq!(summary.spawned, 0);
    assert_eq!(summary.removed, 0);
    assert_eq!(summary.carried, count);
    assert_eq!(pipeline.pool.len(), count);
}

#[test]
fn test_hi_to_bye_shrinks_vacated_and_grows_new() {
    let mut pipeline = Pipeline::new();
    pipeline.show("Hi");
    for _ in 0..120 {
        pipeline.step();
    }
    let hi: HashSet<GridCoordinate> = pipeline.differ.points().iter().map(|p| p.coord).collect();

    let summary = pipeline.show("Bye");
    assert!(summary.removed > 0);
    assert!(summary.carried > 0);
    assert!(summary.spawned > 0);

    let vacated: Vec<GridCoordinate> = pipeline
        .differ
        .points()
        .iter()
        .filter(|p| p.marked_for_removal)
        .map(|p| p.coord)
        .collect();
    assert_eq!(vacated.len(), summary.removed);
    for coord in &vacated {
        assert!(pipeline.pool.get(*coord).is_some_and(|p| p.to_delete));
    }

    // Cells only "Bye" occupies start from nothing.
    let fresh: Vec<GridCoordinate> = pipeline
        .differ
        .points()
        .iter()
        .filter(|p| !hi.contains(&p.coord))
        .map(|p| p.coord)
        .collect();
    assert_eq!(fresh.len(), summary.spawned);
    for coord in &fresh {
        let particle = pipeline.pool.get(*coord).unwrap();
        assert_eq!(particle.scale, 0.0);
        assert!(particle.is_growing);
    }

    // Vacated particles shrink monotonically to exactly zero.
    let mut last: Vec<f32> = vacated
        .iter()
        .map(|c| pipeline.pool.get(*c).map_or(0.0, |p| p.scale))
        .collect();
    for _ in 0..120 {
        pipeline.step();
        for (coord, previous) in vacated.iter().zip(last.iter_mut()) {
            if let Some(particle) = pipeline.pool.get(*coord) {
                assert!(particle.scale <= *previous);
                assert!(particle.scale >= 0.0);
                *previous = particle.scale;
            }
        }
    }
    assert!(last.iter().all(|&s| s == 0.0));

    let live: HashSet<GridCoordinate> = pipeline.pool.live().map(|p| p.coord).collect();
    assert!(vacated.iter().all(|c| !live.contains(c)));
    assert!(pipeline.differ.points().iter().all(|p| !p.marked_for_removal));

    // The next sync compacts the retired particles away.
    pipeline.pool.sync(pipeline.differ.points());
    assert_eq!(pipeline.pool.len(), pipeline.differ.len());
    assert!(vacated.iter().all(|c| pipeline.pool.get(*c).is_none()));
}

#[test]
fn test_instance_matrices_follow_particle_scale() {
    let mut pipeline = Pipeline::new();
    pipeline.show("Hi");
    for _ in 0..10 {
        pipeline.step();
    }

    let particles = pipeline.pool.particles();
    let mut buffer = InstanceBuffer::<InstanceTransform>::new(particles.len());
    let builder = InstanceTransformBuilder::new(1.0);
    builder.build(particles, Quat::IDENTITY, &mut buffer);

    assert_eq!(buffer.len(), particles.len());
    assert!(buffer.needs_upload());
    for (particle, instance) in particles.iter().zip(buffer.as_slice()) {
        assert!((instance.uniform_scale() - particle.scale).abs() < 1e-4);
        let expected = Vec3::new(particle.x, 1.0 - particle.y, particle.z);
        assert!((instance.translation() - expected).length() < 1e-3);
    }
}
