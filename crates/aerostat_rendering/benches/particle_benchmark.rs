//! Benchmark for per-frame particle work.
//!
//! TARGET: flame update plus text advance well under 1 ms per frame
//!
//! Run with: cargo bench --package aerostat_rendering --bench particle_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use aerostat_rendering::{
    BlockRasterizer, FlameConfig, FlameEmitter, FontDescriptor, GlyphMaskSampler, InstanceBuffer,
    InstanceTransformBuilder, ParticlePool, PointSetDiffer, TextParticleConfig, TextRasterizer,
};
use glam::{Quat, Vec3};

const FRAME: f32 = 1.0 / 60.0;

fn benchmark_flame_update(c: &mut Criterion) {
    let mut flame = FlameEmitter::with_seed(FlameConfig::default(), Vec3::ZERO, 1);
    // Warm up until the emitter is saturated.
    for _ in 0..120 {
        flame.update(FRAME);
    }

    let mut group = c.benchmark_group("flame");
    group.throughput(Throughput::Elements(FlameConfig::default().capacity as u64));
    group.bench_function("update_250", |b| {
        b.iter(|| black_box(flame.update(black_box(FRAME))));
    });
    group.finish();
}

fn benchmark_text_pipeline(c: &mut Criterion) {
    let font = FontDescriptor::default();
    let text = "We are\nWhoosh!!";
    let text_box = BlockRasterizer.measure(text, &font);
    let mut sampler = GlyphMaskSampler::new();

    c.bench_function("sample_and_reconcile", |b| {
        b.iter(|| {
            let mut differ = PointSetDiffer::new();
            if let Ok(grid) = sampler.sample(&BlockRasterizer, text, text_box, &font) {
                black_box(differ.reconcile(&grid));
            }
        });
    });

    let mut differ = PointSetDiffer::new();
    if let Ok(grid) = sampler.sample(&BlockRasterizer, text, text_box, &font) {
        differ.reconcile(&grid);
    }
    let mut pool = ParticlePool::with_seed(TextParticleConfig::default(), 7);
    pool.sync(differ.points());
    let builder = InstanceTransformBuilder::new(text_box.height as f32 * 0.08);
    let mut buffer = InstanceBuffer::new(pool.len());

    let mut group = c.benchmark_group("text_frame");
    group.throughput(Throughput::Elements(pool.len() as u64));
    group.sample_size(20);
    group.bench_function("advance_and_build", |b| {
        b.iter(|| {
            pool.advance(black_box(FRAME));
            builder.build(pool.particles(), Quat::IDENTITY, &mut buffer);
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_flame_update, benchmark_text_pipeline);
criterion_main!(benches);
