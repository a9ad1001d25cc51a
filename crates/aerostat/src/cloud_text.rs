//! # Cloud Text
//!
//! Glues the text pipeline together for one text layer:
//!
//! ```text
//! set_text / resize / font arrives
//!        │
//!        ▼
//!  measure ─→ GlyphMaskSampler ─→ PointSetDiffer ─→ ParticlePool::sync
//!                                                        │
//! every frame:  ParticlePool::advance ─→ forget retired ─┤
//!                                                        ▼
//!                          InstanceTransformBuilder ─→ InstanceBuffer
//! ```
//!
//! The layer stays hidden until the font is ready or the wait times out.
//! A timed-out wait samples with the block fallback, then samples once more
//! when the real font lands.

use std::time::Duration;

use aerostat_rendering::{
    BlockRasterizer, DiffSummary, FontDescriptor, FontdueRasterizer, GlyphMaskSampler,
    InstanceBatch, InstanceBuffer, InstanceTransform, InstanceTransformBuilder, ParticlePool,
    PerspectiveCamera, PointSetDiffer, TextBox, TextParticleConfig, TextRasterizer, Viewport,
};
use glam::{Mat4, Vec2, Vec3};

use crate::config::{LayoutProfile, TextConfig};
use crate::font::FontGate;

/// The animated particle text layer and its camera.
#[derive(Debug)]
pub struct CloudText {
    content: String,
    font: FontDescriptor,
    scale_factor: f32,
    camera_distance: f32,
    sampler: GlyphMaskSampler,
    differ: PointSetDiffer,
    pool: ParticlePool,
    builder: InstanceTransformBuilder,
    buffer: InstanceBuffer<InstanceTransform>,
    camera: PerspectiveCamera,
    fallback: BlockRasterizer,
    face: Option<FontdueRasterizer>,
    gate: FontGate,
    text_box: TextBox,
    dissipating: bool,
    samples: u64,
}

impl CloudText {
    /// Creates a hidden text layer.
    #[must_use]
    pub fn new(config: &TextConfig, profile: LayoutProfile, viewport: Viewport, seed: Option<u64>) -> Self {
        let scale_factor = config.scale_factor.pick(profile);
        let particles = TextParticleConfig {
            scale_factor,
            ..config.particles
        };
        let pool = match seed {
            Some(seed) => ParticlePool::with_seed(particles, seed),
            None => ParticlePool::new(particles),
        };
        let camera = PerspectiveCamera::new(config.camera_fov, viewport.aspect(), 0.1, 1000.0)
            .with_position(Vec3::new(0.0, 0.0, config.camera_distance));

        Self {
            content: config.content.clone(),
            font: config.font.clone(),
            scale_factor,
            camera_distance: config.camera_distance,
            sampler: GlyphMaskSampler::new(),
            differ: PointSetDiffer::new(),
            pool,
            builder: InstanceTransformBuilder::new(0.0),
            buffer: InstanceBuffer::new(0),
            camera,
            fallback: BlockRasterizer,
            face: None,
            gate: FontGate::Idle,
            text_box: TextBox::new(0, 0),
            dissipating: false,
            samples: 0,
        }
    }

    /// Starts the font wait. The text shows at `now + font_wait` at the
    /// latest, immediately if the font is already here.
    pub fn start(&mut self, now: Duration, font_wait: Duration) {
        if self.gate != FontGate::Idle {
            return;
        }
        if self.face.is_some() {
            self.open();
        } else {
            self.gate = FontGate::Waiting {
                deadline: now.saturating_add(font_wait),
            };
            tracing::debug!(wait_ms = font_wait.as_millis() as u64, "Text waiting for font");
        }
    }

    /// Takes the loaded font. Opens a waiting layer, or resamples one that
    /// is showing the fallback.
    pub fn font_loaded(&mut self, face: FontdueRasterizer) {
        self.face = Some(face);
        match self.gate {
            FontGate::Waiting { .. } => self.open(),
            FontGate::Fallback if !self.dissipating => {
                self.gate = FontGate::Ready;
                tracing::info!("Font arrived late, resampling text");
                self.refresh();
            }
            FontGate::Fallback => self.gate = FontGate::Ready,
            FontGate::Idle | FontGate::Ready => {}
        }
    }

    /// Advances the layer. Returns `true` on the frame it becomes visible.
    pub fn update(&mut self, now: Duration, dt: f32) -> bool {
        let opened = matches!(self.gate, FontGate::Waiting { .. }) && !self.gate.is_waiting(now);
        if opened {
            tracing::info!("Font wait timed out, using fallback");
            self.open();
        }

        if self.gate.is_open() {
            self.pool.advance(dt);
            let retired = self.pool.drain_retired();
            self.differ.forget(&retired);
            self.builder
                .build(self.pool.particles(), self.camera.rotation, &mut self.buffer);
        }
        opened
    }

    /// Replaces the text. Resampled right away if the layer is showing and
    /// not dissipating.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
        if self.accepts_samples() {
            self.refresh();
        }
    }

    /// Measures, samples and reconciles the current text.
    pub fn refresh(&mut self) -> DiffSummary {
        let rasterizer: &dyn TextRasterizer = match &self.face {
            Some(face) => face,
            None => &self.fallback,
        };
        self.text_box = rasterizer.measure(&self.content, &self.font);

        let summary = match self
            .sampler
            .sample(rasterizer, &self.content, self.text_box, &self.font)
        {
            Ok(grid) => self.differ.reconcile(&grid),
            Err(error) => {
                tracing::debug!(%error, "Empty text layout, clearing points");
                self.differ.mark_all_for_removal();
                DiffSummary::default()
            }
        };
        self.samples += 1;

        self.pool.sync(self.differ.points());
        let size = self.scene_size();
        self.builder = InstanceTransformBuilder::new(size.y);
        self.camera.fit_box(size.x, size.y);
        self.builder
            .build(self.pool.particles(), self.camera.rotation, &mut self.buffer);
        summary
    }

    /// Handles a window resize: new aspect, camera back at rest, resample.
    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.set_viewport(viewport);
        self.camera.position = Vec3::new(0.0, 0.0, self.camera_distance);
        if self.accepts_samples() {
            self.refresh();
        } else {
            self.camera.fit_box(self.scene_size().x, self.scene_size().y);
        }
    }

    /// Shrinks every particle away. Returns how many started shrinking.
    pub fn dissipate(&mut self) -> usize {
        self.dissipating = true;
        self.differ.mark_all_for_removal();
        self.pool.dissipate()
    }

    /// True once sampled.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.gate.is_open()
    }

    /// True after [`Self::dissipate`].
    #[must_use]
    pub const fn is_dissipating(&self) -> bool {
        self.dissipating
    }

    /// Font gate state.
    #[must_use]
    pub const fn gate(&self) -> FontGate {
        self.gate
    }

    /// Name of the rasterizer the next sample will use.
    #[must_use]
    pub fn rasterizer_name(&self) -> &'static str {
        match &self.face {
            Some(face) => face.name(),
            None => self.fallback.name(),
        }
    }

    /// Current text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Glyph-mask samples taken so far.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Particle pool.
    #[must_use]
    pub const fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Tracked points.
    #[must_use]
    pub const fn points(&self) -> &PointSetDiffer {
        &self.differ
    }

    /// Text camera.
    #[must_use]
    pub const fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Measured raster box.
    #[must_use]
    pub const fn text_box(&self) -> TextBox {
        self.text_box
    }

    /// Text box size in scene units.
    #[must_use]
    pub fn scene_size(&self) -> Vec2 {
        Vec2::new(
            self.text_box.width as f32 * self.scale_factor,
            self.text_box.height as f32 * self.scale_factor,
        )
    }

    /// Mesh origin: centres the text box on the view axis.
    #[must_use]
    pub fn origin(&self) -> Mat4 {
        let size = self.scene_size();
        Mat4::from_translation(Vec3::new(-0.5 * size.x, -0.5 * size.y, 0.0))
    }

    /// Instance matrices.
    #[must_use]
    pub const fn instances(&self) -> &InstanceBuffer<InstanceTransform> {
        &self.buffer
    }

    /// Instanced draw for this frame.
    #[must_use]
    pub fn batch(&self) -> InstanceBatch<'_> {
        InstanceBatch::from_buffer("cloud_text", self.origin(), 1.0, &self.buffer)
    }

    /// Marks the instance buffer as uploaded.
    pub fn acknowledge_upload(&mut self) {
        self.buffer.acknowledge_upload();
    }

    fn accepts_samples(&self) -> bool {
        self.gate.is_open() && !self.dissipating
    }

    fn open(&mut self) {
        self.gate = if self.face.is_some() {
            FontGate::Ready
        } else {
            FontGate::Fallback
        };
        let summary = self.refresh();
        tracing::info!(
            rasterizer = self.rasterizer_name(),
            points = summary.spawned,
            "Cloud text shown"
        );
    }
}
