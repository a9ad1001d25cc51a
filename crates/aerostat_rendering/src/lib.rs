//! # Aerostat Rendering
//!
//! Procedural particle visuals for the preloader, designed around GPU
//! instancing:
//! - Cloud text: a glyph mask sampled into points, one particle per point,
//!   particles keep their identity when the text changes
//! - Flames: fixed-capacity emitters with colour over life
//! - Instance buffers with stable indices and a single upload flag per frame
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        PARTICLE PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Text → GlyphMaskSampler → PointSetDiffer → ParticlePool         │
//! │                                                   ↓              │
//! │                      InstanceTransformBuilder → InstanceBuffer   │
//! │                                                   ↓              │
//! │  FlameEmitter (dt) ─────────────────────→ InstanceBuffer(s)      │
//! │                                                   ↓              │
//! │                                   Renderer::submit_frame         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The renderer itself is a collaborator: anything implementing
//! [`Renderer`] can consume the passes. [`HeadlessRenderer`] records them.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod assets;
pub mod camera;
pub mod effects;
pub mod instancing;
pub mod pipeline;
pub mod text;

pub use camera::{PerspectiveCamera, Viewport};
pub use effects::{
    hsl_to_rgb, FlameConfig, FlameEmitter, FlameParticle, FlameStats, ParticlePhase, ParticlePool,
    TextParticle, TextParticleConfig,
};
pub use instancing::{InstanceBuffer, InstanceColor, InstanceTransform, InstanceTransformBuilder};
pub use pipeline::{
    HeadlessRenderer, InstanceBatch, ObjectKind, ObjectPlacement, PassRecord, RenderPass, RenderStats,
    Renderer,
};
pub use text::{
    AlphaSurface, BlockRasterizer, DiffSummary, FontDescriptor, FontError, FontdueRasterizer,
    GlyphMaskSampler, GridCoordinate, OccupancyGrid, PointSetDiffer, SampleError, TextBox,
    TextRasterizer, TrackedPoint,
};

// === ASSET PIPELINE ===
pub use assets::{
    AssetError, AssetLoader, AssetResult, DecoderConfig, DecoderKind, GlbAssetLoader, GlbSummary,
    LoadedModel, MaterialOverride, ModelSource, PlaceholderBalloon,
};
