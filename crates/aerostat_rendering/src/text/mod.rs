//! # Cloud Text Sampling
//!
//! Turns a string into a stable set of grid points.
//!
//! ```text
//! "We are\nWhoosh!!"
//!        │ TextRasterizer (fontdue glyphs, or blocks until the font is ready)
//!        ▼
//!   AlphaSurface ──► GlyphMaskSampler ──► OccupancyGrid (alpha > 0)
//!                                              │
//!                                              ▼
//!                     PointSetDiffer::reconcile (carry / mark / spawn)
//! ```
//!
//! Point identity survives text changes: a cell occupied before and after
//! keeps its [`TrackedPoint`], so its particle keeps animating.

mod glyph_mask;
mod point_set;
mod rasterizer;

pub use glyph_mask::{GlyphMaskSampler, OccupancyGrid, SampleError};
pub use point_set::{DiffSummary, GridCoordinate, PointSetDiffer, TrackedPoint};
pub use rasterizer::{
    AlphaSurface, BlockRasterizer, FontDescriptor, FontError, FontdueRasterizer, TextBox,
    TextRasterizer, LINE_HEIGHT_FACTOR,
};
