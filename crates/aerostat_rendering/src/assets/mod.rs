//! # Asset Pipeline
//!
//! Loads balloon and burner models, or stands in for them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ASSET PIPELINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  path → GlbAssetLoader (tokio fs) → container check         │
//! │                                   → extension check (Draco) │
//! │                                   → LoadedModel             │
//! │  any AssetError → PlaceholderBalloon (procedural)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are never fatal: the caller logs a warning and keeps the
//! placeholder.

mod glb;
mod model;
mod placeholder;

pub use glb::{parse_glb, DecoderConfig, DecoderKind, GlbAssetLoader, GlbSummary, DRACO_EXTENSION};
pub use model::{AssetError, AssetLoader, AssetResult, LoadedModel, MaterialOverride, ModelSource};
pub use placeholder::{colors, unpack_rgb, BasketPart, EnvelopePart, PlaceholderBalloon};
