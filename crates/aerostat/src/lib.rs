//! # Aerostat
//!
//! The hot-air balloon preloader: rising balloons, a burner with two flame
//! emitters, cloud-particle text, and the drift scene of the follow-up page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            HOST LOOP                             │
//! │           FrameScheduler::frame(&mut stage) per refresh          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  tokio runtime                        frame thread               │
//! │  ─────────────                        ────────────               │
//! │  BoundedLoader ─┐                     Preloader / DriftStage     │
//! │  (3 in flight)  ├──→ Inbox ──drain──→   ├── Timeline cues        │
//! │  load_font ─────┘   (Mutex)             ├── BalloonField         │
//! │                                         ├── BurnerEngine+flames  │
//! │                                         ├── CloudText            │
//! │                                         └── reveal check         │
//! │                                                  ↓               │
//! │                                         Renderer::submit_frame   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in the frame path fails: missing models become placeholders,
//! a slow font becomes block glyphs, and a late result after navigation is
//! dropped.
//!
//! ## Example
//!
//! ```rust
//! use aerostat::{FrameScheduler, Preloader, PreloaderConfig, SchedulerConfig};
//! use aerostat_core::ManualClock;
//! use aerostat_rendering::HeadlessRenderer;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut scheduler =
//!     FrameScheduler::new(clock.clone(), HeadlessRenderer::new(), SchedulerConfig::default());
//! let mut preloader = Preloader::new(PreloaderConfig::default());
//!
//! clock.advance(Duration::from_millis(16));
//! assert!(!scheduler.frame(&mut preloader).is_stopped());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod balloons;
pub mod cloud_text;
pub mod config;
pub mod drift;
pub mod error;
pub mod font;
pub mod inbox;
pub mod loader;
pub mod preloader;
pub mod scheduler;
pub mod timeline;

pub use balloons::{select_random_unique, Balloon, BalloonField, BurnerEngine};
pub use cloud_text::CloudText;
pub use config::{LayoutProfile, PreloaderConfig, Responsive, Span};
pub use drift::{DriftScene, DriftSlot, DriftStage, Drifter, Follower, Side};
pub use error::{PreloaderError, PreloaderResult};
pub use font::{load_font, FontGate};
pub use inbox::Inbox;
pub use loader::{BoundedLoader, LoaderStats};
pub use preloader::{Delivery, Preloader, UiState};
pub use scheduler::{FrameOutcome, FrameReport, FrameScheduler, SchedulerConfig, SchedulerStats, Stage};
pub use timeline::{Cue, Timeline};
