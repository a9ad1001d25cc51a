//! # Preloader Configuration
//!
//! Loaded once at startup from TOML. Every section is optional and every
//! field falls back to the tuned defaults below, so an empty file is a valid
//! configuration.
//!
//! ```toml
//! seed = 7
//!
//! [balloons]
//! use_placeholders = true
//! safe_zone = { desktop = 7.0, mobile = 5.0 }
//!
//! [timeline]
//! target_page = "pre-launch.html"
//! ```
//!
//! Values that differ between phones and desktops are [`Responsive`] pairs,
//! resolved with the [`LayoutProfile`] picked from the viewport width.

use std::path::Path;
use std::time::Duration;

use aerostat_rendering::{DecoderConfig, FlameConfig, FontDescriptor, TextParticleConfig, Viewport};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PreloaderError, PreloaderResult};

/// Layout class of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutProfile {
    /// Wider than the mobile breakpoint.
    Desktop,
    /// At or below the mobile breakpoint.
    Mobile,
}

impl LayoutProfile {
    /// Classifies a viewport width. The breakpoint itself counts as mobile.
    #[must_use]
    pub fn for_viewport(width: f32, breakpoint: f32) -> Self {
        if width <= breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// True for [`LayoutProfile::Mobile`].
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

/// A value with separate desktop and mobile settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Responsive<T> {
    /// Desktop value.
    pub desktop: T,
    /// Mobile value.
    pub mobile: T,
}

impl<T: Copy> Responsive<T> {
    /// Creates a pair.
    #[must_use]
    pub const fn new(desktop: T, mobile: T) -> Self {
        Self { desktop, mobile }
    }

    /// The value for `profile`.
    #[inline]
    #[must_use]
    pub fn pick(&self, profile: LayoutProfile) -> T {
        match profile {
            LayoutProfile::Desktop => self.desktop,
            LayoutProfile::Mobile => self.mobile,
        }
    }
}

/// A closed interval sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a value. A reversed or empty span returns `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        self.min + (self.max - self.min) * rng.gen::<f32>()
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Initial window size and the mobile breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in CSS pixels.
    pub width: f32,
    /// Height in CSS pixels.
    pub height: f32,
    /// Widths at or below this use the mobile layout.
    pub mobile_breakpoint: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            mobile_breakpoint: 768.0,
        }
    }
}

impl ViewportConfig {
    /// The viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Layout for the configured width.
    #[must_use]
    pub fn profile(&self) -> LayoutProfile {
        LayoutProfile::for_viewport(self.width, self.mobile_breakpoint)
    }
}

/// Balloon scene camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip.
    pub near: f32,
    /// Far clip.
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: Responsive<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: Responsive::new(30.0, 40.0),
        }
    }
}

/// The rising balloon field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonConfig {
    /// How many models to load.
    pub target_count: usize,
    /// Paths always picked first, if they are in `model_paths`.
    pub priority_paths: Vec<String>,
    /// Candidate model paths.
    pub model_paths: Vec<String>,
    /// Half width of the central strip kept clear for the engine.
    pub safe_zone: Responsive<f32>,
    /// Full horizontal spawn range.
    pub x_range: Responsive<f32>,
    /// Highest spawn height.
    pub start_y: f32,
    /// Spawn heights reach down to `start_y - start_y_spread`.
    pub start_y_spread: f32,
    /// Full depth spawn range, centred on zero.
    pub depth_range: f32,
    /// Uniform scale range.
    pub scale: Span,
    /// Rise per nominal frame.
    pub speed: Span,
    /// Upper bound of the sway frequency (per millisecond).
    pub sway_speed_max: f32,
    /// Sway amplitude per nominal frame.
    pub sway_step: f32,
    /// Show procedural balloons until models arrive.
    pub use_placeholders: bool,
    /// How many placeholders to show.
    pub placeholder_count: Responsive<usize>,
    /// Screen fraction from the top that triggers the reveal.
    pub reveal_screen_y: f32,
}

impl Default for BalloonConfig {
    fn default() -> Self {
        Self {
            target_count: 10,
            priority_paths: vec![
                "assets/balloons/hab.glb".to_string(),
                "assets/balloons/hab3.glb".to_string(),
            ],
            model_paths: ["assets/balloons/hab.glb".to_string(), "assets/balloons/hab3.glb".to_string()]
                .into_iter()
                .chain((1..=20).map(|i| format!("assets/new-balloons/new-balloon-{i}.glb")))
                .collect(),
            safe_zone: Responsive::new(7.0, 5.0),
            x_range: Responsive::new(50.0, 30.0),
            start_y: -10.0,
            start_y_spread: 4.0,
            depth_range: 20.0,
            scale: Span::new(2.2, 3.4),
            speed: Span::new(0.4, 0.7),
            sway_speed_max: 0.01,
            sway_step: 0.02,
            use_placeholders: false,
            placeholder_count: Responsive::new(10, 6),
            reveal_screen_y: 0.25,
        }
    }
}

/// The burner engine model and its flames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model path.
    pub path: String,
    /// Uniform model scale.
    pub scale: Responsive<f32>,
    /// Horizontal rest position.
    pub base_x: Responsive<f32>,
    /// Flame offsets in model space: right burner, then left burner.
    pub burner_offsets: [[f32; 3]; 2],
    /// Bob amplitude once revealed.
    pub bob_amplitude: f32,
    /// Bob phase per millisecond.
    pub bob_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "assets/burner/hab-engine.glb".to_string(),
            scale: Responsive::new(7.0, 4.5),
            base_x: Responsive::new(-2.5, 0.0),
            burner_offsets: [[0.7, -0.35, 0.0], [0.0, -0.35, 0.0]],
            bob_amplitude: 0.25,
            bob_rate: 0.0015,
        }
    }
}

/// The cloud text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Text to show; `\n` separates lines.
    pub content: String,
    /// Font used for measuring and sampling.
    pub font: FontDescriptor,
    /// Font file to load; `None` keeps the block fallback.
    pub font_path: Option<String>,
    /// Scene units per raster pixel.
    pub scale_factor: Responsive<f32>,
    /// Text camera field of view in degrees.
    pub camera_fov: f32,
    /// Text camera rest distance.
    pub camera_distance: f32,
    /// Particle spawn parameters. `scale_factor` above overrides theirs.
    pub particles: TextParticleConfig,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "We are\nWhoosh!!".to_string(),
            font: FontDescriptor::default(),
            font_path: Some("assets/fonts/Poppins-ExtraBold.ttf".to_string()),
            scale_factor: Responsive::new(0.08, 0.12),
            camera_fov: 45.0,
            camera_distance: 18.0,
            particles: TextParticleConfig::default(),
        }
    }
}

/// The bounded model loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Loads in flight at once.
    pub max_concurrent: usize,
    /// Delay between launches.
    pub stagger_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            stagger_ms: 80,
        }
    }
}

impl LoaderConfig {
    /// Launch delay.
    #[must_use]
    pub const fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

/// One-shot cue timings, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Text layer starts this long after launch.
    pub text_start_ms: u64,
    /// Longest wait for the font before sampling with the fallback.
    pub font_wait_ms: u64,
    /// Total time the font load may take before it is abandoned.
    pub font_retry_ms: u64,
    /// Text dissipates this long after it appears.
    pub dissipate_after_ms: u64,
    /// Preloader fades this long after enter.
    pub fade_after_ms: u64,
    /// Navigation happens this long after enter.
    pub navigate_after_ms: u64,
    /// Page to navigate to.
    pub target_page: String,
    /// Decorative cloud opacity while the text is shown.
    pub dimmed_cloud_opacity: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            text_start_ms: 1500,
            font_wait_ms: 1800,
            font_retry_ms: 5000,
            dissipate_after_ms: 4000,
            fade_after_ms: 3000,
            navigate_after_ms: 4500,
            target_page: "pre-launch.html".to_string(),
            dimmed_cloud_opacity: 0.3,
        }
    }
}

/// The follow-up page: two drifters and a pointer follower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Camera field of view in degrees.
    pub camera_fov: f32,
    /// Camera distance along +Z.
    pub camera_distance: f32,
    /// Distance beyond the view edge where drifters spawn and reset.
    pub edge_margin: f32,
    /// Drifter depth range.
    pub depth: Span,
    /// Drifter spawn height as a fraction of the half view height.
    pub height_fraction: f32,
    /// Horizontal speed per nominal frame.
    pub speed: Span,
    /// Lateral sway frequency.
    pub sway_speed: Span,
    /// Bob amplitude.
    pub bob_amplitude: Span,
    /// Bob frequency.
    pub bob_speed: Span,
    /// Random phase spread in seconds.
    pub phase_spread: f32,
    /// Sway contribution per nominal frame.
    pub sway_step: f32,
    /// Bob contribution per nominal frame.
    pub bob_step: f32,
    /// Follower distance from the pointer.
    pub follower_standoff: f32,
    /// Follower bob amplitude.
    pub follower_bob: f32,
    /// Follower bob frequency.
    pub follower_bob_rate: f32,
    /// Follower start position (x, y).
    pub follower_start: [f32; 2],
    /// Plane the follower moves on.
    pub follower_z: f32,
    /// Placeholder scale.
    pub placeholder_scale: f32,
    /// Loaded drifter scale.
    pub drifter_scale: f32,
    /// Loaded follower scale.
    pub follower_scale: f32,
    /// Models for the left drifter, right drifter and follower.
    pub model_paths: [String; 3],
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            camera_fov: 60.0,
            camera_distance: 30.0,
            edge_margin: 1.5,
            depth: Span::new(-5.0, 5.0),
            height_fraction: 0.6,
            speed: Span::new(0.015, 0.03),
            sway_speed: Span::new(0.2, 0.5),
            bob_amplitude: Span::new(0.15, 0.35),
            bob_speed: Span::new(0.3, 0.6),
            phase_spread: 10.0,
            sway_step: 0.002,
            bob_step: 0.01,
            follower_standoff: 1.2,
            follower_bob: 0.05,
            follower_bob_rate: 1.2,
            follower_start: [-4.0, -1.0],
            follower_z: 0.0,
            placeholder_scale: 1.8,
            drifter_scale: 2.2,
            follower_scale: 2.0,
            model_paths: [
                "assets/new-balloons/new-balloon-1.glb".to_string(),
                "assets/new-balloons/new-balloon-2.glb".to_string(),
                "assets/new-balloons/new-balloon-9.glb".to_string(),
            ],
        }
    }
}

// =============================================================================
// ROOT
// =============================================================================

/// Complete preloader configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Window size and breakpoint.
    pub viewport: ViewportConfig,
    /// Balloon scene camera.
    pub camera: CameraConfig,
    /// Rising balloons.
    pub balloons: BalloonConfig,
    /// Burner engine.
    pub engine: EngineConfig,
    /// Flame emitters.
    pub flame: FlameConfig,
    /// Cloud text.
    pub text: TextConfig,
    /// Model loader.
    pub loader: LoaderConfig,
    /// Cue timings.
    pub timeline: TimelineConfig,
    /// Follow-up drift scene.
    pub drift: DriftConfig,
    /// Draco decoder.
    pub decoder: DecoderConfig,
    /// Directory asset paths are relative to.
    pub asset_root: String,
    /// Fixed random seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl PreloaderConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// [`PreloaderError::Config`] if the document does not match.
    pub fn from_toml_str(source: &str) -> PreloaderResult<Self> {
        let config: Self = toml::from_str(source)?;
        tracing::debug!(seed = ?config.seed, "Parsed preloader config");
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`PreloaderError::Io`] if the file cannot be read,
    /// [`PreloaderError::Config`] if it does not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> PreloaderResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PreloaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "Loaded preloader config");
        Ok(config)
    }

    /// Layout for the configured viewport.
    #[must_use]
    pub fn profile(&self) -> LayoutProfile {
        self.viewport.profile()
    }

    /// Seed for a sub-system, offset so each one draws a distinct stream.
    #[must_use]
    pub fn sub_seed(&self, stream: u64) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_document_is_default() {
        let config = PreloaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, PreloaderConfig::default());
        assert_eq!(config.loader.max_concurrent, 3);
        assert_eq!(config.loader.stagger(), Duration::from_millis(80));
        assert_eq!(config.balloons.model_paths.len(), 22);
        assert_eq!(config.flame.capacity, 250);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = PreloaderConfig::from_toml_str(
            r#"
            seed = 42

            [balloons]
            use_placeholders = true
            safe_zone = { desktop = 9.0, mobile = 4.0 }

            [text]
            content = "Hi"

            [flame]
            capacity = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert!(config.balloons.use_placeholders);
        assert_eq!(config.balloons.safe_zone.pick(LayoutProfile::Desktop), 9.0);
        assert_eq!(config.balloons.target_count, 10);
        assert_eq!(config.text.content, "Hi");
        assert_eq!(config.text.camera_fov, 45.0);
        assert_eq!(config.flame.capacity, 100);
        assert_eq!(config.flame.respawn_per_update, 5);
        assert_eq!(config.timeline.target_page, "pre-launch.html");
    }

    #[test]
    fn test_invalid_document() {
        let err = PreloaderConfig::from_toml_str("[loader]\nmax_concurrent = \"three\"").unwrap_err();
        assert!(matches!(err, PreloaderError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PreloaderConfig::load("/nonexistent/aerostat.toml").unwrap_err();
        assert!(matches!(err, PreloaderError::Io { .. }));
    }

    #[test]
    fn test_layout_breakpoint() {
        assert_eq!(LayoutProfile::for_viewport(768.0, 768.0), LayoutProfile::Mobile);
        assert_eq!(LayoutProfile::for_viewport(769.0, 768.0), LayoutProfile::Desktop);

        let mut config = PreloaderConfig::default();
        config.viewport.width = 390.0;
        let profile = config.profile();
        assert!(profile.is_mobile());
        assert_eq!(config.text.scale_factor.pick(profile), 0.12);
        assert_eq!(config.engine.scale.pick(profile), 4.5);
        assert_eq!(config.camera.distance.pick(profile), 40.0);
    }

    #[test]
    fn test_span_sampling() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let span = Span::new(2.2, 3.4);
        for _ in 0..100 {
            let v = span.sample(&mut rng);
            assert!((2.2..3.4).contains(&v));
        }
        assert_eq!(Span::new(1.0, 1.0).sample(&mut rng), 1.0);
    }

    #[test]
    fn test_sub_seeds_differ() {
        let config = PreloaderConfig {
            seed: Some(10),
            ..PreloaderConfig::default()
        };
        assert_eq!(config.sub_seed(1), Some(11));
        assert_eq!(PreloaderConfig::default().sub_seed(1), None);
    }
}
