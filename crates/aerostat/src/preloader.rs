//! # Preloader
//!
//! The intro scene: balloons rise, the burner appears once one of them
//! crosses the reveal line, the cloud text shows and dissipates, and the
//! enter sequence fades everything out and navigates away.
//!
//! ```text
//! launch ──1.5s──→ StartText ──font or 1.8s──→ text visible ──4s──→ DissipateText
//!    │
//!    └── balloons rise ──→ reveal line ──→ engine + enter button
//!                                              │ enter()
//!                                              ├── burners lit
//!                                              ├── +3.0s FadeOut
//!                                              └── +4.5s Navigate → stop
//! ```
//!
//! Async loads never touch the scene directly. They push a [`Delivery`]
//! into the inbox and the next frame applies it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use aerostat_core::{AnimationSessionState, FrameTime};
use aerostat_rendering::{
    AssetLoader, AssetResult, FontdueRasterizer, InstanceBatch, LoadedModel, ObjectPlacement,
    PerspectiveCamera, RenderPass, Renderer, Viewport,
};
use glam::Vec3;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::balloons::{BalloonField, BurnerEngine};
use crate::cloud_text::CloudText;
use crate::config::{LayoutProfile, PreloaderConfig};
use crate::error::PreloaderResult;
use crate::font::load_font;
use crate::inbox::Inbox;
use crate::loader::{BoundedLoader, LoaderStats};
use crate::scheduler::Stage;
use crate::timeline::{Cue, Timeline};

/// Seed streams so each subsystem draws its own sequence.
const BALLOON_STREAM: u64 = 1;
const ENGINE_STREAM: u64 = 2;
const TEXT_STREAM: u64 = 3;

/// Batch names of the two burners.
const FLAME_BATCHES: [&str; 2] = ["burner_right", "burner_left"];

/// A finished async load waiting for the frame loop.
#[derive(Debug)]
pub enum Delivery {
    /// A rising balloon model.
    Balloon {
        /// Requested path.
        path: String,
        /// Load outcome.
        result: AssetResult<LoadedModel>,
    },
    /// The burner engine model.
    Engine(AssetResult<LoadedModel>),
    /// The text font.
    Font(PreloaderResult<FontdueRasterizer>),
}

/// Page state the host mirrors into its UI.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// The enter button is shown.
    pub button_visible: bool,
    /// Opacity of the whole preloader.
    pub preloader_opacity: f32,
    /// Opacity of the decorative cloud layer.
    pub decorative_cloud_opacity: f32,
    /// Opacity of the text layer.
    pub text_opacity: f32,
    /// Page the host should load, once navigation happened.
    pub navigated_to: Option<String>,
    /// Pointer input reaches the preloader.
    pub pointer_events_enabled: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            button_visible: false,
            preloader_opacity: 1.0,
            decorative_cloud_opacity: 1.0,
            text_opacity: 0.0,
            navigated_to: None,
            pointer_events_enabled: true,
        }
    }
}

/// The intro scene as a frame [`Stage`].
#[derive(Debug)]
pub struct Preloader {
    config: PreloaderConfig,
    profile: LayoutProfile,
    camera: PerspectiveCamera,
    balloons: BalloonField,
    engine: BurnerEngine,
    text: CloudText,
    session: AnimationSessionState,
    timeline: Timeline,
    inbox: Inbox<Delivery>,
    ui: UiState,
    now: Duration,
}

impl Preloader {
    /// Builds the scene. Nothing is loaded yet; see
    /// [`Self::spawn_asset_loads`] and [`Self::spawn_font_load`].
    #[must_use]
    pub fn new(config: PreloaderConfig) -> Self {
        let profile = config.profile();
        let viewport = config.viewport.viewport();
        let camera = PerspectiveCamera::new(
            config.camera.fov_degrees,
            viewport.aspect(),
            config.camera.near,
            config.camera.far,
        )
        .with_position(Vec3::new(0.0, 0.0, config.camera.distance.pick(profile)));

        let mut balloons =
            BalloonField::new(config.balloons.clone(), profile, config.sub_seed(BALLOON_STREAM));
        balloons.seed_placeholders();
        let engine = BurnerEngine::new(&config.engine, config.flame, profile, config.sub_seed(ENGINE_STREAM));
        let text = CloudText::new(&config.text, profile, viewport, config.sub_seed(TEXT_STREAM));

        let mut timeline = Timeline::new();
        timeline.schedule(Duration::from_millis(config.timeline.text_start_ms), Cue::StartText);

        tracing::info!(?profile, balloons = balloons.len(), "Preloader created");
        Self {
            config,
            profile,
            camera,
            balloons,
            engine,
            text,
            session: AnimationSessionState::new(),
            timeline,
            inbox: Inbox::new(),
            ui: UiState::default(),
            now: Duration::ZERO,
        }
    }

    /// Starts the balloon and engine loads on `runtime`. The returned handle
    /// resolves once every balloon load finished.
    pub fn spawn_asset_loads<L>(&mut self, loader: Arc<L>, runtime: &Handle) -> JoinHandle<LoaderStats>
    where
        L: AssetLoader + 'static,
    {
        let paths = self.balloons.select_models();
        tracing::info!(count = paths.len(), "Loading balloon models");

        let engine_path = self.config.engine.path.clone();
        let engine_loader = Arc::clone(&loader);
        let engine_inbox = self.inbox.clone();
        runtime.spawn(async move {
            let result = engine_loader.load(&engine_path).await;
            engine_inbox.push(Delivery::Engine(result));
        });

        let queue = BoundedLoader::from_config(&self.config.loader);
        let inbox = self.inbox.clone();
        runtime.spawn(async move {
            queue
                .run(
                    paths,
                    move |path: String| {
                        let loader = Arc::clone(&loader);
                        async move {
                            let result = loader.load(&path).await;
                            (path, result)
                        }
                    },
                    move |(path, result)| {
                        inbox.push(Delivery::Balloon { path, result });
                    },
                )
                .await
        })
    }

    /// Starts the font load on `runtime`, if a font file is configured.
    pub fn spawn_font_load(&self, runtime: &Handle) -> Option<JoinHandle<()>> {
        let font_path = self.config.text.font_path.as_ref()?;
        let path = Path::new(&self.config.asset_root).join(font_path);
        let wait = Duration::from_millis(self.config.timeline.font_retry_ms);
        let inbox = self.inbox.clone();
        Some(runtime.spawn(async move {
            let result = load_font(path, wait).await;
            inbox.push(Delivery::Font(result));
        }))
    }

    /// Handle for pushing deliveries from elsewhere.
    #[must_use]
    pub fn inbox(&self) -> Inbox<Delivery> {
        self.inbox.clone()
    }

    /// The enter button. Lights the burners if the engine model has landed
    /// and schedules the fade and the navigation. Returns `false` if the
    /// button is not shown or was already pressed.
    pub fn enter(&mut self) -> bool {
        if !self.ui.button_visible || self.session.is_stopped() || !self.session.enter() {
            return false;
        }
        self.engine.ignite();
        self.ui.button_visible = false;
        self.ui.pointer_events_enabled = false;

        let timing = &self.config.timeline;
        self.timeline
            .schedule_after(self.now, Duration::from_millis(timing.fade_after_ms), Cue::FadeOut);
        self.timeline
            .schedule_after(self.now, Duration::from_millis(timing.navigate_after_ms), Cue::Navigate);
        tracing::info!(now_ms = self.now.as_millis() as u64, "Enter pressed");
        true
    }

    /// Window resize.
    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.set_viewport(viewport);
        self.text.resize(viewport);
        tracing::debug!(width = viewport.width, height = viewport.height, "Preloader resized");
    }

    /// Page state.
    #[must_use]
    pub const fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Session latches.
    #[must_use]
    pub const fn session(&self) -> &AnimationSessionState {
        &self.session
    }

    /// Rising balloons.
    #[must_use]
    pub const fn balloons(&self) -> &BalloonField {
        &self.balloons
    }

    /// Burner engine.
    #[must_use]
    pub const fn engine(&self) -> &BurnerEngine {
        &self.engine
    }

    /// Cloud text layer.
    #[must_use]
    pub const fn text(&self) -> &CloudText {
        &self.text
    }

    /// Pending cues.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Balloon scene camera.
    #[must_use]
    pub const fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Layout chosen at startup.
    #[must_use]
    pub const fn profile(&self) -> LayoutProfile {
        self.profile
    }

    /// Clock time of the last frame.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    fn apply(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Balloon { path, result: Ok(model) } => {
                tracing::trace!(path, "Balloon delivered");
                self.balloons.accept(model);
            }
            Delivery::Balloon { path, result: Err(error) } => {
                self.balloons.accept_failure(&path, &error);
            }
            Delivery::Engine(Ok(model)) => self.engine.attach_model(model),
            Delivery::Engine(Err(error)) => {
                tracing::warn!(%error, "Engine model failed, burners will stay dark");
            }
            Delivery::Font(Ok(face)) => self.text.font_loaded(face),
            Delivery::Font(Err(error)) => {
                tracing::warn!(%error, "Font unavailable, keeping fallback glyphs");
            }
        }
    }

    fn fire(&mut self, cue: Cue) {
        tracing::debug!(?cue, now_ms = self.now.as_millis() as u64, "Cue fired");
        match cue {
            Cue::StartText => {
                let wait = Duration::from_millis(self.config.timeline.font_wait_ms);
                self.text.start(self.now, wait);
            }
            Cue::DissipateText => {
                if self.session.dissipate_text() {
                    self.text.dissipate();
                    self.ui.decorative_cloud_opacity = 1.0;
                }
            }
            Cue::FadeOut => self.ui.preloader_opacity = 0.0,
            Cue::Navigate => {
                self.ui.navigated_to = Some(self.config.timeline.target_page.clone());
                self.session.stop();
                self.timeline.clear();
                self.inbox.close();
                tracing::info!(page = %self.config.timeline.target_page, "Navigating");
            }
        }
    }
}

impl Stage for Preloader {
    fn name(&self) -> &'static str {
        "preloader"
    }

    fn update(&mut self, frame: &FrameTime) {
        if self.session.is_stopped() {
            return;
        }
        self.now = frame.elapsed;
        let dt = frame.delta_seconds;
        let elapsed_ms = frame.elapsed.as_secs_f64() * 1000.0;

        for delivery in self.inbox.drain() {
            self.apply(delivery);
        }

        for cue in self.timeline.due(self.now) {
            self.fire(cue);
            if self.session.is_stopped() {
                return;
            }
        }

        self.engine.update(dt, elapsed_ms);
        self.balloons.update(dt, elapsed_ms);

        if self.text.update(self.now, dt) {
            self.ui.decorative_cloud_opacity = self.config.timeline.dimmed_cloud_opacity;
            self.ui.text_opacity = 1.0;
            self.timeline.schedule_after(
                self.now,
                Duration::from_millis(self.config.timeline.dissipate_after_ms),
                Cue::DissipateText,
            );
        }

        if !self.session.is_revealed() && self.balloons.reached_reveal_line(&self.camera) {
            self.session.reveal();
            self.engine.reveal();
            self.ui.button_visible = true;
            tracing::info!(frame = frame.frame_number, "Reveal line reached");
        }
    }

    fn render(&mut self, renderer: &mut dyn Renderer) {
        {
            let objects: Vec<ObjectPlacement> = self
                .balloons
                .placements()
                .chain(self.engine.placement())
                .collect();
            let batches: Vec<InstanceBatch<'_>> = self
                .engine
                .flames()
                .iter()
                .zip(FLAME_BATCHES)
                .enumerate()
                .filter_map(|(i, (flame, name))| {
                    self.engine
                        .flame_origin(i)
                        .map(|origin| InstanceBatch::from_flame(name, origin, flame))
                })
                .collect();
            renderer.submit_frame(&RenderPass {
                name: "scene",
                camera: &self.camera,
                opacity: self.ui.preloader_opacity,
                objects: &objects,
                batches: &batches,
            });

            let text_batches: Vec<InstanceBatch<'_>> = if self.text.is_visible() {
                vec![self.text.batch()]
            } else {
                Vec::new()
            };
            renderer.submit_frame(&RenderPass {
                name: "text",
                camera: self.text.camera(),
                opacity: self.ui.text_opacity * self.ui.preloader_opacity,
                objects: &[],
                batches: &text_batches,
            });
        }

        self.engine.acknowledge_uploads();
        self.text.acknowledge_upload();
    }

    fn is_stopped(&self) -> bool {
        self.session.is_stopped()
    }
}
