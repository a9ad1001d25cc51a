//! # Drift Scene
//!
//! The follow-up page background: two balloons crossing the view in
//! opposite directions and a third standing off the pointer.
//!
//! ```text
//!   -halfW-1.5                                        +halfW+1.5
//!       │  left ──────────────────────────────────→ reset │
//!       │ reset ←────────────────────────────────── right │
//!       │                  follower ◯ ··· 1.2 ··· ✛ pointer
//! ```

use std::sync::Arc;

use aerostat_core::FrameTime;
use aerostat_rendering::assets::colors;
use aerostat_rendering::effects::NOMINAL_FRAME_SECONDS;
use aerostat_rendering::{
    AssetLoader, AssetResult, LoadedModel, ObjectKind, ObjectPlacement, PerspectiveCamera,
    PlaceholderBalloon, RenderPass, Renderer, Viewport,
};
use glam::{Mat4, Quat, Vec2, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::DriftConfig;
use crate::inbox::Inbox;
use crate::loader::{BoundedLoader, LoaderStats};
use crate::scheduler::Stage;

/// Which edge a drifter enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Enters from the left, moves right.
    Left,
    /// Enters from the right, moves left.
    Right,
}

/// Balloons of the drift scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftSlot {
    /// Left-to-right drifter.
    Left,
    /// Right-to-left drifter.
    Right,
    /// Pointer follower.
    Follower,
}

impl DriftSlot {
    /// All slots, in model path order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Follower];

    const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Follower => 2,
        }
    }
}

/// A balloon crossing the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Drifter {
    /// Entry edge.
    pub side: Side,
    /// World position.
    pub position: Vec3,
    /// Horizontal speed per nominal frame (negative for right).
    pub velocity_x: f32,
    /// Lateral sway frequency.
    pub sway_speed: f32,
    /// Bob amplitude.
    pub bob_amplitude: f32,
    /// Bob frequency.
    pub bob_speed: f32,
    /// Phase offset in seconds.
    pub phase: f32,
    /// Uniform scale.
    pub scale: f32,
    /// What is drawn.
    pub model: LoadedModel,
}

/// The balloon that hovers near the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Follower {
    /// World position.
    pub position: Vec3,
    /// Pointer position on the follower plane.
    pub target: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// What is drawn.
    pub model: LoadedModel,
}

/// Drifters, follower and their camera.
#[derive(Debug)]
pub struct DriftScene {
    config: DriftConfig,
    camera: PerspectiveCamera,
    viewport: Viewport,
    left: Drifter,
    right: Drifter,
    follower: Follower,
    rng: ChaCha8Rng,
}

impl DriftScene {
    /// Creates the scene with placeholders in every slot, drifters already
    /// positioned just off-screen.
    #[must_use]
    pub fn new(config: DriftConfig, viewport: Viewport, seed: Option<u64>) -> Self {
        let mut camera = PerspectiveCamera::new(config.camera_fov, viewport.aspect(), 0.1, 1000.0)
            .with_position(Vec3::new(0.0, 0.0, config.camera_distance));
        camera.look_at(Vec3::ZERO);

        let placeholder = |color: u32| {
            LoadedModel::placeholder("placeholder", PlaceholderBalloon::drifter(color, 1.0))
        };
        let drifter = |side: Side, model: LoadedModel| Drifter {
            side,
            position: Vec3::ZERO,
            velocity_x: 0.0,
            sway_speed: 0.0,
            bob_amplitude: 0.0,
            bob_speed: 0.0,
            phase: 0.0,
            scale: config.placeholder_scale,
            model,
        };

        let start = Vec3::new(config.follower_start[0], config.follower_start[1], config.follower_z);
        let mut scene = Self {
            left: drifter(Side::Left, placeholder(colors::ENVELOPE_CORAL)),
            right: drifter(Side::Right, placeholder(colors::ENVELOPE_BLUE)),
            follower: Follower {
                position: start,
                target: Vec3::new(0.0, 0.0, config.follower_z),
                scale: config.placeholder_scale,
                model: placeholder(colors::ENVELOPE_YELLOW),
            },
            rng: seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64),
            camera,
            viewport,
            config,
        };
        scene.reset_drifter(Side::Left, 0.0);
        scene.reset_drifter(Side::Right, 0.0);
        scene
    }

    /// Model path for each slot.
    #[must_use]
    pub fn model_path(&self, slot: DriftSlot) -> &str {
        &self.config.model_paths[slot.index()]
    }

    /// Swaps in a loaded model, or keeps the placeholder on failure.
    pub fn accept(&mut self, slot: DriftSlot, result: AssetResult<LoadedModel>) {
        let model = match result {
            Ok(model) => model,
            Err(error) => {
                tracing::warn!(?slot, %error, "Drift balloon failed, keeping placeholder");
                return;
            }
        };
        tracing::debug!(?slot, path = %model.path, "Drift balloon loaded");
        match slot {
            DriftSlot::Left => {
                self.left.model = model;
                self.left.scale = self.config.drifter_scale;
            }
            DriftSlot::Right => {
                self.right.model = model;
                self.right.scale = self.config.drifter_scale;
            }
            DriftSlot::Follower => {
                self.follower.model = model;
                self.follower.scale = self.config.follower_scale;
            }
        }
    }

    /// Moves the follower target to the pointer. Returns `false` if the
    /// pointer ray misses the follower plane.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        match self
            .camera
            .screen_to_world(Vec2::new(x, y), self.viewport, self.config.follower_z)
        {
            Some(point) => {
                self.follower.target = point;
                true
            }
            None => false,
        }
    }

    /// Updates the camera after a window resize.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
    }

    /// Advances drifters and the follower. `t` is the clock in seconds.
    pub fn update(&mut self, dt: f32, t: f32) {
        if dt > 0.0 {
            let ticks = dt / NOMINAL_FRAME_SECONDS;
            self.update_drifter(Side::Left, ticks, t);
            self.update_drifter(Side::Right, ticks, t);
        }
        self.update_follower(t);
    }

    /// Left drifter.
    #[must_use]
    pub const fn left(&self) -> &Drifter {
        &self.left
    }

    /// Right drifter.
    #[must_use]
    pub const fn right(&self) -> &Drifter {
        &self.right
    }

    /// Pointer follower.
    #[must_use]
    pub const fn follower(&self) -> &Follower {
        &self.follower
    }

    /// Scene camera.
    #[must_use]
    pub const fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Scene objects: left, right, follower.
    #[must_use]
    pub fn placements(&self) -> [ObjectPlacement; 3] {
        let place = |position: Vec3, scale: f32, model: &LoadedModel| ObjectPlacement {
            transform: Mat4::from_scale_rotation_translation(Vec3::splat(scale), Quat::IDENTITY, position),
            visible: true,
            kind: if model.is_placeholder() {
                ObjectKind::Placeholder
            } else {
                ObjectKind::Balloon
            },
        };
        [
            place(self.left.position, self.left.scale, &self.left.model),
            place(self.right.position, self.right.scale, &self.right.model),
            place(self.follower.position, self.follower.scale, &self.follower.model),
        ]
    }

    fn drifter_mut(&mut self, side: Side) -> &mut Drifter {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn reset_drifter(&mut self, side: Side, t: f32) {
        let cfg = &self.config;
        let rng = &mut self.rng;
        let z = cfg.depth.sample(rng);
        let extents = self.camera.view_extents_at_z(z);
        let margin = cfg.edge_margin;
        let spread = extents.y * cfg.height_fraction;
        let y = crate::config::Span::new(-spread, spread).sample(rng);
        let speed = cfg.speed.sample(rng);
        let (x, velocity_x) = match side {
            Side::Left => (-extents.x - margin, speed),
            Side::Right => (extents.x + margin, -speed),
        };
        let sway_speed = cfg.sway_speed.sample(rng);
        let bob_amplitude = cfg.bob_amplitude.sample(rng);
        let bob_speed = cfg.bob_speed.sample(rng);
        let phase = t + crate::config::Span::new(0.0, cfg.phase_spread).sample(rng);

        let drifter = self.drifter_mut(side);
        drifter.position = Vec3::new(x, y, z);
        drifter.velocity_x = velocity_x;
        drifter.sway_speed = sway_speed;
        drifter.bob_amplitude = bob_amplitude;
        drifter.bob_speed = bob_speed;
        drifter.phase = phase;
    }

    fn update_drifter(&mut self, side: Side, ticks: f32, t: f32) {
        let sway_step = self.config.sway_step;
        let bob_step = self.config.bob_step;
        let margin = self.config.edge_margin;

        let drifter = self.drifter_mut(side);
        drifter.position.x += drifter.velocity_x * ticks;
        drifter.position.y += (t * drifter.sway_speed + drifter.phase).sin() * sway_step * ticks;
        let bob = (t * drifter.bob_speed + drifter.phase).sin() * drifter.bob_amplitude;
        drifter.position.y += bob_step * bob * ticks;
        let (x, z) = (drifter.position.x, drifter.position.z);

        let half_width = self.camera.view_extents_at_z(z).x;
        let exited = match side {
            Side::Left => x > half_width + margin,
            Side::Right => x < -half_width - margin,
        };
        if exited {
            tracing::trace!(?side, "Drifter crossed, resetting");
            self.reset_drifter(side, t);
        }
    }

    fn update_follower(&mut self, t: f32) {
        let follower = &mut self.follower;
        let offset = follower.target - follower.position;
        let distance = offset.length().max(1e-5);
        let direction = offset / distance;
        follower.position = follower.target - direction * self.config.follower_standoff;
        follower.position.y += (t * self.config.follower_bob_rate).sin() * self.config.follower_bob;
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// The drift scene as a frame [`Stage`], with its model loads.
#[derive(Debug)]
pub struct DriftStage {
    scene: DriftScene,
    inbox: Inbox<(DriftSlot, AssetResult<LoadedModel>)>,
    stopped: bool,
}

impl DriftStage {
    /// Wraps a scene.
    #[must_use]
    pub fn new(scene: DriftScene) -> Self {
        Self {
            scene,
            inbox: Inbox::new(),
            stopped: false,
        }
    }

    /// Loads the three balloon models on `runtime`. Each one replaces its
    /// placeholder on the frame after it arrives.
    pub fn spawn_loads<L>(&self, loader: Arc<L>, runtime: &Handle) -> JoinHandle<LoaderStats>
    where
        L: AssetLoader + 'static,
    {
        let jobs: Vec<(DriftSlot, String)> = DriftSlot::ALL
            .into_iter()
            .map(|slot| (slot, self.scene.model_path(slot).to_string()))
            .collect();
        let inbox = self.inbox.clone();
        runtime.spawn(async move {
            BoundedLoader::default()
                .run(
                    jobs,
                    move |(slot, path): (DriftSlot, String)| {
                        let loader = Arc::clone(&loader);
                        async move { (slot, loader.load(&path).await) }
                    },
                    move |delivery| {
                        inbox.push(delivery);
                    },
                )
                .await
        })
    }

    /// Pointer moved, in screen pixels.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        self.scene.pointer_moved(x, y)
    }

    /// Window resize.
    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
    }

    /// Leaves the page. Late loads are dropped.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.inbox.close();
    }

    /// The scene.
    #[must_use]
    pub const fn scene(&self) -> &DriftScene {
        &self.scene
    }
}

impl Stage for DriftStage {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn update(&mut self, frame: &FrameTime) {
        for (slot, result) in self.inbox.drain() {
            self.scene.accept(slot, result);
        }
        self.scene
            .update(frame.delta_seconds, frame.elapsed.as_secs_f32());
    }

    fn render(&mut self, renderer: &mut dyn Renderer) {
        let objects = self.scene.placements();
        renderer.submit_frame(&RenderPass {
            name: "drift",
            camera: self.scene.camera(),
            opacity: 1.0,
            objects: &objects,
            batches: &[],
        });
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerostat_rendering::{AssetError, GlbSummary, ModelSource};

    fn scene() -> DriftScene {
        DriftScene::new(DriftConfig::default(), Viewport::new(1280.0, 720.0), Some(9))
    }

    fn gltf(path: &str) -> LoadedModel {
        LoadedModel {
            path: path.to_string(),
            source: ModelSource::Gltf(GlbSummary::default()),
            material_override: None,
        }
    }

    #[test]
    fn test_drifters_start_off_screen() {
        let scene = scene();
        let left = scene.left();
        let half = scene.camera().view_extents_at_z(left.position.z);
        assert!((left.position.x - (-half.x - 1.5)).abs() < 1e-4);
        assert!(left.velocity_x >= 0.015 && left.velocity_x < 0.03);
        assert!(left.position.y.abs() <= half.y * 0.6);

        let right = scene.right();
        let half = scene.camera().view_extents_at_z(right.position.z);
        assert!((right.position.x - (half.x + 1.5)).abs() < 1e-4);
        assert!(right.velocity_x < 0.0);
    }

    #[test]
    fn test_drifter_resets_after_crossing() {
        let mut scene = scene();
        let mut resets = 0;
        let mut previous = scene.left().position.x;
        for frame in 0..10_000 {
            scene.update(NOMINAL_FRAME_SECONDS, frame as f32 * NOMINAL_FRAME_SECONDS);
            let x = scene.left().position.x;
            if x < previous {
                resets += 1;
            }
            previous = x;
        }
        assert!(resets >= 1);
        assert_eq!(scene.left().side, Side::Left);
    }

    #[test]
    fn test_follower_stands_off_pointer() {
        let mut scene = scene();
        assert!(scene.pointer_moved(640.0, 360.0));
        scene.update(0.0, 0.0);
        let follower = scene.follower();
        assert!(follower.target.length() < 1e-3);
        let distance = (follower.position - follower.target).length();
        assert!((distance - 1.2).abs() < 1e-3);
    }

    #[test]
    fn test_follower_bobs() {
        let mut scene = scene();
        scene.pointer_moved(640.0, 360.0);
        let t = std::f32::consts::FRAC_PI_2 / 1.2;
        scene.update(0.0, 0.0);
        let rest = scene.follower().position;
        scene.update(0.0, t);
        let bobbed = scene.follower().position;
        assert!(bobbed.y > rest.y);
    }

    #[test]
    fn test_accept_swaps_model_and_scale() {
        let mut scene = scene();
        assert!(scene.placements().iter().all(|p| p.kind == ObjectKind::Placeholder));

        let path = scene.model_path(DriftSlot::Left).to_string();
        scene.accept(DriftSlot::Left, Ok(gltf(&path)));
        scene.accept(DriftSlot::Follower, Err(AssetError::MissingChunk("BIN")));

        assert_eq!(scene.left().scale, 2.2);
        assert_eq!(scene.follower().scale, 1.8);
        let kinds = scene.placements().map(|p| p.kind);
        assert_eq!(kinds, [ObjectKind::Balloon, ObjectKind::Placeholder, ObjectKind::Placeholder]);
    }

    #[test]
    fn test_stage_applies_loads_and_stops() {
        let mut stage = DriftStage::new(scene());
        stage
            .inbox
            .push((DriftSlot::Right, Ok(gltf("assets/balloons/new-balloon-2.glb"))));
        let frame = FrameTime {
            frame_number: 1,
            delta_seconds: NOMINAL_FRAME_SECONDS,
            elapsed: std::time::Duration::from_millis(16),
        };
        stage.update(&frame);
        assert_eq!(stage.scene().right().model.path, "assets/balloons/new-balloon-2.glb");

        stage.stop();
        assert!(stage.is_stopped());
        assert!(!stage.inbox.push((DriftSlot::Left, Ok(gltf("late.glb")))));
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut scene = scene();
        scene.resize(Viewport::new(500.0, 1000.0));
        assert!((scene.camera().aspect - 0.5).abs() < 1e-6);
    }
}
