//! # Rising Balloon Field and Burner Engine
//!
//! ```text
//!            ┌──────────── reveal line (25% from the top) ───────────┐
//!     ▲      │                                                       │
//!     │ rise │   ( )                                       ( )       │
//!     │      │    |          ┌──── safe zone ────┐          |        │
//!            │               │      [engine]     │                   │
//!            │  ( )          │      (flames)     │     ( )           │
//!            └───────────────┴───────────────────┴───────────────────┘
//!              spawn band: y in [-14, -10], |x| outside the safe zone
//! ```
//!
//! Balloons rise forever; the first one to cross the reveal line shows the
//! engine and the enter button. Motion is defined per nominal 60 Hz frame
//! and scaled by the real frame delta.

use std::collections::VecDeque;

use aerostat_rendering::effects::NOMINAL_FRAME_SECONDS;
use aerostat_rendering::{
    AssetError, FlameConfig, FlameEmitter, LoadedModel, ObjectKind, ObjectPlacement,
    PerspectiveCamera, PlaceholderBalloon,
};
use glam::{Mat4, Quat, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{BalloonConfig, EngineConfig, LayoutProfile};

/// Picks `n` unique paths: every priority path present in `paths` first,
/// then a shuffled selection of the rest.
pub fn select_random_unique<R: Rng + ?Sized>(
    paths: &[String],
    n: usize,
    priority: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut chosen: Vec<String> = Vec::with_capacity(n);
    for path in priority {
        if paths.contains(path) && !chosen.contains(path) {
            chosen.push(path.clone());
        }
    }
    let mut remaining: Vec<&String> = paths.iter().filter(|p| !chosen.contains(*p)).collect();
    remaining.shuffle(rng);
    let need = n.saturating_sub(chosen.len());
    chosen.extend(remaining.into_iter().take(need).cloned());
    chosen.truncate(n);
    chosen
}

/// A balloon in the rising field.
#[derive(Debug, Clone, PartialEq)]
pub struct Balloon {
    /// World position of the basket.
    pub position: Vec3,
    /// Rotation about +Y.
    pub yaw: f32,
    /// Uniform scale.
    pub scale: f32,
    /// Rise per nominal frame.
    pub speed: f32,
    /// Sway frequency (per millisecond).
    pub sway_speed: f32,
    /// What is drawn.
    pub model: LoadedModel,
}

impl Balloon {
    /// Model-to-world matrix.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.yaw),
            self.position,
        )
    }

    /// Scene object for this balloon.
    #[must_use]
    pub fn placement(&self) -> ObjectPlacement {
        ObjectPlacement {
            transform: self.transform(),
            visible: true,
            kind: if self.model.is_placeholder() {
                ObjectKind::Placeholder
            } else {
                ObjectKind::Balloon
            },
        }
    }
}

/// Every rising balloon, plus the queue of placeholders awaiting models.
#[derive(Debug)]
pub struct BalloonField {
    config: BalloonConfig,
    safe_zone: f32,
    x_range: f32,
    placeholder_count: usize,
    balloons: Vec<Balloon>,
    placeholder_queue: VecDeque<usize>,
    rng: ChaCha8Rng,
}

impl BalloonField {
    /// Creates an empty field.
    #[must_use]
    pub fn new(config: BalloonConfig, profile: LayoutProfile, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        Self {
            safe_zone: config.safe_zone.pick(profile),
            x_range: config.x_range.pick(profile),
            placeholder_count: config.placeholder_count.pick(profile),
            config,
            balloons: Vec::new(),
            placeholder_queue: VecDeque::new(),
            rng,
        }
    }

    /// Picks the model paths to load.
    pub fn select_models(&mut self) -> Vec<String> {
        select_random_unique(
            &self.config.model_paths,
            self.config.target_count,
            &self.config.priority_paths,
            &mut self.rng,
        )
    }

    /// Fills the sky with placeholders if enabled. Returns how many.
    pub fn seed_placeholders(&mut self) -> usize {
        if !self.config.use_placeholders {
            return 0;
        }
        for i in 0..self.placeholder_count {
            let model = LoadedModel::placeholder(format!("placeholder-{i}"), PlaceholderBalloon::intro());
            let index = self.spawn(model);
            self.placeholder_queue.push_back(index);
        }
        tracing::debug!(count = self.placeholder_count, "Placeholder balloons seeded");
        self.placeholder_count
    }

    /// Adds a balloon at a random position. Returns its index.
    pub fn spawn(&mut self, model: LoadedModel) -> usize {
        let balloon = Balloon {
            position: Vec3::new(
                self.spawn_x(),
                self.config.start_y - self.rng.gen::<f32>() * self.config.start_y_spread,
                (self.rng.gen::<f32>() - 0.5) * self.config.depth_range,
            ),
            yaw: self.rng.gen::<f32>() * std::f32::consts::TAU,
            scale: self.config.scale.sample(&mut self.rng),
            speed: self.config.speed.sample(&mut self.rng),
            sway_speed: self.rng.gen::<f32>() * self.config.sway_speed_max,
            model,
        };
        self.balloons.push(balloon);
        self.balloons.len() - 1
    }

    /// Takes a loaded model: it replaces the oldest placeholder, keeping its
    /// motion, or spawns fresh when no placeholder is waiting.
    pub fn accept(&mut self, model: LoadedModel) -> usize {
        if let Some(index) = self.placeholder_queue.pop_front() {
            tracing::debug!(path = %model.path, index, "Placeholder replaced");
            self.balloons[index].model = model;
            index
        } else {
            tracing::debug!(path = %model.path, "Balloon added");
            self.spawn(model)
        }
    }

    /// Records a failed load. The sky keeps a placeholder in its place.
    pub fn accept_failure(&mut self, path: &str, error: &AssetError) -> Option<usize> {
        tracing::warn!(path, %error, "Balloon model failed, keeping a placeholder");
        if self.config.use_placeholders {
            None
        } else {
            let model = LoadedModel::placeholder(path, PlaceholderBalloon::intro());
            Some(self.spawn(model))
        }
    }

    /// Rises and sways every balloon. `elapsed_ms` drives the sway phase.
    pub fn update(&mut self, dt: f32, elapsed_ms: f64) {
        if dt <= 0.0 {
            return;
        }
        let ticks = dt / NOMINAL_FRAME_SECONDS;
        let sway_step = self.config.sway_step;
        for balloon in &mut self.balloons {
            balloon.position.y += balloon.speed * ticks;
            let phase = (elapsed_ms * f64::from(balloon.sway_speed)).sin() as f32;
            balloon.position.x += phase * sway_step * ticks;
        }
    }

    /// True if any balloon is at or above the reveal line on screen.
    #[must_use]
    pub fn reached_reveal_line(&self, camera: &PerspectiveCamera) -> bool {
        let line = self.config.reveal_screen_y;
        self.balloons
            .iter()
            .any(|b| camera.screen_y_fraction(b.position) <= line)
    }

    /// Scene objects.
    pub fn placements(&self) -> impl Iterator<Item = ObjectPlacement> + '_ {
        self.balloons.iter().map(Balloon::placement)
    }

    /// All balloons.
    #[must_use]
    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    /// Balloon count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    /// True if the sky is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    /// Placeholders still waiting for a model.
    #[must_use]
    pub fn queued_placeholders(&self) -> usize {
        self.placeholder_queue.len()
    }

    fn spawn_x(&mut self) -> f32 {
        let x = (self.rng.gen::<f32>() - 0.5) * self.x_range;
        if x.abs() >= self.safe_zone {
            return x;
        }
        let side = if x >= 0.0 { 1.0 } else { -1.0 };
        side * (self.safe_zone + self.rng.gen::<f32>() * (self.x_range * 0.5 - self.safe_zone))
    }
}

// =============================================================================
// BURNER ENGINE
// =============================================================================

/// The burner model: hidden until reveal, bobbing afterwards, and lit with
/// two flame emitters on enter.
#[derive(Debug)]
pub struct BurnerEngine {
    model: Option<LoadedModel>,
    base: Vec3,
    position: Vec3,
    scale: f32,
    revealed: bool,
    bob_amplitude: f32,
    bob_rate: f32,
    offsets: [Vec3; 2],
    flame_config: FlameConfig,
    flame_seed: Option<u64>,
    flames: Vec<FlameEmitter>,
}

impl BurnerEngine {
    /// Creates an unlit, hidden engine with no model yet.
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        flame_config: FlameConfig,
        profile: LayoutProfile,
        seed: Option<u64>,
    ) -> Self {
        let base = Vec3::new(config.base_x.pick(profile), 0.0, 0.0);
        Self {
            model: None,
            base,
            position: base,
            scale: config.scale.pick(profile),
            revealed: false,
            bob_amplitude: config.bob_amplitude,
            bob_rate: config.bob_rate,
            offsets: config.burner_offsets.map(Vec3::from_array),
            flame_config,
            flame_seed: seed,
            flames: Vec::with_capacity(2),
        }
    }

    /// Sets the loaded model. Shown immediately if already revealed.
    pub fn attach_model(&mut self, model: LoadedModel) {
        tracing::debug!(path = %model.path, revealed = self.revealed, "Engine model attached");
        self.model = Some(model);
    }

    /// The loaded model, if any.
    #[must_use]
    pub const fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    /// Shows the engine and starts the bob.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// True after [`Self::reveal`].
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// True when there is a model to draw and it has been revealed.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.revealed && self.model.is_some()
    }

    /// Creates both flames. Returns `false` if they already exist or there
    /// is no model to mount them on.
    pub fn ignite(&mut self) -> bool {
        if !self.flames.is_empty() {
            return false;
        }
        if self.model.is_none() {
            tracing::warn!("Engine model missing, burners stay dark");
            return false;
        }
        for (i, offset) in self.offsets.into_iter().enumerate() {
            let mut flame = match self.flame_seed {
                Some(seed) => FlameEmitter::with_seed(self.flame_config, offset, seed.wrapping_add(i as u64)),
                None => FlameEmitter::new(self.flame_config, offset),
            };
            flame.set_parent_scale(self.scale);
            self.flames.push(flame);
        }
        tracing::info!(burners = self.flames.len(), "Burners lit");
        true
    }

    /// True once lit.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        !self.flames.is_empty()
    }

    /// Bobs the engine (after reveal) and advances the flames.
    pub fn update(&mut self, dt: f32, elapsed_ms: f64) {
        if self.revealed {
            let phase = (elapsed_ms * f64::from(self.bob_rate)).sin() as f32;
            self.position.y = self.base.y + phase * self.bob_amplitude;
        }
        for flame in &mut self.flames {
            flame.update(dt);
        }
    }

    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Model-to-world matrix.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), Quat::IDENTITY, self.position)
    }

    /// Flame emitters, right burner first.
    #[must_use]
    pub fn flames(&self) -> &[FlameEmitter] {
        &self.flames
    }

    /// World matrix of a flame's particle space.
    #[must_use]
    pub fn flame_origin(&self, index: usize) -> Option<Mat4> {
        self.flames
            .get(index)
            .map(|flame| self.transform() * flame.local_matrix())
    }

    /// Scene object, once a model is attached.
    #[must_use]
    pub fn placement(&self) -> Option<ObjectPlacement> {
        self.model.as_ref().map(|_| ObjectPlacement {
            transform: self.transform(),
            visible: self.is_visible(),
            kind: ObjectKind::Engine,
        })
    }

    /// Marks flame buffers as uploaded.
    pub fn acknowledge_uploads(&mut self) {
        for flame in &mut self.flames {
            flame.acknowledge_upload();
        }
    }
}
