//! # Frame Scheduler
//!
//! One entry point per display refresh:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         FRAME TIMELINE                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  stopped? ──yes──→ FrameOutcome::Stopped (never re-armed)       │
//! │     │ no                                                        │
//! │  1. Tick clock (delta clamped to max_step)                      │
//! │  2. Stage::update                                               │
//! │     ├── drain async deliveries                                  │
//! │     ├── fire due cues                                           │
//! │     ├── flames, balloons, drifters, text particles              │
//! │     └── reveal check                                            │
//! │  3. Stage::render → Renderer::submit_frame (one per pass)       │
//! │  4. Renderer::present                                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The host re-arms the loop by calling [`FrameScheduler::frame`] on its
//! next refresh. Once the stage reports stopped, every call returns
//! [`FrameOutcome::Stopped`] without touching the clock or the renderer.

use std::time::{Duration, Instant};

use aerostat_core::{DisplayClock, FrameTime, FrameTimer};
use aerostat_rendering::Renderer;

/// Something the scheduler drives once per frame.
pub trait Stage {
    /// Label for logs.
    fn name(&self) -> &'static str;

    /// Advances simulation state.
    fn update(&mut self, frame: &FrameTime);

    /// Submits this frame's passes.
    fn render(&mut self, renderer: &mut dyn Renderer);

    /// True once the stage must never run again.
    fn is_stopped(&self) -> bool;
}

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Largest delta handed to stages.
    pub max_step: Duration,
    /// Frames slower than this are counted as over budget.
    pub frame_budget: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_step: Duration::from_millis(100),
            frame_budget: Duration::from_micros(16_666), // ~16ms for 60fps
        }
    }
}

/// Timing of one executed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame_number: u64,
    /// Clamped delta handed to the stage.
    pub delta_seconds: f32,
    /// Clock time of the frame.
    pub elapsed: Duration,
    /// Time spent in update (microseconds).
    pub update_us: u32,
    /// Time spent in render and present (microseconds).
    pub render_us: u32,
    /// Work exceeded the frame budget.
    pub over_budget: bool,
}

/// What a call to [`FrameScheduler::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The frame ran.
    Rendered(FrameReport),
    /// The stage is stopped; nothing ran.
    Stopped,
}

impl FrameOutcome {
    /// True for [`FrameOutcome::Stopped`].
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Scheduler statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Frames executed.
    pub total_frames: u64,
    /// Calls refused because the stage was stopped.
    pub stopped_calls: u64,
    /// Worst update + render time (microseconds).
    pub worst_frame_us: u32,
    /// Frames over budget.
    pub frames_over_budget: u32,
}

/// Drives a [`Stage`] from a [`DisplayClock`] into a [`Renderer`].
pub struct FrameScheduler<C: DisplayClock, R: Renderer> {
    timer: FrameTimer<C>,
    renderer: R,
    config: SchedulerConfig,
    stats: SchedulerStats,
}

impl<C: DisplayClock, R: Renderer> FrameScheduler<C, R> {
    /// Creates a scheduler; the clock's current reading is time zero.
    #[must_use]
    pub fn new(clock: C, renderer: R, config: SchedulerConfig) -> Self {
        Self {
            timer: FrameTimer::new(clock, config.max_step),
            renderer,
            config,
            stats: SchedulerStats::default(),
        }
    }

    /// Executes one frame of `stage`.
    pub fn frame<S: Stage + ?Sized>(&mut self, stage: &mut S) -> FrameOutcome {
        if stage.is_stopped() {
            self.stats.stopped_calls += 1;
            return FrameOutcome::Stopped;
        }

        let time = self.timer.tick();

        // === PHASE 1: Update ===
        let update_start = Instant::now();
        stage.update(&time);
        let update_us = update_start.elapsed().as_micros() as u32;

        // === PHASE 2: Render ===
        let render_start = Instant::now();
        stage.render(&mut self.renderer);
        self.renderer.present();
        let render_us = render_start.elapsed().as_micros() as u32;

        // === PHASE 3: Finalize ===
        let total_us = update_us.saturating_add(render_us);
        self.stats.total_frames += 1;
        self.stats.worst_frame_us = self.stats.worst_frame_us.max(total_us);
        let over_budget = u128::from(total_us) > self.config.frame_budget.as_micros();
        if over_budget {
            self.stats.frames_over_budget += 1;
            tracing::debug!(
                stage = stage.name(),
                frame = time.frame_number,
                total_us,
                "Frame over budget"
            );
        }
        if stage.is_stopped() {
            tracing::info!(stage = stage.name(), frame = time.frame_number, "Stage stopped");
        }

        FrameOutcome::Rendered(FrameReport {
            frame_number: time.frame_number,
            delta_seconds: time.delta_seconds,
            elapsed: time.elapsed,
            update_us,
            render_us,
            over_budget,
        })
    }

    /// Runs frames until the stage stops or `max_frames` ran. Returns the
    /// number of frames executed.
    pub fn run_until_stopped<S: Stage + ?Sized>(&mut self, stage: &mut S, max_frames: u64) -> u64 {
        let mut frames = 0;
        while frames < max_frames {
            match self.frame(stage) {
                FrameOutcome::Rendered(_) => frames += 1,
                FrameOutcome::Stopped => break,
            }
        }
        frames
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Running statistics.
    #[must_use]
    pub const fn stats(&self) -> SchedulerStats {
        self.stats
    }
}
