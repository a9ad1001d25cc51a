//! Particle effects: cloud text and burner flames.
//!
//! Both write into fixed-length instance buffers; a particle that is not
//! visible is a zero-scale matrix, so instance indices never shift within a
//! frame.

mod cloud_particles;
mod color;
mod flame;

pub use cloud_particles::{
    ParticlePhase, ParticlePool, TextParticle, TextParticleConfig, NOMINAL_FRAME_SECONDS,
};
pub use color::hsl_to_rgb;
pub use flame::{FlameConfig, FlameEmitter, FlameParticle, FlameStats};
