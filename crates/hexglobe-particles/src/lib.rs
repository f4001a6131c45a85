//! GPU-driven smoke particles.
//!
//! A fixed number of particle slots is allocated up front. Each pin that
//! smokes claims a run of consecutive slots, wrapping at capacity and
//! overwriting whatever was there. The shader derives every particle's
//! position and alpha from the elapsed time since the slot's start time, so
//! the host only writes slots and bumps a time uniform.

mod shader;
mod smoke;

pub use shader::{SMOKE_SHADER_SOURCE, SMOKE_SLOT_ATTRIBUTES, SMOKE_SLOT_LAYOUT};
pub use smoke::{
    PARTICLE_LIFETIME_MS, ParticleSample, SmokeHandle, SmokeOptions, SmokeProvider, SmokeSlot,
};
