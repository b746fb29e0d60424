//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must stay pure:
//! - Fixed, clamped timesteps only
//! - Seeded RNG only
//! - Clock readings passed in, never sampled
//! - No channel, storage, or rendering dependencies

pub mod commands;
pub mod particle;
pub mod state;
pub mod tick;

pub use particle::{Particle, ParticleArena, ParticleKind};
pub use state::{
    AdBuffs, CelestialKind, CelestialObject, GameState, LogEntry, PlanetId, PlanetSlot, Upgrades,
};
pub use tick::{evolve, step};
