//! Shared simulation configuration
//!
//! Both execution contexts (engine and presenter) are constructed from the
//! same `SimConfig`, so thresholds and cadences are never duplicated as
//! ambient constants on two sides of the channel.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunables shared between the simulation and presentation contexts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Live-particle cap; spawns beyond it are dropped
    pub max_particles: usize,
    /// Radial band counted as "in orbit" for planet formation
    pub orbit_tolerance: f32,
    /// Wall-clock interval between snapshots to the presenter (ms)
    pub snapshot_interval_ms: f64,
    /// Wall-clock interval between autosaves (ms)
    pub autosave_interval_ms: f64,
    /// Engine loop sleep between ticks (ms)
    pub tick_interval_ms: u64,
    /// Clamp on a single integration step (seconds)
    pub max_dt: f64,
    /// Upper bound on particles carried per snapshot
    pub particle_sample_max: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            orbit_tolerance: ORBIT_TOLERANCE,
            snapshot_interval_ms: SNAPSHOT_MS,
            autosave_interval_ms: AUTOSAVE_MS,
            tick_interval_ms: TICK_MS,
            max_dt: MAX_DT,
            particle_sample_max: PARTICLE_SAMPLE_MAX,
        }
    }
}

/// Simulation coordinate bounds; the singularity sits at the center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Origin of attraction and spawn geometry
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
