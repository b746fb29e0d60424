//! Cosmic Crunch - an incremental universe-formation clicker
//!
//! Core modules:
//! - `sim`: Deterministic simulation (particle physics, formation, game state)
//! - `engine`: Simulation loop thread, command handling, snapshot emission
//! - `protocol`: Message contract between simulation and presentation
//! - `presenter`: Snapshot mirror and command forwarding
//! - `platform`: Clock and local key-value storage abstractions
//! - `persistence`: Opaque save-blob encode/decode

pub mod config;
pub mod engine;
pub mod persistence;
pub mod platform;
pub mod presenter;
pub mod protocol;
pub mod sim;

pub use config::{Bounds, SimConfig};
pub use engine::{EngineHandle, SimulationEngine};
pub use presenter::PresentationAdapter;
pub use protocol::{AdKind, Command, Event, Snapshot, UpgradeKey};

use glam::Vec2;

/// Game balance and physics constants
pub mod consts {
    /// Hard cap on live particles; spawns beyond this are dropped
    pub const MAX_PARTICLES: usize = 3000;
    /// Positions kept per particle trail (render-only)
    pub const TRAIL_LENGTH: usize = 6;

    /// Maximum integration step in seconds (stall protection)
    pub const MAX_DT: f64 = 0.05;
    /// Velocity damping applied each tick
    pub const DAMPING: f32 = 0.995;
    /// Position integration scale (the sim was tuned at 60 fps)
    pub const POSITION_SCALE: f32 = 60.0;

    /// Softening term for the center attraction denominator
    pub const CENTER_SOFTENING: f32 = 50.0;
    /// Softening term for celestial-body attraction
    pub const BODY_SOFTENING: f32 = 100.0;
    /// Mass coupling for celestial-body attraction
    pub const BODY_PULL: f32 = 0.02;

    /// Radial tolerance before orbit-seeking kicks in
    pub const ORBIT_SLACK: f32 = 5.0;
    /// Radial correction acceleration toward the target orbit
    pub const ORBIT_SEEK: f32 = 0.1;
    /// Tangential speed factor sustaining circular motion
    pub const ORBIT_SPEED: f32 = 0.3;
    /// Band around a planet's orbit radius that counts as "in orbit"
    pub const ORBIT_TOLERANCE: f32 = 15.0;
    /// Gap added past a formed planet's orbit for the next spawn orbit
    pub const NEXT_ORBIT_GAP: f32 = 30.0;
    /// Starting spawn orbit (Mercury's)
    pub const FIRST_ORBIT: f32 = 60.0;

    /// Baseline attraction without a supermassive black hole
    pub const GRAVITY_FLOOR: f32 = 0.4;
    /// Attraction floor once a supermassive black hole exists
    pub const GRAVITY_SMBH: f32 = 1.5;

    /// Celestial mass growth per second, flat term
    pub const MASS_GROWTH_BASE: f32 = 0.2;
    /// Celestial mass growth per second, per point of gravity total
    pub const MASS_GROWTH_GRAVITY: f32 = 0.1;

    /// Production/click multiplier per point of dark matter
    pub const DM_MULTIPLIER: f64 = 0.01;
    /// Most particles spawned by a single click
    pub const CLICK_SPAWN_MAX: u32 = 20;
    /// Flair particles spawned on a fresh universe
    pub const INIT_SPAWN: u32 = 30;

    /// Rewarded-ad production multiplier
    pub const AD_DOUBLE_MULTI: f64 = 2.0;
    /// Rewarded-ad buff duration (4 hours, wall clock)
    pub const AD_DOUBLE_MS: f64 = 4.0 * 60.0 * 60.0 * 1000.0;
    /// Fraction of `required` a planet must reach before an instant-formation ad applies
    pub const AD_INSTANT_FLOOR: f64 = 0.7;
    /// Dark-matter bonus granted for the next prestige by the DM ad
    pub const AD_DM_BONUS: f64 = 0.25;

    /// Snapshot cadence toward the presentation layer (wall clock)
    pub const SNAPSHOT_MS: f64 = 200.0;
    /// Autosave cadence (wall clock)
    pub const AUTOSAVE_MS: f64 = 30_000.0;
    /// Engine loop sleep between ticks
    pub const TICK_MS: u64 = 16;
    /// Upper bound on particles carried in one snapshot
    pub const PARTICLE_SAMPLE_MAX: usize = 800;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
