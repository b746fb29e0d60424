//! Message contract between the simulation and presentation contexts
//!
//! Commands flow presentation -> engine, events flow engine -> presentation.
//! Both directions are fire-and-forget with copy semantics: no payload keeps
//! a handle into engine-owned state, and a command's failure is only ever
//! reported as a log event.

use glam::Vec2;
use crate::config::SimConfig;
use crate::sim::particle::{ParticleArena, ParticleKind};
use crate::sim::state::{CelestialKind, GameState, PlanetId};

/// Purchasable upgrade identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKey {
    Gravity,
    StrongGravity,
    StarFormation,
    PlanetarySystem,
    SupermassiveBh,
}

/// Mock rewarded-ad identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdKind {
    DoubleProduction,
    InstantFormation,
    BonusDarkMatter,
}

/// Discrete player intents, applied in send order
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init { width: f32, height: f32 },
    Start { width: f32, height: f32, time_scale: f64 },
    Resize { width: f32, height: f32 },
    SetTimeScale { value: f64 },
    Click,
    Buy { key: UpgradeKey },
    Ad { kind: AdKind },
    Save,
    LoadData { blob: String },
    Wipe,
    Prestige,
    Shutdown,
}

/// Engine-to-presentation notifications
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Periodic full-state projection; replaces the previous one entirely
    State(Snapshot),
    /// Player-facing log line
    Log { message: String, important: bool },
    /// Periodic background save
    Autosave { blob: String },
    /// Explicit save requested by the player
    File { name: String, blob: String },
}

/// Down-projected particle: position, velocity, type. Never trail history,
/// never slot identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
}

/// Full celestial projection with derived display attributes
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialView {
    pub id: u32,
    pub kind: CelestialKind,
    pub label: &'static str,
    pub pos: Vec2,
    pub mass: f32,
    pub pps: f64,
    pub display_radius: f32,
    pub color: &'static str,
}

/// Per-planet formation progress for the progress panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetProgress {
    pub planet: PlanetId,
    pub formed: bool,
    pub in_orbit: u32,
    pub required: u32,
    pub orbit_radius: f32,
}

/// Bounded, immutable projection of engine state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub particle_count: f64,
    pub particles_per_click: f64,
    /// Effective production rate at snapshot time
    pub production_rate: f64,
    pub base_pps: f64,
    pub dark_matter: f64,
    pub universe_age: f64,
    pub total_clicks: u64,
    pub prestige_count: u32,
    pub prestige_gain: f64,
    pub total_mass: f64,
    pub live_particles: usize,
    pub gravity_level: u32,
    pub strong_gravity_level: u32,
    pub star_formation_unlocked: bool,
    pub planetary_system_unlocked: bool,
    pub current_orbit: f32,
    pub celestials: Vec<CelestialView>,
    pub particle_sample: Vec<ParticleView>,
    pub planets: Vec<PlanetProgress>,
}

impl Snapshot {
    /// Project full engine state into a bounded view payload
    pub fn capture(
        state: &GameState,
        arena: &ParticleArena,
        cfg: &SimConfig,
        now_ms: f64,
    ) -> Self {
        let base_pps = state.base_pps();
        Self {
            particle_count: state.particles,
            particles_per_click: state.particles_per_click,
            production_rate: state.effective_pps(base_pps, now_ms),
            base_pps,
            dark_matter: state.dark_matter,
            universe_age: state.universe_age,
            total_clicks: state.total_clicks,
            prestige_count: state.prestige_count,
            prestige_gain: state.prestige_gain(),
            total_mass: state.total_mass(),
            live_particles: arena.len(),
            gravity_level: state.upgrades.gravity.level,
            strong_gravity_level: state.upgrades.strong_gravity.level,
            star_formation_unlocked: state.upgrades.star_formation.unlocked,
            planetary_system_unlocked: state.upgrades.planetary_system.unlocked,
            current_orbit: state.current_orbit,
            celestials: state
                .celestials
                .iter()
                .map(|o| CelestialView {
                    id: o.id,
                    kind: o.kind,
                    label: o.kind.label(),
                    pos: o.pos,
                    mass: o.mass,
                    pps: o.pps,
                    display_radius: o.kind.display_radius(),
                    color: o.kind.color(),
                })
                .collect(),
            particle_sample: sample_particles(arena, cfg.particle_sample_max),
            planets: PlanetId::ORDER
                .into_iter()
                .map(|p| PlanetProgress {
                    planet: p,
                    formed: state.planets[p.index()].formed,
                    in_orbit: state.in_orbit[p.index()],
                    required: p.required(),
                    orbit_radius: p.orbit_radius(),
                })
                .collect(),
        }
    }

    /// Formed-planet count for the stats panel
    pub fn planets_formed(&self) -> usize {
        self.planets.iter().filter(|p| p.formed).count()
    }
}

/// Deterministic stride sample of the live population, at most `max` entries
pub fn sample_particles(arena: &ParticleArena, max: usize) -> Vec<ParticleView> {
    let live = arena.len();
    if live == 0 || max == 0 {
        return Vec::new();
    }
    let stride = live.div_ceil(max);
    arena
        .iter()
        .enumerate()
        .filter(|(i, _)| i % stride == 0)
        .map(|(_, (_, p))| ParticleView {
            pos: p.pos,
            vel: p.vel,
            kind: p.kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_arena(n: usize) -> ParticleArena {
        let mut arena = ParticleArena::new(n.max(1));
        for i in 0..n {
            arena.spawn(
                Vec2::new(i as f32, 0.0),
                Vec2::ZERO,
                ParticleKind::Basic,
                None,
                0.0,
            );
        }
        arena
    }

    #[test]
    fn test_sample_bounded_and_deterministic() {
        let arena = filled_arena(100);
        let a = sample_particles(&arena, 30);
        let b = sample_particles(&arena, 30);
        assert!(a.len() <= 30);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_carries_everything_when_small() {
        let arena = filled_arena(5);
        assert_eq!(sample_particles(&arena, 800).len(), 5);
    }

    #[test]
    fn test_sample_empty_population() {
        let arena = ParticleArena::new(8);
        assert!(sample_particles(&arena, 800).is_empty());
    }

    #[test]
    fn test_capture_projects_scalars() {
        let mut state = GameState::new(3);
        state.particles = 42.5;
        state.dark_matter = 10.0;
        state.add_celestial(CelestialKind::Star, Vec2::new(1.0, 2.0));
        let arena = filled_arena(10);

        let snap = Snapshot::capture(&state, &arena, &SimConfig::default(), 0.0);
        assert_eq!(snap.particle_count, 42.5);
        assert_eq!(snap.live_particles, 10);
        assert_eq!(snap.base_pps, 2.0);
        // 2 pps * (1 + 10 * 0.01)
        assert!((snap.production_rate - 2.2).abs() < 1e-9);
        assert_eq!(snap.celestials.len(), 1);
        assert_eq!(snap.celestials[0].display_radius, 10.0);
        assert_eq!(snap.planets.len(), 8);
        assert_eq!(snap.planets_formed(), 0);
    }
}
