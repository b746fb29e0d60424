//! Fixed-interval simulation step
//!
//! Advances the universe deterministically: celestial aging and evolution,
//! passive production, particle physics integration, and orbit-threshold
//! planet formation. Must stay free of platform dependencies; the clock
//! reading is passed in.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::{Bounds, SimConfig};
use crate::consts::*;
use crate::polar_to_cartesian;

use super::particle::ParticleArena;
use super::state::{CelestialKind, CelestialObject, GameState, LogEntry};

/// Advance the game state by `dt` simulated seconds.
///
/// `now_ms` is the wall-clock reading used for ad-buff expiry only; the
/// simulation itself works off `dt`.
pub fn step(
    state: &mut GameState,
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    cfg: &SimConfig,
    bounds: Bounds,
    now_ms: f64,
    dt: f64,
) {
    state.universe_age += dt;

    // Celestial aging, mass accretion, and evolution
    let gravity = state.gravity_total();
    let growth = dt * (MASS_GROWTH_BASE + gravity * MASS_GROWTH_GRAVITY) as f64;
    let planetary_unlocked = state.upgrades.planetary_system.unlocked;
    let mut base_pps = 0.0;
    let mut log = std::mem::take(&mut state.log);
    for obj in &mut state.celestials {
        obj.age += dt;
        obj.mass += growth as f32;
        evolve(obj, planetary_unlocked, &mut log);
        base_pps += obj.pps;
    }
    state.log = log;

    // Passive production
    let gain = state.effective_pps(base_pps, now_ms) * dt;
    state.particles += gain;

    integrate_particles(state, arena, bounds.center(), dt as f32);
    update_planet_formation(state, arena, rng, cfg, bounds.center());
}

/// Single-step evolution state machine; at most one transition per call
pub fn evolve(obj: &mut CelestialObject, planetary_unlocked: bool, log: &mut Vec<LogEntry>) {
    let next = match obj.kind {
        CelestialKind::Cluster if obj.mass >= 20.0 => Some((
            CelestialKind::Protostar,
            "A cluster ignited into a Protostar.",
        )),
        CelestialKind::Protostar if obj.mass >= 50.0 => Some((
            CelestialKind::Star,
            "Protostar stabilized as a Main Sequence Star.",
        )),
        CelestialKind::Star if obj.mass >= 120.0 && planetary_unlocked => Some((
            CelestialKind::PlanetarySystem,
            "Planets formed around a star -> Planetary System.",
        )),
        CelestialKind::PlanetarySystem if obj.mass >= 300.0 => {
            Some((CelestialKind::Nebula, "Multiple systems birthed a Nebula."))
        }
        CelestialKind::Nebula if obj.mass >= 1000.0 => Some((
            CelestialKind::Galaxy,
            "Spiral arms coalesced into a Galaxy!",
        )),
        // Terminal or below threshold: Cluster..Nebula waiting on mass,
        // Star without the unlock, Galaxy, BlackHole, Planet(_)
        _ => None,
    };
    if let Some((kind, message)) = next {
        obj.kind = kind;
        obj.pps = kind.pps();
        log.push(LogEntry::new(message));
    }
}

/// Per-particle force accumulation and integration
fn integrate_particles(state: &mut GameState, arena: &mut ParticleArena, center: Vec2, dt: f32) {
    let gravity = state.gravity_total();
    for (_, p) in arena.iter_mut() {
        p.acc = Vec2::ZERO;

        // Orbit-seeking plus tangential impulse toward circular motion
        if let Some(target) = p.orbit_target {
            let to_center = center - p.pos;
            let distance = to_center.length().max(1e-3);
            if (distance - target).abs() > ORBIT_SLACK {
                let direction = if distance > target { -1.0 } else { 1.0 };
                p.acc += to_center / distance * direction * ORBIT_SEEK;
            }
            let tangent = Vec2::new(-to_center.y, to_center.x) / distance;
            let orbital_speed = ORBIT_SPEED * (gravity * 50.0 / target).sqrt();
            p.vel += tangent * orbital_speed * dt;
            p.angle += orbital_speed * dt * 0.5;
        }

        // Inverse-square-ish pull toward the singularity
        let to_center = center - p.pos;
        let d2 = to_center.length_squared();
        p.acc += to_center * (gravity / (d2 + CENTER_SOFTENING));

        // ... and toward every celestial body
        for obj in &state.celestials {
            let delta = obj.pos - p.pos;
            let dd2 = delta.length_squared();
            p.acc += delta * (gravity * obj.mass * BODY_PULL / (dd2 + BODY_SOFTENING));
        }

        p.vel = (p.vel + p.acc * dt) * DAMPING;
        p.pos += p.vel * dt * POSITION_SCALE;
        p.record_trail();
    }
}

/// Orbit-threshold planet formation.
///
/// Planets form strictly in order; only the first unformed slot accumulates
/// progress. When its orbit band holds `required` particles, exactly that
/// many (the nearest to the orbit radius) are consumed and the planet is
/// placed at a random angle on the orbit.
fn update_planet_formation(
    state: &mut GameState,
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    cfg: &SimConfig,
    center: Vec2,
) {
    use super::state::PlanetId;

    // Recount orbit occupancy from scratch; a particle credits the first
    // band it falls into
    state.in_orbit = [0; 8];
    for (_, p) in arena.iter() {
        if p.orbit_target.is_none() {
            continue;
        }
        let distance = (center - p.pos).length();
        for planet in PlanetId::ORDER {
            if (distance - planet.orbit_radius()).abs() < cfg.orbit_tolerance {
                state.in_orbit[planet.index()] += 1;
                break;
            }
        }
    }

    let Some(planet) = state.active_planet() else {
        return;
    };
    let slot_idx = planet.index();
    let occupants = state.in_orbit[slot_idx];
    let required = planet.required();
    state.planets[slot_idx].progress = occupants.min(required);

    if occupants < required {
        return;
    }

    state.planets[slot_idx].formed = true;
    state.current_orbit = planet.orbit_radius() + NEXT_ORBIT_GAP;

    // Consume exactly `required` particles, nearest the orbit first
    let radius = planet.orbit_radius();
    let mut candidates: Vec<(u32, f32)> = arena
        .iter()
        .filter_map(|(idx, p)| {
            let err = ((center - p.pos).length() - radius).abs();
            (err < cfg.orbit_tolerance).then_some((idx, err))
        })
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    for &(idx, _) in candidates.iter().take(required as usize) {
        arena.release(idx);
    }

    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let pos = center + polar_to_cartesian(radius, angle);
    state.add_celestial(CelestialKind::Planet(planet), pos);
    state.log.push(LogEntry::important(format!(
        "{} has formed from {} particles!",
        planet.name(),
        required
    )));
}
