//! Discrete player commands
//!
//! Pure state mutators invoked by the engine's command handler. None of them
//! return errors: an unaffordable purchase or an inapplicable ad is a no-op
//! with a logged notice, observed by the player through the event channel.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::Bounds;
use crate::consts::*;
use crate::polar_to_cartesian;
use crate::protocol::{AdKind, UpgradeKey};

use super::particle::{ParticleArena, ParticleKind};
use super::state::{CelestialKind, GameState, LogEntry};

/// Scatter `count` particles around `orbit` and set it as their target
pub fn spawn_orbit_particles(
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    count: u32,
    center: Vec2,
    orbit: f32,
    scatter: f32,
) {
    for _ in 0..count {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let distance = orbit + rng.random_range(-scatter..scatter);
        let pos = center + polar_to_cartesian(distance, angle);
        let vel = Vec2::new(
            rng.random_range(-0.2..0.2),
            rng.random_range(-0.2..0.2),
        );
        // Past the cap the spawn is dropped silently
        if arena
            .spawn(pos, vel, ParticleKind::Basic, Some(orbit), angle)
            .is_none()
        {
            break;
        }
    }
}

/// Flair particles near the singularity on a fresh universe
pub fn spawn_center_particles(
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    count: u32,
    center: Vec2,
    orbit: f32,
) {
    for _ in 0..count {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let r = rng.random_range(0.0..20.0);
        let pos = center + polar_to_cartesian(r, angle);
        let vel = Vec2::new(
            rng.random_range(-0.2..0.2),
            rng.random_range(-0.2..0.2),
        );
        if arena
            .spawn(pos, vel, ParticleKind::Basic, Some(orbit), angle)
            .is_none()
        {
            break;
        }
    }
}

/// Mash the singularity: grants particles and seeds the current orbit
pub fn click(
    state: &mut GameState,
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    bounds: Bounds,
    now_ms: f64,
) {
    state.total_clicks += 1;
    let gain = state.particles_per_click
        * (1.0 + state.dark_matter * DM_MULTIPLIER)
        * state.ad_multiplier(now_ms);
    state.particles += gain;

    let count = (gain.ceil() as u32).min(CLICK_SPAWN_MAX);
    spawn_orbit_particles(
        arena,
        rng,
        count,
        bounds.center(),
        state.current_orbit,
        10.0,
    );
}

/// Purchase an upgrade; unaffordable or already-owned purchases log and do nothing
pub fn buy(state: &mut GameState, key: UpgradeKey, bounds: Bounds) {
    let (name, cost) = match key {
        UpgradeKey::Gravity => ("Basic Gravity", state.upgrades.gravity.cost()),
        UpgradeKey::StrongGravity => ("Strong Gravity", state.upgrades.strong_gravity.cost()),
        UpgradeKey::StarFormation => ("Star Formation", state.upgrades.star_formation.cost),
        UpgradeKey::PlanetarySystem => {
            ("Planetary Formation", state.upgrades.planetary_system.cost)
        }
        UpgradeKey::SupermassiveBh => (
            "Supermassive Black Hole",
            state.upgrades.supermassive_bh.cost(),
        ),
    };

    let already_owned = match key {
        UpgradeKey::StarFormation => state.upgrades.star_formation.unlocked,
        UpgradeKey::PlanetarySystem => state.upgrades.planetary_system.unlocked,
        _ => false,
    };
    if already_owned {
        state
            .log
            .push(LogEntry::new(format!("{name} is already unlocked.")));
        return;
    }
    if state.particles < cost {
        state
            .log
            .push(LogEntry::new(format!("Not enough particles for {name}.")));
        return;
    }

    state.particles -= cost;
    match key {
        UpgradeKey::Gravity => state.upgrades.gravity.level += 1,
        UpgradeKey::StrongGravity => state.upgrades.strong_gravity.level += 1,
        UpgradeKey::StarFormation => state.upgrades.star_formation.unlocked = true,
        UpgradeKey::PlanetarySystem => state.upgrades.planetary_system.unlocked = true,
        UpgradeKey::SupermassiveBh => {
            state.upgrades.supermassive_bh.level += 1;
            create_black_hole(state, bounds.center());
        }
    }
    state.log.push(LogEntry::new(format!(
        "Purchased {name} for {} particles.",
        cost as i64
    )));
}

/// Place a supermassive black hole at the singularity; mass scales with level
fn create_black_hole(state: &mut GameState, center: Vec2) {
    let level = state.upgrades.supermassive_bh.level;
    state.add_celestial(CelestialKind::BlackHole, center);
    if let Some(obj) = state.celestials.last_mut() {
        obj.mass = 2000.0 + level as f32 * 500.0;
    }
}

/// Mock rewarded-ad hooks
pub fn watch_ad(
    state: &mut GameState,
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    kind: AdKind,
    bounds: Bounds,
    now_ms: f64,
) {
    match kind {
        AdKind::DoubleProduction => {
            state.ad_buffs.p_multi = AD_DOUBLE_MULTI;
            state.ad_buffs.expires_at = now_ms + AD_DOUBLE_MS;
            state
                .log
                .push(LogEntry::new("Rewarded Ad: 2x particles for 4 hours applied."));
        }
        AdKind::InstantFormation => instant_formation(state, arena, rng, bounds),
        AdKind::BonusDarkMatter => {
            // Idempotent: re-triggering never stacks past the maximum
            state.dm_bonus_next_prestige = state.dm_bonus_next_prestige.max(AD_DM_BONUS);
            state.log.push(LogEntry::new(
                "Rewarded Ad: +25% Dark Matter on next Prestige.",
            ));
        }
    }
}

/// Inject exactly the particles missing from the nearest near-threshold planet
fn instant_formation(
    state: &mut GameState,
    arena: &mut ParticleArena,
    rng: &mut Pcg32,
    bounds: Bounds,
) {
    use super::state::PlanetId;

    for planet in PlanetId::ORDER {
        let slot = state.planets[planet.index()];
        if slot.formed {
            continue;
        }
        let required = planet.required();
        if (slot.progress as f64) < required as f64 * AD_INSTANT_FLOOR {
            break;
        }
        let needed = required - slot.progress;
        spawn_orbit_particles(
            arena,
            rng,
            needed,
            bounds.center(),
            planet.orbit_radius(),
            5.0,
        );
        state.log.push(LogEntry::new(format!(
            "Rewarded Ad: Added particles to complete {}.",
            planet.name()
        )));
        return;
    }
    state
        .log
        .push(LogEntry::new("No planet near formation threshold."));
}

/// Big Crunch: convert accumulated mass into dark matter and reset the run
pub fn prestige(state: &mut GameState, arena: &mut ParticleArena) {
    let gain = state.prestige_gain();
    let dark_matter = state.dark_matter + gain;
    let prestige_count = state.prestige_count + 1;
    let seed = state.seed;

    *state = GameState::new(seed);
    state.dark_matter = dark_matter;
    state.prestige_count = prestige_count;
    arena.clear();

    state.log.push(LogEntry::important(format!(
        "Big Crunch! Gained {} Dark Matter.",
        gain as i64
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{CelestialObject, PlanetId};
    use rand::SeedableRng;

    fn fixture() -> (GameState, ParticleArena, Pcg32, Bounds) {
        (
            GameState::new(7),
            ParticleArena::new(MAX_PARTICLES),
            Pcg32::seed_from_u64(7),
            Bounds::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_ten_clicks_grant_ten_particles() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        for _ in 0..10 {
            click(&mut state, &mut arena, &mut rng, bounds, 0.0);
        }
        assert!((state.particles - 10.0).abs() < 1e-9);
        assert_eq!(state.total_clicks, 10);
        // Each 1-particle click spawns one live particle
        assert_eq!(arena.len(), 10);
    }

    #[test]
    fn test_click_spawn_is_bounded() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        state.particles_per_click = 1000.0;
        click(&mut state, &mut arena, &mut rng, bounds, 0.0);
        assert_eq!(arena.len(), CLICK_SPAWN_MAX as usize);
    }

    #[test]
    fn test_click_respects_dark_matter_and_ad_buff() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        state.dark_matter = 100.0; // +100%
        state.ad_buffs.p_multi = 2.0;
        state.ad_buffs.expires_at = 10_000.0;
        click(&mut state, &mut arena, &mut rng, bounds, 0.0);
        // 1 * (1 + 1.0) * 2
        assert!((state.particles - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_buy_gravity_then_reject_when_broke() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        let _ = (&mut arena, &mut rng);
        state.particles = 10.0;

        buy(&mut state, UpgradeKey::Gravity, bounds);
        assert_eq!(state.particles, 0.0);
        assert_eq!(state.upgrades.gravity.level, 1);

        buy(&mut state, UpgradeKey::Gravity, bounds);
        assert_eq!(state.particles, 0.0);
        assert_eq!(state.upgrades.gravity.level, 1);
        assert!(
            state
                .log
                .iter()
                .any(|l| l.message.contains("Not enough particles"))
        );
    }

    #[test]
    fn test_buy_black_hole_creates_object() {
        let (mut state, _arena, _rng, bounds) = fixture();
        state.particles = 5000.0;
        buy(&mut state, UpgradeKey::SupermassiveBh, bounds);
        assert_eq!(state.upgrades.supermassive_bh.level, 1);
        assert_eq!(state.celestials.len(), 1);
        let obj = &state.celestials[0];
        assert_eq!(obj.kind, CelestialKind::BlackHole);
        assert_eq!(obj.mass, 2500.0);
        assert_eq!(obj.pos, bounds.center());
    }

    #[test]
    fn test_unlock_purchase_is_one_time() {
        let (mut state, _arena, _rng, bounds) = fixture();
        state.particles = 1000.0;
        buy(&mut state, UpgradeKey::PlanetarySystem, bounds);
        assert!(state.upgrades.planetary_system.unlocked);
        assert_eq!(state.particles, 500.0);
        buy(&mut state, UpgradeKey::PlanetarySystem, bounds);
        // No double charge
        assert_eq!(state.particles, 500.0);
    }

    #[test]
    fn test_ad_double_sets_four_hour_expiry() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        watch_ad(
            &mut state,
            &mut arena,
            &mut rng,
            AdKind::DoubleProduction,
            bounds,
            1000.0,
        );
        assert_eq!(state.ad_buffs.p_multi, 2.0);
        assert_eq!(state.ad_buffs.expires_at, 1000.0 + AD_DOUBLE_MS);
        // Production uses the buff before expiry, not after
        assert_eq!(state.effective_pps(10.0, 2000.0), 20.0);
        assert_eq!(state.effective_pps(10.0, 1000.0 + AD_DOUBLE_MS + 1.0), 10.0);
    }

    #[test]
    fn test_ad_dark_matter_bonus_is_idempotent() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        watch_ad(
            &mut state,
            &mut arena,
            &mut rng,
            AdKind::BonusDarkMatter,
            bounds,
            0.0,
        );
        assert_eq!(state.dm_bonus_next_prestige, AD_DM_BONUS);
        watch_ad(
            &mut state,
            &mut arena,
            &mut rng,
            AdKind::BonusDarkMatter,
            bounds,
            0.0,
        );
        assert_eq!(state.dm_bonus_next_prestige, AD_DM_BONUS);
    }

    #[test]
    fn test_ad_instant_injects_exact_remainder() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        let required = PlanetId::Mercury.required();
        state.planets[PlanetId::Mercury.index()].progress = required - 10;
        watch_ad(
            &mut state,
            &mut arena,
            &mut rng,
            AdKind::InstantFormation,
            bounds,
            0.0,
        );
        assert_eq!(arena.len(), 10);
    }

    #[test]
    fn test_ad_instant_needs_near_threshold_progress() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        state.planets[PlanetId::Mercury.index()].progress = 1;
        watch_ad(
            &mut state,
            &mut arena,
            &mut rng,
            AdKind::InstantFormation,
            bounds,
            0.0,
        );
        assert_eq!(arena.len(), 0);
        assert!(
            state
                .log
                .iter()
                .any(|l| l.message.contains("No planet near formation threshold"))
        );
    }

    #[test]
    fn test_prestige_pays_once_then_zero() {
        let (mut state, mut arena, mut rng, bounds) = fixture();
        let _ = (&mut rng, bounds);
        let id = state.next_entity_id();
        let mut obj = CelestialObject::new(id, CelestialKind::Galaxy, Vec2::ZERO);
        obj.mass = 10_000.0;
        state.celestials.push(obj);
        state.upgrades.gravity.level = 5;
        arena
            .spawn(Vec2::ZERO, Vec2::ZERO, ParticleKind::Basic, None, 0.0)
            .unwrap();

        prestige(&mut state, &mut arena);
        // sqrt(10000/100) = 10
        assert_eq!(state.dark_matter, 10.0);
        assert_eq!(state.prestige_count, 1);
        assert!(state.celestials.is_empty());
        assert_eq!(state.upgrades.gravity.level, 0);
        assert_eq!(arena.len(), 0);

        // A second crunch on the reset universe yields nothing more
        prestige(&mut state, &mut arena);
        assert_eq!(state.dark_matter, 10.0);
        assert_eq!(state.prestige_count, 2);
    }

    #[test]
    fn test_prestige_consumes_dm_bonus() {
        let (mut state, mut arena, _rng, _bounds) = fixture();
        let mut obj = CelestialObject::new(1, CelestialKind::Galaxy, Vec2::ZERO);
        obj.mass = 10_000.0;
        state.celestials.push(obj);
        state.dm_bonus_next_prestige = 0.25;

        prestige(&mut state, &mut arena);
        // floor(10 * 1.25)
        assert_eq!(state.dark_matter, 12.0);
        assert_eq!(state.dm_bonus_next_prestige, 0.0);
    }
}
