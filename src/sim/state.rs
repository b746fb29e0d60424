//! Game state and celestial types
//!
//! All state that must survive a save/load roundtrip lives in `GameState`.
//! Transient per-tick artifacts (orbit occupancy, pending log lines) are
//! `serde(skip)` and rebuilt every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The eight planet slots, in their fixed formation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetId {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl PlanetId {
    /// Formation order; only the first unformed slot accepts progress
    pub const ORDER: [PlanetId; 8] = [
        PlanetId::Mercury,
        PlanetId::Venus,
        PlanetId::Earth,
        PlanetId::Mars,
        PlanetId::Jupiter,
        PlanetId::Saturn,
        PlanetId::Uranus,
        PlanetId::Neptune,
    ];

    pub fn index(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn name(self) -> &'static str {
        match self {
            PlanetId::Mercury => "Mercury",
            PlanetId::Venus => "Venus",
            PlanetId::Earth => "Earth",
            PlanetId::Mars => "Mars",
            PlanetId::Jupiter => "Jupiter",
            PlanetId::Saturn => "Saturn",
            PlanetId::Uranus => "Uranus",
            PlanetId::Neptune => "Neptune",
        }
    }

    /// Particles that must sit in the orbit band to form this planet
    pub fn required(self) -> u32 {
        match self {
            PlanetId::Mercury => 50,
            PlanetId::Venus => 80,
            PlanetId::Earth => 120,
            PlanetId::Mars => 160,
            PlanetId::Jupiter => 200,
            PlanetId::Saturn => 250,
            PlanetId::Uranus => 300,
            PlanetId::Neptune => 350,
        }
    }

    /// Designated orbit radius from the singularity
    pub fn orbit_radius(self) -> f32 {
        match self {
            PlanetId::Mercury => 60.0,
            PlanetId::Venus => 90.0,
            PlanetId::Earth => 120.0,
            PlanetId::Mars => 150.0,
            PlanetId::Jupiter => 200.0,
            PlanetId::Saturn => 250.0,
            PlanetId::Uranus => 300.0,
            PlanetId::Neptune => 350.0,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PlanetId::Mercury => "#a5a5a5",
            PlanetId::Venus => "#e6e6fa",
            PlanetId::Earth => "#6b93d6",
            PlanetId::Mars => "#c1440e",
            PlanetId::Jupiter => "#c9b59d",
            PlanetId::Saturn => "#e3d8b0",
            PlanetId::Uranus => "#c6e2ff",
            PlanetId::Neptune => "#5b5ddf",
        }
    }
}

/// Evolution stages of a celestial aggregate (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CelestialKind {
    Cluster,
    Protostar,
    Star,
    PlanetarySystem,
    Nebula,
    Galaxy,
    /// Created directly by upgrade purchase; never evolves
    BlackHole,
    /// Formed from an orbit reaching its threshold; never evolves
    Planet(PlanetId),
}

impl CelestialKind {
    pub fn label(self) -> &'static str {
        match self {
            CelestialKind::Cluster => "Cluster",
            CelestialKind::Protostar => "Protostar",
            CelestialKind::Star => "Main Sequence Star",
            CelestialKind::PlanetarySystem => "Planetary System",
            CelestialKind::Nebula => "Nebula",
            CelestialKind::Galaxy => "Galaxy",
            CelestialKind::BlackHole => "Supermassive Black Hole",
            CelestialKind::Planet(p) => p.name(),
        }
    }

    /// Mass at creation
    pub fn spawn_mass(self) -> f32 {
        match self {
            CelestialKind::Cluster => 8.0,
            CelestialKind::Protostar => 20.0,
            CelestialKind::Star => 50.0,
            CelestialKind::PlanetarySystem => 120.0,
            CelestialKind::Nebula => 300.0,
            CelestialKind::Galaxy => 1000.0,
            CelestialKind::BlackHole => 2000.0,
            CelestialKind::Planet(p) => match p {
                PlanetId::Mercury => 10.0,
                PlanetId::Venus => 15.0,
                PlanetId::Earth => 20.0,
                PlanetId::Mars => 25.0,
                PlanetId::Jupiter => 40.0,
                PlanetId::Saturn => 35.0,
                PlanetId::Uranus => 30.0,
                PlanetId::Neptune => 30.0,
            },
        }
    }

    /// Passive particles-per-second yield for this stage
    pub fn pps(self) -> f64 {
        match self {
            CelestialKind::Cluster => 0.0,
            CelestialKind::Protostar => 0.5,
            CelestialKind::Star => 2.0,
            CelestialKind::PlanetarySystem => 6.0,
            CelestialKind::Nebula => 10.0,
            CelestialKind::Galaxy => 40.0,
            CelestialKind::BlackHole => 0.0,
            CelestialKind::Planet(p) => match p {
                PlanetId::Mercury => 0.2,
                PlanetId::Venus => 0.3,
                PlanetId::Earth => 0.4,
                PlanetId::Mars => 0.5,
                PlanetId::Jupiter => 0.8,
                PlanetId::Saturn => 0.7,
                PlanetId::Uranus => 0.6,
                PlanetId::Neptune => 0.6,
            },
        }
    }

    /// Display radius keyed by stage, for the presenter
    pub fn display_radius(self) -> f32 {
        match self {
            CelestialKind::Cluster => 6.0,
            CelestialKind::Protostar => 8.0,
            CelestialKind::Star => 10.0,
            CelestialKind::PlanetarySystem => 12.0,
            CelestialKind::Nebula => 18.0,
            CelestialKind::Galaxy => 24.0,
            CelestialKind::BlackHole => 14.0,
            CelestialKind::Planet(p) => match p {
                PlanetId::Mercury => 4.0,
                PlanetId::Venus => 5.0,
                PlanetId::Earth => 6.0,
                PlanetId::Mars => 5.0,
                PlanetId::Jupiter => 10.0,
                PlanetId::Saturn => 9.0,
                PlanetId::Uranus => 8.0,
                PlanetId::Neptune => 8.0,
            },
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            CelestialKind::Cluster => "#7ad7ff",
            CelestialKind::Protostar => "#ffe6aa",
            CelestialKind::Star => "#fff0c8",
            CelestialKind::PlanetarySystem => "#c8f0ff",
            CelestialKind::Nebula => "#aa8cff",
            CelestialKind::Galaxy => "#d2c8ff",
            CelestialKind::BlackHole => "#14141e",
            CelestialKind::Planet(p) => p.color(),
        }
    }
}

/// A persistent, evolving aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelestialObject {
    pub id: u32,
    pub kind: CelestialKind,
    /// Fixed at creation
    pub pos: Vec2,
    /// Accumulated simulated seconds
    pub age: f64,
    /// Monotonically non-decreasing absent a full reset
    pub mass: f32,
    /// Passive yield; changes only on evolution
    pub pps: f64,
}

impl CelestialObject {
    pub fn new(id: u32, kind: CelestialKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            age: 0.0,
            mass: kind.spawn_mass(),
            pps: kind.pps(),
        }
    }
}

/// A leveled upgrade with geometric cost growth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeveledUpgrade {
    pub level: u32,
    pub base_cost: f64,
    pub growth: f64,
    /// Attraction contribution per level
    pub effect: f32,
}

impl LeveledUpgrade {
    pub fn new(base_cost: f64, growth: f64, effect: f32) -> Self {
        Self {
            level: 0,
            base_cost,
            growth,
            effect,
        }
    }

    /// Cost of the next level, floored like the storefront shows it
    pub fn cost(&self) -> f64 {
        (self.base_cost * self.growth.powi(self.level as i32)).floor()
    }
}

/// A one-time unlock upgrade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockUpgrade {
    pub unlocked: bool,
    pub cost: f64,
}

impl UnlockUpgrade {
    pub fn new(cost: f64) -> Self {
        Self {
            unlocked: false,
            cost,
        }
    }
}

/// All purchasable upgrades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upgrades {
    pub gravity: LeveledUpgrade,
    pub strong_gravity: LeveledUpgrade,
    pub star_formation: UnlockUpgrade,
    pub planetary_system: UnlockUpgrade,
    pub supermassive_bh: LeveledUpgrade,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            gravity: LeveledUpgrade::new(10.0, 1.25, 0.1),
            strong_gravity: LeveledUpgrade::new(50.0, 1.35, 0.3),
            star_formation: UnlockUpgrade::new(100.0),
            planetary_system: UnlockUpgrade::new(500.0),
            supermassive_bh: LeveledUpgrade::new(5000.0, 2.0, 3.0),
        }
    }
}

/// Time-limited mock monetization buffs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdBuffs {
    /// Production multiplier while the buff is live
    pub p_multi: f64,
    /// Wall-clock expiry in clock milliseconds
    pub expires_at: f64,
}

impl Default for AdBuffs {
    fn default() -> Self {
        Self {
            p_multi: 1.0,
            expires_at: 0.0,
        }
    }
}

/// Per-planet formation bookkeeping
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlanetSlot {
    pub formed: bool,
    /// Occupancy observed last tick, capped at `required`
    pub progress: u32,
}

/// A player-facing log line, drained by the engine into the event channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub important: bool,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            important: false,
        }
    }

    pub fn important(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            important: true,
        }
    }
}

/// The aggregate root; owned exclusively by the simulation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    /// Floating particle resource (not the live particle list)
    pub particles: f64,
    pub particles_per_click: f64,
    pub upgrades: Upgrades,
    pub celestials: Vec<CelestialObject>,
    pub universe_age: f64,
    pub total_clicks: u64,
    /// Prestige currency
    pub dark_matter: f64,
    /// One-shot bonus applied to the next prestige payout
    pub dm_bonus_next_prestige: f64,
    pub ad_buffs: AdBuffs,
    pub prestige_count: u32,
    /// Formation slots, indexed by `PlanetId::ORDER`
    pub planets: [PlanetSlot; 8],
    /// Spawn orbit for new particles (first unformed planet's radius + gap)
    pub current_orbit: f32,
    /// Next celestial id
    next_id: u32,
    /// Occupancy per orbit band, recomputed each tick
    #[serde(skip)]
    pub in_orbit: [u32; 8],
    /// Pending log lines, drained into the event channel
    #[serde(skip)]
    pub log: Vec<LogEntry>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            particles: 0.0,
            particles_per_click: 1.0,
            upgrades: Upgrades::default(),
            celestials: Vec::new(),
            universe_age: 0.0,
            total_clicks: 0,
            dark_matter: 0.0,
            dm_bonus_next_prestige: 0.0,
            ad_buffs: AdBuffs::default(),
            prestige_count: 0,
            planets: [PlanetSlot::default(); 8],
            current_orbit: FIRST_ORBIT,
            next_id: 1,
            in_orbit: [0; 8],
            log: Vec::new(),
        }
    }

    /// Allocate a new celestial id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Attraction strength derived from upgrade levels
    pub fn gravity_total(&self) -> f32 {
        let u = &self.upgrades;
        let floor = if u.supermassive_bh.level > 0 {
            GRAVITY_SMBH
        } else {
            GRAVITY_FLOOR
        };
        u.gravity.level as f32 * u.gravity.effect
            + u.strong_gravity.level as f32 * u.strong_gravity.effect
            + floor
    }

    /// Multiplier from ad buffs, if not expired at `now_ms`
    pub fn ad_multiplier(&self, now_ms: f64) -> f64 {
        if self.ad_buffs.expires_at > now_ms {
            self.ad_buffs.p_multi
        } else {
            1.0
        }
    }

    /// Base pps × dark-matter bonus × live ad buff
    pub fn effective_pps(&self, base: f64, now_ms: f64) -> f64 {
        base * (1.0 + self.dark_matter * DM_MULTIPLIER) * self.ad_multiplier(now_ms)
    }

    /// Sum of per-object passive yields
    pub fn base_pps(&self) -> f64 {
        self.celestials.iter().map(|o| o.pps).sum()
    }

    /// Sum of celestial masses
    pub fn total_mass(&self) -> f64 {
        self.celestials.iter().map(|o| o.mass as f64).sum()
    }

    /// Dark matter the next prestige would pay out
    pub fn prestige_gain(&self) -> f64 {
        let base = (self.total_mass() / 100.0).sqrt();
        (base * (1.0 + self.dm_bonus_next_prestige)).floor()
    }

    /// First unformed planet in formation order, if any
    pub fn active_planet(&self) -> Option<PlanetId> {
        PlanetId::ORDER
            .into_iter()
            .find(|p| !self.planets[p.index()].formed)
    }

    /// Create a celestial of `kind` at `pos` and log the formation
    pub fn add_celestial(&mut self, kind: CelestialKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let obj = CelestialObject::new(id, kind, pos);
        self.log.push(LogEntry::important(format!(
            "Formed {} ({} mass)",
            obj.kind.label(),
            obj.mass as i64
        )));
        self.celestials.push(obj);
        id
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_total_floor_and_levels() {
        let mut state = GameState::new(1);
        assert!((state.gravity_total() - 0.4).abs() < 1e-6);

        state.upgrades.gravity.level = 2;
        state.upgrades.strong_gravity.level = 1;
        // 2*0.1 + 1*0.3 + 0.4
        assert!((state.gravity_total() - 0.9).abs() < 1e-6);

        state.upgrades.supermassive_bh.level = 1;
        // floor switches from 0.4 to 1.5
        assert!((state.gravity_total() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_leveled_cost_growth() {
        let mut up = LeveledUpgrade::new(10.0, 1.25, 0.1);
        assert_eq!(up.cost(), 10.0);
        up.level = 1;
        assert_eq!(up.cost(), 12.0); // floor(12.5)
        up.level = 2;
        assert_eq!(up.cost(), 15.0); // floor(15.625)
    }

    #[test]
    fn test_ad_multiplier_expiry() {
        let mut state = GameState::new(1);
        state.ad_buffs.p_multi = 2.0;
        state.ad_buffs.expires_at = 1000.0;
        assert_eq!(state.ad_multiplier(500.0), 2.0);
        assert_eq!(state.ad_multiplier(1000.0), 1.0);
        assert_eq!(state.ad_multiplier(2000.0), 1.0);
    }

    #[test]
    fn test_active_planet_order() {
        let mut state = GameState::new(1);
        assert_eq!(state.active_planet(), Some(PlanetId::Mercury));
        state.planets[PlanetId::Mercury.index()].formed = true;
        assert_eq!(state.active_planet(), Some(PlanetId::Venus));
    }

    #[test]
    fn test_prestige_gain_rounds_down() {
        let mut state = GameState::new(1);
        state
            .celestials
            .push(CelestialObject::new(1, CelestialKind::Galaxy, Vec2::ZERO));
        // mass 1000 -> sqrt(10) = 3.16.. -> 3
        assert_eq!(state.prestige_gain(), 3.0);
        state.dm_bonus_next_prestige = 0.25;
        // 3.16.. * 1.25 = 3.95.. -> 3
        assert_eq!(state.prestige_gain(), 3.0);
    }
}
