//! Particles and their fixed-capacity arena
//!
//! Particles are transient: spawned from clicks and ad injections, released
//! when a planet forms out of them. Slots are recycled through a free list so
//! release is O(1) and the population can never exceed the cap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TRAIL_LENGTH;

/// Particle flavor; `Dark` is reserved and never spawned by current rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleKind {
    #[default]
    Basic,
    Stellar,
    Dark,
}

/// A transient point mass orbiting the singularity
#[derive(Debug, Clone, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub kind: ParticleKind,
    /// Target orbit radius; orbit-seeking applies while set
    pub orbit_target: Option<f32>,
    /// Angular position along the orbit, advanced each tick
    pub angle: f32,
    /// Last positions, most-recent-last (render-only)
    pub trail: Vec<Vec2>,
}

impl Particle {
    /// Append the current position, dropping the oldest past the cap
    pub fn record_trail(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }
}

/// Fixed-capacity particle arena with free-list recycling
#[derive(Debug)]
pub struct ParticleArena {
    slots: Vec<Particle>,
    alive: Vec<bool>,
    free: Vec<u32>,
}

impl ParticleArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            alive: vec![false; capacity],
            free: (0..capacity as u32).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live particle count
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim a slot and initialize it; `None` when the cap is reached
    pub fn spawn(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        kind: ParticleKind,
        orbit_target: Option<f32>,
        angle: f32,
    ) -> Option<u32> {
        let idx = self.free.pop()?;
        let p = &mut self.slots[idx as usize];
        p.pos = pos;
        p.vel = vel;
        p.acc = Vec2::ZERO;
        p.kind = kind;
        p.orbit_target = orbit_target;
        p.angle = angle;
        p.trail.clear();
        self.alive[idx as usize] = true;
        Some(idx)
    }

    /// Return a slot to the free list
    pub fn release(&mut self, idx: u32) {
        if self.alive[idx as usize] {
            self.alive[idx as usize] = false;
            self.free.push(idx);
        }
    }

    /// Release every live particle
    pub fn clear(&mut self) {
        for idx in 0..self.slots.len() as u32 {
            self.release(idx);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Particle)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.alive[*i])
            .map(|(i, p)| (i as u32, p))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut Particle)> {
        let alive = &self.alive;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| alive[*i])
            .map(|(i, p)| (i as u32, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spawn_basic(arena: &mut ParticleArena) -> Option<u32> {
        arena.spawn(Vec2::ZERO, Vec2::ZERO, ParticleKind::Basic, None, 0.0)
    }

    #[test]
    fn test_spawn_up_to_capacity_then_drop() {
        let mut arena = ParticleArena::new(4);
        for _ in 0..4 {
            assert!(spawn_basic(&mut arena).is_some());
        }
        assert_eq!(arena.len(), 4);
        // Beyond the cap: dropped, not queued
        assert!(spawn_basic(&mut arena).is_none());
        assert_eq!(arena.len(), 4);
    }

    #[test]
    fn test_release_recycles_slot() {
        let mut arena = ParticleArena::new(2);
        let a = spawn_basic(&mut arena).unwrap();
        let _b = spawn_basic(&mut arena).unwrap();
        arena.release(a);
        assert_eq!(arena.len(), 1);
        // Released slot is reused
        let c = spawn_basic(&mut arena).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_double_release_is_harmless() {
        let mut arena = ParticleArena::new(2);
        let a = spawn_basic(&mut arena).unwrap();
        arena.release(a);
        arena.release(a);
        assert_eq!(arena.len(), 0);
        assert!(spawn_basic(&mut arena).is_some());
        assert!(spawn_basic(&mut arena).is_some());
        assert!(spawn_basic(&mut arena).is_none());
    }

    #[test]
    fn test_trail_bounded_most_recent_last() {
        let mut p = Particle::default();
        for i in 0..10 {
            p.pos = Vec2::new(i as f32, 0.0);
            p.record_trail();
        }
        assert_eq!(p.trail.len(), TRAIL_LENGTH);
        assert_eq!(p.trail.last().unwrap().x, 9.0);
        assert_eq!(p.trail[0].x, (10 - TRAIL_LENGTH) as f32);
    }

    proptest! {
        #[test]
        fn prop_population_never_exceeds_capacity(ops in prop::collection::vec(0u8..3, 0..200)) {
            let mut arena = ParticleArena::new(16);
            let mut live: Vec<u32> = Vec::new();
            for op in ops {
                match op {
                    0 | 1 => {
                        if let Some(idx) = spawn_basic(&mut arena) {
                            live.push(idx);
                        }
                    }
                    _ => {
                        if let Some(idx) = live.pop() {
                            arena.release(idx);
                        }
                    }
                }
                prop_assert!(arena.len() <= arena.capacity());
                prop_assert_eq!(arena.len(), live.len());
                prop_assert_eq!(arena.iter().count(), live.len());
            }
        }
    }
}
