//! Enemy spawning
//!
//! Spawn pacing tightens as the score grows, following a difficulty curve.
//! New enemies enter from just outside a random screen edge and get their
//! stats rolled from the gameplay RNG.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pool::EntityId;
use super::state::{Enemy, GameEvent, GameState, Viewport};
use crate::consts::*;
use crate::hsl_to_rgb;

/// Spawn interval as a function of score
///
/// `interval = max(min_interval, base_interval - score / score_divisor)`,
/// in milliseconds at the nominal 16ms frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyCurve {
    pub base_interval: f32,
    pub min_interval: f32,
    pub score_divisor: f32,
}

impl DifficultyCurve {
    /// Fast ramp: one enemy every 62 ticks at the start, every 25 from 3000 points
    pub const AGGRESSIVE: Self = Self {
        base_interval: 1000.0,
        min_interval: 400.0,
        score_divisor: 5.0,
    };

    /// Slow ramp: one enemy every 125 ticks at the start, every 50 from 12000 points
    pub const GENTLE: Self = Self {
        base_interval: 2000.0,
        min_interval: 800.0,
        score_divisor: 10.0,
    };

    pub fn interval(&self, score: u64) -> f32 {
        (self.base_interval - score as f32 / self.score_divisor).max(self.min_interval)
    }

    /// Ticks between spawns at this score (always at least 1)
    pub fn spawn_period(&self, score: u64) -> u64 {
        ((self.interval(score) / 16.0).floor() as u64).max(1)
    }

    pub fn should_spawn(&self, frame: u64, score: u64) -> bool {
        frame % self.spawn_period(score) == 0
    }
}

/// Rolled attributes for a new enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTraits {
    pub radius: f32,
    pub hue: f32,
    pub speed: f32,
    pub spin_speed: f32,
    pub hp: u32,
    pub shoot_timer: f32,
}

impl EnemyTraits {
    /// Roll stats; speed and hp scale with score
    pub fn roll(rng: &mut impl Rng, score: u64) -> Self {
        let radius: f32 = rng.random_range(10.0..20.0);
        let hue: f32 = rng.random_range(300.0..360.0);
        let speed = rng.random_range(1.0f32..2.0) + score as f32 / 2000.0;
        let spin_speed: f32 = rng.random_range(-0.05..0.05);
        let hp = (radius / 10.0).floor() as u32 + (score / 3000) as u32;
        let shoot_timer: f32 = rng.random_range(50.0..150.0);
        Self {
            radius,
            hue,
            speed,
            spin_speed,
            hp,
            shoot_timer,
        }
    }
}

/// A point just outside one of the four screen edges
pub fn edge_position(rng: &mut impl Rng, viewport: Viewport) -> Vec2 {
    let m = ENEMY_SPAWN_MARGIN;
    if rng.random::<f32>() < 0.5 {
        let x = if rng.random::<f32>() < 0.5 {
            -m
        } else {
            viewport.width + m
        };
        Vec2::new(x, rng.random::<f32>() * viewport.height)
    } else {
        let x = rng.random::<f32>() * viewport.width;
        let y = if rng.random::<f32>() < 0.5 {
            -m
        } else {
            viewport.height + m
        };
        Vec2::new(x, y)
    }
}

/// Place a freshly rolled enemy at an edge and add it to the pool
pub fn spawn_enemy(state: &mut GameState) -> EntityId {
    let pos = edge_position(&mut state.rng, state.config.viewport);
    let traits = EnemyTraits::roll(&mut state.rng, state.score);
    let id = state.next_entity_id();

    state.enemies.push(Enemy {
        id,
        pos,
        vel: Vec2::ZERO,
        radius: traits.radius,
        speed: traits.speed,
        hp: traits.hp,
        shoot_timer: traits.shoot_timer,
        spin: 0.0,
        spin_speed: traits.spin_speed,
        color: hsl_to_rgb(traits.hue, 1.0, 0.5),
    });
    state.events.push(GameEvent::EnemySpawned { id });
    log::debug!(
        "Spawned enemy {:?} at ({:.0}, {:.0}) r={:.1} hp={}",
        id,
        pos.x,
        pos.y,
        traits.radius,
        traits.hp
    );
    id
}

/// Spawn at most one enemy if this frame is on the curve's beat
pub fn maybe_spawn(state: &mut GameState) -> Option<EntityId> {
    if state
        .config
        .difficulty
        .should_spawn(state.frame, state.score)
    {
        Some(spawn_enemy(state))
    } else {
        None
    }
}
