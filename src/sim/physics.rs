//! Per-kind motion rules
//!
//! Everything here advances by exactly one tick. The player is handled by
//! `player`; this module moves every other entity.

use glam::Vec2;
use rand::Rng;

use super::pool::{EntityId, EntityPool};
use super::state::{Enemy, Faction, GameState, Missile, Particle, PowerUp, Projectile};
use crate::consts::*;
use crate::{bearing, normalize_angle, shortest_angle_delta, unit_from_angle};

/// Straight-line flight, no drag
pub fn step_projectile(p: &mut Projectile) {
    p.pos += p.vel;
}

/// Closest enemy to `from`; on a tie the earlier enemy in the pool wins
pub fn nearest_enemy(enemies: &EntityPool<Enemy>, from: Vec2) -> Option<EntityId> {
    let mut best = None;
    let mut best_dist = f32::INFINITY;
    for e in enemies {
        let dist = from.distance(e.pos);
        if dist < best_dist {
            best_dist = dist;
            best = Some(e.id);
        }
    }
    best
}

/// Homing flight: reacquire if the target is gone, turn toward it, accelerate
pub fn step_missile(m: &mut Missile, enemies: &EntityPool<Enemy>) {
    let tracked = m.target.and_then(|id| enemies.get(id));
    let target = match tracked {
        Some(e) => Some(e),
        None => {
            m.target = nearest_enemy(enemies, m.pos);
            m.target.and_then(|id| enemies.get(id))
        }
    };

    if let Some(enemy) = target {
        let wanted = bearing(m.pos, enemy.pos);
        let turn = shortest_angle_delta(m.heading, wanted) * MISSILE_TURN_RATE;
        m.heading = normalize_angle(m.heading + turn);
    }

    m.speed = (m.speed + MISSILE_ACCEL).min(MISSILE_MAX_SPEED);
    m.vel = unit_from_angle(m.heading) * m.speed;
    m.pos += m.vel;
}

/// Chase the player at constant speed, spin, and count down to the next shot
///
/// Returns the firing angle when the shot timer runs out this tick.
pub fn step_enemy(e: &mut Enemy, player_pos: Vec2, rng: &mut impl Rng) -> Option<f32> {
    e.vel = unit_from_angle(bearing(e.pos, player_pos)) * e.speed;
    e.pos += e.vel;
    e.spin += e.spin_speed;

    e.shoot_timer -= 1.0;
    if e.shoot_timer <= 0.0 {
        e.shoot_timer = rng.random_range(100.0..250.0);
        return Some(bearing(e.pos, player_pos));
    }
    None
}

/// Debris drifts and slows; trail puffs stay put and fade faster
pub fn step_particle(p: &mut Particle) {
    if p.is_trail {
        p.alpha -= TRAIL_FADE;
    } else {
        p.vel *= PARTICLE_FRICTION;
        p.pos += p.vel;
        p.alpha -= PARTICLE_FADE;
    }
    p.alpha = p.alpha.max(0.0);
}

pub fn step_power_up(p: &mut PowerUp) {
    p.pos += p.vel;
}

/// One tick of geometric shake decay, snapping to zero below the cutoff
pub fn decay_shake(shake: f32) -> f32 {
    if shake <= 0.0 {
        return 0.0;
    }
    let next = shake * SHAKE_DECAY;
    if next < SHAKE_CUTOFF { 0.0 } else { next }
}

/// Advance every non-player entity by one tick
pub fn step_world(state: &mut GameState) {
    for p in state.projectiles.iter_mut() {
        step_projectile(p);
    }

    // Exhaust puffs are dropped where the missile was before it moved
    let drop_trail = state.frame % 2 == 0;
    let mut trail = Vec::new();
    for m in state.missiles.iter_mut() {
        if drop_trail {
            trail.push(m.pos);
        }
        step_missile(m, &state.enemies);
    }
    for pos in trail {
        state.emit_trail(pos, COLOR_MISSILE);
    }

    for p in state.power_ups.iter_mut() {
        step_power_up(p);
    }

    for p in state.particles.iter_mut() {
        step_particle(p);
    }
    state.particles.retain(|p| p.alpha > 0.0);

    let player_pos = state.player.pos;
    let mut shots = Vec::new();
    for e in state.enemies.iter_mut() {
        if let Some(angle) = step_enemy(e, player_pos, &mut state.rng) {
            shots.push((e.pos, angle));
        }
    }
    for (origin, angle) in shots {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::fired(
            id,
            origin,
            angle,
            ENEMY_BULLET_SPEED,
            Faction::Enemy,
        ));
    }
}
