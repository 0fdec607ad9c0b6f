//! Player ship control
//!
//! Turns one input snapshot into aim, thrust, movement, weapon fire and
//! power-up bookkeeping, and owns the damage intake rules.

use glam::Vec2;
use rand::Rng;

use super::state::{
    Faction, GameEvent, GamePhase, GameState, Missile, Player, PowerUpKind, Projectile, Viewport,
};
use super::tick::{Aim, TickInput};
use crate::consts::*;
use crate::bearing;

/// Stick deflection below this keeps the previous aim angle
const STICK_DEADZONE: f32 = 0.1;

/// Where incoming damage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    /// Enemy fire; absorbed completely by an active shield
    Bullet,
    /// Body contact with an enemy; the shield does not apply
    Ram,
}

/// Advance the player by one tick of input
pub fn update_player(state: &mut GameState, input: &TickInput) {
    let viewport = state.config.viewport;
    let player = &mut state.player;

    update_aim(player, input.aim);
    let accel = thrust(player, input, viewport);
    integrate(player, accel, viewport);

    reload_missiles(state);
    state.player.power_ups.tick();

    if input.fire_primary {
        shoot(state);
    }
    state.player.fire_cooldown = state.player.fire_cooldown.saturating_sub(1);

    if input.fire_missile {
        fire_missile(state);
    }
}

fn update_aim(player: &mut Player, aim: Option<Aim>) {
    match aim {
        Some(Aim::Pointer(target)) => player.aim_angle = bearing(player.pos, target),
        Some(Aim::Stick(v)) if v.length() > STICK_DEADZONE => player.aim_angle = v.y.atan2(v.x),
        _ => {}
    }
}

/// Acceleration requested this tick, with pushes into a wall dropped
fn thrust(player: &Player, input: &TickInput, viewport: Viewport) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if input.move_up {
        dir.y -= 1.0;
    }
    if input.move_down {
        dir.y += 1.0;
    }
    if input.move_left {
        dir.x -= 1.0;
    }
    if input.move_right {
        dir.x += 1.0;
    }
    if let Some(stick) = input.move_stick {
        dir += stick.clamp_length_max(1.0);
    }

    let r = player.radius;
    if (dir.x < 0.0 && player.pos.x <= r) || (dir.x > 0.0 && player.pos.x >= viewport.width - r) {
        dir.x = 0.0;
    }
    if (dir.y < 0.0 && player.pos.y <= r) || (dir.y > 0.0 && player.pos.y >= viewport.height - r)
    {
        dir.y = 0.0;
    }

    dir * PLAYER_ACCEL
}

/// Friction, speed cap, position update and soft wall bounce
fn integrate(player: &mut Player, thrust: Vec2, viewport: Viewport) {
    player.vel += thrust;
    player.vel *= PLAYER_FRICTION;
    player.vel = player.vel.clamp_length_max(PLAYER_MAX_SPEED);
    player.pos += player.vel;

    let r = player.radius;
    if player.pos.x < r {
        player.pos.x = r;
        player.vel.x *= WALL_BOUNCE;
    }
    if player.pos.x > viewport.width - r {
        player.pos.x = viewport.width - r;
        player.vel.x *= WALL_BOUNCE;
    }
    if player.pos.y < r {
        player.pos.y = r;
        player.vel.y *= WALL_BOUNCE;
    }
    if player.pos.y > viewport.height - r {
        player.pos.y = viewport.height - r;
        player.vel.y *= WALL_BOUNCE;
    }
}

fn reload_missiles(state: &mut GameState) {
    let player = &mut state.player;
    if player.missiles >= MISSILE_CAPACITY {
        return;
    }
    player.missile_reload += 1;
    if player.missile_reload >= MISSILE_RELOAD_TICKS {
        player.missiles += 1;
        player.missile_reload = 0;
        let stock = player.missiles;
        state.events.push(GameEvent::MissileReloaded { stock });
    }
}

/// Fire the primary weapon; returns how many bullets were spawned
pub fn shoot(state: &mut GameState) -> usize {
    if state.player.fire_cooldown > 0 {
        return 0;
    }

    let origin = state.player.pos;
    let aim = state.player.aim_angle;
    let angles = if state.player.power_ups.is_active(PowerUpKind::Spread) {
        vec![aim, aim - SPREAD_ANGLE, aim + SPREAD_ANGLE]
    } else {
        vec![aim]
    };

    for &angle in &angles {
        let id = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::fired(id, origin, angle, BULLET_SPEED, Faction::Player));
    }

    state.player.fire_cooldown = if state.player.power_ups.is_active(PowerUpKind::Rapid) {
        RAPID_FIRE_COOLDOWN
    } else {
        FIRE_COOLDOWN
    };
    angles.len()
}

/// Launch a homing missile if any are in stock
pub fn fire_missile(state: &mut GameState) -> bool {
    if state.player.missiles == 0 {
        return false;
    }
    state.player.missiles -= 1;

    let heading = state.rng.random::<f32>() * std::f32::consts::TAU;
    let id = state.next_entity_id();
    let origin = state.player.pos;
    state.missiles.push(Missile::launched(id, origin, heading));

    let remaining = state.player.missiles;
    state.events.push(GameEvent::MissileFired { remaining });
    log::debug!("Missile {:?} launched, {} left", id, remaining);
    true
}

/// Start (or refresh) a power-up effect
pub fn activate_power_up(state: &mut GameState, kind: PowerUpKind) {
    let player = &mut state.player;
    player.power_ups.set(kind, POWER_UP_DURATION);
    if kind == PowerUpKind::Shield {
        player.hp = (player.hp + SHIELD_HEAL).min(player.max_hp);
    }
    log::debug!("Power-up {:?} active for {} ticks", kind, POWER_UP_DURATION);
}

/// Apply damage to the player; returns the hp actually lost
///
/// Bullet damage is ignored while the shield timer runs. Hitting zero hp
/// moves the session to game over.
pub fn take_damage(state: &mut GameState, amount: u32, source: DamageSource) -> u32 {
    if source == DamageSource::Bullet && state.player.is_shielded() {
        return 0;
    }

    let player = &mut state.player;
    let dealt = amount.min(player.hp);
    player.hp -= dealt;
    let hp = player.hp;

    state.trigger_shake(SHAKE_PLAYER_HIT);
    state.events.push(GameEvent::PlayerDamaged { amount: dealt, hp });

    if hp == 0 && state.phase != GamePhase::GameOver {
        log::info!("Player destroyed at frame {} (score {})", state.frame, state.score);
        state.phase = GamePhase::GameOver;
    }
    dealt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SessionConfig;

    fn state() -> GameState {
        GameState::new(
            11,
            SessionConfig {
                star_count: 0,
                planet_count: 0,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_spread_shot_fires_three() {
        let mut state = state();
        state.player.aim_angle = 0.7;
        state.player.power_ups.spread = 10;

        assert_eq!(shoot(&mut state), 3);
        let shots = state.projectiles.as_slice();
        assert_eq!(shots.len(), 3);

        let angles: Vec<f32> = shots.iter().map(|p| p.vel.y.atan2(p.vel.x)).collect();
        assert!((angles[0] - 0.7).abs() < 1e-5);
        assert!((angles[1] - 0.5).abs() < 1e-5);
        assert!((angles[2] - 0.9).abs() < 1e-5);
        for p in shots {
            assert!((p.vel.length() - BULLET_SPEED).abs() < 1e-4);
            assert_eq!(p.owner, Faction::Player);
        }
    }

    #[test]
    fn test_cooldown_blocks_shots() {
        let mut state = state();
        assert_eq!(shoot(&mut state), 1);
        assert_eq!(state.player.fire_cooldown, FIRE_COOLDOWN);
        assert_eq!(shoot(&mut state), 0);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_rapid_fire_cooldown() {
        let mut state = state();
        state.player.power_ups.rapid = 10;
        shoot(&mut state);
        assert_eq!(state.player.fire_cooldown, RAPID_FIRE_COOLDOWN);
    }

    #[test]
    fn test_held_fire_rate() {
        let mut state = state();
        let input = TickInput {
            fire_primary: true,
            ..Default::default()
        };
        for _ in 0..30 {
            update_player(&mut state, &input);
        }
        // Shots on ticks 1 and 16
        assert_eq!(state.projectiles.len(), 2);
    }

    #[test]
    fn test_missile_stock_and_reload() {
        let mut state = state();
        for _ in 0..3 {
            assert!(fire_missile(&mut state));
        }
        assert!(!fire_missile(&mut state));
        assert_eq!(state.player.missiles, 0);
        assert_eq!(state.missiles.len(), 3);

        let idle = TickInput::default();
        for _ in 0..MISSILE_RELOAD_TICKS - 1 {
            update_player(&mut state, &idle);
        }
        assert_eq!(state.player.missiles, 0);
        update_player(&mut state, &idle);
        assert_eq!(state.player.missiles, 1);
    }

    #[test]
    fn test_reload_stops_at_capacity() {
        let mut state = state();
        let idle = TickInput::default();
        for _ in 0..1000 {
            update_player(&mut state, &idle);
        }
        assert_eq!(state.player.missiles, MISSILE_CAPACITY);
        assert_eq!(state.player.missile_reload, 0);
    }

    #[test]
    fn test_shield_pickup_heals_capped() {
        let mut state = state();
        state.player.hp = 90;
        activate_power_up(&mut state, PowerUpKind::Shield);
        assert_eq!(state.player.hp, 100);
        assert_eq!(state.player.power_ups.shield, POWER_UP_DURATION);

        state.player.hp = 50;
        activate_power_up(&mut state, PowerUpKind::Shield);
        assert_eq!(state.player.hp, 70);
    }

    #[test]
    fn test_take_damage_clamps_and_ends_session() {
        let mut state = state();
        state.player.hp = 15;
        assert_eq!(take_damage(&mut state, 20, DamageSource::Bullet), 15);
        assert_eq!(state.player.hp, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.screen_shake, SHAKE_PLAYER_HIT);
    }

    #[test]
    fn test_shield_suppresses_bullet_damage_only() {
        let mut state = state();
        state.player.power_ups.shield = 1;
        assert_eq!(take_damage(&mut state, 10, DamageSource::Bullet), 0);
        assert_eq!(state.screen_shake, 0.0);
        assert_eq!(take_damage(&mut state, 20, DamageSource::Ram), 20);
        assert_eq!(state.player.hp, 80);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut state = state();
        let input = TickInput {
            move_right: true,
            move_down: true,
            ..Default::default()
        };
        for _ in 0..40 {
            update_player(&mut state, &input);
            assert!(state.player.vel.length() <= PLAYER_MAX_SPEED + 1e-4);
        }
    }

    #[test]
    fn test_wall_bounce_is_soft() {
        let mut state = state();
        state.player.pos = Vec2::new(22.0, 300.0);
        state.player.vel = Vec2::new(-5.0, 0.0);

        update_player(&mut state, &TickInput::default());
        assert_eq!(state.player.pos.x, PLAYER_RADIUS);
        // -5 * 0.94 = -4.7, reflected and halved
        assert!((state.player.vel.x - 2.35).abs() < 1e-5);
    }

    #[test]
    fn test_push_into_wall_is_dropped() {
        let mut state = state();
        state.player.pos = Vec2::new(PLAYER_RADIUS, 300.0);
        let input = TickInput {
            move_left: true,
            ..Default::default()
        };
        update_player(&mut state, &input);
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert_eq!(state.player.pos.x, PLAYER_RADIUS);
    }

    #[test]
    fn test_stick_is_clamped_to_unit() {
        let mut state = state();
        let input = TickInput {
            move_stick: Some(Vec2::new(10.0, 0.0)),
            ..Default::default()
        };
        update_player(&mut state, &input);
        assert!((state.player.vel.x - PLAYER_ACCEL * PLAYER_FRICTION).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_aim() {
        let mut state = state();
        state.player.pos = Vec2::new(100.0, 100.0);
        let input = TickInput {
            aim: Some(Aim::Pointer(Vec2::new(100.0, 200.0))),
            ..Default::default()
        };
        update_player(&mut state, &input);
        assert!((state.player.aim_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
