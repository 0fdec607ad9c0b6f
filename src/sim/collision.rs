//! Collision detection and response
//!
//! Every body is a circle. A pass runs once per tick after everything has
//! moved, evaluates the pair rules in a fixed precedence order, and only
//! mutates the pools once all scans are done: hits are gathered into removal
//! sets first, so an entity consumed by one rule is never seen by a later one
//! and is never processed twice.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::{DamageSource, activate_power_up, take_damage};
use super::pool::{EntityId, RemovalSet};
use super::state::{GameEvent, GameState, KillCause, PowerUp, PowerUpKind};
use crate::consts::*;

/// Contact slack for most pairs
pub const CONTACT_SLACK: f32 = 1.0;
/// Missiles detonate a little earlier than bullets
pub const MISSILE_FUSE_SLACK: f32 = 5.0;

/// Circle used for every hit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Edge-to-edge distance (negative when overlapping)
    #[inline]
    pub fn gap(&self, other: &Circle) -> f32 {
        self.center.distance(other.center) - self.radius - other.radius
    }

    /// True when the edges are closer than `slack`
    #[inline]
    pub fn touches(&self, other: &Circle, slack: f32) -> bool {
        self.gap(other) < slack
    }
}

/// Tally of what a collision pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub out_of_bounds: usize,
    pub missile_kills: usize,
    pub bullet_kills: usize,
    pub player_hits: usize,
    pub pickups: usize,
    pub expired_power_ups: usize,
    pub rams: usize,
    pub score_awarded: u64,
}

impl CollisionReport {
    /// Total entities removed by the pass
    pub fn removals(&self) -> usize {
        self.out_of_bounds
            + self.missile_kills * 2
            + self.bullet_kills * 2
            + self.player_hits
            + self.pickups
            + self.expired_power_ups
            + self.rams
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct MissileHit {
    enemy: EntityId,
    at: Vec2,
}

struct BulletHit {
    enemy: EntityId,
    at: Vec2,
    enemy_pos: Vec2,
    color: u32,
}

/// Run every pair rule once and apply the results
pub fn resolve_collisions(state: &mut GameState) -> CollisionReport {
    let mut report = CollisionReport::default();
    let mut dead_projectiles = RemovalSet::new();
    let mut dead_missiles = RemovalSet::new();
    let mut dead_enemies = RemovalSet::new();
    let mut dead_power_ups = RemovalSet::new();

    let viewport = state.config.viewport;
    let player = state.player.bounds();

    // 1. Anything that flew off-screen is gone before it can hit anything
    for p in state.projectiles.iter() {
        if viewport.is_outside(p.bounds(), OFFSCREEN_MARGIN) {
            dead_projectiles.insert(p.id);
        }
    }
    for m in state.missiles.iter() {
        if viewport.is_outside(m.bounds(), OFFSCREEN_MARGIN) {
            dead_missiles.insert(m.id);
        }
    }
    report.out_of_bounds = dead_projectiles.len() + dead_missiles.len();

    // 2. Missiles vs enemies: a missile is spent on its first match
    let mut missile_hits = Vec::new();
    for m in state.missiles.iter() {
        if dead_missiles.contains(&m.id) {
            continue;
        }
        let hit = state.enemies.iter().find(|e| {
            !dead_enemies.contains(&e.id) && m.bounds().touches(&e.bounds(), MISSILE_FUSE_SLACK)
        });
        if let Some(e) = hit {
            dead_missiles.insert(m.id);
            dead_enemies.insert(e.id);
            missile_hits.push(MissileHit {
                enemy: e.id,
                at: e.pos,
            });
        }
    }
    for hit in missile_hits {
        state.emit_burst(hit.at, COLOR_MISSILE, 20);
        state.trigger_shake(SHAKE_MISSILE_KILL);
        state.award(SCORE_MISSILE_KILL);
        state.events.push(GameEvent::EnemyDestroyed {
            id: hit.enemy,
            cause: KillCause::Missile,
        });
        log::debug!("Missile destroyed enemy {:?}", hit.enemy);
        report.missile_kills += 1;
        report.score_awarded += SCORE_MISSILE_KILL;
    }

    // 3. Enemy bullets vs player
    let mut player_hits = Vec::new();
    for p in state.projectiles.iter() {
        if !p.is_enemy_owned() || dead_projectiles.contains(&p.id) {
            continue;
        }
        if p.bounds().touches(&player, CONTACT_SLACK) {
            dead_projectiles.insert(p.id);
            player_hits.push((p.pos, p.color));
        }
    }
    for (at, color) in player_hits {
        take_damage(state, ENEMY_BULLET_DAMAGE, DamageSource::Bullet);
        state.emit_burst(at, color, 3);
        report.player_hits += 1;
    }

    // 4. Player bullets vs enemies; one hit is lethal and spends that bullet
    let mut bullet_hits = Vec::new();
    for e in state.enemies.iter() {
        if dead_enemies.contains(&e.id) {
            continue;
        }
        let hit = state.projectiles.iter().find(|p| {
            !p.is_enemy_owned()
                && !dead_projectiles.contains(&p.id)
                && p.bounds().touches(&e.bounds(), CONTACT_SLACK)
        });
        if let Some(p) = hit {
            dead_projectiles.insert(p.id);
            dead_enemies.insert(e.id);
            bullet_hits.push(BulletHit {
                enemy: e.id,
                at: p.pos,
                enemy_pos: e.pos,
                color: e.color,
            });
        }
    }
    for hit in bullet_hits {
        state.emit_burst(hit.at, hit.color, 8);
        if state.rng_roll() < POWER_UP_DROP_CHANCE {
            let kind = PowerUpKind::from_roll(state.rng_roll());
            let id = state.next_entity_id();
            state.power_ups.push(PowerUp::dropped(id, kind, hit.enemy_pos));
            log::debug!("Enemy {:?} dropped {:?}", hit.enemy, kind);
        }
        state.trigger_shake(SHAKE_BULLET_KILL);
        state.award(SCORE_BULLET_KILL);
        state.events.push(GameEvent::EnemyDestroyed {
            id: hit.enemy,
            cause: KillCause::Bullet,
        });
        report.bullet_kills += 1;
        report.score_awarded += SCORE_BULLET_KILL;
    }

    // 5. Power-ups: pickup, or expire once past the bottom edge
    let mut pickups = Vec::new();
    for pu in state.power_ups.iter() {
        if pu.bounds().touches(&player, CONTACT_SLACK) {
            dead_power_ups.insert(pu.id);
            pickups.push(pu.kind);
        } else if pu.pos.y > viewport.height {
            dead_power_ups.insert(pu.id);
            report.expired_power_ups += 1;
        }
    }
    for kind in pickups {
        activate_power_up(state, kind);
        state.award(SCORE_POWER_UP);
        state.events.push(GameEvent::PowerUpCollected { kind });
        report.pickups += 1;
        report.score_awarded += SCORE_POWER_UP;
    }

    // 6. Enemy bodies vs player. No score for these deaths, and the shield does not help.
    let mut rams = Vec::new();
    for e in state.enemies.iter() {
        if dead_enemies.contains(&e.id) {
            continue;
        }
        if e.bounds().touches(&player, CONTACT_SLACK) {
            dead_enemies.insert(e.id);
            rams.push((e.id, e.pos, e.color));
        }
    }
    for (id, at, color) in rams {
        take_damage(state, RAM_DAMAGE, DamageSource::Ram);
        state.emit_burst(at, color, 8);
        state.events.push(GameEvent::EnemyDestroyed {
            id,
            cause: KillCause::Ram,
        });
        report.rams += 1;
    }

    state.projectiles.remove_ids(&dead_projectiles);
    state.missiles.remove_ids(&dead_missiles);
    state.enemies.remove_ids(&dead_enemies);
    state.power_ups.remove_ids(&dead_power_ups);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::spawn_enemy;
    use crate::sim::state::{Enemy, Faction, Missile, Projectile, SessionConfig};

    fn quiet_state() -> GameState {
        let config = SessionConfig {
            star_count: 0,
            planet_count: 0,
            ..Default::default()
        };
        let mut state = GameState::new(42, config);
        state.player.pos = Vec2::new(100.0, 100.0);
        state
    }

    fn add_enemy(state: &mut GameState, pos: Vec2, radius: f32) -> EntityId {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            speed: 1.0,
            hp: 1,
            shoot_timer: 100.0,
            spin: 0.0,
            spin_speed: 0.0,
            color: 0xff00aa,
        });
        id
    }

    fn add_bullet(state: &mut GameState, pos: Vec2, owner: Faction) -> EntityId {
        let id = state.next_entity_id();
        let p = Projectile::fired(id, pos, 0.0, BULLET_SPEED, owner);
        state.projectiles.push(p);
        id
    }

    #[test]
    fn test_circle_touches() {
        let a = Circle::new(Vec2::ZERO, 10.0);
        let b = Circle::new(Vec2::new(30.0, 0.0), 10.0);
        assert!((a.gap(&b) - 10.0).abs() < 1e-6);
        assert!(!a.touches(&b, CONTACT_SLACK));
        assert!(a.touches(&b, 10.5));
    }

    #[test]
    fn test_ram_costs_hp_but_awards_nothing() {
        let mut state = quiet_state();
        add_enemy(&mut state, Vec2::new(110.0, 100.0), 10.0);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.rams, 1);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.hp, 80);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_ram_ignores_shield() {
        let mut state = quiet_state();
        state.player.power_ups.shield = 100;
        add_enemy(&mut state, Vec2::new(110.0, 100.0), 10.0);

        resolve_collisions(&mut state);
        assert_eq!(state.player.hp, 80);
    }

    #[test]
    fn test_shield_blocks_enemy_bullets() {
        let mut state = quiet_state();
        state.player.power_ups.shield = 100;
        add_bullet(&mut state, Vec2::new(105.0, 100.0), Faction::Enemy);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.player_hits, 1);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.player.hp, 100);
        assert_eq!(state.particles.len(), 3);
    }

    #[test]
    fn test_enemy_bullet_damages_player() {
        let mut state = quiet_state();
        add_bullet(&mut state, Vec2::new(105.0, 100.0), Faction::Enemy);

        resolve_collisions(&mut state);
        assert_eq!(state.player.hp, 90);
        assert_eq!(state.screen_shake, SHAKE_PLAYER_HIT);
    }

    #[test]
    fn test_player_bullet_kill() {
        let mut state = quiet_state();
        let enemy = add_enemy(&mut state, Vec2::new(400.0, 400.0), 15.0);
        add_bullet(&mut state, Vec2::new(410.0, 400.0), Faction::Player);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.bullet_kills, 1);
        assert_eq!(state.score, SCORE_BULLET_KILL);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.screen_shake, SHAKE_BULLET_KILL);
        assert!(state.events.contains(&GameEvent::EnemyDestroyed {
            id: enemy,
            cause: KillCause::Bullet
        }));
    }

    #[test]
    fn test_two_bullets_one_enemy() {
        let mut state = quiet_state();
        add_enemy(&mut state, Vec2::new(400.0, 400.0), 15.0);
        add_bullet(&mut state, Vec2::new(410.0, 400.0), Faction::Player);
        let second = add_bullet(&mut state, Vec2::new(390.0, 400.0), Faction::Player);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.bullet_kills, 1);
        assert_eq!(state.score, SCORE_BULLET_KILL);
        // The second bullet was never needed and keeps flying
        assert!(state.projectiles.contains(second));
    }

    #[test]
    fn test_high_score_enemy_dies_to_one_bullet() {
        let mut state = quiet_state();
        state.score = 3000;
        let enemy = spawn_enemy(&mut state);
        let (pos, hp) = state
            .enemies
            .get(enemy)
            .map(|e| (e.pos, e.hp))
            .unwrap();
        assert!(hp >= 2);
        // Bring it on screen so the bullet isn't discarded as out of bounds
        let target = Vec2::new(400.0, 400.0);
        state.enemies.iter_mut().for_each(|e| e.pos = target);
        assert_ne!(pos, target);
        add_bullet(&mut state, target + Vec2::new(5.0, 0.0), Faction::Player);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.bullet_kills, 1);
        assert!(!state.enemies.contains(enemy));
        assert!(state.projectiles.is_empty());
        assert_eq!(state.score, 3000 + SCORE_BULLET_KILL);
    }

    #[test]
    fn test_bullet_kill_drops_power_up_at_enemy() {
        let enemy_pos = Vec2::new(400.0, 400.0);
        let bullet_pos = Vec2::new(412.0, 400.0);
        let enemy_color = 0xff00aa;

        let mut dropped = None;
        for seed in 0..500 {
            let config = SessionConfig {
                star_count: 0,
                planet_count: 0,
                ..Default::default()
            };
            let mut state = GameState::new(seed, config);
            state.player.pos = Vec2::new(100.0, 100.0);
            add_enemy(&mut state, enemy_pos, 10.0);
            add_bullet(&mut state, bullet_pos, Faction::Player);

            let report = resolve_collisions(&mut state);
            assert_eq!(report.bullet_kills, 1);
            assert_eq!(state.particles.len(), 8);
            assert!(state.particles.iter().all(|p| p.color == enemy_color));
            assert!(state.particles.iter().all(|p| p.pos == bullet_pos));
            if !state.power_ups.is_empty() {
                dropped = Some(state);
                break;
            }
        }

        let state = dropped.expect("a 15% drop shows up within 500 seeds");
        assert_eq!(state.power_ups.len(), 1);
        let pu = &state.power_ups.as_slice()[0];
        assert_eq!(pu.pos, enemy_pos);
        assert_eq!(pu.vel, Vec2::new(0.0, POWER_UP_FALL_SPEED));
        assert_eq!(pu.radius, POWER_UP_RADIUS);
        assert!(matches!(
            pu.kind,
            PowerUpKind::Spread | PowerUpKind::Rapid | PowerUpKind::Shield
        ));
    }

    #[test]
    fn test_missile_consumed_by_first_enemy_only() {
        let mut state = quiet_state();
        let first = add_enemy(&mut state, Vec2::new(400.0, 400.0), 10.0);
        let second = add_enemy(&mut state, Vec2::new(405.0, 400.0), 10.0);
        let id = state.next_entity_id();
        state
            .missiles
            .push(Missile::launched(id, Vec2::new(402.0, 400.0), 0.0));

        let report = resolve_collisions(&mut state);
        assert_eq!(report.missile_kills, 1);
        assert_eq!(state.score, SCORE_MISSILE_KILL);
        assert!(!state.enemies.contains(first));
        assert!(state.enemies.contains(second));
        assert!(state.missiles.is_empty());
        assert_eq!(state.screen_shake, SHAKE_MISSILE_KILL);
        assert_eq!(state.particles.len(), 20);
    }

    #[test]
    fn test_missile_fuse_is_wider_than_contact() {
        let mut state = quiet_state();
        // Gap of 3px: inside the missile fuse but outside bullet contact
        add_enemy(&mut state, Vec2::new(400.0, 400.0), 10.0);
        let id = state.next_entity_id();
        state
            .missiles
            .push(Missile::launched(id, Vec2::new(419.0, 400.0), 0.0));

        assert_eq!(resolve_collisions(&mut state).missile_kills, 1);
    }

    #[test]
    fn test_out_of_bounds_takes_precedence() {
        let mut state = quiet_state();
        add_enemy(&mut state, Vec2::new(-60.0, 100.0), 20.0);
        add_bullet(&mut state, Vec2::new(-60.0, 100.0), Faction::Player);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.out_of_bounds, 1);
        assert_eq!(report.bullet_kills, 0);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_power_up_pickup_and_expiry() {
        let mut state = quiet_state();
        let near = state.next_entity_id();
        state
            .power_ups
            .push(PowerUp::dropped(near, PowerUpKind::Rapid, Vec2::new(100.0, 120.0)));
        let far = state.next_entity_id();
        let below = Vec2::new(300.0, state.config.viewport.height + 1.0);
        state
            .power_ups
            .push(PowerUp::dropped(far, PowerUpKind::Spread, below));

        let report = resolve_collisions(&mut state);
        assert_eq!(report.pickups, 1);
        assert_eq!(report.expired_power_ups, 1);
        assert_eq!(state.score, SCORE_POWER_UP);
        assert_eq!(state.player.power_ups.rapid, POWER_UP_DURATION);
        assert_eq!(state.player.power_ups.spread, 0);
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut state = quiet_state();
        add_enemy(&mut state, Vec2::new(110.0, 100.0), 10.0);
        add_enemy(&mut state, Vec2::new(400.0, 400.0), 15.0);
        add_enemy(&mut state, Vec2::new(700.0, 400.0), 15.0);
        add_bullet(&mut state, Vec2::new(410.0, 400.0), Faction::Player);
        add_bullet(&mut state, Vec2::new(95.0, 110.0), Faction::Enemy);
        let id = state.next_entity_id();
        state
            .missiles
            .push(Missile::launched(id, Vec2::new(700.0, 410.0), 0.0));

        let first = resolve_collisions(&mut state);
        assert!(!first.is_empty());
        let score = state.score;
        let hp = state.player.hp;
        let counts = (
            state.projectiles.len(),
            state.missiles.len(),
            state.enemies.len(),
            state.power_ups.len(),
        );

        let second = resolve_collisions(&mut state);
        assert!(second.is_empty());
        assert_eq!(second.removals(), 0);
        assert_eq!(state.score, score);
        assert_eq!(state.player.hp, hp);
        assert_eq!(
            counts,
            (
                state.projectiles.len(),
                state.missiles.len(),
                state.enemies.len(),
                state.power_ups.len()
            )
        );
    }
}
