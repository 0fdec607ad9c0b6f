//! Game state and core simulation types
//!
//! All state that must survive a snapshot/restore round trip lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::backdrop::Backdrop;
use super::collision::Circle;
use super::pool::{EntityId, EntityPool, Identified};
use super::spawn::DifficultyCurve;
use crate::consts::*;
use crate::unit_from_angle;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen until the next pause toggle
    Paused,
    /// Player hp reached zero; terminal until restart
    GameOver,
}

/// Playfield dimensions in pixels, origin top-left, y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True once a circle has fully left the viewport grown by `margin` on every side
    pub fn is_outside(&self, bounds: Circle, margin: f32) -> bool {
        let Circle { center, radius } = bounds;
        center.x + radius < -margin
            || center.x - radius > self.width + margin
            || center.y + radius < -margin
            || center.y - radius > self.height + margin
    }
}

/// Everything the simulation needs from the host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub viewport: Viewport,
    pub difficulty: DifficultyCurve,
    /// Upper bound on live particles (0 disables particle effects)
    pub max_particles: usize,
    /// Number of background stars
    pub star_count: usize,
    /// Number of background planets
    pub planet_count: usize,
    /// When false, shake triggers are ignored
    pub screen_shake: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            difficulty: DifficultyCurve::AGGRESSIVE,
            max_particles: 2000,
            star_count: 150,
            planet_count: 4,
            screen_shake: true,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Two extra shots at ±0.2 rad
    Spread,
    /// Shorter fire cooldown
    Rapid,
    /// Blocks bullet damage and heals on pickup
    Shield,
}

impl PowerUpKind {
    /// Pick a kind from a uniform roll in [0, 1)
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.33 {
            PowerUpKind::Spread
        } else if roll < 0.66 {
            PowerUpKind::Rapid
        } else {
            PowerUpKind::Shield
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Spread => 0xffff00,
            PowerUpKind::Rapid => 0xff003c,
            PowerUpKind::Shield => 0x00f3ff,
        }
    }

    /// Single-letter HUD label
    pub fn label(&self) -> char {
        match self {
            PowerUpKind::Spread => 'S',
            PowerUpKind::Rapid => 'R',
            PowerUpKind::Shield => 'H',
        }
    }
}

/// Remaining ticks of each active power-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpTimers {
    pub spread: u32,
    pub rapid: u32,
    pub shield: u32,
}

impl PowerUpTimers {
    pub fn remaining(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Spread => self.spread,
            PowerUpKind::Rapid => self.rapid,
            PowerUpKind::Shield => self.shield,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining(kind) > 0
    }

    pub fn set(&mut self, kind: PowerUpKind, ticks: u32) {
        match kind {
            PowerUpKind::Spread => self.spread = ticks,
            PowerUpKind::Rapid => self.rapid = ticks,
            PowerUpKind::Shield => self.shield = ticks,
        }
    }

    /// Count every running timer down by one tick
    pub fn tick(&mut self) {
        self.spread = self.spread.saturating_sub(1);
        self.rapid = self.rapid.saturating_sub(1);
        self.shield = self.shield.saturating_sub(1);
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: u32,
    pub max_hp: u32,
    /// Direction the guns point (radians)
    pub aim_angle: f32,
    /// Homing missiles in stock (0..=MISSILE_CAPACITY)
    pub missiles: u32,
    /// Ticks accumulated toward the next missile
    pub missile_reload: u32,
    /// Ticks until the primary weapon may fire again
    pub fire_cooldown: u32,
    pub power_ups: PowerUpTimers,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            aim_angle: 0.0,
            missiles: MISSILE_CAPACITY,
            missile_reload: 0,
            fire_cooldown: 0,
            power_ups: PowerUpTimers::default(),
        }
    }

    pub fn bounds(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    pub fn is_shielded(&self) -> bool {
        self.power_ups.is_active(PowerUpKind::Shield)
    }

    /// Health as a percentage of max, for the health bar
    pub fn health_percent(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32 * 100.0
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// A straight-flying bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub owner: Faction,
    pub color: u32,
}

impl Projectile {
    /// A bullet leaving `origin` along `angle` at `speed`
    pub fn fired(id: EntityId, origin: Vec2, angle: f32, speed: f32, owner: Faction) -> Self {
        let color = match owner {
            Faction::Player => COLOR_PLAYER_BULLET,
            Faction::Enemy => COLOR_ENEMY_BULLET,
        };
        Self {
            id,
            pos: origin,
            vel: unit_from_angle(angle) * speed,
            radius: BULLET_RADIUS,
            owner,
            color,
        }
    }

    pub fn is_enemy_owned(&self) -> bool {
        self.owner == Faction::Enemy
    }

    pub fn bounds(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

impl Identified for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A homing missile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Current heading (radians)
    pub heading: f32,
    /// Current speed, ramps up to MISSILE_MAX_SPEED
    pub speed: f32,
    /// Enemy being chased; only ever a lookup key into the enemy pool
    pub target: Option<EntityId>,
}

impl Missile {
    pub fn launched(id: EntityId, origin: Vec2, heading: f32) -> Self {
        Self {
            id,
            pos: origin,
            vel: Vec2::ZERO,
            radius: MISSILE_RADIUS,
            heading,
            speed: 0.0,
            target: None,
        }
    }

    pub fn bounds(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

impl Identified for Missile {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A hostile drone that chases the player and shoots at it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub hp: u32,
    /// Ticks until the next shot
    pub shoot_timer: f32,
    /// Visual rotation (radians)
    pub spin: f32,
    pub spin_speed: f32,
    pub color: u32,
}

impl Enemy {
    pub fn bounds(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

impl Identified for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl PowerUp {
    pub fn dropped(id: EntityId, kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::new(0.0, POWER_UP_FALL_SPEED),
            radius: POWER_UP_RADIUS,
        }
    }

    pub fn bounds(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

impl Identified for PowerUp {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// 1 at birth, only ever decreases
    pub alpha: f32,
    /// Trail particles stay where they were dropped and fade faster
    pub is_trail: bool,
}

impl Particle {
    /// A debris particle flying off in a random direction
    pub fn burst(rng: &mut Pcg32, pos: Vec2, color: u32) -> Self {
        let radius = rng.random::<f32>() * 3.0;
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0 * PARTICLE_MAX_SPEED,
            (rng.random::<f32>() - 0.5) * 2.0 * PARTICLE_MAX_SPEED,
        );
        Self {
            pos,
            vel,
            radius,
            color,
            alpha: 1.0,
            is_trail: false,
        }
    }

    /// A stationary exhaust puff
    pub fn trail(rng: &mut Pcg32, pos: Vec2, color: u32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: rng.random::<f32>() * 2.0,
            color,
            alpha: 1.0,
            is_trail: true,
        }
    }

    pub fn bounds(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// How an enemy died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    Missile,
    Bullet,
    /// Rammed the player (no score awarded)
    Ram,
}

/// Notable things that happened during the last tick, for the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: EntityId },
    EnemyDestroyed { id: EntityId, cause: KillCause },
    PlayerDamaged { amount: u32, hp: u32 },
    PowerUpCollected { kind: PowerUpKind },
    MissileFired { remaining: u32 },
    MissileReloaded { stock: u32 },
    ScoreChanged { score: u64 },
    SessionEnded { final_score: u64 },
}

/// Borrowed view of any live entity, tagged by kind
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Player(&'a Player),
    Projectile(&'a Projectile),
    Missile(&'a Missile),
    Enemy(&'a Enemy),
    PowerUp(&'a PowerUp),
    Particle(&'a Particle),
}

impl EntityRef<'_> {
    pub fn bounds(&self) -> Circle {
        match self {
            EntityRef::Player(p) => p.bounds(),
            EntityRef::Projectile(p) => p.bounds(),
            EntityRef::Missile(m) => m.bounds(),
            EntityRef::Enemy(e) => e.bounds(),
            EntityRef::PowerUp(p) => p.bounds(),
            EntityRef::Particle(p) => p.bounds(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.bounds().center
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub config: SessionConfig,
    pub phase: GamePhase,
    /// Cumulative score, never decreases within a session
    pub score: u64,
    /// Ticks elapsed since session start
    pub frame: u64,
    /// Visual shake magnitude (no gameplay effect)
    pub screen_shake: f32,
    pub player: Player,
    pub projectiles: EntityPool<Projectile>,
    pub missiles: EntityPool<Missile>,
    pub enemies: EntityPool<Enemy>,
    pub power_ups: EntityPool<PowerUp>,
    pub particles: EntityPool<Particle>,
    /// Decorative stars and planets
    pub backdrop: Backdrop,
    /// Gameplay RNG
    pub rng: Pcg32,
    /// Events raised during the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new session with the given seed
    pub fn new(seed: u64, config: SessionConfig) -> Self {
        let backdrop = Backdrop::new(
            Pcg32::new(seed, BACKDROP_STREAM),
            config.viewport,
            config.star_count,
            config.planet_count,
        );
        log::info!(
            "New session: seed={} viewport={}x{}",
            seed,
            config.viewport.width,
            config.viewport.height
        );

        Self {
            seed,
            phase: GamePhase::Playing,
            score: 0,
            frame: 0,
            screen_shake: 0.0,
            player: Player::new(config.viewport.center()),
            projectiles: EntityPool::new(),
            missiles: EntityPool::new(),
            enemies: EntityPool::new(),
            power_ups: EntityPool::new(),
            particles: EntityPool::new(),
            backdrop,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
            config,
        }
    }

    /// Discard everything and start over with the next seed
    pub fn restart(&mut self) {
        let seed = self.seed.wrapping_add(1);
        log::info!("Restarting session (previous score {})", self.score);
        *self = Self::new(seed, self.config.clone());
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Uniform draw in [0, 1) from the gameplay RNG
    pub fn rng_roll(&mut self) -> f32 {
        self.rng.random()
    }

    /// Add `points` to the score
    pub fn award(&mut self, points: u64) {
        self.score += points;
    }

    /// Set the shake magnitude (ignored when shake is disabled)
    pub fn trigger_shake(&mut self, magnitude: f32) {
        if self.config.screen_shake {
            self.screen_shake = magnitude;
        }
    }

    /// Emit `count` debris particles, respecting the particle cap
    pub fn emit_burst(&mut self, pos: Vec2, color: u32, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= self.config.max_particles {
                return;
            }
            let particle = Particle::burst(&mut self.rng, pos, color);
            self.particles.push(particle);
        }
    }

    /// Emit one stationary trail particle, respecting the particle cap
    pub fn emit_trail(&mut self, pos: Vec2, color: u32) {
        if self.particles.len() >= self.config.max_particles {
            return;
        }
        let particle = Particle::trail(&mut self.rng, pos, color);
        self.particles.push(particle);
    }

    /// Every live gameplay entity, in draw order
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.particles
            .iter()
            .map(EntityRef::Particle)
            .chain(self.power_ups.iter().map(EntityRef::PowerUp))
            .chain(self.projectiles.iter().map(EntityRef::Projectile))
            .chain(self.missiles.iter().map(EntityRef::Missile))
            .chain(self.enemies.iter().map(EntityRef::Enemy))
            .chain(std::iter::once(EntityRef::Player(&self.player)))
    }
}

/// PCG stream used by the decorative backdrop so it never shifts gameplay draws
const BACKDROP_STREAM: u64 = 0xb4c6_d20f;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = GameState::new(7, SessionConfig::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.hp, PLAYER_MAX_HP);
        assert_eq!(state.player.missiles, MISSILE_CAPACITY);
        assert_eq!(state.player.pos, state.config.viewport.center());
        assert!(state.enemies.is_empty());
        assert_eq!(state.backdrop.stars.len(), 150);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(7, SessionConfig::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_id_counter_wraps_instead_of_panicking() {
        let mut state = GameState::new(7, SessionConfig::default());
        state.next_id = u32::MAX;
        assert_eq!(state.next_entity_id(), EntityId(u32::MAX));
        assert_eq!(state.next_entity_id(), EntityId(0));
    }

    #[test]
    fn test_particle_cap() {
        let config = SessionConfig {
            max_particles: 5,
            ..Default::default()
        };
        let mut state = GameState::new(1, config);
        state.emit_burst(Vec2::ZERO, 0xffffff, 20);
        assert_eq!(state.particles.len(), 5);
        state.emit_trail(Vec2::ZERO, 0xffffff);
        assert_eq!(state.particles.len(), 5);
    }

    #[test]
    fn test_restart_discards_everything() {
        let mut state = GameState::new(3, SessionConfig::default());
        state.score = 900;
        state.player.hp = 0;
        state.phase = GamePhase::GameOver;
        state.emit_burst(Vec2::ONE, 0xffffff, 4);

        state.restart();
        assert_eq!(state.seed, 4);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.hp, PLAYER_MAX_HP);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_viewport_is_outside() {
        let vp = Viewport::new(100.0, 100.0);
        assert!(!vp.is_outside(Circle::new(Vec2::new(-40.0, 50.0), 3.0), 50.0));
        assert!(vp.is_outside(Circle::new(Vec2::new(-54.0, 50.0), 3.0), 50.0));
        assert!(vp.is_outside(Circle::new(Vec2::new(50.0, 154.0), 3.0), 50.0));
    }

    #[test]
    fn test_power_up_roll() {
        assert_eq!(PowerUpKind::from_roll(0.1), PowerUpKind::Spread);
        assert_eq!(PowerUpKind::from_roll(0.5), PowerUpKind::Rapid);
        assert_eq!(PowerUpKind::from_roll(0.9), PowerUpKind::Shield);
    }

    #[test]
    fn test_entities_cover_every_pool() {
        let mut state = GameState::new(3, SessionConfig::default());
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp::dropped(id, PowerUpKind::Rapid, Vec2::ZERO));
        state.emit_trail(Vec2::ZERO, COLOR_MISSILE);
        // particle + power-up + player
        assert_eq!(state.entities().count(), 3);
        assert!(matches!(state.entities().last(), Some(EntityRef::Player(_))));
    }
}
