//! Star Skirmish - a top-down arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, spawning, collisions)
//! - `platform`: Input-state capture and frame pacing for the host
//! - `settings`: Player preferences and difficulty selection

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{DifficultyPreset, QualityPreset, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
///
/// Every value is expressed per tick (one display frame, nominally 1/60 s).
pub mod consts {
    /// Nominal simulation rate
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per display frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default viewport dimensions
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

    /// Player ship
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_MAX_HP: u32 = 100;
    pub const PLAYER_ACCEL: f32 = 0.5;
    pub const PLAYER_MAX_SPEED: f32 = 6.0;
    pub const PLAYER_FRICTION: f32 = 0.94;
    /// Velocity factor applied to the perpendicular component on a wall hit
    pub const WALL_BOUNCE: f32 = -0.5;

    /// Primary weapon
    pub const BULLET_SPEED: f32 = 12.0;
    pub const BULLET_RADIUS: f32 = 3.0;
    pub const FIRE_COOLDOWN: u32 = 15;
    pub const RAPID_FIRE_COOLDOWN: u32 = 5;
    /// Angular offset of the two extra spread shots (radians)
    pub const SPREAD_ANGLE: f32 = 0.2;

    /// Homing missiles
    pub const MISSILE_CAPACITY: u32 = 3;
    pub const MISSILE_RELOAD_TICKS: u32 = 300;
    pub const MISSILE_RADIUS: f32 = 6.0;
    pub const MISSILE_MAX_SPEED: f32 = 10.0;
    pub const MISSILE_ACCEL: f32 = 0.5;
    /// Fraction of the heading error corrected each tick
    pub const MISSILE_TURN_RATE: f32 = 0.1;

    /// Enemies
    pub const ENEMY_BULLET_SPEED: f32 = 5.0;
    /// Edge offset used when placing a new enemy off-screen
    pub const ENEMY_SPAWN_MARGIN: f32 = 30.0;

    /// Power-ups
    pub const POWER_UP_RADIUS: f32 = 12.0;
    pub const POWER_UP_FALL_SPEED: f32 = 2.0;
    pub const POWER_UP_DURATION: u32 = 600;
    pub const POWER_UP_DROP_CHANCE: f32 = 0.15;
    pub const SHIELD_HEAL: u32 = 20;

    /// Particles
    pub const PARTICLE_FRICTION: f32 = 0.95;
    pub const PARTICLE_FADE: f32 = 0.02;
    pub const TRAIL_FADE: f32 = 0.05;
    pub const PARTICLE_MAX_SPEED: f32 = 4.0;

    /// Projectiles further than this outside the viewport are discarded
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Screen shake
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const SHAKE_CUTOFF: f32 = 0.5;
    pub const SHAKE_MISSILE_KILL: f32 = 10.0;
    pub const SHAKE_PLAYER_HIT: f32 = 5.0;
    pub const SHAKE_BULLET_KILL: f32 = 2.0;

    /// Damage
    pub const ENEMY_BULLET_DAMAGE: u32 = 10;
    pub const RAM_DAMAGE: u32 = 20;

    /// Score awards
    pub const SCORE_MISSILE_KILL: u64 = 500;
    pub const SCORE_BULLET_KILL: u64 = 100;
    pub const SCORE_POWER_UP: u64 = 50;

    /// Packed 0xRRGGBB colors carried by particles and projectiles
    pub const COLOR_PLAYER_BULLET: u32 = 0xffffff;
    pub const COLOR_ENEMY_BULLET: u32 = 0xff003c;
    pub const COLOR_MISSILE: u32 = 0xff00ff;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed turn from `from` to `to`, in (-π, π]
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    // normalize_angle is half-open at +π, so the negation is half-open at -π
    -normalize_angle(from - to)
}

/// Unit vector pointing along `theta`
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Bearing from `from` to `to` in radians
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Convert an HSL color (hue in degrees, s/l in 0..=1) to packed 0xRRGGBB
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> u32 {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f32| (((v + m) * 255.0).round().clamp(0.0, 255.0)) as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}
