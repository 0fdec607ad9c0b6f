//! Fixed-step session tick
//!
//! Core game loop that advances the session by one display frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionReport, resolve_collisions};
use super::physics::{decay_shake, nearest_enemy, step_world};
use super::player::update_player;
use super::spawn::maybe_spawn;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Where the player is aiming
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Aim {
    /// Screen-space pointer position
    Pointer(Vec2),
    /// Analog stick deflection
    Stick(Vec2),
}

/// Input snapshot for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_up: bool,
    pub move_down: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Analog movement, clamped to the unit circle
    pub move_stick: Option<Vec2>,
    pub aim: Option<Aim>,
    /// Primary weapon held
    pub fire_primary: bool,
    /// Missile requested this tick (edge, not level)
    pub fire_missile: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Enemies closer than this make the autopilot back off
const AUTOPILOT_PANIC_RADIUS: f32 = 150.0;

/// Advance the session by one tick
///
/// Order: shake decay, backdrop, player, other entities, spawning, collisions,
/// end check. Returns the collision tally for the tick.
pub fn tick(state: &mut GameState, input: &TickInput) -> CollisionReport {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at frame {}", state.frame);
                return CollisionReport::default();
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed at frame {}", state.frame);
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return CollisionReport::default();
    }

    let input = if input.idle_mode {
        autopilot(state, input)
    } else {
        input.clone()
    };

    state.frame += 1;
    state.screen_shake = decay_shake(state.screen_shake);
    state.backdrop.update();

    let score_before = state.score;

    update_player(state, &input);
    step_world(state);
    maybe_spawn(state);
    let report = resolve_collisions(state);

    if state.score != score_before {
        state.events.push(GameEvent::ScoreChanged { score: state.score });
    }

    if state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::SessionEnded {
            final_score: state.score,
        });
        log::info!(
            "Session over after {} frames, final score {}",
            state.frame,
            state.score
        );
    }

    report
}

/// Demo-mode input: aim at the nearest enemy, keep firing, back away from
/// anything too close, and spend missiles when the screen gets busy
fn autopilot(state: &GameState, base: &TickInput) -> TickInput {
    let mut input = TickInput {
        idle_mode: true,
        pause: base.pause,
        ..Default::default()
    };
    let me = state.player.pos;

    let Some(target) = nearest_enemy(&state.enemies, me).and_then(|id| state.enemies.get(id))
    else {
        // Drift back toward the middle while nothing is around
        let home = state.config.viewport.center() - me;
        if home.length() > 50.0 {
            input.move_stick = Some(home.normalize_or_zero() * 0.5);
        }
        return input;
    };

    input.aim = Some(Aim::Pointer(target.pos));
    input.fire_primary = true;

    let away = me - target.pos;
    if away.length() < AUTOPILOT_PANIC_RADIUS {
        input.move_stick = Some(away.normalize_or_zero());
    }

    input.fire_missile = state.enemies.len() >= 2 && state.player.missiles == MISSILE_CAPACITY;
    input
}
