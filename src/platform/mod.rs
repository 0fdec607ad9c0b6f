//! Platform abstraction layer
//!
//! Event handlers write into an `InputState`; the frame loop turns it into one
//! `TickInput` per simulation step and drives the steps with a `FrameClock`.
//! Nothing here touches gameplay state directly.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{Aim, TickInput};

/// Longest frame delta the clock will try to simulate (seconds)
pub const MAX_FRAME_DT: f32 = 0.1;

/// Mouse buttons as reported by DOM events
pub const MOUSE_PRIMARY: i16 = 0;
pub const MOUSE_SECONDARY: i16 = 2;

/// Live input, written by event handlers and read once per tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    space: bool,
    mouse_primary: bool,
    pointer: Option<Vec2>,
    move_stick: Option<Vec2>,
    aim_stick: Option<Vec2>,
    // Edges, cleared by `snapshot`
    primary_tap: bool,
    missile_requested: bool,
    pause_requested: bool,
    /// Let the autopilot play
    pub idle_mode: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for keys the game doesn't use
    pub fn key_down(&mut self, key: &str) -> bool {
        self.set_key(key, true)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: &str, pressed: bool) -> bool {
        let slot = match key {
            "ArrowUp" => &mut self.up,
            "ArrowDown" => &mut self.down,
            "ArrowLeft" => &mut self.left,
            "ArrowRight" => &mut self.right,
            " " => &mut self.space,
            _ => match key.to_lowercase().as_str() {
                "w" => &mut self.up,
                "s" => &mut self.down,
                "a" => &mut self.left,
                "d" => &mut self.right,
                "p" | "escape" => {
                    if pressed {
                        self.pause_requested = true;
                    }
                    return true;
                }
                "i" => {
                    if pressed {
                        self.idle_mode = !self.idle_mode;
                        log::info!("Idle mode: {}", self.idle_mode);
                    }
                    return true;
                }
                _ => return false,
            },
        };
        *slot = pressed;
        true
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
    }

    /// Primary press fires on the next tick even if released before it runs
    pub fn mouse_down(&mut self, button: i16) {
        match button {
            MOUSE_PRIMARY => {
                self.mouse_primary = true;
                self.primary_tap = true;
            }
            MOUSE_SECONDARY => self.missile_requested = true,
            _ => {}
        }
    }

    pub fn mouse_up(&mut self, button: i16) {
        if button == MOUSE_PRIMARY {
            self.mouse_primary = false;
        }
    }

    /// Analog movement; `None` when the stick is released
    pub fn set_move_stick(&mut self, stick: Option<Vec2>) {
        self.move_stick = stick;
    }

    /// Analog aim; overrides the pointer while deflected
    pub fn set_aim_stick(&mut self, stick: Option<Vec2>) {
        self.aim_stick = stick;
    }

    pub fn request_missile(&mut self) {
        self.missile_requested = true;
    }

    pub fn request_pause(&mut self) {
        self.pause_requested = true;
    }

    /// Drop held buttons, e.g. when the page loses focus
    pub fn release_all(&mut self) {
        let idle_mode = self.idle_mode;
        let pointer = self.pointer;
        *self = Self {
            idle_mode,
            pointer,
            ..Self::default()
        };
    }

    /// Input for the next tick; consumes one-shot presses
    pub fn snapshot(&mut self) -> TickInput {
        let aim = match (self.aim_stick, self.pointer) {
            (Some(stick), _) => Some(Aim::Stick(stick)),
            (None, Some(pointer)) => Some(Aim::Pointer(pointer)),
            (None, None) => None,
        };
        let input = TickInput {
            move_up: self.up,
            move_down: self.down,
            move_left: self.left,
            move_right: self.right,
            move_stick: self.move_stick,
            aim,
            fire_primary: self.space || self.mouse_primary || self.primary_tap,
            fire_missile: self.missile_requested,
            pause: self.pause_requested,
            idle_mode: self.idle_mode,
        };
        self.primary_tap = false;
        self.missile_requested = false;
        self.pause_requested = false;
        input
    }
}

/// Fixed-step accumulator: how many simulation ticks a display frame owes
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` seconds and return the number of ticks to run now
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        // Drop backlog we could not catch up on
        if self.accumulator >= SIM_DT {
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Like `advance`, from an animation-frame timestamp in milliseconds
    pub fn advance_to(&mut self, timestamp_ms: f64) -> u32 {
        let dt = match self.last_ms {
            Some(last) => ((timestamp_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_ms = Some(timestamp_ms);
        self.advance(dt)
    }

    /// Forget timing history (after a pause or restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }

    /// Fraction of a tick carried into the next frame
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}
