//! Browser binding
//!
//! The page owns the canvas and the animation-frame loop; it forwards DOM
//! events here and calls `frame` once per animation frame.

use wasm_bindgen::prelude::*;

use super::{FrameClock, InputState};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Star Skirmish starting...");
}

#[wasm_bindgen]
pub struct WebSession {
    state: GameState,
    input: InputState,
    clock: FrameClock,
    /// Events from every tick run since the last `take_events`
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WebSession {
    /// Default settings at the given canvas size, seeded from the clock
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebSession {
        let settings = Settings {
            viewport_width: width,
            viewport_height: height,
            ..Default::default()
        };
        Self::from_settings(&settings)
    }

    /// Build a session from a settings JSON string
    pub fn with_settings(json: &str) -> Result<WebSession, JsError> {
        let settings = Settings::from_json(json)?;
        Ok(Self::from_settings(&settings))
    }

    /// Resume a session from `snapshot` output
    pub fn restore(json: &str) -> Result<WebSession, JsError> {
        Ok(Self {
            state: GameState::from_snapshot(json)?,
            input: InputState::new(),
            clock: FrameClock::new(),
            events: Vec::new(),
        })
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.input.key_up(key)
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.input.pointer_moved(x, y);
    }

    pub fn mouse_down(&mut self, button: i16) {
        self.input.mouse_down(button);
    }

    pub fn mouse_up(&mut self, button: i16) {
        self.input.mouse_up(button);
    }

    /// Window lost focus
    pub fn blur(&mut self) {
        self.input.release_all();
        self.clock.reset();
    }

    /// Run the ticks owed for this animation frame; returns how many ran
    pub fn frame(&mut self, timestamp_ms: f64) -> u32 {
        let steps = self.clock.advance_to(timestamp_ms);
        for _ in 0..steps {
            let input = self.input.snapshot();
            tick(&mut self.state, &input);
            self.events.extend(self.state.events.drain(..));
        }
        steps
    }

    pub fn restart(&mut self) {
        self.state.restart();
        self.input.release_all();
        self.clock.reset();
        self.events.clear();
    }

    /// Events since the last call, as a JSON array
    pub fn take_events(&mut self) -> Result<String, JsError> {
        let json = serde_json::to_string(&self.events)?;
        self.events.clear();
        Ok(json)
    }

    /// Full session state as JSON
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.state.to_snapshot()?)
    }

    // === HUD ===

    pub fn score(&self) -> f64 {
        self.state.score as f64
    }

    pub fn health_percent(&self) -> f32 {
        self.state.player.health_percent()
    }

    pub fn missiles(&self) -> u32 {
        self.state.player.missiles
    }

    pub fn screen_shake(&self) -> f32 {
        self.state.screen_shake
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase == GamePhase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }
}

impl WebSession {
    fn from_settings(settings: &Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        Self {
            state: GameState::new(seed, settings.session_config()),
            input: InputState::new(),
            clock: FrameClock::new(),
            events: Vec::new(),
        }
    }
}
