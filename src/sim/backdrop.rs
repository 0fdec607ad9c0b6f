//! Decorative starfield and planets
//!
//! Purely cosmetic. The backdrop owns its own RNG stream so that however many
//! stars or planets are configured, gameplay draws are unaffected.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Viewport;

/// Placement attempts before a planet settles for an overlapping spot
const PLANET_PLACEMENT_ATTEMPTS: u32 = 50;
/// Minimum gap kept between planets
const PLANET_BUFFER: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetKind {
    GasGiant,
    Ice,
    Terrestrial,
}

/// A twinkling background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    /// 1 (near) to 4 (far)
    pub depth: f32,
    pub radius: f32,
    pub base_alpha: f32,
    pub alpha: f32,
    /// Downward drift per tick
    pub speed: f32,
    pub twinkle_speed: f32,
    pub twinkle_dir: f32,
    pub color: u32,
}

impl Star {
    fn spawn(rng: &mut Pcg32, width: f32) -> Self {
        let depth = rng.random::<f32>() * 3.0 + 1.0;
        let base_alpha = rng.random::<f32>() * 0.5 + 0.3;
        let radius = rng.random::<f32>() * 1.5 / (depth * 0.5);
        let speed = (rng.random::<f32>() * 0.5 + 0.1) / (depth * 0.5);
        let twinkle_speed = rng.random::<f32>() * 0.05 + 0.01;
        let tint = rng.random::<f32>();
        let color = if tint > 0.8 {
            0xcceeff
        } else if tint < 0.2 {
            0xffffee
        } else {
            0xffffff
        };
        Self {
            pos: Vec2::new(rng.random::<f32>() * width, 0.0),
            depth,
            radius,
            base_alpha,
            alpha: base_alpha,
            speed,
            twinkle_speed,
            twinkle_dir: 1.0,
            color,
        }
    }

    fn update(&mut self, rng: &mut Pcg32, viewport: Viewport) {
        self.alpha += self.twinkle_speed * self.twinkle_dir;
        if self.alpha > self.base_alpha + 0.2 || self.alpha < self.base_alpha - 0.2 {
            self.twinkle_dir = -self.twinkle_dir;
        }

        self.pos.y += self.speed;
        if self.pos.y > viewport.height {
            *self = Star::spawn(rng, viewport.width);
        }
    }
}

/// A slowly drifting planet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub kind: PlanetKind,
    /// Base hue in degrees
    pub hue: f32,
    pub has_ring: bool,
}

impl Planet {
    fn roll(rng: &mut Pcg32, pos: Vec2, radius: f32) -> Self {
        let speed = rng.random::<f32>() * 0.1 + 0.02;
        let roll = rng.random::<f32>();
        let (kind, hue, has_ring) = if roll < 0.4 {
            (PlanetKind::GasGiant, rng.random::<f32>() * 40.0 + 10.0, rng.random::<f32>() > 0.4)
        } else if roll < 0.7 {
            (PlanetKind::Ice, rng.random::<f32>() * 40.0 + 180.0, rng.random::<f32>() > 0.8)
        } else {
            (PlanetKind::Terrestrial, rng.random::<f32>() * 60.0 + 90.0, false)
        };
        Self {
            pos,
            radius,
            speed,
            kind,
            hue,
            has_ring,
        }
    }

    fn bounds_clear(pos: Vec2, radius: f32, others: &[Planet]) -> bool {
        others
            .iter()
            .all(|o| pos.distance(o.pos) >= radius + o.radius + PLANET_BUFFER)
    }
}

/// Stars and planets behind the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backdrop {
    pub stars: Vec<Star>,
    pub planets: Vec<Planet>,
    viewport: Viewport,
    rng: Pcg32,
}

impl Backdrop {
    pub fn new(mut rng: Pcg32, viewport: Viewport, star_count: usize, planet_count: usize) -> Self {
        let stars = (0..star_count)
            .map(|_| {
                let mut star = Star::spawn(&mut rng, viewport.width);
                star.pos.y = rng.random::<f32>() * viewport.height;
                star
            })
            .collect();

        let mut backdrop = Self {
            stars,
            planets: Vec::with_capacity(planet_count),
            viewport,
            rng,
        };

        // All but the last start on screen; the last waits one screen above
        for i in 0..planet_count {
            let y = if i + 1 == planet_count && planet_count > 1 {
                backdrop.rng.random::<f32>() * viewport.height - viewport.height
            } else {
                backdrop.rng.random::<f32>() * viewport.height
            };
            let planet = backdrop.place_planet(Some(y), None);
            backdrop.planets.push(planet);
        }
        backdrop
    }

    /// Roll a planet, retrying x (and y, when not pinned) to keep clear of the others
    fn place_planet(&mut self, y: Option<f32>, skip: Option<usize>) -> Planet {
        let radius = self.rng.random::<f32>() * 50.0 + 30.0;
        let span = (self.viewport.width - radius * 2.0).max(0.0);
        let others: Vec<Planet> = self
            .planets
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, p)| p.clone())
            .collect();

        let mut pos = Vec2::ZERO;
        for _ in 0..PLANET_PLACEMENT_ATTEMPTS {
            pos = Vec2::new(
                self.rng.random::<f32>() * span + radius,
                y.unwrap_or(-radius - PLANET_BUFFER),
            );
            if y.is_some() || Planet::bounds_clear(pos, radius, &others) {
                break;
            }
        }
        Planet::roll(&mut self.rng, pos, radius)
    }

    /// Drift everything down one tick, recycling what falls off the bottom
    pub fn update(&mut self) {
        let viewport = self.viewport;
        for star in &mut self.stars {
            star.update(&mut self.rng, viewport);
        }

        for i in 0..self.planets.len() {
            let planet = &mut self.planets[i];
            planet.pos.y += planet.speed;
            if planet.pos.y > viewport.height + planet.radius + PLANET_BUFFER {
                let replacement = self.place_planet(None, Some(i));
                self.planets[i] = replacement;
            }
        }
    }
}
