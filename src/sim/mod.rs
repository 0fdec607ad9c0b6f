//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No rendering or platform dependencies

pub mod backdrop;
pub mod collision;
pub mod physics;
pub mod player;
pub mod pool;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use backdrop::{Backdrop, Planet, PlanetKind, Star};
pub use collision::{Circle, CollisionReport, resolve_collisions};
pub use player::{DamageSource, activate_power_up, fire_missile, shoot, take_damage};
pub use pool::{EntityId, EntityPool, Identified, RemovalSet};
pub use snapshot::{SNAPSHOT_VERSION, SnapshotError};
pub use spawn::{DifficultyCurve, EnemyTraits};
pub use state::{
    Enemy, EntityRef, Faction, GameEvent, GamePhase, GameState, KillCause, Missile, Particle,
    Player, PowerUp, PowerUpKind, PowerUpTimers, Projectile, SessionConfig, Viewport,
};
pub use tick::{Aim, TickInput, tick};
