//! Frame-stepped simulation of the two-player crypt arena
//!
//! All gameplay logic lives here. The module is pure and deterministic:
//! - Fixed timestep only, one [`tick`] per display frame
//! - All randomness flows through the injected RNG
//! - No rendering, input device, or platform dependencies
//!
//! The driver owns a [`GameState`] and the RNG, sets held-input flags on
//! [`InputState`], calls [`tick`], and reads back the entity/particle
//! collections plus [`GameState::metrics`].

pub mod ai;
pub mod collision;
mod combat;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{Contact, Rect, resolve_solid};
pub use level::{generate_boss_arena, generate_level, spawn_random_enemy, start_session};
pub use state::{
    BossPhase, Entity, EntityKind, GamePhase, GameState, InputState, Metrics, Particle, Payload,
    SessionConfig, SessionEvent,
};
pub use tick::tick;
