//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Game time comes only from the frame deltas passed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod hook;
pub mod rect;
pub mod scheduler;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{first_enemy_hit, touching_treasure};
pub use hook::{Hook, Rod, RodAnim};
pub use rect::Rect;
pub use scheduler::{Scheduler, TimerKind};
pub use snapshot::{Banner, EntityView, Snapshot, snapshot};
pub use state::{
    EndReason, Entity, EntityKind, GameEvent, GamePhase, GameState, Outcome, SessionConfig,
    Viewport,
};
pub use tick::{TickInput, end_game, tick};
