//! Pesca Braba - a timed catch-and-avoid fishing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (hook, entities, collisions, timers, game state)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (volume, mute, debug hitboxes)
//! - `audio`: Logical sound cues and background track selection

pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{BgmTrack, SoundCue};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame step used by the headless runner and tests (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta fed to the simulation (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Viewport used when the host does not report one
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 800.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Format whole seconds as `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
