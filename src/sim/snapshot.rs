//! Read-only view of a session for the presentation layer
//!
//! Everything a renderer or HUD needs for one frame, already formatted.

use glam::Vec2;
use serde::Serialize;

use super::rect::Rect;
use super::state::{EntityKind, GamePhase, GameState};
use crate::format_clock;

/// Blink half-period of the player sprite while invulnerable; the first
/// half-period after a hit is fully opaque
const BLINK_MS: f32 = 100.0;
const BLINK_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub sprite: &'static str,
    pub pos: Vec2,
    pub bounds: Rect,
    /// Mirror the sprite horizontally
    pub flip_x: bool,
    pub caught: bool,
}

/// End screen text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub title: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub score: u32,
    pub lives: u8,
    pub time_remaining: u32,
    /// `Pontuação: N`
    pub score_text: String,
    /// `Tempo: MM:SS`
    pub clock_text: String,
    /// Last stretch of the countdown (blinking timer)
    pub urgent: bool,
    pub paused: bool,
    pub player: Vec2,
    pub player_alpha: f32,
    pub hook: Vec2,
    pub hook_bounds: Rect,
    /// Start of the fishing line
    pub rod_tip: Vec2,
    pub rod_anim: &'static str,
    pub entities: Vec<EntityView>,
    pub banner: Option<Banner>,
    pub track: &'static str,
}

/// Capture the current frame
pub fn snapshot(state: &GameState) -> Snapshot {
    let blink_phase = (state.invulnerability_elapsed_ms / BLINK_MS) as u32;
    let player_alpha = if state.invulnerable && blink_phase % 2 == 1 {
        BLINK_ALPHA
    } else {
        1.0
    };

    let banner = match (state.end_reason(), state.outcome) {
        (Some(reason), Some(outcome)) => Some(Banner {
            title: reason.title(),
            message: outcome.message(state.score),
        }),
        _ => None,
    };

    Snapshot {
        score: state.score,
        lives: state.lives,
        time_remaining: state.time_remaining,
        score_text: format!("Pontuação: {}", state.score),
        clock_text: format!("Tempo: {}", format_clock(state.time_remaining)),
        urgent: state.is_urgent() && !state.is_ended(),
        paused: state.phase == GamePhase::Paused,
        player: state.player,
        player_alpha,
        hook: state.hook.pos,
        hook_bounds: state.hook.hitbox(),
        rod_tip: state.rod.tip,
        rod_anim: state.rod.anim.key(),
        entities: state
            .entities
            .iter()
            .map(|e| EntityView {
                id: e.id,
                kind: e.kind,
                sprite: e.sprite_key(),
                pos: e.pos,
                bounds: e.bounds(),
                flip_x: e.faces_left(),
                caught: e.caught,
            })
            .collect(),
        banner,
        track: state.bgm_track.key(),
    }
}
