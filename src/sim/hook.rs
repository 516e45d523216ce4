//! The player's hook and fishing rod
//!
//! The hook chases the pointer with per-frame exponential smoothing inside a
//! movement box below the player. The rod derives its animation from how the
//! hook moves vertically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::tuning::Tuning;

/// The hook (fishing lure) the player steers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hook {
    /// Smoothed position
    pub pos: Vec2,
    /// Latest pointer position (unclamped)
    pub target: Vec2,
    /// Region the hook may move in
    pub bounds: Rect,
    /// Hitbox edge length
    pub size: f32,
}

impl Hook {
    pub fn new(pos: Vec2, bounds: Rect, size: f32) -> Self {
        Self {
            pos,
            target: pos,
            bounds,
            size,
        }
    }

    /// Movement box for a viewport: screen margins left/right/bottom, top just
    /// below the player
    pub fn movement_bounds(viewport: Vec2, player: Vec2, tuning: &Tuning) -> Rect {
        let margin = tuning.bounds_margin;
        Rect::new(
            Vec2::new(margin, player.y + tuning.bounds_below_player),
            Vec2::new(viewport.x - margin, viewport.y - margin),
        )
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Step toward the clamped target by `smoothing` of the remaining gap
    pub fn update(&mut self, smoothing: f32) {
        let goal = self.bounds.clamp_point(self.target);
        self.pos = self.pos.lerp(goal, smoothing);
    }

    pub fn hitbox(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(self.size))
    }
}

/// Fisherman animation clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RodAnim {
    #[default]
    Idle,
    Lowering,
    Raising,
    Catching,
}

impl RodAnim {
    /// Sprite animation key
    pub fn key(&self) -> &'static str {
        match self {
            RodAnim::Idle => "idle",
            RodAnim::Lowering => "rod_down",
            RodAnim::Raising => "rod_up",
            RodAnim::Catching => "catch",
        }
    }

    /// Clip length in ms; idle is a single held frame
    pub fn duration_ms(&self, tuning: &Tuning) -> f32 {
        let anim = &tuning.rod_anim;
        let frames = match self {
            RodAnim::Idle => 1,
            RodAnim::Lowering => anim.lowering_frames,
            RodAnim::Raising => anim.raising_frames,
            RodAnim::Catching => anim.catch_frames,
        };
        frames as f32 * 1000.0 / anim.frame_rate
    }
}

/// Rod state derived from hook motion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rod {
    pub anim: RodAnim,
    /// Time spent in the current clip
    pub anim_elapsed_ms: f32,
    /// Catch clip is playing; vertical tracking is suspended
    pub catching: bool,
    /// Catch already fired for this approach; re-arms once the hook leaves
    pub catch_triggered: bool,
    /// Blended vertical hook delta
    pub smooth_delta_y: f32,
    last_hook_y: Option<f32>,
    /// Smoothed rod tip, where the fishing line starts
    pub tip: Vec2,
}

impl Rod {
    pub fn new(player: Vec2) -> Self {
        Self {
            anim: RodAnim::Idle,
            anim_elapsed_ms: 0.0,
            catching: false,
            catch_triggered: false,
            smooth_delta_y: 0.0,
            last_hook_y: None,
            tip: player,
        }
    }

    fn play(&mut self, anim: RodAnim) {
        self.anim = anim;
        self.anim_elapsed_ms = 0.0;
    }

    /// Run the current clip; finished clips fall back to idle
    pub fn advance_animation(&mut self, dt_ms: f32, tuning: &Tuning) {
        if self.anim == RodAnim::Idle {
            return;
        }
        self.anim_elapsed_ms += dt_ms;
        if self.anim_elapsed_ms < self.anim.duration_ms(tuning) {
            return;
        }
        match self.anim {
            RodAnim::Catching => {
                self.catching = false;
                self.play(RodAnim::Idle);
            }
            RodAnim::Lowering | RodAnim::Raising if !self.catching => self.play(RodAnim::Idle),
            _ => {}
        }
    }

    /// Feed this frame's hook height. Returns true when the rod starts lowering.
    pub fn track_hook(&mut self, hook_y: f32, tuning: &Tuning) -> bool {
        let mut started_lowering = false;
        if let Some(last_y) = self.last_hook_y
            && !self.catching
        {
            let delta = hook_y - last_y;
            let blend = tuning.rod_delta_blend;
            self.smooth_delta_y = self.smooth_delta_y * (1.0 - blend) + delta * blend;

            let dead_zone = tuning.rod_dead_zone;
            if self.smooth_delta_y > dead_zone && self.anim != RodAnim::Lowering {
                self.play(RodAnim::Lowering);
                started_lowering = true;
            } else if self.smooth_delta_y < -dead_zone && self.anim != RodAnim::Raising {
                self.play(RodAnim::Raising);
            } else if self.smooth_delta_y.abs() <= dead_zone && self.anim != RodAnim::Idle {
                self.play(RodAnim::Idle);
            }
        }
        self.last_hook_y = Some(hook_y);
        started_lowering
    }

    /// One-shot catch trigger. Returns true when the catch clip starts.
    pub fn check_catch(&mut self, hook_to_player: f32, catch_distance: f32) -> bool {
        let mut started = false;
        if hook_to_player < catch_distance
            && !self.catch_triggered
            && !self.catching
            && self.anim != RodAnim::Catching
        {
            self.catching = true;
            self.catch_triggered = true;
            self.play(RodAnim::Catching);
            started = true;
        }
        if hook_to_player >= catch_distance && self.catch_triggered && !self.catching {
            self.catch_triggered = false;
        }
        started
    }

    /// Ease the rod tip toward the pose of the current clip
    pub fn update_tip(&mut self, player: Vec2, viewport_width: f32, tuning: &Tuning) {
        let scale = (viewport_width / 600.0) * (viewport_width / 800.0);
        let offset = match self.anim {
            RodAnim::Idle => Vec2::new(7.0, -47.0),
            RodAnim::Lowering | RodAnim::Raising | RodAnim::Catching => Vec2::new(40.0, 5.0),
        };
        let pose = player + offset * scale;
        self.tip = self.tip.lerp(pose, tuning.rod_tip_smoothing);
    }
}
