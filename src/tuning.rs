//! Data-driven game balance
//!
//! Every number the simulation uses lives here so a level designer can
//! override it with a JSON file. Missing fields fall back to the defaults, at
//! any depth: a sheet may override a single field of one entity kind.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sim::EntityKind;

/// Per-kind spawn and movement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindTuning {
    /// Horizontal speed range in px/s (inclusive, whole pixels)
    pub min_speed: u32,
    pub max_speed: u32,
    /// How far outside the screen edge the entity appears
    pub spawn_offset: f32,
    /// How far past the far edge the entity travels before removal
    pub despawn_margin: f32,
    /// Spawn band top, measured below the player anchor
    pub band_below_player: f32,
    /// Spawn band bottom, measured up from the screen bottom
    pub band_above_bottom: f32,
    /// Sprite size in px
    pub sprite_size: Vec2,
    /// Hitbox size as a fraction of the sprite size
    pub hitbox_scale: f32,
}

impl KindTuning {
    /// Hitbox dimensions derived from the sprite size
    pub fn hitbox_size(&self) -> Vec2 {
        self.sprite_size * self.hitbox_scale
    }
}

/// Rod animation clip lengths (frames at a shared frame rate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RodAnimTuning {
    pub frame_rate: f32,
    pub lowering_frames: u32,
    pub raising_frames: u32,
    pub catch_frames: u32,
}

impl Default for RodAnimTuning {
    fn default() -> Self {
        Self {
            frame_rate: 15.0,
            lowering_frames: 4,
            raising_frames: 4,
            catch_frames: 8,
        }
    }
}

/// Complete balance sheet for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session ===
    pub starting_lives: u8,
    /// Countdown start (seconds)
    pub session_seconds: u32,
    /// Remaining time at which fish spawn at full rate and the timer blinks
    pub urgent_seconds: u32,
    /// Score needed (with lives left) to win
    pub win_score: u32,
    /// Points per collected treasure
    pub treasure_value: u32,
    pub invulnerability_ms: f32,

    // === Scheduling (ms) ===
    pub countdown_interval_ms: f64,
    pub treasure_interval_ms: f64,
    pub whale_interval_ms: f64,
    /// Chance a scheduled whale actually appears
    pub whale_spawn_chance: f64,
    pub fish_min_delay_ms: f64,
    pub fish_max_delay_ms: f64,

    // === Entities ===
    pub fish: KindTuning,
    pub whale: KindTuning,
    pub treasure: KindTuning,

    // === Player / hook ===
    /// Player anchor height as a fraction of the viewport height
    pub player_anchor_y: f32,
    pub hook_size: f32,
    /// Left/right/bottom movement margin
    pub bounds_margin: f32,
    /// Movement top, measured below the player anchor
    pub bounds_below_player: f32,
    /// Per-frame lerp factor toward the pointer
    pub hook_smoothing: f32,
    /// Weight of the newest vertical delta in the rod's smoothed delta
    pub rod_delta_blend: f32,
    /// Smoothed delta below which the rod idles
    pub rod_dead_zone: f32,
    /// Per-frame lerp factor of the rod tip toward its pose
    pub rod_tip_smoothing: f32,
    pub rod_anim: RodAnimTuning,
    /// Hook-to-player distance that plays the catch animation
    pub catch_distance: f32,
    /// Treasure-to-player distance that banks a caught treasure
    pub collect_distance: f32,
    /// Caught treasure hangs this far below the hook
    pub caught_offset_y: f32,
    pub splash_cooldown_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            session_seconds: 180,
            urgent_seconds: 30,
            win_score: 1000,
            treasure_value: 50,
            invulnerability_ms: 2000.0,

            countdown_interval_ms: 1000.0,
            treasure_interval_ms: 2000.0,
            whale_interval_ms: 5000.0,
            whale_spawn_chance: 0.2,
            fish_min_delay_ms: 900.0,
            fish_max_delay_ms: 2500.0,

            fish: KindTuning {
                min_speed: 50,
                max_speed: 100,
                spawn_offset: 20.0,
                despawn_margin: 100.0,
                band_below_player: 100.0,
                band_above_bottom: 50.0,
                sprite_size: Vec2::new(32.0, 16.0),
                hitbox_scale: 1.0,
            },
            whale: KindTuning {
                min_speed: 20,
                max_speed: 40,
                spawn_offset: 50.0,
                despawn_margin: 150.0,
                band_below_player: 150.0,
                band_above_bottom: 80.0,
                sprite_size: Vec2::new(64.0, 64.0),
                hitbox_scale: 1.0,
            },
            treasure: KindTuning {
                min_speed: 30,
                max_speed: 60,
                spawn_offset: 30.0,
                despawn_margin: 100.0,
                band_below_player: 120.0,
                band_above_bottom: 70.0,
                sprite_size: Vec2::new(32.0, 32.0),
                hitbox_scale: 0.8,
            },

            player_anchor_y: 0.4,
            hook_size: 15.0,
            bounds_margin: 10.0,
            bounds_below_player: 60.0,
            hook_smoothing: 0.10,
            rod_delta_blend: 0.3,
            rod_dead_zone: 2.5,
            rod_tip_smoothing: 0.90,
            rod_anim: RodAnimTuning::default(),
            catch_distance: 80.0,
            collect_distance: 100.0,
            caught_offset_y: 20.0,
            splash_cooldown_ms: 1000.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning sheet; absent fields keep their defaults, including
    /// fields inside the per-kind and rod animation blocks
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let overrides: Value = serde_json::from_str(json)?;
        let mut sheet = serde_json::to_value(Self::default())?;
        merge_json(&mut sheet, overrides);
        serde_json::from_value(sheet)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parameters for one entity kind
    pub fn kind(&self, kind: EntityKind) -> &KindTuning {
        match kind {
            EntityKind::Fish => &self.fish,
            EntityKind::Whale => &self.whale,
            EntityKind::Treasure => &self.treasure,
        }
    }

    /// Check the sheet for values the simulation cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.starting_lives == 0 {
            return Err("starting_lives must be at least 1".into());
        }
        if self.session_seconds <= self.urgent_seconds {
            return Err(format!(
                "session_seconds ({}) must exceed urgent_seconds ({})",
                self.session_seconds, self.urgent_seconds
            ));
        }
        for (name, interval) in [
            ("countdown_interval_ms", self.countdown_interval_ms),
            ("treasure_interval_ms", self.treasure_interval_ms),
            ("whale_interval_ms", self.whale_interval_ms),
            ("fish_min_delay_ms", self.fish_min_delay_ms),
        ] {
            if interval <= 0.0 {
                return Err(format!("{name} must be positive"));
            }
        }
        if self.fish_min_delay_ms > self.fish_max_delay_ms {
            return Err("fish_min_delay_ms must not exceed fish_max_delay_ms".into());
        }
        if !(0.0..=1.0).contains(&self.whale_spawn_chance) {
            return Err("whale_spawn_chance must be within 0..=1".into());
        }
        for (name, factor) in [
            ("hook_smoothing", self.hook_smoothing),
            ("rod_delta_blend", self.rod_delta_blend),
            ("rod_tip_smoothing", self.rod_tip_smoothing),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(format!("{name} must be within (0, 1]"));
            }
        }
        if self.rod_anim.frame_rate <= 0.0 {
            return Err("rod_anim.frame_rate must be positive".into());
        }
        for kind in EntityKind::ALL {
            let k = self.kind(kind);
            if k.min_speed > k.max_speed {
                return Err(format!("{}: min_speed exceeds max_speed", kind.as_str()));
            }
            if k.hitbox_scale <= 0.0 {
                return Err(format!("{}: hitbox_scale must be positive", kind.as_str()));
            }
        }
        Ok(())
    }
}

/// Overlay `overrides` onto `base`, recursing into objects
fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "win_score": 500, "starting_lives": 5 }"#).unwrap();
        assert_eq!(tuning.win_score, 500);
        assert_eq!(tuning.starting_lives, 5);
        assert_eq!(tuning.session_seconds, 180);
        assert_eq!(tuning.fish.max_speed, 100);
    }

    #[test]
    fn test_partial_kind_block_keeps_kind_defaults() {
        let tuning = Tuning::from_json(r#"{ "fish": { "max_speed": 80 } }"#).unwrap();
        assert_eq!(tuning.fish.max_speed, 80);
        assert_eq!(tuning.fish.min_speed, 50);
        assert_eq!(tuning.fish.despawn_margin, 100.0);

        // Whale block keeps whale numbers, not fish ones
        let tuning = Tuning::from_json(r#"{ "whale": { "hitbox_scale": 0.5 } }"#).unwrap();
        assert_eq!(tuning.whale.hitbox_scale, 0.5);
        assert_eq!(tuning.whale.despawn_margin, 150.0);
        assert_eq!(tuning.whale.sprite_size, Vec2::new(64.0, 64.0));
        assert_eq!(tuning.fish, Tuning::default().fish);
    }

    #[test]
    fn test_partial_rod_anim_block() {
        let tuning = Tuning::from_json(r#"{ "rod_anim": { "frame_rate": 30.0 } }"#).unwrap();
        assert_eq!(tuning.rod_anim.frame_rate, 30.0);
        assert_eq!(tuning.rod_anim.lowering_frames, 4);
        assert_eq!(tuning.rod_anim.catch_frames, 8);

        let direct: RodAnimTuning = serde_json::from_str(r#"{ "catch_frames": 10 }"#).unwrap();
        assert_eq!(direct.frame_rate, 15.0);
        assert_eq!(direct.catch_frames, 10);
    }

    #[test]
    fn test_malformed_sheet_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
        assert!(Tuning::from_json(r#"{ "fish": { "max_speed": "fast" } }"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut tuning = Tuning::default();
        tuning.whale_spawn_chance = 1.5;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.fish_min_delay_ms = 3000.0;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.treasure.min_speed = 90;
        assert!(tuning.validate().unwrap_err().contains("treasure"));
    }

    #[test]
    fn test_treasure_hitbox_is_scaled() {
        let tuning = Tuning::default();
        let size = tuning.treasure.hitbox_size();
        assert!((size.x - 25.6).abs() < 1e-4);
        assert_eq!(tuning.fish.hitbox_size(), tuning.fish.sprite_size);
    }
}
