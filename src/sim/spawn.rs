//! Entity spawning and motion
//!
//! Entities enter from a random side inside a kind-specific band below the
//! player and swim straight across. Fish come faster as the clock runs down.

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, EntityKind, GameEvent, GameState};
use crate::tuning::Tuning;

/// Delay before the next fish, eased from the slowest cadence at the start of
/// the session to the fastest at the urgent threshold
pub fn fish_spawn_delay(time_remaining: u32, tuning: &Tuning) -> f64 {
    let start = tuning.session_seconds as f64;
    let end = tuning.urgent_seconds as f64;
    if start <= end {
        return tuning.fish_min_delay_ms;
    }
    let t = ((time_remaining as f64 - end) / (start - end)).clamp(0.0, 1.0);
    (tuning.fish_min_delay_ms + t * (tuning.fish_max_delay_ms - tuning.fish_min_delay_ms)).round()
}

/// Create an entity of `kind` just off a random screen edge
pub fn spawn(state: &mut GameState, kind: EntityKind) -> u32 {
    let params = state.tuning.kind(kind).clone();
    let width = state.viewport.width;

    let variant = state.rng.random_range(0..kind.variants().len()) as u8;
    let from_left = state.rng.random_bool(0.5);
    let x = if from_left {
        -params.spawn_offset
    } else {
        width + params.spawn_offset
    };

    let top = state.player.y + params.band_below_player;
    let bottom = (state.viewport.height - params.band_above_bottom).max(top);
    let y = state.rng.random_range(top..=bottom);

    let magnitude = state.rng.random_range(params.min_speed..=params.max_speed) as f32;
    let speed = if from_left { magnitude } else { -magnitude };

    let id = state.next_entity_id();
    let value = if kind == EntityKind::Treasure {
        state.tuning.treasure_value
    } else {
        0
    };
    state.entities.push(Entity {
        id,
        kind,
        variant,
        pos: Vec2::new(x, y),
        speed,
        hitbox: params.hitbox_size(),
        caught: false,
        value,
    });
    state.events.push(GameEvent::Spawned { id, kind });
    log::debug!(
        "Spawned {} #{} ({}) at ({:.0}, {:.0}) speed {:.0}",
        kind.as_str(),
        id,
        kind.variants()[variant as usize],
        x,
        y,
        speed
    );
    id
}

/// Whale timer: only some rolls produce a whale
pub fn try_spawn_whale(state: &mut GameState) -> Option<u32> {
    let roll: f64 = state.rng.random();
    (roll < state.tuning.whale_spawn_chance).then(|| spawn(state, EntityKind::Whale))
}

/// Move every free entity and drop the ones that swam off screen.
/// Caught treasures follow the hook instead (see the tick's treasure pass).
pub fn advance_entities(state: &mut GameState, dt: f32) {
    let width = state.viewport.width;
    let tuning = &state.tuning;
    let mut removed = Vec::new();

    state.entities.retain_mut(|entity| {
        if entity.caught {
            return true;
        }
        entity.advance(dt);
        let gone = entity.is_offscreen(width, tuning.kind(entity.kind).despawn_margin);
        if gone {
            removed.push(entity.id);
        }
        !gone
    });

    state
        .events
        .extend(removed.into_iter().map(|id| GameEvent::Despawned { id }));
}
