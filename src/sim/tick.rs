//! Per-frame simulation step
//!
//! One call per rendered frame with the measured delta. Timers fire first,
//! then the hook and rod move, entities swim, and collisions resolve.

use glam::Vec2;

use super::collision::{first_enemy_hit, touching_treasure};
use super::scheduler::TimerKind;
use super::spawn::{advance_entities, fish_spawn_delay, spawn, try_spawn_whale};
use super::state::{EndReason, EntityKind, GameEvent, GamePhase, GameState, Outcome};
use crate::distance;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer/touch position, if it moved
    pub pointer: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Start over (honored only once the session has ended)
    pub restart: bool,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.is_ended() {
        if input.restart {
            *state = state.restarted();
        }
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                log::info!("Paused at {}s", state.time_remaining);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
                log::info!("Resumed");
            }
            GamePhase::Ended(_) => {}
        }
    }

    if state.phase == GamePhase::Paused {
        return;
    }

    let dt_ms = dt as f64 * 1000.0;
    let until = state.scheduler.now() + dt_ms;
    run_timers(state, until);
    if state.is_ended() {
        return;
    }

    update_invulnerability(state, dt_ms as f32);
    update_player(state, input, dt_ms as f32);
    advance_entities(state, dt);
    update_caught_treasure(state);

    if !state.invulnerable
        && let Some((_, kind)) = first_enemy_hit(&state.hook.hitbox(), &state.entities)
    {
        take_damage(state, kind);
    }

    state.normalize_order();
}

/// Fire every timer due by `until`, in fire-time order
fn run_timers(state: &mut GameState, until: f64) {
    while let Some(kind) = state.scheduler.pop_due(until) {
        match kind {
            TimerKind::Countdown => count_down(state),
            TimerKind::FishSpawn => {
                spawn(state, EntityKind::Fish);
                let delay = fish_spawn_delay(state.time_remaining, &state.tuning);
                state.scheduler.once(delay, TimerKind::FishSpawn);
            }
            TimerKind::WhaleSpawn => {
                try_spawn_whale(state);
            }
            TimerKind::TreasureSpawn => {
                spawn(state, EntityKind::Treasure);
            }
        }
        if state.is_ended() {
            return;
        }
    }
    state.scheduler.settle(until);
}

fn count_down(state: &mut GameState) {
    state.time_remaining = state.time_remaining.saturating_sub(1);
    state.events.push(GameEvent::TimeTick {
        remaining: state.time_remaining,
    });

    if state.time_remaining == state.tuning.urgent_seconds {
        state.events.push(GameEvent::HurryUp);
        log::info!("{}s left, fish at full rate", state.time_remaining);
    }
    if state.time_remaining == 0 {
        end_game(state, EndReason::Timeout);
    }
}

fn update_invulnerability(state: &mut GameState, dt_ms: f32) {
    if !state.invulnerable {
        return;
    }
    state.invulnerability_elapsed_ms += dt_ms;
    if state.invulnerability_elapsed_ms >= state.tuning.invulnerability_ms {
        state.invulnerable = false;
        state.invulnerability_elapsed_ms = 0.0;
        log::debug!("Invulnerability over");
    }
}

/// Hook follows the pointer; the rod reacts to how it moved
fn update_player(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if let Some(pointer) = input.pointer {
        state.hook.set_target(pointer);
    }

    let tuning = &state.tuning;
    state.rod.advance_animation(dt_ms, tuning);
    state.hook.update(tuning.hook_smoothing);

    let now = state.scheduler.now();
    if state.rod.track_hook(state.hook.pos.y, tuning)
        && now - state.last_splash_ms >= tuning.splash_cooldown_ms
    {
        state.last_splash_ms = now;
        state.events.push(GameEvent::Splash);
    }

    let to_player = distance(state.hook.pos, state.player);
    if state.rod.check_catch(to_player, tuning.catch_distance) {
        state.events.push(GameEvent::CatchStarted);
    }

    state
        .rod
        .update_tip(state.player, state.viewport.width, &state.tuning);
}

/// Hook a free treasure if the line is empty, then reel the hooked one in
fn update_caught_treasure(state: &mut GameState) {
    if state.caught_treasure.is_none()
        && let Some(id) = touching_treasure(&state.hook.hitbox(), &state.entities)
        && let Some(treasure) = state.entities.iter_mut().find(|e| e.id == id)
    {
        treasure.caught = true;
        state.caught_treasure = Some(id);
        state.events.push(GameEvent::TreasureHooked { id });
        log::debug!("Hooked treasure #{id}");
    }

    let Some(id) = state.caught_treasure else {
        return;
    };
    let Some(idx) = state.entities.iter().position(|e| e.id == id) else {
        state.caught_treasure = None;
        return;
    };

    let anchor = state.hook.pos + Vec2::new(0.0, state.tuning.caught_offset_y);
    state.entities[idx].pos = anchor;
    if distance(anchor, state.player) >= state.tuning.collect_distance {
        return;
    }

    let treasure = state.entities.remove(idx);
    state.score += treasure.value;
    state.caught_treasure = None;
    state.events.push(GameEvent::TreasureCollected {
        id,
        sprite: treasure.sprite_key(),
        value: treasure.value,
    });
    log::info!(
        "Collected {} (+{}), score {}",
        treasure.sprite_key(),
        treasure.value,
        state.score
    );
}

fn take_damage(state: &mut GameState, by: EntityKind) {
    state.lives = state.lives.saturating_sub(1);
    state.invulnerable = true;
    state.invulnerability_elapsed_ms = 0.0;
    state.events.push(GameEvent::Damaged {
        by,
        lives_left: state.lives,
    });
    log::info!("Hit by {}, {} lives left", by.as_str(), state.lives);

    if state.lives == 0 {
        end_game(state, EndReason::LivesDepleted);
    }
}

/// Enter the terminal phase: timers cancelled, sea emptied, outcome decided
pub fn end_game(state: &mut GameState, reason: EndReason) {
    if state.is_ended() {
        return;
    }
    let outcome = Outcome::decide(state.score, state.lives, state.tuning.win_score);
    state.phase = GamePhase::Ended(reason);
    state.outcome = Some(outcome);
    state.scheduler.cancel_all();
    state.entities.clear();
    state.caught_treasure = None;
    state.invulnerable = false;
    state.events.push(GameEvent::Ended { reason, outcome });
    log::info!(
        "Session over ({:?}): {:?}, score {}, lives {}, {}s left",
        reason,
        outcome,
        state.score,
        state.lives,
        state.time_remaining
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::sim::state::{Entity, SessionConfig};
    use proptest::prelude::*;

    fn fresh(seed: u64) -> GameState {
        let mut state = GameState::new(&SessionConfig {
            seed,
            ..Default::default()
        });
        state.drain_events();
        state
    }

    /// Park a motionless entity at `pos`
    fn place(state: &mut GameState, kind: EntityKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.entities.push(Entity {
            id,
            kind,
            variant: 0,
            pos,
            speed: 0.0,
            hitbox: state.tuning.kind(kind).hitbox_size(),
            caught: false,
            value: if kind == EntityKind::Treasure {
                state.tuning.treasure_value
            } else {
                0
            },
        });
        id
    }

    fn idle(state: &mut GameState, frames: usize) {
        for _ in 0..frames {
            tick(state, &TickInput::default(), FRAME_DT);
        }
    }

    #[test]
    fn test_fish_hit_then_invulnerable() {
        let mut state = fresh(1);
        let hook = state.hook.pos;
        place(&mut state, EntityKind::Fish, hook);

        idle(&mut state, 1);
        assert_eq!(state.lives, 2);
        assert!(state.invulnerable);
        assert!(state.drain_events().contains(&GameEvent::Damaged {
            by: EntityKind::Fish,
            lives_left: 2,
        }));

        // Still overlapping a fish, but nothing registers inside the window
        place(&mut state, EntityKind::Fish, hook);
        idle(&mut state, 119);
        assert_eq!(state.lives, 2);
        assert!(state.invulnerable);

        idle(&mut state, 5);
        assert_eq!(state.lives, 1);
    }

    #[test]
    fn test_one_damage_per_frame() {
        let mut state = fresh(2);
        let hook = state.hook.pos;
        place(&mut state, EntityKind::Fish, hook);
        place(&mut state, EntityKind::Whale, hook);
        idle(&mut state, 1);
        assert_eq!(state.lives, 2);
        let damage: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Damaged { .. }))
            .collect();
        assert_eq!(
            damage,
            vec![GameEvent::Damaged {
                by: EntityKind::Fish,
                lives_left: 2
            }]
        );
    }

    #[test]
    fn test_whale_hit() {
        let mut state = fresh(3);
        let hook = state.hook.pos;
        place(&mut state, EntityKind::Whale, hook);
        idle(&mut state, 1);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_countdown_once_per_second() {
        let mut state = fresh(4);
        tick(&mut state, &TickInput::default(), 0.5);
        assert_eq!(state.time_remaining, 180);
        tick(&mut state, &TickInput::default(), 0.5);
        assert_eq!(state.time_remaining, 179);

        // A long frame fires every second it covers
        tick(&mut state, &TickInput::default(), 3.0);
        assert_eq!(state.time_remaining, 176);
    }

    #[test]
    fn test_hurry_up_at_thirty_seconds() {
        let mut state = fresh(5);
        state.time_remaining = 31;
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.time_remaining, 30);
        assert!(state.is_urgent());
        assert!(state.drain_events().contains(&GameEvent::HurryUp));
    }

    #[test]
    fn test_timeout_with_target_score_wins() {
        let mut state = fresh(6);
        state.score = 1000;
        state.time_remaining = 1;
        tick(&mut state, &TickInput::default(), 1.0);

        assert_eq!(state.time_remaining, 0);
        assert_eq!(state.phase, GamePhase::Ended(EndReason::Timeout));
        assert_eq!(state.outcome, Some(Outcome::Won));
        assert!(state.drain_events().contains(&GameEvent::Ended {
            reason: EndReason::Timeout,
            outcome: Outcome::Won,
        }));
    }

    #[test]
    fn test_timeout_short_of_target_loses() {
        let mut state = fresh(7);
        state.score = 950;
        state.time_remaining = 1;
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.outcome, Some(Outcome::LostToTime));
    }

    #[test]
    fn test_last_life_stops_the_clock() {
        let mut state = fresh(8);
        state.lives = 1;
        state.time_remaining = 95;
        let hook = state.hook.pos;
        place(&mut state, EntityKind::Fish, hook);

        idle(&mut state, 1);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::Ended(EndReason::LivesDepleted));
        assert_eq!(state.outcome, Some(Outcome::LostToEnemies));
        assert!(state.scheduler.is_empty());
        assert!(state.entities.is_empty());

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 1.0);
        }
        assert_eq!(state.time_remaining, 95);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_nothing_changes_after_end() {
        let mut state = fresh(9);
        state.score = 300;
        state.time_remaining = 1;
        tick(&mut state, &TickInput::default(), 1.0);
        assert!(state.is_ended());
        state.drain_events();

        let input = TickInput {
            pointer: Some(Vec2::new(100.0, 550.0)),
            pause: true,
            restart: false,
        };
        let hook = state.hook.pos;
        for _ in 0..600 {
            tick(&mut state, &input, FRAME_DT);
        }
        assert!(state.entities.is_empty());
        assert_eq!(state.score, 300);
        assert_eq!(state.hook.pos, hook);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_treasure_caught_and_collected() {
        let mut state = fresh(10);
        let low = Vec2::new(400.0, 500.0);
        state.hook.pos = low;
        state.hook.set_target(low);
        let id = place(&mut state, EntityKind::Treasure, low);

        idle(&mut state, 1);
        assert_eq!(state.caught_treasure, Some(id));
        assert_eq!(state.entity(id).unwrap().pos, low + Vec2::new(0.0, 20.0));
        assert_eq!(state.score, 0);

        let reel_in = TickInput {
            pointer: Some(Vec2::new(400.0, 0.0)),
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &reel_in, FRAME_DT);
            if state.score > 0 {
                break;
            }
        }
        assert_eq!(state.score, 50);
        assert!(state.entity(id).is_none());
        assert!(state.caught_treasure.is_none());
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::TreasureCollected { value: 50, .. }
        )));
    }

    #[test]
    fn test_only_one_treasure_on_the_hook() {
        let mut state = fresh(11);
        let low = Vec2::new(400.0, 500.0);
        state.hook.pos = low;
        state.hook.set_target(low);
        let first = place(&mut state, EntityKind::Treasure, low);
        let second = place(&mut state, EntityKind::Treasure, low);

        idle(&mut state, 3);
        assert_eq!(state.caught_treasure, Some(first));
        assert!(!state.entity(second).unwrap().caught);
        assert_eq!(state.entities.iter().filter(|e| e.caught).count(), 1);
    }

    #[test]
    fn test_treasure_hooked_while_invulnerable() {
        let mut state = fresh(12);
        state.invulnerable = true;
        let hook = state.hook.pos;
        let id = place(&mut state, EntityKind::Treasure, hook + Vec2::new(0.0, 100.0));
        state.hook.pos.y += 100.0;
        state.hook.set_target(state.hook.pos);
        idle(&mut state, 1);
        assert_eq!(state.caught_treasure, Some(id));
    }

    #[test]
    fn test_restart_only_after_end() {
        let mut state = fresh(13);
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, 0.5);
        assert_eq!(state.seed, 13);

        state.time_remaining = 1;
        state.score = 400;
        tick(&mut state, &TickInput::default(), 1.0);
        assert!(state.is_ended());
        let previous_track = state.bgm_track;

        tick(&mut state, &restart, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.time_remaining, 180);
        assert!(state.entities.is_empty());
        assert!(state.outcome.is_none());
        assert_eq!(state.scheduler.now(), 0.0);
        assert_ne!(state.bgm_track, previous_track);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::SessionStarted { .. }]
        ));
    }

    #[test]
    fn test_tick_pause() {
        let mut state = fresh(14);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused: a long wait changes nothing
        let clock = state.scheduler.now();
        tick(&mut state, &TickInput::default(), 5.0);
        assert_eq!(state.time_remaining, 180);
        assert_eq!(state.scheduler.now(), clock);
        assert!(state.entities.is_empty());

        tick(&mut state, &pause, 0.5);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        assert_eq!(&events[..2], &[GameEvent::Paused, GameEvent::Resumed]);
    }

    #[test]
    fn test_spawns_follow_schedule() {
        let mut state = fresh(15);
        // Treasure at 2000ms, first fish at 2500ms
        tick(&mut state, &TickInput::default(), 2.0);
        assert_eq!(state.count(EntityKind::Treasure), 1);
        assert_eq!(state.count(EntityKind::Fish), 0);
        tick(&mut state, &TickInput::default(), 0.5);
        assert_eq!(state.count(EntityKind::Fish), 1);
    }

    #[test]
    fn test_splash_has_cooldown() {
        let mut state = fresh(16);
        let mut splashes = 0;
        // Bob the pointer up and down for one second
        for frame in 0..60 {
            let y = if (frame / 10) % 2 == 0 { 590.0 } else { 300.0 };
            let input = TickInput {
                pointer: Some(Vec2::new(400.0, y)),
                ..Default::default()
            };
            tick(&mut state, &input, FRAME_DT);
            splashes += state
                .drain_events()
                .iter()
                .filter(|e| **e == GameEvent::Splash)
                .count();
        }
        assert_eq!(splashes, 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = fresh(99999);
        let mut b = fresh(99999);
        for frame in 0..1200 {
            let input = TickInput {
                pointer: Some(Vec2::new(400.0 + (frame as f32 * 0.05).sin() * 300.0, 450.0)),
                ..Default::default()
            };
            tick(&mut a, &input, FRAME_DT);
            tick(&mut b, &input, FRAME_DT);
        }
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.score, b.score);
        assert_eq!(a.entities.len(), b.entities.len());
        assert_eq!(a.hook.pos, b.hook.pos);
    }

    proptest! {
        #[test]
        fn prop_session_invariants(
            seed in 0u64..500,
            moves in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0, 0.0f32..0.1), 1..300),
        ) {
            let mut state = fresh(seed);
            let mut last_score = 0;
            for (x, y, dt) in moves {
                let input = TickInput { pointer: Some(Vec2::new(x, y)), ..Default::default() };
                tick(&mut state, &input, dt);

                prop_assert!(state.lives <= 3);
                prop_assert!(state.score >= last_score);
                prop_assert!(state.entities.iter().filter(|e| e.caught).count() <= 1);
                prop_assert!(state.hook.bounds.contains(state.hook.pos));
                if state.is_ended() {
                    prop_assert!(state.entities.is_empty());
                    prop_assert!(state.scheduler.is_empty());
                }
                last_score = state.score;
            }
        }
    }
}
