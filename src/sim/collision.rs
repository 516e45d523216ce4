//! Hook-versus-entity collision queries
//!
//! Every entity carries its own hitbox, so these are plain box overlaps
//! against the hook. Queries only look; the tick applies the consequences.

use super::rect::Rect;
use super::state::{Entity, EntityKind};

/// First enemy touching the hook. Fish are checked before whales, each in id
/// order; at most one hit is reported per query.
pub fn first_enemy_hit(hook: &Rect, entities: &[Entity]) -> Option<(u32, EntityKind)> {
    EntityKind::ALL
        .into_iter()
        .filter(EntityKind::is_enemy)
        .find_map(|kind| {
            entities
                .iter()
                .filter(|e| e.kind == kind)
                .find(|e| hook.overlaps(&e.bounds()))
                .map(|e| (e.id, e.kind))
        })
}

/// First free treasure touching the hook, in id order
pub fn touching_treasure(hook: &Rect, entities: &[Entity]) -> Option<u32> {
    entities
        .iter()
        .filter(|e| e.kind == EntityKind::Treasure && !e.caught)
        .find(|e| hook.overlaps(&e.bounds()))
        .map(|e| e.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn entity(id: u32, kind: EntityKind, x: f32, y: f32) -> Entity {
        Entity {
            id,
            kind,
            variant: 0,
            pos: Vec2::new(x, y),
            speed: 50.0,
            hitbox: Vec2::new(32.0, 16.0),
            caught: false,
            value: if kind == EntityKind::Treasure { 50 } else { 0 },
        }
    }

    fn hook_at(x: f32, y: f32) -> Rect {
        Rect::from_center(Vec2::new(x, y), Vec2::splat(15.0))
    }

    #[test]
    fn test_no_hit_when_clear() {
        let entities = vec![entity(1, EntityKind::Fish, 100.0, 400.0)];
        assert!(first_enemy_hit(&hook_at(400.0, 400.0), &entities).is_none());
    }

    #[test]
    fn test_fish_checked_before_whales() {
        let entities = vec![
            entity(1, EntityKind::Whale, 400.0, 400.0),
            entity(2, EntityKind::Fish, 405.0, 400.0),
        ];
        assert_eq!(
            first_enemy_hit(&hook_at(400.0, 400.0), &entities),
            Some((2, EntityKind::Fish))
        );
    }

    #[test]
    fn test_whale_hit() {
        let entities = vec![
            entity(1, EntityKind::Fish, 100.0, 400.0),
            entity(2, EntityKind::Whale, 400.0, 405.0),
        ];
        assert_eq!(
            first_enemy_hit(&hook_at(400.0, 400.0), &entities),
            Some((2, EntityKind::Whale))
        );
    }

    #[test]
    fn test_treasures_never_hurt() {
        let entities = vec![entity(1, EntityKind::Treasure, 400.0, 400.0)];
        assert!(first_enemy_hit(&hook_at(400.0, 400.0), &entities).is_none());
        assert_eq!(touching_treasure(&hook_at(400.0, 400.0), &entities), Some(1));
    }

    #[test]
    fn test_caught_treasure_is_skipped() {
        let mut held = entity(1, EntityKind::Treasure, 400.0, 400.0);
        held.caught = true;
        let entities = vec![held, entity(2, EntityKind::Treasure, 402.0, 400.0)];
        assert_eq!(touching_treasure(&hook_at(400.0, 400.0), &entities), Some(2));
    }

    #[test]
    fn test_edge_contact_is_not_a_hit() {
        // Hook spans 392.5..407.5; fish spans 407.5..439.5
        let entities = vec![entity(1, EntityKind::Fish, 423.5, 400.0)];
        assert!(first_enemy_hit(&hook_at(400.0, 400.0), &entities).is_none());
    }
}
