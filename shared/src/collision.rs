//! Axis-separated movement with AABB resolution.
//!
//! Each axis runs in two passes. Entities already overlapping the mover when
//! the pass starts contribute a soft push (1 px per tick each) that separates
//! bodies gradually. Anything the mover newly overlaps after moving is a hard
//! block: the leading edge is clamped to the obstacle's trailing edge.

use crate::entity::Entity;
use crate::world::TickContext;
use crate::{FRAME_LENGTH, PHYS_SCALE};

/// Separation speed per overlapping partner, 1 px per tick.
pub const PUSH_SPEED: f32 = PHYS_SCALE / FRAME_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn position(self, entity: &Entity) -> f32 {
        match self {
            Axis::X => entity.x,
            Axis::Y => entity.y,
        }
    }

    fn set_position(self, entity: &mut Entity, value: f32) {
        match self {
            Axis::X => entity.x = value,
            Axis::Y => entity.y = value,
        }
    }

    fn velocity(self, entity: &Entity) -> f32 {
        match self {
            Axis::X => entity.dx,
            Axis::Y => entity.dy,
        }
    }

    fn min(self, entity: &Entity) -> f32 {
        match self {
            Axis::X => entity.min_x(),
            Axis::Y => entity.min_y(),
        }
    }

    fn mid(self, entity: &Entity) -> f32 {
        match self {
            Axis::X => entity.mid_x(),
            Axis::Y => entity.mid_y(),
        }
    }

    fn max(self, entity: &Entity) -> f32 {
        match self {
            Axis::X => entity.max_x(),
            Axis::Y => entity.max_y(),
        }
    }

    fn set_max(self, entity: &mut Entity, value: f32) {
        match self {
            Axis::X => entity.set_max_x(value),
            Axis::Y => entity.set_max_y(value),
        }
    }

    fn set_min(self, entity: &mut Entity, value: f32) {
        match self {
            Axis::X => entity.set_min_x(value),
            Axis::Y => entity.set_min_y(value),
        }
    }
}

/// Moves `entities[index]` along `axis` for `dt` seconds against the rest of
/// the slice, in slice order.
pub fn move_axis(entities: &mut [Entity], index: usize, axis: Axis, dt: f32, ctx: &mut TickContext) {
    let mut push_dir = 0i32;
    let mut touching_at_start = Vec::new();
    {
        let this = &entities[index];
        for (i, other) in entities.iter().enumerate() {
            if i == index || !this.can_collide_with(other) {
                continue;
            }
            if this.is_touching(other, 0.0) {
                touching_at_start.push(i);
                if axis.mid(this) < axis.mid(other) {
                    push_dir -= 1;
                } else {
                    push_dir += 1;
                }
            }
        }
    }

    let velocity = axis.velocity(&entities[index]);
    {
        let this = &mut entities[index];
        let moved = axis.position(this) + (velocity + PUSH_SPEED * push_dir as f32) * dt;
        axis.set_position(this, moved.round());
    }

    let mut last_touched = None;
    for i in 0..entities.len() {
        if i == index || touching_at_start.contains(&i) {
            continue;
        }
        let (this, other) = (&entities[index], &entities[i]);
        if !this.can_collide_with(other) || !this.is_touching(other, 0.0) {
            continue;
        }
        let (other_min, other_max) = (axis.min(other), axis.max(other));
        let this = &mut entities[index];
        if velocity > 0.0 {
            axis.set_max(this, other_min);
        } else if velocity < 0.0 {
            axis.set_min(this, other_max);
        }
        last_touched = Some(i);
    }

    if let Some(i) = last_touched {
        let (this, other) = pair_mut(entities, index, i);
        let behavior = this.kind.behavior();
        behavior.on_collision(this, other, ctx);
    }
}

/// Two distinct mutable elements of one slice.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut needs two distinct indices");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{create_entity, Kind};
    use crate::world::{Side, World};
    use crate::phys_from_px;

    fn boxed(tag: &str, id: &str, x: f32, y: f32, size: f32) -> Entity {
        let mut entity = create_entity(tag, id).unwrap();
        entity.x = x;
        entity.y = y;
        entity.width = size;
        entity.height = size;
        entity
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut values = [1, 2, 3];
        {
            let (a, b) = pair_mut(&mut values, 0, 2);
            std::mem::swap(a, b);
        }
        assert_eq!(values, [3, 2, 1]);
        {
            let (a, b) = pair_mut(&mut values, 2, 1);
            *a += 10;
            *b += 20;
        }
        assert_eq!(values, [3, 22, 11]);
    }

    #[test]
    fn test_moving_right_is_blocked_by_solid() {
        let mut world = World::new(Side::Client, 1);
        let mut mover = boxed("mouse", "m", 85.0, 0.0, 10.0);
        mover.dx = 900.0;
        world.entities.push(mover);
        world.entities.push(boxed("tree", "t", 100.0, 0.0, 20.0));

        world.tick(FRAME_LENGTH);

        let mover = world.find("m").unwrap();
        assert_eq!(mover.max_x(), 100.0);
    }

    #[test]
    fn test_moving_left_is_blocked_by_solid() {
        let mut world = World::new(Side::Client, 1);
        let mut mover = boxed("mouse", "m", 125.0, 0.0, 10.0);
        mover.dx = -900.0;
        world.entities.push(mover);
        world.entities.push(boxed("tree", "t", 100.0, 0.0, 20.0));

        world.tick(FRAME_LENGTH);

        assert_eq!(world.find("m").unwrap().min_x(), 120.0);
    }

    #[test]
    fn test_overlap_at_start_pushes_apart() {
        let mut world = World::new(Side::Client, 1);
        world.entities.push(boxed("mouse", "m", 0.0, 0.0, 10.0));
        world.entities.push(boxed("tree", "t", 5.0, 5.0, 10.0));
        let before = world.find("m").unwrap().x;

        world.tick(FRAME_LENGTH);

        assert_eq!(world.find("m").unwrap().x, before - phys_from_px(1.0));
    }

    #[test]
    fn test_zero_area_never_pushes() {
        let mut world = World::new(Side::Client, 1);
        world.entities.push(boxed("mouse", "m", 0.0, 0.0, 10.0));
        world.entities.push(boxed("tree", "t", 0.0, 0.0, 0.0));

        world.tick(FRAME_LENGTH);

        let mover = world.find("m").unwrap();
        assert_eq!((mover.x, mover.y), (0.0, 0.0));
    }

    #[test]
    fn test_collision_callback_goes_to_last_partner() {
        // The cat lands on both holdables in one step; only the last one in
        // list order gets the callback.
        let mut world = World::new(Side::Client, 1);
        let mut cat = boxed("cat", "cat", 0.0, -105.0, 100.0);
        cat.dy = 10.0;
        world.entities.push(cat);
        world.entities.push(boxed("holdable", "h1", 0.0, 0.0, 10.0));
        world.entities.push(boxed("holdable", "h2", 50.0, -3.0, 10.0));

        let (entities, mut ctx) = world.split();
        move_axis(entities, 0, Axis::Y, 1.0, &mut ctx);

        assert!(!world.find("h1").unwrap().done);
        assert!(world.find("h2").unwrap().done);
        match &world.find("cat").unwrap().kind {
            Kind::Cat(cat) => assert!(cat.distraction_count > 0.0),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(world.find("cat").unwrap().max_y(), -3.0);
    }
}
