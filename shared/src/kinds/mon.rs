use super::{base_tick, Behavior, Kind};
use crate::codec::{DecodeError, EntityRecord, FieldValue};
use crate::entity::{Entity, Point};
use crate::render::Color;
use crate::world::{Side, TickContext};
use crate::{lerp, phys_from_px, phys_from_sprite_px, FRAME_LENGTH, PX_WORLD_WIDTH};
use rand::Rng;

pub const MON_WALK_SPEED: f32 = 2.0 * crate::PHYS_SCALE / FRAME_LENGTH;
/// Furthest a new walk target may be from the mon, per axis.
pub const MON_WANDER_DISTANCE: f32 = 200.0 * crate::PHYS_SCALE;
/// Per-tick chance the server picks a fresh target before reaching the old one.
const RETARGET_CHANCE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct MonState {
    pub walk_target: Option<Point>,
    pub wool_count: u32,
}

impl Default for MonState {
    fn default() -> Self {
        Self {
            walk_target: None,
            wool_count: 3,
        }
    }
}

/// Wandering sheep-like critter. Only the server picks targets; clients
/// follow whatever target the last snapshot carried.
pub struct MonBehavior;

impl Behavior for MonBehavior {
    fn tag(&self) -> &'static str {
        "mon"
    }

    fn init(&self, entity: &mut Entity) {
        entity.width = phys_from_sprite_px(14.0);
        entity.height = phys_from_sprite_px(10.0);
    }

    fn tick(&self, entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
        {
            let entity = &mut entities[index];
            let mut target = match &entity.kind {
                Kind::Mon(mon) => mon.walk_target,
                _ => None,
            };

            if let Some(goal) = target {
                let x_dist = goal.x - entity.mid_x();
                let y_dist = goal.y - entity.max_y();
                entity.dx = x_dist.clamp(-MON_WALK_SPEED, MON_WALK_SPEED);
                entity.dy = y_dist.clamp(-MON_WALK_SPEED, MON_WALK_SPEED);
                if x_dist.abs() + y_dist.abs() < MON_WALK_SPEED {
                    target = None;
                }
            }

            if ctx.side == Side::Server && (target.is_none() || ctx.rng.gen::<f32>() < RETARGET_CHANCE) {
                target = Some(Point::new(
                    entity.mid_x() + lerp(-MON_WANDER_DISTANCE, MON_WANDER_DISTANCE, ctx.rng.gen()),
                    entity.mid_y() + lerp(-MON_WANDER_DISTANCE, MON_WANDER_DISTANCE, ctx.rng.gen()),
                ));
            }

            if let Kind::Mon(mon) = &mut entity.kind {
                mon.walk_target = target;
            }
        }

        base_tick(entities, index, dt, ctx);

        let entity = &mut entities[index];
        let limit = phys_from_px(PX_WORLD_WIDTH * 2.0);
        if entity.mid_x().abs() > limit || entity.max_y().abs() > limit {
            entity.done = true;
        }
    }

    fn can_collide_with(&self, _this: &Entity, other: &Entity) -> bool {
        matches!(other.kind, Kind::Cat(_) | Kind::Tree | Kind::House | Kind::Mon(_))
    }

    fn write_fields(&self, this: &Entity, record: &mut EntityRecord) {
        if let Kind::Mon(mon) = &this.kind {
            let target = match mon.walk_target {
                Some(point) => FieldValue::Point(point),
                None => FieldValue::Nothing,
            };
            record.set("walk_target", target);
            record.set("wool_count", FieldValue::Number(mon.wool_count as f32));
        }
    }

    fn read_fields(&self, this: &mut Entity, record: &EntityRecord) -> Result<(), DecodeError> {
        let walk_target = record.optional_point("walk_target")?;
        let wool_count = record.number("wool_count")?;

        if let Kind::Mon(mon) = &mut this.kind {
            mon.walk_target = walk_target;
            mon.wool_count = wool_count.max(0.0) as u32;
        }
        Ok(())
    }

    fn color(&self) -> Option<Color> {
        Some(Color::rgb(0xea, 0xd4, 0xaa))
    }
}
