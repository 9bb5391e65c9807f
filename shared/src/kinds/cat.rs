use super::{Behavior, Kind};
use crate::codec::{DecodeError, EntityRecord, FieldValue};
use crate::collision::{move_axis, Axis};
use crate::entity::Entity;
use crate::render::Color;
use crate::world::TickContext;
use crate::{phys_from_px, FRAME_LENGTH};
use log::info;

/// Seconds the cat stops walking after eating something.
pub const CAT_DISTRACTION_TIME: f32 = 5.0;
pub const CAT_SPEED: f32 = 0.3 * crate::PHYS_SCALE / FRAME_LENGTH;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatState {
    pub distraction_count: f32,
}

/// Walks down the map one column at a time. Eats whatever it touches and
/// ends the round when it reaches a house.
pub struct CatBehavior;

impl Behavior for CatBehavior {
    fn tag(&self) -> &'static str {
        "cat"
    }

    fn init(&self, entity: &mut Entity) {
        entity.width = phys_from_px(120.0);
        entity.height = phys_from_px(180.0);
    }

    fn tick(&self, entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
        {
            let entity = &mut entities[index];
            let distracted = match &mut entity.kind {
                Kind::Cat(cat) => {
                    cat.distraction_count = if cat.distraction_count > dt {
                        cat.distraction_count - dt
                    } else {
                        0.0
                    };
                    cat.distraction_count > 0.0
                }
                _ => false,
            };
            entity.dy = if distracted { 0.0 } else { CAT_SPEED };
        }
        move_axis(entities, index, Axis::Y, dt, ctx);
    }

    fn can_collide_with(&self, _this: &Entity, other: &Entity) -> bool {
        matches!(other.kind, Kind::Holdable(_) | Kind::Mouse(_) | Kind::House)
    }

    fn on_collision(&self, this: &mut Entity, other: &mut Entity, ctx: &mut TickContext) {
        let distract = match other.kind {
            Kind::Holdable(_) => {
                other.done = true;
                true
            }
            Kind::Mouse(_) => {
                other.done = true;
                ctx.outbound.push(other);
                info!("Cat caught {}", other.id);
                true
            }
            Kind::House => {
                if !*ctx.game_over {
                    info!("Cat reached house {}", other.id);
                }
                *ctx.game_over = true;
                false
            }
            _ => false,
        };

        if distract {
            if let Kind::Cat(cat) = &mut this.kind {
                cat.distraction_count = CAT_DISTRACTION_TIME;
            }
        }
    }

    fn write_fields(&self, this: &Entity, record: &mut EntityRecord) {
        if let Kind::Cat(cat) = &this.kind {
            record.set("distraction_count", FieldValue::Number(cat.distraction_count));
        }
    }

    fn read_fields(&self, this: &mut Entity, record: &EntityRecord) -> Result<(), DecodeError> {
        let distraction_count = record.number("distraction_count")?;
        if let Kind::Cat(cat) = &mut this.kind {
            cat.distraction_count = distraction_count;
        }
        Ok(())
    }

    fn color(&self) -> Option<Color> {
        Some(Color::rgb(0xf7, 0x76, 0x22))
    }
}
