use super::{Behavior, Kind};
use crate::codec::{DecodeError, EntityRecord, FieldValue};
use crate::entity::{Entity, Point};
use crate::world::TickContext;

/// Round clock carried in the entity list so it ships with every snapshot.
/// `anim_count` is the elapsed round time and stops once the game is over.
pub struct TimerBehavior;

impl Behavior for TimerBehavior {
    fn tag(&self) -> &'static str {
        "timer"
    }

    fn init(&self, entity: &mut Entity) {
        entity.width = 0.0;
        entity.height = 0.0;
    }

    fn tick(&self, entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
        if !*ctx.game_over {
            entities[index].anim_count += dt;
        }
    }

    fn write_fields(&self, this: &Entity, record: &mut EntityRecord) {
        record.set("anim_count", FieldValue::Number(this.anim_count));
    }

    fn read_fields(&self, this: &mut Entity, record: &EntityRecord) -> Result<(), DecodeError> {
        this.anim_count = record.number("anim_count")?;
        Ok(())
    }

    fn can_render(&self, _this: &Entity, _center: Point) -> bool {
        true
    }
}

/// Elapsed round time of the first timer in `entities`.
pub fn round_time(entities: &[Entity]) -> Option<f32> {
    entities
        .iter()
        .find(|e| matches!(e.kind, Kind::Timer))
        .map(|e| e.anim_count)
}
