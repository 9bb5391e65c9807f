use super::{draw_box, Behavior, Kind};
use crate::codec::{DecodeError, EntityRecord, FieldValue};
use crate::collision::{move_axis, Axis};
use crate::entity::{Entity, Point};
use crate::render::{Color, Surface, SHADOW};
use crate::world::TickContext;
use crate::{phys_from_px, px_from_phys, FRAME_LENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldableType {
    #[default]
    Grass,
    Rock,
    Wood,
    Wool,
}

impl HoldableType {
    pub const ALL: [HoldableType; 4] = [
        HoldableType::Grass,
        HoldableType::Rock,
        HoldableType::Wood,
        HoldableType::Wool,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HoldableType::Grass => "grass",
            HoldableType::Rock => "rock",
            HoldableType::Wood => "wood",
            HoldableType::Wool => "wool",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn color(self) -> Color {
        match self {
            HoldableType::Grass => Color::rgb(0x3e, 0x89, 0x48),
            HoldableType::Rock => Color::rgb(0x8b, 0x9b, 0xb4),
            HoldableType::Wood => Color::rgb(0xb8, 0x6f, 0x50),
            HoldableType::Wool => Color::rgb(0xf4, 0xf4, 0xf4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoldableState {
    pub holdable_type: HoldableType,
    /// Set on throw, cleared on landing.
    pub thrown: bool,
}

pub struct HoldableBehavior;

impl Behavior for HoldableBehavior {
    fn tag(&self) -> &'static str {
        "holdable"
    }

    fn init(&self, entity: &mut Entity) {
        entity.damp_acceleration = phys_from_px(50.0 / FRAME_LENGTH);
    }

    // Friction only applies on the ground, so a throw keeps its speed in flight.
    fn tick(&self, entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
        {
            let entity = &mut entities[index];
            entity.anim_count += dt;
            if entity.z > -0.1 {
                entity.damp_x(dt);
                entity.damp_y(dt);
            }
        }
        move_axis(entities, index, Axis::X, dt, ctx);
        move_axis(entities, index, Axis::Y, dt, ctx);
        entities[index].move_z(dt);
    }

    fn can_collide_with(&self, _this: &Entity, other: &Entity) -> bool {
        matches!(other.kind, Kind::Cat(_) | Kind::Tree | Kind::House)
    }

    fn on_land(&self, this: &mut Entity) {
        this.land();
        if let Kind::Holdable(holdable) = &mut this.kind {
            holdable.thrown = false;
        }
    }

    fn write_fields(&self, this: &Entity, record: &mut EntityRecord) {
        if let Kind::Holdable(holdable) = &this.kind {
            record.set(
                "holdable_type",
                FieldValue::Text(holdable.holdable_type.as_str().to_string()),
            );
            record.set("thrown", FieldValue::Flag(holdable.thrown));
        }
    }

    fn read_fields(&self, this: &mut Entity, record: &EntityRecord) -> Result<(), DecodeError> {
        let name = record.text("holdable_type")?;
        let holdable_type = HoldableType::parse(&name).ok_or_else(|| DecodeError::WrongType {
            id: record.id.clone(),
            field: "holdable_type",
        })?;
        let thrown = record.flag("thrown")?;

        if let Kind::Holdable(holdable) = &mut this.kind {
            holdable.holdable_type = holdable_type;
            holdable.thrown = thrown;
        }
        Ok(())
    }

    fn render(&self, this: &Entity, surface: &mut dyn Surface, _center: Point) {
        let holdable_type = match &this.kind {
            Kind::Holdable(holdable) => holdable.holdable_type,
            _ => return,
        };

        if this.z < -0.1 {
            surface.fill_rect(
                px_from_phys(this.x),
                px_from_phys(this.y),
                px_from_phys(this.width),
                px_from_phys(this.height),
                SHADOW,
            );
        }
        draw_box(this, surface, holdable_type.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::create_entity;
    use crate::render::RecordingSurface;
    use crate::world::{Side, World};

    #[test]
    fn test_type_names_round_trip() {
        for kind in HoldableType::ALL {
            assert_eq!(HoldableType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(HoldableType::parse("lava"), None);
    }

    #[test]
    fn test_thrown_flag_clears_on_landing() {
        let mut world = World::new(Side::Server, 1);
        let mut item = create_entity("holdable", "h").unwrap();
        item.z = -1.0;
        item.dz = -phys_from_px(2.0 / FRAME_LENGTH);
        item.dx = phys_from_px(4.0 / FRAME_LENGTH);
        if let Kind::Holdable(holdable) = &mut item.kind {
            holdable.thrown = true;
        }
        world.push(item);

        world.tick(FRAME_LENGTH);
        let airborne = world.find("h").unwrap();
        assert!(airborne.z < 0.0);
        assert_eq!(airborne.dx, phys_from_px(4.0 / FRAME_LENGTH));

        for _ in 0..60 {
            world.tick(FRAME_LENGTH);
        }
        let landed = world.find("h").unwrap();
        assert_eq!(landed.z, 0.0);
        assert!(matches!(&landed.kind, Kind::Holdable(h) if !h.thrown));
        assert_eq!(landed.dx, 0.0);
    }

    #[test]
    fn test_unknown_type_name_is_rejected() {
        let mut item = create_entity("holdable", "h").unwrap();
        let mut record = item.to_record();
        record.set("holdable_type", FieldValue::Text("lava".to_string()));
        assert!(matches!(
            item.apply_record(&record, false),
            Err(DecodeError::WrongType { field: "holdable_type", .. })
        ));
    }

    #[test]
    fn test_airborne_render_draws_shadow() {
        let mut item = create_entity("holdable", "h").unwrap();
        item.z = -phys_from_px(5.0);
        let mut surface = RecordingSurface::default();

        item.render(&mut surface, Point::new(0.0, 0.0));

        assert_eq!(surface.rects.len(), 2);
        assert_eq!(surface.rects[0].4, SHADOW);
        assert_eq!(surface.rects[1].1, -5.0);
    }
}
