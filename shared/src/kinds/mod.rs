//! Gameplay kinds. Every entity carries one [`Kind`] variant (its private
//! state) and is driven by the matching stateless [`Behavior`] strategy.

mod cat;
mod holdable;
mod mon;
mod mouse;
mod scenery;
mod timer;

pub use cat::{CatBehavior, CatState, CAT_DISTRACTION_TIME};
pub use holdable::{HoldableBehavior, HoldableState, HoldableType};
pub use mon::{MonBehavior, MonState};
pub use mouse::{handle_input, MouseBehavior, MouseState};
pub use scenery::{DecorBehavior, HouseBehavior, PathBehavior, TreeBehavior};
pub use timer::{round_time, TimerBehavior};

use crate::codec::{DecodeError, EntityRecord};
use crate::collision::{move_axis, Axis};
use crate::entity::{Entity, Point};
use crate::render::{Color, Surface};
use crate::world::TickContext;
use crate::px_from_phys;

/// Every tag the factory understands.
pub const ALL_KINDS: [&str; 9] = [
    "mouse", "cat", "holdable", "mon", "tree", "house", "decor", "path", "timer",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Mouse(MouseState),
    Cat(CatState),
    Holdable(HoldableState),
    Mon(MonState),
    Tree,
    House,
    Decor,
    Path,
    Timer,
}

impl Kind {
    pub fn tag(&self) -> &'static str {
        self.behavior().tag()
    }

    pub fn behavior(&self) -> &'static dyn Behavior {
        match self {
            Kind::Mouse(_) => &MouseBehavior,
            Kind::Cat(_) => &CatBehavior,
            Kind::Holdable(_) => &HoldableBehavior,
            Kind::Mon(_) => &MonBehavior,
            Kind::Tree => &TreeBehavior,
            Kind::House => &HouseBehavior,
            Kind::Decor => &DecorBehavior,
            Kind::Path => &PathBehavior,
            Kind::Timer => &TimerBehavior,
        }
    }
}

/// Per-kind rules layered on the shared physics.
pub trait Behavior {
    fn tag(&self) -> &'static str;

    /// Sets geometry and constants on a freshly constructed entity.
    fn init(&self, _entity: &mut Entity) {}

    /// Advances `entities[index]` by `dt`.
    fn tick(&self, entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
        base_tick(entities, index, dt, ctx);
    }

    fn can_collide_with(&self, _this: &Entity, _other: &Entity) -> bool {
        false
    }

    /// Fired at most once per axis per tick with the last newly-touched partner.
    fn on_collision(&self, _this: &mut Entity, _other: &mut Entity, _ctx: &mut TickContext) {}

    fn on_land(&self, this: &mut Entity) {
        this.land();
    }

    fn write_fields(&self, _this: &Entity, _record: &mut EntityRecord) {}

    /// Must read every field before assigning any of them.
    fn read_fields(&self, _this: &mut Entity, _record: &EntityRecord) -> Result<(), DecodeError> {
        Ok(())
    }

    fn can_render(&self, this: &Entity, center: Point) -> bool {
        this.is_near_view(center)
    }

    fn color(&self) -> Option<Color> {
        None
    }

    fn render(&self, this: &Entity, surface: &mut dyn Surface, _center: Point) {
        if let Some(color) = self.color() {
            draw_box(this, surface, color);
        }
    }
}

/// Shared integration step: animation clock, damping, X then Y then Z.
pub fn base_tick(entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
    {
        let entity = &mut entities[index];
        entity.anim_count += dt;
        entity.damp_x(dt);
        entity.damp_y(dt);
    }
    move_axis(entities, index, Axis::X, dt, ctx);
    move_axis(entities, index, Axis::Y, dt, ctx);
    entities[index].move_z(dt);
}

/// Draws the entity's box lifted by `z`.
pub fn draw_box(entity: &Entity, surface: &mut dyn Surface, color: Color) {
    surface.fill_rect(
        px_from_phys(entity.x),
        px_from_phys(entity.y + entity.z),
        px_from_phys(entity.width),
        px_from_phys(entity.height),
        color,
    );
}

/// Maps a wire tag to a default entity of that kind.
pub fn create_entity(tag: &str, id: &str) -> Result<Entity, DecodeError> {
    let kind = match tag {
        "mouse" => Kind::Mouse(MouseState::default()),
        "cat" => Kind::Cat(CatState::default()),
        "holdable" => Kind::Holdable(HoldableState::default()),
        "mon" => Kind::Mon(MonState::default()),
        "tree" => Kind::Tree,
        "house" => Kind::House,
        "decor" => Kind::Decor,
        "path" => Kind::Path,
        "timer" => Kind::Timer,
        _ => {
            return Err(DecodeError::UnknownKind {
                kind: tag.to_string(),
                id: id.to_string(),
            })
        }
    };
    Ok(Entity::new(id, kind))
}
