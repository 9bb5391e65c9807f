use super::{draw_box, Behavior, HoldableType, Kind};
use crate::codec::{DecodeError, EntityRecord, FieldValue};
use crate::collision::{move_axis, Axis};
use crate::entity::{Entity, Point};
use crate::render::{Color, Surface};
use crate::world::{TickContext, World};
use crate::{phys_from_px, px_from_phys, InputState, FRAME_LENGTH};
use log::debug;

pub const MAX_WALK_SPEED: f32 = 3.0 * crate::PHYS_SCALE / FRAME_LENGTH;
pub const WALK_ACCELERATION: f32 = 50.0 * crate::PHYS_SCALE / FRAME_LENGTH;
pub const THROW_SPEED: f32 = 4.0 * crate::PHYS_SCALE / FRAME_LENGTH;
pub const THROW_Z_SPEED: f32 = 2.0 * crate::PHYS_SCALE / FRAME_LENGTH;
pub const ROLL_SPEED: f32 = 8.0 * crate::PHYS_SCALE / FRAME_LENGTH;
pub const ROLL_TIME: f32 = 0.2;

const MOUSE_COLOR: Color = Color::rgb(0xc0, 0xcb, 0xdc);

#[derive(Debug, Clone, PartialEq)]
pub struct MouseState {
    pub is_moving: bool,
    pub flipped: bool,
    /// Seconds left in the current roll; walking input is ignored while positive.
    pub roll_count: f32,
    /// Sub-kind of the carried item, empty when the paws are free.
    pub holding_type: String,
    /// Local copy of the carried item. It has been removed from the world
    /// and rides along until put down.
    pub holding: Option<Box<Entity>>,
    pub facing: Point,
}

impl Default for MouseState {
    fn default() -> Self {
        Self {
            is_moving: false,
            flipped: false,
            roll_count: 0.0,
            holding_type: String::new(),
            holding: None,
            facing: Point::new(1.0, 0.0),
        }
    }
}

/// Carried items float this far above the mouse.
fn hold_height() -> f32 {
    phys_from_px(30.0)
}

pub struct MouseBehavior;

impl Behavior for MouseBehavior {
    fn tag(&self) -> &'static str {
        "mouse"
    }

    fn init(&self, entity: &mut Entity) {
        entity.width = phys_from_px(20.0);
        entity.height = phys_from_px(10.0);
        entity.damp_acceleration = phys_from_px(20.0 / FRAME_LENGTH);
    }

    // Damping comes from the walking input, and mice never leave the ground.
    fn tick(&self, entities: &mut [Entity], index: usize, dt: f32, ctx: &mut TickContext) {
        {
            let entity = &mut entities[index];
            if let Kind::Mouse(mouse) = &mut entity.kind {
                if mouse.roll_count > 0.0 {
                    mouse.roll_count -= dt;
                }
            }
            entity.anim_count += dt;
        }

        move_axis(entities, index, Axis::X, dt, ctx);
        move_axis(entities, index, Axis::Y, dt, ctx);

        let entity = &mut entities[index];
        let (mid_x, max_y, z) = (entity.mid_x(), entity.max_y(), entity.z);
        if let Kind::Mouse(mouse) = &mut entity.kind {
            if let Some(held) = mouse.holding.as_deref_mut() {
                held.set_mid_x(mid_x);
                held.set_max_y(max_y);
                held.z = z - hold_height();
            }
        }
    }

    fn can_collide_with(&self, _this: &Entity, other: &Entity) -> bool {
        match other.kind {
            Kind::Cat(_) | Kind::Tree | Kind::House | Kind::Mon(_) => true,
            Kind::Holdable(_) => other.is_on_ground(),
            _ => false,
        }
    }

    fn write_fields(&self, this: &Entity, record: &mut EntityRecord) {
        if let Kind::Mouse(mouse) = &this.kind {
            record.set("is_moving", FieldValue::Flag(mouse.is_moving));
            record.set("flipped", FieldValue::Flag(mouse.flipped));
            record.set("roll_count", FieldValue::Number(mouse.roll_count));
            record.set("holding_type", FieldValue::Text(mouse.holding_type.clone()));
        }
    }

    fn read_fields(&self, this: &mut Entity, record: &EntityRecord) -> Result<(), DecodeError> {
        let is_moving = record.flag("is_moving")?;
        let flipped = record.flag("flipped")?;
        let roll_count = record.number("roll_count")?;
        let holding_type = record.text("holding_type")?;

        if let Kind::Mouse(mouse) = &mut this.kind {
            mouse.is_moving = is_moving;
            mouse.flipped = flipped;
            mouse.roll_count = roll_count;
            mouse.holding_type = holding_type;
        }
        Ok(())
    }

    fn color(&self) -> Option<Color> {
        Some(MOUSE_COLOR)
    }

    fn render(&self, this: &Entity, surface: &mut dyn Surface, _center: Point) {
        draw_box(this, surface, MOUSE_COLOR);

        if let Kind::Mouse(mouse) = &this.kind {
            if let Some(held) = HoldableType::parse(&mouse.holding_type) {
                let size = 10.0;
                surface.fill_rect(
                    px_from_phys(this.mid_x()) - size / 2.0,
                    px_from_phys(this.max_y() - hold_height()) - size,
                    size,
                    size,
                    held.color(),
                );
            }
        }
    }
}

/// Applies one frame of keyboard input to the mouse at `player_index`.
/// Runs before the frame's ticks.
pub fn handle_input(world: &mut World, player_index: usize, input: &InputState, dt: f32) {
    if !matches!(world.entities.get(player_index).map(|e| &e.kind), Some(Kind::Mouse(_))) {
        return;
    }

    if input.action_pressed {
        do_action(world, player_index);
    }

    let entity = &mut world.entities[player_index];
    let rolling = matches!(&entity.kind, Kind::Mouse(mouse) if mouse.roll_count > 0.0);
    if !rolling {
        walk(entity, input, dt);
    }
}

fn do_action(world: &mut World, index: usize) {
    let holding = match &world.entities[index].kind {
        Kind::Mouse(mouse) => mouse.holding.is_some(),
        _ => return,
    };

    if holding {
        put_down(world, index);
    } else if !try_pickup(world, index) {
        roll(&mut world.entities[index]);
    }
}

fn walk(entity: &mut Entity, input: &InputState, dt: f32) {
    let (x_input, y_input) = input.axes();
    let mut moving = false;

    if x_input != 0.0 {
        entity.dx = (entity.dx + x_input * WALK_ACCELERATION * dt).clamp(-MAX_WALK_SPEED, MAX_WALK_SPEED);
        moving = true;
    } else {
        entity.damp_x(dt);
    }

    if y_input != 0.0 {
        entity.dy = (entity.dy + y_input * WALK_ACCELERATION * dt).clamp(-MAX_WALK_SPEED, MAX_WALK_SPEED);
        moving = true;
    } else {
        entity.damp_y(dt);
    }

    if let Kind::Mouse(mouse) = &mut entity.kind {
        if x_input != 0.0 || y_input != 0.0 {
            mouse.facing = Point::new(x_input, y_input);
        }
        if x_input != 0.0 {
            mouse.flipped = x_input < 0.0;
        }
        mouse.is_moving = moving;
    }
}

/// Grabs the first live holdable within half a mouse-width. The world copy
/// is marked done and queued so the server drops it too.
fn try_pickup(world: &mut World, index: usize) -> bool {
    let found = {
        let this = &world.entities[index];
        let margin = this.width / 2.0;
        world
            .entities
            .iter()
            .position(|e| matches!(e.kind, Kind::Holdable(_)) && !e.done && this.is_touching(e, margin))
    };
    let found = match found {
        Some(found) => found,
        None => return false,
    };

    world.entities[found].done = true;
    world.outbound.push(&world.entities[found]);
    let held = world.entities[found].clone();
    let holding_type = match &held.kind {
        Kind::Holdable(holdable) => holdable.holdable_type.as_str().to_string(),
        _ => String::new(),
    };

    debug!("{} picked up {} ({})", world.entities[index].id, held.id, holding_type);
    if let Kind::Mouse(mouse) = &mut world.entities[index].kind {
        mouse.holding_type = holding_type;
        mouse.holding = Some(Box::new(held));
    }
    true
}

/// Throws the carried item in the facing direction, inheriting half the
/// mouse's own velocity.
fn put_down(world: &mut World, index: usize) {
    let (dx, dy) = (world.entities[index].dx, world.entities[index].dy);
    let (mut held, facing) = match &mut world.entities[index].kind {
        Kind::Mouse(mouse) => match mouse.holding.take() {
            Some(held) => {
                mouse.holding_type.clear();
                (*held, mouse.facing)
            }
            None => return,
        },
        _ => return,
    };

    held.done = false;
    held.dx = THROW_SPEED * facing.x + 0.5 * dx;
    held.dy = THROW_SPEED * facing.y + 0.5 * dy;
    held.dz = -THROW_Z_SPEED;
    if let Kind::Holdable(holdable) = &mut held.kind {
        holdable.thrown = true;
    }

    world.outbound.push(&held);
    match world.index_of(&held.id) {
        Some(existing) => world.entities[existing] = held,
        None => world.push(held),
    }
}

fn roll(entity: &mut Entity) {
    let facing = match &mut entity.kind {
        Kind::Mouse(mouse) if mouse.roll_count <= 0.0 => {
            mouse.roll_count = ROLL_TIME;
            mouse.facing
        }
        _ => return,
    };
    entity.dx = ROLL_SPEED * facing.x;
    entity.dy = ROLL_SPEED * facing.y;
}
