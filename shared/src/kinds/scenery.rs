//! Static kinds. Trees and houses block movement; decor and paths are
//! zero-sized ground dressing generated locally by each client.

use super::Behavior;
use crate::entity::{Entity, Point};
use crate::render::{Color, Surface};
use crate::{phys_from_px, phys_from_sprite_px, px_from_phys};

pub struct TreeBehavior;

impl Behavior for TreeBehavior {
    fn tag(&self) -> &'static str {
        "tree"
    }

    fn init(&self, entity: &mut Entity) {
        entity.width = phys_from_px(25.0);
        entity.height = phys_from_px(20.0);
    }

    fn color(&self) -> Option<Color> {
        Some(Color::rgb(0x26, 0x5c, 0x42))
    }
}

pub struct HouseBehavior;

impl Behavior for HouseBehavior {
    fn tag(&self) -> &'static str {
        "house"
    }

    fn init(&self, entity: &mut Entity) {
        entity.width = phys_from_sprite_px(40.0);
        entity.height = phys_from_sprite_px(30.0);
    }

    fn color(&self) -> Option<Color> {
        Some(Color::rgb(0x73, 0x3e, 0x39))
    }
}

fn zero_size(entity: &mut Entity) {
    entity.width = 0.0;
    entity.height = 0.0;
}

/// Draws a fixed-size marker around a zero-sized entity's anchor point.
fn draw_marker(this: &Entity, surface: &mut dyn Surface, width: f32, height: f32, color: Color) {
    surface.fill_rect(
        px_from_phys(this.mid_x()) - width / 2.0,
        px_from_phys(this.max_y()) - height,
        width,
        height,
        color,
    );
}

pub struct DecorBehavior;

impl Behavior for DecorBehavior {
    fn tag(&self) -> &'static str {
        "decor"
    }

    fn init(&self, entity: &mut Entity) {
        zero_size(entity);
    }

    fn render(&self, this: &Entity, surface: &mut dyn Surface, _center: Point) {
        draw_marker(this, surface, 6.0, 4.0, Color::rgb(0x63, 0xc7, 0x4d));
    }
}

pub struct PathBehavior;

impl Behavior for PathBehavior {
    fn tag(&self) -> &'static str {
        "path"
    }

    fn init(&self, entity: &mut Entity) {
        zero_size(entity);
    }

    fn render(&self, this: &Entity, surface: &mut dyn Surface, _center: Point) {
        draw_marker(this, surface, 40.0, 24.0, Color::rgb(0xe4, 0xa6, 0x72));
    }
}

#[cfg(test)]
mod tests {
    use crate::kinds::create_entity;
    use crate::render::RecordingSurface;
    use crate::{phys_from_px, Point};

    #[test]
    fn test_solid_scenery_sizes() {
        let tree = create_entity("tree", "t").unwrap();
        assert_eq!((tree.width, tree.height), (phys_from_px(25.0), phys_from_px(20.0)));
        let house = create_entity("house", "h").unwrap();
        assert_eq!((house.width, house.height), (phys_from_px(80.0), phys_from_px(60.0)));
    }

    #[test]
    fn test_decor_still_draws_without_area() {
        let mut decor = create_entity("decor", "d").unwrap();
        decor.x = phys_from_px(100.0);
        decor.y = phys_from_px(50.0);
        let mut surface = RecordingSurface::default();

        decor.render(&mut surface, Point::new(100.0, 50.0));

        assert_eq!(surface.rects.len(), 1);
        assert_eq!(surface.rects[0].0, 97.0);
        assert_eq!(surface.rects[0].1, 46.0);
    }
}
