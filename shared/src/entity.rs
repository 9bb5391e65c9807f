use crate::kinds::Kind;
use crate::render::Surface;
use crate::{phys_from_px, px_from_phys, FRAME_LENGTH, PX_GAME_HEIGHT, PX_GAME_WIDTH};
use serde::{Deserialize, Serialize};

/// Default vertical acceleration, 10 px per tick squared.
pub const DEFAULT_GRAVITY: f32 = 10.0 * crate::PHYS_SCALE / FRAME_LENGTH;
/// Default planar damping, 10 px per tick squared.
pub const DEFAULT_DAMPING: f32 = 10.0 * crate::PHYS_SCALE / FRAME_LENGTH;
/// Fraction of `dz` kept (and reversed) on landing.
pub const DEFAULT_BOUNCE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One simulated body. Position is the top-left corner in physical units;
/// `z` is a visual height offset where negative means "in the air".
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub kind: Kind,

    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,

    pub width: f32,
    pub height: f32,

    pub gravity: f32,
    pub damp_acceleration: f32,
    pub bounce: f32,

    /// Set once, swept at the end of the tick.
    pub done: bool,
    pub anim_count: f32,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: Kind) -> Self {
        let mut entity = Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            width: phys_from_px(10.0),
            height: phys_from_px(10.0),
            gravity: DEFAULT_GRAVITY,
            damp_acceleration: DEFAULT_DAMPING,
            bounce: DEFAULT_BOUNCE,
            done: false,
            anim_count: 0.0,
        };
        let behavior = entity.kind.behavior();
        behavior.init(&mut entity);
        entity
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn mid_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn set_min_x(&mut self, x: f32) {
        self.x = x;
    }

    pub fn set_mid_x(&mut self, x: f32) {
        self.x = x - self.width / 2.0;
    }

    pub fn set_max_x(&mut self, x: f32) {
        self.x = x - self.width;
    }

    pub fn set_min_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn set_mid_y(&mut self, y: f32) {
        self.y = y - self.height / 2.0;
    }

    pub fn set_max_y(&mut self, y: f32) {
        self.y = y - self.height;
    }

    pub fn has_area(&self) -> bool {
        self.width != 0.0 && self.height != 0.0
    }

    /// AABB overlap, both boxes grown by `margin`. Zero-area boxes never touch.
    pub fn is_touching(&self, other: &Entity, margin: f32) -> bool {
        if !self.has_area() || !other.has_area() {
            return false;
        }
        self.x + self.width + margin > other.x
            && self.x - margin < other.x + other.width
            && self.y + self.height + margin > other.y
            && self.y - margin < other.y + other.height
    }

    pub fn is_touching_point(&self, point: Point, margin: f32) -> bool {
        if !self.has_area() {
            return false;
        }
        self.x + self.width + margin > point.x
            && self.x - margin < point.x
            && self.y + self.height + margin > point.y
            && self.y - margin < point.y
    }

    /// The collidability predicate used by the resolver. May be asymmetric.
    /// Entities already marked done take no further part in collisions.
    pub fn can_collide_with(&self, other: &Entity) -> bool {
        !other.done && self.kind.behavior().can_collide_with(self, other)
    }

    pub fn is_on_ground(&self) -> bool {
        self.z == 0.0 && self.dz < 0.1 / FRAME_LENGTH
    }

    pub fn damp_x(&mut self, dt: f32) {
        self.dx = damp(self.dx, self.damp_acceleration * dt);
    }

    pub fn damp_y(&mut self, dt: f32) {
        self.dy = damp(self.dy, self.damp_acceleration * dt);
    }

    pub fn move_z(&mut self, dt: f32) {
        self.dz += self.gravity * dt;
        self.z += self.dz * dt;
        if self.z > 0.0 {
            let behavior = self.kind.behavior();
            behavior.on_land(self);
        }
    }

    /// Ground contact correction shared by every kind.
    pub fn land(&mut self) {
        self.z = 0.0;
        self.dz *= -self.bounce;
    }

    /// Visibility test for a camera centred on `center` (screen pixels).
    pub fn can_render(&self, center: Point) -> bool {
        self.kind.behavior().can_render(self, center)
    }

    pub fn is_near_view(&self, center: Point) -> bool {
        let px_mid_x = px_from_phys(self.mid_x());
        let px_mid_y = px_from_phys(self.mid_y());
        px_mid_x > center.x - 0.7 * PX_GAME_WIDTH
            && px_mid_x < center.x + 0.7 * PX_GAME_WIDTH
            && px_mid_y > center.y - 0.7 * PX_GAME_HEIGHT
            && px_mid_y < center.y + 0.7 * PX_GAME_HEIGHT
    }

    pub fn render(&self, surface: &mut dyn Surface, center: Point) {
        self.kind.behavior().render(self, surface, center);
    }
}

/// Linear decay toward zero that stops exactly at zero.
fn damp(velocity: f32, amount: f32) -> f32 {
    if velocity > amount {
        velocity - amount
    } else if velocity < -amount {
        velocity + amount
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::Kind;
    use assert_approx_eq::assert_approx_eq;

    fn tree_at(id: &str, x: f32, y: f32) -> Entity {
        let mut e = Entity::new(id, Kind::Tree);
        e.x = x;
        e.y = y;
        e
    }

    #[test]
    fn test_edge_accessors_and_mutators() {
        let mut e = tree_at("a", 100.0, 200.0);
        e.width = 40.0;
        e.height = 20.0;

        assert_eq!(e.mid_x(), 120.0);
        assert_eq!(e.max_x(), 140.0);
        assert_eq!(e.mid_y(), 210.0);
        assert_eq!(e.max_y(), 220.0);

        e.set_max_x(50.0);
        assert_eq!(e.x, 10.0);
        e.set_mid_y(0.0);
        assert_eq!(e.y, -10.0);
        e.set_min_x(3.0);
        assert_eq!(e.min_x(), 3.0);
    }

    #[test]
    fn test_touching_is_strict() {
        let mut a = tree_at("a", 0.0, 0.0);
        let mut b = tree_at("b", 0.0, 0.0);
        a.width = 10.0;
        a.height = 10.0;
        b.width = 10.0;
        b.height = 10.0;

        b.x = 10.0;
        assert!(!a.is_touching(&b, 0.0));
        assert!(a.is_touching(&b, 1.0));

        b.x = 9.0;
        assert!(a.is_touching(&b, 0.0));
    }

    #[test]
    fn test_zero_area_never_touches() {
        let a = tree_at("a", 0.0, 0.0);
        let mut b = tree_at("b", 0.0, 0.0);
        b.width = 0.0;
        assert!(!a.is_touching(&b, 100.0));
        assert!(!b.is_touching(&a, 100.0));
        assert!(!b.is_touching_point(Point::new(0.0, 0.0), 100.0));
    }

    #[test]
    fn test_damping_stops_at_zero() {
        assert_eq!(damp(5.0, 2.0), 3.0);
        assert_eq!(damp(-5.0, 2.0), -3.0);
        assert_eq!(damp(1.5, 2.0), 0.0);
        assert_eq!(damp(-1.5, 2.0), 0.0);
    }

    #[test]
    fn test_landing_bounces() {
        let mut e = tree_at("a", 0.0, 0.0);
        e.z = -1.0;
        e.dz = 600.0;
        let dz_at_contact = e.dz + e.gravity * FRAME_LENGTH;

        e.move_z(FRAME_LENGTH);

        assert_eq!(e.z, 0.0);
        assert_eq!(e.bounce, DEFAULT_BOUNCE);
        assert_approx_eq!(e.dz, -DEFAULT_BOUNCE * dz_at_contact, 1e-3);
        assert!(e.is_on_ground());
    }

    #[test]
    fn test_view_culling() {
        let mut e = tree_at("a", 0.0, 0.0);
        e.set_mid_x(phys_from_px(400.0));
        e.set_mid_y(phys_from_px(300.0));
        assert!(e.can_render(Point::new(400.0, 300.0)));
        assert!(!e.can_render(Point::new(400.0 + PX_GAME_WIDTH, 300.0)));
    }
}
