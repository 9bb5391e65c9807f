//! Simulation core shared by the server and every client.
//!
//! Both sides run the same fixed-timestep simulation over their own entity
//! list and exchange serialized snapshots a few times per second. The server
//! is the authority for everything except each client's own player, which the
//! client predicts locally and pushes upstream.

pub mod codec;
pub mod collision;
pub mod entity;
pub mod ids;
pub mod kinds;
pub mod reconcile;
pub mod render;
pub mod stepper;
pub mod world;
pub mod worldgen;

use serde::{Deserialize, Serialize};

pub use codec::{DecodeError, EntityRecord, FieldValue};
pub use entity::{Entity, Point};
pub use kinds::{create_entity, Kind};
pub use reconcile::{reconcile_client, reconcile_server, ReconcileReport};
pub use render::{Color, Surface};
pub use stepper::FixedStepper;
pub use world::{OutboundQueue, Side, TickContext, World};
pub use worldgen::{WorldGen, WorldGenConfig};

/// Length of one simulation tick in seconds.
pub const FRAME_LENGTH: f32 = 1.0 / 60.0;
/// Physical units per screen pixel.
pub const PHYS_SCALE: f32 = 64.0;
/// Interval between outbound `Update` packets, both directions.
pub const NETWORK_INTERVAL_MS: u64 = 50;
/// Tick cap for one stepper invocation.
pub const MAX_STEPS_PER_FRAME: u32 = 10;

pub const PX_GAME_WIDTH: f32 = 800.0;
pub const PX_GAME_HEIGHT: f32 = 600.0;
pub const PX_WORLD_WIDTH: f32 = PX_GAME_WIDTH * 2.0;
pub const PX_WORLD_HEIGHT: f32 = PX_GAME_HEIGHT * 2.0;
pub const SPRITE_SCALE: f32 = 2.0;

/// Largest datagram either side will send or accept.
pub const MAX_PACKET_SIZE: usize = 65_507;
pub const PROTOCOL_VERSION: u32 = 1;

pub fn phys_from_px(px: f32) -> f32 {
    px * PHYS_SCALE
}

pub fn px_from_phys(phys: f32) -> f32 {
    (phys / PHYS_SCALE).round()
}

pub fn phys_from_sprite_px(spx: f32) -> f32 {
    phys_from_px(spx * SPRITE_SCALE)
}

/// `a*(1-t) + b*t`, exact at both ends.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    Disconnect,

    Connected {
        client_id: u32,
    },
    Disconnected {
        reason: String,
    },

    /// Client to server: own player (unless done) followed by the drained
    /// outbound queue. Server to client: the full entity list.
    Update {
        entities: Vec<EntityRecord>,
    },
    /// Client to server asks for a new world; server to client announces one.
    Reset,
}

/// Keyboard state sampled once per rendered frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: set when the action key goes down, cleared by the
    /// first tick that sees it.
    pub action_pressed: bool,
}

impl InputState {
    /// Horizontal and vertical input in `{-1, 0, 1}`.
    pub fn axes(&self) -> (f32, f32) {
        let mut x = 0.0;
        let mut y = 0.0;
        if self.left {
            x -= 1.0;
        }
        if self.right {
            x += 1.0;
        }
        if self.up {
            y -= 1.0;
        }
        if self.down {
            y += 1.0;
        }
        (x, y)
    }

    /// Takes this frame's keyboard sample. Held keys are replaced; an action
    /// press stays pending until a tick consumes it, so frames that run no
    /// tick do not lose it.
    pub fn latch(&mut self, sampled: &InputState) {
        self.up = sampled.up;
        self.down = sampled.down;
        self.left = sampled.left;
        self.right = sampled.right;
        self.action_pressed |= sampled.action_pressed;
    }

    /// Clears edge-triggered state once the first tick of a frame consumed it.
    pub fn end_frame(&mut self) {
        self.action_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_unit_conversion() {
        assert_eq!(phys_from_px(10.0), 640.0);
        assert_eq!(px_from_phys(640.0), 10.0);
        assert_eq!(px_from_phys(650.0), 10.0);
        assert_eq!(phys_from_sprite_px(14.0), 28.0 * PHYS_SCALE);
    }

    #[test]
    fn test_lerp_endpoints_are_exact() {
        assert_eq!(lerp(0.1, 0.3, 1.0), 0.3);
        assert_eq!(lerp(0.1, 0.3, 0.0), 0.1);
        assert_approx_eq!(lerp(0.0, 10.0, 0.3), 3.0, 1e-5);
    }

    #[test]
    fn test_input_axes() {
        let input = InputState {
            left: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(input.axes(), (-1.0, 1.0));

        let both = InputState {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.axes(), (0.0, 0.0));
    }

    #[test]
    fn test_end_frame_clears_action() {
        let mut input = InputState {
            action_pressed: true,
            up: true,
            ..Default::default()
        };
        input.end_frame();
        assert!(!input.action_pressed);
        assert!(input.up);
    }

    #[test]
    fn test_latch_keeps_pending_action() {
        let mut input = InputState::default();
        input.latch(&InputState {
            action_pressed: true,
            ..Default::default()
        });
        input.latch(&InputState {
            right: true,
            ..Default::default()
        });
        assert!(input.action_pressed);
        assert!(input.right);

        input.end_frame();
        input.latch(&InputState::default());
        assert!(!input.action_pressed);
        assert!(!input.right);
    }

    #[test]
    fn test_packet_serialization_update() {
        let record = EntityRecord::new("tree", "e1");
        let packet = Packet::Update {
            entities: vec![record.clone()],
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Update { entities } => {
                assert_eq!(entities.len(), 1);
                assert_eq!(entities[0], record);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_connect() {
        let packet = Packet::Connect { client_version: 42 };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();
        assert_eq!(deserialized, packet);
    }
}
