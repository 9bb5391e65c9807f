//! # Kitastrophe Client Library
//!
//! The player's side of the game. Each client predicts its own mouse locally
//! and runs the same fixed-step simulation as the server for everything else,
//! correcting toward the server's snapshots as they arrive.
//!
//! ## Frame loop
//!
//! Once per rendered frame the client:
//! 1. Applies every packet that arrived since the last frame
//! 2. Samples the keyboard; an action press stays pending until a tick
//!    consumes it
//! 3. Runs as many fixed ticks as wall-clock time owes
//! 4. Every 50 ms sends its player plus locally touched entities upstream
//! 5. Renders the world centred on the player, or on the cat once the
//!    player is out
//!
//! ## Authority split
//!
//! The client never lets a snapshot move its own player, and it ignores
//! snapshot records for entities it changed locally but has not yet sent.
//! Everything else follows the server, blended over a few frames when
//! smoothing is on.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Client world state: player spawn, scenery, reconciliation, round timing
//! and the camera. Free of any windowing code so it can be tested headless.
//!
//! ### Input Module (`input`)
//! Keyboard sampling with edge detection for the action and debug keys.
//!
//! ### Network Module (`network`)
//! A background thread hosting a tokio runtime that owns the UDP socket and
//! trades packets with the frame loop over channels.
//!
//! ### Rendering Module (`rendering`)
//! Macroquad implementation of the shared `Surface` trait plus the HUD.
//!
//! ## Controls
//!
//! - WASD / arrow keys: walk
//! - Space: pick up, throw, or roll; restarts the round after game over
//! - 1: toggle snapshot smoothing
//! - B: toggle collision boxes

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
