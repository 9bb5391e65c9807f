//! # Kitastrophe Server Library
//!
//! The authoritative side of the simulation. The server owns the canonical
//! entity list, advances it at a fixed 60 Hz step, and broadcasts the whole
//! list to every client twenty times per second.
//!
//! ## Authority split
//!
//! Everything except the players is simulated here: the cat walking toward
//! the houses, mons wandering the map, thrown items landing, the round timer.
//! Each client simulates its own mouse and pushes it upstream with every
//! update, together with any entity it touched locally (a picked-up or thrown
//! item). The server merges those records through [`shared::reconcile_server`]
//! and never creates players itself.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Connection bookkeeping:
//! - Address lookup and capacity limits
//! - Timeout detection
//! - The player entity id each client announced
//!
//! ### Game Module (`game`)
//! The world, the round generator and the fixed-step driver.
//!
//! ### Network Module (`network`)
//! UDP socket handling and the main `tokio::select!` loop that interleaves
//! incoming packets, simulation ticks and snapshot broadcasts.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("127.0.0.1:8080", ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! Internally the server spawns three tasks next to the main loop:
//! - **Network Receiver**: decodes incoming datagrams
//! - **Network Sender**: drains the outgoing queue and fans out broadcasts
//! - **Timeout Checker**: drops silent clients and retires their players

pub mod client_manager;
pub mod game;
pub mod network;
