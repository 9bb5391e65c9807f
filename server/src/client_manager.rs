//! Connected-client bookkeeping for the game server
//!
//! This module tracks who is connected and which entity each client plays:
//! - Client connection lifecycle (connect, disconnect, timeout)
//! - Address lookup for routing incoming datagrams
//! - The player entity id each client announced in its first update
//! - Capacity limits
//!
//! Clients send their own player entity with every update, so the server
//! never creates players itself. It only needs to remember which id belongs
//! to whom so the player can be removed once the client goes away.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Silence after which a client is considered gone.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Represents a connected client
///
/// Each client maintains:
/// - Connection metadata (ID, address, last activity)
/// - The id of the mouse entity it controls, once known
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
    /// Entity id of this client's player, learned from its updates
    pub player_id: Option<String>,
}

impl Client {
    /// Creates a new client with the given ID and network address
    ///
    /// The player id is unknown until the client's first update arrives.
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            player_id: None,
        }
    }

    /// Records activity from this client
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Checks if the client has exceeded the connection timeout
    ///
    /// Returns true if no packets have been received from this client
    /// within the specified timeout duration, indicating a likely disconnect.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected clients
///
/// The ClientManager provides centralized control over client connections
/// and enforces server capacity limits. Removal hands the client back so the
/// caller can clean up the player entity it owned.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates a new client manager with the specified capacity limit
    ///
    /// Client IDs start from 1 and increment for each new connection.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Attempts to add a new client connection
    ///
    /// Returns Some(client_id) if successful, None if server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        // Enforce server capacity limits
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        let client = Client::new(client_id, addr);
        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, client);

        Some(client_id)
    }

    /// Removes a client from the server
    ///
    /// Returns the removed client, or None if it was already gone. Handles
    /// both explicit disconnections and timeout cleanup.
    pub fn remove_client(&mut self, client_id: &u32) -> Option<Client> {
        let client = self.clients.remove(client_id)?;
        info!("Client {} disconnected", client.id);
        Some(client)
    }

    /// Finds a client ID by their network address
    ///
    /// Used to associate incoming packets with existing client connections.
    /// Returns None if no client is connected from the given address.
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    pub fn get(&self, client_id: u32) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Marks the client as recently active. Returns false for unknown IDs.
    pub fn touch(&mut self, client_id: u32) -> bool {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.touch();
            true
        } else {
            false
        }
    }

    /// Remembers which entity the client plays. The first id wins; later
    /// calls are ignored so a client cannot take over another entity.
    pub fn set_player(&mut self, client_id: u32, player_id: &str) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(client) if client.player_id.is_none() => {
                info!("Client {} plays entity {}", client_id, player_id);
                client.player_id = Some(player_id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Checks for and removes timed-out clients
    ///
    /// Returns the removed clients so their players can be cleaned up.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<Client> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        timed_out
            .iter()
            .filter_map(|client_id| self.remove_client(client_id))
            .collect()
    }

    /// Gets all client IDs and their network addresses
    ///
    /// Used for broadcasting snapshots to all connected clients.
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
