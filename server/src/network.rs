//! Server network layer handling UDP communications and game loop coordination

use crate::client_manager::{Client, ClientManager, CLIENT_TIMEOUT};
use crate::game::ServerGame;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, WorldGenConfig, MAX_PACKET_SIZE, NETWORK_INTERVAL_MS, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, MissedTickBehavior};

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { client: Client },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: Packet,
        exclude: Option<u32>,
    },
}

/// Runtime settings for [`Server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interval of the simulation timer; the stepper still ticks in fixed frames.
    pub tick_duration: Duration,
    /// Interval between full snapshot broadcasts.
    pub broadcast_duration: Duration,
    pub max_clients: usize,
    pub worldgen: WorldGenConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_duration: Duration::from_millis(16),
            broadcast_duration: Duration::from_millis(NETWORK_INTERVAL_MS),
            max_clients: 32,
            worldgen: WorldGenConfig::default(),
        }
    }
}

/// Main server coordinating networking and game simulation
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    game: ServerGame,
    tick_duration: Duration,
    broadcast_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(addr: &str, config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let game = ServerGame::new(config.worldgen)?;

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(config.max_clients))),
            game,
            tick_duration: config.tick_duration,
            broadcast_duration: config.broadcast_duration,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    /// Address the socket is actually bound to (useful after binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, exclude } => {
                        let client_addrs = {
                            let clients_guard = clients.read().await;
                            clients_guard.get_client_addrs()
                        };

                        for (client_id, addr) in client_addrs {
                            if Some(client_id) == exclude {
                                continue;
                            }

                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    async fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts(CLIENT_TIMEOUT)
                };

                for client in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout { client }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let data = serialize(packet)?;
        if data.len() > MAX_PACKET_SIZE {
            return Err(format!("packet of {} bytes exceeds datagram limit", data.len()).into());
        }
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet, exclude: Option<u32>) {
        if let Err(e) = self.game_tx.send(GameMessage::BroadcastPacket { packet, exclude }) {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Marks the player of a departed client done.
    fn drop_client_player(&mut self, client: &Client) {
        if let Some(player_id) = &client.player_id {
            self.game.remove_player(player_id);
        }
    }

    /// Processes incoming packets and updates game state
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!(
                    "Client connecting from {} (version: {})",
                    addr, client_version
                );

                if client_version != PROTOCOL_VERSION {
                    self.send_packet(
                        Packet::Disconnected {
                            reason: "Protocol version mismatch".to_string(),
                        },
                        addr,
                    );
                    return;
                }

                // Remove existing connection if present
                let existing = {
                    let mut clients = self.clients.write().await;
                    match clients.find_client_by_addr(addr) {
                        Some(existing_id) => clients.remove_client(&existing_id),
                        None => None,
                    }
                };
                if let Some(existing) = existing {
                    info!("Replacing existing client {} from {}", existing.id, addr);
                    self.drop_client_player(&existing);
                }

                // Try to add new client
                let client_id = {
                    let mut clients = self.clients.write().await;
                    clients.add_client(addr)
                };

                if let Some(client_id) = client_id {
                    self.send_packet(Packet::Connected { client_id }, addr);
                    self.send_packet(
                        Packet::Update {
                            entities: self.game.snapshot(),
                        },
                        addr,
                    );
                } else {
                    self.send_packet(
                        Packet::Disconnected {
                            reason: "Server full".to_string(),
                        },
                        addr,
                    );
                }
            }

            Packet::Update { entities } => {
                let client_id = {
                    let mut clients = self.clients.write().await;
                    let client_id = clients.find_client_by_addr(addr);
                    if let Some(client_id) = client_id {
                        clients.touch(client_id);
                        if let Some(player) = entities.iter().find(|r| r.kind == "mouse") {
                            clients.set_player(client_id, &player.id);
                        }
                    }
                    client_id
                };

                match client_id {
                    Some(client_id) => {
                        let report = self.game.apply_client_update(&entities);
                        debug!("Update from client {}: {:?}", client_id, report);
                    }
                    None => warn!("Update from unknown address {}", addr),
                }
            }

            Packet::Reset => {
                let known = {
                    let clients = self.clients.read().await;
                    clients.find_client_by_addr(addr).is_some()
                };
                if !known {
                    warn!("Reset from unknown address {}", addr);
                    return;
                }

                match self.game.reset() {
                    Ok(()) => {
                        info!("Reset requested by {}", addr);
                        self.broadcast_packet(Packet::Reset, None);
                        self.broadcast_game_state().await;
                    }
                    Err(e) => error!("World reset failed: {}", e),
                }
            }

            Packet::Disconnect => {
                let removed = {
                    let mut clients = self.clients.write().await;
                    match clients.find_client_by_addr(addr) {
                        Some(client_id) => clients.remove_client(&client_id),
                        None => None,
                    }
                };

                if let Some(client) = removed {
                    self.drop_client_player(&client);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Broadcasts the full entity list to all connected clients
    async fn broadcast_game_state(&mut self) {
        let client_count = {
            let clients = self.clients.read().await;
            clients.len()
        };

        if client_count == 0 {
            return;
        }

        self.broadcast_packet(
            Packet::Update {
                entities: self.game.snapshot(),
            },
            None,
        );
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize concurrent tasks
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut broadcast_interval = interval(self.broadcast_duration);
        broadcast_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let started = Instant::now();
        let mut total_ticks: u64 = 0;

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client }) => {
                            info!("Client {} timed out", client.id);
                            self.drop_client_player(&client);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Advance the simulation to wall-clock time
                _ = tick_interval.tick() => {
                    let steps = self.game.advance(started.elapsed().as_secs_f64());
                    let before = total_ticks;
                    total_ticks += steps as u64;

                    // Periodic performance monitoring
                    if before / 600 != total_ticks / 600 {
                        let client_count = {
                            let clients = self.clients.read().await;
                            clients.len()
                        };
                        debug!(
                            "Tick {}: {} clients, {} entities",
                            total_ticks,
                            client_count,
                            self.game.world().entities.len()
                        );
                    }
                },

                _ = broadcast_interval.tick() => {
                    self.broadcast_game_state().await;
                },
            }
        }

        Ok(())
    }
}
