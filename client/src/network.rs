//! Client networking on a background thread.
//!
//! Macroquad owns the main thread and its frame loop is synchronous, so the
//! socket lives on a dedicated thread running a small tokio runtime. The two
//! sides talk through unbounded channels: the frame loop queues outgoing
//! packets and drains decoded events once per frame.

use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::{EntityRecord, Packet, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Something the server told us, already decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Connected { client_id: u32 },
    Disconnected { reason: String },
    Update { entities: Vec<EntityRecord> },
    Reset,
}

#[derive(Debug)]
enum NetworkCommand {
    Send(Packet),
    Shutdown,
}

/// Frame-loop side of the network thread
pub struct NetworkHandle {
    commands: mpsc::UnboundedSender<NetworkCommand>,
    events: mpsc::UnboundedReceiver<NetworkEvent>,
    thread: Option<JoinHandle<()>>,
    client_id: Option<u32>,
}

impl NetworkHandle {
    /// Starts the network thread and sends the connection request.
    /// `fake_ping_ms` is split evenly between the two directions.
    pub fn spawn(server_addr: &str, fake_ping_ms: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let thread = std::thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                let delay = Duration::from_millis(fake_ping_ms / 2);
                let result = runtime.block_on(run_network(server_addr, delay, command_rx, event_tx.clone()));
                if let Err(e) = result {
                    error!("Network thread stopped: {}", e);
                    let _ = event_tx.send(NetworkEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
            })?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            thread: Some(thread),
            client_id: None,
        })
    }

    pub fn client_id(&self) -> Option<u32> {
        self.client_id
    }

    pub fn is_connected(&self) -> bool {
        self.client_id.is_some()
    }

    pub fn send(&self, packet: Packet) {
        if self.commands.send(NetworkCommand::Send(packet)).is_err() {
            warn!("Network thread is gone, dropping packet");
        }
    }

    /// Every event that arrived since the last call, in arrival order.
    pub fn poll(&mut self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            match &event {
                NetworkEvent::Connected { client_id } => self.client_id = Some(*client_id),
                NetworkEvent::Disconnected { .. } => self.client_id = None,
                _ => {}
            }
            events.push(event);
        }
        events
    }

    /// Says goodbye to the server and waits for the thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.commands.send(NetworkCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Network thread panicked");
            }
        }
    }
}

async fn run_network(
    server_addr: SocketAddr,
    delay: Duration,
    mut commands: mpsc::UnboundedReceiver<NetworkCommand>,
    events: mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let socket = Arc::new(UdpSocket::bind("0.0.0.0:0").await?);
    info!("Connecting to {} from {}", server_addr, socket.local_addr()?);

    send_packet(
        &socket,
        server_addr,
        &Packet::Connect {
            client_version: PROTOCOL_VERSION,
        },
    )
    .await;

    let mut buffer = vec![0u8; MAX_PACKET_SIZE];

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buffer) => {
                match result {
                    Ok((len, addr)) => {
                        if addr != server_addr {
                            warn!("Ignoring datagram from {}", addr);
                            continue;
                        }
                        match deserialize::<Packet>(&buffer[..len]) {
                            Ok(packet) => {
                                if let Some(event) = to_event(packet) {
                                    deliver(&events, event, delay);
                                }
                            }
                            Err(e) => warn!("Failed to deserialize packet: {}", e),
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        sleep(Duration::from_millis(10)).await;
                    }
                }
            },

            command = commands.recv() => {
                match command {
                    Some(NetworkCommand::Send(packet)) => {
                        if delay.is_zero() {
                            send_packet(&socket, server_addr, &packet).await;
                        } else {
                            let socket = Arc::clone(&socket);
                            tokio::spawn(async move {
                                sleep(delay).await;
                                send_packet(&socket, server_addr, &packet).await;
                            });
                        }
                    }
                    Some(NetworkCommand::Shutdown) | None => {
                        send_packet(&socket, server_addr, &Packet::Disconnect).await;
                        info!("Disconnected from server");
                        break;
                    }
                }
            },
        }
    }

    Ok(())
}

fn to_event(packet: Packet) -> Option<NetworkEvent> {
    match packet {
        Packet::Connected { client_id } => {
            info!("Connected! Client ID: {}", client_id);
            Some(NetworkEvent::Connected { client_id })
        }
        Packet::Disconnected { reason } => {
            warn!("Disconnected: {}", reason);
            Some(NetworkEvent::Disconnected { reason })
        }
        Packet::Update { entities } => Some(NetworkEvent::Update { entities }),
        Packet::Reset => Some(NetworkEvent::Reset),
        other => {
            warn!("Unexpected packet type: {:?}", other);
            None
        }
    }
}

fn deliver(events: &mpsc::UnboundedSender<NetworkEvent>, event: NetworkEvent, delay: Duration) {
    if delay.is_zero() {
        let _ = events.send(event);
        return;
    }
    let events = events.clone();
    tokio::spawn(async move {
        sleep(delay).await;
        let _ = events.send(event);
    });
}

async fn send_packet(socket: &UdpSocket, addr: SocketAddr, packet: &Packet) {
    let data = match serialize(packet) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to serialize packet: {}", e);
            return;
        }
    };
    if data.len() > MAX_PACKET_SIZE {
        warn!("Dropping {} byte packet, too large for one datagram", data.len());
        return;
    }
    if let Err(e) = socket.send_to(&data, addr).await {
        error!("Failed to send packet to {}: {}", addr, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_event_maps_server_packets() {
        assert_eq!(
            to_event(Packet::Connected { client_id: 3 }),
            Some(NetworkEvent::Connected { client_id: 3 })
        );
        assert_eq!(to_event(Packet::Reset), Some(NetworkEvent::Reset));
        assert_eq!(to_event(Packet::Connect { client_version: 1 }), None);
    }

    #[test]
    fn test_spawn_rejects_bad_address() {
        assert!(NetworkHandle::spawn("not an address", 0).is_err());
    }

    #[test]
    fn test_handshake_with_fake_server() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(UdpSocket::bind("127.0.0.1:0")).unwrap();
        let server_addr = server.local_addr().unwrap();

        let mut handle = NetworkHandle::spawn(&server_addr.to_string(), 0).unwrap();

        runtime.block_on(async {
            let mut buffer = vec![0u8; MAX_PACKET_SIZE];
            let (len, client_addr) =
                tokio::time::timeout(Duration::from_secs(2), server.recv_from(&mut buffer))
                    .await
                    .unwrap()
                    .unwrap();
            assert_eq!(
                deserialize::<Packet>(&buffer[..len]).unwrap(),
                Packet::Connect {
                    client_version: PROTOCOL_VERSION
                }
            );

            let reply = serialize(&Packet::Connected { client_id: 9 }).unwrap();
            server.send_to(&reply, client_addr).await.unwrap();
        });

        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(handle.poll());
            if !events.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(events, vec![NetworkEvent::Connected { client_id: 9 }]);
        assert_eq!(handle.client_id(), Some(9));
        handle.shutdown();
    }
}
