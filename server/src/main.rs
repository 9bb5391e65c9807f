use clap::Parser;
use log::info;
use server::network::{Server, ServerConfig};
use shared::WorldGenConfig;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Simulation timer rate in Hz
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Snapshot broadcasts per second
    #[arg(short, long, default_value = "20")]
    broadcast_rate: u32,

    /// Maximum number of connected clients
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// World generation seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Trees per round
    #[arg(long, default_value = "40")]
    trees: usize,

    /// Holdable items per round
    #[arg(long, default_value = "20")]
    holdables: usize,

    /// Mons per round
    #[arg(long, default_value = "5")]
    mons: usize,
}

fn rate_to_duration(rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / rate.max(1) as f64)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = ServerConfig {
        tick_duration: rate_to_duration(args.tick_rate),
        broadcast_duration: rate_to_duration(args.broadcast_rate),
        max_clients: args.max_clients,
        worldgen: WorldGenConfig {
            seed,
            trees: args.trees,
            holdables: args.holdables,
            mons: args.mons,
            ..Default::default()
        },
    };

    let addr = format!("{}:{}", args.host, args.port);
    info!("Starting server on {}", addr);
    info!(
        "Tick rate: {}Hz, broadcast rate: {}Hz, max clients: {}, seed: {}",
        args.tick_rate, args.broadcast_rate, args.max_clients, seed
    );

    let mut server = Server::new(&addr, config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
