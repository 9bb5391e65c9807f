use clap::Parser;
use client::game::ClientGame;
use client::input::InputManager;
use client::network::{NetworkEvent, NetworkHandle};
use client::rendering::{Renderer, UiConfig};
use log::{error, info, warn};
use macroquad::prelude::*;
use shared::{
    FixedStepper, InputState, Packet, FRAME_LENGTH, MAX_STEPS_PER_FRAME, NETWORK_INTERVAL_MS,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: usize,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: usize,

    /// Seed for the client-only scenery
    #[arg(long, default_value = "1")]
    seed: u64,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Kitastrophe".to_owned(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("Client error: {}", e);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    if args.fake_ping > 0 {
        info!("Simulating {}ms latency", args.fake_ping);
    }
    info!("Controls: WASD/arrows to move, Space to pick up, throw or roll");
    info!("Press 1 to toggle smoothing, B to toggle collision boxes");

    let mut network = NetworkHandle::spawn(&args.server, args.fake_ping)?;
    let mut game = ClientGame::new(args.seed)?;
    let mut input_manager = InputManager::new();
    let mut renderer = Renderer::new(args.width, args.height);
    let mut stepper = FixedStepper::new(FRAME_LENGTH as f64, MAX_STEPS_PER_FRAME);
    let mut input = InputState::default();

    let network_interval = NETWORK_INTERVAL_MS as f64 / 1000.0;
    let mut last_send = get_time();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        for event in network.poll() {
            match event {
                NetworkEvent::Update { entities } => {
                    game.apply_server_update(&entities);
                }
                NetworkEvent::Reset => game.apply_reset()?,
                NetworkEvent::Connected { .. } => {}
                NetworkEvent::Disconnected { reason } => {
                    warn!("Lost connection: {}", reason);
                }
            }
        }

        let (sampled, toggles) = input_manager.update();
        input.latch(&sampled);
        if toggles.smoothing {
            game.smoothing = !game.smoothing;
            info!("Smoothing: {}", game.smoothing);
        }
        if toggles.boxes {
            game.show_boxes = !game.show_boxes;
        }

        let now = get_time();
        stepper.advance(now, |dt| game.update(dt, &mut input));

        if game.take_reset_request() {
            network.send(Packet::Reset);
        }

        if network.is_connected() && now - last_send >= network_interval {
            last_send = now;
            network.send(Packet::Update {
                entities: game.server_update_data(),
            });
        }

        renderer.render(
            &game,
            UiConfig {
                client_id: network.client_id(),
                smoothing_enabled: game.smoothing,
                boxes_enabled: game.show_boxes,
                fake_ping_ms: args.fake_ping,
                entity_count: game.world().entities.len(),
            },
        );

        next_frame().await;
    }

    network.shutdown();
    Ok(())
}
