//! Performance benchmarks for critical game systems
//!
//! Limits are loose enough for unoptimized test builds; they catch
//! accidental blowups, not small regressions.

use bincode::{deserialize, serialize};
use client::game::ClientGame;
use server::game::ServerGame;
use shared::{
    create_entity, reconcile_server, InputState, Packet, Side, World, WorldGen, WorldGenConfig,
    FRAME_LENGTH,
};
use std::time::Instant;

fn populated_world() -> World {
    let mut world = World::new(Side::Server, 1);
    world.entities = WorldGen::new(WorldGenConfig {
        seed: 1,
        ..Default::default()
    })
    .generate()
    .unwrap();
    world
}

/// Benchmarks ten seconds of simulation on a full default world
#[test]
fn benchmark_world_tick() {
    let mut world = populated_world();
    let entity_count = world.entities.len();

    let iterations = 600;
    let start = Instant::now();

    for _ in 0..iterations {
        world.tick(FRAME_LENGTH);
    }

    let duration = start.elapsed();
    println!(
        "World tick: {} ticks over {} entities in {:?} ({:.2} μs/tick)",
        iterations,
        entity_count,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 10_000);
}

/// Benchmarks a crowded world where every body overlaps its neighbours
#[test]
fn benchmark_crowded_collisions() {
    let mut world = World::new(Side::Server, 2);
    for i in 0..100 {
        let mut mon = create_entity("mon", &format!("mon{}", i)).unwrap();
        mon.set_mid_x(shared::phys_from_px(400.0 + (i % 10) as f32 * 5.0));
        mon.set_mid_y(shared::phys_from_px(400.0 + (i / 10) as f32 * 5.0));
        world.push(mon);
    }

    let iterations = 120;
    let start = Instant::now();

    for _ in 0..iterations {
        world.tick(FRAME_LENGTH);
    }

    let duration = start.elapsed();
    println!(
        "Crowded collisions: {} ticks in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(world.entities.len(), 100);
    assert!(duration.as_millis() < 10_000);
}

/// Benchmarks snapshot encoding and datagram serialization
#[test]
fn benchmark_packet_serialization() {
    let world = populated_world();
    let iterations = 1000;
    let start = Instant::now();

    let mut bytes = 0;
    for _ in 0..iterations {
        let packet = Packet::Update {
            entities: world.snapshot(),
        };
        let data = serialize(&packet).unwrap();
        let _: Packet = deserialize(&data).unwrap();
        bytes = data.len();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot round trip: {} iterations of {} bytes in {:?}",
        iterations, bytes, duration
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks client reconciliation against full server snapshots
#[test]
fn benchmark_client_reconciliation() {
    let mut server = ServerGame::new(WorldGenConfig {
        seed: 4,
        ..Default::default()
    })
    .unwrap();
    let mut client = ClientGame::new(4).unwrap();

    let iterations = 1000;
    let start = Instant::now();

    server.advance(0.0);
    for i in 1..=iterations {
        server.advance(i as f64 * FRAME_LENGTH as f64);
        client.apply_server_update(&server.snapshot());
        client.update(FRAME_LENGTH, &mut InputState::default());
    }

    let duration = start.elapsed();
    println!(
        "Client reconciliation: {} snapshots in {:?} ({:.2} μs/snapshot)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(client.world().entities.len() > 1);
    assert!(duration.as_millis() < 20_000);
}

/// Benchmarks the server merging many client updates
#[test]
fn benchmark_server_reconciliation() {
    let mut world = populated_world();
    let updates: Vec<_> = (0..32)
        .map(|i| {
            let mut mouse = create_entity("mouse", &format!("player{}", i)).unwrap();
            mouse.x = i as f32 * 5000.0;
            mouse.to_record()
        })
        .collect();

    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        reconcile_server(&mut world, &updates);
    }

    let duration = start.elapsed();
    println!(
        "Server reconciliation: {} batches of {} in {:?}",
        iterations,
        updates.len(),
        duration
    );

    assert!(world.find("player31").is_some());
    assert!(duration.as_millis() < 5000);
}
