use log::{debug, info};
use shared::{
    reconcile_server, DecodeError, EntityRecord, FixedStepper, ReconcileReport, Side, World,
    WorldGen, WorldGenConfig, FRAME_LENGTH, MAX_STEPS_PER_FRAME,
};

/// The authoritative simulation: one world, its generator and the stepper
/// that drives it from wall-clock time.
pub struct ServerGame {
    world: World,
    worldgen: WorldGen,
    stepper: FixedStepper,
}

impl ServerGame {
    pub fn new(config: WorldGenConfig) -> Result<Self, DecodeError> {
        let mut world = World::new(Side::Server, config.seed);
        let mut worldgen = WorldGen::new(config);
        world.entities = worldgen.generate()?;

        Ok(Self {
            world,
            worldgen,
            stepper: FixedStepper::new(FRAME_LENGTH as f64, MAX_STEPS_PER_FRAME),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Throws the current round away and generates the next one.
    pub fn reset(&mut self) -> Result<(), DecodeError> {
        let entities = self.worldgen.generate()?;
        self.world.clear();
        self.world.entities = entities;
        info!(
            "World reset (round {}, {} entities)",
            self.worldgen.round(),
            self.world.entities.len()
        );
        Ok(())
    }

    /// Merges one client's `Update` payload.
    pub fn apply_client_update(&mut self, records: &[EntityRecord]) -> ReconcileReport {
        let report = reconcile_server(&mut self.world, records);
        if report.failed > 0 {
            debug!("Client update: {:?}", report);
        }
        report
    }

    /// Runs every tick owed up to `now` (seconds since the server started).
    pub fn advance(&mut self, now: f64) -> u32 {
        let world = &mut self.world;
        let steps = self.stepper.advance(now, |dt| world.tick(dt));
        // Clients learn about everything from the full snapshot.
        world.outbound.clear();
        steps
    }

    /// Marks a departed client's player done. Returns false if it was already gone.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        match self.world.find_mut(player_id) {
            Some(player) => {
                player.done = true;
                info!("Removed player {}", player_id);
                true
            }
            None => false,
        }
    }

    /// The full entity list, in order, for broadcasting.
    pub fn snapshot(&self) -> Vec<EntityRecord> {
        self.world.snapshot()
    }

    pub fn is_game_over(&self) -> bool {
        self.world.game_over
    }
}
