//! Initial population of a round. Only the server runs this; clients receive
//! the result through snapshots.

use crate::entity::Entity;
use crate::ids::IdGenerator;
use crate::kinds::{create_entity, HoldableType, Kind};
use crate::{phys_from_px, DecodeError, PX_WORLD_HEIGHT, PX_WORLD_WIDTH};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Placement attempts per entity before accepting an overlap.
const MAX_PLACEMENT_ATTEMPTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGenConfig {
    pub seed: u64,
    pub trees: usize,
    pub holdables: usize,
    pub mons: usize,
    pub houses: usize,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            trees: 40,
            holdables: 20,
            mons: 5,
            houses: 5,
        }
    }
}

/// Seeded world generator. Round `n` uses `seed + n`, so two generators built
/// from the same config produce the same sequence of worlds. Ids keep
/// counting across rounds.
pub struct WorldGen {
    config: WorldGenConfig,
    ids: IdGenerator,
    round: u64,
}

impl WorldGen {
    pub fn new(config: WorldGenConfig) -> Self {
        Self {
            config,
            ids: IdGenerator::new("e"),
            round: 0,
        }
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Builds the next round's entity list: timer, cat, houses, trees,
    /// holdables, then mons.
    pub fn generate(&mut self) -> Result<Vec<Entity>, DecodeError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(self.round));
        self.round += 1;

        let mut entities = Vec::new();
        entities.push(self.spawn("timer")?);

        let mut cat = self.spawn("cat")?;
        cat.set_mid_x(phys_from_px(PX_WORLD_WIDTH / 2.0));
        cat.set_max_y(0.0);
        entities.push(cat);

        let houses = self.config.houses.max(1);
        let spacing = PX_WORLD_WIDTH / houses as f32;
        for i in 0..houses {
            let mut house = self.spawn("house")?;
            house.set_mid_x(phys_from_px(((i as f32 + 0.5) * spacing).round()));
            house.set_max_y(phys_from_px(PX_WORLD_HEIGHT));
            entities.push(house);
        }

        for _ in 0..self.config.trees {
            let tree = place(&mut rng, self.spawn("tree")?, &entities, 0.15, 0.85);
            entities.push(tree);
        }

        for _ in 0..self.config.holdables {
            let mut holdable = self.spawn("holdable")?;
            let holdable_type = HoldableType::ALL[rng.gen_range(0..HoldableType::ALL.len())];
            if let Kind::Holdable(state) = &mut holdable.kind {
                state.holdable_type = holdable_type;
            }
            let holdable = place(&mut rng, holdable, &entities, 0.1, 0.85);
            entities.push(holdable);
        }

        for _ in 0..self.config.mons {
            let mon = place(&mut rng, self.spawn("mon")?, &entities, 0.2, 0.8);
            entities.push(mon);
        }

        info!(
            "Generated round {} with {} entities (seed {})",
            self.round,
            entities.len(),
            self.config.seed
        );
        Ok(entities)
    }

    fn spawn(&mut self, tag: &str) -> Result<Entity, DecodeError> {
        create_entity(tag, &self.ids.next_id())
    }
}

/// Drops `entity` at a random whole-pixel spot between the given fractions of
/// the world height, retrying while it overlaps something already placed.
fn place(rng: &mut StdRng, mut entity: Entity, placed: &[Entity], min_y: f32, max_y: f32) -> Entity {
    for attempt in 0..MAX_PLACEMENT_ATTEMPTS {
        let px_x = rng.gen_range(0.0..PX_WORLD_WIDTH).round();
        let px_y = rng.gen_range(min_y * PX_WORLD_HEIGHT..max_y * PX_WORLD_HEIGHT).round();
        entity.set_mid_x(phys_from_px(px_x));
        entity.set_max_y(phys_from_px(px_y));

        if !placed.iter().any(|other| entity.is_touching(other, 0.0)) {
            return entity;
        }
        if attempt + 1 == MAX_PLACEMENT_ATTEMPTS {
            debug!("No free spot for {} {}, keeping overlap", entity.tag(), entity.id);
        }
    }
    entity
}
