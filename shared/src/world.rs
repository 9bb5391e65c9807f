//! The entity list owned by one simulation instance, plus the lifecycle sweep
//! and the queue of local changes waiting to be pushed to the peer.

use crate::codec::EntityRecord;
use crate::entity::Entity;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Server,
    Client,
}

/// Everything a behaviour hook may touch besides the entity slice.
pub struct TickContext<'a> {
    pub outbound: &'a mut OutboundQueue,
    pub game_over: &'a mut bool,
    pub side: Side,
    pub rng: &'a mut StdRng,
}

/// Local changes to push with the next outbound `Update`, keyed by id in
/// insertion order. Re-queueing an id replaces its snapshot in place.
#[derive(Debug, Clone, Default)]
pub struct OutboundQueue {
    entries: Vec<EntityRecord>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: &Entity) {
        let record = entity.to_record();
        match self.entries.iter_mut().find(|queued| queued.id == record.id) {
            Some(queued) => *queued = record,
            None => self.entries.push(record),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|queued| queued.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the queue. Entities still in `live` are re-encoded so the peer
    /// gets their current state; the rest use the snapshot taken when queued.
    pub fn drain(&mut self, live: &[Entity]) -> Vec<EntityRecord> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|queued| match live.iter().find(|e| e.id == queued.id) {
                Some(entity) => entity.to_record(),
                None => queued,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub struct World {
    /// Stable insertion order; ticks and collision scans follow it.
    pub entities: Vec<Entity>,
    pub outbound: OutboundQueue,
    pub game_over: bool,
    side: Side,
    rng: StdRng,
}

impl World {
    pub fn new(side: Side, seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            outbound: OutboundQueue::new(),
            game_over: false,
            side,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Splits the world into the entity slice and the context hooks receive.
    pub fn split(&mut self) -> (&mut [Entity], TickContext<'_>) {
        let World {
            entities,
            outbound,
            game_over,
            side,
            rng,
        } = self;
        (
            entities.as_mut_slice(),
            TickContext {
                outbound,
                game_over,
                side: *side,
                rng,
            },
        )
    }

    /// One fixed step: every entity in list order, then the sweep.
    pub fn tick(&mut self, dt: f32) {
        {
            let (entities, mut ctx) = self.split();
            for index in 0..entities.len() {
                let behavior = entities[index].kind.behavior();
                behavior.tick(entities, index, dt, &mut ctx);
            }
        }
        self.sweep();
    }

    /// Removes every done entity, walking backwards so pending indices stay
    /// valid. Relative order of survivors is preserved.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for index in (0..self.entities.len()).rev() {
            if self.entities[index].done {
                let entity = self.entities.remove(index);
                debug!("Done: {} {}", entity.tag(), entity.id);
                removed += 1;
            }
        }
        removed
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn first_of(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag() == tag)
    }

    pub fn snapshot(&self) -> Vec<EntityRecord> {
        self.entities.iter().map(Entity::to_record).collect()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.outbound.clear();
        self.game_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::create_entity;
    use crate::FRAME_LENGTH;

    fn world_of(tags: &[&str]) -> World {
        let mut world = World::new(Side::Server, 7);
        for (i, tag) in tags.iter().enumerate() {
            let mut entity = create_entity(tag, &format!("e{}", i)).unwrap();
            entity.x = i as f32 * 10_000.0;
            world.push(entity);
        }
        world
    }

    #[test]
    fn test_sweep_keeps_odd_indices_in_order() {
        let mut world = world_of(&["tree"; 9]);
        for (i, entity) in world.entities.iter_mut().enumerate() {
            entity.done = i % 2 == 0;
        }

        let removed = world.sweep();

        assert_eq!(removed, 5);
        let ids: Vec<&str> = world.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3", "e5", "e7"]);
    }

    #[test]
    fn test_tick_sweeps_after_update() {
        let mut world = world_of(&["tree", "tree"]);
        world.entities[0].done = true;

        world.tick(FRAME_LENGTH);

        assert_eq!(world.entities.len(), 1);
        assert_eq!(world.entities[0].id, "e1");
        assert_eq!(world.entities[0].anim_count, FRAME_LENGTH);
    }

    #[test]
    fn test_identical_worlds_tick_identically() {
        let build = || {
            let mut world = World::new(Side::Server, 42);
            let mut worldgen = crate::WorldGen::new(crate::WorldGenConfig {
                seed: 42,
                ..Default::default()
            });
            world.entities = worldgen.generate().unwrap();
            world
        };
        let (mut a, mut b) = (build(), build());

        for _ in 0..120 {
            a.tick(FRAME_LENGTH);
            b.tick(FRAME_LENGTH);
        }

        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_damping_converges_without_overshoot() {
        let mut world = World::new(Side::Client, 1);
        let mut tree = create_entity("tree", "t").unwrap();
        let dx0 = 5000.0;
        tree.dx = dx0;
        world.push(tree);

        let per_tick = world.entities[0].damp_acceleration * FRAME_LENGTH;
        let bound = (dx0 / per_tick).ceil() as usize;
        let mut last = dx0;
        for _ in 0..bound {
            world.tick(FRAME_LENGTH);
            let dx = world.entities[0].dx;
            assert!(dx >= 0.0 && dx < last);
            last = dx;
        }
        assert_eq!(world.entities[0].dx, 0.0);
    }

    #[test]
    fn test_outbound_requeue_replaces() {
        let mut queue = OutboundQueue::new();
        let mut entity = create_entity("holdable", "h").unwrap();
        queue.push(&entity);
        entity.x = 99.0;
        queue.push(&entity);

        assert_eq!(queue.len(), 1);
        let drained = queue.drain(&[]);
        assert_eq!(drained[0].x, 99.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_outbound_drain_prefers_live_state() {
        let mut queue = OutboundQueue::new();
        let mut entity = create_entity("holdable", "h").unwrap();
        queue.push(&entity);
        entity.x = 500.0;

        let drained = queue.drain(std::slice::from_ref(&entity));

        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].x, 500.0);
    }

    #[test]
    fn test_snapshot_follows_list_order() {
        let world = world_of(&["tree", "house", "timer"]);
        let kinds: Vec<String> = world.snapshot().into_iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec!["tree", "house", "timer"]);
    }
}
