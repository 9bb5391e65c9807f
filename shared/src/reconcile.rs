//! Merging a remote snapshot into the local entity list.
//!
//! Runs between ticks, never during one. Every record is handled on its own:
//! a record that fails to decode is logged and counted, and the rest of the
//! batch still applies.

use crate::codec::EntityRecord;
use crate::entity::Entity;
use crate::kinds::Kind;
use crate::world::World;
use log::{debug, warn};
use std::collections::HashSet;

/// What one merge did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    /// Local entities overwritten by a record of a different kind.
    pub replaced: usize,
    /// Local entities marked done because the snapshot no longer has them.
    pub removed: usize,
    /// Records ignored: the local player, or ids with a pending outbound update.
    pub skipped: usize,
    pub failed: usize,
}

/// Client side merge of a full server snapshot.
///
/// The player's own record is ignored, as is any record whose id still has
/// an outbound update queued. Known ids are merged (blended when `smooth`),
/// unknown ids are created and snapped into place. Afterwards every local
/// entity the snapshot left out is marked done, except the player and ids
/// with a pending outbound update.
///
/// The item the player carries is treated like the player itself: a snapshot
/// older than the pickup may still list it, and recreating it would leave two
/// live entities with one id once the item is thrown.
pub fn reconcile_client(
    world: &mut World,
    player_id: Option<&str>,
    records: &[EntityRecord],
    smooth: bool,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    let held_id = player_id.and_then(|id| held_item_id(world, id));
    let is_owned = |id: &str| player_id == Some(id) || held_id.as_deref() == Some(id);

    for record in records {
        seen.insert(record.id.as_str());
        if is_owned(&record.id) || world.outbound.contains(&record.id) {
            report.skipped += 1;
            continue;
        }
        merge_or_create(world, record, smooth, &mut report);
    }

    let outbound = &world.outbound;
    for entity in world.entities.iter_mut() {
        if entity.done
            || is_owned(&entity.id)
            || seen.contains(entity.id.as_str())
            || outbound.contains(&entity.id)
        {
            continue;
        }
        entity.done = true;
        report.removed += 1;
    }

    debug!("Client reconcile: {:?}", report);
    report
}

/// Server side merge of one client's `Update`.
///
/// Every record snaps into place. Missing entities are left alone since a
/// client only sends what it owns or touched, and a record that arrives
/// already done never creates anything.
pub fn reconcile_server(world: &mut World, records: &[EntityRecord]) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for record in records {
        if record.done && world.index_of(&record.id).is_none() {
            report.skipped += 1;
            continue;
        }
        merge_or_create(world, record, false, &mut report);
    }

    report
}

/// Id of the item carried by the mouse `player_id`, if any.
fn held_item_id(world: &World, player_id: &str) -> Option<String> {
    match &world.find(player_id)?.kind {
        Kind::Mouse(mouse) => mouse.holding.as_ref().map(|held| held.id.clone()),
        _ => None,
    }
}

fn merge_or_create(world: &mut World, record: &EntityRecord, smooth: bool, report: &mut ReconcileReport) {
    let index = match world.index_of(&record.id) {
        Some(index) => index,
        None => {
            match Entity::from_record(record) {
                Ok(entity) => {
                    world.push(entity);
                    report.created += 1;
                }
                Err(err) => {
                    warn!("Skipping record {}: {}", record.id, err);
                    report.failed += 1;
                }
            }
            return;
        }
    };

    let entity = &mut world.entities[index];
    if entity.tag() == record.kind {
        match entity.apply_record(record, smooth) {
            Ok(()) => report.updated += 1,
            Err(err) => {
                warn!("Skipping record {}: {}", record.id, err);
                report.failed += 1;
            }
        }
        return;
    }

    // Same id, different kind: trust the snapshot.
    match Entity::from_record(record) {
        Ok(replacement) => {
            warn!(
                "Entity {} changed kind from {} to {}, replacing",
                record.id,
                entity.tag(),
                record.kind
            );
            *entity = replacement;
            report.replaced += 1;
        }
        Err(err) => {
            warn!("Skipping record {}: {}", record.id, err);
            report.failed += 1;
        }
    }
}
