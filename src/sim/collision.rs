//! Broad-phase collision detection between registered entities
//!
//! Every registered entity is tested against every other with a
//! circle-circle overlap (O(n²), populations are a few dozen entities).

use super::entity::{Collider, EntityId};

/// Access to live entities for the duration of a collision pass
pub trait CollisionWorld {
    /// Snapshot of a live entity; `None` if it is gone or already destroyed
    fn collider(&self, id: EntityId) -> Option<Collider>;
    /// Tell `target` it overlaps `other`
    fn dispatch(&mut self, target: EntityId, other: &Collider);
}

/// Tracks which entities take part in collision checks. Holds ids only; the
/// entities themselves stay with their owners.
#[derive(Debug, Clone, Default)]
pub struct CollisionHandler {
    entities: Vec<EntityId>,
}

impl CollisionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_entity(&mut self, id: EntityId) {
        if !self.entities.contains(&id) {
            self.entities.push(id);
        }
    }

    /// Unknown ids are ignored
    pub fn unregister_entity(&mut self, id: EntityId) {
        self.entities.retain(|&e| e != id);
    }

    pub fn unregister_all(&mut self) {
        self.entities.clear();
    }

    pub fn is_registered(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Run one collision pass. Both parties of every overlapping pair are
    /// informed, each receiving the other's snapshot from before any
    /// callback ran. Returns the number of contacts.
    pub fn update<W: CollisionWorld + ?Sized>(&mut self, world: &mut W) -> usize {
        let colliders: Vec<Collider> = self
            .entities
            .iter()
            .filter_map(|&id| world.collider(id))
            .collect();

        let contacts = find_contacts(&colliders);
        for (a, b) in &contacts {
            world.dispatch(a.id, b);
            world.dispatch(b.id, a);
        }
        contacts.len()
    }
}

/// All overlapping pairs, in registration order. Pairs where neither side is
/// collidable are skipped (projectiles never hit each other).
pub fn find_contacts(colliders: &[Collider]) -> Vec<(Collider, Collider)> {
    let mut contacts = Vec::new();
    for (i, a) in colliders.iter().enumerate() {
        for b in &colliders[i + 1..] {
            if !a.collidable && !b.collidable {
                continue;
            }
            if a.overlaps(b) {
                contacts.push((*a, *b));
            }
        }
    }
    contacts
}
