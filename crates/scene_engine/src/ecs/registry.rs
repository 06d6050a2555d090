//! Entity registry contract
//!
//! The hierarchy and serialization code only ever needs these lookups from the
//! collection that owns the entities. [`Scene`](crate::scene::Scene) is the
//! implementation used by the engine.

use super::entity::{EntityKey, GameObject};

/// Lookup and creation of live entities
pub trait EntityRegistry {
    /// Find an entity by its persistent id
    fn lookup_entity_by_id(&self, id: &str) -> Option<EntityKey>;

    /// Every live entity, in registry order
    fn all_entities(&self) -> Vec<EntityKey>;

    /// Borrow an entity
    fn entity(&self, key: EntityKey) -> Option<&GameObject>;

    /// Create an empty entity (Transform only) with a fresh id
    fn create_entity(&mut self) -> EntityKey;

    /// Persistent id of an entity
    fn entity_id(&self, key: EntityKey) -> Option<&str> {
        self.entity(key).map(GameObject::id)
    }
}
