//! Scene registry
//!
//! [`Scene`] owns every live [`GameObject`] in a slot arena and indexes them
//! by persistent id. Hierarchy edits, world-space transform access and
//! (de)serialization are all methods on the scene, split across the
//! submodules by concern:
//!
//! - [`hierarchy`]: parent/child edits and queries
//! - [`propagation`]: lazy world-state recomputation and world-space access
//! - [`serialization`]: the recursive entity record codec
//! - [`prefab`]: prefab and whole-scene files

use std::collections::HashMap;

use slotmap::SlotMap;
use thiserror::Error;

use crate::config::SceneConfig;
use crate::ecs::components::TransformComponent;
use crate::ecs::{generate_entity_id, EntityKey, EntityRegistry, GameObject, UnknownComponentType};
use crate::io::StreamError;

pub mod hierarchy;
pub mod prefab;
pub mod propagation;
pub mod serialization;

#[cfg(test)]
mod tests;

/// Scene-level errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Reading or writing the underlying stream failed
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// A record named a component type this build does not know
    #[error(transparent)]
    UnknownComponentType(#[from] UnknownComponentType),

    /// A file path does not carry the expected extension
    #[error("Invalid file extension for {path}: expected {expected}")]
    InvalidExtension {
        /// Offending path
        path: String,
        /// Extension that was required
        expected: String,
    },

    /// The entity key does not name a live entity
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityKey),
}

/// Collection of live entities
#[derive(Debug, Default)]
pub struct Scene {
    entities: SlotMap<EntityKey, GameObject>,
    id_index: HashMap<String, EntityKey>,
    config: SceneConfig,
}

impl Scene {
    /// Create an empty scene with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene with the given settings
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active settings
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ========================================================================
    // Entity management
    // ========================================================================

    /// Create a root entity with a fresh id and a Transform
    pub fn create_entity(&mut self) -> EntityKey {
        let mut entity = GameObject::new(generate_entity_id());
        entity.initialize();

        let id = entity.id().to_string();
        let key = self.entities.insert(entity);
        self.id_index.insert(id, key);
        key
    }

    /// Create a root entity with the given name
    pub fn create_entity_named(&mut self, name: impl Into<String>) -> EntityKey {
        let key = self.create_entity();
        if let Some(entity) = self.entities.get_mut(key) {
            entity.set_name(name);
        }
        key
    }

    /// Remove an entity together with its whole subtree.
    ///
    /// Every removed component gets its `remove` hook. Returns whether the
    /// entity existed.
    pub fn remove_entity(&mut self, key: EntityKey) -> bool {
        if !self.entities.contains_key(key) {
            log::warn!("Cannot remove entity {:?}: not in the scene", key);
            return false;
        }

        let mut subtree = vec![key];
        subtree.extend(self.descendants(key));
        self.detach(key);

        for member in &subtree {
            if let Some(mut entity) = self.entities.remove(*member) {
                if self.id_index.get(entity.id()) == Some(member) {
                    self.id_index.remove(entity.id());
                }
                entity.destroy();
            }
        }

        log::debug!("Removed {} entities rooted at {:?}", subtree.len(), key);
        true
    }

    /// Borrow an entity
    pub fn get(&self, key: EntityKey) -> Option<&GameObject> {
        self.entities.get(key)
    }

    /// Mutably borrow an entity
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut GameObject> {
        self.entities.get_mut(key)
    }

    /// Whether the key names a live entity
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Borrow an entity's Transform
    pub fn transform(&self, key: EntityKey) -> Option<&TransformComponent> {
        self.entities.get(key)?.transform()
    }

    /// Mutably borrow an entity's Transform.
    ///
    /// Local state may be edited freely; world-space edits go through
    /// [`Scene::set_position`] and friends, hierarchy edits through
    /// [`Scene::set_parent`].
    pub fn transform_mut(&mut self, key: EntityKey) -> Option<&mut TransformComponent> {
        self.entities.get_mut(key)?.transform_mut()
    }

    /// All entities without a parent
    pub fn roots(&self) -> Vec<EntityKey> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.transform().is_some_and(TransformComponent::is_root))
            .map(|(key, _)| key)
            .collect()
    }

    /// Iterate all entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &GameObject)> {
        self.entities.iter()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity, running component `remove` hooks
    pub fn clear(&mut self) {
        for (_, entity) in self.entities.iter_mut() {
            entity.destroy();
        }
        self.entities.clear();
        self.id_index.clear();
    }

    /// First entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.name() == name)
            .map(|(key, _)| key)
    }

    /// Change an entity's persistent id.
    ///
    /// Refused (returns false) when another live entity already uses `id`.
    pub fn set_entity_id(&mut self, key: EntityKey, id: impl Into<String>) -> bool {
        let id = id.into();
        if let Some(owner) = self.id_index.get(&id) {
            return *owner == key;
        }

        let Some(entity) = self.entities.get_mut(key) else {
            log::warn!("Cannot set id of entity {:?}: not in the scene", key);
            return false;
        };

        if self.id_index.get(entity.id()) == Some(&key) {
            self.id_index.remove(entity.id());
        }
        entity.set_id(id.clone());
        self.id_index.insert(id, key);
        true
    }

    // ========================================================================
    // Frame lifecycle
    // ========================================================================

    /// Run `start` on every entity, parents first
    pub fn start(&mut self) {
        for key in self.preorder() {
            if let Some(entity) = self.entities.get_mut(key) {
                entity.start();
            }
        }
    }

    /// Run `on_disable` on every entity, parents first
    pub fn on_disable(&mut self) {
        for key in self.preorder() {
            if let Some(entity) = self.entities.get_mut(key) {
                entity.on_disable();
            }
        }
    }

    /// One frame: walk every root in pre-order, recompute each Transform
    /// (parent before child) and dispatch `update` to active entities.
    pub fn update(&mut self) {
        for key in self.preorder() {
            self.update_transform(key);
            if let Some(entity) = self.entities.get_mut(key) {
                entity.update();
            }
        }
    }
}

impl EntityRegistry for Scene {
    fn lookup_entity_by_id(&self, id: &str) -> Option<EntityKey> {
        self.id_index.get(id).copied()
    }

    fn all_entities(&self) -> Vec<EntityKey> {
        self.entities.keys().collect()
    }

    fn entity(&self, key: EntityKey) -> Option<&GameObject> {
        self.entities.get(key)
    }

    fn create_entity(&mut self) -> EntityKey {
        Scene::create_entity(self)
    }
}
