//! Entity record codec
//!
//! One record per entity, children nested recursively in pre-order:
//!
//! ```text
//! bool    is_prefab
//! bool    is_active
//! bool    hierarchy_visible
//! string  id
//! string  name
//! i32     component_count
//! repeat: string type_tag, u32 component_id
//! repeat: component body
//! i32     child_count
//! repeat: u32 child transform id
//! repeat: child record
//! ```
//!
//! On load every component shell is created before any body is read, so a
//! body may refer to its siblings (a Collider binding to its RigidBody).

use crate::ecs::component::{
    Component, ComponentId, ComponentType, DeserializeContext, SerializeContext,
};
use crate::ecs::components::TransformComponent;
use crate::ecs::EntityKey;
use crate::io::{StreamReader, StreamWriter};

use super::{Scene, SceneError};

/// Upper bound on pre-allocation driven by counts read from a stream
const MAX_PREALLOCATED: usize = 1024;

impl Scene {
    /// Write the record of `key` and its whole subtree.
    ///
    /// A stale child link is skipped with an error log, so the written child
    /// count always matches the records that follow.
    pub fn serialize_entity(
        &self,
        key: EntityKey,
        stream: &mut dyn StreamWriter,
    ) -> Result<(), SceneError> {
        let entity = self.get(key).ok_or(SceneError::EntityNotFound(key))?;

        stream.write_bool(entity.is_prefab())?;
        stream.write_bool(entity.is_active())?;
        stream.write_bool(entity.is_hierarchy_visible())?;
        stream.write_str(entity.id())?;
        stream.write_str(entity.name())?;

        stream.write_count(entity.component_count())?;
        for component in entity.components() {
            stream.write_str(component.component_type().as_str())?;
            stream.write_u32(component.id())?;
        }

        let ctx = SerializeContext { registry: self };
        for component in entity.components() {
            component.serialize(stream, &ctx)?;
        }

        let mut children = Vec::with_capacity(self.child_count(key));
        for child in self.children_of(key) {
            match self.transform(*child) {
                Some(transform) => children.push((*child, transform.id())),
                None => log::error!("{}: child {:?} no longer exists", entity.name(), child),
            }
        }

        stream.write_count(children.len())?;
        for (_, transform_id) in &children {
            stream.write_u32(*transform_id)?;
        }

        for (child, _) in children {
            self.serialize_entity(child, stream)?;
        }

        Ok(())
    }

    /// Read a record into the existing entity `key` and attach it under
    /// `parent`. Children are created and read recursively, and the children
    /// lists of the loaded subtree are rebuilt once at the end.
    ///
    /// If the stored id is already taken by another live entity, `key` keeps
    /// its current id and a warning is logged. An unknown component tag aborts
    /// the load since the length of its body is unknown.
    pub fn deserialize_entity(
        &mut self,
        key: EntityKey,
        stream: &mut dyn StreamReader,
        parent: Option<EntityKey>,
    ) -> Result<(), SceneError> {
        self.read_record(key, stream, parent)?;
        self.resolve_children(key);
        Ok(())
    }

    fn read_record(
        &mut self,
        key: EntityKey,
        stream: &mut dyn StreamReader,
        parent: Option<EntityKey>,
    ) -> Result<(), SceneError> {
        let entity = self.get_mut(key).ok_or(SceneError::EntityNotFound(key))?;

        entity.set_prefab(stream.read_bool()?);
        entity.set_active(stream.read_bool()?);
        entity.set_hierarchy_visible(stream.read_bool()?);
        let id = stream.read_string()?;
        entity.set_name(stream.read_string()?);

        if !self.set_entity_id(key, id.as_str()) {
            log::warn!("Entity id {} is already in use, keeping a fresh id", id);
        }

        let component_count = stream.read_count()?;
        let mut siblings = Vec::with_capacity(component_count.min(MAX_PREALLOCATED));
        for _ in 0..component_count {
            let tag = stream.read_string()?;
            let component_id = stream.read_u32()?;
            match tag.parse::<ComponentType>() {
                Ok(component_type) => siblings.push((component_type, component_id)),
                Err(err) => {
                    log::warn!("Entity {}: {}, aborting load", id, err);
                    return Err(err.into());
                }
            }
        }

        self.read_components(key, stream, &siblings)?;
        self.set_parent(key, parent);

        let child_count = stream.read_count()?;
        let mut child_ids = Vec::with_capacity(child_count.min(MAX_PREALLOCATED));
        for _ in 0..child_count {
            child_ids.push(stream.read_u32()?);
        }

        for expected in child_ids {
            let child = self.create_entity();
            if let Err(err) = self.read_record(child, stream, Some(key)) {
                self.remove_entity(child);
                return Err(err);
            }

            let loaded = self.transform(child).map(|transform| transform.id());
            if loaded != Some(expected) {
                log::warn!(
                    "Entity {}: child transform id {:?} does not match header id {}",
                    id,
                    loaded,
                    expected
                );
            }
        }

        Ok(())
    }

    /// Create a new entity from the next record in `stream`, attached under
    /// `parent`. A failed load removes whatever part of the subtree was built.
    pub fn instantiate(
        &mut self,
        stream: &mut dyn StreamReader,
        parent: Option<EntityKey>,
    ) -> Result<EntityKey, SceneError> {
        let key = self.create_entity();
        if let Err(err) = self.deserialize_entity(key, stream, parent) {
            self.remove_entity(key);
            return Err(err);
        }
        Ok(key)
    }

    /// Create component shells for every header, then read every body.
    ///
    /// Components already attached are reused for matching headers (the
    /// Transform always is). The entity ends up with its components in record
    /// order, followed by any it had that the record does not mention.
    fn read_components(
        &mut self,
        key: EntityKey,
        stream: &mut dyn StreamReader,
        siblings: &[(ComponentType, ComponentId)],
    ) -> Result<(), SceneError> {
        let previous_parent = self.parent_of(key);
        let entity = self.get_mut(key).ok_or(SceneError::EntityNotFound(key))?;
        let existing = entity.take_components();

        let mut slots: Vec<Option<Box<dyn Component>>> = existing.into_iter().map(Some).collect();
        let mut order = Vec::with_capacity(siblings.len());
        for (component_type, component_id) in siblings {
            let reusable = slots.iter().enumerate().position(|(index, slot)| {
                !order.contains(&index)
                    && slot.as_ref().is_some_and(|c| c.component_type() == *component_type)
            });
            let index = match reusable {
                Some(index) => index,
                None => {
                    let mut component = component_type.create();
                    component.initialize();
                    slots.push(Some(component));
                    slots.len() - 1
                }
            };
            if let Some(component) = slots[index].as_mut() {
                component.set_id(*component_id);
            }
            order.push(index);
        }

        let mut components: Vec<Box<dyn Component>> =
            order.iter().filter_map(|index| slots[*index].take()).collect();
        components.extend(slots.into_iter().flatten());

        let ctx = DeserializeContext { registry: &*self, siblings };
        let mut result = Ok(());
        // The first `siblings.len()` components are in record order
        for component in components.iter_mut().take(siblings.len()) {
            result = component.deserialize(stream, &ctx);
            if result.is_err() {
                break;
            }
        }

        // The scene owns the parent link; the stored parent id is only a hint
        if let Some(transform) = components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<TransformComponent>())
        {
            transform.parent = previous_parent;
        }

        if let Some(entity) = self.get_mut(key) {
            entity.restore_components(components);
        }
        result.map_err(SceneError::from)
    }
}
