//! Entity implementation
//!
//! A [`GameObject`] is an identity (persistent id, name, flags) that owns an
//! ordered list of components, exactly one of which is its
//! [`TransformComponent`].

use bitflags::bitflags;

use super::component::{generate_component_id, Component, ComponentId, ComponentType};
use super::components::TransformComponent;

slotmap::new_key_type! {
    /// Stable arena key of a live entity inside its scene
    pub struct EntityKey;
}

/// Persisted parent id meaning "no parent"
pub const NULL_ENTITY_ID: &str = "-1";

/// Default entity name
pub const DEFAULT_ENTITY_NAME: &str = "GameObject";

bitflags! {
    /// Plain boolean attributes of an entity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        /// Entity receives update calls
        const ACTIVE = 1 << 0;
        /// Entity is listed in editor hierarchy views
        const HIERARCHY_VISIBLE = 1 << 1;
        /// Entity is the root of a saved prefab
        const PREFAB = 1 << 2;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        EntityFlags::ACTIVE | EntityFlags::HIERARCHY_VISIBLE
    }
}

/// Generate a fresh persistent entity id
pub fn generate_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Entity: identity plus owned components
#[derive(Debug)]
pub struct GameObject {
    id: String,
    name: String,
    flags: EntityFlags,
    components: Vec<Box<dyn Component>>,
}

impl GameObject {
    /// Create an entity with the given id and no components.
    ///
    /// Use [`GameObject::initialize`] (or create through a registry) to attach
    /// the Transform.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_ENTITY_NAME.to_string(),
            flags: EntityFlags::default(),
            components: Vec::new(),
        }
    }

    /// Attach the Transform if the entity does not have one yet
    pub fn initialize(&mut self) -> &mut TransformComponent {
        self.add_component::<TransformComponent>()
    }

    /// Persistent id
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// All flags
    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Whether the entity receives update calls
    pub fn is_active(&self) -> bool {
        self.flags.contains(EntityFlags::ACTIVE)
    }

    /// Enable or disable update calls
    pub fn set_active(&mut self, active: bool) {
        self.flags.set(EntityFlags::ACTIVE, active);
    }

    /// Whether the entity is listed in hierarchy views
    pub fn is_hierarchy_visible(&self) -> bool {
        self.flags.contains(EntityFlags::HIERARCHY_VISIBLE)
    }

    /// Show or hide the entity in hierarchy views
    pub fn set_hierarchy_visible(&mut self, visible: bool) {
        self.flags.set(EntityFlags::HIERARCHY_VISIBLE, visible);
    }

    /// Whether the entity is the root of a saved prefab
    pub fn is_prefab(&self) -> bool {
        self.flags.contains(EntityFlags::PREFAB)
    }

    /// Mark or unmark the entity as a prefab root
    pub fn set_prefab(&mut self, prefab: bool) {
        self.flags.set(EntityFlags::PREFAB, prefab);
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attach a component of type `T`, or return the one already attached.
    ///
    /// A new component gets a fresh id and its `initialize` hook is run.
    pub fn add_component<T: Component + Default>(&mut self) -> &mut T {
        let index = match self.components.iter().position(|c| c.as_any().is::<T>()) {
            Some(index) => index,
            None => {
                let mut component = T::default();
                component.set_id(generate_component_id());
                component.initialize();
                self.components.push(Box::new(component));
                self.components.len() - 1
            }
        };

        match self.components[index].as_any_mut().downcast_mut::<T>() {
            Some(component) => component,
            None => unreachable!("component at index {index} was matched as this type"),
        }
    }

    /// Attach a component by variant, or return the one already attached
    pub fn add_component_of_type(&mut self, component_type: ComponentType) -> &mut dyn Component {
        let index = match self.component_index_of_type(component_type) {
            Some(index) => index,
            None => {
                let mut component = component_type.create();
                component.set_id(generate_component_id());
                component.initialize();
                self.components.push(component);
                self.components.len() - 1
            }
        };
        &mut *self.components[index]
    }

    /// Attach a component from its persisted type tag.
    ///
    /// An unrecognized tag is logged and nothing is attached.
    pub fn add_component_by_type(&mut self, type_tag: &str) -> Option<&mut dyn Component> {
        match type_tag.parse::<ComponentType>() {
            Ok(component_type) => Some(self.add_component_of_type(component_type)),
            Err(err) => {
                log::warn!("{}: cannot attach component, {}", self.name, err);
                None
            }
        }
    }

    /// Borrow the component of type `T`
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Mutably borrow the component of type `T`
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// Whether a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// Borrow a component by id
    pub fn component_by_id(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.iter().find(|c| c.id() == id).map(|c| &**c)
    }

    /// Mutably borrow a component by id
    pub fn component_by_id_mut(&mut self, id: ComponentId) -> Option<&mut dyn Component> {
        self.components.iter_mut().find(|c| c.id() == id).map(|c| &mut **c)
    }

    /// All components in attachment order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| &**c)
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// The entity's Transform
    pub fn transform(&self) -> Option<&TransformComponent> {
        self.get_component::<TransformComponent>()
    }

    /// The entity's Transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut TransformComponent> {
        self.get_component_mut::<TransformComponent>()
    }

    /// Detach and drop the component with the given id, keeping the order of
    /// the rest. Returns whether a component was removed.
    ///
    /// The Transform cannot be removed.
    pub fn remove_component_by_id(&mut self, id: ComponentId) -> bool {
        let Some(index) = self.components.iter().position(|c| c.id() == id) else {
            log::warn!("{}: no component with id {}", self.name, id);
            return false;
        };

        if self.components[index].component_type() == ComponentType::Transform {
            log::warn!("{}: the Transform component cannot be removed", self.name);
            return false;
        }

        let mut component = self.components.remove(index);
        component.remove();
        true
    }

    fn component_index_of_type(&self, component_type: ComponentType) -> Option<usize> {
        self.components.iter().position(|c| c.component_type() == component_type)
    }

    pub(crate) fn take_components(&mut self) -> Vec<Box<dyn Component>> {
        std::mem::take(&mut self.components)
    }

    pub(crate) fn restore_components(&mut self, components: Vec<Box<dyn Component>>) {
        self.components = components;
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Run `start` on every component
    pub fn start(&mut self) {
        for component in &mut self.components {
            component.start();
        }
    }

    /// Run `on_disable` on every component
    pub fn on_disable(&mut self) {
        for component in &mut self.components {
            component.on_disable();
        }
    }

    /// Run `update` on every component. Does nothing while inactive.
    pub fn update(&mut self) {
        if !self.is_active() {
            return;
        }

        for component in &mut self.components {
            component.update();
        }
    }

    /// Run `remove` on every component and drop them all
    pub(crate) fn destroy(&mut self) {
        for component in &mut self.components {
            component.remove();
        }
        self.components.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{AudioSource, Collider, Light, RigidBody, Script, ScriptState};

    fn entity() -> GameObject {
        let mut go = GameObject::new(generate_entity_id());
        go.initialize();
        go
    }

    #[test]
    fn test_new_entity_defaults() {
        let go = entity();

        assert_eq!(go.name(), DEFAULT_ENTITY_NAME);
        assert!(go.is_active());
        assert!(go.is_hierarchy_visible());
        assert!(!go.is_prefab());
        assert_eq!(go.component_count(), 1);
        assert!(go.transform().is_some());
    }

    #[test]
    fn test_typed_add_returns_existing() {
        let mut go = entity();
        let first = go.add_component::<Light>().id();
        let second = go.add_component::<Light>().id();

        assert_eq!(first, second);
        assert_eq!(go.component_count(), 2);
    }

    #[test]
    fn test_add_by_type_tag() {
        let mut go = entity();

        let collider = go.add_component_by_type("Collider").map(|c| c.component_type());
        assert_eq!(collider, Some(ComponentType::Collider));
        assert!(go.has_component::<Collider>());

        assert!(go.add_component_by_type("Teleporter").is_none());
        assert_eq!(go.component_count(), 2);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut go = entity();
        go.add_component::<Light>();
        let body = go.add_component::<RigidBody>().id();
        go.add_component::<Collider>();

        assert!(go.remove_component_by_id(body));
        let order: Vec<_> = go.components().map(|c| c.component_type()).collect();
        assert_eq!(
            order,
            vec![ComponentType::Transform, ComponentType::Light, ComponentType::Collider]
        );
        assert!(!go.remove_component_by_id(body));
    }

    #[test]
    fn test_transform_cannot_be_removed() {
        let mut go = entity();
        let transform_id = go.transform().map(|t| t.id()).unwrap();

        assert!(!go.remove_component_by_id(transform_id));
        assert!(go.transform().is_some());
    }

    #[test]
    fn test_lifecycle_dispatch() {
        let mut go = entity();
        go.add_component::<Script>().set_script_path("scripts/spin.rs");
        go.add_component::<AudioSource>().play_on_awake = true;

        go.start();
        assert_eq!(go.get_component::<Script>().unwrap().state(), ScriptState::Running);
        assert!(go.get_component::<AudioSource>().unwrap().is_playing());

        go.update();
        assert_eq!(go.get_component::<Script>().unwrap().update_count(), 1);

        go.set_active(false);
        go.update();
        assert_eq!(go.get_component::<Script>().unwrap().update_count(), 1);

        go.on_disable();
        assert_eq!(go.get_component::<Script>().unwrap().state(), ScriptState::Disabled);
        assert!(!go.get_component::<AudioSource>().unwrap().is_playing());
    }
}
