//! Entity and component model
//!
//! A [`GameObject`] owns an ordered list of [`Component`]s, exactly one of
//! which is its [`TransformComponent`](components::TransformComponent).
//! Entities live in an [`EntityRegistry`]; components refer to other entities
//! by [`EntityKey`] and persist them by string id.

pub mod component;
pub mod components;
pub mod entity;
pub mod registry;

pub use component::{
    generate_component_id, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext, UnknownComponentType,
};
pub use entity::{
    generate_entity_id, EntityFlags, EntityKey, GameObject, DEFAULT_ENTITY_NAME, NULL_ENTITY_ID,
};
pub use registry::EntityRegistry;
