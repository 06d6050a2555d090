//! Component trait and type registry
//!
//! Every behavior attached to a [`GameObject`](super::GameObject) implements
//! [`Component`]. The set of concrete variants is closed: [`ComponentType`]
//! maps each persisted type tag to its constructor and back.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use crate::io::{StreamError, StreamReader, StreamWriter};

use super::components::{
    AudioListener, AudioSource, Camera, Collider, Hinge, Light, LineRenderer, MeshFilter,
    MeshRenderer, RigidBody, Script, Skybox, TransformComponent,
};
use super::registry::EntityRegistry;

/// Component identifier, persisted alongside the type tag
pub type ComponentId = u32;

/// Draw a fresh component id from a random UUID
pub fn generate_component_id() -> ComponentId {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Lookups available to a component while its body is written
pub struct SerializeContext<'a> {
    /// Registry used to turn entity keys into persistent ids
    pub registry: &'a dyn EntityRegistry,
}

/// Lookups available to a component while its body is read
pub struct DeserializeContext<'a> {
    /// Registry used to resolve persisted entity ids
    pub registry: &'a dyn EntityRegistry,
    /// Type and id of every component shell on the owning entity, in record order
    pub siblings: &'a [(ComponentType, ComponentId)],
}

impl DeserializeContext<'_> {
    /// Id of the first sibling shell of the given type
    pub fn sibling_of_type(&self, component_type: ComponentType) -> Option<ComponentId> {
        self.siblings
            .iter()
            .find(|(ty, _)| *ty == component_type)
            .map(|(_, id)| *id)
    }
}

/// Capability set shared by every component variant.
///
/// Lifecycle hooks default to doing nothing; variants override the ones they
/// care about. Failures inside a hook are the component's own business, the
/// owning entity neither catches nor retries them.
pub trait Component: Any + Send + Sync + fmt::Debug {
    /// Concrete variant, used as the persisted type tag
    fn component_type(&self) -> ComponentType;

    /// Component identifier
    fn id(&self) -> ComponentId;

    /// Replace the identifier (used when restoring from a stream)
    fn set_id(&mut self, id: ComponentId);

    /// Called once right after the component is attached
    fn initialize(&mut self) {}

    /// Called when the owning entity starts
    fn start(&mut self) {}

    /// Called when the owning entity is disabled
    fn on_disable(&mut self) {}

    /// Called once per frame while the owning entity is active
    fn update(&mut self) {}

    /// Called right before the component is detached and dropped
    fn remove(&mut self) {}

    /// Write the component body
    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError>;

    /// Read the component body written by [`Component::serialize`]
    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError>;

    /// Upcast for typed lookups
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed lookups
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Implements the identity and upcast methods of [`Component`] for a struct
/// with an `id: ComponentId` field.
macro_rules! component_identity {
    ($component_type:expr) => {
        fn component_type(&self) -> $crate::ecs::ComponentType {
            $component_type
        }

        fn id(&self) -> $crate::ecs::ComponentId {
            self.id
        }

        fn set_id(&mut self, id: $crate::ecs::ComponentId) {
            self.id = id;
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

pub(crate) use component_identity;

/// Closed set of component variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Spatial transform and hierarchy node
    Transform,
    /// Mesh reference
    MeshFilter,
    /// Mesh drawing settings
    MeshRenderer,
    /// Light source
    Light,
    /// Viewpoint
    Camera,
    /// Environment cube map
    Skybox,
    /// Physics body
    RigidBody,
    /// Physics shape
    Collider,
    /// Physics joint
    Hinge,
    /// User script
    Script,
    /// Debug line drawing
    LineRenderer,
    /// Sound emitter
    AudioSource,
    /// Sound receiver
    AudioListener,
}

impl ComponentType {
    /// Every variant, in registration order
    pub const ALL: [ComponentType; 13] = [
        ComponentType::Transform,
        ComponentType::MeshFilter,
        ComponentType::MeshRenderer,
        ComponentType::Light,
        ComponentType::Camera,
        ComponentType::Skybox,
        ComponentType::RigidBody,
        ComponentType::Collider,
        ComponentType::Hinge,
        ComponentType::Script,
        ComponentType::LineRenderer,
        ComponentType::AudioSource,
        ComponentType::AudioListener,
    ];

    /// Persisted type tag
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentType::Transform => "Transform",
            ComponentType::MeshFilter => "MeshFilter",
            ComponentType::MeshRenderer => "MeshRenderer",
            ComponentType::Light => "Light",
            ComponentType::Camera => "Camera",
            ComponentType::Skybox => "Skybox",
            ComponentType::RigidBody => "RigidBody",
            ComponentType::Collider => "Collider",
            ComponentType::Hinge => "Hinge",
            ComponentType::Script => "Script",
            ComponentType::LineRenderer => "LineRenderer",
            ComponentType::AudioSource => "AudioSource",
            ComponentType::AudioListener => "AudioListener",
        }
    }

    /// Construct a default instance of this variant with id 0
    pub fn create(self) -> Box<dyn Component> {
        match self {
            ComponentType::Transform => Box::new(TransformComponent::default()),
            ComponentType::MeshFilter => Box::new(MeshFilter::default()),
            ComponentType::MeshRenderer => Box::new(MeshRenderer::default()),
            ComponentType::Light => Box::new(Light::default()),
            ComponentType::Camera => Box::new(Camera::default()),
            ComponentType::Skybox => Box::new(Skybox::default()),
            ComponentType::RigidBody => Box::new(RigidBody::default()),
            ComponentType::Collider => Box::new(Collider::default()),
            ComponentType::Hinge => Box::new(Hinge::default()),
            ComponentType::Script => Box::new(Script::default()),
            ComponentType::LineRenderer => Box::new(LineRenderer::default()),
            ComponentType::AudioSource => Box::new(AudioSource::default()),
            ComponentType::AudioListener => Box::new(AudioListener::default()),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a persisted type tag names no known variant
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown component type: {0:?}")]
pub struct UnknownComponentType(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponentType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == tag)
            .ok_or_else(|| UnknownComponentType(tag.to_string()))
    }
}
