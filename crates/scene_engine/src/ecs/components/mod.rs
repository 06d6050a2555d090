//! Concrete component variants

pub mod audio;
pub mod camera;
pub mod lighting;
pub mod physics;
pub mod rendering;
pub mod script;
pub mod transform;

pub use audio::{AudioListener, AudioSource};
pub use camera::{Camera, Projection};
pub use lighting::{Light, LightType};
pub use physics::{Collider, ColliderShape, Hinge, RigidBody};
pub use rendering::{Line, LineRenderer, MeshFilter, MeshRenderer, MeshType, Skybox};
pub use script::{Script, ScriptState};
pub use transform::TransformComponent;
