//! # Scene Engine
//!
//! The scene-graph core of a real-time 3D engine.
//!
//! ## Features
//!
//! - **Transform hierarchy**: re-parenting that keeps the parent relation a
//!   forest, lazy world-state recomputation with dirty propagation
//! - **Entities and components**: a closed set of component variants behind
//!   one lifecycle trait
//! - **Prefabs and scene files**: a recursive, ordered binary record format
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new();
//!     let ship = scene.create_entity_named("Ship");
//!     let turret = scene.create_entity_named("Turret");
//!     scene.set_parent(turret, Some(ship));
//!
//!     scene.set_position(ship, Vec3::new(0.0, 0.0, -10.0));
//!     scene.update();
//!
//!     let path = scene.save_prefab(ship, "ship")?;
//!     let copy = scene.load_prefab(&path)?;
//!     assert_eq!(scene.child_count(copy), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod io;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            components::{
                AudioListener, AudioSource, Camera, Collider, Hinge, Light, LightType,
                LineRenderer, MeshFilter, MeshRenderer, RigidBody, Script, Skybox,
                TransformComponent,
            },
            Component, ComponentType, EntityKey, EntityRegistry, GameObject,
        },
        foundation::math::{Mat4, Quat, Transform, Vec3},
        scene::{Scene, SceneError},
    };
}
