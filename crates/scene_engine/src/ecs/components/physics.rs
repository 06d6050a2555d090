//! Physics components
//!
//! Data-only descriptions of bodies, shapes and joints. Simulation is out of
//! scope for the scene layer; these exist so that physics settings survive a
//! prefab round trip.

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::ecs::entity::EntityKey;
use crate::ecs::registry::EntityRegistry;
use crate::foundation::math::Vec3;
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Standard gravity along -Y
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

fn axis_lock(lock: bool) -> Vec3 {
    if lock {
        Vec3::new(1.0, 1.0, 1.0)
    } else {
        Vec3::zeros()
    }
}

/// Dynamic body parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    id: ComponentId,
    /// Mass in kilograms
    pub mass: f32,
    /// Linear damping
    pub drag: f32,
    /// Angular damping
    pub angular_drag: f32,
    /// Bounciness
    pub restitution: f32,
    /// Whether gravity applies
    pub use_gravity: bool,
    /// Whether the body is moved by its Transform rather than by forces
    pub is_kinematic: bool,
    /// Gravity acceleration when `use_gravity` is set
    pub gravity: Vec3,
    /// Per-axis translation lock, 1.0 = locked
    pub position_lock: Vec3,
    /// Per-axis rotation lock, 1.0 = locked
    pub rotation_lock: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            id: 0,
            mass: 1.0,
            drag: 0.0,
            angular_drag: 0.05,
            restitution: 0.0,
            use_gravity: true,
            is_kinematic: false,
            gravity: DEFAULT_GRAVITY,
            position_lock: Vec3::zeros(),
            rotation_lock: Vec3::zeros(),
        }
    }
}

impl RigidBody {
    /// Lock or unlock translation on every axis
    pub fn set_position_lock(&mut self, lock: bool) {
        self.position_lock = axis_lock(lock);
    }

    /// Lock or unlock rotation on every axis
    pub fn set_rotation_lock(&mut self, lock: bool) {
        self.rotation_lock = axis_lock(lock);
    }

    /// Acceleration currently applied by gravity
    pub fn effective_gravity(&self) -> Vec3 {
        if self.use_gravity && !self.is_kinematic {
            self.gravity
        } else {
            Vec3::zeros()
        }
    }
}

impl Component for RigidBody {
    component_identity!(ComponentType::RigidBody);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_f32(self.mass)?;
        stream.write_f32(self.drag)?;
        stream.write_f32(self.angular_drag)?;
        stream.write_f32(self.restitution)?;
        stream.write_bool(self.use_gravity)?;
        stream.write_bool(self.is_kinematic)?;
        stream.write_vec3(&self.gravity)?;
        stream.write_vec3(&self.position_lock)?;
        stream.write_vec3(&self.rotation_lock)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.mass = stream.read_f32()?;
        self.drag = stream.read_f32()?;
        self.angular_drag = stream.read_f32()?;
        self.restitution = stream.read_f32()?;
        self.use_gravity = stream.read_bool()?;
        self.is_kinematic = stream.read_bool()?;
        self.gravity = stream.read_vec3()?;
        self.position_lock = stream.read_vec3()?;
        self.rotation_lock = stream.read_vec3()?;
        Ok(())
    }
}

/// Collision shape primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColliderShape {
    /// Axis-aligned box scaled by `size`
    #[default]
    Box,
    /// Sphere with radius `size.x`
    Sphere,
    /// Infinite plane through `center`
    StaticPlane,
    /// Cylinder along Y
    Cylinder,
    /// Capsule along Y
    Capsule,
    /// Cone along Y
    Cone,
    /// Mesh from the sibling MeshFilter
    Mesh,
}

impl ColliderShape {
    /// Persisted discriminant
    pub fn to_u32(self) -> u32 {
        match self {
            ColliderShape::Box => 0,
            ColliderShape::Sphere => 1,
            ColliderShape::StaticPlane => 2,
            ColliderShape::Cylinder => 3,
            ColliderShape::Capsule => 4,
            ColliderShape::Cone => 5,
            ColliderShape::Mesh => 6,
        }
    }

    /// Decode a persisted discriminant
    pub fn from_u32(value: u32) -> Result<Self, StreamError> {
        match value {
            0 => Ok(ColliderShape::Box),
            1 => Ok(ColliderShape::Sphere),
            2 => Ok(ColliderShape::StaticPlane),
            3 => Ok(ColliderShape::Cylinder),
            4 => Ok(ColliderShape::Capsule),
            5 => Ok(ColliderShape::Cone),
            6 => Ok(ColliderShape::Mesh),
            _ => Err(StreamError::InvalidDiscriminant { kind: "ColliderShape", value }),
        }
    }
}

/// Collision shape attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    id: ComponentId,
    /// Shape primitive
    pub shape: ColliderShape,
    /// Offset from the entity origin
    pub center: Vec3,
    /// Shape extents
    pub size: Vec3,
    /// Whether mesh shapes should be simplified
    pub optimize: bool,
    rigid_body: Option<ComponentId>,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            id: 0,
            shape: ColliderShape::Box,
            center: Vec3::zeros(),
            size: Vec3::new(1.0, 1.0, 1.0),
            optimize: true,
            rigid_body: None,
        }
    }
}

impl Collider {
    /// Id of the RigidBody on the same entity this shape feeds into
    pub fn rigid_body(&self) -> Option<ComponentId> {
        self.rigid_body
    }

    /// Attach the shape to a RigidBody
    pub fn bind_rigid_body(&mut self, rigid_body: ComponentId) {
        self.rigid_body = Some(rigid_body);
    }
}

impl Component for Collider {
    component_identity!(ComponentType::Collider);

    fn remove(&mut self) {
        self.rigid_body = None;
    }

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_u32(self.shape.to_u32())?;
        stream.write_vec3(&self.center)?;
        stream.write_vec3(&self.size)?;
        stream.write_bool(self.optimize)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.shape = ColliderShape::from_u32(stream.read_u32()?)?;
        self.center = stream.read_vec3()?;
        self.size = stream.read_vec3()?;
        self.optimize = stream.read_bool()?;

        self.rigid_body = ctx.sibling_of_type(ComponentType::RigidBody);
        if self.rigid_body.is_none() {
            log::debug!("Collider {} loaded without a RigidBody", self.id);
        }
        Ok(())
    }
}

/// Hinge joint connecting this entity to another one
#[derive(Debug, Clone, PartialEq)]
pub struct Hinge {
    id: ComponentId,
    /// Persistent id of the connected entity, empty when unconnected
    pub connected_entity_id: String,
    /// Rotation axis
    pub axis: Vec3,
    /// Pivot in this entity's local space
    pub pivot: Vec3,
    /// Pivot in the connected entity's local space
    pub pivot_connected: Vec3,
}

impl Default for Hinge {
    fn default() -> Self {
        Self {
            id: 0,
            connected_entity_id: String::new(),
            axis: Vec3::new(0.0, 1.0, 0.0),
            pivot: Vec3::zeros(),
            pivot_connected: Vec3::zeros(),
        }
    }
}

impl Hinge {
    /// Connect to the entity with the given persistent id
    pub fn connect(&mut self, entity_id: impl Into<String>) {
        self.connected_entity_id = entity_id.into();
    }

    /// Resolve the connected entity.
    ///
    /// The lookup is deferred to call time because the connected entity may be
    /// loaded after this one.
    pub fn connected_entity(&self, registry: &dyn EntityRegistry) -> Option<EntityKey> {
        if self.connected_entity_id.is_empty() {
            return None;
        }
        registry.lookup_entity_by_id(&self.connected_entity_id)
    }
}

impl Component for Hinge {
    component_identity!(ComponentType::Hinge);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        _ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_str(&self.connected_entity_id)?;
        stream.write_vec3(&self.axis)?;
        stream.write_vec3(&self.pivot)?;
        stream.write_vec3(&self.pivot_connected)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        _ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.connected_entity_id = stream.read_string()?;
        self.axis = stream.read_vec3()?;
        self.pivot = stream.read_vec3()?;
        self.pivot_connected = stream.read_vec3()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{BinaryReader, BinaryWriter};
    use crate::scene::Scene;

    #[test]
    fn test_collider_binds_to_sibling_rigid_body() {
        let scene = Scene::new();
        let collider = Collider {
            shape: ColliderShape::Sphere,
            ..Collider::default()
        };

        let mut writer = BinaryWriter::new(Vec::new());
        collider
            .serialize(&mut writer, &SerializeContext { registry: &scene })
            .unwrap();
        let bytes = writer.into_inner();

        let siblings = [(ComponentType::Transform, 11), (ComponentType::RigidBody, 42)];
        let ctx = DeserializeContext { registry: &scene, siblings: &siblings };
        let mut restored = Collider::default();
        restored
            .deserialize(&mut BinaryReader::new(bytes.as_slice()), &ctx)
            .unwrap();

        assert_eq!(restored.shape, ColliderShape::Sphere);
        assert_eq!(restored.rigid_body(), Some(42));
    }

    #[test]
    fn test_kinematic_body_ignores_gravity() {
        let mut body = RigidBody::default();
        assert_eq!(body.effective_gravity(), DEFAULT_GRAVITY);

        body.is_kinematic = true;
        assert_eq!(body.effective_gravity(), Vec3::zeros());
    }

    #[test]
    fn test_hinge_resolves_connected_entity_lazily() {
        let mut scene = Scene::new();
        let mut hinge = Hinge::default();
        assert!(hinge.connected_entity(&scene).is_none());

        hinge.connect("door-frame");
        assert!(hinge.connected_entity(&scene).is_none());

        let frame = scene.create_entity();
        scene.set_entity_id(frame, "door-frame");
        assert_eq!(hinge.connected_entity(&scene), Some(frame));
    }
}
