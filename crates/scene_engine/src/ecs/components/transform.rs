//! Transform component
//!
//! Local position/rotation/scale are authoritative. World-space state is a
//! cache derived from the local state and the parent's world matrix; it is
//! only trustworthy while [`TransformComponent::is_dirty`] is false.
//!
//! The parent link and the children list are edited exclusively through
//! [`Scene`](crate::scene::Scene), which keeps both sides consistent and the
//! parent relation acyclic. World recomputation also happens there because it
//! needs the parent's state.

use crate::ecs::component::{
    component_identity, Component, ComponentId, ComponentType, DeserializeContext,
    SerializeContext,
};
use crate::ecs::entity::{EntityKey, NULL_ENTITY_ID};
use crate::foundation::math::{Mat4, Quat, Transform as MathTransform, Vec3, FORWARD, RIGHT, UP};
use crate::io::{StreamError, StreamReader, StreamWriter};

/// Spatial transform and hierarchy node of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    id: ComponentId,

    position_local: Vec3,
    rotation_local: Quat,
    scale_local: Vec3,

    // Derived world state
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    world_matrix: Mat4,

    look_at: Vec3,
    dirty: bool,

    pub(crate) parent: Option<EntityKey>,
    pub(crate) children: Vec<EntityKey>,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            id: 0,
            position_local: Vec3::zeros(),
            rotation_local: Quat::identity(),
            scale_local: Vec3::new(1.0, 1.0, 1.0),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            world_matrix: Mat4::identity(),
            look_at: Vec3::zeros(),
            dirty: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl TransformComponent {
    // ========================================================================
    // Position
    // ========================================================================

    /// Cached world-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Position relative to the parent
    pub fn position_local(&self) -> Vec3 {
        self.position_local
    }

    /// Set the position relative to the parent. Setting the current value
    /// again does not mark the transform dirty.
    pub fn set_position_local(&mut self, position: Vec3) {
        if self.position_local == position {
            return;
        }
        self.position_local = position;
        self.make_dirty();
    }

    // ========================================================================
    // Rotation
    // ========================================================================

    /// Cached world-space rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Rotation relative to the parent
    pub fn rotation_local(&self) -> Quat {
        self.rotation_local
    }

    /// Set the rotation relative to the parent (compare-and-skip)
    pub fn set_rotation_local(&mut self, rotation: Quat) {
        if self.rotation_local == rotation {
            return;
        }
        self.rotation_local = rotation;
        self.make_dirty();
    }

    // ========================================================================
    // Scale
    // ========================================================================

    /// Cached world-space scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Scale relative to the parent
    pub fn scale_local(&self) -> Vec3 {
        self.scale_local
    }

    /// Set the scale relative to the parent (compare-and-skip)
    pub fn set_scale_local(&mut self, scale: Vec3) {
        if self.scale_local == scale {
            return;
        }
        self.scale_local = scale;
        self.make_dirty();
    }

    // ========================================================================
    // Translation / rotation deltas
    // ========================================================================

    /// Move by `delta`. With a parent the delta is taken in the local frame
    /// (rotated by the local rotation), otherwise in world space.
    pub fn translate(&mut self, delta: Vec3) {
        let position = if self.has_parent() {
            self.position_local + self.rotation_local * delta
        } else {
            self.position_local + delta
        };
        self.set_position_local(position);
    }

    /// Rotate by `delta`. With a parent the delta is pre-multiplied onto the
    /// local rotation, otherwise post-multiplied.
    pub fn rotate(&mut self, delta: Quat) {
        let rotation = if self.has_parent() {
            delta * self.rotation_local
        } else {
            self.rotation_local * delta
        };
        self.set_rotation_local(Quat::new_normalize(rotation.into_inner()));
    }

    /// Local up axis
    pub fn up(&self) -> Vec3 {
        self.rotation_local * UP
    }

    /// Local forward axis (-Z)
    pub fn forward(&self) -> Vec3 {
        self.rotation_local * FORWARD
    }

    /// Local right axis
    pub fn right(&self) -> Vec3 {
        self.rotation_local * RIGHT
    }

    /// Store an orientation target. Only persisted, not used for composition.
    pub fn look_at(&mut self, target: Vec3) {
        self.look_at = target;
    }

    /// Stored orientation target
    pub fn look_at_target(&self) -> Vec3 {
        self.look_at
    }

    // ========================================================================
    // Hierarchy (read-only, edits go through the scene)
    // ========================================================================

    /// Parent entity, `None` for a root
    pub fn parent(&self) -> Option<EntityKey> {
        self.parent
    }

    /// Direct children, cached
    pub fn children(&self) -> &[EntityKey] {
        &self.children
    }

    /// Whether there is a parent
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Whether this is a root transform
    pub fn is_root(&self) -> bool {
        !self.has_parent()
    }

    /// Whether there is at least one child
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    // ========================================================================
    // World state
    // ========================================================================

    /// Cached world matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Whether the cached world state is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the cached world state as stale
    pub fn make_dirty(&mut self) {
        self.dirty = true;
    }

    /// Local state as a value transform
    pub fn local_transform(&self) -> MathTransform {
        MathTransform::new(self.position_local, self.rotation_local, self.scale_local)
    }

    /// Local matrix: scale, then rotation, then translation
    pub fn local_matrix(&self) -> Mat4 {
        self.local_transform().to_matrix()
    }

    /// Recompute the world state from `parent_world` if dirty.
    ///
    /// Returns whether anything was recomputed; the caller is responsible for
    /// marking the children dirty when it was.
    pub(crate) fn recompute(&mut self, parent_world: &Mat4) -> bool {
        if !self.dirty {
            return false;
        }

        self.world_matrix = parent_world * self.local_matrix();

        let world = MathTransform::from_matrix(&self.world_matrix);
        self.position = world.position;
        self.rotation = world.rotation;
        self.scale = world.scale;

        self.dirty = false;
        true
    }
}

impl Component for TransformComponent {
    component_identity!(ComponentType::Transform);

    fn serialize(
        &self,
        stream: &mut dyn StreamWriter,
        ctx: &SerializeContext<'_>,
    ) -> Result<(), StreamError> {
        stream.write_vec3(&self.position_local)?;
        stream.write_quat(&self.rotation_local)?;
        stream.write_vec3(&self.scale_local)?;
        stream.write_vec3(&self.look_at)?;

        let parent_id = match self.parent {
            Some(parent) => ctx.registry.entity_id(parent).unwrap_or_else(|| {
                log::warn!("Transform {} refers to a parent that no longer exists", self.id);
                NULL_ENTITY_ID
            }),
            None => NULL_ENTITY_ID,
        };
        stream.write_str(parent_id)
    }

    fn deserialize(
        &mut self,
        stream: &mut dyn StreamReader,
        ctx: &DeserializeContext<'_>,
    ) -> Result<(), StreamError> {
        self.position_local = stream.read_vec3()?;
        self.rotation_local = stream.read_quat()?;
        self.scale_local = stream.read_vec3()?;
        self.look_at = stream.read_vec3()?;

        let parent_id = stream.read_string()?;
        if parent_id != NULL_ENTITY_ID {
            self.parent = ctx.registry.lookup_entity_by_id(&parent_id);
            if self.parent.is_none() {
                log::warn!("Transform {}: parent entity {} not found", self.id, parent_id);
            }
        }

        self.make_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn clean() -> TransformComponent {
        let mut transform = TransformComponent::default();
        transform.recompute(&Mat4::identity());
        transform
    }

    #[test]
    fn test_new_transform_is_identity_and_dirty() {
        let transform = TransformComponent::default();

        assert!(transform.is_dirty());
        assert!(transform.is_root());
        assert_eq!(transform.position_local(), Vec3::zeros());
        assert_eq!(transform.scale_local(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(transform.world_matrix(), Mat4::identity());
    }

    #[test]
    fn test_local_setters_compare_and_skip() {
        let mut transform = clean();
        assert!(!transform.is_dirty());

        transform.set_position_local(Vec3::zeros());
        transform.set_rotation_local(Quat::identity());
        transform.set_scale_local(Vec3::new(1.0, 1.0, 1.0));
        assert!(!transform.is_dirty());

        transform.set_position_local(Vec3::new(0.0, 1.0, 0.0));
        assert!(transform.is_dirty());
    }

    #[test]
    fn test_recompute_is_lazy() {
        let mut transform = clean();
        assert!(!transform.recompute(&Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0))));
        assert_eq!(transform.position(), Vec3::zeros());

        transform.set_position_local(Vec3::new(1.0, 2.0, 3.0));
        assert!(transform.recompute(&Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0))));
        assert_relative_eq!(transform.position(), Vec3::new(6.0, 2.0, 3.0), epsilon = 1e-6);
        assert!(!transform.is_dirty());
    }

    #[test]
    fn test_world_composition_with_rotated_scaled_parent() {
        let parent = MathTransform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let mut child = TransformComponent::default();
        child.set_position_local(Vec3::new(0.0, 0.0, 1.0));
        child.recompute(&parent.to_matrix());

        assert_relative_eq!(child.position(), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(child.scale(), Vec3::new(2.0, 2.0, 2.0), epsilon = 1e-5);
        let dot = child.rotation().coords.dot(&parent.rotation.coords);
        assert_relative_eq!(dot.abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_translate_root_uses_world_axes() {
        let mut transform = TransformComponent::default();
        transform.set_rotation_local(Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI));
        transform.translate(Vec3::new(0.0, 0.0, 1.0));

        assert_relative_eq!(transform.position_local(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_translate_child_uses_local_rotation() {
        let mut keys: SlotMap<EntityKey, ()> = SlotMap::with_key();
        let mut transform = TransformComponent::default();
        transform.parent = Some(keys.insert(()));
        transform.set_rotation_local(Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI));
        transform.translate(Vec3::new(0.0, 0.0, 1.0));

        assert_relative_eq!(transform.position_local(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotate_accumulates_and_stays_unit() {
        let mut transform = TransformComponent::default();
        let quarter = Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI);
        transform.rotate(quarter);
        transform.rotate(quarter);

        assert_relative_eq!(transform.forward(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(transform.rotation_local().into_inner().norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_direction_axes() {
        let transform = TransformComponent::default();
        assert_eq!(transform.forward(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(transform.up(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(transform.right(), Vec3::new(1.0, 0.0, 0.0));
    }
}
