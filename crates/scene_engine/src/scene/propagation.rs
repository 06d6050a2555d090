//! World-state propagation
//!
//! A Transform recomputes its world state only when dirty, and marks its
//! direct children dirty when it does. Dirtiness therefore travels one level
//! per recompute, and a consistent world state needs parents updated before
//! children. Two drivers guarantee that order:
//!
//! - [`Scene::update_transforms`] (and [`Scene::update`]) walk the forest
//!   top-down once per frame
//! - [`Scene::resolve_world`] updates a single entity's ancestor chain
//!   root-first, which every world-space read below goes through

use crate::ecs::EntityKey;
use crate::foundation::math::{reciprocal, Mat4, Point3, Quat, Vec3};

use super::Scene;

impl Scene {
    /// One lazy recompute step for a single Transform.
    ///
    /// Uses the parent's cached world matrix as is. Returns whether the world
    /// state was recomputed, in which case the direct children are now dirty.
    pub fn update_transform(&mut self, key: EntityKey) -> bool {
        let parent_world = self
            .parent_of(key)
            .and_then(|parent| self.transform(parent))
            .map_or_else(Mat4::identity, |parent| parent.world_matrix());

        let Some(transform) = self.transform_mut(key) else {
            return false;
        };
        if !transform.recompute(&parent_world) {
            return false;
        }

        let children = transform.children().to_vec();
        for child in children {
            if let Some(transform) = self.transform_mut(child) {
                transform.make_dirty();
            }
        }
        true
    }

    /// Recompute every dirty Transform, parents before children
    pub fn update_transforms(&mut self) {
        for key in self.preorder() {
            self.update_transform(key);
        }
    }

    /// Bring `key` and its ancestors up to date, root first
    pub fn resolve_world(&mut self, key: EntityKey) {
        let mut chain = self.ancestors(key);
        chain.reverse();
        chain.push(key);

        for member in chain {
            self.update_transform(member);
        }
    }

    // ========================================================================
    // World-space reads
    // ========================================================================

    /// World-space position
    pub fn world_position(&mut self, key: EntityKey) -> Option<Vec3> {
        self.resolve_world(key);
        self.transform(key).map(|transform| transform.position())
    }

    /// World-space rotation
    pub fn world_rotation(&mut self, key: EntityKey) -> Option<Quat> {
        self.resolve_world(key);
        self.transform(key).map(|transform| transform.rotation())
    }

    /// World-space scale
    pub fn world_scale(&mut self, key: EntityKey) -> Option<Vec3> {
        self.resolve_world(key);
        self.transform(key).map(|transform| transform.scale())
    }

    /// World matrix
    pub fn world_matrix(&mut self, key: EntityKey) -> Option<Mat4> {
        self.resolve_world(key);
        self.transform(key).map(|transform| transform.world_matrix())
    }

    // ========================================================================
    // World-space writes
    // ========================================================================

    /// Place an entity at a world-space position
    pub fn set_position(&mut self, key: EntityKey, position: Vec3) {
        let local = match self.resolved_parent_world(key) {
            Some(parent_world) => match parent_world.try_inverse() {
                Some(inverse) => inverse.transform_point(&Point3::from(position)).coords,
                None => {
                    log::warn!("Cannot set world position of {:?}: parent matrix is singular", key);
                    return;
                }
            },
            None => position,
        };

        match self.transform_mut(key) {
            Some(transform) => transform.set_position_local(local),
            None => log::warn!("Cannot set position of {:?}: not in the scene", key),
        }
    }

    /// Give an entity a world-space rotation
    pub fn set_rotation(&mut self, key: EntityKey, rotation: Quat) {
        let parent_rotation = self.resolved_parent(key).map(|parent| parent.1);
        let local = match parent_rotation {
            Some(parent_rotation) => parent_rotation.inverse() * rotation,
            None => rotation,
        };

        match self.transform_mut(key) {
            Some(transform) => transform.set_rotation_local(local),
            None => log::warn!("Cannot set rotation of {:?}: not in the scene", key),
        }
    }

    /// Give an entity a world-space scale
    pub fn set_scale(&mut self, key: EntityKey, scale: Vec3) {
        let parent_scale = self.resolved_parent(key).map(|parent| parent.2);
        let local = match parent_scale {
            Some(parent_scale) => scale.component_mul(&reciprocal(&parent_scale)),
            None => scale,
        };

        match self.transform_mut(key) {
            Some(transform) => transform.set_scale_local(local),
            None => log::warn!("Cannot set scale of {:?}: not in the scene", key),
        }
    }

    fn resolved_parent_world(&mut self, key: EntityKey) -> Option<Mat4> {
        self.resolved_parent(key).map(|parent| parent.0)
    }

    /// Up-to-date world matrix, rotation and scale of the parent, if any
    fn resolved_parent(&mut self, key: EntityKey) -> Option<(Mat4, Quat, Vec3)> {
        let parent = self.parent_of(key)?;
        self.resolve_world(parent);
        self.transform(parent)
            .map(|parent| (parent.world_matrix(), parent.rotation(), parent.scale()))
    }
}
