//! Parent/child structure
//!
//! The parent relation is a forest at all times. Every structural edit goes
//! through [`Scene::set_parent`] or [`Scene::become_orphan`], which update both
//! the child's parent link and the old/new parents' children lists before
//! returning.

use std::collections::HashSet;

use crate::ecs::EntityKey;

use super::Scene;

impl Scene {
    // ========================================================================
    // Queries
    // ========================================================================

    /// Parent of an entity, `None` for roots and unknown keys
    pub fn parent_of(&self, key: EntityKey) -> Option<EntityKey> {
        self.transform(key)?.parent()
    }

    /// Direct children of an entity
    pub fn children_of(&self, key: EntityKey) -> &[EntityKey] {
        match self.transform(key) {
            Some(transform) => transform.children(),
            None => &[],
        }
    }

    /// Child at `index`, logging a warning when out of range
    pub fn child_by_index(&self, key: EntityKey, index: usize) -> Option<EntityKey> {
        let children = self.children_of(key);
        let child = children.get(index).copied();
        if child.is_none() {
            log::warn!(
                "{}: child index {} out of range ({} children)",
                self.get(key).map_or("<missing>", |entity| entity.name()),
                index,
                children.len()
            );
        }
        child
    }

    /// Number of direct children
    pub fn child_count(&self, key: EntityKey) -> usize {
        self.children_of(key).len()
    }

    /// Whether an entity has at least one child
    pub fn has_children(&self, key: EntityKey) -> bool {
        !self.children_of(key).is_empty()
    }

    /// Topmost ancestor (the entity itself for a root)
    pub fn root_of(&self, key: EntityKey) -> Option<EntityKey> {
        if !self.contains(key) {
            return None;
        }
        Some(self.ancestors(key).last().copied().unwrap_or(key))
    }

    /// Every descendant in pre-order, excluding `key` itself
    pub fn descendants(&self, key: EntityKey) -> Vec<EntityKey> {
        let mut result = Vec::new();
        let mut stack: Vec<EntityKey> = self.children_of(key).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children_of(current).iter().rev().copied());
        }
        result
    }

    /// Whether `key` sits somewhere below `ancestor`
    pub fn is_descendant_of(&self, key: EntityKey, ancestor: EntityKey) -> bool {
        self.ancestors(key).contains(&ancestor)
    }

    /// Parent, grandparent, ... up to the root
    pub(crate) fn ancestors(&self, key: EntityKey) -> Vec<EntityKey> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(key);

        while let Some(parent) = current {
            // A longer chain than the scene has entities can only be a cycle
            if chain.len() > self.len() {
                log::error!("Parent chain of {:?} does not terminate", key);
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// All entities, each root followed by its subtree in pre-order
    pub(crate) fn preorder(&self) -> Vec<EntityKey> {
        let mut order = Vec::with_capacity(self.len());
        for root in self.roots() {
            order.push(root);
            order.extend(self.descendants(root));
        }
        order
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Re-parent `key` under `parent`, or make it a root with `None`.
    ///
    /// Self-parenting and re-setting the current parent are no-ops. When
    /// `parent` is currently below `key`, the direct children of `key` are
    /// first handed to its own parent (or made roots) so no cycle can form.
    pub fn set_parent(&mut self, key: EntityKey, parent: Option<EntityKey>) {
        let Some(parent) = parent else {
            self.become_orphan(key);
            return;
        };

        if !self.contains(key) {
            log::warn!("Cannot re-parent {:?}: not in the scene", key);
            return;
        }
        if parent == key || self.parent_of(key) == Some(parent) {
            return;
        }
        if !self.contains(parent) {
            log::warn!("Cannot re-parent {:?}: parent {:?} not in the scene", key, parent);
            return;
        }

        if self.is_descendant_of(parent, key) {
            let grandparent = self.parent_of(key);
            let children = self.children_of(key).to_vec();
            log::debug!(
                "Re-parenting {:?} under its descendant {:?}, moving {} children to {:?}",
                key,
                parent,
                children.len(),
                grandparent
            );

            for child in children {
                self.detach(child);
                if let Some(grandparent) = grandparent {
                    self.attach(child, grandparent);
                }
                if let Some(transform) = self.transform_mut(child) {
                    transform.make_dirty();
                }
            }
        }

        self.detach(key);
        self.attach(key, parent);
        if let Some(transform) = self.transform_mut(key) {
            transform.make_dirty();
        }
    }

    /// Detach from the current parent and become a root
    pub fn become_orphan(&mut self, key: EntityKey) {
        if self.parent_of(key).is_none() {
            return;
        }

        self.detach(key);
        if let Some(transform) = self.transform_mut(key) {
            transform.make_dirty();
        }
    }

    /// Rebuild the children lists of `key` and its whole subtree from the
    /// parent links of every entity in the scene.
    ///
    /// Children that are still attached keep their order; newly found ones
    /// are appended in registry order.
    pub fn resolve_children(&mut self, key: EntityKey) {
        let mut pending = vec![key];
        let mut visited = HashSet::new();

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }

            let found: Vec<EntityKey> = self
                .iter()
                .filter(|(_, entity)| {
                    entity.transform().and_then(|transform| transform.parent()) == Some(current)
                })
                .map(|(child, _)| child)
                .collect();

            let Some(transform) = self.transform_mut(current) else {
                continue;
            };
            let mut children: Vec<EntityKey> = transform
                .children
                .iter()
                .copied()
                .filter(|child| found.contains(child))
                .collect();
            for child in found {
                if !children.contains(&child) {
                    children.push(child);
                }
            }

            pending.extend(children.iter().copied());
            transform.children = children;
        }
    }

    pub(crate) fn detach(&mut self, key: EntityKey) {
        let Some(old_parent) = self.parent_of(key) else {
            return;
        };

        if let Some(transform) = self.transform_mut(old_parent) {
            transform.children.retain(|child| *child != key);
        }
        if let Some(transform) = self.transform_mut(key) {
            transform.parent = None;
        }
    }

    fn attach(&mut self, key: EntityKey, parent: EntityKey) {
        if let Some(transform) = self.transform_mut(key) {
            transform.parent = Some(parent);
        }
        if let Some(transform) = self.transform_mut(parent) {
            if !transform.children.contains(&key) {
                transform.children.push(key);
            }
        }
        log::debug!("Attached {:?} under {:?}", key, parent);
    }
}
