//! Scenario tests for the scene registry

mod serialization;

use crate::ecs::EntityKey;
use crate::scene::Scene;

/// `a` (root) -> `b` -> `c`
pub(super) fn chain(scene: &mut Scene) -> (EntityKey, EntityKey, EntityKey) {
    let a = scene.create_entity_named("A");
    let b = scene.create_entity_named("B");
    let c = scene.create_entity_named("C");
    scene.set_parent(b, Some(a));
    scene.set_parent(c, Some(b));
    (a, b, c)
}

/// Every entity reaches a root without revisiting a node, and every
/// children list agrees with the parent links.
pub(super) fn assert_forest(scene: &Scene) {
    for (key, _) in scene.iter() {
        let mut seen = vec![key];
        let mut current = scene.parent_of(key);
        while let Some(parent) = current {
            assert!(!seen.contains(&parent), "cycle through {:?}", parent);
            seen.push(parent);
            current = scene.parent_of(parent);
        }

        if let Some(parent) = scene.parent_of(key) {
            let listed = scene.children_of(parent).iter().filter(|c| **c == key).count();
            assert_eq!(listed, 1, "{:?} listed {} times under its parent", key, listed);
        }
        for child in scene.children_of(key) {
            assert_eq!(scene.parent_of(*child), Some(key));
        }
    }
}
