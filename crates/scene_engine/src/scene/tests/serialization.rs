use std::collections::HashSet;

use approx::assert_relative_eq;

use super::{assert_forest, chain};
use crate::config::SceneConfig;
use crate::ecs::components::{Camera, Collider, Light, LightType, RigidBody, Script};
use crate::ecs::{Component, ComponentType, EntityKey, EntityRegistry};
use crate::foundation::math::{Quat, Vec3};
use crate::io::{BinaryReader, BinaryWriter, StreamWriter};
use crate::scene::{Scene, SceneError};

/// A -> B -> C with a few components and non-trivial local state
fn populated() -> (Scene, EntityKey) {
    let mut scene = Scene::new();
    let (a, b, c) = chain(&mut scene);

    let light = scene.get_mut(a).unwrap().add_component::<Light>();
    light.light_type = LightType::Point;
    light.range = 12.0;

    let entity = scene.get_mut(b).unwrap();
    entity.add_component::<RigidBody>().mass = 3.5;
    entity.add_component::<Collider>();
    entity.set_active(false);

    scene.get_mut(c).unwrap().add_component::<Script>().set_script_path("scripts/c.rs");

    let transform = scene.transform_mut(c).unwrap();
    transform.set_position_local(Vec3::new(1.0, 2.0, 3.0));
    transform.set_rotation_local(Quat::from_axis_angle(&Vec3::y_axis(), 0.3));
    transform.set_scale_local(Vec3::new(1.0, 0.5, 2.0));
    transform.look_at(Vec3::new(0.0, 0.0, -5.0));

    (scene, a)
}

fn encode(scene: &Scene, key: EntityKey) -> Vec<u8> {
    let mut writer = BinaryWriter::new(Vec::new());
    scene.serialize_entity(key, &mut writer).unwrap();
    writer.finish().unwrap()
}

fn component_types(scene: &Scene, key: EntityKey) -> Vec<ComponentType> {
    scene.get(key).unwrap().components().map(|c| c.component_type()).collect()
}

#[test]
fn test_roundtrip_into_fresh_scene() {
    let (source, a) = populated();
    let bytes = encode(&source, a);

    let mut target = Scene::new();
    let root = target.instantiate(&mut BinaryReader::new(bytes.as_slice()), None).unwrap();

    assert_eq!(target.len(), source.len());
    assert_forest(&target);
    assert_eq!(target.roots(), vec![root]);

    for name in ["A", "B", "C"] {
        let before = source.find_by_name(name).unwrap();
        let after = target.find_by_name(name).unwrap();
        assert_eq!(component_types(&target, after), component_types(&source, before));
        assert_eq!(target.child_count(after), source.child_count(before));
        // Nothing collided, so ids survive
        assert_eq!(target.get(after).unwrap().id(), source.get(before).unwrap().id());
        assert_eq!(
            target.transform(after).unwrap().id(),
            source.transform(before).unwrap().id()
        );
    }

    let b = target.find_by_name("B").unwrap();
    let c = target.find_by_name("C").unwrap();
    assert_eq!(target.parent_of(b), Some(root));
    assert_eq!(target.parent_of(c), Some(b));
    assert!(!target.get(b).unwrap().is_active());

    let light = target.get(root).unwrap().get_component::<Light>().unwrap();
    assert_eq!(light.light_type, LightType::Point);
    assert_eq!(light.range, 12.0);

    let body = target.get(b).unwrap().get_component::<RigidBody>().unwrap();
    let collider = target.get(b).unwrap().get_component::<Collider>().unwrap();
    assert_eq!(body.mass, 3.5);
    assert_eq!(collider.rigid_body(), Some(body.id()));

    let transform = target.transform(c).unwrap();
    assert_eq!(transform.position_local(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(transform.scale_local(), Vec3::new(1.0, 0.5, 2.0));
    assert_eq!(transform.look_at_target(), Vec3::new(0.0, 0.0, -5.0));
    assert_relative_eq!(
        transform.rotation_local(),
        Quat::from_axis_angle(&Vec3::y_axis(), 0.3),
        epsilon = 1e-6
    );
    assert_eq!(
        target.get(c).unwrap().get_component::<Script>().unwrap().script_path(),
        "scripts/c.rs"
    );
}

#[test]
fn test_loaded_world_state_is_consistent() {
    let (mut source, a) = populated();
    source.transform_mut(a).unwrap().set_position_local(Vec3::new(0.0, 10.0, 0.0));
    let c = source.find_by_name("C").unwrap();
    let expected = source.world_position(c).unwrap();

    let bytes = encode(&source, a);
    let mut target = Scene::new();
    target.instantiate(&mut BinaryReader::new(bytes.as_slice()), None).unwrap();

    let loaded = target.find_by_name("C").unwrap();
    assert!(target.transform(loaded).unwrap().is_dirty());
    assert_relative_eq!(target.world_position(loaded).unwrap(), expected, epsilon = 1e-5);
}

#[test]
fn test_id_collision_keeps_fresh_ids() {
    let (mut scene, a) = populated();
    let bytes = encode(&scene, a);

    let copy = scene.instantiate(&mut BinaryReader::new(bytes.as_slice()), None).unwrap();

    assert_eq!(scene.len(), 6);
    assert_ne!(scene.entity_id(copy), scene.entity_id(a));
    let ids: HashSet<_> = scene.iter().map(|(_, entity)| entity.id().to_string()).collect();
    assert_eq!(ids.len(), 6);

    // The copy is wired from the record structure, not from the stale ids
    assert_eq!(scene.descendants(copy).len(), 2);
    assert_eq!(scene.descendants(a).len(), 2);
    assert_eq!(scene.roots().len(), 2);
    assert_forest(&scene);
}

#[test]
fn test_instantiate_under_parent() {
    let (mut scene, a) = populated();
    let bytes = encode(&scene, a);
    let holder = scene.create_entity_named("Holder");

    let copy = scene
        .instantiate(&mut BinaryReader::new(bytes.as_slice()), Some(holder))
        .unwrap();

    assert_eq!(scene.parent_of(copy), Some(holder));
    assert_eq!(scene.children_of(holder), &[copy]);
    assert_forest(&scene);
}

#[test]
fn test_components_sharing_an_id_load_in_header_order() {
    let mut source = Scene::new();
    let key = source.create_entity_named("Rig");
    let entity = source.get_mut(key).unwrap();
    let light_id = {
        let light = entity.add_component::<Light>();
        light.range = 7.0;
        light.id()
    };
    let camera = entity.add_component::<Camera>();
    camera.set_id(light_id);
    camera.fov_degrees = 33.0;

    let bytes = encode(&source, key);
    let mut target = Scene::new();
    let root = target.instantiate(&mut BinaryReader::new(bytes.as_slice()), None).unwrap();

    let entity = target.get(root).unwrap();
    assert_eq!(entity.get_component::<Light>().unwrap().range, 7.0);
    assert_eq!(entity.get_component::<Camera>().unwrap().fov_degrees, 33.0);
}

#[test]
fn test_stale_child_link_is_left_out_of_record() {
    let (mut scene, a) = populated();
    let ghost = scene.create_entity_named("Ghost");
    scene.remove_entity(ghost);
    scene.transform_mut(a).unwrap().children.push(ghost);

    let bytes = encode(&scene, a);
    let mut target = Scene::new();
    let root = target.instantiate(&mut BinaryReader::new(bytes.as_slice()), None).unwrap();

    assert_eq!(target.len(), 3);
    assert_eq!(target.child_count(root), 1);
    assert_forest(&target);
}

#[test]
fn test_deep_subtree_children_after_load() {
    let mut source = Scene::new();
    let root = source.create_entity_named("0");
    let mut tip = root;
    for depth in 1..64 {
        let next = source.create_entity_named(depth.to_string());
        source.set_parent(next, Some(tip));
        tip = next;
    }
    for leaf in 0..4 {
        let key = source.create_entity_named(format!("leaf{leaf}"));
        source.set_parent(key, Some(root));
    }

    let bytes = encode(&source, root);
    let mut target = Scene::new();
    let loaded = target.instantiate(&mut BinaryReader::new(bytes.as_slice()), None).unwrap();

    assert_eq!(target.len(), source.len());
    assert_forest(&target);
    assert_eq!(target.descendants(loaded).len(), 67);
    let names: Vec<String> = target
        .children_of(loaded)
        .iter()
        .map(|child| target.get(*child).unwrap().name().to_string())
        .collect();
    assert_eq!(names, ["1", "leaf0", "leaf1", "leaf2", "leaf3"]);
}

#[test]
fn test_unknown_component_tag_aborts_load() {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_bool(false).unwrap();
    writer.write_bool(true).unwrap();
    writer.write_bool(true).unwrap();
    writer.write_str("entity-1").unwrap();
    writer.write_str("Broken").unwrap();
    writer.write_i32(1).unwrap();
    writer.write_str("Teleporter").unwrap();
    writer.write_u32(5).unwrap();
    let bytes = writer.into_inner();

    let mut scene = Scene::new();
    let result = scene.instantiate(&mut BinaryReader::new(bytes.as_slice()), None);

    assert!(matches!(result, Err(SceneError::UnknownComponentType(_))));
    assert!(scene.is_empty());
    assert!(scene.lookup_entity_by_id("entity-1").is_none());
}

#[test]
fn test_truncated_record_fails() {
    let (source, a) = populated();
    let bytes = encode(&source, a);

    let mut target = Scene::new();
    let result = target.instantiate(&mut BinaryReader::new(&bytes[..bytes.len() / 2]), None);

    assert!(matches!(result, Err(SceneError::Stream(_))));
    assert!(target.is_empty());
}

#[test]
fn test_prefab_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (mut source, a) = populated();

    let path = source.save_prefab(a, dir.path().join("tower")).unwrap();
    assert!(path.to_string_lossy().ends_with("tower.prefab"));
    assert!(source.get(a).unwrap().is_prefab());

    let mut target = Scene::new();
    let root = target.load_prefab(&path).unwrap();

    assert!(target.get(root).unwrap().is_prefab());
    assert!(!target.get(target.find_by_name("B").unwrap()).unwrap().is_prefab());
    assert_eq!(target.len(), 3);
    assert_forest(&target);
}

#[test]
fn test_load_prefab_rejects_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tower.scene");
    std::fs::write(&path, b"not a prefab").unwrap();

    let mut scene = Scene::new();
    let result = scene.load_prefab(&path);

    assert!(matches!(result, Err(SceneError::InvalidExtension { .. })));
    assert!(scene.is_empty());
}

#[test]
fn test_custom_prefab_extension() {
    let dir = tempfile::tempdir().unwrap();
    let config = SceneConfig::default().with_prefab_extension(".blueprint");
    let mut scene = Scene::with_config(config);
    let (a, _, _) = chain(&mut scene);

    let path = scene.save_prefab(a, dir.path().join("tower")).unwrap();
    assert!(path.to_string_lossy().ends_with(".blueprint"));
    assert!(scene.load_prefab(&path).is_ok());
    assert!(matches!(
        scene.load_prefab(dir.path().join("tower.prefab")),
        Err(SceneError::InvalidExtension { .. })
    ));
}

#[test]
fn test_scene_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (mut source, _) = populated();
    let lone = source.create_entity_named("Lone");
    source.transform_mut(lone).unwrap().set_position_local(Vec3::new(-2.0, 0.0, 0.0));

    let path = source.save_scene(dir.path().join("level")).unwrap();

    let mut target = Scene::new();
    target.create_entity_named("Leftover");
    target.load_scene(&path).unwrap();

    assert_eq!(target.len(), 4);
    assert_eq!(target.roots().len(), 2);
    assert!(target.find_by_name("Leftover").is_none());
    let lone = target.find_by_name("Lone").unwrap();
    assert_eq!(
        target.transform(lone).unwrap().position_local(),
        Vec3::new(-2.0, 0.0, 0.0)
    );
    assert_forest(&target);
}

#[test]
fn test_serialize_missing_entity() {
    let (mut scene, a) = populated();
    scene.remove_entity(a);

    let mut writer = BinaryWriter::new(Vec::new());
    assert!(matches!(
        scene.serialize_entity(a, &mut writer),
        Err(SceneError::EntityNotFound(_))
    ));
}
