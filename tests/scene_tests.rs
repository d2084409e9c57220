//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create/remove nodes, attach hierarchy, skeleton cleanup
//! - Node query by name within a subtree
//! - Transform heading rotation and world matrix propagation
//! - Camera framing and aspect updates

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Quat, Vec3};
use myth_avatar::scene::{Camera, Node, Scene, Skeleton, Transform};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn scene_create_node_with_name() {
    let mut scene = Scene::default();
    let handle = scene.create_node_with_name("TestNode");
    assert_eq!(scene.get_node(handle).unwrap().name, "TestNode");
    assert!(scene.root_nodes.contains(&handle));
}

#[test]
fn scene_remove_node_removes_subtree() {
    let mut scene = Scene::default();
    let parent = scene.create_node_with_name("Armature");
    let child = scene.add_to_parent(Node::new("Hips"), parent);
    let grandchild = scene.add_to_parent(Node::new("Spine"), child);

    scene.remove_node(parent);

    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.get_node(grandchild).is_none());
    assert!(scene.root_nodes.is_empty());
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn scene_remove_node_drops_skeleton() {
    let mut scene = Scene::default();
    let root = scene.create_node_with_name("avatar_root");
    let hips = scene.add_to_parent(Node::new("Hips"), root);
    let key = scene.add_skeleton(Skeleton::new("Skin", vec![hips], vec![Affine3A::IDENTITY], 0));

    let mut body = Node::new("Body");
    body.skin = Some(key);
    scene.add_to_parent(body, root);

    scene.remove_node(root);
    assert!(scene.skeleton(key).is_none(), "Skeleton should go with its mesh node");
}

#[test]
fn scene_remove_node_drops_unbound_skeleton() {
    let mut scene = Scene::default();
    let root = scene.create_node_with_name("avatar_root");
    let hips = scene.add_to_parent(Node::new("Hips"), root);
    let spine = scene.add_to_parent(Node::new("Spine"), hips);
    // No node carries this skin.
    let key = scene.add_skeleton(Skeleton::new(
        "Orphan",
        vec![hips, spine],
        vec![Affine3A::IDENTITY; 2],
        0,
    ));
    let other = scene.create_node_with_name("other");
    let kept = scene.add_skeleton(Skeleton::new("Other", vec![other], vec![Affine3A::IDENTITY], 0));

    scene.remove_node(root);
    assert!(scene.skeleton(key).is_none(), "Skeleton should go with its bones");
    assert!(scene.skeleton(kept).is_some(), "Unrelated skeleton survives");
}

#[test]
fn scene_remove_child_keeps_parent() {
    let mut scene = Scene::default();
    let parent = scene.create_node_with_name("parent");
    let child = scene.add_to_parent(Node::new("child"), parent);

    scene.remove_node(child);
    assert!(scene.get_node(parent).unwrap().children().is_empty());
    assert!(scene.root_nodes.contains(&parent));
}

// ============================================================================
// Hierarchy: Attach
// ============================================================================

#[test]
fn scene_attach_removes_from_old_parent() {
    let mut scene = Scene::default();
    let parent1 = scene.create_node_with_name("p1");
    let parent2 = scene.create_node_with_name("p2");
    let child = scene.create_node_with_name("child");

    scene.attach(child, parent1);
    assert!(!scene.root_nodes.contains(&child), "Attached node leaves the root list");

    scene.attach(child, parent2);
    assert!(
        !scene.get_node(parent1).unwrap().children().contains(&child),
        "Child should be removed from old parent"
    );
    assert!(scene.get_node(parent2).unwrap().children().contains(&child));
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent2));
}

#[test]
fn scene_attach_to_self_is_noop() {
    let mut scene = Scene::default();
    let node = scene.create_node_with_name("n");
    scene.attach(node, node);
    assert_eq!(scene.get_node(node).unwrap().parent(), None);
}

#[test]
fn find_node_by_name_stays_in_subtree() {
    let mut scene = Scene::default();
    let avatar = scene.create_node_with_name("avatar_root");
    let hips = scene.add_to_parent(Node::new("Hips"), avatar);
    let other = scene.create_node_with_name("other");
    scene.add_to_parent(Node::new("Spine"), other);

    assert_eq!(scene.find_node_by_name(avatar, "Hips"), Some(hips));
    assert_eq!(scene.find_node_by_name(avatar, "Spine"), None);
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn transform_update_local_matrix_dirty_check() {
    let mut t = Transform::new();
    assert!(t.update_local_matrix(), "First update is forced");
    assert!(!t.update_local_matrix(), "Nothing changed");

    t.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(t.update_local_matrix());
    assert!(vec3_approx(t.local_matrix().translation.into(), Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn transform_rotate_y_accumulates_heading() {
    let mut t = Transform::new();
    t.rotate_y(0.3);
    t.rotate_y(0.2);
    assert!((t.heading() - 0.5).abs() < EPSILON, "heading={}", t.heading());
}

#[test]
fn transform_look_at_faces_target() {
    let mut t = Transform::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
    t.look_at(Vec3::new(1.0, 0.0, 0.0), Vec3::Y);
    let forward = t.rotation * Vec3::NEG_Z;
    assert!(vec3_approx(forward, Vec3::X), "forward={forward}");
}

#[test]
fn hierarchy_world_matrix_propagates() {
    let mut scene = Scene::default();
    let root = scene.create_node_with_name("root");
    let child = scene.add_to_parent(Node::new("child"), root);

    scene.get_node_mut(root).unwrap().transform.rotate_y(FRAC_PI_2);
    scene.get_node_mut(child).unwrap().transform.position = Vec3::new(0.0, 1.0, -1.0);
    scene.update_matrix_world();

    let world: Vec3 = scene.get_node(child).unwrap().world_matrix().translation.into();
    assert!(vec3_approx(world, Vec3::new(-1.0, 1.0, 0.0)), "world={world}");

    // Re-parenting marks the child dirty; its world matrix follows the new parent.
    let other = scene.create_node_with_name("other");
    scene.get_node_mut(other).unwrap().transform.position = Vec3::new(5.0, 0.0, 0.0);
    scene.attach(child, other);
    scene.update_matrix_world();
    let world: Vec3 = scene.get_node(child).unwrap().world_matrix().translation.into();
    assert!(vec3_approx(world, Vec3::new(5.0, 1.0, -1.0)), "world={world}");
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_set_aspect_rejects_degenerate() {
    let mut camera = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    camera.set_aspect(16.0 / 9.0);
    assert!((camera.aspect - 16.0 / 9.0).abs() < EPSILON);

    camera.set_aspect(0.0);
    camera.set_aspect(f32::NAN);
    assert!((camera.aspect - 16.0 / 9.0).abs() < EPSILON);
}

#[test]
fn camera_place_looks_at_target() {
    let mut camera = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
    camera.place(Vec3::new(0.0, 1.0, 3.0), Vec3::new(0.0, 1.0, 0.0));

    // The target lands in the centre of the view.
    let clip = camera.view_projection_matrix().project_point3(Vec3::new(0.0, 1.0, 0.0));
    assert!(clip.x.abs() < EPSILON && clip.y.abs() < EPSILON, "clip={clip}");
}
