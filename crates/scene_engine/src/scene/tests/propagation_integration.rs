//! Integration tests for dirty-flag propagation across whole trees
//!
//! Each test builds a small hierarchy, flushes it, resets the work counters
//! and then checks which nodes a change reaches.

use std::f32::consts::FRAC_PI_2;

use approx::assert_relative_eq;

use crate::foundation::math::{Quat, Vec3};
use crate::scene::{NodeId, NodeTree};

const EPSILON: f32 = 1e-5;

fn yaw(angle: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), angle)
}

/// root -> a -> b plus root -> s -> t, flushed and with zeroed counters
fn branching_tree() -> (NodeTree, [NodeId; 5]) {
    let mut tree = NodeTree::new();
    let root = tree.create_node(Some("root"));
    let a = tree.create_child(root, Some("a")).unwrap();
    let b = tree.create_child(a, Some("b")).unwrap();
    let s = tree.create_child(root, Some("s")).unwrap();
    let t = tree.create_child(s, Some("t")).unwrap();
    tree.update(root, true, true);
    tree.reset_stats();
    (tree, [root, a, b, s, t])
}

#[test]
fn test_lazy_recompute_is_idempotent() {
    let (mut tree, [_root, a, b, _s, _t]) = branching_tree();
    tree.set_position(a, Vec3::new(0.0, 3.0, 0.0));

    let first = tree.derived_position(b);
    let second = tree.derived_position(b);
    assert_eq!(first, second);
    assert_eq!(tree.node(b).stats().recomputes, 1);
    assert_eq!(tree.node(a).stats().recomputes, 1);
}

#[test]
fn test_composition_with_scaled_parent() {
    let mut tree = NodeTree::new();
    let parent = tree.create_node(Some("parent"));
    tree.set_position(parent, Vec3::new(10.0, 0.0, 0.0));
    tree.set_scale(parent, Vec3::new(2.0, 2.0, 2.0));
    let child = tree.create_child(parent, Some("child")).unwrap();
    tree.set_position(child, Vec3::new(1.0, 0.0, 0.0));

    assert_relative_eq!(tree.derived_position(child), Vec3::new(12.0, 0.0, 0.0), epsilon = EPSILON);
    assert_relative_eq!(tree.derived_scale(child), Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);

    tree.set_orientation(parent, yaw(FRAC_PI_2));
    tree.set_scale(child, Vec3::new(1.0, 3.0, 1.0));
    // Qp * (Sp * Tc) + Tp
    assert_relative_eq!(tree.derived_position(child), Vec3::new(10.0, 0.0, -2.0), epsilon = EPSILON);
    assert_relative_eq!(tree.derived_scale(child), Vec3::new(2.0, 6.0, 2.0), epsilon = EPSILON);
    assert_relative_eq!(
        tree.derived_orientation(child).angle_to(&yaw(FRAC_PI_2)),
        0.0,
        epsilon = 1e-3
    );
}

#[test]
fn test_orientation_inheritance_can_be_disabled() {
    let mut tree = NodeTree::new();
    let parent = tree.create_node(Some("parent"));
    tree.set_orientation(parent, yaw(FRAC_PI_2));
    let child = tree.create_child(parent, Some("child")).unwrap();
    tree.set_inherit_orientation(child, false);

    assert_relative_eq!(tree.derived_orientation(child).angle(), 0.0, epsilon = 1e-3);

    tree.set_inherit_scale(child, false);
    tree.set_scale(parent, Vec3::new(4.0, 4.0, 4.0));
    assert_relative_eq!(tree.derived_scale(child), Vec3::new(1.0, 1.0, 1.0), epsilon = EPSILON);
}

#[test]
fn test_deep_leaf_change_reaches_root_cascade() {
    let mut tree = NodeTree::new();
    let root = tree.create_node(Some("n0"));
    let mut chain = vec![root];
    for depth in 1..6 {
        let name = format!("n{depth}");
        let parent = chain[depth - 1];
        chain.push(tree.create_child(parent, Some(&name)).unwrap());
    }
    tree.update(root, true, true);
    tree.reset_stats();

    let leaf = chain[5];
    tree.set_position(leaf, Vec3::new(0.0, 0.0, 7.0));
    tree.update(root, true, false);

    let node = tree.node(leaf);
    assert!(!node.needs_parent_update());
    assert_eq!(node.stats().recomputes, 1);
    assert_relative_eq!(node.cached_derived_transform().position, Vec3::new(0.0, 0.0, 7.0));

    // ancestors are visited on the way down but not recomputed
    for &ancestor in &chain[..5] {
        assert_eq!(tree.node(ancestor).stats().visits, 1);
        assert_eq!(tree.node(ancestor).stats().recomputes, 0);
    }
}

#[test]
fn test_cascade_and_lazy_read_walk_each_ancestor_once() {
    let mut tree = NodeTree::new();
    let root = tree.create_node(Some("n0"));
    let mut chain = vec![root];
    for depth in 1..64 {
        let name = format!("n{depth}");
        let parent = chain[depth - 1];
        chain.push(tree.create_child(parent, Some(&name)).unwrap());
    }
    tree.reset_stats();

    // each node composes against its parent's settled transform
    tree.update(root, true, true);
    for &id in &chain {
        assert_eq!(tree.node(id).stats().recomputes, 1);
        assert_eq!(tree.node(id).stats().derived_reads, 0);
    }

    tree.reset_stats();
    tree.set_position(root, Vec3::new(0.0, 0.0, 3.0));
    let leaf = chain[63];
    assert_relative_eq!(tree.derived_position(leaf), Vec3::new(0.0, 0.0, 3.0));
    for &id in &chain {
        assert_eq!(tree.node(id).stats().derived_reads, 1);
        assert_eq!(tree.node(id).stats().recomputes, 1);
    }
}

#[test]
fn test_selective_cascade_skips_siblings() {
    let (mut tree, [root, a, b, s, t]) = branching_tree();
    tree.need_update(b, false);

    assert_eq!(tree.node(root).children_to_update().collect::<Vec<_>>(), vec![a]);
    assert_eq!(tree.node(a).children_to_update().collect::<Vec<_>>(), vec![b]);

    tree.update(root, true, false);
    assert_eq!(tree.node(s).stats().visits, 0);
    assert_eq!(tree.node(t).stats().visits, 0);
    assert_eq!(tree.node(b).stats().visits, 1);
}

#[test]
fn test_cancel_before_flush_climbs_to_root() {
    let (mut tree, [root, a, b, _s, _t]) = branching_tree();
    tree.set_position(b, Vec3::x());
    assert!(tree.node(a).is_parent_notified());

    tree.remove_child(a, b).unwrap();

    assert_eq!(tree.node(a).pending_child_count(), 0);
    assert!(!tree.node(a).is_parent_notified());
    assert_eq!(tree.node(root).pending_child_count(), 0);
    assert!(tree.parent(b).is_none());
}

#[test]
fn test_cancel_keeps_other_pending_children() {
    let (mut tree, [root, a, b, _s, _t]) = branching_tree();
    let c = tree.create_child(a, Some("c")).unwrap();
    tree.update(root, true, false);

    tree.set_position(b, Vec3::x());
    tree.set_position(c, Vec3::y());
    tree.remove_child(a, b).unwrap();

    assert_eq!(tree.node(a).children_to_update().collect::<Vec<_>>(), vec![c]);
    assert!(tree.node(a).is_parent_notified());
    assert_eq!(tree.node(root).children_to_update().collect::<Vec<_>>(), vec![a]);
}

#[test]
fn test_derived_position_round_trip() {
    let mut tree = NodeTree::new();
    let parent = tree.create_node(Some("parent"));
    tree.set_position(parent, Vec3::new(-3.0, 2.0, 5.0));
    tree.set_orientation(parent, Quat::from_euler_angles(0.3, -1.1, 0.4));
    tree.set_scale(parent, Vec3::new(0.5, 2.0, 1.5));
    let child = tree.create_child(parent, Some("child")).unwrap();

    let target = Vec3::new(4.0, -1.0, 9.0);
    tree.set_derived_position(child, target);
    assert_relative_eq!(tree.derived_position(child), target, epsilon = 1e-4);
}

#[test]
fn test_scale_change_rebuilds_world_matrix_once() {
    let (mut tree, [_root, a, b, _s, _t]) = branching_tree();
    tree.full_transform(b);
    tree.reset_stats();

    tree.set_scale(b, Vec3::new(2.0, 2.0, 2.0));
    let first = tree.full_transform(b);
    let second = tree.full_transform(b);

    assert_eq!(first, second);
    assert_eq!(tree.node(b).stats().transform_rebuilds, 1);
    assert_eq!(tree.node(a).stats().transform_rebuilds, 0);
    assert_relative_eq!(first[(0, 0)], 2.0, epsilon = EPSILON);
}

#[test]
fn test_remove_all_children_orphans_and_redirties() {
    let (mut tree, [root, a, _b, s, _t]) = branching_tree();
    tree.set_position(root, Vec3::new(5.0, 0.0, 0.0));
    tree.update(root, true, false);

    let removed = tree.remove_all_children(root);
    assert_eq!(removed, vec![a, s]);
    assert!(tree.parent(a).is_none());
    assert!(tree.node(a).needs_parent_update());
    assert_eq!(tree.node(root).pending_child_count(), 0);

    // a no longer inherits the root's offset
    assert_relative_eq!(tree.derived_position(a), Vec3::zeros());
}

#[test]
fn test_reparenting_moves_subtree() {
    let (mut tree, [root, a, b, s, _t]) = branching_tree();
    tree.set_position(s, Vec3::new(0.0, 10.0, 0.0));
    tree.set_parent(b, Some(s)).unwrap();
    tree.update(root, true, false);

    assert!(!tree.has_child(a, b));
    assert!(tree.has_child(s, b));
    assert_relative_eq!(tree.node(b).cached_derived_transform().position, Vec3::new(0.0, 10.0, 0.0));
    assert!(tree.set_parent(s, Some(b)).is_err());
}
