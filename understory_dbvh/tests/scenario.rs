// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Vec2};
use understory_dbvh::{Aabb2D, Error, NodeRef, Tree, TreeConfig, Volume};

fn unit(x: f64, y: f64) -> Rect {
    Rect::new(x, y, x + 1.0, y + 1.0)
}

#[test]
fn walkthrough_insert_query_remove() {
    let mut tree: Tree<&str> = Tree::new();
    tree.insert("a", Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    tree.insert("b", Rect::new(5.0, 5.0, 6.0, 6.0)).unwrap();
    tree.insert("c", Rect::new(0.5, 0.5, 1.5, 1.5)).unwrap();

    // Fattened: a = [-0.1, 1.1]^2, c = [0.4, 1.6]^2, b far away.
    let fat_a = tree.fat_bounds(&"a").unwrap();
    assert!((fat_a.x0 + 0.1).abs() < 1e-12 && (fat_a.x1 - 1.1).abs() < 1e-12);

    tree.bind_collision_list(Vec::new());
    tree.query(NodeRef::Entity("a")).unwrap();
    tree.query(NodeRef::Entity("b")).unwrap();
    assert_eq!(tree.unbind_collision_list(), Some(vec!["c"]));

    for key in ["b", "a", "c"] {
        tree.remove(&key).unwrap();
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
    assert!(tree.is_unbranched());
    assert_eq!(tree.root(), None);
}

#[test]
fn moving_entities_drift_into_contact() {
    let mut tree: Tree<u32> = Tree::new();
    for k in 0..8_u32 {
        tree.insert(k, unit(f64::from(k) * 10.0, 0.0)).unwrap();
    }
    assert!(tree.collision_pairs().is_empty());

    // Everyone walks left towards entity 0 until the first pair touches.
    let v = Vec2::new(-1.0, 0.0);
    let mut rebuilt = 0;
    for step in 1..=20 {
        for k in 1..8_u32 {
            let x = f64::from(k) * 10.0 - f64::from(step) * f64::from(k) * 0.5;
            if tree.update(&k, unit(x.max(0.0), 0.0), v).unwrap() {
                rebuilt += 1;
            }
        }
        tree.check_invariants().unwrap();
    }
    assert!(rebuilt > 0);
    // After the walk every entity sits on top of 0.
    let hits = tree.query_collect(&0).unwrap();
    assert_eq!(hits.len(), 7);
}

#[test]
fn insert_at_subtree_keeps_ancestors_enclosing() {
    let mut tree: Tree<u32> = Tree::new();
    for (k, x) in [(1, 0.0), (2, 2.0), (3, 50.0), (4, 52.0)] {
        tree.insert(k, unit(x, 0.0)).unwrap();
    }
    let near_three = tree.parent(tree.leaf(&3).unwrap()).unwrap();
    tree.insert_at(5, unit(80.0, 0.0), NodeRef::Node(near_three)).unwrap();
    tree.check_invariants().unwrap();
    let root_box = tree.bounds(tree.root().unwrap()).unwrap();
    assert!(Volume::contains(&root_box, &tree.fat_bounds(&5).unwrap()));
}

#[test]
fn aabb_volume_tree() {
    let mut tree: Tree<u16, Aabb2D<f32>> = Tree::new();
    tree.insert(1, Aabb2D::new(0.0, 0.0, 2.0, 2.0)).unwrap();
    tree.insert(2, Aabb2D::new(1.0, 1.0, 3.0, 3.0)).unwrap();
    tree.insert(3, Aabb2D::new(10.0, 10.0, 11.0, 11.0)).unwrap();
    assert_eq!(tree.collision_pairs(), vec![(1, 2)]);
    assert_eq!(
        tree.insert(4, Aabb2D::new(3.0, 0.0, 1.0, 1.0)),
        Err(Error::InvalidArgument {
            what: "box must be finite and not inverted"
        })
    );
    tree.check_invariants().unwrap();
}

#[test]
fn custom_expansion_factor() {
    let cfg = TreeConfig::default().with_expansion_factor(2.0);
    let mut tree: Tree<u32> = Tree::with_config(cfg).unwrap();
    tree.insert(1, Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();
    assert_eq!(tree.fat_bounds(&1), Some(Rect::new(-1.0, -1.0, 3.0, 3.0)));

    let bad = TreeConfig::default().with_expansion_factor(0.5);
    assert!(matches!(
        Tree::<u32>::with_config(bad),
        Err(Error::InvalidArgument { .. })
    ));
}

#[test]
fn duplicate_and_stale_handles() {
    let mut tree: Tree<u32> = Tree::new();
    let a = tree.insert(1, unit(0.0, 0.0)).unwrap();
    assert_eq!(tree.insert(1, unit(3.0, 3.0)), Err(Error::DuplicateKey));
    tree.remove(&1).unwrap();
    assert_eq!(tree.resolve(NodeRef::Node(a)), Err(Error::NotFound));
    assert_eq!(
        tree.insert_at(2, unit(0.0, 0.0), NodeRef::Node(a)),
        Err(Error::NotFound)
    );
}
