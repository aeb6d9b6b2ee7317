// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DBVH basics.
//!
//! Insert three entities, report collisions for one of them, then remove
//! everything again.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_dbvh_demos --example dbvh_basics`

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_dbvh::{NodeRef, Tree};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut tree: Tree<&str> = Tree::new();
    tree.insert("a", Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    tree.insert("b", Rect::new(5.0, 5.0, 6.0, 6.0)).unwrap();
    tree.insert("c", Rect::new(0.5, 0.5, 1.5, 1.5)).unwrap();
    println!(
        "{} entities, {} nodes, depth {}",
        tree.len(),
        tree.node_count(),
        tree.depth()
    );

    for (key, fat) in tree.iter() {
        println!("  {key}: {fat:?}");
    }

    // Bind, query, unbind.
    tree.bind_collision_list(Vec::new());
    tree.query(NodeRef::Entity("a")).unwrap();
    let hits = tree.unbind_collision_list().unwrap_or_default();
    println!("a collides with {hits:?}");
    assert_eq!(hits, vec!["c"]);

    println!("all pairs: {:?}", tree.collision_pairs());

    for key in ["b", "a", "c"] {
        tree.remove(&key).unwrap();
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty() && tree.is_unbranched());
    println!("empty again, {} free slots", tree.free_count());
}
