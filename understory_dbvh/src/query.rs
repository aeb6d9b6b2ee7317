// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap queries and the collision list they report into.
//!
//! The reporting protocol is bind, query, unbind:
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_dbvh::{NodeRef, Tree};
//!
//! let mut tree: Tree<u32> = Tree::new();
//! tree.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
//! tree.insert(2, Rect::new(0.5, 0.5, 1.5, 1.5)).unwrap();
//!
//! tree.bind_collision_list(Vec::new());
//! tree.query(NodeRef::Entity(1)).unwrap();
//! let hits = tree.unbind_collision_list().unwrap();
//! assert_eq!(hits, vec![2]);
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use tracing::trace;

use crate::error::Error;
use crate::node::{NodeId, NodeRef};
use crate::tree::Tree;
use crate::volume::Volume;

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Bind the list that [`query`](Self::query) appends colliding keys to.
    ///
    /// Returns the previously bound list, if one was still bound.
    pub fn bind_collision_list(&mut self, list: Vec<K>) -> Option<Vec<K>> {
        self.collisions.replace(list)
    }

    /// Detach and return the bound collision list.
    pub fn unbind_collision_list(&mut self) -> Option<Vec<K>> {
        self.collisions.take()
    }

    /// True while a collision list is bound.
    pub fn has_collision_list(&self) -> bool {
        self.collisions.is_some()
    }

    /// Append `key` to the bound collision list.
    pub fn assign_collision(&mut self, key: K) -> Result<(), Error> {
        let list = self
            .collisions
            .as_mut()
            .ok_or(Error::CollisionListUnbound)?;
        list.push(key);
        Ok(())
    }

    /// Report every entity whose fattened box overlaps `leaf`'s, searching from the root.
    ///
    /// See [`query_from`](Self::query_from).
    pub fn query(&mut self, leaf: NodeRef<K>) -> Result<(), Error> {
        match self.root {
            Some(root) => self.query_from(leaf, NodeRef::Node(root)),
            None => self.resolve(leaf).map(|_| ()),
        }
    }

    /// Report every leaf under `node` whose box overlaps `leaf`'s box into the bound
    /// collision list. `leaf` itself is never reported.
    ///
    /// Subtrees whose box does not overlap are skipped. A tree with fewer than two
    /// nodes cannot report anything and returns `Ok(())` without touching the list.
    ///
    /// Fails with [`Error::NotFound`] if either argument does not resolve to a live
    /// node and with [`Error::CollisionListUnbound`] if no list is bound.
    pub fn query_from(&mut self, leaf: NodeRef<K>, node: NodeRef<K>) -> Result<(), Error> {
        let leaf = self.resolve(leaf)?;
        let node = self.resolve(node)?;
        if self.unbranched {
            return Ok(());
        }
        let mut list = self.collisions.take().ok_or(Error::CollisionListUnbound)?;
        self.visit_overlaps(leaf, node, |k| list.push(k));
        self.collisions = Some(list);
        Ok(())
    }

    /// Collect the keys overlapping `key`'s leaf without touching the bound list.
    pub fn query_collect(&self, key: &K) -> Result<Vec<K>, Error> {
        let mut out = Vec::new();
        self.query_with(key, |k| out.push(k))?;
        Ok(out)
    }

    /// Call `sink` with every key overlapping `key`'s leaf.
    pub fn query_with(&self, key: &K, sink: impl FnMut(K)) -> Result<(), Error> {
        let leaf = self.leaf(key).ok_or(Error::NotFound)?;
        if let (Some(root), false) = (self.root, self.unbranched) {
            self.visit_overlaps(leaf, root, sink);
        }
        Ok(())
    }

    /// Keys of every leaf whose fattened box overlaps `area`.
    pub fn query_volume(&self, area: &V) -> Vec<K> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let n = self.node(id);
            if !n.bbox.intersects(area) {
                continue;
            }
            match n.children() {
                Some((l, r)) => {
                    stack.push(r);
                    stack.push(l);
                }
                None => out.extend(n.key()),
            }
        }
        out
    }

    /// All overlapping leaf pairs, each reported once as `(a, b)` with `a < b`,
    /// sorted ascending.
    pub fn collision_pairs(&self) -> Vec<(K, K)> {
        let mut pairs = Vec::new();
        if let (Some(root), false) = (self.root, self.unbranched) {
            for (&key, &leaf) in &self.entities {
                self.visit_overlaps(leaf, root, |other| {
                    if key < other {
                        pairs.push((key, other));
                    }
                });
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Depth-first walk below `node`, pruning subtrees that miss `leaf`'s box.
    fn visit_overlaps(&self, leaf: NodeId, node: NodeId, mut sink: impl FnMut(K)) {
        let probe = self.node(leaf).bbox;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if id == leaf {
                continue;
            }
            let n = self.node(id);
            if !probe.intersects(&n.bbox) {
                continue;
            }
            match n.children() {
                Some((l, r)) => {
                    // Right first so the left subtree is reported first.
                    stack.push(r);
                    stack.push(l);
                }
                None => {
                    if let Some(k) = n.key() {
                        trace!(?k, "collision");
                        sink(k);
                    }
                }
            }
        }
    }
}
