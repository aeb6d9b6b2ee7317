// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cost-greedy leaf insertion.

use core::fmt::Debug;

use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::node::{Node, NodeId, NodeRef};
use crate::tree::Tree;
use crate::volume::Volume;

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Insert an entity with its (tight) box, descending from the root.
    ///
    /// The stored leaf box is `bbox` with its extents scaled by the configured
    /// expansion factor. Returns the new leaf's handle.
    ///
    /// Fails with [`Error::InvalidArgument`] for a malformed box and
    /// [`Error::DuplicateKey`] if `key` is already present. Nothing is mutated on
    /// failure.
    pub fn insert(&mut self, key: K, bbox: V) -> Result<NodeId, Error> {
        self.insert_from(key, bbox, None)
    }

    /// Insert an entity, starting the greedy descent at `start` instead of the root.
    ///
    /// Ancestors of `start` are refit afterwards so every branch still encloses
    /// its children.
    pub fn insert_at(&mut self, key: K, bbox: V, start: NodeRef<K>) -> Result<NodeId, Error> {
        let start = self.resolve(start)?;
        self.insert_from(key, bbox, Some(start))
    }

    fn insert_from(&mut self, key: K, bbox: V, start: Option<NodeId>) -> Result<NodeId, Error> {
        if !bbox.is_well_formed() {
            warn!(?key, ?bbox, "rejecting insert with malformed box");
            return Err(Error::invalid("box must be finite and not inverted"));
        }
        if self.entities.contains_key(&key) {
            warn!(?key, "rejecting insert of duplicate key");
            return Err(Error::DuplicateKey);
        }

        let factor = self.config.expansion_factor;
        let leaf = self.alloc(|generation| {
            let mut node = Node::leaf(generation, key, bbox);
            node.expand(factor);
            node
        });
        self.entities.insert(key, leaf);
        self.insert_leaf(leaf, start);
        debug!(?key, ?leaf, entities = self.entities.len(), "inserted");
        Ok(leaf)
    }

    /// Thread an allocated, detached leaf into the hierarchy.
    fn insert_leaf(&mut self, leaf: NodeId, start: Option<NodeId>) {
        let Some(root) = self.root else {
            self.root = Some(leaf);
            return;
        };

        let leaf_box = self.node(leaf).bbox;
        let mut target = start.unwrap_or(root);
        // Ancestors above a non-root start are not touched by the descent.
        let above_start = if target == root {
            None
        } else {
            self.node(target).parent
        };

        let branch_box = if self.unbranched {
            self.unbranched = false;
            self.node(target).bbox.combine(&leaf_box)
        } else {
            let mut chosen = self.node(target).bbox.combine(&leaf_box);
            while let Some((left, right)) = self.node(target).children() {
                let via_right = leaf_box.combine(&self.node(right).bbox);
                let via_left = leaf_box.combine(&self.node(left).bbox);
                let passed = target;
                // Ties go right.
                let other = if via_left.area() < via_right.area() {
                    chosen = via_left;
                    target = left;
                    right
                } else {
                    chosen = via_right;
                    target = right;
                    left
                };
                trace!(?passed, ?target, "insert descent");
                let grown = chosen.combine(&self.node(other).bbox);
                self.node_mut(passed).bbox = grown;
            }
            chosen
        };

        let old_parent = self.node(target).parent;
        let old_sibling = self.node(target).sibling;
        let branch = self.alloc(|generation| Node::branch(generation, branch_box, leaf, target));
        {
            let b = self.node_mut(branch);
            b.parent = old_parent;
            b.sibling = old_sibling;
        }
        match old_parent {
            Some(p) => {
                self.node_mut(p).swap_child(target, branch);
                if let Some(s) = old_sibling {
                    self.node_mut(s).sibling = Some(branch);
                }
            }
            None => self.root = Some(branch),
        }

        {
            let t = self.node_mut(target);
            t.parent = Some(branch);
            t.sibling = Some(leaf);
        }
        {
            let l = self.node_mut(leaf);
            l.parent = Some(branch);
            l.sibling = Some(target);
        }

        if above_start.is_some() {
            self.refit_upwards(above_start);
        }
    }
}
