// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf removal with parent splice-out and ancestor refit.

use core::fmt::Debug;

use tracing::debug;

use crate::error::Error;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::volume::Volume;

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Remove an entity and the branch that held it.
    ///
    /// The leaf's and its parent's slots go onto the free list; a later reuse of
    /// either slot is issued a new [`NodeId`] generation.
    ///
    /// Returns the node at which the upward refit stopped (or the root if the refit
    /// reached it), `Ok(None)` if the tree became empty, and [`Error::NotFound`] if
    /// `key` is not present.
    pub fn remove(&mut self, key: &K) -> Result<Option<NodeId>, Error> {
        let Some(leaf) = self.entities.remove(key) else {
            return Err(Error::NotFound);
        };
        let parent = self.node(leaf).parent;
        let sibling = self.node(leaf).sibling;
        self.release(leaf);

        let Some(parent) = parent.filter(|_| !self.unbranched) else {
            self.root = None;
            self.unbranched = true;
            debug!(?key, "removed last entity");
            return Ok(None);
        };
        let sibling = sibling.expect("attached leaf without sibling");

        let grand = self.node(parent).parent;
        let parent_sibling = self.node(parent).sibling;
        self.release(parent);

        let Some(grand) = grand else {
            // The parent was the root; the sibling takes its place.
            let s = self.node_mut(sibling);
            s.parent = None;
            s.sibling = None;
            let sibling_is_leaf = s.is_leaf();
            self.root = Some(sibling);
            self.unbranched = sibling_is_leaf;
            debug!(?key, root = ?sibling, "removed; sibling promoted to root");
            return Ok(self.root);
        };

        self.node_mut(grand).swap_child(parent, sibling);
        {
            let s = self.node_mut(sibling);
            s.parent = Some(grand);
            s.sibling = parent_sibling;
        }
        if let Some(ps) = parent_sibling {
            self.node_mut(ps).sibling = Some(sibling);
        }

        let stopped = self.refit_upwards(Some(grand));
        debug!(?key, ?stopped, entities = self.entities.len(), "removed");
        Ok(stopped.or(self.root))
    }
}
