// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural self-check used by tests and debug tooling.

use alloc::vec;
use core::fmt::Debug;

use crate::node::NodeId;
use crate::tree::Tree;
use crate::volume::Volume;

/// A broken structural invariant found by [`Tree::check_invariants`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// The root has a parent or sibling link.
    #[error("root {0:?} has a parent or sibling")]
    RootLinked(NodeId),
    /// A child's parent link does not point back at the branch holding it.
    #[error("child {child:?} does not point back at parent {parent:?}")]
    ParentLink {
        /// Branch holding the child.
        parent: NodeId,
        /// Child with the wrong back-link.
        child: NodeId,
    },
    /// The two children of a branch are not each other's sibling.
    #[error("children of {0:?} are not mutual siblings")]
    SiblingLink(NodeId),
    /// A branch box differs from the union of its children.
    #[error("box of {0:?} is not the union of its children")]
    StaleBox(NodeId),
    /// A branch lists itself as its own child.
    #[error("branch {0:?} is its own child")]
    SelfChild(NodeId),
    /// A reachable leaf is missing from the entity map or mapped to another node.
    #[error("leaf {0:?} is not registered under its key")]
    UnmappedLeaf(NodeId),
    /// Reachable nodes and live arena nodes disagree, or a node was reached twice.
    #[error("reached {reached} nodes but {live} are live")]
    NodeCount {
        /// Nodes reached from the root.
        reached: usize,
        /// Live nodes in the arena.
        live: usize,
    },
    /// Reachable leaves and entity map size disagree.
    #[error("reached {reached} leaves but {mapped} keys are mapped")]
    LeafCount {
        /// Leaves reached from the root.
        reached: usize,
        /// Entries in the entity map.
        mapped: usize,
    },
    /// The unbranched flag does not match the node count.
    #[error("unbranched flag is {0} with {1} live nodes")]
    UnbranchedFlag(bool, usize),
}

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Walk the whole tree and verify every structural invariant.
    ///
    /// - each branch box equals the union of its children,
    /// - parent, child and sibling links agree,
    /// - every live node is reachable from the root exactly once,
    /// - every leaf is registered under its key and nothing else is,
    /// - the unbranched flag matches the node count.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let live = self.node_count();
        if self.unbranched != (live <= 1) {
            return Err(InvariantViolation::UnbranchedFlag(self.unbranched, live));
        }
        let Some(root) = self.root else {
            return if live == 0 && self.entities.is_empty() {
                Ok(())
            } else {
                Err(InvariantViolation::NodeCount { reached: 0, live })
            };
        };
        let r = self.node(root);
        if r.parent.is_some() || r.sibling.is_some() {
            return Err(InvariantViolation::RootLinked(root));
        }

        let mut reached = 0_usize;
        let mut leaves = 0_usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reached += 1;
            if reached > live {
                return Err(InvariantViolation::NodeCount { reached, live });
            }
            let n = self.node(id);
            match n.children() {
                None => {
                    leaves += 1;
                    let mapped = n.key().and_then(|k| self.entities.get(&k).copied());
                    if mapped != Some(id) {
                        return Err(InvariantViolation::UnmappedLeaf(id));
                    }
                }
                Some((l, r)) => {
                    if l == id || r == id || l == r {
                        return Err(InvariantViolation::SelfChild(id));
                    }
                    let (nl, nr) = (self.node(l), self.node(r));
                    for child in [l, r] {
                        if self.node(child).parent != Some(id) {
                            return Err(InvariantViolation::ParentLink { parent: id, child });
                        }
                    }
                    if nl.sibling != Some(r) || nr.sibling != Some(l) {
                        return Err(InvariantViolation::SiblingLink(id));
                    }
                    if !n.bbox.equivalent(&nl.bbox.combine(&nr.bbox)) {
                        return Err(InvariantViolation::StaleBox(id));
                    }
                    stack.push(l);
                    stack.push(r);
                }
            }
        }
        if reached != live {
            return Err(InvariantViolation::NodeCount { reached, live });
        }
        if leaves != self.entities.len() {
            return Err(InvariantViolation::LeafCount {
                reached: leaves,
                mapped: self.entities.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn detects_stale_branch_box() {
        let mut t: Tree<u32, Rect> = Tree::new();
        t.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        t.insert(2, Rect::new(4.0, 0.0, 5.0, 1.0)).unwrap();
        assert_eq!(t.check_invariants(), Ok(()));
        let root = t.root().unwrap();
        t.node_mut(root).bbox = Rect::ZERO;
        assert_eq!(t.check_invariants(), Err(InvariantViolation::StaleBox(root)));
    }

    #[test]
    fn detects_broken_sibling() {
        let mut t: Tree<u32, Rect> = Tree::new();
        let a = t.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        t.insert(2, Rect::new(4.0, 0.0, 5.0, 1.0)).unwrap();
        t.node_mut(a).sibling = None;
        assert_eq!(
            t.check_invariants(),
            Err(InvariantViolation::SiblingLink(t.root().unwrap()))
        );
    }

    #[test]
    fn detects_unreachable_nodes_after_set_root() {
        let mut t: Tree<u32, Rect> = Tree::new();
        let a = t.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        t.insert(2, Rect::new(4.0, 0.0, 5.0, 1.0)).unwrap();
        t.set_root(Some(a)).unwrap();
        assert!(t.check_invariants().is_err());
    }
}
