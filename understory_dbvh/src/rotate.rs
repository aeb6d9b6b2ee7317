// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local tree rotations that reduce total enclosing area.
//!
//! At every branch the pass considers exchanging a child with one of its
//! nephews, or a grandchild on the left with a grandchild on the right:
//!
//! ```text
//!          node
//!         /    \
//!        L      R
//!       / \    / \
//!     ll  lr  rl  rr
//!
//!   R <-> ll    R <-> lr
//!   L <-> rl    L <-> rr
//!   ll <-> rl   ll <-> rr
//! ```
//!
//! The cost of a configuration is the summed area of `node`'s two children.
//! A rotation is applied only if it is strictly cheaper than leaving the branch as
//! it is. Swapped subtrees move intact, so `node`'s own box never changes.
//! The branch that receives a demoted subtree can grow, so the summed area of
//! the whole tree may rise even though every applied rotation is locally cheaper.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use tracing::trace;

use crate::node::NodeId;
use crate::tree::Tree;
use crate::volume::Volume;

#[derive(Copy, Clone, Debug)]
struct Rotation {
    cost: f64,
    pair: Option<(NodeId, NodeId)>,
}

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Run one post-order rotation pass over the whole tree.
    ///
    /// Returns the number of rotations applied.
    pub fn optimize(&mut self) -> usize {
        match self.root {
            Some(root) => self.post_order_refit(root),
            None => 0,
        }
    }

    /// Repeat [`optimize`](Self::optimize) until a pass applies no rotation or
    /// `max_passes` passes have run. Returns the total number of rotations.
    pub fn optimize_until_stable(&mut self, max_passes: usize) -> usize {
        let mut total = 0;
        for _ in 0..max_passes {
            let swaps = self.optimize();
            total += swaps;
            if swaps == 0 {
                break;
            }
        }
        total
    }

    /// Rotate bottom-up below and at `node`.
    pub(crate) fn post_order_refit(&mut self, node: NodeId) -> usize {
        // Post-order without recursion: collect branches top-down, visit reversed.
        let mut order: Vec<NodeId> = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some((l, r)) = self.node(id).children() {
                order.push(id);
                stack.push(l);
                stack.push(r);
            }
        }
        let mut swaps = 0;
        for id in order.into_iter().rev() {
            if self.rotate_at(id) {
                swaps += 1;
            }
        }
        swaps
    }

    /// Apply the cheapest rotation at `node`, if any beats the current layout.
    fn rotate_at(&mut self, node: NodeId) -> bool {
        let Some((left, right)) = self.node(node).children() else {
            return false;
        };
        let left_kids = self.node(left).children();
        let right_kids = self.node(right).children();
        if left_kids.is_none() && right_kids.is_none() {
            return false;
        }

        let mut best = Rotation {
            cost: self.node(left).bbox.area() + self.node(right).bbox.area(),
            pair: None,
        };
        if let Some((ll, lr)) = left_kids {
            best = self.test_cost(right, ll, best, node);
            best = self.test_cost(right, lr, best, node);
        }
        if let Some((rl, rr)) = right_kids {
            best = self.test_cost(left, rl, best, node);
            best = self.test_cost(left, rr, best, node);
        }
        if let (Some((ll, _)), Some((rl, rr))) = (left_kids, right_kids) {
            best = self.test_cost(ll, rl, best, node);
            best = self.test_cost(ll, rr, best, node);
        }

        match best.pair {
            Some((a, b)) => {
                trace!(?node, ?a, ?b, cost = best.cost, "rotate");
                self.swap(a, b, node);
                true
            }
            None => false,
        }
    }

    /// Cost of `node`'s children after exchanging `a` and `b`, kept if cheaper.
    ///
    /// Whatever lands in a direct child slot contributes its own area; whatever
    /// lands in a grandchild slot contributes the area of its new parent, the
    /// union with the sibling it is moved next to.
    fn test_cost(&self, a: NodeId, b: NodeId, best: Rotation, node: NodeId) -> Rotation {
        let na = self.node(a);
        let nb = self.node(b);
        let into_a_slot = if na.parent == Some(node) {
            nb.bbox.area()
        } else {
            nb.bbox.combine(&self.node(self.sibling_of(a)).bbox).area()
        };
        let into_b_slot = if nb.parent == Some(node) {
            na.bbox.area()
        } else {
            na.bbox.combine(&self.node(self.sibling_of(b)).bbox).area()
        };
        let cost = into_a_slot + into_b_slot;
        if cost < best.cost {
            Rotation {
                cost,
                pair: Some((a, b)),
            }
        } else {
            best
        }
    }

    /// Exchange two non-overlapping subtrees, then refit whichever of their new
    /// parents is not `node`.
    pub(crate) fn swap(&mut self, a: NodeId, b: NodeId, node: NodeId) {
        let pa = self.node(a).parent.expect("rotated node without parent");
        let pb = self.node(b).parent.expect("rotated node without parent");
        let sa = self.sibling_of(a);
        let sb = self.sibling_of(b);

        self.node_mut(pa).swap_child(a, b);
        self.node_mut(pb).swap_child(b, a);
        self.node_mut(sa).sibling = Some(b);
        self.node_mut(sb).sibling = Some(a);
        {
            let na = self.node_mut(a);
            na.parent = Some(pb);
            na.sibling = Some(sb);
        }
        {
            let nb = self.node_mut(b);
            nb.parent = Some(pa);
            nb.sibling = Some(sa);
        }

        if pb != node {
            self.refit(pb);
        }
        if pa != node {
            self.refit(pa);
        }
    }
}
