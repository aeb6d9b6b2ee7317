// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree structure: node arena, free list, entity map, and bookkeeping.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::Rect;

use crate::config::TreeConfig;
use crate::error::Error;
use crate::node::{Node, NodeId, NodeRef};
use crate::volume::Volume;

/// Dynamic bounding volume hierarchy keyed by entity `K`.
///
/// Leaves hold one entity's fattened box each; branches hold the union of their two
/// children. Nodes live in a slot arena addressed by generational [`NodeId`]s, and
/// freed slots (leaf or branch) are recycled through a free list.
pub struct Tree<K, V = Rect> {
    nodes: Vec<Option<Node<K, V>>>, // slots
    generations: Vec<u32>,          // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    pub(crate) entities: BTreeMap<K, NodeId>,
    pub(crate) root: Option<NodeId>,
    pub(crate) unbranched: bool,
    pub(crate) collisions: Option<Vec<K>>,
    pub(crate) config: TreeConfig,
}

impl<K: Copy + Ord + Debug, V: Volume> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Ord + Debug, V: Volume> Debug for Tree<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("entities", &self.entities.len())
            .field("free_list", &self.free_list.len())
            .field("unbranched", &self.unbranched)
            .field("collision_list_bound", &self.collisions.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(TreeConfig::default())
    }

    /// Create an empty tree with an explicit configuration.
    ///
    /// Fails with [`Error::InvalidArgument`] if the expansion factor is not finite
    /// or is below `1.0`.
    pub fn with_config(config: TreeConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::with_capacity(config.initial_capacity),
            generations: Vec::with_capacity(config.initial_capacity),
            free_list: Vec::new(),
            entities: BTreeMap::new(),
            root: None,
            unbranched: true,
            collisions: None,
            config,
        }
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Reset to an empty tree. The configuration and any bound collision list are kept.
    ///
    /// Slots and their generations survive, so handles issued before the clear
    /// stay stale after it.
    pub fn clear(&mut self) {
        for slot in &mut self.nodes {
            *slot = None;
        }
        self.free_list.clear();
        // Reversed so the lowest slot is reused first.
        self.free_list.extend((0..self.nodes.len()).rev());
        self.entities.clear();
        self.root = None;
        self.unbranched = true;
    }

    /// Number of entities (leaves) in the tree.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the tree holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of live nodes, leaves and branches together.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Number of arena slots waiting to be reused.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// True while the tree has zero or one node (no branch exists yet).
    pub fn is_unbranched(&self) -> bool {
        self.unbranched
    }

    /// Handle of the root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Replace the root pointer.
    ///
    /// This does not relink anything: nodes outside the new root's subtree stay
    /// allocated but become unreachable for queries. Intended for tests and for
    /// callers that manage subtrees themselves.
    pub fn set_root(&mut self, root: Option<NodeId>) -> Result<(), Error> {
        if let Some(id) = root
            && !self.is_alive(id)
        {
            return Err(Error::NotFound);
        }
        self.root = root;
        Ok(())
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// True if an entity with this key is in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entities.contains_key(key)
    }

    /// Handle of the leaf holding `key`.
    pub fn leaf(&self, key: &K) -> Option<NodeId> {
        self.entities.get(key).copied()
    }

    /// Resolve a key or handle to a live node handle.
    pub fn resolve(&self, r: NodeRef<K>) -> Result<NodeId, Error> {
        match r {
            NodeRef::Entity(key) => self.leaf(&key).ok_or(Error::NotFound),
            NodeRef::Node(id) if self.is_alive(id) => Ok(id),
            NodeRef::Node(_) => Err(Error::NotFound),
        }
    }

    /// Stored box of a live node (fattened for leaves).
    pub fn bounds(&self, id: NodeId) -> Option<V> {
        self.get(id).map(|n| n.bbox)
    }

    /// Fattened box of the leaf holding `key`.
    pub fn fat_bounds(&self, key: &K) -> Option<V> {
        self.leaf(key).and_then(|id| self.bounds(id))
    }

    /// Entity key held by a live leaf; `None` for branches and stale handles.
    pub fn entity(&self, id: NodeId) -> Option<K> {
        self.get(id).and_then(Node::key)
    }

    /// Parent of a live node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Sibling of a live node.
    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.sibling)
    }

    /// `(left, right)` children of a live branch.
    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        self.get(id).and_then(Node::children)
    }

    /// True if `id` is a live leaf.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_leaf)
    }

    /// Iterate entities and their fattened boxes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entities
            .iter()
            .map(|(k, id)| (*k, self.node(*id).bbox))
    }

    /// Sum of the areas of every reachable node's box.
    pub fn total_area(&self) -> f64 {
        let mut total = 0.0;
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let n = self.node(id);
            total += n.bbox.area();
            if let Some((l, r)) = n.children() {
                stack.push(l);
                stack.push(r);
            }
        }
        total
    }

    /// Longest root-to-leaf path, counted in nodes. Zero for an empty tree.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, d)) = stack.pop() {
            deepest = deepest.max(d);
            if let Some((l, r)) = self.node(id).children() {
                stack.push((l, d + 1));
                stack.push((r, d + 1));
            }
        }
        deepest
    }

    fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.1)
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    /// The other child of an attached node's parent.
    pub(crate) fn sibling_of(&self, id: NodeId) -> NodeId {
        self.node(id).sibling.expect("attached node without sibling")
    }

    /// Place a node in a free slot, bumping that slot's generation, or grow the arena.
    pub(crate) fn alloc(&mut self, make: impl FnOnce(u32) -> Node<K, V>) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(make(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(make(generation)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let slot = idx as u32;
        NodeId::new(slot, generation)
    }

    /// Drop a node and queue its slot for reuse.
    pub(crate) fn release(&mut self, id: NodeId) {
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Recompute a branch's box from its children. No-op on leaves.
    pub(crate) fn refit(&mut self, id: NodeId) {
        if let Some((l, r)) = self.node(id).children() {
            let bbox = self.node(l).bbox.combine(&self.node(r).bbox);
            self.node_mut(id).bbox = bbox;
        }
    }

    /// Refit from `start` towards the root, stopping at the first node whose box
    /// did not change. Returns that node, or `None` if the walk passed the root.
    pub(crate) fn refit_upwards(&mut self, start: Option<NodeId>) -> Option<NodeId> {
        let mut cur = start;
        while let Some(id) = cur {
            let old = self.node(id).bbox;
            self.refit(id);
            if self.node(id).bbox.equivalent(&old) {
                return Some(id);
            }
            cur = self.node(id).parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_reuses_slots_with_new_generation() {
        let mut t: Tree<u32, Rect> = Tree::new();
        let a = t.alloc(|g| Node::leaf(g, 1, Rect::ZERO));
        let b = t.alloc(|g| Node::leaf(g, 2, Rect::ZERO));
        assert_eq!((a.slot(), a.generation()), (0, 1));
        assert_eq!((b.slot(), b.generation()), (1, 1));
        t.release(a);
        assert!(!t.is_alive(a));
        assert_eq!(t.free_count(), 1);
        let c = t.alloc(|g| Node::leaf(g, 3, Rect::ZERO));
        assert_eq!(c.slot(), a.slot());
        assert_ne!(c, a);
        assert!(t.is_alive(c));
        assert!(!t.is_alive(a));
        assert_eq!(t.node_count(), 2);
    }

    #[test]
    fn with_config_rejects_bad_factor() {
        let cfg = TreeConfig::default().with_expansion_factor(0.5);
        assert!(matches!(
            Tree::<u32, Rect>::with_config(cfg),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn set_root_requires_live_handle() {
        let mut t: Tree<u32, Rect> = Tree::new();
        let a = t.alloc(|g| Node::leaf(g, 1, Rect::ZERO));
        t.release(a);
        assert_eq!(t.set_root(Some(a)), Err(Error::NotFound));
        assert_eq!(t.set_root(None), Ok(()));
    }

    #[test]
    fn clear_keeps_old_handles_stale() {
        let mut t: Tree<u32, Rect> = Tree::new();
        let a = t.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        let a2 = t.insert(2, Rect::new(3.0, 0.0, 4.0, 1.0)).unwrap();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.free_count(), 3);
        assert!(!t.is_alive(a));
        assert!(!t.is_alive(a2));

        let b = t.insert(3, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(b.slot(), a.slot());
        assert_ne!(b, a);
        assert!(!t.is_alive(a));
        assert_eq!(t.resolve(NodeRef::Node(a)), Err(Error::NotFound));
        assert_eq!(t.entity(b), Some(3));
        t.check_invariants().unwrap();
    }

    #[test]
    fn empty_tree_reports_nothing() {
        let t: Tree<u32, Rect> = Tree::default();
        assert!(t.is_empty());
        assert!(t.is_unbranched());
        assert_eq!(t.root(), None);
        assert_eq!(t.depth(), 0);
        assert_eq!(t.total_area(), 0.0);
    }
}
