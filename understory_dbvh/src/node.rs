// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree vertices and their identifiers.

use crate::volume::Volume;

/// Identifier for a node (leaf or branch) in the tree.
///
/// This is a small, copyable handle made of an arena slot index and a
/// generation counter.
///
/// ## Semantics
///
/// - A fresh slot is allocated with generation `1`.
/// - On removal the slot is freed; every `NodeId` that pointed to it becomes stale.
/// - When a freed slot is reused its generation is incremented, so the reused node
///   never carries a handle that was handed out before.
///
/// Stale handles never alias a different live node because the generation must
/// match. Use [`Tree::is_alive`](crate::Tree::is_alive) to test liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Arena slot index of this handle.
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of the slot when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Either an entity key or a node handle.
///
/// Operations that start from "a node" accept both, resolving keys through the
/// entity map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeRef<K> {
    /// The leaf holding this entity.
    Entity(K),
    /// A node addressed directly.
    Node(NodeId),
}

/// Payload of a node: an entity for leaves, two children for branches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Kind<K> {
    Leaf(K),
    Branch { left: NodeId, right: NodeId },
}

/// A single tree vertex.
///
/// For leaves `bbox` is the entity box fattened by the expansion factor; for
/// branches it is the union of both children.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) generation: u32,
    pub(crate) bbox: V,
    pub(crate) parent: Option<NodeId>,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) kind: Kind<K>,
}

impl<K: Copy, V: Volume> Node<K, V> {
    pub(crate) fn leaf(generation: u32, key: K, bbox: V) -> Self {
        Self {
            generation,
            bbox,
            parent: None,
            sibling: None,
            kind: Kind::Leaf(key),
        }
    }

    pub(crate) fn branch(generation: u32, bbox: V, left: NodeId, right: NodeId) -> Self {
        Self {
            generation,
            bbox,
            parent: None,
            sibling: None,
            kind: Kind::Branch { left, right },
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf(_))
    }

    pub(crate) fn key(&self) -> Option<K> {
        match self.kind {
            Kind::Leaf(k) => Some(k),
            Kind::Branch { .. } => None,
        }
    }

    pub(crate) fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            Kind::Leaf(_) => None,
            Kind::Branch { left, right } => Some((left, right)),
        }
    }

    /// Replace whichever child link currently points at `old`.
    ///
    /// Falls back to the left slot when `old` is not the right child.
    pub(crate) fn swap_child(&mut self, old: NodeId, new: NodeId) {
        if let Kind::Branch { left, right } = &mut self.kind {
            if *right == old {
                *right = new;
            } else {
                *left = new;
            }
        }
    }

    /// Scale the box extents by `factor`.
    pub(crate) fn expand(&mut self, factor: f64) {
        self.bbox.scale_extents(factor);
    }
}
