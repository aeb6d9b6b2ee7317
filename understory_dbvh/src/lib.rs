// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dbvh --heading-base-level=0

//! Understory DBVH: a dynamic bounding volume hierarchy for broad-phase collision.
//!
//! Entities are stored as leaves of a binary tree whose branches enclose their
//! children. Each leaf keeps a *fattened* copy of its box (extents scaled by an
//! expansion factor) so small per-step movements do not touch the tree at all.
//!
//! - Insert entities with [`Tree::insert`]; each new leaf is paired with the
//!   existing node whose combined box with it has the smaller area.
//! - Move entities with [`Tree::update`], passing the step velocity. The leaf is
//!   only rebuilt when the moved box escapes its fattened box.
//! - Remove entities with [`Tree::remove`]; the emptied branch is spliced out.
//! - Ask which entities overlap a given one with [`Tree::query`] (into a bound
//!   collision list), [`Tree::query_collect`], or [`Tree::collision_pairs`].
//! - Keep the hierarchy tight with [`Tree::optimize`], a post-order pass of local
//!   rotations that lowers total branch area. [`Tree::update`] runs it after each
//!   rebuild unless [`TreeConfig::with_rotate_on_update`] turned it off.
//!
//! Node slots are recycled through a free list. [`NodeId`]s carry a generation, so
//! a handle to a removed node never aliases whatever later reuses its slot.
//!
//! The tree is generic over the entity key `K` and the box type `V`, which
//! defaults to [`kurbo::Rect`]. [`Aabb2D`] over `f32` or `f64` also works, as does
//! any type implementing [`Volume`].
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use understory_dbvh::Tree;
//!
//! let mut tree: Tree<&str> = Tree::new();
//! tree.insert("a", Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
//! tree.insert("b", Rect::new(5.0, 5.0, 6.0, 6.0)).unwrap();
//! tree.insert("c", Rect::new(0.5, 0.5, 1.5, 1.5)).unwrap();
//!
//! assert_eq!(tree.query_collect(&"a").unwrap(), vec!["c"]);
//!
//! // Move "b" onto "a" with some velocity.
//! tree.update(&"b", Rect::new(0.8, 0.0, 1.8, 1.0), Vec2::new(0.1, 0.0)).unwrap();
//! assert_eq!(tree.collision_pairs(), vec![("a", "b"), ("a", "c"), ("b", "c")]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `std` in `kurbo`, `thiserror` and `tracing`.
//! - `libm`: lets `kurbo` use `libm` for float math in `no_std` builds.
//!
//! Operations emit `tracing` events (`trace` for hot paths such as rotations and
//! collisions, `debug` for structural changes, `warn` for rejected input).
//!
//! ### Float semantics
//!
//! Boxes must be finite and not inverted; [`Tree::insert`] and [`Tree::update`]
//! reject anything else. Overlap tests are inclusive, so touching boxes collide.

#![no_std]

extern crate alloc;

mod config;
mod error;
mod insert;
mod invariants;
mod node;
mod query;
mod remove;
mod rotate;
mod tree;
mod update;

pub mod types;
pub mod volume;

pub use config::{DEFAULT_EXPANSION_FACTOR, TreeConfig};
pub use error::Error;
pub use invariants::InvariantViolation;
pub use node::{NodeId, NodeRef};
pub use tree::Tree;
pub use types::{Aabb2D, Scalar};
pub use volume::Volume;
