// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for fallible tree operations.

/// Errors returned by [`Tree`](crate::Tree) operations.
///
/// Every failing call returns before touching the tree, so an `Err` never
/// leaves a partial mutation behind.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A box, velocity, or configuration value was malformed.
    #[error("invalid argument: {what}")]
    InvalidArgument {
        /// Which input was rejected.
        what: &'static str,
    },
    /// The entity key or node handle does not refer to a live node.
    #[error("no live node for the given key or handle")]
    NotFound,
    /// An entity with the same key is already in the tree.
    #[error("entity key is already present in the tree")]
    DuplicateKey,
    /// A query tried to report a collision with no collision list bound.
    #[error("no collision list is bound")]
    CollisionListUnbound,
}

impl Error {
    pub(crate) const fn invalid(what: &'static str) -> Self {
        Self::InvalidArgument { what }
    }
}
