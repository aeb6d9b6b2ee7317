// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-step entity movement with lazy refit.

use core::fmt::Debug;

use kurbo::Vec2;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::tree::Tree;
use crate::volume::Volume;

impl<K: Copy + Ord + Debug, V: Volume> Tree<K, V> {
    /// Move an entity to `bbox`, moving at `velocity` per step.
    ///
    /// If the leaf's current fattened box still contains `bbox` offset by
    /// `velocity`, nothing changes and `Ok(false)` is returned. Otherwise the leaf
    /// is rebuilt from `bbox`: extents are scaled by the expansion factor, the box
    /// is shifted by half the velocity and grown by half its magnitude on each axis
    /// so it covers the whole step, ancestors are refit, and (unless disabled in
    /// the [`TreeConfig`](crate::TreeConfig)) the rotation pass runs over the tree.
    /// Returns `Ok(true)` in that case.
    ///
    /// Fails with [`Error::InvalidArgument`] for a malformed box or non-finite
    /// velocity and [`Error::NotFound`] for an unknown key, before any mutation.
    pub fn update(&mut self, key: &K, bbox: V, velocity: Vec2) -> Result<bool, Error> {
        if !bbox.is_well_formed() {
            warn!(?key, ?bbox, "rejecting update with malformed box");
            return Err(Error::invalid("box must be finite and not inverted"));
        }
        if !(velocity.x.is_finite() && velocity.y.is_finite()) {
            warn!(?key, ?velocity, "rejecting update with non-finite velocity");
            return Err(Error::invalid("velocity components must be finite"));
        }
        let leaf = self.leaf(key).ok_or(Error::NotFound)?;

        let mut swept = bbox;
        swept.offset(velocity.x, velocity.y);
        if self.node(leaf).bbox.contains(&swept) {
            trace!(?key, "update within margin");
            return Ok(false);
        }

        let mut fat = bbox;
        fat.scale_extents(self.config.expansion_factor);
        fat.offset(0.5 * velocity.x, 0.5 * velocity.y);
        // Half of |v| on each axis.
        fat.grow_extents(
            0.5 * velocity.x.max(-velocity.x),
            0.5 * velocity.y.max(-velocity.y),
        );
        self.node_mut(leaf).bbox = fat;

        if self.unbranched {
            debug!(?key, "rebuilt sole leaf");
            return Ok(true);
        }

        let parent = self.node(leaf).parent;
        self.refit_upwards(parent);
        let swaps = if self.config.rotate_on_update {
            self.optimize()
        } else {
            0
        };
        debug!(?key, swaps, "rebuilt leaf");
        Ok(true)
    }
}
