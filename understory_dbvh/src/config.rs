// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs for [`Tree`](crate::Tree).

use crate::error::Error;

/// Factor applied to leaf extents on insertion and on rebuild after movement.
pub const DEFAULT_EXPANSION_FACTOR: f64 = 1.2;

/// Configuration for a [`Tree`](crate::Tree).
///
/// ```rust
/// use understory_dbvh::TreeConfig;
///
/// let cfg = TreeConfig::default()
///     .with_expansion_factor(1.5)
///     .with_rotate_on_update(false);
/// assert_eq!(cfg.expansion_factor, 1.5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// Multiplier applied to leaf half-extents so small motion does not force
    /// restructuring. Must be finite and at least `1.0`.
    pub expansion_factor: f64,
    /// Run the rotation pass over the whole tree after every update that
    /// rebuilds a leaf.
    pub rotate_on_update: bool,
    /// Number of arena slots to reserve up front.
    pub initial_capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            expansion_factor: DEFAULT_EXPANSION_FACTOR,
            rotate_on_update: true,
            initial_capacity: 0,
        }
    }
}

impl TreeConfig {
    /// Set the leaf expansion factor.
    pub const fn with_expansion_factor(mut self, factor: f64) -> Self {
        self.expansion_factor = factor;
        self
    }

    /// Enable or disable the rotation pass after updates.
    pub const fn with_rotate_on_update(mut self, rotate: bool) -> Self {
        self.rotate_on_update = rotate;
        self
    }

    /// Reserve arena space for `n` nodes.
    pub const fn with_initial_capacity(mut self, n: usize) -> Self {
        self.initial_capacity = n;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.expansion_factor.is_finite() && self.expansion_factor >= 1.0 {
            Ok(())
        } else {
            Err(Error::invalid("expansion factor must be finite and >= 1.0"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_factor() {
        let cfg = TreeConfig::default();
        assert_eq!(cfg.expansion_factor, 1.2);
        assert!(cfg.rotate_on_update);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_shrinking_or_nan_factor() {
        assert!(TreeConfig::default().with_expansion_factor(0.9).validate().is_err());
        assert!(
            TreeConfig::default()
                .with_expansion_factor(f64::NAN)
                .validate()
                .is_err()
        );
        assert!(TreeConfig::default().with_expansion_factor(1.0).validate().is_ok());
    }
}
