// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Store configuration.

use crate::attribute::AttributeValue;

/// Whether writing an attribute to its current value notifies.
///
/// Passed to stores via [`StoreConfig::change_policy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChangePolicy {
    /// Every assignment notifies, even when the new value equals the old one.
    #[default]
    Always,
    /// Assignments that leave the effective value unchanged are silent.
    ///
    /// Collection assignment is unaffected: wholesale replacement always
    /// notifies.
    SkipEqual,
}

/// Configuration shared by [`NodeStore`](crate::node::NodeStore) and
/// [`ElementStore`](crate::element::ElementStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Equal-value assignment policy.
    pub change_policy: ChangePolicy,
}

impl StoreConfig {
    /// Notifies on every assignment.
    pub const DEFAULT: Self = Self {
        change_policy: ChangePolicy::Always,
    };

    /// Suppresses notifications for assignments that do not change the value.
    pub const DEDUPLICATED: Self = Self {
        change_policy: ChangePolicy::SkipEqual,
    };

    /// Returns whether a write from `old` to `new` should notify.
    ///
    /// Under [`ChangePolicy::SkipEqual`] a NaN written over NaN is silent.
    #[inline]
    #[must_use]
    pub fn should_notify<T: AttributeValue>(&self, old: &T, new: &T) -> bool {
        match self.change_policy {
            ChangePolicy::Always => true,
            ChangePolicy::SkipEqual => !old.same_value(new),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_always_notifies() {
        let config = StoreConfig::default();
        assert_eq!(config.change_policy, ChangePolicy::Always);
        assert!(config.should_notify(&1.0, &1.0));
    }

    #[test]
    fn deduplicated_skips_equal_values() {
        let config = StoreConfig::DEDUPLICATED;
        assert!(!config.should_notify(&true, &true));
        assert!(config.should_notify(&true, &false));
    }

    #[test]
    fn deduplicated_treats_nan_as_unchanged() {
        let config = StoreConfig::DEDUPLICATED;
        assert!(!config.should_notify(&f64::NAN, &f64::NAN));
        assert!(!config.should_notify(&f64::NAN, &-f64::NAN));
        assert!(config.should_notify(&f64::NAN, &0.0));
        assert!(config.should_notify(&0.0, &f64::NAN));
        assert!(StoreConfig::DEFAULT.should_notify(&f64::NAN, &f64::NAN));
    }
}
