// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation kinds and sets of them.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// What downstream recomputation a write implies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvalidationKind {
    /// Desired size must be recomputed.
    Measure,
    /// Final position and size must be recomputed.
    Arrange,
    /// Rendered output must be redrawn.
    Render,
    /// A cached defining geometry must be rebuilt.
    Geometry,
}

impl InvalidationKind {
    /// All kinds in dispatch order.
    pub const ALL: [Self; 4] = [Self::Measure, Self::Arrange, Self::Render, Self::Geometry];

    const fn bit(self) -> u8 {
        match self {
            Self::Measure => 1 << 0,
            Self::Arrange => 1 << 1,
            Self::Render => 1 << 2,
            Self::Geometry => 1 << 3,
        }
    }
}

/// A set of [`InvalidationKind`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InvalidationKinds(u8);

impl InvalidationKinds {
    /// The empty set.
    pub const EMPTY: Self = Self(0);
    /// Only [`InvalidationKind::Measure`].
    pub const MEASURE: Self = Self::only(InvalidationKind::Measure);
    /// Only [`InvalidationKind::Arrange`].
    pub const ARRANGE: Self = Self::only(InvalidationKind::Arrange);
    /// Only [`InvalidationKind::Render`].
    pub const RENDER: Self = Self::only(InvalidationKind::Render);
    /// Only [`InvalidationKind::Geometry`].
    pub const GEOMETRY: Self = Self::only(InvalidationKind::Geometry);
    /// Every kind.
    pub const ALL: Self = Self(0b1111);

    /// A set holding a single kind.
    #[must_use]
    pub const fn only(kind: InvalidationKind) -> Self {
        Self(kind.bit())
    }

    /// Returns whether `kind` is in the set.
    #[must_use]
    pub const fn contains(self, kind: InvalidationKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the set without the kinds in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Adds a kind.
    pub fn insert(&mut self, kind: InvalidationKind) {
        self.0 |= kind.bit();
    }

    /// Iterates the contained kinds in dispatch order.
    pub fn iter(self) -> impl Iterator<Item = InvalidationKind> {
        InvalidationKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<InvalidationKind> for InvalidationKinds {
    fn from(kind: InvalidationKind) -> Self {
        Self::only(kind)
    }
}

impl BitOr for InvalidationKinds {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for InvalidationKinds {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for InvalidationKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn iter_follows_dispatch_order() {
        let kinds = InvalidationKinds::GEOMETRY | InvalidationKinds::MEASURE;
        let listed: Vec<_> = kinds.iter().collect();
        assert_eq!(
            listed,
            [InvalidationKind::Measure, InvalidationKind::Geometry]
        );
    }

    #[test]
    fn difference_removes_kinds() {
        let kinds = InvalidationKinds::ALL.difference(InvalidationKinds::RENDER);
        assert!(!kinds.contains(InvalidationKind::Render));
        assert!(kinds.contains(InvalidationKind::Arrange));
        assert!(InvalidationKinds::EMPTY.is_empty());
    }
}
