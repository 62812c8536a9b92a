// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! [`LayoutState`](crate::layout::LayoutState) records every invalidation
//! request on a [`understory_dirty`] channel so that a layout pass can drain
//! the affected elements per kind. All four channels are local-only: an
//! element's invalidation does not mark its descendants, because the element
//! tree itself is owned by the external layout system.

use understory_dirty::Channel;

use crate::invalidation::InvalidationKind;

/// Desired size must be recomputed.
pub const MEASURE: Channel = Channel::new(0);

/// Final rectangle must be recomputed.
pub const ARRANGE: Channel = Channel::new(1);

/// Rendered output must be redrawn.
pub const RENDER: Channel = Channel::new(2);

/// Cached defining geometry must be rebuilt.
pub const GEOMETRY: Channel = Channel::new(3);

/// Maps an invalidation kind to its channel.
#[must_use]
pub const fn channel(kind: InvalidationKind) -> Channel {
    match kind {
        InvalidationKind::Measure => MEASURE,
        InvalidationKind::Arrange => ARRANGE,
        InvalidationKind::Render => RENDER,
        InvalidationKind::Geometry => GEOMETRY,
    }
}
