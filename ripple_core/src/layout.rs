// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element layout validity.
//!
//! [`LayoutState`] is the default [`Invalidate`] target. It records which
//! kinds are currently valid for each element and marks every request on
//! the matching [`dirty`] channel so that a layout pass can drain exactly the
//! elements it has to revisit.
//!
//! An element with no record is fully invalid: new elements start out
//! needing measure, arrange, render and geometry.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::dispatch::Invalidate;
use crate::element::ElementId;
use crate::invalidation::{InvalidationKind, InvalidationKinds};

/// Validity tracking for the four invalidation kinds.
pub struct LayoutState {
    valid: BTreeMap<ElementId, InvalidationKinds>,
    /// Latest handle seen per slot, to turn drained keys back into handles.
    slots: BTreeMap<u32, ElementId>,
    dirty: DirtyTracker<u32>,
    requests: [u64; 4],
}

impl fmt::Debug for LayoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutState")
            .field("tracked", &self.valid.len())
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutState {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            valid: BTreeMap::new(),
            slots: BTreeMap::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            requests: [0; 4],
        }
    }

    /// Returns whether `kind` is currently valid for the element.
    #[must_use]
    pub fn is_valid(&self, element: ElementId, kind: InvalidationKind) -> bool {
        self.valid
            .get(&element)
            .is_some_and(|kinds| kinds.contains(kind))
    }

    /// Returns the kinds currently valid for the element.
    #[must_use]
    pub fn valid_kinds(&self, element: ElementId) -> InvalidationKinds {
        self.valid.get(&element).copied().unwrap_or_default()
    }

    /// Records that a pass made `kinds` valid again.
    pub fn mark_valid(&mut self, element: ElementId, kinds: InvalidationKinds) {
        self.track(element);
        *self.valid.entry(element).or_default() |= kinds;
    }

    /// Returns how many times the entry point for `kind` was invoked.
    ///
    /// Arrange invalidation implied by a measure request is not counted.
    #[must_use]
    pub fn request_count(&self, kind: InvalidationKind) -> u64 {
        self.requests[kind as usize]
    }

    /// Drains the elements invalidated for `kind` since the last drain, in
    /// slot order.
    pub fn take_dirty(&mut self, kind: InvalidationKind) -> Vec<ElementId> {
        let mut keys: Vec<u32> = self
            .dirty
            .drain(dirty::channel(kind))
            .affected()
            .deterministic()
            .run()
            .collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(|idx| self.slots.get(&idx).copied())
            .collect()
    }

    fn track(&mut self, element: ElementId) {
        if let Some(previous) = self.slots.insert(element.idx, element)
            && previous != element
        {
            self.valid.remove(&previous);
        }
    }

    fn invalidate_kinds(&mut self, element: ElementId, kinds: InvalidationKinds) {
        self.track(element);
        let valid = self.valid.entry(element).or_default();
        *valid = valid.difference(kinds);
        for kind in kinds.iter() {
            self.dirty.mark(element.idx, dirty::channel(kind));
        }
    }
}

impl Invalidate for LayoutState {
    fn invalidate_measure(&mut self, element: ElementId) {
        self.requests[InvalidationKind::Measure as usize] += 1;
        self.invalidate_kinds(element, InvalidationKinds::MEASURE | InvalidationKinds::ARRANGE);
    }

    fn invalidate_arrange(&mut self, element: ElementId) {
        self.requests[InvalidationKind::Arrange as usize] += 1;
        self.invalidate_kinds(element, InvalidationKinds::ARRANGE);
    }

    fn invalidate_render(&mut self, element: ElementId) {
        self.requests[InvalidationKind::Render as usize] += 1;
        self.invalidate_kinds(element, InvalidationKinds::RENDER);
    }

    fn invalidate_geometry(&mut self, element: ElementId) {
        self.requests[InvalidationKind::Geometry as usize] += 1;
        self.invalidate_kinds(element, InvalidationKinds::GEOMETRY);
    }

    fn forget(&mut self, element: ElementId) {
        self.valid.remove(&element);
        if self.slots.get(&element.idx) == Some(&element) {
            self.slots.remove(&element.idx);
            self.dirty.remove_key(element.idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(idx: u32) -> ElementId {
        ElementId::from_parts(idx, 0)
    }

    #[test]
    fn unknown_element_is_fully_invalid() {
        let state = LayoutState::new();
        for kind in InvalidationKind::ALL {
            assert!(!state.is_valid(element(0), kind));
        }
    }

    #[test]
    fn measure_invalidation_also_invalidates_arrange() {
        let mut state = LayoutState::new();
        let e = element(1);
        state.mark_valid(e, InvalidationKinds::ALL);
        state.invalidate_measure(e);
        assert_eq!(
            state.valid_kinds(e),
            InvalidationKinds::RENDER | InvalidationKinds::GEOMETRY
        );
        assert_eq!(state.request_count(InvalidationKind::Measure), 1);
        assert_eq!(state.request_count(InvalidationKind::Arrange), 0);
    }

    #[test]
    fn dirty_elements_drain_per_kind() {
        let mut state = LayoutState::new();
        state.invalidate_render(element(3));
        state.invalidate_render(element(1));
        state.invalidate_geometry(element(2));

        assert_eq!(state.take_dirty(InvalidationKind::Render), [element(1), element(3)]);
        assert!(state.take_dirty(InvalidationKind::Render).is_empty(), "drained");
        assert_eq!(state.take_dirty(InvalidationKind::Geometry), [element(2)]);
        assert!(state.take_dirty(InvalidationKind::Measure).is_empty());
    }

    #[test]
    fn forgotten_element_is_not_drained() {
        let mut state = LayoutState::new();
        state.invalidate_arrange(element(4));
        state.forget(element(4));
        assert!(state.take_dirty(InvalidationKind::Arrange).is_empty());
    }

    #[test]
    fn reused_slot_drops_stale_validity() {
        let mut state = LayoutState::new();
        let old = element(5);
        let new = ElementId::from_parts(5, 1);
        state.mark_valid(old, InvalidationKinds::ALL);
        state.invalidate_render(new);
        assert!(!state.is_valid(old, InvalidationKind::Measure));
        assert_eq!(state.take_dirty(InvalidationKind::Render), [new]);
    }
}
