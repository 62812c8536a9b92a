// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for propagation and invalidation.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the stores call as notifications travel and invalidations are decided.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Stores own their sink; install one with
//! [`NodeStore::set_trace_sink`](crate::node::NodeStore::set_trace_sink) or
//! [`ElementStore::set_trace_sink`](crate::element::ElementStore::set_trace_sink).
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::attribute::AttributeId;
use crate::element::ElementId;
use crate::invalidation::InvalidationKind;
use crate::node::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted each time a node raises `Changed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangedEvent {
    /// The node raising the notification.
    pub node: NodeId,
    /// Distance from the node whose state was written (0 for the origin).
    pub depth: u32,
}

/// Emitted when a node gains or loses its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnershipEvent {
    /// The owned node.
    pub node: NodeId,
    /// The collection, composite, or root that owns (or owned) it.
    pub owner: NodeId,
}

/// Emitted for each invalidation entry point the dispatcher invokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidationEvent {
    /// The invalidated element.
    pub element: ElementId,
    /// What was invalidated.
    pub kind: InvalidationKind,
    /// The attribute whose write caused it.
    pub attribute: AttributeId,
}

/// Emitted when a metadata predicate is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredicateEvent {
    /// The written element.
    pub element: ElementId,
    /// The driving attribute.
    pub attribute: AttributeId,
    /// Whether invalidation was allowed through.
    pub passed: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the stores.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a node raises `Changed`.
    fn on_changed(&mut self, e: &ChangedEvent) {
        _ = e;
    }

    /// Called when a node is attached to an owner.
    fn on_attach(&mut self, e: &OwnershipEvent) {
        _ = e;
    }

    /// Called when a node is detached from its owner.
    fn on_detach(&mut self, e: &OwnershipEvent) {
        _ = e;
    }

    /// Called when an invalidation entry point is invoked.
    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        _ = e;
    }

    /// Called after a metadata predicate is evaluated.
    fn on_predicate(&mut self, e: &PredicateEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Lets a store own one handle to a sink while the caller keeps another to
/// inspect what was recorded.
impl<T: TraceSink> TraceSink for Rc<RefCell<T>> {
    fn on_changed(&mut self, e: &ChangedEvent) {
        self.borrow_mut().on_changed(e);
    }

    fn on_attach(&mut self, e: &OwnershipEvent) {
        self.borrow_mut().on_attach(e);
    }

    fn on_detach(&mut self, e: &OwnershipEvent) {
        self.borrow_mut().on_detach(e);
    }

    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        self.borrow_mut().on_invalidation(e);
    }

    fn on_predicate(&mut self, e: &PredicateEvent) {
        self.borrow_mut().on_predicate(e);
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer over a store-owned sink slot.
    #[inline]
    #[must_use]
    pub fn from_slot(slot: &'a mut Option<Box<dyn TraceSink>>) -> Self {
        match slot {
            Some(sink) => Self::new(sink.as_mut()),
            None => Self::none(),
        }
    }

    /// Emits a [`ChangedEvent`].
    #[inline]
    pub fn changed(&mut self, e: &ChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an attach [`OwnershipEvent`].
    #[inline]
    pub fn attach(&mut self, e: &OwnershipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_attach(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a detach [`OwnershipEvent`].
    #[inline]
    pub fn detach(&mut self, e: &OwnershipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_detach(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InvalidationEvent`].
    #[inline]
    pub fn invalidation(&mut self, e: &InvalidationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_invalidation(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PredicateEvent`].
    #[inline]
    pub fn predicate(&mut self, e: &PredicateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_predicate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_changed() -> ChangedEvent {
        ChangedEvent {
            node: NodeId::from_parts(4, 1),
            depth: 2,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_changed(&sample_changed());
        sink.on_attach(&OwnershipEvent {
            node: NodeId::from_parts(1, 0),
            owner: NodeId::from_parts(0, 0),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.changed(&sample_changed());
    }

    #[test]
    fn empty_slot_yields_silent_tracer() {
        let mut slot: Option<Box<dyn TraceSink>> = None;
        let mut tracer = Tracer::from_slot(&mut slot);
        tracer.changed(&sample_changed());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            depths: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_changed(&mut self, e: &ChangedEvent) {
                self.depths.push(e.depth);
            }
        }

        let mut sink = RecordingSink { depths: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.changed(&sample_changed());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.depths, &[2]);
    }
}
