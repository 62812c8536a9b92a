// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Handles are recorded as raw (index, generation) pairs; they identify the
//! node or element in the store that produced the recording.

use ripple_core::attribute::AttributeId;
use ripple_core::element::ElementId;
use ripple_core::invalidation::InvalidationKind;
use ripple_core::node::NodeId;
use ripple_core::trace::{
    ChangedEvent, InvalidationEvent, OwnershipEvent, PredicateEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CHANGED: u8 = 1;
const TAG_ATTACH: u8 = 2;
const TAG_DETACH: u8 = 3;
const TAG_INVALIDATION: u8 = 4;
const TAG_PREDICATE: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_node(&mut self, node: NodeId) {
        self.write_u32(node.index());
        self.write_u32(node.generation());
    }

    fn write_element(&mut self, element: ElementId) {
        self.write_u32(element.index());
        self.write_u32(element.generation());
    }

    fn write_kind(&mut self, kind: InvalidationKind) {
        self.write_u8(match kind {
            InvalidationKind::Measure => 0,
            InvalidationKind::Arrange => 1,
            InvalidationKind::Render => 2,
            InvalidationKind::Geometry => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_changed(&mut self, e: &ChangedEvent) {
        self.write_u8(TAG_CHANGED);
        self.write_node(e.node);
        self.write_u32(e.depth);
    }

    fn on_attach(&mut self, e: &OwnershipEvent) {
        self.write_u8(TAG_ATTACH);
        self.write_node(e.node);
        self.write_node(e.owner);
    }

    fn on_detach(&mut self, e: &OwnershipEvent) {
        self.write_u8(TAG_DETACH);
        self.write_node(e.node);
        self.write_node(e.owner);
    }

    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        self.write_u8(TAG_INVALIDATION);
        self.write_element(e.element);
        self.write_kind(e.kind);
        self.write_u16(e.attribute.raw());
    }

    fn on_predicate(&mut self, e: &PredicateEvent) {
        self.write_u8(TAG_PREDICATE);
        self.write_element(e.element);
        self.write_u16(e.attribute.raw());
        self.write_u8(u8::from(e.passed));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A node or element handle as recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawHandle {
    /// Slot index.
    pub index: u32,
    /// Generation at the time of recording.
    pub generation: u32,
}

impl From<NodeId> for RawHandle {
    fn from(node: NodeId) -> Self {
        Self {
            index: node.index(),
            generation: node.generation(),
        }
    }
}

impl From<ElementId> for RawHandle {
    fn from(element: ElementId) -> Self {
        Self {
            index: element.index(),
            generation: element.generation(),
        }
    }
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`ChangedEvent`].
    Changed {
        /// The node raising `Changed`.
        node: RawHandle,
        /// Distance from the written node.
        depth: u32,
    },
    /// An attach [`OwnershipEvent`].
    Attach {
        /// The owned node.
        node: RawHandle,
        /// Its new owner.
        owner: RawHandle,
    },
    /// A detach [`OwnershipEvent`].
    Detach {
        /// The released node.
        node: RawHandle,
        /// Its former owner.
        owner: RawHandle,
    },
    /// An [`InvalidationEvent`].
    Invalidation {
        /// The invalidated element.
        element: RawHandle,
        /// What was invalidated.
        kind: InvalidationKind,
        /// The written attribute.
        attribute: AttributeId,
    },
    /// A [`PredicateEvent`].
    Predicate {
        /// The written element.
        element: RawHandle,
        /// The driving attribute.
        attribute: AttributeId,
        /// Whether the write was let through.
        passed: bool,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u16(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        let v = u16::from_le_bytes(self.data[self.pos..self.pos + 2].try_into().ok()?);
        self.pos += 2;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_handle(&mut self) -> Option<RawHandle> {
        Some(RawHandle {
            index: self.read_u32()?,
            generation: self.read_u32()?,
        })
    }

    fn read_kind(&mut self) -> Option<InvalidationKind> {
        Some(match self.read_u8()? {
            0 => InvalidationKind::Measure,
            1 => InvalidationKind::Arrange,
            2 => InvalidationKind::Render,
            3 => InvalidationKind::Geometry,
            _ => return None,
        })
    }

    fn decode_changed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Changed {
            node: self.read_handle()?,
            depth: self.read_u32()?,
        })
    }

    fn decode_ownership(&mut self, attach: bool) -> Option<RecordedEvent> {
        let node = self.read_handle()?;
        let owner = self.read_handle()?;
        Some(if attach {
            RecordedEvent::Attach { node, owner }
        } else {
            RecordedEvent::Detach { node, owner }
        })
    }

    fn decode_invalidation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Invalidation {
            element: self.read_handle()?,
            kind: self.read_kind()?,
            attribute: AttributeId::new(self.read_u16()?),
        })
    }

    fn decode_predicate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Predicate {
            element: self.read_handle()?,
            attribute: AttributeId::new(self.read_u16()?),
            passed: self.read_u8()? != 0,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CHANGED => self.decode_changed(),
            TAG_ATTACH => self.decode_ownership(true),
            TAG_DETACH => self.decode_ownership(false),
            TAG_INVALIDATION => self.decode_invalidation(),
            TAG_PREDICATE => self.decode_predicate(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use kurbo::{Point, Rect};
    use ripple_core::element::{ElementStore, SHAPE, layoutable};
    use ripple_core::geometry::{SegmentKind, segment};
    use ripple_core::node::{AsNode, NodeStore};
    use ripple_core::registry::RegistryBuilder;

    use super::*;

    fn shared() -> Rc<RefCell<RecorderSink>> {
        Rc::new(RefCell::new(RecorderSink::new()))
    }

    #[test]
    fn propagation_is_recorded_with_depths() {
        let rec = shared();
        let mut store = NodeStore::new();
        let arc = store.create_leaf(SegmentKind::Arc);
        let figure = store.create_figure(&[arc]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        store.set_trace_sink(Some(Box::new(rec.clone())));

        store.set(arc, segment::POINT, Point::new(1.0, 1.0));

        let events: Vec<_> = decode(rec.borrow().as_bytes()).collect();
        let depths: Vec<u32> = events
            .iter()
            .map(|e| match e {
                RecordedEvent::Changed { depth, .. } => *depth,
                other => panic!("expected Changed, got {other:?}"),
            })
            .collect();
        // leaf → segments → figure → figures → path
        assert_eq!(depths, [0, 1, 2, 3, 4]);
        assert_eq!(
            events[4],
            RecordedEvent::Changed {
                node: RawHandle::from(path.node()),
                depth: 4
            }
        );
    }

    #[test]
    fn ownership_changes_are_recorded() {
        let rec = shared();
        let mut store = NodeStore::new();
        store.set_trace_sink(Some(Box::new(rec.clone())));
        let line = store.create_leaf(SegmentKind::Line);
        let segments = store.create_collection();
        store.push(segments, line).unwrap();
        assert!(store.remove(segments, line));

        let events: Vec<_> = decode(rec.borrow().as_bytes()).collect();
        let node = RawHandle::from(line.node());
        let owner = RawHandle::from(segments.node());
        assert!(events.contains(&RecordedEvent::Attach { node, owner }));
        assert!(events.contains(&RecordedEvent::Detach { node, owner }));
    }

    #[test]
    fn predicate_and_invalidation_are_recorded() {
        let rec = shared();
        let registry = Arc::new(RegistryBuilder::framework().unwrap().build());
        let mut store = ElementStore::new(registry);
        store.set_trace_sink(Some(Box::new(rec.clone())));
        let shape = store.create_element(SHAPE).unwrap();

        store.arrange(shape, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.arrange(shape, Rect::new(5.0, 5.0, 15.0, 15.0));

        let events: Vec<_> = decode(rec.borrow().as_bytes()).collect();
        let element = RawHandle::from(shape);
        let bounds = layoutable::BOUNDS.id();
        assert_eq!(
            events,
            [
                RecordedEvent::Predicate {
                    element,
                    attribute: bounds,
                    passed: true
                },
                RecordedEvent::Invalidation {
                    element,
                    kind: InvalidationKind::Measure,
                    attribute: bounds
                },
                RecordedEvent::Invalidation {
                    element,
                    kind: InvalidationKind::Geometry,
                    attribute: bounds
                },
                RecordedEvent::Predicate {
                    element,
                    attribute: bounds,
                    passed: false
                },
            ]
        );
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_changed(&ChangedEvent {
            node: first_node(),
            depth: 0,
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    fn first_node() -> NodeId {
        let mut store = NodeStore::new();
        store.create_composite().node()
    }
}
