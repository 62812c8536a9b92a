// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). `Changed`
//! lines are indented by propagation depth so a single write reads as a
//! path from the written node up to its root.

use std::io::Write;

use ripple_core::trace::{
    ChangedEvent, InvalidationEvent, OwnershipEvent, PredicateEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_changed(&mut self, e: &ChangedEvent) {
        let indent = e.depth as usize * 2;
        let _ = writeln!(
            self.writer,
            "[changed] {:indent$}{:?} depth={}",
            "", e.node, e.depth,
        );
    }

    fn on_attach(&mut self, e: &OwnershipEvent) {
        let _ = writeln!(self.writer, "[attach] {:?} -> {:?}", e.node, e.owner);
    }

    fn on_detach(&mut self, e: &OwnershipEvent) {
        let _ = writeln!(self.writer, "[detach] {:?} -x {:?}", e.node, e.owner);
    }

    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        let _ = writeln!(
            self.writer,
            "[invalidate] {:?} {:?} by {:?}",
            e.element, e.kind, e.attribute,
        );
    }

    fn on_predicate(&mut self, e: &PredicateEvent) {
        let verdict = if e.passed { "pass" } else { "filtered" };
        let _ = writeln!(
            self.writer,
            "[predicate] {:?} {:?} {verdict}",
            e.element, e.attribute,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kurbo::Point;
    use ripple_core::geometry::{SegmentKind, segment};
    use ripple_core::node::NodeStore;

    use super::*;

    #[test]
    fn changed_lines_are_indented_by_depth() {
        let sink = Rc::new(RefCell::new(PrettyPrintSink::with_writer(Vec::<u8>::new())));
        let mut store = NodeStore::new();
        let line = store.create_leaf(SegmentKind::Line);
        let _figure = store.create_figure(&[line]).unwrap();
        store.set_trace_sink(Some(Box::new(sink.clone())));

        store.set(line, segment::POINT, Point::new(3.0, 4.0));
        store.set_trace_sink(None);

        let sink = Rc::try_unwrap(sink).unwrap().into_inner();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3, "got: {output}");
        assert!(lines[0].starts_with("[changed] NodeId("), "got: {output}");
        assert!(lines[2].starts_with("[changed]     NodeId("), "got: {output}");
        assert!(lines[2].ends_with("depth=2"), "got: {output}");
    }

    #[test]
    fn predicate_verdict_is_spelled_out() {
        use ripple_core::attribute::AttributeId;
        use ripple_core::element::ElementStore;
        use ripple_core::registry::RegistryBuilder;

        let registry = std::sync::Arc::new(RegistryBuilder::framework().unwrap().build());
        let mut elements = ElementStore::new(registry);
        let e = elements.create_element(ripple_core::element::SHAPE).unwrap();

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_predicate(&PredicateEvent {
            element: e,
            attribute: AttributeId::new(0x1006),
            passed: false,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("filtered"), "got: {output}");
        assert!(output.contains("AttributeId(0x1006)"), "got: {output}");
    }
}
