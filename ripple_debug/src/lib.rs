// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for ripple
//! diagnostics.
//!
//! This crate provides [`TraceSink`](ripple_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! Stores take ownership of their sink. To inspect a sink afterwards, install
//! an `Rc<RefCell<_>>` clone of it:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use ripple_core::geometry::{SegmentKind, segment};
//! use ripple_core::node::NodeStore;
//! use ripple_debug::recorder::{RecorderSink, decode};
//!
//! let recorder = Rc::new(RefCell::new(RecorderSink::new()));
//! let mut store = NodeStore::new();
//! store.set_trace_sink(Some(Box::new(recorder.clone())));
//!
//! let line = store.create_leaf(SegmentKind::Line);
//! store.set(line, segment::POINT, kurbo::Point::new(1.0, 2.0));
//! assert_eq!(decode(recorder.borrow().as_bytes()).count(), 1);
//! ```

pub mod chrome;
pub mod pretty;
pub mod recorder;
