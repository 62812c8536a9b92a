// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change propagation and layout invalidation for retained vector-graphics
//! trees.
//!
//! `ripple_core` decides two things whenever an attribute is written:
//!
//! 1. Which ancestors must hear about it. Path segments live in collections
//!    owned by figures, figures live in a collection owned by a path
//!    geometry, and the geometry's single `Changed` signal is what a renderer
//!    watches to know its cached output is stale.
//! 2. Whether the write implies relayout of a UI element. Attributes are
//!    declared to affect measure, arrange, render, or geometry per element
//!    class, optionally gated by a predicate (the canonical one ignores a
//!    bounds change that only moves an element without resizing it).
//!
//! The crate is `no_std` compatible (with `alloc`) and stores both trees in
//! struct-of-arrays arenas addressed by generational handles.
//!
//! # Architecture
//!
//! ```text
//!   NodeStore::set(leaf, attr, v)
//!       │  Changed
//!       ▼
//!   OwnedCollection ──► Composite ──► OwnedCollection ──► Root ──► handlers
//!
//!   ElementStore::set(element, attr, v)
//!       │
//!       ▼
//!   InvalidationDispatcher ──► InvalidationRegistry::lookup()
//!       │  (predicate?)
//!       ▼
//!   Invalidate::{invalidate_measure, _arrange, _render, _geometry}
//! ```
//!
//! **[`node`]**: Arena of leaves, composites, owned collections and roots.
//! Owner links are subscriptions in the same ordered list as external
//! handlers, so notification order is subscription order and detaching a
//! node removes exactly one entry.
//!
//! **[`geometry`]**: Path vocabulary (segments, figures, path geometry)
//! expressed as attribute sets on nodes.
//!
//! **[`registry`]** / **[`dispatch`]**: Per-class invalidation metadata with
//! single inheritance, and the write-time dispatcher that consults it.
//!
//! **[`element`]** / **[`layout`]**: UI elements whose writes are dispatched,
//! and a validity tracker implementing the invalidation entry points on top
//! of `understory_dirty` channels (see [`dirty`]).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attribute;
pub mod config;
pub mod dirty;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod geometry;
pub mod invalidation;
pub mod layout;
pub mod node;
pub mod predicate;
pub mod registry;
pub mod trace;
