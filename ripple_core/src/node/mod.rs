// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The propagation tree: leaves, owned collections, composites and roots.
//!
//! Every node lives in a [`NodeStore`] arena and is addressed by a
//! generational handle. Ownership is exclusive: a leaf or composite belongs to
//! at most one collection, and a collection to at most one composite or root.
//! Attaching a node inserts an owner-forwarding entry into its subscription
//! map; detaching removes it. A write anywhere in a tree therefore raises
//! `Changed` on each node up the chain to the root, synchronously and before
//! the write returns.
//!
//! Each arrow points from owner to owned; `Changed` travels the other way.
//!
//! ```text
//!  RootId ─▶ CollectionId<CompositeId> ─▶ CompositeId ─▶ CollectionId<LeafId> ─▶ LeafId
//!     ▲                  ▲                     ▲                   ▲                │
//!     └──── Changed ─────┴────── Changed ──────┴───── Changed ─────┴─── Changed ────┘
//! ```

mod collection;
mod id;
mod notify;
mod store;

pub use id::{
    AsNode, CollectionId, CompositeId, HasAttributes, INVALID, LeafId, Member, NodeId, NodeKind,
    RootId, SubscriptionId,
};
pub use notify::ChangedHandler;
pub use store::NodeStore;
