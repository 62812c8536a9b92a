// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity types.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`NodeStore`](super::NodeStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn from_parts(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// The structural role of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A primitive with attributes and no children.
    Leaf,
    /// Attributes plus at most one owned collection.
    Composite,
    /// An ordered, owner-exclusive sequence of leaves or composites.
    Collection,
    /// The top of a tree; owns at most one collection of composites.
    Root,
}

/// Anything that names a node.
pub trait AsNode: Copy {
    /// Returns the untyped handle.
    fn node(self) -> NodeId;
}

/// Node handles that carry attributes.
pub trait HasAttributes: AsNode {}

/// Node handles that may be members of an owned collection.
pub trait Member: AsNode + Eq {
    /// The kind every member of such a collection has.
    const KIND: NodeKind;

    /// Re-types a handle already known to be of [`Self::KIND`].
    #[doc(hidden)]
    fn from_node(node: NodeId) -> Self;
}

impl AsNode for NodeId {
    #[inline]
    fn node(self) -> NodeId {
        self
    }
}

macro_rules! typed_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) NodeId);

        impl AsNode for $name {
            #[inline]
            fn node(self) -> NodeId {
                self.0
            }
        }

        impl HasAttributes for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}@gen{})"),
                    self.0.idx,
                    self.0.generation
                )
            }
        }
    };
}

typed_handle!(
    /// A primitive node (a path segment).
    LeafId
);
typed_handle!(
    /// A node with attributes and an optional child collection (a figure).
    CompositeId
);
typed_handle!(
    /// The top of a tree (a path geometry).
    RootId
);

impl Member for LeafId {
    const KIND: NodeKind = NodeKind::Leaf;

    fn from_node(node: NodeId) -> Self {
        Self(node)
    }
}

impl Member for CompositeId {
    const KIND: NodeKind = NodeKind::Composite;

    fn from_node(node: NodeId) -> Self {
        Self(node)
    }
}

/// A handle to an owned collection whose members are `T`.
pub struct CollectionId<T> {
    pub(crate) node: NodeId,
    _member: PhantomData<fn() -> T>,
}

impl<T> CollectionId<T> {
    pub(crate) const fn new(node: NodeId) -> Self {
        Self {
            node,
            _member: PhantomData,
        }
    }
}

impl<T> Clone for CollectionId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CollectionId<T> {}

impl<T> PartialEq for CollectionId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for CollectionId<T> {}

impl<T> Hash for CollectionId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T> fmt::Debug for CollectionId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CollectionId({}@gen{})",
            self.node.idx, self.node.generation
        )
    }
}

impl<T> AsNode for CollectionId<T> {
    #[inline]
    fn node(self) -> NodeId {
        self.node
    }
}

/// A handle to a `Changed` subscription, returned by
/// [`NodeStore::subscribe`](super::NodeStore::subscribe).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    pub(crate) node: NodeId,
    pub(crate) seq: u64,
}

impl SubscriptionId {
    /// Returns the observed node.
    #[must_use]
    pub const fn node(self) -> NodeId {
        self.node
    }
}

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({:?}#{})", self.node, self.seq)
    }
}
