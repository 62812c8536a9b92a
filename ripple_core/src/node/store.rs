// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation and attribute access.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::attribute::{Attribute, AttributeId, AttributeMap, AttributeValue};
use crate::config::StoreConfig;
use crate::error::TreeError;
use crate::geometry::{SegmentKind, figure, path};
use crate::trace::{TraceSink, Tracer};

use super::id::{
    AsNode, CollectionId, CompositeId, HasAttributes, INVALID, LeafId, Member, NodeId, NodeKind,
    RootId,
};
use super::notify::Subscriber;

/// Struct-of-arrays storage for every observable node.
///
/// Nodes are addressed by [`NodeId`] handles (or the typed wrappers
/// [`LeafId`], [`CompositeId`], [`CollectionId`], [`RootId`]). Internally each
/// node occupies a slot in parallel arrays. Destroyed nodes are recycled via a
/// free list, and generation counters prevent stale handle access.
pub struct NodeStore {
    // -- Structure --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) segment: Vec<Option<SegmentKind>>,
    pub(crate) member_kind: Vec<Option<NodeKind>>,
    pub(crate) owner: Vec<u32>,
    /// Collections: ordered members. Composites and roots: the owned
    /// collection, if any.
    pub(crate) children: Vec<Vec<u32>>,

    // -- Local state --
    pub(crate) attributes: Vec<AttributeMap>,

    // -- Notification --
    pub(crate) subscribers: Vec<BTreeMap<u64, Subscriber>>,
    /// Key of the owner-forwarding entry in `subscribers`, valid while
    /// `owner` is set.
    pub(crate) owner_seq: Vec<u64>,
    pub(crate) next_seq: u64,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Configuration and diagnostics --
    pub(crate) config: StoreConfig,
    pub(crate) sink: Option<Box<dyn TraceSink>>,
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("config", &self.config)
            .field("traced", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::DEFAULT)
    }

    /// Creates an empty store.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            kind: Vec::new(),
            segment: Vec::new(),
            member_kind: Vec::new(),
            owner: Vec::new(),
            children: Vec::new(),
            attributes: Vec::new(),
            subscribers: Vec::new(),
            owner_seq: Vec::new(),
            next_seq: 0,
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            config,
            sink: None,
        }
    }

    /// Returns the store's configuration.
    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Installs (or removes) the trace sink.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.sink = sink;
    }

    pub(crate) fn tracer(&mut self) -> Tracer<'_> {
        Tracer::from_slot(&mut self.sink)
    }

    // -- Allocation API --

    /// Creates a detached segment of the given kind.
    pub fn create_leaf(&mut self, kind: SegmentKind) -> LeafId {
        LeafId(self.allocate(NodeKind::Leaf, Some(kind), None))
    }

    /// Creates a detached composite with no child collection.
    pub fn create_composite(&mut self) -> CompositeId {
        CompositeId(self.allocate(NodeKind::Composite, None, None))
    }

    /// Creates an empty, unowned collection of `T`.
    pub fn create_collection<T: Member>(&mut self) -> CollectionId<T> {
        CollectionId::new(self.allocate(NodeKind::Collection, None, Some(T::KIND)))
    }

    /// Creates a root with no figure collection.
    pub fn create_root(&mut self) -> RootId {
        RootId(self.allocate(NodeKind::Root, None, None))
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// Everything the node owns is detached first (it stays alive and can be
    /// attached elsewhere), and every subscription on the node is dropped
    /// without notifying anyone.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DestroyOwned`] if the node still has an owner.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, node: impl AsNode) -> Result<(), TreeError> {
        let id = node.node();
        self.validate(id);
        let idx = id.idx;
        let owner = self.owner[idx as usize];
        if owner != INVALID {
            return Err(TreeError::DestroyOwned {
                node: id,
                owner: self.id_at(owner),
            });
        }

        let owned = core::mem::take(&mut self.children[idx as usize]);
        for child in owned {
            self.unwire(child);
        }
        self.subscribers[idx as usize].clear();
        self.attributes[idx as usize].clear();

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        Ok(())
    }

    /// Destroys a node that was just created and never attached.
    pub(crate) fn discard(&mut self, node: impl AsNode) {
        let result = self.destroy(node);
        debug_assert!(result.is_ok(), "discarded node was owned: {result:?}");
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: impl AsNode) -> bool {
        let id = node.node();
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Structure queries --

    /// Returns the structural role of a node.
    #[must_use]
    pub fn kind(&self, node: impl AsNode) -> NodeKind {
        let id = node.node();
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the segment kind of a leaf.
    #[must_use]
    pub fn segment_kind(&self, leaf: LeafId) -> SegmentKind {
        self.validate(leaf.0);
        match self.segment[leaf.0.idx as usize] {
            Some(kind) => kind,
            None => panic!("{leaf:?} has no segment kind"),
        }
    }

    /// Returns the current owner of a node, if any.
    #[must_use]
    pub fn owner(&self, node: impl AsNode) -> Option<NodeId> {
        let id = node.node();
        self.validate(id);
        let owner = self.owner[id.idx as usize];
        (owner != INVALID).then(|| self.id_at(owner))
    }

    /// Walks the ownership chain up to the root, if the node is under one.
    #[must_use]
    pub fn root_of(&self, node: impl AsNode) -> Option<RootId> {
        let id = node.node();
        self.validate(id);
        let mut idx = id.idx;
        while self.owner[idx as usize] != INVALID {
            idx = self.owner[idx as usize];
        }
        (self.kind[idx as usize] == NodeKind::Root).then(|| RootId(self.id_at(idx)))
    }

    // -- Attribute API --

    /// Reads an attribute, falling back to its default.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node does not expose `attr`.
    #[must_use]
    pub fn get<T: AttributeValue>(&self, node: impl HasAttributes, attr: Attribute<T>) -> T {
        let id = node.node();
        self.validate(id);
        self.assert_exposes(id.idx, &attr);
        self.attributes[id.idx as usize].read(attr)
    }

    /// Writes an attribute and raises `Changed` on the node, which travels
    /// through every owner up to the root before this call returns.
    ///
    /// With [`ChangePolicy::SkipEqual`](crate::config::ChangePolicy::SkipEqual)
    /// a write that leaves the value unchanged is silent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node does not expose `attr`.
    pub fn set<T: AttributeValue>(
        &mut self,
        node: impl HasAttributes,
        attr: Attribute<T>,
        value: T,
    ) {
        let id = node.node();
        self.validate(id);
        self.assert_exposes(id.idx, &attr);
        let idx = id.idx as usize;
        let notify = self
            .config
            .should_notify(&self.attributes[idx].read(attr), &value);
        self.attributes[idx].insert(attr.id(), value.into_value());
        if notify {
            self.fire_changed(id.idx, 0);
        }
    }

    /// Returns whether a node exposes the attribute.
    #[must_use]
    pub fn exposes(&self, node: impl AsNode, attr: AttributeId) -> bool {
        let id = node.node();
        self.validate(id);
        self.declared(id.idx).contains(&attr)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Returns the live handle for a slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId::from_parts(idx, self.generation[idx as usize])
    }

    fn declared(&self, idx: u32) -> &'static [AttributeId] {
        match self.kind[idx as usize] {
            NodeKind::Leaf => match self.segment[idx as usize] {
                Some(kind) => kind.attributes(),
                None => &[],
            },
            NodeKind::Composite => figure::ALL,
            NodeKind::Root => path::ALL,
            NodeKind::Collection => &[],
        }
    }

    fn assert_exposes<T>(&self, idx: u32, attr: &Attribute<T>) {
        if self.declared(idx).contains(&attr.id()) {
            return;
        }
        match self.segment[idx as usize] {
            Some(kind) => panic!("{attr:?} is not exposed by {kind:?} segments"),
            None => panic!(
                "{attr:?} is not exposed by {:?} nodes",
                self.kind[idx as usize]
            ),
        }
    }

    fn allocate(
        &mut self,
        kind: NodeKind,
        segment: Option<SegmentKind>,
        member_kind: Option<NodeKind>,
    ) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.kind[i] = kind;
            self.segment[i] = segment;
            self.member_kind[i] = member_kind;
            self.owner[i] = INVALID;
            self.children[i].clear();
            self.attributes[i].clear();
            self.subscribers[i].clear();
            self.owner_seq[i] = 0;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.kind.push(kind);
            self.segment.push(segment);
            self.member_kind.push(member_kind);
            self.owner.push(INVALID);
            self.children.push(Vec::new());
            self.attributes.push(AttributeMap::new());
            self.subscribers.push(BTreeMap::new());
            self.owner_seq.push(0);
            self.generation.push(0);
            idx
        };
        self.id_at(idx)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::config::StoreConfig;
    use crate::geometry::segment;

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let leaf = store.create_leaf(SegmentKind::Line);
        assert!(store.is_alive(leaf));
        store.destroy(leaf).unwrap();
        assert!(!store.is_alive(leaf));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let a = store.create_composite();
        store.destroy(a).unwrap();
        let b = store.create_composite();
        // b reuses the same slot but has a different generation.
        assert!(!store.is_alive(a));
        assert!(store.is_alive(b));
        assert_eq!(a.0.index(), b.0.index());
        assert_ne!(a.0.generation(), b.0.generation());
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set() {
        let mut store = NodeStore::new();
        let leaf = store.create_leaf(SegmentKind::Line);
        store.destroy(leaf).unwrap();
        store.set(leaf, segment::POINT, Point::new(1.0, 1.0));
    }

    #[test]
    fn owned_node_cannot_be_destroyed() {
        let mut store = NodeStore::new();
        let leaf = store.create_leaf(SegmentKind::Line);
        let figure = store.create_figure(&[leaf]).unwrap();
        let err = store.destroy(leaf).unwrap_err();
        assert!(matches!(err, TreeError::DestroyOwned { .. }));
        assert!(store.is_alive(leaf));
        assert!(store.root_of(figure).is_none());
    }

    #[test]
    fn destroying_a_root_releases_its_figures() {
        let mut store = NodeStore::new();
        let figure = store.create_figure(&[]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        let figures = store.figures(path).unwrap();

        store.destroy(path).unwrap();
        assert!(store.is_alive(figure));
        assert!(store.is_alive(figures));
        assert_eq!(store.owner(figures), None);
        assert_eq!(store.root_of(figure), None);
        assert!(store.check_invariants());
    }

    #[test]
    fn get_returns_default_until_written() {
        let mut store = NodeStore::new();
        let figure = store.create_composite();
        assert!(store.get(figure, figure::IS_FILLED));
        store.set(figure, figure::IS_FILLED, false);
        assert!(!store.get(figure, figure::IS_FILLED));
    }

    #[test]
    fn skip_equal_policy_suppresses_redundant_writes() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let mut store = NodeStore::with_config(StoreConfig::DEDUPLICATED);
        let figure = store.create_composite();
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        store.subscribe(figure, move |_, _| seen.set(seen.get() + 1));

        store.set(figure, figure::IS_CLOSED, false);
        assert_eq!(fired.get(), 0, "default value written again");
        store.set(figure, figure::IS_CLOSED, true);
        assert_eq!(fired.get(), 1);
        store.set(figure, figure::IS_CLOSED, true);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn skip_equal_policy_treats_nan_as_unchanged() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let mut store = NodeStore::with_config(StoreConfig::DEDUPLICATED);
        let arc = store.create_leaf(SegmentKind::Arc);
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        store.subscribe(arc, move |_, _| seen.set(seen.get() + 1));

        store.set(arc, segment::ROTATION_ANGLE, f64::NAN);
        assert_eq!(fired.get(), 1);
        store.set(arc, segment::ROTATION_ANGLE, f64::NAN);
        assert_eq!(fired.get(), 1);
        store.set(arc, segment::ROTATION_ANGLE, 0.0);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn freed_slots_are_dead_and_clean() {
        let mut store = NodeStore::new();
        let leaf = store.create_leaf(SegmentKind::Line);
        let figure = store.create_figure(&[leaf]).unwrap();
        let segments = store.children::<LeafId>(figure).unwrap();
        store.destroy(figure).unwrap();

        assert!(!store.is_alive(figure));
        assert!(store.is_alive(segments));
        assert_eq!(store.owner(segments), None);
        assert_eq!(store.owner(leaf), Some(segments.node()));
        assert!(store.check_invariants());

        store.destroy(segments).unwrap();
        assert!(!store.is_alive(segments));
        assert_eq!(store.owner(leaf), None);
        assert!(store.check_invariants());

        // Freed slots are reused last-in first-out.
        let reused = store.create_composite();
        assert_eq!(reused.0.index(), segments.node().index());
        assert!(store.is_alive(reused));
        assert!(!store.is_alive(segments));
        assert!(store.check_invariants());
    }

    #[test]
    fn exposes_reports_declared_attributes() {
        let mut store = NodeStore::new();
        let arc = store.create_leaf(SegmentKind::Arc);
        let line = store.create_leaf(SegmentKind::Line);
        assert!(store.exposes(arc, segment::SIZE.id()));
        assert!(!store.exposes(line, segment::SIZE.id()));
        assert_eq!(store.segment_kind(arc), SegmentKind::Arc);
        assert_eq!(store.kind(line), NodeKind::Leaf);
    }
}
