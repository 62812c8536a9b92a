// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned collections and the ownership links between nodes.

use alloc::vec::Vec;

use crate::error::TreeError;

use super::id::{AsNode, CollectionId, CompositeId, INVALID, Member, NodeId, NodeKind, RootId};
use super::notify::Subscriber;
use super::store::NodeStore;

impl NodeStore {
    // -- Collection membership --

    /// Replaces the whole content of a collection.
    ///
    /// Members that are not kept are detached, new members are attached, and
    /// the collection raises `Changed` exactly once, even when the new
    /// content equals the old.
    ///
    /// Nothing changes if any member is rejected.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DuplicateMember`] if `members` repeats a node.
    /// - [`TreeError::AlreadyOwned`] if a member belongs to another owner.
    /// - [`TreeError::WouldCycle`] if a member contains this collection.
    pub fn assign<T: Member>(
        &mut self,
        collection: CollectionId<T>,
        members: &[T],
    ) -> Result<(), TreeError> {
        let coll = collection.node.idx;
        self.validate(collection.node);
        for (i, member) in members.iter().enumerate() {
            self.validate(member.node());
            if members[..i].contains(member) {
                return Err(TreeError::DuplicateMember {
                    node: member.node(),
                });
            }
            self.check_attachable(member.node().idx, coll, true)?;
        }

        let new: Vec<u32> = members.iter().map(|m| m.node().idx).collect();
        let old = core::mem::take(&mut self.children[coll as usize]);
        for &idx in &old {
            if !new.contains(&idx) {
                self.unwire(idx);
            }
        }
        for &idx in &new {
            if self.owner[idx as usize] == INVALID {
                self.wire(idx, coll);
            }
        }
        self.children[coll as usize] = new;
        self.fire_changed(coll, 0);
        Ok(())
    }

    /// Inserts a member at `index`, shifting later members.
    ///
    /// # Errors
    ///
    /// - [`TreeError::IndexOutOfBounds`] if `index > len`.
    /// - [`TreeError::DuplicateMember`] if the node is already a member.
    /// - [`TreeError::AlreadyOwned`] if it belongs to another owner.
    /// - [`TreeError::WouldCycle`] if it contains this collection.
    pub fn insert<T: Member>(
        &mut self,
        collection: CollectionId<T>,
        index: usize,
        member: T,
    ) -> Result<(), TreeError> {
        let coll = collection.node.idx;
        self.validate(collection.node);
        let len = self.children[coll as usize].len();
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }
        self.validate(member.node());
        let idx = member.node().idx;
        self.check_attachable(idx, coll, false)?;

        self.wire(idx, coll);
        self.children[coll as usize].insert(index, idx);
        self.fire_changed(coll, 0);
        Ok(())
    }

    /// Appends a member.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert), minus the index check.
    pub fn push<T: Member>(
        &mut self,
        collection: CollectionId<T>,
        member: T,
    ) -> Result<(), TreeError> {
        let len = self.len(collection);
        self.insert(collection, len, member)
    }

    /// Removes a member, returning whether it was present.
    ///
    /// `Changed` is raised only if something was removed.
    pub fn remove<T: Member>(&mut self, collection: CollectionId<T>, member: T) -> bool {
        let coll = collection.node.idx;
        self.validate(collection.node);
        let idx = member.node().idx;
        let Some(pos) = self.children[coll as usize].iter().position(|&m| m == idx) else {
            return false;
        };
        if self.id_at(idx) != member.node() {
            return false;
        }
        self.children[coll as usize].remove(pos);
        self.unwire(idx);
        self.fire_changed(coll, 0);
        true
    }

    /// Removes every member. Raises `Changed` once, like an empty
    /// [`assign`](Self::assign).
    pub fn clear<T: Member>(&mut self, collection: CollectionId<T>) {
        self.validate(collection.node);
        let coll = collection.node.idx;
        let old = core::mem::take(&mut self.children[coll as usize]);
        for idx in old {
            self.unwire(idx);
        }
        self.fire_changed(coll, 0);
    }

    /// Returns the members in order.
    #[must_use]
    pub fn members<T: Member>(&self, collection: CollectionId<T>) -> Vec<T> {
        self.validate(collection.node);
        self.children[collection.node.idx as usize]
            .iter()
            .map(|&idx| T::from_node(self.id_at(idx)))
            .collect()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len<T: Member>(&self, collection: CollectionId<T>) -> usize {
        self.validate(collection.node);
        self.children[collection.node.idx as usize].len()
    }

    // -- Composite and root child collections --

    /// Sets (or clears) a composite's child collection.
    ///
    /// The previous collection is detached but stays alive. The composite
    /// raises `Changed` once.
    ///
    /// # Errors
    ///
    /// - [`TreeError::AlreadyOwned`] if the collection has another owner.
    /// - [`TreeError::WouldCycle`] if the collection contains the composite.
    pub fn set_children<T: Member>(
        &mut self,
        composite: CompositeId,
        children: Option<CollectionId<T>>,
    ) -> Result<(), TreeError> {
        self.validate(composite.0);
        self.replace_child(composite.0.idx, children.map(|c| c.node))
    }

    /// Returns a composite's child collection, if it holds one of `T`.
    #[must_use]
    pub fn children<T: Member>(&self, composite: CompositeId) -> Option<CollectionId<T>> {
        self.validate(composite.0);
        self.child_collection(composite.0.idx)
    }

    /// Sets (or clears) a root's figure collection.
    ///
    /// # Errors
    ///
    /// Same as [`set_children`](Self::set_children).
    pub fn set_figures(
        &mut self,
        root: RootId,
        figures: Option<CollectionId<CompositeId>>,
    ) -> Result<(), TreeError> {
        self.validate(root.0);
        self.replace_child(root.0.idx, figures.map(|c| c.node))
    }

    /// Returns a root's figure collection.
    #[must_use]
    pub fn figures(&self, root: RootId) -> Option<CollectionId<CompositeId>> {
        self.validate(root.0);
        self.child_collection(root.0.idx)
    }

    // -- Invariants --

    /// Checks that every owner link is mirrored by exactly one forwarding
    /// subscription and by the owner's membership list, and that the
    /// ownership graph has no cycles.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        for idx in 0..self.len {
            let i = idx as usize;
            let owner = self.owner[i];
            let forwards: Vec<u32> = self.subscribers[i]
                .values()
                .filter_map(|s| match s {
                    Subscriber::Owner(o) => Some(*o),
                    _ => None,
                })
                .collect();
            if owner == INVALID {
                if !forwards.is_empty() {
                    return false;
                }
            } else {
                if forwards != [owner] {
                    return false;
                }
                let forwarding = self.subscribers[i].get(&self.owner_seq[i]);
                if !matches!(forwarding, Some(Subscriber::Owner(o)) if *o == owner) {
                    return false;
                }
                if self.children[owner as usize].iter().filter(|&&c| c == idx).count() != 1 {
                    return false;
                }
            }
            for &child in &self.children[i] {
                if self.owner[child as usize] != idx {
                    return false;
                }
            }
            // The chain above every node must end within `len` steps.
            let mut cur = owner;
            let mut steps = 0;
            while cur != INVALID {
                steps += 1;
                if steps > self.len {
                    return false;
                }
                cur = self.owner[cur as usize];
            }
        }
        true
    }

    // -- Internal helpers --

    fn child_collection<T: Member>(&self, idx: u32) -> Option<CollectionId<T>> {
        let &child = self.children[idx as usize].first()?;
        (self.member_kind[child as usize] == Some(T::KIND))
            .then(|| CollectionId::new(self.id_at(child)))
    }

    fn replace_child(&mut self, parent: u32, child: Option<NodeId>) -> Result<(), TreeError> {
        if let Some(child) = child {
            self.validate(child);
            debug_assert_eq!(self.kind[child.idx as usize], NodeKind::Collection);
            self.check_attachable(child.idx, parent, true)?;
        }
        let old = core::mem::take(&mut self.children[parent as usize]);
        let new_idx = child.map(|c| c.idx);
        for idx in old {
            if Some(idx) != new_idx {
                self.unwire(idx);
            }
        }
        if let Some(idx) = new_idx {
            if self.owner[idx as usize] == INVALID {
                self.wire(idx, parent);
            }
            self.children[parent as usize].push(idx);
        }
        self.fire_changed(parent, 0);
        Ok(())
    }

    /// Checks that `node` may become owned by `owner`.
    ///
    /// With `allow_same`, a node already owned by `owner` is accepted (it is
    /// kept in place); otherwise it is a duplicate.
    fn check_attachable(&self, node: u32, owner: u32, allow_same: bool) -> Result<(), TreeError> {
        let id = self.id_at(node);
        let current = self.owner[node as usize];
        if current == owner {
            if allow_same {
                return Ok(());
            }
            return Err(TreeError::DuplicateMember { node: id });
        }
        if current != INVALID {
            return Err(TreeError::AlreadyOwned {
                node: id,
                owner: self.id_at(current),
            });
        }
        let mut cur = owner;
        while cur != INVALID {
            if cur == node {
                return Err(TreeError::WouldCycle { node: id });
            }
            cur = self.owner[cur as usize];
        }
        Ok(())
    }
}
