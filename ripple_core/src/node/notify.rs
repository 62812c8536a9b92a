// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Changed` subscriptions and synchronous propagation.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::trace::{ChangedEvent, OwnershipEvent};

use super::id::{AsNode, INVALID, NodeId, SubscriptionId};
use super::store::NodeStore;

/// An external `Changed` handler.
///
/// Handlers receive the store (so they may read or mutate it) and the node
/// that raised the notification. A handler that writes to the tree it
/// observes is re-entered by that write, so it must bound its own recursion.
pub type ChangedHandler = dyn Fn(&mut NodeStore, NodeId);

/// One entry in a node's ordered subscription map.
pub(crate) enum Subscriber {
    /// Forward to the owning node's `Changed`.
    Owner(u32),
    /// An external handler.
    Handler(Rc<ChangedHandler>),
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner(idx) => write!(f, "Owner({idx})"),
            Self::Handler(_) => f.write_str("Handler"),
        }
    }
}

enum Step {
    Forward(u32),
    Call(Rc<ChangedHandler>),
}

impl NodeStore {
    /// Subscribes a handler to a node's `Changed`.
    ///
    /// Handlers on one node run in subscription order. A handler may mutate
    /// the store, including the tree it observes; nested notifications are
    /// delivered (to every handler, the running one included) before the
    /// remaining handlers of the outer one.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn subscribe<F>(&mut self, node: impl AsNode, handler: F) -> SubscriptionId
    where
        F: Fn(&mut Self, NodeId) + 'static,
    {
        let id = node.node();
        self.validate(id);
        let seq = self.next_sequence();
        self.subscribers[id.idx as usize].insert(seq, Subscriber::Handler(Rc::new(handler)));
        SubscriptionId { node: id, seq }
    }

    /// Removes a subscription.
    ///
    /// Returns `false` if it was already removed or its node was destroyed.
    /// Removing a handler from inside its own invocation is allowed.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        if !self.is_alive(subscription.node) {
            return false;
        }
        let map = &mut self.subscribers[subscription.node.idx as usize];
        match map.get(&subscription.seq) {
            Some(Subscriber::Handler(_)) => {
                map.remove(&subscription.seq);
                true
            }
            _ => false,
        }
    }

    /// Returns the number of external handlers subscribed to a node.
    #[must_use]
    pub fn handler_count(&self, node: impl AsNode) -> usize {
        let id = node.node();
        self.validate(id);
        self.subscribers[id.idx as usize]
            .values()
            .filter(|s| !matches!(s, Subscriber::Owner(_)))
            .count()
    }

    /// Raises `Changed` on a node and everything above it.
    pub(crate) fn fire_changed(&mut self, idx: u32, depth: u32) {
        let node = self.id_at(idx);
        self.tracer().changed(&ChangedEvent { node, depth });

        let i = idx as usize;
        let keys: Vec<u64> = self.subscribers[i].keys().copied().collect();
        for seq in keys {
            // A handler may have destroyed the node.
            if self.generation[i] != node.generation {
                return;
            }
            let step = match self.subscribers[i].get(&seq) {
                Some(Subscriber::Owner(owner)) => Step::Forward(*owner),
                Some(Subscriber::Handler(handler)) => Step::Call(Rc::clone(handler)),
                None => continue,
            };
            match step {
                Step::Forward(owner) => self.fire_changed(owner, depth + 1),
                Step::Call(handler) => handler(self, node),
            }
        }
    }

    /// Wires `child` to forward its `Changed` to `owner`.
    pub(crate) fn wire(&mut self, child: u32, owner: u32) {
        debug_assert_eq!(self.owner[child as usize], INVALID, "already wired");
        let seq = self.next_sequence();
        self.owner[child as usize] = owner;
        self.owner_seq[child as usize] = seq;
        self.subscribers[child as usize].insert(seq, Subscriber::Owner(owner));
        let e = OwnershipEvent {
            node: self.id_at(child),
            owner: self.id_at(owner),
        };
        self.tracer().attach(&e);
    }

    /// Removes `child`'s forwarding entry and clears its owner.
    pub(crate) fn unwire(&mut self, child: u32) {
        let owner = self.owner[child as usize];
        if owner == INVALID {
            return;
        }
        let seq = self.owner_seq[child as usize];
        self.subscribers[child as usize].remove(&seq);
        self.owner[child as usize] = INVALID;
        let e = OwnershipEvent {
            node: self.id_at(child),
            owner: self.id_at(owner),
        };
        self.tracer().detach(&e);
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
