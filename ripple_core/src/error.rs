// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations reported by the node tree and the metadata registry.
//!
//! Stale handles are not represented here: like an out-of-range slice index
//! they are programming errors and panic at the offending call.

use core::fmt;

use crate::attribute::AttributeId;
use crate::node::NodeId;
use crate::registry::ClassId;

/// Errors from topology mutations on a [`NodeStore`](crate::node::NodeStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The node already belongs to another owner. Detach it first.
    AlreadyOwned {
        /// The node being attached.
        node: NodeId,
        /// Its current owner.
        owner: NodeId,
    },
    /// Attaching the node would make it its own ancestor.
    WouldCycle {
        /// The node being attached.
        node: NodeId,
    },
    /// The same node appears twice in one assigned sequence.
    DuplicateMember {
        /// The repeated node.
        node: NodeId,
    },
    /// An insertion index past the end of a collection.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The collection length at the time of the call.
        len: usize,
    },
    /// Owned nodes cannot be destroyed; remove them from their owner first.
    DestroyOwned {
        /// The node being destroyed.
        node: NodeId,
        /// Its current owner.
        owner: NodeId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyOwned { node, owner } => {
                write!(f, "{node:?} is already owned by {owner:?}")
            }
            Self::WouldCycle { node } => {
                write!(f, "attaching {node:?} would create an ownership cycle")
            }
            Self::DuplicateMember { node } => {
                write!(f, "{node:?} appears more than once in the sequence")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "insertion index {index} out of range (len {len})")
            }
            Self::DestroyOwned { node, owner } => {
                write!(f, "cannot destroy {node:?} while owned by {owner:?}")
            }
        }
    }
}

impl core::error::Error for TreeError {}

/// Errors from building an [`InvalidationRegistry`](crate::registry::InvalidationRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The (class, attribute) pair already has a metadata entry.
    DuplicateRegistration {
        /// The owning class.
        class: ClassId,
        /// The attribute registered twice.
        attribute: AttributeId,
    },
    /// The class was never defined on this builder.
    UnknownClass(ClassId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRegistration { class, attribute } => write!(
                f,
                "invalidation metadata for {attribute:?} on {class:?} registered twice"
            ),
            Self::UnknownClass(class) => write!(f, "{class:?} is not a defined class"),
        }
    }
}

impl core::error::Error for RegistryError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_mentions_both_sides_of_ownership_conflict() {
        let err = TreeError::AlreadyOwned {
            node: NodeId::from_parts(3, 0),
            owner: NodeId::from_parts(7, 2),
        };
        let text = err.to_string();
        assert!(text.contains("NodeId(3@gen0)"), "got {text}");
        assert!(text.contains("NodeId(7@gen2)"), "got {text}");
    }

    #[test]
    fn duplicate_registration_display() {
        let err = RegistryError::DuplicateRegistration {
            class: ClassId::new(4),
            attribute: AttributeId::new(0x0101),
        };
        assert_eq!(
            err.to_string(),
            "invalidation metadata for AttributeId(0x0101) on ClassId(4) registered twice"
        );
    }
}
