// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-class invalidation metadata.
//!
//! Element classes form a single-inheritance hierarchy. Each class may declare
//! which attributes invalidate what, optionally gated by a [`Predicate`]. A
//! derived class inherits every declaration of its bases and may override one
//! by registering the same attribute again on itself.
//!
//! Metadata is written once through a [`RegistryBuilder`] (single writer)
//! and then frozen into an [`InvalidationRegistry`] which is immutable and can
//! be shared (for example behind an `Arc`) by any number of readers.
//!
//! ```
//! use ripple_core::element::layoutable;
//! use ripple_core::invalidation::InvalidationKinds;
//! use ripple_core::registry::RegistryBuilder;
//!
//! let mut builder = RegistryBuilder::new();
//! let panel = builder.define_class("Panel", None).unwrap();
//! builder.affects_measure(panel, &[layoutable::WIDTH.id()]).unwrap();
//! let registry = builder.build();
//!
//! let entry = registry.lookup(panel, layoutable::WIDTH.id()).unwrap();
//! assert_eq!(entry.kinds, InvalidationKinds::MEASURE);
//! ```

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::attribute::AttributeId;
use crate::error::RegistryError;
use crate::invalidation::InvalidationKinds;
use crate::predicate::Predicate;

/// Identity of an element class.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u16);

impl ClassId {
    /// Creates a class identity from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// One invalidation declaration.
#[derive(Clone, Copy, Debug)]
pub struct MetadataEntry {
    /// The class that declared it.
    pub class: ClassId,
    /// The driving attribute.
    pub attribute: AttributeId,
    /// What a write invalidates.
    pub kinds: InvalidationKinds,
    /// Optional filter on the driving attribute's old and new value.
    pub predicate: Option<Predicate>,
}

#[derive(Clone, Copy, Debug)]
struct ClassInfo {
    name: &'static str,
    base: Option<ClassId>,
}

/// Collects class definitions and metadata before freezing them.
#[derive(Clone, Debug, Default)]
pub struct RegistryBuilder {
    classes: Vec<ClassInfo>,
    entries: BTreeMap<(ClassId, AttributeId), MetadataEntry>,
}

impl RegistryBuilder {
    /// Creates a builder with no classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a class deriving from `base`.
    ///
    /// Classes are numbered in definition order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownClass`] if `base` was not defined here.
    pub fn define_class(
        &mut self,
        name: &'static str,
        base: Option<ClassId>,
    ) -> Result<ClassId, RegistryError> {
        if let Some(base) = base {
            self.check_class(base)?;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "class tables never approach u16::MAX entries"
        )]
        let id = ClassId(self.classes.len() as u16);
        self.classes.push(ClassInfo { name, base });
        Ok(id)
    }

    /// Declares that writing `attribute` on instances of `class` invalidates
    /// `kinds`, subject to `predicate`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownClass`] if `class` was not defined here.
    /// - [`RegistryError::DuplicateRegistration`] if the pair was already
    ///   registered on this class. Registering an attribute that a base class
    ///   declared is an override, not a duplicate.
    pub fn register(
        &mut self,
        class: ClassId,
        attribute: AttributeId,
        kinds: InvalidationKinds,
        predicate: Option<Predicate>,
    ) -> Result<(), RegistryError> {
        self.check_class(class)?;
        if self.entries.contains_key(&(class, attribute)) {
            return Err(RegistryError::DuplicateRegistration { class, attribute });
        }
        self.entries.insert(
            (class, attribute),
            MetadataEntry {
                class,
                attribute,
                kinds,
                predicate,
            },
        );
        Ok(())
    }

    /// Declares attributes that invalidate measure.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register). Attributes before the failing one
    /// stay registered.
    pub fn affects_measure(
        &mut self,
        class: ClassId,
        attributes: &[AttributeId],
    ) -> Result<(), RegistryError> {
        self.register_all(class, attributes, InvalidationKinds::MEASURE)
    }

    /// Declares attributes that invalidate arrange.
    ///
    /// # Errors
    ///
    /// See [`affects_measure`](Self::affects_measure).
    pub fn affects_arrange(
        &mut self,
        class: ClassId,
        attributes: &[AttributeId],
    ) -> Result<(), RegistryError> {
        self.register_all(class, attributes, InvalidationKinds::ARRANGE)
    }

    /// Declares attributes that invalidate rendering.
    ///
    /// # Errors
    ///
    /// See [`affects_measure`](Self::affects_measure).
    pub fn affects_render(
        &mut self,
        class: ClassId,
        attributes: &[AttributeId],
    ) -> Result<(), RegistryError> {
        self.register_all(class, attributes, InvalidationKinds::RENDER)
    }

    /// Declares attributes that invalidate a shape's defining geometry.
    ///
    /// The geometry feeds the shape's desired size, so these also invalidate
    /// measure.
    ///
    /// # Errors
    ///
    /// See [`affects_measure`](Self::affects_measure).
    pub fn affects_geometry(
        &mut self,
        class: ClassId,
        attributes: &[AttributeId],
    ) -> Result<(), RegistryError> {
        self.register_all(
            class,
            attributes,
            InvalidationKinds::GEOMETRY | InvalidationKinds::MEASURE,
        )
    }

    /// Freezes the builder.
    #[must_use]
    pub fn build(self) -> InvalidationRegistry {
        InvalidationRegistry {
            classes: self.classes,
            entries: self.entries,
        }
    }

    fn register_all(
        &mut self,
        class: ClassId,
        attributes: &[AttributeId],
        kinds: InvalidationKinds,
    ) -> Result<(), RegistryError> {
        for &attribute in attributes {
            self.register(class, attribute, kinds, None)?;
        }
        Ok(())
    }

    fn check_class(&self, class: ClassId) -> Result<(), RegistryError> {
        if (class.0 as usize) < self.classes.len() {
            Ok(())
        } else {
            Err(RegistryError::UnknownClass(class))
        }
    }
}

/// Frozen invalidation metadata.
#[derive(Clone, Debug)]
pub struct InvalidationRegistry {
    classes: Vec<ClassInfo>,
    entries: BTreeMap<(ClassId, AttributeId), MetadataEntry>,
}

impl InvalidationRegistry {
    /// Returns the entry that governs `attribute` on `class`.
    ///
    /// Walks from `class` up its base chain and returns the first
    /// declaration found, so a derived class's override shadows its bases.
    /// Unknown classes have no metadata.
    #[must_use]
    pub fn lookup(&self, class: ClassId, attribute: AttributeId) -> Option<&MetadataEntry> {
        let mut current = Some(class);
        while let Some(class) = current {
            if let Some(entry) = self.entries.get(&(class, attribute)) {
                return Some(entry);
            }
            current = self.base(class);
        }
        None
    }

    /// Returns every entry in effect for `class`, most-derived first.
    #[must_use]
    pub fn effective(&self, class: ClassId) -> Vec<&MetadataEntry> {
        let mut out: Vec<&MetadataEntry> = Vec::new();
        let mut current = Some(class);
        while let Some(class) = current {
            let span = (class, AttributeId::new(0))..=(class, AttributeId::new(u16::MAX));
            for (_, entry) in self.entries.range(span) {
                if !out.iter().any(|e| e.attribute == entry.attribute) {
                    out.push(entry);
                }
            }
            current = self.base(class);
        }
        out
    }

    /// Returns a class's base, if any.
    #[must_use]
    pub fn base(&self, class: ClassId) -> Option<ClassId> {
        self.classes.get(class.0 as usize).and_then(|c| c.base)
    }

    /// Returns a class's name.
    #[must_use]
    pub fn name(&self, class: ClassId) -> Option<&'static str> {
        self.classes.get(class.0 as usize).map(|c| c.name)
    }

    /// Returns whether `class` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = self.base(class);
        }
        false
    }

    /// Returns the number of defined classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}
