// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Write-time invalidation dispatch.
//!
//! [`InvalidationDispatcher::attribute_changed`] runs synchronously inside
//! every element attribute write. It consults the
//! [`InvalidationRegistry`], evaluates the entry's predicate (if any) on the
//! driving attribute's old and new value, and then invokes the
//! [`Invalidate`] entry point for each declared kind exactly once.

use alloc::sync::Arc;

use crate::attribute::{AttributeId, Value};
use crate::element::ElementId;
use crate::invalidation::{InvalidationKind, InvalidationKinds};
use crate::registry::{ClassId, InvalidationRegistry};
use crate::trace::{InvalidationEvent, PredicateEvent, Tracer};

/// Entry points that mark cached layout or render state stale.
///
/// Implementations must be idempotent: invalidating something already
/// invalid is a no-op. The dispatcher never recomputes layout itself.
pub trait Invalidate {
    /// The element's desired size must be recomputed.
    fn invalidate_measure(&mut self, element: ElementId);

    /// The element's final rectangle must be recomputed.
    fn invalidate_arrange(&mut self, element: ElementId);

    /// The element must be redrawn.
    fn invalidate_render(&mut self, element: ElementId);

    /// The element's cached defining geometry must be rebuilt.
    fn invalidate_geometry(&mut self, element: ElementId);

    /// Invokes the entry point for `kind`.
    fn invalidate(&mut self, element: ElementId, kind: InvalidationKind) {
        match kind {
            InvalidationKind::Measure => self.invalidate_measure(element),
            InvalidationKind::Arrange => self.invalidate_arrange(element),
            InvalidationKind::Render => self.invalidate_render(element),
            InvalidationKind::Geometry => self.invalidate_geometry(element),
        }
    }

    /// Drops any state held for a destroyed element.
    fn forget(&mut self, element: ElementId) {
        _ = element;
    }
}

/// One attribute write, as seen by the dispatcher.
#[derive(Clone, Copy, Debug)]
pub struct AttributeWrite<'a> {
    /// The written element.
    pub element: ElementId,
    /// The element's runtime class.
    pub class: ClassId,
    /// The written attribute.
    pub attribute: AttributeId,
    /// Effective value before the write.
    pub old: &'a Value,
    /// Effective value after the write.
    pub new: &'a Value,
}

/// Maps attribute writes to invalidation requests.
#[derive(Clone, Debug)]
pub struct InvalidationDispatcher {
    registry: Arc<InvalidationRegistry>,
}

impl InvalidationDispatcher {
    /// Creates a dispatcher over a frozen registry.
    #[must_use]
    pub fn new(registry: Arc<InvalidationRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this dispatcher consults.
    #[must_use]
    pub fn registry(&self) -> &InvalidationRegistry {
        &self.registry
    }

    /// Handles one attribute write and returns what was invalidated.
    ///
    /// Attributes with no metadata for the element's class invalidate
    /// nothing. An entry whose predicate rejects the write invalidates
    /// nothing either.
    pub fn attribute_changed(
        &self,
        write: &AttributeWrite<'_>,
        target: &mut dyn Invalidate,
        tracer: &mut Tracer<'_>,
    ) -> InvalidationKinds {
        let Some(entry) = self.registry.lookup(write.class, write.attribute) else {
            return InvalidationKinds::EMPTY;
        };
        if let Some(predicate) = entry.predicate {
            let passed = predicate(write.old, write.new);
            tracer.predicate(&PredicateEvent {
                element: write.element,
                attribute: write.attribute,
                passed,
            });
            if !passed {
                return InvalidationKinds::EMPTY;
            }
        }
        for kind in entry.kinds.iter() {
            tracer.invalidation(&InvalidationEvent {
                element: write.element,
                kind,
                attribute: write.attribute,
            });
            target.invalidate(write.element, kind);
        }
        entry.kinds
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Rect;

    use super::*;
    use crate::predicate::size_changed;
    use crate::registry::RegistryBuilder;

    #[derive(Default)]
    struct Calls(Vec<(ElementId, InvalidationKind)>);

    impl Invalidate for Calls {
        fn invalidate_measure(&mut self, element: ElementId) {
            self.0.push((element, InvalidationKind::Measure));
        }
        fn invalidate_arrange(&mut self, element: ElementId) {
            self.0.push((element, InvalidationKind::Arrange));
        }
        fn invalidate_render(&mut self, element: ElementId) {
            self.0.push((element, InvalidationKind::Render));
        }
        fn invalidate_geometry(&mut self, element: ElementId) {
            self.0.push((element, InvalidationKind::Geometry));
        }
    }

    const FOO: AttributeId = AttributeId::new(0x7001);
    const BOUNDS: AttributeId = AttributeId::new(0x7002);
    const UNREGISTERED: AttributeId = AttributeId::new(0x7003);

    fn dispatcher() -> (InvalidationDispatcher, ClassId) {
        let mut builder = RegistryBuilder::new();
        let class = builder.define_class("Test", None).unwrap();
        builder
            .register(
                class,
                FOO,
                InvalidationKinds::MEASURE | InvalidationKinds::RENDER,
                None,
            )
            .unwrap();
        builder
            .register(class, BOUNDS, InvalidationKinds::GEOMETRY, Some(size_changed))
            .unwrap();
        (InvalidationDispatcher::new(Arc::new(builder.build())), class)
    }

    fn write<'a>(
        class: ClassId,
        attribute: AttributeId,
        old: &'a Value,
        new: &'a Value,
    ) -> AttributeWrite<'a> {
        AttributeWrite {
            element: ElementId::from_parts(0, 0),
            class,
            attribute,
            old,
            new,
        }
    }

    #[test]
    fn unconditional_entry_calls_each_kind_once() {
        let (dispatcher, class) = dispatcher();
        let mut calls = Calls::default();
        let (old, new) = (Value::Bool(false), Value::Bool(true));
        let kinds = dispatcher.attribute_changed(
            &write(class, FOO, &old, &new),
            &mut calls,
            &mut Tracer::none(),
        );
        assert_eq!(kinds, InvalidationKinds::MEASURE | InvalidationKinds::RENDER);
        let element = ElementId::from_parts(0, 0);
        assert_eq!(
            calls.0,
            [
                (element, InvalidationKind::Measure),
                (element, InvalidationKind::Render)
            ]
        );
    }

    #[test]
    fn size_predicate_filters_pure_moves() {
        let (dispatcher, class) = dispatcher();
        let mut calls = Calls::default();
        let old = Value::Rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let moved = Value::Rect(Rect::new(100.0, 100.0, 200.0, 200.0));
        let resized = Value::Rect(Rect::new(100.0, 100.0, 300.0, 250.0));

        let kinds = dispatcher.attribute_changed(
            &write(class, BOUNDS, &old, &moved),
            &mut calls,
            &mut Tracer::none(),
        );
        assert!(kinds.is_empty(), "position-only change must not invalidate");
        assert!(calls.0.is_empty());

        let kinds = dispatcher.attribute_changed(
            &write(class, BOUNDS, &moved, &resized),
            &mut calls,
            &mut Tracer::none(),
        );
        assert_eq!(kinds, InvalidationKinds::GEOMETRY);
        assert_eq!(calls.0.len(), 1);
    }

    #[test]
    fn unregistered_attribute_invalidates_nothing() {
        let (dispatcher, class) = dispatcher();
        let mut calls = Calls::default();
        let (old, new) = (Value::Scalar(0.0), Value::Scalar(1.0));
        let kinds = dispatcher.attribute_changed(
            &write(class, UNREGISTERED, &old, &new),
            &mut calls,
            &mut Tracer::none(),
        );
        assert!(kinds.is_empty());
        assert!(calls.0.is_empty());
    }
}
