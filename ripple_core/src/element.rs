// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UI elements whose attribute writes drive invalidation.
//!
//! An [`ElementStore`] owns elements, each tagged with a [`ClassId`] and an
//! [`AttributeMap`]. Every [`set`](ElementStore::set) passes the old and new
//! value to the [`InvalidationDispatcher`], which calls into the store's
//! [`Invalidate`] implementation before `set` returns.
//!
//! The built-in classes mirror a small retained UI framework:
//!
//! - [`LAYOUTABLE`] declares [`layoutable::WIDTH`], [`layoutable::HEIGHT`],
//!   [`layoutable::MARGIN`] and [`layoutable::IS_VISIBLE`] as affecting
//!   measure and [`layoutable::OPACITY`] as affecting render.
//!   [`layoutable::BOUNDS`] is written by arrange and has no metadata here.
//! - [`SHAPE`] derives from it and declares [`shape::STRETCH`] and
//!   [`shape::STROKE_THICKNESS`] as affecting geometry, and
//!   [`layoutable::BOUNDS`] as affecting geometry only when its size changes.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::attribute::{Attribute, AttributeMap, AttributeValue};
use crate::config::StoreConfig;
use crate::dispatch::{AttributeWrite, Invalidate, InvalidationDispatcher};
use crate::error::RegistryError;
use crate::invalidation::{InvalidationKind, InvalidationKinds};
use crate::layout::LayoutState;
use crate::predicate::size_changed;
use crate::registry::{ClassId, InvalidationRegistry, RegistryBuilder};
use crate::trace::{TraceSink, Tracer};

/// A handle to an element in an [`ElementStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ElementId {
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

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}@gen{})", self.idx, self.generation)
    }
}

/// How a shape's geometry is scaled to fill its bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stretch {
    /// Geometry keeps its natural size.
    #[default]
    None,
    /// Scaled non-uniformly to fill the bounds.
    Fill,
    /// Scaled uniformly to fit inside the bounds.
    Uniform,
    /// Scaled uniformly to cover the bounds, clipping the overflow.
    UniformToFill,
}

/// The base class of every layout participant.
pub const LAYOUTABLE: ClassId = ClassId::new(0);

/// Elements drawn from a defining geometry.
pub const SHAPE: ClassId = ClassId::new(1);

/// Attributes of [`LAYOUTABLE`].
pub mod layoutable {
    use kurbo::{Insets, Rect};

    use crate::attribute::{Attribute, AttributeId};

    fn auto() -> f64 {
        f64::NAN
    }

    fn no_margin() -> Insets {
        Insets::ZERO
    }

    fn empty() -> Rect {
        Rect::ZERO
    }

    fn visible() -> bool {
        true
    }

    fn opaque() -> f64 {
        1.0
    }

    /// Requested width; NaN means automatic.
    pub const WIDTH: Attribute<f64> = Attribute::new(AttributeId::new(0x1001), "Width", auto);
    /// Requested height; NaN means automatic.
    pub const HEIGHT: Attribute<f64> = Attribute::new(AttributeId::new(0x1002), "Height", auto);
    /// Outer spacing.
    pub const MARGIN: Attribute<Insets> =
        Attribute::new(AttributeId::new(0x1003), "Margin", no_margin);
    /// Whether the element takes part in layout.
    pub const IS_VISIBLE: Attribute<bool> =
        Attribute::new(AttributeId::new(0x1004), "IsVisible", visible);
    /// Opacity in `0.0..=1.0`.
    pub const OPACITY: Attribute<f64> = Attribute::new(AttributeId::new(0x1005), "Opacity", opaque);
    /// Rectangle assigned by the last arrange pass.
    pub const BOUNDS: Attribute<Rect> = Attribute::new(AttributeId::new(0x1006), "Bounds", empty);
}

/// Attributes of [`SHAPE`].
pub mod shape {
    use super::Stretch;
    use crate::attribute::{Attribute, AttributeId};

    fn no_stretch() -> Stretch {
        Stretch::None
    }

    fn hairline() -> f64 {
        0.0
    }

    /// Geometry scaling mode.
    pub const STRETCH: Attribute<Stretch> =
        Attribute::new(AttributeId::new(0x1101), "Stretch", no_stretch);
    /// Stroke width.
    pub const STROKE_THICKNESS: Attribute<f64> =
        Attribute::new(AttributeId::new(0x1102), "StrokeThickness", hairline);
}

impl RegistryBuilder {
    /// Creates a builder with [`LAYOUTABLE`] and [`SHAPE`] defined and their
    /// metadata registered.
    ///
    /// Application classes defined on the returned builder get ids after
    /// [`SHAPE`].
    ///
    /// # Errors
    ///
    /// Never fails on a fresh builder; the `Result` carries the registry's
    /// own error type through.
    pub fn framework() -> Result<Self, RegistryError> {
        let mut builder = Self::new();
        let layoutable = builder.define_class("Layoutable", None)?;
        let shape = builder.define_class("Shape", Some(layoutable))?;
        debug_assert_eq!((layoutable, shape), (LAYOUTABLE, SHAPE));

        builder.affects_measure(
            LAYOUTABLE,
            &[
                layoutable::WIDTH.id(),
                layoutable::HEIGHT.id(),
                layoutable::MARGIN.id(),
                layoutable::IS_VISIBLE.id(),
            ],
        )?;
        builder.affects_render(LAYOUTABLE, &[layoutable::OPACITY.id()])?;

        builder.affects_geometry(SHAPE, &[shape::STRETCH.id(), shape::STROKE_THICKNESS.id()])?;
        builder.register(
            SHAPE,
            layoutable::BOUNDS.id(),
            InvalidationKinds::GEOMETRY | InvalidationKinds::MEASURE,
            Some(size_changed),
        )?;
        Ok(builder)
    }
}

/// Struct-of-arrays storage for UI elements.
///
/// `L` receives the invalidation requests. The default, [`LayoutState`],
/// tracks validity per element and kind.
pub struct ElementStore<L = LayoutState> {
    class: Vec<ClassId>,
    attributes: Vec<AttributeMap>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,
    dispatcher: InvalidationDispatcher,
    layout: L,
    config: StoreConfig,
    sink: Option<Box<dyn TraceSink>>,
}

impl<L: fmt::Debug> fmt::Debug for ElementStore<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementStore")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("layout", &self.layout)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElementStore<LayoutState> {
    /// Creates a store with a fresh [`LayoutState`].
    ///
    /// Element writes use [`StoreConfig::DEDUPLICATED`]: writing an attribute
    /// to its current value neither notifies nor invalidates.
    #[must_use]
    pub fn new(registry: Arc<InvalidationRegistry>) -> Self {
        Self::with_layout(registry, LayoutState::new(), StoreConfig::DEDUPLICATED)
    }

    /// Simulates a completed measure pass: the element's desired size is
    /// valid again.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn measure(&mut self, element: ElementId) {
        self.validate(element);
        self.layout.mark_valid(element, InvalidationKinds::MEASURE);
    }

    /// Simulates a completed arrange pass into `rect`.
    ///
    /// An element that was not measured is measured first. The final
    /// rectangle is then written to [`layoutable::BOUNDS`] through the normal
    /// write path, so any metadata on `BOUNDS` applies. Returns what that
    /// write invalidated.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn arrange(&mut self, element: ElementId, rect: Rect) -> InvalidationKinds {
        self.validate(element);
        if !self.layout.is_valid(element, InvalidationKind::Measure) {
            self.layout.mark_valid(element, InvalidationKinds::MEASURE);
        }
        self.layout.mark_valid(element, InvalidationKinds::ARRANGE);
        self.set(element, layoutable::BOUNDS, rect)
    }

    /// Returns whether the element's desired size is valid.
    #[must_use]
    pub fn is_measure_valid(&self, element: ElementId) -> bool {
        self.validate(element);
        self.layout.is_valid(element, InvalidationKind::Measure)
    }

    /// Returns whether the element's final rectangle is valid.
    #[must_use]
    pub fn is_arrange_valid(&self, element: ElementId) -> bool {
        self.validate(element);
        self.layout.is_valid(element, InvalidationKind::Arrange)
    }
}

impl<L: Invalidate> ElementStore<L> {
    /// Creates a store that forwards invalidation requests to `layout`.
    #[must_use]
    pub fn with_layout(
        registry: Arc<InvalidationRegistry>,
        layout: L,
        config: StoreConfig,
    ) -> Self {
        Self {
            class: Vec::new(),
            attributes: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dispatcher: InvalidationDispatcher::new(registry),
            layout,
            config,
            sink: None,
        }
    }

    /// Installs (or removes) the trace sink.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.sink = sink;
    }

    /// Returns the invalidation target.
    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Returns the invalidation target mutably.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    /// Returns the registry consulted on writes.
    #[must_use]
    pub fn registry(&self) -> &InvalidationRegistry {
        self.dispatcher.registry()
    }

    /// Creates an element of `class` with every attribute at its default.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownClass`] if the registry does not
    /// define `class`.
    pub fn create_element(&mut self, class: ClassId) -> Result<ElementId, RegistryError> {
        if self.registry().name(class).is_none() {
            return Err(RegistryError::UnknownClass(class));
        }
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.class[i] = class;
            self.attributes[i].clear();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.class.push(class);
            self.attributes.push(AttributeMap::new());
            self.generation.push(0);
            idx
        };
        Ok(ElementId::from_parts(idx, self.generation[idx as usize]))
    }

    /// Destroys an element and drops its layout state.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, element: ElementId) {
        self.validate(element);
        let i = element.idx as usize;
        self.attributes[i].clear();
        self.generation[i] += 1;
        self.free_list.push(element.idx);
        self.layout.forget(element);
    }

    /// Returns whether the handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, element: ElementId) -> bool {
        element.idx < self.len && self.generation[element.idx as usize] == element.generation
    }

    /// Returns an element's class.
    #[must_use]
    pub fn class(&self, element: ElementId) -> ClassId {
        self.validate(element);
        self.class[element.idx as usize]
    }

    /// Reads an attribute, falling back to its default.
    #[must_use]
    pub fn get<T: AttributeValue>(&self, element: ElementId, attr: Attribute<T>) -> T {
        self.validate(element);
        self.attributes[element.idx as usize].read(attr)
    }

    /// Writes an attribute and dispatches invalidation synchronously.
    ///
    /// Returns the kinds that were invalidated.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set<T: AttributeValue>(
        &mut self,
        element: ElementId,
        attr: Attribute<T>,
        value: T,
    ) -> InvalidationKinds {
        self.validate(element);
        let i = element.idx as usize;
        let old = self.attributes[i].read(attr);
        if !self.config.should_notify(&old, &value) {
            return InvalidationKinds::EMPTY;
        }
        let old = old.into_value();
        let new = value.into_value();
        self.attributes[i].insert(attr.id(), new.clone());

        let write = AttributeWrite {
            element,
            class: self.class[i],
            attribute: attr.id(),
            old: &old,
            new: &new,
        };
        let mut tracer = Tracer::from_slot(&mut self.sink);
        self.dispatcher
            .attribute_changed(&write, &mut self.layout, &mut tracer)
    }

    fn validate(&self, element: ElementId) {
        assert!(
            self.is_alive(element),
            "stale ElementId: {element:?} (current gen: {})",
            if element.idx < self.len {
                self.generation[element.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}
