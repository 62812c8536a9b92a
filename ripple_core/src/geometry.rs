// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path-geometry vocabulary.
//!
//! A path geometry is a [`RootId`] owning a collection of figures; each
//! figure is a [`CompositeId`] owning a collection of segments; each segment
//! is a [`LeafId`] of some [`SegmentKind`]. Every attribute below is
//! observable: writing it raises `Changed` on the node and, through the
//! owning collections, on the path.
//!
//! ```
//! use kurbo::{Point, Size};
//! use ripple_core::geometry::{SegmentKind, segment};
//! use ripple_core::node::NodeStore;
//!
//! let mut store = NodeStore::new();
//! let arc = store.create_leaf(SegmentKind::Arc);
//! let figure = store.create_figure(&[arc]).unwrap();
//! let path = store.create_path(&[figure]).unwrap();
//!
//! store.set(arc, segment::SIZE, Size::new(20.0, 20.0));
//! assert_eq!(store.get(arc, segment::SIZE), Size::new(20.0, 20.0));
//! assert_eq!(store.root_of(arc), Some(path));
//! ```

use kurbo::{Point, Size};

use crate::attribute::{Attribute, AttributeId};
use crate::error::TreeError;
use crate::node::{CompositeId, LeafId, NodeStore, RootId};

/// The shape a segment contributes to its figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// An elliptical arc.
    Arc,
    /// A straight line.
    Line,
    /// A cubic Bézier curve.
    Bezier,
    /// A quadratic Bézier curve.
    QuadraticBezier,
    /// A run of straight lines.
    PolyLine,
    /// A run of cubic Bézier curves.
    PolyBezier,
}

impl SegmentKind {
    /// Returns the attributes a segment of this kind exposes.
    #[must_use]
    pub fn attributes(self) -> &'static [AttributeId] {
        match self {
            Self::Arc => segment::ARC,
            Self::Line => segment::LINE,
            Self::Bezier => segment::BEZIER,
            Self::QuadraticBezier => segment::QUADRATIC_BEZIER,
            Self::PolyLine | Self::PolyBezier => segment::POLY,
        }
    }
}

/// Direction in which an arc is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SweepDirection {
    /// Positive-angle direction.
    #[default]
    Clockwise,
    /// Negative-angle direction.
    CounterClockwise,
}

/// How the interior of a path is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Alternate inside/outside on every crossing.
    #[default]
    EvenOdd,
    /// Inside wherever the winding number is non-zero.
    NonZero,
}

fn origin() -> Point {
    Point::ZERO
}

fn empty_size() -> Size {
    Size::ZERO
}

fn yes() -> bool {
    true
}

fn no() -> bool {
    false
}

fn zero() -> f64 {
    0.0
}

/// Segment attributes.
pub mod segment {
    use alloc::vec::Vec;

    use kurbo::{Point, Size};

    use super::{SweepDirection, empty_size, no, origin, yes, zero};
    use crate::attribute::{Attribute, AttributeId};

    fn clockwise() -> SweepDirection {
        SweepDirection::Clockwise
    }

    fn no_points() -> Vec<Point> {
        Vec::new()
    }

    /// End point of an arc or line.
    pub const POINT: Attribute<Point> = Attribute::new(AttributeId::new(0x0101), "Point", origin);
    /// Radii of an arc.
    pub const SIZE: Attribute<Size> = Attribute::new(AttributeId::new(0x0102), "Size", empty_size);
    /// Whether an arc takes the longer way round.
    pub const IS_LARGE_ARC: Attribute<bool> =
        Attribute::new(AttributeId::new(0x0103), "IsLargeArc", no);
    /// Direction of an arc.
    pub const SWEEP_DIRECTION: Attribute<SweepDirection> =
        Attribute::new(AttributeId::new(0x0104), "SweepDirection", clockwise);
    /// X-axis rotation of an arc, in degrees.
    pub const ROTATION_ANGLE: Attribute<f64> =
        Attribute::new(AttributeId::new(0x0105), "RotationAngle", zero);
    /// First control point of a Bézier.
    pub const POINT1: Attribute<Point> = Attribute::new(AttributeId::new(0x0106), "Point1", origin);
    /// Second control point (cubic) or end point (quadratic) of a Bézier.
    pub const POINT2: Attribute<Point> = Attribute::new(AttributeId::new(0x0107), "Point2", origin);
    /// End point of a cubic Bézier.
    pub const POINT3: Attribute<Point> = Attribute::new(AttributeId::new(0x0108), "Point3", origin);
    /// Points of a poly segment.
    pub const POINTS: Attribute<Vec<Point>> =
        Attribute::new(AttributeId::new(0x0109), "Points", no_points);
    /// Whether the segment is stroked.
    pub const IS_STROKED: Attribute<bool> =
        Attribute::new(AttributeId::new(0x010a), "IsStroked", yes);

    pub(super) const ARC: &[AttributeId] = &[
        POINT.id(),
        SIZE.id(),
        IS_LARGE_ARC.id(),
        SWEEP_DIRECTION.id(),
        ROTATION_ANGLE.id(),
        IS_STROKED.id(),
    ];
    pub(super) const LINE: &[AttributeId] = &[POINT.id(), IS_STROKED.id()];
    pub(super) const BEZIER: &[AttributeId] =
        &[POINT1.id(), POINT2.id(), POINT3.id(), IS_STROKED.id()];
    pub(super) const QUADRATIC_BEZIER: &[AttributeId] =
        &[POINT1.id(), POINT2.id(), IS_STROKED.id()];
    pub(super) const POLY: &[AttributeId] = &[POINTS.id(), IS_STROKED.id()];
}

/// Figure attributes. A figure's segments are its child collection.
pub mod figure {
    use kurbo::Point;

    use super::{no, origin, yes};
    use crate::attribute::{Attribute, AttributeId};

    /// Where the figure starts.
    pub const START_POINT: Attribute<Point> =
        Attribute::new(AttributeId::new(0x0201), "StartPoint", origin);
    /// Whether the last segment joins back to the start.
    pub const IS_CLOSED: Attribute<bool> =
        Attribute::new(AttributeId::new(0x0202), "IsClosed", no);
    /// Whether the figure's interior is filled.
    pub const IS_FILLED: Attribute<bool> =
        Attribute::new(AttributeId::new(0x0203), "IsFilled", yes);

    /// Every figure attribute.
    pub const ALL: &[AttributeId] = &[START_POINT.id(), IS_CLOSED.id(), IS_FILLED.id()];
}

/// Path geometry attributes. A path's figures are its child collection.
pub mod path {
    use super::FillRule;
    use crate::attribute::{Attribute, AttributeId};

    fn even_odd() -> FillRule {
        FillRule::EvenOdd
    }

    /// Fill rule of the path.
    pub const FILL_RULE: Attribute<FillRule> =
        Attribute::new(AttributeId::new(0x0301), "FillRule", even_odd);

    /// Every path attribute.
    pub const ALL: &[AttributeId] = &[FILL_RULE.id()];
}

impl NodeStore {
    /// Creates a figure owning a fresh collection of `segments`.
    ///
    /// # Errors
    ///
    /// Fails if a segment is already owned or repeated.
    pub fn create_figure(&mut self, segments: &[LeafId]) -> Result<CompositeId, TreeError> {
        let collection = self.create_collection::<LeafId>();
        if let Err(err) = self.assign(collection, segments) {
            self.discard(collection);
            return Err(err);
        }
        let figure = self.create_composite();
        self.set_children(figure, Some(collection))?;
        Ok(figure)
    }

    /// Creates a path geometry owning a fresh collection of `figures`.
    ///
    /// # Errors
    ///
    /// Fails if a figure is already owned or repeated.
    pub fn create_path(&mut self, figures: &[CompositeId]) -> Result<RootId, TreeError> {
        let collection = self.create_collection::<CompositeId>();
        if let Err(err) = self.assign(collection, figures) {
            self.discard(collection);
            return Err(err);
        }
        let path = self.create_root();
        self.set_figures(path, Some(collection))?;
        Ok(path)
    }

    /// Creates an arc segment.
    pub fn create_arc(
        &mut self,
        point: Point,
        size: Size,
        rotation_angle: f64,
        is_large_arc: bool,
        sweep: SweepDirection,
    ) -> LeafId {
        let arc = self.create_leaf(SegmentKind::Arc);
        self.store_silently(arc, segment::POINT, point);
        self.store_silently(arc, segment::SIZE, size);
        self.store_silently(arc, segment::ROTATION_ANGLE, rotation_angle);
        self.store_silently(arc, segment::IS_LARGE_ARC, is_large_arc);
        self.store_silently(arc, segment::SWEEP_DIRECTION, sweep);
        arc
    }

    /// Creates a line segment.
    pub fn create_line(&mut self, point: Point) -> LeafId {
        let line = self.create_leaf(SegmentKind::Line);
        self.store_silently(line, segment::POINT, point);
        line
    }

    fn store_silently<T: crate::attribute::AttributeValue>(
        &mut self,
        leaf: LeafId,
        attr: Attribute<T>,
        value: T,
    ) {
        // A fresh leaf has no subscribers, so this cannot notify anyone.
        self.attributes[leaf.0.idx as usize].insert(attr.id(), value.into_value());
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use kurbo::{Point, Size};

    use super::*;

    fn counter(store: &mut NodeStore, path: RootId) -> Rc<Cell<u32>> {
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        store.subscribe(path, move |_, _| seen.set(seen.get() + 1));
        fired
    }

    #[test]
    fn arc_segment_fires_path_once_per_attribute_write() {
        let mut store = NodeStore::new();
        let arc = store.create_leaf(SegmentKind::Arc);
        let figure = store.create_figure(&[arc]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        let fired = counter(&mut store, path);

        store.set(arc, segment::POINT, Point::new(1.0, 1.0));
        assert_eq!(fired.get(), 1, "Point");
        store.set(arc, segment::SIZE, Size::new(20.0, 20.0));
        assert_eq!(fired.get(), 2, "Size");
        store.set(arc, segment::IS_LARGE_ARC, true);
        assert_eq!(fired.get(), 3, "IsLargeArc");
        store.set(arc, segment::SWEEP_DIRECTION, SweepDirection::CounterClockwise);
        assert_eq!(fired.get(), 4, "SweepDirection");
        store.set(arc, segment::ROTATION_ANGLE, 90.0);
        assert_eq!(fired.get(), 5, "RotationAngle");
    }

    #[test]
    fn preconfigured_arc_still_propagates() {
        let mut store = NodeStore::new();
        let arc = store.create_arc(
            Point::new(5.0, 5.0),
            Size::new(10.0, 10.0),
            0.0,
            false,
            SweepDirection::Clockwise,
        );
        let figure = store.create_figure(&[arc]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        let fired = counter(&mut store, path);

        store.set(arc, segment::SIZE, Size::new(20.0, 20.0));
        assert_eq!(fired.get(), 1);
        assert_eq!(store.get(arc, segment::POINT), Point::new(5.0, 5.0));
    }

    #[test]
    fn bezier_segments_propagate_every_control_point() {
        let mut store = NodeStore::new();
        let cubic = store.create_leaf(SegmentKind::Bezier);
        let quad = store.create_leaf(SegmentKind::QuadraticBezier);
        let figure = store.create_figure(&[cubic, quad]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        let fired = counter(&mut store, path);

        store.set(cubic, segment::POINT1, Point::new(1.0, 1.0));
        store.set(cubic, segment::POINT2, Point::new(2.0, 2.0));
        store.set(cubic, segment::POINT3, Point::new(3.0, 3.0));
        store.set(quad, segment::POINT1, Point::new(1.0, 1.0));
        store.set(quad, segment::POINT2, Point::new(1.0, 1.0));
        assert_eq!(fired.get(), 5);
    }

    #[test]
    fn poly_segments_propagate_point_list_replacement() {
        let mut store = NodeStore::new();
        let line = store.create_leaf(SegmentKind::PolyLine);
        let bezier = store.create_leaf(SegmentKind::PolyBezier);
        store.set(line, segment::POINTS, vec![Point::ZERO]);
        store.set(bezier, segment::POINTS, vec![Point::ZERO]);
        let figure = store.create_figure(&[line, bezier]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        let fired = counter(&mut store, path);

        store.set(line, segment::POINTS, vec![]);
        assert_eq!(fired.get(), 1, "PolyLine points");
        store.set(bezier, segment::POINTS, vec![]);
        assert_eq!(fired.get(), 2, "PolyBezier points");
    }

    #[test]
    fn figure_attributes_and_segments_propagate() {
        let mut store = NodeStore::new();
        let figure = store.create_figure(&[]).unwrap();
        let path = store.create_path(&[figure]).unwrap();
        let fired = counter(&mut store, path);

        store.set(figure, figure::IS_CLOSED, true);
        assert_eq!(fired.get(), 1, "IsClosed");
        store.set(figure, figure::IS_FILLED, true);
        assert_eq!(fired.get(), 2, "IsFilled");

        let poly = store.create_leaf(SegmentKind::PolyLine);
        store.set(poly, segment::POINTS, vec![Point::new(1.0, 1.0)]);
        let segments = store.create_collection::<LeafId>();
        store.assign(segments, &[poly]).unwrap();
        store.set_children(figure, Some(segments)).unwrap();
        assert_eq!(fired.get(), 3, "Segments");

        store.set(poly, segment::POINTS, vec![]);
        assert_eq!(fired.get(), 4, "new segment is observed");
    }

    #[test]
    fn path_attribute_fires_path() {
        let mut store = NodeStore::new();
        let path = store.create_path(&[]).unwrap();
        let fired = counter(&mut store, path);
        store.set(path, path::FILL_RULE, FillRule::NonZero);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn failed_figure_creation_leaves_segment_with_its_owner() {
        let mut store = NodeStore::new();
        let line = store.create_line(Point::new(1.0, 0.0));
        let first = store.create_figure(&[line]).unwrap();
        let err = store.create_figure(&[line]).unwrap_err();
        assert!(matches!(err, TreeError::AlreadyOwned { .. }));
        let owner = store.owner(line).unwrap();
        assert_eq!(store.owner(owner), Some(first.0));
        assert!(store.check_invariants());
    }

    #[test]
    #[should_panic(expected = "is not exposed by Line segments")]
    fn undeclared_segment_attribute_panics() {
        let mut store = NodeStore::new();
        let line = store.create_leaf(SegmentKind::Line);
        store.set(line, segment::SIZE, Size::new(1.0, 1.0));
    }
}
