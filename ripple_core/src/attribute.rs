// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute identities, values, and sparse per-object storage.
//!
//! An attribute is identified process-wide by an [`AttributeId`]. Typed
//! access goes through an [`Attribute<T>`] token, normally a `const` declared
//! next to the type that exposes it (see [`geometry`](crate::geometry) and
//! [`element`](crate::element)). Two objects of the same kind share the same
//! tokens; only values are per-object.
//!
//! Values are stored type-erased as [`Value`] in an [`AttributeMap`], which
//! only allocates for attributes that were actually written. Reading an
//! unwritten attribute yields the token's default.

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use kurbo::{Insets, Point, Rect, Size};

use crate::element::Stretch;
use crate::geometry::{FillRule, SweepDirection};

/// Process-wide identity of a named attribute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(u16);

impl AttributeId {
    /// Creates an identity from its raw value.
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

impl fmt::Debug for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeId({:#06x})", self.0)
    }
}

/// A type-erased attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A flag.
    Bool(bool),
    /// A scalar such as an angle or a thickness.
    Scalar(f64),
    /// A point.
    Point(Point),
    /// A size.
    Size(Size),
    /// A rectangle (position and size).
    Rect(Rect),
    /// Per-edge distances such as a margin.
    Insets(Insets),
    /// A polyline's points.
    Points(Vec<Point>),
    /// An arc sweep direction.
    Sweep(SweepDirection),
    /// A fill rule.
    FillRule(FillRule),
    /// A stretch mode.
    Stretch(Stretch),
}

/// A Rust type that can be stored as a [`Value`].
pub trait AttributeValue: Clone + PartialEq + 'static {
    /// Wraps the value.
    fn into_value(self) -> Value;

    /// Unwraps a value of the matching variant.
    fn from_value(value: &Value) -> Option<Self>;

    /// Whether writing `other` over `self` leaves the value unchanged.
    ///
    /// Defaults to `==`. The `f64` implementation treats every NaN as the
    /// same value.
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! attribute_value {
    ($ty:ty, $variant:ident) => {
        attribute_value!($ty, $variant, |a, b| a == b);
    };
    ($ty:ty, $variant:ident, |$a:ident, $b:ident| $same:expr) => {
        impl AttributeValue for $ty {
            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            #[inline]
            fn same_value(&self, other: &Self) -> bool {
                let ($a, $b) = (self, other);
                $same
            }
        }
    };
}

attribute_value!(bool, Bool);
attribute_value!(f64, Scalar, |a, b| a == b || (a.is_nan() && b.is_nan()));
attribute_value!(Point, Point);
attribute_value!(Size, Size);
attribute_value!(Rect, Rect);
attribute_value!(Insets, Insets);
attribute_value!(Vec<Point>, Points);
attribute_value!(SweepDirection, Sweep);
attribute_value!(FillRule, FillRule);
attribute_value!(Stretch, Stretch);

/// A typed attribute token.
///
/// Tokens are plain `Copy` data and are meant to be declared as constants:
///
/// ```
/// use ripple_core::attribute::{Attribute, AttributeId};
///
/// fn one() -> f64 {
///     1.0
/// }
///
/// const OPACITY: Attribute<f64> = Attribute::new(AttributeId::new(0x7001), "Opacity", one);
/// assert_eq!(OPACITY.name(), "Opacity");
/// assert_eq!(OPACITY.default_value(), 1.0);
/// ```
pub struct Attribute<T> {
    id: AttributeId,
    name: &'static str,
    default: fn() -> T,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Attribute<T> {
    /// Declares a token.
    #[must_use]
    pub const fn new(id: AttributeId, name: &'static str, default: fn() -> T) -> Self {
        Self {
            id,
            name,
            default,
            _ty: PhantomData,
        }
    }

    /// Returns the process-wide identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> AttributeId {
        self.id
    }

    /// Returns the attribute's name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the value reported before the attribute is first written.
    #[must_use]
    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Attribute<T> {}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute({}, {:?})", self.name, self.id)
    }
}

impl<T> From<Attribute<T>> for AttributeId {
    fn from(attr: Attribute<T>) -> Self {
        attr.id
    }
}

/// Sparse attribute storage for one object.
///
/// Entries are kept sorted by [`AttributeId`]; objects typically carry a
/// handful of written attributes, so a sorted vector beats a map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeMap {
    entries: Vec<(AttributeId, Value)>,
}

impl AttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the stored value for `id`, if it was written.
    #[must_use]
    pub fn get(&self, id: AttributeId) -> Option<&Value> {
        self.position(id).ok().map(|i| &self.entries[i].1)
    }

    /// Stores a value, returning the previous one.
    pub fn insert(&mut self, id: AttributeId, value: Value) -> Option<Value> {
        match self.position(id) {
            Ok(i) => Some(core::mem::replace(&mut self.entries[i].1, value)),
            Err(i) => {
                self.entries.insert(i, (id, value));
                None
            }
        }
    }

    /// Removes a stored value, returning it.
    pub fn remove(&mut self, id: AttributeId) -> Option<Value> {
        self.position(id).ok().map(|i| self.entries.remove(i).1)
    }

    /// Returns the number of written attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no attribute was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates written attributes in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeId, &Value)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    /// Typed read with default fallback.
    #[must_use]
    pub fn read<T: AttributeValue>(&self, attr: Attribute<T>) -> T {
        self.get(attr.id())
            .and_then(T::from_value)
            .unwrap_or_else(|| attr.default_value())
    }

    fn position(&self, id: AttributeId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn zero() -> f64 {
        0.0
    }

    const ANGLE: Attribute<f64> = Attribute::new(AttributeId::new(0x7f01), "Angle", zero);

    #[test]
    fn read_falls_back_to_default() {
        let map = AttributeMap::new();
        assert_eq!(map.read(ANGLE), 0.0);
        assert!(map.is_empty());
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut map = AttributeMap::new();
        assert_eq!(map.insert(ANGLE.id(), Value::Scalar(90.0)), None);
        assert_eq!(
            map.insert(ANGLE.id(), Value::Scalar(45.0)),
            Some(Value::Scalar(90.0))
        );
        assert_eq!(map.read(ANGLE), 45.0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn entries_stay_sorted() {
        let mut map = AttributeMap::new();
        map.insert(AttributeId::new(9), Value::Bool(true));
        map.insert(AttributeId::new(2), Value::Bool(false));
        map.insert(AttributeId::new(5), Value::Points(vec![Point::ZERO]));
        let ids: alloc::vec::Vec<_> = map.iter().map(|(id, _)| id.raw()).collect();
        assert_eq!(ids, [2, 5, 9]);
        assert_eq!(map.remove(AttributeId::new(5)), Some(Value::Points(vec![Point::ZERO])));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn value_round_trips_through_typed_access() {
        let rect = Rect::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(Rect::from_value(&rect.into_value()), Some(rect));
        assert_eq!(bool::from_value(&Value::Scalar(1.0)), None);
    }
}
