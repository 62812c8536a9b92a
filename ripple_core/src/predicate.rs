// Copyright 2026 the Ripple Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-specific filters for invalidation metadata.
//!
//! A [`Predicate`] sees the driving attribute's old and new value and decides
//! whether the write invalidates anything. Predicates are plain functions so
//! registries stay `Copy`-cheap to query and trivially `Send + Sync`.

use crate::attribute::Value;

/// Decides whether a write from `old` to `new` should invalidate.
pub type Predicate = fn(old: &Value, new: &Value) -> bool;

/// Passes only when a rectangle's size changed.
///
/// Moving a rectangle without resizing it does not pass. Values that are not
/// rectangles (or sizes) fall back to [`value_changed`].
#[must_use]
pub fn size_changed(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Rect(old), Value::Rect(new)) => old.size() != new.size(),
        (Value::Size(old), Value::Size(new)) => old != new,
        _ => value_changed(old, new),
    }
}

/// Passes only when a rectangle's origin (or a point) moved.
#[must_use]
pub fn position_changed(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Rect(old), Value::Rect(new)) => old.origin() != new.origin(),
        (Value::Point(old), Value::Point(new)) => old != new,
        _ => value_changed(old, new),
    }
}

/// Passes when the value differs in any way.
#[must_use]
pub fn value_changed(old: &Value, new: &Value) -> bool {
    old != new
}
