//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** - they have no
/// identity of their own (a permission id or an organization slug is the same
/// value wherever it appears). To "modify" one, construct a new value.
///
/// The bounds keep implementations cheap to copy around and directly
/// comparable, which is what lets them behave like primitives at call sites.
pub trait ValueObject: Clone + PartialEq {}
