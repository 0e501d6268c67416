//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values
/// (`Quantity`, product prices). To "change" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
