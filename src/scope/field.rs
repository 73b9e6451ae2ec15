//! Managed field accessors.

use std::fmt;

use crate::error::FieldError;
use crate::value::FieldValue;

/// One external mutable value that a [`StateScope`](super::StateScope) may
/// capture and restore.
///
/// Both accessors take `&self`: the value lives outside the field (usually
/// behind a `Cell` owned by the host), and the field is only a view on it.
pub trait ManagedField {
    /// Stable name used in logs and restore failures.
    fn name(&self) -> &str;

    /// Read the current value.
    fn get(&self) -> FieldValue;

    /// Overwrite the current value.
    ///
    /// # Errors
    /// Returns a [`FieldError`] if the host refuses the write or the value has
    /// the wrong type for this field.
    fn set(&self, value: FieldValue) -> Result<(), FieldError>;
}

/// A [`ManagedField`] assembled from a getter/setter closure pair.
pub struct FieldAccessor<G, S> {
    name: String,
    getter: G,
    setter: S,
}

impl<G, S> FieldAccessor<G, S>
where
    G: Fn() -> FieldValue,
    S: Fn(FieldValue) -> Result<(), FieldError>,
{
    /// Create an accessor named `name`.
    pub fn new(name: impl Into<String>, getter: G, setter: S) -> Self {
        Self {
            name: name.into(),
            getter,
            setter,
        }
    }
}

impl<G, S> ManagedField for FieldAccessor<G, S>
where
    G: Fn() -> FieldValue,
    S: Fn(FieldValue) -> Result<(), FieldError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self) -> FieldValue {
        (self.getter)()
    }

    fn set(&self, value: FieldValue) -> Result<(), FieldError> {
        (self.setter)(value)
    }
}

impl<G, S> fmt::Debug for FieldAccessor<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
