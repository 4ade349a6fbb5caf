//! Decode outcomes.
//!
//! A malformed event must not abort a whole batch, so decoders always hand back
//! a value. [`Decoded`] pairs that value with every violation met on the way,
//! letting callers tell a complete event from a partially populated one
//! without comparing fields against their defaults.

use crate::error::{EventError, EventResult};

/// The result of decoding one event: a value plus the violations behind it.
///
/// Layers that halted keep the fields populated before the halt; the rest stay
/// at their defaults.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Decoded<T> {
    value: T,
    violations: Vec<EventError>,
}

impl<T> Decoded<T> {
    /// Wraps a fully populated value.
    pub fn complete(value: T) -> Self {
        Self {
            value,
            violations: Vec::new(),
        }
    }

    /// Wraps a value together with the violations met while building it.
    pub fn with_violations(value: T, violations: Vec<EventError>) -> Self {
        Self { value, violations }
    }

    /// Returns `true` if no violation was recorded.
    pub fn is_complete(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in the order they were encountered.
    pub fn violations(&self) -> &[EventError] {
        &self.violations
    }

    /// Borrows the decoded value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the value regardless of violations.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Splits into the value and its violations.
    pub fn into_parts(self) -> (T, Vec<EventError>) {
        (self.value, self.violations)
    }

    /// Returns the value only if it was fully populated.
    pub fn into_result(self) -> EventResult<T> {
        match self.violations.into_iter().next() {
            None => Ok(self.value),
            Some(err) => Err(err),
        }
    }

    /// Maps the value, keeping the violations.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            violations: self.violations,
        }
    }
}

impl<T: Default> Default for Decoded<T> {
    fn default() -> Self {
        Self::complete(T::default())
    }
}
