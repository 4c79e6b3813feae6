use crate::utils::error::{ModelError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Single-slot container that tells "no value was ever supplied" apart from
/// "a value was supplied", even when that value is itself `None`.
///
/// A `Wrapper<Option<i64>>` therefore has three states: absent,
/// present `None` and present `Some(n)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Wrapper<T> {
    slot: Option<T>,
}

impl<T> Wrapper<T> {
    pub fn new(value: Option<T>) -> Self {
        Self { slot: value }
    }

    pub fn present(value: T) -> Self {
        Self { slot: Some(value) }
    }

    pub fn absent() -> Self {
        Self { slot: None }
    }

    /// True when no value is held.
    pub fn is_none(&self) -> bool {
        self.slot.is_none()
    }

    pub fn is_some(&self) -> bool {
        self.slot.is_some()
    }

    /// Returns the held value, or `EmptyUnwrap` carrying `error_message`
    /// (or `"Value is None."`) when the wrapper is absent.
    pub fn unwrap(self, error_message: Option<&str>) -> Result<T> {
        self.slot.ok_or_else(|| ModelError::empty_unwrap(error_message))
    }

    /// Returns the held value, or `fallback` when absent. A `None` fallback is
    /// rejected with `InvalidFallback` whether or not a value is held.
    pub fn unwrap_or(self, fallback: Option<T>) -> Result<T> {
        let fallback = fallback.ok_or(ModelError::InvalidFallback)?;
        Ok(self.slot.unwrap_or(fallback))
    }

    pub fn as_ref(&self) -> Wrapper<&T> {
        Wrapper {
            slot: self.slot.as_ref(),
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn into_option(self) -> Option<T> {
        self.slot
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Wrapper<U> {
        Wrapper {
            slot: self.slot.map(f),
        }
    }
}

impl<T> Default for Wrapper<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> From<T> for Wrapper<T> {
    fn from(value: T) -> Self {
        Self::present(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Wrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wrapper({:?})", self.slot)
    }
}

impl<T: fmt::Debug> fmt::Display for Wrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Transparent on the wire: the held value, or null when absent.
impl<T: Serialize> Serialize for Wrapper<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.slot {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

// A key that is present always yields a present wrapper; a missing key is the
// caller's business (`#[serde(default)]` or the construction engine).
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Wrapper<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        T::deserialize(deserializer).map(Wrapper::present)
    }
}
