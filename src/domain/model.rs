use crate::domain::wrapper::Wrapper;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One incoming field value, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Bare(Value),
    Boxed(Wrapper<Value>),
}

impl RawValue {
    pub fn is_boxed(&self) -> bool {
        matches!(self, RawValue::Boxed(_))
    }

    /// True for an absent wrapper only; a bare `null` is a value.
    pub fn is_absent(&self) -> bool {
        matches!(self, RawValue::Boxed(w) if w.is_none())
    }

    /// The value as it goes over the wire.
    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Bare(value) => value.clone(),
            RawValue::Boxed(wrapper) => wrapper.as_option().cloned().unwrap_or(Value::Null),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Bare(value)
    }
}

impl From<Wrapper<Value>> for RawValue {
    fn from(wrapper: Wrapper<Value>) -> Self {
        RawValue::Boxed(wrapper)
    }
}

/// Field name to raw value, for a single construction attempt.
pub type RawFields = BTreeMap<String, RawValue>;

pub fn raw_fields_from_object(object: serde_json::Map<String, Value>) -> RawFields {
    object
        .into_iter()
        .map(|(name, value)| (name, RawValue::Bare(value)))
        .collect()
}

/// How a declared field type relates to `Wrapper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldType {
    /// `Wrapper<T>` or `Option<Wrapper<T>>`.
    pub wrapped: bool,
    /// The outer type accepts `None` (`Option<..>`).
    pub optional: bool,
    /// For wrapped fields, the wrapped `T` accepts `None`.
    pub inner_optional: bool,
}

impl FieldType {
    pub const PLAIN: FieldType = FieldType {
        wrapped: false,
        optional: false,
        inner_optional: false,
    };

    pub const fn wrapper(inner_optional: bool) -> Self {
        FieldType {
            wrapped: true,
            optional: false,
            inner_optional,
        }
    }

    pub const fn optional(self) -> Self {
        FieldType {
            optional: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    /// Declared type as written; `None` for schema-only fields.
    pub annotation: Option<String>,
    pub ty: FieldType,
    pub default: Option<RawValue>,
    pub required: bool,
}

impl FieldSpec {
    /// A field without a default is required unless its outer type accepts
    /// `None` or it is wrapped; a wrapped field falls back to an absent
    /// wrapper. Use [`FieldSpec::with_required`] to insist on a value.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            ty,
            default: None,
            required: !ty.optional && !ty.wrapped,
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Setting a default makes the field optional to supply.
    pub fn with_default(mut self, default: impl Into<RawValue>) -> Self {
        self.default = Some(default.into());
        self.required = false;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn is_wrapped(&self) -> bool {
        self.ty.wrapped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn defaults(&self) -> BTreeMap<&str, &RawValue> {
        self.fields
            .iter()
            .filter_map(|f| f.default.as_ref().map(|d| (f.name.as_str(), d)))
            .collect()
    }

    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Undeclared names are never wrapped.
    pub fn is_wrapped(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldSpec::is_wrapped)
    }
}
