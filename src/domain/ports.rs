use crate::domain::model::{FieldSpec, FieldType, ModelSchema, RawFields, RawValue};
use crate::utils::error::{FieldError, Result};
use serde::Serialize;

/// Compile-time classification of a field type, plus its per-type validator.
///
/// Implemented for `Wrapper<T>`, `Option<T>` and plain types. Plain types
/// declared outside this crate opt in with `impl_plain_field!`.
pub trait FieldShape: Sized + Serialize {
    const TYPE: FieldType;

    /// Builds the field from its normalized raw value; `None` means the key
    /// was not in the mapping at all.
    fn from_raw(field: &str, raw: Option<RawValue>) -> std::result::Result<Self, FieldError>;

    /// Raw form used when this value is recorded as a schema default.
    fn to_raw(&self) -> serde_json::Result<RawValue> {
        serde_json::to_value(self).map(RawValue::Bare)
    }
}

/// A record type with a static schema. Usually generated by `model!`.
pub trait Model: Sized + Serialize {
    fn schema() -> &'static ModelSchema;

    fn from_fields(fields: RawFields) -> std::result::Result<Self, Vec<FieldError>>;

    fn construct(raw: RawFields) -> Result<Self> {
        crate::core::engine::construct(raw)
    }

    fn from_json(value: serde_json::Value) -> Result<Self> {
        crate::core::engine::from_json(value)
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        crate::core::engine::to_json(self)
    }
}

/// Hook run once per construction on the whole raw mapping.
pub trait PreValidator {
    fn pre_validate(&self, schema: &ModelSchema, raw: RawFields) -> RawFields;
}

/// Hook run once per declared field with that field's raw value.
pub trait FieldHook {
    fn pre_validate_field(&self, spec: &FieldSpec, raw: Option<RawValue>) -> Option<RawValue>;
}
