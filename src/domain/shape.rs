use crate::domain::model::{FieldSpec, FieldType, RawValue};
use crate::domain::ports::FieldShape;
use crate::domain::wrapper::Wrapper;
use crate::utils::error::FieldError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

fn decode<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, FieldError> {
    serde_json::from_value(value).map_err(|e| FieldError::Invalid {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Validator shared by every plain (non-wrapped, non-optional) field type.
pub fn plain_from_raw<T: DeserializeOwned>(
    field: &str,
    raw: Option<RawValue>,
) -> Result<T, FieldError> {
    match raw {
        None => Err(FieldError::Missing {
            field: field.to_string(),
        }),
        Some(RawValue::Boxed(wrapper)) if wrapper.is_none() => Err(FieldError::Missing {
            field: field.to_string(),
        }),
        Some(RawValue::Boxed(_)) => Err(FieldError::UnexpectedWrapper {
            field: field.to_string(),
        }),
        Some(RawValue::Bare(value)) => decode(field, value),
    }
}

impl<T: FieldShape + DeserializeOwned> FieldShape for Wrapper<T> {
    const TYPE: FieldType = FieldType::wrapper(T::TYPE.optional);

    fn from_raw(field: &str, raw: Option<RawValue>) -> Result<Self, FieldError> {
        let value = match raw {
            None => None,
            Some(RawValue::Boxed(wrapper)) => wrapper.into_option(),
            Some(RawValue::Bare(Value::Null)) if !T::TYPE.optional => None,
            Some(RawValue::Bare(value)) => Some(value),
        };
        match value {
            Some(value) => decode(field, value).map(Wrapper::present),
            None => Ok(Wrapper::absent()),
        }
    }

    fn to_raw(&self) -> serde_json::Result<RawValue> {
        let inner = match self.as_option() {
            Some(value) => Some(serde_json::to_value(value)?),
            None => None,
        };
        Ok(RawValue::Boxed(Wrapper::new(inner)))
    }
}

impl<T: FieldShape> FieldShape for Option<T> {
    const TYPE: FieldType = T::TYPE.optional();

    fn from_raw(field: &str, raw: Option<RawValue>) -> Result<Self, FieldError> {
        match raw {
            None | Some(RawValue::Bare(Value::Null)) => Ok(None),
            other => T::from_raw(field, other).map(Some),
        }
    }

    fn to_raw(&self) -> serde_json::Result<RawValue> {
        match self {
            Some(value) => value.to_raw(),
            None => Ok(RawValue::Bare(Value::Null)),
        }
    }
}

#[macro_export]
macro_rules! impl_plain_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::FieldShape for $ty {
                const TYPE: $crate::FieldType = $crate::FieldType::PLAIN;

                fn from_raw(
                    field: &str,
                    raw: ::std::option::Option<$crate::RawValue>,
                ) -> ::std::result::Result<Self, $crate::FieldError> {
                    $crate::domain::shape::plain_from_raw(field, raw)
                }
            }
        )*
    };
}

impl_plain_field!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, String,
    Value,
);

impl<T: DeserializeOwned + serde::Serialize> FieldShape for Vec<T> {
    const TYPE: FieldType = FieldType::PLAIN;

    fn from_raw(field: &str, raw: Option<RawValue>) -> Result<Self, FieldError> {
        plain_from_raw(field, raw)
    }
}

impl<V: DeserializeOwned + serde::Serialize> FieldShape for BTreeMap<String, V> {
    const TYPE: FieldType = FieldType::PLAIN;

    fn from_raw(field: &str, raw: Option<RawValue>) -> Result<Self, FieldError> {
        plain_from_raw(field, raw)
    }
}

impl<V: DeserializeOwned + serde::Serialize> FieldShape for HashMap<String, V> {
    const TYPE: FieldType = FieldType::PLAIN;

    fn from_raw(field: &str, raw: Option<RawValue>) -> Result<Self, FieldError> {
        plain_from_raw(field, raw)
    }
}

/// Schema entry for a field of type `T`, as emitted by `model!`. `required`
/// overrides the default computed from the type and the default value.
pub fn field_spec<T: FieldShape>(
    name: &str,
    annotation: &str,
    default: Option<T>,
    required: Option<bool>,
) -> FieldSpec {
    let mut spec = FieldSpec::new(name, T::TYPE).with_annotation(annotation);
    if let Some(default) = default {
        match default.to_raw() {
            Ok(raw) => spec = spec.with_default(raw),
            Err(e) => tracing::warn!("Default for field '{}' could not be encoded: {}", name, e),
        }
    }
    match required {
        Some(required) => spec.with_required(required),
        None => spec,
    }
}
