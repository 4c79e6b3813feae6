use crate::core::coerce::Coercer;
use crate::domain::model::{raw_fields_from_object, ModelSchema, RawFields};
use crate::domain::ports::{Model, PreValidator};
use crate::utils::error::{FieldError, ModelError, Result};
use serde_json::Value;

pub fn construct<M: Model>(raw: RawFields) -> Result<M> {
    construct_with(&Coercer::default(), raw)
}

/// Runs `hook` on the raw mapping, checks required fields, then builds `M`.
/// Every field error is collected before giving up.
pub fn construct_with<M: Model, H: PreValidator>(hook: &H, raw: RawFields) -> Result<M> {
    let schema = M::schema();
    let fields = hook.pre_validate(schema, raw);
    let mut errors = missing_required(schema, &fields);

    match M::from_fields(fields) {
        Ok(model) if errors.is_empty() => Ok(model),
        Ok(_) => Err(ModelError::validation(&schema.name, errors)),
        Err(field_errors) => {
            for error in field_errors {
                if !errors.iter().any(|e| e.field() == error.field()) {
                    errors.push(error);
                }
            }
            tracing::debug!("{} rejected with {} field error(s)", schema.name, errors.len());
            Err(ModelError::validation(&schema.name, errors))
        }
    }
}

pub fn from_json<M: Model>(value: Value) -> Result<M> {
    construct(object_fields(&M::schema().name, value)?)
}

pub fn to_json<M: Model>(model: &M) -> Result<Value> {
    Ok(serde_json::to_value(model)?)
}

/// Splits a JSON object into bare raw values.
pub fn object_fields(model: &str, value: Value) -> Result<RawFields> {
    match value {
        Value::Object(object) => Ok(raw_fields_from_object(object)),
        other => Err(ModelError::validation(
            model,
            vec![FieldError::Invalid {
                field: "<root>".to_string(),
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }],
        )),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Required fields that are missing or hold an absent wrapper, in schema order.
pub fn missing_required(schema: &ModelSchema, fields: &RawFields) -> Vec<FieldError> {
    schema
        .fields
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| fields.get(&spec.name).map_or(true, |value| value.is_absent()))
        .map(|spec| FieldError::Missing {
            field: spec.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FieldSpec, FieldType, RawValue};
    use crate::domain::wrapper::Wrapper;
    use serde_json::json;

    #[test]
    fn test_missing_required() {
        let schema = ModelSchema::new(
            "M",
            vec![
                FieldSpec::new("a", FieldType::wrapper(false)).with_required(true),
                FieldSpec::new("b", FieldType::PLAIN),
                FieldSpec::new("c", FieldType::PLAIN.optional()),
            ],
        );
        let mut fields = RawFields::new();
        fields.insert("a".to_string(), RawValue::Boxed(Wrapper::absent()));
        fields.insert("b".to_string(), RawValue::Bare(json!(null)));

        let missing = missing_required(&schema, &fields);
        assert_eq!(
            missing,
            vec![FieldError::Missing {
                field: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_object_fields_rejects_non_objects() {
        let err = object_fields("M", json!([1, 2])).unwrap_err();
        assert_eq!(
            err.field_errors(),
            &[FieldError::Invalid {
                field: "<root>".to_string(),
                message: "expected a JSON object, found an array".to_string(),
            }]
        );
    }
}
