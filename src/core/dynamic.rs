use crate::config::toml_config::{ModelConfig, NormalizerConfig, SchemaConfig};
use crate::core::annotation::{Classifier, ScalarKind, TypeAnnotation};
use crate::core::coerce::Coercer;
use crate::core::engine::{json_kind, missing_required, object_fields};
use crate::domain::model::{FieldSpec, ModelSchema, RawFields, RawValue};
use crate::utils::error::{FieldError, ModelError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON shape expected of one field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValueCheck {
    kind: ScalarKind,
    nullable: bool,
}

impl ValueCheck {
    fn verify(&self, field: &str, value: &RawValue) -> Option<FieldError> {
        let value = match value {
            RawValue::Bare(value) => value,
            RawValue::Boxed(wrapper) => wrapper.as_option()?,
        };
        if (value.is_null() && self.nullable) || self.kind.admits(value) {
            return None;
        }
        Some(FieldError::Invalid {
            field: field.to_string(),
            message: format!("expected {}, found {}", self.kind, json_kind(value)),
        })
    }
}

/// A model declared at runtime; fields are classified from their annotations.
#[derive(Debug, Clone)]
pub struct DynamicModel {
    schema: ModelSchema,
    coercer: Coercer,
    checks: BTreeMap<String, ValueCheck>,
}

impl DynamicModel {
    /// A model over a prebuilt schema. Values are checked for presence only.
    pub fn new(schema: ModelSchema, coercer: Coercer) -> Self {
        Self {
            schema,
            coercer,
            checks: BTreeMap::new(),
        }
    }

    pub fn from_config(model: &ModelConfig, normalizer: &NormalizerConfig) -> Result<Self> {
        let classifier = Classifier::new(normalizer.wrapper_names.clone());
        let mut fields = Vec::with_capacity(model.fields.len());
        let mut checks = BTreeMap::new();
        for field in &model.fields {
            let parsed = field.r#type.as_deref().map(TypeAnnotation::parse).transpose()?;
            let ty = classifier.classify(parsed.as_ref());
            if let Some(payload) = parsed.as_ref().and_then(|a| classifier.payload(a)) {
                if let Some(kind) = ScalarKind::of(payload) {
                    let nullable = ty.optional || payload.accepts_none();
                    checks.insert(field.name.clone(), ValueCheck { kind, nullable });
                }
            }
            let mut spec = FieldSpec::new(&field.name, ty);
            if let Some(annotation) = &field.r#type {
                spec = spec.with_annotation(annotation);
            }
            if let Some(default) = &field.default {
                spec = spec.with_default(serde_json::to_value(default)?);
            }
            if let Some(required) = field.required {
                spec = spec.with_required(required);
            }
            tracing::debug!(
                "{}.{}: wrapped={} optional={} required={}",
                model.name,
                spec.name,
                spec.ty.wrapped,
                spec.ty.optional,
                spec.required
            );
            fields.push(spec);
        }
        Ok(Self {
            schema: ModelSchema::new(&model.name, fields),
            coercer: Coercer::new(normalizer.seeding),
            checks,
        })
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn normalize(&self, raw: RawFields) -> RawFields {
        self.coercer.normalize(&self.schema, raw)
    }

    /// Normalizes `raw`, checks required fields, then checks scalar fields
    /// (`int`, `float`, `str`, `bool`) against the JSON kind of their value.
    /// Other types are accepted as given.
    pub fn construct(&self, raw: RawFields) -> Result<DynamicRecord> {
        let fields = self.normalize(raw);
        let mut errors = missing_required(&self.schema, &fields);
        for spec in &self.schema.fields {
            let (Some(check), Some(value)) = (self.checks.get(&spec.name), fields.get(&spec.name)) else {
                continue;
            };
            if errors.iter().any(|e| e.field() == spec.name) {
                continue;
            }
            errors.extend(check.verify(&spec.name, value));
        }
        if !errors.is_empty() {
            return Err(ModelError::validation(&self.schema.name, errors));
        }
        Ok(DynamicRecord {
            model: self.schema.name.clone(),
            fields,
        })
    }

    pub fn construct_json(&self, value: Value) -> Result<DynamicRecord> {
        self.construct(object_fields(&self.schema.name, value)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    model: String,
    fields: RawFields,
}

impl DynamicRecord {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// True when `field` holds an absent wrapper.
    pub fn is_absent(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(RawValue::is_absent)
    }

    pub fn fields(&self) -> &RawFields {
        &self.fields
    }

    pub fn into_fields(self) -> RawFields {
        self.fields
    }

    /// Wrappers encode as their held value, absent ones as `null`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// Every model of a schema file, by name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, DynamicModel>,
}

impl ModelRegistry {
    pub fn from_config(config: &SchemaConfig) -> Result<Self> {
        let mut models = BTreeMap::new();
        for model in &config.models {
            models.insert(model.name.clone(), DynamicModel::from_config(model, &config.normalizer)?);
        }
        tracing::debug!("Loaded {} model(s)", models.len());
        Ok(Self { models })
    }

    pub fn get(&self, name: &str) -> Result<&DynamicModel> {
        self.models.get(name).ok_or_else(|| ModelError::UnknownModel {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coerce::SeedingStrategy;
    use crate::domain::wrapper::Wrapper;
    use crate::utils::error::FieldError;
    use serde_json::json;

    fn registry(seeding: &str) -> ModelRegistry {
        let config = SchemaConfig::from_toml_str(&format!(
            r#"
[normalizer]
seeding = "{}"

[[models]]
name = "M"
fields = [
    {{ name = "a", type = "Wrapper[int]", default = 1 }},
    {{ name = "b", type = "Wrapper[int]", required = true }},
    {{ name = "c", type = "Optional[Wrapper[int]]" }},
    {{ name = "d", type = "Wrapper[int]", default = 3, required = true }},
    {{ name = "tag", type = "str", default = "t" }},
    {{ name = "meta" }},
]
"#,
            seeding
        ))
        .unwrap();
        ModelRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_classification_from_annotations() {
        let registry = registry("root");
        let schema = registry.get("M").unwrap().schema();
        assert!(schema.is_wrapped("a"));
        assert!(schema.is_wrapped("c"));
        assert!(!schema.is_wrapped("tag"));
        assert!(!schema.is_wrapped("meta"));
        assert_eq!(schema.required(), vec!["b", "d", "meta"]);
    }

    #[test]
    fn test_construct_root_seeding() {
        let registry = registry("root");
        let model = registry.get("M").unwrap();
        let record = model
            .construct_json(json!({ "b": 7, "d": 4, "meta": {"k": 1} }))
            .unwrap();
        assert_eq!(record.get("a"), Some(&RawValue::Boxed(Wrapper::present(json!(1)))));
        assert!(record.is_absent("c"));
        assert_eq!(
            record.to_json(),
            json!({ "a": 1, "b": 7, "c": null, "d": 4, "meta": {"k": 1}, "tag": "t" })
        );
    }

    #[test]
    fn test_required_field_with_default_depends_on_seeding() {
        let input = json!({ "b": 7, "meta": null });

        let err = registry("root").get("M").unwrap().construct_json(input.clone()).unwrap_err();
        assert_eq!(
            err.field_errors(),
            &[FieldError::Missing { field: "d".to_string() }]
        );

        let record = registry("per_field").get("M").unwrap().construct_json(input).unwrap();
        assert_eq!(record.get("d"), Some(&RawValue::Boxed(Wrapper::present(json!(3)))));
    }

    #[test]
    fn test_scalar_values_are_checked() {
        let registry = registry("root");
        let model = registry.get("M").unwrap();
        let err = model
            .construct_json(json!({ "b": "seven", "d": 4, "tag": 1, "meta": "anything" }))
            .unwrap_err();
        assert_eq!(
            err.field_errors(),
            &[
                FieldError::Invalid {
                    field: "b".to_string(),
                    message: "expected an integer, found a string".to_string(),
                },
                FieldError::Invalid {
                    field: "tag".to_string(),
                    message: "expected a string, found a number".to_string(),
                },
            ]
        );

        // optional wrapper: null is None, not a type error
        let err = model.construct_json(json!({ "b": 7, "c": null, "meta": 1 })).unwrap_err();
        assert_eq!(err.field_errors(), &[FieldError::Missing { field: "d".to_string() }]);
        let record = model.construct_json(json!({ "b": 7, "c": null, "d": 1, "meta": 1 })).unwrap();
        assert_eq!(record.get("c"), Some(&RawValue::Bare(json!(null))));
    }

    #[test]
    fn test_unknown_model() {
        assert!(matches!(
            registry("root").get("Nope"),
            Err(ModelError::UnknownModel { .. })
        ));
    }

    #[test]
    fn test_direct_schema() {
        let model = DynamicModel::new(
            ModelSchema::new("S", vec![FieldSpec::new("x", crate::FieldType::wrapper(false).optional())]),
            Coercer::new(SeedingStrategy::Root),
        );
        let record = model.construct(RawFields::new()).unwrap();
        assert!(record.is_absent("x"));
        assert_eq!(record.model(), "S");
    }
}
