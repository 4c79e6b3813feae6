use crate::domain::model::{FieldSpec, FieldType, ModelSchema, RawFields, RawValue};
use crate::domain::ports::{FieldHook, PreValidator};
use crate::domain::wrapper::Wrapper;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order in which defaults and absent wrappers are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingStrategy {
    /// Seed all defaults, then overwrite every required field (and every
    /// wrapped field without a default) with an absent wrapper, then merge
    /// caller values. A required field with a default ends up absent.
    #[default]
    Root,
    /// Resolve each declared field on its own: caller value, else default,
    /// else an absent wrapper when required or wrapped. A required field with
    /// a default keeps its default.
    PerField,
}

/// Pre-validation pass that seeds defaults and boxes wrapped fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coercer {
    seeding: SeedingStrategy,
}

impl Coercer {
    pub fn new(seeding: SeedingStrategy) -> Self {
        Self { seeding }
    }

    pub fn seeding(&self) -> SeedingStrategy {
        self.seeding
    }

    /// Normalizes one raw mapping against `schema`. Never fails; running it
    /// again on its own output changes nothing.
    pub fn normalize(&self, schema: &ModelSchema, raw: RawFields) -> RawFields {
        match self.seeding {
            SeedingStrategy::Root => normalize_root(schema, raw),
            SeedingStrategy::PerField => normalize_per_field(schema, raw),
        }
    }

    /// Per-field pre-validator. Independent of the seeding strategy: this is
    /// the step `SeedingStrategy::PerField` runs for every declared field.
    pub fn normalize_field(&self, spec: &FieldSpec, raw: Option<RawValue>) -> Option<RawValue> {
        resolve_field(spec, raw)
    }
}

impl PreValidator for Coercer {
    fn pre_validate(&self, schema: &ModelSchema, raw: RawFields) -> RawFields {
        self.normalize(schema, raw)
    }
}

impl FieldHook for Coercer {
    fn pre_validate_field(&self, spec: &FieldSpec, raw: Option<RawValue>) -> Option<RawValue> {
        self.normalize_field(spec, raw)
    }
}

fn normalize_root(schema: &ModelSchema, raw: RawFields) -> RawFields {
    let mut fields: RawFields = schema
        .defaults()
        .into_iter()
        .map(|(name, default)| (name.to_string(), default.clone()))
        .collect();

    for spec in &schema.fields {
        if spec.required || (spec.default.is_none() && spec.is_wrapped()) {
            tracing::debug!("Seeding absent wrapper for field '{}' of {}", spec.name, schema.name);
            fields.insert(spec.name.clone(), RawValue::Boxed(Wrapper::absent()));
        }
    }

    for (name, value) in raw {
        if schema.field(&name).is_none() {
            tracing::debug!("Field '{}' is not declared on {}, passing through", name, schema.name);
        }
        fields.insert(name, value);
    }

    fields
        .into_iter()
        .map(|(name, value)| {
            let value = match schema.field(&name) {
                Some(spec) => box_if_wrapped(spec, value),
                None => value,
            };
            (name, value)
        })
        .collect()
}

fn normalize_per_field(schema: &ModelSchema, mut raw: RawFields) -> RawFields {
    let mut fields = RawFields::new();
    for spec in &schema.fields {
        if let Some(value) = resolve_field(spec, raw.remove(&spec.name)) {
            fields.insert(spec.name.clone(), value);
        }
    }
    for (name, value) in raw {
        tracing::debug!("Field '{}' is not declared on {}, passing through", name, schema.name);
        fields.insert(name, value);
    }
    fields
}

fn resolve_field(spec: &FieldSpec, raw: Option<RawValue>) -> Option<RawValue> {
    let value = match raw {
        Some(value) => value,
        None => match &spec.default {
            Some(default) => default.clone(),
            None if spec.required || spec.is_wrapped() => RawValue::Boxed(Wrapper::absent()),
            None => return None,
        },
    };
    Some(box_if_wrapped(spec, value))
}

fn box_if_wrapped(spec: &FieldSpec, value: RawValue) -> RawValue {
    if spec.is_wrapped() {
        box_value(spec.ty, value)
    } else {
        value
    }
}

/// Custom-type validator for wrapped fields: wrappers pass through, bare
/// values are boxed. A bare `null` is left alone when the outer type accepts
/// `None` (`Option<Wrapper<T>>`), becomes a present `null` when the wrapped
/// type accepts `None`, and means absent otherwise.
pub fn box_value(ty: FieldType, value: RawValue) -> RawValue {
    match value {
        RawValue::Boxed(_) => value,
        RawValue::Bare(Value::Null) if ty.optional => value,
        RawValue::Bare(Value::Null) if !ty.inner_optional => RawValue::Boxed(Wrapper::absent()),
        RawValue::Bare(value) => RawValue::Boxed(Wrapper::present(value)),
    }
}

/// Encoder for wrapped values: the held value, or `null` when absent.
pub fn encode(wrapper: &Wrapper<Value>) -> Value {
    wrapper.as_option().cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ModelSchema {
        ModelSchema::new(
            "M",
            vec![
                FieldSpec::new("a", FieldType::wrapper(false)).with_default(RawValue::Boxed(Wrapper::present(json!(1)))),
                FieldSpec::new("b", FieldType::wrapper(false)),
                FieldSpec::new("c", FieldType::wrapper(false).optional()),
                FieldSpec::new("name", FieldType::PLAIN).with_default(json!("anon")),
                FieldSpec::new("count", FieldType::PLAIN),
            ],
        )
    }

    fn raw(pairs: &[(&str, Value)]) -> RawFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::Bare(v.clone())))
            .collect()
    }

    fn boxed(value: Value) -> RawValue {
        RawValue::Boxed(Wrapper::present(value))
    }

    fn absent() -> RawValue {
        RawValue::Boxed(Wrapper::absent())
    }

    #[test]
    fn test_root_seeding() {
        let out = Coercer::default().normalize(&schema(), raw(&[("b", json!(7))]));
        assert_eq!(out["a"], boxed(json!(1)));
        assert_eq!(out["b"], boxed(json!(7)));
        assert_eq!(out["c"], absent());
        assert_eq!(out["name"], RawValue::Bare(json!("anon")));
        // required plain field is seeded with an absent wrapper
        assert_eq!(out["count"], absent());
    }

    #[test]
    fn test_caller_values_win_and_get_boxed() {
        let out = Coercer::default().normalize(
            &schema(),
            raw(&[("a", json!(5)), ("name", json!("bob")), ("count", json!(2))]),
        );
        assert_eq!(out["a"], boxed(json!(5)));
        assert_eq!(out["name"], RawValue::Bare(json!("bob")));
        assert_eq!(out["count"], RawValue::Bare(json!(2)));
    }

    #[test]
    fn test_existing_wrappers_pass_through() {
        let mut input = RawFields::new();
        input.insert("b".to_string(), boxed(json!(3)));
        input.insert("c".to_string(), absent());
        let out = Coercer::default().normalize(&schema(), input);
        assert_eq!(out["b"], boxed(json!(3)));
        assert_eq!(out["c"], absent());
    }

    #[test]
    fn test_explicit_null_for_optional_wrapper_stays_bare() {
        for seeding in [SeedingStrategy::Root, SeedingStrategy::PerField] {
            let out = Coercer::new(seeding).normalize(&schema(), raw(&[("b", Value::Null), ("c", Value::Null)]));
            assert_eq!(out["b"], absent());
            assert_eq!(out["c"], RawValue::Bare(Value::Null));
        }
    }

    #[test]
    fn test_undeclared_fields_pass_through_unboxed() {
        let out = Coercer::default().normalize(&schema(), raw(&[("extra", json!(1))]));
        assert_eq!(out["extra"], RawValue::Bare(json!(1)));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for seeding in [SeedingStrategy::Root, SeedingStrategy::PerField] {
            let coercer = Coercer::new(seeding);
            let once = coercer.normalize(&schema(), raw(&[("b", Value::Null), ("count", json!(1))]));
            let twice = coercer.normalize(&schema(), once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_required_field_with_default_differs_between_strategies() {
        let schema = ModelSchema::new(
            "R",
            vec![FieldSpec::new("x", FieldType::wrapper(false))
                .with_default(json!(10))
                .with_required(true)],
        );
        let root = Coercer::new(SeedingStrategy::Root).normalize(&schema, RawFields::new());
        assert_eq!(root["x"], absent());

        let per_field = Coercer::new(SeedingStrategy::PerField).normalize(&schema, RawFields::new());
        assert_eq!(per_field["x"], boxed(json!(10)));
    }

    #[test]
    fn test_per_field_hook() {
        let coercer = Coercer::new(SeedingStrategy::PerField);
        let schema = schema();
        let b = schema.field("b").unwrap();
        assert_eq!(coercer.pre_validate_field(b, None), Some(absent()));
        assert_eq!(coercer.pre_validate_field(b, Some(RawValue::Bare(json!(2)))), Some(boxed(json!(2))));

        let optional_plain = FieldSpec::new("o", FieldType::PLAIN.optional());
        assert_eq!(coercer.pre_validate_field(&optional_plain, None), None);
    }

    #[test]
    fn test_box_value_null_handling() {
        assert_eq!(box_value(FieldType::wrapper(false), RawValue::Bare(Value::Null)), absent());
        assert_eq!(box_value(FieldType::wrapper(true), RawValue::Bare(Value::Null)), boxed(Value::Null));
        let optional = FieldType::wrapper(false).optional();
        assert_eq!(box_value(optional, RawValue::Bare(Value::Null)), RawValue::Bare(Value::Null));
        assert_eq!(box_value(optional, RawValue::Bare(json!(3))), boxed(json!(3)));
        let already = boxed(json!("x"));
        assert_eq!(box_value(FieldType::wrapper(false), already.clone()), already);
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&Wrapper::absent()), Value::Null);
        assert_eq!(encode(&Wrapper::present(json!(5))), json!(5));
    }
}
