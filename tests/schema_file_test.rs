use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;
use wrapfield::{ModelError, ModelRegistry, RawValue, SchemaConfig, SeedingStrategy, Wrapper};

const SCHEMA: &str = r#"
[normalizer]
seeding = "${WRAPFIELD_SCHEMA_TEST_SEEDING}"
wrapper_names = ["Wrapper", "Result"]

[[models]]
name = "Order"

[[models.fields]]
name = "id"
type = "int"

[[models.fields]]
name = "total"
type = "Result[float]"
default = 0.0

[[models.fields]]
name = "coupon"
type = "Optional[Wrapper[str]]"

[[models.fields]]
name = "note"
type = "Wrapper[Optional[str]]"

[[models.fields]]
name = "shipped"
type = "Wrapper<bool>"
default = false
required = true
"#;

fn load(dir: &TempDir, seeding: &str) -> Result<ModelRegistry> {
    let path = dir.path().join(format!("{}.toml", seeding));
    std::fs::write(&path, SCHEMA.replace("${WRAPFIELD_SCHEMA_TEST_SEEDING}", seeding))?;
    let config = SchemaConfig::from_file(&path)?;
    config.validate_config()?;
    Ok(ModelRegistry::from_config(&config)?)
}

#[test]
fn test_schema_file_classification() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = load(&dir, "root")?;
    let order = registry.get("Order")?;
    let schema = order.schema();

    assert!(!schema.is_wrapped("id"));
    assert!(schema.is_wrapped("total"));
    assert!(schema.is_wrapped("coupon"));
    assert!(schema.field("note").map(|f| f.ty.inner_optional).unwrap_or(false));
    // note has no default but is wrapped, so it falls back to absent
    assert_eq!(schema.required(), vec!["id", "shipped"]);
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Order"]);
    Ok(())
}

#[test]
fn test_root_seeding_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = load(&dir, "root")?;
    let order = registry.get("Order")?;

    let record = order.construct_json(json!({ "id": 1, "note": null, "shipped": true }))?;
    assert!(record.is_absent("coupon"));
    assert!(!record.is_absent("note"));
    assert_eq!(record.get("note"), Some(&RawValue::Boxed(Wrapper::present(json!(null)))));
    assert_eq!(
        record.to_json(),
        json!({ "id": 1, "total": 0.0, "coupon": null, "note": null, "shipped": true })
    );

    let record = order.construct_json(json!({ "id": 2, "shipped": false }))?;
    assert!(record.is_absent("note"));

    // required wins over the declared default
    let err = order
        .construct_json(json!({ "id": 1, "note": "n" }))
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation { .. }));
    assert_eq!(err.field_errors()[0].field(), "shipped");
    Ok(())
}

#[test]
fn test_per_field_seeding_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = load(&dir, "per_field")?;
    let order = registry.get("Order")?;

    let record = order.construct_json(json!({ "id": 1, "note": "n" }))?;
    assert_eq!(record.get("shipped"), Some(&RawValue::Boxed(Wrapper::present(json!(false)))));
    Ok(())
}

#[test]
fn test_scalar_annotations_are_enforced() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = load(&dir, "root")?;
    let order = registry.get("Order")?;

    let err = order
        .construct_json(json!({ "id": 1, "total": "abc", "shipped": true }))
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(err.field_errors()[0].field(), "total");

    // integers are acceptable floats
    let record = order.construct_json(json!({ "id": 1, "total": 12, "shipped": true }))?;
    assert_eq!(record.get("total"), Some(&RawValue::Boxed(Wrapper::present(json!(12)))));
    Ok(())
}

#[test]
fn test_normalize_only_keeps_missing_fields() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = load(&dir, "root")?;
    let order = registry.get("Order")?;

    let normalized = order.normalize(Default::default());
    assert!(normalized["id"].is_absent());
    assert!(normalized["shipped"].is_absent());
    assert_eq!(normalized["total"], RawValue::Boxed(Wrapper::present(json!(0.0))));
    Ok(())
}

#[test]
fn test_seeding_name_parsing() -> Result<()> {
    let config = SchemaConfig::from_toml_str("[normalizer]\nseeding = \"per_field\"\n")?;
    assert_eq!(config.normalizer.seeding, SeedingStrategy::PerField);
    Ok(())
}
