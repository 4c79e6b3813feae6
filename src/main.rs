use clap::Parser;
use std::io::Read;
use wrapfield::utils::{logger, validation::Validate};
use wrapfield::{CliConfig, ModelError, ModelRegistry, SchemaConfig};

fn read_input(path: Option<&str>) -> Result<serde_json::Value, ModelError> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&content)?)
}

fn run(config: &CliConfig) -> Result<serde_json::Value, ModelError> {
    let schema = SchemaConfig::from_file(&config.schema)?;
    schema.validate()?;
    let registry = ModelRegistry::from_config(&schema)?;
    let model = registry.get(&config.model)?;
    tracing::debug!("Using model {} with {} field(s)", model.name(), model.schema().fields.len());

    let input = read_input(config.input.as_deref())?;
    if config.normalize_only {
        let fields = wrapfield::core::engine::object_fields(model.name(), input)?;
        let normalized = model.normalize(fields);
        return Ok(serde_json::Value::Object(
            normalized
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        ));
    }

    let record = model.construct_json(input)?;
    let absent: Vec<&str> = record
        .fields()
        .keys()
        .filter(|name| record.is_absent(name))
        .map(String::as_str)
        .collect();
    if !absent.is_empty() {
        tracing::info!("Absent wrapped fields: {}", absent.join(", "));
    }
    Ok(record.to_json())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting wrapfield CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&config) {
        Ok(output) => {
            let rendered = if config.pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", rendered);
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            for field_error in e.field_errors() {
                eprintln!("  - {}", field_error);
            }
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
