use crate::core::annotation::{TypeAnnotation, DEFAULT_WRAPPER_NAMES};
use crate::core::coerce::SeedingStrategy;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{validate_non_empty_list, validate_non_empty_string, validate_unique_names, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub seeding: SeedingStrategy,
    #[serde(default = "default_wrapper_names")]
    pub wrapper_names: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            seeding: SeedingStrategy::default(),
            wrapper_names: default_wrapper_names(),
        }
    }
}

fn default_wrapper_names() -> Vec<String> {
    DEFAULT_WRAPPER_NAMES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// Type annotation; omitted for schema-only fields.
    pub r#type: Option<String>,
    pub default: Option<toml::Value>,
    pub required: Option<bool>,
}

impl SchemaConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ModelError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ModelError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn model(&self, name: &str) -> Result<&ModelConfig> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ModelError::UnknownModel {
                name: name.to_string(),
            })
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_list("normalizer.wrapper_names", &self.normalizer.wrapper_names)?;
        for name in &self.normalizer.wrapper_names {
            validate_non_empty_string("normalizer.wrapper_names", name)?;
        }

        validate_unique_names("models", self.models.iter().map(|m| m.name.as_str()))?;
        for model in &self.models {
            validate_non_empty_string("models.name", &model.name)?;
            let scope = format!("models.{}.fields", model.name);
            validate_unique_names(&scope, model.fields.iter().map(|f| f.name.as_str()))?;
            for field in &model.fields {
                validate_non_empty_string(&scope, &field.name)?;
                if let Some(annotation) = &field.r#type {
                    TypeAnnotation::parse(annotation)?;
                }
            }
        }
        Ok(())
    }
}

impl Validate for SchemaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
