use std::fmt;
use thiserror::Error;

pub const DEFAULT_UNWRAP_MESSAGE: &str = "Value is None.";

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{message}")]
    EmptyUnwrap { message: String },

    #[error("Fallback should not be None")]
    InvalidFallback,

    #[error("Validation failed for model '{model}': {}", FieldErrors(.errors))]
    Validation {
        model: String,
        errors: Vec<FieldError>,
    },

    #[error("Unknown model: {name}")]
    UnknownModel { name: String },

    #[error("Invalid type annotation '{annotation}': {reason}")]
    AnnotationError { annotation: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field '{field}' is required")]
    Missing { field: String },

    #[error("field '{field}': {message}")]
    Invalid { field: String, message: String },

    #[error("field '{field}' does not accept a wrapped value")]
    UnexpectedWrapper { field: String },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            FieldError::Missing { field }
            | FieldError::Invalid { field, .. }
            | FieldError::UnexpectedWrapper { field } => field,
        }
    }
}

struct FieldErrors<'a>(&'a [FieldError]);

impl fmt::Display for FieldErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl ModelError {
    pub fn empty_unwrap(message: Option<&str>) -> Self {
        ModelError::EmptyUnwrap {
            message: message.unwrap_or(DEFAULT_UNWRAP_MESSAGE).to_string(),
        }
    }

    pub fn validation(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        ModelError::Validation {
            model: model.into(),
            errors,
        }
    }

    /// Field errors carried by a validation failure, empty for every other kind.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ModelError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ModelError::Validation { model, errors } => {
                format!("Input does not match model '{}' ({} problem(s))", model, errors.len())
            }
            ModelError::UnknownModel { name } => format!("No model named '{}' in the schema file", name),
            ModelError::IoError(_) => "Could not read an input file".to_string(),
            ModelError::TomlError(_) | ModelError::ConfigError { .. } => {
                "The schema file is not valid".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ModelError::Validation { .. } => "Supply every required field with a value of the declared type",
            ModelError::UnknownModel { .. } => "Check the --model argument against the [[models]] names",
            ModelError::AnnotationError { .. } => "Use annotations such as Wrapper<int> or Optional[Wrapper[str]]",
            ModelError::TomlError(_)
            | ModelError::ConfigError { .. }
            | ModelError::InvalidConfigValueError { .. } => "Fix the schema file and try again",
            ModelError::IoError(_) => "Check that the file exists and is readable",
            ModelError::SerializationError(_) => "Input must be a JSON object",
            ModelError::EmptyUnwrap { .. } | ModelError::InvalidFallback => {
                "Check is_none() before unwrapping, or pass a concrete fallback"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ModelError::Validation { .. } | ModelError::SerializationError(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = ModelError::validation(
            "Order",
            vec![
                FieldError::Missing {
                    field: "b".to_string(),
                },
                FieldError::Invalid {
                    field: "c".to_string(),
                    message: "invalid type".to_string(),
                },
            ],
        );
        assert_eq!(
            err.to_string(),
            "Validation failed for model 'Order': field 'b' is required; field 'c': invalid type"
        );
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_empty_unwrap_default_message() {
        assert_eq!(ModelError::empty_unwrap(None).to_string(), "Value is None.");
        assert_eq!(ModelError::empty_unwrap(Some("no total")).to_string(), "no total");
    }
}
