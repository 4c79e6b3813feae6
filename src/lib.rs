#[macro_use]
mod macros;

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::toml_config::SchemaConfig;
pub use crate::core::annotation::{Classifier, ScalarKind, TypeAnnotation};
pub use crate::core::coerce::{box_value, encode, Coercer, SeedingStrategy};
pub use crate::core::dynamic::{DynamicModel, DynamicRecord, ModelRegistry};
pub use domain::model::{FieldSpec, FieldType, ModelSchema, RawFields, RawValue};
pub use domain::ports::{FieldHook, FieldShape, Model, PreValidator};
pub use domain::wrapper::Wrapper;
pub use utils::error::{FieldError, ModelError, Result};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
