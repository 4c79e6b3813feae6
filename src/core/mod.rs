pub mod annotation;
pub mod coerce;
pub mod dynamic;
pub mod engine;

pub use crate::domain::model::{FieldSpec, FieldType, ModelSchema, RawFields, RawValue};
pub use crate::domain::ports::{FieldHook, FieldShape, Model, PreValidator};
pub use crate::utils::error::Result;
