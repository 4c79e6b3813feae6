// Domain layer: the wrapper type, raw field values and schemas, and the traits
// the construction engine is built against.

pub mod model;
pub mod ports;
pub mod shape;
pub mod wrapper;
