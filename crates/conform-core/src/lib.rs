//! Core value model and error types for conform
//!
//! - [`Value`]: loosely-typed data under validation (JSON bodies, YAML configs)
//! - [`Kind`]: type tags a schema checks values against
//! - [`ValidationError`]: two-trail failure report with a rendered message
//! - [`BuildError`]: failures raised while a schema is being built

pub mod error;
pub mod value;

pub use error::{BuildError, ConversionError, ErrorKind, ValidationError};
pub use value::{Kind, Value};
