//! Schema validation engine for conform
//!
//! Schemas are trees of [`SchemaNode`]s built once and validated against
//! many inputs. Validation either returns a normalized copy of the input
//! (transforms applied, defaults injected) or a [`ValidationError`] whose
//! message is readable by the end user.
//!
//! - **Plain rules**: literals, type tags, predicates
//! - **Containers**: lists, tuples, sets and mappings with key-schemas
//! - **Combinators**: `And`, `Or` and `Use` transforms
//! - **Markers**: `Optional` and `Default` mapping keys
//! - **Facade**: [`Schema`], which nests inside other schemas
//!
//! # Example
//!
//! ```rust
//! use conform_runtime::{Kind, Schema, SchemaNode, Validate, Value};
//!
//! let parse_int = SchemaNode::transform("parse_int", |v| {
//!     Ok(Value::Int(v.as_str().unwrap_or_default().parse()?))
//! });
//! let port = SchemaNode::or([SchemaNode::of(Kind::Int), parse_int])?;
//! let schema = Schema::new(port);
//!
//! assert_eq!(schema.validate(&Value::from("42"))?, Value::Int(42));
//! assert!(schema.validate(&Value::from("x")).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod combinators;
mod config;
mod defaults;
mod mapping;
mod node;
mod priority;
mod schema;
mod validate;

pub use combinators::{Combinator, Predicate, Transform};
pub use config::{ConfigError, ValidatorConfig, DEFAULT_MAX_DEPTH};
pub use defaults::Marker;
pub use mapping::MappingSchema;
pub use node::{SchemaNode, SequenceSchema};
pub use priority::{attempt_order, priority, Priority};
pub use schema::Schema;
pub use validate::{Validate, ValidationContext};

pub use conform_core::{BuildError, ErrorKind, Kind, ValidationError, Value};
