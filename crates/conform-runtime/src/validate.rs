//! The `Validate` trait and the context threaded through a validation pass.
//!
//! Every schema node implements [`Validate`], and so does the [`Schema`]
//! facade. Anything else implementing it can be embedded in a schema tree
//! with [`SchemaNode::validatable`], which is how custom validators and
//! nested schemas plug in.
//!
//! [`Schema`]: crate::Schema
//! [`SchemaNode::validatable`]: crate::SchemaNode::validatable

use std::fmt;

use conform_core::{ErrorKind, ValidationError, Value};

use crate::config::ValidatorConfig;

/// Trait for anything that can validate and normalize a value.
///
/// # Example
///
/// ```rust
/// use conform_core::{ValidationError, Value};
/// use conform_runtime::{Schema, SchemaNode, Validate};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Lowercase;
///
/// impl fmt::Display for Lowercase {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("Lowercase")
///     }
/// }
///
/// impl Validate for Lowercase {
///     fn validate(&self, data: &Value) -> Result<Value, ValidationError> {
///         match data.as_str() {
///             Some(s) => Ok(Value::from(s.to_lowercase())),
///             None => Err(ValidationError::custom(format!("{data} is not a string"))),
///         }
///     }
/// }
///
/// let schema = Schema::new(SchemaNode::validatable(Lowercase));
/// assert_eq!(schema.validate(&Value::from("ETH0")).unwrap(), Value::from("eth0"));
/// ```
pub trait Validate: fmt::Debug + fmt::Display + Send + Sync {
    /// Validate `data`, returning the normalized value.
    fn validate(&self, data: &Value) -> Result<Value, ValidationError>;

    /// Validate as part of an enclosing pass.
    ///
    /// The default implementation ignores the context; schema nodes
    /// override it so nesting limits carry across embedded schemas.
    fn validate_with_context(
        &self,
        data: &Value,
        _ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        self.validate(data)
    }

    /// Precomputed default carried by this validator, if any.
    ///
    /// A mapping injects the default of an unmatched optional key when both
    /// the key and its value schema report one.
    fn default_value(&self) -> Option<&Value> {
        None
    }
}

/// Per-pass state: how deep the current node sits in the schema tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    depth: usize,
    max_depth: usize,
}

impl ValidationContext {
    /// Start a pass at depth zero.
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Context for a child node, or an error once the limit is reached.
    pub fn descend(&self) -> Result<Self, ValidationError> {
        if self.depth >= self.max_depth {
            tracing::warn!(max_depth = self.max_depth, "validation depth limit reached");
            return Err(ValidationError::new(
                ErrorKind::DepthExceeded,
                format!("maximum validation depth {} exceeded", self.max_depth),
                None,
            ));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default())
    }
}
