//! The `Schema` facade.

use std::fmt;

use conform_core::{BuildError, ValidationError, Value};

use crate::config::{ConfigError, ValidatorConfig};
use crate::defaults;
use crate::node::SchemaNode;
use crate::validate::{Validate, ValidationContext};

/// A compiled schema: a root node plus its override message, default and
/// validator settings.
///
/// Schemas are immutable and `Send + Sync`; share one behind an `Arc` to
/// validate from many threads. A `Schema` converts into a [`SchemaNode`],
/// so schemas nest inside other schemas.
///
/// ```rust
/// use conform_core::{Kind, Value};
/// use conform_runtime::{Schema, SchemaNode, Validate};
///
/// let schema = Schema::new(SchemaNode::map([
///     (SchemaNode::from("port"), SchemaNode::of(Kind::Int)),
///     (
///         SchemaNode::optional("host")?,
///         SchemaNode::default(Kind::Str, "localhost")?,
///     ),
/// ]));
///
/// let out = schema.validate(&Value::map([("port", 8080i64)]))?;
/// assert_eq!(out.get("host"), Some(&Value::from("localhost")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    node: SchemaNode,
    error: Option<String>,
    default: Option<Value>,
    config: ValidatorConfig,
}

impl Schema {
    pub fn new(node: impl Into<SchemaNode>) -> Self {
        Self {
            node: node.into(),
            error: None,
            default: None,
            config: ValidatorConfig::default(),
        }
    }

    /// Override message replacing generated diagnostics for this schema and
    /// every plain rule beneath it.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Replace the validator settings. Settings that would fail every
    /// validation are rejected.
    pub fn with_config(mut self, config: ValidatorConfig) -> Result<Self, ConfigError> {
        config.check()?;
        self.config = config;
        Ok(self)
    }

    /// Attach a default. It must pass this schema; the normalized form is
    /// stored.
    pub fn with_default(mut self, default: impl Into<Value>) -> Result<Self, BuildError> {
        let settled = defaults::settle(&self, default.into())?;
        self.default = Some(settled);
        Ok(self)
    }

    /// Store a default that has already passed this schema's node.
    pub(crate) fn with_settled_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

impl Validate for Schema {
    fn validate(&self, data: &Value) -> Result<Value, ValidationError> {
        self.validate_with_context(data, &ValidationContext::new(&self.config))
    }

    fn validate_with_context(
        &self,
        data: &Value,
        ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        self.node.check(data, self.error.as_deref(), ctx)
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema({})", self.node)
    }
}
