//! Callable nodes and the `And` / `Or` combinators.
//!
//! Predicates and transforms are plain closures returning
//! [`anyhow::Result`], so user code can use `?` on any error. An error that
//! downcasts to [`ValidationError`] is treated as a nested validation
//! failure and keeps its trail; anything else is reported as a failure of
//! the callable itself.

use std::fmt;
use std::sync::Arc;

use conform_core::{ErrorKind, ValidationError, Value};

use crate::node::SchemaNode;
use crate::validate::ValidationContext;

type PredicateFn = dyn Fn(&Value) -> anyhow::Result<bool> + Send + Sync;
type TransformFn = dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync;

/// A named boolean check.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    func: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn check(&self, data: &Value, error: Option<&str>) -> Result<Value, ValidationError> {
        match (self.func)(data) {
            Ok(true) => Ok(data.clone()),
            Ok(false) => Err(ValidationError::new(
                ErrorKind::Predicate,
                format!("{}({data}) should evaluate to true", self.name),
                error,
            )),
            Err(err) => match err.downcast::<ValidationError>() {
                Ok(nested) => Err(nested.nest(None, error)),
                Err(other) => Err(ValidationError::new(
                    ErrorKind::Predicate,
                    format!("{}({data}) raised {other}", self.name),
                    error,
                )),
            },
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A named transform applied in place of structural matching (`Use`).
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: Arc<TransformFn>,
    pub(crate) error: Option<String>,
}

impl Transform {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn apply(&self, data: &Value) -> Result<Value, ValidationError> {
        let error = self.error.as_deref();
        (self.func)(data).map_err(|err| match err.downcast::<ValidationError>() {
            Ok(nested) => nested.nest(None, error),
            Err(other) => ValidationError::new(
                ErrorKind::Transform,
                format!("{}({data}) raised {other}", self.name),
                error,
            ),
        })
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Children of an `And` or `Or` node, plus the override message applied
/// to all of them.
#[derive(Debug, Clone)]
pub struct Combinator {
    pub(crate) children: Vec<SchemaNode>,
    pub(crate) error: Option<String>,
}

impl Combinator {
    pub(crate) fn new(children: Vec<SchemaNode>) -> Self {
        Self {
            children,
            error: None,
        }
    }

    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Pipe `data` through every child in order.
    pub(crate) fn all(&self, data: &Value, ctx: &ValidationContext) -> Result<Value, ValidationError> {
        let error = self.error.as_deref();
        let mut current = data.clone();
        for child in &self.children {
            current = child.check(&current, error, ctx)?;
        }
        Ok(current)
    }

    /// First child to accept `data` wins.
    pub(crate) fn any(&self, data: &Value, ctx: &ValidationContext) -> Result<Value, ValidationError> {
        first_match(&self.children, data, self.error.as_deref(), ctx)
    }
}

/// Display helper rendering a list of alternatives as `Or(a, b)`.
pub(crate) struct Alternatives<'a>(pub(crate) &'a [SchemaNode]);

impl fmt::Display for Alternatives<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Or(")?;
        write_nodes(f, self.0)?;
        f.write_str(")")
    }
}

pub(crate) fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[SchemaNode]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}

/// Try each alternative against the original `data` and return the first
/// success.
///
/// When every alternative fails only the last failure's trail is kept,
/// behind a `did not validate` entry.
pub(crate) fn first_match(
    alternatives: &[SchemaNode],
    data: &Value,
    error: Option<&str>,
    ctx: &ValidationContext,
) -> Result<Value, ValidationError> {
    let mut last: Option<ValidationError> = None;
    for alternative in alternatives {
        match alternative.check(data, error, ctx) {
            Ok(value) => return Ok(value),
            Err(err) if err.kind() == ErrorKind::DepthExceeded => return Err(err),
            Err(err) => {
                tracing::trace!(branch = %alternative, %data, "alternative rejected");
                last = Some(err);
            }
        }
    }

    let (mut autos, mut errors) = last.map(ValidationError::into_trails).unwrap_or_default();
    autos.insert(
        0,
        Some(format!("{} did not validate {data}", Alternatives(alternatives))),
    );
    errors.insert(0, error.map(str::to_string));
    Err(ValidationError::from_trails(ErrorKind::Disjunction, autos, errors))
}
