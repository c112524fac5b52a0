//! Construction-time default handling.
//!
//! `Optional`, `Default` and the [`Schema`](crate::Schema) facade may carry
//! a default. It is computed and validated once, when the node is built, and
//! stored in its normalized form. A default that does not pass its own node
//! aborts construction with [`BuildError::InvalidDefault`].

use conform_core::{BuildError, Value};

use crate::node::SchemaNode;
use crate::validate::Validate;

/// Payload of the `Optional` and `Default` variants.
#[derive(Debug, Clone)]
pub struct Marker {
    inner: Box<SchemaNode>,
    default: Option<Value>,
    pub(crate) error: Option<String>,
}

impl Marker {
    pub fn inner(&self) -> &SchemaNode {
        &self.inner
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Default implied by a node when none is given explicitly.
///
/// Literals stand for themselves, types yield their zero value and nodes
/// that already carry a default pass it on. Other nodes imply nothing.
pub fn derive(node: &SchemaNode) -> Option<Value> {
    match node {
        SchemaNode::Literal(value) => Some(value.clone()),
        SchemaNode::Type(kind) => Some(kind.zero_value()),
        other => other.default_value().cloned(),
    }
}

/// Validate `default` against `owner`, returning its normalized form.
pub fn settle<V>(owner: &V, default: Value) -> Result<Value, BuildError>
where
    V: Validate + ?Sized,
{
    match owner.validate(&default) {
        Ok(settled) => {
            tracing::debug!(schema = %owner, default = %settled, "default settled");
            Ok(settled)
        }
        Err(source) => Err(BuildError::InvalidDefault {
            schema: owner.to_string(),
            default,
            source,
        }),
    }
}

/// Build an `Optional` or `Default` node around `inner`.
pub(crate) fn build(
    variant: fn(Marker) -> SchemaNode,
    inner: SchemaNode,
    explicit: Option<Value>,
) -> Result<SchemaNode, BuildError> {
    let candidate = explicit.or_else(|| derive(&inner));
    let mut node = variant(Marker {
        inner: Box::new(inner),
        default: None,
        error: None,
    });

    if let Some(candidate) = candidate {
        let settled = settle(&node, candidate)?;
        if let SchemaNode::Optional(marker) | SchemaNode::Default(marker) = &mut node {
            marker.default = Some(settled);
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_core::{ErrorKind, Kind};

    #[test]
    fn test_derive_from_literal_and_type() {
        assert_eq!(derive(&SchemaNode::from("host")), Some(Value::from("host")));
        assert_eq!(derive(&SchemaNode::of(Kind::Str)), Some(Value::from("")));
        assert_eq!(derive(&SchemaNode::of(Kind::Any)), Some(Value::Null));
        assert_eq!(derive(&SchemaNode::predicate("any", |_| true)), None);
    }

    #[test]
    fn test_derive_recurses_into_defaults() {
        let inner = SchemaNode::default(Kind::Str, "localhost").unwrap();
        let outer = SchemaNode::optional(inner).unwrap();
        assert_eq!(outer.default_value(), Some(&Value::from("localhost")));
    }

    #[test]
    fn test_explicit_default_wins() {
        let node = SchemaNode::default(Kind::Int, 8080i64).unwrap();
        assert_eq!(node.default_value(), Some(&Value::Int(8080)));
    }

    #[test]
    fn test_invalid_default_fails_at_build_time() {
        let err = SchemaNode::default(Kind::Int, "eighty").unwrap_err();
        match err {
            BuildError::InvalidDefault {
                schema,
                default,
                source,
            } => {
                assert_eq!(schema, "Default(int)");
                assert_eq!(default, Value::from("eighty"));
                assert_eq!(source.kind(), ErrorKind::TypeMismatch);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_is_stored_normalized() {
        let parse = SchemaNode::transform("parse_int", |v| match v.as_str() {
            Some(s) => Ok(Value::Int(s.parse()?)),
            None => Ok(v.clone()),
        });
        let node = SchemaNode::default(parse, "10").unwrap();
        assert_eq!(node.default_value(), Some(&Value::Int(10)));
    }

    #[test]
    fn test_nodes_without_implied_default() {
        let node = SchemaNode::optional(SchemaNode::predicate("short", |_| true)).unwrap();
        assert_eq!(node.default_value(), None);
    }
}
