//! Schema nodes and the dispatch at the heart of validation.
//!
//! A [`SchemaNode`] is one rule of a schema tree. Trees are built once,
//! usually when the owning module starts, and then validated against many
//! inputs; nothing in a tree changes after construction.
//!
//! Two entry points exist for every node:
//!
//! - [`Validate::validate_with_context`] runs the node as a standalone
//!   validator, using its own override message.
//! - `SchemaNode::check` runs it as the child of another node. Plain rules
//!   (literals, types, predicates, containers) pick up the override message
//!   of the nearest enclosing node; self-contained nodes (combinators,
//!   markers, embedded validators) run on their own and add one trail entry
//!   when they fail.

use std::fmt;
use std::sync::Arc;

use conform_core::{BuildError, ErrorKind, Kind, ValidationError, Value};

use crate::combinators::{first_match, write_nodes, Alternatives, Combinator, Predicate, Transform};
use crate::defaults::{self, Marker};
use crate::mapping::MappingSchema;
use crate::schema::Schema;
use crate::validate::{Validate, ValidationContext};

/// One validation rule.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Matches by equality.
    Literal(Value),
    /// Matches by instance-of check.
    Type(Kind),
    /// Matches when the predicate returns `true`.
    Predicate(Predicate),
    /// Anything implementing [`Validate`], including nested schemas.
    Validatable(Arc<dyn Validate>),
    /// List, tuple or set whose elements match any of the member schemas.
    Sequence(SequenceSchema),
    /// Key-schema to value-schema pairs.
    Mapping(MappingSchema),
    /// Every child in turn, each fed the previous child's output.
    And(Combinator),
    /// First child to succeed.
    Or(Combinator),
    /// Replace the value with the result of a transform.
    Use(Transform),
    /// Mapping key that may be absent.
    Optional(Marker),
    /// Mapping key that may be absent and is filled in with its default.
    Default(Marker),
}

/// Container kind plus the schemas its elements may match.
#[derive(Debug, Clone)]
pub struct SequenceSchema {
    kind: Kind,
    members: Vec<SchemaNode>,
}

impl SequenceSchema {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn members(&self) -> &[SchemaNode] {
        &self.members
    }

    fn check(
        &self,
        data: &Value,
        error: Option<&str>,
        ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        let each = |item: &Value| first_match(&self.members, item, error, ctx);
        match (self.kind, data) {
            (Kind::List, Value::List(items)) => {
                Ok(Value::List(items.iter().map(each).collect::<Result<_, _>>()?))
            }
            (Kind::Tuple, Value::Tuple(items)) => {
                Ok(Value::Tuple(items.iter().map(each).collect::<Result<_, _>>()?))
            }
            (Kind::Set, Value::Set(items)) => {
                Ok(Value::Set(items.iter().map(each).collect::<Result<_, _>>()?))
            }
            _ => Err(type_mismatch(data, self.kind, error)),
        }
    }
}

pub(crate) fn type_mismatch(data: &Value, kind: Kind, error: Option<&str>) -> ValidationError {
    ValidationError::new(
        ErrorKind::TypeMismatch,
        format!("{data} should be instance of {kind}"),
        error,
    )
}

fn sequence<I>(kind: Kind, members: I) -> SchemaNode
where
    I: IntoIterator,
    I::Item: Into<SchemaNode>,
{
    SchemaNode::Sequence(SequenceSchema {
        kind,
        members: members.into_iter().map(Into::into).collect(),
    })
}

fn children<I>(combinator: &'static str, items: I) -> Result<Combinator, BuildError>
where
    I: IntoIterator,
    I::Item: Into<SchemaNode>,
{
    let children: Vec<SchemaNode> = items.into_iter().map(Into::into).collect();
    if children.is_empty() {
        return Err(BuildError::EmptyCombinator { combinator });
    }
    Ok(Combinator::new(children))
}

impl SchemaNode {
    /// Exact value.
    pub fn literal(value: impl Into<Value>) -> Self {
        SchemaNode::Literal(value.into())
    }

    /// Instance of `kind`.
    pub fn of(kind: Kind) -> Self {
        SchemaNode::Type(kind)
    }

    /// Infallible predicate.
    pub fn predicate<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        SchemaNode::Predicate(Predicate::new(name, move |v| Ok(func(v))))
    }

    /// Predicate that may fail. A failure is reported, never treated as `false`.
    pub fn try_predicate<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        SchemaNode::Predicate(Predicate::new(name, func))
    }

    /// Embed any validator, such as a nested [`Schema`].
    pub fn validatable<V: Validate + 'static>(validator: V) -> Self {
        SchemaNode::Validatable(Arc::new(validator))
    }

    /// List whose elements match any of `members`.
    pub fn list<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SchemaNode>,
    {
        sequence(Kind::List, members)
    }

    /// Tuple whose elements match any of `members`.
    pub fn tuple<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SchemaNode>,
    {
        sequence(Kind::Tuple, members)
    }

    /// Set whose elements match any of `members`.
    pub fn set<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SchemaNode>,
    {
        sequence(Kind::Set, members)
    }

    /// Mapping from key-schemas to value-schemas, in declaration order.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<SchemaNode>,
        V: Into<SchemaNode>,
        I: IntoIterator<Item = (K, V)>,
    {
        SchemaNode::Mapping(MappingSchema::new(
            entries.into_iter().map(|(k, v)| (k.into(), v.into())),
        ))
    }

    /// Conjunction. Fails with [`BuildError::EmptyCombinator`] when empty.
    pub fn and<I>(items: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<SchemaNode>,
    {
        Ok(SchemaNode::And(children("And", items)?))
    }

    /// Disjunction. Fails with [`BuildError::EmptyCombinator`] when empty.
    pub fn or<I>(items: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<SchemaNode>,
    {
        Ok(SchemaNode::Or(children("Or", items)?))
    }

    /// Transform (`Use`): the function's result replaces the value.
    pub fn transform<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        SchemaNode::Use(Transform::new(name, func))
    }

    /// Optional mapping key, with a default derived from `inner`.
    pub fn optional(inner: impl Into<SchemaNode>) -> Result<Self, BuildError> {
        defaults::build(SchemaNode::Optional, inner.into(), None)
    }

    /// Optional mapping key with an explicit default.
    pub fn optional_or(
        inner: impl Into<SchemaNode>,
        default: impl Into<Value>,
    ) -> Result<Self, BuildError> {
        defaults::build(SchemaNode::Optional, inner.into(), Some(default.into()))
    }

    /// Default-carrying node with an explicit default.
    pub fn default(inner: impl Into<SchemaNode>, default: impl Into<Value>) -> Result<Self, BuildError> {
        defaults::build(SchemaNode::Default, inner.into(), Some(default.into()))
    }

    /// Default-carrying node whose default is derived from `inner`.
    pub fn default_derived(inner: impl Into<SchemaNode>) -> Result<Self, BuildError> {
        defaults::build(SchemaNode::Default, inner.into(), None)
    }

    /// Attach an override message shown instead of generated diagnostics.
    ///
    /// Combinators and markers store it directly; any other node is wrapped
    /// in a [`Schema`] carrying the message and the node's default, which
    /// makes it rank as a nested schema when used as a mapping key.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self {
            SchemaNode::And(mut c) => {
                c.error = Some(message);
                SchemaNode::And(c)
            }
            SchemaNode::Or(mut c) => {
                c.error = Some(message);
                SchemaNode::Or(c)
            }
            SchemaNode::Use(mut t) => {
                t.error = Some(message);
                SchemaNode::Use(t)
            }
            SchemaNode::Optional(mut m) => {
                m.error = Some(message);
                SchemaNode::Optional(m)
            }
            SchemaNode::Default(mut m) => {
                m.error = Some(message);
                SchemaNode::Default(m)
            }
            other => {
                let default = other.default_value().cloned();
                Schema::new(other)
                    .with_error(message)
                    .with_settled_default(default)
                    .into()
            }
        }
    }

    /// Whether a mapping must contain a key matching this key-schema.
    pub fn is_required(&self) -> bool {
        !matches!(self, SchemaNode::Optional(_) | SchemaNode::Default(_))
    }

    /// Validate as the child of another node.
    ///
    /// `error` is the override message of the nearest enclosing node.
    pub(crate) fn check(
        &self,
        data: &Value,
        error: Option<&str>,
        ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        let ctx = ctx.descend()?;
        match self {
            SchemaNode::Literal(expected) => {
                if expected == data {
                    Ok(data.clone())
                } else {
                    Err(ValidationError::new(
                        ErrorKind::LiteralMismatch,
                        format!("{expected} does not match {data}"),
                        error,
                    ))
                }
            }
            SchemaNode::Type(kind) => {
                if kind.matches(data) {
                    Ok(data.clone())
                } else {
                    Err(type_mismatch(data, *kind, error))
                }
            }
            SchemaNode::Predicate(predicate) => predicate.check(data, error),
            SchemaNode::Sequence(seq) => seq.check(data, error, &ctx),
            SchemaNode::Mapping(mapping) => mapping.check(data, error, &ctx),
            SchemaNode::Validatable(validator) => validator
                .validate_with_context(data, &ctx)
                .map_err(|err| err.nest(None, error)),
            SchemaNode::And(_)
            | SchemaNode::Or(_)
            | SchemaNode::Use(_)
            | SchemaNode::Optional(_)
            | SchemaNode::Default(_) => self
                .validate_with_context(data, &ctx)
                .map_err(|err| err.nest(None, error)),
        }
    }
}

impl Validate for SchemaNode {
    fn validate(&self, data: &Value) -> Result<Value, ValidationError> {
        self.validate_with_context(data, &ValidationContext::default())
    }

    fn validate_with_context(
        &self,
        data: &Value,
        ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        match self {
            SchemaNode::And(combinator) => combinator.all(data, ctx),
            SchemaNode::Or(combinator) => combinator.any(data, ctx),
            SchemaNode::Use(transform) => transform.apply(data),
            SchemaNode::Optional(marker) | SchemaNode::Default(marker) => {
                marker.inner().check(data, marker.error(), ctx)
            }
            SchemaNode::Validatable(validator) => validator.validate_with_context(data, ctx),
            _ => self.check(data, None, ctx),
        }
    }

    fn default_value(&self) -> Option<&Value> {
        match self {
            SchemaNode::Optional(marker) | SchemaNode::Default(marker) => marker.default(),
            SchemaNode::Validatable(validator) => validator.default_value(),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Literal(value) => write!(f, "{value}"),
            SchemaNode::Type(kind) => write!(f, "{kind}"),
            SchemaNode::Predicate(predicate) => f.write_str(predicate.name()),
            SchemaNode::Validatable(validator) => write!(f, "{validator}"),
            SchemaNode::Sequence(seq) => {
                let (open, close) = match seq.kind {
                    Kind::Tuple => ("(", ")"),
                    Kind::Set => ("{", "}"),
                    _ => ("[", "]"),
                };
                f.write_str(open)?;
                write_nodes(f, &seq.members)?;
                if seq.kind == Kind::Tuple && seq.members.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(close)
            }
            SchemaNode::Mapping(mapping) => write!(f, "{mapping}"),
            SchemaNode::And(combinator) => {
                f.write_str("And(")?;
                write_nodes(f, &combinator.children)?;
                f.write_str(")")
            }
            SchemaNode::Or(combinator) => write!(f, "{}", Alternatives(&combinator.children)),
            SchemaNode::Use(transform) => write!(f, "Use({})", transform.name()),
            SchemaNode::Optional(marker) => write!(f, "Optional({})", marker.inner()),
            SchemaNode::Default(marker) => write!(f, "Default({})", marker.inner()),
        }
    }
}

impl From<Kind> for SchemaNode {
    fn from(kind: Kind) -> Self {
        SchemaNode::Type(kind)
    }
}

impl From<Value> for SchemaNode {
    fn from(value: Value) -> Self {
        SchemaNode::Literal(value)
    }
}

impl From<&str> for SchemaNode {
    fn from(s: &str) -> Self {
        SchemaNode::Literal(Value::from(s))
    }
}

impl From<String> for SchemaNode {
    fn from(s: String) -> Self {
        SchemaNode::Literal(Value::Str(s))
    }
}

impl From<i64> for SchemaNode {
    fn from(i: i64) -> Self {
        SchemaNode::Literal(Value::Int(i))
    }
}

impl From<bool> for SchemaNode {
    fn from(b: bool) -> Self {
        SchemaNode::Literal(Value::Bool(b))
    }
}

impl From<f64> for SchemaNode {
    fn from(x: f64) -> Self {
        SchemaNode::Literal(Value::Float(x))
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        SchemaNode::Validatable(Arc::new(schema))
    }
}

impl From<MappingSchema> for SchemaNode {
    fn from(mapping: MappingSchema) -> Self {
        SchemaNode::Mapping(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(node: &SchemaNode, data: impl Into<Value>) -> Result<Value, ValidationError> {
        node.validate(&data.into())
    }

    #[test]
    fn test_literal() {
        let node = SchemaNode::from("eth0");
        assert_eq!(check(&node, "eth0"), Ok(Value::from("eth0")));

        let err = check(&node, "eth1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralMismatch);
        assert_eq!(err.message(), "\"eth0\" does not match \"eth1\"");
    }

    #[test]
    fn test_type_tag() {
        let node = SchemaNode::of(Kind::Int);
        assert_eq!(check(&node, 7i64), Ok(Value::Int(7)));

        let err = check(&node, "7").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), "\"7\" should be instance of int");
    }

    #[test]
    fn test_sequence_kind_checked_before_elements() {
        let node = SchemaNode::list([Kind::Int]);
        let err = check(&node, Value::tuple([1i64])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), "(1,) should be instance of list");
    }

    #[test]
    fn test_sequence_rebuilds_same_kind() {
        let parse = SchemaNode::transform("parse_int", |v| match v {
            Value::Str(s) => Ok(Value::Int(s.parse()?)),
            other => Ok(other.clone()),
        });
        let node = SchemaNode::set([parse]);
        assert_eq!(
            check(&node, Value::set(["1", "2"])),
            Ok(Value::set([1i64, 2]))
        );
    }

    #[test]
    fn test_empty_member_list_only_accepts_empty_container() {
        let node = SchemaNode::list(Vec::<SchemaNode>::new());
        assert_eq!(check(&node, Value::List(vec![])), Ok(Value::List(vec![])));
        let err = check(&node, Value::list([1i64])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Disjunction);
        assert_eq!(err.message(), "Or() did not validate 1");
    }

    #[test]
    fn test_empty_combinators_are_rejected() {
        assert_eq!(
            SchemaNode::and(Vec::<SchemaNode>::new()).unwrap_err(),
            BuildError::EmptyCombinator { combinator: "And" }
        );
        assert!(SchemaNode::or(Vec::<SchemaNode>::new()).is_err());
    }

    #[test]
    fn test_validatable_failure_gets_one_trail_entry() {
        let inner = SchemaNode::of(Kind::Int).with_error("need a number");
        let outer = SchemaNode::list([inner]);
        let err = check(&outer, Value::list(["x"])).unwrap_err();
        assert_eq!(
            err.autos(),
            &[
                Some("Or(Schema(int)) did not validate \"x\"".to_string()),
                None,
                Some("\"x\" should be instance of int".to_string()),
            ]
        );
        assert_eq!(err.message(), "need a number");
    }

    #[test]
    fn test_display() {
        let node = SchemaNode::map([
            (SchemaNode::from("port"), SchemaNode::of(Kind::Int)),
            (
                SchemaNode::optional("tags").unwrap(),
                SchemaNode::tuple([SchemaNode::of(Kind::Str)]),
            ),
        ]);
        assert_eq!(node.to_string(), "{\"port\": int, Optional(\"tags\"): (str,)}");

        let piped = SchemaNode::and([
            SchemaNode::transform("parse_int", |v| Ok(v.clone())),
            SchemaNode::predicate("positive", |_| true),
        ])
        .unwrap();
        assert_eq!(piped.to_string(), "And(Use(parse_int), positive)");
    }

    #[test]
    fn test_with_error_keeps_embedded_default() {
        let inner = Schema::new(Kind::Str).with_default("x").unwrap();
        let value = SchemaNode::from(inner).with_error("bad");
        assert_eq!(value.default_value(), Some(&Value::from("x")));

        let node = SchemaNode::map([(SchemaNode::optional("k").unwrap(), value)]);
        let out = check(&node, Value::Map(Default::default())).unwrap();
        assert_eq!(out, Value::map([("k", "x")]));

        let err = check(&node, Value::map([("k", 1i64)])).unwrap_err();
        assert_eq!(err.message(), "bad");
    }

    #[test]
    fn test_default_value_of_plain_nodes_is_none() {
        assert!(SchemaNode::of(Kind::Str).default_value().is_none());
        assert!(SchemaNode::from("x").default_value().is_none());
    }
}
