//! Attempt order for mapping key-schemas.
//!
//! When several key-schemas of one mapping could accept the same data key,
//! the most specific one is tried first: exact literals before predicates,
//! predicates before type tags, and so on down to container schemas. Ties
//! keep declaration order.

use crate::node::SchemaNode;

/// Specificity rank of a key-schema. Lower ranks are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Literal = 1,
    Predicate = 2,
    Type = 3,
    /// Nested schemas, custom validators and the And/Or/Use combinators.
    Validatable = 4,
    Mapping = 5,
    Sequence = 6,
}

/// Rank a key-schema. `Optional` and `Default` rank as the node they wrap.
pub fn priority(node: &SchemaNode) -> Priority {
    match node {
        SchemaNode::Literal(_) => Priority::Literal,
        SchemaNode::Predicate(_) => Priority::Predicate,
        SchemaNode::Type(_) => Priority::Type,
        SchemaNode::Validatable(_)
        | SchemaNode::And(_)
        | SchemaNode::Or(_)
        | SchemaNode::Use(_) => Priority::Validatable,
        SchemaNode::Mapping(_) => Priority::Mapping,
        SchemaNode::Sequence(_) => Priority::Sequence,
        SchemaNode::Optional(marker) | SchemaNode::Default(marker) => priority(marker.inner()),
    }
}

/// Indices of `keys` in the order they should be attempted.
pub fn attempt_order<'a, I>(keys: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a SchemaNode>,
{
    let mut ranked: Vec<(Priority, usize)> = keys
        .into_iter()
        .enumerate()
        .map(|(index, key)| (priority(key), index))
        .collect();
    ranked.sort_by_key(|&(rank, _)| rank);
    ranked.into_iter().map(|(_, index)| index).collect()
}
