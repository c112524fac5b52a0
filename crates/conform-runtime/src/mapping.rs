//! Mapping schemas: key-schema to value-schema pairs.
//!
//! Every data entry is matched against the schema entries in priority
//! order (see [`crate::priority`]). The first entry whose key-schema
//! accepts the key and whose value-schema accepts the value wins, and both
//! coerced halves go into the output map. After all data entries are
//! placed, required entries must be covered and the defaults of uncovered
//! optional entries are injected.

use std::collections::BTreeMap;
use std::fmt;

use conform_core::{ErrorKind, Kind, ValidationError, Value};

use crate::node::{type_mismatch, SchemaNode};
use crate::priority::attempt_order;
use crate::validate::{Validate, ValidationContext};

/// Ordered key-schema to value-schema entries.
#[derive(Debug, Clone)]
pub struct MappingSchema {
    entries: Vec<(SchemaNode, SchemaNode)>,
    /// Indices into `entries`, most specific key-schema first.
    order: Vec<usize>,
}

impl MappingSchema {
    /// Build from entries in declaration order.
    ///
    /// Entries whose key-schemas name the same literal key, with or without
    /// an `Optional`/`Default` marker, collapse into one: the last entry
    /// wins and takes the position of the first.
    pub fn new(entries: impl IntoIterator<Item = (SchemaNode, SchemaNode)>) -> Self {
        let mut unique: Vec<(SchemaNode, SchemaNode)> = Vec::new();
        for (key, value) in entries {
            let existing = literal_key(&key)
                .and_then(|name| unique.iter().position(|(k, _)| literal_key(k) == Some(name)));
            match existing {
                Some(index) => {
                    tracing::warn!(key = %key, "duplicate mapping key, keeping the last entry");
                    unique[index] = (key, value);
                }
                None => unique.push((key, value)),
            }
        }
        let order = attempt_order(unique.iter().map(|(key, _)| key));
        Self {
            entries: unique,
            order,
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[(SchemaNode, SchemaNode)] {
        &self.entries
    }

    pub(crate) fn check(
        &self,
        data: &Value,
        error: Option<&str>,
        ctx: &ValidationContext,
    ) -> Result<Value, ValidationError> {
        let Value::Map(input) = data else {
            return Err(type_mismatch(data, Kind::Map, error));
        };

        let mut output = BTreeMap::new();
        let mut covered = vec![false; self.entries.len()];

        for (key, value) in input {
            let (index, new_key, new_value) = self.place(key, value, error, ctx)?;
            covered[index] = true;
            output.insert(new_key, new_value);
        }

        let missing: Vec<String> = self
            .entries
            .iter()
            .zip(&covered)
            .filter(|((key, _), hit)| key.is_required() && !**hit)
            .map(|((key, _), _)| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::new(
                ErrorKind::MissingKeys,
                format!("missing keys: {}", missing.join(", ")),
                error,
            ));
        }

        if output.len() != input.len() {
            let output = Value::Map(output);
            return Err(ValidationError::new(
                ErrorKind::WrongKeys,
                format!("wrong keys {output} in {data}"),
                error,
            ));
        }

        for ((key, value), _) in self
            .entries
            .iter()
            .zip(&covered)
            .filter(|((key, _), hit)| !key.is_required() && !**hit)
        {
            if let (Some(key_default), Some(value_default)) = (key.default_value(), value.default_value()) {
                tracing::debug!(key = %key_default, value = %value_default, "injecting default");
                output
                    .entry(key_default.clone())
                    .or_insert_with(|| value_default.clone());
            }
        }

        Ok(Value::Map(output))
    }

    /// Find the schema entry accepting one data entry.
    fn place(
        &self,
        key: &Value,
        value: &Value,
        error: Option<&str>,
        ctx: &ValidationContext,
    ) -> Result<(usize, Value, Value), ValidationError> {
        // Value failure of the last entry whose key-schema accepted `key`.
        let mut rejected: Option<ValidationError> = None;

        for &index in &self.order {
            let (key_schema, value_schema) = &self.entries[index];
            let new_key = match key_schema.check(key, error, ctx) {
                Ok(new_key) => new_key,
                Err(err) if err.kind() == ErrorKind::DepthExceeded => return Err(err),
                Err(_) => continue,
            };
            match value_schema.check(value, error, ctx) {
                Ok(new_value) => return Ok((index, new_key, new_value)),
                Err(err) if err.kind() == ErrorKind::DepthExceeded => return Err(err),
                Err(err) => {
                    tracing::trace!(%key, candidate = %key_schema, "value rejected by candidate");
                    rejected = Some(err);
                }
            }
        }

        Err(match rejected {
            Some(err) => err.nest(Some(format!("invalid value for key {key}")), error),
            None => ValidationError::new(
                ErrorKind::UnrecognizedKey,
                format!("unrecognized key {key}"),
                error,
            ),
        })
    }
}

/// Literal value a key-schema stands for, looking through markers.
fn literal_key(node: &SchemaNode) -> Option<&Value> {
    match node {
        SchemaNode::Literal(value) => Some(value),
        SchemaNode::Optional(marker) | SchemaNode::Default(marker) => literal_key(marker.inner()),
        _ => None,
    }
}

impl fmt::Display for MappingSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}
