//! Error types shared by every conform crate.
//!
//! A [`ValidationError`] carries two parallel trails. `autos` holds the
//! messages the engine generated while unwinding, `errors` holds the
//! override messages supplied by whoever built the schema. Both trails
//! grow at the front as the failure propagates outwards, and entries are
//! position-aligned; either side of an entry may be empty.

use std::fmt;
use thiserror::Error;

use crate::value::Value;

/// Root cause of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value is not an instance of the declared type or container kind.
    TypeMismatch,
    /// Value differs from an exact literal.
    LiteralMismatch,
    /// Predicate returned false or failed.
    Predicate,
    /// Transform function failed with a non-validation error.
    Transform,
    /// Required mapping keys were absent.
    MissingKeys,
    /// A data key matched no key-schema.
    UnrecognizedKey,
    /// Distinct data keys collapsed onto the same output key.
    WrongKeys,
    /// Every branch of an `Or` failed.
    Disjunction,
    /// Nesting went past the configured limit.
    DepthExceeded,
    /// Raised by a caller-provided validator or transform.
    Custom,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::LiteralMismatch => "literal_mismatch",
            ErrorKind::Predicate => "predicate",
            ErrorKind::Transform => "transform",
            ErrorKind::MissingKeys => "missing_keys",
            ErrorKind::UnrecognizedKey => "unrecognized_key",
            ErrorKind::WrongKeys => "wrong_keys",
            ErrorKind::Disjunction => "disjunction",
            ErrorKind::DepthExceeded => "depth_exceeded",
            ErrorKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed validation.
///
/// `Display` renders [`ValidationError::message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    kind: ErrorKind,
    autos: Vec<Option<String>>,
    errors: Vec<Option<String>>,
}

impl ValidationError {
    /// Create a single-entry error.
    ///
    /// `error` is the override message in effect where the failure happened.
    pub fn new(kind: ErrorKind, auto: impl Into<String>, error: Option<&str>) -> Self {
        Self {
            kind,
            autos: vec![Some(auto.into())],
            errors: vec![error.map(str::to_string)],
        }
    }

    /// Error raised by caller code, e.g. from inside a transform function.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom, message, None)
    }

    /// Build an error from raw trails. Shorter trails are padded so both
    /// stay position-aligned.
    pub fn from_trails(
        kind: ErrorKind,
        mut autos: Vec<Option<String>>,
        mut errors: Vec<Option<String>>,
    ) -> Self {
        let len = autos.len().max(errors.len());
        autos.resize(len, None);
        errors.resize(len, None);
        Self {
            kind,
            autos,
            errors,
        }
    }

    /// Add one trail entry in front, as an outer node does when a nested
    /// failure passes through it.
    pub fn nest(mut self, auto: Option<String>, error: Option<&str>) -> Self {
        self.autos.insert(0, auto);
        self.errors.insert(0, error.map(str::to_string));
        self
    }

    /// Replace the root-cause classification.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn autos(&self) -> &[Option<String>] {
        &self.autos
    }

    pub fn errors(&self) -> &[Option<String>] {
        &self.errors
    }

    /// Consume the error and return its trails.
    pub fn into_trails(self) -> (Vec<Option<String>>, Vec<Option<String>>) {
        (self.autos, self.errors)
    }

    /// Newline-joined message.
    ///
    /// Caller-supplied overrides win over generated text. Empty entries are
    /// skipped and duplicates dropped, keeping first-seen order.
    pub fn message(&self) -> String {
        let overrides = unique(&self.errors);
        if overrides.is_empty() {
            unique(&self.autos).join("\n")
        } else {
            overrides.join("\n")
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

fn unique(trail: &[Option<String>]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(trail.len());
    for entry in trail.iter().flatten() {
        if !seen.contains(&entry.as_str()) {
            seen.push(entry);
        }
    }
    seen
}

/// Failure while building a schema tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("{schema} does not validate its default {default}: {source}")]
    InvalidDefault {
        schema: String,
        default: Value,
        source: ValidationError,
    },

    #[error("{combinator} needs at least one child schema")]
    EmptyCombinator { combinator: &'static str },
}

/// Failure converting a [`Value`] into another data model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("map key {0} is not a string")]
    NonStringKey(String),

    #[error("float {0} has no JSON representation")]
    NonFiniteFloat(f64),
}
