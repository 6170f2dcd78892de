//! Error taxonomy shared by every parser and model mutation in this crate.

use std::fmt;

/// Where a parse error was found.
///
/// File-oriented parsers (the OpenLDAP schema file format) report
/// `(line, column)`; in-memory text parsers (DNs, filters, RFC4512
/// descriptions) report a byte offset into the input they were given.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Position {
    LineColumn { line: usize, column: usize },
    Offset(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::LineColumn { line, column } => write!(f, "{}:{}", line, column),
            Position::Offset(o) => write!(f, "offset {}", o),
        }
    }
}

/// Holds the result of every fallible operation in this crate.
///
/// Note that this type is also a `Result`, so the usual combinators
/// (`map`, `and_then`, `?` ...) work unchanged.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type.
///
/// Kinds mirror the taxonomy in the specification: each variant names
/// one `Kind` from the error table, not a source-language exception
/// class.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid DN at {0}: {1}")]
    InvalidDn(Position, String),

    #[error("invalid RDN at {0}: {1}")]
    InvalidRdn(Position, String),

    #[error("invalid filter at {0}: {1}")]
    InvalidFilter(Position, String),

    #[error("invalid schema description at {0}: {1}")]
    InvalidSchemaDescription(Position, String),

    #[error("duplicate element {element} at {position}")]
    DuplicateElement { position: Position, element: String },

    #[error("unresolved macro {name}")]
    UnresolvedMacro { name: String },

    #[error("unknown attribute type {0}")]
    UnknownAttributeType(String),

    #[error("invalid value for syntax {syntax}: {reason}")]
    InvalidValue { syntax: String, reason: String },

    #[error("mutation rejected: schema object is locked")]
    ReadOnly,

    #[error("registry is immutable")]
    ReadOnlyRegistry,

    #[error("cursor is not positioned on an element")]
    InvalidCursorPosition,

    #[error("{0:?}")]
    NomError(nom::error::ErrorKind),
}

impl Error {
    pub fn invalid_dn(pos: Position, reason: impl Into<String>) -> Self {
        Error::InvalidDn(pos, reason.into())
    }

    pub fn invalid_rdn(pos: Position, reason: impl Into<String>) -> Self {
        Error::InvalidRdn(pos, reason.into())
    }

    pub fn invalid_filter(pos: Position, reason: impl Into<String>) -> Self {
        Error::InvalidFilter(pos, reason.into())
    }

    pub fn invalid_schema_description(pos: Position, reason: impl Into<String>) -> Self {
        Error::InvalidSchemaDescription(pos, reason.into())
    }
}

// Lets `nom` combinators (used by the filter and schema description
// parsers) carry our error type end to end instead of `nom`'s own.
impl<I> nom::error::ParseError<I> for Error {
    fn from_error_kind(_input: I, kind: nom::error::ErrorKind) -> Self {
        Error::NomError(kind)
    }
    fn append(_input: I, kind: nom::error::ErrorKind, _other: Self) -> Self {
        Error::NomError(kind)
    }
}

impl<I, E> nom::error::FromExternalError<I, E> for Error {
    fn from_external_error(_input: I, kind: nom::error::ErrorKind, _e: E) -> Error {
        Error::NomError(kind)
    }
}

/// A non-fatal diagnostic, e.g. a `NormalizationFailed` condition.
///
/// Unlike `Error`, a `Diagnostic` does not abort the operation that
/// produced it: the raw value is substituted and parsing continues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub cause: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }
}

/// Consumer-provided sink for non-fatal schema diagnostics.
///
/// The parser routes `NormalizationFailed` and similar recoverable
/// conditions through this handler instead of aborting, so the caller
/// decides how strict to be.
pub trait SchemaErrorHandler {
    fn handle(&mut self, diagnostic: Diagnostic);
    fn was_error(&self) -> bool;
    fn errors(&self) -> &[Diagnostic];
    fn reset(&mut self);
}

/// The default `SchemaErrorHandler`: collects every diagnostic in memory.
#[derive(Clone, Debug, Default)]
pub struct CollectingErrorHandler {
    diagnostics: Vec<Diagnostic>,
}

impl SchemaErrorHandler for CollectingErrorHandler {
    fn handle(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn was_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    fn errors(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn reset(&mut self) {
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_handler_accumulates() {
        let mut handler = CollectingErrorHandler::default();
        assert!(!handler.was_error());
        handler.handle(Diagnostic::new("normalization failed"));
        assert!(handler.was_error());
        assert_eq!(handler.errors().len(), 1);
        handler.reset();
        assert!(!handler.was_error());
    }
}
