//! Errors surfaced by a single evaluation call.
//!
//! Every failure aborts the call that raised it. The caller decides whether a
//! failed expression is an authoring bug or a condition to treat as false.

use core::fmt;

use crate::parser::{ParseError, ParseErrorKind, Span};

/// An evaluation failure, located in the expression text when possible.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseErrorKind),

    #[error("Unknown identifier: {name}")]
    UnknownIdentifier { name: String },

    #[error("{0}")]
    AccessProhibited(Prohibited),

    #[error("{0}")]
    MutationProhibited(Mutation),

    #[error("Unsupported callee: {description}")]
    UnsupportedCallee { description: String },

    #[error("Callee is not a function: {callee}")]
    NotAFunction { callee: String },

    #[error("Unsupported node type: {node}")]
    UnsupportedNodeType { node: &'static str },

    #[error("Unsupported {kind} operator {op}")]
    UnsupportedOperator { kind: &'static str, op: &'static str },

    #[error("Expression too complex: {0}")]
    ExpressionTooComplex(Limit),

    #[error("Value of evaluated script is not a string, number, boolean, or null (found {found})")]
    InvalidResultType { found: &'static str },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("Invalid arguments to {function}: {message}")]
    InvalidArguments { function: String, message: String },
}

/// Why a read was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Prohibited {
    #[error("Access to property {0} is prohibited")]
    Property(String),

    #[error("Computed properties must be simple")]
    ComputedKey,

    #[error("Object keys must be literal/identifier")]
    ObjectKey,

    #[error("{0} must be called with the calling container as its scope")]
    FinderScope(String),
}

/// The write that was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mutation {
    #[error("Calling mutator {0} is prohibited")]
    Call(String),

    #[error("Setting property {0} is prohibited")]
    Set(String),

    #[error("Deleting property {0} is prohibited")]
    Delete(String),

    #[error("Redefining property {0} is prohibited")]
    DefineProperty(String),

    #[error("Changing the prototype is prohibited")]
    SetPrototype,
}

/// The resource ceiling that was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Limit {
    #[error("more than {max} nodes visited")]
    Nodes { max: usize },

    #[error("nested deeper than {max} levels")]
    Depth { max: usize },
}

impl ErrorKind {
    /// Stable category name, one per failure class.
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::Parse(_) => "ParseError",
            ErrorKind::UnknownIdentifier { .. } => "UnknownIdentifier",
            ErrorKind::AccessProhibited(_) => "AccessProhibited",
            ErrorKind::MutationProhibited(_) => "MutationProhibited",
            ErrorKind::UnsupportedCallee { .. } => "UnsupportedCallee",
            ErrorKind::NotAFunction { .. } => "NotAFunction",
            ErrorKind::UnsupportedNodeType { .. } => "UnsupportedNodeType",
            ErrorKind::UnsupportedOperator { .. } => "UnsupportedOperator",
            ErrorKind::ExpressionTooComplex(_) => "ExpressionTooComplex",
            ErrorKind::InvalidResultType { .. } => "InvalidResultType",
            ErrorKind::TypeError { .. } => "TypeError",
            ErrorKind::InvalidArguments { .. } => "InvalidArguments",
        }
    }

    pub(crate) fn invalid_arguments(function: &str, message: impl Into<String>) -> Self {
        ErrorKind::InvalidArguments {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        ErrorKind::TypeError {
            message: message.into(),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self {
            kind: ErrorKind::Parse(err.kind),
            span: Some(err.span),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{} at {}", self.kind, span),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}
