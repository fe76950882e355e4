pub mod adapter;
pub mod error;
mod nesting;
mod parsed_expr;
pub mod parser;
pub mod string_literal;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::ExpressionParser;
pub use parser::ParseOptions;
pub use parser::Rule;
pub use parser::parse;
pub use parser::parse_with_options;

pub use adapter::{CONTAINER, adapt, is_finder_name};
pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::{
    Expr, Literal, MemberProperty, ParsedExpr, ParsedScript, Property, PropertyKey, Statement,
    StatementKind,
};
pub use syntax::AnnotatedSource;
pub use syntax::{BinaryOp, LogicalOp, Span, UnaryOp, UpdateOp};

#[cfg(test)]
mod parse_test;
