use crate::parser::{Rule, Span};

/// Parser error with context
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub source: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Invalid number literal '{text}'")]
    InvalidNumber { text: String },

    #[error("Invalid string literal: {message}")]
    InvalidString { message: String },

    #[error("Expression nesting depth {depth} exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { depth: usize, max_depth: usize },

    #[error("Expression text is {len} bytes long, the maximum is {max_len}")]
    SourceTooLong { len: usize, max_len: usize },

    #[error("Only single expressions are allowed (found no statement)")]
    Empty,

    #[error("Only single expressions are allowed (found {count} statements)")]
    MultipleStatements { count: usize },

    #[error("Only single expressions are allowed (found {found})")]
    NotAnExpression { found: String },

    #[error("Assignments are not allowed")]
    Assignment,

    #[error("{message}")]
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, source: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source: source.into(),
            span,
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => {
            let expected = format_expected_rules(&positives);
            let found = if negatives.is_empty() {
                describe_input_at(source, span.0.start)
            } else {
                format_found_rules(&negatives)
            };
            ParseErrorKind::UnexpectedToken { expected, found }
        }
        ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, source, span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "something else".to_string();
    }

    let mut concepts: Vec<&str> = Vec::new();
    for rule in rules {
        let concept = match rule {
            Rule::number | Rule::string | Rule::true_lit | Rule::false_lit | Rule::null_lit => {
                "literal"
            }
            Rule::ident | Rule::property_name => "identifier",
            Rule::EOI => "end of input",
            Rule::assign_op => "assignment operator",
            Rule::call_op | Rule::member_op | Rule::index_op => "member access or call",
            Rule::nullish
            | Rule::or
            | Rule::and
            | Rule::bit_or
            | Rule::bit_xor
            | Rule::bit_and
            | Rule::strict_eq
            | Rule::strict_ne
            | Rule::eq
            | Rule::ne
            | Rule::ushr
            | Rule::shr
            | Rule::shl
            | Rule::le
            | Rule::ge
            | Rule::lt
            | Rule::gt
            | Rule::instanceof_op
            | Rule::in_op
            | Rule::pow
            | Rule::add
            | Rule::sub
            | Rule::mul
            | Rule::div
            | Rule::rem => "operator",
            _ => "expression",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => "something else".to_string(),
    }
}

/// Format found rules in a human-readable way
fn format_found_rules(rules: &[Rule]) -> String {
    match rules.first() {
        Some(Rule::ident) => "identifier".to_string(),
        Some(Rule::number) => "number".to_string(),
        Some(Rule::string) => "string".to_string(),
        Some(Rule::EOI) => "end of input".to_string(),
        Some(rule) => format!("{:?}", rule),
        None => "unexpected token".to_string(),
    }
}

fn describe_input_at(source: &str, pos: usize) -> String {
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        Some(c) => format!("'{}'", c),
        None => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_expected_rules() {
        let rules = vec![Rule::number, Rule::string];
        assert_eq!(format_expected_rules(&rules), "literal");

        let rules = vec![Rule::ident, Rule::EOI];
        assert_eq!(format_expected_rules(&rules), "identifier or end of input");
    }

    #[test]
    fn test_describe_input_at() {
        assert_eq!(describe_input_at("1 + @", 4), "'@'");
        assert_eq!(describe_input_at("1 +", 3), "end of input");
    }

    #[test]
    fn test_display_includes_span() {
        let error = ParseError::new(
            ParseErrorKind::MultipleStatements { count: 2 },
            "1; 2",
            Span(0..4),
        );
        assert_eq!(
            error.to_string(),
            "Only single expressions are allowed (found 2 statements) at 0..4"
        );
    }
}
