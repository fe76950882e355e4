//! Grammar adapter: narrows a parsed script to one rewritten expression.
//!
//! Two structural rewrites are applied to the single expression statement:
//!
//! - every `this` becomes the identifier `container`;
//! - every bare call to a finder function (`find` followed by an uppercase
//!   letter) receives `container` as its first argument, unless the author
//!   already wrote it there.

use crate::parser::{
    ParseError, ParseErrorKind, Span,
    parsed_expr::{
        Expr, MemberProperty, ParsedExpr, ParsedScript, Property, PropertyKey, StatementKind,
    },
    syntax::AnnotatedSource,
};
use bumpalo::Bump;

/// Identifier the self token is rewritten to.
pub const CONTAINER: &str = "container";

/// Whether `name` follows the finder naming pattern.
pub fn is_finder_name(name: &str) -> bool {
    name.strip_prefix("find")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Adapt a parsed script into a single expression.
pub fn adapt<'a>(
    arena: &'a Bump,
    script: &ParsedScript<'a>,
) -> Result<ParsedExpr<'a>, ParseError> {
    let source = script.ann.source;
    let whole = Span::new(0, source.len());

    let statement = match script.statements {
        [] => {
            return Err(ParseError::new(ParseErrorKind::Empty, source, whole));
        }
        [single] => single,
        [_, second, ..] => {
            return Err(ParseError::new(
                ParseErrorKind::MultipleStatements {
                    count: script.statements.len(),
                },
                source,
                second.span.clone(),
            ));
        }
    };

    let expr = match &statement.kind {
        StatementKind::Expression(expr) => *expr,
        other => {
            return Err(ParseError::new(
                ParseErrorKind::NotAnExpression {
                    found: other.describe(),
                },
                source,
                statement.span.clone(),
            ));
        }
    };

    if let Expr::Assign { .. } = expr {
        return Err(ParseError::new(
            ParseErrorKind::Assignment,
            source,
            statement.span.clone(),
        ));
    }

    let rewriter = Rewriter {
        arena,
        ann: script.ann,
    };
    let expr = rewriter.rewrite(expr);

    Ok(ParsedExpr {
        expr,
        ann: script.ann,
    })
}

struct Rewriter<'a> {
    arena: &'a Bump,
    ann: &'a AnnotatedSource<'a, Expr<'a>>,
}

impl<'a> Rewriter<'a> {
    /// Allocate `expr` with the span of the node it replaces.
    fn replace(&self, original: &'a Expr<'a>, expr: Expr<'a>) -> &'a Expr<'a> {
        let new = self.arena.alloc(expr);
        if let Some(span) = self.ann.span_of(original) {
            self.ann.add_span(new, span);
        }
        new
    }

    fn rewrite_all(&self, exprs: &'a [&'a Expr<'a>]) -> &'a [&'a Expr<'a>] {
        self.arena
            .alloc_slice_fill_iter(exprs.iter().map(|e| self.rewrite(*e)))
    }

    fn rewrite(&self, expr: &'a Expr<'a>) -> &'a Expr<'a> {
        let rewritten = match *expr {
            Expr::Literal(_) | Expr::Ident(_) => return expr,
            Expr::This => Expr::Ident(CONTAINER),
            Expr::Unary { op, expr: inner } => Expr::Unary {
                op,
                expr: self.rewrite(inner),
            },
            Expr::Update { op, prefix, target } => Expr::Update {
                op,
                prefix,
                target: self.rewrite(target),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op,
                left: self.rewrite(left),
                right: self.rewrite(right),
            },
            Expr::Logical { op, left, right } => Expr::Logical {
                op,
                left: self.rewrite(left),
                right: self.rewrite(right),
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: self.rewrite(test),
                consequent: self.rewrite(consequent),
                alternate: self.rewrite(alternate),
            },
            Expr::Assign { op, target, value } => Expr::Assign {
                op,
                target: self.rewrite(target),
                value: self.rewrite(value),
            },
            Expr::Sequence(items) => Expr::Sequence(self.rewrite_all(items)),
            Expr::Member { object, property } => Expr::Member {
                object: self.rewrite(object),
                property: match property {
                    MemberProperty::Static(name) => MemberProperty::Static(name),
                    MemberProperty::Computed(key) => MemberProperty::Computed(self.rewrite(key)),
                },
            },
            Expr::Call { callee, args } => {
                let args = self.rewrite_all(args);
                let args = match callee {
                    Expr::Ident(name) if is_finder_name(name) => self.inject_container(callee, args),
                    _ => args,
                };
                Expr::Call {
                    callee: self.rewrite(callee),
                    args,
                }
            }
            Expr::New { callee, args } => Expr::New {
                callee: self.rewrite(callee),
                args: self.rewrite_all(args),
            },
            Expr::Array(items) => Expr::Array(self.rewrite_all(items)),
            Expr::Object(properties) => {
                Expr::Object(self.arena.alloc_slice_fill_iter(properties.iter().map(
                    |property| match property {
                        Property::Keyed { key, value } => Property::Keyed {
                            key: match key {
                                PropertyKey::Computed(k) => PropertyKey::Computed(self.rewrite(*k)),
                                other => *other,
                            },
                            value: self.rewrite(*value),
                        },
                        Property::Spread(inner) => Property::Spread(self.rewrite(*inner)),
                    },
                )))
            }
            Expr::Spread(inner) => Expr::Spread(self.rewrite(inner)),
            Expr::Arrow { params, body } => Expr::Arrow {
                params,
                body: self.rewrite(body),
            },
        };
        self.replace(expr, rewritten)
    }

    /// Prepend `container` to an already rewritten argument list.
    fn inject_container(
        &self,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    ) -> &'a [&'a Expr<'a>] {
        if args.first().is_some_and(|first| first.is_ident(CONTAINER)) {
            return args;
        }
        let container = self.replace(callee, Expr::Ident(CONTAINER));
        let mut injected = Vec::with_capacity(args.len() + 1);
        injected.push(container);
        injected.extend_from_slice(args);
        self.arena.alloc_slice_copy(&injected)
    }
}
