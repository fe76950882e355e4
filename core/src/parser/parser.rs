use crate::parser::{
    BinaryOp, LogicalOp, Span, UnaryOp, UpdateOp,
    error::{ParseError, ParseErrorKind, convert_pest_error},
    nesting::check_nesting,
    parsed_expr::{
        Expr, Literal, MemberProperty, ParsedScript, Property, PropertyKey, Statement,
        StatementKind,
    },
    string_literal::unescape_string,
    syntax::AnnotatedSource,
};
use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        // Logical operators.
        .op(Op::infix(Rule::nullish, Assoc::Left))       // `??`
        .op(Op::infix(Rule::or, Assoc::Left))            // `||`
        .op(Op::infix(Rule::and, Assoc::Left))           // `&&`

        // Bitwise operators.
        .op(Op::infix(Rule::bit_or, Assoc::Left))        // `|`
        .op(Op::infix(Rule::bit_xor, Assoc::Left))       // `^`
        .op(Op::infix(Rule::bit_and, Assoc::Left))       // `&`

        // Equality and relational operators.
        .op(
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::ne, Assoc::Left) |
            Op::infix(Rule::strict_eq, Assoc::Left) |
            Op::infix(Rule::strict_ne, Assoc::Left)
        )                                               // `==`, `!=`, `===`, `!==`
        .op(
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::le, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left) |
            Op::infix(Rule::ge, Assoc::Left) |
            Op::infix(Rule::in_op, Assoc::Left) |
            Op::infix(Rule::instanceof_op, Assoc::Left)
        )                                               // `<`, `<=`, `>`, `>=`, `in`, `instanceof`
        .op(
            Op::infix(Rule::shl, Assoc::Left) |
            Op::infix(Rule::shr, Assoc::Left) |
            Op::infix(Rule::ushr, Assoc::Left)
        )                                               // `<<`, `>>`, `>>>`

        // Arithmetic operators.
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::rem, Assoc::Left)
        )                                               // `*`, `/`, `%`
        .op(Op::infix(Rule::pow, Assoc::Right))          // `**` (right-assoc)

        // Prefix operators.
        .op(
            Op::prefix(Rule::neg) |
            Op::prefix(Rule::plus) |
            Op::prefix(Rule::not) |
            Op::prefix(Rule::bit_not) |
            Op::prefix(Rule::typeof_op) |
            Op::prefix(Rule::void_op) |
            Op::prefix(Rule::delete_op) |
            Op::prefix(Rule::pre_inc) |
            Op::prefix(Rule::pre_dec)
        )

        // Postfix operators.
        .op(Op::postfix(Rule::post_inc) | Op::postfix(Rule::post_dec))  // `++`, `--`
        .op(
            Op::postfix(Rule::call_op) |
            Op::postfix(Rule::member_op) |
            Op::postfix(Rule::index_op)
        )                                               // `()`, `.`, `[]`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

/// Limits applied before and during parsing.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum syntactic nesting: brackets, prefix operator runs and
    /// right-nested `?:`, `=>`, assignments and `**`.
    ///
    /// Default: 32
    pub max_depth: usize,

    /// Maximum length of the expression text in bytes.
    ///
    /// Default: 4096
    pub max_source_len: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_source_len: 4096,
        }
    }
}

/// Parse script text with default limits.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<ParsedScript<'a>, ParseError> {
    parse_with_options(arena, source, ParseOptions::default())
}

/// Parse script text into arena-allocated statements.
pub fn parse_with_options<'a>(
    arena: &'a Bump,
    source: &'a str,
    options: ParseOptions,
) -> Result<ParsedScript<'a>, ParseError> {
    if source.len() > options.max_source_len {
        return Err(ParseError::new(
            ParseErrorKind::SourceTooLong {
                len: source.len(),
                max_len: options.max_source_len,
            },
            source,
            Span::new(0, source.len()),
        ));
    }
    check_nesting(source, options.max_depth)?;

    let mut pairs =
        ExpressionParser::parse(Rule::program, source).map_err(|e| convert_pest_error(e, source))?;

    let ann = arena.alloc(AnnotatedSource::new(arena, source));
    let builder = TreeBuilder { arena, ann, source };

    let program = pairs
        .next()
        .ok_or_else(|| builder.error(Span::new(0, source.len()), "missing program"))?;

    let mut statements = Vec::new();
    for pair in program.into_inner() {
        if pair.as_rule() == Rule::EOI {
            continue;
        }
        statements.push(builder.statement(pair)?);
    }

    tracing::trace!(count = statements.len(), "parsed statements");

    Ok(ParsedScript {
        statements: arena.alloc_slice_fill_iter(statements),
        ann,
    })
}

struct TreeBuilder<'a> {
    arena: &'a Bump,
    ann: &'a AnnotatedSource<'a, Expr<'a>>,
    source: &'a str,
}

impl<'a> TreeBuilder<'a> {
    fn alloc(&self, expr: Expr<'a>, span: Span) -> &'a Expr<'a> {
        let expr = self.arena.alloc(expr);
        self.ann.add_span(expr, span);
        expr
    }

    fn alloc_exprs(&self, exprs: &[&'a Expr<'a>]) -> &'a [&'a Expr<'a>] {
        self.arena.alloc_slice_copy(exprs)
    }

    fn span_of(&self, expr: &'a Expr<'a>) -> Span {
        self.ann.span_of(expr).unwrap_or(Span(0..0))
    }

    fn error(&self, span: Span, message: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::Other {
                message: message.to_string(),
            },
            self.source,
            span,
        )
    }

    fn unexpected(&self, pair: &Pair<'a, Rule>) -> ParseError {
        self.error(
            pair.as_span().into(),
            &format!("unexpected rule {:?}", pair.as_rule()),
        )
    }

    fn first_inner(&self, pair: Pair<'a, Rule>) -> Result<Pair<'a, Rule>, ParseError> {
        let span = pair.as_span();
        pair.into_inner()
            .next()
            .ok_or_else(|| self.error(span.into(), "missing expected pair in rule"))
    }

    fn next_pair(
        &self,
        pairs: &mut Pairs<'a, Rule>,
        span: &Span,
    ) -> Result<Pair<'a, Rule>, ParseError> {
        pairs
            .next()
            .ok_or_else(|| self.error(span.clone(), "missing expected pair in rule"))
    }

    fn statement(&self, pair: Pair<'a, Rule>) -> Result<Statement<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let kind = match pair.as_rule() {
            Rule::empty_statement => StatementKind::Empty,
            Rule::block_statement => StatementKind::Block,
            Rule::declaration => StatementKind::Declaration(self.first_inner(pair)?.as_str()),
            Rule::control_statement => StatementKind::Control(self.first_inner(pair)?.as_str()),
            Rule::expression_statement => {
                StatementKind::Expression(self.expr(self.first_inner(pair)?)?)
            }
            _ => return Err(self.unexpected(&pair)),
        };
        Ok(Statement { kind, span })
    }

    fn expr(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        match pair.as_rule() {
            Rule::expression => {
                let items = pair
                    .into_inner()
                    .map(|p| self.expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                match items.as_slice() {
                    [single] => Ok(*single),
                    _ => Ok(self.alloc(Expr::Sequence(self.alloc_exprs(&items)), span)),
                }
            }

            Rule::assignment => {
                let mut inner = pair.into_inner();
                let first = self.next_pair(&mut inner, &span)?;
                match inner.next() {
                    None => self.expr(first),
                    Some(op) => {
                        let target = self.expr(first)?;
                        let value = self.expr(self.next_pair(&mut inner, &span)?)?;
                        Ok(self.alloc(
                            Expr::Assign {
                                op: op.as_str(),
                                target,
                                value,
                            },
                            span,
                        ))
                    }
                }
            }

            Rule::arrow_function => {
                let mut inner = pair.into_inner();
                let params = self.next_pair(&mut inner, &span)?;
                let params: Vec<&'a str> = params.into_inner().map(|p| p.as_str()).collect();
                let body = self.expr(self.next_pair(&mut inner, &span)?)?;
                Ok(self.alloc(
                    Expr::Arrow {
                        params: self.arena.alloc_slice_copy(&params),
                        body,
                    },
                    span,
                ))
            }

            Rule::conditional => {
                let mut inner = pair.into_inner();
                let test = self.expr(self.next_pair(&mut inner, &span)?)?;
                match inner.next() {
                    None => Ok(test),
                    Some(consequent) => {
                        let consequent = self.expr(consequent)?;
                        let alternate = self.expr(self.next_pair(&mut inner, &span)?)?;
                        Ok(self.alloc(
                            Expr::Conditional {
                                test,
                                consequent,
                                alternate,
                            },
                            span,
                        ))
                    }
                }
            }

            Rule::binary => self.binary(pair.into_inner()),

            Rule::new_expr => self.new_expr(pair),

            Rule::number => {
                let value = parse_number(pair.as_str()).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidNumber {
                            text: pair.as_str().to_string(),
                        },
                        self.source,
                        span.clone(),
                    )
                })?;
                Ok(self.alloc(Expr::Literal(Literal::Number(value)), span))
            }

            Rule::string => {
                let value = self.string(pair)?;
                Ok(self.alloc(Expr::Literal(Literal::Str(value)), span))
            }

            Rule::true_lit => Ok(self.alloc(Expr::Literal(Literal::Bool(true)), span)),
            Rule::false_lit => Ok(self.alloc(Expr::Literal(Literal::Bool(false)), span)),
            Rule::null_lit => Ok(self.alloc(Expr::Literal(Literal::Null), span)),
            Rule::this_kw => Ok(self.alloc(Expr::This, span)),
            Rule::ident => Ok(self.alloc(Expr::Ident(pair.as_str()), span)),

            Rule::array => {
                let items = pair
                    .into_inner()
                    .map(|p| self.expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.alloc(Expr::Array(self.alloc_exprs(&items)), span))
            }

            Rule::object => {
                let properties = pair
                    .into_inner()
                    .map(|p| self.property(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.alloc(
                    Expr::Object(self.arena.alloc_slice_fill_iter(properties)),
                    span,
                ))
            }

            Rule::spread => {
                let inner = self.expr(self.first_inner(pair)?)?;
                Ok(self.alloc(Expr::Spread(inner), span))
            }

            _ => Err(self.unexpected(&pair)),
        }
    }

    fn binary(&self, pairs: Pairs<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        PRATT_PARSER
            .map_primary(|primary| self.expr(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let span = Span::new(op.as_span().start(), self.span_of(rhs).0.end);
                let unary = |op| Expr::Unary { op, expr: rhs };
                let update = |op| Expr::Update {
                    op,
                    prefix: true,
                    target: rhs,
                };
                let expr = match op.as_rule() {
                    Rule::neg => unary(UnaryOp::Neg),
                    Rule::plus => unary(UnaryOp::Plus),
                    Rule::not => unary(UnaryOp::Not),
                    Rule::bit_not => unary(UnaryOp::BitNot),
                    Rule::typeof_op => unary(UnaryOp::Typeof),
                    Rule::void_op => unary(UnaryOp::Void),
                    Rule::delete_op => unary(UnaryOp::Delete),
                    Rule::pre_inc => update(UpdateOp::Increment),
                    Rule::pre_dec => update(UpdateOp::Decrement),
                    _ => return Err(self.unexpected(&op)),
                };
                Ok(self.alloc(expr, span))
            })
            .map_infix(|lhs, op, rhs| {
                let (left, right) = (lhs?, rhs?);
                let span = Span::combine(&self.span_of(left), &self.span_of(right));
                let logical = |op| Expr::Logical { op, left, right };
                let expr = match op.as_rule() {
                    Rule::and => logical(LogicalOp::And),
                    Rule::or => logical(LogicalOp::Or),
                    Rule::nullish => logical(LogicalOp::Nullish),
                    rule => match binary_op(rule) {
                        Some(op) => Expr::Binary { op, left, right },
                        None => return Err(self.unexpected(&op)),
                    },
                };
                Ok(self.alloc(expr, span))
            })
            .map_postfix(|lhs, op| {
                let lhs = lhs?;
                let span = Span::new(self.span_of(lhs).0.start, op.as_span().end());
                self.postfix(lhs, op, span)
            })
            .parse(pairs)
    }

    fn postfix(
        &self,
        lhs: &'a Expr<'a>,
        op: Pair<'a, Rule>,
        span: Span,
    ) -> Result<&'a Expr<'a>, ParseError> {
        let expr = match op.as_rule() {
            Rule::call_op => Expr::Call {
                callee: lhs,
                args: self.arguments(op)?,
            },
            Rule::member_op => Expr::Member {
                object: lhs,
                property: MemberProperty::Static(self.first_inner(op)?.as_str()),
            },
            Rule::index_op => Expr::Member {
                object: lhs,
                property: MemberProperty::Computed(self.expr(self.first_inner(op)?)?),
            },
            Rule::post_inc => Expr::Update {
                op: UpdateOp::Increment,
                prefix: false,
                target: lhs,
            },
            Rule::post_dec => Expr::Update {
                op: UpdateOp::Decrement,
                prefix: false,
                target: lhs,
            },
            _ => return Err(self.unexpected(&op)),
        };
        Ok(self.alloc(expr, span))
    }

    fn arguments(&self, call: Pair<'a, Rule>) -> Result<&'a [&'a Expr<'a>], ParseError> {
        let args = call
            .into_inner()
            .map(|p| self.expr(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.alloc_exprs(&args))
    }

    fn new_expr(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::new_kw);

        let callee_pair = inner
            .next()
            .ok_or_else(|| self.error(span.clone(), "missing constructor"))?;
        let mut parts = callee_pair.into_inner();
        let mut callee = self.expr(self.next_pair(&mut parts, &span)?)?;
        for op in parts {
            let op_span = Span::new(self.span_of(callee).0.start, op.as_span().end());
            callee = self.postfix(callee, op, op_span)?;
        }

        let args = match inner.next() {
            Some(call) => self.arguments(call)?,
            None => &[],
        };
        Ok(self.alloc(Expr::New { callee, args }, span))
    }

    fn property(&self, pair: Pair<'a, Rule>) -> Result<Property<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        match pair.as_rule() {
            Rule::spread => Ok(Property::Spread(self.expr(self.first_inner(pair)?)?)),
            Rule::keyed_property => {
                let mut inner = pair.into_inner();
                let key_pair = self.next_pair(&mut inner, &span)?;
                let key = match key_pair.as_rule() {
                    Rule::computed_key => {
                        PropertyKey::Computed(self.expr(self.first_inner(key_pair)?)?)
                    }
                    Rule::string => PropertyKey::Literal(Literal::Str(self.string(key_pair)?)),
                    Rule::number => {
                        let text = key_pair.as_str();
                        let value = parse_number(text)
                            .ok_or_else(|| self.error(span.clone(), "invalid number key"))?;
                        PropertyKey::Literal(Literal::Number(value))
                    }
                    Rule::property_name => PropertyKey::Ident(key_pair.as_str()),
                    _ => return Err(self.unexpected(&key_pair)),
                };
                let value = self.expr(self.next_pair(&mut inner, &span)?)?;
                Ok(Property::Keyed { key, value })
            }
            Rule::shorthand_property => {
                let ident = self.first_inner(pair)?;
                let name = ident.as_str();
                let value = self.alloc(Expr::Ident(name), ident.as_span().into());
                Ok(Property::Keyed {
                    key: PropertyKey::Ident(name),
                    value,
                })
            }
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn string(&self, pair: Pair<'a, Rule>) -> Result<&'a str, ParseError> {
        let span: Span = pair.as_span().into();
        let body = self.first_inner(pair)?;
        unescape_string(self.arena, body.as_str()).map_err(|e| {
            ParseError::new(
                ParseErrorKind::InvalidString {
                    message: e.to_string(),
                },
                self.source,
                span,
            )
        })
    }
}

fn binary_op(rule: Rule) -> Option<BinaryOp> {
    let op = match rule {
        Rule::eq => BinaryOp::Eq,
        Rule::ne => BinaryOp::NotEq,
        Rule::strict_eq => BinaryOp::StrictEq,
        Rule::strict_ne => BinaryOp::StrictNotEq,
        Rule::lt => BinaryOp::Lt,
        Rule::le => BinaryOp::LtEq,
        Rule::gt => BinaryOp::Gt,
        Rule::ge => BinaryOp::GtEq,
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        Rule::rem => BinaryOp::Rem,
        Rule::pow => BinaryOp::Pow,
        Rule::in_op => BinaryOp::In,
        Rule::instanceof_op => BinaryOp::InstanceOf,
        Rule::bit_and => BinaryOp::BitAnd,
        Rule::bit_or => BinaryOp::BitOr,
        Rule::bit_xor => BinaryOp::BitXor,
        Rule::shl => BinaryOp::Shl,
        Rule::shr => BinaryOp::Shr,
        Rule::ushr => BinaryOp::UShr,
        _ => return None,
    };
    Some(op)
}

/// Numeric literal text to its value. Radix prefixes are case-insensitive.
fn parse_number(text: &str) -> Option<f64> {
    let radix_digits = |prefix: [&str; 2]| {
        text.strip_prefix(prefix[0])
            .or_else(|| text.strip_prefix(prefix[1]))
    };
    let in_radix = |digits: &str, radix: u32| {
        digits.chars().try_fold(0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
    };

    if let Some(digits) = radix_digits(["0x", "0X"]) {
        return in_radix(digits, 16);
    }
    if let Some(digits) = radix_digits(["0o", "0O"]) {
        return in_radix(digits, 8);
    }
    if let Some(digits) = radix_digits(["0b", "0B"]) {
        return in_radix(digits, 2);
    }
    text.parse::<f64>().ok()
}
