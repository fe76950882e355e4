use crate::parser::{
    Expr, Literal, MemberProperty, ParseErrorKind, ParseOptions, Property, PropertyKey, Span,
    StatementKind, UnaryOp, parse, parse_with_options,
};
use bumpalo::Bump;
use pretty_assertions::assert_eq;

fn single<'a>(arena: &'a Bump, source: &'a str) -> &'a Expr<'a> {
    let parsed = parse(arena, source).unwrap_or_else(|e| panic!("{}: {}", source, e));
    match parsed.statements {
        [statement] => match statement.kind {
            StatementKind::Expression(expr) => expr,
            ref other => panic!("{} parsed as {}", source, other.describe()),
        },
        other => panic!("{} parsed into {} statements", source, other.len()),
    }
}

fn error_kind(source: &str) -> ParseErrorKind {
    let arena = Bump::new();
    match parse(&arena, source) {
        Ok(parsed) => panic!("{} parsed as {:?}", source, parsed.statements),
        Err(e) => e.kind,
    }
}

#[test]
fn test_number_literals() {
    let arena = Bump::new();
    let cases = [
        ("42", 42.0),
        ("3.5", 3.5),
        (".5", 0.5),
        ("1e3", 1000.0),
        ("2.5E-1", 0.25),
        ("0xff", 255.0),
        ("0o17", 15.0),
        ("0b101", 5.0),
    ];
    for (source, expected) in cases {
        assert_eq!(
            *single(&arena, source),
            Expr::Literal(Literal::Number(expected)),
            "{}",
            source
        );
    }
}

#[test]
fn test_string_literals() {
    let arena = Bump::new();
    assert_eq!(
        *single(&arena, r#""double""#),
        Expr::Literal(Literal::Str("double"))
    );
    assert_eq!(
        *single(&arena, r"'it\'s'"),
        Expr::Literal(Literal::Str("it's"))
    );
    assert!(matches!(
        error_kind(r"'\x4'"),
        ParseErrorKind::InvalidString { .. }
    ));
}

#[test]
fn test_keyword_literals() {
    let arena = Bump::new();
    assert_eq!(*single(&arena, "true"), Expr::Literal(Literal::Bool(true)));
    assert_eq!(*single(&arena, "false"), Expr::Literal(Literal::Bool(false)));
    assert_eq!(*single(&arena, "null"), Expr::Literal(Literal::Null));
    assert_eq!(*single(&arena, "this"), Expr::This);
    assert_eq!(*single(&arena, "trueish"), Expr::Ident("trueish"));
}

#[test]
fn test_member_forms() {
    let arena = Bump::new();
    match single(&arena, "container.items[0]") {
        Expr::Member {
            object,
            property: MemberProperty::Computed(index),
        } => {
            assert_eq!(**index, Expr::Literal(Literal::Number(0.0)));
            assert_eq!(
                **object,
                Expr::Member {
                    object: &Expr::Ident("container"),
                    property: MemberProperty::Static("items"),
                }
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_object_literal_keys() {
    let arena = Bump::new();
    match single(&arena, "({ a: 1, 'b': 2, 3: 4, [k]: 5, c, ...rest })") {
        Expr::Object(properties) => {
            let keys: Vec<_> = properties
                .iter()
                .map(|p| match p {
                    Property::Keyed { key, .. } => match key {
                        PropertyKey::Ident(name) => format!("ident {}", name),
                        PropertyKey::Literal(Literal::Str(s)) => format!("string {}", s),
                        PropertyKey::Literal(Literal::Number(n)) => format!("number {}", n),
                        PropertyKey::Literal(other) => format!("{:?}", other),
                        PropertyKey::Computed(_) => "computed".to_string(),
                    },
                    Property::Spread(_) => "spread".to_string(),
                })
                .collect();
            assert_eq!(
                keys,
                vec!["ident a", "string b", "number 3", "computed", "ident c", "spread"]
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unsupported_syntax_still_parses() {
    let arena = Bump::new();
    assert!(matches!(single(&arena, "a = 1"), Expr::Assign { op: "=", .. }));
    assert!(matches!(single(&arena, "a += 1"), Expr::Assign { op: "+=", .. }));
    assert!(matches!(single(&arena, "x => x"), Expr::Arrow { .. }));
    assert!(matches!(single(&arena, "(a, b) => a"), Expr::Arrow { .. }));
    assert!(matches!(single(&arena, "a, b"), Expr::Sequence(items) if items.len() == 2));
    assert!(matches!(single(&arena, "a++"), Expr::Update { prefix: false, .. }));
    assert!(matches!(
        single(&arena, "typeof a"),
        Expr::Unary {
            op: UnaryOp::Typeof,
            ..
        }
    ));
    assert!(matches!(
        single(&arena, "delete a.b"),
        Expr::Unary {
            op: UnaryOp::Delete,
            ..
        }
    ));
}

#[test]
fn test_statement_kinds() {
    let arena = Bump::new();
    let parsed = parse(&arena, "let x = 1; if (x) { y } ").unwrap();
    assert_eq!(parsed.statements.len(), 2);
    assert_eq!(parsed.statements[0].kind, StatementKind::Declaration("let"));
    assert_eq!(parsed.statements[1].kind, StatementKind::Control("if"));

    let parsed = parse(&arena, "{ a; b }").unwrap();
    assert_eq!(parsed.statements[0].kind, StatementKind::Block);

    let parsed = parse(&arena, "1;;").unwrap();
    assert_eq!(parsed.statements.len(), 2);
    assert_eq!(parsed.statements[1].kind, StatementKind::Empty);
}

#[test]
fn test_spans_cover_nodes() {
    let arena = Bump::new();
    let parsed = parse(&arena, "a + b.c").unwrap();
    let StatementKind::Expression(expr) = parsed.statements[0].kind else {
        panic!("expected expression");
    };
    assert_eq!(parsed.ann.span_of(expr), Some(Span::new(0, 7)));
    match expr {
        Expr::Binary { right, .. } => {
            assert_eq!(parsed.ann.span_of(right), Some(Span::new(4, 7)));
            assert_eq!(parsed.ann.snippet(Span::new(4, 7)), "b.c");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(
        error_kind("1 +"),
        ParseErrorKind::UnexpectedToken { .. }
    ));
    assert!(matches!(
        error_kind("container.items[0"),
        ParseErrorKind::UnexpectedToken { .. }
    ));
    assert!(matches!(
        error_kind("'unterminated"),
        ParseErrorKind::UnexpectedToken { .. }
    ));
}

#[test]
fn test_source_length_limit() {
    let arena = Bump::new();
    let options = ParseOptions {
        max_source_len: 8,
        ..Default::default()
    };
    assert!(parse_with_options(&arena, "12345678", options).is_ok());
    let err = parse_with_options(&arena, "123456789", options).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::SourceTooLong { len: 9, max_len: 8 }
    );
}

#[test]
fn test_nesting_limit() {
    let arena = Bump::new();
    let options = ParseOptions {
        max_depth: 3,
        ..Default::default()
    };
    assert!(parse_with_options(&arena, "(([1]))", options).is_ok());
    let err = parse_with_options(&arena, "a[b[c[d[0]]]]", options).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded {
            depth: 4,
            max_depth: 3
        }
    );
    assert_eq!(err.span, Span::new(7, 8));

    // Brackets inside string literals do not count.
    assert!(parse_with_options(&arena, "'[[[[[[' + \"((((\"", options).is_ok());
}

#[test]
fn test_deep_nesting_is_rejected_before_parsing() {
    let arena = Bump::new();
    let source = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let err = parse(&arena, arena.alloc_str(&source)).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::SourceTooLong { .. }));

    let source = format!("{}1{}", "[".repeat(100), "]".repeat(100));
    let err = parse(&arena, arena.alloc_str(&source)).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded { depth: 33, .. }
    ));
}
