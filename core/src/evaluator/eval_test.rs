//! Unit tests for the evaluator.

use std::sync::Arc;

use bumpalo::Bump;
use pretty_assertions::assert_eq;

use super::*;
use crate::{
    errors::{Error, ErrorKind, Limit, Mutation, Prohibited},
    parser,
    stdlib::{ALLOWED_GLOBALS, EntityFinder, FinderQuery, NoEntities},
    values::{PropertyMap, Value, coerce::to_string},
};

fn room() -> Value {
    let exits: PropertyMap = [("north", Value::from("hall"))].into_iter().collect();
    let map: PropertyMap = [
        ("name", Value::from("cellar")),
        ("depth", Value::from(3.0)),
        ("tags", Value::list([Value::from("dark"), Value::from("damp")])),
        ("exits", Value::map(exits)),
        ("owner", Value::Null),
        (
            "lookup",
            ALLOWED_GLOBALS
                .get("findRoom")
                .cloned()
                .unwrap_or(Value::Undefined),
        ),
    ]
    .into_iter()
    .collect();
    Value::map(map)
}

fn hero() -> Value {
    let map: PropertyMap = [("name", Value::from("Ava")), ("hp", Value::from(12.0))]
        .into_iter()
        .collect();
    Value::map(map)
}

struct Runner {
    options: EvaluatorOptions,
    finder: Box<dyn EntityFinder>,
}

impl Runner {
    fn new() -> Self {
        Self {
            options: EvaluatorOptions::default(),
            finder: Box::new(NoEntities),
        }
    }

    fn with_options(options: EvaluatorOptions) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    fn run(&self, source: &str) -> Result<Value, Error> {
        let arena = Bump::new();
        let source = arena.alloc_str(source);
        let script = parser::parse(&arena, source)?;
        let expr = parser::adapt(&arena, &script)?;
        let mut context = Context::build(&room(), &hero(), ALLOWED_GLOBALS.clone());
        eval(self.options, &expr, &mut context, self.finder.as_ref())
    }

    fn text(&self, source: &str) -> String {
        let value = self
            .run(source)
            .unwrap_or_else(|e| panic!("{} failed: {}", source, e));
        to_string(&value).to_string()
    }

    fn fail(&self, source: &str) -> ErrorKind {
        match self.run(source) {
            Ok(value) => panic!("{} should fail, got {:?}", source, value),
            Err(err) => err.kind,
        }
    }
}

#[test]
fn test_literals_and_arithmetic() {
    let r = Runner::new();
    assert_eq!(r.text("1 + 2 * 3"), "7");
    assert_eq!(r.text("'a' + 1"), "a1");
    assert_eq!(r.text("2 ** 10"), "1024");
    assert_eq!(r.text("-(3 - 5)"), "2");
    assert_eq!(r.text("!0"), "true");
    assert_eq!(r.text("null"), "null");
}

#[test]
fn test_logical_and_conditional() {
    let r = Runner::new();
    assert_eq!(r.text("0 || 'x'"), "x");
    assert_eq!(r.text("'' && missing"), "");
    assert_eq!(r.text("container.depth > 2 ? 'deep' : 'shallow'"), "deep");
}

#[test]
fn test_short_circuit_skips_right_side() {
    let r = Runner::new();
    // `missing` would be an unknown identifier if evaluated.
    assert_eq!(r.text("true || missing"), "true");
    assert_eq!(r.text("false && missing"), "false");
    assert_eq!(r.text("true ? 1 : missing"), "1");
}

#[test]
fn test_identifiers() {
    let r = Runner::new();
    assert_eq!(r.text("container.name"), "cellar");
    assert_eq!(r.text("this.name"), "cellar");
    assert_eq!(r.text("player.name + ' ' + player.hp"), "Ava 12");
    assert_eq!(r.text("Math.PI > 3"), "true");
    assert_eq!(
        r.fail("depth"),
        ErrorKind::UnknownIdentifier {
            name: "depth".into()
        }
    );
}

#[test]
fn test_member_chains() {
    let r = Runner::new();
    assert_eq!(r.text("container.exits.north"), "hall");
    assert_eq!(r.text("container['exits']['north']"), "hall");
    assert_eq!(r.text("container.tags[1]"), "damp");
    assert_eq!(r.text("container.tags.length"), "2");
    assert_eq!(r.text("container.tags.join('+')"), "dark+damp");
    assert_eq!(r.text("container.owner.name"), "undefined");
    assert_eq!(r.text("container.nothing.at.all"), "undefined");
    assert_eq!(r.text("container.name.toUpperCase()"), "CELLAR");
}

#[test]
fn test_computed_keys() {
    let r = Runner::new();
    assert_eq!(r.text("container.tags[NaN]"), "undefined");
    assert_eq!(r.text("container.tags[undefined]"), "undefined");
    assert_eq!(r.text("container.name[0]"), "c");
}

#[test]
fn test_blocked_properties() {
    crate::test_utils::init_test_logging();
    let r = Runner::new();
    for source in [
        "container.constructor",
        "container.__proto__",
        "container.tags.constructor.constructor",
        "container['prototype']",
        "'abc'.constructor",
        "container.name.__defineGetter__",
    ] {
        assert!(
            matches!(
                r.fail(source),
                ErrorKind::AccessProhibited(Prohibited::Property(_))
            ),
            "{}",
            source
        );
    }
}

#[test]
fn test_blocked_names_are_checked_before_evaluation() {
    let r = Runner::new();
    // The root is unknown, but the blocked step is reported first.
    assert_eq!(
        r.fail("nowhere.constructor"),
        ErrorKind::AccessProhibited(Prohibited::Property("constructor".into()))
    );
}

#[test]
fn test_computed_key_shapes() {
    let r = Runner::new();
    assert_eq!(
        r.fail("container['na' + 'me']"),
        ErrorKind::AccessProhibited(Prohibited::ComputedKey)
    );
    assert_eq!(
        r.fail("container[player]"),
        ErrorKind::AccessProhibited(Prohibited::ComputedKey)
    );
    assert_eq!(r.text("container.tags[0]"), "dark");
}

#[test]
fn test_unsupported_operators() {
    let r = Runner::new();
    for (source, op) in [
        ("typeof container", "typeof"),
        ("void 0", "void"),
        ("~1", "~"),
    ] {
        assert_eq!(
            r.fail(source),
            ErrorKind::UnsupportedOperator { kind: "unary", op },
            "{}",
            source
        );
    }
    assert_eq!(
        r.fail("1 << 2"),
        ErrorKind::UnsupportedOperator {
            kind: "binary",
            op: "<<"
        }
    );
    // Rejected before either side is evaluated.
    for source in ["null ?? 1", "missing ?? 1", "container.constructor ?? 1"] {
        assert_eq!(
            r.fail(source),
            ErrorKind::UnsupportedOperator {
                kind: "logical",
                op: "??"
            },
            "{}",
            source
        );
    }
}

#[test]
fn test_unsupported_nodes() {
    let r = Runner::new();
    assert!(matches!(
        r.fail("(1, 2)"),
        ErrorKind::UnsupportedNodeType { .. }
    ));
    assert_eq!(
        r.fail("[...container.tags]"),
        ErrorKind::UnsupportedNodeType {
            node: "SpreadElement"
        }
    );
    assert_eq!(
        r.fail("(x => x)(1)"),
        ErrorKind::UnsupportedNodeType {
            node: "ArrowFunctionExpression"
        }
    );
}

#[test]
fn test_calls() {
    let r = Runner::new();
    assert_eq!(r.text("Math.max(1, 5, 3)"), "5");
    assert_eq!(r.text("parseInt('42px')"), "42");
    assert_eq!(r.text("isNaN(container.name)"), "true");
    assert_eq!(
        r.fail("container()"),
        ErrorKind::UnsupportedCallee {
            description: "container is not a callable global".into()
        }
    );
    assert_eq!(
        r.fail("NaN()"),
        ErrorKind::NotAFunction {
            callee: "NaN".into()
        }
    );
    assert_eq!(
        r.fail("eval('1')"),
        ErrorKind::UnknownIdentifier {
            name: "eval".into()
        }
    );
    assert_eq!(
        r.fail("Function('x')()"),
        ErrorKind::UnknownIdentifier {
            name: "Function".into()
        }
    );
    assert!(matches!(
        r.fail("container.name()"),
        ErrorKind::NotAFunction { .. }
    ));
}

#[test]
fn test_blocked_mutators() {
    let r = Runner::new();
    assert_eq!(
        r.fail("container.tags.push('x')"),
        ErrorKind::MutationProhibited(Mutation::Call("push".into()))
    );
    assert_eq!(
        r.fail("container.tags.sort()"),
        ErrorKind::MutationProhibited(Mutation::Call("sort".into()))
    );
    assert_eq!(r.text("container.tags.length"), "2");
}

#[test]
fn test_new() {
    let r = Runner::new();
    assert_eq!(
        r.text("new Date(0).toISOString()"),
        "1970-01-01T00:00:00.000Z"
    );
    assert_eq!(
        r.fail("new Object()"),
        ErrorKind::UnsupportedCallee {
            description: "unknown constructor Object".into()
        }
    );
    assert!(matches!(
        r.fail("new container.tags()"),
        ErrorKind::UnsupportedCallee { .. }
    ));
}

#[test]
fn test_array_and_object_literals() {
    let r = Runner::new();
    assert_eq!(r.text("[1, 'a', container.depth]"), "1,a,3");
    assert_eq!(r.text("'a' in { a: 1 }"), "true");
    assert_eq!(r.text("1 in ['x', 'y']"), "true");
    assert_eq!(r.text("'b' in { 'a': 1, 2: 'two' }"), "false");
    // Literals cannot start a member chain.
    assert_eq!(
        r.fail("[1, 2, 3].length"),
        ErrorKind::UnsupportedNodeType {
            node: "ArrayExpression"
        }
    );
    assert_eq!(
        r.fail("({ a: 1 }).a"),
        ErrorKind::UnsupportedNodeType {
            node: "ObjectExpression"
        }
    );
    assert_eq!(
        r.fail("({ [player.name]: 1 })"),
        ErrorKind::AccessProhibited(Prohibited::ObjectKey)
    );
}

#[test]
fn test_strict_equality_uses_identity() {
    let r = Runner::new();
    assert_eq!(r.text("this === container"), "true");
    assert_eq!(r.text("container.exits === container.exits"), "true");
    assert_eq!(r.text("container === player"), "false");
    assert_eq!(r.text("[1] === [1]"), "false");
    assert_eq!(r.text("container.tags.join === container.tags.join"), "true");
    assert_eq!(r.text("container.tags.join === container.tags.slice"), "false");
}

#[test]
fn test_node_budget() {
    let options = EvaluatorOptions {
        max_nodes: 5,
        max_depth: 32,
    };
    let r = Runner::with_options(options);
    // Binary + two literals: three nodes.
    assert_eq!(r.text("1 + 2"), "3");
    assert_eq!(
        r.fail("1 + 2 + 3 + 4"),
        ErrorKind::ExpressionTooComplex(Limit::Nodes { max: 5 })
    );
    // One node for the root and one per step.
    assert_eq!(r.text("container.exits.north.length"), "4");
    assert_eq!(
        r.fail("container.exits.north.length.toFixed.name"),
        ErrorKind::ExpressionTooComplex(Limit::Nodes { max: 5 })
    );
}

#[test]
fn test_depth_budget() {
    let options = EvaluatorOptions {
        max_nodes: 1000,
        max_depth: 4,
    };
    let r = Runner::with_options(options);
    assert_eq!(r.text("-(-(-1))"), "-1");
    assert_eq!(
        r.fail("-(-(-(-1)))"),
        ErrorKind::ExpressionTooComplex(Limit::Depth { max: 4 })
    );
}

#[test]
fn test_errors_carry_spans() {
    let r = Runner::new();
    let err = r.run("1 + container.constructor").unwrap_err();
    assert_eq!(err.span, Some(parser::Span::new(4, 25)));
}

struct OneRoom;

impl EntityFinder for OneRoom {
    fn find_one(&self, query: &FinderQuery) -> Result<Option<Value>, ErrorKind> {
        Ok(query
            .str_arg("id")
            .filter(|id| &**id == "hall")
            .map(|id| Value::from(id.to_string())))
    }

    fn find_all(&self, _query: &FinderQuery) -> Result<Vec<Value>, ErrorKind> {
        Ok(vec![room()])
    }
}

#[test]
fn test_finders_receive_the_container() {
    let r = Runner {
        options: EvaluatorOptions::default(),
        finder: Box::new(OneRoom),
    };
    assert_eq!(r.text("findRoom('hall')"), "hall");
    assert_eq!(r.text("findRoom(container, 'hall')"), "hall");
    assert_eq!(r.text("findRoom('cellar')"), "undefined");
    assert_eq!(r.text("findRooms()[0].name"), "cellar");
    // Reached through a member call, the finder gets no implicit container.
    assert_eq!(
        r.fail("container.lookup(player, 'hall')"),
        ErrorKind::AccessProhibited(Prohibited::FinderScope("findRoom".into()))
    );
    assert_eq!(r.text("container.lookup(container, 'hall')"), "hall");
}

#[test]
fn test_host_data_is_never_modified() {
    let arena = Bump::new();
    let source = arena.alloc_str("container.tags.reverse()");
    let script = parser::parse(&arena, source).unwrap();
    let expr = parser::adapt(&arena, &script).unwrap();
    let container = room();
    let mut context = Context::build(&container, &hero(), Arc::clone(&ALLOWED_GLOBALS));
    let result = eval(EvaluatorOptions::default(), &expr, &mut context, &NoEntities);
    assert!(result.is_err());
    let tags: Vec<String> = match &container {
        Value::Map(map) => map
            .get("tags")
            .and_then(Value::as_list)
            .map(|items| items.iter().map(|v| to_string(v).to_string()).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    assert_eq!(tags, vec!["dark", "damp"]);
}
