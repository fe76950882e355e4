use crate::parser::{BinaryOp, LogicalOp, Span, UnaryOp, UpdateOp, syntax::AnnotatedSource};
use serde::Serialize;

/// A parsed script: every top-level statement, in source order.
#[derive(Debug)]
pub struct ParsedScript<'a> {
    pub statements: &'a [Statement<'a>],
    pub ann: &'a AnnotatedSource<'a, Expr<'a>>,
}

/// A single expression ready for evaluation.
#[derive(Debug)]
pub struct ParsedExpr<'a> {
    pub expr: &'a Expr<'a>,
    pub ann: &'a AnnotatedSource<'a, Expr<'a>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    pub kind: StatementKind<'a>,
    pub span: Span,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum StatementKind<'a> {
    Expression(&'a Expr<'a>),
    /// `let`, `const` or `var`.
    Declaration(&'a str),
    Block,
    Empty,
    /// A statement led by a control keyword such as `if` or `return`.
    Control(&'a str),
}

impl StatementKind<'_> {
    pub fn describe(&self) -> String {
        match self {
            StatementKind::Expression(_) => "expression statement".to_string(),
            StatementKind::Declaration(keyword) => format!("`{}` declaration", keyword),
            StatementKind::Block => "block statement".to_string(),
            StatementKind::Empty => "empty statement".to_string(),
            StatementKind::Control(keyword) => format!("`{}` statement", keyword),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(Literal<'a>),
    Ident(&'a str),
    This,
    Unary {
        op: UnaryOp,
        expr: &'a Expr<'a>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: &'a Expr<'a>,
    },
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Logical {
        op: LogicalOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Conditional {
        test: &'a Expr<'a>,
        consequent: &'a Expr<'a>,
        alternate: &'a Expr<'a>,
    },
    Assign {
        op: &'a str,
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
    Sequence(&'a [&'a Expr<'a>]),
    Member {
        object: &'a Expr<'a>,
        property: MemberProperty<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    New {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Array(&'a [&'a Expr<'a>]),
    Object(&'a [Property<'a>]),
    Spread(&'a Expr<'a>),
    Arrow {
        params: &'a [&'a str],
        body: &'a Expr<'a>,
    },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub enum MemberProperty<'a> {
    /// `object.name`
    Static(&'a str),
    /// `object[expr]`
    Computed(&'a Expr<'a>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Property<'a> {
    Keyed {
        key: PropertyKey<'a>,
        value: &'a Expr<'a>,
    },
    Spread(&'a Expr<'a>),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub enum PropertyKey<'a> {
    Ident(&'a str),
    Literal(Literal<'a>),
    Computed(&'a Expr<'a>),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Number(f64),
    Str(&'a str),
    Bool(bool),
    Null,
}

impl<'a> Expr<'a> {
    pub fn as_ptr(&self) -> *const Self {
        self as *const _
    }

    /// Node kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "Literal",
            Expr::Ident(_) => "Identifier",
            Expr::This => "ThisExpression",
            Expr::Unary { .. } => "UnaryExpression",
            Expr::Update { .. } => "UpdateExpression",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Logical { .. } => "LogicalExpression",
            Expr::Conditional { .. } => "ConditionalExpression",
            Expr::Assign { .. } => "AssignmentExpression",
            Expr::Sequence(_) => "SequenceExpression",
            Expr::Member { .. } => "MemberExpression",
            Expr::Call { .. } => "CallExpression",
            Expr::New { .. } => "NewExpression",
            Expr::Array(_) => "ArrayExpression",
            Expr::Object(_) => "ObjectExpression",
            Expr::Spread(_) => "SpreadElement",
            Expr::Arrow { .. } => "ArrowFunctionExpression",
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Expr::Ident(n) if *n == name)
    }
}
