//! Core evaluation logic.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::{
    errors::{Error, ErrorKind, Limit, Mutation, Prohibited},
    evaluator::{
        Context,
        operators::{eval_binary, eval_unary, is_allowed_binary, is_allowed_unary},
    },
    parser::{Expr, Literal, LogicalOp, MemberProperty, ParsedExpr, Property, PropertyKey},
    stdlib::{EntityFinder, is_blocked_property},
    values::{
        Callable, PropertyMap, Value,
        coerce::{format_number, strict_equals, to_property_key, truthy},
        view::read_property,
    },
};

/// Resource ceilings for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Nodes visited, counting every step of a member chain.
    pub max_nodes: usize,
    /// Recursion depth.
    pub max_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_nodes: 100,
            max_depth: 32,
        }
    }
}

type Steps<'a> = SmallVec<[(&'a Expr<'a>, MemberProperty<'a>); 8]>;

/// Tree-walking evaluator over an adapted expression.
pub struct Evaluator<'a, 'c> {
    options: EvaluatorOptions,
    expr: &'c ParsedExpr<'a>,
    context: &'c mut Context,
    finder: &'c dyn EntityFinder,
    nodes: usize,
    depth: usize,
}

impl<'a, 'c> Evaluator<'a, 'c> {
    pub fn new(
        options: EvaluatorOptions,
        expr: &'c ParsedExpr<'a>,
        context: &'c mut Context,
        finder: &'c dyn EntityFinder,
    ) -> Self {
        Self {
            options,
            expr,
            context,
            finder,
            nodes: 0,
            depth: 0,
        }
    }

    /// Evaluate the whole expression.
    pub fn eval(&mut self) -> Result<Value, Error> {
        let result = self.eval_expr(self.expr.expr);
        tracing::debug!(nodes = self.nodes, ok = result.is_ok(), "evaluation finished");
        result
    }

    /// Nodes visited so far.
    pub fn nodes_visited(&self) -> usize {
        self.nodes
    }

    fn error(&self, node: &'a Expr<'a>, kind: ErrorKind) -> Error {
        Error::new(kind, self.expr.ann.span_of(node))
    }

    fn snippet(&self, node: &'a Expr<'a>) -> String {
        match self.expr.ann.span_of(node) {
            Some(span) => self.expr.ann.snippet(span).to_string(),
            None => node.kind_name().to_string(),
        }
    }

    /// Count one visited node against the budget.
    fn tick(&mut self, node: &'a Expr<'a>) -> Result<(), Error> {
        self.nodes += 1;
        if self.nodes > self.options.max_nodes {
            let limit = Limit::Nodes {
                max: self.options.max_nodes,
            };
            return Err(self.error(node, ErrorKind::ExpressionTooComplex(limit)));
        }
        Ok(())
    }

    fn eval_expr(&mut self, expr: &'a Expr<'a>) -> Result<Value, Error> {
        self.tick(expr)?;
        if self.depth >= self.options.max_depth {
            let limit = Limit::Depth {
                max: self.options.max_depth,
            };
            return Err(self.error(expr, ErrorKind::ExpressionTooComplex(limit)));
        }

        self.depth += 1;
        let result = self.eval_expr_inner(expr);
        self.depth -= 1;

        result
    }

    fn eval_expr_inner(&mut self, expr: &'a Expr<'a>) -> Result<Value, Error> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Ident(name) => self.lookup(expr, name),

            Expr::Unary { op, expr: operand } => {
                if !is_allowed_unary(*op) {
                    let kind = ErrorKind::UnsupportedOperator {
                        kind: "unary",
                        op: op.symbol(),
                    };
                    return Err(self.error(expr, kind));
                }
                let operand = self.eval_expr(operand)?;
                Ok(eval_unary(*op, &operand))
            }

            Expr::Binary { op, left, right } => {
                if !is_allowed_binary(*op) {
                    let kind = ErrorKind::UnsupportedOperator {
                        kind: "binary",
                        op: op.symbol(),
                    };
                    return Err(self.error(expr, kind));
                }
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                eval_binary(*op, &left, &right).map_err(|kind| self.error(expr, kind))
            }

            Expr::Logical { op, left, right } => {
                if *op == LogicalOp::Nullish {
                    let kind = ErrorKind::UnsupportedOperator {
                        kind: "logical",
                        op: op.symbol(),
                    };
                    return Err(self.error(expr, kind));
                }
                let left_value = self.eval_expr(left)?;
                match op {
                    LogicalOp::And if !truthy(&left_value) => Ok(left_value),
                    LogicalOp::Or if truthy(&left_value) => Ok(left_value),
                    _ => self.eval_expr(right),
                }
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if truthy(&self.eval_expr(test)?) {
                    self.eval_expr(consequent)
                } else {
                    self.eval_expr(alternate)
                }
            }

            Expr::Member { .. } => self.eval_member(expr),

            Expr::Call { callee, args } => self.eval_call(expr, callee, args),

            Expr::New { callee, args } => self.eval_new(expr, callee, args),

            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    items.push(self.eval_expr(element)?);
                }
                Ok(self.context.cache_mut().wrap(Value::from(items)))
            }

            Expr::Object(properties) => self.eval_object(properties),

            Expr::This
            | Expr::Update { .. }
            | Expr::Assign { .. }
            | Expr::Sequence(_)
            | Expr::Spread(_)
            | Expr::Arrow { .. } => {
                let kind = ErrorKind::UnsupportedNodeType {
                    node: expr.kind_name(),
                };
                Err(self.error(expr, kind))
            }
        }
    }

    fn lookup(&mut self, node: &'a Expr<'a>, name: &str) -> Result<Value, Error> {
        self.context.lookup(name).ok_or_else(|| {
            let kind = ErrorKind::UnknownIdentifier {
                name: name.to_string(),
            };
            self.error(node, kind)
        })
    }

    // ------------------------------------------------------------------------
    // Member chains
    // ------------------------------------------------------------------------

    /// Resolve `root.a[b].c` one step at a time.
    ///
    /// Every static name in the chain is checked against the blocked set
    /// before anything is evaluated; computed keys are checked once their
    /// name is known. A nullish value anywhere in the chain makes the whole
    /// chain `undefined`.
    fn eval_member(&mut self, expr: &'a Expr<'a>) -> Result<Value, Error> {
        let mut steps: Steps<'a> = SmallVec::new();
        let mut node = expr;
        while let Expr::Member { object, property } = node {
            steps.push((node, *property));
            node = *object;
        }
        steps.reverse();
        let root = node;

        for &(step, property) in &steps {
            if let Some(name) = static_name(&property).filter(|name| is_blocked_property(name)) {
                return Err(self.prohibited(step, name));
            }
        }

        let mut current = match root {
            Expr::Ident(name) => {
                self.tick(root)?;
                self.lookup(root, name)?
            }
            Expr::Call { .. } | Expr::New { .. } => self.eval_expr(root)?,
            other => {
                let kind = ErrorKind::UnsupportedNodeType {
                    node: other.kind_name(),
                };
                return Err(self.error(other, kind));
            }
        };

        let last = steps.len() - 1;
        for (i, &(step, property)) in steps.iter().enumerate() {
            // The outermost step was counted when `expr` was entered.
            if i < last {
                self.tick(step)?;
            }
            let key = match property {
                MemberProperty::Static(name) => Arc::from(name),
                MemberProperty::Computed(key) => self.computed_key(key)?,
            };
            if is_blocked_property(&key) {
                return Err(self.prohibited(step, key.to_string()));
            }
            if current.is_nullish() {
                tracing::debug!(key = %key, "nullish member chain");
                return Ok(Value::Undefined);
            }
            current = read_property(&current, &key, self.context.cache_mut());
        }
        Ok(current)
    }

    fn prohibited(&self, step: &'a Expr<'a>, name: String) -> Error {
        tracing::warn!(property = %name, "blocked property access");
        self.error(step, ErrorKind::AccessProhibited(Prohibited::Property(name)))
    }

    /// `a[key]` accepts a literal or an identifier holding a primitive.
    fn computed_key(&mut self, key: &'a Expr<'a>) -> Result<Arc<str>, Error> {
        match key {
            Expr::Literal(_) | Expr::Ident(_) => {
                let value = self.eval_expr(key)?;
                if matches!(
                    value,
                    Value::List(_)
                        | Value::Map(_)
                        | Value::Object(_)
                        | Value::Function(_)
                        | Value::View(_)
                ) {
                    return Err(self.error(key, ErrorKind::AccessProhibited(Prohibited::ComputedKey)));
                }
                Ok(to_property_key(&value))
            }
            _ => {
                tracing::warn!(node = key.kind_name(), "computed key rejected");
                Err(self.error(key, ErrorKind::AccessProhibited(Prohibited::ComputedKey)))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    fn eval_call(
        &mut self,
        expr: &'a Expr<'a>,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    ) -> Result<Value, Error> {
        let function = match callee {
            Expr::Ident(name) => {
                self.tick(callee)?;
                self.global_function(callee, name)?
            }
            Expr::Member { .. } => self.eval_expr(callee)?,
            other => {
                // Surface errors inside the callee first, then refuse to call
                // whatever it produced.
                self.eval_expr(other)?;
                let kind = ErrorKind::UnsupportedCallee {
                    description: format!("unsupported callee type {}", other.kind_name()),
                };
                return Err(self.error(other, kind));
            }
        };

        let Value::Function(callable) = function else {
            let kind = ErrorKind::NotAFunction {
                callee: self.snippet(callee),
            };
            return Err(self.error(callee, kind));
        };

        let args = self.eval_args(args)?;
        let result = self.invoke(&callable, &args).map_err(|kind| self.error(expr, kind))?;
        Ok(self.context.cache_mut().wrap(result))
    }

    /// A bare identifier callee must name a registry function.
    fn global_function(&mut self, callee: &'a Expr<'a>, name: &str) -> Result<Value, Error> {
        if self.context.is_local(name) {
            let kind = ErrorKind::UnsupportedCallee {
                description: format!("{} is not a callable global", name),
            };
            return Err(self.error(callee, kind));
        }
        match self.context.global(name) {
            Some(value @ Value::Function(_)) => Ok(value.clone()),
            Some(_) => {
                let kind = ErrorKind::NotAFunction {
                    callee: name.to_string(),
                };
                Err(self.error(callee, kind))
            }
            None => {
                let kind = ErrorKind::UnknownIdentifier {
                    name: name.to_string(),
                };
                Err(self.error(callee, kind))
            }
        }
    }

    fn eval_args(&mut self, args: &'a [&'a Expr<'a>]) -> Result<Vec<Value>, Error> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    fn invoke(&mut self, callable: &Callable, args: &[Value]) -> Result<Value, ErrorKind> {
        tracing::debug!(function = callable.name(), args = args.len(), "call");
        match callable {
            Callable::Native(function) => function.call(args),
            Callable::Closure(function) => function.call(args),
            Callable::Method(method) => method.call(args),
            Callable::Finder(finder) => {
                let scoped = args
                    .first()
                    .is_some_and(|first| strict_equals(first, self.context.container()));
                if !scoped {
                    tracing::warn!(finder = finder.name, "finder called outside its container");
                    return Err(ErrorKind::AccessProhibited(Prohibited::FinderScope(
                        finder.name.to_string(),
                    )));
                }
                finder.call(self.finder, args)
            }
            Callable::Blocked(name) => {
                tracing::warn!(mutator = %name, "blocked mutator called");
                Err(ErrorKind::MutationProhibited(Mutation::Call(name.to_string())))
            }
        }
    }

    fn eval_new(
        &mut self,
        expr: &'a Expr<'a>,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    ) -> Result<Value, Error> {
        let Expr::Ident(name) = callee else {
            let kind = ErrorKind::UnsupportedCallee {
                description: format!("unsupported constructor type {}", callee.kind_name()),
            };
            return Err(self.error(callee, kind));
        };
        self.tick(callee)?;
        let Some(constructor) = self.context.constructor(name) else {
            let kind = ErrorKind::UnsupportedCallee {
                description: format!("unknown constructor {}", name),
            };
            return Err(self.error(callee, kind));
        };
        let args = self.eval_args(args)?;
        let value = constructor
            .construct(&args)
            .map_err(|kind| self.error(expr, kind))?;
        Ok(self.context.cache_mut().wrap(value))
    }

    // ------------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------------

    fn eval_object(&mut self, properties: &'a [Property<'a>]) -> Result<Value, Error> {
        let mut map = PropertyMap::new();
        for property in properties {
            let (key, value) = match property {
                Property::Keyed {
                    key: PropertyKey::Ident(name),
                    value,
                } => (Arc::from(*name), value),
                Property::Keyed {
                    key: PropertyKey::Literal(literal),
                    value,
                } => (to_property_key(&literal_value(literal)), value),
                Property::Keyed {
                    key: PropertyKey::Computed(key),
                    ..
                } => {
                    let kind = ErrorKind::AccessProhibited(Prohibited::ObjectKey);
                    return Err(self.error(key, kind));
                }
                Property::Spread(spread) => {
                    let kind = ErrorKind::AccessProhibited(Prohibited::ObjectKey);
                    return Err(self.error(spread, kind));
                }
            };
            let value = self.eval_expr(value)?;
            map.insert(key, value);
        }
        Ok(self.context.cache_mut().wrap(Value::map(map)))
    }
}

fn literal_value(literal: &Literal<'_>) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::str(*s),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

/// The property name of a step, when it is known without evaluation.
fn static_name(property: &MemberProperty<'_>) -> Option<String> {
    match property {
        MemberProperty::Static(name) => Some(name.to_string()),
        MemberProperty::Computed(Expr::Literal(Literal::Str(s))) => Some(s.to_string()),
        MemberProperty::Computed(Expr::Literal(Literal::Number(n))) => Some(format_number(*n)),
        MemberProperty::Computed(_) => None,
    }
}
