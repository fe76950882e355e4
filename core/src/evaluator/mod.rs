//! Tree-walking evaluator for adapted expressions.
//!
//! Evaluation never mutates host data. Every reference value an expression
//! can reach is a read-only view created through the [`Context`] cache, and
//! every visited node counts against the [`EvaluatorOptions`] budget.

mod context;
mod eval;
mod guard;
mod operators;

#[cfg(test)]
mod eval_test;

pub use context::{Context, PLAYER};
pub use eval::{Evaluator, EvaluatorOptions};
pub use guard::guard_result;

use crate::{errors::Error, parser::ParsedExpr, stdlib::EntityFinder, values::Value};

/// Evaluate an adapted expression in `context`.
///
/// The result is not guarded; see [`guard_result`].
pub fn eval(
    options: EvaluatorOptions,
    expr: &ParsedExpr<'_>,
    context: &mut Context,
    finder: &dyn EntityFinder,
) -> Result<Value, Error> {
    Evaluator::new(options, expr, context, finder).eval()
}
