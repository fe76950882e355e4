//! Unary and binary operators allowed in expressions.

use crate::{
    errors::ErrorKind,
    parser::{BinaryOp, UnaryOp},
    values::{
        Value,
        coerce::{
            add, compare, loose_equals, pow, strict_equals, to_number, to_property_key, truthy,
        },
    },
};
use core::cmp::Ordering;

pub(super) fn is_allowed_unary(op: UnaryOp) -> bool {
    matches!(op, UnaryOp::Plus | UnaryOp::Neg | UnaryOp::Not)
}

pub(super) fn is_allowed_binary(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::StrictEq
            | BinaryOp::StrictNotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Pow
            | BinaryOp::In
    )
}

/// Apply an allowed unary operator.
pub(super) fn eval_unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Plus => Value::Number(to_number(operand)),
        UnaryOp::Neg => Value::Number(-to_number(operand)),
        UnaryOp::Not => Value::Bool(!truthy(operand)),
        // Rejected before the operand is evaluated.
        UnaryOp::BitNot | UnaryOp::Typeof | UnaryOp::Void | UnaryOp::Delete => Value::Undefined,
    }
}

/// Apply an allowed binary operator.
pub(super) fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ErrorKind> {
    let relational = |accept: fn(Ordering) -> bool| {
        Value::Bool(compare(left, right).is_some_and(accept))
    };
    let arithmetic = |f: fn(f64, f64) -> f64| Value::Number(f(to_number(left), to_number(right)));

    let value = match op {
        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_equals(left, right)),
        BinaryOp::Lt => relational(Ordering::is_lt),
        BinaryOp::LtEq => relational(Ordering::is_le),
        BinaryOp::Gt => relational(Ordering::is_gt),
        BinaryOp::GtEq => relational(Ordering::is_ge),
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => arithmetic(|a, b| a - b),
        BinaryOp::Mul => arithmetic(|a, b| a * b),
        BinaryOp::Div => arithmetic(|a, b| a / b),
        BinaryOp::Rem => arithmetic(|a, b| a % b),
        BinaryOp::Pow => arithmetic(pow),
        BinaryOp::In => eval_in(left, right)?,
        other => {
            return Err(ErrorKind::UnsupportedOperator {
                kind: "binary",
                op: other.symbol(),
            });
        }
    };
    Ok(value)
}

fn eval_in(key: &Value, object: &Value) -> Result<Value, ErrorKind> {
    let key = to_property_key(key);
    match object {
        Value::View(view) => Ok(Value::Bool(view.has(&key))),
        other => Err(ErrorKind::type_error(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            key,
            other.describe()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{PropertyMap, ViewCache};

    fn number(v: Value) -> f64 {
        v.as_number().expect("expected a number")
    }

    #[test]
    fn test_arithmetic() {
        let (a, b) = (Value::from(7.0), Value::from(2.0));
        assert_eq!(number(eval_binary(BinaryOp::Sub, &a, &b).unwrap()), 5.0);
        assert_eq!(number(eval_binary(BinaryOp::Rem, &a, &b).unwrap()), 1.0);
        assert_eq!(number(eval_binary(BinaryOp::Pow, &a, &b).unwrap()), 49.0);
        assert_eq!(number(eval_binary(BinaryOp::Div, &a, &Value::from(0.0)).unwrap()), f64::INFINITY);
        let rem = eval_binary(BinaryOp::Rem, &Value::from(-7.0), &b).unwrap();
        assert_eq!(number(rem), -1.0);
    }

    #[test]
    fn test_relational_with_nan_is_false() {
        let nan = Value::from(f64::NAN);
        for op in [BinaryOp::Lt, BinaryOp::LtEq, BinaryOp::Gt, BinaryOp::GtEq] {
            let result = eval_binary(op, &nan, &Value::from(1.0)).unwrap();
            assert!(matches!(result, Value::Bool(false)), "{:?}", op);
        }
    }

    #[test]
    fn test_in_operator() {
        let mut cache = ViewCache::new();
        let map: PropertyMap = [("a", Value::from(1.0))].into_iter().collect();
        let object = cache.wrap(Value::map(map));
        let found = eval_binary(BinaryOp::In, &Value::from("a"), &object).unwrap();
        assert!(matches!(found, Value::Bool(true)));
        let missing = eval_binary(BinaryOp::In, &Value::from("b"), &object).unwrap();
        assert!(matches!(missing, Value::Bool(false)));

        let err = eval_binary(BinaryOp::In, &Value::from("a"), &Value::from("abc")).unwrap_err();
        assert_eq!(err.category(), "TypeError");
    }

    #[test]
    fn test_unary() {
        assert_eq!(number(eval_unary(UnaryOp::Plus, &Value::from("3"))), 3.0);
        assert_eq!(number(eval_unary(UnaryOp::Neg, &Value::Bool(true))), -1.0);
        assert!(matches!(eval_unary(UnaryOp::Not, &Value::from("")), Value::Bool(true)));
    }

    #[test]
    fn test_whitelists() {
        assert!(is_allowed_unary(UnaryOp::Not));
        assert!(!is_allowed_unary(UnaryOp::Typeof));
        assert!(!is_allowed_unary(UnaryOp::Delete));
        assert!(is_allowed_binary(BinaryOp::In));
        assert!(!is_allowed_binary(BinaryOp::InstanceOf));
        assert!(!is_allowed_binary(BinaryOp::Shl));
    }
}
