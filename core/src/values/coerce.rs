//! Conversions and comparisons with the loose-typing rules expression
//! authors expect: numbers format without a trailing `.0`, `+` concatenates
//! when either side is a string, `==` coerces and `===` does not.

use core::cmp::Ordering;
use std::sync::Arc;

use crate::values::{Callable, PrimitiveHint, Value};

/// Truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !(*n == 0.0 || n.is_nan()),
        Value::Str(s) => !s.is_empty(),
        _ => true,
    }
}

/// Convert to a primitive. Primitives are returned unchanged.
pub fn to_primitive(value: &Value, hint: PrimitiveHint) -> Value {
    match value {
        Value::View(view) => to_primitive(view.target(), hint),
        Value::List(items) => Value::Str(join(items, ",").into()),
        Value::Map(_) => Value::str("[object Object]"),
        Value::Object(host) => host
            .to_primitive(hint)
            .filter(Value::is_primitive)
            .unwrap_or_else(|| Value::Str(format!("[object {}]", host.kind()).into())),
        Value::Function(callable) => Value::Str(function_source(callable).into()),
        primitive => primitive.clone(),
    }
}

fn function_source(callable: &Callable) -> String {
    format!("function {}() {{ [native code] }}", callable.name())
}

pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => *n,
        Value::Str(s) => string_to_number(s),
        Value::Function(_) => f64::NAN,
        other => to_number(&to_primitive(other, PrimitiveHint::Number)),
    }
}

/// String to number: surrounding whitespace is ignored, the empty string is
/// zero, radix prefixes and `Infinity` are accepted, anything else is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }
    let radix = |prefixes: [&str; 2], radix: u32| {
        let digits = s.strip_prefix(prefixes[0]).or_else(|| s.strip_prefix(prefixes[1]))?;
        if digits.is_empty() {
            return Some(f64::NAN);
        }
        Some(
            digits
                .chars()
                .try_fold(0f64, |acc, c| {
                    c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
                })
                .unwrap_or(f64::NAN),
        )
    };
    if let Some(n) = radix(["0x", "0X"], 16)
        .or_else(|| radix(["0o", "0O"], 8))
        .or_else(|| radix(["0b", "0B"], 2))
    {
        return n;
    }
    let (sign, unsigned) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    unsigned.parse::<f64>().map_or(f64::NAN, |n| sign * n)
}

/// `digits [. digits] [e [+-] digits]`, with at least one mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };
    let mut mantissa = digits(&mut i);
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        mantissa += digits(&mut i);
    }
    if mantissa == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == bytes.len()
}

pub(crate) fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

pub fn to_string(value: &Value) -> Arc<str> {
    match value {
        Value::Undefined => "undefined".into(),
        Value::Null => "null".into(),
        Value::Bool(b) => Arc::from(if *b { "true" } else { "false" }),
        Value::Number(n) => format_number(*n).into(),
        Value::Str(s) => s.clone(),
        other => to_string(&to_primitive(other, PrimitiveHint::String)),
    }
}

/// Property key for computed access and `in`.
pub fn to_property_key(value: &Value) -> Arc<str> {
    to_string(value)
}

/// Join list elements, with `null` and `undefined` as empty strings.
pub fn join(items: &[Value], separator: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        if !item.is_nullish() {
            out.push_str(&to_string(item));
        }
    }
    out
}

/// Shortest round-trip decimal, switching to exponent notation outside
/// `1e-7 < |n| < 1e21`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return name.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. `1.2345e-7`.
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(core::iter::repeat_n('0', (point - k) as usize));
    } else if 0 < point && point <= 21 {
        out.push_str(&digits[..point as usize]);
        out.push('.');
        out.push_str(&digits[point as usize..]);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(core::iter::repeat_n('0', (-point) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if point - 1 >= 0 { '+' } else { '-' });
        out.push_str(&(point - 1).abs().to_string());
    }
    out
}

/// `===`. Reference values compare by identity, looking through views.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a.target(), b.target()) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (x, y) => match (x.identity(), y.identity()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Like `===` except that NaN equals NaN. Used by `includes`.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equals(a, b),
    }
}

/// `==`.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    let (a, b) = (a.target(), b.target());
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Number(_), Value::Str(s)) => strict_equals(a, &Value::Number(string_to_number(s))),
        (Value::Str(s), Value::Number(_)) => strict_equals(&Value::Number(string_to_number(s)), b),
        (Value::Bool(_), _) => loose_equals(&Value::Number(to_number(a)), b),
        (_, Value::Bool(_)) => loose_equals(a, &Value::Number(to_number(b))),
        _ if a.is_primitive() == b.is_primitive() => strict_equals(a, b),
        _ if a.is_primitive() => loose_equals(a, &to_primitive(b, PrimitiveHint::Default)),
        _ => loose_equals(&to_primitive(a, PrimitiveHint::Default), b),
    }
}

/// Relational comparison. `None` when either side is NaN.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    let a = to_primitive(a, PrimitiveHint::Number);
    let b = to_primitive(b, PrimitiveHint::Number);
    match (&a, &b) {
        // Strings compare by UTF-16 code unit.
        (Value::Str(x), Value::Str(y)) => Some(x.encode_utf16().cmp(y.encode_utf16())),
        _ => to_number(&a).partial_cmp(&to_number(&b)),
    }
}

/// `+`: string concatenation if either primitive operand is a string.
pub fn add(a: &Value, b: &Value) -> Value {
    let a = to_primitive(a, PrimitiveHint::Default);
    let b = to_primitive(b, PrimitiveHint::Default);
    match (&a, &b) {
        (Value::Str(_), _) | (_, Value::Str(_)) => {
            let mut s = String::from(&*to_string(&a));
            s.push_str(&to_string(&b));
            Value::Str(s.into())
        }
        _ => Value::Number(to_number(&a) + to_number(&b)),
    }
}

/// `**`, which differs from `powf` when the base is ±1 and the exponent is
/// infinite.
pub fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Integer conversion used by index arguments: NaN is zero, fractions
/// truncate toward zero.
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { n.trunc() }
}

/// Resolve a relative index argument against `len`, clamped to `0..=len`.
pub fn relative_index(value: Option<&Value>, len: usize, default: usize) -> usize {
    let Some(value) = value.filter(|v| !matches!(v, Value::Undefined)) else {
        return default;
    };
    let n = to_integer(to_number(value));
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

/// Canonical array index: `"0"`, `"12"`, but not `"01"` or `"1.0"`.
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
