//! Read-only methods of lists, strings, numbers and booleans.
//!
//! String positions count UTF-16 code units, as authors see them in
//! `length`. No method here can produce output much larger than its inputs.

use std::sync::Arc;

use crate::{
    errors::ErrorKind,
    values::{
        Callable, Value,
        coerce::{
            array_index, format_number, is_js_whitespace, join, relative_index, same_value_zero,
            strict_equals, to_integer, to_number, to_string,
        },
    },
};

pub const LIST_METHODS: &[&str] = &[
    "includes",
    "indexOf",
    "lastIndexOf",
    "join",
    "at",
    "slice",
    "concat",
    "toString",
];

/// Recognized so that reading them yields a blocked mutator.
pub const LIST_MUTATORS: &[&str] = &[
    "push",
    "pop",
    "shift",
    "unshift",
    "splice",
    "sort",
    "reverse",
    "fill",
    "copyWithin",
];

pub const STRING_METHODS: &[&str] = &[
    "includes",
    "startsWith",
    "endsWith",
    "indexOf",
    "lastIndexOf",
    "toLowerCase",
    "toUpperCase",
    "trim",
    "trimStart",
    "trimEnd",
    "slice",
    "substring",
    "split",
    "charAt",
    "at",
    "concat",
    "toString",
];

pub const NUMBER_METHODS: &[&str] = &["toFixed", "toString"];

/// Property of a primitive receiver. Nullish receivers are handled by the
/// caller.
pub fn primitive_property(receiver: &Value, key: &str) -> Value {
    match receiver {
        Value::Str(s) => {
            if key == "length" {
                return Value::Number(s.encode_utf16().count() as f64);
            }
            if let Some(index) = array_index(key) {
                return s
                    .encode_utf16()
                    .nth(index)
                    .map_or(Value::Undefined, |unit| {
                        Value::from(String::from_utf16_lossy(&[unit]))
                    });
            }
            method_of(receiver, key, STRING_METHODS)
        }
        Value::Number(_) => method_of(receiver, key, NUMBER_METHODS),
        Value::Bool(_) => method_of(receiver, key, &["toString"]),
        _ => Value::Undefined,
    }
}

/// Property of a list, read through `receiver` (the list's view).
pub fn list_property(receiver: &Value, items: &[Value], key: &str) -> Value {
    if key == "length" {
        return Value::Number(items.len() as f64);
    }
    if let Some(index) = array_index(key) {
        return items.get(index).cloned().unwrap_or(Value::Undefined);
    }
    if LIST_MUTATORS.contains(&key) {
        return Value::Function(Callable::blocked(key));
    }
    method_of(receiver, key, LIST_METHODS)
}

fn method_of(receiver: &Value, key: &str, methods: &[&str]) -> Value {
    if methods.contains(&key) {
        Value::Function(Callable::method(receiver.clone(), key))
    } else {
        Value::Undefined
    }
}

/// Dispatch a bound method to its receiver.
pub fn invoke_method(receiver: &Value, name: &str, args: &[Value]) -> Result<Value, ErrorKind> {
    match receiver.target() {
        Value::Str(s) => string_method(s, name, args),
        Value::Number(n) => number_method(*n, name, args),
        Value::Bool(b) if name == "toString" => Ok(Value::from(b.to_string())),
        Value::List(items) => list_method(items, name, args),
        Value::Object(host) => host.invoke(name, args),
        other => Err(ErrorKind::NotAFunction {
            callee: format!("{}.{}", other.describe(), name),
        }),
    }
}

fn arg(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&Value::Undefined)
}

fn is_present(args: &[Value], i: usize) -> bool {
    !matches!(arg(args, i), Value::Undefined)
}

fn list_method(items: &Arc<[Value]>, name: &str, args: &[Value]) -> Result<Value, ErrorKind> {
    let len = items.len();
    let result = match name {
        "includes" => {
            let from = relative_index(args.get(1), len, 0);
            Value::Bool(items[from..].iter().any(|v| same_value_zero(v, arg(args, 0))))
        }
        "indexOf" => {
            let from = relative_index(args.get(1), len, 0);
            let found = items[from..]
                .iter()
                .position(|v| strict_equals(v, arg(args, 0)))
                .map(|i| i + from);
            position(found)
        }
        "lastIndexOf" => {
            let end = match args.get(1).filter(|_| is_present(args, 1)) {
                None => len,
                Some(from) => {
                    let n = to_integer(to_number(from));
                    if n < 0.0 {
                        (len as f64 + n + 1.0).max(0.0) as usize
                    } else {
                        (n + 1.0).min(len as f64) as usize
                    }
                }
            };
            position(items[..end].iter().rposition(|v| strict_equals(v, arg(args, 0))))
        }
        "join" => {
            let separator = if is_present(args, 0) {
                to_string(arg(args, 0))
            } else {
                Arc::from(",")
            };
            Value::from(join(items, &separator))
        }
        "toString" => Value::from(join(items, ",")),
        "at" => at(len, arg(args, 0)).map_or(Value::Undefined, |i| items[i].clone()),
        "slice" => {
            let start = relative_index(args.first(), len, 0);
            let end = relative_index(args.get(1), len, len);
            Value::list(items[start..end.max(start)].iter().cloned())
        }
        "concat" => {
            let mut out: Vec<Value> = items.to_vec();
            for a in args {
                match a.as_list() {
                    Some(more) => out.extend(more.iter().cloned()),
                    None => out.push(a.clone()),
                }
            }
            Value::from(out)
        }
        _ => {
            return Err(ErrorKind::NotAFunction {
                callee: format!("list.{}", name),
            });
        }
    };
    Ok(result)
}

fn position(found: Option<usize>) -> Value {
    Value::Number(found.map_or(-1.0, |i| i as f64))
}

fn at(len: usize, index: &Value) -> Option<usize> {
    let n = to_integer(to_number(index));
    let i = if n < 0.0 { len as f64 + n } else { n };
    (i >= 0.0 && i < len as f64).then_some(i as usize)
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    (from..haystack.len())
        .find(|&i| haystack[i..].starts_with(needle))
}

fn string_method(s: &Arc<str>, name: &str, args: &[Value]) -> Result<Value, ErrorKind> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let len = units.len();
    let search = || -> Vec<u16> { to_string(arg(args, 0)).encode_utf16().collect() };
    let clamp = |v: &Value, default: usize| -> usize {
        if matches!(v, Value::Undefined) {
            return default;
        }
        to_integer(to_number(v)).clamp(0.0, len as f64) as usize
    };
    let from_units = |range: &[u16]| Value::from(String::from_utf16_lossy(range));

    let result = match name {
        "includes" => {
            let from = clamp(arg(args, 1), 0);
            Value::Bool(find_units(&units, &search(), from).is_some())
        }
        "startsWith" => {
            let from = clamp(arg(args, 1), 0);
            Value::Bool(units[from..].starts_with(&search()))
        }
        "endsWith" => {
            let end = clamp(arg(args, 1), len);
            Value::Bool(units[..end].ends_with(&search()))
        }
        "indexOf" => {
            let from = clamp(arg(args, 1), 0);
            position(find_units(&units, &search(), from))
        }
        "lastIndexOf" => {
            let needle = search();
            let n = to_number(arg(args, 1));
            let from = if n.is_nan() {
                len
            } else {
                to_integer(n).clamp(0.0, len as f64) as usize
            };
            let last_start = from.min(len.saturating_sub(needle.len()));
            let found = if needle.len() > len {
                None
            } else {
                (0..=last_start)
                    .rev()
                    .find(|&i| units[i..].starts_with(&needle))
            };
            position(found)
        }
        "toLowerCase" => Value::from(s.to_lowercase()),
        "toUpperCase" => Value::from(s.to_uppercase()),
        "trim" => Value::from(s.trim_matches(is_js_whitespace)),
        "trimStart" => Value::from(s.trim_start_matches(is_js_whitespace)),
        "trimEnd" => Value::from(s.trim_end_matches(is_js_whitespace)),
        "slice" => {
            let start = relative_index(args.first(), len, 0);
            let end = relative_index(args.get(1), len, len);
            from_units(&units[start..end.max(start)])
        }
        "substring" => {
            let a = clamp(arg(args, 0), 0);
            let b = clamp(arg(args, 1), len);
            from_units(&units[a.min(b)..a.max(b)])
        }
        "split" => {
            let limit = if is_present(args, 1) {
                to_integer(to_number(arg(args, 1))).max(0.0) as usize
            } else {
                usize::MAX
            };
            if !is_present(args, 0) {
                return Ok(Value::list([Value::Str(s.clone())].into_iter().take(limit)));
            }
            let separator = to_string(arg(args, 0));
            let parts: Vec<Value> = if separator.is_empty() {
                units
                    .iter()
                    .take(limit)
                    .map(|u| from_units(core::slice::from_ref(u)))
                    .collect()
            } else {
                s.split(&*separator).take(limit).map(Value::from).collect()
            };
            Value::from(parts)
        }
        "charAt" => {
            let n = to_integer(to_number(arg(args, 0)));
            if n >= 0.0 && n < len as f64 {
                from_units(&units[n as usize..n as usize + 1])
            } else {
                Value::str("")
            }
        }
        "at" => at(len, arg(args, 0)).map_or(Value::Undefined, |i| from_units(&units[i..i + 1])),
        "concat" => {
            let mut out = String::from(&**s);
            for a in args {
                out.push_str(&to_string(a));
            }
            Value::from(out)
        }
        "toString" => Value::Str(s.clone()),
        _ => {
            return Err(ErrorKind::NotAFunction {
                callee: format!("string.{}", name),
            });
        }
    };
    Ok(result)
}

fn number_method(n: f64, name: &str, args: &[Value]) -> Result<Value, ErrorKind> {
    match name {
        "toFixed" => {
            let digits = to_integer(to_number(arg(args, 0)));
            if !(0.0..=100.0).contains(&digits) {
                return Err(ErrorKind::invalid_arguments(
                    "toFixed",
                    "digits must be between 0 and 100",
                ));
            }
            Ok(Value::from(to_fixed(n, digits as usize)))
        }
        "toString" => {
            if !is_present(args, 0) {
                return Ok(Value::from(format_number(n)));
            }
            let radix = to_integer(to_number(arg(args, 0)));
            if !(2.0..=36.0).contains(&radix) {
                return Err(ErrorKind::invalid_arguments(
                    "toString",
                    "radix must be between 2 and 36",
                ));
            }
            Ok(Value::from(to_radix_string(n, radix as u32)))
        }
        _ => Err(ErrorKind::NotAFunction {
            callee: format!("number.{}", name),
        }),
    }
}

/// Fixed-point formatting. Exact halves round away from zero.
pub fn to_fixed(x: f64, digits: usize) -> String {
    if !x.is_finite() || x.abs() >= 1e21 {
        return format_number(x);
    }
    let abs = x.abs();
    let body = if is_exact_tie(abs, digits) {
        round_half_up(&format!("{:.*}", digits + 1, abs))
    } else {
        format!("{:.*}", digits, abs)
    };
    if x < 0.0 { format!("-{}", body) } else { body }
}

/// Whether `x` (non-negative, finite) lies exactly halfway between two
/// multiples of `10^-digits`. A binary fraction with k fractional bits has
/// exactly k decimal fraction digits, the last one a 5.
fn is_exact_tie(x: f64, digits: usize) -> bool {
    if x == 0.0 {
        return false;
    }
    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    let exponent = exponent + i64::from(mantissa.trailing_zeros());
    exponent < 0 && (-exponent) as usize == digits + 1
}

/// Drop the final `5` of an exact decimal and round the rest up.
fn round_half_up(exact: &str) -> String {
    let mut bytes = exact.as_bytes()[..exact.len() - 1].to_vec();
    if bytes.last() == Some(&b'.') {
        bytes.pop();
    }
    let mut i = bytes.len();
    loop {
        if i == 0 {
            bytes.insert(0, b'1');
            break;
        }
        i -= 1;
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            d => {
                bytes[i] = d + 1;
                break;
            }
        }
    }
    String::from_utf8(bytes).unwrap_or_default()
}

fn to_radix_string(x: f64, radix: u32) -> String {
    if !x.is_finite() || radix == 10 {
        return format_number(x);
    }
    let base = f64::from(radix);
    let mut int = x.abs().trunc();
    let mut frac = x.abs() - int;

    let mut digits = Vec::new();
    loop {
        let d = (int % base) as u32;
        digits.push(char::from_digit(d, radix).unwrap_or('0'));
        int = (int / base).trunc();
        if int < 1.0 {
            break;
        }
    }
    if x < 0.0 {
        digits.push('-');
    }
    let mut out: String = digits.into_iter().rev().collect();

    if frac > 0.0 {
        out.push('.');
        for _ in 0..20 {
            if frac == 0.0 {
                break;
            }
            frac *= base;
            let d = frac.trunc();
            out.push(char::from_digit(d as u32, radix).unwrap_or('0'));
            frac -= d;
        }
    }
    out
}
