//! Global numeric helpers: `parseInt`, `parseFloat`, `isNaN`, `isFinite`,
//! and the `undefined`, `NaN`, `Infinity` constants.

use crate::{
    errors::ErrorKind,
    stdlib::{RegistryBuilder, number_arg, string_arg},
    values::{
        Arity, Callable, NativeFunction, Value,
        coerce::{is_js_whitespace, to_integer, to_number},
    },
};

static PARSE_INT: NativeFunction = NativeFunction {
    name: "parseInt",
    arity: Arity::between(1, 2),
    func: global_parse_int,
};

static PARSE_FLOAT: NativeFunction = NativeFunction {
    name: "parseFloat",
    arity: Arity::exactly(1),
    func: |args| Ok(Value::Number(parse_float(&string_arg(args, 0)))),
};

static IS_NAN: NativeFunction = NativeFunction {
    name: "isNaN",
    arity: Arity::exactly(1),
    func: |args| Ok(Value::Bool(number_arg(args, 0).is_nan())),
};

static IS_FINITE: NativeFunction = NativeFunction {
    name: "isFinite",
    arity: Arity::exactly(1),
    func: |args| Ok(Value::Bool(number_arg(args, 0).is_finite())),
};

fn global_parse_int(args: &[Value]) -> Result<Value, ErrorKind> {
    let text = string_arg(args, 0);
    let radix = match args.get(1) {
        None | Some(Value::Undefined) => 0,
        Some(radix) => {
            let n = to_integer(to_number(radix));
            if n.is_infinite() { 0 } else { n as i64 }
        }
    };
    Ok(Value::Number(parse_int(&text, radix)))
}

/// Longest valid integer prefix. A radix of 0 means 10, or 16 with an `0x`
/// prefix.
pub fn parse_int(text: &str, radix: i64) -> f64 {
    let s = text.trim_start_matches(is_js_whitespace);
    let (sign, s) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let hex_prefix = s.starts_with("0x") || s.starts_with("0X");
    let (radix, s) = match radix {
        0 if hex_prefix => (16, &s[2..]),
        0 => (10, s),
        16 if hex_prefix => (16, &s[2..]),
        2..=36 => (radix as u32, s),
        _ => return f64::NAN,
    };
    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let base = f64::from(radix);
    sign * digits.iter().fold(0.0, |acc, d| acc * base + f64::from(*d))
}

/// Longest decimal prefix, `Infinity` included.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start_matches(is_js_whitespace);
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(f64::NAN)
}

pub(super) fn register(builder: &mut RegistryBuilder) {
    for function in [&PARSE_INT, &PARSE_FLOAT, &IS_NAN, &IS_FINITE] {
        builder.register(function.name, Value::Function(Callable::Native(function)));
    }
    builder.register("undefined", Value::Undefined);
    builder.register("NaN", Value::Number(f64::NAN));
    builder.register("Infinity", Value::Number(f64::INFINITY));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42", 0), 42.0);
        assert_eq!(parse_int("  -42px", 0), -42.0);
        assert_eq!(parse_int("0x1f", 0), 31.0);
        assert_eq!(parse_int("0x1f", 16), 31.0);
        assert_eq!(parse_int("ff", 16), 255.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert_eq!(parse_int("3.9", 0), 3.0);
        assert!(parse_int("px", 0).is_nan());
        assert!(parse_int("10", 1).is_nan());
        assert!(parse_int("10", 37).is_nan());
        assert!(parse_int("", 0).is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3.25kg"), 3.25);
        assert_eq!(parse_float("  -.5"), -0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("7."), 7.0);
        assert_eq!(parse_float("-Infinityx"), f64::NEG_INFINITY);
        assert!(parse_float(".").is_nan());
        assert!(parse_float("abc").is_nan());
    }

    #[test]
    fn test_global_predicates() {
        let nan = IS_NAN.call(&[Value::from("abc")]).unwrap();
        assert!(matches!(nan, Value::Bool(true)));
        let finite = IS_FINITE.call(&[Value::from("12")]).unwrap();
        assert!(matches!(finite, Value::Bool(true)));
        let infinite = IS_FINITE.call(&[Value::Number(f64::INFINITY)]).unwrap();
        assert!(matches!(infinite, Value::Bool(false)));
    }

    #[test]
    fn test_parse_int_radix_argument() {
        let result = PARSE_INT
            .call(&[Value::from("z"), Value::Number(36.0)])
            .unwrap();
        assert_eq!(result.as_number(), Some(35.0));
    }
}
