//! Math Package
//!
//! Constants: PI, E, LN2, LN10, SQRT2
//! Functions: abs, ceil, floor, round, trunc, sign, sqrt, cbrt, pow, min, max,
//!            hypot, log, log10, log2, exp, sin, cos, tan, atan2, random
//!
//! Arguments go through ToNumber, so `Math.max('3', 2)` is 3.

use std::sync::atomic::{AtomicU32, Ordering};

use lazy_static::lazy_static;

use crate::{
    errors::ErrorKind,
    stdlib::number_arg,
    values::{Arity, Callable, NativeFunction, PropertyMap, Value, coerce::pow},
};

macro_rules! unary {
    ($static_name:ident, $js_name:literal, $op:expr) => {
        static $static_name: NativeFunction = NativeFunction {
            name: $js_name,
            arity: Arity::exactly(1),
            func: |args| {
                let op: fn(f64) -> f64 = $op;
                Ok(Value::Number(op(number_arg(args, 0))))
            },
        };
    };
}

// ============================================================================
// Rounding
// ============================================================================

unary!(ABS, "abs", f64::abs);
unary!(CEIL, "ceil", f64::ceil);
unary!(FLOOR, "floor", f64::floor);
unary!(TRUNC, "trunc", f64::trunc);
unary!(ROUND, "round", round);
unary!(SIGN, "sign", sign);

/// Halves round toward positive infinity: `round(-2.5)` is -2.
fn round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

fn sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 { x } else { x.signum() }
}

// ============================================================================
// Powers, roots and logarithms
// ============================================================================

unary!(SQRT, "sqrt", f64::sqrt);
unary!(CBRT, "cbrt", f64::cbrt);
unary!(EXP, "exp", f64::exp);
unary!(LOG, "log", f64::ln);
unary!(LOG10, "log10", f64::log10);
unary!(LOG2, "log2", f64::log2);

static POW: NativeFunction = NativeFunction {
    name: "pow",
    arity: Arity::exactly(2),
    func: |args| Ok(Value::Number(pow(number_arg(args, 0), number_arg(args, 1)))),
};

static HYPOT: NativeFunction = NativeFunction {
    name: "hypot",
    arity: Arity::at_least(0),
    func: math_hypot,
};

fn math_hypot(args: &[Value]) -> Result<Value, ErrorKind> {
    let values: Vec<f64> = (0..args.len()).map(|i| number_arg(args, i)).collect();
    if values.iter().any(|v| v.is_infinite()) {
        return Ok(Value::Number(f64::INFINITY));
    }
    let sum: f64 = values.iter().map(|v| v * v).sum();
    Ok(Value::Number(sum.sqrt()))
}

// ============================================================================
// Comparison
// ============================================================================

static MIN: NativeFunction = NativeFunction {
    name: "min",
    arity: Arity::at_least(0),
    func: |args| Ok(Value::Number(extremum(args, f64::INFINITY, f64::min))),
};

static MAX: NativeFunction = NativeFunction {
    name: "max",
    arity: Arity::at_least(0),
    func: |args| Ok(Value::Number(extremum(args, f64::NEG_INFINITY, f64::max))),
};

/// Fold that lets any NaN argument win, unlike `f64::min`.
fn extremum(args: &[Value], empty: f64, pick: fn(f64, f64) -> f64) -> f64 {
    (0..args.len())
        .map(|i| number_arg(args, i))
        .try_fold(empty, |acc, n| if n.is_nan() { None } else { Some(pick(acc, n)) })
        .unwrap_or(f64::NAN)
}

// ============================================================================
// Trigonometry
// ============================================================================

unary!(SIN, "sin", f64::sin);
unary!(COS, "cos", f64::cos);
unary!(TAN, "tan", f64::tan);

static ATAN2: NativeFunction = NativeFunction {
    name: "atan2",
    arity: Arity::exactly(2),
    func: |args| Ok(Value::Number(number_arg(args, 0).atan2(number_arg(args, 1)))),
};

// ============================================================================
// Random
// ============================================================================

lazy_static! {
    static ref RANDOM_STATE: AtomicU32 = AtomicU32::new(clock_seed());
}

fn clock_seed() -> u32 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    (nanos ^ (nanos >> 32)) as u32
}

/// Next value of a mulberry32 stream in `[0, 1)`. Not cryptographic.
fn next_random() -> f64 {
    let next = RANDOM_STATE
        .fetch_add(0x6d2b_79f5, Ordering::Relaxed)
        .wrapping_add(0x6d2b_79f5);
    let mut t = (next ^ (next >> 15)).wrapping_mul(next | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    f64::from(t ^ (t >> 14)) / 4_294_967_296.0
}

static RANDOM: NativeFunction = NativeFunction {
    name: "random",
    arity: Arity::exactly(0),
    func: |_| Ok(Value::Number(next_random())),
};

// ============================================================================
// Package
// ============================================================================

static FUNCTIONS: &[&NativeFunction] = &[
    &ABS, &CEIL, &FLOOR, &ROUND, &TRUNC, &SIGN, &SQRT, &CBRT, &POW, &MIN, &MAX, &HYPOT, &LOG,
    &LOG10, &LOG2, &EXP, &SIN, &COS, &TAN, &ATAN2, &RANDOM,
];

/// Build the `Math` namespace object.
pub fn build_math_package() -> Value {
    let mut package = PropertyMap::new();

    package.insert("PI", Value::Number(core::f64::consts::PI));
    package.insert("E", Value::Number(core::f64::consts::E));
    package.insert("LN2", Value::Number(core::f64::consts::LN_2));
    package.insert("LN10", Value::Number(core::f64::consts::LN_10));
    package.insert("SQRT2", Value::Number(core::f64::consts::SQRT_2));

    for function in FUNCTIONS {
        package.insert(function.name, Value::Function(Callable::Native(*function)));
    }

    Value::map(package)
}
