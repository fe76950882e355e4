//! Date Package
//!
//! `new Date(...)` builds a [`DateObject`]; the `Date` namespace carries the
//! static helpers `now`, `parse` and `UTC`. Every date is UTC.

use crate::{
    errors::ErrorKind,
    stdlib::{RegistryBuilder, number_arg, string_arg},
    values::{
        Arity, Callable, Constructor, DateObject, NativeFunction, PrimitiveHint, PropertyMap,
        Value,
        coerce::{to_number, to_primitive},
        date::{make_time, now_millis, parse_iso},
    },
};

static NOW: NativeFunction = NativeFunction {
    name: "now",
    arity: Arity::exactly(0),
    func: |_| Ok(Value::Number(now_millis())),
};

static PARSE: NativeFunction = NativeFunction {
    name: "parse",
    arity: Arity::exactly(1),
    func: |args| Ok(Value::Number(parse_iso(&string_arg(args, 0)))),
};

static UTC: NativeFunction = NativeFunction {
    name: "UTC",
    arity: Arity::between(1, 7),
    func: |args| Ok(Value::Number(make_time(&components(args)))),
};

pub static DATE_CONSTRUCTOR: Constructor = Constructor {
    name: "Date",
    arity: Arity::between(0, 7),
    construct: construct_date,
};

fn components(args: &[Value]) -> Vec<f64> {
    (0..args.len()).map(|i| number_arg(args, i)).collect()
}

fn construct_date(args: &[Value]) -> Result<Value, ErrorKind> {
    let millis = match args {
        [] => now_millis(),
        [single] => single_argument_time(single),
        _ => make_time(&components(args)),
    };
    Ok(Value::object(DateObject::new(millis)))
}

/// A date copies another date's time, a string is parsed, anything else is
/// a millisecond count.
fn single_argument_time(arg: &Value) -> f64 {
    if let Some(host) = arg.as_host().filter(|host| host.kind() == "Date") {
        return host
            .to_primitive(PrimitiveHint::Number)
            .map_or(f64::NAN, |v| to_number(&v));
    }
    match to_primitive(arg, PrimitiveHint::Default) {
        Value::Str(s) => parse_iso(&s),
        other => to_number(&other),
    }
}

/// Build the `Date` namespace object.
pub fn build_date_package() -> Value {
    let package: PropertyMap = [&NOW, &PARSE, &UTC]
        .into_iter()
        .map(|f| (f.name, Value::Function(Callable::Native(f))))
        .collect();
    Value::map(package)
}

pub(super) fn register(builder: &mut RegistryBuilder) {
    builder.register("Date", build_date_package());
    builder.register_constructor(&DATE_CONSTRUCTOR);
}
