use pretty_assertions::assert_eq;

use crate::values::{
    PropertyMap, Value,
    coerce::{
        add, array_index, compare, format_number, loose_equals, pow, relative_index,
        strict_equals, string_to_number, to_number, to_string, truthy,
    },
};
use core::cmp::Ordering;

#[test]
fn test_format_number() {
    let cases = [
        (0.0, "0"),
        (-0.0, "0"),
        (1.0, "1"),
        (-42.0, "-42"),
        (0.1 + 0.2, "0.30000000000000004"),
        (1.5, "1.5"),
        (123456789.0, "123456789"),
        (1e21, "1e+21"),
        (1.5e21, "1.5e+21"),
        (1e20, "100000000000000000000"),
        (0.000001, "0.000001"),
        (1e-7, "1e-7"),
        (1.2345e-7, "1.2345e-7"),
        (f64::NAN, "NaN"),
        (f64::INFINITY, "Infinity"),
        (f64::NEG_INFINITY, "-Infinity"),
    ];
    for (n, expected) in cases {
        assert_eq!(format_number(n), expected, "formatting {:?}", n);
    }
}

#[test]
fn test_string_to_number() {
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number("  \n"), 0.0);
    assert_eq!(string_to_number(" 42 "), 42.0);
    assert_eq!(string_to_number("-1.5e2"), -150.0);
    assert_eq!(string_to_number(".5"), 0.5);
    assert_eq!(string_to_number("5."), 5.0);
    assert_eq!(string_to_number("0x1F"), 31.0);
    assert_eq!(string_to_number("0b101"), 5.0);
    assert_eq!(string_to_number("0o17"), 15.0);
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert!(string_to_number("12px").is_nan());
    assert!(string_to_number("0x").is_nan());
    assert!(string_to_number("1e").is_nan());
    assert!(string_to_number(".").is_nan());
    assert!(string_to_number("inf").is_nan());
}

#[test]
fn test_to_number_of_values() {
    assert!(to_number(&Value::Undefined).is_nan());
    assert_eq!(to_number(&Value::Null), 0.0);
    assert_eq!(to_number(&Value::Bool(true)), 1.0);
    assert_eq!(to_number(&Value::list([])), 0.0);
    assert_eq!(to_number(&Value::list([Value::from(7.0)])), 7.0);
    assert!(to_number(&Value::list([Value::from(1.0), Value::from(2.0)])).is_nan());
    assert!(to_number(&Value::map(PropertyMap::new())).is_nan());
}

#[test]
fn test_to_string_of_values() {
    assert_eq!(&*to_string(&Value::Undefined), "undefined");
    assert_eq!(&*to_string(&Value::Null), "null");
    assert_eq!(&*to_string(&Value::Bool(false)), "false");
    assert_eq!(&*to_string(&Value::from(2.5)), "2.5");
    let list = Value::list([Value::from(1.0), Value::Null, Value::from("a")]);
    assert_eq!(&*to_string(&list), "1,,a");
    assert_eq!(&*to_string(&Value::map(PropertyMap::new())), "[object Object]");
}

#[test]
fn test_truthiness() {
    assert!(!truthy(&Value::Undefined));
    assert!(!truthy(&Value::Null));
    assert!(!truthy(&Value::from(0.0)));
    assert!(!truthy(&Value::from(f64::NAN)));
    assert!(!truthy(&Value::from("")));
    assert!(truthy(&Value::from("0")));
    assert!(truthy(&Value::list([])));
    assert!(truthy(&Value::map(PropertyMap::new())));
}

#[test]
fn test_strict_equality() {
    assert!(strict_equals(&Value::from(1.0), &Value::from(1.0)));
    assert!(!strict_equals(&Value::from(1.0), &Value::from("1")));
    assert!(!strict_equals(&Value::from(f64::NAN), &Value::from(f64::NAN)));
    assert!(strict_equals(&Value::from(0.0), &Value::from(-0.0)));
    assert!(!strict_equals(&Value::Null, &Value::Undefined));

    let list = Value::list([Value::from(1.0)]);
    assert!(strict_equals(&list, &list.clone()));
    assert!(!strict_equals(&list, &Value::list([Value::from(1.0)])));
}

#[test]
fn test_loose_equality() {
    assert!(loose_equals(&Value::Null, &Value::Undefined));
    assert!(!loose_equals(&Value::Null, &Value::from(0.0)));
    assert!(loose_equals(&Value::from(1.0), &Value::from("1")));
    assert!(loose_equals(&Value::Bool(true), &Value::from(1.0)));
    assert!(loose_equals(&Value::Bool(false), &Value::from("")));
    assert!(loose_equals(&Value::from("1,2"), &Value::list([Value::from(1.0), Value::from(2.0)])));
    assert!(!loose_equals(&Value::from(f64::NAN), &Value::from(f64::NAN)));
}

#[test]
fn test_compare() {
    assert_eq!(compare(&Value::from(1.0), &Value::from(2.0)), Some(Ordering::Less));
    assert_eq!(compare(&Value::from("10"), &Value::from(9.0)), Some(Ordering::Greater));
    // Strings compare lexicographically.
    assert_eq!(compare(&Value::from("10"), &Value::from("9")), Some(Ordering::Less));
    assert_eq!(compare(&Value::from("a"), &Value::from(1.0)), None);
    assert_eq!(compare(&Value::Null, &Value::from(0.0)), Some(Ordering::Equal));
}

#[test]
fn test_add() {
    let sum = add(&Value::from(1.0), &Value::from(2.0));
    assert_eq!(sum.as_number(), Some(3.0));
    let concat = add(&Value::from("a"), &Value::from(1.0));
    assert_eq!(concat.as_str(), Some("a1"));
    let with_list = add(&Value::list([Value::from(1.0)]), &Value::from(1.0));
    assert_eq!(with_list.as_str(), Some("11"));
    let with_null = add(&Value::Null, &Value::Bool(true));
    assert_eq!(with_null.as_number(), Some(1.0));
}

#[test]
fn test_pow_edge_cases() {
    assert_eq!(pow(2.0, 10.0), 1024.0);
    assert_eq!(pow(5.0, 0.0), 1.0);
    assert!(pow(1.0, f64::INFINITY).is_nan());
    assert!(pow(-1.0, f64::NEG_INFINITY).is_nan());
    assert!(pow(1.0, f64::NAN).is_nan());
}

#[test]
fn test_indices() {
    assert_eq!(array_index("0"), Some(0));
    assert_eq!(array_index("12"), Some(12));
    assert_eq!(array_index("01"), None);
    assert_eq!(array_index("1.0"), None);
    assert_eq!(array_index("-1"), None);
    assert_eq!(array_index(""), None);

    assert_eq!(relative_index(None, 5, 0), 0);
    assert_eq!(relative_index(Some(&Value::from(-2.0)), 5, 0), 3);
    assert_eq!(relative_index(Some(&Value::from(-9.0)), 5, 0), 0);
    assert_eq!(relative_index(Some(&Value::from(9.0)), 5, 0), 5);
    assert_eq!(relative_index(Some(&Value::Undefined), 5, 5), 5);
}
