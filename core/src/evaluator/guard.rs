use crate::{
    errors::ErrorKind,
    values::{Primitive, Value},
};

/// Only strings, numbers, booleans and `null` may leave an evaluation.
pub fn guard_result(value: &Value) -> Result<Primitive, ErrorKind> {
    Primitive::from_value(value).ok_or_else(|| ErrorKind::InvalidResultType {
        found: value.type_name(),
    })
}
