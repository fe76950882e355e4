//! Runtime values seen by the evaluator.
//!
//! Primitives are plain data. Lists, maps and host objects are shared by
//! reference and only ever reach expression code through a [`View`].

pub mod builtins;
pub mod callable;
pub mod coerce;
pub mod date;
pub mod host;
pub mod primitive;
pub mod value;
pub mod view;

pub use callable::{Arity, Callable, ClosureFunction, Constructor, Method, NativeFn, NativeFunction};
pub use date::DateObject;
pub use host::{HostObject, PrimitiveHint};
pub use primitive::Primitive;
pub use value::{PropertyMap, Value};
pub use view::{PropertyDescriptor, View, ViewCache};

#[cfg(test)]
mod coerce_test;
