//! The capability interface live game objects expose to the sandbox.

use core::fmt;
use std::sync::Arc;

use crate::{errors::ErrorKind, values::Value};

/// Preferred result type when converting an object to a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveHint {
    Default,
    Number,
    String,
}

/// A live object the sandbox may read.
///
/// The trait has no setters: read-only access is a property of the
/// interface, not of the caller's discipline. Implementations describe their
/// readable fields through [`get`](HostObject::get) and
/// [`keys`](HostObject::keys) and their callable methods through
/// [`methods`](HostObject::methods) and [`invoke`](HostObject::invoke).
///
/// Values handed out by `get` and `invoke` are wrapped in read-only views
/// before expression code can see them.
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Kind name such as `Room` or `Player`.
    fn kind(&self) -> &str;

    /// Read a field. `None` reads as `undefined`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Field names, in a stable order.
    fn keys(&self) -> Vec<Arc<str>>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some() || self.methods().contains(&key)
    }

    /// Names accepted by [`invoke`](HostObject::invoke).
    fn methods(&self) -> &[&'static str] {
        &[]
    }

    /// Call a method named in [`methods`](HostObject::methods).
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ErrorKind> {
        let _ = args;
        Err(ErrorKind::NotAFunction {
            callee: format!("{}.{}", self.kind(), method),
        })
    }

    /// Primitive conversion. `None` falls back to `[object Kind]`.
    fn to_primitive(&self, hint: PrimitiveHint) -> Option<Value> {
        let _ = hint;
        None
    }
}
