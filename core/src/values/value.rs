use std::sync::Arc;

use crate::values::{Callable, ClosureFunction, HostObject, View};

/// A runtime value.
///
/// Reference kinds (`List`, `Map`, `Object`) are never handed to expression
/// code directly: the evaluator wraps them in a [`View`] first.
#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Arc<str>),
    List(Arc<[Value]>),
    Map(Arc<PropertyMap>),
    Object(Arc<dyn HostObject>),
    Function(Callable),
    View(View),
}

/// String-keyed properties in insertion order, as built by object literals.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    entries: Vec<(Arc<str>, Value)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Arc<str>> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn map(map: PropertyMap) -> Self {
        Value::Map(Arc::new(map))
    }

    pub fn object(host: impl HostObject + 'static) -> Self {
        Value::Object(Arc::new(host))
    }

    pub fn closure(function: ClosureFunction) -> Self {
        Value::Function(Callable::Closure(Arc::new(function)))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Whether this value may leave the sandbox as a result.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_)
        )
    }

    /// The value behind any view.
    pub fn target(&self) -> &Value {
        match self {
            Value::View(view) => view.target(),
            other => other,
        }
    }

    /// Stable identity of a reference value, looking through views.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Map(map) => Some(Arc::as_ptr(map) as *const () as usize),
            Value::Object(host) => Some(Arc::as_ptr(host) as *const () as usize),
            Value::Function(callable) => Some(callable.identity()),
            Value::View(view) => view.target().identity(),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&Arc<dyn HostObject>> {
        match self.target() {
            Value::Object(host) => Some(host),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self.target() {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The `typeof` name.
    pub fn type_name(&self) -> &'static str {
        match self.target() {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::List(_) | Value::Map(_) | Value::Object(_) | Value::View(_) => "object",
        }
    }

    /// A short description for error messages.
    pub fn describe(&self) -> String {
        match self.target() {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "object".to_string(),
            Value::Object(host) => format!("{} object", host.kind()),
            Value::Function(callable) => format!("function {}", callable.name()),
            other => other.type_name().to_string(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}
