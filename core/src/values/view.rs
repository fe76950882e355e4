//! Read-only views over shared values.
//!
//! A view forwards reads to its target and wraps whatever they return, so
//! expression code never holds a bare reference to a live object. Every
//! write path exists only to fail.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::{
    errors::{ErrorKind, Mutation},
    stdlib::policy::BLOCKED_MUTATORS,
    values::{
        Callable, Value,
        builtins::{self, LIST_METHODS, LIST_MUTATORS},
        coerce::array_index,
    },
};

#[derive(Clone)]
pub struct View(Arc<ViewInner>);

struct ViewInner {
    target: Value,
}

/// Own-property introspection result. Views never report a writable slot.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub value: Value,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyDescriptor {
    fn read_only(value: Value, enumerable: bool) -> Self {
        Self {
            value,
            writable: false,
            enumerable,
            configurable: false,
        }
    }
}

impl View {
    fn new(target: Value) -> Self {
        View(Arc::new(ViewInner { target }))
    }

    pub fn target(&self) -> &Value {
        &self.0.target
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Whether both handles are the same wrapper instance.
    pub fn ptr_eq(&self, other: &View) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Read a property. Functions come back bound to this view, mutators
    /// come back blocked, and everything else is wrapped through `cache`.
    pub fn get(&self, key: &str, cache: &mut ViewCache) -> Value {
        let receiver = Value::View(self.clone());
        let value = match self.target() {
            Value::List(items) => builtins::list_property(&receiver, items, key),
            Value::Map(map) => map.get(key).cloned().unwrap_or(Value::Undefined),
            Value::Object(host) => {
                if host.methods().contains(&key) {
                    Value::Function(Callable::method(receiver, key))
                } else {
                    host.get(key).unwrap_or(Value::Undefined)
                }
            }
            _ => Value::Undefined,
        };
        match value {
            Value::Function(_) if BLOCKED_MUTATORS.contains(&key) => {
                Value::Function(Callable::blocked(key))
            }
            method @ Value::Function(Callable::Method(_)) => cache.bind(self, key, method),
            other => cache.wrap(other),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        match self.target() {
            Value::List(items) => {
                key == "length"
                    || array_index(key).is_some_and(|i| i < items.len())
                    || LIST_METHODS.contains(&key)
                    || LIST_MUTATORS.contains(&key)
            }
            Value::Map(map) => map.contains_key(key),
            Value::Object(host) => host.has(key),
            _ => false,
        }
    }

    /// Own enumerable keys.
    pub fn keys(&self) -> Vec<Arc<str>> {
        match self.target() {
            Value::List(items) => (0..items.len()).map(|i| i.to_string().into()).collect(),
            Value::Map(map) => map.keys().cloned().collect(),
            Value::Object(host) => host.keys(),
            _ => Vec::new(),
        }
    }

    pub fn descriptor(&self, key: &str, cache: &mut ViewCache) -> Option<PropertyDescriptor> {
        let (value, enumerable) = match self.target() {
            Value::List(items) if key == "length" => (Value::Number(items.len() as f64), false),
            Value::List(items) => (items.get(array_index(key)?)?.clone(), true),
            Value::Map(map) => (map.get(key)?.clone(), true),
            Value::Object(host) => (host.get(key)?, true),
            _ => return None,
        };
        Some(PropertyDescriptor::read_only(cache.wrap(value), enumerable))
    }

    pub fn set(&self, key: &str, _value: Value) -> Result<(), ErrorKind> {
        tracing::warn!(key, "write through read-only view");
        Err(ErrorKind::MutationProhibited(Mutation::Set(key.to_string())))
    }

    pub fn delete(&self, key: &str) -> Result<(), ErrorKind> {
        tracing::warn!(key, "delete through read-only view");
        Err(ErrorKind::MutationProhibited(Mutation::Delete(
            key.to_string(),
        )))
    }

    pub fn define_property(
        &self,
        key: &str,
        _descriptor: PropertyDescriptor,
    ) -> Result<(), ErrorKind> {
        tracing::warn!(key, "property definition through read-only view");
        Err(ErrorKind::MutationProhibited(Mutation::DefineProperty(
            key.to_string(),
        )))
    }

    pub fn set_prototype(&self, _prototype: &Value) -> Result<(), ErrorKind> {
        tracing::warn!("prototype change through read-only view");
        Err(ErrorKind::MutationProhibited(Mutation::SetPrototype))
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("View").field(self.target()).finish()
    }
}

/// Read `key` from any value: primitives expose their built-in members,
/// reference values are read through their view.
pub fn read_property(value: &Value, key: &str, cache: &mut ViewCache) -> Value {
    match value {
        Value::View(view) => view.get(key, cache),
        Value::List(_) | Value::Map(_) | Value::Object(_) => match cache.wrap(value.clone()) {
            Value::View(view) => view.get(key, cache),
            _ => Value::Undefined,
        },
        Value::Function(_) | Value::Undefined | Value::Null => Value::Undefined,
        primitive => builtins::primitive_property(primitive, key),
    }
}

/// Views created during one evaluation, keyed by target identity.
///
/// Wrapping the same target twice yields the same view, so `===` between
/// two reads of one object holds. Bound methods are kept the same way.
/// Dropped with the evaluation.
#[derive(Debug, Default)]
pub struct ViewCache {
    views: HashMap<usize, View>,
    methods: HashMap<(usize, Arc<str>), Value>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap lists, maps and host objects. Other values pass through.
    pub fn wrap(&mut self, value: Value) -> Value {
        match value {
            Value::List(_) | Value::Map(_) | Value::Object(_) => {
                let Some(id) = value.identity() else {
                    return value;
                };
                let view = self
                    .views
                    .entry(id)
                    .or_insert_with(|| View::new(value))
                    .clone();
                Value::View(view)
            }
            other => other,
        }
    }

    /// The method `key` bound to `view`, made on first read.
    fn bind(&mut self, view: &View, key: &str, method: Value) -> Value {
        self.methods
            .entry((view.id(), Arc::from(key)))
            .or_insert(method)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
