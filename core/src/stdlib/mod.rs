//! Allowed globals.
//!
//! Everything an expression can name besides `container` and `player` comes
//! from a [`Registry`]: the `Math` and `Date` packages, the numeric helpers,
//! the entity finders, and the constructors reachable through `new`.
//!
//! The process-wide registry is built once, sorted, and never changes. Every
//! entry added here widens what expressions can reach, so additions should be
//! reviewed with that in mind.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::values::{
    Constructor, Value,
    coerce::{to_number, to_string},
};

pub mod date;
pub mod finder;
pub mod math;
pub mod numeric;
pub mod policy;

pub use date::{DATE_CONSTRUCTOR, build_date_package};
pub use finder::{
    Cardinality, EntityFinder, EntityKind, FINDERS, FinderFunction, FinderQuery, NoEntities,
};
pub use math::build_math_package;
pub use policy::{BLOCKED_MUTATORS, BLOCKED_PROPERTIES, is_blocked_mutator, is_blocked_property};

lazy_static! {
    /// The default registry used by every sandbox that does not supply its own.
    pub static ref ALLOWED_GLOBALS: Arc<Registry> = Arc::new(Registry::standard());
}

/// Sorted, read-only table of global names.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<(Arc<str>, Value)>,
    constructors: Vec<&'static Constructor>,
}

impl Registry {
    /// The standard library.
    pub fn standard() -> Self {
        let mut builder = RegistryBuilder::new();
        register_stdlib(&mut builder);
        builder.build()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .binary_search_by(|(key, _)| (**key).cmp(name))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn constructor(&self, name: &str) -> Option<&'static Constructor> {
        self.constructors
            .binary_search_by(|ctor| ctor.name.cmp(name))
            .ok()
            .map(|i| self.constructors[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for a [`Registry`].
///
/// ```
/// use vigil_core::stdlib::{Registry, RegistryBuilder};
/// use vigil_core::values::Value;
///
/// let mut builder = RegistryBuilder::new();
/// builder.register("answer", Value::Number(42.0));
/// let registry: Registry = builder.build();
/// assert!(registry.contains("answer"));
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<(Arc<str>, Value)>,
    constructors: Vec<&'static Constructor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a global value. A second registration under the same name
    /// replaces the first.
    pub fn register(&mut self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => {
                tracing::warn!(name = %name, "global registered twice, replacing");
                *slot = value;
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Register a constructor reachable through `new`.
    pub fn register_constructor(&mut self, constructor: &'static Constructor) {
        self.constructors.retain(|c| c.name != constructor.name);
        self.constructors.push(constructor);
    }

    /// Sort by name for binary search.
    pub fn build(mut self) -> Registry {
        self.entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        self.constructors.sort_by_key(|c| c.name);
        Registry {
            entries: self.entries,
            constructors: self.constructors,
        }
    }
}

/// Register every standard package.
///
/// Hosts that want a smaller surface can start from an empty
/// [`RegistryBuilder`] and register packages one at a time.
pub fn register_stdlib(builder: &mut RegistryBuilder) {
    builder.register("Math", build_math_package());
    date::register(builder);
    numeric::register(builder);
    finder::register(builder);
}

/// Argument `i` through ToNumber. Missing arguments are `undefined`.
pub(crate) fn number_arg(args: &[Value], i: usize) -> f64 {
    to_number(args.get(i).unwrap_or(&Value::Undefined))
}

/// Argument `i` through ToString.
pub(crate) fn string_arg(args: &[Value], i: usize) -> Arc<str> {
    to_string(args.get(i).unwrap_or(&Value::Undefined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Callable;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_registry() {
        let registry = Registry::standard();
        for name in ["Math", "Date", "parseInt", "parseFloat", "isNaN", "isFinite", "NaN"] {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert!(matches!(registry.get("undefined"), Some(Value::Undefined)));
        assert!(matches!(
            registry.get("findItem"),
            Some(Value::Function(Callable::Finder(_)))
        ));
        assert!(registry.get("eval").is_none());
        assert!(registry.get("Function").is_none());
        assert_eq!(registry.len(), 2 + 4 + 3 + FINDERS.len());
    }

    #[test]
    fn test_constructors() {
        let registry = Registry::standard();
        assert_eq!(registry.constructor("Date").map(|c| c.name), Some("Date"));
        assert!(registry.constructor("Object").is_none());
        // The Date constructor is only reachable through `new`.
        assert!(matches!(registry.get("Date"), Some(Value::Map(_))));
    }

    #[test]
    fn test_builder_sorts_and_replaces() {
        let mut builder = RegistryBuilder::new();
        builder.register("b", Value::Number(1.0));
        builder.register("a", Value::Number(2.0));
        builder.register("b", Value::Number(3.0));
        let registry = builder.build();
        let names: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.get("b").and_then(Value::as_number), Some(3.0));
    }

    #[test]
    fn test_shared_registry_is_standard() {
        assert_eq!(ALLOWED_GLOBALS.len(), Registry::standard().len());
    }
}
