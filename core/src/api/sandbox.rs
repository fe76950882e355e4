//! The evaluation entry point.

use std::sync::Arc;

use bumpalo::Bump;
use static_assertions::assert_impl_all;

use crate::{
    api::SandboxOptions,
    errors::Error,
    evaluator::{self, Context, guard_result},
    parser,
    stdlib::{ALLOWED_GLOBALS, EntityFinder, NoEntities, Registry},
    values::{Primitive, Value},
};

/// Evaluates expression text against live objects.
///
/// A sandbox holds only read-only configuration, so one instance can serve
/// any number of concurrent calls. Each call parses, adapts, evaluates and
/// guards in isolation: its arena, node budget and view cache are dropped
/// when it returns.
///
/// # Example
///
/// ```
/// use vigil_core::{Sandbox, SandboxOptions, values::{Primitive, Value}};
///
/// let sandbox = Sandbox::new(SandboxOptions::default());
/// let result = sandbox.evaluate("1 + 1", &Value::Null, &Value::Null).unwrap();
/// assert_eq!(result, Primitive::Number(2.0));
/// ```
#[derive(Clone)]
pub struct Sandbox {
    options: SandboxOptions,
    finder: Arc<dyn EntityFinder>,
    registry: Arc<Registry>,
}

assert_impl_all!(Sandbox: Send, Sync);
assert_impl_all!(Value: Send, Sync);

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(SandboxOptions::default())
    }
}

impl core::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sandbox")
            .field("options", &self.options)
            .field("globals", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl Sandbox {
    /// A sandbox with the standard globals and no entities.
    pub fn new(options: SandboxOptions) -> Self {
        Self {
            options,
            finder: Arc::new(NoEntities),
            registry: Arc::clone(&ALLOWED_GLOBALS),
        }
    }

    /// Route finder calls to `finder`.
    pub fn with_finder(mut self, finder: Arc<dyn EntityFinder>) -> Self {
        self.finder = finder;
        self
    }

    /// Replace the globals expressions can name.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &SandboxOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Evaluate `text` with `container` and `player` in scope.
    ///
    /// Pass [`Value::Null`] for an absent container or player.
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn evaluate(&self, text: &str, container: &Value, player: &Value) -> Result<Primitive, Error> {
        let arena = Bump::new();
        let source = arena.alloc_str(text);
        let script = parser::parse_with_options(&arena, source, self.options.parse_options())?;
        let expr = parser::adapt(&arena, &script)?;

        let mut context = Context::build(container, player, Arc::clone(&self.registry));
        let value = evaluator::eval(
            self.options.evaluator_options(),
            &expr,
            &mut context,
            self.finder.as_ref(),
        )?;

        let span = expr.ann.span_of(expr.expr);
        guard_result(&value).map_err(|kind| Error::new(kind, span))
    }
}

/// Evaluate `text` with a default [`Sandbox`].
///
/// ```
/// use vigil_core::{evaluate, values::{Primitive, Value}};
///
/// assert_eq!(evaluate("'a' + 1", &Value::Null, &Value::Null), Ok(Primitive::Str("a1".into())));
/// ```
pub fn evaluate(text: &str, container: &Value, player: &Value) -> Result<Primitive, Error> {
    Sandbox::default().evaluate(text, container, player)
}
