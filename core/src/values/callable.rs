//! The closed set of things an expression can call.

use core::fmt;
use std::sync::Arc;

use crate::{
    errors::ErrorKind,
    stdlib::FinderFunction,
    values::{Value, builtins},
};

/// Signature shared by every native function and constructor.
pub type NativeFn = fn(&[Value]) -> Result<Value, ErrorKind>;

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn check(&self, function: &str, got: usize) -> Result<(), ErrorKind> {
        let ok = got >= self.min && self.max.is_none_or(|max| got <= max);
        if ok {
            return Ok(());
        }
        let expected = match self.max {
            Some(max) if max == self.min => format!("{}", max),
            Some(max) => format!("{} to {}", self.min, max),
            None => format!("at least {}", self.min),
        };
        Err(ErrorKind::invalid_arguments(
            function,
            format!("expected {} arguments, got {}", expected, got),
        ))
    }
}

/// A host function with a fixed name and arity.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn call(&self, args: &[Value]) -> Result<Value, ErrorKind> {
        self.arity.check(self.name, args.len())?;
        (self.func)(args)
    }
}

type ClosureFn = dyn Fn(&[Value]) -> Result<Value, ErrorKind> + Send + Sync;

/// A host-provided closure, for function-valued fields of live objects.
pub struct ClosureFunction {
    name: Arc<str>,
    arity: Arity,
    func: Box<ClosureFn>,
}

impl ClosureFunction {
    pub fn new<F>(name: impl Into<Arc<str>>, arity: Arity, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ErrorKind> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, ErrorKind> {
        self.arity.check(&self.name, args.len())?;
        (self.func)(args)
    }
}

impl fmt::Debug for ClosureFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A method read off a receiver, still bound to it.
#[derive(Debug)]
pub struct Method {
    pub receiver: Value,
    pub name: Arc<str>,
}

impl Method {
    pub fn call(&self, args: &[Value]) -> Result<Value, ErrorKind> {
        builtins::invoke_method(&self.receiver, &self.name, args)
    }
}

/// A whitelisted constructor, reachable only through `new`.
#[derive(Debug)]
pub struct Constructor {
    pub name: &'static str,
    pub arity: Arity,
    pub construct: NativeFn,
}

impl Constructor {
    pub fn construct(&self, args: &[Value]) -> Result<Value, ErrorKind> {
        self.arity.check(self.name, args.len())?;
        (self.construct)(args)
    }
}

/// Every invocable target.
#[derive(Clone, Debug)]
pub enum Callable {
    Native(&'static NativeFunction),
    Closure(Arc<ClosureFunction>),
    Finder(&'static FinderFunction),
    Method(Arc<Method>),
    /// A mutator read through a view. Calling it always fails.
    Blocked(Arc<str>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Native(native) => native.name,
            Callable::Closure(closure) => closure.name(),
            Callable::Finder(finder) => finder.name,
            Callable::Method(method) => &method.name,
            Callable::Blocked(name) => name,
        }
    }

    pub fn identity(&self) -> usize {
        match self {
            Callable::Native(native) => *native as *const NativeFunction as usize,
            Callable::Closure(closure) => Arc::as_ptr(closure) as usize,
            Callable::Finder(finder) => *finder as *const FinderFunction as usize,
            Callable::Method(method) => Arc::as_ptr(method) as usize,
            Callable::Blocked(name) => Arc::as_ptr(name) as *const u8 as usize,
        }
    }

    pub fn method(receiver: Value, name: &str) -> Self {
        Callable::Method(Arc::new(Method {
            receiver,
            name: name.into(),
        }))
    }

    pub fn blocked(name: &str) -> Self {
        Callable::Blocked(name.into())
    }
}
