//! Vigil core: a capability-restricted evaluator for expressions embedded in
//! game content.
//!
//! Expression text is parsed into an arena-allocated syntax tree, adapted to a
//! single rewritten expression, and interpreted against read-only views of the
//! live objects it is attached to. Only primitives ever leave the sandbox.
//!
//! ```
//! use vigil_core::{evaluate, values::Value, values::Primitive};
//!
//! let result = evaluate("1 + 1", &Value::Null, &Value::Null).unwrap();
//! assert_eq!(result, Primitive::Number(2.0));
//! ```

pub mod api;
pub mod errors;
pub mod evaluator;
pub mod parser;
pub mod stdlib;
pub mod values;

pub use api::{Sandbox, SandboxOptions, evaluate};
pub use errors::{Error, ErrorKind};
