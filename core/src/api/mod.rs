//! Public API for evaluating expressions.
//!
//! ```
//! use vigil_core::api::{Sandbox, SandboxOptions};
//! use vigil_core::values::{Primitive, Value};
//!
//! let sandbox = Sandbox::new(SandboxOptions::default());
//! let result = sandbox.evaluate("Math.max(1, 2)", &Value::Null, &Value::Null).unwrap();
//! assert_eq!(result, Primitive::Number(2.0));
//! ```

pub mod options;
pub mod sandbox;

pub use options::SandboxOptions;
pub use sandbox::{Sandbox, evaluate};
