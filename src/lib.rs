//! Vigil - sandboxed expressions for game content
//!
//! # Overview
//!
//! Content authors embed short expressions in item descriptions, puzzle
//! conditions and flag values. Vigil evaluates them against the live objects
//! they are attached to, without letting them call unapproved functions,
//! modify the objects, or run unbounded.
//!
//! # Quick Start
//!
//! ```
//! use vigil::{Sandbox, SandboxOptions};
//! use vigil::values::{Primitive, PropertyMap, Value};
//!
//! let room: PropertyMap = [("name", Value::from("cellar"))].into_iter().collect();
//! let sandbox = Sandbox::new(SandboxOptions::default());
//! let result = sandbox
//!     .evaluate("'You are in the ' + container.name", &Value::map(room), &Value::Null)
//!     .unwrap();
//! assert_eq!(result, Primitive::Str("You are in the cellar".into()));
//! ```
//!
//! # Errors
//!
//! Every failure is an [`Error`] with a category and, when known, the span
//! of the offending node. [`render_error`] prints it against the expression
//! text:
//!
//! ```
//! use vigil::{evaluate, render_error_to_string_no_color, values::Value};
//!
//! let source = "container.constructor";
//! let err = evaluate(source, &Value::Null, &Value::Null).unwrap_err();
//! let output = render_error_to_string_no_color(&err, source);
//! assert!(output.contains("constructor"));
//! ```

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from vigil_core
pub use vigil_core::api::{Sandbox, SandboxOptions, evaluate};
pub use vigil_core::errors::{Error, ErrorKind, Limit, Mutation, Prohibited};
pub use vigil_core::stdlib::{
    self, EntityFinder, EntityKind, FinderQuery, NoEntities, Registry, RegistryBuilder,
};
pub use vigil_core::values::{self, HostObject, Primitive, Value};
