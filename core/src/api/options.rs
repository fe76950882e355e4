//! Configuration options for the sandbox.

use crate::{evaluator::EvaluatorOptions, parser::ParseOptions};

/// Resource limits applied to every evaluation.
///
/// # Example
///
/// ```
/// use vigil_core::api::SandboxOptions;
///
/// let options = SandboxOptions {
///     max_nodes: 250,
///     ..SandboxOptions::default()
/// };
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxOptions {
    /// Maximum number of syntax tree nodes visited, member steps included.
    ///
    /// Default: 100
    pub max_nodes: usize,

    /// Maximum nesting depth, both while parsing and while evaluating.
    ///
    /// Default: 32
    pub max_depth: usize,

    /// Maximum expression length in bytes.
    ///
    /// Default: 4096
    pub max_source_len: usize,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            max_nodes: 100,
            max_depth: 32,
            max_source_len: 4096,
        }
    }
}

impl SandboxOptions {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
            max_source_len: self.max_source_len,
        }
    }

    pub fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            max_nodes: self.max_nodes,
            max_depth: self.max_depth,
        }
    }
}
