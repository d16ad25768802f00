//! `InterpreterBuilder` and the evaluator's runtime knobs.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::Interpreter;

/// Default limit on nested lambda calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Runtime configuration of an [`Interpreter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nested lambda calls allowed before evaluation fails with
    /// `StackOverflow`.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Builder for [`Interpreter`] instances.
#[derive(Clone, Debug, Default)]
pub struct InterpreterBuilder {
    config: EvalConfig,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Limit nested lambda calls.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            config: self.config,
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }
}
