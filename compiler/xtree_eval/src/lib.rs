//! Reference evaluator for xtree trees.
//!
//! Finished trees are handed to this crate through two entry points:
//!
//! - [`compile`] turns a lambda-shaped tree into a [`CompiledLambda`] that
//!   can be invoked any number of times;
//! - [`evaluate_closed`] evaluates a tree with no free parameters once
//!   (constant folding during normalization uses it).
//!
//! Both go through a default [`Interpreter`]; use [`InterpreterBuilder`] to
//! change the [`EvalConfig`].

mod compiled;
mod environment;
pub mod errors;
mod interpreter;

pub use compiled::CompiledLambda;
pub use environment::{AssignError, Scope};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{EvalConfig, Interpreter, InterpreterBuilder};

use xtree_ir::{Expr, Value};

/// Compile `expr` with the default interpreter.
pub fn compile(expr: &Expr) -> Result<CompiledLambda, EvalError> {
    Interpreter::default().compile(expr)
}

/// Evaluate a closed tree with the default interpreter.
pub fn evaluate_closed(expr: &Expr) -> Result<Value, EvalError> {
    Interpreter::default().evaluate_closed(expr)
}
