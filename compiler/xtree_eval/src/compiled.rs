//! Compiled lambdas.

use std::fmt;

use xtree_ir::{Expr, Param, Ty, Value};

use crate::environment::Scope;
use crate::errors::{arity_mismatch, EvalError};
use crate::interpreter::Interpreter;

/// A lambda-shaped tree ready to be invoked.
#[derive(Clone)]
pub struct CompiledLambda {
    interp: Interpreter,
    params: Vec<Param>,
    body: Expr,
    ret: Ty,
}

impl CompiledLambda {
    pub(crate) fn new(interp: Interpreter, params: Vec<Param>, body: Expr, ret: Ty) -> Self {
        CompiledLambda {
            interp,
            params,
            body,
            ret,
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Return type (`void` for actions).
    pub fn ret(&self) -> &Ty {
        &self.ret
    }

    /// Run the lambda. An exception escaping the body surfaces as an
    /// `Unhandled` error carrying the thrown value.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, EvalError> {
        if args.len() != self.params.len() {
            return Err(arity_mismatch(self.params.len(), args.len()));
        }
        self.interp
            .call_lambda(&self.params, &self.body, &self.ret, &Scope::root(), args)
            .map_err(Interpreter::escaped)
    }
}

impl fmt::Debug for CompiledLambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledLambda")
            .field("params", &self.params.len())
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}
