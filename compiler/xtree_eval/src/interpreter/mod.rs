//! Tree-walking interpreter.
//!
//! `Interpreter::eval` evaluates one node in a scope. Non-local exits
//! (exceptions, jumps to labels, evaluation errors) travel up the Rust stack
//! as `Err(Unwind)` until the construct that handles them: a `try` for
//! exceptions, the block holding the target label for jumps, nothing for
//! errors.
//!
//! Lambdas evaluate to `Value::Func` closures over their defining scope.
//! When such a closure is called from host code, an unwinding error has to
//! cross the `Result<Value, Thrown>` host boundary; it is wrapped in an
//! `EvalFault` object that no catch clause matches and unwrapped again on the
//! way back in.

mod builder;
mod call;
mod control;
mod operators;

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;
use xtree_ir::{
    builtins, ensure_sufficient_stack, free_parameters, Expr, ExprKind, HostFn, HostObject,
    LabelTarget, Param, Thrown, Ty, Value,
};

pub use builder::{EvalConfig, InterpreterBuilder};

use crate::environment::{AssignError, Scope};
use crate::errors::{
    arity_mismatch, stack_overflow, unbound_parameter, unhandled, unresolved_label, EvalError,
};
use crate::CompiledLambda;

/// Non-local exit in progress.
#[derive(Debug)]
pub(crate) enum Unwind {
    Throw(Value),
    Jump { label: LabelTarget, value: Value },
    Error(EvalError),
}

impl From<EvalError> for Unwind {
    fn from(error: EvalError) -> Self {
        Unwind::Error(error)
    }
}

pub(crate) type Flow = Result<Value, Unwind>;

/// Arguments of one call; most calls take few.
pub(crate) type Args = SmallVec<[Value; 4]>;

/// Throw a built-in exception.
#[cold]
pub(crate) fn throw(class: Ty, message: impl Into<Arc<str>>) -> Unwind {
    Unwind::Throw(Thrown::new(class, message).0)
}

/// Carrier for an evaluation error crossing a host boundary.
#[derive(Debug)]
struct EvalFault(EvalError);

impl HostObject for EvalFault {
    fn class(&self) -> Ty {
        Ty::class(xtree_ir::ClassType::new("EvaluationFault"))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// The evaluator.
///
/// Cheap to clone; clones share the call-depth counter, so the depth limit
/// holds across closures created by the same interpreter.
#[derive(Clone, Debug)]
pub struct Interpreter {
    config: EvalConfig,
    depth: Arc<AtomicUsize>,
}

impl Default for Interpreter {
    fn default() -> Self {
        InterpreterBuilder::new().build()
    }
}

/// Decrements the call depth when a lambda call ends.
struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Interpreter {
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Compile a lambda-shaped tree into a callable closure. Any other node
    /// compiles as the body of a parameterless lambda.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %expr.ty()))]
    pub fn compile(&self, expr: &Expr) -> Result<CompiledLambda, EvalError> {
        let (params, body) = match expr.kind() {
            ExprKind::Lambda { params, body } => (params.clone(), body.clone()),
            _ => (Vec::new(), expr.clone()),
        };
        let ret = match expr.ty().func_sig() {
            Some(sig) if matches!(expr.kind(), ExprKind::Lambda { .. }) => sig.ret.clone(),
            _ => expr.ty().clone(),
        };
        if let Some(free) = free_parameters(&Expr::lambda(params.clone(), body.clone())).first()
        {
            return Err(unbound_parameter(&free.display_name()));
        }
        tracing::debug!(params = params.len(), "compiled lambda");
        Ok(CompiledLambda::new(self.clone(), params, body, ret))
    }

    /// Evaluate a tree with no free parameters.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn evaluate_closed(&self, expr: &Expr) -> Result<Value, EvalError> {
        if let Some(free) = free_parameters(expr).first() {
            return Err(unbound_parameter(&free.display_name()));
        }
        self.eval(expr, &Scope::root()).map_err(Interpreter::escaped)
    }

    /// Turn an unwind that left the outermost frame into an error.
    pub(crate) fn escaped(unwind: Unwind) -> EvalError {
        match unwind {
            Unwind::Throw(value) => unhandled(value),
            Unwind::Jump { label, .. } => unresolved_label(&label.display_name()),
            Unwind::Error(error) => error,
        }
    }

    /// Call a lambda body with `args` bound to `params` in a child of
    /// `scope`.
    pub(crate) fn call_lambda(
        &self,
        params: &[Param],
        body: &Expr,
        ret: &Ty,
        scope: &Scope,
        args: &[Value],
    ) -> Flow {
        let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
        let _guard = DepthGuard(&self.depth);
        if depth > self.config.max_call_depth {
            return Err(stack_overflow(self.config.max_call_depth).into());
        }
        if params.len() != args.len() {
            return Err(arity_mismatch(params.len(), args.len()).into());
        }
        let frame = scope.child();
        for (param, arg) in params.iter().zip(args) {
            frame.declare(param.id(), arg.clone());
        }
        match self.eval(body, &frame) {
            Ok(value) => Ok(if ret.is_void() { Value::Void } else { value }),
            Err(Unwind::Jump { label, .. }) => {
                Err(unresolved_label(&label.display_name()).into())
            }
            Err(other) => Err(other),
        }
    }

    /// Package an unwind for a host boundary.
    fn into_host_error(unwind: Unwind) -> Thrown {
        match unwind {
            Unwind::Throw(value) => Thrown(value),
            Unwind::Jump { label, .. } => Thrown(Value::object(EvalFault(unresolved_label(
                &label.display_name(),
            )))),
            Unwind::Error(error) => Thrown(Value::object(EvalFault(error))),
        }
    }

    /// Unpack an exception coming back from host code.
    pub(crate) fn from_host_error(thrown: Thrown) -> Unwind {
        if let Value::Object(obj) = &thrown.0 {
            if let Some(fault) = obj
                .as_any()
                .and_then(|any| any.downcast_ref::<EvalFault>())
            {
                return Unwind::Error(fault.0.clone());
            }
        }
        Unwind::Throw(thrown.0)
    }

    /// Evaluate `expr` in `scope`.
    pub(crate) fn eval(&self, expr: &Expr, scope: &Scope) -> Flow {
        ensure_sufficient_stack(|| self.eval_inner(expr, scope))
    }

    fn eval_inner(&self, expr: &Expr, scope: &Scope) -> Flow {
        match expr.kind() {
            ExprKind::Empty => Ok(Value::Void),
            ExprKind::Constant(value) => Ok(value.clone()),
            ExprKind::Parameter(param) => scope
                .lookup(param.id())
                .ok_or_else(|| unbound_parameter(&param.display_name()).into()),
            ExprKind::Block { variables, body } => self.eval_block(expr, variables, body, scope),
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => self.eval_conditional(expr, test, if_true, if_false, scope),
            ExprKind::Switch {
                value,
                cases,
                default,
                comparer,
            } => self.eval_switch(expr, value, cases, default.as_ref(), comparer.as_ref(), scope),
            ExprKind::Try {
                body,
                handlers,
                finally,
            } => self.eval_try(expr, body, handlers, finally.as_ref(), scope),
            ExprKind::Throw(value) => self.eval_throw(value.as_ref(), scope),
            ExprKind::Loop {
                body,
                break_label,
                continue_label,
            } => self.eval_loop(body, break_label.as_ref(), continue_label.as_ref(), scope),
            ExprKind::Goto { target, value, .. } => {
                let value = match value {
                    Some(value) => self.eval(value, scope)?,
                    None => Value::Void,
                };
                Err(Unwind::Jump {
                    label: target.clone(),
                    value,
                })
            }
            ExprKind::Label { default, .. } => match default {
                Some(default) => self.eval(default, scope),
                None => Ok(Value::Void),
            },
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.eval_call(receiver.as_ref(), method, args, scope),
            ExprKind::New { ctor, args } => {
                let args = self.eval_args(args, scope)?;
                (ctor.body)(&args).map_err(Interpreter::from_host_error)
            }
            ExprKind::Invoke { target, args } => self.eval_invoke(target, args, scope),
            ExprKind::Member { target, member } => {
                self.eval_member(target.as_ref(), member, scope)
            }
            ExprKind::Await(task) => self.eval_await(task, scope),
            ExprKind::Convert { kind, operand } => {
                let value = self.eval(operand, scope)?;
                operators::convert(*kind, value, expr.ty())
            }
            ExprKind::TypeIs { operand, test_ty } => {
                let value = self.eval(operand, scope)?;
                Ok(Value::Bool(operators::type_is(&value, test_ty)))
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                operators::unary(*op, value)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, scope),
            ExprKind::Assign { target, value } => {
                let value = self.eval(value, scope)?;
                match scope.assign(target.id(), value.clone()) {
                    Ok(()) => Ok(value),
                    Err(AssignError::Undefined) => {
                        Err(unbound_parameter(&target.display_name()).into())
                    }
                }
            }
            ExprKind::Lambda { params, body } => Ok(self.make_closure(expr, params, body, scope)),
            ExprKind::NewArray { elem, items } => {
                let items = self.eval_args(items, scope)?;
                Ok(Value::array(elem.clone(), items.into_vec()))
            }
        }
    }

    pub(crate) fn eval_args(&self, args: &[Expr], scope: &Scope) -> Result<Args, Unwind> {
        args.iter().map(|arg| self.eval(arg, scope)).collect()
    }

    /// A closure over `scope` for a lambda node.
    fn make_closure(&self, expr: &Expr, params: &[Param], body: &Expr, scope: &Scope) -> Value {
        let sig = expr.ty().func_sig();
        let param_tys = params.iter().map(|p| p.ty().clone()).collect();
        let ret = sig.map_or_else(|| body.ty().clone(), |sig| sig.ret.clone());
        let interp = self.clone();
        let params = params.to_vec();
        let body = body.clone();
        let scope = scope.clone();
        let ret_ty = ret.clone();
        Value::Func(HostFn::new(param_tys, ret, move |args| {
            interp
                .call_lambda(&params, &body, &ret_ty, &scope, args)
                .map_err(Interpreter::into_host_error)
        }))
    }
}

/// Thrown when a `null` receiver is dereferenced.
#[cold]
pub(crate) fn null_reference(what: &str) -> Unwind {
    throw(
        builtins::null_reference(),
        format!("Object reference not set to an instance of an object ({what})"),
    )
}
