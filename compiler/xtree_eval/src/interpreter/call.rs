//! Calls, constructors, member reads and awaits.

use xtree_ir::{Expr, MemberRef, MethodBody, MethodRef, Value};

use super::{null_reference, Flow, Interpreter};
use crate::environment::Scope;
use crate::errors::{arity_mismatch, not_awaitable, not_callable, type_mismatch, unsupported};

fn type_name(value: &Value) -> String {
    value
        .runtime_ty()
        .map_or_else(|| "null".to_owned(), |ty| ty.to_string())
}

impl Interpreter {
    pub(super) fn eval_call(
        &self,
        receiver: Option<&Expr>,
        method: &MethodRef,
        args: &[Expr],
        scope: &Scope,
    ) -> Flow {
        let receiver = match receiver {
            Some(receiver) if !method.is_static => Some(self.eval(receiver, scope)?),
            _ => None,
        };
        let args = self.eval_args(args, scope)?;
        self.dispatch(method, receiver.as_ref(), &args)
    }

    /// Invoke `method` on evaluated operands.
    pub(super) fn dispatch(
        &self,
        method: &MethodRef,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Flow {
        if args.len() != method.params.len() {
            return Err(arity_mismatch(method.params.len(), args.len()).into());
        }
        if !method.is_static {
            match receiver {
                None | Some(Value::Null) => return Err(null_reference(&method.name)),
                Some(_) => {}
            }
        }
        let result = match &method.body {
            MethodBody::Host(body) => body(receiver, args),
            MethodBody::Virtual => match receiver {
                Some(Value::Object(obj)) => obj.invoke(&method.name, args),
                Some(other) => {
                    return Err(type_mismatch(&method.declaring.to_string(), &type_name(other))
                        .into())
                }
                None => return Err(unsupported("virtual dispatch without a receiver").into()),
            },
        };
        let value = result.map_err(Interpreter::from_host_error)?;
        Ok(if method.ret.is_void() { Value::Void } else { value })
    }

    pub(super) fn eval_invoke(&self, target: &Expr, args: &[Expr], scope: &Scope) -> Flow {
        let callee = self.eval(target, scope)?;
        let args = self.eval_args(args, scope)?;
        match callee {
            Value::Func(func) => {
                let expected = func.ty().func_sig().map_or(args.len(), |sig| sig.params.len());
                if expected != args.len() {
                    return Err(arity_mismatch(expected, args.len()).into());
                }
                func.call(&args).map_err(Interpreter::from_host_error)
            }
            Value::Null => Err(null_reference("invoke")),
            other => Err(not_callable(&type_name(&other)).into()),
        }
    }

    pub(super) fn eval_member(
        &self,
        target: Option<&Expr>,
        member: &MemberRef,
        scope: &Scope,
    ) -> Flow {
        let Some(target) = target else {
            return Err(unsupported("static member access").into());
        };
        match self.eval(target, scope)? {
            Value::Object(obj) => obj.get(&member.name).map_err(Interpreter::from_host_error),
            Value::Null => Err(null_reference(&member.name)),
            Value::Str(s) if &*member.name == "Length" => {
                Ok(Value::Int(i64::try_from(s.chars().count()).unwrap_or(i64::MAX)))
            }
            Value::Array(arr) if &*member.name == "Length" => {
                Ok(Value::Int(i64::try_from(arr.items.len()).unwrap_or(i64::MAX)))
            }
            other => Err(type_mismatch(&member.declaring.to_string(), &type_name(&other)).into()),
        }
    }

    /// Tasks handed to trees are already completed; awaiting replays the
    /// outcome.
    pub(super) fn eval_await(&self, task: &Expr, scope: &Scope) -> Flow {
        match self.eval(task, scope)? {
            Value::Task(task) => task.outcome().map_err(Interpreter::from_host_error),
            Value::Null => Err(null_reference("await")),
            other => Err(not_awaitable(&type_name(&other)).into()),
        }
    }
}
