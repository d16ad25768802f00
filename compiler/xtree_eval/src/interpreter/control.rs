//! Blocks, branches, switches, exception handling and loops.

use xtree_ir::{CatchClause, Expr, ExprKind, LabelTarget, MethodRef, Param, SwitchCase, Value};

use super::{null_reference, Flow, Interpreter, Unwind};
use crate::environment::Scope;
use crate::errors::{type_mismatch, unsupported};

/// Position of the label statement for `label` among `body`.
fn label_position(body: &[Expr], label: &LabelTarget) -> Option<usize> {
    body.iter().position(
        |stmt| matches!(stmt.kind(), ExprKind::Label { target, .. } if target == label),
    )
}

fn expect_bool(value: &Value) -> Result<bool, Unwind> {
    value.as_bool().ok_or_else(|| {
        let got = value
            .runtime_ty()
            .map_or_else(|| "null".to_owned(), |ty| ty.to_string());
        type_mismatch("bool", &got).into()
    })
}

impl Interpreter {
    /// Run statements in order in a fresh scope. Jumps to a label among the
    /// block's own statements resume after that label, with the jump's value
    /// as the label's value.
    pub(super) fn eval_block(
        &self,
        expr: &Expr,
        variables: &[Param],
        body: &[Expr],
        scope: &Scope,
    ) -> Flow {
        let scope = scope.child();
        for var in variables {
            scope.declare(var.id(), default_value(var));
        }
        let mut last = Value::Void;
        let mut pc = 0;
        while let Some(stmt) = body.get(pc) {
            match self.eval(stmt, &scope) {
                Ok(value) => {
                    last = value;
                    pc += 1;
                }
                Err(Unwind::Jump { label, value }) => match label_position(body, &label) {
                    Some(pos) => {
                        last = value;
                        pc = pos + 1;
                    }
                    None => return Err(Unwind::Jump { label, value }),
                },
                Err(other) => return Err(other),
            }
        }
        Ok(if expr.ty().is_void() { Value::Void } else { last })
    }

    pub(super) fn eval_conditional(
        &self,
        expr: &Expr,
        test: &Expr,
        if_true: &Expr,
        if_false: &Expr,
        scope: &Scope,
    ) -> Flow {
        let branch = if expect_bool(&self.eval(test, scope)?)? {
            if_true
        } else {
            if_false
        };
        let value = self.eval(branch, scope)?;
        Ok(if expr.ty().is_void() { Value::Void } else { value })
    }

    /// The scrutinee is evaluated once; cases are tried in declaration order
    /// and the first matching test wins.
    pub(super) fn eval_switch(
        &self,
        expr: &Expr,
        value: &Expr,
        cases: &[SwitchCase],
        default: Option<&Expr>,
        comparer: Option<&MethodRef>,
        scope: &Scope,
    ) -> Flow {
        let scrutinee = self.eval(value, scope)?;
        let mut chosen = default;
        'cases: for case in cases {
            for test in &case.tests {
                let candidate = self.eval(test, scope)?;
                let matched = match comparer {
                    Some(method) => {
                        let result =
                            self.dispatch(method, None, &[scrutinee.clone(), candidate])?;
                        expect_bool(&result)?
                    }
                    None => scrutinee.equals(&candidate),
                };
                if matched {
                    chosen = Some(&case.body);
                    break 'cases;
                }
            }
        }
        let result = match chosen {
            Some(body) => self.eval(body, scope)?,
            None => Value::Void,
        };
        Ok(if expr.ty().is_void() { Value::Void } else { result })
    }

    /// `finally` runs on every exit path; if it unwinds itself, that unwind
    /// replaces the original outcome.
    pub(super) fn eval_try(
        &self,
        expr: &Expr,
        body: &Expr,
        handlers: &[CatchClause],
        finally: Option<&Expr>,
        scope: &Scope,
    ) -> Flow {
        let outcome = match self.eval(body, scope) {
            Err(Unwind::Throw(exception)) => self.handle(handlers, exception, scope),
            other => other,
        };
        if let Some(finally) = finally {
            self.eval(finally, scope)?;
        }
        let value = outcome?;
        Ok(if expr.ty().is_void() { Value::Void } else { value })
    }

    /// Run the first clause whose type and filter accept `exception`.
    fn handle(&self, handlers: &[CatchClause], exception: Value, scope: &Scope) -> Flow {
        let Some(thrown_ty) = exception.runtime_ty() else {
            return Err(Unwind::Throw(exception));
        };
        for handler in handlers {
            if !handler.exception_ty.is_assignable_from(&thrown_ty) {
                continue;
            }
            let handler_scope = scope.child_handling(exception.clone());
            if let Some(var) = &handler.variable {
                handler_scope.declare(var.id(), exception.clone());
            }
            if let Some(filter) = &handler.filter {
                match self.eval(filter, &handler_scope) {
                    Ok(Value::Bool(true)) => {}
                    Ok(_) => continue,
                    Err(Unwind::Error(error)) => return Err(Unwind::Error(error)),
                    Err(_) => {
                        tracing::debug!(%thrown_ty, "exception filter failed; treated as false");
                        continue;
                    }
                }
            }
            return self.eval(&handler.body, &handler_scope);
        }
        Err(Unwind::Throw(exception))
    }

    pub(super) fn eval_throw(&self, value: Option<&Expr>, scope: &Scope) -> Flow {
        let exception = match value {
            Some(value) => self.eval(value, scope)?,
            None => match scope.current_exception() {
                Some(exception) => exception,
                None => return Err(unsupported("rethrow outside a catch clause").into()),
            },
        };
        if exception.is_null() {
            return Err(null_reference("throw"));
        }
        Err(Unwind::Throw(exception))
    }

    pub(super) fn eval_loop(
        &self,
        body: &Expr,
        break_label: Option<&LabelTarget>,
        continue_label: Option<&LabelTarget>,
        scope: &Scope,
    ) -> Flow {
        loop {
            match self.eval(body, scope) {
                Ok(_) => {}
                Err(Unwind::Jump { label, value }) => {
                    if break_label == Some(&label) {
                        return Ok(value);
                    }
                    if continue_label != Some(&label) {
                        return Err(Unwind::Jump { label, value });
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }
}

/// Initial value of a block variable.
fn default_value(var: &Param) -> Value {
    match Expr::default_of(var.ty().clone()).kind() {
        ExprKind::Constant(value) => value.clone(),
        _ => Value::Void,
    }
}
