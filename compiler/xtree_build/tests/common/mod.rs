//! Host-type markers and tree helpers shared by the integration tests.

#![allow(dead_code, reason = "Not every test binary uses every helper")]

use std::sync::Arc;

use xtree_build::{HostType, Node};
use xtree_ir::testing::{FieldMock, Mock};
use xtree_ir::{builtins, Expr, Ty, Value};

/// Marker for the recording mock class.
pub enum IMock {}

impl HostType for IMock {
    fn ty() -> Ty {
        Mock::class()
    }
}

/// Marker for the field-carrying mock class.
pub enum MockWithField {}

impl HostType for MockWithField {
    fn ty() -> Ty {
        FieldMock::class()
    }
}

pub fn mock_arg(mock: &Arc<Mock>) -> Node<IMock> {
    xtree_build::shortcuts::object(mock.value())
}

pub fn field_mock_arg(value: i64) -> Node<MockWithField> {
    xtree_build::shortcuts::object(Value::object(FieldMock::new(value)))
}

pub fn method_with_return(receiver: impl Into<Expr>) -> Expr {
    Expr::call(Some(receiver.into()), Mock::method_with_return(), Vec::new())
}

pub fn void_method_with_parameter(receiver: impl Into<Expr>, value: impl Into<Expr>) -> Expr {
    Expr::call(
        Some(receiver.into()),
        Mock::void_method_with_parameter(),
        vec![value.into()],
    )
}

pub fn void_method_without_parameters(receiver: impl Into<Expr>) -> Expr {
    Expr::call(
        Some(receiver.into()),
        Mock::void_method_without_parameters(),
        Vec::new(),
    )
}

pub fn dispose(receiver: impl Into<Expr>) -> Expr {
    Expr::call(
        Some(Expr::convert(receiver.into(), builtins::disposable())),
        builtins::dispose_method(),
        Vec::new(),
    )
}

/// Compile a parameterless tree and invoke it.
pub fn invoke(expr: &Expr) -> Result<Value, xtree_eval::EvalError> {
    xtree_eval::compile(expr)?.invoke(&[])
}

pub fn log(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|entry| (*entry).to_owned()).collect()
}
