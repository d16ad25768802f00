#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use xtree_ir::testing::Mock;
use xtree_ir::{builtins, Expr, LabelTarget, Ty, Value};

use super::*;
use crate::error::BuildErrorKind;
use crate::node::{ArgumentException, Exception, InvalidOperationException};

enum IMock {}

impl HostType for IMock {
    fn ty() -> Ty {
        Mock::class()
    }
}

fn mock_node(mock: &Arc<Mock>) -> Node<IMock> {
    Node::wrap(Expr::typed_constant(mock.value(), Mock::class()))
}

fn mock_call(mock: &Arc<Mock>, text: &str) -> Expr {
    Expr::call(
        Some(Expr::constant(mock.value())),
        Mock::void_method_with_parameter(),
        vec![Expr::constant(text)],
    )
}

fn throw(class: Ty, message: &str) -> Expr {
    Expr::throw(Expr::constant(builtins::exception_value(class, message)))
}

fn message_of<E>(ex: &Node<E>) -> Expr {
    Expr::member(
        Some(ex.expr().clone()),
        xtree_ir::MemberDef::property("message", builtins::exception(), Ty::Str),
    )
}

fn run(node: &Node) -> Result<Value, xtree_eval::EvalError> {
    xtree_eval::evaluate_closed(node.expr())
}

#[test]
fn neither_catch_nor_finally_is_an_error() {
    let err = TryCatchFinallyBuilder::new()
        .body(Expr::constant(1))
        .build()
        .unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::NoCatchBlock);
    assert_eq!(err.to_string(), "No `catch` block provided");
}

#[test]
fn missing_body_is_an_error() {
    let err = TryCatchFinallyBuilder::new()
        .finally(Expr::empty())
        .build()
        .unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::MissingTryBody);
}

#[test]
fn try_takes_the_body_type() {
    let node = TryCatchFinallyBuilder::new()
        .body(Expr::constant("value"))
        .finally(Expr::empty())
        .build()
        .unwrap();
    assert_eq!(*node.ty(), Ty::Str);
    assert_eq!(run(&node).unwrap().as_str(), Some("value"));
}

#[test]
fn matching_clause_catches() {
    let mock = Mock::new();
    let node = TryCatchFinallyBuilder::new()
        .body_block(|b| b.line(throw(builtins::invalid_operation(), "boom")))
        .catch::<ArgumentException>(|_, b| b.line(mock_call(&mock, "argument")))
        .catch::<Exception>(|ex, b| {
            b.line(Expr::call(
                Some(Expr::constant(mock.value())),
                Mock::void_method_with_parameter(),
                vec![message_of(ex)],
            ))
        })
        .finally_block(|b| b.line(mock_call(&mock, "finally")))
        .build()
        .unwrap();
    run(&node).unwrap();
    assert_eq!(
        mock.calls(),
        vec![
            "VoidMethodWithParameter(\"boom\")".to_owned(),
            "VoidMethodWithParameter(\"finally\")".to_owned(),
        ]
    );
}

#[test]
fn unmatched_exception_propagates_after_finally() {
    let mock = Mock::new();
    let node = TryCatchFinallyBuilder::new()
        .body(throw(builtins::invalid_operation(), "boom"))
        .catch_expr::<ArgumentException, _>(|_| mock_call(&mock, "argument"))
        .finally(mock_call(&mock, "finally"))
        .build()
        .unwrap();
    let err = run(&node).unwrap_err();
    assert_eq!(err.exception_message().as_deref(), Some("boom"));
    assert_eq!(mock.calls(), vec!["VoidMethodWithParameter(\"finally\")".to_owned()]);
}

#[test]
fn filter_gates_the_clause() {
    let mock = Mock::new();
    let node = TryCatchFinallyBuilder::new()
        .body(throw(builtins::invalid_operation(), "boom"))
        .catch_when::<InvalidOperationException>(
            |ex| {
                Node::wrap(Expr::binary(
                    xtree_ir::BinaryOp::Eq,
                    message_of(ex),
                    Expr::constant("other"),
                ))
            },
            |_, b| b.line(mock_call(&mock, "filtered")),
        )
        .catch_when::<InvalidOperationException>(
            |ex| {
                Node::wrap(Expr::binary(
                    xtree_ir::BinaryOp::Eq,
                    message_of(ex),
                    Expr::constant("boom"),
                ))
            },
            |_, b| b.line(mock_call(&mock, "matched")),
        )
        .build()
        .unwrap();
    assert!(node.to_string().contains("when ((ex.message == \"other\"))"));
    run(&node).unwrap();
    assert_eq!(mock.calls(), vec!["VoidMethodWithParameter(\"matched\")".to_owned()]);
}

#[test]
fn catch_body_errors_are_reported() {
    let err = TryCatchFinallyBuilder::new()
        .body(Expr::empty())
        .catch::<Exception>(|_, b| b.parameter(Expr::constant(1)))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, BuildErrorKind::NotAParameter { .. }));
}

#[test]
fn using_disposes_after_the_body() {
    let mock = Mock::new();
    let node = using(&mock_node(&mock), |resource, b| {
        b.line(Expr::call(
            Some(resource.expr().clone()),
            Mock::void_method_without_parameters(),
            Vec::new(),
        ))
    })
    .unwrap();
    run(&node).unwrap();
    assert_eq!(
        mock.calls(),
        vec![
            "VoidMethodWithoutParameters()".to_owned(),
            "dispose()".to_owned()
        ]
    );
}

#[test]
fn using_disposes_when_the_body_throws() {
    let mock = Mock::new();
    let node = using(&mock_node(&mock), |_, b| {
        b.line(throw(builtins::invalid_operation(), "aaa"))
    })
    .unwrap();
    let err = run(&node).unwrap_err();
    assert_eq!(err.exception_message().as_deref(), Some("aaa"));
    assert_eq!(mock.received("dispose"), 1);
}

#[test]
fn using_disposes_on_early_return() {
    let mock = Mock::new();
    let target = LabelTarget::new(Ty::Str, Some("return"));
    let node = using(&mock_node(&mock), |_, b| {
        b.line(Expr::return_(&target, Some(Expr::constant("early"))))
            .line(mock_call(&mock, "skipped"))
            .line(Expr::label(&target, Some(Expr::null(Ty::Str))))
    })
    .unwrap();
    assert_eq!(run(&node).unwrap().as_str(), Some("early"));
    assert_eq!(mock.calls(), vec!["dispose()".to_owned()]);
}

#[test]
fn using_evaluates_the_resource_once() {
    let mock = Mock::new();
    let resource: Node<IMock> = Node::wrap(Expr::member(
        Some(Expr::constant(mock.value())),
        Mock::self_property(),
    ));
    let node = using(&resource, |r, b| b.line(r.expr().clone())).unwrap();
    run(&node).unwrap();
    assert_eq!(mock.received("Self"), 1);
    assert_eq!(mock.received("dispose"), 1);
}

#[test]
fn clause_variable_must_be_a_parameter() {
    let not_a_variable: Node<Exception> =
        Node::wrap(Expr::constant(builtins::exception_value(builtins::exception(), "boom")));
    let mut builder = TryCatchFinallyBuilder::new().body(Expr::constant(1));
    builder.push_handler(&not_a_variable, None, Ok(Expr::empty()));
    let err = builder.build().unwrap_err();
    assert!(matches!(err.kind, BuildErrorKind::NotAParameter { .. }));
    assert!(builder.handlers.is_empty());
}
