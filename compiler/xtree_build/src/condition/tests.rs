#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use xtree_ir::testing::Mock;
use xtree_ir::{Expr, Ty, Value};

use super::*;
use crate::error::BuildErrorKind;

fn mock_call(mock: &std::sync::Arc<Mock>, text: &str) -> Expr {
    Expr::call(
        Some(Expr::constant(mock.value())),
        Mock::void_method_with_parameter(),
        vec![Expr::constant(text)],
    )
}

fn run(expr: &Expr) -> Value {
    xtree_eval::evaluate_closed(expr).unwrap()
}

#[test]
fn missing_condition_is_an_error() {
    let err = ConditionBuilder::<()>::new()
        .then(Expr::constant(1))
        .build()
        .unwrap_err();
    assert_eq!(err.kind, BuildErrorKind::ConditionNotDefined);
    assert_eq!(err.to_string(), "`if` statement is not defined");
}

#[test]
fn true_condition_runs_only_then() {
    let mock = Mock::new();
    let node = ConditionBuilder::<()>::new()
        .if_then(Expr::constant(true), mock_call(&mock, "then"))
        .else_(mock_call(&mock, "else"))
        .build()
        .unwrap();
    run(node.expr());
    assert_eq!(mock.calls(), vec!["VoidMethodWithParameter(\"then\")".to_owned()]);
}

#[test]
fn false_condition_runs_only_else() {
    let mock = Mock::new();
    let node = ConditionBuilder::<()>::new()
        .if_then(Expr::constant(false), mock_call(&mock, "then"))
        .else_(mock_call(&mock, "else"))
        .build()
        .unwrap();
    run(node.expr());
    assert_eq!(mock.calls(), vec!["VoidMethodWithParameter(\"else\")".to_owned()]);
}

#[test]
fn false_condition_without_else_runs_nothing() {
    let mock = Mock::new();
    let node = ConditionBuilder::<()>::new()
        .if_then(Expr::constant(false), mock_call(&mock, "then"))
        .build()
        .unwrap();
    assert_eq!(node.to_string(), "if (false) {\n    <IMock>.VoidMethodWithParameter(\"then\");\n}");
    run(node.expr());
    assert!(mock.calls().is_empty());
}

#[test]
fn arms_built_from_blocks() {
    let mock = Mock::new();
    let node = ConditionBuilder::<()>::new()
        .if_block(Expr::constant(true), |b| {
            b.line(mock_call(&mock, "a")).line(mock_call(&mock, "b"))
        })
        .else_block(|b| b.line(mock_call(&mock, "c")))
        .build()
        .unwrap();
    run(node.expr());
    assert_eq!(mock.received("VoidMethodWithParameter"), 2);
}

#[test]
fn typed_condition_yields_a_value() {
    let node = ConditionBuilder::<i64>::new()
        .if_(Expr::constant(false))
        .then(Expr::constant(1))
        .else_(Expr::constant(2))
        .build()
        .unwrap();
    assert_eq!(*node.ty(), Ty::Int);
    assert_eq!(node.to_string(), "(false ? 1 : 2)");
    assert!(matches!(run(node.expr()), Value::Int(2)));
}

#[test]
fn typed_condition_defaults_missing_arms() {
    let node = ConditionBuilder::<i64>::new()
        .if_then(Expr::constant(false), Expr::constant(5))
        .build()
        .unwrap();
    assert!(matches!(run(node.expr()), Value::Int(0)));

    let node = ConditionBuilder::<String>::new()
        .if_(Expr::constant(true))
        .else_(Expr::constant("no"))
        .build()
        .unwrap();
    assert!(run(node.expr()).is_null());
}

#[test]
fn typed_arm_blocks_take_the_result_type() {
    let node = ConditionBuilder::<String>::new()
        .if_block(Expr::constant(true), |b| b.line(Expr::constant("yes")))
        .else_block(|b| b.line(Expr::constant("no")))
        .build()
        .unwrap();
    assert_eq!(run(node.expr()).as_str(), Some("yes"));
}

#[test]
fn typed_arm_of_another_type_is_an_error() {
    let err = ConditionBuilder::<i64>::new()
        .if_then(Expr::constant(true), Expr::constant("not an int"))
        .else_(Expr::constant(1))
        .build()
        .unwrap_err();
    assert_eq!(
        err.kind,
        BuildErrorKind::ConditionResultMismatch {
            expected: "int".to_owned(),
            got: "string".to_owned(),
        }
    );

    let err = ConditionBuilder::<String>::new()
        .if_then(Expr::constant(false), Expr::constant("yes"))
        .else_(Expr::constant(2))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, BuildErrorKind::ConditionResultMismatch { .. }));
}

#[test]
fn typed_block_arm_must_end_in_the_result_type() {
    let err = ConditionBuilder::<i64>::new()
        .if_block(Expr::constant(true), |b| b.line(Expr::constant("text")))
        .else_(Expr::constant(0))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, BuildErrorKind::ConditionResultMismatch { .. }));
    assert_eq!(err.to_string(), "conditional arm produces string, expected int");
}

#[test]
fn throwing_arm_fits_a_typed_conditional() {
    let thrown = Expr::throw(Expr::constant(xtree_ir::builtins::exception_value(
        xtree_ir::builtins::exception(),
        "boom",
    )));
    let node = ConditionBuilder::<i64>::new()
        .if_then(Expr::constant(false), thrown)
        .else_(Expr::constant(3))
        .build()
        .unwrap();
    assert!(matches!(run(node.expr()), Value::Int(3)));
}
