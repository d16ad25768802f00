use super::*;
use crate::builtins::{exception_value, invalid_operation};

#[test]
fn primitive_equality_is_by_value() {
    assert!(Value::Int(42).equals(&Value::Int(42)));
    assert!(Value::str("a").equals(&Value::from("a")));
    assert!(!Value::Int(1).equals(&Value::Float(1.0)));
    assert!(Value::Null.equals(&Value::Null));
}

#[test]
fn object_equality_is_by_identity() {
    let a = exception_value(invalid_operation(), "boom");
    let b = exception_value(invalid_operation(), "boom");
    assert!(a.equals(&a.clone()));
    assert!(!a.equals(&b));
}

#[test]
fn runtime_type_of_null_is_unknown() {
    assert_eq!(Value::Null.runtime_ty(), None);
    assert_eq!(Value::Int(3).runtime_ty(), Some(Ty::Int));
    assert_eq!(
        exception_value(invalid_operation(), "x").runtime_ty(),
        Some(invalid_operation())
    );
}

#[test]
fn thrown_exposes_message() {
    let thrown = Thrown::new(invalid_operation(), "aaa");
    assert_eq!(thrown.message().as_deref(), Some("aaa"));
    assert_eq!(thrown.to_string(), "InvalidOperationException: aaa");
}

#[test]
fn completed_task_replays_outcome() {
    let ok = TaskValue::ready(Ty::Int, Value::Int(5));
    assert!(matches!(ok.outcome(), Ok(Value::Int(5))));

    let failed = TaskValue::faulted(Ty::Int, Thrown::new(invalid_operation(), "no"));
    assert!(failed.outcome().is_err());
    assert_eq!(failed.ty(), &Ty::task(Ty::Int));
}

#[test]
fn host_fn_calls_body() {
    let double = HostFn::new(vec![Ty::Int], Ty::Int, |args| match args {
        [Value::Int(n)] => Ok(Value::Int(n * 2)),
        _ => Ok(Value::Null),
    });
    assert!(matches!(double.call(&[Value::Int(21)]), Ok(Value::Int(42))));
    assert_eq!(double.ty(), &Ty::func(vec![Ty::Int], Ty::Int));
}
