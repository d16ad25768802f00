#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use xtree_ir::testing::{FieldMock, Mock};
use xtree_ir::{
    builtins, BinaryOp, CtorDef, Expr, MethodDef, TaskValue, Thrown, Ty, Value,
};

use super::*;
use crate::capture::thunk;
use crate::error::BuildErrorKind;
use crate::node::{Dynamic, Exception};

enum IMock {}

impl HostType for IMock {
    fn ty() -> Ty {
        Mock::class()
    }
}

enum MockWithField {}

impl HostType for MockWithField {
    fn ty() -> Ty {
        FieldMock::class()
    }
}

fn run(expr: impl Into<Expr>) -> Value {
    xtree_eval::evaluate_closed(&expr.into()).unwrap()
}

#[test]
fn constants_and_nulls() {
    let n = arg(42i64);
    assert_eq!(*n.ty(), Ty::Int);
    assert_eq!(arg("aaa").to_string(), "\"aaa\"");
    assert_eq!(*null_of::<String>().ty(), Ty::Str);
    assert!(run(null(builtins::exception())).is_null());

    let mock = Mock::new();
    let m = object::<IMock>(mock.value());
    assert_eq!(*m.ty(), Mock::class());
}

#[test]
fn cast_converts() {
    let node = cast::<Dynamic>(arg(1i64));
    assert_eq!(*node.ty(), Ty::Object);
    assert_eq!(node.to_string(), "(object)1");
}

#[test]
fn property_field_and_member_reads() {
    let mock = Mock::new();
    mock.set_string("text");
    let m = object::<IMock>(mock.value());
    assert_eq!(run(m.property::<String>("String")).as_str(), Some("text"));

    let f = object::<MockWithField>(Value::object(FieldMock::new(9)));
    assert!(matches!(run(f.field::<i64>("Value")), Value::Int(9)));
    assert!(matches!(run(f.member::<i64>("ValueProperty")), Value::Int(9)));

    let read = f.member::<i64>("Value");
    let xtree_ir::ExprKind::Member { member, .. } = read.expr().kind() else {
        panic!("expected a member read, got {read}");
    };
    assert_eq!(member.kind, xtree_ir::MemberKind::Property);
}

#[test]
fn member_closures_apply_to_the_instance() {
    let f = var::<MockWithField>("f");
    let read = f
        .field_of::<i64, _>(|o| Expr::member(Some(o.into_expr()), FieldMock::value_field()))
        .unwrap();
    assert_eq!(read.to_string(), "f.Value");

    let read = f
        .property_of::<i64, _>(|o| Expr::member(Some(o.into_expr()), FieldMock::value_property()))
        .unwrap();
    assert_eq!(read.to_string(), "f.ValueProperty");

    let err = f
        .field_of::<i64, _>(|o| Expr::member(Some(o.into_expr()), FieldMock::value_property()))
        .unwrap_err();
    assert!(matches!(err.kind, BuildErrorKind::NotAField { .. }));

    let any = f
        .member_of::<i64, _>(|o| o.field::<i64>("Value"))
        .unwrap();
    assert_eq!(any.to_string(), "f.Value");
}

#[test]
fn instance_calls_bind_the_receiver() {
    let mock = Mock::new();
    mock.returns("ret");
    let m = object::<IMock>(mock.value());
    let call = m.call::<String, _>(|o| {
        Expr::call(Some(o.into_expr()), Mock::method_with_return(), Vec::new())
    });
    assert_eq!(call.to_string(), "<IMock>.MethodWithReturn()");
    assert_eq!(run(call).as_str(), Some("ret"));

    let void = m.call_void(|o| {
        Expr::call(
            Some(o.into_expr()),
            Mock::void_method_with_parameter(),
            vec![Expr::constant("aaa")],
        )
    });
    assert_eq!(*void.ty(), Ty::Void);
    run(void);
    assert_eq!(
        mock.calls(),
        vec![
            "MethodWithReturn()".to_owned(),
            "VoidMethodWithParameter(\"aaa\")".to_owned()
        ]
    );
}

#[test]
fn constructions() {
    let ctor = CtorDef::new(FieldMock::class(), vec![Ty::Int], |args| {
        Ok(Value::object(FieldMock::new(args[0].as_int().unwrap_or_default())))
    });
    let made = new_with::<MockWithField>(thunk(Expr::construct(ctor.clone(), vec![Expr::constant(3)])));
    assert_eq!(made.to_string(), "new MockWithField(3)");

    let err = new_object::<MockWithField>(&ctor).unwrap_err();
    assert_eq!(
        err.kind,
        BuildErrorKind::NotParameterless {
            ty: "MockWithField".to_owned(),
            params: 1
        }
    );

    let plain = new_object::<Dynamic>(&builtins::object_ctor()).unwrap();
    assert_eq!(plain.to_string(), "new object()");
    assert!(run(plain).as_object().is_some());
}

#[test]
fn awaits_record_the_await_point() {
    let ready = MethodDef::static_method("Ready", Ty::Object, Vec::new(), Ty::task(Ty::Int), |_| {
        Ok(Value::Task(TaskValue::ready(Ty::Int, Value::Int(5))))
    });
    let awaited = await_::<i64>(thunk(Expr::call(None, ready.clone(), Vec::new())));
    assert_eq!(*awaited.ty(), Ty::Int);
    assert!(awaited.to_string().starts_with("await "));

    let task: Node<crate::node::Task<i64>> = call(thunk(Expr::call(None, ready, Vec::new())));
    assert!(matches!(run(task.await_()), Value::Int(5)));
}

#[test]
fn host_code_runs_at_evaluation_time() {
    let runs = Arc::new(Mutex::new(0));
    let seen = runs.clone();
    let node = code(move || {
        *seen.lock() += 1;
        Ok(41i64 + 1)
    });
    assert_eq!(*node.ty(), Ty::Int);
    assert_eq!(*runs.lock(), 0);
    assert!(matches!(run(node.clone()), Value::Int(42)));
    assert!(matches!(run(node), Value::Int(42)));
    assert_eq!(*runs.lock(), 2);
}

#[test]
fn host_code_errors_are_catchable() {
    let failing = code_void(|| Err(Thrown::new(builtins::invalid_operation(), "aaa")));
    let node = try_()
        .body(failing)
        .catch_expr::<Exception, _>(|_| Expr::empty())
        .build()
        .unwrap();
    assert!(matches!(run(node), Value::Void));
}

#[test]
fn host_code_receives_the_instance() {
    let mock = Mock::new();
    mock.set_int(20);
    let m = object::<IMock>(mock.value());
    let read = m.code(|value| {
        let obj = value.as_object().ok_or_else(|| {
            Thrown::new(builtins::null_reference(), "no instance")
        })?;
        Ok(obj.get("Int")?.as_int().unwrap_or_default() * 2)
    });
    assert_eq!(read.to_string(), "Invoke(<Func<IMock, int>>, <IMock>)");
    assert!(matches!(run(read), Value::Int(40)));
}

#[test]
fn arrays() {
    let items = array::<i64, _>([arg(1i64), arg(2i64)]);
    assert_eq!(*items.ty(), Ty::array(Ty::Int));
    assert_eq!(items.to_string(), "new int[] {1, 2}");
}

#[test]
fn return_pairs_jump_to_their_label() {
    let value = arg("done");
    let body = block()
        .lines(value.ret())
        .line(Expr::constant("unreachable"))
        .build()
        .unwrap();
    let [jump, label] = value.ret();
    assert!(jump.to_string().starts_with("return @return#"));
    assert!(label.to_string().ends_with(": null;"));
    assert_eq!(run(body).as_str(), Some("unreachable"));

    let early = block()
        .line(Expr::constant("start"))
        .lines(value.ret())
        .build()
        .unwrap();
    assert_eq!(run(early).as_str(), Some("done"));
}

#[test]
fn assignments() {
    let x = var::<i64>("x");
    assert_eq!(x.assign_value(3).unwrap().to_string(), "x = 3");

    let err = arg(1i64).assign(arg(2i64)).unwrap_err();
    assert!(matches!(err.kind, BuildErrorKind::NotAParameter { .. }));

    let flag = var::<bool>("flag");
    let body = block()
        .parameter(&x)
        .parameter_with(&flag, arg(false))
        .try_line(x.ternary_assign(&flag.not(), arg(10i64), arg(20i64)))
        .line(&x)
        .build()
        .unwrap();
    assert!(matches!(run(body), Value::Int(10)));
}

#[test]
fn boolean_operators() {
    let t = arg(true);
    let f = arg(false);
    assert!(matches!(run(t.and_also(&f)), Value::Bool(false)));
    assert!(matches!(run(t.or_else(&f)), Value::Bool(true)));
    assert!(matches!(run(f.not()), Value::Bool(true)));
    assert!(matches!(run(arg(2i64).eq(arg(2i64))), Value::Bool(true)));
    assert_eq!(t.and_also(&f.not()).to_string(), "(true && !false)");
}

#[test]
fn while_loop_runs_until_the_test_fails() {
    let i = var::<i64>("i");
    let looped = while_loop(
        Expr::binary(BinaryOp::Lt, i.expr().clone(), Expr::constant(5)),
        |_, b| {
            b.try_line(i.assign(Expr::binary(
                BinaryOp::Add,
                i.expr().clone(),
                Expr::constant(1),
            )))
        },
    )
    .unwrap();
    let body = typed_block::<i64>()
        .parameter_with(&i, arg(0i64))
        .line(looped)
        .line(&i)
        .build()
        .unwrap();
    assert!(matches!(run(body), Value::Int(5)));
}

#[test]
fn loop_control_breaks_and_continues() {
    let i = var::<i64>("i");
    let hits = var::<i64>("hits");
    let looped = loop_(|control, b| {
        let step = i
            .assign(Expr::binary(BinaryOp::Add, i.expr().clone(), Expr::constant(1)))
            .unwrap();
        let stop = condition()
            .if_then(Expr::binary(BinaryOp::Gt, i.expr().clone(), Expr::constant(6)), control.break_())
            .build()
            .unwrap();
        let skip_three = condition()
            .if_then(i.eq(arg(3i64)), control.continue_())
            .build()
            .unwrap();
        b.line(step).line(stop).line(skip_three).try_line(hits.assign(Expr::binary(
            BinaryOp::Add,
            hits.expr().clone(),
            Expr::constant(1),
        )))
    })
    .unwrap();
    let body = typed_block::<i64>()
        .parameter_with(&i, arg(0i64))
        .parameter_with(&hits, arg(0i64))
        .line(looped)
        .line(&hits)
        .build()
        .unwrap();
    assert!(matches!(run(body), Value::Int(5)));
}

#[test]
fn typed_condition_and_switch_entry_points() {
    let picked = typed_condition::<String>()
        .if_then(arg(true), arg("yes"))
        .else_(arg("no"))
        .build()
        .unwrap();
    assert_eq!(run(picked).as_str(), Some("yes"));

    let switched = switch(&arg(2i64))
        .typed_case::<String>(arg("two").typed(), [arg(2i64)])
        .default(arg("other"))
        .build()
        .unwrap();
    assert_eq!(run(switched).as_str(), Some("two"));
}
