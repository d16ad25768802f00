use super::*;
use crate::handles::MethodDef;

#[test]
fn parameters_with_same_name_are_distinct() {
    let a = Param::named(Ty::Int, "x");
    let b = Param::named(Ty::Int, "x");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert!(a.id() != b.id());
}

#[test]
fn untyped_block_takes_type_of_last_statement() {
    let block = Expr::block(vec![], vec![Expr::constant("a"), Expr::constant(1)]);
    assert_eq!(block.ty(), &Ty::Int);

    let empty = Expr::block(vec![], vec![]);
    assert_eq!(empty.ty(), &Ty::Void);
    match empty.kind() {
        ExprKind::Block { body, .. } => {
            assert_eq!(body.len(), 1);
            assert!(matches!(body[0].kind(), ExprKind::Empty));
        }
        other => panic!("expected block, got {other:?}"),
    }
}

#[test]
fn default_values_follow_type() {
    assert!(matches!(
        Expr::default_of(Ty::Int).as_constant(),
        Some(Value::Int(0))
    ));
    assert!(matches!(
        Expr::default_of(Ty::Bool).as_constant(),
        Some(Value::Bool(false))
    ));
    assert!(matches!(
        Expr::default_of(Ty::Str).as_constant(),
        Some(Value::Null)
    ));
    assert!(matches!(Expr::default_of(Ty::Void).kind(), ExprKind::Empty));
}

#[test]
fn constructed_node_types() {
    let method = MethodDef::static_method("f", Ty::Object, vec![Ty::Int], Ty::Str, |_| {
        Ok(Value::str("r"))
    });
    let call = Expr::call(None, method, vec![Expr::constant(1)]);
    assert_eq!(call.ty(), &Ty::Str);

    let x = Param::named(Ty::Int, "x");
    let lambda = Expr::lambda(vec![x.clone()], x.to_expr());
    assert_eq!(lambda.ty(), &Ty::func(vec![Ty::Int], Ty::Int));
    assert_eq!(Expr::invoke(lambda, vec![Expr::constant(2)]).ty(), &Ty::Int);

    let cmp = Expr::binary(BinaryOp::Lt, Expr::constant(1), Expr::constant(2));
    assert_eq!(cmp.ty(), &Ty::Bool);

    let task = Expr::null(Ty::task(Ty::Str));
    assert_eq!(Expr::await_(task).ty(), &Ty::Str);
}

#[test]
fn map_children_reports_no_change_for_identity() {
    let node = Expr::binary(BinaryOp::Add, Expr::constant(1), Expr::constant(2));
    assert!(node.kind().map_children(&mut Clone::clone).is_none());
}

#[test]
fn map_children_rebuilds_changed_children() {
    let node = Expr::binary(BinaryOp::Add, Expr::constant(1), Expr::constant(2));
    let mapped = node
        .kind()
        .map_children(&mut |child| match child.as_constant() {
            Some(Value::Int(1)) => Expr::constant(10),
            _ => child.clone(),
        });
    match mapped {
        Some(ExprKind::Binary { left, right, .. }) => {
            assert!(matches!(left.as_constant(), Some(Value::Int(10))));
            assert!(matches!(right.as_constant(), Some(Value::Int(2))));
        }
        other => panic!("expected rebuilt binary, got {other:?}"),
    }
}

#[test]
fn for_each_child_visits_in_evaluation_order() {
    let node = Expr::if_then_else(
        Expr::constant(true),
        Expr::constant(1),
        Expr::constant(2),
    );
    let mut seen = Vec::new();
    node.kind().for_each_child(|c| seen.push(c.to_string()));
    assert_eq!(seen, ["true", "1", "2"]);
}
