use pretty_assertions::assert_eq;
use xtree_ir::{builtins, Expr, ExprKind, Ty, Value};

use super::*;

#[test]
fn wrap_keeps_the_node() {
    let raw = Expr::constant(42);
    let node: Node<i64> = Node::wrap(raw.clone());
    assert!(node.expr().ptr_eq(&raw));
    assert_eq!(*node.ty(), Ty::Int);
    let back: Expr = node.into();
    assert!(back.ptr_eq(&raw));
}

#[test]
fn missing_node_becomes_typed_null() {
    let node = Node::<String>::from_option(None);
    assert!(matches!(node.expr().as_constant(), Some(Value::Null)));
    assert_eq!(*node.ty(), Ty::Str);

    let present = Node::<i64>::from_option(Some(Expr::constant(1)));
    assert_eq!(present.to_string(), "1");
}

#[test]
fn type_test_is_boolean() {
    let node: Node = Node::wrap(Expr::constant("s"));
    let test = node.is::<String>();
    assert_eq!(*test.ty(), Ty::Bool);
    assert_eq!(test.to_string(), "(\"s\" is string)");
}

#[test]
fn type_as_and_cast_differ() {
    let node: Node = Node::wrap(Expr::null(builtins::exception()));
    let soft = node.type_as::<InvalidOperationException>();
    let hard = node.cast::<InvalidOperationException>();
    assert_eq!(*soft.ty(), builtins::invalid_operation());
    assert_eq!(*hard.ty(), builtins::invalid_operation());
    assert!(matches!(
        soft.expr().kind(),
        ExprKind::Convert {
            kind: xtree_ir::ConvertKind::TypeAs,
            ..
        }
    ));
    assert!(matches!(
        hard.expr().kind(),
        ExprKind::Convert {
            kind: xtree_ir::ConvertKind::Cast,
            ..
        }
    ));
}

#[test]
fn retagging_inserts_nothing() {
    let node: Node<i64> = Node::wrap(Expr::constant(7));
    let erased = node.erase();
    let again = erased.typed::<i64>();
    assert!(again.expr().ptr_eq(node.expr()));
}

#[test]
fn fragment_carries_the_node() {
    let node: Node<i64> = Node::wrap(Expr::constant(7));
    match node.fragment() {
        Value::Fragment(expr) => assert!(expr.ptr_eq(node.expr())),
        other => panic!("expected a fragment, got {other}"),
    }
}

#[test]
fn host_types_map_to_semantic_types() {
    assert_eq!(<()>::ty(), Ty::Void);
    assert_eq!(bool::ty(), Ty::Bool);
    assert_eq!(<&str>::ty(), Ty::Str);
    assert_eq!(Dynamic::ty(), Ty::Object);
    assert_eq!(Vec::<i64>::ty(), Ty::array(Ty::Int));
    assert_eq!(Task::<String>::ty(), Ty::task(Ty::Str));
    assert!(Exception::ty().is_assignable_from(&ArgumentException::ty()));
    assert!(Disposable::ty().is_assignable_from(&xtree_ir::testing::Mock::class()));
}

#[test]
fn host_values_embed() {
    assert!(matches!(42i64.into_value(), Value::Int(42)));
    assert_eq!("aaa".into_value().as_str(), Some("aaa"));
    assert!(matches!(().into_value(), Value::Void));
}
