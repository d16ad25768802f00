use super::*;
use crate::expr::BinaryOp;
use crate::ty::Ty;
use crate::value::Value;

#[test]
fn free_parameters_skip_lambda_and_block_bindings() {
    let outer = Param::named(Ty::Int, "outer");
    let inner = Param::named(Ty::Int, "inner");
    let local = Param::named(Ty::Int, "local");

    let body = Expr::block(
        vec![local.clone()],
        vec![
            Expr::assign(local.clone(), inner.to_expr()),
            Expr::binary(BinaryOp::Add, local.to_expr(), outer.to_expr()),
        ],
    );
    let lambda = Expr::lambda(vec![inner], body);

    assert_eq!(free_parameters(&lambda), vec![outer]);
}

#[test]
fn free_parameters_are_reported_once_in_order() {
    let a = Param::named(Ty::Int, "a");
    let b = Param::named(Ty::Int, "b");
    let tree = Expr::block(
        vec![],
        vec![b.to_expr(), a.to_expr(), b.to_expr()],
    );
    assert_eq!(free_parameters(&tree), vec![b, a]);
}

#[test]
fn parameter_bound_in_sibling_scope_is_free_outside_it() {
    let x = Param::named(Ty::Int, "x");
    let tree = Expr::block(
        vec![],
        vec![
            Expr::lambda(vec![x.clone()], x.to_expr()),
            x.to_expr(),
        ],
    );
    assert_eq!(free_parameters(&tree), vec![x]);
}

struct IncrementConstants;

impl Rewriter for IncrementConstants {
    fn rewrite_expr(&mut self, expr: &Expr) -> Expr {
        match expr.as_constant() {
            Some(Value::Int(n)) => Expr::constant(n + 1),
            _ => walk_rewrite(self, expr),
        }
    }
}

#[test]
fn rewriter_rebuilds_changed_spine() {
    let tree = Expr::binary(BinaryOp::Add, Expr::constant(1), Expr::constant("s"));
    let rewritten = IncrementConstants.rewrite_expr(&tree);
    assert!(!rewritten.ptr_eq(&tree));
    assert_eq!(rewritten.to_string(), "(2 + \"s\")");
}

#[test]
fn rewriter_keeps_untouched_tree_shared() {
    let tree = Expr::binary(BinaryOp::Add, Expr::constant("a"), Expr::constant("b"));
    let rewritten = IncrementConstants.rewrite_expr(&tree);
    assert!(rewritten.ptr_eq(&tree));
}

#[derive(Default)]
struct ScopeTracker {
    depth: usize,
    max_depth: usize,
}

impl Rewriter for ScopeTracker {
    fn enter_scope(&mut self, _declared: &[&Param]) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn exit_scope(&mut self, _declared: &[&Param]) {
        self.depth -= 1;
    }
}

#[test]
fn rewriter_reports_nested_scopes() {
    let x = Param::named(Ty::Int, "x");
    let y = Param::named(Ty::Int, "y");
    let tree = Expr::lambda(
        vec![x.clone()],
        Expr::block(vec![y.clone()], vec![Expr::assign(y, x.to_expr())]),
    );
    let mut tracker = ScopeTracker::default();
    tracker.rewrite_expr(&tree);
    assert_eq!(tracker.max_depth, 2);
    assert_eq!(tracker.depth, 0);
}
