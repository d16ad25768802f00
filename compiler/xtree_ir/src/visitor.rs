//! Tree traversal.
//!
//! Two traversal traits are provided:
//!
//! - [`Visitor`] walks a tree read-only. Override `visit_*` to observe nodes
//!   and call the matching `walk_*` function to continue into children.
//! - [`Rewriter`] rebuilds a tree bottom-up. Per-shape hooks default to
//!   rewriting children; a node whose children all come back unchanged (by
//!   identity) is returned as-is, so untouched subtrees stay shared.
//!
//! Both traversals grow the stack on demand, so deeply nested trees built by
//! generated code do not overflow.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::expr::{Expr, ExprKind, Param, ParamId};
use crate::stack::ensure_sufficient_stack;

/// Read-only tree visitor.
pub trait Visitor {
    /// Visit a node.
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Visit a parameter reference.
    fn visit_parameter(&mut self, param: &Param) {
        let _ = param;
    }

    /// Visit a parameter declaration (block variable, lambda parameter or
    /// catch variable).
    fn visit_binding(&mut self, param: &Param) {
        let _ = param;
    }
}

/// Walk a node's declarations, then its children in evaluation order.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    ensure_sufficient_stack(|| {
        for param in bindings(expr) {
            visitor.visit_binding(param);
        }
        if let ExprKind::Parameter(param) = expr.kind() {
            visitor.visit_parameter(param);
        }
        expr.kind().for_each_child(|child| visitor.visit_expr(child));
    });
}

/// Parameters a node declares for its children.
pub fn bindings(expr: &Expr) -> Vec<&Param> {
    match expr.kind() {
        ExprKind::Block { variables, .. } => variables.iter().collect(),
        ExprKind::Lambda { params, .. } => params.iter().collect(),
        ExprKind::Try { handlers, .. } => handlers
            .iter()
            .filter_map(|h| h.variable.as_ref())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parameters referenced in `expr` without being declared inside it, in
/// order of first reference.
pub fn free_parameters(expr: &Expr) -> Vec<Param> {
    let mut collector = FreeParams::default();
    collector.visit_expr(expr);
    collector.free
}

#[derive(Default)]
struct FreeParams {
    /// Declaration depth per parameter; a parameter is bound while > 0.
    bound: FxHashMap<ParamId, u32>,
    seen: FxHashSet<ParamId>,
    free: Vec<Param>,
}

impl Visitor for FreeParams {
    fn visit_expr(&mut self, expr: &Expr) {
        let declared = bindings(expr);
        for param in &declared {
            *self.bound.entry(param.id()).or_default() += 1;
        }
        walk_expr(self, expr);
        for param in &declared {
            if let Some(depth) = self.bound.get_mut(&param.id()) {
                *depth -= 1;
            }
        }
    }

    fn visit_parameter(&mut self, param: &Param) {
        let bound = self.bound.get(&param.id()).is_some_and(|d| *d > 0);
        if !bound && self.seen.insert(param.id()) {
            self.free.push(param.clone());
        }
    }
}

/// Rebuilding tree visitor.
pub trait Rewriter {
    /// Rewrite a node. Dispatches to the per-shape hooks.
    fn rewrite_expr(&mut self, expr: &Expr) -> Expr {
        walk_rewrite(self, expr)
    }

    /// Rewrite a parameter reference. Defaults to keeping it.
    fn rewrite_parameter(&mut self, expr: &Expr, param: &Param) -> Expr {
        let _ = param;
        expr.clone()
    }

    fn rewrite_call(&mut self, expr: &Expr) -> Expr {
        rewrite_children(self, expr)
    }

    fn rewrite_member(&mut self, expr: &Expr) -> Expr {
        rewrite_children(self, expr)
    }

    fn rewrite_convert(&mut self, expr: &Expr) -> Expr {
        rewrite_children(self, expr)
    }

    fn rewrite_lambda(&mut self, expr: &Expr) -> Expr {
        rewrite_children(self, expr)
    }

    /// Called before the children of a declaring node are rewritten.
    fn enter_scope(&mut self, declared: &[&Param]) {
        let _ = declared;
    }

    /// Called after the children of a declaring node are rewritten.
    fn exit_scope(&mut self, declared: &[&Param]) {
        let _ = declared;
    }
}

/// Dispatch `expr` to the rewriter hook for its shape.
pub fn walk_rewrite<R: Rewriter + ?Sized>(rewriter: &mut R, expr: &Expr) -> Expr {
    ensure_sufficient_stack(|| match expr.kind() {
        ExprKind::Parameter(param) => rewriter.rewrite_parameter(expr, param),
        ExprKind::Call { .. } => rewriter.rewrite_call(expr),
        ExprKind::Member { .. } => rewriter.rewrite_member(expr),
        ExprKind::Convert { .. } => rewriter.rewrite_convert(expr),
        ExprKind::Lambda { .. } => rewriter.rewrite_lambda(expr),
        _ => rewrite_children(rewriter, expr),
    })
}

/// Rewrite the direct children of `expr`, keeping its kind and type.
pub fn rewrite_children<R: Rewriter + ?Sized>(rewriter: &mut R, expr: &Expr) -> Expr {
    let declared = bindings(expr);
    if !declared.is_empty() {
        rewriter.enter_scope(&declared);
    }
    let rebuilt = expr
        .kind()
        .map_children(&mut |child| rewriter.rewrite_expr(child));
    if !declared.is_empty() {
        rewriter.exit_scope(&declared);
    }
    match rebuilt {
        Some(kind) => Expr::from_parts(kind, expr.ty().clone()),
        None => expr.clone(),
    }
}

#[cfg(test)]
mod tests;
