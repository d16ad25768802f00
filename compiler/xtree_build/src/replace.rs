//! Type-directed parameter substitution.
//!
//! [`ParameterReplacer`] swaps free parameter references for replacement
//! nodes. A parameter is matched against the replacement list by semantic
//! type, and the **first** replacement of an equal type wins, so two
//! replacements of the same type never both get used. Parameters declared
//! inside the rewritten tree (block variables, lambda parameters, catch
//! variables) are left alone.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use xtree_ir::{Expr, Param, ParamId, Rewriter};

/// Rewriter substituting free parameters by type.
#[derive(Debug, Default)]
pub struct ParameterReplacer {
    replacements: SmallVec<[Expr; 2]>,
    /// Append unmatched parameters to the pool.
    collect: bool,
    /// Declaration depth of parameters bound inside the tree.
    bound: FxHashMap<ParamId, u32>,
}

impl ParameterReplacer {
    pub fn new(replacements: impl IntoIterator<Item = Expr>) -> Self {
        ParameterReplacer {
            replacements: replacements.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add every unmatched free parameter to the replacement pool, so later
    /// parameters of the same type resolve to it.
    #[must_use]
    pub fn collecting(mut self) -> Self {
        self.collect = true;
        self
    }

    /// The current replacement pool.
    pub fn replacements(&self) -> &[Expr] {
        &self.replacements
    }

    /// Rewrite `expr`. The replacer can be reused; the pool persists.
    pub fn replace(&mut self, expr: &Expr) -> Expr {
        if self.replacements.is_empty() && !self.collect {
            return expr.clone();
        }
        self.rewrite_expr(expr)
    }

    fn is_bound(&self, param: &Param) -> bool {
        self.bound.get(&param.id()).is_some_and(|depth| *depth > 0)
    }
}

impl Rewriter for ParameterReplacer {
    fn rewrite_parameter(&mut self, expr: &Expr, param: &Param) -> Expr {
        if self.is_bound(param) {
            return expr.clone();
        }
        let found = self
            .replacements
            .iter()
            .find(|candidate| candidate.ty() == param.ty());
        match found {
            Some(replacement) if replacement.as_parameter() != Some(param) => {
                tracing::trace!(param = %param.display_name(), "parameter replaced");
                replacement.clone()
            }
            Some(_) => expr.clone(),
            None => {
                if self.collect {
                    self.replacements.push(expr.clone());
                }
                expr.clone()
            }
        }
    }

    fn enter_scope(&mut self, declared: &[&Param]) {
        for param in declared {
            *self.bound.entry(param.id()).or_default() += 1;
        }
    }

    fn exit_scope(&mut self, declared: &[&Param]) {
        for param in declared {
            if let Some(depth) = self.bound.get_mut(&param.id()) {
                *depth -= 1;
            }
        }
    }
}

/// Substitute free parameters of `expr` by type from `replacements`.
pub fn replace_parameters(expr: &Expr, replacements: &[Expr]) -> Expr {
    ParameterReplacer::new(replacements.iter().cloned()).replace(expr)
}
