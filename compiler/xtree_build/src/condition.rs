//! `ConditionBuilder`: `if`/`else` statements and conditional values.

use std::marker::PhantomData;

use xtree_ir::{Expr, ExprKind};

use crate::block::{nested, BlockBuilder};
use crate::error::{condition_not_defined, condition_result_mismatch, BuildError, BuildResult};
use crate::node::{HostType, Node};

/// Builds a conditional.
///
/// With `R = ()` the result is an `if` statement; with any other `R` it is
/// a conditional value of type `R`, and a missing arm yields `default(R)`.
#[derive(Debug)]
pub struct ConditionBuilder<R = ()> {
    test: Option<Expr>,
    then: Option<Expr>,
    otherwise: Option<Expr>,
    error: Option<BuildError>,
    _result: PhantomData<fn() -> R>,
}

impl<R> Default for ConditionBuilder<R> {
    fn default() -> Self {
        ConditionBuilder {
            test: None,
            then: None,
            otherwise: None,
            error: None,
            _result: PhantomData,
        }
    }
}

impl<R: HostType> ConditionBuilder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn arm(&mut self, f: impl FnOnce(BlockBuilder) -> BlockBuilder) -> Option<Expr> {
        let ty = R::ty();
        let ret = if ty.is_void() { None } else { Some(ty) };
        let block = match nested(ret, f) {
            Ok(block) => block,
            Err(error) => {
                self.error.get_or_insert(error);
                return None;
            }
        };
        let mismatched = match block.kind() {
            ExprKind::Block { body, .. } => body.last().is_some_and(|last| self.mismatch(last)),
            _ => false,
        };
        (!mismatched).then_some(block)
    }

    /// Latch a mismatch when a typed conditional gets an arm of another type.
    fn checked(&mut self, arm: Expr) -> Option<Expr> {
        if self.mismatch(&arm) {
            return None;
        }
        Some(arm)
    }

    /// A throw or jump leaves the conditional, so it fits any result type.
    fn mismatch(&mut self, value: &Expr) -> bool {
        let ty = R::ty();
        if ty.is_void()
            || ty.is_assignable_from(value.ty())
            || matches!(value.kind(), ExprKind::Throw(_) | ExprKind::Goto { .. })
        {
            return false;
        }
        self.error.get_or_insert(condition_result_mismatch(&ty, value.ty()));
        true
    }

    /// Set the condition.
    #[must_use]
    pub fn if_(mut self, test: impl Into<Expr>) -> Self {
        self.test = Some(test.into());
        self
    }

    /// Set the condition and the `then` arm.
    #[must_use]
    pub fn if_then(self, test: impl Into<Expr>, then: impl Into<Expr>) -> Self {
        self.if_(test).then(then)
    }

    /// Set the condition and build the `then` arm as a block.
    #[must_use]
    pub fn if_block(
        self,
        test: impl Into<Expr>,
        then: impl FnOnce(BlockBuilder) -> BlockBuilder,
    ) -> Self {
        self.if_(test).then_block(then)
    }

    #[must_use]
    pub fn then(mut self, then: impl Into<Expr>) -> Self {
        self.then = self.checked(then.into());
        self
    }

    #[must_use]
    pub fn then_block(mut self, then: impl FnOnce(BlockBuilder) -> BlockBuilder) -> Self {
        self.then = self.arm(then);
        self
    }

    #[must_use]
    pub fn else_(mut self, otherwise: impl Into<Expr>) -> Self {
        self.otherwise = self.checked(otherwise.into());
        self
    }

    #[must_use]
    pub fn else_block(mut self, otherwise: impl FnOnce(BlockBuilder) -> BlockBuilder) -> Self {
        self.otherwise = self.arm(otherwise);
        self
    }

    /// The conditional node. Fails when no condition was set.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(&self) -> BuildResult<Node<R>> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let Some(test) = self.test.clone() else {
            return Err(condition_not_defined());
        };
        let ty = R::ty();
        if ty.is_void() {
            let then = self.then.clone().unwrap_or_else(Expr::empty);
            return Ok(Node::wrap(match &self.otherwise {
                Some(otherwise) => Expr::if_then_else(test, then, otherwise.clone()),
                None => Expr::if_then(test, then),
            }));
        }
        let then = self.then.clone().unwrap_or_else(|| Expr::default_of(ty.clone()));
        let otherwise = self
            .otherwise
            .clone()
            .unwrap_or_else(|| Expr::default_of(ty.clone()));
        Ok(Node::wrap(Expr::condition(test, then, otherwise, ty)))
    }
}

#[cfg(test)]
mod tests;
