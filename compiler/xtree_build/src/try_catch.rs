//! `TryCatchFinallyBuilder` and the `using` construct built on it.

use xtree_ir::{builtins, CatchClause, Expr, Param};

use crate::block::{nested, BlockBuilder};
use crate::error::{missing_try_body, no_catch_block, not_a_parameter, BuildError, BuildResult};
use crate::node::{HostType, Node};

/// Builds a `try` with ordered catch clauses and an optional `finally`.
///
/// The node evaluates to the body's value. Catch clauses are tried in the
/// order they were added.
#[derive(Clone, Debug, Default)]
pub struct TryCatchFinallyBuilder {
    body: Option<Expr>,
    handlers: Vec<CatchClause>,
    finally: Option<Expr>,
    error: Option<BuildError>,
}

impl TryCatchFinallyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn latch(&mut self, error: BuildError) {
        self.error.get_or_insert(error);
    }

    fn block(&mut self, f: impl FnOnce(BlockBuilder) -> BlockBuilder) -> Option<Expr> {
        match nested(None, f) {
            Ok(block) => Some(block),
            Err(error) => {
                self.latch(error);
                None
            }
        }
    }

    /// Set the guarded body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Expr>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn body_block(mut self, f: impl FnOnce(BlockBuilder) -> BlockBuilder) -> Self {
        if let Some(body) = self.block(f) {
            self.body = Some(body);
        }
        self
    }

    fn push_handler<E: HostType>(
        &mut self,
        variable: &Node<E>,
        filter: Option<Expr>,
        body: BuildResult<Expr>,
    ) {
        let Some(param) = variable.expr().as_parameter().cloned() else {
            self.latch(not_a_parameter(variable.expr()));
            return;
        };
        match body {
            Ok(body) => self.handlers.push(CatchClause {
                exception_ty: E::ty(),
                variable: Some(param),
                filter,
                body,
            }),
            Err(error) => self.latch(error),
        }
    }

    /// Catch exceptions of class `E` (subclasses included) with a block
    /// built from the bound exception.
    #[must_use]
    pub fn catch<E: HostType>(
        mut self,
        f: impl FnOnce(&Node<E>, BlockBuilder) -> BlockBuilder,
    ) -> Self {
        let ex = exception_variable::<E>();
        let body = f(&ex, BlockBuilder::new()).build();
        self.push_handler(&ex, None, body);
        self
    }

    /// Catch exceptions of class `E` with a handler producing its body
    /// directly.
    #[must_use]
    pub fn catch_expr<E: HostType, B: Into<Expr>>(
        mut self,
        f: impl FnOnce(&Node<E>) -> B,
    ) -> Self {
        let ex = exception_variable::<E>();
        let body = f(&ex).into();
        self.push_handler(&ex, None, Ok(body));
        self
    }

    /// Catch exceptions of class `E` for which `filter` evaluates to `true`.
    #[must_use]
    pub fn catch_when<E: HostType>(
        mut self,
        filter: impl FnOnce(&Node<E>) -> Node<bool>,
        f: impl FnOnce(&Node<E>, BlockBuilder) -> BlockBuilder,
    ) -> Self {
        let ex = exception_variable::<E>();
        let filter = filter(&ex).into_expr();
        let body = f(&ex, BlockBuilder::new()).build();
        self.push_handler(&ex, Some(filter), body);
        self
    }

    /// Set the body run on every exit path.
    #[must_use]
    pub fn finally(mut self, finally: impl Into<Expr>) -> Self {
        self.finally = Some(finally.into());
        self
    }

    #[must_use]
    pub fn finally_block(mut self, f: impl FnOnce(BlockBuilder) -> BlockBuilder) -> Self {
        if let Some(finally) = self.block(f) {
            self.finally = Some(finally);
        }
        self
    }

    /// The try node. Fails without a body, and without both catch clauses
    /// and a `finally`.
    #[tracing::instrument(level = "debug", skip_all, fields(handlers = self.handlers.len()))]
    pub fn build(&self) -> BuildResult<Node> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let Some(body) = self.body.clone() else {
            return Err(missing_try_body());
        };
        if self.finally.is_none() && self.handlers.is_empty() {
            return Err(no_catch_block());
        }
        Ok(Node::wrap(Expr::try_catch_finally(
            body.ty().clone(),
            body,
            self.handlers.clone(),
            self.finally.clone(),
        )))
    }
}

fn exception_variable<E: HostType>() -> Node<E> {
    Node::wrap(Param::named(E::ty(), "ex").to_expr())
}

/// `using (var v = resource) { body }`.
///
/// The resource is evaluated once into a scratch variable; the body runs
/// inside a `try` whose `finally` disposes that variable, so disposal
/// happens on normal completion, on early return and when the body throws.
pub fn using<T: HostType>(
    resource: &Node<T>,
    body: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder,
) -> BuildResult<Node> {
    let variable = Param::named(T::ty(), "resource");
    let scratch = Node::<T>::wrap(variable.to_expr());

    let disposable = builtins::disposable();
    let receiver = if *scratch.ty() == disposable {
        scratch.expr().clone()
    } else {
        Expr::convert(scratch.expr().clone(), disposable)
    };
    let dispose = Expr::call(Some(receiver), builtins::dispose_method(), Vec::new());

    let guarded = TryCatchFinallyBuilder::new()
        .body(body(&scratch, BlockBuilder::new()).build()?)
        .finally(dispose)
        .build()?;
    tracing::trace!(resource = %resource, "using expanded");

    let outer = BlockBuilder::new()
        .parameter_with(&scratch, resource)
        .line(guarded)
        .build()?;
    Ok(Node::wrap(outer))
}

#[cfg(test)]
mod tests;
