//! `SwitchBuilder`: multi-way branches on a scrutinee.
//!
//! A switch starts untyped (`R = ()`, a statement). The first `typed_*`
//! call fixes the result type for the rest of the builder; doing so after
//! untyped cases were added is reported as `MixedSwitchResult`.

use std::marker::PhantomData;

use xtree_ir::{Expr, MethodRef, SwitchCase};

use crate::block::BlockBuilder;
use crate::error::{
    comparer_arity, comparer_not_static, comparer_param_type, mixed_switch_result,
    switch_result_mismatch, BuildError, BuildResult,
};
use crate::node::{HostType, Node};

/// Builds a switch over a `T` scrutinee producing `R`.
#[derive(Debug)]
pub struct SwitchBuilder<T, R = ()> {
    value: Node<T>,
    cases: Vec<SwitchCase>,
    default: Option<Expr>,
    comparer: Option<MethodRef>,
    error: Option<BuildError>,
    _result: PhantomData<fn() -> R>,
}

impl<T: HostType, R: HostType> SwitchBuilder<T, R> {
    pub fn new(value: Node<T>) -> Self {
        SwitchBuilder {
            value,
            cases: Vec::new(),
            default: None,
            comparer: None,
            error: None,
            _result: PhantomData,
        }
    }

    fn latch(&mut self, error: BuildError) {
        self.error.get_or_insert(error);
    }

    /// Check a body against the result type; `None` when it was rejected.
    fn body(&mut self, body: Expr) -> Option<Expr> {
        let ty = R::ty();
        if !ty.is_void() && !ty.is_assignable_from(body.ty()) {
            self.latch(switch_result_mismatch(&ty, body.ty()));
            return None;
        }
        Some(body)
    }

    fn body_block(
        &mut self,
        f: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder,
    ) -> Option<Expr> {
        match f(&self.value, BlockBuilder::typed(R::ty())).build() {
            Ok(block) => Some(block),
            Err(error) => {
                self.latch(error);
                None
            }
        }
    }

    fn push_case(&mut self, body: Option<Expr>, tests: impl IntoIterator<Item = Node<T>>) {
        if let Some(body) = body {
            let tests = tests.into_iter().map(Node::into_expr).collect();
            self.cases.push(SwitchCase { tests, body });
        }
    }

    /// Add a case running `body` when the scrutinee equals one of `tests`.
    #[must_use]
    pub fn case(mut self, body: impl Into<Expr>, tests: impl IntoIterator<Item = Node<T>>) -> Self {
        let body = self.body(body.into());
        self.push_case(body, tests);
        self
    }

    /// Add a case whose body is built from the scrutinee.
    #[must_use]
    pub fn case_block(
        mut self,
        f: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder,
        tests: impl IntoIterator<Item = Node<T>>,
    ) -> Self {
        let body = self.body_block(f);
        self.push_case(body, tests);
        self
    }

    /// Set the body run when no case matches.
    #[must_use]
    pub fn default(mut self, body: impl Into<Expr>) -> Self {
        if let Some(body) = self.body(body.into()) {
            self.default = Some(body);
        }
        self
    }

    #[must_use]
    pub fn default_block(mut self, f: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder) -> Self {
        if let Some(body) = self.body_block(f) {
            self.default = Some(body);
        }
        self
    }

    /// Compare with `method` instead of value equality. The method must be
    /// static and take two `T` parameters.
    #[must_use]
    pub fn comparer(mut self, method: &MethodRef) -> Self {
        match validate_comparer::<T>(method) {
            Ok(()) => self.comparer = Some(method.clone()),
            Err(error) => self.latch(error),
        }
        self
    }

    /// The switch node.
    #[tracing::instrument(level = "debug", skip_all, fields(cases = self.cases.len()))]
    pub fn build(&self) -> BuildResult<Node<R>> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let ty = R::ty();
        let default = match &self.default {
            Some(default) => Some(default.clone()),
            None if !ty.is_void() => Some(Expr::default_of(ty.clone())),
            None => None,
        };
        Ok(Node::wrap(Expr::switch(
            ty,
            self.value.expr().clone(),
            self.cases.clone(),
            default,
            self.comparer.clone(),
        )))
    }
}

impl<T: HostType> SwitchBuilder<T> {
    /// Fix the result type to `R`.
    pub fn returns<R: HostType>(self) -> SwitchBuilder<T, R> {
        let mut error = self.error;
        if !self.cases.is_empty() || self.default.is_some() {
            error.get_or_insert_with(mixed_switch_result);
        }
        SwitchBuilder {
            value: self.value,
            cases: self.cases,
            default: self.default,
            comparer: self.comparer,
            error,
            _result: PhantomData,
        }
    }

    pub fn typed_case<R: HostType>(
        self,
        body: Node<R>,
        tests: impl IntoIterator<Item = Node<T>>,
    ) -> SwitchBuilder<T, R> {
        self.returns::<R>().case(body, tests)
    }

    pub fn typed_case_block<R: HostType>(
        self,
        f: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder,
        tests: impl IntoIterator<Item = Node<T>>,
    ) -> SwitchBuilder<T, R> {
        self.returns::<R>().case_block(f, tests)
    }

    pub fn typed_default<R: HostType>(self, body: Node<R>) -> SwitchBuilder<T, R> {
        self.returns::<R>().default(body)
    }

    pub fn typed_default_block<R: HostType>(
        self,
        f: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder,
    ) -> SwitchBuilder<T, R> {
        self.returns::<R>().default_block(f)
    }
}

fn validate_comparer<T: HostType>(method: &MethodRef) -> BuildResult<()> {
    if !method.is_static {
        return Err(comparer_not_static(&method.name));
    }
    if method.params.len() != 2 {
        return Err(comparer_arity(&method.name, method.params.len()));
    }
    let expected = T::ty();
    if let Some(got) = method.params.iter().find(|param| **param != expected) {
        return Err(comparer_param_type(&method.name, &expected, got));
    }
    Ok(())
}
