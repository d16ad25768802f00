//! `BlockBuilder`: statements plus declared variables.

use rustc_hash::FxHashSet;
use xtree_ir::{Expr, Param, ParamId, Ty};

use crate::error::{not_a_parameter, BuildError, BuildResult};
use crate::node::{HostType, Node};

/// Accumulates the statements and variables of a block.
///
/// Statements keep the order they were added in. Variables form a set;
/// declaring one twice is a no-op. The first invalid call is remembered and
/// reported by [`BlockBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct BlockBuilder {
    ret: Option<Ty>,
    variables: Vec<Param>,
    declared: FxHashSet<ParamId>,
    lines: Vec<Expr>,
    error: Option<BuildError>,
}

impl BlockBuilder {
    /// An untyped block; its value is that of its last statement.
    pub fn new() -> Self {
        Self::default()
    }

    /// A block typed as `ret`.
    pub fn typed(ret: Ty) -> Self {
        BlockBuilder {
            ret: Some(ret),
            ..Self::default()
        }
    }

    /// Declared result type, if any.
    pub fn ret(&self) -> Option<&Ty> {
        self.ret.as_ref()
    }

    fn latch(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn declare(&mut self, param: &Param) {
        if self.declared.insert(param.id()) {
            self.variables.push(param.clone());
        }
    }

    /// Declare a variable. `param` must be a parameter reference.
    #[must_use]
    pub fn parameter(mut self, param: impl AsRef<Expr>) -> Self {
        let param = param.as_ref();
        match param.as_parameter() {
            Some(p) => self.declare(p),
            None => self.latch(not_a_parameter(param)),
        }
        self
    }

    /// Declare a variable and assign `value` to it as the next statement.
    #[must_use]
    pub fn parameter_with(mut self, param: impl AsRef<Expr>, value: impl Into<Expr>) -> Self {
        let param = param.as_ref();
        match param.as_parameter() {
            Some(p) => {
                let p = p.clone();
                self.declare(&p);
                self.lines.push(Expr::assign(p, value.into()));
            }
            None => self.latch(not_a_parameter(param)),
        }
        self
    }

    /// Declare a fresh variable of type `T`.
    pub fn var<T: HostType>(&mut self, name: &str) -> Node<T> {
        let param = Param::named(T::ty(), name);
        self.declare(&param);
        Node::wrap(param.to_expr())
    }

    /// Declare a fresh variable of type `T` initialized to `value`.
    pub fn var_with<T: HostType>(&mut self, name: &str, value: impl Into<Expr>) -> Node<T> {
        let param = Param::named(T::ty(), name);
        self.declare(&param);
        self.lines.push(Expr::assign(param.clone(), value.into()));
        Node::wrap(param.to_expr())
    }

    /// Append a statement.
    #[must_use]
    pub fn line(mut self, line: impl Into<Expr>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Append a statement produced by a fallible builder call.
    #[must_use]
    pub fn try_line<E: Into<Expr>>(mut self, line: BuildResult<E>) -> Self {
        match line {
            Ok(line) => self.lines.push(line.into()),
            Err(error) => self.latch(error),
        }
        self
    }

    /// Append statements in order.
    #[must_use]
    pub fn lines<E: Into<Expr>>(mut self, lines: impl IntoIterator<Item = E>) -> Self {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Append a statement in place.
    pub fn push(&mut self, line: impl Into<Expr>) {
        self.lines.push(line.into());
    }

    /// Declared variables, in first-declaration order.
    pub fn parameters(&self) -> &[Param] {
        &self.variables
    }

    pub fn statements(&self) -> &[Expr] {
        &self.lines
    }

    /// The block node.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = self.lines.len()))]
    pub fn build(&self) -> BuildResult<Expr> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(match &self.ret {
            Some(ret) => Expr::typed_block(ret.clone(), self.variables.clone(), self.lines.clone()),
            None => Expr::block(self.variables.clone(), self.lines.clone()),
        })
    }

    /// The block as a lambda over `params`.
    pub fn lambda(&self, params: &[&Expr]) -> BuildResult<Expr> {
        let body = self.build()?;
        let params = lambda_params(params)?;
        Ok(match &self.ret {
            Some(ret) => Expr::typed_lambda(params, body, ret.clone()),
            None => Expr::lambda(params, body),
        })
    }

    /// The block invoked in place, with `params` passed through as the
    /// arguments of the invocation.
    pub fn invoke<T>(&self, params: &[&Expr]) -> BuildResult<Node<T>> {
        let lambda = self.lambda(params)?;
        let args = params.iter().map(|param| (*param).clone()).collect();
        Ok(Node::wrap(Expr::invoke(lambda, args)))
    }
}

fn lambda_params(params: &[&Expr]) -> BuildResult<Vec<Param>> {
    params
        .iter()
        .map(|param| param.as_parameter().cloned().ok_or_else(|| not_a_parameter(param)))
        .collect()
}

/// Build a block with a nested-builder callback.
pub(crate) fn nested(
    ret: Option<Ty>,
    f: impl FnOnce(BlockBuilder) -> BlockBuilder,
) -> BuildResult<Expr> {
    let builder = match ret {
        Some(ret) => BlockBuilder::typed(ret),
        None => BlockBuilder::new(),
    };
    f(builder).build()
}
