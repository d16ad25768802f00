//! The shortcut DSL: free functions that start builders or wrap nodes, and
//! the extension methods available on every [`Node`].

use xtree_ir::{
    BinaryOp, CtorRef, Expr, HostFn, LabelTarget, MemberDef, MemberRef, Param, Thrown, Ty,
    UnaryOp, Value,
};

use crate::block::BlockBuilder;
use crate::capture::{closure, Captures};
use crate::condition::ConditionBuilder;
use crate::error::{not_a_parameter, not_parameterless, BuildResult};
use crate::extract::{process_call, process_closure, Extractor, MemberAccess};
use crate::node::{HostType, HostValue, Node, Task};
use crate::switch::SwitchBuilder;
use crate::try_catch::{using, TryCatchFinallyBuilder};

/// A constant node.
pub fn arg<T: HostValue>(value: T) -> Node<T> {
    Node::wrap(Expr::typed_constant(value.into_value(), T::ty()))
}

/// A runtime value (typically a host object) as a constant of type `T`.
pub fn object<T: HostType>(value: Value) -> Node<T> {
    Node::wrap(Expr::typed_constant(value, T::ty()))
}

/// A fresh local variable. Declare it with [`BlockBuilder::parameter`].
pub fn var<T: HostType>(name: &str) -> Node<T> {
    Node::wrap(Param::named(T::ty(), name).to_expr())
}

/// A fresh lambda parameter.
pub fn parameter<T: HostType>(name: &str) -> Node<T> {
    Node::wrap(Param::named(T::ty(), name).to_expr())
}

/// `null` typed as `ty`.
pub fn null(ty: Ty) -> Node {
    Node::wrap(Expr::null(ty))
}

pub fn null_of<T: HostType>() -> Node<T> {
    Node::wrap(Expr::null(T::ty()))
}

/// `(T)expr`.
pub fn cast<T: HostType>(expr: impl Into<Expr>) -> Node<T> {
    Node::wrap(Expr::convert(expr.into(), T::ty()))
}

/// The call described by a closure (see [`crate::extract`]).
pub fn call<T>(body: impl Into<Expr>) -> Node<T> {
    Node::wrap(process_closure(&body.into(), None))
}

pub fn call_void(body: impl Into<Expr>) -> Node<()> {
    call(body)
}

/// The construction described by a closure.
pub fn new_with<T>(body: impl Into<Expr>) -> Node<T> {
    call(body)
}

/// `new T()` through a parameterless constructor.
pub fn new_object<T>(ctor: &CtorRef) -> BuildResult<Node<T>> {
    if !ctor.params.is_empty() {
        return Err(not_parameterless(&ctor.declaring, ctor.params.len()));
    }
    Ok(Node::wrap(Expr::construct(ctor.clone(), Vec::new())))
}

/// `await` of the task produced by the call a closure describes.
pub fn await_<T>(body: impl Into<Expr>) -> Node<T> {
    Node::wrap(Expr::await_(process_closure(&body.into(), None)))
}

fn host_code(f: HostFn, args: Vec<Expr>) -> Expr {
    let target = Expr::typed_constant(Value::Func(f.clone()), f.ty().clone());
    process_call(&Expr::invoke(target, args), None)
}

/// Host code run when the tree is evaluated.
pub fn code<T: HostValue + 'static>(
    f: impl Fn() -> Result<T, Thrown> + Send + Sync + 'static,
) -> Node<T> {
    let f = HostFn::new(Vec::new(), T::ty(), move |_| f().map(HostValue::into_value));
    Node::wrap(host_code(f, Vec::new()))
}

pub fn code_void(f: impl Fn() -> Result<(), Thrown> + Send + Sync + 'static) -> Node<()> {
    code(f)
}

/// An untyped block.
pub fn block() -> BlockBuilder {
    BlockBuilder::new()
}

/// A block evaluating to `T`.
pub fn typed_block<T: HostType>() -> BlockBuilder {
    BlockBuilder::typed(T::ty())
}

/// An `if` statement.
pub fn condition() -> ConditionBuilder {
    ConditionBuilder::new()
}

/// A conditional value of type `R`.
pub fn typed_condition<R: HostType>() -> ConditionBuilder<R> {
    ConditionBuilder::new()
}

pub fn switch<T: HostType>(value: &Node<T>) -> SwitchBuilder<T> {
    SwitchBuilder::new(value.clone())
}

pub fn try_() -> TryCatchFinallyBuilder {
    TryCatchFinallyBuilder::new()
}

/// `new T[] { items }`.
pub fn array<T: HostType, E: Into<Expr>>(items: impl IntoIterator<Item = E>) -> Node<Vec<T>> {
    let items = items.into_iter().map(Into::into).collect();
    Node::wrap(Expr::new_array(T::ty(), items))
}

/// Jump targets of a loop under construction.
#[derive(Clone, Debug)]
pub struct LoopControl {
    break_label: LabelTarget,
    continue_label: LabelTarget,
}

impl LoopControl {
    fn new() -> Self {
        LoopControl {
            break_label: LabelTarget::new(Ty::Void, Some("break")),
            continue_label: LabelTarget::new(Ty::Void, Some("continue")),
        }
    }

    /// Leave the loop.
    pub fn break_(&self) -> Expr {
        Expr::break_(&self.break_label)
    }

    /// Start the next iteration.
    pub fn continue_(&self) -> Expr {
        Expr::continue_(&self.continue_label)
    }
}

/// An endless loop; leave it through [`LoopControl::break_`].
pub fn loop_(f: impl FnOnce(&LoopControl, BlockBuilder) -> BlockBuilder) -> BuildResult<Node<()>> {
    let control = LoopControl::new();
    let body = f(&control, BlockBuilder::new()).build()?;
    Ok(Node::wrap(Expr::loop_(
        body,
        Some(control.break_label),
        Some(control.continue_label),
    )))
}

/// `while (test) { body }`.
pub fn while_loop(
    test: impl Into<Expr>,
    f: impl FnOnce(&LoopControl, BlockBuilder) -> BlockBuilder,
) -> BuildResult<Node<()>> {
    let test = test.into();
    loop_(|control, body| {
        let exit = Expr::if_then(Expr::unary(UnaryOp::Not, test), control.break_());
        f(control, body.line(exit))
    })
}

impl<T: HostType> Node<T> {
    fn member_ref<TV: HostType>(&self, member: MemberRef) -> Node<TV> {
        Node::wrap(Expr::member(Some(self.expr().clone()), member))
    }

    /// `self.name` read as a property.
    pub fn property<TV: HostType>(&self, name: &str) -> Node<TV> {
        self.member_ref(MemberDef::property(name, self.ty().clone(), TV::ty()))
    }

    /// `self.name` read as a field.
    pub fn field<TV: HostType>(&self, name: &str) -> Node<TV> {
        self.member_ref(MemberDef::field(name, self.ty().clone(), TV::ty()))
    }

    /// `self.name` read as a property.
    pub fn member<TV: HostType>(&self, name: &str) -> Node<TV> {
        self.property(name)
    }

    fn member_closure<TV, B: Into<Expr>>(
        &self,
        body: impl FnOnce(Node<T>) -> B,
        access: MemberAccess,
    ) -> BuildResult<Node<TV>> {
        let described = closure(body);
        Extractor::default()
            .process_member_closure(self.expr(), &described, access)
            .map(Node::wrap)
    }

    /// The property read a closure describes, applied to `self`.
    pub fn property_of<TV, B: Into<Expr>>(
        &self,
        body: impl FnOnce(Node<T>) -> B,
    ) -> BuildResult<Node<TV>> {
        self.member_closure(body, MemberAccess::Property)
    }

    pub fn field_of<TV, B: Into<Expr>>(
        &self,
        body: impl FnOnce(Node<T>) -> B,
    ) -> BuildResult<Node<TV>> {
        self.member_closure(body, MemberAccess::Field)
    }

    pub fn member_of<TV, B: Into<Expr>>(
        &self,
        body: impl FnOnce(Node<T>) -> B,
    ) -> BuildResult<Node<TV>> {
        self.member_closure(body, MemberAccess::Any)
    }

    /// The call a closure describes, with `self` as the receiver.
    pub fn call<TV, B: Into<Expr>>(&self, body: impl FnOnce(Node<T>) -> B) -> Node<TV> {
        let described = closure(body);
        Node::wrap(process_closure(&described, Some(self.expr())))
    }

    pub fn call_void<B: Into<Expr>>(&self, body: impl FnOnce(Node<T>) -> B) -> Node<()> {
        self.call(body)
    }

    /// Host code receiving the value of `self` when the tree is evaluated.
    pub fn code<TV: HostValue + 'static>(
        &self,
        f: impl Fn(&Value) -> Result<TV, Thrown> + Send + Sync + 'static,
    ) -> Node<TV>
    where
        T: 'static,
    {
        let env = Captures::new().node("instance", self).seal();
        let f = HostFn::new(vec![T::ty()], TV::ty(), move |args| {
            let instance = args.first().cloned().unwrap_or(Value::Null);
            f(&instance).map(HostValue::into_value)
        });
        Node::wrap(host_code(f, vec![env.node::<T>("instance")]))
    }

    pub fn code_void(
        &self,
        f: impl Fn(&Value) -> Result<(), Thrown> + Send + Sync + 'static,
    ) -> Node<()>
    where
        T: 'static,
    {
        self.code(f)
    }

    /// Run `body` with `self` bound to a scratch variable, disposing it on
    /// every exit path.
    pub fn using(
        &self,
        body: impl FnOnce(&Node<T>, BlockBuilder) -> BlockBuilder,
    ) -> BuildResult<Node> {
        using(self, body)
    }

    /// `return self;` followed by the label it jumps to. Add both to the
    /// enclosing block, last.
    pub fn ret(&self) -> [Expr; 2] {
        let target = LabelTarget::new(T::ty(), Some("return"));
        [
            Expr::return_(&target, Some(self.expr().clone())),
            Expr::label(&target, Some(Expr::default_of(T::ty()))),
        ]
    }

    /// `self = value`. `self` must be a variable.
    pub fn assign(&self, value: impl Into<Expr>) -> BuildResult<Node<T>> {
        let Some(target) = self.expr().as_parameter() else {
            return Err(not_a_parameter(self.expr()));
        };
        Ok(Node::wrap(Expr::assign(target.clone(), value.into())))
    }

    /// `self = condition ? if_true : if_false`, as an `if` statement.
    pub fn ternary_assign(
        &self,
        condition: &Node<bool>,
        if_true: impl Into<Expr>,
        if_false: impl Into<Expr>,
    ) -> BuildResult<Expr> {
        Ok(Expr::if_then_else(
            condition.expr().clone(),
            self.assign(if_true)?.into_expr(),
            self.assign(if_false)?.into_expr(),
        ))
    }

    /// `self == other`.
    pub fn eq(&self, other: impl Into<Expr>) -> Node<bool> {
        Node::wrap(Expr::binary(BinaryOp::Eq, self.expr().clone(), other.into()))
    }
}

impl<T: HostValue> Node<T> {
    /// `self = value` with a constant.
    pub fn assign_value(&self, value: T) -> BuildResult<Node<T>> {
        self.assign(Expr::typed_constant(value.into_value(), T::ty()))
    }
}

impl Node<bool> {
    pub fn not(&self) -> Node<bool> {
        Node::wrap(Expr::unary(UnaryOp::Not, self.expr().clone()))
    }

    /// `self && other`, short-circuiting.
    pub fn and_also(&self, other: &Node<bool>) -> Node<bool> {
        Node::wrap(Expr::binary(
            BinaryOp::AndAlso,
            self.expr().clone(),
            other.expr().clone(),
        ))
    }

    /// `self || other`, short-circuiting.
    pub fn or_else(&self, other: &Node<bool>) -> Node<bool> {
        Node::wrap(Expr::binary(
            BinaryOp::OrElse,
            self.expr().clone(),
            other.expr().clone(),
        ))
    }
}

impl<T: HostType> Node<Task<T>> {
    /// `await self`.
    pub fn await_(&self) -> Node<T> {
        Node::wrap(Expr::await_(self.expr().clone()))
    }
}

#[cfg(test)]
mod tests;
