//! Tree-node model for xtree.
//!
//! This crate is the raw representation every other xtree crate works on:
//!
//! - [`Ty`]: the semantic type a node evaluates to.
//! - [`Value`]: runtime values, including [`HostObject`] references to
//!   host-side objects.
//! - [`MethodRef`], [`CtorRef`], [`MemberRef`]: handles to host code.
//! - [`Expr`]: the shared, immutable tree node, one variant per shape.
//! - [`Visitor`] and [`Rewriter`]: read-only and rebuilding traversals.
//!
//! Trees print through `Display` as pseudo source.
//!
//! With the `testing` feature (always on for this crate's own tests) the
//! [`testing`] module provides recording host objects.

pub mod builtins;
mod expr;
mod handles;
mod pretty;
mod stack;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod ty;
mod value;
pub mod visitor;

pub use expr::{
    BinaryOp, CatchClause, ConvertKind, Expr, ExprKind, GotoKind, LabelTarget, Param, ParamId,
    SwitchCase, UnaryOp,
};
pub use handles::{
    CtorDef, CtorFn, CtorRef, MemberDef, MemberKind, MemberRef, MethodBody, MethodDef, MethodFn,
    MethodRef,
};
pub use stack::ensure_sufficient_stack;
pub use ty::{ClassType, FuncSig, Ty};
pub use value::{ArrayValue, HostFn, HostFnBody, HostObject, TaskValue, Thrown, Value};
pub use visitor::{free_parameters, Rewriter, Visitor};
