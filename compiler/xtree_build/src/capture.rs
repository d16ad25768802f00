//! Describing closures as trees.
//!
//! The normalizing visitor in [`crate::extract`] consumes *closure bodies*:
//! trees that read captured host values through a record object, the way a
//! compiler-generated closure class would. [`Captures`] builds such a record
//! and hands out the member reads that refer to it.
//!
//! A captured [`Node`] is stored as a `Fragment` value and read back through
//! a conversion from the fragment type, which is exactly the shape the
//! visitor unwraps into the captured tree.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use xtree_ir::{
    builtins, ClassType, Expr, HostObject, MemberDef, Param, Thrown, Ty, Value,
};

use crate::node::{HostType, Node};

/// The record object behind a [`Captures`] set.
#[derive(Debug)]
struct CaptureRecord {
    fields: FxHashMap<Arc<str>, Value>,
}

fn record_class() -> Ty {
    Ty::class(ClassType::new("<closure>"))
}

impl HostObject for CaptureRecord {
    fn class(&self) -> Ty {
        record_class()
    }

    fn get(&self, member: &str) -> Result<Value, Thrown> {
        self.fields
            .get(member)
            .cloned()
            .ok_or_else(|| builtins::missing_member(&record_class(), member))
    }
}

/// A set of captured values, shared by the closure bodies that read them.
#[derive(Debug, Default)]
pub struct Captures {
    fields: FxHashMap<Arc<str>, Value>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a host value.
    #[must_use]
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Capture a node.
    #[must_use]
    pub fn node<T: ?Sized>(mut self, name: &str, node: &Node<T>) -> Self {
        self.fields.insert(name.into(), node.fragment());
        self
    }

    /// Freeze the set into a record that closure bodies can read from.
    pub fn seal(self) -> Env {
        let tys = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.runtime_ty().unwrap_or(Ty::Object)))
            .collect();
        Env {
            record: Expr::constant(Value::object(CaptureRecord {
                fields: self.fields,
            })),
            tys,
        }
    }
}

/// A sealed capture record.
#[derive(Clone, Debug)]
pub struct Env {
    record: Expr,
    tys: FxHashMap<Arc<str>, Ty>,
}

impl Env {
    /// Read a captured value, typed as the value's runtime type.
    pub fn get(&self, name: &str) -> Expr {
        let ty = self.tys.get(name).cloned().unwrap_or(Ty::Object);
        self.get_as(name, ty)
    }

    /// Read a captured value under a declared static type.
    pub fn get_as(&self, name: &str, ty: Ty) -> Expr {
        Expr::member(
            Some(self.record.clone()),
            MemberDef::field(name, record_class(), ty),
        )
    }

    /// Use a captured node as a `T`-typed operand.
    pub fn node<T: HostType>(&self, name: &str) -> Expr {
        let ty = T::ty();
        let read = self.get_as(name, Ty::fragment(ty.clone()));
        Expr::convert(read, ty)
    }
}

/// A one-parameter closure: `|o: T| body(o)`.
pub fn closure<T: HostType, B: Into<Expr>>(body: impl FnOnce(Node<T>) -> B) -> Expr {
    let param = Param::named(T::ty(), "o");
    let body = body(Node::wrap(param.to_expr()));
    Expr::lambda(vec![param], body.into())
}

/// A parameterless closure: `|| body`.
pub fn thunk(body: impl Into<Expr>) -> Expr {
    Expr::lambda(Vec::new(), body.into())
}
