//! The typed node wrapper.
//!
//! A [`Node<T>`] is an [`Expr`] tagged at compile time with the host type
//! `T` it is expected to evaluate to. The tag only steers the builder API
//! (which conversions to insert, which block types to use); the semantic
//! type of the wrapped tree is always `expr.ty()`.
//!
//! Host types are named through [`HostType`]. Primitive Rust types map to
//! the built-in semantic types; host classes get a marker type:
//!
//! ```ignore
//! struct IMock;
//! impl HostType for IMock {
//!     fn ty() -> Ty { Mock::class() }
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;

use xtree_ir::{builtins, Expr, Ty, Value};

/// A host type with a known semantic type.
pub trait HostType {
    fn ty() -> Ty;
}

/// A host type whose Rust values can be embedded as constants.
pub trait HostValue: HostType {
    fn into_value(self) -> Value;
}

/// Tag of nodes whose host type is not tracked.
#[derive(Copy, Clone, Debug)]
pub enum Dynamic {}

impl HostType for Dynamic {
    fn ty() -> Ty {
        Ty::Object
    }
}

impl HostType for () {
    fn ty() -> Ty {
        Ty::Void
    }
}

impl HostValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

macro_rules! primitive_host_types {
    ($($rust:ty => $ty:expr, $variant:ident;)*) => {
        $(
            impl HostType for $rust {
                fn ty() -> Ty {
                    $ty
                }
            }

            impl HostValue for $rust {
                fn into_value(self) -> Value {
                    Value::$variant(self.into())
                }
            }
        )*
    };
}

primitive_host_types! {
    bool => Ty::Bool, Bool;
    i64 => Ty::Int, Int;
    f64 => Ty::Float, Float;
    String => Ty::Str, Str;
}

impl HostType for &str {
    fn ty() -> Ty {
        Ty::Str
    }
}

impl HostValue for &str {
    fn into_value(self) -> Value {
        Value::str(self)
    }
}

/// Runtime values embed as `object`; `null` stays `null`.
impl HostType for Value {
    fn ty() -> Ty {
        Ty::Object
    }
}

impl HostValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: HostType> HostType for Vec<T> {
    fn ty() -> Ty {
        Ty::array(T::ty())
    }
}

/// Marker for an awaitable producing `T`.
#[derive(Copy, Clone, Debug)]
pub struct Task<T>(PhantomData<fn() -> T>);

impl<T: HostType> HostType for Task<T> {
    fn ty() -> Ty {
        Ty::task(T::ty())
    }
}

/// Marker for the root exception class.
#[derive(Copy, Clone, Debug)]
pub enum Exception {}

impl HostType for Exception {
    fn ty() -> Ty {
        builtins::exception()
    }
}

#[derive(Copy, Clone, Debug)]
pub enum InvalidOperationException {}

impl HostType for InvalidOperationException {
    fn ty() -> Ty {
        builtins::invalid_operation()
    }
}

#[derive(Copy, Clone, Debug)]
pub enum ArgumentException {}

impl HostType for ArgumentException {
    fn ty() -> Ty {
        builtins::argument()
    }
}

/// Marker for the `Disposable` interface.
#[derive(Copy, Clone, Debug)]
pub enum Disposable {}

impl HostType for Disposable {
    fn ty() -> Ty {
        builtins::disposable()
    }
}

/// A tree node tagged with the host type it evaluates to.
pub struct Node<T: ?Sized = Dynamic> {
    expr: Expr,
    _ty: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Clone for Node<T> {
    fn clone(&self) -> Self {
        Node::wrap(self.expr.clone())
    }
}

impl<T: ?Sized> Node<T> {
    /// Wrap a raw node as-is.
    #[inline]
    pub fn wrap(expr: Expr) -> Self {
        Node {
            expr,
            _ty: PhantomData,
        }
    }

    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    #[inline]
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    /// Semantic type of the wrapped node.
    #[inline]
    pub fn ty(&self) -> &Ty {
        self.expr.ty()
    }

    /// The same node under another host type. No conversion is inserted.
    pub fn typed<V>(&self) -> Node<V> {
        Node::wrap(self.expr.clone())
    }

    /// The same node with its host type forgotten.
    pub fn erase(&self) -> Node {
        Node::wrap(self.expr.clone())
    }

    /// `self is V`.
    pub fn is<V: HostType>(&self) -> Node<bool> {
        Node::wrap(Expr::type_is(self.expr.clone(), V::ty()))
    }

    /// `self as V`: `null` when the value is not a `V`.
    pub fn type_as<V: HostType>(&self) -> Node<V> {
        Node::wrap(Expr::type_as(self.expr.clone(), V::ty()))
    }

    /// `(V)self`: throws when the value is not a `V`.
    pub fn cast<V: HostType>(&self) -> Node<V> {
        Node::wrap(Expr::convert(self.expr.clone(), V::ty()))
    }

    /// The node as a runtime value, for capturing into closures.
    pub fn fragment(&self) -> Value {
        Value::Fragment(self.expr.clone())
    }
}

impl<T: HostType + ?Sized> Node<T> {
    /// Wrap a raw node; a missing node becomes `null` typed as `T`.
    pub fn from_option(expr: Option<Expr>) -> Self {
        Node::wrap(expr.unwrap_or_else(|| Expr::null(T::ty())))
    }
}

impl<T: ?Sized> From<Expr> for Node<T> {
    fn from(expr: Expr) -> Self {
        Node::wrap(expr)
    }
}

impl<T: ?Sized> From<Node<T>> for Expr {
    fn from(node: Node<T>) -> Self {
        node.expr
    }
}

impl<T: ?Sized> From<&Node<T>> for Expr {
    fn from(node: &Node<T>) -> Self {
        node.expr.clone()
    }
}

impl<T: ?Sized> AsRef<Expr> for Node<T> {
    fn as_ref(&self) -> &Expr {
        &self.expr
    }
}

impl<T: ?Sized> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.expr).finish()
    }
}

impl<T: ?Sized> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

#[cfg(test)]
mod tests;
