//! Runtime values.
//!
//! Values appear in two places: inside `Constant` nodes (captured at build
//! time) and in the evaluator. Heap values are shared through `Arc` so a
//! constant can be cloned into any number of trees.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::builtins;
use crate::expr::Expr;
use crate::ty::Ty;

/// An exception value unwinding through host code.
///
/// Host methods return `Err(Thrown)` to raise; the evaluator turns it into a
/// catchable exception carrying the same value.
#[derive(Clone, Debug)]
pub struct Thrown(pub Value);

impl Thrown {
    /// Throw a fresh exception object of `class` with `message`.
    pub fn new(class: Ty, message: impl Into<Arc<str>>) -> Self {
        Thrown(builtins::exception_value(class, message))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// The `message` member of the thrown object, if it has one.
    pub fn message(&self) -> Option<Arc<str>> {
        match &self.0 {
            Value::Object(obj) => match obj.get("message") {
                Ok(Value::Str(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0, self.message()) {
            (Value::Object(obj), Some(msg)) => write!(f, "{}: {msg}", obj.class()),
            (other, _) => write!(f, "{other}"),
        }
    }
}

/// A host-side object reachable from a tree.
///
/// Member reads and virtual method calls on objects go through this trait;
/// the default implementations raise `MissingMemberException`.
pub trait HostObject: Send + Sync + fmt::Debug {
    /// Runtime class of the object.
    fn class(&self) -> Ty;

    /// Read a field or property.
    fn get(&self, member: &str) -> Result<Value, Thrown> {
        Err(builtins::missing_member(&self.class(), member))
    }

    /// Invoke a virtual method.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, Thrown> {
        let _ = args;
        Err(builtins::missing_member(&self.class(), method))
    }

    /// Downcast hook for objects that carry host-side payloads.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// Body of a host callable.
pub type HostFnBody = dyn Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync;

/// A callable value (host delegate or compiled lambda).
#[derive(Clone)]
pub struct HostFn {
    ty: Ty,
    body: Arc<HostFnBody>,
}

impl HostFn {
    pub fn new(
        params: Vec<Ty>,
        ret: Ty,
        body: impl Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Self {
        HostFn {
            ty: Ty::func(params, ret),
            body: Arc::new(body),
        }
    }

    /// The `Func` type of this callable.
    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, Thrown> {
        (self.body)(args)
    }

    fn ptr_eq(&self, other: &HostFn) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.body), Arc::as_ptr(&other.body))
    }
}

impl fmt::Debug for HostFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFn({})", self.ty)
    }
}

/// A completed awaitable.
///
/// Suspension is the host's business; the trees only record await points, so
/// tasks handed to them are already resolved or faulted.
#[derive(Clone, Debug)]
pub struct TaskValue {
    ty: Ty,
    outcome: Arc<Result<Value, Thrown>>,
}

impl TaskValue {
    pub fn ready(result_ty: Ty, value: Value) -> Self {
        TaskValue {
            ty: Ty::task(result_ty),
            outcome: Arc::new(Ok(value)),
        }
    }

    pub fn faulted(result_ty: Ty, error: Thrown) -> Self {
        TaskValue {
            ty: Ty::task(result_ty),
            outcome: Arc::new(Err(error)),
        }
    }

    pub fn ty(&self) -> &Ty {
        &self.ty
    }

    pub fn outcome(&self) -> Result<Value, Thrown> {
        (*self.outcome).clone()
    }
}

/// An array value with its element type.
#[derive(Clone, Debug)]
pub struct ArrayValue {
    pub elem: Ty,
    pub items: Arc<[Value]>,
}

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Void,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Array(ArrayValue),
    Object(Arc<dyn HostObject>),
    Func(HostFn),
    Task(TaskValue),
    /// A captured tree fragment (the value of a Node wrapper).
    Fragment(Expr),
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn object(obj: impl HostObject + 'static) -> Self {
        Value::Object(Arc::new(obj))
    }

    pub fn array(elem: Ty, items: Vec<Value>) -> Self {
        Value::Array(ArrayValue {
            elem,
            items: items.into(),
        })
    }

    /// Dynamic type of the value; `None` for `null`.
    pub fn runtime_ty(&self) -> Option<Ty> {
        Some(match self {
            Value::Null => return None,
            Value::Void => Ty::Void,
            Value::Bool(_) => Ty::Bool,
            Value::Int(_) => Ty::Int,
            Value::Float(_) => Ty::Float,
            Value::Str(_) => Ty::Str,
            Value::Array(arr) => Ty::array(arr.elem.clone()),
            Value::Object(obj) => obj.class(),
            Value::Func(func) => func.ty().clone(),
            Value::Task(task) => task.ty().clone(),
            Value::Fragment(expr) => Ty::fragment(expr.ty().clone()),
        })
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn HostObject>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Default equality: by value for primitives and strings, by identity
    /// for everything allocated.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            #[allow(clippy::float_cmp, reason = "value equality mirrors the host's ==")]
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(&a.items, &b.items),
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Task(a), Value::Task(b)) => Arc::ptr_eq(&a.outcome, &b.outcome),
            (Value::Fragment(a), Value::Fragment(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Void
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Array(arr) => {
                write!(f, "new {}[] {{", arr.elem)?;
                for (i, item) in arr.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => write!(f, "<{}>", obj.class()),
            Value::Func(func) => write!(f, "<{}>", func.ty()),
            Value::Task(task) => write!(f, "<{}>", task.ty()),
            Value::Fragment(expr) => write!(f, "Node({expr})"),
        }
    }
}

#[cfg(test)]
mod tests;
