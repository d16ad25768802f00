//! Built-in classes the evaluator and the builders rely on.
//!
//! Class types are nominal, so each accessor simply rebuilds its
//! `ClassType`; equal names make equal types.

use std::sync::Arc;

use crate::handles::{CtorDef, CtorRef, MethodDef, MethodRef};
use crate::ty::{ClassType, Ty};
use crate::value::{HostObject, Thrown, Value};

/// Root of all exception classes.
pub fn exception() -> Ty {
    Ty::class(ClassType::new("Exception"))
}

fn exception_subclass(name: &str) -> Ty {
    Ty::class(ClassType::new(name).extends(exception()))
}

pub fn invalid_operation() -> Ty {
    exception_subclass("InvalidOperationException")
}

pub fn invalid_cast() -> Ty {
    exception_subclass("InvalidCastException")
}

pub fn null_reference() -> Ty {
    exception_subclass("NullReferenceException")
}

pub fn argument() -> Ty {
    exception_subclass("ArgumentException")
}

pub fn missing_member_exception() -> Ty {
    exception_subclass("MissingMemberException")
}

/// Interface of scope-guarded resources.
pub fn disposable() -> Ty {
    Ty::class(ClassType::interface("Disposable"))
}

/// `Disposable.dispose()`, dispatched virtually on the receiver.
pub fn dispose_method() -> MethodRef {
    MethodDef::virtual_method("dispose", disposable(), Vec::new(), Ty::Void)
}

/// Payload of built-in exception objects.
#[derive(Debug)]
pub struct ExceptionObject {
    class: Ty,
    message: Arc<str>,
}

impl ExceptionObject {
    pub fn new(class: Ty, message: impl Into<Arc<str>>) -> Self {
        ExceptionObject {
            class,
            message: message.into(),
        }
    }
}

impl HostObject for ExceptionObject {
    fn class(&self) -> Ty {
        self.class.clone()
    }

    fn get(&self, member: &str) -> Result<Value, Thrown> {
        match member {
            "message" => Ok(Value::Str(self.message.clone())),
            _ => Err(missing_member(&self.class, member)),
        }
    }
}

/// A new exception object as a value.
pub fn exception_value(class: Ty, message: impl Into<Arc<str>>) -> Value {
    Value::object(ExceptionObject::new(class, message))
}

/// The error host objects raise for unknown members.
#[cold]
pub fn missing_member(class: &Ty, member: &str) -> Thrown {
    Thrown::new(
        missing_member_exception(),
        format!("'{class}' has no member '{member}'"),
    )
}

/// An instance of the root `Object` class with no members.
#[derive(Debug)]
struct PlainObject;

impl HostObject for PlainObject {
    fn class(&self) -> Ty {
        Ty::Object
    }
}

/// Default constructor of `Object`.
pub fn object_ctor() -> CtorRef {
    CtorDef::new(Ty::Object, Vec::new(), |_| Ok(Value::object(PlainObject)))
}
