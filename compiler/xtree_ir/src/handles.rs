//! Handles to host methods, constructors and members.
//!
//! A tree never owns host code; it refers to it through these shared
//! descriptors. Handles compare by identity.

use std::fmt;
use std::sync::Arc;

use crate::ty::Ty;
use crate::value::{Thrown, Value};

/// Host implementation of a method: receiver (absent for statics) and
/// evaluated arguments.
pub type MethodFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> + Send + Sync;

/// Host implementation of a constructor.
pub type CtorFn = dyn Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync;

/// How a method call is dispatched.
#[derive(Clone)]
pub enum MethodBody {
    /// Call the host function directly.
    Host(Arc<MethodFn>),
    /// Dispatch by name through `HostObject::invoke` on the receiver.
    Virtual,
}

/// A method descriptor.
pub struct MethodDef {
    pub name: Arc<str>,
    pub declaring: Ty,
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub is_static: bool,
    pub body: MethodBody,
}

pub type MethodRef = Arc<MethodDef>;

impl MethodDef {
    /// A static method with a host body.
    pub fn static_method(
        name: &str,
        declaring: Ty,
        params: Vec<Ty>,
        ret: Ty,
        body: impl Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> MethodRef {
        Arc::new(MethodDef {
            name: name.into(),
            declaring,
            params,
            ret,
            is_static: true,
            body: MethodBody::Host(Arc::new(move |_, args| body(args))),
        })
    }

    /// An instance method with a host body receiving the receiver.
    pub fn instance_method(
        name: &str,
        declaring: Ty,
        params: Vec<Ty>,
        ret: Ty,
        body: impl Fn(&Value, &[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> MethodRef {
        Arc::new(MethodDef {
            name: name.into(),
            declaring,
            params,
            ret,
            is_static: false,
            body: MethodBody::Host(Arc::new(move |this, args| match this {
                Some(this) => body(this, args),
                None => Err(Thrown::new(
                    crate::builtins::null_reference(),
                    "instance method called without a receiver",
                )),
            })),
        })
    }

    /// An instance method dispatched on the receiver's `HostObject`.
    pub fn virtual_method(name: &str, declaring: Ty, params: Vec<Ty>, ret: Ty) -> MethodRef {
        Arc::new(MethodDef {
            name: name.into(),
            declaring,
            params,
            ret,
            is_static: false,
            body: MethodBody::Virtual,
        })
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// A constructor descriptor.
pub struct CtorDef {
    pub declaring: Ty,
    pub params: Vec<Ty>,
    pub body: Arc<CtorFn>,
}

pub type CtorRef = Arc<CtorDef>;

impl CtorDef {
    pub fn new(
        declaring: Ty,
        params: Vec<Ty>,
        body: impl Fn(&[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> CtorRef {
        Arc::new(CtorDef {
            declaring,
            params,
            body: Arc::new(body),
        })
    }
}

impl fmt::Debug for CtorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new {}/{}", self.declaring, self.params.len())
    }
}

/// Whether a member is a plain field or a computed property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
}

/// A field or property descriptor. Reads go through `HostObject::get`.
#[derive(Debug)]
pub struct MemberDef {
    pub name: Arc<str>,
    pub declaring: Ty,
    pub ty: Ty,
    pub kind: MemberKind,
}

pub type MemberRef = Arc<MemberDef>;

impl MemberDef {
    pub fn field(name: &str, declaring: Ty, ty: Ty) -> MemberRef {
        Arc::new(MemberDef {
            name: name.into(),
            declaring,
            ty,
            kind: MemberKind::Field,
        })
    }

    pub fn property(name: &str, declaring: Ty, ty: Ty) -> MemberRef {
        Arc::new(MemberDef {
            name: name.into(),
            declaring,
            ty,
            kind: MemberKind::Property,
        })
    }
}
