//! Semantic types carried by every tree node.
//!
//! `Ty` is the static type a node evaluates to. It is deliberately small:
//! primitives, a root `Object`, nominal classes with single inheritance plus
//! interfaces, and a handful of constructed types (`Array`, `Task`, `Func`).
//!
//! `Fragment(T)` is the type of a captured Node wrapper. It never appears in a
//! normalized tree; the call normalizer unwraps every conversion out of it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Nominal class or interface description.
///
/// Two class types are equal when their names are equal, so a `ClassType`
/// can be rebuilt on demand instead of being stored in a global registry.
#[derive(Clone, Debug)]
pub struct ClassType {
    name: Arc<str>,
    base: Option<Ty>,
    interfaces: Vec<Ty>,
    is_interface: bool,
}

impl ClassType {
    /// A class deriving directly from `Object`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        ClassType {
            name: name.into(),
            base: None,
            interfaces: Vec::new(),
            is_interface: false,
        }
    }

    /// An interface type.
    pub fn interface(name: impl Into<Arc<str>>) -> Self {
        ClassType {
            is_interface: true,
            ..ClassType::new(name)
        }
    }

    /// Set the base class.
    #[must_use]
    pub fn extends(mut self, base: Ty) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: Ty) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&Ty> {
        self.base.as_ref()
    }

    pub fn interfaces(&self) -> &[Ty] {
        &self.interfaces
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Whether `other` names this class or one of its ancestors.
    fn derives_from(&self, other: &ClassType) -> bool {
        if self.name == other.name {
            return true;
        }
        let via_base = self
            .base
            .as_ref()
            .is_some_and(|base| matches!(base, Ty::Class(c) if c.derives_from(other)));
        via_base
            || self
                .interfaces
                .iter()
                .any(|i| matches!(i, Ty::Class(c) if c.derives_from(other)))
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassType {}

impl Hash for ClassType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Signature of a callable value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FuncSig {
    pub params: Vec<Ty>,
    pub ret: Ty,
}

/// The semantic type of a node or value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Void,
    Bool,
    Int,
    Float,
    Str,
    /// Root of every non-void type.
    Object,
    Class(Arc<ClassType>),
    Array(Box<Ty>),
    /// An awaitable producing a value of the inner type.
    Task(Box<Ty>),
    Func(Arc<FuncSig>),
    /// A captured Node wrapper evaluating to the inner type.
    Fragment(Box<Ty>),
}

impl Ty {
    pub fn class(class: ClassType) -> Self {
        Ty::Class(Arc::new(class))
    }

    pub fn array(elem: Ty) -> Self {
        Ty::Array(Box::new(elem))
    }

    pub fn task(result: Ty) -> Self {
        Ty::Task(Box::new(result))
    }

    pub fn func(params: Vec<Ty>, ret: Ty) -> Self {
        Ty::Func(Arc::new(FuncSig { params, ret }))
    }

    pub fn fragment(inner: Ty) -> Self {
        Ty::Fragment(Box::new(inner))
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    #[inline]
    pub fn is_fragment(&self) -> bool {
        matches!(self, Ty::Fragment(_))
    }

    /// Whether `null` is a valid value of this type.
    pub fn is_nullable(&self) -> bool {
        !matches!(self, Ty::Void | Ty::Bool | Ty::Int | Ty::Float)
    }

    /// Whether a value of type `src` can be stored where `self` is expected
    /// without a conversion.
    pub fn is_assignable_from(&self, src: &Ty) -> bool {
        if self == src {
            return true;
        }
        match (self, src) {
            (Ty::Object, other) => !other.is_void(),
            (Ty::Class(target), Ty::Class(source)) => source.derives_from(target),
            _ => false,
        }
    }

    /// The awaited result type for `Task(T)`.
    pub fn task_result(&self) -> Option<&Ty> {
        match self {
            Ty::Task(inner) => Some(inner),
            _ => None,
        }
    }

    /// Return type of a callable type.
    pub fn func_sig(&self) -> Option<&FuncSig> {
        match self {
            Ty::Func(sig) => Some(sig),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Void => write!(f, "void"),
            Ty::Bool => write!(f, "bool"),
            Ty::Int => write!(f, "int"),
            Ty::Float => write!(f, "float"),
            Ty::Str => write!(f, "string"),
            Ty::Object => write!(f, "object"),
            Ty::Class(class) => write!(f, "{}", class.name()),
            Ty::Array(elem) => write!(f, "{elem}[]"),
            Ty::Task(inner) => write!(f, "Task<{inner}>"),
            Ty::Func(sig) => {
                write!(f, "Func<")?;
                for param in &sig.params {
                    write!(f, "{param}, ")?;
                }
                write!(f, "{}>", sig.ret)
            }
            Ty::Fragment(inner) => write!(f, "Node<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests;
