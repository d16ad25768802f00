//! Evaluation errors.
//!
//! `EvalErrorKind` is the structured category; `EvalError` pairs it with
//! the rendered message and, for unhandled exceptions, the thrown value.
//! Factory functions are the public way to build errors.
//!
//! Exceptions raised by trees or host code are not errors while they can
//! still be caught; they only become an `EvalError` (`Unhandled`) when they
//! escape the outermost compiled lambda.

use std::fmt;

use xtree_ir::{Thrown, Value};

/// Structured error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A parameter was read or assigned outside any scope declaring it.
    UnboundParameter { name: String },
    TypeMismatch { expected: String, got: String },
    NotCallable { type_name: String },
    NotAwaitable { type_name: String },
    ArityMismatch { expected: usize, got: usize },
    /// A jump left the lambda without reaching its label.
    UnresolvedLabel { label: String },
    StackOverflow { depth: usize },
    Unsupported { feature: String },
    /// An exception escaped the evaluated tree.
    Unhandled { description: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundParameter { name } => write!(f, "parameter '{name}' is not bound"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::NotAwaitable { type_name } => write!(f, "{type_name} is not awaitable"),
            Self::ArityMismatch { expected, got } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "expected {expected} {arg_word}, got {got}")
            }
            Self::UnresolvedLabel { label } => {
                write!(f, "jump to label '{label}' left its lambda")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }
            Self::Unsupported { feature } => write!(f, "unsupported: {feature}"),
            Self::Unhandled { description } => write!(f, "unhandled exception: {description}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// For `Unhandled`, the exception value that escaped.
    pub exception: Option<Value>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            exception: None,
        }
    }

    /// The escaped exception, if this error is an unhandled throw.
    pub fn exception(&self) -> Option<&Value> {
        self.exception.as_ref()
    }

    /// The escaped exception's `message`, if it has one.
    pub fn exception_message(&self) -> Option<String> {
        let value = self.exception.clone()?;
        Thrown(value).message().map(|m| m.to_string())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult = Result<Value, EvalError>;

#[cold]
pub fn unbound_parameter(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundParameter {
        name: name.to_owned(),
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_owned(),
        got: got.to_owned(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_owned(),
    })
}

#[cold]
pub fn not_awaitable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAwaitable {
        type_name: type_name.to_owned(),
    })
}

#[cold]
pub fn arity_mismatch(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch { expected, got })
}

#[cold]
pub fn unresolved_label(label: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnresolvedLabel {
        label: label.to_owned(),
    })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

#[cold]
pub fn unsupported(feature: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Unsupported {
        feature: feature.to_owned(),
    })
}

/// An exception escaped evaluation.
#[cold]
pub fn unhandled(exception: Value) -> EvalError {
    let description = Thrown(exception.clone()).to_string();
    let mut error = EvalError::from_kind(EvalErrorKind::Unhandled { description });
    error.exception = Some(exception);
    error
}
