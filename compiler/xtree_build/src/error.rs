//! Construction-time errors.
//!
//! Every error a builder can report is a [`BuildErrorKind`]; [`BuildError`]
//! carries the kind together with its rendered message. Builders never panic
//! on bad input: fluent setters latch the first error and the finishing call
//! (`build`, `lambda`, ...) returns it.

use std::fmt;

use xtree_ir::Ty;

/// Structured category of a construction error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// A node that must be a parameter reference is something else.
    NotAParameter { node: String },
    /// A conditional was finished without a condition.
    ConditionNotDefined,
    /// A try was finished with neither catch clauses nor a finally body.
    NoCatchBlock,
    /// A try was finished without a body.
    MissingTryBody,
    ComparerNotStatic { method: String },
    ComparerArity { method: String, got: usize },
    ComparerParamType {
        method: String,
        expected: String,
        got: String,
    },
    /// A closure meant to describe a property access describes something
    /// else.
    NotAProperty { closure: String },
    NotAField { closure: String },
    NotAMember { closure: String },
    /// Untyped and typed cases were mixed on one switch.
    MixedSwitchResult,
    /// A case body of a typed switch does not produce the switch type.
    SwitchResultMismatch { expected: String, got: String },
    /// A conditional arm does not produce the conditional's result type.
    ConditionResultMismatch { expected: String, got: String },
    /// A constructor used for `new T()` takes parameters.
    NotParameterless { ty: String, params: usize },
}

impl fmt::Display for BuildErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAParameter { node } => write!(f, "`{node}` is not ParameterExpression"),
            Self::ConditionNotDefined => f.write_str("`if` statement is not defined"),
            Self::NoCatchBlock => f.write_str("No `catch` block provided"),
            Self::MissingTryBody => f.write_str("`try` body is not defined"),
            Self::ComparerNotStatic { method } => {
                write!(f, "comparer `{method}` should be static")
            }
            Self::ComparerArity { method, got } => {
                write!(f, "comparer `{method}` should accept two parameters, got {got}")
            }
            Self::ComparerParamType {
                method,
                expected,
                got,
            } => write!(
                f,
                "comparer `{method}` should accept parameters of type {expected}, got {got}"
            ),
            Self::NotAProperty { closure } => {
                write!(f, "expression '{closure}' does not refer to a property")
            }
            Self::NotAField { closure } => {
                write!(f, "expression '{closure}' does not refer to a field")
            }
            Self::NotAMember { closure } => {
                write!(f, "expression '{closure}' refers to a method, not a member")
            }
            Self::MixedSwitchResult => {
                f.write_str("switch mixes typed and untyped cases")
            }
            Self::SwitchResultMismatch { expected, got } => {
                write!(f, "switch case produces {got}, expected {expected}")
            }
            Self::ConditionResultMismatch { expected, got } => {
                write!(f, "conditional arm produces {got}, expected {expected}")
            }
            Self::NotParameterless { ty, params } => {
                write!(f, "constructor of {ty} takes {params} parameters, expected none")
            }
        }
    }
}

/// Construction error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub message: String,
}

impl BuildError {
    fn from_kind(kind: BuildErrorKind) -> Self {
        let message = kind.to_string();
        BuildError { kind, message }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BuildError {}

pub type BuildResult<T> = Result<T, BuildError>;

#[cold]
pub fn not_a_parameter(node: &xtree_ir::Expr) -> BuildError {
    BuildError::from_kind(BuildErrorKind::NotAParameter {
        node: node.to_string(),
    })
}

#[cold]
pub fn condition_not_defined() -> BuildError {
    BuildError::from_kind(BuildErrorKind::ConditionNotDefined)
}

#[cold]
pub fn no_catch_block() -> BuildError {
    BuildError::from_kind(BuildErrorKind::NoCatchBlock)
}

#[cold]
pub fn missing_try_body() -> BuildError {
    BuildError::from_kind(BuildErrorKind::MissingTryBody)
}

#[cold]
pub fn comparer_not_static(method: &str) -> BuildError {
    BuildError::from_kind(BuildErrorKind::ComparerNotStatic {
        method: method.to_owned(),
    })
}

#[cold]
pub fn comparer_arity(method: &str, got: usize) -> BuildError {
    BuildError::from_kind(BuildErrorKind::ComparerArity {
        method: method.to_owned(),
        got,
    })
}

#[cold]
pub fn comparer_param_type(method: &str, expected: &Ty, got: &Ty) -> BuildError {
    BuildError::from_kind(BuildErrorKind::ComparerParamType {
        method: method.to_owned(),
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn not_a_property(closure: &xtree_ir::Expr) -> BuildError {
    BuildError::from_kind(BuildErrorKind::NotAProperty {
        closure: closure.to_string(),
    })
}

#[cold]
pub fn not_a_field(closure: &xtree_ir::Expr) -> BuildError {
    BuildError::from_kind(BuildErrorKind::NotAField {
        closure: closure.to_string(),
    })
}

#[cold]
pub fn not_a_member(closure: &xtree_ir::Expr) -> BuildError {
    BuildError::from_kind(BuildErrorKind::NotAMember {
        closure: closure.to_string(),
    })
}

#[cold]
pub fn mixed_switch_result() -> BuildError {
    BuildError::from_kind(BuildErrorKind::MixedSwitchResult)
}

#[cold]
pub fn switch_result_mismatch(expected: &Ty, got: &Ty) -> BuildError {
    BuildError::from_kind(BuildErrorKind::SwitchResultMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn condition_result_mismatch(expected: &Ty, got: &Ty) -> BuildError {
    BuildError::from_kind(BuildErrorKind::ConditionResultMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn not_parameterless(ty: &Ty, params: usize) -> BuildError {
    BuildError::from_kind(BuildErrorKind::NotParameterless {
        ty: ty.to_string(),
        params,
    })
}
