//! Tree nodes.
//!
//! An [`Expr`] is a shared, immutable node: cloning is a reference-count bump
//! and a rewrite allocates only the spine that actually changed. Every node
//! carries the [`Ty`] it evaluates to, fixed at construction.
//!
//! Constructors are associated functions on `Expr` and never fail; shape and
//! type validation is the builders' job (see `xtree_build`) and evaluation
//! time checks are the evaluator's.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::handles::{CtorRef, MemberRef, MethodRef};
use crate::ty::Ty;
use crate::value::Value;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

fn fresh_id() -> u32 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Process-unique identity of a parameter or variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u32);

impl ParamId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
struct ParamData {
    id: ParamId,
    name: Option<Arc<str>>,
    ty: Ty,
}

/// A lambda parameter, block variable or catch variable.
///
/// Identity is the [`ParamId`]: two parameters with the same name and type
/// are still different variables.
#[derive(Clone, Debug)]
pub struct Param(Arc<ParamData>);

impl Param {
    pub fn new(ty: Ty, name: Option<&str>) -> Self {
        Param(Arc::new(ParamData {
            id: ParamId(fresh_id()),
            name: name.map(Into::into),
            ty,
        }))
    }

    pub fn named(ty: Ty, name: &str) -> Self {
        Param::new(ty, Some(name))
    }

    pub fn anonymous(ty: Ty) -> Self {
        Param::new(ty, None)
    }

    #[inline]
    pub fn id(&self) -> ParamId {
        self.0.id
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    #[inline]
    pub fn ty(&self) -> &Ty {
        &self.0.ty
    }

    /// Name used in printed trees; anonymous parameters get `$p<id>`.
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_owned(),
            None => format!("$p{}", self.0.id.0),
        }
    }

    /// A reference to this parameter as a node.
    pub fn to_expr(&self) -> Expr {
        Expr::parameter(self.clone())
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Param {}

impl std::hash::Hash for Param {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

#[derive(Debug)]
struct LabelData {
    id: u32,
    name: Option<Arc<str>>,
    ty: Ty,
}

/// Target of a jump. The type is the type of the value carried by jumps to
/// it (`void` for plain `break`/`goto`).
#[derive(Clone, Debug)]
pub struct LabelTarget(Arc<LabelData>);

impl LabelTarget {
    pub fn new(ty: Ty, name: Option<&str>) -> Self {
        LabelTarget(Arc::new(LabelData {
            id: fresh_id(),
            name: name.map(Into::into),
            ty,
        }))
    }

    #[inline]
    pub fn ty(&self) -> &Ty {
        &self.0.ty
    }

    pub fn display_name(&self) -> String {
        match &self.0.name {
            Some(name) => format!("{name}#{}", self.0.id),
            None => format!("L{}", self.0.id),
        }
    }
}

impl PartialEq for LabelTarget {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for LabelTarget {}

/// One `case` arm of a switch.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub tests: Vec<Expr>,
    pub body: Expr,
}

/// One `catch` clause of a try.
#[derive(Clone, Debug)]
pub struct CatchClause {
    /// Exception class the clause handles (subclasses included).
    pub exception_ty: Ty,
    pub variable: Option<Param>,
    /// Evaluated with `variable` bound; the clause fires only when true.
    pub filter: Option<Expr>,
    pub body: Expr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConvertKind {
    /// Unconditional conversion; throws `InvalidCastException` on failure.
    Cast,
    /// Reference conversion yielding `null` on failure.
    TypeAs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAlso,
    OrElse,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::AndAlso => "&&",
            BinaryOp::OrElse => "||",
        }
    }

    /// Whether the operator yields `bool` regardless of operand type.
    pub fn is_predicate(self) -> bool {
        !matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GotoKind {
    Return,
    Break,
    Continue,
    Goto,
}

/// Node shapes.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// No-op; `default(void)`.
    Empty,
    Constant(Value),
    Parameter(Param),
    Block {
        variables: Vec<Param>,
        body: Vec<Expr>,
    },
    Conditional {
        test: Expr,
        if_true: Expr,
        /// `Empty` for a one-armed conditional.
        if_false: Expr,
    },
    Switch {
        value: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Expr>,
        comparer: Option<MethodRef>,
    },
    Try {
        body: Expr,
        handlers: Vec<CatchClause>,
        finally: Option<Expr>,
    },
    /// `None` rethrows the exception being handled.
    Throw(Option<Expr>),
    Call {
        receiver: Option<Expr>,
        method: MethodRef,
        args: Vec<Expr>,
    },
    New {
        ctor: CtorRef,
        args: Vec<Expr>,
    },
    /// Call of a callable value.
    Invoke {
        target: Expr,
        args: Vec<Expr>,
    },
    Member {
        target: Option<Expr>,
        member: MemberRef,
    },
    /// Conversion to the node's own type.
    Convert {
        kind: ConvertKind,
        operand: Expr,
    },
    TypeIs {
        operand: Expr,
        test_ty: Ty,
    },
    Unary {
        op: UnaryOp,
        operand: Expr,
    },
    Binary {
        op: BinaryOp,
        left: Expr,
        right: Expr,
    },
    Assign {
        target: Param,
        value: Expr,
    },
    Lambda {
        params: Vec<Param>,
        body: Expr,
    },
    Await(Expr),
    NewArray {
        elem: Ty,
        items: Vec<Expr>,
    },
    Goto {
        kind: GotoKind,
        target: LabelTarget,
        value: Option<Expr>,
    },
    Label {
        target: LabelTarget,
        default: Option<Expr>,
    },
    Loop {
        body: Expr,
        break_label: Option<LabelTarget>,
        continue_label: Option<LabelTarget>,
    },
}

struct ExprNode {
    kind: ExprKind,
    ty: Ty,
}

/// A shared tree node.
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    /// Build a node from its parts. Prefer the shape-specific constructors.
    pub fn from_parts(kind: ExprKind, ty: Ty) -> Self {
        Expr(Arc::new(ExprNode { kind, ty }))
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    #[inline]
    pub fn ty(&self) -> &Ty {
        &self.0.ty
    }

    /// Node identity.
    #[inline]
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_parameter(&self) -> Option<&Param> {
        match self.kind() {
            ExprKind::Parameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self.kind() {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    // Leaves

    pub fn empty() -> Self {
        Expr::from_parts(ExprKind::Empty, Ty::Void)
    }

    /// A constant typed by the value's runtime type (`object` for `null`).
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.runtime_ty().unwrap_or(Ty::Object);
        Expr::from_parts(ExprKind::Constant(value), ty)
    }

    pub fn typed_constant(value: Value, ty: Ty) -> Self {
        Expr::from_parts(ExprKind::Constant(value), ty)
    }

    /// `default(T)` for reference types.
    pub fn null(ty: Ty) -> Self {
        Expr::typed_constant(Value::Null, ty)
    }

    /// `default(T)`: zero for numbers, `false`, `null` otherwise.
    pub fn default_of(ty: Ty) -> Self {
        let value = match &ty {
            Ty::Void => return Expr::empty(),
            Ty::Bool => Value::Bool(false),
            Ty::Int => Value::Int(0),
            Ty::Float => Value::Float(0.0),
            _ => Value::Null,
        };
        Expr::typed_constant(value, ty)
    }

    pub fn parameter(param: Param) -> Self {
        let ty = param.ty().clone();
        Expr::from_parts(ExprKind::Parameter(param), ty)
    }

    // Control flow

    /// A block typed by its last statement. An empty body holds `Empty`.
    pub fn block(variables: Vec<Param>, body: Vec<Expr>) -> Self {
        let ty = body.last().map_or(Ty::Void, |last| last.ty().clone());
        Expr::typed_block(ty, variables, body)
    }

    pub fn typed_block(ty: Ty, variables: Vec<Param>, mut body: Vec<Expr>) -> Self {
        if body.is_empty() {
            body.push(Expr::empty());
        }
        Expr::from_parts(ExprKind::Block { variables, body }, ty)
    }

    pub fn if_then(test: Expr, if_true: Expr) -> Self {
        Expr::condition(test, if_true, Expr::empty(), Ty::Void)
    }

    pub fn if_then_else(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::condition(test, if_true, if_false, Ty::Void)
    }

    pub fn condition(test: Expr, if_true: Expr, if_false: Expr, ty: Ty) -> Self {
        Expr::from_parts(
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            },
            ty,
        )
    }

    pub fn switch(
        ty: Ty,
        value: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Expr>,
        comparer: Option<MethodRef>,
    ) -> Self {
        Expr::from_parts(
            ExprKind::Switch {
                value,
                cases,
                default,
                comparer,
            },
            ty,
        )
    }

    pub fn try_catch_finally(
        ty: Ty,
        body: Expr,
        handlers: Vec<CatchClause>,
        finally: Option<Expr>,
    ) -> Self {
        Expr::from_parts(
            ExprKind::Try {
                body,
                handlers,
                finally,
            },
            ty,
        )
    }

    pub fn throw(value: Expr) -> Self {
        Expr::from_parts(ExprKind::Throw(Some(value)), Ty::Void)
    }

    pub fn rethrow() -> Self {
        Expr::from_parts(ExprKind::Throw(None), Ty::Void)
    }

    pub fn return_(target: &LabelTarget, value: Option<Expr>) -> Self {
        Expr::jump(GotoKind::Return, target, value)
    }

    pub fn break_(target: &LabelTarget) -> Self {
        Expr::jump(GotoKind::Break, target, None)
    }

    pub fn continue_(target: &LabelTarget) -> Self {
        Expr::jump(GotoKind::Continue, target, None)
    }

    pub fn goto(target: &LabelTarget) -> Self {
        Expr::jump(GotoKind::Goto, target, None)
    }

    fn jump(kind: GotoKind, target: &LabelTarget, value: Option<Expr>) -> Self {
        Expr::from_parts(
            ExprKind::Goto {
                kind,
                target: target.clone(),
                value,
            },
            Ty::Void,
        )
    }

    /// A label statement; `default` is its value when reached by falling
    /// through.
    pub fn label(target: &LabelTarget, default: Option<Expr>) -> Self {
        Expr::from_parts(
            ExprKind::Label {
                target: target.clone(),
                default,
            },
            target.ty().clone(),
        )
    }

    pub fn loop_(
        body: Expr,
        break_label: Option<LabelTarget>,
        continue_label: Option<LabelTarget>,
    ) -> Self {
        let ty = break_label
            .as_ref()
            .map_or(Ty::Void, |label| label.ty().clone());
        Expr::from_parts(
            ExprKind::Loop {
                body,
                break_label,
                continue_label,
            },
            ty,
        )
    }

    // Calls and members

    pub fn call(receiver: Option<Expr>, method: MethodRef, args: Vec<Expr>) -> Self {
        let ty = method.ret.clone();
        Expr::from_parts(
            ExprKind::Call {
                receiver,
                method,
                args,
            },
            ty,
        )
    }

    pub fn construct(ctor: CtorRef, args: Vec<Expr>) -> Self {
        let ty = ctor.declaring.clone();
        Expr::from_parts(ExprKind::New { ctor, args }, ty)
    }

    pub fn invoke(target: Expr, args: Vec<Expr>) -> Self {
        let ty = target
            .ty()
            .func_sig()
            .map_or(Ty::Object, |sig| sig.ret.clone());
        Expr::from_parts(ExprKind::Invoke { target, args }, ty)
    }

    pub fn member(target: Option<Expr>, member: MemberRef) -> Self {
        let ty = member.ty.clone();
        Expr::from_parts(ExprKind::Member { target, member }, ty)
    }

    // Conversions and operators

    pub fn convert(operand: Expr, ty: Ty) -> Self {
        Expr::from_parts(
            ExprKind::Convert {
                kind: ConvertKind::Cast,
                operand,
            },
            ty,
        )
    }

    pub fn type_as(operand: Expr, ty: Ty) -> Self {
        Expr::from_parts(
            ExprKind::Convert {
                kind: ConvertKind::TypeAs,
                operand,
            },
            ty,
        )
    }

    pub fn type_is(operand: Expr, test_ty: Ty) -> Self {
        Expr::from_parts(ExprKind::TypeIs { operand, test_ty }, Ty::Bool)
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let ty = match op {
            UnaryOp::Not => Ty::Bool,
            UnaryOp::Negate => operand.ty().clone(),
        };
        Expr::from_parts(ExprKind::Unary { op, operand }, ty)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let ty = if op.is_predicate() {
            Ty::Bool
        } else {
            left.ty().clone()
        };
        Expr::from_parts(ExprKind::Binary { op, left, right }, ty)
    }

    pub fn assign(target: Param, value: Expr) -> Self {
        let ty = target.ty().clone();
        Expr::from_parts(ExprKind::Assign { target, value }, ty)
    }

    // Functions

    /// A lambda returning its body's type.
    pub fn lambda(params: Vec<Param>, body: Expr) -> Self {
        let ret = body.ty().clone();
        Expr::typed_lambda(params, body, ret)
    }

    pub fn typed_lambda(params: Vec<Param>, body: Expr, ret: Ty) -> Self {
        let ty = Ty::func(params.iter().map(|p| p.ty().clone()).collect(), ret);
        Expr::from_parts(ExprKind::Lambda { params, body }, ty)
    }

    pub fn await_(task: Expr) -> Self {
        let ty = task.ty().task_result().cloned().unwrap_or(Ty::Object);
        Expr::from_parts(ExprKind::Await(task), ty)
    }

    pub fn new_array(elem: Ty, items: Vec<Expr>) -> Self {
        let ty = Ty::array(elem.clone());
        Expr::from_parts(ExprKind::NewArray { elem, items }, ty)
    }
}

impl ExprKind {
    /// Call `f` on every direct child node, in evaluation order.
    pub fn for_each_child(&self, mut f: impl FnMut(&Expr)) {
        match self {
            ExprKind::Empty | ExprKind::Constant(_) | ExprKind::Parameter(_) => {}
            ExprKind::Block { body, .. } => body.iter().for_each(f),
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => {
                f(test);
                f(if_true);
                f(if_false);
            }
            ExprKind::Switch {
                value,
                cases,
                default,
                ..
            } => {
                f(value);
                for case in cases {
                    case.tests.iter().for_each(&mut f);
                    f(&case.body);
                }
                default.iter().for_each(f);
            }
            ExprKind::Try {
                body,
                handlers,
                finally,
            } => {
                f(body);
                for handler in handlers {
                    handler.filter.iter().for_each(&mut f);
                    f(&handler.body);
                }
                finally.iter().for_each(f);
            }
            ExprKind::Throw(value) => value.iter().for_each(f),
            ExprKind::Call { receiver, args, .. } => {
                receiver.iter().for_each(&mut f);
                args.iter().for_each(f);
            }
            ExprKind::New { args, .. } | ExprKind::NewArray { items: args, .. } => {
                args.iter().for_each(f);
            }
            ExprKind::Invoke { target, args } => {
                f(target);
                args.iter().for_each(f);
            }
            ExprKind::Member { target, .. } => target.iter().for_each(f),
            ExprKind::Convert { operand, .. }
            | ExprKind::TypeIs { operand, .. }
            | ExprKind::Unary { operand, .. }
            | ExprKind::Await(operand) => f(operand),
            ExprKind::Binary { left, right, .. } => {
                f(left);
                f(right);
            }
            ExprKind::Assign { value, .. } => f(value),
            ExprKind::Lambda { body, .. } | ExprKind::Loop { body, .. } => f(body),
            ExprKind::Goto { value, .. } => value.iter().for_each(f),
            ExprKind::Label { default, .. } => default.iter().for_each(f),
        }
    }

    /// Rebuild with every direct child mapped through `f`.
    ///
    /// Returns `None` when `f` returned every child unchanged (by identity),
    /// so callers can keep the original node.
    pub fn map_children(&self, f: &mut dyn FnMut(&Expr) -> Expr) -> Option<ExprKind> {
        let mut m = ChildMapper { f, changed: false };
        let kind = match self {
            ExprKind::Empty | ExprKind::Constant(_) | ExprKind::Parameter(_) => return None,
            ExprKind::Block { variables, body } => ExprKind::Block {
                variables: variables.clone(),
                body: m.all(body),
            },
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => ExprKind::Conditional {
                test: m.one(test),
                if_true: m.one(if_true),
                if_false: m.one(if_false),
            },
            ExprKind::Switch {
                value,
                cases,
                default,
                comparer,
            } => ExprKind::Switch {
                value: m.one(value),
                cases: cases
                    .iter()
                    .map(|case| SwitchCase {
                        tests: m.all(&case.tests),
                        body: m.one(&case.body),
                    })
                    .collect(),
                default: m.opt(default.as_ref()),
                comparer: comparer.clone(),
            },
            ExprKind::Try {
                body,
                handlers,
                finally,
            } => ExprKind::Try {
                body: m.one(body),
                handlers: handlers
                    .iter()
                    .map(|h| CatchClause {
                        exception_ty: h.exception_ty.clone(),
                        variable: h.variable.clone(),
                        filter: m.opt(h.filter.as_ref()),
                        body: m.one(&h.body),
                    })
                    .collect(),
                finally: m.opt(finally.as_ref()),
            },
            ExprKind::Throw(value) => ExprKind::Throw(m.opt(value.as_ref())),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => ExprKind::Call {
                receiver: m.opt(receiver.as_ref()),
                method: method.clone(),
                args: m.all(args),
            },
            ExprKind::New { ctor, args } => ExprKind::New {
                ctor: ctor.clone(),
                args: m.all(args),
            },
            ExprKind::Invoke { target, args } => ExprKind::Invoke {
                target: m.one(target),
                args: m.all(args),
            },
            ExprKind::Member { target, member } => ExprKind::Member {
                target: m.opt(target.as_ref()),
                member: member.clone(),
            },
            ExprKind::Convert { kind, operand } => ExprKind::Convert {
                kind: *kind,
                operand: m.one(operand),
            },
            ExprKind::TypeIs { operand, test_ty } => ExprKind::TypeIs {
                operand: m.one(operand),
                test_ty: test_ty.clone(),
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op: *op,
                operand: m.one(operand),
            },
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op: *op,
                left: m.one(left),
                right: m.one(right),
            },
            ExprKind::Assign { target, value } => ExprKind::Assign {
                target: target.clone(),
                value: m.one(value),
            },
            ExprKind::Lambda { params, body } => ExprKind::Lambda {
                params: params.clone(),
                body: m.one(body),
            },
            ExprKind::Await(task) => ExprKind::Await(m.one(task)),
            ExprKind::NewArray { elem, items } => ExprKind::NewArray {
                elem: elem.clone(),
                items: m.all(items),
            },
            ExprKind::Goto {
                kind,
                target,
                value,
            } => ExprKind::Goto {
                kind: *kind,
                target: target.clone(),
                value: m.opt(value.as_ref()),
            },
            ExprKind::Label { target, default } => ExprKind::Label {
                target: target.clone(),
                default: m.opt(default.as_ref()),
            },
            ExprKind::Loop {
                body,
                break_label,
                continue_label,
            } => ExprKind::Loop {
                body: m.one(body),
                break_label: break_label.clone(),
                continue_label: continue_label.clone(),
            },
        };
        m.changed.then_some(kind)
    }
}

struct ChildMapper<'f> {
    f: &'f mut dyn FnMut(&Expr) -> Expr,
    changed: bool,
}

impl ChildMapper<'_> {
    fn one(&mut self, child: &Expr) -> Expr {
        let mapped = (self.f)(child);
        if !mapped.ptr_eq(child) {
            self.changed = true;
        }
        mapped
    }

    fn opt(&mut self, child: Option<&Expr>) -> Option<Expr> {
        child.map(|c| self.one(c))
    }

    fn all(&mut self, children: &[Expr]) -> Vec<Expr> {
        children.iter().map(|c| self.one(c)).collect()
    }
}

impl AsRef<Expr> for Expr {
    fn as_ref(&self) -> &Expr {
        self
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests;
