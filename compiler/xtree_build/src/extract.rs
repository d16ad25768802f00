//! Closure normalization.
//!
//! Builders accept *closure bodies* wherever a plain node would do: a lambda
//! whose body describes a call, a construction or an invocation in terms of
//! captured values (see [`crate::capture`]). [`Extractor::process_call`]
//! turns such a body into the node it describes:
//!
//! - `new C(args)` keeps its constructor and normalizes every argument;
//! - `recv.M(args)` binds the closure parameter to the supplied instance,
//!   normalizes the arguments, drops the receiver of static methods and
//!   converts the receiver to the declaring type when its static type is a
//!   different one;
//! - `f(args)` keeps the invoked target and normalizes the arguments;
//! - anything else is normalized as a whole.
//!
//! Normalizing a node (the `Rewriter` impl) resolves what is already known
//! at build time:
//!
//! - nested calls with no free parameters and no captured nodes are
//!   evaluated now, and their result replaces them;
//! - field reads on a captured record are replaced by the captured value;
//!   a captured node is spliced in as-is;
//! - conversions from or to the node wrapper type are removed;
//! - parameterless lambdas are flattened into the call they describe.
//!
//! Shapes that cannot be resolved are kept unchanged.

use xtree_ir::visitor::{rewrite_children, walk_expr};
use xtree_ir::{
    free_parameters, Expr, ExprKind, MemberKind, Rewriter, Ty, Value, Visitor,
};

use crate::error::{not_a_field, not_a_member, not_a_property, BuildResult};
use crate::replace::ParameterReplacer;

/// Normalization switches. The defaults resolve everything that can be
/// resolved at build time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Evaluate closed nested calls at build time.
    pub fold_closed_calls: bool,
    /// Replace parameterless lambdas by the call they describe.
    pub flatten_thunks: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            fold_closed_calls: true,
            flatten_thunks: true,
        }
    }
}

/// Which kind of member a member closure must describe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberAccess {
    Property,
    Field,
    Any,
}

/// The closure-normalizing rewriter.
#[derive(Clone, Debug, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Extractor { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Normalize a closure: its body when it is a lambda, the node itself
    /// otherwise.
    pub fn process_closure(&mut self, closure: &Expr, instance: Option<&Expr>) -> Expr {
        match closure.kind() {
            ExprKind::Lambda { body, .. } => self.process_call(body, instance),
            _ => self.process_call(closure, instance),
        }
    }

    /// Normalize a closure body, binding its parameter to `instance`.
    pub fn process_call(&mut self, body: &Expr, instance: Option<&Expr>) -> Expr {
        let mut replacer = ParameterReplacer::new(instance.cloned());
        match body.kind() {
            ExprKind::New { ctor, args } => {
                tracing::trace!(ty = %ctor.declaring, "normalizing construction");
                Expr::construct(ctor.clone(), self.extract_all(args))
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                tracing::trace!(method = %method.name, "normalizing call");
                let receiver = match (receiver, instance) {
                    (Some(receiver), Some(_)) => Some(replacer.replace(receiver)),
                    (Some(receiver), None) => Some(self.extract(receiver)),
                    (None, _) => None,
                };
                let args = args
                    .iter()
                    .map(|arg| {
                        let bound = replacer.replace(arg);
                        self.extract(&bound)
                    })
                    .collect();
                let receiver = if method.is_static {
                    None
                } else {
                    receiver.map(|receiver| upcast(receiver, &method.declaring))
                };
                Expr::call(receiver, method.clone(), args)
            }
            ExprKind::Invoke { target, args } => {
                tracing::trace!("normalizing invocation");
                Expr::from_parts(
                    ExprKind::Invoke {
                        target: target.clone(),
                        args: self.extract_all(args),
                    },
                    body.ty().clone(),
                )
            }
            _ => {
                let extracted = self.extract(body);
                replacer.replace(&extracted)
            }
        }
    }

    /// Normalize one node.
    pub fn extract(&mut self, expr: &Expr) -> Expr {
        self.rewrite_expr(expr)
    }

    fn extract_all(&mut self, exprs: &[Expr]) -> Vec<Expr> {
        exprs.iter().map(|expr| self.extract(expr)).collect()
    }

    /// Normalize a closure describing `instance.member`.
    pub fn process_member_closure(
        &mut self,
        instance: &Expr,
        closure: &Expr,
        access: MemberAccess,
    ) -> BuildResult<Expr> {
        let body = match closure.kind() {
            ExprKind::Lambda { body, .. } => body,
            _ => closure,
        };
        let ExprKind::Member { member, .. } = body.kind() else {
            return Err(not_a_member(closure));
        };
        match (access, member.kind) {
            (MemberAccess::Property, MemberKind::Field) => return Err(not_a_property(closure)),
            (MemberAccess::Field, MemberKind::Property) => return Err(not_a_field(closure)),
            _ => {}
        }
        let extracted = self.extract(body);
        Ok(ParameterReplacer::new([instance.clone()]).replace(&extracted))
    }

    /// Fold a closed call by evaluating it.
    fn fold(&mut self, call: &Expr) -> Option<Expr> {
        match xtree_eval::evaluate_closed(call) {
            Ok(Value::Fragment(fragment)) => {
                tracing::trace!("call produced a node; spliced");
                Some(fragment)
            }
            Ok(Value::Void) => Some(Expr::empty()),
            Ok(value) => {
                tracing::trace!(%value, "call folded");
                Some(Expr::typed_constant(value, call.ty().clone()))
            }
            Err(error) => {
                tracing::warn!(%error, call = %call, "constant folding failed; call kept");
                None
            }
        }
    }
}

impl Rewriter for Extractor {
    fn rewrite_call(&mut self, expr: &Expr) -> Expr {
        if self.options.fold_closed_calls && is_closed(expr) {
            if let Some(folded) = self.fold(expr) {
                return folded;
            }
        }
        rewrite_children(self, expr)
    }

    fn rewrite_member(&mut self, expr: &Expr) -> Expr {
        let ExprKind::Member {
            target: Some(target),
            member,
        } = expr.kind()
        else {
            return rewrite_children(self, expr);
        };
        let Some(Value::Object(record)) = target.as_constant() else {
            return rewrite_children(self, expr);
        };
        if member.kind != MemberKind::Field {
            return rewrite_children(self, expr);
        }
        let value = match record.get(&member.name) {
            Ok(value) => value,
            Err(thrown) => {
                tracing::trace!(member = %member.name, %thrown, "captured read failed; kept");
                return rewrite_children(self, expr);
            }
        };
        match value {
            Value::Fragment(fragment) => fragment,
            value if value.runtime_ty().as_ref() == Some(expr.ty()) => {
                Expr::typed_constant(value, expr.ty().clone())
            }
            value => {
                let converted = Expr::convert(Expr::constant(value), expr.ty().clone());
                self.rewrite_expr(&converted)
            }
        }
    }

    fn rewrite_convert(&mut self, expr: &Expr) -> Expr {
        let ExprKind::Convert { operand, .. } = expr.kind() else {
            return rewrite_children(self, expr);
        };
        if !operand.ty().is_fragment() {
            if expr.ty().is_fragment() {
                return self.rewrite_expr(operand);
            }
            return rewrite_children(self, expr);
        }
        let unwrapped = self.rewrite_expr(operand);
        if unwrapped.ty().is_void() || expr.ty().is_fragment() {
            return unwrapped;
        }
        tracing::trace!(ty = %expr.ty(), "node wrapper unwrapped");
        upcast(unwrapped, expr.ty())
    }

    fn rewrite_lambda(&mut self, expr: &Expr) -> Expr {
        match expr.kind() {
            ExprKind::Lambda { params, body } if self.options.flatten_thunks && params.is_empty() => {
                self.process_call(body, None)
            }
            _ => rewrite_children(self, expr),
        }
    }
}

/// `receiver` converted to `ty` unless it already has that type.
fn upcast(receiver: Expr, ty: &Ty) -> Expr {
    if receiver.ty() == ty {
        receiver
    } else {
        Expr::convert(receiver, ty.clone())
    }
}

/// Detects reads of captured nodes.
#[derive(Default)]
struct FragmentReads {
    found: bool,
}

impl Visitor for FragmentReads {
    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        if expr.ty().is_fragment() {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
    }
}

/// Whether `expr` can be evaluated at build time.
fn is_closed(expr: &Expr) -> bool {
    if !free_parameters(expr).is_empty() {
        return false;
    }
    let mut reads = FragmentReads::default();
    reads.visit_expr(expr);
    !reads.found
}

/// Normalize a closure body with default options.
pub fn process_call(body: &Expr, instance: Option<&Expr>) -> Expr {
    Extractor::default().process_call(body, instance)
}

/// Normalize a closure with default options.
pub fn process_closure(closure: &Expr, instance: Option<&Expr>) -> Expr {
    Extractor::default().process_closure(closure, instance)
}
