//! Debug view of trees.
//!
//! Renders a tree as pseudo source. The output is for diagnostics and
//! test assertions only; it is not meant to be parsed back.
//!
//! Statement-like nodes (blocks, conditionals, switches, tries, loops) are
//! laid out over several lines with four-space indentation; everything else
//! prints inline.

use std::fmt::{self, Write};

use crate::expr::{ConvertKind, Expr, ExprKind, GotoKind, UnaryOp};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, indent: 0 }.expr(self)
    }
}

struct Printer<'a, W: Write> {
    out: &'a mut W,
    indent: usize,
}

fn is_statement_like(expr: &Expr) -> bool {
    match expr.kind() {
        ExprKind::Block { .. }
        | ExprKind::Switch { .. }
        | ExprKind::Try { .. }
        | ExprKind::Loop { .. }
        | ExprKind::Label { .. } => true,
        ExprKind::Conditional { .. } => expr.ty().is_void(),
        _ => false,
    }
}

impl<W: Write> Printer<'_, W> {
    fn newline(&mut self) -> fmt::Result {
        self.out.write_char('\n')?;
        for _ in 0..self.indent {
            self.out.write_str("    ")?;
        }
        Ok(())
    }

    fn list(&mut self, items: &[Expr]) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            self.expr(item)?;
        }
        Ok(())
    }

    /// A statement on its own line (the caller has already broken the line).
    fn statement(&mut self, stmt: &Expr) -> fmt::Result {
        self.expr(stmt)?;
        if !is_statement_like(stmt) {
            self.out.write_char(';')?;
        }
        Ok(())
    }

    /// A branch body: blocks print as-is, anything else as a one-statement
    /// block.
    fn body(&mut self, body: &Expr) -> fmt::Result {
        if matches!(body.kind(), ExprKind::Block { .. }) {
            return self.expr(body);
        }
        self.out.write_char('{')?;
        self.indent += 1;
        if !matches!(body.kind(), ExprKind::Empty) {
            self.newline()?;
            self.statement(body)?;
        }
        self.indent -= 1;
        self.newline()?;
        self.out.write_char('}')
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match expr.kind() {
            ExprKind::Empty => self.out.write_str("default(void)"),
            ExprKind::Constant(value) => write!(self.out, "{value}"),
            ExprKind::Parameter(param) => self.out.write_str(&param.display_name()),
            ExprKind::Block { variables, body } => {
                self.out.write_char('{')?;
                self.indent += 1;
                for var in variables {
                    self.newline()?;
                    write!(self.out, "var {}: {};", var.display_name(), var.ty())?;
                }
                for stmt in body {
                    if matches!(stmt.kind(), ExprKind::Empty) && body.len() == 1 {
                        continue;
                    }
                    self.newline()?;
                    self.statement(stmt)?;
                }
                self.indent -= 1;
                self.newline()?;
                self.out.write_char('}')
            }
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => {
                if !expr.ty().is_void() {
                    self.out.write_char('(')?;
                    self.expr(test)?;
                    self.out.write_str(" ? ")?;
                    self.expr(if_true)?;
                    self.out.write_str(" : ")?;
                    self.expr(if_false)?;
                    return self.out.write_char(')');
                }
                self.out.write_str("if (")?;
                self.expr(test)?;
                self.out.write_str(") ")?;
                self.body(if_true)?;
                if !matches!(if_false.kind(), ExprKind::Empty) {
                    self.out.write_str(" else ")?;
                    self.body(if_false)?;
                }
                Ok(())
            }
            ExprKind::Switch {
                value,
                cases,
                default,
                comparer,
            } => {
                self.out.write_str("switch (")?;
                self.expr(value)?;
                if let Some(cmp) = comparer {
                    write!(self.out, ", {}", cmp.name)?;
                }
                self.out.write_str(") {")?;
                self.indent += 1;
                for case in cases {
                    self.newline()?;
                    self.out.write_str("case ")?;
                    self.list(&case.tests)?;
                    self.out.write_str(": ")?;
                    self.body(&case.body)?;
                }
                if let Some(default) = default {
                    self.newline()?;
                    self.out.write_str("default: ")?;
                    self.body(default)?;
                }
                self.indent -= 1;
                self.newline()?;
                self.out.write_char('}')
            }
            ExprKind::Try {
                body,
                handlers,
                finally,
            } => {
                self.out.write_str("try ")?;
                self.body(body)?;
                for handler in handlers {
                    write!(self.out, " catch ({}", handler.exception_ty)?;
                    if let Some(var) = &handler.variable {
                        write!(self.out, " {}", var.display_name())?;
                    }
                    self.out.write_char(')')?;
                    if let Some(filter) = &handler.filter {
                        self.out.write_str(" when (")?;
                        self.expr(filter)?;
                        self.out.write_char(')')?;
                    }
                    self.out.write_char(' ')?;
                    self.body(&handler.body)?;
                }
                if let Some(finally) = finally {
                    self.out.write_str(" finally ")?;
                    self.body(finally)?;
                }
                Ok(())
            }
            ExprKind::Throw(None) => self.out.write_str("throw"),
            ExprKind::Throw(Some(value)) => {
                self.out.write_str("throw ")?;
                self.expr(value)
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                match receiver {
                    Some(receiver) => self.expr(receiver)?,
                    None => write!(self.out, "{}", method.declaring)?,
                }
                write!(self.out, ".{}(", method.name)?;
                self.list(args)?;
                self.out.write_char(')')
            }
            ExprKind::New { ctor, args } => {
                write!(self.out, "new {}(", ctor.declaring)?;
                self.list(args)?;
                self.out.write_char(')')
            }
            ExprKind::Invoke { target, args } => {
                self.out.write_str("Invoke(")?;
                self.expr(target)?;
                for arg in args {
                    self.out.write_str(", ")?;
                    self.expr(arg)?;
                }
                self.out.write_char(')')
            }
            ExprKind::Member { target, member } => {
                match target {
                    Some(target) => self.expr(target)?,
                    None => write!(self.out, "{}", member.declaring)?,
                }
                write!(self.out, ".{}", member.name)
            }
            ExprKind::Convert {
                kind: ConvertKind::Cast,
                operand,
            } => {
                write!(self.out, "({})", expr.ty())?;
                self.expr(operand)
            }
            ExprKind::Convert {
                kind: ConvertKind::TypeAs,
                operand,
            } => {
                self.out.write_char('(')?;
                self.expr(operand)?;
                write!(self.out, " as {})", expr.ty())
            }
            ExprKind::TypeIs { operand, test_ty } => {
                self.out.write_char('(')?;
                self.expr(operand)?;
                write!(self.out, " is {test_ty})")
            }
            ExprKind::Unary { op, operand } => {
                self.out.write_char(match op {
                    UnaryOp::Not => '!',
                    UnaryOp::Negate => '-',
                })?;
                self.expr(operand)
            }
            ExprKind::Binary { op, left, right } => {
                self.out.write_char('(')?;
                self.expr(left)?;
                write!(self.out, " {} ", op.symbol())?;
                self.expr(right)?;
                self.out.write_char(')')
            }
            ExprKind::Assign { target, value } => {
                write!(self.out, "{} = ", target.display_name())?;
                self.expr(value)
            }
            ExprKind::Lambda { params, body } => {
                self.out.write_char('(')?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.write_str(", ")?;
                    }
                    self.out.write_str(&param.display_name())?;
                }
                self.out.write_str(") => ")?;
                self.expr(body)
            }
            ExprKind::Await(task) => {
                self.out.write_str("await ")?;
                self.expr(task)
            }
            ExprKind::NewArray { elem, items } => {
                write!(self.out, "new {elem}[] {{")?;
                self.list(items)?;
                self.out.write_char('}')
            }
            ExprKind::Goto {
                kind,
                target,
                value,
            } => {
                let keyword = match kind {
                    GotoKind::Return => "return",
                    GotoKind::Break => "break",
                    GotoKind::Continue => "continue",
                    GotoKind::Goto => "goto",
                };
                write!(self.out, "{keyword} @{}", target.display_name())?;
                if let Some(value) = value {
                    self.out.write_char(' ')?;
                    self.expr(value)?;
                }
                Ok(())
            }
            ExprKind::Label { target, default } => {
                write!(self.out, "@{}:", target.display_name())?;
                if let Some(default) = default {
                    self.out.write_char(' ')?;
                    self.statement(default)?;
                }
                Ok(())
            }
            ExprKind::Loop {
                body,
                break_label,
                continue_label,
            } => {
                self.out.write_str("loop ")?;
                if let Some(label) = continue_label {
                    write!(self.out, "@{} ", label.display_name())?;
                }
                self.body(body)?;
                if let Some(label) = break_label {
                    write!(self.out, " @{}", label.display_name())?;
                }
                Ok(())
            }
        }
    }
}
