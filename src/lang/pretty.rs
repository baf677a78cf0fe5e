//! Source printer.
//!
//! Output parses back to the same tree: parentheses are inserted exactly
//! where the [precedence table](super::precedence) would otherwise regroup
//! a subterm. Sample literals always carry a `.` so they never read back as
//! integers. Only finite samples have a source form.

use std::fmt;

use super::ast::{Expr, Type};
use super::precedence::{expr, ty};

impl Expr {
    /// Level of the outermost construct, as used by the precedence table.
    pub fn level(&self) -> u8 {
        match self {
            Expr::Identifier(_)
            | Expr::IntLiteral(_)
            | Expr::SampleLiteral(_)
            | Expr::Pair(_, _)
            | Expr::Case { .. } => expr::ATOM,
            Expr::Force(_) | Expr::Inl(_) | Expr::Inr(_) => expr::PREFIX,
            Expr::Application(_, _) => expr::APPLICATION.level,
            Expr::Gen(_, _) => expr::GEN.level,
            Expr::Annotate(_, _) => expr::ANNOTATE.level,
            Expr::Lambda(_, _) | Expr::Lob(_, _) | Expr::Let(_, _, _) | Expr::Unpair(_, _, _, _) => {
                expr::BINDER
            }
        }
    }
}

impl Type {
    pub fn level(&self) -> u8 {
        match self {
            Type::Base(_) => ty::ATOM,
            Type::Stream(_) => ty::STREAM,
            Type::Product(_, _) => ty::PRODUCT.level,
            Type::Sum(_, _) => ty::SUM.level,
            Type::Function(_, _) => ty::FUNCTION.level,
        }
    }
}

fn write_sample(f: &mut fmt::Formatter<'_>, s: f32) -> fmt::Result {
    let text = s.to_string();
    if text.contains('.') || !s.is_finite() {
        write!(f, "{text}")
    } else {
        write!(f, "{text}.")
    }
}

fn fmt_expr(e: &Expr, min: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if e.level() < min {
        write!(f, "(")?;
        fmt_expr(e, expr::BINDER, f)?;
        return write!(f, ")");
    }

    match e {
        Expr::Identifier(name) => write!(f, "{name}"),
        Expr::IntLiteral(n) => write!(f, "{n}"),
        Expr::SampleLiteral(s) => write_sample(f, *s),
        Expr::Application(fun, arg) => {
            fmt_expr(fun, expr::APPLICATION.left_min(), f)?;
            write!(f, " ")?;
            fmt_expr(arg, expr::APPLICATION.right_min(), f)
        }
        Expr::Lambda(x, body) => {
            write!(f, "\\{x}. ")?;
            fmt_expr(body, expr::BINDER, f)
        }
        Expr::Lob(x, body) => {
            write!(f, "&{x}. ")?;
            fmt_expr(body, expr::BINDER, f)
        }
        Expr::Force(inner) => {
            write!(f, "!")?;
            fmt_expr(inner, expr::PREFIX, f)
        }
        Expr::Inl(inner) => {
            write!(f, "inl ")?;
            fmt_expr(inner, expr::PREFIX, f)
        }
        Expr::Inr(inner) => {
            write!(f, "inr ")?;
            fmt_expr(inner, expr::PREFIX, f)
        }
        Expr::Gen(head, tail) => {
            fmt_expr(head, expr::GEN.left_min(), f)?;
            write!(f, " :: ")?;
            fmt_expr(tail, expr::GEN.right_min(), f)
        }
        Expr::Let(x, value, body) => {
            write!(f, "let {x} = ")?;
            fmt_expr(value, expr::BINDER, f)?;
            write!(f, " in ")?;
            fmt_expr(body, expr::BINDER, f)
        }
        Expr::Annotate(inner, t) => {
            fmt_expr(inner, expr::ANNOTATE.left_min(), f)?;
            write!(f, " : ")?;
            fmt_type(t, ty::FUNCTION.level, f)
        }
        Expr::Pair(a, b) => {
            write!(f, "(")?;
            fmt_expr(a, expr::BINDER, f)?;
            write!(f, ", ")?;
            fmt_expr(b, expr::BINDER, f)?;
            write!(f, ")")
        }
        Expr::Unpair(x, y, scrutinee, body) => {
            write!(f, "let ({x}, {y}) = ")?;
            fmt_expr(scrutinee, expr::BINDER, f)?;
            write!(f, " in ")?;
            fmt_expr(body, expr::BINDER, f)
        }
        Expr::Case { scrutinee, left_name, left_body, right_name, right_body } => {
            write!(f, "case ")?;
            fmt_expr(scrutinee, expr::BINDER, f)?;
            write!(f, " {{ inl {left_name} => ")?;
            fmt_expr(left_body, expr::BINDER, f)?;
            write!(f, " | inr {right_name} => ")?;
            fmt_expr(right_body, expr::BINDER, f)?;
            write!(f, " }}")
        }
    }
}

fn fmt_type(t: &Type, min: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if t.level() < min {
        write!(f, "(")?;
        fmt_type(t, ty::FUNCTION.level, f)?;
        return write!(f, ")");
    }

    match t {
        Type::Base(base) => write!(f, "{}", base.keyword()),
        Type::Stream(inner) => {
            write!(f, "~")?;
            fmt_type(inner, ty::STREAM, f)
        }
        Type::Product(a, b) => fmt_binary(a, " * ", b, ty::PRODUCT, f),
        Type::Sum(a, b) => fmt_binary(a, " + ", b, ty::SUM, f),
        Type::Function(a, b) => fmt_binary(a, " -> ", b, ty::FUNCTION, f),
    }
}

fn fmt_binary(
    a: &Type,
    op: &str,
    b: &Type,
    infix: super::precedence::Infix,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    fmt_type(a, infix.left_min(), f)?;
    write!(f, "{op}")?;
    fmt_type(b, infix.right_min(), f)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_expr(self, expr::BINDER, f)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type(self, ty::FUNCTION.level, f)
    }
}
