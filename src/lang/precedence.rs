//! Precedence and associativity of every operator form, as plain data.
//!
//! Both the parser and the pretty printer read these tables, so the two can
//! never disagree about where parentheses are needed. Higher levels bind
//! tighter.

use super::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// An infix operator entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infix {
    pub level: u8,
    pub assoc: Assoc,
}

impl Infix {
    /// Minimum level accepted for the left operand.
    pub fn left_min(self) -> u8 {
        match self.assoc {
            Assoc::Left => self.level,
            Assoc::Right => self.level + 1,
        }
    }

    /// Minimum level accepted for the right operand.
    pub fn right_min(self) -> u8 {
        match self.assoc {
            Assoc::Left => self.level + 1,
            Assoc::Right => self.level,
        }
    }
}

/// Expression levels.
pub mod expr {
    use super::{Assoc, Infix};

    /// `\x.`, `&x.`, `let`: open to the right, lowest of all.
    pub const BINDER: u8 = 0;
    /// `e : T`
    pub const ANNOTATE: Infix = Infix { level: 1, assoc: Assoc::Left };
    /// `h :: t`
    pub const GEN: Infix = Infix { level: 2, assoc: Assoc::Right };
    /// `f x`
    pub const APPLICATION: Infix = Infix { level: 3, assoc: Assoc::Left };
    /// `!e`, `inl e`, `inr e`
    pub const PREFIX: u8 = 4;
    /// identifiers, literals, `( .. )`, `case .. { .. }`
    pub const ATOM: u8 = 5;
}

/// Type levels.
pub mod ty {
    use super::{Assoc, Infix};

    /// `A -> B`
    pub const FUNCTION: Infix = Infix { level: 0, assoc: Assoc::Right };
    /// `A + B`
    pub const SUM: Infix = Infix { level: 1, assoc: Assoc::Right };
    /// `A * B`
    pub const PRODUCT: Infix = Infix { level: 2, assoc: Assoc::Right };
    /// `~A`
    pub const STREAM: u8 = 3;
    /// base types and `( .. )`
    pub const ATOM: u8 = 4;
}

/// Infix expression operators keyed by token. Juxtaposition has no token
/// and is handled by the parser through [`TokenKind::starts_expr`].
pub fn expr_infix(kind: &TokenKind) -> Option<Infix> {
    match kind {
        TokenKind::Colon => Some(expr::ANNOTATE),
        TokenKind::ColonColon => Some(expr::GEN),
        _ => None,
    }
}

pub fn type_infix(kind: &TokenKind) -> Option<Infix> {
    match kind {
        TokenKind::Arrow => Some(ty::FUNCTION),
        TokenKind::Plus => Some(ty::SUM),
        TokenKind::Star => Some(ty::PRODUCT),
        _ => None,
    }
}
