//! # lambdalisten surface language
//!
//! A small calculus for describing infinite sample streams:
//!
//! ```text
//! let step = 0.19 in (&s. \x. sin x :: !s (add x step)) 0.
//! ```
//!
//! - `\x. e` is a lambda, `&s. e` a guarded fixpoint, `!e` forces a delayed stream.
//! - `h :: t` builds a stream from a head sample and a tail.
//! - `e : T` annotates an expression with a type such as `sample -> ~sample`.
//!
//! Parsing only builds the tree; type checking and code generation happen
//! in the compiler that consumes [`Expr`].

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod precedence;
pub mod pretty;
pub mod token;

pub use ast::{BaseType, Expr, Type};
pub use error::{ParseError, ParseErrorKind};
pub use parser::{parse, parse_type};
pub use token::{Span, Token, TokenKind};

#[cfg(test)]
mod tests;
