//! Recursive-descent parser with precedence climbing.
//!
//! Each `expr`/`ty` call parses the longest phrase whose operators sit at or
//! above `min`. The level of the phrase built so far is tracked as well, so
//! an operator is only applied when its left operand is allowed to be that
//! phrase (`a : T :: b` is rejected instead of silently regrouped).

use super::ast::{BaseType, Expr, Type};
use super::error::{Expected, ParseError, ParseErrorKind};
use super::lexer::tokenize;
use super::precedence::{self, expr, ty};
use super::token::{Span, Token, TokenKind};

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest nesting of expressions and types accepted. Each level costs a few
/// parser frames, and the limit keeps that within a 2 MiB thread stack.
pub const MAX_NESTING: usize = 100;

/// Parses a complete source text into an expression.
pub fn parse(source: &str) -> ParseResult<Expr> {
    let mut parser = Parser::new(tokenize(source)?);
    let e = parser.expr(expr::BINDER)?;
    parser.expect_eof()?;
    Ok(e)
}

/// Parses a complete source text into a type.
pub fn parse_type(source: &str) -> ParseResult<Type> {
    let mut parser = Parser::new(tokenize(source)?);
    let t = parser.ty(ty::FUNCTION.level)?;
    parser.expect_eof()?;
    Ok(t)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Parser {
        Parser { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> &Token {
        // the token stream always ends with Eof, and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, expected: Expected) -> ParseError {
        let token = self.peek();
        let kind = match token.kind {
            TokenKind::Eof => ParseErrorKind::UnexpectedEof { expected },
            ref other => ParseErrorKind::Unexpected { expected, found: other.describe() },
        };
        ParseError::new(token.span, kind)
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if *self.peek_kind() == kind {
            Ok(self.bump().span)
        } else {
            Err(self.error_here(Expected::one(kind.describe())))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            _ => Err(self.error_here(Expected::one("an identifier"))),
        }
    }

    /// Enters one nesting level. On overflow the error points at the token
    /// that opened the level.
    fn descend(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth <= MAX_NESTING {
            return Ok(());
        }
        let span = match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].span,
            None => self.peek().span,
        };
        Err(ParseError::new(span, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING }))
    }

    fn expect_eof(&self) -> ParseResult<()> {
        match self.peek_kind() {
            TokenKind::Eof => Ok(()),
            _ => Err(self.error_here(Expected::one("end of input"))),
        }
    }

    fn expr(&mut self, min: u8) -> ParseResult<Expr> {
        self.descend()?;
        let e = self.expr_climb(min);
        self.depth -= 1;
        e
    }

    fn expr_climb(&mut self, min: u8) -> ParseResult<Expr> {
        let (mut lhs, mut lhs_level) = self.expr_prefix()?;

        loop {
            let kind = self.peek_kind();
            let op = match precedence::expr_infix(kind) {
                Some(op) => op,
                None if kind.starts_expr() => expr::APPLICATION,
                None => break,
            };
            if op.level < min || op.left_min() > lhs_level {
                break;
            }

            lhs = if op == expr::APPLICATION {
                let arg = self.expr(op.right_min())?;
                Expr::app(lhs, arg)
            } else if op == expr::ANNOTATE {
                self.bump();
                let t = self.ty(ty::FUNCTION.level)?;
                Expr::annotate(lhs, t)
            } else {
                self.bump();
                let tail = self.expr(op.right_min())?;
                Expr::generate(lhs, tail)
            };
            lhs_level = op.level;
        }

        Ok(lhs)
    }

    /// Parses a prefix form or an atom, returning it with its level.
    fn expr_prefix(&mut self) -> ParseResult<(Expr, u8)> {
        let token = self.peek().clone();
        let parsed = match token.kind {
            TokenKind::Ident(name) => {
                self.bump();
                (Expr::Identifier(name), expr::ATOM)
            }
            TokenKind::Int(n) => {
                self.bump();
                (Expr::IntLiteral(n), expr::ATOM)
            }
            TokenKind::Sample(s) => {
                self.bump();
                (Expr::SampleLiteral(s), expr::ATOM)
            }
            TokenKind::Bang => {
                self.bump();
                (Expr::force(self.expr(expr::PREFIX)?), expr::PREFIX)
            }
            TokenKind::Inl => {
                self.bump();
                (Expr::inl(self.expr(expr::PREFIX)?), expr::PREFIX)
            }
            TokenKind::Inr => {
                self.bump();
                (Expr::inr(self.expr(expr::PREFIX)?), expr::PREFIX)
            }
            TokenKind::Backslash => {
                self.bump();
                let (param, body) = self.binder_tail()?;
                (Expr::Lambda(param, Box::new(body)), expr::BINDER)
            }
            TokenKind::Ampersand => {
                self.bump();
                let (param, body) = self.binder_tail()?;
                (Expr::Lob(param, Box::new(body)), expr::BINDER)
            }
            TokenKind::Let => {
                self.bump();
                (self.let_tail()?, expr::BINDER)
            }
            TokenKind::Case => {
                self.bump();
                (self.case_tail()?, expr::ATOM)
            }
            TokenKind::LParen => {
                self.bump();
                (self.paren_tail()?, expr::ATOM)
            }
            _ => return Err(self.error_here(Expected::one("an expression"))),
        };
        Ok(parsed)
    }

    /// `x . body` after `\` or `&`.
    fn binder_tail(&mut self) -> ParseResult<(String, Expr)> {
        let param = self.expect_ident()?;
        self.expect(TokenKind::Dot)?;
        let body = self.expr(expr::BINDER)?;
        Ok((param, body))
    }

    /// `x = e in body` or `(x, y) = e in body` after `let`.
    fn let_tail(&mut self) -> ParseResult<Expr> {
        if *self.peek_kind() == TokenKind::LParen {
            self.bump();
            let first = self.expect_ident()?;
            self.expect(TokenKind::Comma)?;
            let second = self.expect_ident()?;
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::Equals)?;
            let scrutinee = self.expr(expr::BINDER)?;
            self.expect(TokenKind::In)?;
            let body = self.expr(expr::BINDER)?;
            return Ok(Expr::unpair(first, second, scrutinee, body));
        }

        let name = self.expect_ident()?;
        self.expect(TokenKind::Equals)?;
        let value = self.expr(expr::BINDER)?;
        self.expect(TokenKind::In)?;
        let body = self.expr(expr::BINDER)?;
        Ok(Expr::let_in(name, value, body))
    }

    /// `e { inl x => e1 | inr y => e2 }` after `case`.
    fn case_tail(&mut self) -> ParseResult<Expr> {
        let scrutinee = self.expr(expr::BINDER)?;
        self.expect(TokenKind::LBrace)?;
        self.expect(TokenKind::Inl)?;
        let left_name = self.expect_ident()?;
        self.expect(TokenKind::FatArrow)?;
        let left_body = self.expr(expr::BINDER)?;
        self.expect(TokenKind::Pipe)?;
        self.expect(TokenKind::Inr)?;
        let right_name = self.expect_ident()?;
        self.expect(TokenKind::FatArrow)?;
        let right_body = self.expr(expr::BINDER)?;
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::case(scrutinee, left_name, left_body, right_name, right_body))
    }

    /// `e )` or `a , b )` after `(`.
    fn paren_tail(&mut self) -> ParseResult<Expr> {
        let first = self.expr(expr::BINDER)?;
        match self.peek_kind() {
            TokenKind::RParen => {
                self.bump();
                Ok(first)
            }
            TokenKind::Comma => {
                self.bump();
                let second = self.expr(expr::BINDER)?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::pair(first, second))
            }
            _ => Err(self.error_here(Expected(vec![
                TokenKind::RParen.describe(),
                TokenKind::Comma.describe(),
            ]))),
        }
    }

    fn ty(&mut self, min: u8) -> ParseResult<Type> {
        self.descend()?;
        let t = self.ty_climb(min);
        self.depth -= 1;
        t
    }

    fn ty_climb(&mut self, min: u8) -> ParseResult<Type> {
        let (mut lhs, mut lhs_level) = self.ty_prefix()?;

        while let Some(op) = precedence::type_infix(self.peek_kind()) {
            if op.level < min || op.left_min() > lhs_level {
                break;
            }
            self.bump();
            let rhs = self.ty(op.right_min())?;
            lhs = if op == ty::FUNCTION {
                Type::function(lhs, rhs)
            } else if op == ty::SUM {
                Type::sum(lhs, rhs)
            } else {
                Type::product(lhs, rhs)
            };
            lhs_level = op.level;
        }

        Ok(lhs)
    }

    fn ty_prefix(&mut self) -> ParseResult<(Type, u8)> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Tilde => {
                self.bump();
                Ok((Type::stream(self.ty(ty::STREAM)?), ty::STREAM))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.ty(ty::FUNCTION.level)?;
                self.expect(TokenKind::RParen)?;
                Ok((inner, ty::ATOM))
            }
            TokenKind::Ident(ref name) => match BaseType::from_keyword(name) {
                Some(base) => {
                    self.bump();
                    Ok((Type::Base(base), ty::ATOM))
                }
                None => Err(self.error_here(Expected::one("a type"))),
            },
            _ => Err(self.error_here(Expected::one("a type"))),
        }
    }
}
