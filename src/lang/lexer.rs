//! Tokenizer.
//!
//! Lexical classes:
//! - identifier: `[a-z]+` (keywords `let in case inl inr` excluded)
//! - integer: `[0-9]+`
//! - sample: `-?[0-9]+\.[0-9]*`, so `3.` is a sample and `3` is an integer
//!
//! A run of letters, digits and underscores that fits none of these (`X1`,
//! `x_y`, `3x`) is rejected as a whole rather than split.

use super::error::{ParseError, ParseErrorKind};
use super::token::{Span, Token, TokenKind};

pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer { source, bytes: source.as_bytes(), pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while matches!(self.peek(), Some(b) if pred(b)) {
            self.pos += 1;
        }
    }

    fn invalid(&self, start: usize) -> ParseError {
        let end = self.pos.max(start + 1).min(self.source.len());
        // Widen to a char boundary so slicing stays valid on non-ASCII input.
        let end = (end..=self.source.len())
            .find(|&i| self.source.is_char_boundary(i))
            .unwrap_or(self.source.len());
        ParseError::new(
            Span::new(start, end),
            ParseErrorKind::InvalidToken { text: self.source[start..end].to_string() },
        )
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(b) = self.peek() else {
            return Ok(Token { kind: TokenKind::Eof, span: Span::at(start) });
        };

        let kind = match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.word(start)?,
            b'0'..=b'9' => self.number(start)?,
            b'-' => match self.peek_at(1) {
                Some(b'>') => {
                    self.pos += 2;
                    TokenKind::Arrow
                }
                Some(b'0'..=b'9') => {
                    self.pos += 1;
                    self.number(start)?
                }
                _ => {
                    self.pos += 1;
                    return Err(self.invalid(start));
                }
            },
            b':' if self.peek_at(1) == Some(b':') => {
                self.pos += 2;
                TokenKind::ColonColon
            }
            b'=' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                TokenKind::FatArrow
            }
            _ => {
                let kind = match b {
                    b'\\' => TokenKind::Backslash,
                    b'&' => TokenKind::Ampersand,
                    b'!' => TokenKind::Bang,
                    b':' => TokenKind::Colon,
                    b',' => TokenKind::Comma,
                    b'.' => TokenKind::Dot,
                    b'=' => TokenKind::Equals,
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b'{' => TokenKind::LBrace,
                    b'}' => TokenKind::RBrace,
                    b'|' => TokenKind::Pipe,
                    b'*' => TokenKind::Star,
                    b'+' => TokenKind::Plus,
                    b'~' => TokenKind::Tilde,
                    _ => {
                        self.pos += 1;
                        return Err(self.invalid(start));
                    }
                };
                self.pos += 1;
                kind
            }
        };

        Ok(Token { kind, span: Span::new(start, self.pos) })
    }

    fn word(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        self.eat_while(is_word_byte);
        let text = &self.source[start..self.pos];
        if !text.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(self.invalid(start));
        }
        Ok(TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string())))
    }

    /// Digits, optionally followed by `.` and more digits. `start` may point
    /// at a leading `-`, in which case the `.` is mandatory.
    fn number(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let negative = self.bytes[start] == b'-';
        self.eat_while(|b| b.is_ascii_digit());

        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit());
            if matches!(self.peek(), Some(b) if is_word_byte(b)) {
                self.eat_while(is_word_byte);
                return Err(self.invalid(start));
            }
            let text = &self.source[start..self.pos];
            return match text.parse::<f32>() {
                Ok(s) if s.is_finite() => Ok(TokenKind::Sample(s)),
                Ok(_) => Err(ParseError::new(
                    Span::new(start, self.pos),
                    ParseErrorKind::SampleOutOfRange { text: text.to_string() },
                )),
                Err(_) => Err(self.invalid(start)),
            };
        }

        if negative || matches!(self.peek(), Some(b) if is_word_byte(b)) {
            self.eat_while(is_word_byte);
            return Err(self.invalid(start));
        }

        let text = &self.source[start..self.pos];
        text.parse::<u64>().map(TokenKind::Int).map_err(|_| {
            ParseError::new(
                Span::new(start, self.pos),
                ParseErrorKind::IntegerOutOfRange { text: text.to_string() },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            kinds(":: : => = -> ~"),
            vec![
                TokenKind::ColonColon,
                TokenKind::Colon,
                TokenKind::FatArrow,
                TokenKind::Equals,
                TokenKind::Arrow,
                TokenKind::Tilde,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("let xs = 1.5").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
        assert_eq!(spans, vec![(0, 3), (4, 6), (7, 8), (9, 12), (12, 12)]);
    }

    #[test]
    fn test_lambda_dot_is_not_a_sample() {
        assert_eq!(
            kinds(r"\x.x"),
            vec![
                TokenKind::Backslash,
                TokenKind::Ident("x".into()),
                TokenKind::Dot,
                TokenKind::Ident("x".into()),
                TokenKind::Eof
            ]
        );
    }
}
