use crate::lang::lexer::tokenize;
use crate::lang::{ParseErrorKind, TokenKind, parse};

fn single(source: &str) -> TokenKind {
    let tokens = tokenize(source).expect("tokenize failed");
    assert_eq!(tokens.len(), 2, "expected one token in {source:?}, got {tokens:?}");
    tokens[0].kind.clone()
}

#[test]
fn integer_is_never_a_sample() {
    assert_eq!(single("5"), TokenKind::Int(5));
}

#[test]
fn trailing_dot_makes_a_sample() {
    assert_eq!(single("5."), TokenKind::Sample(5.0));
}

#[test]
fn sample_with_fraction() {
    assert_eq!(single("0.25"), TokenKind::Sample(0.25));
}

#[test]
fn negative_sample() {
    assert_eq!(single("-1.5"), TokenKind::Sample(-1.5));
}

#[test]
fn negative_integer_is_rejected() {
    let err = tokenize("-5").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidToken { text: "-5".to_string() });
}

#[test]
fn uppercase_identifier_is_rejected() {
    let err = tokenize("X1").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidToken { text: "X1".to_string() });
    assert_eq!((err.span.start, err.span.end), (0, 2));
}

#[test]
fn identifier_with_digit_is_rejected() {
    assert!(matches!(
        tokenize("x1").unwrap_err().kind,
        ParseErrorKind::InvalidToken { .. }
    ));
}

#[test]
fn identifier_with_underscore_is_rejected() {
    assert!(matches!(
        tokenize("foo_bar").unwrap_err().kind,
        ParseErrorKind::InvalidToken { .. }
    ));
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(single("let"), TokenKind::Let);
    assert_eq!(single("in"), TokenKind::In);
    assert_eq!(single("case"), TokenKind::Case);
    assert_eq!(single("inl"), TokenKind::Inl);
    assert_eq!(single("inr"), TokenKind::Inr);
    assert_eq!(single("inx"), TokenKind::Ident("inx".to_string()));
}

#[test]
fn integer_overflow() {
    let err = parse("99999999999999999999999").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::IntegerOutOfRange { .. }));
}

#[test]
fn unknown_character() {
    let err = tokenize("a # b").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidToken { text: "#".to_string() });
    assert_eq!(err.span.start, 2);
}

#[test]
fn non_ascii_character() {
    let err = tokenize("é").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidToken { text: "é".to_string() });
}

#[test]
fn sample_overflow() {
    let source = format!("{}.", "9".repeat(50));
    let err = tokenize(&source).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::SampleOutOfRange { text: source.clone() });
    assert_eq!((err.span.start, err.span.end), (0, source.len()));

    let negative = format!("-{source}");
    let err = parse(&format!("f {negative}")).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::SampleOutOfRange { .. }));
    assert_eq!(err.span.start, 2);
}

#[test]
fn largest_sample_still_lexes() {
    let source = format!("{}.", f32::MAX);
    assert_eq!(single(&source), TokenKind::Sample(f32::MAX));
}
