use crate::lang::parser::MAX_NESTING;
use crate::lang::{ParseErrorKind, parse, parse_type};

fn expected_of(source: &str) -> String {
    let err = parse(source).expect_err("parse should fail");
    err.expected()
        .map(|e| e.to_string())
        .unwrap_or_else(|| panic!("no expected-token description in {err:?}"))
}

#[test]
fn case_missing_closing_brace() {
    assert_eq!(expected_of("case e { inl x => x | inr y => y"), "`}`");
}

#[test]
fn case_missing_pipe() {
    let err = parse("case e { inl x => x inr y => y }").unwrap_err();
    assert_eq!(err.expected().map(|e| e.to_string()).as_deref(), Some("`|`"));
    assert!(matches!(err.kind, ParseErrorKind::Unexpected { .. }));
}

#[test]
fn case_missing_fat_arrow() {
    assert_eq!(expected_of("case e { inl x x | inr y => y }"), "`=>`");
    assert_eq!(expected_of("case e { inl x => x | inr y y }"), "`=>`");
}

#[test]
fn case_arms_in_fixed_order() {
    assert_eq!(expected_of("case e { inr y => y | inl x => x }"), "`inl`");
}

#[test]
fn unclosed_paren_reports_both_options() {
    assert_eq!(expected_of("(a b"), "`)` or `,`");
}

#[test]
fn lambda_needs_dot() {
    assert_eq!(expected_of(r"\x x"), "`.`");
}

#[test]
fn let_needs_in() {
    assert_eq!(expected_of("let x = a b"), "`in`");
}

#[test]
fn keyword_is_not_a_binder_name() {
    assert_eq!(expected_of(r"\in. x"), "an identifier");
}

#[test]
fn empty_input() {
    let err = parse("").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    assert_eq!(err.expected().map(|e| e.to_string()).as_deref(), Some("an expression"));
}

#[test]
fn annotation_cannot_be_a_gen_head() {
    assert_eq!(expected_of("a : sample :: b"), "end of input");
}

#[test]
fn error_span_points_at_offending_token() {
    let err = parse("f ) x").unwrap_err();
    assert_eq!((err.span.start, err.span.end), (2, 3));
}

#[test]
fn unknown_base_type() {
    let err = parse_type("float").unwrap_err();
    assert_eq!(err.expected().map(|e| e.to_string()).as_deref(), Some("a type"));
}

#[test]
fn rendered_error_has_caret() {
    let source = "let x = 1\nin case x { inl a => a }";
    let rendered = parse(source).unwrap_err().render(source);
    assert!(rendered.contains(" --> 2:"), "{rendered}");
    assert!(rendered.contains('^'), "{rendered}");
}

fn nested(depth: usize, open: &str, inner: &str, close: &str) -> String {
    format!("{}{inner}{}", open.repeat(depth), close.repeat(depth))
}

#[test]
fn deep_parentheses_are_an_error_not_a_crash() {
    let source = nested(10_000, "(", "x", ")");
    let err = parse(&source).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING });
    assert_eq!(&source[err.span.start..err.span.end], "(");
}

#[test]
fn nesting_limit_is_exact() {
    // The outermost expression is one level, each parenthesis one more.
    assert!(parse(&nested(MAX_NESTING - 1, "(", "x", ")")).is_ok());
    assert!(matches!(
        parse(&nested(MAX_NESTING, "(", "x", ")")).unwrap_err().kind,
        ParseErrorKind::NestingTooDeep { .. }
    ));
}

#[test]
fn deep_prefix_and_binder_chains() {
    for source in [
        nested(10_000, "!", "x", ""),
        nested(10_000, "inl ", "x", ""),
        nested(10_000, r"\x. ", "x", ""),
        nested(10_000, "x :: ", "x", ""),
    ] {
        let err = parse(&source).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { .. }), "{err}");
    }
}

#[test]
fn deep_types_are_an_error_not_a_crash() {
    for source in [
        nested(10_000, "(", "sample", ")"),
        nested(10_000, "~", "sample", ""),
        nested(10_000, "sample -> ", "sample", ""),
    ] {
        let err = parse_type(&source).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { .. }), "{err}");
    }

    let annotated = format!("x : {}", nested(10_000, "(", "unit", ")"));
    assert!(matches!(
        parse(&annotated).unwrap_err().kind,
        ParseErrorKind::NestingTooDeep { .. }
    ));
}
