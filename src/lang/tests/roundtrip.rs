use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{parse_ok, type_ok};
use crate::lang::{BaseType, Expr, Type};

const NAMES: &[&str] = &["x", "y", "s", "f", "sample", "acc", "inx"];

fn name(rng: &mut StdRng) -> String {
    NAMES[rng.random_range(0..NAMES.len())].to_string()
}

fn random_type(rng: &mut StdRng, depth: u32) -> Type {
    if depth == 0 || rng.random_bool(0.3) {
        let base = [BaseType::Sample, BaseType::Index, BaseType::Unit][rng.random_range(0..3)];
        return Type::Base(base);
    }
    let d = depth - 1;
    match rng.random_range(0..4) {
        0 => Type::function(random_type(rng, d), random_type(rng, d)),
        1 => Type::stream(random_type(rng, d)),
        2 => Type::product(random_type(rng, d), random_type(rng, d)),
        _ => Type::sum(random_type(rng, d), random_type(rng, d)),
    }
}

fn random_sample(rng: &mut StdRng) -> f32 {
    match rng.random_range(0..4) {
        0 => 0.0,
        1 => rng.random_range(-1.0f32..1.0),
        2 => rng.random_range(0..1000) as f32,
        _ => rng.random_range(-1.0e6f32..1.0e6),
    }
}

fn random_expr(rng: &mut StdRng, depth: u32) -> Expr {
    if depth == 0 || rng.random_bool(0.2) {
        return match rng.random_range(0..3) {
            0 => Expr::Identifier(name(rng)),
            1 => Expr::IntLiteral(rng.random_range(0..100_000)),
            _ => Expr::SampleLiteral(random_sample(rng)),
        };
    }
    let d = depth - 1;
    match rng.random_range(0..13) {
        0 => Expr::app(random_expr(rng, d), random_expr(rng, d)),
        1 => Expr::lambda(name(rng), random_expr(rng, d)),
        2 => Expr::lob(name(rng), random_expr(rng, d)),
        3 => Expr::force(random_expr(rng, d)),
        4 => Expr::generate(random_expr(rng, d), random_expr(rng, d)),
        5 => Expr::let_in(name(rng), random_expr(rng, d), random_expr(rng, d)),
        6 => Expr::annotate(random_expr(rng, d), random_type(rng, 3)),
        7 => Expr::pair(random_expr(rng, d), random_expr(rng, d)),
        8 => Expr::unpair(name(rng), name(rng), random_expr(rng, d), random_expr(rng, d)),
        9 => Expr::inl(random_expr(rng, d)),
        10 => Expr::inr(random_expr(rng, d)),
        _ => Expr::case(
            random_expr(rng, d),
            name(rng),
            random_expr(rng, d),
            name(rng),
            random_expr(rng, d),
        ),
    }
}

#[test]
fn printed_expressions_parse_back() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let expr = random_expr(&mut rng, 6);
        let printed = expr.to_string();
        assert_eq!(parse_ok(&printed), expr, "printed as {printed}");
    }
}

#[test]
fn printed_types_parse_back() {
    let mut rng = StdRng::seed_from_u64(0x7e5);
    for _ in 0..500 {
        let t = random_type(&mut rng, 5);
        let printed = t.to_string();
        assert_eq!(type_ok(&printed), t, "printed as {printed}");
    }
}

#[test]
fn printing_uses_minimal_parentheses() {
    let cases = [
        "a b c",
        "a (b c)",
        "!x :: y",
        "(a :: b) :: c",
        "a :: b :: c",
        "(\\x. x) y",
        "\\x. x : sample -> ~sample",
        "(\\x. x) : sample",
        "f !(g x)",
        "let (a, b) = p in (a, b)",
        "case e { inl x => x | inr y => inl y }",
    ];
    for source in cases {
        assert_eq!(parse_ok(source).to_string(), source);
    }
}

#[test]
fn sample_literals_keep_their_dot() {
    assert_eq!(Expr::SampleLiteral(3.0).to_string(), "3.");
    assert_eq!(Expr::SampleLiteral(-0.5).to_string(), "-0.5");
    assert_eq!(Expr::IntLiteral(3).to_string(), "3");
}

#[test]
fn type_printing() {
    let cases = [
        "(sample -> index) -> unit",
        "~sample * index + unit",
        "~(sample * index)",
        "sample * (index + unit)",
    ];
    for source in cases {
        assert_eq!(type_ok(source).to_string(), source);
    }
}
