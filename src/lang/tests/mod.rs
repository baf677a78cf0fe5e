use super::{Expr, Type, parse, parse_type};

mod errors;
mod lexer;
mod roundtrip;
mod types;

pub fn parse_ok(source: &str) -> Expr {
    parse(source).unwrap_or_else(|e| panic!("failed to parse {source:?}: {}", e.render(source)))
}

pub fn type_ok(source: &str) -> Type {
    parse_type(source).unwrap_or_else(|e| panic!("failed to parse type {source:?}: {}", e.render(source)))
}

pub fn id(name: &str) -> Expr {
    Expr::ident(name)
}
