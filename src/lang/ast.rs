//! Abstract syntax tree for lambdalisten expressions and types.
//!
//! The tree carries no source positions: two trees are equal when they have
//! the same shape, which is what round-tripping through the pretty printer
//! relies on. Positions only appear in [`ParseError`](super::ParseError).

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Variable reference: `x`
    Identifier(String),

    /// Index literal: `42`
    IntLiteral(u64),

    /// Sample literal: `0.5`, `-1.`, `3.`
    SampleLiteral(f32),

    /// Juxtaposition: `f x`
    Application(Box<Expr>, Box<Expr>),

    /// `\x. body`
    Lambda(String, Box<Expr>),

    /// Guarded fixpoint: `&s. body`. Inside `body`, `s` stands for the whole
    /// expression one step later and may only be used under `!`.
    Lob(String, Box<Expr>),

    /// Unfold one layer of a delayed stream: `!e`
    Force(Box<Expr>),

    /// Stream cons: `head :: tail`
    Gen(Box<Expr>, Box<Expr>),

    /// `let name = value in body`
    Let(String, Box<Expr>, Box<Expr>),

    /// `e : T`
    Annotate(Box<Expr>, Type),

    /// `(a, b)`
    Pair(Box<Expr>, Box<Expr>),

    /// `let (a, b) = scrutinee in body`
    Unpair(String, String, Box<Expr>, Box<Expr>),

    /// `inl e`
    Inl(Box<Expr>),

    /// `inr e`
    Inr(Box<Expr>),

    /// `case e { inl x => left | inr y => right }`
    Case {
        scrutinee: Box<Expr>,
        left_name: String,
        left_body: Box<Expr>,
        right_name: String,
        right_body: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Identifier(name.into())
    }

    pub fn app(fun: Expr, arg: Expr) -> Expr {
        Expr::Application(Box::new(fun), Box::new(arg))
    }

    pub fn lambda(param: impl Into<String>, body: Expr) -> Expr {
        Expr::Lambda(param.into(), Box::new(body))
    }

    pub fn lob(param: impl Into<String>, body: Expr) -> Expr {
        Expr::Lob(param.into(), Box::new(body))
    }

    pub fn force(e: Expr) -> Expr {
        Expr::Force(Box::new(e))
    }

    pub fn generate(head: Expr, tail: Expr) -> Expr {
        Expr::Gen(Box::new(head), Box::new(tail))
    }

    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr) -> Expr {
        Expr::Let(name.into(), Box::new(value), Box::new(body))
    }

    pub fn annotate(e: Expr, ty: Type) -> Expr {
        Expr::Annotate(Box::new(e), ty)
    }

    pub fn pair(a: Expr, b: Expr) -> Expr {
        Expr::Pair(Box::new(a), Box::new(b))
    }

    pub fn unpair(
        first: impl Into<String>,
        second: impl Into<String>,
        scrutinee: Expr,
        body: Expr,
    ) -> Expr {
        Expr::Unpair(first.into(), second.into(), Box::new(scrutinee), Box::new(body))
    }

    pub fn inl(e: Expr) -> Expr {
        Expr::Inl(Box::new(e))
    }

    pub fn inr(e: Expr) -> Expr {
        Expr::Inr(Box::new(e))
    }

    pub fn case(
        scrutinee: Expr,
        left_name: impl Into<String>,
        left_body: Expr,
        right_name: impl Into<String>,
        right_body: Expr,
    ) -> Expr {
        Expr::Case {
            scrutinee: Box::new(scrutinee),
            left_name: left_name.into(),
            left_body: Box::new(left_body),
            right_name: right_name.into(),
            right_body: Box::new(right_body),
        }
    }
}

/// Ground types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Sample,
    Index,
    Unit,
}

impl BaseType {
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Sample => "sample",
            BaseType::Index => "index",
            BaseType::Unit => "unit",
        }
    }

    pub fn from_keyword(word: &str) -> Option<BaseType> {
        match word {
            "sample" => Some(BaseType::Sample),
            "index" => Some(BaseType::Index),
            "unit" => Some(BaseType::Unit),
            _ => None,
        }
    }
}

/// A type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Base(BaseType),
    /// `A -> B`
    Function(Box<Type>, Box<Type>),
    /// `~A`, the later modality
    Stream(Box<Type>),
    /// `A * B`
    Product(Box<Type>, Box<Type>),
    /// `A + B`
    Sum(Box<Type>, Box<Type>),
}

impl Type {
    pub const SAMPLE: Type = Type::Base(BaseType::Sample);
    pub const INDEX: Type = Type::Base(BaseType::Index);
    pub const UNIT: Type = Type::Base(BaseType::Unit);

    pub fn function(domain: Type, codomain: Type) -> Type {
        Type::Function(Box::new(domain), Box::new(codomain))
    }

    pub fn stream(inner: Type) -> Type {
        Type::Stream(Box::new(inner))
    }

    pub fn product(a: Type, b: Type) -> Type {
        Type::Product(Box::new(a), Box::new(b))
    }

    pub fn sum(a: Type, b: Type) -> Type {
        Type::Sum(Box::new(a), Box::new(b))
    }
}
