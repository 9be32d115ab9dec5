//! Surface patterns.

use tarn_common::{Identifier, Span};

use crate::expr::Expr;
use crate::{Mutability, Name, QualifiedName};

/// A surface pattern with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Pat {
    pub kind: PatKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(char),
    BoolLiteral(bool),
    StringLiteral(Identifier),
    Wildcard,
    /// A binding pattern: `x` or `mut x`.
    Name {
        name: Name,
        mutability: Mutability,
    },
    /// A fully qualified constructor: `Option::some(p)`.
    Constructor {
        name: QualifiedName,
        payload: Option<Box<Pat>>,
    },
    /// Constructor shorthand resolved against the scrutinee type: `:some(p)`.
    ConstructorShorthand {
        name: Name,
        payload: Option<Box<Pat>>,
    },
    Tuple(Vec<Pat>),
    Slice(Vec<Pat>),
    /// `p as x` -- bind the whole matched value under an alias.
    As {
        binder: Name,
        mutability: Mutability,
        pattern: Box<Pat>,
    },
    /// `p if guard`.
    Guarded {
        pattern: Box<Pat>,
        guard: Box<Expr>,
    },
}
