//! Surface expressions.

use tarn_common::{Identifier, Span};

use crate::pat::Pat;
use crate::ty::Type;
use crate::{Mutability, Name, QualifiedName, TemplateArgument};

/// A surface expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The expression variant set as the parser produces it.
///
/// `Conditional`, `ConditionalLet`, `While`, and `For` exist only here;
/// the desugarer rewrites them into the HIR primitive set.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(char),
    BoolLiteral(bool),
    StringLiteral(Identifier),
    ArrayLiteral(Vec<Expr>),
    Variable(QualifiedName),
    TemplateApplication {
        name: QualifiedName,
        arguments: Vec<TemplateArgument>,
    },
    Tuple(Vec<Expr>),
    Block {
        effects: Vec<Expr>,
        result: Option<Box<Expr>>,
    },
    /// `if c { .. } elif c2 { .. } else { .. }`; the condition may be a
    /// `ConditionalLet`.
    Conditional {
        condition: Box<Expr>,
        true_branch: Box<Expr>,
        elif_arms: Vec<ElifArm>,
        false_branch: Option<Box<Expr>>,
    },
    /// `let p = e` in the head position of `if` or `while`. Anywhere else
    /// it is an internal invariant violation.
    ConditionalLet {
        pattern: Box<Pat>,
        initializer: Box<Expr>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
    },
    Loop {
        body: Box<Expr>,
    },
    For {
        pattern: Box<Pat>,
        iterable: Box<Expr>,
        body: Box<Expr>,
    },
    Invocation {
        invocable: Box<Expr>,
        arguments: Vec<FunctionArgument>,
    },
    StructInitializer {
        ty: Box<Type>,
        initializers: Vec<FieldInitializer>,
    },
    BinaryOperator {
        left: Box<Expr>,
        right: Box<Expr>,
        op: Name,
    },
    MemberAccessChain {
        base: Box<Expr>,
        accessors: Vec<Accessor>,
    },
    MemberInvocation {
        receiver: Box<Expr>,
        member: Name,
        arguments: Vec<FunctionArgument>,
    },
    Dereference(Box<Expr>),
    TypeCast {
        expr: Box<Expr>,
        target: Box<Type>,
        kind: CastKind,
    },
    Let {
        pattern: Box<Pat>,
        initializer: Box<Expr>,
        ty: Option<Box<Type>>,
    },
    LocalTypeAlias {
        name: Name,
        ty: Box<Type>,
    },
    Return(Option<Box<Expr>>),
    Break {
        label: Option<Name>,
        value: Option<Box<Expr>>,
    },
    Continue,
    SizeOf(Box<Type>),
    TakeReference {
        mutability: Mutability,
        name: Name,
    },
    PlacementInit {
        lvalue: Box<Expr>,
        initializer: Box<Expr>,
    },
    /// `meta { e }` -- a quoted expression evaluated at compile time.
    Meta(Box<Expr>),
    /// `???` -- a typed hole.
    Hole,
}

/// One `elif` arm of a conditional chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ElifArm {
    pub condition: Expr,
    pub body: Expr,
    pub span: Span,
}

/// One arm of a `match` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pat,
    pub expression: Expr,
}

/// A call argument, optionally named.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArgument {
    pub name: Option<Name>,
    pub expr: Expr,
}

/// A field initializer in a struct initializer expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInitializer {
    pub name: Name,
    pub expr: Expr,
}

/// A single step of a member access chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessorKind {
    /// `.0`, `.1`, ...
    TupleField(i64),
    /// `.field`
    StructField(Name),
    /// `.[index]`
    ArrayIndex(Box<Expr>),
}

/// Whether a cast asserts a type or converts to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// `e: T` -- the expression already has type `T`.
    Ascription,
    /// `e as T` -- convert the value to type `T`.
    Conversion,
}
