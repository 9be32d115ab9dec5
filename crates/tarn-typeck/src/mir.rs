//! The typed mid-level representation.
//!
//! MIR is HIR after name resolution and type inference: every expression
//! and pattern carries a resolved type, variable references have become
//! frame offsets or function references, and definitions carry their
//! resolved signatures. MIR is the contract consumed by codegen.

use tarn_common::{Identifier, SourceId, Span};
use tarn_hir::Name;

use crate::def::{EnumId, FnId};
use crate::ty::{Mutness, Scheme, Ty};

/// The typed output of the pipeline. Definitions appear in the exact
/// declaration order of the source module.
#[derive(Debug, Clone)]
pub struct Module {
    pub definitions: Vec<Definition>,
    pub source: SourceId,
}

#[derive(Debug, Clone)]
pub enum Definition {
    Function(Function),
    Struct(Struct),
    Enum(Enum),
    Alias(Alias),
    Typeclass(Typeclass),
    Implementation(Implementation),
    Instantiation(Instantiation),
    Namespace { name: Name, definitions: Vec<Definition> },
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: Name,
    /// The function's toplevel type, quantified over its explicit and
    /// implicit template parameters.
    pub scheme: Scheme,
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Ty,
    pub body: Expr,
}

#[derive(Debug, Clone)]
pub struct FunctionParameter {
    pub pattern: Pattern,
    pub ty: Ty,
}

#[derive(Debug, Clone)]
pub struct Struct {
    pub name: Name,
    pub template_params: Vec<TemplateParamInfo>,
    pub fields: Vec<StructField>,
    /// Size in bytes; template-dependent fields contribute zero until
    /// monomorphization.
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: Name,
    pub ty: Ty,
    pub is_public: bool,
    pub offset: u64,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: Name,
    pub template_params: Vec<TemplateParamInfo>,
    pub constructors: Vec<Constructor>,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: Name,
    pub payload: Option<Ty>,
}

#[derive(Debug, Clone)]
pub struct Alias {
    pub name: Name,
    pub template_params: Vec<TemplateParamInfo>,
    pub ty: Ty,
}

#[derive(Debug, Clone)]
pub struct Typeclass {
    pub name: Name,
    pub function_signatures: Vec<ClassFunctionSignature>,
    pub type_signatures: Vec<Name>,
}

#[derive(Debug, Clone)]
pub struct ClassFunctionSignature {
    pub name: Name,
    pub parameters: Vec<Ty>,
    pub return_type: Ty,
}

#[derive(Debug, Clone)]
pub struct Implementation {
    pub target: Ty,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone)]
pub struct Instantiation {
    pub class: Name,
    pub target: Ty,
    pub functions: Vec<Function>,
}

/// One declared template parameter of a nominal type, with the variable
/// its occurrences resolve to.
#[derive(Debug, Clone)]
pub struct TemplateParamInfo {
    pub name: Name,
    pub var: crate::ty::TyVar,
}

// ── Expressions ──────────────────────────────────────────────────────────

/// A typed expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Ty,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(char),
    BoolLiteral(bool),
    StringLiteral(Identifier),
    ArrayLiteral(Vec<Expr>),
    Tuple(Vec<Expr>),
    Block {
        effects: Vec<Expr>,
        result: Option<Box<Expr>>,
    },
    Loop {
        body: Box<Expr>,
    },
    Break,
    Continue,
    /// A resolved local variable read.
    LocalVariable {
        frame_offset: u64,
    },
    /// A resolved reference to a top-level or member function.
    FunctionReference(FnId),
    Invocation {
        invocable: Box<Expr>,
        arguments: Vec<Expr>,
    },
    StructInitializer {
        /// Field values in the structure's declaration order.
        fields: Vec<(Name, Expr)>,
    },
    BinaryOperator {
        op: Name,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    FieldAccess {
        base: Box<Expr>,
        steps: Vec<FieldStep>,
    },
    Dereference(Box<Expr>),
    TypeCast {
        expr: Box<Expr>,
    },
    Let {
        pattern: Pattern,
        initializer: Box<Expr>,
    },
    Return(Option<Box<Expr>>),
    SizeOf(Ty),
    /// A resolved take-reference of a local.
    Reference {
        frame_offset: u64,
        mutability: Mutness,
    },
    PlacementInit {
        lvalue: Box<Expr>,
        initializer: Box<Expr>,
    },
    Meta(Box<Expr>),
    /// A degraded subtree: an error was reported and this position carries
    /// a fresh variable so inference can continue.
    Hole,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    /// Guard expressions of the arm's pattern, recorded as side constraints
    /// of the arm. Usually zero or one.
    pub guards: Vec<Expr>,
    pub expression: Expr,
}

/// One resolved step of a member access chain.
#[derive(Debug, Clone)]
pub enum FieldStep {
    /// Tuple field by index, with its byte offset within the tuple.
    Tuple { index: u32, offset: u64 },
    /// Struct field by name, with its byte offset within the structure.
    Struct { name: Name, offset: u64 },
    /// Array or slice element by computed index.
    Index(Box<Expr>),
    /// A field whose base type was not concrete at collection time; the
    /// lookup was discharged as an instance constraint.
    Deferred { name: Name },
}

// ── Patterns ─────────────────────────────────────────────────────────────

/// A typed pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub ty: Ty,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    Wildcard,
    Binding {
        identifier: Identifier,
        frame_offset: u64,
        is_mutable: bool,
    },
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(char),
    BoolLiteral(bool),
    StringLiteral(Identifier),
    Tuple(Vec<Pattern>),
    Slice(Vec<Pattern>),
    Constructor {
        enumeration: EnumId,
        index: usize,
        payload: Option<Box<Pattern>>,
    },
    As {
        identifier: Identifier,
        frame_offset: u64,
        is_mutable: bool,
        pattern: Box<Pattern>,
    },
}
