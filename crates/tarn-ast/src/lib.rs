//! Surface AST for the Tarn compiler.
//!
//! This crate is the input contract of the semantic pipeline: a parser (an
//! external collaborator) produces these trees, and the desugarer in
//! `tarn-hir` consumes them. Every derived syntactic form the language has
//! -- `while`, `while let`, `if`, `if let`, `elif`, `for` -- is still
//! present here; the desugarer collapses them.

pub mod expr;
pub mod item;
pub mod pat;
pub mod ty;

use tarn_common::{Identifier, Interner, Span};

pub use expr::{
    Accessor, AccessorKind, CastKind, ElifArm, Expr, ExprKind, FieldInitializer,
    FunctionArgument, MatchArm,
};
pub use item::{
    AliasDef, Definition, DefinitionKind, EnumConstructor, EnumDef, FunctionDef,
    FunctionParameter, FunctionSignature, ImplementationDef, Import, InstantiationDef,
    Module, NamespaceDef, StructDef, StructMember, TypeSignature, TypeclassDef,
};
pub use pat::{Pat, PatKind};
pub use ty::{IntTy, Type, TypeKind};

/// A source-level name: an interned identifier plus a cached case bit.
///
/// `is_upper` is a property of the first byte of the identifier text,
/// cached at construction. The resolver uses it to reject lowercase names
/// where types are expected and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub id: Identifier,
    pub is_upper: bool,
    pub span: Span,
}

impl Name {
    /// Build a name, caching the case of the identifier's first byte.
    pub fn new(interner: &Interner, id: Identifier, span: Span) -> Self {
        let is_upper = interner
            .view(id)
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_uppercase());
        Self { id, is_upper, span }
    }
}

/// Mutability as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutability {
    pub kind: MutabilityKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutabilityKind {
    Immut,
    Mut,
    /// `mut?m` -- mutability abstracted over a template parameter.
    Parameterized(Identifier),
}

impl Mutability {
    pub fn immutable(span: Span) -> Self {
        Self { kind: MutabilityKind::Immut, span }
    }
}

/// The root of a qualified name: where lookup starts.
#[derive(Debug, Clone, PartialEq)]
pub enum RootQualifier {
    /// No qualifier: relative lookup from the current namespace.
    Current,
    /// `global::...`: absolute lookup from the global namespace.
    Global,
    /// `T::...`: absolute lookup from the associated namespace of `T`.
    Type(Box<Type>),
}

/// One middle component of a qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub name: Name,
    /// Template arguments applied to this component, if any. The component
    /// preceding an argument list must name a type template.
    pub template_args: Option<Vec<TemplateArgument>>,
    pub span: Span,
}

/// A possibly-qualified name, e.g. `global::vec::Vector::new`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub root: RootQualifier,
    pub middles: Vec<Qualifier>,
    pub primary: Name,
}

impl QualifiedName {
    /// An unqualified name looked up relative to the current namespace.
    pub fn plain(primary: Name) -> Self {
        Self { root: RootQualifier::Current, middles: Vec::new(), primary }
    }

    pub fn is_unqualified(&self) -> bool {
        matches!(self.root, RootQualifier::Current) && self.middles.is_empty()
    }
}

/// An argument to a template application.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArgument {
    Type(Type),
    Mutability(Mutability),
    Wildcard(Span),
}

/// A declared template parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    pub name: Name,
    pub kind: TemplateParameterKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateParameterKind {
    /// `T` or `T: Class + ...`.
    Type { classes: Vec<QualifiedName> },
    /// `m: mut`.
    Mutability,
}

