//! High-level IR for the Tarn compiler.
//!
//! HIR is the surface AST after desugaring: `while`, `while let`, `if`,
//! `if let`, `elif`, and `for` are gone, leaving `{loop, match, block}` as
//! the only control-flow forms. Recursive nodes live in per-type arenas
//! owned by the [`Module`]; nodes refer to each other through copyable
//! arena indices that stay valid for the module's lifetime.

pub mod lower;

use la_arena::{Arena, Idx};
use tarn_common::{Identifier, SourceId, Span};

pub use tarn_ast::{IntTy, Mutability, MutabilityKind, Name};

pub type ExprId = Idx<Expr>;
pub type PatId = Idx<Pat>;
pub type TypeId = Idx<Type>;

/// The arenas owning every recursive HIR node of one module.
///
/// Append-only while the desugarer runs; indices are never invalidated
/// until the module is dropped.
#[derive(Debug, Default)]
pub struct NodeArena {
    pub exprs: Arena<Expr>,
    pub pats: Arena<Pat>,
    pub types: Arena<Type>,
}

/// A desugared module, ready for name resolution.
#[derive(Debug)]
pub struct Module {
    pub definitions: Vec<Definition>,
    /// Carried through for the driver's module graph; the semantic core
    /// does not interpret imports.
    pub imports: Vec<tarn_ast::Import>,
    pub name: Option<Name>,
    pub source: SourceId,
    pub arena: NodeArena,
}

// ── Qualified names ──────────────────────────────────────────────────────

/// Where qualified-name lookup starts.
#[derive(Debug, Clone, PartialEq)]
pub enum RootQualifier {
    /// Relative lookup from the current namespace.
    Current,
    /// Absolute lookup from the global namespace.
    Global,
    /// Absolute lookup from the associated namespace of a type.
    Type(TypeId),
}

/// One middle component of a qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub name: Name,
    pub template_args: Option<Vec<TemplateArgument>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub root: RootQualifier,
    pub middles: Vec<Qualifier>,
    pub primary: Name,
}

impl QualifiedName {
    pub fn is_unqualified(&self) -> bool {
        matches!(self.root, RootQualifier::Current) && self.middles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArgument {
    Type(TypeId),
    Mutability(Mutability),
    Wildcard(Span),
}

// ── Expressions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The post-desugar expression set: the surface set minus every derived
/// control-flow form.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(char),
    BoolLiteral(bool),
    StringLiteral(Identifier),
    ArrayLiteral(Vec<ExprId>),
    Variable(QualifiedName),
    TemplateApplication {
        name: QualifiedName,
        arguments: Vec<TemplateArgument>,
    },
    Tuple(Vec<ExprId>),
    Loop {
        body: ExprId,
    },
    Break,
    Continue,
    Block {
        effects: Vec<ExprId>,
        result: Option<ExprId>,
    },
    Invocation {
        invocable: ExprId,
        arguments: Vec<FunctionArgument>,
    },
    StructInitializer {
        ty: TypeId,
        initializers: Vec<FieldInitializer>,
    },
    BinaryOperator {
        left: ExprId,
        right: ExprId,
        op: Name,
    },
    MemberAccessChain {
        base: ExprId,
        accessors: Vec<Accessor>,
    },
    MemberInvocation {
        receiver: ExprId,
        member: Name,
        arguments: Vec<FunctionArgument>,
    },
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
    },
    Dereference(ExprId),
    TypeCast {
        expr: ExprId,
        target: TypeId,
        kind: CastKind,
    },
    Let {
        pattern: PatId,
        initializer: ExprId,
        ty: Option<TypeId>,
    },
    LocalTypeAlias {
        name: Name,
        ty: TypeId,
    },
    Return(Option<ExprId>),
    SizeOf(TypeId),
    TakeReference {
        mutability: Mutability,
        name: Name,
    },
    PlacementInit {
        lvalue: ExprId,
        initializer: ExprId,
    },
    Meta(ExprId),
    Hole,
}

pub use tarn_ast::CastKind;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: PatId,
    pub expression: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArgument {
    pub name: Option<Name>,
    pub expr: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInitializer {
    pub name: Name,
    pub expr: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessorKind {
    TupleField(i64),
    StructField(Name),
    ArrayIndex(ExprId),
}

// ── Patterns ─────────────────────────────────────────────────────────────

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
    Name {
        name: Name,
        mutability: Mutability,
    },
    Constructor {
        name: QualifiedName,
        payload: Option<PatId>,
    },
    ConstructorShorthand {
        name: Name,
        payload: Option<PatId>,
    },
    Tuple(Vec<PatId>),
    Slice(Vec<PatId>),
    As {
        binder: Name,
        mutability: Mutability,
        pattern: PatId,
    },
    Guarded {
        pattern: PatId,
        guard: ExprId,
    },
}

// ── Types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Int(IntTy),
    Float,
    Char,
    Bool,
    Str,
    Wildcard,
    Typename(QualifiedName),
    /// A reference to one of the enclosing function's implicit template
    /// parameters, identified by its synthesis tag.
    ImplicitParam(u32),
    TemplateApplication {
        name: QualifiedName,
        arguments: Vec<TemplateArgument>,
    },
    Tuple(Vec<TypeId>),
    Array {
        element: TypeId,
        length: ExprId,
    },
    Slice(TypeId),
    Function {
        parameters: Vec<TypeId>,
        return_type: TypeId,
    },
    TypeOf(ExprId),
    Reference {
        mutability: Mutability,
        inner: TypeId,
    },
}

// ── Definitions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    Function(FunctionDef),
    Struct(StructDef),
    Enum(EnumDef),
    Alias(AliasDef),
    Typeclass(TypeclassDef),
    Implementation(ImplementationDef),
    Instantiation(InstantiationDef),
    Namespace(NamespaceDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub explicit_template_parameters: Vec<TemplateParameter>,
    /// Parameters synthesized for unannotated function parameters, in the
    /// order the parameters appear. Distinct from the explicit list.
    pub implicit_template_parameters: Vec<ImplicitTemplateParameter>,
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Option<TypeId>,
    pub body: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    pub pattern: PatId,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    pub name: Name,
    pub kind: TemplateParameterKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateParameterKind {
    Type { classes: Vec<QualifiedName> },
    Mutability,
}

/// A freshly synthesized type parameter for an unannotated function
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplicitTemplateParameter {
    pub tag: u32,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub name: Name,
    pub ty: TypeId,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub constructors: Vec<EnumConstructor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstructor {
    pub name: Name,
    pub payload: Option<TypeId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDef {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeclassDef {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub function_signatures: Vec<FunctionSignature>,
    pub type_signatures: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: Name,
    pub parameter_types: Vec<TypeId>,
    pub return_type: Option<TypeId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSignature {
    pub name: Name,
    pub classes: Vec<QualifiedName>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplementationDef {
    pub target: TypeId,
    pub template_parameters: Vec<TemplateParameter>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstantiationDef {
    pub class: QualifiedName,
    pub target: TypeId,
    pub template_parameters: Vec<TemplateParameter>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDef {
    pub name: Name,
    /// Kept so the namespace builder can reject namespace templates with a
    /// proper diagnostic.
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub definitions: Vec<Definition>,
}
