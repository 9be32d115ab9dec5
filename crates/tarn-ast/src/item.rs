//! Surface definitions (top-level and nested items).

use tarn_common::{SourceId, Span};

use crate::expr::Expr;
use crate::pat::Pat;
use crate::ty::Type;
use crate::{Name, QualifiedName, TemplateParameter};

/// A parsed module: the unit handed to the semantic core.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub definitions: Vec<Definition>,
    /// Imports are recorded here for the driver's module graph; the
    /// semantic core carries them through untouched.
    pub imports: Vec<Import>,
    pub name: Option<Name>,
    pub source: SourceId,
}

/// `import a::b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: Vec<Name>,
    pub span: Span,
}

/// A surface definition with its source span.
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

/// `fn name[T, ...](params) -> R = body`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Option<Type>,
    pub body: Expr,
}

/// One function parameter. A parameter without a type annotation yields an
/// implicit template parameter during desugaring.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    pub pattern: Pat,
    pub ty: Option<Type>,
}

/// `struct Name[T, ...] = member: Type, ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: Name,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub name: Name,
    pub ty: Type,
    pub is_public: bool,
    pub span: Span,
}

/// `enum Name[T, ...] = ctor(Type) | ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: Name,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub constructors: Vec<EnumConstructor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstructor {
    pub name: Name,
    pub payload: Option<Type>,
    pub span: Span,
}

/// `alias Name[T, ...] = Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDef {
    pub name: Name,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub ty: Type,
}

/// `class Name[T, ...] { fn ...; alias ...; }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeclassDef {
    pub name: Name,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub function_signatures: Vec<FunctionSignature>,
    pub type_signatures: Vec<TypeSignature>,
}

/// A required function in a typeclass body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: Name,
    pub parameter_types: Vec<Type>,
    pub return_type: Option<Type>,
    pub span: Span,
}

/// A required associated type in a typeclass body.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSignature {
    pub name: Name,
    pub classes: Vec<QualifiedName>,
    pub span: Span,
}

/// `impl Type { definitions }` -- inherent members of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplementationDef {
    pub target: Type,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub definitions: Vec<Definition>,
}

/// `inst Class for Type { definitions }` -- a typeclass instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantiationDef {
    pub class: QualifiedName,
    pub target: Type,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub definitions: Vec<Definition>,
}

/// `namespace name { definitions }`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDef {
    pub name: Name,
    pub template_parameters: Option<Vec<TemplateParameter>>,
    pub definitions: Vec<Definition>,
}
