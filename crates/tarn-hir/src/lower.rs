//! The desugarer: surface AST to HIR.
//!
//! Collapses every derived control-flow form into the primitive set
//! `{loop, match, block}`:
//!
//! - `while c { b }`      -> `loop { match c { true -> b, false -> break } }`
//! - `while let p = e { b }` -> `loop { match e { p -> b, _ -> break } }`
//! - `if c { t } else { f }` -> `match c { true -> t, false -> f }`
//! - `if let p = e { t } else { f }` -> `match e { p -> t, _ -> f }`
//! - `elif` chains nest by left-association; an omitted `else` becomes `()`.
//!
//! Rewritten nodes keep the span of the surface node they replace;
//! synthesized subnodes carry the span of the surface subnode they derive
//! from, or an empty span when fully synthetic.
//!
//! Function lowering also synthesizes one implicit template parameter per
//! unannotated function parameter.

use tarn_ast as ast;
use tarn_common::{DiagnosticSink, Label, Span};

use crate::{
    Accessor, AccessorKind, AliasDef, Definition, DefinitionKind, EnumConstructor, EnumDef,
    Expr, ExprId, ExprKind, FieldInitializer, FunctionArgument, FunctionDef, FunctionParameter,
    FunctionSignature, ImplementationDef, ImplicitTemplateParameter, InstantiationDef, MatchArm,
    Module, NamespaceDef, NodeArena, Pat, PatId, PatKind, QualifiedName, Qualifier,
    RootQualifier, StructDef, StructMember, TemplateArgument, TemplateParameter,
    TemplateParameterKind, Type, TypeclassDef, TypeId, TypeKind, TypeSignature,
};

/// Desugar one parsed module.
pub fn desugar(module: &ast::Module, sink: &mut DiagnosticSink) -> Module {
    let mut cx = LowerCx {
        arena: NodeArena::default(),
        sink,
        source: module.source,
        implicit_params: None,
        next_implicit_tag: 0,
    };
    let definitions = module.definitions.iter().map(|d| cx.lower_definition(d)).collect();
    Module {
        definitions,
        imports: module.imports.clone(),
        name: module.name,
        source: module.source,
        arena: cx.arena,
    }
}

struct LowerCx<'a> {
    arena: NodeArena,
    sink: &'a mut DiagnosticSink,
    source: tarn_common::SourceId,
    /// The implicit-parameter collector of the function currently being
    /// lowered, if any. Parameters are lowered before anything else of the
    /// function so the list is complete when the signature is assembled.
    implicit_params: Option<Vec<ImplicitTemplateParameter>>,
    next_implicit_tag: u32,
}

impl LowerCx<'_> {
    fn synthetic(&self) -> Span {
        Span::empty(self.source)
    }

    fn expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.exprs.alloc(Expr { kind, span })
    }

    fn pat(&mut self, kind: PatKind, span: Span) -> PatId {
        self.arena.pats.alloc(Pat { kind, span })
    }

    fn ty(&mut self, kind: TypeKind, span: Span) -> TypeId {
        self.arena.types.alloc(Type { kind, span })
    }

    /// The unit value, `()`.
    fn unit_value(&mut self, span: Span) -> ExprId {
        self.expr(ExprKind::Tuple(Vec::new()), span)
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn lower_expr(&mut self, expr: &ast::Expr) -> ExprId {
        let span = expr.span;
        match &expr.kind {
            ast::ExprKind::IntLiteral(value) => self.expr(ExprKind::IntLiteral(*value), span),
            ast::ExprKind::FloatLiteral(value) => {
                self.expr(ExprKind::FloatLiteral(*value), span)
            }
            ast::ExprKind::CharLiteral(value) => self.expr(ExprKind::CharLiteral(*value), span),
            ast::ExprKind::BoolLiteral(value) => self.expr(ExprKind::BoolLiteral(*value), span),
            ast::ExprKind::StringLiteral(value) => {
                self.expr(ExprKind::StringLiteral(*value), span)
            }
            ast::ExprKind::ArrayLiteral(elements) => {
                let elements = elements.iter().map(|e| self.lower_expr(e)).collect();
                self.expr(ExprKind::ArrayLiteral(elements), span)
            }
            ast::ExprKind::Variable(name) => {
                let name = self.lower_qualified_name(name);
                self.expr(ExprKind::Variable(name), span)
            }
            ast::ExprKind::TemplateApplication { name, arguments } => {
                let name = self.lower_qualified_name(name);
                let arguments =
                    arguments.iter().map(|a| self.lower_template_argument(a)).collect();
                self.expr(ExprKind::TemplateApplication { name, arguments }, span)
            }
            ast::ExprKind::Tuple(elements) => {
                let elements = elements.iter().map(|e| self.lower_expr(e)).collect();
                self.expr(ExprKind::Tuple(elements), span)
            }
            ast::ExprKind::Block { effects, result } => {
                let effects = effects.iter().map(|e| self.lower_expr(e)).collect();
                let result = result.as_deref().map(|e| self.lower_expr(e));
                self.expr(ExprKind::Block { effects, result }, span)
            }
            ast::ExprKind::Conditional {
                condition,
                true_branch,
                elif_arms,
                false_branch,
            } => self.lower_conditional(
                condition,
                true_branch,
                elif_arms,
                false_branch.as_deref(),
                span,
            ),
            ast::ExprKind::ConditionalLet { .. } => {
                // The parser only produces conditional-let in if/while head
                // position; both are consumed by the rewrites above.
                unreachable!("conditional let outside the head of an `if` or `while`")
            }
            ast::ExprKind::Match { scrutinee, arms } => {
                let scrutinee = self.lower_expr(scrutinee);
                let arms = arms
                    .iter()
                    .map(|arm| MatchArm {
                        pattern: self.lower_pat(&arm.pattern),
                        expression: self.lower_expr(&arm.expression),
                    })
                    .collect();
                self.expr(ExprKind::Match { scrutinee, arms }, span)
            }
            ast::ExprKind::While { condition, body } => {
                self.lower_while(condition, body, span)
            }
            ast::ExprKind::Loop { body } => {
                let body = self.lower_expr(body);
                self.expr(ExprKind::Loop { body }, span)
            }
            ast::ExprKind::For { .. } => {
                self.sink.error(
                    "`for` loops are not supported yet",
                    vec![Label::new(span, "cannot lower this loop")],
                );
                self.unit_value(span)
            }
            ast::ExprKind::Invocation { invocable, arguments } => {
                let invocable = self.lower_expr(invocable);
                let arguments =
                    arguments.iter().map(|a| self.lower_function_argument(a)).collect();
                self.expr(ExprKind::Invocation { invocable, arguments }, span)
            }
            ast::ExprKind::StructInitializer { ty, initializers } => {
                let ty = self.lower_type(ty);
                let initializers = initializers
                    .iter()
                    .map(|init| FieldInitializer {
                        name: init.name,
                        expr: self.lower_expr(&init.expr),
                    })
                    .collect();
                self.expr(ExprKind::StructInitializer { ty, initializers }, span)
            }
            ast::ExprKind::BinaryOperator { left, right, op } => {
                let left = self.lower_expr(left);
                let right = self.lower_expr(right);
                self.expr(ExprKind::BinaryOperator { left, right, op: *op }, span)
            }
            ast::ExprKind::MemberAccessChain { base, accessors } => {
                let base = self.lower_expr(base);
                let accessors =
                    accessors.iter().map(|a| self.lower_accessor(a)).collect();
                self.expr(ExprKind::MemberAccessChain { base, accessors }, span)
            }
            ast::ExprKind::MemberInvocation { receiver, member, arguments } => {
                let receiver = self.lower_expr(receiver);
                let arguments =
                    arguments.iter().map(|a| self.lower_function_argument(a)).collect();
                self.expr(
                    ExprKind::MemberInvocation { receiver, member: *member, arguments },
                    span,
                )
            }
            ast::ExprKind::Dereference(inner) => {
                let inner = self.lower_expr(inner);
                self.expr(ExprKind::Dereference(inner), span)
            }
            ast::ExprKind::TypeCast { expr, target, kind } => {
                let expr = self.lower_expr(expr);
                let target = self.lower_type(target);
                self.expr(ExprKind::TypeCast { expr, target, kind: *kind }, span)
            }
            ast::ExprKind::Let { pattern, initializer, ty } => {
                let pattern = self.lower_pat(pattern);
                let initializer = self.lower_expr(initializer);
                let ty = ty.as_deref().map(|t| self.lower_type(t));
                self.expr(ExprKind::Let { pattern, initializer, ty }, span)
            }
            ast::ExprKind::LocalTypeAlias { name, ty } => {
                let ty = self.lower_type(ty);
                self.expr(ExprKind::LocalTypeAlias { name: *name, ty }, span)
            }
            ast::ExprKind::Return(value) => {
                let value = value.as_deref().map(|e| self.lower_expr(e));
                self.expr(ExprKind::Return(value), span)
            }
            ast::ExprKind::Break { label, value } => {
                if label.is_some() || value.is_some() {
                    self.sink.error(
                        "labeled and value-carrying `break` is not supported yet",
                        vec![Label::new(span, "only plain `break` is lowered")],
                    );
                }
                self.expr(ExprKind::Break, span)
            }
            ast::ExprKind::Continue => self.expr(ExprKind::Continue, span),
            ast::ExprKind::SizeOf(ty) => {
                let ty = self.lower_type(ty);
                self.expr(ExprKind::SizeOf(ty), span)
            }
            ast::ExprKind::TakeReference { mutability, name } => self.expr(
                ExprKind::TakeReference { mutability: *mutability, name: *name },
                span,
            ),
            ast::ExprKind::PlacementInit { lvalue, initializer } => {
                let lvalue = self.lower_expr(lvalue);
                let initializer = self.lower_expr(initializer);
                self.expr(ExprKind::PlacementInit { lvalue, initializer }, span)
            }
            ast::ExprKind::Meta(inner) => {
                let inner = self.lower_expr(inner);
                self.expr(ExprKind::Meta(inner), span)
            }
            ast::ExprKind::Hole => self.expr(ExprKind::Hole, span),
        }
    }

    /// `while c { b }` and `while let p = e { b }`.
    fn lower_while(&mut self, condition: &ast::Expr, body: &ast::Expr, span: Span) -> ExprId {
        let arms = if let ast::ExprKind::ConditionalLet { pattern, initializer } =
            &condition.kind
        {
            let scrutinee = self.lower_expr(initializer);
            let pattern = self.lower_pat(pattern);
            let body = self.lower_expr(body);
            let wildcard = self.pat(PatKind::Wildcard, self.synthetic());
            let brk = self.expr(ExprKind::Break, self.synthetic());
            (scrutinee, pattern, body, wildcard, brk)
        } else {
            match &condition.kind {
                ast::ExprKind::BoolLiteral(true) => self.sink.note(
                    "consider using `loop` instead of `while true`",
                    vec![Label::new(condition.span, "this condition is always true")],
                ),
                ast::ExprKind::BoolLiteral(false) => self.sink.warning(
                    "this loop body is never run",
                    vec![Label::new(condition.span, "this condition is always false")],
                ),
                _ => {}
            }
            let scrutinee = self.lower_expr(condition);
            let body = self.lower_expr(body);
            let true_pat = self.pat(PatKind::BoolLiteral(true), self.synthetic());
            let false_pat = self.pat(PatKind::BoolLiteral(false), self.synthetic());
            let brk = self.expr(ExprKind::Break, self.synthetic());
            (scrutinee, true_pat, body, false_pat, brk)
        };
        let (scrutinee, continue_pat, continue_body, exit_pat, exit_body) = arms;
        let match_id = self.expr(
            ExprKind::Match {
                scrutinee,
                arms: vec![
                    MatchArm { pattern: continue_pat, expression: continue_body },
                    MatchArm { pattern: exit_pat, expression: exit_body },
                ],
            },
            span,
        );
        self.expr(ExprKind::Loop { body: match_id }, span)
    }

    /// `if`/`if let` with an `elif` chain, nested by left-association.
    fn lower_conditional(
        &mut self,
        condition: &ast::Expr,
        true_branch: &ast::Expr,
        elif_arms: &[ast::ElifArm],
        false_branch: Option<&ast::Expr>,
        span: Span,
    ) -> ExprId {
        let else_id = if let Some((head, rest)) = elif_arms.split_first() {
            self.lower_conditional(&head.condition, &head.body, rest, false_branch, head.span)
        } else if let Some(false_branch) = false_branch {
            self.lower_expr(false_branch)
        } else {
            let span = self.synthetic();
            self.unit_value(span)
        };

        if let ast::ExprKind::ConditionalLet { pattern, initializer } = &condition.kind {
            let scrutinee = self.lower_expr(initializer);
            let pattern = self.lower_pat(pattern);
            let true_id = self.lower_expr(true_branch);
            let wildcard = self.pat(PatKind::Wildcard, self.synthetic());
            return self.expr(
                ExprKind::Match {
                    scrutinee,
                    arms: vec![
                        MatchArm { pattern, expression: true_id },
                        MatchArm { pattern: wildcard, expression: else_id },
                    ],
                },
                span,
            );
        }

        match &condition.kind {
            ast::ExprKind::BoolLiteral(true) => self.sink.warning(
                "this condition is always true",
                vec![Label::new(condition.span, "literal `true` condition")],
            ),
            ast::ExprKind::BoolLiteral(false) => self.sink.warning(
                "this condition is always false",
                vec![Label::new(condition.span, "literal `false` condition")],
            ),
            _ => {}
        }
        let scrutinee = self.lower_expr(condition);
        let true_id = self.lower_expr(true_branch);
        let true_pat = self.pat(PatKind::BoolLiteral(true), self.synthetic());
        let false_pat = self.pat(PatKind::BoolLiteral(false), self.synthetic());
        self.expr(
            ExprKind::Match {
                scrutinee,
                arms: vec![
                    MatchArm { pattern: true_pat, expression: true_id },
                    MatchArm { pattern: false_pat, expression: else_id },
                ],
            },
            span,
        )
    }

    fn lower_function_argument(&mut self, argument: &ast::FunctionArgument) -> FunctionArgument {
        FunctionArgument { name: argument.name, expr: self.lower_expr(&argument.expr) }
    }

    fn lower_accessor(&mut self, accessor: &ast::Accessor) -> Accessor {
        let kind = match &accessor.kind {
            ast::AccessorKind::TupleField(index) => AccessorKind::TupleField(*index),
            ast::AccessorKind::StructField(name) => AccessorKind::StructField(*name),
            ast::AccessorKind::ArrayIndex(index) => {
                AccessorKind::ArrayIndex(self.lower_expr(index))
            }
        };
        Accessor { kind, span: accessor.span }
    }

    // ── Patterns ─────────────────────────────────────────────────────

    fn lower_pat(&mut self, pat: &ast::Pat) -> PatId {
        let span = pat.span;
        let kind = match &pat.kind {
            ast::PatKind::IntLiteral(value) => PatKind::IntLiteral(*value),
            ast::PatKind::FloatLiteral(value) => PatKind::FloatLiteral(*value),
            ast::PatKind::CharLiteral(value) => PatKind::CharLiteral(*value),
            ast::PatKind::BoolLiteral(value) => PatKind::BoolLiteral(*value),
            ast::PatKind::StringLiteral(value) => PatKind::StringLiteral(*value),
            ast::PatKind::Wildcard => PatKind::Wildcard,
            ast::PatKind::Name { name, mutability } => {
                PatKind::Name { name: *name, mutability: *mutability }
            }
            ast::PatKind::Constructor { name, payload } => PatKind::Constructor {
                name: self.lower_qualified_name(name),
                payload: payload.as_deref().map(|p| self.lower_pat(p)),
            },
            ast::PatKind::ConstructorShorthand { name, payload } => {
                PatKind::ConstructorShorthand {
                    name: *name,
                    payload: payload.as_deref().map(|p| self.lower_pat(p)),
                }
            }
            ast::PatKind::Tuple(patterns) => {
                PatKind::Tuple(patterns.iter().map(|p| self.lower_pat(p)).collect())
            }
            ast::PatKind::Slice(patterns) => {
                PatKind::Slice(patterns.iter().map(|p| self.lower_pat(p)).collect())
            }
            ast::PatKind::As { binder, mutability, pattern } => PatKind::As {
                binder: *binder,
                mutability: *mutability,
                pattern: self.lower_pat(pattern),
            },
            ast::PatKind::Guarded { pattern, guard } => PatKind::Guarded {
                pattern: self.lower_pat(pattern),
                guard: self.lower_expr(guard),
            },
        };
        self.pat(kind, span)
    }

    // ── Types ────────────────────────────────────────────────────────

    fn lower_type(&mut self, ty: &ast::Type) -> TypeId {
        let span = ty.span;
        let kind = match &ty.kind {
            ast::TypeKind::Int(width) => TypeKind::Int(*width),
            ast::TypeKind::Float => TypeKind::Float,
            ast::TypeKind::Char => TypeKind::Char,
            ast::TypeKind::Bool => TypeKind::Bool,
            ast::TypeKind::Str => TypeKind::Str,
            ast::TypeKind::Wildcard => TypeKind::Wildcard,
            ast::TypeKind::Typename(name) => {
                TypeKind::Typename(self.lower_qualified_name(name))
            }
            ast::TypeKind::TemplateApplication { name, arguments } => {
                TypeKind::TemplateApplication {
                    name: self.lower_qualified_name(name),
                    arguments: arguments
                        .iter()
                        .map(|a| self.lower_template_argument(a))
                        .collect(),
                }
            }
            ast::TypeKind::Tuple(types) => {
                TypeKind::Tuple(types.iter().map(|t| self.lower_type(t)).collect())
            }
            ast::TypeKind::Array { element, length } => TypeKind::Array {
                element: self.lower_type(element),
                length: self.lower_expr(length),
            },
            ast::TypeKind::Slice(element) => TypeKind::Slice(self.lower_type(element)),
            ast::TypeKind::Function { parameters, return_type } => TypeKind::Function {
                parameters: parameters.iter().map(|t| self.lower_type(t)).collect(),
                return_type: self.lower_type(return_type),
            },
            ast::TypeKind::TypeOf(expr) => TypeKind::TypeOf(self.lower_expr(expr)),
            ast::TypeKind::Reference { mutability, inner } => TypeKind::Reference {
                mutability: *mutability,
                inner: self.lower_type(inner),
            },
        };
        self.ty(kind, span)
    }

    fn lower_qualified_name(&mut self, name: &ast::QualifiedName) -> QualifiedName {
        let root = match &name.root {
            ast::RootQualifier::Current => RootQualifier::Current,
            ast::RootQualifier::Global => RootQualifier::Global,
            ast::RootQualifier::Type(ty) => RootQualifier::Type(self.lower_type(ty)),
        };
        let middles = name
            .middles
            .iter()
            .map(|qualifier| Qualifier {
                name: qualifier.name,
                template_args: qualifier.template_args.as_ref().map(|args| {
                    args.iter().map(|a| self.lower_template_argument(a)).collect()
                }),
                span: qualifier.span,
            })
            .collect();
        QualifiedName { root, middles, primary: name.primary }
    }

    fn lower_template_argument(&mut self, argument: &ast::TemplateArgument) -> TemplateArgument {
        match argument {
            ast::TemplateArgument::Type(ty) => TemplateArgument::Type(self.lower_type(ty)),
            ast::TemplateArgument::Mutability(m) => TemplateArgument::Mutability(*m),
            ast::TemplateArgument::Wildcard(span) => TemplateArgument::Wildcard(*span),
        }
    }

    // ── Definitions ──────────────────────────────────────────────────

    fn lower_definition(&mut self, definition: &ast::Definition) -> Definition {
        let span = definition.span;
        let kind = match &definition.kind {
            ast::DefinitionKind::Function(function) => {
                DefinitionKind::Function(self.lower_function(function))
            }
            ast::DefinitionKind::Struct(structure) => DefinitionKind::Struct(StructDef {
                name: structure.name,
                template_parameters: self
                    .lower_template_parameters(&structure.template_parameters),
                members: structure
                    .members
                    .iter()
                    .map(|member| StructMember {
                        name: member.name,
                        ty: self.lower_type(&member.ty),
                        is_public: member.is_public,
                        span: member.span,
                    })
                    .collect(),
            }),
            ast::DefinitionKind::Enum(enumeration) => DefinitionKind::Enum(EnumDef {
                name: enumeration.name,
                template_parameters: self
                    .lower_template_parameters(&enumeration.template_parameters),
                constructors: enumeration
                    .constructors
                    .iter()
                    .map(|ctor| EnumConstructor {
                        name: ctor.name,
                        payload: ctor.payload.as_ref().map(|t| self.lower_type(t)),
                        span: ctor.span,
                    })
                    .collect(),
            }),
            ast::DefinitionKind::Alias(alias) => DefinitionKind::Alias(AliasDef {
                name: alias.name,
                template_parameters: self.lower_template_parameters(&alias.template_parameters),
                ty: self.lower_type(&alias.ty),
            }),
            ast::DefinitionKind::Typeclass(class) => DefinitionKind::Typeclass(TypeclassDef {
                name: class.name,
                template_parameters: self.lower_template_parameters(&class.template_parameters),
                function_signatures: class
                    .function_signatures
                    .iter()
                    .map(|signature| FunctionSignature {
                        name: signature.name,
                        parameter_types: signature
                            .parameter_types
                            .iter()
                            .map(|t| self.lower_type(t))
                            .collect(),
                        return_type: signature.return_type.as_ref().map(|t| self.lower_type(t)),
                        span: signature.span,
                    })
                    .collect(),
                type_signatures: class
                    .type_signatures
                    .iter()
                    .map(|signature| TypeSignature {
                        name: signature.name,
                        classes: signature
                            .classes
                            .iter()
                            .map(|c| self.lower_qualified_name(c))
                            .collect(),
                        span: signature.span,
                    })
                    .collect(),
            }),
            ast::DefinitionKind::Implementation(implementation) => {
                DefinitionKind::Implementation(ImplementationDef {
                    target: self.lower_type(&implementation.target),
                    template_parameters: self
                        .lower_template_parameters(&implementation.template_parameters),
                    definitions: implementation
                        .definitions
                        .iter()
                        .map(|d| self.lower_definition(d))
                        .collect(),
                })
            }
            ast::DefinitionKind::Instantiation(instantiation) => {
                DefinitionKind::Instantiation(InstantiationDef {
                    class: self.lower_qualified_name(&instantiation.class),
                    target: self.lower_type(&instantiation.target),
                    template_parameters: self
                        .lower_template_parameters(&instantiation.template_parameters),
                    definitions: instantiation
                        .definitions
                        .iter()
                        .map(|d| self.lower_definition(d))
                        .collect(),
                })
            }
            ast::DefinitionKind::Namespace(namespace) => {
                DefinitionKind::Namespace(NamespaceDef {
                    name: namespace.name,
                    template_parameters: namespace.template_parameters.as_ref().map(|params| {
                        params.iter().map(|p| self.lower_template_parameter(p)).collect()
                    }),
                    definitions: namespace
                        .definitions
                        .iter()
                        .map(|d| self.lower_definition(d))
                        .collect(),
                })
            }
        };
        Definition { kind, span }
    }

    fn lower_function(&mut self, function: &ast::FunctionDef) -> FunctionDef {
        // Function bodies cannot contain further function definitions, so
        // the collector is free here.
        debug_assert!(self.implicit_params.is_none());
        self.implicit_params = Some(Vec::new());

        // Parameters first: unannotated ones feed the implicit list.
        let parameters = function
            .parameters
            .iter()
            .map(|p| self.lower_function_parameter(p))
            .collect();
        let implicit_template_parameters =
            self.implicit_params.take().unwrap_or_default();

        FunctionDef {
            name: function.name,
            explicit_template_parameters: self
                .lower_template_parameters(&function.template_parameters),
            implicit_template_parameters,
            parameters,
            return_type: function.return_type.as_ref().map(|t| self.lower_type(t)),
            body: self.lower_expr(&function.body),
        }
    }

    fn lower_function_parameter(&mut self, parameter: &ast::FunctionParameter) -> FunctionParameter {
        let pattern = self.lower_pat(&parameter.pattern);
        let ty = match &parameter.ty {
            Some(ty) => self.lower_type(ty),
            None => {
                let tag = self.next_implicit_tag;
                self.next_implicit_tag += 1;
                let span = parameter.pattern.span;
                if let Some(params) = self.implicit_params.as_mut() {
                    params.push(ImplicitTemplateParameter { tag, span });
                }
                self.ty(TypeKind::ImplicitParam(tag), span)
            }
        };
        FunctionParameter { pattern, ty }
    }

    fn lower_template_parameters(
        &mut self,
        parameters: &Option<Vec<ast::TemplateParameter>>,
    ) -> Vec<TemplateParameter> {
        parameters
            .as_ref()
            .map(|params| params.iter().map(|p| self.lower_template_parameter(p)).collect())
            .unwrap_or_default()
    }

    fn lower_template_parameter(&mut self, parameter: &ast::TemplateParameter) -> TemplateParameter {
        let kind = match &parameter.kind {
            ast::TemplateParameterKind::Type { classes } => TemplateParameterKind::Type {
                classes: classes.iter().map(|c| self.lower_qualified_name(c)).collect(),
            },
            ast::TemplateParameterKind::Mutability => TemplateParameterKind::Mutability,
        };
        TemplateParameter { name: parameter.name, kind, span: parameter.span }
    }
}
