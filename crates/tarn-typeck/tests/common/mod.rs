//! Shared test harness: a tiny AST builder plus the full pipeline
//! (desugar, then check) wired to one interner and sink.

#![allow(dead_code)]

use tarn_ast as ast;
use tarn_common::{Diagnostic, DiagnosticSink, Interner, Severity, SourceId, Span};
use tarn_typeck::mir;

pub const SRC: SourceId = SourceId(0);

pub struct TestCx {
    pub interner: Interner,
    pub sink: DiagnosticSink,
    next_offset: u32,
}

impl TestCx {
    pub fn new() -> Self {
        TestCx {
            interner: Interner::new(),
            sink: DiagnosticSink::default(),
            next_offset: 0,
        }
    }

    /// A fresh, distinct span; tests only need spans to differ.
    pub fn span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 4;
        Span::new(SRC, start, start + 3)
    }

    pub fn name(&mut self, text: &str) -> ast::Name {
        let span = self.span();
        let id = self.interner.intern(text);
        ast::Name::new(&self.interner, id, span)
    }

    pub fn plain(&mut self, text: &str) -> ast::QualifiedName {
        let name = self.name(text);
        ast::QualifiedName::plain(name)
    }

    pub fn path(&mut self, qualifiers: &[&str], primary: &str) -> ast::QualifiedName {
        let middles = qualifiers
            .iter()
            .map(|q| {
                let name = self.name(q);
                ast::Qualifier { name, template_args: None, span: name.span }
            })
            .collect();
        ast::QualifiedName {
            root: ast::RootQualifier::Current,
            middles,
            primary: self.name(primary),
        }
    }

    // ── Expressions ─────────────────────────────────────────────────

    pub fn expr(&mut self, kind: ast::ExprKind) -> ast::Expr {
        ast::Expr { kind, span: self.span() }
    }

    pub fn int(&mut self, value: i64) -> ast::Expr {
        self.expr(ast::ExprKind::IntLiteral(value))
    }

    pub fn float(&mut self, value: f64) -> ast::Expr {
        self.expr(ast::ExprKind::FloatLiteral(value))
    }

    pub fn char_lit(&mut self, value: char) -> ast::Expr {
        self.expr(ast::ExprKind::CharLiteral(value))
    }

    pub fn bool_lit(&mut self, value: bool) -> ast::Expr {
        self.expr(ast::ExprKind::BoolLiteral(value))
    }

    pub fn unit(&mut self) -> ast::Expr {
        self.expr(ast::ExprKind::Tuple(Vec::new()))
    }

    pub fn tuple(&mut self, elements: Vec<ast::Expr>) -> ast::Expr {
        self.expr(ast::ExprKind::Tuple(elements))
    }

    pub fn array(&mut self, elements: Vec<ast::Expr>) -> ast::Expr {
        self.expr(ast::ExprKind::ArrayLiteral(elements))
    }

    pub fn var(&mut self, text: &str) -> ast::Expr {
        let name = self.plain(text);
        self.expr(ast::ExprKind::Variable(name))
    }

    pub fn var_path(&mut self, name: ast::QualifiedName) -> ast::Expr {
        self.expr(ast::ExprKind::Variable(name))
    }

    pub fn binop(&mut self, op: &str, left: ast::Expr, right: ast::Expr) -> ast::Expr {
        let op = self.name(op);
        self.expr(ast::ExprKind::BinaryOperator {
            left: Box::new(left),
            right: Box::new(right),
            op,
        })
    }

    pub fn call(&mut self, invocable: ast::Expr, arguments: Vec<ast::Expr>) -> ast::Expr {
        let arguments = arguments
            .into_iter()
            .map(|expr| ast::FunctionArgument { name: None, expr })
            .collect();
        self.expr(ast::ExprKind::Invocation { invocable: Box::new(invocable), arguments })
    }

    pub fn member_call(
        &mut self,
        receiver: ast::Expr,
        member: &str,
        arguments: Vec<ast::Expr>,
    ) -> ast::Expr {
        let member = self.name(member);
        let arguments = arguments
            .into_iter()
            .map(|expr| ast::FunctionArgument { name: None, expr })
            .collect();
        self.expr(ast::ExprKind::MemberInvocation {
            receiver: Box::new(receiver),
            member,
            arguments,
        })
    }

    pub fn field(&mut self, base: ast::Expr, field: &str) -> ast::Expr {
        let name = self.name(field);
        let accessor = ast::Accessor {
            kind: ast::AccessorKind::StructField(name),
            span: name.span,
        };
        self.expr(ast::ExprKind::MemberAccessChain {
            base: Box::new(base),
            accessors: vec![accessor],
        })
    }

    pub fn tuple_field(&mut self, base: ast::Expr, index: i64) -> ast::Expr {
        let span = self.span();
        let accessor = ast::Accessor { kind: ast::AccessorKind::TupleField(index), span };
        self.expr(ast::ExprKind::MemberAccessChain {
            base: Box::new(base),
            accessors: vec![accessor],
        })
    }

    pub fn block(&mut self, effects: Vec<ast::Expr>, result: Option<ast::Expr>) -> ast::Expr {
        self.expr(ast::ExprKind::Block { effects, result: result.map(Box::new) })
    }

    pub fn let_binding(
        &mut self,
        name: &str,
        ty: Option<ast::Type>,
        initializer: ast::Expr,
    ) -> ast::Expr {
        let pattern = self.pat_name(name);
        self.expr(ast::ExprKind::Let {
            pattern: Box::new(pattern),
            initializer: Box::new(initializer),
            ty: ty.map(Box::new),
        })
    }

    pub fn let_pattern(&mut self, pattern: ast::Pat, initializer: ast::Expr) -> ast::Expr {
        self.expr(ast::ExprKind::Let {
            pattern: Box::new(pattern),
            initializer: Box::new(initializer),
            ty: None,
        })
    }

    pub fn if_else(
        &mut self,
        condition: ast::Expr,
        true_branch: ast::Expr,
        false_branch: Option<ast::Expr>,
    ) -> ast::Expr {
        self.expr(ast::ExprKind::Conditional {
            condition: Box::new(condition),
            true_branch: Box::new(true_branch),
            elif_arms: Vec::new(),
            false_branch: false_branch.map(Box::new),
        })
    }

    pub fn while_loop(&mut self, condition: ast::Expr, body: ast::Expr) -> ast::Expr {
        self.expr(ast::ExprKind::While {
            condition: Box::new(condition),
            body: Box::new(body),
        })
    }

    pub fn match_expr(
        &mut self,
        scrutinee: ast::Expr,
        arms: Vec<(ast::Pat, ast::Expr)>,
    ) -> ast::Expr {
        let arms = arms
            .into_iter()
            .map(|(pattern, expression)| ast::MatchArm { pattern, expression })
            .collect();
        self.expr(ast::ExprKind::Match { scrutinee: Box::new(scrutinee), arms })
    }

    pub fn ascribe(&mut self, expr: ast::Expr, ty: ast::Type) -> ast::Expr {
        self.expr(ast::ExprKind::TypeCast {
            expr: Box::new(expr),
            target: Box::new(ty),
            kind: ast::CastKind::Ascription,
        })
    }

    pub fn convert(&mut self, expr: ast::Expr, ty: ast::Type) -> ast::Expr {
        self.expr(ast::ExprKind::TypeCast {
            expr: Box::new(expr),
            target: Box::new(ty),
            kind: ast::CastKind::Conversion,
        })
    }

    pub fn struct_init(&mut self, ty: ast::Type, fields: Vec<(&str, ast::Expr)>) -> ast::Expr {
        let initializers = fields
            .into_iter()
            .map(|(field, expr)| ast::FieldInitializer { name: self.name(field), expr })
            .collect();
        self.expr(ast::ExprKind::StructInitializer { ty: Box::new(ty), initializers })
    }

    // ── Patterns ────────────────────────────────────────────────────

    pub fn pat(&mut self, kind: ast::PatKind) -> ast::Pat {
        ast::Pat { kind, span: self.span() }
    }

    pub fn pat_name(&mut self, text: &str) -> ast::Pat {
        let name = self.name(text);
        let mutability = ast::Mutability::immutable(name.span);
        self.pat(ast::PatKind::Name { name, mutability })
    }

    pub fn pat_wildcard(&mut self) -> ast::Pat {
        self.pat(ast::PatKind::Wildcard)
    }

    pub fn pat_tuple(&mut self, patterns: Vec<ast::Pat>) -> ast::Pat {
        self.pat(ast::PatKind::Tuple(patterns))
    }

    pub fn pat_int(&mut self, value: i64) -> ast::Pat {
        self.pat(ast::PatKind::IntLiteral(value))
    }

    pub fn pat_ctor(
        &mut self,
        enumeration: &str,
        constructor: &str,
        payload: Option<ast::Pat>,
    ) -> ast::Pat {
        let name = self.path(&[enumeration], constructor);
        self.pat(ast::PatKind::Constructor { name, payload: payload.map(Box::new) })
    }

    // ── Types ───────────────────────────────────────────────────────

    pub fn ty(&mut self, kind: ast::TypeKind) -> ast::Type {
        ast::Type { kind, span: self.span() }
    }

    pub fn ty_i64(&mut self) -> ast::Type {
        self.ty(ast::TypeKind::Int(ast::IntTy::I64))
    }

    pub fn ty_u8(&mut self) -> ast::Type {
        self.ty(ast::TypeKind::Int(ast::IntTy::U8))
    }

    pub fn ty_bool(&mut self) -> ast::Type {
        self.ty(ast::TypeKind::Bool)
    }

    pub fn ty_char(&mut self) -> ast::Type {
        self.ty(ast::TypeKind::Char)
    }

    pub fn ty_named(&mut self, text: &str) -> ast::Type {
        let name = self.plain(text);
        self.ty(ast::TypeKind::Typename(name))
    }

    pub fn ty_tuple(&mut self, elements: Vec<ast::Type>) -> ast::Type {
        self.ty(ast::TypeKind::Tuple(elements))
    }

    // ── Definitions ─────────────────────────────────────────────────

    pub fn function(
        &mut self,
        name: &str,
        parameters: Vec<(&str, Option<ast::Type>)>,
        return_type: Option<ast::Type>,
        body: ast::Expr,
    ) -> ast::Definition {
        self.function_with_templates(name, None, parameters, return_type, body)
    }

    pub fn function_with_templates(
        &mut self,
        name: &str,
        template_parameters: Option<Vec<ast::TemplateParameter>>,
        parameters: Vec<(&str, Option<ast::Type>)>,
        return_type: Option<ast::Type>,
        body: ast::Expr,
    ) -> ast::Definition {
        let span = self.span();
        let name = self.name(name);
        let parameters = parameters
            .into_iter()
            .map(|(parameter, ty)| ast::FunctionParameter {
                pattern: self.pat_name(parameter),
                ty,
            })
            .collect();
        ast::Definition {
            kind: ast::DefinitionKind::Function(ast::FunctionDef {
                name,
                template_parameters,
                parameters,
                return_type,
                body,
            }),
            span,
        }
    }

    pub fn template_type_param(&mut self, name: &str, classes: &[&str]) -> ast::TemplateParameter {
        let name = self.name(name);
        let classes = classes.iter().map(|class| self.plain(class)).collect();
        ast::TemplateParameter {
            name,
            kind: ast::TemplateParameterKind::Type { classes },
            span: name.span,
        }
    }

    pub fn struct_def(&mut self, name: &str, members: Vec<(&str, ast::Type)>) -> ast::Definition {
        let span = self.span();
        let name = self.name(name);
        let members = members
            .into_iter()
            .map(|(member, ty)| {
                let member = self.name(member);
                ast::StructMember { name: member, ty, is_public: true, span: member.span }
            })
            .collect();
        ast::Definition {
            kind: ast::DefinitionKind::Struct(ast::StructDef {
                name,
                template_parameters: None,
                members,
            }),
            span,
        }
    }

    pub fn enum_def(
        &mut self,
        name: &str,
        constructors: Vec<(&str, Option<ast::Type>)>,
    ) -> ast::Definition {
        let span = self.span();
        let name = self.name(name);
        let constructors = constructors
            .into_iter()
            .map(|(constructor, payload)| {
                let constructor = self.name(constructor);
                ast::EnumConstructor {
                    name: constructor,
                    payload,
                    span: constructor.span,
                }
            })
            .collect();
        ast::Definition {
            kind: ast::DefinitionKind::Enum(ast::EnumDef {
                name,
                template_parameters: None,
                constructors,
            }),
            span,
        }
    }

    pub fn alias_def(&mut self, name: &str, ty: ast::Type) -> ast::Definition {
        let span = self.span();
        let name = self.name(name);
        ast::Definition {
            kind: ast::DefinitionKind::Alias(ast::AliasDef {
                name,
                template_parameters: None,
                ty,
            }),
            span,
        }
    }

    pub fn class_def(&mut self, name: &str) -> ast::Definition {
        let span = self.span();
        let name = self.name(name);
        ast::Definition {
            kind: ast::DefinitionKind::Typeclass(ast::TypeclassDef {
                name,
                template_parameters: None,
                function_signatures: Vec::new(),
                type_signatures: Vec::new(),
            }),
            span,
        }
    }

    pub fn impl_def(
        &mut self,
        target: ast::Type,
        definitions: Vec<ast::Definition>,
    ) -> ast::Definition {
        let span = self.span();
        ast::Definition {
            kind: ast::DefinitionKind::Implementation(ast::ImplementationDef {
                target,
                template_parameters: None,
                definitions,
            }),
            span,
        }
    }

    pub fn inst_def(
        &mut self,
        class: &str,
        target: ast::Type,
        definitions: Vec<ast::Definition>,
    ) -> ast::Definition {
        let span = self.span();
        let class = self.plain(class);
        ast::Definition {
            kind: ast::DefinitionKind::Instantiation(ast::InstantiationDef {
                class,
                target,
                template_parameters: None,
                definitions,
            }),
            span,
        }
    }

    pub fn namespace_def(
        &mut self,
        name: &str,
        definitions: Vec<ast::Definition>,
    ) -> ast::Definition {
        let span = self.span();
        let name = self.name(name);
        ast::Definition {
            kind: ast::DefinitionKind::Namespace(ast::NamespaceDef {
                name,
                template_parameters: None,
                definitions,
            }),
            span,
        }
    }

    // ── Pipeline ────────────────────────────────────────────────────

    /// Desugar and type-check a module built from `definitions`.
    pub fn check(&mut self, definitions: Vec<ast::Definition>) -> mir::Module {
        let module = ast::Module { definitions, imports: Vec::new(), name: None, source: SRC };
        let hir = tarn_hir::lower::desugar(&module, &mut self.sink);
        tarn_typeck::check_module(hir, &mut self.interner, &mut self.sink)
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.sink.of_severity(Severity::Error).collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.sink.of_severity(Severity::Warning).collect()
    }

    pub fn notes(&self) -> Vec<&Diagnostic> {
        self.sink.of_severity(Severity::Note).collect()
    }

    /// Find a resolved function by name in the output module.
    pub fn find_fn<'m>(&self, module: &'m mir::Module, name: &str) -> &'m mir::Function {
        module
            .definitions
            .iter()
            .find_map(|definition| match definition {
                mir::Definition::Function(function)
                    if self.interner.view(function.name.id) == name =>
                {
                    Some(function)
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no resolved function named `{name}`"))
    }
}
