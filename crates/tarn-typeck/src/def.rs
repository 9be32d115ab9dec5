//! Definition records and the definition-resolution driver.
//!
//! A [`DefInfo`] pairs a definition's HIR form with a slot for its eventual
//! MIR form and a resolution state. The state machine is what makes mutual
//! recursion between top-level definitions safe: entering a definition that
//! is already in progress is a cyclic-definition error rather than an
//! infinite descent.
//!
//! Function signatures resolve eagerly so other definitions can reference
//! them; bodies resolve lazily, except that a function without a return
//! annotation resolves its body as part of the signature (the return type
//! cannot be known without it).

use la_arena::Idx;
use rustc_hash::FxHashMap;
use tarn_common::{Identifier, Label, Span};
use tarn_hir as hir;
use tarn_hir::Name;

use crate::mir;
use crate::nspace::{DefRef, NsId};
use crate::scope::TypeBinding;
use crate::ty::{Mutness, MutVar, Scheme, SchemeParam, Ty, TyVar, VarKind};
use crate::Context;

/// Resolution progress of one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    InProgress,
    Resolved,
}

/// The record tracking one top-level definition from registration through
/// resolution.
#[derive(Debug)]
pub struct DefInfo<H, M> {
    pub hir: H,
    /// The resolved MIR form; filled exactly once.
    pub mir: Option<M>,
    pub state: ResolutionState,
    pub name: Name,
    pub span: Span,
    /// The namespace the definition was declared in; lookups from its body
    /// start here.
    pub home: NsId,
    /// The namespace holding the definition's inherent members. Only
    /// structures and enumerations have one.
    pub associated_namespace: Option<NsId>,
}

impl<H, M> DefInfo<H, M> {
    pub fn new(hir: H, name: Name, span: Span, home: NsId) -> Self {
        DefInfo {
            hir,
            mir: None,
            state: ResolutionState::Unresolved,
            name,
            span,
            home,
            associated_namespace: None,
        }
    }
}

pub type FnInfo = DefInfo<hir::FunctionDef, mir::Function>;
pub type StructInfo = DefInfo<hir::StructDef, mir::Struct>;
pub type EnumInfo = DefInfo<hir::EnumDef, mir::Enum>;
pub type AliasInfo = DefInfo<hir::AliasDef, mir::Alias>;
pub type ClassInfo = DefInfo<hir::TypeclassDef, mir::Typeclass>;

pub type FnId = Idx<FnInfo>;
pub type StructId = Idx<StructInfo>;
pub type EnumId = Idx<EnumInfo>;
pub type AliasId = Idx<AliasInfo>;
pub type ClassId = Idx<ClassInfo>;

/// A function's eagerly-resolved signature.
#[derive(Debug, Clone)]
pub struct FnSignature {
    pub scheme: Scheme,
    pub param_tys: Vec<Ty>,
    pub return_ty: Ty,
    /// Type bindings the body scope must recreate: explicit template
    /// parameters plus any enclosing implementation's parameters.
    pub template_bindings: Vec<(Identifier, TyVar)>,
    pub mut_bindings: Vec<(Identifier, MutVar)>,
    /// Implicit parameter tag -> quantified variable.
    pub implicit_bindings: FxHashMap<u32, TyVar>,
}

/// A registered typeclass instance: the instantiation's target type,
/// generalized over the instantiation's template parameters.
#[derive(Debug, Clone)]
pub struct Instance {
    pub scheme: Scheme,
    pub span: Span,
    /// Member functions the instantiation provides, by name.
    pub functions: Vec<(Identifier, FnId)>,
}

/// One template parameter brought into scope for a definition.
#[derive(Debug, Clone)]
pub struct TemplateBinding {
    pub name: Name,
    pub var: TyVar,
    pub classes: Vec<ClassId>,
}

/// All template parameters of one definition.
#[derive(Debug, Clone, Default)]
pub struct TemplateScope {
    pub types: Vec<TemplateBinding>,
    pub muts: Vec<(Identifier, MutVar)>,
}

impl Context<'_> {
    // ── Template parameter scoping ──────────────────────────────────

    /// Bind a definition's template parameters: type parameters become
    /// scope type bindings over fresh variables, mutability parameters
    /// enter the mutability environment.
    pub(crate) fn bind_template_parameters(
        &mut self,
        parameters: &[hir::TemplateParameter],
    ) -> TemplateScope {
        let mut scope = TemplateScope::default();
        for parameter in parameters {
            match &parameter.kind {
                hir::TemplateParameterKind::Type { classes } => {
                    let var = self.infer.fresh_var(VarKind::General);
                    let classes: Vec<ClassId> = classes
                        .iter()
                        .filter_map(|class| match self.find_typeclass(class) {
                            Ok(id) => Some(id),
                            Err(crate::lookup::LookupErr::Reported) => None,
                            Err(crate::lookup::LookupErr::NotFound) => {
                                let text =
                                    self.interner.view(class.primary.id).to_owned();
                                self.sink.error(
                                    format!("cannot find typeclass `{text}`"),
                                    vec![Label::new(
                                        class.primary.span,
                                        "unknown class bound",
                                    )],
                                );
                                None
                            }
                        })
                        .collect();
                    self.scopes.bind_type(
                        self.interner,
                        self.sink,
                        parameter.name.id,
                        TypeBinding {
                            // Template parameters are exempt from unused
                            // warnings.
                            span: None,
                            ty: Ty::Var(var),
                            has_been_mentioned: true,
                        },
                    );
                    scope.types.push(TemplateBinding { name: parameter.name, var, classes });
                }
                hir::TemplateParameterKind::Mutability => {
                    let Mutness::Var(var) = self.infer.fresh_mutability() else {
                        unreachable!("fresh mutability is always a variable")
                    };
                    self.mut_env.insert(parameter.name.id, var);
                    scope.muts.push((parameter.name.id, var));
                }
            }
        }
        scope
    }

    // ── Function signatures and bodies ──────────────────────────────

    /// Resolve a function's signature, cycling-safe. `use_span` cites the
    /// reference that triggered resolution in cyclic-definition errors.
    pub(crate) fn ensure_function_signature(
        &mut self,
        id: FnId,
        use_span: Span,
    ) -> Option<FnSignature> {
        if let Some(signature) = self.fn_signatures.get(&id) {
            return Some(signature.clone());
        }
        if self.fns[id].state == ResolutionState::InProgress {
            self.cyclic_definition_error(self.fns[id].name, use_span);
            return None;
        }
        self.fns[id].state = ResolutionState::InProgress;

        let def = self.fns[id].hir.clone();
        let home = self.fns[id].home;
        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();
        let saved_implicit = std::mem::take(&mut self.implicit_env);

        self.scopes.enter();
        let outer = self.outer_template_bindings.get(&id).cloned().unwrap_or_default();
        for binding in &outer.types {
            self.scopes.bind_type(
                self.interner,
                self.sink,
                binding.name.id,
                TypeBinding {
                    span: None,
                    ty: Ty::Var(binding.var),
                    has_been_mentioned: true,
                },
            );
        }
        for (name, var) in &outer.muts {
            self.mut_env.insert(*name, *var);
        }
        let own = self.bind_template_parameters(&def.explicit_template_parameters);

        let mut implicit_bindings = FxHashMap::default();
        let mut implicit_params = Vec::new();
        for parameter in &def.implicit_template_parameters {
            let var = self.infer.fresh_var(VarKind::General);
            implicit_bindings.insert(parameter.tag, var);
            implicit_params.push(SchemeParam { name: None, var, classes: Vec::new() });
        }
        self.implicit_env = implicit_bindings.clone();

        let param_tys: Vec<Ty> =
            def.parameters.iter().map(|p| self.resolve_type(p.ty)).collect();
        let return_ty = match def.return_type {
            Some(annotation) => self.resolve_type(annotation),
            None => self.infer.fresh(VarKind::General),
        };

        // Scheme parameter order: explicit, then implicit, then enclosing
        // implementation parameters. Explicit applications pin the prefix.
        let mut params: Vec<SchemeParam> = own
            .types
            .iter()
            .map(|b| SchemeParam {
                name: Some(b.name),
                var: b.var,
                classes: b.classes.clone(),
            })
            .collect();
        params.extend(implicit_params);
        params.extend(outer.types.iter().map(|b| SchemeParam {
            name: Some(b.name),
            var: b.var,
            classes: b.classes.clone(),
        }));

        let mut template_bindings: Vec<(Identifier, TyVar)> =
            own.types.iter().map(|b| (b.name.id, b.var)).collect();
        template_bindings.extend(outer.types.iter().map(|b| (b.name.id, b.var)));
        let mut mut_bindings = own.muts.clone();
        mut_bindings.extend(outer.muts.iter().copied());

        let signature = FnSignature {
            scheme: Scheme {
                params,
                ty: Ty::function(param_tys.clone(), return_ty.clone()),
            },
            param_tys,
            return_ty,
            template_bindings,
            mut_bindings,
            implicit_bindings,
        };
        self.fn_signatures.insert(id, signature.clone());

        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.implicit_env = saved_implicit;
        self.current_ns = saved_ns;
        self.fns[id].state = ResolutionState::Unresolved;

        // Without a return annotation the body is part of the signature:
        // other code instantiating the scheme needs the return variable
        // solved.
        if def.return_type.is_none() {
            self.resolve_function_body(id);
        }
        Some(signature)
    }

    /// Resolve a function's body into its MIR form.
    pub(crate) fn resolve_function_body(&mut self, id: FnId) {
        let span = self.fns[id].span;
        if self.ensure_function_signature(id, span).is_none() {
            return;
        }
        if self.fns[id].mir.is_some() || !self.bodies_in_progress.insert(id) {
            return;
        }
        let signature = self.fn_signatures[&id].clone();
        let def = self.fns[id].hir.clone();
        let home = self.fns[id].home;

        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();
        let saved_implicit =
            std::mem::replace(&mut self.implicit_env, signature.implicit_bindings.clone());
        let saved_offset = std::mem::take(&mut self.scopes.current_frame_offset);

        self.scopes.enter();
        for (name, var) in &signature.template_bindings {
            self.scopes.bind_type(
                self.interner,
                self.sink,
                *name,
                TypeBinding { span: None, ty: Ty::Var(*var), has_been_mentioned: true },
            );
        }
        for (name, var) in &signature.mut_bindings {
            self.mut_env.insert(*name, *var);
        }

        self.scopes.enter();
        let mut parameters = Vec::with_capacity(def.parameters.len());
        for (parameter, ty) in def.parameters.iter().zip(&signature.param_tys) {
            let mut guards = Vec::new();
            let pattern = self.bind_pattern(parameter.pattern, ty, &mut guards);
            if !guards.is_empty() {
                self.sink.error(
                    "guard patterns are not allowed in function parameters",
                    vec![Label::new(pattern.span, "parameters must be irrefutable")],
                );
            }
            parameters.push(mir::FunctionParameter { pattern, ty: ty.clone() });
        }

        self.return_stack.push(signature.return_ty.clone());
        let body = self.resolve_expr(def.body);
        self.constraints.equate(body.ty.clone(), signature.return_ty.clone(), body.span);
        self.return_stack.pop();

        self.scopes.exit(self.interner, self.sink);
        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.implicit_env = saved_implicit;
        self.current_ns = saved_ns;
        self.scopes.current_frame_offset = saved_offset;

        // Solve what the body produced, then snap literal variables to
        // their defaults so the MIR carries concrete types.
        self.solve_constraints();
        let body = self.finalize_expr(body);
        let parameters = parameters
            .into_iter()
            .map(|p| mir::FunctionParameter {
                pattern: self.finalize_pattern(p.pattern),
                ty: self.finalize_ty(&p.ty),
            })
            .collect();
        let return_type = self.finalize_ty(&signature.return_ty);
        let scheme = Scheme {
            params: signature.scheme.params.clone(),
            ty: self.infer.resolve(signature.scheme.ty.clone()),
        };

        self.fns[id].mir = Some(mir::Function {
            name: def.name,
            scheme,
            parameters,
            return_type,
            body,
        });
        self.fns[id].state = ResolutionState::Resolved;
        self.bodies_in_progress.remove(&id);
    }

    // ── Nominal types, aliases, classes ─────────────────────────────

    pub(crate) fn ensure_struct(&mut self, id: StructId, use_span: Span) {
        match self.structs[id].state {
            ResolutionState::Resolved => return,
            ResolutionState::InProgress => {
                self.cyclic_definition_error(self.structs[id].name, use_span);
                return;
            }
            ResolutionState::Unresolved => {}
        }
        self.structs[id].state = ResolutionState::InProgress;

        let def = self.structs[id].hir.clone();
        let home = self.structs[id].home;
        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();

        self.scopes.enter();
        let template = self.bind_template_parameters(&def.template_parameters);

        let mut fields = Vec::with_capacity(def.members.len());
        let mut offset: u64 = 0;
        for member in &def.members {
            let ty = self.resolve_type(member.ty);
            let size = self.size_of(&ty);
            fields.push(mir::StructField {
                name: member.name,
                ty,
                is_public: member.is_public,
                offset,
            });
            offset = match offset.checked_add(size) {
                Some(next) => next,
                None => {
                    self.sink.error(
                        "structure size overflows",
                        vec![Label::new(member.span, "this member does not fit")],
                    );
                    offset
                }
            };
        }

        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.current_ns = saved_ns;

        self.structs[id].mir = Some(mir::Struct {
            name: def.name,
            template_params: template
                .types
                .iter()
                .map(|b| mir::TemplateParamInfo { name: b.name, var: b.var })
                .collect(),
            fields,
            size: offset,
        });
        self.structs[id].state = ResolutionState::Resolved;
    }

    pub(crate) fn ensure_enum(&mut self, id: EnumId, use_span: Span) {
        match self.enums[id].state {
            ResolutionState::Resolved => return,
            ResolutionState::InProgress => {
                self.cyclic_definition_error(self.enums[id].name, use_span);
                return;
            }
            ResolutionState::Unresolved => {}
        }
        self.enums[id].state = ResolutionState::InProgress;

        let def = self.enums[id].hir.clone();
        let home = self.enums[id].home;
        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();

        self.scopes.enter();
        let template = self.bind_template_parameters(&def.template_parameters);

        let mut constructors = Vec::with_capacity(def.constructors.len());
        let mut payload_max: u64 = 0;
        for constructor in &def.constructors {
            let payload = constructor.payload.map(|t| self.resolve_type(t));
            if let Some(payload) = &payload {
                payload_max = payload_max.max(self.size_of(payload));
            }
            constructors.push(mir::Constructor { name: constructor.name, payload });
        }

        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.current_ns = saved_ns;

        self.enums[id].mir = Some(mir::Enum {
            name: def.name,
            template_params: template
                .types
                .iter()
                .map(|b| mir::TemplateParamInfo { name: b.name, var: b.var })
                .collect(),
            constructors,
            // One tag byte plus the widest payload.
            size: 1 + payload_max,
        });
        self.enums[id].state = ResolutionState::Resolved;
    }

    /// Resolve an alias, returning its aliased type (unsubstituted when
    /// the alias is a template; callers substitute).
    pub(crate) fn ensure_alias(&mut self, id: AliasId, use_span: Span) -> Ty {
        match self.aliases[id].state {
            ResolutionState::Resolved => {
                return self.aliases[id]
                    .mir
                    .as_ref()
                    .map(|a| a.ty.clone())
                    .unwrap_or_else(|| self.infer.fresh(VarKind::General));
            }
            ResolutionState::InProgress => {
                self.cyclic_definition_error(self.aliases[id].name, use_span);
                return self.infer.fresh(VarKind::General);
            }
            ResolutionState::Unresolved => {}
        }
        self.aliases[id].state = ResolutionState::InProgress;

        let def = self.aliases[id].hir.clone();
        let home = self.aliases[id].home;
        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();

        self.scopes.enter();
        let template = self.bind_template_parameters(&def.template_parameters);
        let ty = self.resolve_type(def.ty);
        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.current_ns = saved_ns;

        self.aliases[id].mir = Some(mir::Alias {
            name: def.name,
            template_params: template
                .types
                .iter()
                .map(|b| mir::TemplateParamInfo { name: b.name, var: b.var })
                .collect(),
            ty: ty.clone(),
        });
        self.aliases[id].state = ResolutionState::Resolved;
        ty
    }

    pub(crate) fn ensure_class(&mut self, id: ClassId) {
        match self.classes[id].state {
            ResolutionState::Resolved => return,
            ResolutionState::InProgress => {
                let span = self.classes[id].span;
                self.cyclic_definition_error(self.classes[id].name, span);
                return;
            }
            ResolutionState::Unresolved => {}
        }
        self.classes[id].state = ResolutionState::InProgress;

        let def = self.classes[id].hir.clone();
        let home = self.classes[id].home;
        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();

        self.scopes.enter();
        let _template = self.bind_template_parameters(&def.template_parameters);

        let function_signatures = def
            .function_signatures
            .iter()
            .map(|signature| mir::ClassFunctionSignature {
                name: signature.name,
                parameters: signature
                    .parameter_types
                    .iter()
                    .map(|&t| self.resolve_type(t))
                    .collect(),
                return_type: signature
                    .return_type
                    .map(|t| self.resolve_type(t))
                    .unwrap_or_else(Ty::unit),
            })
            .collect();

        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.current_ns = saved_ns;

        self.classes[id].mir = Some(mir::Typeclass {
            name: def.name,
            function_signatures,
            type_signatures: def.type_signatures.iter().map(|s| s.name).collect(),
        });
        self.classes[id].state = ResolutionState::Resolved;
    }

    fn cyclic_definition_error(&mut self, name: Name, use_span: Span) {
        let text = self.interner.view(name.id).to_owned();
        self.sink.error(
            format!("cyclic definition: `{text}` depends on itself"),
            vec![
                Label::new(name.span, "while resolving this definition"),
                Label::new(use_span, "the cycle closes here"),
            ],
        );
    }

    // ── Driver ──────────────────────────────────────────────────────

    /// Resolve every definition registered under `space`, in declaration
    /// order.
    pub(crate) fn resolve_namespace_definitions(&mut self, space: NsId) {
        let order = self.namespaces[space].definitions_in_order.clone();
        for def_ref in order {
            match def_ref {
                DefRef::Function(id) => self.resolve_function_body(id),
                DefRef::Struct(id) => {
                    let span = self.structs[id].span;
                    self.ensure_struct(id, span);
                }
                DefRef::Enum(id) => {
                    let span = self.enums[id].span;
                    self.ensure_enum(id, span);
                }
                DefRef::Alias(id) => {
                    let span = self.aliases[id].span;
                    self.ensure_alias(id, span);
                }
                DefRef::Typeclass(id) => self.ensure_class(id),
                DefRef::Namespace(child) => self.resolve_namespace_definitions(child),
                DefRef::Implementation(index) => {
                    for id in self.pending_impls[index].functions.clone() {
                        self.resolve_function_body(id);
                    }
                }
                DefRef::Instantiation(index) => {
                    for id in self.pending_insts[index].functions.clone() {
                        self.resolve_function_body(id);
                    }
                }
            }
            self.solve_constraints();
        }
    }

    /// Assemble the output module: resolved definitions in declaration
    /// order.
    pub(crate) fn build_module(&mut self) -> mir::Module {
        mir::Module {
            definitions: self.collect_definitions(self.global),
            source: self.hir.source,
        }
    }

    fn collect_definitions(&mut self, space: NsId) -> Vec<mir::Definition> {
        let order = self.namespaces[space].definitions_in_order.clone();
        let mut definitions = Vec::with_capacity(order.len());
        for def_ref in order {
            let definition = match def_ref {
                DefRef::Function(id) => {
                    self.fns[id].mir.clone().map(mir::Definition::Function)
                }
                DefRef::Struct(id) => {
                    self.structs[id].mir.clone().map(mir::Definition::Struct)
                }
                DefRef::Enum(id) => self.enums[id].mir.clone().map(mir::Definition::Enum),
                DefRef::Alias(id) => {
                    self.aliases[id].mir.clone().map(mir::Definition::Alias)
                }
                DefRef::Typeclass(id) => {
                    self.classes[id].mir.clone().map(mir::Definition::Typeclass)
                }
                DefRef::Namespace(child) => {
                    self.namespaces[child].name.map(|name| mir::Definition::Namespace {
                        name,
                        definitions: self.collect_definitions(child),
                    })
                }
                DefRef::Implementation(index) => {
                    let target = self.pending_impls[index].target_ty.clone();
                    let functions = self.pending_impls[index].functions.clone();
                    target.map(|target| {
                        mir::Definition::Implementation(mir::Implementation {
                            target: self.finalize_ty(&target),
                            functions: functions
                                .iter()
                                .filter_map(|&id| self.fns[id].mir.clone())
                                .collect(),
                        })
                    })
                }
                DefRef::Instantiation(index) => {
                    let class_id = self.pending_insts[index].class_id;
                    let target = self.pending_insts[index].target_ty.clone();
                    let functions = self.pending_insts[index].functions.clone();
                    match (class_id, target) {
                        (Some(class_id), Some(target)) => {
                            Some(mir::Definition::Instantiation(mir::Instantiation {
                                class: self.classes[class_id].name,
                                target: self.finalize_ty(&target),
                                functions: functions
                                    .iter()
                                    .filter_map(|&id| self.fns[id].mir.clone())
                                    .collect(),
                            }))
                        }
                        _ => None,
                    }
                }
            };
            if let Some(definition) = definition {
                definitions.push(definition);
            }
        }
        definitions
    }

    // ── Finalization ────────────────────────────────────────────────

    /// Snap literal variables to their defaults and resolve through the
    /// table, yielding the most concrete form of a type.
    pub(crate) fn finalize_ty(&mut self, ty: &Ty) -> Ty {
        self.infer.default_literals(ty);
        self.infer.resolve(ty.clone())
    }

    pub(crate) fn finalize_expr(&mut self, expr: mir::Expr) -> mir::Expr {
        let ty = self.finalize_ty(&expr.ty);
        let kind = match expr.kind {
            mir::ExprKind::ArrayLiteral(elements) => mir::ExprKind::ArrayLiteral(
                elements.into_iter().map(|e| self.finalize_expr(e)).collect(),
            ),
            mir::ExprKind::Tuple(elements) => mir::ExprKind::Tuple(
                elements.into_iter().map(|e| self.finalize_expr(e)).collect(),
            ),
            mir::ExprKind::Block { effects, result } => mir::ExprKind::Block {
                effects: effects.into_iter().map(|e| self.finalize_expr(e)).collect(),
                result: result.map(|r| Box::new(self.finalize_expr(*r))),
            },
            mir::ExprKind::Loop { body } => {
                mir::ExprKind::Loop { body: Box::new(self.finalize_expr(*body)) }
            }
            mir::ExprKind::Invocation { invocable, arguments } => {
                mir::ExprKind::Invocation {
                    invocable: Box::new(self.finalize_expr(*invocable)),
                    arguments: arguments
                        .into_iter()
                        .map(|a| self.finalize_expr(a))
                        .collect(),
                }
            }
            mir::ExprKind::StructInitializer { fields } => {
                mir::ExprKind::StructInitializer {
                    fields: fields
                        .into_iter()
                        .map(|(name, value)| (name, self.finalize_expr(value)))
                        .collect(),
                }
            }
            mir::ExprKind::BinaryOperator { op, left, right } => {
                mir::ExprKind::BinaryOperator {
                    op,
                    left: Box::new(self.finalize_expr(*left)),
                    right: Box::new(self.finalize_expr(*right)),
                }
            }
            mir::ExprKind::Match { scrutinee, arms } => mir::ExprKind::Match {
                scrutinee: Box::new(self.finalize_expr(*scrutinee)),
                arms: arms
                    .into_iter()
                    .map(|arm| mir::MatchArm {
                        pattern: self.finalize_pattern(arm.pattern),
                        guards: arm
                            .guards
                            .into_iter()
                            .map(|g| self.finalize_expr(g))
                            .collect(),
                        expression: self.finalize_expr(arm.expression),
                    })
                    .collect(),
            },
            mir::ExprKind::FieldAccess { base, steps } => mir::ExprKind::FieldAccess {
                base: Box::new(self.finalize_expr(*base)),
                steps: steps
                    .into_iter()
                    .map(|step| match step {
                        mir::FieldStep::Index(index) => {
                            mir::FieldStep::Index(Box::new(self.finalize_expr(*index)))
                        }
                        other => other,
                    })
                    .collect(),
            },
            mir::ExprKind::Dereference(inner) => {
                mir::ExprKind::Dereference(Box::new(self.finalize_expr(*inner)))
            }
            mir::ExprKind::TypeCast { expr } => {
                mir::ExprKind::TypeCast { expr: Box::new(self.finalize_expr(*expr)) }
            }
            mir::ExprKind::Let { pattern, initializer } => mir::ExprKind::Let {
                pattern: self.finalize_pattern(pattern),
                initializer: Box::new(self.finalize_expr(*initializer)),
            },
            mir::ExprKind::Return(value) => {
                mir::ExprKind::Return(value.map(|v| Box::new(self.finalize_expr(*v))))
            }
            mir::ExprKind::SizeOf(target) => {
                let target = self.finalize_ty(&target);
                mir::ExprKind::SizeOf(target)
            }
            mir::ExprKind::PlacementInit { lvalue, initializer } => {
                mir::ExprKind::PlacementInit {
                    lvalue: Box::new(self.finalize_expr(*lvalue)),
                    initializer: Box::new(self.finalize_expr(*initializer)),
                }
            }
            mir::ExprKind::Meta(inner) => {
                mir::ExprKind::Meta(Box::new(self.finalize_expr(*inner)))
            }
            leaf => leaf,
        };
        mir::Expr { kind, ty, span: expr.span }
    }

    pub(crate) fn finalize_pattern(&mut self, pattern: mir::Pattern) -> mir::Pattern {
        let ty = self.finalize_ty(&pattern.ty);
        let kind = match pattern.kind {
            mir::PatternKind::Tuple(elements) => mir::PatternKind::Tuple(
                elements.into_iter().map(|p| self.finalize_pattern(p)).collect(),
            ),
            mir::PatternKind::Slice(elements) => mir::PatternKind::Slice(
                elements.into_iter().map(|p| self.finalize_pattern(p)).collect(),
            ),
            mir::PatternKind::Constructor { enumeration, index, payload } => {
                mir::PatternKind::Constructor {
                    enumeration,
                    index,
                    payload: payload.map(|p| Box::new(self.finalize_pattern(*p))),
                }
            }
            mir::PatternKind::As { identifier, frame_offset, is_mutable, pattern } => {
                mir::PatternKind::As {
                    identifier,
                    frame_offset,
                    is_mutable,
                    pattern: Box::new(self.finalize_pattern(*pattern)),
                }
            }
            leaf => leaf,
        };
        mir::Pattern { kind, ty, span: pattern.span }
    }
}
