//! Expression resolution and constraint collection.
//!
//! Walks a HIR expression tree, producing the typed MIR form while
//! emitting equality and instance constraints for the unifier. Fresh
//! variables follow the expression shape: integral for integer literals,
//! floating for floating literals, general everywhere else. Recoverable
//! failures report a diagnostic, degrade the subtree to a hole carrying a
//! fresh variable, and let resolution continue.

use tarn_common::{Label, Span};
use tarn_hir as hir;

use crate::constraint::ClassRef;
use crate::lookup::LookupErr;
use crate::mir;
use crate::ty::{Mutness, Ty, VarKind};
use crate::Context;

impl Context<'_> {
    /// Resolve one HIR expression.
    pub(crate) fn resolve_expr(&mut self, id: hir::ExprId) -> mir::Expr {
        let expr = self.hir.arena.exprs[id].clone();
        let span = expr.span;
        match expr.kind {
            hir::ExprKind::IntLiteral(value) => {
                let ty = self.infer.fresh(VarKind::Integral);
                mir::Expr { kind: mir::ExprKind::IntLiteral(value), ty, span }
            }
            hir::ExprKind::FloatLiteral(value) => {
                let ty = self.infer.fresh(VarKind::Floating);
                mir::Expr { kind: mir::ExprKind::FloatLiteral(value), ty, span }
            }
            hir::ExprKind::CharLiteral(value) => {
                mir::Expr { kind: mir::ExprKind::CharLiteral(value), ty: Ty::Char, span }
            }
            hir::ExprKind::BoolLiteral(value) => {
                mir::Expr { kind: mir::ExprKind::BoolLiteral(value), ty: Ty::Bool, span }
            }
            hir::ExprKind::StringLiteral(value) => {
                mir::Expr { kind: mir::ExprKind::StringLiteral(value), ty: Ty::Str, span }
            }

            hir::ExprKind::ArrayLiteral(elements) => {
                let element_ty = self.infer.fresh(VarKind::General);
                let length = elements.len() as u64;
                let elements: Vec<mir::Expr> = elements
                    .iter()
                    .map(|&element| {
                        let resolved = self.resolve_expr(element);
                        self.constraints.equate(
                            resolved.ty.clone(),
                            element_ty.clone(),
                            resolved.span,
                        );
                        resolved
                    })
                    .collect();
                mir::Expr {
                    kind: mir::ExprKind::ArrayLiteral(elements),
                    ty: Ty::Array { element: Box::new(element_ty), length },
                    span,
                }
            }

            hir::ExprKind::Tuple(elements) => {
                let elements: Vec<mir::Expr> =
                    elements.iter().map(|&e| self.resolve_expr(e)).collect();
                // The tuple type is structural, not a constraint.
                let ty = Ty::Tuple(elements.iter().map(|e| e.ty.clone()).collect());
                mir::Expr { kind: mir::ExprKind::Tuple(elements), ty, span }
            }

            hir::ExprKind::Variable(name) => self.resolve_variable(&name, span),

            hir::ExprKind::TemplateApplication { name, arguments } => {
                self.resolve_explicit_application(&name, &arguments, span)
            }

            hir::ExprKind::Loop { body } => {
                let body = self.resolve_expr(body);
                self.constraints.equate(body.ty.clone(), Ty::unit(), body.span);
                mir::Expr {
                    kind: mir::ExprKind::Loop { body: Box::new(body) },
                    ty: Ty::unit(),
                    span,
                }
            }

            // Break and continue never produce a value; a fresh variable
            // lets the surrounding match arms unify with anything.
            hir::ExprKind::Break => mir::Expr {
                kind: mir::ExprKind::Break,
                ty: self.infer.fresh(VarKind::General),
                span,
            },
            hir::ExprKind::Continue => mir::Expr {
                kind: mir::ExprKind::Continue,
                ty: self.infer.fresh(VarKind::General),
                span,
            },

            hir::ExprKind::Block { effects, result } => {
                self.scopes.enter();
                let effects: Vec<mir::Expr> =
                    effects.iter().map(|&e| self.resolve_expr(e)).collect();
                let result = result.map(|r| Box::new(self.resolve_expr(r)));
                self.scopes.exit(self.interner, self.sink);
                let ty = result.as_ref().map_or_else(Ty::unit, |r| r.ty.clone());
                mir::Expr { kind: mir::ExprKind::Block { effects, result }, ty, span }
            }

            hir::ExprKind::Invocation { invocable, arguments } => {
                let invocable = self.resolve_expr(invocable);
                let arguments: Vec<mir::Expr> = arguments
                    .iter()
                    .map(|argument| self.resolve_expr(argument.expr))
                    .collect();
                let result = self.infer.fresh(VarKind::General);
                let expected = Ty::function(
                    arguments.iter().map(|a| a.ty.clone()).collect(),
                    result.clone(),
                );
                self.constraints.equate(invocable.ty.clone(), expected, span);
                mir::Expr {
                    kind: mir::ExprKind::Invocation {
                        invocable: Box::new(invocable),
                        arguments,
                    },
                    ty: result,
                    span,
                }
            }

            hir::ExprKind::StructInitializer { ty, initializers } => {
                self.resolve_struct_initializer(ty, &initializers, span)
            }

            hir::ExprKind::BinaryOperator { left, right, op } => {
                self.resolve_binary_operator(left, right, op, span)
            }

            hir::ExprKind::MemberAccessChain { base, accessors } => {
                self.resolve_member_access(base, &accessors, span)
            }

            hir::ExprKind::MemberInvocation { receiver, member, arguments } => {
                self.resolve_member_invocation(receiver, member, &arguments, span)
            }

            hir::ExprKind::Match { scrutinee, arms } => {
                let scrutinee = self.resolve_expr(scrutinee);
                let result = self.infer.fresh(VarKind::General);
                let arms: Vec<mir::MatchArm> = arms
                    .iter()
                    .map(|arm| {
                        self.scopes.enter();
                        let mut guards = Vec::new();
                        let pattern =
                            self.bind_pattern(arm.pattern, &scrutinee.ty, &mut guards);
                        let expression = self.resolve_expr(arm.expression);
                        self.scopes.exit(self.interner, self.sink);
                        self.constraints.equate(
                            expression.ty.clone(),
                            result.clone(),
                            expression.span,
                        );
                        mir::MatchArm { pattern, guards, expression }
                    })
                    .collect();
                mir::Expr {
                    kind: mir::ExprKind::Match { scrutinee: Box::new(scrutinee), arms },
                    ty: result,
                    span,
                }
            }

            hir::ExprKind::Dereference(inner) => {
                let inner = self.resolve_expr(inner);
                let target = self.infer.fresh(VarKind::General);
                let mutability = self.infer.fresh_mutability();
                self.constraints.equate(
                    inner.ty.clone(),
                    Ty::Reference { mutability, inner: Box::new(target.clone()) },
                    span,
                );
                mir::Expr {
                    kind: mir::ExprKind::Dereference(Box::new(inner)),
                    ty: target,
                    span,
                }
            }

            hir::ExprKind::TypeCast { expr, target, kind } => {
                let expr = self.resolve_expr(expr);
                let target = self.resolve_type(target);
                match kind {
                    hir::CastKind::Ascription => {
                        self.constraints.equate(expr.ty.clone(), target.clone(), expr.span);
                    }
                    hir::CastKind::Conversion => {
                        self.constraints.instance(
                            expr.ty.clone(),
                            vec![ClassRef::Convert { to: target.clone() }],
                            span,
                        );
                    }
                }
                mir::Expr {
                    kind: mir::ExprKind::TypeCast { expr: Box::new(expr) },
                    ty: target,
                    span,
                }
            }

            hir::ExprKind::Let { pattern, initializer, ty } => {
                let initializer = self.resolve_expr(initializer);
                let bound_ty = match ty {
                    Some(annotation) => {
                        let annotation = self.resolve_type(annotation);
                        self.constraints.equate(
                            annotation.clone(),
                            initializer.ty.clone(),
                            initializer.span,
                        );
                        annotation
                    }
                    None => initializer.ty.clone(),
                };
                let mut guards = Vec::new();
                let pattern = self.bind_pattern(pattern, &bound_ty, &mut guards);
                if !guards.is_empty() {
                    self.sink.error(
                        "guard patterns are not allowed in `let` bindings",
                        vec![Label::new(span, "a `let` pattern must be irrefutable")],
                    );
                }
                mir::Expr {
                    kind: mir::ExprKind::Let {
                        pattern,
                        initializer: Box::new(initializer),
                    },
                    ty: Ty::unit(),
                    span,
                }
            }

            hir::ExprKind::LocalTypeAlias { name, ty } => {
                let aliased = self.resolve_type(ty);
                let starts_with_underscore = self.interner.view(name.id).starts_with('_');
                self.scopes.bind_type(
                    self.interner,
                    self.sink,
                    name.id,
                    crate::scope::TypeBinding {
                        span: Some(name.span),
                        ty: aliased,
                        has_been_mentioned: starts_with_underscore,
                    },
                );
                mir::Expr { kind: mir::ExprKind::Tuple(Vec::new()), ty: Ty::unit(), span }
            }

            hir::ExprKind::Return(value) => {
                let value = value.map(|v| Box::new(self.resolve_expr(v)));
                let value_ty = value.as_ref().map_or_else(Ty::unit, |v| v.ty.clone());
                match self.return_stack.last().cloned() {
                    Some(return_ty) => {
                        self.constraints.equate(value_ty, return_ty, span);
                    }
                    None => {
                        self.sink.error(
                            "`ret` outside of a function body",
                            vec![Label::new(span, "nothing to return from")],
                        );
                    }
                }
                mir::Expr {
                    kind: mir::ExprKind::Return(value),
                    ty: self.infer.fresh(VarKind::General),
                    span,
                }
            }

            hir::ExprKind::SizeOf(ty) => {
                let saved = std::mem::replace(&mut self.is_unevaluated, true);
                let target = self.resolve_type(ty);
                self.is_unevaluated = saved;
                mir::Expr {
                    kind: mir::ExprKind::SizeOf(target),
                    ty: self.infer.fresh(VarKind::Integral),
                    span,
                }
            }

            hir::ExprKind::TakeReference { mutability, name } => {
                self.resolve_take_reference(mutability, name, span)
            }

            hir::ExprKind::PlacementInit { lvalue, initializer } => {
                let lvalue = self.resolve_expr(lvalue);
                let initializer = self.resolve_expr(initializer);
                self.constraints.equate(
                    initializer.ty.clone(),
                    lvalue.ty.clone(),
                    initializer.span,
                );
                mir::Expr {
                    kind: mir::ExprKind::PlacementInit {
                        lvalue: Box::new(lvalue),
                        initializer: Box::new(initializer),
                    },
                    ty: Ty::unit(),
                    span,
                }
            }

            hir::ExprKind::Meta(inner) => {
                let inner = self.resolve_expr(inner);
                let ty = inner.ty.clone();
                mir::Expr { kind: mir::ExprKind::Meta(Box::new(inner)), ty, span }
            }

            hir::ExprKind::Hole => {
                self.sink.error(
                    "cannot infer a value for this hole",
                    vec![Label::new(span, "expression left unwritten")],
                );
                self.degraded(span)
            }
        }
    }

    /// An error was reported: a hole with a fresh variable keeps inference
    /// going.
    pub(crate) fn degraded(&mut self, span: Span) -> mir::Expr {
        mir::Expr {
            kind: mir::ExprKind::Hole,
            ty: self.infer.fresh(VarKind::General),
            span,
        }
    }

    // ── Variables and function references ───────────────────────────

    fn resolve_variable(&mut self, name: &hir::QualifiedName, span: Span) -> mir::Expr {
        // Local bindings shadow functions, but only for unqualified names.
        if name.is_unqualified() {
            if let Some(binding) = self.scopes.find_variable(name.primary.id) {
                binding.has_been_mentioned = true;
                let ty = binding.ty.clone();
                let frame_offset = binding.frame_offset;
                if !self.is_unevaluated && !self.is_trivial(&ty) {
                    if let Some(binding) = self.scopes.find_variable(name.primary.id) {
                        if binding.moved_by.is_none() {
                            binding.moved_by = Some(span);
                        }
                    }
                }
                return mir::Expr {
                    kind: mir::ExprKind::LocalVariable { frame_offset },
                    ty,
                    span,
                };
            }
        }

        match self.find_function(name) {
            Ok(id) => self.function_reference(id, span),
            Err(LookupErr::Reported) => self.degraded(span),
            Err(LookupErr::NotFound) => {
                let text = self.interner.view(name.primary.id).to_owned();
                self.sink.error(
                    format!("cannot find `{text}` in this scope"),
                    vec![Label::new(name.primary.span, "undeclared name")],
                );
                self.degraded(span)
            }
        }
    }

    /// Instantiate a function's scheme, discharging its class bounds as
    /// instance constraints on the fresh variables.
    pub(crate) fn function_reference(&mut self, id: crate::def::FnId, span: Span) -> mir::Expr {
        let Some(signature) = self.ensure_function_signature(id, span) else {
            return self.degraded(span);
        };
        let (ty, fresh) = self.infer.instantiate(&signature.scheme);
        for (param, fresh_ty) in fresh {
            if !param.classes.is_empty() {
                self.constraints.instance(
                    fresh_ty,
                    param.classes.into_iter().map(ClassRef::Named).collect(),
                    span,
                );
            }
        }
        mir::Expr { kind: mir::ExprKind::FunctionReference(id), ty, span }
    }

    /// `f[T, ...]` -- explicit template application of a function.
    fn resolve_explicit_application(
        &mut self,
        name: &hir::QualifiedName,
        arguments: &[hir::TemplateArgument],
        span: Span,
    ) -> mir::Expr {
        let id = match self.find_function(name) {
            Ok(id) => id,
            Err(LookupErr::Reported) => return self.degraded(span),
            Err(LookupErr::NotFound) => {
                let text = self.interner.view(name.primary.id).to_owned();
                self.sink.error(
                    format!("cannot find a function template `{text}`"),
                    vec![Label::new(name.primary.span, "undeclared name")],
                );
                return self.degraded(span);
            }
        };
        let explicit_count = self.fns[id].hir.explicit_template_parameters.len();
        if arguments.len() > explicit_count {
            let text = self.interner.view(name.primary.id).to_owned();
            self.sink.error(
                format!(
                    "`{text}` has {explicit_count} explicit template parameter(s), \
                     but {} argument(s) were supplied",
                    arguments.len()
                ),
                vec![Label::new(span, "too many template arguments")],
            );
            return self.degraded(span);
        }

        let Some(signature) = self.ensure_function_signature(id, span) else {
            return self.degraded(span);
        };
        let (ty, fresh) = self.infer.instantiate(&signature.scheme);

        // Scheme parameters are ordered explicit-first; pin the supplied
        // prefix to the given arguments.
        for ((_, fresh_ty), argument) in fresh.iter().zip(arguments) {
            match argument {
                hir::TemplateArgument::Type(arg) => {
                    let arg = self.resolve_type(*arg);
                    self.constraints.equate(fresh_ty.clone(), arg, span);
                }
                hir::TemplateArgument::Wildcard(_) => {}
                hir::TemplateArgument::Mutability(m) => {
                    self.sink.error(
                        "expected a type argument, found a mutability argument",
                        vec![Label::new(m.span, "kind mismatch")],
                    );
                }
            }
        }
        for (param, fresh_ty) in &fresh {
            if !param.classes.is_empty() {
                self.constraints.instance(
                    fresh_ty.clone(),
                    param.classes.iter().copied().map(ClassRef::Named).collect(),
                    span,
                );
            }
        }
        mir::Expr { kind: mir::ExprKind::FunctionReference(id), ty, span }
    }

    // ── Structs, operators, members ─────────────────────────────────

    fn resolve_struct_initializer(
        &mut self,
        ty: hir::TypeId,
        initializers: &[hir::FieldInitializer],
        span: Span,
    ) -> mir::Expr {
        let target = self.resolve_type(ty);
        let resolved = self.infer.resolve(target.clone());
        let Ty::Structure(id, args) = resolved else {
            let shown = self.ty_string(&target);
            self.sink.error(
                format!("`{shown}` is not a structure"),
                vec![Label::new(span, "struct initializers require a structure type")],
            );
            return self.degraded(span);
        };

        self.ensure_struct(id, span);
        let Some(structure) = self.structs[id].mir.clone() else {
            return self.degraded(span);
        };
        let substitution: rustc_hash::FxHashMap<_, _> = structure
            .template_params
            .iter()
            .map(|p| p.var)
            .zip(args.iter().cloned())
            .collect();

        let mut fields: Vec<(hir::Name, mir::Expr)> = Vec::new();
        for field in &structure.fields {
            match initializers.iter().find(|init| init.name.id == field.name.id) {
                Some(init) => {
                    let value = self.resolve_expr(init.expr);
                    let expected = self.infer.substitute(&field.ty, &substitution);
                    self.constraints.equate(value.ty.clone(), expected, value.span);
                    fields.push((field.name, value));
                }
                None => {
                    let field_text = self.interner.view(field.name.id).to_owned();
                    let struct_text = self.interner.view(structure.name.id).to_owned();
                    self.sink.error(
                        format!("missing field `{field_text}` of `{struct_text}`"),
                        vec![Label::new(span, "field is not initialized")],
                    );
                }
            }
        }
        for init in initializers {
            if !structure.fields.iter().any(|f| f.name.id == init.name.id) {
                let field_text = self.interner.view(init.name.id).to_owned();
                let struct_text = self.interner.view(structure.name.id).to_owned();
                self.sink.error(
                    format!("`{struct_text}` has no field `{field_text}`"),
                    vec![Label::new(init.name.span, "unknown field")],
                );
            }
        }

        mir::Expr {
            kind: mir::ExprKind::StructInitializer { fields },
            ty: target,
            span,
        }
    }

    fn resolve_binary_operator(
        &mut self,
        left: hir::ExprId,
        right: hir::ExprId,
        op: hir::Name,
        span: Span,
    ) -> mir::Expr {
        let left = self.resolve_expr(left);
        let right = self.resolve_expr(right);
        let op_text = self.interner.view(op.id).to_owned();

        let ty = match op_text.as_str() {
            "+" | "-" | "*" | "/" | "%" => {
                self.constraints.equate(left.ty.clone(), right.ty.clone(), op.span);
                left.ty.clone()
            }
            "==" | "!=" | "<" | "<=" | ">" | ">=" => {
                self.constraints.equate(left.ty.clone(), right.ty.clone(), op.span);
                Ty::Bool
            }
            "&&" | "||" => {
                self.constraints.equate(left.ty.clone(), Ty::Bool, left.span);
                self.constraints.equate(right.ty.clone(), Ty::Bool, right.span);
                Ty::Bool
            }
            _ => {
                self.sink.error(
                    format!("unknown operator `{op_text}`"),
                    vec![Label::new(op.span, "not a built-in operator")],
                );
                self.infer.fresh(VarKind::General)
            }
        };

        mir::Expr {
            kind: mir::ExprKind::BinaryOperator {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            span,
        }
    }

    fn resolve_member_access(
        &mut self,
        base: hir::ExprId,
        accessors: &[hir::Accessor],
        span: Span,
    ) -> mir::Expr {
        let base = self.resolve_expr(base);
        let mut head = base.ty.clone();
        let mut steps = Vec::with_capacity(accessors.len());

        for accessor in accessors {
            match &accessor.kind {
                hir::AccessorKind::TupleField(index) => {
                    if *index < 0 {
                        self.sink.error(
                            "tuple field indices cannot be negative",
                            vec![Label::new(accessor.span, "negative index")],
                        );
                        head = self.infer.fresh(VarKind::General);
                        continue;
                    }
                    let index = *index as usize;
                    match self.infer.resolve(head.clone()) {
                        Ty::Tuple(elements) => {
                            if index >= elements.len() {
                                let shown = self.ty_string(&head);
                                self.sink.error(
                                    format!(
                                        "tuple index {index} is out of range for `{shown}`"
                                    ),
                                    vec![Label::new(accessor.span, "no such element")],
                                );
                                head = self.infer.fresh(VarKind::General);
                                continue;
                            }
                            let offset: u64 = elements[..index]
                                .iter()
                                .map(|t| self.size_of(t))
                                .sum();
                            head = elements[index].clone();
                            steps.push(mir::FieldStep::Tuple {
                                index: index as u32,
                                offset,
                            });
                        }
                        other => {
                            let shown = self.ty_string(&other);
                            self.sink.error(
                                format!("cannot index `{shown}` as a tuple"),
                                vec![Label::new(accessor.span, "not a tuple type")],
                            );
                            head = self.infer.fresh(VarKind::General);
                        }
                    }
                }

                hir::AccessorKind::StructField(name) => {
                    match self.infer.resolve(head.clone()) {
                        Ty::Structure(id, args) => {
                            self.ensure_struct(id, accessor.span);
                            let Some(structure) = self.structs[id].mir.clone() else {
                                head = self.infer.fresh(VarKind::General);
                                continue;
                            };
                            match structure.fields.iter().find(|f| f.name.id == name.id) {
                                Some(field) => {
                                    let substitution: rustc_hash::FxHashMap<_, _> =
                                        structure
                                            .template_params
                                            .iter()
                                            .map(|p| p.var)
                                            .zip(args.iter().cloned())
                                            .collect();
                                    head =
                                        self.infer.substitute(&field.ty, &substitution);
                                    steps.push(mir::FieldStep::Struct {
                                        name: *name,
                                        offset: field.offset,
                                    });
                                }
                                None => {
                                    let field_text =
                                        self.interner.view(name.id).to_owned();
                                    let struct_text = self
                                        .interner
                                        .view(structure.name.id)
                                        .to_owned();
                                    self.sink.error(
                                        format!(
                                            "`{struct_text}` has no field `{field_text}`"
                                        ),
                                        vec![Label::new(accessor.span, "unknown field")],
                                    );
                                    head = self.infer.fresh(VarKind::General);
                                }
                            }
                        }
                        // Not concrete yet: defer the lookup as an instance
                        // constraint on the head type.
                        Ty::Var(_) => {
                            let field_ty = self.infer.fresh(VarKind::General);
                            self.constraints.instance(
                                head.clone(),
                                vec![ClassRef::Field { name: *name, ty: field_ty.clone() }],
                                accessor.span,
                            );
                            steps.push(mir::FieldStep::Deferred { name: *name });
                            head = field_ty;
                        }
                        other => {
                            let shown = self.ty_string(&other);
                            self.sink.error(
                                format!("`{shown}` has no fields"),
                                vec![Label::new(accessor.span, "not a structure type")],
                            );
                            head = self.infer.fresh(VarKind::General);
                        }
                    }
                }

                hir::AccessorKind::ArrayIndex(index) => {
                    let index = self.resolve_expr(*index);
                    let integral = self.infer.fresh(VarKind::Integral);
                    self.constraints.equate(index.ty.clone(), integral, index.span);
                    match self.infer.resolve(head.clone()) {
                        Ty::Array { element, .. } => {
                            head = *element;
                        }
                        Ty::Slice(element) => {
                            head = *element;
                        }
                        other => {
                            let shown = self.ty_string(&other);
                            self.sink.error(
                                format!("cannot index into `{shown}`"),
                                vec![Label::new(accessor.span, "not an array or slice")],
                            );
                            head = self.infer.fresh(VarKind::General);
                        }
                    }
                    steps.push(mir::FieldStep::Index(Box::new(index)));
                }
            }
        }

        mir::Expr {
            kind: mir::ExprKind::FieldAccess { base: Box::new(base), steps },
            ty: head,
            span,
        }
    }

    fn resolve_member_invocation(
        &mut self,
        receiver: hir::ExprId,
        member: hir::Name,
        arguments: &[hir::FunctionArgument],
        span: Span,
    ) -> mir::Expr {
        let receiver = self.resolve_expr(receiver);
        let arguments: Vec<mir::Expr> =
            arguments.iter().map(|a| self.resolve_expr(a.expr)).collect();

        if member.is_upper {
            let text = self.interner.view(member.id).to_owned();
            self.sink.error(
                format!("`{text}` is capitalized, but a member function name was expected"),
                vec![Label::new(member.span, "function names are lowercase")],
            );
            return self.degraded(span);
        }

        let head = self.infer.resolve(receiver.ty.clone());
        let Some(associated) = self.associated_namespace_of(&head) else {
            let member_text = self.interner.view(member.id).to_owned();
            let message = if matches!(head, Ty::Var(_)) {
                format!("cannot yet determine the receiver type of `.{member_text}`")
            } else {
                let shown = self.ty_string(&head);
                format!("`{shown}` does not have member functions")
            };
            self.sink.error(message, vec![Label::new(span, "unresolvable member call")]);
            return self.degraded(span);
        };

        // Inherent members first, then typeclass instance subspaces.
        let mut candidates: Vec<crate::def::FnId> = Vec::new();
        if let Some(&id) = self.namespaces[associated].functions.get(&member.id) {
            candidates.push(id);
        }
        let subspaces: Vec<crate::nspace::NsId> =
            self.namespaces[associated].namespaces.values().copied().collect();
        for subspace in subspaces {
            if let Some(&id) = self.namespaces[subspace].functions.get(&member.id) {
                candidates.push(id);
            }
        }

        let id = match candidates.len() {
            1 => candidates[0],
            0 => {
                let member_text = self.interner.view(member.id).to_owned();
                let shown = self.ty_string(&head);
                self.sink.error(
                    format!("`{shown}` has no member function `{member_text}`"),
                    vec![Label::new(member.span, "unknown member function")],
                );
                return self.degraded(span);
            }
            _ => {
                let member_text = self.interner.view(member.id).to_owned();
                let shown = self.ty_string(&head);
                self.sink.error(
                    format!(
                        "member function `{member_text}` is ambiguous for `{shown}`"
                    ),
                    vec![Label::new(member.span, "several candidates apply")],
                );
                return self.degraded(span);
            }
        };

        let function = self.function_reference(id, span);
        let result = self.infer.fresh(VarKind::General);
        let mut parameter_tys = Vec::with_capacity(arguments.len() + 1);
        parameter_tys.push(receiver.ty.clone());
        parameter_tys.extend(arguments.iter().map(|a| a.ty.clone()));
        self.constraints.equate(
            function.ty.clone(),
            Ty::function(parameter_tys, result.clone()),
            span,
        );

        let mut all_arguments = Vec::with_capacity(arguments.len() + 1);
        all_arguments.push(receiver);
        all_arguments.extend(arguments);
        mir::Expr {
            kind: mir::ExprKind::Invocation {
                invocable: Box::new(function),
                arguments: all_arguments,
            },
            ty: result,
            span,
        }
    }

    fn resolve_take_reference(
        &mut self,
        mutability: hir::Mutability,
        name: hir::Name,
        span: Span,
    ) -> mir::Expr {
        let mutability = self.resolve_mutability(mutability);
        let Some(binding) = self.scopes.find_variable(name.id) else {
            let text = self.interner.view(name.id).to_owned();
            self.sink.error(
                format!("cannot find `{text}` in this scope"),
                vec![Label::new(name.span, "undeclared name")],
            );
            return self.degraded(span);
        };
        binding.has_been_mentioned = true;
        let is_mutable = binding.is_mutable;
        let frame_offset = binding.frame_offset;
        let inner = binding.ty.clone();

        if matches!(mutability, Mutness::Mut) && !is_mutable {
            let text = self.interner.view(name.id).to_owned();
            self.sink.error(
                format!("cannot take a mutable reference to immutable `{text}`"),
                vec![Label::new(span, "the binding is not `mut`")],
            );
        }

        mir::Expr {
            kind: mir::ExprKind::Reference { frame_offset, mutability },
            ty: Ty::Reference { mutability, inner: Box::new(inner) },
            span,
        }
    }

    /// Whether values of this type copy freely (no move tracking needed).
    fn is_trivial(&mut self, ty: &Ty) -> bool {
        match self.infer.resolve(ty.clone()) {
            Ty::Int(_)
            | Ty::Float
            | Ty::Char
            | Ty::Bool
            | Ty::Function { .. }
            | Ty::Reference { .. }
            | Ty::Var(_) => true,
            Ty::Tuple(elements) => elements.iter().all(|e| self.is_trivial(e)),
            Ty::Array { element, .. } => self.is_trivial(&element),
            Ty::Str | Ty::Slice(_) | Ty::Structure(..) | Ty::Enumeration(..) => false,
        }
    }
}
