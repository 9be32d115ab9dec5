//! Pattern binding: descend a pattern and a type in lockstep, introducing
//! scope bindings and emitting the constraints the pattern shape implies.
//!
//! Frame offsets advance by the bound type's size except in unevaluated
//! contexts. Guard expressions are resolved in the pattern's scope and
//! collected as side constraints of the enclosing match arm.

use rustc_hash::FxHashMap;
use tarn_common::Label;
use tarn_hir as hir;

use crate::def::EnumId;
use crate::mir;
use crate::scope::Binding;
use crate::ty::{Ty, VarKind};
use crate::Context;

impl Context<'_> {
    /// Bind `pattern` against `ty`, pushing guard expressions into `guards`.
    pub(crate) fn bind_pattern(
        &mut self,
        pattern: hir::PatId,
        ty: &Ty,
        guards: &mut Vec<mir::Expr>,
    ) -> mir::Pattern {
        let pat = self.hir.arena.pats[pattern].clone();
        let span = pat.span;
        let kind = match pat.kind {
            hir::PatKind::Wildcard => mir::PatternKind::Wildcard,

            hir::PatKind::IntLiteral(value) => {
                let literal = self.infer.fresh(VarKind::Integral);
                self.constraints.equate(ty.clone(), literal, span);
                mir::PatternKind::IntLiteral(value)
            }
            hir::PatKind::FloatLiteral(value) => {
                let literal = self.infer.fresh(VarKind::Floating);
                self.constraints.equate(ty.clone(), literal, span);
                mir::PatternKind::FloatLiteral(value)
            }
            hir::PatKind::CharLiteral(value) => {
                self.constraints.equate(ty.clone(), Ty::Char, span);
                mir::PatternKind::CharLiteral(value)
            }
            hir::PatKind::BoolLiteral(value) => {
                self.constraints.equate(ty.clone(), Ty::Bool, span);
                mir::PatternKind::BoolLiteral(value)
            }
            hir::PatKind::StringLiteral(value) => {
                self.constraints.equate(ty.clone(), Ty::Str, span);
                mir::PatternKind::StringLiteral(value)
            }

            hir::PatKind::Name { name, mutability } => {
                let is_mutable = self.pattern_mutability(mutability);
                let frame_offset = self.introduce_binding(name, ty, is_mutable);
                mir::PatternKind::Binding { identifier: name.id, frame_offset, is_mutable }
            }

            hir::PatKind::Tuple(patterns) => {
                let element_tys = self.tuple_element_types(ty, patterns.len(), span);
                let elements = patterns
                    .iter()
                    .zip(&element_tys)
                    .map(|(&p, t)| self.bind_pattern(p, t, guards))
                    .collect();
                mir::PatternKind::Tuple(elements)
            }

            hir::PatKind::Slice(patterns) => {
                let element_ty = self.slice_element_type(ty, span);
                let elements = patterns
                    .iter()
                    .map(|&p| self.bind_pattern(p, &element_ty, guards))
                    .collect();
                mir::PatternKind::Slice(elements)
            }

            hir::PatKind::Constructor { name, payload } => {
                return self.bind_constructor_pattern(&name, payload, ty, span, guards);
            }

            hir::PatKind::ConstructorShorthand { name, payload } => {
                let resolved = self.infer.resolve(ty.clone());
                let Ty::Enumeration(enumeration, args) = resolved else {
                    let shown = self.ty_string(ty);
                    self.sink.error(
                        format!(
                            "cannot determine the enumeration this pattern matches \
                             (scrutinee type is `{shown}`)"
                        ),
                        vec![Label::new(span, "constructor shorthand needs a known enumeration")],
                    );
                    return self.degraded_pattern(ty, span);
                };
                return self.bind_enum_constructor(
                    enumeration,
                    &args,
                    name,
                    payload,
                    ty,
                    span,
                    guards,
                );
            }

            hir::PatKind::As { binder, mutability, pattern } => {
                let inner = self.bind_pattern(pattern, ty, guards);
                let is_mutable = self.pattern_mutability(mutability);
                let frame_offset = self.introduce_binding(binder, ty, is_mutable);
                mir::PatternKind::As {
                    identifier: binder.id,
                    frame_offset,
                    is_mutable,
                    pattern: Box::new(inner),
                }
            }

            hir::PatKind::Guarded { pattern, guard } => {
                let inner = self.bind_pattern(pattern, ty, guards);
                let guard = self.resolve_expr(guard);
                self.constraints.equate(guard.ty.clone(), Ty::Bool, guard.span);
                guards.push(guard);
                return inner;
            }
        };
        mir::Pattern { kind, ty: ty.clone(), span }
    }

    /// Introduce a scope binding at the current frame offset, advancing the
    /// offset by the type's size outside unevaluated contexts.
    fn introduce_binding(&mut self, name: hir::Name, ty: &Ty, is_mutable: bool) -> u64 {
        let frame_offset = self.scopes.current_frame_offset;
        let binding = Binding {
            span: Some(name.span),
            ty: ty.clone(),
            frame_offset,
            is_mutable,
            has_been_mentioned: false,
            moved_by: None,
        };
        self.scopes.bind_variable(self.interner, self.sink, name.id, binding);
        if !self.is_unevaluated {
            let size = self.size_of(ty);
            self.scopes.current_frame_offset =
                self.scopes.current_frame_offset.saturating_add(size);
        }
        frame_offset
    }

    fn pattern_mutability(&mut self, mutability: hir::Mutability) -> bool {
        match mutability.kind {
            hir::MutabilityKind::Mut => true,
            hir::MutabilityKind::Immut => false,
            hir::MutabilityKind::Parameterized(_) => {
                self.sink.error(
                    "parameterized mutability is not allowed on a binding",
                    vec![Label::new(mutability.span, "bindings are concretely `mut` or not")],
                );
                false
            }
        }
    }

    /// The element types a tuple pattern destructures into.
    ///
    /// A concrete tuple of the right arity is used directly; a variable is
    /// constrained to a tuple of fresh variables; everything else reports
    /// and degrades.
    fn tuple_element_types(
        &mut self,
        ty: &Ty,
        arity: usize,
        span: tarn_common::Span,
    ) -> Vec<Ty> {
        match self.infer.resolve(ty.clone()) {
            Ty::Tuple(elements) if elements.len() == arity => elements,
            Ty::Tuple(elements) => {
                let shown = self.ty_string(ty);
                self.sink.error(
                    format!(
                        "this tuple pattern has {arity} pattern(s), but `{shown}` has {} \
                         element(s)",
                        elements.len()
                    ),
                    vec![Label::new(span, "pattern and type disagree")],
                );
                (0..arity).map(|_| self.infer.fresh(VarKind::General)).collect()
            }
            Ty::Var(_) => {
                let elements: Vec<Ty> =
                    (0..arity).map(|_| self.infer.fresh(VarKind::General)).collect();
                self.constraints.equate(ty.clone(), Ty::Tuple(elements.clone()), span);
                elements
            }
            other => {
                let shown = self.ty_string(&other);
                self.sink.error(
                    format!("`{shown}` cannot be bound by a tuple pattern"),
                    vec![Label::new(span, "not a tuple type")],
                );
                (0..arity).map(|_| self.infer.fresh(VarKind::General)).collect()
            }
        }
    }

    fn slice_element_type(&mut self, ty: &Ty, span: tarn_common::Span) -> Ty {
        match self.infer.resolve(ty.clone()) {
            Ty::Array { element, .. } => *element,
            Ty::Slice(element) => *element,
            Ty::Var(_) => {
                let element = self.infer.fresh(VarKind::General);
                self.constraints
                    .equate(ty.clone(), Ty::Slice(Box::new(element.clone())), span);
                element
            }
            other => {
                let shown = self.ty_string(&other);
                self.sink.error(
                    format!("`{shown}` cannot be bound by a slice pattern"),
                    vec![Label::new(span, "not an array or slice type")],
                );
                self.infer.fresh(VarKind::General)
            }
        }
    }

    /// A fully qualified constructor pattern, e.g. `Option::some(p)`.
    fn bind_constructor_pattern(
        &mut self,
        name: &hir::QualifiedName,
        payload: Option<hir::PatId>,
        ty: &Ty,
        span: tarn_common::Span,
        guards: &mut Vec<mir::Expr>,
    ) -> mir::Pattern {
        let Some((enumeration, args)) = self.constructor_enum(name, span) else {
            return self.degraded_pattern(ty, span);
        };
        self.constraints
            .equate(ty.clone(), Ty::Enumeration(enumeration, args.clone()), span);
        self.bind_enum_constructor(enumeration, &args, name.primary, payload, ty, span, guards)
    }

    /// Resolve the enumeration a constructor pattern's qualifier path names,
    /// instantiating its template arguments.
    fn constructor_enum(
        &mut self,
        name: &hir::QualifiedName,
        span: tarn_common::Span,
    ) -> Option<(EnumId, Vec<Ty>)> {
        // The enumeration is named by everything before the primary (the
        // constructor). `Option[T]::some` carries the arguments on the last
        // qualifier.
        let ty = if let Some((last, rest)) = name.middles.split_last() {
            let enum_name = hir::QualifiedName {
                root: name.root.clone(),
                middles: rest.to_vec(),
                primary: last.name,
            };
            self.resolve_typename(&enum_name, last.template_args.as_deref(), last.span)
        } else if let hir::RootQualifier::Type(ty) = &name.root {
            self.resolve_type(*ty)
        } else {
            self.sink.error(
                "cannot resolve an unqualified constructor pattern",
                vec![Label::new(span, "qualify the constructor with its enumeration")],
            );
            return None;
        };

        match self.infer.resolve(ty.clone()) {
            Ty::Enumeration(id, args) => Some((id, args)),
            other => {
                let shown = self.ty_string(&other);
                self.sink.error(
                    format!("`{shown}` is not an enumeration"),
                    vec![Label::new(span, "constructor patterns match enumerations")],
                );
                None
            }
        }
    }

    /// Shared tail of the two constructor pattern forms: find the
    /// constructor, check payload presence, recurse into the payload with
    /// the instantiated payload type.
    #[allow(clippy::too_many_arguments)]
    fn bind_enum_constructor(
        &mut self,
        enumeration: EnumId,
        args: &[Ty],
        ctor: hir::Name,
        payload: Option<hir::PatId>,
        ty: &Ty,
        span: tarn_common::Span,
        guards: &mut Vec<mir::Expr>,
    ) -> mir::Pattern {
        self.ensure_enum(enumeration, span);
        let Some(mir_enum) = self.enums[enumeration].mir.clone() else {
            return self.degraded_pattern(ty, span);
        };

        let Some(index) =
            mir_enum.constructors.iter().position(|c| c.name.id == ctor.id)
        else {
            let ctor_text = self.interner.view(ctor.id).to_owned();
            let enum_text = self.interner.view(self.enums[enumeration].name.id).to_owned();
            self.sink.error(
                format!("`{enum_text}` has no constructor `{ctor_text}`"),
                vec![Label::new(ctor.span, "unknown constructor")],
            );
            return self.degraded_pattern(ty, span);
        };

        let substitution: FxHashMap<_, _> = mir_enum
            .template_params
            .iter()
            .map(|p| p.var)
            .zip(args.iter().cloned())
            .collect();

        let payload_ty = mir_enum.constructors[index]
            .payload
            .as_ref()
            .map(|t| self.infer.substitute(t, &substitution));

        let payload = match (payload, payload_ty) {
            (Some(pattern), Some(payload_ty)) => {
                Some(Box::new(self.bind_pattern(pattern, &payload_ty, guards)))
            }
            (None, None) => None,
            (Some(pattern), None) => {
                let ctor_text = self.interner.view(ctor.id).to_owned();
                self.sink.error(
                    format!("constructor `{ctor_text}` carries no payload"),
                    vec![Label::new(self.hir.arena.pats[pattern].span, "unexpected payload pattern")],
                );
                None
            }
            (None, Some(_)) => {
                let ctor_text = self.interner.view(ctor.id).to_owned();
                self.sink.error(
                    format!("constructor `{ctor_text}` carries a payload"),
                    vec![Label::new(span, "missing payload pattern")],
                );
                None
            }
        };

        mir::Pattern {
            kind: mir::PatternKind::Constructor { enumeration, index, payload },
            ty: ty.clone(),
            span,
        }
    }

    /// An error was reported: produce a wildcard so resolution continues.
    fn degraded_pattern(&mut self, ty: &Ty, span: tarn_common::Span) -> mir::Pattern {
        mir::Pattern { kind: mir::PatternKind::Wildcard, ty: ty.clone(), span }
    }
}
