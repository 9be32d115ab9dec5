//! HIR type to MIR type resolution.
//!
//! Recursive and total on well-formed input: primitives map directly,
//! compound types recurse, typenames go through scope (local aliases and
//! template parameters shadow namespaces) and then the namespace graph.
//! `type_of(e)` re-enters the expression resolver with the unevaluated
//! flag set and takes the expression's inferred type, discarding its value
//! side of the resolution.

use rustc_hash::FxHashMap;
use tarn_common::Label;
use tarn_hir as hir;

use crate::lookup::{LookupErr, TypeDefRef};
use crate::ty::{Mutness, Ty, VarKind};
use crate::Context;

impl Context<'_> {
    /// Resolve a HIR type in the current namespace and scope.
    ///
    /// Every returned type is valid unifier input; recoverable failures
    /// degrade to a fresh general variable after reporting.
    pub(crate) fn resolve_type(&mut self, id: hir::TypeId) -> Ty {
        let ty = self.hir.arena.types[id].clone();
        match ty.kind {
            hir::TypeKind::Int(width) => Ty::Int(width),
            hir::TypeKind::Float => Ty::Float,
            hir::TypeKind::Char => Ty::Char,
            hir::TypeKind::Bool => Ty::Bool,
            hir::TypeKind::Str => Ty::Str,
            hir::TypeKind::Wildcard => self.infer.fresh(VarKind::General),
            hir::TypeKind::ImplicitParam(tag) => match self.implicit_env.get(&tag) {
                Some(var) => Ty::Var(*var),
                None => unreachable!("implicit template parameter outside a function"),
            },
            hir::TypeKind::Typename(name) => self.resolve_typename(&name, Some(&[]), ty.span),
            hir::TypeKind::TemplateApplication { name, arguments } => {
                self.resolve_typename(&name, Some(&arguments), ty.span)
            }
            hir::TypeKind::Tuple(elements) => {
                Ty::Tuple(elements.iter().map(|&t| self.resolve_type(t)).collect())
            }
            hir::TypeKind::Array { element, length } => {
                let element = self.resolve_type(element);
                let length = self.resolve_array_length(length);
                Ty::Array { element: Box::new(element), length }
            }
            hir::TypeKind::Slice(element) => {
                Ty::Slice(Box::new(self.resolve_type(element)))
            }
            hir::TypeKind::Function { parameters, return_type } => Ty::Function {
                parameters: parameters.iter().map(|&t| self.resolve_type(t)).collect(),
                return_type: Box::new(self.resolve_type(return_type)),
            },
            hir::TypeKind::TypeOf(expr) => {
                // Unevaluated re-entry into the inferencer: the expression's
                // value is discarded, only its type survives.
                let saved = std::mem::replace(&mut self.is_unevaluated, true);
                self.scopes.enter();
                let resolved = self.resolve_expr(expr);
                self.scopes.exit(self.interner, self.sink);
                self.is_unevaluated = saved;
                resolved.ty
            }
            hir::TypeKind::Reference { mutability, inner } => {
                let mutability = self.resolve_mutability(mutability);
                Ty::Reference { mutability, inner: Box::new(self.resolve_type(inner)) }
            }
        }
    }

    /// Resolve surface mutability, mapping parameterized mutability onto
    /// its in-scope template variable.
    pub(crate) fn resolve_mutability(&mut self, mutability: hir::Mutability) -> Mutness {
        match mutability.kind {
            hir::MutabilityKind::Immut => Mutness::Immut,
            hir::MutabilityKind::Mut => Mutness::Mut,
            hir::MutabilityKind::Parameterized(id) => match self.mut_env.get(&id) {
                Some(var) => Mutness::Var(*var),
                None => {
                    let text = self.interner.view(id).to_owned();
                    self.sink.error(
                        format!("no mutability parameter `{text}` is in scope"),
                        vec![Label::new(mutability.span, "unknown mutability parameter")],
                    );
                    Mutness::Immut
                }
            },
        }
    }

    /// Resolve a typename or template application head.
    ///
    /// `arguments` is `None` when the use site elides template arguments
    /// entirely (constructor patterns); elided arguments instantiate to
    /// fresh variables instead of reporting an arity error.
    pub(crate) fn resolve_typename(
        &mut self,
        name: &hir::QualifiedName,
        arguments: Option<&[hir::TemplateArgument]>,
        span: tarn_common::Span,
    ) -> Ty {
        // Local type aliases and template parameters shadow namespace
        // lookups, but only for unqualified names.
        if name.is_unqualified() && arguments.map_or(true, <[_]>::is_empty) {
            if let Some(binding) = self.scopes.find_type(name.primary.id) {
                binding.has_been_mentioned = true;
                return binding.ty.clone();
            }
        }

        let target = match self.find_type(name) {
            Ok(target) => target,
            Err(LookupErr::Reported) => return self.infer.fresh(VarKind::General),
            Err(LookupErr::NotFound) => {
                let text = self.interner.view(name.primary.id).to_owned();
                self.sink.error(
                    format!("`{text}` does not refer to a type"),
                    vec![Label::new(name.primary.span, "no such type in scope")],
                );
                return self.infer.fresh(VarKind::General);
            }
        };

        match target {
            TypeDefRef::Struct(id) => {
                self.ensure_struct(id, name.primary.span);
                let params = self.structs[id]
                    .mir
                    .as_ref()
                    .map(|s| s.template_params.clone())
                    .unwrap_or_default();
                let args = self.resolve_template_arguments(
                    &params,
                    arguments,
                    name.primary,
                    span,
                );
                Ty::Structure(id, args)
            }
            TypeDefRef::Enum(id) => {
                self.ensure_enum(id, name.primary.span);
                let params = self.enums[id]
                    .mir
                    .as_ref()
                    .map(|e| e.template_params.clone())
                    .unwrap_or_default();
                let args = self.resolve_template_arguments(
                    &params,
                    arguments,
                    name.primary,
                    span,
                );
                Ty::Enumeration(id, args)
            }
            TypeDefRef::Alias(id) => {
                let aliased = self.ensure_alias(id, name.primary.span);
                let params = self.aliases[id]
                    .mir
                    .as_ref()
                    .map(|a| a.template_params.clone())
                    .unwrap_or_default();
                let args = self.resolve_template_arguments(
                    &params,
                    arguments,
                    name.primary,
                    span,
                );
                if params.is_empty() {
                    aliased
                } else {
                    let map: FxHashMap<_, _> = params
                        .iter()
                        .map(|p| p.var)
                        .zip(args)
                        .collect();
                    self.infer.substitute(&aliased, &map)
                }
            }
        }
    }

    /// Check template-argument arity against a parameter set and resolve
    /// the arguments; missing arguments on a template are an error, while
    /// fully elided arguments (`None`) instantiate as fresh variables.
    fn resolve_template_arguments(
        &mut self,
        params: &[crate::mir::TemplateParamInfo],
        arguments: Option<&[hir::TemplateArgument]>,
        head: hir::Name,
        span: tarn_common::Span,
    ) -> Vec<Ty> {
        let Some(arguments) = arguments else {
            return params.iter().map(|_| self.infer.fresh(VarKind::General)).collect();
        };
        if arguments.len() != params.len() {
            let text = self.interner.view(head.id).to_owned();
            self.sink.error(
                format!(
                    "`{text}` expects {} template argument(s), found {}",
                    params.len(),
                    arguments.len()
                ),
                vec![Label::new(span, "wrong number of template arguments")],
            );
            // Degrade to fresh variables so inference can continue.
            return params.iter().map(|_| self.infer.fresh(VarKind::General)).collect();
        }
        arguments
            .iter()
            .map(|argument| match argument {
                hir::TemplateArgument::Type(ty) => self.resolve_type(*ty),
                hir::TemplateArgument::Wildcard(_) => self.infer.fresh(VarKind::General),
                hir::TemplateArgument::Mutability(m) => {
                    self.sink.error(
                        "expected a type argument, found a mutability argument",
                        vec![Label::new(m.span, "kind mismatch")],
                    );
                    self.infer.fresh(VarKind::General)
                }
            })
            .collect()
    }

    /// Array lengths must currently be integer literals; meta evaluation of
    /// arbitrary length expressions is future work.
    fn resolve_array_length(&mut self, length: hir::ExprId) -> u64 {
        let expr = self.hir.arena.exprs[length].clone();
        match expr.kind {
            hir::ExprKind::IntLiteral(value) if value >= 0 => value as u64,
            hir::ExprKind::IntLiteral(_) => {
                self.sink.error(
                    "array lengths cannot be negative",
                    vec![Label::new(expr.span, "negative length")],
                );
                0
            }
            _ => {
                self.sink.error(
                    "non-literal array lengths are not supported yet",
                    vec![Label::new(expr.span, "expected an integer literal")],
                );
                0
            }
        }
    }
}
