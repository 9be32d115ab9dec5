//! The constraint set fed to the unifier.
//!
//! Expression resolution emits equality constraints into a FIFO queue and
//! instance constraints into a list; the unifier drains the queue first and
//! only then solves instance constraints, so instance selection always sees
//! the most solved form of its type.

use std::collections::VecDeque;

use tarn_common::Span;
use tarn_hir::Name;

use crate::def::ClassId;
use crate::ty::Ty;

/// A class-membership-like requirement on a type.
#[derive(Debug, Clone)]
pub enum ClassRef {
    /// Membership in a user-declared typeclass.
    Named(ClassId),
    /// The compiler-known convertible-to capability, emitted for conversion
    /// casts.
    Convert { to: Ty },
    /// The compiler-known has-field capability, emitted for member accesses
    /// whose head type is not yet concrete.
    Field { name: Name, ty: Ty },
}

/// `left = right`, requested at `origin`.
#[derive(Debug, Clone)]
pub struct EqualityConstraint {
    pub left: Ty,
    pub right: Ty,
    pub origin: Span,
}

/// `ty` must satisfy every class in `classes`.
#[derive(Debug, Clone)]
pub struct InstanceConstraint {
    pub ty: Ty,
    pub classes: Vec<ClassRef>,
    pub origin: Span,
}

/// The pipeline's pending constraints.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    pub equalities: VecDeque<EqualityConstraint>,
    pub instances: Vec<InstanceConstraint>,
}

impl ConstraintSet {
    /// Enqueue an equality constraint.
    pub fn equate(&mut self, left: Ty, right: Ty, origin: Span) {
        self.equalities.push_back(EqualityConstraint { left, right, origin });
    }

    /// Record an instance constraint.
    pub fn instance(&mut self, ty: Ty, classes: Vec<ClassRef>, origin: Span) {
        self.instances.push(InstanceConstraint { ty, classes, origin });
    }

    pub fn is_empty(&self) -> bool {
        self.equalities.is_empty() && self.instances.is_empty()
    }
}

// ── Solving ──────────────────────────────────────────────────────────────

use rustc_hash::FxHashMap;
use tarn_common::Label;

use crate::unify::UnifyError;
use crate::Context;

impl Context<'_> {
    /// Drain the constraint set: equalities in enqueue order first, then
    /// instance constraints. Failures become diagnostics at the
    /// constraint's origin; solving continues past them.
    pub(crate) fn solve_constraints(&mut self) {
        while let Some(equality) = self.constraints.equalities.pop_front() {
            if let Err(error) = self.infer.unify(equality.left, equality.right) {
                self.report_unify_error(error, equality.origin);
            }
        }
        let instances = std::mem::take(&mut self.constraints.instances);
        for constraint in instances {
            self.solve_instance_constraint(constraint);
        }
        // Instance selection may have enqueued residual equalities.
        while let Some(equality) = self.constraints.equalities.pop_front() {
            if let Err(error) = self.infer.unify(equality.left, equality.right) {
                self.report_unify_error(error, equality.origin);
            }
        }
    }

    pub(crate) fn report_unify_error(&mut self, error: UnifyError, origin: Span) {
        match error {
            UnifyError::Mismatch { left, right } => {
                let left = self.ty_string(&left);
                let right = self.ty_string(&right);
                self.sink.error(
                    format!("cannot unify {left} with {right}"),
                    vec![Label::new(origin, "the types disagree here")],
                );
            }
            UnifyError::InfiniteType { ty } => {
                let shown = self.ty_string(&ty);
                self.sink.error(
                    format!("cannot construct the infinite type `{shown}`"),
                    vec![Label::new(origin, "a type would contain itself here")],
                );
            }
        }
    }

    fn solve_instance_constraint(&mut self, constraint: InstanceConstraint) {
        for class_ref in constraint.classes {
            match class_ref {
                ClassRef::Named(class) => {
                    self.solve_named_instance(&constraint.ty, class, constraint.origin);
                }
                ClassRef::Convert { to } => {
                    self.solve_conversion(&constraint.ty, &to, constraint.origin);
                }
                ClassRef::Field { name, ty } => {
                    self.solve_deferred_field(&constraint.ty, name, &ty, constraint.origin);
                }
            }
        }
    }

    /// Scan a class's known instances for exactly one whose instance type
    /// unifies with `ty`; select it, making the unification permanent.
    fn solve_named_instance(
        &mut self,
        ty: &Ty,
        class: crate::def::ClassId,
        origin: Span,
    ) {
        let candidates = self.instances.get(&class).cloned().unwrap_or_default();

        let mut matching = Vec::new();
        for (index, instance) in candidates.iter().enumerate() {
            let snapshot = self.infer.snapshot();
            let (instance_ty, _) = self.infer.instantiate(&instance.scheme);
            let unifies = self.infer.unify(ty.clone(), instance_ty).is_ok();
            self.infer.rollback_to(snapshot);
            if unifies {
                matching.push(index);
            }
        }

        let class_text = self.interner.view(self.classes[class].name.id).to_owned();
        match matching.as_slice() {
            [index] => {
                let snapshot = self.infer.snapshot();
                let (instance_ty, _) = self.infer.instantiate(&candidates[*index].scheme);
                if let Err(error) = self.infer.unify(ty.clone(), instance_ty) {
                    self.report_unify_error(error, origin);
                }
                self.infer.commit(snapshot);
            }
            [] => {
                let shown = self.ty_string(ty);
                self.sink.error(
                    format!("no instance of `{class_text}` exists for `{shown}`"),
                    vec![Label::new(origin, "required here")],
                );
            }
            _ => {
                let shown = self.ty_string(ty);
                let mut labels = vec![Label::new(origin, "required here")];
                for &index in &matching {
                    labels.push(Label::new(
                        candidates[index].span,
                        "candidate instance declared here",
                    ));
                }
                self.sink.error(
                    format!("ambiguous instance of `{class_text}` for `{shown}`"),
                    labels,
                );
            }
        }
    }

    /// The compiler-known convertible-to capability of conversion casts.
    fn solve_conversion(&mut self, from: &Ty, to: &Ty, origin: Span) {
        let from = self.infer.resolve(from.clone());
        let to = self.infer.resolve(to.clone());
        if from == to {
            return;
        }
        let numeric = |ty: &Ty| matches!(ty, Ty::Int(_) | Ty::Float | Ty::Char | Ty::Bool);
        match (&from, &to) {
            // A pending literal converts by adopting the target type.
            (Ty::Var(_), target) if numeric(target) => {
                if let Err(error) = self.infer.unify(from.clone(), to.clone()) {
                    self.report_unify_error(error, origin);
                }
            }
            (Ty::Var(_), _) => {
                self.sink.error(
                    "cannot determine the source type of this conversion",
                    vec![Label::new(origin, "type annotations needed")],
                );
            }
            _ if numeric(&from) && numeric(&to) => {}
            _ => {
                let from = self.ty_string(&from);
                let to = self.ty_string(&to);
                self.sink.error(
                    format!("no known conversion from {from} to {to}"),
                    vec![Label::new(origin, "this cast cannot be performed")],
                );
            }
        }
    }

    /// A member access whose head was unknown at collection time.
    fn solve_deferred_field(
        &mut self,
        head: &Ty,
        name: tarn_hir::Name,
        field_ty: &Ty,
        origin: Span,
    ) {
        let resolved = self.infer.resolve(head.clone());
        match resolved {
            Ty::Structure(id, args) => {
                self.ensure_struct(id, origin);
                let Some(structure) = self.structs[id].mir.clone() else { return };
                match structure.fields.iter().find(|f| f.name.id == name.id) {
                    Some(field) => {
                        let substitution: FxHashMap<_, _> = structure
                            .template_params
                            .iter()
                            .map(|p| p.var)
                            .zip(args)
                            .collect();
                        let expected = self.infer.substitute(&field.ty, &substitution);
                        if let Err(error) = self.infer.unify(expected, field_ty.clone()) {
                            self.report_unify_error(error, origin);
                        }
                    }
                    None => {
                        let field_text = self.interner.view(name.id).to_owned();
                        let struct_text =
                            self.interner.view(structure.name.id).to_owned();
                        self.sink.error(
                            format!("`{struct_text}` has no field `{field_text}`"),
                            vec![Label::new(origin, "unknown field")],
                        );
                    }
                }
            }
            Ty::Var(_) => {
                self.sink.error(
                    "cannot determine the type this member access operates on",
                    vec![Label::new(origin, "type annotations needed")],
                );
            }
            other => {
                let shown = self.ty_string(&other);
                self.sink.error(
                    format!("`{shown}` has no fields"),
                    vec![Label::new(origin, "not a structure type")],
                );
            }
        }
    }
}
