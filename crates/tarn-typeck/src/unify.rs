//! Unification engine.
//!
//! Implements kind-constrained unification over [`Ty`] using `ena`'s
//! union-find table. Variable kinds live in a side vector indexed by the
//! raw key; var-var unions keep the more restrictive kind at the root.
//! Reference mutability unifies through a second, boolean-like key space.
//!
//! The engine itself is pure: failures are returned, not emitted. The
//! constraint-solving driver in `lib.rs` turns failures into diagnostics
//! with the constraint's origin span.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use crate::ty::{MutVar, Mutness, Scheme, SchemeParam, Ty, TyVar, VarKind};

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

impl ena::unify::UnifyKey for MutVar {
    type Value = Option<Mutness>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        MutVar(u)
    }

    fn tag() -> &'static str {
        "MutVar"
    }
}

impl ena::unify::EqUnifyValue for Mutness {}

/// Why two types failed to unify.
#[derive(Debug, Clone)]
pub enum UnifyError {
    /// The two types (in their most resolved form at failure time) have
    /// incompatible shapes or kinds.
    Mismatch { left: Ty, right: Ty },
    /// A variable would occur inside its own solution.
    InfiniteType { ty: Ty },
}

/// The inference state: union-find tables and per-variable kinds.
pub struct Infer {
    table: InPlaceUnificationTable<TyVar>,
    mut_table: InPlaceUnificationTable<MutVar>,
    /// Kind of each variable, indexed by the raw key. Only the root's entry
    /// is authoritative.
    var_kinds: Vec<VarKind>,
}

/// A restore point across both key spaces, for trial unification during
/// instance selection.
pub struct InferSnapshot {
    tys: ena::unify::Snapshot<ena::unify::InPlace<TyVar>>,
    muts: ena::unify::Snapshot<ena::unify::InPlace<MutVar>>,
    kinds_len: usize,
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

impl Infer {
    pub fn new() -> Self {
        Infer {
            table: InPlaceUnificationTable::new(),
            mut_table: InPlaceUnificationTable::new(),
            var_kinds: Vec::new(),
        }
    }

    // ── Variable creation ───────────────────────────────────────────

    /// Mint a fresh variable of the given kind. Tags increase monotonically
    /// within one pipeline.
    pub fn fresh_var(&mut self, kind: VarKind) -> TyVar {
        let var = self.table.new_key(None);
        debug_assert_eq!(var.0 as usize, self.var_kinds.len());
        self.var_kinds.push(kind);
        var
    }

    pub fn fresh(&mut self, kind: VarKind) -> Ty {
        Ty::Var(self.fresh_var(kind))
    }

    pub fn fresh_mutability(&mut self) -> Mutness {
        Mutness::Var(self.mut_table.new_key(None))
    }

    /// The authoritative kind of a variable (its root's kind).
    pub fn kind_of(&mut self, var: TyVar) -> VarKind {
        let root = self.table.find(var);
        self.var_kinds[root.0 as usize]
    }

    // ── Resolution ──────────────────────────────────────────────────

    /// Resolve a type by following union-find indirection, recursing into
    /// compound types. Unbound variables normalize to their root key so
    /// members of one equivalence class resolve identically.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Tuple(elements) => {
                Ty::Tuple(elements.into_iter().map(|e| self.resolve(e)).collect())
            }
            Ty::Array { element, length } => Ty::Array {
                element: Box::new(self.resolve(*element)),
                length,
            },
            Ty::Slice(element) => Ty::Slice(Box::new(self.resolve(*element))),
            Ty::Function { parameters, return_type } => Ty::Function {
                parameters: parameters.into_iter().map(|p| self.resolve(p)).collect(),
                return_type: Box::new(self.resolve(*return_type)),
            },
            Ty::Reference { mutability, inner } => Ty::Reference {
                mutability: self.resolve_mutability(mutability),
                inner: Box::new(self.resolve(*inner)),
            },
            Ty::Structure(id, args) => {
                Ty::Structure(id, args.into_iter().map(|a| self.resolve(a)).collect())
            }
            Ty::Enumeration(id, args) => {
                Ty::Enumeration(id, args.into_iter().map(|a| self.resolve(a)).collect())
            }
            other => other,
        }
    }

    pub fn resolve_mutability(&mut self, mutability: Mutness) -> Mutness {
        match mutability {
            Mutness::Var(v) => match self.mut_table.probe_value(v) {
                Some(inner) => self.resolve_mutability(inner),
                None => Mutness::Var(self.mut_table.find(v)),
            },
            other => other,
        }
    }

    // ── Occurs check ────────────────────────────────────────────────

    /// Whether `var` occurs anywhere within `ty`.
    ///
    /// HIR cannot express user-written recursive type equations (type
    /// recursion goes through nominal definitions), so on well-formed input
    /// this never fires; it guards against compiler bugs.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if self.table.unioned(var, *v) {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Int(_) | Ty::Float | Ty::Char | Ty::Bool | Ty::Str => false,
            Ty::Tuple(elements) => elements.iter().any(|e| self.occurs_in(var, e)),
            Ty::Array { element, .. } => self.occurs_in(var, element),
            Ty::Slice(element) => self.occurs_in(var, element),
            Ty::Function { parameters, return_type } => {
                parameters.iter().any(|p| self.occurs_in(var, p))
                    || self.occurs_in(var, return_type)
            }
            Ty::Reference { inner, .. } => self.occurs_in(var, inner),
            Ty::Structure(_, args) | Ty::Enumeration(_, args) => {
                args.iter().any(|a| self.occurs_in(var, a))
            }
        }
    }

    // ── Unification ─────────────────────────────────────────────────

    /// Unify two types, making them equal by mutating variable cells.
    pub fn unify(&mut self, a: Ty, b: Ty) -> Result<(), UnifyError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                let k1 = self.kind_of(v1);
                let k2 = self.kind_of(v2);
                match merged_kind(k1, k2) {
                    Some(kind) => {
                        self.table
                            .unify_var_var(v1, v2)
                            .expect("unifying two unbound vars should not fail");
                        let root = self.table.find(v1);
                        self.var_kinds[root.0 as usize] = kind;
                        Ok(())
                    }
                    None => Err(UnifyError::Mismatch { left: Ty::Var(v1), right: Ty::Var(v2) }),
                }
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if !kind_allows(self.kind_of(v), &ty) {
                    return Err(UnifyError::Mismatch { left: Ty::Var(v), right: ty });
                }
                if self.occurs_in(v, &ty) {
                    return Err(UnifyError::InfiniteType { ty });
                }
                self.table
                    .unify_var_value(v, Some(ty))
                    .expect("binding an unbound var after the occurs check should not fail");
                Ok(())
            }

            (Ty::Int(w1), Ty::Int(w2)) if w1 == w2 => Ok(()),
            (Ty::Float, Ty::Float)
            | (Ty::Char, Ty::Char)
            | (Ty::Bool, Ty::Bool)
            | (Ty::Str, Ty::Str) => Ok(()),

            (Ty::Tuple(e1), Ty::Tuple(e2)) => {
                if e1.len() != e2.len() {
                    return Err(UnifyError::Mismatch {
                        left: Ty::Tuple(e1),
                        right: Ty::Tuple(e2),
                    });
                }
                for (a, b) in e1.into_iter().zip(e2) {
                    self.unify(a, b)?;
                }
                Ok(())
            }

            (
                Ty::Array { element: el1, length: n1 },
                Ty::Array { element: el2, length: n2 },
            ) => {
                if n1 != n2 {
                    return Err(UnifyError::Mismatch {
                        left: Ty::Array { element: el1, length: n1 },
                        right: Ty::Array { element: el2, length: n2 },
                    });
                }
                self.unify(*el1, *el2)
            }

            (Ty::Slice(el1), Ty::Slice(el2)) => self.unify(*el1, *el2),

            (
                Ty::Function { parameters: p1, return_type: r1 },
                Ty::Function { parameters: p2, return_type: r2 },
            ) => {
                if p1.len() != p2.len() {
                    return Err(UnifyError::Mismatch {
                        left: Ty::Function { parameters: p1, return_type: r1 },
                        right: Ty::Function { parameters: p2, return_type: r2 },
                    });
                }
                for (a, b) in p1.into_iter().zip(p2) {
                    self.unify(a, b)?;
                }
                self.unify(*r1, *r2)
            }

            (
                Ty::Reference { mutability: m1, inner: i1 },
                Ty::Reference { mutability: m2, inner: i2 },
            ) => {
                if self.unify_mutability(m1, m2).is_err() {
                    return Err(UnifyError::Mismatch {
                        left: Ty::Reference { mutability: m1, inner: i1 },
                        right: Ty::Reference { mutability: m2, inner: i2 },
                    });
                }
                self.unify(*i1, *i2)
            }

            (Ty::Structure(id1, a1), Ty::Structure(id2, a2)) if id1 == id2 => {
                if a1.len() != a2.len() {
                    return Err(UnifyError::Mismatch {
                        left: Ty::Structure(id1, a1),
                        right: Ty::Structure(id2, a2),
                    });
                }
                for (a, b) in a1.into_iter().zip(a2) {
                    self.unify(a, b)?;
                }
                Ok(())
            }

            (Ty::Enumeration(id1, a1), Ty::Enumeration(id2, a2)) if id1 == id2 => {
                if a1.len() != a2.len() {
                    return Err(UnifyError::Mismatch {
                        left: Ty::Enumeration(id1, a1),
                        right: Ty::Enumeration(id2, a2),
                    });
                }
                for (a, b) in a1.into_iter().zip(a2) {
                    self.unify(a, b)?;
                }
                Ok(())
            }

            (left, right) => Err(UnifyError::Mismatch { left, right }),
        }
    }

    /// Unify two mutabilities. Parameterized mutability behaves like a
    /// boolean variable; concrete mutabilities must match exactly.
    pub fn unify_mutability(&mut self, a: Mutness, b: Mutness) -> Result<(), ()> {
        let a = self.resolve_mutability(a);
        let b = self.resolve_mutability(b);
        match (a, b) {
            (Mutness::Var(v1), Mutness::Var(v2)) => {
                self.mut_table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound mutability vars should not fail");
                Ok(())
            }
            (Mutness::Var(v), m) | (m, Mutness::Var(v)) => {
                self.mut_table
                    .unify_var_value(v, Some(m))
                    .expect("binding an unbound mutability var should not fail");
                Ok(())
            }
            (Mutness::Mut, Mutness::Mut) | (Mutness::Immut, Mutness::Immut) => Ok(()),
            _ => Err(()),
        }
    }

    // ── Trial unification ───────────────────────────────────────────

    pub fn snapshot(&mut self) -> InferSnapshot {
        InferSnapshot {
            tys: self.table.snapshot(),
            muts: self.mut_table.snapshot(),
            kinds_len: self.var_kinds.len(),
        }
    }

    pub fn rollback_to(&mut self, snapshot: InferSnapshot) {
        self.table.rollback_to(snapshot.tys);
        self.mut_table.rollback_to(snapshot.muts);
        self.var_kinds.truncate(snapshot.kinds_len);
    }

    pub fn commit(&mut self, snapshot: InferSnapshot) {
        self.table.commit(snapshot.tys);
        self.mut_table.commit(snapshot.muts);
    }

    // ── Instantiation ───────────────────────────────────────────────

    /// Instantiate a scheme: every quantified parameter becomes a fresh
    /// general variable. Returns the instantiated type and the per-parameter
    /// fresh types (for class-bound constraints and explicit applications).
    pub fn instantiate(&mut self, scheme: &Scheme) -> (Ty, Vec<(SchemeParam, Ty)>) {
        if scheme.params.is_empty() {
            return (scheme.ty.clone(), Vec::new());
        }
        // Substitution is keyed by union-find roots: a quantified variable
        // may have been unioned with other variables while the defining
        // body was inferred, and occurrences resolve to the root.
        let mut map = FxHashMap::default();
        let mut fresh = Vec::with_capacity(scheme.params.len());
        for param in &scheme.params {
            let root = self.table.find(param.var);
            let var = match map.get(&root) {
                Some(existing) => Ty::clone(existing),
                None => {
                    let var = self.fresh(VarKind::General);
                    map.insert(root, var.clone());
                    var
                }
            };
            fresh.push((param.clone(), var));
        }
        (self.substitute(&scheme.ty, &map), fresh)
    }

    /// Apply a substitution map (keyed by unbound variable roots) to a
    /// type, following bound variables through the table.
    pub fn substitute(&mut self, ty: &Ty, map: &FxHashMap<TyVar, Ty>) -> Ty {
        match ty {
            Ty::Var(v) => {
                match self.table.probe_value(*v) {
                    Some(inner) => self.substitute(&inner, map),
                    None => {
                        let root = self.table.find(*v);
                        match map.get(&root) {
                            Some(replacement) => replacement.clone(),
                            None => Ty::Var(root),
                        }
                    }
                }
            }
            Ty::Int(_) | Ty::Float | Ty::Char | Ty::Bool | Ty::Str => ty.clone(),
            Ty::Tuple(elements) => {
                Ty::Tuple(elements.iter().map(|e| self.substitute(e, map)).collect())
            }
            Ty::Array { element, length } => Ty::Array {
                element: Box::new(self.substitute(element, map)),
                length: *length,
            },
            Ty::Slice(element) => Ty::Slice(Box::new(self.substitute(element, map))),
            Ty::Function { parameters, return_type } => Ty::Function {
                parameters: parameters.iter().map(|p| self.substitute(p, map)).collect(),
                return_type: Box::new(self.substitute(return_type, map)),
            },
            Ty::Reference { mutability, inner } => Ty::Reference {
                mutability: *mutability,
                inner: Box::new(self.substitute(inner, map)),
            },
            Ty::Structure(id, args) => {
                Ty::Structure(*id, args.iter().map(|a| self.substitute(a, map)).collect())
            }
            Ty::Enumeration(id, args) => {
                Ty::Enumeration(*id, args.iter().map(|a| self.substitute(a, map)).collect())
            }
        }
    }

    // ── Literal defaulting ──────────────────────────────────────────

    /// Bind every surviving literal variable reachable from `ty` to its
    /// default: integral variables to `I64`, floating variables to `Float`.
    /// Unsolved reference mutability defaults to immutable. General
    /// variables are left alone (they may be quantified in a scheme).
    pub fn default_literals(&mut self, ty: &Ty) {
        let resolved = self.resolve(ty.clone());
        self.default_resolved(&resolved);
    }

    fn default_resolved(&mut self, ty: &Ty) {
        match ty {
            Ty::Var(v) => match self.kind_of(*v) {
                VarKind::Integral => {
                    self.table
                        .unify_var_value(*v, Some(Ty::default_int()))
                        .expect("defaulting an unbound integral var should not fail");
                }
                VarKind::Floating => {
                    self.table
                        .unify_var_value(*v, Some(Ty::Float))
                        .expect("defaulting an unbound floating var should not fail");
                }
                VarKind::General => {}
            },
            Ty::Int(_) | Ty::Float | Ty::Char | Ty::Bool | Ty::Str => {}
            Ty::Tuple(elements) => {
                for e in elements {
                    self.default_resolved(e);
                }
            }
            Ty::Array { element, .. } | Ty::Slice(element) => self.default_resolved(element),
            Ty::Function { parameters, return_type } => {
                for p in parameters {
                    self.default_resolved(p);
                }
                self.default_resolved(return_type);
            }
            Ty::Reference { mutability, inner } => {
                if let Mutness::Var(v) = self.resolve_mutability(*mutability) {
                    self.mut_table
                        .unify_var_value(v, Some(Mutness::Immut))
                        .expect("defaulting an unbound mutability var should not fail");
                }
                self.default_resolved(inner);
            }
            Ty::Structure(_, args) | Ty::Enumeration(_, args) => {
                for a in args {
                    self.default_resolved(a);
                }
            }
        }
    }
}

/// The more restrictive of two variable kinds, or `None` when the kinds
/// exclude each other.
fn merged_kind(a: VarKind, b: VarKind) -> Option<VarKind> {
    match (a, b) {
        (VarKind::General, other) | (other, VarKind::General) => Some(other),
        (VarKind::Integral, VarKind::Integral) => Some(VarKind::Integral),
        (VarKind::Floating, VarKind::Floating) => Some(VarKind::Floating),
        (VarKind::Integral, VarKind::Floating) | (VarKind::Floating, VarKind::Integral) => None,
    }
}

/// Whether a variable of `kind` may be bound to `ty`.
fn kind_allows(kind: VarKind, ty: &Ty) -> bool {
    match kind {
        VarKind::General => true,
        VarKind::Integral => matches!(ty, Ty::Int(_)),
        VarKind::Floating => matches!(ty, Ty::Float),
    }
}
