//! Name resolution and type inference for the Tarn compiler.
//!
//! Consumes a desugared [`tarn_hir::Module`] and produces a typed
//! [`mir::Module`]: definitions are registered into a hierarchical
//! namespace graph, resolved in declaration order (signatures eagerly,
//! function bodies lazily), and every expression is typed by
//! constraint-based unification over kind-constrained variables.
//!
//! The pipeline is single-threaded and synchronous; its only observable
//! output besides the returned module is what it appends to the diagnostic
//! sink. Success is defined as "the sink contains no errors afterwards".

pub mod constraint;
pub mod def;
pub mod expr;
pub mod lookup;
pub mod mir;
pub mod nspace;
pub mod pattern;
pub mod scope;
pub mod ty;
pub mod type_resolve;
pub mod unify;

use la_arena::Arena;
use rustc_hash::{FxHashMap, FxHashSet};
use tarn_common::{DiagnosticSink, Identifier, Interner};
use tarn_hir as hir;

use constraint::ConstraintSet;
use def::{
    AliasInfo, ClassId, ClassInfo, EnumInfo, FnId, FnInfo, FnSignature, Instance, StructInfo,
    TemplateScope,
};
use nspace::{Namespace, NsId, PendingImpl, PendingInst};
use scope::ScopeStack;
use ty::{MutVar, Mutness, Ty, TyVar, VarKind};
use unify::Infer;

/// Type-check one desugared module.
///
/// Recoverable errors are appended to `sink` and degrade the affected
/// subtrees; the returned module is only meaningful when
/// `sink.has_errors()` is false afterwards.
pub fn check_module(
    module: hir::Module,
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
) -> mir::Module {
    let mut cx = Context::new(module, interner, sink);
    let definitions = std::mem::take(&mut cx.hir.definitions);
    let global = cx.global;
    cx.register_definitions(definitions, global);
    cx.attach_pending_blocks();
    cx.resolve_namespace_definitions(global);
    cx.solve_constraints();
    cx.build_module()
}

/// Shared state of one pipeline run.
///
/// The identifier pool and the diagnostic sink are process-scoped
/// collaborators passed by reference; everything else is owned by the run.
pub struct Context<'a> {
    pub hir: hir::Module,
    pub interner: &'a mut Interner,
    pub sink: &'a mut DiagnosticSink,

    pub infer: Infer,
    pub constraints: ConstraintSet,
    pub scopes: ScopeStack,

    pub namespaces: Arena<Namespace>,
    pub global: NsId,
    /// Namespace relative lookups start from; tracks the definition being
    /// resolved.
    pub current_ns: NsId,

    pub fns: Arena<FnInfo>,
    pub structs: Arena<StructInfo>,
    pub enums: Arena<EnumInfo>,
    pub aliases: Arena<AliasInfo>,
    pub classes: Arena<ClassInfo>,

    pub(crate) fn_signatures: FxHashMap<FnId, FnSignature>,
    pub(crate) instances: FxHashMap<ClassId, Vec<Instance>>,
    pub(crate) pending_impls: Vec<PendingImpl>,
    pub(crate) pending_insts: Vec<PendingInst>,
    pub(crate) outer_template_bindings: FxHashMap<FnId, TemplateScope>,
    pub(crate) bodies_in_progress: FxHashSet<FnId>,

    /// Mutability template parameters in scope for the current definition.
    pub(crate) mut_env: FxHashMap<Identifier, MutVar>,
    /// Implicit template parameters (by desugar tag) of the current
    /// function.
    pub(crate) implicit_env: FxHashMap<u32, TyVar>,
    /// Return types of the enclosing function bodies, innermost last.
    pub(crate) return_stack: Vec<Ty>,

    /// Inside `type_of(..)` or `size_of(..)`: bindings claim no frame
    /// storage and moves are not recorded.
    pub is_unevaluated: bool,
}

impl<'a> Context<'a> {
    pub fn new(
        module: hir::Module,
        interner: &'a mut Interner,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        let mut namespaces = Arena::new();
        let global = namespaces.alloc(Namespace::default());
        Context {
            hir: module,
            interner,
            sink,
            infer: Infer::new(),
            constraints: ConstraintSet::default(),
            scopes: ScopeStack::new(),
            namespaces,
            global,
            current_ns: global,
            fns: Arena::new(),
            structs: Arena::new(),
            enums: Arena::new(),
            aliases: Arena::new(),
            classes: Arena::new(),
            fn_signatures: FxHashMap::default(),
            instances: FxHashMap::default(),
            pending_impls: Vec::new(),
            pending_insts: Vec::new(),
            outer_template_bindings: FxHashMap::default(),
            bodies_in_progress: FxHashSet::default(),
            mut_env: FxHashMap::default(),
            implicit_env: FxHashMap::default(),
            return_stack: Vec::new(),
            is_unevaluated: false,
        }
    }

    /// The namespace holding a type's inherent members, if it has one.
    pub(crate) fn associated_namespace_of(&mut self, ty: &Ty) -> Option<NsId> {
        match self.infer.resolve(ty.clone()) {
            Ty::Structure(id, _) => self.structs[id].associated_namespace,
            Ty::Enumeration(id, _) => self.enums[id].associated_namespace,
            _ => None,
        }
    }

    // ── Type display ────────────────────────────────────────────────

    /// Render a type for diagnostics, in its most resolved form.
    pub fn ty_string(&mut self, ty: &Ty) -> String {
        let resolved = self.infer.resolve(ty.clone());
        self.render_ty(&resolved)
    }

    fn render_ty(&mut self, ty: &Ty) -> String {
        match ty {
            Ty::Var(v) => match self.infer.kind_of(*v) {
                VarKind::Integral => "{integer}".to_owned(),
                VarKind::Floating => "{float}".to_owned(),
                VarKind::General => format!("?{}", v.0),
            },
            Ty::Int(width) => width.to_string(),
            Ty::Float => "Float".to_owned(),
            Ty::Char => "Char".to_owned(),
            Ty::Bool => "Bool".to_owned(),
            Ty::Str => "Str".to_owned(),
            Ty::Tuple(elements) => {
                let parts: Vec<String> =
                    elements.iter().map(|e| self.render_ty(e)).collect();
                format!("({})", parts.join(", "))
            }
            Ty::Array { element, length } => {
                format!("[{}; {length}]", self.render_ty(element))
            }
            Ty::Slice(element) => format!("[{}]", self.render_ty(element)),
            Ty::Function { parameters, return_type } => {
                let parts: Vec<String> =
                    parameters.iter().map(|p| self.render_ty(p)).collect();
                format!("fn({}) -> {}", parts.join(", "), self.render_ty(return_type))
            }
            Ty::Reference { mutability, inner } => {
                let mutability = match self.infer.resolve_mutability(*mutability) {
                    Mutness::Mut => "mut ",
                    Mutness::Immut => "",
                    Mutness::Var(_) => "mut? ",
                };
                format!("&{mutability}{}", self.render_ty(inner))
            }
            Ty::Structure(id, args) => {
                let name = self.interner.view(self.structs[*id].name.id).to_owned();
                self.render_applied(name, args)
            }
            Ty::Enumeration(id, args) => {
                let name = self.interner.view(self.enums[*id].name.id).to_owned();
                self.render_applied(name, args)
            }
        }
    }

    fn render_applied(&mut self, name: String, args: &[Ty]) -> String {
        if args.is_empty() {
            return name;
        }
        let parts: Vec<String> = args.iter().map(|a| self.render_ty(a)).collect();
        format!("{name}[{}]", parts.join(", "))
    }

    // ── Size model ──────────────────────────────────────────────────

    /// Size of a type in bytes for frame-offset accounting.
    ///
    /// Types whose size is not yet known (unsolved variables, template
    /// parameters) contribute zero; codegen finalizes layout after
    /// monomorphization.
    pub fn size_of(&mut self, ty: &Ty) -> u64 {
        match self.infer.resolve(ty.clone()) {
            Ty::Int(width) => width.size(),
            Ty::Float => 8,
            Ty::Char => 4,
            Ty::Bool => 1,
            // Pointer plus length.
            Ty::Str => 16,
            Ty::Tuple(elements) => elements
                .iter()
                .fold(0u64, |total, e| total.saturating_add(self.size_of(e))),
            Ty::Array { element, length } => {
                self.size_of(&element).saturating_mul(length)
            }
            Ty::Slice(_) => 16,
            Ty::Function { .. } => 8,
            Ty::Reference { .. } => 8,
            Ty::Structure(id, _) => {
                self.structs[id].mir.as_ref().map_or(0, |s| s.size)
            }
            Ty::Enumeration(id, _) => self.enums[id].mir.as_ref().map_or(0, |e| e.size),
            Ty::Var(_) => 0,
        }
    }
}
