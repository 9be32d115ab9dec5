//! The namespace graph and the definition-registration pass.
//!
//! Registration walks the HIR definitions once, creating a [`DefInfo`]
//! record per definition and inserting it into the owning namespace's
//! per-category table, preserving declaration order. Nested namespaces are
//! registered recursively. Implementation and instantiation blocks cannot
//! be attached until their target type is resolvable, so they are parked in
//! pending lists and attached in a second pass.

use indexmap::IndexMap;
use la_arena::Idx;
use tarn_common::{Identifier, Label, Span};
use tarn_hir as hir;
use tarn_hir::Name;

use crate::def::{AliasId, ClassId, DefInfo, EnumId, FnId, StructId};
use crate::Context;

pub type NsId = Idx<Namespace>;

/// One namespace: name tables per definition category plus child
/// namespaces, all iterable in declaration order.
#[derive(Debug, Default)]
pub struct Namespace {
    pub name: Option<Name>,
    pub parent: Option<NsId>,
    pub namespaces: IndexMap<Identifier, NsId>,
    pub functions: IndexMap<Identifier, FnId>,
    pub structures: IndexMap<Identifier, StructId>,
    pub enumerations: IndexMap<Identifier, EnumId>,
    pub aliases: IndexMap<Identifier, AliasId>,
    pub typeclasses: IndexMap<Identifier, ClassId>,
    /// Exactly one entry per registered definition, in declaration order.
    pub definitions_in_order: Vec<DefRef>,
}

/// A declaration-order reference to a registered definition.
#[derive(Debug, Clone, Copy)]
pub enum DefRef {
    Function(FnId),
    Struct(StructId),
    Enum(EnumId),
    Alias(AliasId),
    Typeclass(ClassId),
    Namespace(NsId),
    /// Index into the pending-implementation list.
    Implementation(usize),
    /// Index into the pending-instantiation list.
    Instantiation(usize),
}

/// An implementation block parked until its target type resolves.
#[derive(Debug)]
pub struct PendingImpl {
    pub target: hir::TypeId,
    pub template_parameters: Vec<hir::TemplateParameter>,
    pub definitions: Vec<hir::Definition>,
    pub home: NsId,
    pub span: Span,
    /// Filled during attachment.
    pub target_ty: Option<crate::ty::Ty>,
    pub functions: Vec<FnId>,
}

/// An instantiation block parked until its class and target type resolve.
#[derive(Debug)]
pub struct PendingInst {
    pub class: hir::QualifiedName,
    pub target: hir::TypeId,
    pub template_parameters: Vec<hir::TemplateParameter>,
    pub definitions: Vec<hir::Definition>,
    pub home: NsId,
    pub span: Span,
    pub class_id: Option<ClassId>,
    pub target_ty: Option<crate::ty::Ty>,
    pub functions: Vec<FnId>,
}

impl Context<'_> {
    /// Register a slice of definitions into `space`, in declaration order.
    pub(crate) fn register_definitions(
        &mut self,
        definitions: Vec<hir::Definition>,
        space: NsId,
    ) {
        for definition in definitions {
            self.register_definition(definition, space);
        }
    }

    fn register_definition(&mut self, definition: hir::Definition, space: NsId) {
        let span = definition.span;
        match definition.kind {
            hir::DefinitionKind::Function(function) => {
                let name = function.name;
                let id = self.fns.alloc(DefInfo::new(function, name, span, space));
                if self.check_duplicate(space, name, |ns| ns.functions.get(&name.id).copied())
                {
                    return;
                }
                self.namespaces[space].functions.insert(name.id, id);
                self.namespaces[space].definitions_in_order.push(DefRef::Function(id));
            }
            hir::DefinitionKind::Struct(structure) => {
                let name = structure.name;
                let id = self.structs.alloc(DefInfo::new(structure, name, span, space));
                if self.check_duplicate(space, name, |ns| ns.structures.get(&name.id).copied())
                {
                    return;
                }
                let associated = self.alloc_namespace(Some(name), Some(space));
                self.structs[id].associated_namespace = Some(associated);
                self.namespaces[space].structures.insert(name.id, id);
                self.namespaces[space].definitions_in_order.push(DefRef::Struct(id));
            }
            hir::DefinitionKind::Enum(enumeration) => {
                let name = enumeration.name;
                let id = self.enums.alloc(DefInfo::new(enumeration, name, span, space));
                if self
                    .check_duplicate(space, name, |ns| ns.enumerations.get(&name.id).copied())
                {
                    return;
                }
                let associated = self.alloc_namespace(Some(name), Some(space));
                self.enums[id].associated_namespace = Some(associated);
                self.namespaces[space].enumerations.insert(name.id, id);
                self.namespaces[space].definitions_in_order.push(DefRef::Enum(id));
            }
            hir::DefinitionKind::Alias(alias) => {
                let name = alias.name;
                let id = self.aliases.alloc(DefInfo::new(alias, name, span, space));
                if self.check_duplicate(space, name, |ns| ns.aliases.get(&name.id).copied()) {
                    return;
                }
                self.namespaces[space].aliases.insert(name.id, id);
                self.namespaces[space].definitions_in_order.push(DefRef::Alias(id));
            }
            hir::DefinitionKind::Typeclass(class) => {
                let name = class.name;
                let id = self.classes.alloc(DefInfo::new(class, name, span, space));
                if self.check_duplicate(space, name, |ns| ns.typeclasses.get(&name.id).copied())
                {
                    return;
                }
                self.namespaces[space].typeclasses.insert(name.id, id);
                self.namespaces[space].definitions_in_order.push(DefRef::Typeclass(id));
            }
            hir::DefinitionKind::Implementation(implementation) => {
                let index = self.pending_impls.len();
                self.pending_impls.push(PendingImpl {
                    target: implementation.target,
                    template_parameters: implementation.template_parameters,
                    definitions: implementation.definitions,
                    home: space,
                    span,
                    target_ty: None,
                    functions: Vec::new(),
                });
                self.namespaces[space]
                    .definitions_in_order
                    .push(DefRef::Implementation(index));
            }
            hir::DefinitionKind::Instantiation(instantiation) => {
                let index = self.pending_insts.len();
                self.pending_insts.push(PendingInst {
                    class: instantiation.class,
                    target: instantiation.target,
                    template_parameters: instantiation.template_parameters,
                    definitions: instantiation.definitions,
                    home: space,
                    span,
                    class_id: None,
                    target_ty: None,
                    functions: Vec::new(),
                });
                self.namespaces[space]
                    .definitions_in_order
                    .push(DefRef::Instantiation(index));
            }
            hir::DefinitionKind::Namespace(namespace) => {
                let name = namespace.name;
                if namespace.template_parameters.is_some() {
                    self.sink.error(
                        "namespace templates are not supported",
                        vec![Label::new(span, "cannot parameterize a namespace")],
                    );
                }
                if let Some(&existing) = self.namespaces[space].namespaces.get(&name.id) {
                    let first = self.namespaces[existing]
                        .name
                        .map(|n| n.span)
                        .unwrap_or(span);
                    self.duplicate_error(name, first);
                    return;
                }
                let child = self.alloc_namespace(Some(name), Some(space));
                self.namespaces[space].namespaces.insert(name.id, child);
                self.namespaces[space].definitions_in_order.push(DefRef::Namespace(child));
                self.register_definitions(namespace.definitions, child);
            }
        }
    }

    pub(crate) fn alloc_namespace(&mut self, name: Option<Name>, parent: Option<NsId>) -> NsId {
        self.namespaces.alloc(Namespace { name, parent, ..Namespace::default() })
    }

    /// True (and reports) when `name` is already taken in its table.
    fn check_duplicate<T>(
        &mut self,
        space: NsId,
        name: Name,
        find: impl Fn(&Namespace) -> Option<T>,
    ) -> bool
    where
        T: Copy,
        Self: FirstSpanOf<T>,
    {
        if let Some(existing) = find(&self.namespaces[space]) {
            let first = self.first_span_of(existing);
            self.duplicate_error(name, first);
            true
        } else {
            false
        }
    }

    fn duplicate_error(&mut self, name: Name, first: Span) {
        let text = self.interner.view(name.id).to_owned();
        self.sink.error(
            format!("duplicate definition of `{text}`"),
            vec![
                Label::new(first, "first defined here"),
                Label::new(name.span, "redefined here"),
            ],
        );
    }

    /// Attach parked implementation and instantiation blocks to the
    /// associated namespaces of their (now resolvable) target types.
    pub(crate) fn attach_pending_blocks(&mut self) {
        for index in 0..self.pending_impls.len() {
            self.attach_impl(index);
        }
        for index in 0..self.pending_insts.len() {
            self.attach_inst(index);
        }
    }

    fn attach_impl(&mut self, index: usize) {
        let home = self.pending_impls[index].home;
        let span = self.pending_impls[index].span;
        let target = self.pending_impls[index].target;
        let template_parameters = self.pending_impls[index].template_parameters.clone();

        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let saved_mut_env = self.mut_env.clone();
        self.scopes.enter();
        let bindings = self.bind_template_parameters(&template_parameters);
        let target_ty = self.resolve_type(target);
        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.current_ns = saved_ns;

        let Some(associated) = self.associated_namespace_of(&target_ty) else {
            let shown = self.ty_string(&target_ty);
            self.sink.error(
                format!("`{shown}` does not have an associated namespace"),
                vec![Label::new(span, "cannot attach members to this type")],
            );
            return;
        };
        self.pending_impls[index].target_ty = Some(target_ty);

        let definitions = std::mem::take(&mut self.pending_impls[index].definitions);
        let functions = self.attach_member_functions(definitions, associated, &bindings);
        self.pending_impls[index].functions = functions;
    }

    fn attach_inst(&mut self, index: usize) {
        let home = self.pending_insts[index].home;
        let span = self.pending_insts[index].span;
        let target = self.pending_insts[index].target;
        let class = self.pending_insts[index].class.clone();
        let template_parameters = self.pending_insts[index].template_parameters.clone();

        let saved_ns = std::mem::replace(&mut self.current_ns, home);
        let class_id = match self.find_typeclass(&class) {
            Ok(id) => id,
            Err(failure) => {
                if failure == crate::lookup::LookupErr::NotFound {
                    let text = self.interner.view(class.primary.id).to_owned();
                    self.sink.error(
                        format!("cannot find typeclass `{text}`"),
                        vec![Label::new(class.primary.span, "not a known typeclass")],
                    );
                }
                self.current_ns = saved_ns;
                return;
            }
        };

        let saved_mut_env = self.mut_env.clone();
        self.scopes.enter();
        let bindings = self.bind_template_parameters(&template_parameters);
        let target_ty = self.resolve_type(target);
        self.scopes.exit(self.interner, self.sink);
        self.mut_env = saved_mut_env;
        self.current_ns = saved_ns;

        let Some(associated) = self.associated_namespace_of(&target_ty) else {
            let shown = self.ty_string(&target_ty);
            self.sink.error(
                format!("`{shown}` does not have an associated namespace"),
                vec![Label::new(span, "cannot attach an instantiation to this type")],
            );
            return;
        };

        // Instance members live in a class-named subspace of the target's
        // associated namespace.
        let class_name = self.classes[class_id].name;
        let subspace = match self.namespaces[associated].namespaces.get(&class_name.id) {
            Some(&existing) => existing,
            None => {
                let child = self.alloc_namespace(Some(class_name), Some(associated));
                self.namespaces[associated].namespaces.insert(class_name.id, child);
                child
            }
        };

        let definitions = std::mem::take(&mut self.pending_insts[index].definitions);
        let functions = self.attach_member_functions(definitions, subspace, &bindings);

        // Every function the class requires must be provided.
        let required: Vec<Name> = self.classes[class_id]
            .hir
            .function_signatures
            .iter()
            .map(|signature| signature.name)
            .collect();
        for name in required {
            let provided = functions.iter().any(|&id| self.fns[id].name.id == name.id);
            if !provided {
                let function = self.interner.view(name.id).to_owned();
                let class_text = self.interner.view(class_name.id).to_owned();
                self.sink.error(
                    format!(
                        "instantiation of `{class_text}` is missing function `{function}`"
                    ),
                    vec![
                        Label::new(span, "in this instantiation"),
                        Label::new(name.span, "required by this signature"),
                    ],
                );
            }
        }

        let scheme = crate::ty::Scheme {
            params: bindings
                .types
                .iter()
                .map(|binding| crate::ty::SchemeParam {
                    name: Some(binding.name),
                    var: binding.var,
                    classes: binding.classes.clone(),
                })
                .collect(),
            ty: target_ty.clone(),
        };
        let instance = crate::def::Instance {
            scheme,
            span,
            functions: functions.iter().map(|&id| (self.fns[id].name.id, id)).collect(),
        };
        self.instances.entry(class_id).or_default().push(instance);

        self.pending_insts[index].class_id = Some(class_id);
        self.pending_insts[index].target_ty = Some(target_ty);
        self.pending_insts[index].functions = functions;
    }

    /// Register the function members of an impl/instantiation block into
    /// `space`; anything else in the block is rejected.
    fn attach_member_functions(
        &mut self,
        definitions: Vec<hir::Definition>,
        space: NsId,
        outer_bindings: &crate::def::TemplateScope,
    ) -> Vec<FnId> {
        let mut functions = Vec::new();
        for definition in definitions {
            let span = definition.span;
            match definition.kind {
                hir::DefinitionKind::Function(function) => {
                    let name = function.name;
                    let id = self.fns.alloc(DefInfo::new(function, name, span, space));
                    if self
                        .check_duplicate(space, name, |ns| ns.functions.get(&name.id).copied())
                    {
                        continue;
                    }
                    self.namespaces[space].functions.insert(name.id, id);
                    self.namespaces[space].definitions_in_order.push(DefRef::Function(id));
                    if !outer_bindings.types.is_empty() || !outer_bindings.muts.is_empty() {
                        self.outer_template_bindings.insert(id, outer_bindings.clone());
                    }
                    functions.push(id);
                }
                _ => {
                    self.sink.error(
                        "only function definitions are allowed in this block",
                        vec![Label::new(span, "cannot attach this definition to a type")],
                    );
                }
            }
        }
        functions
    }
}

/// Maps a definition id to the span its duplicate diagnostic should cite.
pub(crate) trait FirstSpanOf<T> {
    fn first_span_of(&self, id: T) -> Span;
}

impl FirstSpanOf<FnId> for Context<'_> {
    fn first_span_of(&self, id: FnId) -> Span {
        self.fns[id].name.span
    }
}

impl FirstSpanOf<StructId> for Context<'_> {
    fn first_span_of(&self, id: StructId) -> Span {
        self.structs[id].name.span
    }
}

impl FirstSpanOf<EnumId> for Context<'_> {
    fn first_span_of(&self, id: EnumId) -> Span {
        self.enums[id].name.span
    }
}

impl FirstSpanOf<AliasId> for Context<'_> {
    fn first_span_of(&self, id: AliasId) -> Span {
        self.aliases[id].name.span
    }
}

impl FirstSpanOf<ClassId> for Context<'_> {
    fn first_span_of(&self, id: ClassId) -> Span {
        self.classes[id].name.span
    }
}
