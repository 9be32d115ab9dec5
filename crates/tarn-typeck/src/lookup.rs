//! Qualified-name lookup against the namespace graph.
//!
//! Lookup applies the root qualifier (current / global / type-associated),
//! descends middle qualifiers, then looks the primary name up in the table
//! matching the expected category. Unqualified relative lookups that miss
//! walk parent namespaces up to the root. Case is enforced: value lookups
//! reject capitalized primaries, type and typeclass lookups reject
//! lowercase ones.

use tarn_common::Label;
use tarn_hir as hir;

use crate::def::{AliasId, ClassId, EnumId, FnId, StructId};
use crate::nspace::NsId;
use crate::Context;

/// Why a lookup produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErr {
    /// A diagnostic was already emitted (bad qualifier, wrong case, ...);
    /// the caller should degrade silently.
    Reported,
    /// Nothing matched; the caller owns the not-found diagnostic.
    NotFound,
}

/// A name resolved in type position.
#[derive(Debug, Clone, Copy)]
pub enum TypeDefRef {
    Struct(StructId),
    Enum(EnumId),
    Alias(AliasId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupMode {
    Relative,
    Absolute,
}

impl Context<'_> {
    /// Resolve the root and middle qualifiers, yielding the namespace the
    /// primary lookup starts from.
    fn apply_qualifiers(
        &mut self,
        name: &hir::QualifiedName,
    ) -> Result<(LookupMode, NsId), LookupErr> {
        let (mode, mut space) = match &name.root {
            hir::RootQualifier::Current => (LookupMode::Relative, self.current_ns),
            hir::RootQualifier::Global => (LookupMode::Absolute, self.global),
            hir::RootQualifier::Type(ty) => {
                let ty = self.resolve_type(*ty);
                match self.associated_namespace_of(&ty) {
                    Some(ns) => (LookupMode::Absolute, ns),
                    None => {
                        let shown = self.ty_string(&ty);
                        self.sink.error(
                            format!("`{shown}` does not have an associated namespace"),
                            vec![Label::new(
                                name.primary.span,
                                "cannot look this name up through the type",
                            )],
                        );
                        return Err(LookupErr::Reported);
                    }
                }
            }
        };

        for qualifier in &name.middles {
            if let Some(&child) = self.namespaces[space].namespaces.get(&qualifier.name.id) {
                if qualifier.template_args.is_some() {
                    let text = self.interner.view(qualifier.name.id).to_owned();
                    self.sink.error(
                        format!("`{text}` is a namespace, not a type template"),
                        vec![Label::new(qualifier.span, "template arguments are not allowed here")],
                    );
                    return Err(LookupErr::Reported);
                }
                space = child;
                continue;
            }

            // A middle qualifier may name a struct or enum; lookup then
            // descends into its associated namespace.
            let type_target = self.namespaces[space]
                .structures
                .get(&qualifier.name.id)
                .copied()
                .map(TypeQualifier::Struct)
                .or_else(|| {
                    self.namespaces[space]
                        .enumerations
                        .get(&qualifier.name.id)
                        .copied()
                        .map(TypeQualifier::Enum)
                });
            if let Some(target) = type_target {
                let (params, associated) = match target {
                    TypeQualifier::Struct(id) => (
                        self.structs[id].hir.template_parameters.len(),
                        self.structs[id].associated_namespace,
                    ),
                    TypeQualifier::Enum(id) => (
                        self.enums[id].hir.template_parameters.len(),
                        self.enums[id].associated_namespace,
                    ),
                };
                if let Some(args) = &qualifier.template_args {
                    if params == 0 {
                        let text = self.interner.view(qualifier.name.id).to_owned();
                        self.sink.error(
                            format!("`{text}` is not a type template"),
                            vec![Label::new(
                                qualifier.span,
                                "template arguments are not allowed here",
                            )],
                        );
                        return Err(LookupErr::Reported);
                    }
                    if args.len() != params {
                        let text = self.interner.view(qualifier.name.id).to_owned();
                        self.sink.error(
                            format!(
                                "`{text}` expects {params} template argument(s), found {}",
                                args.len()
                            ),
                            vec![Label::new(qualifier.span, "wrong number of arguments")],
                        );
                        return Err(LookupErr::Reported);
                    }
                }
                if let Some(associated) = associated {
                    space = associated;
                    continue;
                }
            }

            let text = self.interner.view(qualifier.name.id).to_owned();
            self.sink.error(
                format!("no such qualifier `{text}`"),
                vec![Label::new(qualifier.span, "not a namespace or type in this path")],
            );
            return Err(LookupErr::Reported);
        }

        Ok((mode, space))
    }

    /// Look a function up by qualified name.
    pub(crate) fn find_function(
        &mut self,
        name: &hir::QualifiedName,
    ) -> Result<FnId, LookupErr> {
        if name.primary.is_upper {
            let text = self.interner.view(name.primary.id).to_owned();
            self.sink.error(
                format!("`{text}` is capitalized, but a function name was expected"),
                vec![Label::new(name.primary.span, "function names are lowercase")],
            );
            return Err(LookupErr::Reported);
        }
        let (mode, space) = self.apply_qualifiers(name)?;
        self.search(mode, space, |ns| ns.functions.get(&name.primary.id).copied())
    }

    /// Look a type up by qualified name: structures, then enumerations,
    /// then aliases.
    pub(crate) fn find_type(
        &mut self,
        name: &hir::QualifiedName,
    ) -> Result<TypeDefRef, LookupErr> {
        if !name.primary.is_upper {
            let text = self.interner.view(name.primary.id).to_owned();
            self.sink.error(
                format!("`{text}` is lowercase, but a type name was expected"),
                vec![Label::new(name.primary.span, "type names are capitalized")],
            );
            return Err(LookupErr::Reported);
        }
        let (mode, space) = self.apply_qualifiers(name)?;
        self.search(mode, space, |ns| {
            ns.structures
                .get(&name.primary.id)
                .copied()
                .map(TypeDefRef::Struct)
                .or_else(|| {
                    ns.enumerations.get(&name.primary.id).copied().map(TypeDefRef::Enum)
                })
                .or_else(|| ns.aliases.get(&name.primary.id).copied().map(TypeDefRef::Alias))
        })
    }

    /// Look a typeclass up by qualified name.
    pub(crate) fn find_typeclass(
        &mut self,
        name: &hir::QualifiedName,
    ) -> Result<ClassId, LookupErr> {
        if !name.primary.is_upper {
            let text = self.interner.view(name.primary.id).to_owned();
            self.sink.error(
                format!("`{text}` is lowercase, but a typeclass name was expected"),
                vec![Label::new(name.primary.span, "typeclass names are capitalized")],
            );
            return Err(LookupErr::Reported);
        }
        let (mode, space) = self.apply_qualifiers(name)?;
        self.search(mode, space, |ns| ns.typeclasses.get(&name.primary.id).copied())
    }

    /// Primary lookup: one namespace for absolute mode, the namespace and
    /// its parents for relative mode.
    fn search<T>(
        &mut self,
        mode: LookupMode,
        space: NsId,
        find: impl Fn(&crate::nspace::Namespace) -> Option<T>,
    ) -> Result<T, LookupErr> {
        match mode {
            LookupMode::Absolute => find(&self.namespaces[space]).ok_or(LookupErr::NotFound),
            LookupMode::Relative => {
                let mut current = Some(space);
                while let Some(ns) = current {
                    if let Some(found) = find(&self.namespaces[ns]) {
                        return Ok(found);
                    }
                    current = self.namespaces[ns].parent;
                }
                Err(LookupErr::NotFound)
            }
        }
    }
}

#[derive(Clone, Copy)]
enum TypeQualifier {
    Struct(StructId),
    Enum(EnumId),
}
