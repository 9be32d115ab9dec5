//! Lexical scopes: variable bindings, local type aliases, frame offsets.
//!
//! Scopes nest LIFO as a stack of frames. Inserting a name that already
//! exists in the current frame shadows it; shadowing an entry that was
//! never mentioned warns once (and marks the shadowed entry mentioned so it
//! cannot warn again). When a frame exits, every binding that was never
//! mentioned, carries a source span, and does not start with `_` produces
//! an unused-binding warning, in insertion order.

use tarn_common::{DiagnosticSink, Identifier, Interner, Label, Span};

use crate::ty::Ty;

/// A pattern-bound local variable.
#[derive(Debug, Clone)]
pub struct Binding {
    /// `None` for bindings inserted by the compiler; those never warn.
    pub span: Option<Span>,
    pub ty: Ty,
    /// Byte offset of the binding's storage within the current stack frame.
    pub frame_offset: u64,
    pub is_mutable: bool,
    pub has_been_mentioned: bool,
    /// Where the binding's value was moved out, if anywhere. Recorded for
    /// later stages; the core does not borrow-check.
    pub moved_by: Option<Span>,
}

/// A local type alias or an in-scope template parameter.
#[derive(Debug, Clone)]
pub struct TypeBinding {
    pub span: Option<Span>,
    pub ty: Ty,
    pub has_been_mentioned: bool,
}

#[derive(Debug, Default)]
struct Frame {
    variables: Vec<(Identifier, Binding)>,
    types: Vec<(Identifier, TypeBinding)>,
    saved_frame_offset: u64,
}

/// The scope stack of the definition currently being resolved.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    /// Running byte offset within the current stack frame at which the
    /// next binding's storage will live.
    pub current_frame_offset: u64,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a child scope.
    pub fn enter(&mut self) {
        self.frames.push(Frame {
            saved_frame_offset: self.current_frame_offset,
            ..Frame::default()
        });
    }

    /// Exit the innermost scope, emitting unused-binding warnings and
    /// releasing its frame storage.
    pub fn exit(&mut self, interner: &Interner, sink: &mut DiagnosticSink) {
        let Some(frame) = self.frames.pop() else { return };
        for (id, binding) in &frame.variables {
            warn_if_unused(
                interner,
                sink,
                *id,
                binding.span,
                binding.has_been_mentioned,
                "variable",
            );
        }
        for (id, binding) in &frame.types {
            warn_if_unused(
                interner,
                sink,
                *id,
                binding.span,
                binding.has_been_mentioned,
                "type alias",
            );
        }
        self.current_frame_offset = frame.saved_frame_offset;
    }

    /// Insert a variable binding, shadowing any existing entry.
    pub fn bind_variable(
        &mut self,
        interner: &Interner,
        sink: &mut DiagnosticSink,
        id: Identifier,
        binding: Binding,
    ) {
        if let Some(frame) = self.frames.last_mut() {
            if let Some((_, shadowed)) =
                frame.variables.iter_mut().rev().find(|(existing, _)| *existing == id)
            {
                warn_shadowed_unused(
                    interner,
                    sink,
                    id,
                    shadowed.span,
                    &mut shadowed.has_been_mentioned,
                    binding.span,
                    "variable",
                );
            }
            frame.variables.push((id, binding));
        }
    }

    /// Insert a type binding, shadowing any existing entry.
    pub fn bind_type(
        &mut self,
        interner: &Interner,
        sink: &mut DiagnosticSink,
        id: Identifier,
        binding: TypeBinding,
    ) {
        if let Some(frame) = self.frames.last_mut() {
            if let Some((_, shadowed)) =
                frame.types.iter_mut().rev().find(|(existing, _)| *existing == id)
            {
                warn_shadowed_unused(
                    interner,
                    sink,
                    id,
                    shadowed.span,
                    &mut shadowed.has_been_mentioned,
                    binding.span,
                    "type alias",
                );
            }
            frame.types.push((id, binding));
        }
    }

    /// Find a variable binding, innermost shadow first.
    pub fn find_variable(&mut self, id: Identifier) -> Option<&mut Binding> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| {
                frame
                    .variables
                    .iter_mut()
                    .rev()
                    .find(|(existing, _)| *existing == id)
            })
            .map(|(_, binding)| binding)
    }

    /// Find a type binding, innermost shadow first.
    pub fn find_type(&mut self, id: Identifier) -> Option<&mut TypeBinding> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| {
                frame.types.iter_mut().rev().find(|(existing, _)| *existing == id)
            })
            .map(|(_, binding)| binding)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

fn warn_if_unused(
    interner: &Interner,
    sink: &mut DiagnosticSink,
    id: Identifier,
    span: Option<Span>,
    mentioned: bool,
    what: &str,
) {
    let Some(span) = span else { return };
    if mentioned || interner.view(id).starts_with('_') {
        return;
    }
    let name = interner.view(id);
    sink.warning_with_help(
        format!("unused local {what} `{name}`"),
        vec![Label::new(span, format!("`{name}` is never mentioned"))],
        format!("if this is intentional, prefix the {what} with an underscore: `_{name}`"),
    );
}

fn warn_shadowed_unused(
    interner: &Interner,
    sink: &mut DiagnosticSink,
    id: Identifier,
    shadowed_span: Option<Span>,
    shadowed_mentioned: &mut bool,
    shadow_span: Option<Span>,
    what: &str,
) {
    if *shadowed_mentioned {
        return;
    }
    let (Some(first), Some(second)) = (shadowed_span, shadow_span) else {
        // Compiler-inserted bindings shadow silently.
        *shadowed_mentioned = true;
        return;
    };
    let name = interner.view(id);
    sink.warning_with_help(
        format!("local {what} `{name}` shadows an unused local {what}"),
        vec![
            Label::new(first, "first declared here"),
            Label::new(second, "later shadowed here"),
        ],
        format!("if this is intentional, prefix the first {what} with an underscore: `_{name}`"),
    );
    // One warning per shadowed entry.
    *shadowed_mentioned = true;
}
