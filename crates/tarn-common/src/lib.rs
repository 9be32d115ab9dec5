//! Shared infrastructure for the Tarn compiler.
//!
//! Everything here is stage-agnostic: byte-offset spans with on-demand
//! line/column lookup, the identifier interner, and the diagnostic sink
//! that every pipeline stage appends to.

pub mod diagnostics;
pub mod intern;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticSink, Label, Level, Severity, SinkConfig};
pub use intern::{Identifier, Interner};
pub use span::{LineIndex, SourceId, Span};
