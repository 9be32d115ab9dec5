//! The diagnostic sink every pipeline stage appends to.
//!
//! The core never renders diagnostics: it records structured messages with
//! labeled spans, in emission order, and the driver renders them after the
//! pipeline finishes. Notes and warnings can be independently promoted to
//! errors or suppressed by configuration.

use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// How a configurable diagnostic category is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Level {
    /// Emit with the category's own severity.
    #[default]
    Normal,
    /// Emit, but as an error.
    Promote,
    /// Drop silently.
    Suppress,
}

/// Severity of an emitted diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A labeled source range within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self { span, message: message.into() }
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub help: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Per-sink configuration: note and warning handling levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkConfig {
    pub note_level: Level,
    pub warning_level: Level,
}

/// Accumulates diagnostics in emission order.
///
/// Errors are terminal for the pipeline's output (the compilation is
/// invalidated once one is recorded) but not for the pipeline itself:
/// stages keep running so further problems can be reported.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    config: SinkConfig,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticSink {
    pub fn new(config: SinkConfig) -> Self {
        Self { config, diagnostics: Vec::new(), error_count: 0 }
    }

    /// Emit a note, subject to the configured note level.
    pub fn note(&mut self, message: impl Into<String>, labels: Vec<Label>) {
        self.emit(Severity::Note, self.config.note_level, message.into(), labels, None);
    }

    /// Emit a warning, subject to the configured warning level.
    pub fn warning(&mut self, message: impl Into<String>, labels: Vec<Label>) {
        self.emit(Severity::Warning, self.config.warning_level, message.into(), labels, None);
    }

    /// Emit a warning carrying a help note.
    pub fn warning_with_help(
        &mut self,
        message: impl Into<String>,
        labels: Vec<Label>,
        help: impl Into<String>,
    ) {
        self.emit(
            Severity::Warning,
            self.config.warning_level,
            message.into(),
            labels,
            Some(help.into()),
        );
    }

    /// Emit an error. Errors are never suppressed or reclassified.
    pub fn error(&mut self, message: impl Into<String>, labels: Vec<Label>) {
        self.emit(Severity::Error, Level::Normal, message.into(), labels, None);
    }

    /// Emit an error carrying a help note.
    pub fn error_with_help(
        &mut self,
        message: impl Into<String>,
        labels: Vec<Label>,
        help: impl Into<String>,
    ) {
        self.emit(Severity::Error, Level::Normal, message.into(), labels, Some(help.into()));
    }

    fn emit(
        &mut self,
        severity: Severity,
        level: Level,
        message: String,
        labels: Vec<Label>,
        help: Option<String>,
    ) {
        let severity = match (severity, level) {
            (Severity::Error, _) | (_, Level::Normal) => severity,
            (_, Level::Promote) => Severity::Error,
            (_, Level::Suppress) => return,
        };
        if severity == Severity::Error {
            self.error_count += 1;
        }
        self.diagnostics.push(Diagnostic { severity, message, labels, help });
    }

    /// Whether any error has been recorded. Defines pipeline failure.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// All recorded diagnostics, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of one severity, in emission order.
    pub fn of_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    /// Convert recorded diagnostics into `ariadne` reports for rendering.
    ///
    /// The report's source key is the raw `SourceId` index; the driver maps
    /// it back to whatever it read.
    pub fn to_reports(&self) -> Vec<ariadne::Report<'static, (u32, std::ops::Range<usize>)>> {
        use ariadne::{Report, ReportKind};
        self.diagnostics
            .iter()
            .map(|diagnostic| {
                let kind = match diagnostic.severity {
                    Severity::Note => ReportKind::Advice,
                    Severity::Warning => ReportKind::Warning,
                    Severity::Error => ReportKind::Error,
                };
                let offset = diagnostic.labels.first().map_or(0, |l| l.span.start as usize);
                let source = diagnostic.labels.first().map_or(0, |l| l.span.source.0);
                let mut report = Report::build(kind, (source, offset..offset))
                    .with_message(&diagnostic.message);
                for label in &diagnostic.labels {
                    report = report.with_label(
                        ariadne::Label::new((
                            label.span.source.0,
                            label.span.start as usize..label.span.end as usize,
                        ))
                        .with_message(&label.message),
                    );
                }
                if let Some(help) = &diagnostic.help {
                    report = report.with_help(help);
                }
                report.finish()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceId;

    fn span() -> Span {
        Span::new(SourceId(0), 0, 1)
    }

    #[test]
    fn errors_mark_failure() {
        let mut sink = DiagnosticSink::default();
        assert!(!sink.has_errors());
        sink.error("boom", vec![Label::new(span(), "here")]);
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn warnings_do_not_mark_failure() {
        let mut sink = DiagnosticSink::default();
        sink.warning("meh", vec![]);
        assert!(!sink.has_errors());
    }

    #[test]
    fn promote_warnings_to_errors() {
        let mut sink = DiagnosticSink::new(SinkConfig {
            warning_level: Level::Promote,
            ..SinkConfig::default()
        });
        sink.warning("meh", vec![]);
        assert!(sink.has_errors());
        assert_eq!(sink.diagnostics()[0].severity, Severity::Error);
    }

    #[test]
    fn suppress_notes() {
        let mut sink = DiagnosticSink::new(SinkConfig {
            note_level: Level::Suppress,
            ..SinkConfig::default()
        });
        sink.note("psst", vec![]);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn emission_order_is_preserved() {
        let mut sink = DiagnosticSink::default();
        sink.note("first", vec![]);
        sink.error("second", vec![]);
        sink.warning("third", vec![]);
        let messages: Vec<_> =
            sink.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }
}
