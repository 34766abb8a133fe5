//! Builder pattern for constructing diagnostics

use super::diagnostic::{Diagnostic, DiagnosticCode};
use super::location::{Position, SourceLocation, Span};

/// Builder for constructing diagnostics fluently
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    code: DiagnosticCode,
    message: String,
    location: Option<SourceLocation>,
    context: Vec<String>,
}

impl DiagnosticBuilder {
    /// Start a diagnostic with the given code
    pub fn error(code: DiagnosticCode) -> Self {
        Self {
            code,
            message: String::new(),
            location: None,
            context: Vec::new(),
        }
    }

    /// Set the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the location from a span
    pub fn with_span(mut self, span: Span) -> Self {
        self.location = Some(SourceLocation::new(span));
        self
    }

    /// Set the location from line/column coordinates (0-indexed)
    pub fn with_location(self, start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        self.with_span(Span::new(
            Position::new(start_line, start_col),
            Position::new(end_line, end_col),
        ))
    }

    /// Attach the excerpt shown under the message, underlining `underline`
    pub fn with_excerpt(mut self, text: impl Into<String>, underline: (usize, usize)) -> Self {
        let location = self.location.get_or_insert_with(SourceLocation::default);
        location.source_text = Some(text.into());
        location.underline = Some(underline);
        self
    }

    /// Set the context path
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            code: self.code,
            message: self.message,
            location: self.location,
            context: self.context,
        }
    }
}
