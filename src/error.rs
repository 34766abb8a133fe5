//! Compile error taxonomy

use crate::diagnostics::{
    Diagnostic, DiagnosticBuilder, DiagnosticCode, ErrorContext, Position, line_at,
};
use std::fmt;
use thiserror::Error;

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;

/// The four kinds of compile failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown attribute, relationship or type, or a root-type mismatch
    SchemaResolution,
    /// Unknown operator, or a parameter that does not fit it
    Operator,
    /// Malformed structural criteria
    Structural,
    /// Malformed operation-language source
    Syntax,
}

/// Where in operation-language source an error occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExcerpt {
    /// Line, 1-indexed
    pub line: usize,
    /// Column, 1-indexed, in characters
    pub column: usize,
    /// Source text shown with the error
    pub excerpt: String,
    /// Character range of `excerpt` the error points at
    pub underline: (usize, usize),
}

impl SourceExcerpt {
    /// Point at `width` bytes from `offset`, showing the whole line
    pub fn at(source: &str, offset: usize, width: usize) -> Self {
        let position = Position::from_offset(source, offset);
        let width = source
            .get(offset..(offset + width).min(source.len()))
            .map_or(1, |text| text.chars().count().max(1));
        let (line, column) = position.to_display();
        Self {
            line,
            column,
            excerpt: line_at(source, offset).to_string(),
            underline: (position.column, position.column + width),
        }
    }

    /// Show exactly the source between two byte offsets
    pub fn range(source: &str, start: usize, end: usize) -> Self {
        let (line, column) = Position::from_offset(source, start).to_display();
        let excerpt = source.get(start..end).unwrap_or_default().to_string();
        let width = excerpt.chars().count();
        Self {
            line,
            column,
            excerpt,
            underline: (0, width),
        }
    }
}

/// Diagnostic location attached to every compile error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    /// Context path through structural criteria, root to leaf
    Path(Vec<String>),
    /// Position in operation-language source
    Source(SourceExcerpt),
}

impl From<&ErrorContext> for ErrorLocation {
    fn from(context: &ErrorContext) -> Self {
        ErrorLocation::Path(context.snapshot())
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLocation::Path(path) if path.is_empty() => Ok(()),
            ErrorLocation::Path(path) => write!(f, " in [{}]", path.join(", ")),
            ErrorLocation::Source(source) => write!(
                f,
                " in '{}' at line {}, column {}",
                source.excerpt, source.line, source.column
            ),
        }
    }
}

/// A failed compilation
///
/// The first error aborts the whole compile; no partial tree is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Unknown attribute, relationship or type
    #[error("{message}{location}")]
    SchemaResolution {
        /// Error message
        message: String,
        /// Where it happened
        location: ErrorLocation,
    },

    /// Unknown operator or mismatched parameter
    #[error("{message}{location}")]
    Operator {
        /// Error message
        message: String,
        /// Where it happened
        location: ErrorLocation,
    },

    /// Malformed structural criteria
    #[error("{message}{location}")]
    Structural {
        /// Error message
        message: String,
        /// Where it happened
        location: ErrorLocation,
    },

    /// Malformed source text
    #[error("{message}{location}")]
    Syntax {
        /// Error message
        message: String,
        /// Where it happened
        location: ErrorLocation,
    },
}

impl CompileError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: ErrorLocation) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::SchemaResolution => CompileError::SchemaResolution { message, location },
            ErrorKind::Operator => CompileError::Operator { message, location },
            ErrorKind::Structural => CompileError::Structural { message, location },
            ErrorKind::Syntax => CompileError::Syntax { message, location },
        }
    }

    /// Structural error at a context path
    pub fn structural(message: impl Into<String>, context: &ErrorContext) -> Self {
        Self::new(ErrorKind::Structural, message, context.into())
    }

    /// Syntax error at a source position
    pub fn syntax(message: impl Into<String>, excerpt: SourceExcerpt) -> Self {
        Self::new(ErrorKind::Syntax, message, ErrorLocation::Source(excerpt))
    }

    /// Error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::SchemaResolution { .. } => ErrorKind::SchemaResolution,
            CompileError::Operator { .. } => ErrorKind::Operator,
            CompileError::Structural { .. } => ErrorKind::Structural,
            CompileError::Syntax { .. } => ErrorKind::Syntax,
        }
    }

    /// Message without location
    pub fn message(&self) -> &str {
        match self {
            CompileError::SchemaResolution { message, .. }
            | CompileError::Operator { message, .. }
            | CompileError::Structural { message, .. }
            | CompileError::Syntax { message, .. } => message,
        }
    }

    /// Location
    pub fn location(&self) -> &ErrorLocation {
        match self {
            CompileError::SchemaResolution { location, .. }
            | CompileError::Operator { location, .. }
            | CompileError::Structural { location, .. }
            | CompileError::Syntax { location, .. } => location,
        }
    }

    /// Context path, empty for source-located errors
    pub fn context_path(&self) -> &[String] {
        match self.location() {
            ErrorLocation::Path(path) => path,
            ErrorLocation::Source(_) => &[],
        }
    }

    /// Source position, for errors raised while compiling source text
    pub fn source_excerpt(&self) -> Option<&SourceExcerpt> {
        match self.location() {
            ErrorLocation::Source(excerpt) => Some(excerpt),
            ErrorLocation::Path(_) => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self.kind() {
            ErrorKind::SchemaResolution => DiagnosticCode::SchemaResolution,
            ErrorKind::Operator => DiagnosticCode::Operator,
            ErrorKind::Structural => DiagnosticCode::Structural,
            ErrorKind::Syntax => DiagnosticCode::Syntax,
        };
        let builder = DiagnosticBuilder::error(code).with_message(self.message());

        match self.location() {
            ErrorLocation::Path(path) => builder.with_context(path.clone()).build(),
            ErrorLocation::Source(source) => {
                let line = source.line - 1;
                let start = source.column - 1;
                let (from, to) = source.underline;
                builder
                    .with_location(line, start, line, start + (to - from))
                    .with_excerpt(source.excerpt.clone(), source.underline)
                    .build()
            }
        }
    }
}

/// An error not yet tied to a location
///
/// Resolution and dispatch are shared by both compilers, which attach their
/// own kind of location: a context path or a source excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Error kind
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
}

impl Rejection {
    /// Schema resolution failure
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SchemaResolution,
            message: message.into(),
        }
    }

    /// Operator failure
    pub fn operator(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Operator,
            message: message.into(),
        }
    }

    /// Structural failure
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Structural,
            message: message.into(),
        }
    }

    /// Attach a location
    pub fn at(self, location: ErrorLocation) -> CompileError {
        CompileError::new(self.kind, self.message, location)
    }

    /// Attach a context path
    pub fn in_context(self, context: &ErrorContext) -> CompileError {
        self.at(context.into())
    }
}
