//! Core diagnostic types

use super::location::SourceLocation;
use serde::Serialize;
use std::fmt;

/// Diagnostic error codes, one per compile error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Malformed operation-language source
    Syntax,
    /// Unknown type, attribute or relationship
    SchemaResolution,
    /// Unknown operator or parameter mismatch
    Operator,
    /// Malformed structural criteria
    Structural,
}

impl DiagnosticCode {
    /// Stable short code, e.g. `E200`
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::Syntax => "E001",
            DiagnosticCode::SchemaResolution => "E100",
            DiagnosticCode::Operator => "E200",
            DiagnosticCode::Structural => "E300",
        }
    }
}

/// A compile failure, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Error code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Source location, for operation-language input
    pub location: Option<SourceLocation>,
    /// Context path, for structural input
    pub context: Vec<String>,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::Syntax => write!(f, "syntax error"),
            DiagnosticCode::SchemaResolution => write!(f, "unresolved name"),
            DiagnosticCode::Operator => write!(f, "invalid operator"),
            DiagnosticCode::Structural => write!(f, "malformed criteria"),
        }
    }
}
