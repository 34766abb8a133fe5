//! Diagnostic system for compile errors
//!
//! Compile errors carry either a context path (structural criteria) or a
//! source excerpt (operation language). This module turns both into
//! [`Diagnostic`]s and renders them for humans or machines.

pub mod builder;
pub mod context;
pub mod diagnostic;
pub mod formatter;
pub mod location;

pub use builder::DiagnosticBuilder;
pub use context::ErrorContext;
pub use diagnostic::{Diagnostic, DiagnosticCode};
pub use formatter::{DiagnosticFormatter, Format};
pub use location::{Position, SourceLocation, Span, line_at};
